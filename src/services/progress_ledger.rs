//! 进度帐本 - 业务能力层
//!
//! 所有工作者共用一个帐本文件，记录已完成的 Place ID。
//! 帐本只增不减：`add` / `merge` 都是并集语义，重复写入是无操作。
//!
//! 帐本文件没有跨进程锁。`add` 以"快照 → 改写 → 发布前复查"的方式
//! 尽力检测并发写入；检测到冲突时返回 `LedgerConflict`，调用方把该 ID
//! 写进自己的暂存记录（`ShadowRecord`），编排器在收尾阶段统一合并。
//! 任何顺序的 add / merge 都不会让已记录的 ID 从帐本消失。

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::error::LedgerConflict;

/// 暂存记录文件名前缀
const SHADOW_PREFIX: &str = "temp_";

/// 发布前用来比对帐本文件是否被并发改写的快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    /// 文件不存在返回 `None`，其余 IO 错误照常传播
    fn of(path: &Path) -> std::io::Result<Option<Self>> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(Self {
                len: meta.len(),
                modified: meta.modified().ok(),
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// 进度帐本
pub struct ProgressLedger {
    path: PathBuf,
    /// 临时文件标签，避免多个写入者互相覆盖彼此的临时文件
    tag: String,
}

impl ProgressLedger {
    pub fn new(path: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tag: tag.into(),
        }
    }

    /// 帐本文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取帐本的完整集合；文件不存在视为空帐本，格式损坏是错误
    pub fn load_set(&self) -> Result<HashSet<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let ids: Vec<String> = serde_json::from_str(&content)
                    .with_context(|| format!("进度帐本格式损坏: {}", self.path.display()))?;
                Ok(ids.into_iter().collect())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashSet::new()),
            Err(e) => {
                Err(e).with_context(|| format!("无法读取进度帐本: {}", self.path.display()))
            }
        }
    }

    /// 帐本是否已记录该 ID
    pub fn contains(&self, place_id: &str) -> Result<bool> {
        Ok(self.load_set()?.contains(place_id))
    }

    /// 把一个 ID 追加进帐本
    ///
    /// 读-改-写期间检测到帐本被其他写入者改动时返回 `LedgerConflict`，
    /// 磁盘上的帐本保持原样；调用方把该 ID 转记暂存记录，不会丢失。
    pub fn add(&self, place_id: &str) -> std::result::Result<(), LedgerConflict> {
        let before = FileStamp::of(&self.path)?;

        let mut ids = self.read_for_update()?;
        if !ids.insert(place_id.to_string()) {
            return Ok(()); // 已记录，无操作
        }

        let tmp = self.write_temp(&ids)?;

        // 发布前复查：快照之后帐本被改写过就放弃，避免覆盖别人的记录
        match FileStamp::of(&self.path) {
            Ok(after) if after == before => {
                fs::rename(&tmp, &self.path)?;
                Ok(())
            }
            Ok(_) => {
                let _ = fs::remove_file(&tmp);
                Err(LedgerConflict::new("帐本在写入期间被其他写入者改动"))
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                Err(LedgerConflict::from(e))
            }
        }
    }

    /// 把一组 ID 并入帐本（幂等，重复合并相同集合不改变结果）
    pub fn merge(&self, ids: &HashSet<String>) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut all = self.load_set()?;
        let before = all.len();
        all.extend(ids.iter().cloned());
        if all.len() == before {
            debug!("合并的 {} 个 ID 均已在帐本内", ids.len());
            return Ok(());
        }

        let tmp = self
            .write_temp(&all)
            .map_err(|e| anyhow::anyhow!("无法写入帐本临时文件: {}", e))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("无法发布进度帐本: {}", self.path.display()))?;
        Ok(())
    }

    /// 该帐本对应的某个工作者的暂存记录路径
    ///
    /// 文件名带上帐本主干（如 `temp_爬過的餐廳ID_worker_3.json`），
    /// 恢复时不会把别的类别的记录并进来。
    pub fn shadow_path(&self, worker_id: usize) -> PathBuf {
        self.path.with_file_name(format!(
            "{}{}_worker_{}.json",
            SHADOW_PREFIX,
            self.file_stem(),
            worker_id
        ))
    }

    /// 合并上一轮异常退出留下的暂存记录，返回扫到的 ID 总数
    ///
    /// 成功并入帐本的暂存文件随即删除；读取或合并失败的文件保留，
    /// 留待下一轮再试。
    pub fn recover_shadows(&self) -> Result<usize> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let prefix = format!("{}{}_worker_", SHADOW_PREFIX, self.file_stem());

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("无法扫描暂存记录目录: {}", dir.display()))
            }
        };

        let mut recovered = 0;
        for entry in entries {
            let entry =
                entry.with_context(|| format!("无法扫描暂存记录目录: {}", dir.display()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(&prefix) || !name.ends_with(".json") {
                continue;
            }

            let path = entry.path();
            let ids = match load_id_file(&path) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!("暂存记录无法读取，文件保留: {} ({})", path.display(), e);
                    continue;
                }
            };

            if let Err(e) = self.merge(&ids) {
                warn!("暂存记录合并失败，文件保留: {} ({})", path.display(), e);
                continue;
            }

            recovered += ids.len();
            match fs::remove_file(&path) {
                Ok(()) => info!("♻️ 已恢复暂存记录 {} ({} 笔)", name, ids.len()),
                Err(e) => warn!("暂存记录已合并但删除失败: {} ({})", path.display(), e),
            }
        }

        Ok(recovered)
    }

    fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }

    /// add 路径下的读取：任何失败都视为冲突，让调用方降级到暂存记录
    fn read_for_update(&self) -> std::result::Result<HashSet<String>, LedgerConflict> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let ids: Vec<String> = serde_json::from_str(&content)?;
                Ok(ids.into_iter().collect())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashSet::new()),
            Err(e) => Err(LedgerConflict::from(e)),
        }
    }

    fn write_temp(
        &self,
        ids: &HashSet<String>,
    ) -> std::result::Result<PathBuf, LedgerConflict> {
        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();

        let tmp = self.path.with_file_name(format!(
            "{}.{}.tmp",
            self.file_stem(),
            self.tag
        ));
        let json = serde_json::to_string_pretty(&sorted)?;
        fs::write(&tmp, json)?;
        Ok(tmp)
    }
}

/// 工作者私有的暂存记录
///
/// `add` 冲突时把 ID 记到这里，每笔都立刻落盘，工作者中途崩溃也不丢。
/// 文件在第一次记录时才建立；必须先成功并入帐本才能删除文件，
/// 顺序颠倒等于丢进度。
#[derive(Debug)]
pub struct ShadowRecord {
    path: PathBuf,
    ids: HashSet<String>,
}

impl ShadowRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ids: HashSet::new(),
        }
    }

    /// 记录一个没能写进帐本的 ID，并立刻落盘
    pub fn record(&mut self, place_id: &str) -> Result<()> {
        if !self.ids.insert(place_id.to_string()) {
            return Ok(());
        }

        let mut sorted: Vec<&String> = self.ids.iter().collect();
        sorted.sort();
        let json = serde_json::to_string_pretty(&sorted)
            .context("暂存记录序列化失败")?;
        fs::write(&self.path, json)
            .with_context(|| format!("无法写入暂存记录: {}", self.path.display()))?;
        Ok(())
    }

    pub fn ids(&self) -> &HashSet<String> {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 删除暂存文件。只能在对应集合确认并入帐本之后调用。
    pub fn remove_file(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("无法删除暂存记录: {}", self.path.display())),
        }
    }
}

/// 读取一个帐本 / 暂存格式的 ID 文件
fn load_id_file(path: &Path) -> Result<HashSet<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("无法读取: {}", path.display()))?;
    let ids: Vec<String> = serde_json::from_str(&content)
        .with_context(|| format!("格式损坏: {}", path.display()))?;
    Ok(ids.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_missing_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("爬過的餐廳ID.json"), "main");

        assert!(ledger.load_set().unwrap().is_empty());
        assert!(!ledger.contains("a").unwrap());
    }

    #[test]
    fn test_corrupt_ledger_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("爬過的餐廳ID.json");
        fs::write(&path, "不是 JSON").unwrap();

        let ledger = ProgressLedger::new(&path, "main");
        assert!(ledger.load_set().is_err());
    }

    #[test]
    fn test_add_then_contains() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("帳本.json"), "main");

        ledger.add("ChIJ-aaa").unwrap();
        ledger.add("ChIJ-bbb").unwrap();

        assert!(ledger.contains("ChIJ-aaa").unwrap());
        assert!(ledger.contains("ChIJ-bbb").unwrap());
        assert!(!ledger.contains("ChIJ-ccc").unwrap());
    }

    #[test]
    fn test_add_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("帳本.json"), "main");

        ledger.add("ChIJ-aaa").unwrap();
        let first = fs::read_to_string(ledger.path()).unwrap();
        ledger.add("ChIJ-aaa").unwrap();
        let second = fs::read_to_string(ledger.path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(ledger.load_set().unwrap().len(), 1);
    }

    #[test]
    fn test_merge_unions_overlapping_sets() {
        // 两个工作者的暂存集合 {a,b} 与 {b,c}，合并后帐本应正好是 {a,b,c}
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("帳本.json"), "main");

        ledger.merge(&id_set(&["a", "b"])).unwrap();
        ledger.merge(&id_set(&["b", "c"])).unwrap();

        assert_eq!(ledger.load_set().unwrap(), id_set(&["a", "b", "c"]));

        // 重复合并（模拟重试）不改变结果
        ledger.merge(&id_set(&["b", "c"])).unwrap();
        assert_eq!(ledger.load_set().unwrap(), id_set(&["a", "b", "c"]));
    }

    #[test]
    fn test_merge_never_drops_existing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("帳本.json"), "main");

        ledger.add("既有").unwrap();
        ledger.merge(&id_set(&["新增"])).unwrap();

        let all = ledger.load_set().unwrap();
        assert!(all.contains("既有"));
        assert!(all.contains("新增"));
    }

    #[test]
    fn test_shadow_record_persists_each_id() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("爬過的餐廳ID.json"), "worker_1");
        let mut shadow = ShadowRecord::new(ledger.shadow_path(1));

        assert!(!shadow.path().exists()); // 无冲突就不建文件

        shadow.record("a").unwrap();
        shadow.record("b").unwrap();
        shadow.record("a").unwrap();

        assert!(shadow.path().exists());
        let on_disk = load_id_file(shadow.path()).unwrap();
        assert_eq!(on_disk, id_set(&["a", "b"]));
    }

    #[test]
    fn test_recover_shadows_merges_then_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("爬過的餐廳ID.json"), "main");
        ledger.add("既有").unwrap();

        // 模拟上一轮两个工作者崩溃前留下的暂存记录
        fs::write(ledger.shadow_path(1), r#"["a", "b"]"#).unwrap();
        fs::write(ledger.shadow_path(2), r#"["b", "c"]"#).unwrap();

        let recovered = ledger.recover_shadows().unwrap();
        assert_eq!(recovered, 4);

        assert_eq!(
            ledger.load_set().unwrap(),
            id_set(&["既有", "a", "b", "c"])
        );
        assert!(!ledger.shadow_path(1).exists());
        assert!(!ledger.shadow_path(2).exists());
    }

    #[test]
    fn test_recover_keeps_unreadable_shadow() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("爬過的餐廳ID.json"), "main");

        fs::write(ledger.shadow_path(1), "不是 JSON").unwrap();
        fs::write(ledger.shadow_path(2), r#"["a"]"#).unwrap();

        let recovered = ledger.recover_shadows().unwrap();
        assert_eq!(recovered, 1);

        // 损坏的文件必须保留，不能当作已恢复删掉
        assert!(ledger.shadow_path(1).exists());
        assert!(!ledger.shadow_path(2).exists());
        assert!(ledger.contains("a").unwrap());
    }

    #[test]
    fn test_recover_ignores_other_category_shadows() {
        let dir = tempfile::tempdir().unwrap();
        let restaurant =
            ProgressLedger::new(dir.path().join("爬過的餐廳ID.json"), "main");
        let attraction =
            ProgressLedger::new(dir.path().join("爬過的景點ID.json"), "main");

        fs::write(attraction.shadow_path(1), r#"["景點ID"]"#).unwrap();

        assert_eq!(restaurant.recover_shadows().unwrap(), 0);
        assert!(attraction.shadow_path(1).exists());
        assert!(!restaurant.contains("景點ID").unwrap());
    }

    #[test]
    fn test_add_degrades_to_conflict_on_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("帳本.json");

        // 帐本路径被占成目录，读-改-写必然失败，应返回冲突而不是恐慌
        fs::create_dir(&path).unwrap();
        let ledger = ProgressLedger::new(&path, "worker_1");

        assert!(ledger.add("新的").is_err());
    }
}
