//! 详细资料存档 - 业务能力层
//!
//! 只负责"一个地点一个 JSON 文件"的能力，不关心流程

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::models::PlaceRecord;

/// 文件名长度上限（字符数，不含扩展名）
const MAX_FILE_STEM_CHARS: usize = 100;

/// 文件名中不允许出现的字符
fn invalid_filename_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("字面量正则必定合法"))
}

/// 详细资料存档
///
/// 职责：
/// - 每个地点一个 JSON 文件，文件名由 Place ID 清洗而来
/// - 重复处理同一地点时整档覆盖，不追加
/// - 提供"是否已有存档"查询，供流程层跳过重复工作
pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    /// 创建存档服务（目录可以尚不存在，由编排器负责建立）
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 把 Place ID 清洗成文件系统安全的文件名主干
    pub fn sanitize_file_stem(place_id: &str) -> String {
        let cleaned = invalid_filename_chars().replace_all(place_id, "");
        cleaned.chars().take(MAX_FILE_STEM_CHARS).collect()
    }

    /// 该地点存档的完整路径
    pub fn file_path(&self, place_id: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.json", Self::sanitize_file_stem(place_id)))
    }

    /// 该地点是否已有存档
    pub fn exists(&self, place_id: &str) -> bool {
        self.file_path(place_id).exists()
    }

    /// 写入一个地点的存档（先写临时文件再改名，整档原子覆盖）
    pub fn save(&self, record: &PlaceRecord) -> Result<()> {
        let path = self.file_path(&record.place_id);
        let json = serde_json::to_string_pretty(record)
            .with_context(|| format!("地点 {} 序列化失败", record.place_id))?;

        let tmp = tmp_path(&path);
        fs::write(&tmp, json)
            .with_context(|| format!("无法写入临时存档: {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("无法发布存档: {}", path.display()))?;

        debug!("存档已写入: {}", path.display());
        Ok(())
    }

    /// 输出目录
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
