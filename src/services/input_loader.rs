//! 地点清单载入 - 业务能力层
//!
//! 只负责"读清单、算剩余"，不触碰帐本文件

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// 清单中 Place ID 所在的列名
const PLACE_ID_COLUMN: &str = "Place ID";

/// 读取地点清单 CSV，返回去重后的有序 Place ID 列表
///
/// 清单缺失或格式损坏是致命错误；重复出现的 ID 保留首次出现的位置。
pub fn load_place_ids(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("无法读取清单文件: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("无法读取清单表头: {}", path.display()))?
        .clone();
    let column = headers
        .iter()
        .position(|h| h.trim() == PLACE_ID_COLUMN)
        .with_context(|| {
            format!(
                "清单文件缺少「{}」列: {}",
                PLACE_ID_COLUMN,
                path.display()
            )
        })?;

    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("清单文件解析失败: {}", path.display()))?;
        if let Some(id) = record.get(column) {
            let id = id.trim();
            if !id.is_empty() && seen.insert(id.to_string()) {
                ids.push(id.to_string());
            }
        }
    }

    info!("✓ 清单载入完成: {} 个地点 ({})", ids.len(), path.display());
    Ok(ids)
}

/// 过滤掉帐本中已完成的地点，保持原始顺序
pub fn remaining(all_ids: &[String], done: &HashSet<String>) -> Vec<String> {
    all_ids
        .iter()
        .filter(|id| !done.contains(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("清單.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_keeps_order_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "Name,Place ID\n甲,ChIJ-aaa\n乙,ChIJ-bbb\n丙,ChIJ-aaa\n丁,ChIJ-ccc\n",
        );

        let ids = load_place_ids(&path).unwrap();
        assert_eq!(ids, vec!["ChIJ-aaa", "ChIJ-bbb", "ChIJ-ccc"]);
    }

    #[test]
    fn test_blank_values_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "Place ID\nChIJ-aaa\n\nChIJ-bbb\n");

        let ids = load_place_ids(&path).unwrap();
        assert_eq!(ids, vec!["ChIJ-aaa", "ChIJ-bbb"]);
    }

    #[test]
    fn test_missing_column_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "Name\n甲\n");

        assert!(load_place_ids(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_place_ids("/不存在/清單.csv").is_err());
    }

    #[test]
    fn test_remaining_is_list_minus_ledger() {
        let all: Vec<String> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let done: HashSet<String> = ["b", "d"].iter().map(|s| s.to_string()).collect();

        assert_eq!(remaining(&all, &done), vec!["a", "c", "e"]);
        assert_eq!(remaining(&all, &HashSet::new()), all);

        let all_done: HashSet<String> = all.iter().cloned().collect();
        assert!(remaining(&all, &all_done).is_empty());
    }
}
