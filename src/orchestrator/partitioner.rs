//! 区块划分 - 编排层

use anyhow::{bail, Result};

/// 把剩余清单按原始顺序切成至多 `worker_count` 个连续区块
///
/// 区块大小为 `ceil(len / worker_count)`，最后一个区块可能较短。
/// 所有区块依序串接正好等于输入清单：不重复、不遗漏、不换序。
pub fn partition(remaining: Vec<String>, worker_count: usize) -> Result<Vec<Vec<String>>> {
    if worker_count == 0 {
        bail!("工作者数量必须大于 0");
    }
    if remaining.is_empty() {
        return Ok(Vec::new());
    }

    let chunk_size = (remaining.len() + worker_count - 1) / worker_count;
    Ok(remaining
        .chunks(chunk_size)
        .map(|chunk| chunk.to_vec())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("ChIJ-{:03}", i)).collect()
    }

    #[test]
    fn test_zero_workers_is_error() {
        assert!(partition(ids(3), 0).is_err());
    }

    #[test]
    fn test_empty_remaining_yields_no_chunks() {
        assert!(partition(Vec::new(), 4).unwrap().is_empty());
    }

    #[test]
    fn test_five_items_two_workers() {
        // 5 个地点 2 个工作者 → [3, 2]
        let chunks = partition(ids(5), 2).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 3);
        assert_eq!(chunks[1].len(), 2);
    }

    #[test]
    fn test_concatenation_equals_input() {
        for (n, workers) in [(1, 1), (5, 2), (7, 3), (10, 4), (100, 6), (3, 5)] {
            let input = ids(n);
            let chunks = partition(input.clone(), workers).unwrap();

            assert!(chunks.len() <= workers);
            let rejoined: Vec<String> = chunks.into_iter().flatten().collect();
            assert_eq!(rejoined, input, "n={} workers={}", n, workers);
        }
    }

    #[test]
    fn test_more_workers_than_items() {
        // 工作者多于地点时每个区块一个地点，不产生空区块
        let chunks = partition(ids(3), 10).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 1));
    }
}
