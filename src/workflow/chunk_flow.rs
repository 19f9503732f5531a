//! 区块处理流程 - 流程层
//!
//! 一个工作者对分到的区块逐项执行：
//! 跳过已有存档 → 抓取 → 落盘 → 记入帐本（冲突降级暂存）。
//! 单个地点失败不中断区块；会话失效立即终止并保留已完成的进度。

use tracing::{error, info, warn};

use crate::services::artifact_store::ArtifactStore;
use crate::services::place_fetcher::PlaceFetch;
use crate::services::progress_ledger::{ProgressLedger, ShadowRecord};

/// 区块处理统计
#[derive(Debug, Default)]
pub struct ChunkStats {
    /// 本轮实际抓取并落盘的地点数
    pub fetched: usize,
    /// 已有存档直接跳过的地点数
    pub skipped: usize,
    /// 单项失败（留给下一轮重试）的地点数
    pub failed: usize,
    /// 会话失效导致区块中断时为 true，余下地点留给下一轮
    pub session_aborted: bool,
}

/// 逐项处理一个区块，顺序即划分时的顺序
pub async fn process_chunk<F: PlaceFetch>(
    worker_id: usize,
    fetcher: &F,
    store: &ArtifactStore,
    ledger: &ProgressLedger,
    shadow: &mut ShadowRecord,
    chunk: &[String],
) -> ChunkStats {
    let mut stats = ChunkStats::default();
    let total = chunk.len();

    for (index, place_id) in chunk.iter().enumerate() {
        info!(
            "[工作者 {}] 处理第 {}/{} 个地点: {}",
            worker_id,
            index + 1,
            total,
            place_id
        );

        // 已有存档就视为完成，顺带补记帐本（帐本与文件系统可能不同步）
        if store.exists(place_id) {
            info!("[工作者 {}] ⏭️ 地点 {} 已有存档，跳过", worker_id, place_id);
            record_done(worker_id, place_id, ledger, shadow);
            stats.skipped += 1;
            continue;
        }

        // 单项失败记录后继续；会话失效则整个区块终止
        let record = match fetcher.fetch(place_id).await {
            Ok(record) => record,
            Err(e) if e.is_session_fatal() => {
                error!("[工作者 {}] ❌ 会话失效，区块中断: {}", worker_id, e);
                stats.session_aborted = true;
                break;
            }
            Err(e) => {
                warn!("[工作者 {}] ⚠️ {}", worker_id, e);
                stats.failed += 1;
                continue;
            }
        };

        // 存档失败同样只影响单项：没写成存档就不记帐本，下一轮重抓
        if let Err(e) = store.save(&record) {
            error!("[工作者 {}] 地点 {} 存档失败: {}", worker_id, place_id, e);
            stats.failed += 1;
            continue;
        }

        record_done(worker_id, place_id, ledger, shadow);
        stats.fetched += 1;
    }

    stats
}

/// 把完成事实记入帐本；写入冲突降级到暂存记录
fn record_done(
    worker_id: usize,
    place_id: &str,
    ledger: &ProgressLedger,
    shadow: &mut ShadowRecord,
) {
    match ledger.add(place_id) {
        Ok(()) => {}
        Err(conflict) => {
            warn!(
                "[工作者 {}] {}，转记暂存记录: {}",
                worker_id, conflict, place_id
            );
            if let Err(e) = shadow.record(place_id) {
                // 存档已写成；帐本与暂存都失败时，下一轮靠存档跳过兜底
                error!("[工作者 {}] 暂存记录写入失败: {}", worker_id, e);
            }
        }
    }
}
