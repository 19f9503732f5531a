//! 工作者 - 编排层
//!
//! 一个工作者对应一个区块与一个专属浏览器分页。
//! 分页在任务内取得，取得失败只终止本工作者，不波及其他工作者。

use std::path::Path;
use std::sync::Arc;

use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::services::artifact_store::ArtifactStore;
use crate::services::place_fetcher::PlaceFetcher;
use crate::services::progress_ledger::{ProgressLedger, ShadowRecord};
use crate::workflow::chunk_flow::{self, ChunkStats};

/// 工作者结束后交回编排器的报告
#[derive(Debug)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub stats: ChunkStats,
    /// 工作者的暂存记录；合并与删除由编排器负责
    pub shadow: ShadowRecord,
    /// 会话取得失败（区块一个都没处理）时为 true
    pub startup_failed: bool,
}

/// 运行单个工作者：取得会话 → 逐项处理区块 → 释放会话
pub async fn run_worker(
    browser: Arc<Browser>,
    worker_id: usize,
    chunk: Vec<String>,
    config: Config,
) -> WorkerReport {
    let data_dir = Path::new(&config.data_dir);
    let store = ArtifactStore::new(data_dir.join(config.category.output_dir()));
    let ledger = ProgressLedger::new(
        data_dir.join(config.category.ledger_file()),
        format!("worker_{}", worker_id),
    );
    let mut shadow = ShadowRecord::new(ledger.shadow_path(worker_id));

    info!("[工作者 {}] 启动，分到 {} 个地点", worker_id, chunk.len());

    // 取得专属分页；失败回报零进度，区块整个留给下一轮
    let page = match browser.new_page("about:blank").await {
        Ok(page) => page,
        Err(e) => {
            error!("[工作者 {}] ❌ 无法建立分页，工作者终止: {}", worker_id, e);
            return WorkerReport {
                worker_id,
                stats: ChunkStats::default(),
                shadow,
                startup_failed: true,
            };
        }
    };

    let fetcher = PlaceFetcher::new(page, config.page_wait_ms);

    let stats =
        chunk_flow::process_chunk(worker_id, &fetcher, &store, &ledger, &mut shadow, &chunk)
            .await;

    // 释放分页；失败不影响已完成的进度
    if let Err(e) = fetcher.close().await {
        warn!("[工作者 {}] 分页关闭失败: {}", worker_id, e);
    }

    info!(
        "[工作者 {}] ✅ 区块处理完成: 抓取 {}, 跳过 {}, 失败 {}",
        worker_id, stats.fetched, stats.skipped, stats.failed
    );

    WorkerReport {
        worker_id,
        stats,
        shadow,
        startup_failed: false,
    }
}
