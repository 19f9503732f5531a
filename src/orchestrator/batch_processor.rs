//! 批量地点处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一轮抓取的完整生命周期。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、接入浏览器
//! 2. **进度装载**：恢复暂存记录 → 读清单与帐本 → 算出剩余
//! 3. **区块划分**：把剩余清单切给各工作者
//! 4. **工作者派发**：每个非空区块一个 tokio 任务，各自专属分页
//! 5. **收尾对帐**：等全部工作者结束，把暂存记录并入帐本后才删文件
//! 6. **全局统计**：汇总各工作者的处理结果
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **无中途协调**：工作者之间不互相等待，所有共享状态都走文件
//! - **单项失败不拉闸**：只有装载阶段的错误会让整轮失败

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::orchestrator::partitioner;
use crate::orchestrator::worker::{self, WorkerReport};
use crate::services::input_loader;
use crate::services::progress_ledger::ProgressLedger;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    browser: Arc<Browser>,
}

/// 单轮运行结果汇总
#[derive(Debug, Default)]
pub struct RunSummary {
    /// 清单总数
    pub total: usize,
    /// 本轮开跑时的待处理数
    pub remaining: usize,
    /// 实际抓取数
    pub fetched: usize,
    /// 已有存档而跳过的数量
    pub skipped: usize,
    /// 单项失败数（下一轮重试）
    pub failed: usize,
    /// 异常终止的工作者数（会话取得失败或中途失效）
    pub workers_failed: usize,
    /// 启动时从暂存记录恢复的 ID 数
    pub recovered: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file, config.category.name())?;
        log_startup(&config);

        // 接入浏览器
        let browser = if config.headless {
            browser::launch_headless_browser().await?
        } else {
            browser::connect_to_browser(config.browser_debug_port).await?
        };

        Ok(Self {
            config,
            browser: Arc::new(browser),
        })
    }

    /// 运行一轮抓取
    pub async fn run(&self) -> Result<RunSummary> {
        let config = &self.config;
        if config.worker_count == 0 {
            bail!("工作者数量必须大于 0");
        }

        let data_dir = Path::new(&config.data_dir);
        let output_dir = data_dir.join(config.category.output_dir());
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("无法建立输出目录: {}", output_dir.display()))?;

        let ledger =
            ProgressLedger::new(data_dir.join(config.category.ledger_file()), "main");

        let mut summary = RunSummary::default();

        // 先把上一轮异常退出留下的暂存记录并回帐本
        summary.recovered = ledger.recover_shadows()?;
        if summary.recovered > 0 {
            info!("♻️ 从暂存记录恢复了 {} 笔完成记录", summary.recovered);
        }

        // 装载清单与帐本，计算剩余
        let all_ids = input_loader::load_place_ids(&config.input_file)?;
        let done = ledger.load_set()?;
        let remaining = input_loader::remaining(&all_ids, &done);

        summary.total = all_ids.len();
        summary.remaining = remaining.len();
        log_progress_loaded(all_ids.len(), done.len(), remaining.len());

        if remaining.is_empty() {
            info!("✅ 没有需要抓取的地点，程序结束");
            return Ok(summary);
        }

        // 划分区块并派发工作者
        let chunks = partitioner::partition(remaining, config.worker_count)?;
        log_dispatch(&chunks);

        let mut handles = Vec::new();
        for (index, chunk) in chunks.into_iter().enumerate() {
            if chunk.is_empty() {
                continue;
            }
            handles.push(tokio::spawn(worker::run_worker(
                self.browser.clone(),
                index + 1,
                chunk,
                config.clone(),
            )));
        }

        // 等待所有工作者结束（正常或异常），收集报告
        let mut reports = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!("工作者任务执行失败: {}", e);
                    summary.workers_failed += 1;
                }
            }
        }

        // 收尾对帐：合并全部暂存记录，确认成功后才删除文件
        reconcile(&ledger, reports, &mut summary);

        print_final_stats(&summary, config);
        Ok(summary)
    }
}

/// 汇总工作者报告，并把各自的暂存记录并入帐本
///
/// 合并失败的暂存文件保留原样，下一轮启动时再恢复；
/// 先删文件后合并等于丢进度，这里的顺序不可对调。
fn reconcile(ledger: &ProgressLedger, reports: Vec<WorkerReport>, summary: &mut RunSummary) {
    for report in reports {
        summary.fetched += report.stats.fetched;
        summary.skipped += report.stats.skipped;
        summary.failed += report.stats.failed;
        if report.startup_failed || report.stats.session_aborted {
            summary.workers_failed += 1;
        }

        let shadow = report.shadow;
        if shadow.is_empty() {
            continue;
        }

        match ledger.merge(shadow.ids()) {
            Ok(()) => {
                info!(
                    "[工作者 {}] 暂存记录已并入帐本 ({} 笔)",
                    report.worker_id,
                    shadow.ids().len()
                );
                if let Err(e) = shadow.remove_file() {
                    warn!(
                        "[工作者 {}] 暂存文件删除失败（已合并，进度无损）: {}",
                        report.worker_id, e
                    );
                }
            }
            Err(e) => {
                error!(
                    "[工作者 {}] ❌ 暂存记录合并失败，文件保留待下一轮恢复: {}",
                    report.worker_id, e
                );
            }
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 并行地点抓取模式");
    info!("📋 类别: {}", config.category);
    info!("📊 工作者数量: {}", config.worker_count);
    info!("{}", "=".repeat(60));
}

fn log_progress_loaded(total: usize, done: usize, remaining: usize) {
    info!("✓ 清单共 {} 个地点，帐本已记录 {} 个", total, done);
    info!("📦 本轮待抓取: {} 个\n", remaining);
}

fn log_dispatch(chunks: &[Vec<String>]) {
    info!("\n{}", "=".repeat(60));
    info!("📤 派发 {} 个工作者", chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        info!("📄 工作者 {}: {} 个地点", index + 1, chunk.len());
    }
    info!("{}", "=".repeat(60));
}

fn print_final_stats(summary: &RunSummary, config: &Config) {
    let unfinished = summary
        .remaining
        .saturating_sub(summary.fetched + summary.skipped);

    info!("\n{}", "=".repeat(60));
    info!("📊 本轮抓取统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 抓取: {}", summary.fetched);
    info!("⏭️ 跳过: {}", summary.skipped);
    info!("❌ 失败: {}", summary.failed);
    if summary.workers_failed > 0 {
        info!("⚠️ 异常终止的工作者: {}", summary.workers_failed);
    }
    info!("剩余未完成: {}（下一轮继续）", unfinished);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::progress_ledger::ShadowRecord;
    use crate::workflow::ChunkStats;

    #[test]
    fn test_reconcile_merges_then_deletes_shadows() {
        // 两个工作者的暂存集合 {a,b} 与 {b,c}：合并后帐本应是 {a,b,c}，
        // 且两个暂存文件都在合并成功之后被删除
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::new(dir.path().join("爬過的餐廳ID.json"), "main");

        let mut shadow1 = ShadowRecord::new(ledger.shadow_path(1));
        shadow1.record("a").unwrap();
        shadow1.record("b").unwrap();
        let mut shadow2 = ShadowRecord::new(ledger.shadow_path(2));
        shadow2.record("b").unwrap();
        shadow2.record("c").unwrap();

        let reports = vec![
            WorkerReport {
                worker_id: 1,
                stats: ChunkStats {
                    fetched: 2,
                    ..Default::default()
                },
                shadow: shadow1,
                startup_failed: false,
            },
            WorkerReport {
                worker_id: 2,
                stats: ChunkStats {
                    fetched: 2,
                    ..Default::default()
                },
                shadow: shadow2,
                startup_failed: false,
            },
        ];

        let mut summary = RunSummary::default();
        reconcile(&ledger, reports, &mut summary);

        assert_eq!(summary.fetched, 4);
        let all = ledger.load_set().unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.contains("a") && all.contains("b") && all.contains("c"));
        assert!(!ledger.shadow_path(1).exists());
        assert!(!ledger.shadow_path(2).exists());
    }

    #[test]
    fn test_reconcile_keeps_shadow_when_merge_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ledger_path = dir.path().join("爬過的餐廳ID.json");
        // 帐本路径被占成目录，merge 必然失败
        fs::create_dir(&ledger_path).unwrap();
        let ledger = ProgressLedger::new(&ledger_path, "main");

        let mut shadow =
            ShadowRecord::new(dir.path().join("temp_爬過的餐廳ID_worker_1.json"));
        shadow.record("a").unwrap();
        let shadow_path = shadow.path().to_path_buf();

        let reports = vec![WorkerReport {
            worker_id: 1,
            stats: ChunkStats::default(),
            shadow,
            startup_failed: false,
        }];
        let mut summary = RunSummary::default();
        reconcile(&ledger, reports, &mut summary);

        // 合并没成功，暂存文件必须原地保留
        assert!(shadow_path.exists());
    }
}
