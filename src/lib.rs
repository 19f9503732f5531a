//! # Map Place Scraper
//!
//! 并行抓取 Google 地图地点详细资料的 Rust 应用程序。
//! 清单固定、来源缓慢且常出错，所以重点在"可断点续跑"：
//! 已完成的地点记在进度帐本里，重跑只处理缺的部分。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 navigate() / eval() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个地点
//! - `PlaceFetcher` - 把 Place ID 变成详细资料的能力
//! - `ArtifactStore` - 一个地点一个 JSON 存档的能力
//! - `ProgressLedger` - 记录与合并完成进度的能力
//! - `input_loader` - 读清单、算剩余的能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个区块"的完整处理流程
//! - `chunk_flow` - 流程编排（skip → fetch → store → ledger）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 一轮抓取的生命周期与收尾对帐
//! - `orchestrator/partitioner` - 剩余清单的区块划分
//! - `orchestrator/worker` - 工作者任务，管理专属分页
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{connect_to_browser, launch_headless_browser};
pub use config::Config;
pub use error::{FetchError, LedgerConflict};
pub use infrastructure::JsExecutor;
pub use models::{Category, PlaceRecord};
pub use orchestrator::{App, RunSummary};
pub use services::{ArtifactStore, PlaceFetch, PlaceFetcher, ProgressLedger, ShadowRecord};
pub use workflow::{process_chunk, ChunkStats};
