//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一轮抓取的调度与资源管理，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量地点处理器
//! - 管理应用生命周期（初始化、运行、收尾对帐）
//! - 装载清单与帐本、计算剩余
//! - 管理浏览器资源（Browser）
//! - 输出全局统计信息
//!
//! ### `partitioner` - 区块划分
//! - 把剩余清单切成连续、不重叠的区块
//!
//! ### `worker` - 工作者
//! - 一个区块一个工作者，各自专属分页
//! - 结束后交回统计与暂存记录
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (一轮抓取)
//!     ↓
//! worker (一个区块)
//!     ↓
//! workflow::chunk_flow (区块内逐项流程)
//!     ↓
//! services (能力层：fetch / store / ledger)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管整轮，worker 管单个区块
//! 2. **资源隔离**：Browser 只在编排层，分页只在各自工作者手里
//! 3. **文件即协调**：工作者之间没有内存共享，全部协调走帐本与暂存文件

pub mod batch_processor;
pub mod partitioner;
pub mod worker;

// 重新导出主要类型
pub use batch_processor::{App, RunSummary};
pub use worker::WorkerReport;
