//! 业务能力层
//!
//! 描述"我能做什么"，每个服务只处理单一能力，不关心流程顺序。

pub mod artifact_store;
pub mod input_loader;
pub mod place_fetcher;
pub mod progress_ledger;

pub use artifact_store::ArtifactStore;
pub use place_fetcher::{PlaceFetch, PlaceFetcher};
pub use progress_ledger::{ProgressLedger, ShadowRecord};
