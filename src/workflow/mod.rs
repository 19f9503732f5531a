//! 流程层
//!
//! 定义一个区块从头到尾的处理顺序，不持有资源、不管理并发。

pub mod chunk_flow;

pub use chunk_flow::{process_chunk, ChunkStats};
