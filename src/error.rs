//! 错误类型定义
//!
//! 按传播范围分类：
//! - `FetchError::Item` 只影响单个地点，记录日志后循环继续
//! - `FetchError::Session` 使工作者的浏览器会话失效，该工作者终止
//! - `LedgerConflict` 不向调用方传播失败，降级写入工作者的暂存记录

use thiserror::Error;

/// 抓取单个地点时的错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 浏览器会话层错误（CDP 传输失败），对该工作者是致命的
    #[error("浏览器会话失效: {0}")]
    Session(anyhow::Error),

    /// 单个地点抓取失败，跳过该地点即可
    #[error("地点 {place_id} 抓取失败: {reason}")]
    Item { place_id: String, reason: String },
}

impl FetchError {
    /// 创建会话级别的错误
    pub fn session(err: impl Into<anyhow::Error>) -> Self {
        FetchError::Session(err.into())
    }

    /// 创建单个地点级别的错误
    pub fn item(place_id: impl Into<String>, reason: impl Into<String>) -> Self {
        FetchError::Item {
            place_id: place_id.into(),
            reason: reason.into(),
        }
    }

    /// 该错误是否终止整个工作者
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, FetchError::Session(_))
    }
}

/// 进度帐本写入冲突
///
/// 帐本文件没有跨进程锁，`add` 检测到无法安全完成读-改-写时返回本错误。
/// 调用方应把该 ID 写入暂存记录，由编排器在收尾阶段统一合并。
#[derive(Debug, Error)]
#[error("进度帐本写入冲突: {reason}")]
pub struct LedgerConflict {
    pub reason: String,
}

impl LedgerConflict {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for LedgerConflict {
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("IO 错误: {}", err))
    }
}

impl From<serde_json::Error> for LedgerConflict {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON 解析错误: {}", err))
    }
}
