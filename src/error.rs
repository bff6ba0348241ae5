//! Error types for queue creation and the two recoverable queue states
//!
//! 队列创建错误以及两种可恢复的队列状态

use std::collections::TryReserveError;
use thiserror::Error;

/// Queue creation error
///
/// 队列创建错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    /// `element_size * element_count` does not fit in `usize`
    ///
    /// `element_size * element_count` 超出 `usize` 范围
    #[error("slot arena of {element_count} x {element_size} bytes overflows usize")]
    CapacityOverflow {
        element_size: usize,
        element_count: usize,
    },

    /// The heap arena could not be allocated
    ///
    /// 无法分配堆字节区
    #[error("failed to allocate slot arena: {0}")]
    Alloc(#[from] TryReserveError),
}

/// A single-record commit would collide with the consumer
///
/// 单条记录提交会与消费者冲突
///
/// Nothing was published. Bytes already written into the reserved slot stay in
/// place and are handed back by the next `write_begin`.
///
/// 未发布任何数据。已写入预留槽位的字节保持不变，下一次 `write_begin` 会再次返回该槽位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is full")]
pub struct Full;

/// No published record is available to read
///
/// 没有可读取的已发布记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is empty")]
pub struct Empty;
