//! Core queue implementation - Shared header, cursor arithmetic and slot access
//!
//! 核心队列实现 - 共享头部、游标运算与槽位访问
//!
//! This module holds everything both halves of the queue agree on:
//! - The header (element size, element count, write and read cursors) and the slot arena
//! - Wraparound arithmetic for cursors living in `[0, element_count)`
//! - The contiguous-availability formulas reported by `write_begin` / `read_begin`
//! - Wrap-aware bulk byte copies
//!
//! 此模块包含队列两端共同依赖的内容：
//! - 头部（元素大小、元素数量、写游标、读游标）与槽位字节区
//! - 位于 `[0, element_count)` 的游标环绕运算
//! - `write_begin` / `read_begin` 报告的连续可用数量公式
//! - 处理环绕的批量字节拷贝

use super::error::CreateError;
use super::shim::atomic::AtomicUsize;
use super::storage::SlotStorage;

/// Core queue storage structure
///
/// 核心队列存储结构
///
/// # Type Parameters
/// - `N`: Inline threshold in bytes (slot arena stored inline when its size ≤ N)
///
/// # 类型参数
/// - `N`: 内联阈值（字节），当槽位字节区大小 ≤ N 时内联存储
pub(crate) struct QueueCore<const N: usize> {
    /// Size of one slot in bytes
    ///
    /// 单个槽位的字节大小
    element_size: usize,

    /// Number of slots, one of which always stays free
    ///
    /// 槽位数量，其中一个始终保持空闲
    element_count: usize,

    /// Next slot the producer fills, in `[0, element_count)`
    ///
    /// 生产者下一个写入的槽位，位于 `[0, element_count)`
    write_head: AtomicUsize,

    /// Oldest unread slot, in `[0, element_count)`
    ///
    /// 最早的未读槽位，位于 `[0, element_count)`
    read_tail: AtomicUsize,

    /// Slot arena of `element_size * element_count` bytes
    ///
    /// `element_size * element_count` 字节的槽位字节区
    storage: SlotStorage<N>,
}

impl<const N: usize> QueueCore<N> {
    /// Create a zero-filled queue core
    ///
    /// 创建清零的队列核心
    ///
    /// # Panics
    /// Panics if `element_size == 0` or `element_count <= 2`.
    ///
    /// # 恐慌
    /// 当 `element_size == 0` 或 `element_count <= 2` 时恐慌。
    pub fn new(element_size: usize, element_count: usize) -> Result<Self, CreateError> {
        assert!(element_size > 0, "element_size must be non-zero");
        assert!(element_count > 2, "element_count must be greater than 2");

        let bytes = element_size
            .checked_mul(element_count)
            .ok_or(CreateError::CapacityOverflow {
                element_size,
                element_count,
            })?;

        let storage = SlotStorage::zeroed(bytes).inspect_err(|err| {
            tracing::warn!(element_size, element_count, %err, "slot arena allocation failed");
        })?;

        tracing::debug!(
            element_size,
            element_count,
            inline = storage.is_inline(),
            "circular queue created"
        );

        Ok(Self {
            element_size,
            element_count,
            write_head: AtomicUsize::new(0),
            read_tail: AtomicUsize::new(0),
            storage,
        })
    }

    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Usable capacity, always `element_count - 1`
    ///
    /// 可用容量，始终为 `element_count - 1`
    #[inline]
    pub fn capacity(&self) -> usize {
        self.element_count - 1
    }

    #[inline]
    pub fn write_head(&self) -> &AtomicUsize {
        &self.write_head
    }

    #[inline]
    pub fn read_tail(&self) -> &AtomicUsize {
        &self.read_tail
    }

    /// Borrow `count` consecutive slots starting at `index`
    ///
    /// 借用从 `index` 开始的 `count` 个连续槽位
    ///
    /// # Safety
    /// Caller must ensure:
    /// - `index + count <= element_count`
    /// - The producer is not writing any of these slots
    ///
    /// # 安全性
    /// 调用者必须确保：
    /// - `index + count <= element_count`
    /// - 生产者没有在写入这些槽位
    #[inline]
    pub unsafe fn slots(&self, index: usize, count: usize) -> &[u8] {
        debug_assert!(index + count <= self.element_count);
        unsafe {
            self.storage
                .bytes(index * self.element_size, count * self.element_size)
        }
    }

    /// Mutably borrow `count` consecutive slots starting at `index`
    ///
    /// 可变借用从 `index` 开始的 `count` 个连续槽位
    ///
    /// # Safety
    /// Caller must ensure:
    /// - `index + count <= element_count`
    /// - None of these slots is published and unread
    ///
    /// # 安全性
    /// 调用者必须确保：
    /// - `index + count <= element_count`
    /// - 这些槽位都不是已发布且未读取的槽位
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn slots_mut(&self, index: usize, count: usize) -> &mut [u8] {
        debug_assert!(index + count <= self.element_count);
        unsafe {
            self.storage
                .bytes_mut(index * self.element_size, count * self.element_size)
        }
    }

    /// Copy whole records from `src` into the slots starting at `start`
    ///
    /// 将 `src` 中的完整记录拷贝到从 `start` 开始的槽位
    ///
    /// Splits into two copies when the run crosses the physical end of the arena.
    ///
    /// 当写入跨越字节区末尾时分成两次拷贝。
    ///
    /// # Safety
    /// Caller must ensure:
    /// - `src.len()` is a multiple of `element_size`
    /// - Every slot in the run is free
    ///
    /// # 安全性
    /// 调用者必须确保：
    /// - `src.len()` 是 `element_size` 的整数倍
    /// - 写入范围内的每个槽位都是空闲的
    pub unsafe fn copy_in(&self, start: usize, src: &[u8]) {
        let records = src.len() / self.element_size;
        let first = records.min(self.element_count - start);
        let split = first * self.element_size;

        unsafe {
            self.slots_mut(start, first).copy_from_slice(&src[..split]);
            if records > first {
                self.slots_mut(0, records - first)
                    .copy_from_slice(&src[split..]);
            }
        }
    }

    /// Copy whole records from the slots starting at `start` into `dest`
    ///
    /// 将从 `start` 开始的槽位中的完整记录拷贝到 `dest`
    ///
    /// # Safety
    /// Caller must ensure:
    /// - `dest.len()` is a multiple of `element_size`
    /// - Every slot in the run is published and unread
    ///
    /// # 安全性
    /// 调用者必须确保：
    /// - `dest.len()` 是 `element_size` 的整数倍
    /// - 读取范围内的每个槽位都已发布且未读取
    pub unsafe fn copy_out(&self, start: usize, dest: &mut [u8]) {
        let records = dest.len() / self.element_size;
        let first = records.min(self.element_count - start);
        let split = first * self.element_size;

        unsafe {
            dest[..split].copy_from_slice(self.slots(start, first));
            if records > first {
                dest[split..].copy_from_slice(self.slots(0, records - first));
            }
        }
    }
}

/// Advance a cursor by `n` slots, normalizing `count` to zero
///
/// 将游标前进 `n` 个槽位，等于 `count` 时归零
///
/// The result is `cur + n`, normalized to `0` exactly when the sum equals
/// `count`. For `n > 0` the result is therefore either greater than `cur` or
/// zero. `n == 0` returns `cur` unchanged and callers treat it as a no-op.
///
/// 结果为 `cur + n`，仅当和等于 `count` 时归零。因此当 `n > 0` 时结果要么大于
/// `cur`，要么为零。`n == 0` 原样返回 `cur`，调用方将其视为空操作。
///
/// # Panics
/// Panics if `cur + n > count` or `n >= count`.
///
/// # 恐慌
/// 当 `cur + n > count` 或 `n >= count` 时恐慌。
#[inline]
pub(crate) fn advance(cur: usize, n: usize, count: usize) -> usize {
    debug_assert!(cur < count);
    assert!(n < count && n <= count - cur, "cursor advanced past the slot count");

    let next = cur + n;
    if next == count { 0 } else { next }
}

/// Advance a cursor by `n < count` slots, crossing the physical end at most once
///
/// 将游标前进 `n < count` 个槽位，最多跨越一次末尾
#[inline]
pub(crate) fn advance_wrapping(cur: usize, n: usize, count: usize) -> usize {
    let first = n.min(count - cur);
    let mid = advance(cur, first, count);
    if n > first {
        advance(mid, n - first, count)
    } else {
        mid
    }
}

/// Slots the producer may fill in one pass starting at `write`
///
/// 生产者从 `write` 开始一次可写入的连续槽位数
///
/// Room to the physical end while the reader is at or behind the writer,
/// otherwise room up to one slot before the reader. A reader parked at index 0
/// takes the last physical slot away, since filling it would wrap the writer
/// onto the reader.
///
/// 读者不超前于写者时为到末尾的空间，否则为到读者前一个槽位的空间。
/// 读者位于索引 0 时需扣除最后一个物理槽位，否则写满会让写者环绕到读者位置。
#[inline]
pub(crate) fn write_contiguous(write: usize, read: usize, count: usize) -> usize {
    if read <= write {
        let to_end = count - write;
        if read == 0 { to_end - 1 } else { to_end }
    } else {
        read - write - 1
    }
}

/// Published slots the consumer may read in one pass starting at `read`
///
/// 消费者从 `read` 开始一次可读取的已发布连续槽位数
#[inline]
pub(crate) fn read_contiguous(write: usize, read: usize, count: usize) -> usize {
    if write >= read {
        write - read
    } else {
        count - read
    }
}

/// Published, unread slots between the two cursors
///
/// 两个游标之间已发布且未读取的槽位数
#[inline]
pub(crate) fn occupied(write: usize, read: usize, count: usize) -> usize {
    if write >= read {
        write - read
    } else {
        count - read + write
    }
}

// Slot access is partitioned by the cursors: the producer touches only free
// slots, the consumer only published ones.
unsafe impl<const N: usize> Send for QueueCore<N> {}
unsafe impl<const N: usize> Sync for QueueCore<N> {}
