//! Lock-free SPSC circular queue of fixed-size byte records
//!
//! 定长字节记录的无锁 SPSC 环形队列
//!
//! The queue is split into a `Producer` and a `Consumer` that share one core.
//! Each half owns one cursor: the producer moves `write_head`, the consumer moves
//! `read_tail`, and each only reads the other's. Slots are handed out in place
//! through reservation guards that borrow their half mutably, so at most one
//! reservation per side exists and no slot reference survives its commit.
//!
//! 队列被拆分为共享同一核心的 `Producer` 和 `Consumer`。每一端只拥有一个游标：
//! 生产者移动 `write_head`，消费者移动 `read_tail`，并且只读取对方的游标。
//! 槽位通过可变借用所属端的预留守卫原地交出，因此每端最多只有一个预留，
//! 并且槽位引用不会在提交后继续存在。

use std::fmt;
use std::num::NonZero;

use super::core::{
    QueueCore, advance, advance_wrapping, occupied, read_contiguous, write_contiguous,
};
use super::error::{CreateError, Empty, Full};
use super::shim::atomic::Ordering;
use super::shim::sync::Arc;

/// Producer half of the queue
///
/// 队列的生产者端
///
/// # Type Parameters
/// - `N`: Inline threshold in bytes
///
/// # 类型参数
/// - `N`: 内联阈值（字节）
pub struct Producer<const N: usize> {
    shared: Arc<QueueCore<N>>,
}

/// Consumer half of the queue
///
/// 队列的消费者端
///
/// # Type Parameters
/// - `N`: Inline threshold in bytes
///
/// # 类型参数
/// - `N`: 内联阈值（字节）
pub struct Consumer<const N: usize> {
    shared: Arc<QueueCore<N>>,
}

/// Create a new queue of `element_count` slots of `element_size` bytes each
///
/// 创建包含 `element_count` 个槽位、每个槽位 `element_size` 字节的新队列
///
/// One slot always stays free to tell a full queue from an empty one, so the
/// usable capacity is `element_count - 1`. The slot arena is zero-filled and
/// never reallocated.
///
/// 始终保留一个空闲槽位以区分满和空，因此可用容量为 `element_count - 1`。
/// 槽位字节区清零后不再重新分配。
///
/// # Type Parameters
/// - `N`: Inline threshold in bytes (the arena shares the header's allocation
///   when `element_size * element_count ≤ N`, heap otherwise)
///
/// # Parameters
/// - `element_size`: Size of one record in bytes
/// - `element_count`: Number of slots, must be greater than 2
///
/// # Returns
/// A tuple of (Producer, Consumer)
///
/// # 类型参数
/// - `N`: 内联阈值（字节），当 `element_size * element_count ≤ N` 时字节区与头部共享分配，否则使用堆
///
/// # 参数
/// - `element_size`: 单条记录的字节大小
/// - `element_count`: 槽位数量，必须大于 2
///
/// # 返回值
/// 返回 (Producer, Consumer) 元组
///
/// # Errors
/// Returns `CreateError` if the arena size overflows or cannot be allocated.
///
/// # Panics
/// Panics if `element_count <= 2`.
///
/// # 错误
/// 字节区大小溢出或无法分配时返回 `CreateError`。
///
/// # 恐慌
/// 当 `element_count <= 2` 时恐慌。
pub fn new<const N: usize>(
    element_size: NonZero<usize>,
    element_count: usize,
) -> Result<(Producer<N>, Consumer<N>), CreateError> {
    let core = QueueCore::new(element_size.get(), element_count)?;
    let shared = Arc::new(core);

    let producer = Producer {
        shared: shared.clone(),
    };
    let consumer = Consumer { shared };

    Ok((producer, consumer))
}

/// In-place write reservation on the slot at `write_head`
///
/// 位于 `write_head` 槽位的原地写入预留
///
/// Obtained from [`Producer::write_begin`]. Fill the slot (or the whole
/// contiguous run) and publish it with [`commit`](Self::commit) or
/// [`commit_n`](Self::commit_n). Dropping the reservation publishes nothing.
///
/// 通过 [`Producer::write_begin`] 获得。填充槽位（或整段连续区域）后使用
/// [`commit`](Self::commit) 或 [`commit_n`](Self::commit_n) 发布。直接丢弃预留不会发布任何内容。
pub struct WriteReservation<'a, const N: usize> {
    producer: &'a mut Producer<N>,
    index: usize,
    available: usize,
}

/// In-place read reservation on the slot at `read_tail`
///
/// 位于 `read_tail` 槽位的原地读取预留
///
/// Obtained from [`Consumer::read_begin`]. Inspect the slot (or the whole
/// contiguous run) and release it with [`commit`](Self::commit) or
/// [`commit_n`](Self::commit_n). Dropping the reservation releases nothing.
///
/// 通过 [`Consumer::read_begin`] 获得。查看槽位（或整段连续区域）后使用
/// [`commit`](Self::commit) 或 [`commit_n`](Self::commit_n) 释放。直接丢弃预留不会释放任何内容。
pub struct ReadReservation<'a, const N: usize> {
    consumer: &'a mut Consumer<N>,
    index: usize,
    available: usize,
}

impl<const N: usize> Producer<N> {
    /// Get the size of one record in bytes
    ///
    /// 获取单条记录的字节大小
    #[inline]
    pub fn element_size(&self) -> usize {
        self.shared.element_size()
    }

    /// Get the number of slots
    ///
    /// 获取槽位数量
    #[inline]
    pub fn element_count(&self) -> usize {
        self.shared.element_count()
    }

    /// Get the usable capacity (`element_count - 1`)
    ///
    /// 获取可用容量（`element_count - 1`）
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Get the number of published, unread records
    ///
    /// 获取已发布且未读取的记录数量
    #[inline]
    pub fn len(&self) -> usize {
        let write = self.shared.write_head().load(Ordering::Relaxed);
        let read = self.shared.read_tail().load(Ordering::Acquire);
        occupied(write, read, self.shared.element_count())
    }

    /// Check if the queue is empty
    ///
    /// 检查队列是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        let write = self.shared.write_head().load(Ordering::Relaxed);
        let read = self.shared.read_tail().load(Ordering::Acquire);
        write == read
    }

    /// Get the number of records that can still be published
    ///
    /// 获取仍可发布的记录数量
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.shared.capacity() - self.len()
    }

    /// Check if the queue is full
    ///
    /// 检查队列是否已满
    #[inline]
    pub fn is_full(&self) -> bool {
        let write = self.shared.write_head().load(Ordering::Relaxed);
        let read = self.shared.read_tail().load(Ordering::Acquire);
        advance(write, 1, self.shared.element_count()) == read
    }

    /// Reserve the slot at `write_head` for in-place filling
    ///
    /// 预留 `write_head` 处的槽位用于原地填充
    ///
    /// Never moves a cursor. Calling it again without committing hands back the
    /// same slot, its bytes untouched, and the same availability unless the
    /// consumer has released records in between.
    ///
    /// 不会移动任何游标。未提交时再次调用会返回同一槽位（字节不变）以及相同的可用数量，
    /// 除非消费者在此期间释放了记录。
    #[inline]
    pub fn write_begin(&mut self) -> WriteReservation<'_, N> {
        let write = self.shared.write_head().load(Ordering::Relaxed);
        let read = self.shared.read_tail().load(Ordering::Acquire);
        let available = write_contiguous(write, read, self.shared.element_count());

        WriteReservation {
            producer: self,
            index: write,
            available,
        }
    }

    /// Copy one record into the queue and publish it
    ///
    /// 将一条记录拷贝进队列并发布
    ///
    /// # Errors
    /// Returns `Full` if the queue is full
    ///
    /// # Panics
    /// Panics if `record.len() != element_size`
    ///
    /// # 错误
    /// 如果队列已满则返回 `Full`
    ///
    /// # 恐慌
    /// 当 `record.len() != element_size` 时恐慌
    #[inline]
    pub fn push(&mut self, record: &[u8]) -> Result<(), Full> {
        assert_eq!(
            record.len(),
            self.element_size(),
            "record length must equal element_size"
        );

        let mut reservation = self.write_begin();
        reservation.slot_mut().copy_from_slice(record);
        reservation.commit()
    }

    /// Copy as many whole records as fit from `records` and publish them at once
    ///
    /// 从 `records` 中拷贝尽可能多的完整记录并一次性发布
    ///
    /// The copy crosses the physical end of the arena when needed.
    ///
    /// 必要时拷贝会跨越字节区末尾。
    ///
    /// # Returns
    /// Number of records published (0 to `records.len() / element_size`)
    ///
    /// # Panics
    /// Panics if `records.len()` is not a multiple of `element_size`
    ///
    /// # 返回值
    /// 已发布的记录数量（0 到 `records.len() / element_size`）
    ///
    /// # 恐慌
    /// 当 `records.len()` 不是 `element_size` 的整数倍时恐慌
    pub fn push_slice(&mut self, records: &[u8]) -> usize {
        let core = &*self.shared;
        let element_size = core.element_size();
        assert!(
            records.len() % element_size == 0,
            "slice length must be a multiple of element_size"
        );

        let wanted = records.len() / element_size;
        if wanted == 0 {
            return 0;
        }

        let write = core.write_head().load(Ordering::Relaxed);
        let read = core.read_tail().load(Ordering::Acquire);
        let count = core.element_count();
        let free = core.capacity() - occupied(write, read, count);

        let to_push = wanted.min(free);
        if to_push == 0 {
            return 0;
        }

        // SAFETY: the run [write, write + to_push) is within the free region.
        unsafe {
            core.copy_in(write, &records[..to_push * element_size]);
        }

        core.write_head().store(
            advance_wrapping(write, to_push, count),
            Ordering::Release,
        );

        to_push
    }
}

impl<const N: usize> WriteReservation<'_, N> {
    /// Index of the reserved slot
    ///
    /// 预留槽位的索引
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of slots, starting at [`index`](Self::index), that can be
    /// committed in one pass without wrapping or reaching the consumer
    ///
    /// 从 [`index`](Self::index) 开始、无需环绕且不会触及消费者即可一次提交的槽位数
    #[inline]
    pub fn available(&self) -> usize {
        self.available
    }

    /// View the reserved slot
    ///
    /// 查看预留槽位
    #[inline]
    pub fn slot(&self) -> &[u8] {
        // SAFETY: the slot at write_head is never published, so the consumer
        // does not read it.
        unsafe { self.producer.shared.slots(self.index, 1) }
    }

    /// Mutably borrow the reserved slot
    ///
    /// 可变借用预留槽位
    #[inline]
    pub fn slot_mut(&mut self) -> &mut [u8] {
        // SAFETY: see `slot`.
        unsafe { self.producer.shared.slots_mut(self.index, 1) }
    }

    /// Mutably borrow the whole contiguous run of `available()` slots
    ///
    /// 可变借用 `available()` 个槽位组成的整段连续区域
    ///
    /// Empty when `available() == 0`.
    ///
    /// 当 `available() == 0` 时为空。
    #[inline]
    pub fn contiguous_mut(&mut self) -> &mut [u8] {
        // SAFETY: the run ends before the physical end and before the slot
        // preceding read_tail, so it holds no unread record.
        unsafe {
            self.producer
                .shared
                .slots_mut(self.index, self.available)
        }
    }

    /// Publish the reserved slot
    ///
    /// 发布预留槽位
    ///
    /// # Errors
    /// Returns `Full` without moving `write_head` if publishing would make the
    /// queue look empty. The slot contents are kept for a later retry.
    ///
    /// # 错误
    /// 如果发布会让队列看起来为空，则返回 `Full` 且不移动 `write_head`，槽位内容保留以便稍后重试。
    #[inline]
    pub fn commit(self) -> Result<(), Full> {
        self.commit_n(1)
    }

    /// Publish `n` slots starting at the reserved one
    ///
    /// 发布从预留槽位开始的 `n` 个槽位
    ///
    /// `n == 1` behaves like [`commit`](Self::commit). For `n > 1` the caller
    /// must stay within [`available`](Self::available); that run has already
    /// been validated against the consumer, so it never reports `Full`.
    /// `n == 0` publishes nothing.
    ///
    /// `n == 1` 与 [`commit`](Self::commit) 相同。`n > 1` 时调用方必须不超过
    /// [`available`](Self::available)；该区域已与消费者位置校验过，因此不会返回 `Full`。
    /// `n == 0` 不发布任何内容。
    ///
    /// # Errors
    /// Returns `Full` only when `n == 1` and the queue is full
    ///
    /// # Panics
    /// Panics in debug builds if `n > 1` and `n > available()`
    ///
    /// # 错误
    /// 仅当 `n == 1` 且队列已满时返回 `Full`
    ///
    /// # 恐慌
    /// 调试构建中当 `n > 1` 且 `n > available()` 时恐慌
    pub fn commit_n(self, n: usize) -> Result<(), Full> {
        let core = &*self.producer.shared;
        let count = core.element_count();

        match n {
            0 => Ok(()),
            1 => {
                let next = advance(self.index, 1, count);
                if next == core.read_tail().load(Ordering::Acquire) {
                    return Err(Full);
                }
                core.write_head().store(next, Ordering::Release);
                Ok(())
            }
            _ => {
                debug_assert!(
                    n <= self.available,
                    "committed {n} slots but only {} were available",
                    self.available
                );
                core.write_head()
                    .store(advance(self.index, n, count), Ordering::Release);
                Ok(())
            }
        }
    }
}

impl<const N: usize> Consumer<N> {
    /// Get the size of one record in bytes
    ///
    /// 获取单条记录的字节大小
    #[inline]
    pub fn element_size(&self) -> usize {
        self.shared.element_size()
    }

    /// Get the number of slots
    ///
    /// 获取槽位数量
    #[inline]
    pub fn element_count(&self) -> usize {
        self.shared.element_count()
    }

    /// Get the usable capacity (`element_count - 1`)
    ///
    /// 获取可用容量（`element_count - 1`）
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Get the number of published, unread records
    ///
    /// 获取已发布且未读取的记录数量
    #[inline]
    pub fn len(&self) -> usize {
        let read = self.shared.read_tail().load(Ordering::Relaxed);
        let write = self.shared.write_head().load(Ordering::Acquire);
        occupied(write, read, self.shared.element_count())
    }

    /// Check if the queue is empty
    ///
    /// 检查队列是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        let read = self.shared.read_tail().load(Ordering::Relaxed);
        let write = self.shared.write_head().load(Ordering::Acquire);
        read == write
    }

    /// Reserve the oldest unread slot for in-place reading
    ///
    /// 预留最早的未读槽位用于原地读取
    ///
    /// Returns `None` if the queue is empty. Never moves a cursor.
    ///
    /// 队列为空时返回 `None`。不会移动任何游标。
    #[inline]
    pub fn read_begin(&mut self) -> Option<ReadReservation<'_, N>> {
        let read = self.shared.read_tail().load(Ordering::Relaxed);
        let write = self.shared.write_head().load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let available = read_contiguous(write, read, self.shared.element_count());
        Some(ReadReservation {
            consumer: self,
            index: read,
            available,
        })
    }

    /// Copy the oldest record into `dest` and release it
    ///
    /// 将最早的记录拷贝到 `dest` 并释放
    ///
    /// # Errors
    /// Returns `Empty` if the queue is empty; `dest` is left untouched
    ///
    /// # Panics
    /// Panics if `dest.len() != element_size`
    ///
    /// # 错误
    /// 如果队列为空则返回 `Empty`，`dest` 保持不变
    ///
    /// # 恐慌
    /// 当 `dest.len() != element_size` 时恐慌
    #[inline]
    pub fn pop(&mut self, dest: &mut [u8]) -> Result<(), Empty> {
        assert_eq!(
            dest.len(),
            self.element_size(),
            "destination length must equal element_size"
        );

        let reservation = self.read_begin().ok_or(Empty)?;
        dest.copy_from_slice(reservation.slot());
        reservation.commit();
        Ok(())
    }

    /// Copy as many whole records as are published into `dest` and release them
    ///
    /// 将尽可能多的已发布完整记录拷贝到 `dest` 并释放
    ///
    /// # Returns
    /// Number of records copied (0 to `dest.len() / element_size`)
    ///
    /// # Panics
    /// Panics if `dest.len()` is not a multiple of `element_size`
    ///
    /// # 返回值
    /// 已拷贝的记录数量（0 到 `dest.len() / element_size`）
    ///
    /// # 恐慌
    /// 当 `dest.len()` 不是 `element_size` 的整数倍时恐慌
    pub fn pop_slice(&mut self, dest: &mut [u8]) -> usize {
        let core = &*self.shared;
        let element_size = core.element_size();
        assert!(
            dest.len() % element_size == 0,
            "slice length must be a multiple of element_size"
        );

        let wanted = dest.len() / element_size;
        if wanted == 0 {
            return 0;
        }

        let read = core.read_tail().load(Ordering::Relaxed);
        let write = core.write_head().load(Ordering::Acquire);
        let count = core.element_count();

        let to_pop = wanted.min(occupied(write, read, count));
        if to_pop == 0 {
            return 0;
        }

        // SAFETY: the run [read, read + to_pop) holds published records.
        unsafe {
            core.copy_out(read, &mut dest[..to_pop * element_size]);
        }

        core.read_tail()
            .store(advance_wrapping(read, to_pop, count), Ordering::Release);

        to_pop
    }

    /// Discard every published record
    ///
    /// 丢弃所有已发布的记录
    ///
    /// Records the producer publishes after the snapshot of `write_head` are kept.
    ///
    /// 在读取 `write_head` 快照之后发布的记录会被保留。
    ///
    /// # Returns
    /// Number of records discarded
    ///
    /// # 返回值
    /// 被丢弃的记录数量
    pub fn clear(&mut self) -> usize {
        let read = self.shared.read_tail().load(Ordering::Relaxed);
        let write = self.shared.write_head().load(Ordering::Acquire);
        let discarded = occupied(write, read, self.shared.element_count());

        if discarded > 0 {
            self.shared.read_tail().store(write, Ordering::Release);
        }

        tracing::trace!(discarded, "queue cleared");
        discarded
    }
}

impl<const N: usize> ReadReservation<'_, N> {
    /// Index of the reserved slot
    ///
    /// 预留槽位的索引
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of published slots, starting at [`index`](Self::index), that can
    /// be read in one pass without wrapping (always ≥ 1)
    ///
    /// 从 [`index`](Self::index) 开始、无需环绕即可一次读取的已发布槽位数（始终 ≥ 1）
    #[inline]
    pub fn available(&self) -> usize {
        self.available
    }

    /// View the oldest unread record
    ///
    /// 查看最早的未读记录
    #[inline]
    pub fn slot(&self) -> &[u8] {
        // SAFETY: the slot is published and the producer will not reuse it
        // until read_tail moves past it.
        unsafe { self.consumer.shared.slots(self.index, 1) }
    }

    /// View the whole contiguous run of `available()` records
    ///
    /// 查看 `available()` 条记录组成的整段连续区域
    #[inline]
    pub fn contiguous(&self) -> &[u8] {
        // SAFETY: see `slot`.
        unsafe { self.consumer.shared.slots(self.index, self.available) }
    }

    /// Release the reserved record
    ///
    /// 释放预留的记录
    #[inline]
    pub fn commit(self) {
        self.commit_n(1);
    }

    /// Release `n` records starting at the reserved one
    ///
    /// 释放从预留记录开始的 `n` 条记录
    ///
    /// `n == 0` releases nothing.
    ///
    /// `n == 0` 不释放任何内容。
    ///
    /// # Panics
    /// Panics in debug builds if `n > available()`
    ///
    /// # 恐慌
    /// 调试构建中当 `n > available()` 时恐慌
    pub fn commit_n(self, n: usize) {
        if n == 0 {
            return;
        }

        debug_assert!(
            n <= self.available,
            "released {n} slots but only {} were available",
            self.available
        );

        let core = &*self.consumer.shared;
        core.read_tail()
            .store(advance(self.index, n, core.element_count()), Ordering::Release);
    }
}

impl<const N: usize> fmt::Debug for Producer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("element_size", &self.element_size())
            .field("element_count", &self.element_count())
            .field("len", &self.len())
            .finish()
    }
}

impl<const N: usize> fmt::Debug for Consumer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("element_size", &self.element_size())
            .field("element_count", &self.element_count())
            .field("len", &self.len())
            .finish()
    }
}
