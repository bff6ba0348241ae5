//! Fixed-size byte arena with inline/heap optimization
//!
//! 带有内联/堆优化的固定大小字节区
//!
//! The arena is zero-filled once at creation and never resized. When the total
//! byte size is ≤ N it lives inline, inside whatever allocation owns the queue
//! header, so header and slots share one allocation. Larger arenas take exactly
//! one fallible heap allocation.
//!
//! 字节区在创建时清零一次，之后永不调整大小。当总字节数 ≤ N 时内联存储在
//! 持有队列头的同一分配中；更大的字节区只进行一次可失败的堆分配。

use std::cell::UnsafeCell;
use std::collections::TryReserveError;
use std::slice;

/// Zero-filled slot arena shared between the producer and consumer
///
/// 生产者与消费者共享的清零槽位字节区
///
/// # Type Parameters
/// - `N`: Inline threshold in bytes (bytes stored inline when size ≤ N)
///
/// # 类型参数
/// - `N`: 内联阈值（字节），当大小 ≤ N 时内联存储
pub(crate) struct SlotStorage<const N: usize> {
    /// Storage backend
    ///
    /// 存储后端
    storage: Storage<N>,

    /// Usable length in bytes
    ///
    /// 可用字节长度
    len: usize,
}

enum Storage<const N: usize> {
    /// Inline storage for size ≤ N
    ///
    /// 大小 ≤ N 时的内联存储
    Inline([UnsafeCell<u8>; N]),

    /// Heap storage for size > N
    ///
    /// 大小 > N 时的堆存储
    Heap(Box<[UnsafeCell<u8>]>),
}

impl<const N: usize> SlotStorage<N> {
    /// Create a zero-filled arena of `len` bytes
    ///
    /// 创建 `len` 字节的清零字节区
    ///
    /// # Errors
    /// Returns the allocator's error if the heap arena cannot be reserved.
    /// Inline arenas never fail.
    ///
    /// # 错误
    /// 堆字节区无法分配时返回分配器错误，内联字节区不会失败。
    pub fn zeroed(len: usize) -> Result<Self, TryReserveError> {
        let storage = if len <= N {
            Storage::Inline([const { UnsafeCell::new(0) }; N])
        } else {
            let mut cells = Vec::new();
            cells.try_reserve_exact(len)?;
            cells.resize_with(len, || UnsafeCell::new(0));
            Storage::Heap(cells.into_boxed_slice())
        };

        Ok(Self { storage, len })
    }

    /// Whether the arena is stored inline
    ///
    /// 字节区是否内联存储
    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline(_))
    }

    #[inline(always)]
    fn base_ptr(&self) -> *mut u8 {
        let cells: &[UnsafeCell<u8>] = match &self.storage {
            Storage::Inline(arr) => arr,
            Storage::Heap(boxed) => boxed,
        };
        // UnsafeCell<u8> has the same layout as u8.
        UnsafeCell::raw_get(cells.as_ptr())
    }

    /// Borrow `len` bytes starting at `offset`
    ///
    /// 借用从 `offset` 开始的 `len` 个字节
    ///
    /// # Safety
    /// - `offset + len` must not exceed the arena length
    /// - No mutable borrow of an overlapping range may be alive
    ///
    /// # 安全性
    /// - `offset + len` 不得超过字节区长度
    /// - 不得存在重叠范围的可变借用
    #[inline]
    pub unsafe fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        debug_assert!(offset + len <= self.len);
        unsafe { slice::from_raw_parts(self.base_ptr().add(offset), len) }
    }

    /// Mutably borrow `len` bytes starting at `offset`
    ///
    /// 可变借用从 `offset` 开始的 `len` 个字节
    ///
    /// # Safety
    /// - `offset + len` must not exceed the arena length
    /// - No other borrow of an overlapping range may be alive
    ///
    /// # 安全性
    /// - `offset + len` 不得超过字节区长度
    /// - 不得存在重叠范围的其他借用
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn bytes_mut(&self, offset: usize, len: usize) -> &mut [u8] {
        debug_assert!(offset + len <= self.len);
        unsafe { slice::from_raw_parts_mut(self.base_ptr().add(offset), len) }
    }
}

// Access to disjoint ranges is coordinated by the queue cursors.
unsafe impl<const N: usize> Send for SlotStorage<N> {}
unsafe impl<const N: usize> Sync for SlotStorage<N> {}
