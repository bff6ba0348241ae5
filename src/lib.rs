//! # Lock-Free SPSC Circular Queue
//!
//! 无锁 SPSC 环形队列
//!
//! `circq` is a bounded, lock-free Single Producer Single Consumer (SPSC) queue of
//! fixed-size byte records. It is built for handing records between two contexts,
//! such as an interrupt handler and a task, without blocking and without allocating
//! after creation.
//!
//! `circq` 是一个有界、无锁的单生产者单消费者（SPSC）定长字节记录队列，
//! 用于在两个上下文（例如中断处理程序与任务）之间传递记录，不阻塞，创建后不再分配内存。
//!
//! ## Features
//!
//! 特性
//!
//! - **Lock-Free** - Two cursors, each written by exactly one side, published with release/acquire ordering
//! - **Zero Copy** - Reserve a slot in place, fill or inspect it, then commit
//! - **Fixed Footprint** - One zero-filled arena allocated at creation, never resized
//! - **Inline Storage** - Small arenas share the header's allocation
//! - **Non-Blocking** - `Full` and `Empty` are plain return values
//!
//! - **无锁设计** - 两个游标各自只由一端写入，通过 release/acquire 顺序发布
//! - **零拷贝** - 原地预留槽位，填充或查看后提交
//! - **固定占用** - 创建时分配一块清零字节区，永不调整大小
//! - **内联存储** - 小字节区与头部共享同一分配
//! - **非阻塞** - `Full` 和 `Empty` 只是普通返回值
//!
//! ## Quick Start
//!
//! 快速开始
//!
//! ```rust
//! use circq::{spsc, Full};
//! use std::num::NonZero;
//!
//! // 4 slots of 4 bytes, usable capacity 3, arena inline below 64 bytes
//! // 4 个 4 字节槽位，可用容量 3，64 字节以内内联存储
//! let (mut producer, mut consumer) = spsc::new::<64>(NonZero::new(4).unwrap(), 4).unwrap();
//!
//! // Fill a slot in place, then publish it
//! // 原地填充槽位后发布
//! let mut slot = producer.write_begin();
//! slot.slot_mut().copy_from_slice(&7u32.to_le_bytes());
//! slot.commit().unwrap();
//!
//! producer.push(&8u32.to_le_bytes()).unwrap();
//! producer.push(&9u32.to_le_bytes()).unwrap();
//! assert_eq!(producer.push(&10u32.to_le_bytes()), Err(Full));
//!
//! // Inspect the oldest record in place, then release it
//! // 原地查看最早的记录后释放
//! let record = consumer.read_begin().unwrap();
//! assert_eq!(record.slot(), &7u32.to_le_bytes());
//! record.commit();
//!
//! let mut out = [0u8; 4];
//! consumer.pop(&mut out).unwrap();
//! assert_eq!(u32::from_le_bytes(out), 8);
//! ```
//!
//! ## Multi-threaded Usage
//!
//! 多线程使用
//!
//! ```rust
//! use circq::spsc;
//! use std::num::NonZero;
//! use std::thread;
//!
//! let (mut producer, mut consumer) = spsc::new::<0>(NonZero::new(8).unwrap(), 16).unwrap();
//!
//! // Producer thread
//! // 生产者线程
//! let producer_handle = thread::spawn(move || {
//!     for i in 0..100u64 {
//!         while producer.push(&i.to_le_bytes()).is_err() {
//!             thread::yield_now();
//!         }
//!     }
//! });
//!
//! // Consumer thread
//! // 消费者线程
//! let consumer_handle = thread::spawn(move || {
//!     let mut received = Vec::new();
//!     let mut out = [0u8; 8];
//!     while received.len() < 100 {
//!         match consumer.pop(&mut out) {
//!             Ok(()) => received.push(u64::from_le_bytes(out)),
//!             Err(_) => thread::yield_now(),
//!         }
//!     }
//!     received
//! });
//!
//! producer_handle.join().unwrap();
//! let received = consumer_handle.join().unwrap();
//! assert_eq!(received, (0..100).collect::<Vec<u64>>());
//! ```
//!
//! ## Multi-slot Reservations
//!
//! 多槽位预留
//!
//! `available()` reports how many slots starting at the reserved one can be handled
//! in one pass without wrapping. Committing exactly that many never fails.
//!
//! `available()` 报告从预留槽位开始、无需环绕即可一次处理的槽位数。提交恰好该数量永远不会失败。
//!
//! ```rust
//! use circq::spsc;
//! use std::num::NonZero;
//!
//! let (mut producer, mut consumer) = spsc::new::<64>(NonZero::new(1).unwrap(), 8).unwrap();
//!
//! let mut run = producer.write_begin();
//! let n = run.available();
//! assert_eq!(n, 7);
//! for (i, byte) in run.contiguous_mut().iter_mut().enumerate() {
//!     *byte = i as u8;
//! }
//! run.commit_n(n).unwrap();
//!
//! let run = consumer.read_begin().unwrap();
//! assert_eq!(run.contiguous(), &[0, 1, 2, 3, 4, 5, 6]);
//! let n = run.available();
//! run.commit_n(n);
//! assert!(consumer.is_empty());
//! ```
//!
//! ## Notes
//!
//! 注意事项
//!
//! - Usable capacity is `element_count - 1`; one slot always separates full from empty
//! - Only one producer and one consumer; ownership of the two halves enforces this
//! - Over-committing a reported availability is a contract violation, checked in debug builds
//!
//! - 可用容量为 `element_count - 1`，始终保留一个槽位区分满和空
//! - 仅支持一个生产者和一个消费者，由两端的所有权保证
//! - 提交超过报告的可用数量属于契约违例，在调试构建中检查

pub mod spsc;
mod core;
mod error;
mod shim;
mod storage;

pub use error::{CreateError, Empty, Full};
pub use spsc::{Consumer, Producer, ReadReservation, WriteReservation};

#[cfg(test)]
mod tests;
