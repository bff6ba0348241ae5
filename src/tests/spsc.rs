//! Comprehensive tests for the SPSC circular queue
//!
//! SPSC 环形队列的全面测试

use crate::spsc::{self, Consumer, Producer};
use crate::{Empty, Full};
use std::num::NonZero;
use std::thread;

fn queue<const N: usize>(element_size: usize, element_count: usize) -> (Producer<N>, Consumer<N>) {
    spsc::new::<N>(NonZero::new(element_size).unwrap(), element_count).unwrap()
}

fn write_u32<const N: usize>(producer: &mut Producer<N>, value: u32) -> Result<(), Full> {
    let mut reservation = producer.write_begin();
    reservation.slot_mut().copy_from_slice(&value.to_le_bytes());
    reservation.commit()
}

fn read_u32<const N: usize>(consumer: &mut Consumer<N>) -> Option<u32> {
    let reservation = consumer.read_begin()?;
    let value = u32::from_le_bytes(reservation.slot().try_into().unwrap());
    reservation.commit();
    Some(value)
}

/// Move both cursors to `index` on an empty queue.
fn park_cursors<const N: usize>(producer: &mut Producer<N>, consumer: &mut Consumer<N>, index: usize) {
    let size = producer.element_size();
    let records = vec![0u8; index * size];
    assert_eq!(producer.push_slice(&records), index);
    let mut sink = vec![0u8; index * size];
    assert_eq!(consumer.pop_slice(&mut sink), index);
    assert!(consumer.is_empty());
}

// ============================================================================
// SEGMENT 1: Capacity and Boundary Tests
// 第1段：容量与边界测试
// ============================================================================

#[test]
fn test_capacity_bound_various_counts() {
    // At most element_count - 1 records are ever resident
    // 最多只能驻留 element_count - 1 条记录
    for count in 3..20 {
        let (mut producer, mut consumer) = queue::<64>(4, count);

        for i in 0..(count - 1) as u32 {
            assert_eq!(write_u32(&mut producer, i), Ok(()));
        }
        assert!(producer.is_full());
        assert_eq!(write_u32(&mut producer, 999), Err(Full));
        assert_eq!(producer.len(), count - 1);

        // Resident records survive the rejected write
        // 被拒绝的写入不影响已驻留的记录
        for i in 0..(count - 1) as u32 {
            assert_eq!(read_u32(&mut consumer), Some(i));
        }
        assert_eq!(read_u32(&mut consumer), None);
    }
}

#[test]
fn test_full_commit_does_not_move_cursor() {
    let (mut producer, consumer) = queue::<64>(2, 3);
    producer.push(&[1, 1]).unwrap();
    producer.push(&[2, 2]).unwrap();

    let index = producer.write_begin().index();
    for _ in 0..5 {
        let mut reservation = producer.write_begin();
        reservation.slot_mut().copy_from_slice(&[9, 9]);
        assert_eq!(reservation.commit(), Err(Full));
    }

    let mut reservation = producer.write_begin();
    assert_eq!(reservation.index(), index);
    assert_eq!(reservation.available(), 0);
    assert!(reservation.contiguous_mut().is_empty());
    assert_eq!(reservation.slot(), &[9, 9]);
    assert_eq!(consumer.len(), 2);
}

#[test]
fn test_fill_up_and_interleave() {
    // Ten slots of i32-sized records: fill, drain half, interleave, drain
    // 十个 i32 大小的槽位：填满、取出一半、交替操作、清空
    let (mut producer, mut consumer) = queue::<0>(4, 10);
    assert_eq!(read_u32(&mut consumer), None);

    for i in 0..9u32 {
        let first = producer.write_begin().index();
        let same = producer.write_begin().index();
        assert_eq!(first, same);

        assert_eq!(write_u32(&mut producer, i + 99), Ok(()));

        let head = consumer.read_begin().unwrap();
        assert_eq!(head.slot(), &99u32.to_le_bytes());
    }

    assert_eq!(write_u32(&mut producer, 0), Err(Full));

    for expected in 99..104 {
        let index = consumer.read_begin().unwrap().index();
        assert_eq!(consumer.read_begin().unwrap().index(), index);
        assert_eq!(read_u32(&mut consumer), Some(expected));
        assert_ne!(consumer.read_begin().unwrap().index(), index);
    }

    let mut next_added = 1000u32;
    for expected in 104..108u32 {
        if expected % 2 == 1 {
            assert_eq!(write_u32(&mut producer, next_added), Ok(()));
            next_added += 1;
        }
        assert_eq!(read_u32(&mut consumer), Some(expected));
        assert_eq!(write_u32(&mut producer, next_added), Ok(()));
        next_added += 1;
    }

    // Neutral in number of records
    // 记录数量保持不变
    for expected in 1000..1050u32 {
        assert_eq!(read_u32(&mut consumer), Some(expected));
        assert_eq!(write_u32(&mut producer, next_added), Ok(()));
        next_added += 1;
    }

    for expected in 1050..1056u32 {
        assert_eq!(read_u32(&mut consumer), Some(expected));
    }
    assert_eq!(read_u32(&mut consumer), None);
}

// ============================================================================
// SEGMENT 2: Wraparound Tests
// 第2段：环绕测试
// ============================================================================

#[test]
fn test_cursor_on_last_slot_then_advance() {
    let (mut producer, mut consumer) = queue::<64>(2, 5);
    park_cursors(&mut producer, &mut consumer, 4);

    {
        let reservation = producer.write_begin();
        assert_eq!(reservation.index(), 4);
        assert_eq!(reservation.available(), 1);
    }
    producer.push(&[4, 4]).unwrap();

    let reservation = producer.write_begin();
    assert_eq!(reservation.index(), 0);
    assert_eq!(reservation.available(), 3);
    drop(reservation);

    producer.push(&[5, 5]).unwrap();
    producer.push(&[6, 6]).unwrap();

    let reservation = consumer.read_begin().unwrap();
    assert_eq!(reservation.index(), 4);
    assert_eq!(reservation.available(), 1);
    assert_eq!(reservation.slot(), &[4, 4]);
    reservation.commit();

    let reservation = consumer.read_begin().unwrap();
    assert_eq!(reservation.index(), 0);
    assert_eq!(reservation.available(), 2);
    assert_eq!(reservation.contiguous(), &[5, 5, 6, 6]);
    reservation.commit_n(2);
    assert!(consumer.is_empty());
}

#[test]
fn test_wraparound_leaves_neighbors_intact() {
    let (mut producer, mut consumer) = queue::<0>(3, 6);
    park_cursors(&mut producer, &mut consumer, 5);

    // Slots 0..3 hold stale parked bytes; write across the boundary
    // 槽位 0..3 中是旧数据；跨越边界写入
    assert_eq!(producer.push_slice(&[1, 1, 1, 2, 2, 2, 3, 3, 3]), 3);

    let mut out = [0u8; 3];
    consumer.pop(&mut out).unwrap();
    assert_eq!(out, [1, 1, 1]);
    consumer.pop(&mut out).unwrap();
    assert_eq!(out, [2, 2, 2]);

    // Fresh write after a partial read must not disturb the unread record
    // 部分读取后的新写入不得影响未读记录
    producer.push(&[4, 4, 4]).unwrap();
    consumer.pop(&mut out).unwrap();
    assert_eq!(out, [3, 3, 3]);
    consumer.pop(&mut out).unwrap();
    assert_eq!(out, [4, 4, 4]);
    assert_eq!(consumer.pop(&mut out), Err(Empty));
}

#[test]
fn test_spin_strides() {
    // Many full cycles with strides close to the capacity
    // 以接近容量的步长进行多轮完整循环
    let (mut producer, mut consumer) = queue::<0>(4, 99);
    let mut write_val = 10u32;
    let mut read_val = 10u32;

    for stride in 80..99 {
        for _ in 0..120 {
            for _ in 0..stride {
                assert_eq!(write_u32(&mut producer, write_val), Ok(()));
                write_val += 1;
            }
            for _ in 0..stride {
                assert_eq!(read_u32(&mut consumer), Some(read_val));
                read_val += 1;
            }
        }
    }
}

#[test]
fn test_slice_ops_across_boundary() {
    let (mut producer, mut consumer) = queue::<64>(2, 8);

    for round in 0..20u8 {
        let records: Vec<u8> = (0..10).map(|i| round.wrapping_mul(10).wrapping_add(i / 2)).collect();
        assert_eq!(producer.push_slice(&records), 5);

        let mut out = [0u8; 10];
        assert_eq!(consumer.pop_slice(&mut out), 5);
        assert_eq!(&out[..], &records[..]);
    }
}

#[test]
fn test_push_slice_partial_when_nearly_full() {
    let (mut producer, mut consumer) = queue::<64>(1, 5);
    assert_eq!(producer.push_slice(&[1, 2, 3]), 3);
    assert_eq!(producer.push_slice(&[4, 5, 6]), 1);
    assert_eq!(producer.push_slice(&[7]), 0);

    let mut out = [0u8; 8];
    assert_eq!(consumer.pop_slice(&mut out), 4);
    assert_eq!(&out[..4], &[1, 2, 3, 4]);
    assert_eq!(consumer.pop_slice(&mut out), 0);
    assert_eq!(producer.push_slice(&[]), 0);
}

#[test]
#[should_panic(expected = "slice length must be a multiple of element_size")]
fn test_push_slice_ragged_length() {
    let (mut producer, _consumer) = queue::<64>(4, 4);
    producer.push_slice(&[0u8; 6]);
}

// ============================================================================
// SEGMENT 3: Availability Soundness
// 第3段：可用数量的正确性
// ============================================================================

#[test]
fn test_write_availability_commit_never_fails() {
    // Every cursor position and fill level: committing the reported run succeeds
    // 所有游标位置和填充程度下，提交报告的可用数量都会成功
    for count in 3..10 {
        for start in 0..count {
            for fill in 0..count {
                let (mut producer, mut consumer) = queue::<64>(1, count);
                park_cursors(&mut producer, &mut consumer, start);
                assert_eq!(producer.push_slice(&vec![0xAA; fill]), fill.min(count - 1));

                let before = producer.len();
                let mut reservation = producer.write_begin();
                let available = reservation.available();
                assert!(available <= count - 1 - before);
                reservation.contiguous_mut().fill(0x55);

                if available > 0 {
                    assert_eq!(reservation.commit_n(available), Ok(()));
                    assert_eq!(producer.len(), before + available);
                }
            }
        }
    }
}

#[test]
fn test_read_availability_never_overstates() {
    for count in 3..10 {
        for start in 0..count {
            for fill in 1..count {
                let (mut producer, mut consumer) = queue::<64>(1, count);
                park_cursors(&mut producer, &mut consumer, start);
                let records: Vec<u8> = (1..=fill as u8).collect();
                assert_eq!(producer.push_slice(&records), fill);

                let reservation = consumer.read_begin().unwrap();
                let available = reservation.available();
                assert!(available >= 1);
                assert!(available <= fill);
                assert_eq!(reservation.contiguous(), &records[..available]);
                reservation.commit_n(available);
                assert_eq!(consumer.len(), fill - available);
            }
        }
    }
}

#[test]
fn test_multi_commit_round_trip() {
    // Drive the queue only through maximal runs on both sides
    // 两端都只使用最大连续区域驱动队列
    let (mut producer, mut consumer) = queue::<0>(2, 7);
    let mut next = 0u16;
    let mut expected = 0u16;

    for _ in 0..200 {
        let mut reservation = producer.write_begin();
        let available = reservation.available();
        for chunk in reservation.contiguous_mut().chunks_exact_mut(2) {
            chunk.copy_from_slice(&next.to_le_bytes());
            next += 1;
        }
        if available > 0 {
            reservation.commit_n(available).unwrap();
        }

        while let Some(reservation) = consumer.read_begin() {
            let available = reservation.available();
            for chunk in reservation.contiguous().chunks_exact(2) {
                assert_eq!(u16::from_le_bytes([chunk[0], chunk[1]]), expected);
                expected += 1;
            }
            reservation.commit_n(available);
        }
    }
    assert_eq!(next, expected);
    assert!(next > 200);
}

// ============================================================================
// SEGMENT 4: Idempotent Queries
// 第4段：幂等查询
// ============================================================================

#[test]
fn test_write_begin_repeats_slot_and_count() {
    let (mut producer, mut consumer) = queue::<64>(4, 6);
    park_cursors(&mut producer, &mut consumer, 3);
    producer.push(b"wxyz").unwrap();

    let mut reservation = producer.write_begin();
    reservation.slot_mut().copy_from_slice(b"pend");
    let (index, available) = (reservation.index(), reservation.available());
    drop(reservation);

    for _ in 0..3 {
        let reservation = producer.write_begin();
        assert_eq!(reservation.index(), index);
        assert_eq!(reservation.available(), available);
        assert_eq!(reservation.slot(), b"pend");
    }
    assert_eq!(consumer.len(), 1);
}

#[test]
fn test_read_begin_repeats_without_commit() {
    let (mut producer, mut consumer) = queue::<64>(4, 6);
    producer.push(b"abcd").unwrap();

    for _ in 0..3 {
        let reservation = consumer.read_begin().unwrap();
        assert_eq!(reservation.slot(), b"abcd");
        assert_eq!(reservation.available(), 1);
    }
    assert_eq!(consumer.len(), 1);

    consumer.read_begin().unwrap().commit();
    for _ in 0..3 {
        assert!(consumer.read_begin().is_none());
    }
}

// ============================================================================
// SEGMENT 5: Concurrent Producer and Consumer
// 第5段：并发生产者与消费者
// ============================================================================

#[test]
fn test_concurrent_single_records() {
    const TOTAL: u64 = 50_000;
    let (mut producer, mut consumer) = queue::<0>(8, 16);

    let producer_handle = thread::spawn(move || {
        for i in 0..TOTAL {
            loop {
                let mut reservation = producer.write_begin();
                reservation.slot_mut().copy_from_slice(&i.to_le_bytes());
                if reservation.commit().is_ok() {
                    break;
                }
                thread::yield_now();
            }
        }
    });

    let consumer_handle = thread::spawn(move || {
        let mut expected = 0u64;
        while expected < TOTAL {
            match consumer.read_begin() {
                Some(reservation) => {
                    let value = u64::from_le_bytes(reservation.slot().try_into().unwrap());
                    assert_eq!(value, expected);
                    reservation.commit();
                    expected += 1;
                }
                None => thread::yield_now(),
            }
        }
        consumer
    });

    producer_handle.join().unwrap();
    let consumer = consumer_handle.join().unwrap();
    assert!(consumer.is_empty());
}

#[test]
fn test_concurrent_runs() {
    const TOTAL: u32 = 100_000;
    let (mut producer, mut consumer) = queue::<0>(4, 64);

    let producer_handle = thread::spawn(move || {
        let mut next = 0u32;
        while next < TOTAL {
            let mut reservation = producer.write_begin();
            let n = reservation.available().min((TOTAL - next) as usize);
            if n == 0 {
                drop(reservation);
                thread::yield_now();
                continue;
            }
            for chunk in reservation.contiguous_mut().chunks_exact_mut(4).take(n) {
                chunk.copy_from_slice(&next.to_le_bytes());
                next += 1;
            }
            reservation.commit_n(n).unwrap();
        }
    });

    let consumer_handle = thread::spawn(move || {
        let mut expected = 0u32;
        while expected < TOTAL {
            let Some(reservation) = consumer.read_begin() else {
                thread::yield_now();
                continue;
            };
            let n = reservation.available();
            for chunk in reservation.contiguous().chunks_exact(4) {
                assert_eq!(u32::from_le_bytes(chunk.try_into().unwrap()), expected);
                expected += 1;
            }
            reservation.commit_n(n);
        }
    });

    producer_handle.join().unwrap();
    consumer_handle.join().unwrap();
}

#[test]
fn test_concurrent_slices_different_speeds() {
    const TOTAL: usize = 20_000;
    let (mut producer, mut consumer) = queue::<64>(2, 10);

    let producer_handle = thread::spawn(move || {
        let data: Vec<u8> = (0..TOTAL).flat_map(|i| (i as u16).to_le_bytes()).collect();
        let mut offset = 0;
        while offset < data.len() {
            let end = (offset + 14).min(data.len());
            let pushed = producer.push_slice(&data[offset..end]);
            offset += pushed * 2;
            if pushed == 0 {
                thread::yield_now();
            }
        }
    });

    let consumer_handle = thread::spawn(move || {
        let mut received = Vec::with_capacity(TOTAL);
        let mut buf = [0u8; 6];
        while received.len() < TOTAL {
            let popped = consumer.pop_slice(&mut buf);
            for chunk in buf[..popped * 2].chunks_exact(2) {
                received.push(u16::from_le_bytes([chunk[0], chunk[1]]));
            }
            if popped == 0 {
                thread::yield_now();
            }
        }
        received
    });

    producer_handle.join().unwrap();
    let received = consumer_handle.join().unwrap();
    let expected: Vec<u16> = (0..TOTAL).map(|i| i as u16).collect();
    assert_eq!(received, expected);
}
