use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread,
};

use byteq::{ByteQueue, PopError};

/// N producers and M consumers hammer one queue; every byte pushed must be
/// popped exactly once, in whatever interleaving the scheduler picks.
#[test]
fn many_producers_many_consumers() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 3;
    const BYTES_PER_PRODUCER: usize = 64 * 1024;

    let queue = Arc::new(ByteQueue::with_capacity(512).unwrap());
    let read_count = Arc::new(AtomicU64::new(0));
    let read_sum = Arc::new(AtomicU64::new(0));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|id| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut rng = fastrand::Rng::with_seed(0xB17E_5EED ^ id as u64);
                let mut sent = 0_usize;
                let mut sum = 0_u64;
                while sent < BYTES_PER_PRODUCER {
                    let len = rng.usize(1..=128).min(BYTES_PER_PRODUCER - sent);
                    let chunk: Vec<u8> = (0..len).map(|_| rng.u8(..)).collect();
                    sum += chunk.iter().map(|&b| u64::from(b)).sum::<u64>();
                    queue.push(&chunk).unwrap();
                    sent += len;
                }
                sum
            })
        })
        .collect();

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let read_count = Arc::clone(&read_count);
            let read_sum = Arc::clone(&read_sum);
            thread::spawn(move || loop {
                match queue.pop(97) {
                    Ok(chunk) => {
                        read_count.fetch_add(chunk.len() as u64, Ordering::Relaxed);
                        let sum = chunk.iter().map(|&b| u64::from(b)).sum::<u64>();
                        read_sum.fetch_add(sum, Ordering::Relaxed);
                    }
                    Err(PopError::Interrupted) => break,
                    Err(err) => panic!("unexpected pop error: {err}"),
                }
            })
        })
        .collect();

    let sent_sum: u64 = producers.into_iter().map(|p| p.join().unwrap()).sum();
    queue.close();
    for consumer in consumers {
        consumer.join().unwrap();
    }

    let expected = u64::try_from(PRODUCERS * BYTES_PER_PRODUCER).unwrap();
    assert_eq!(read_count.load(Ordering::Relaxed), expected);
    assert_eq!(read_sum.load(Ordering::Relaxed), sent_sum);
    assert!(queue.is_empty());
}

/// One producer, one consumer, chunk sizes chosen so reads and writes are
/// constantly straddling the wrap point; the byte stream must stay ordered.
#[test]
fn spsc_ordering_across_wraps() {
    const TOTAL: usize = 32 * 1024;

    let queue = Arc::new(ByteQueue::with_capacity(7).unwrap());

    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut next = 0_u8;
            let mut sent = 0_usize;
            while sent < TOTAL {
                let len = (sent % 5 + 1).min(TOTAL - sent);
                let chunk: Vec<u8> = (0..len)
                    .map(|_| {
                        let byte = next;
                        next = next.wrapping_add(1);
                        byte
                    })
                    .collect();
                queue.push(&chunk).unwrap();
                sent += len;
            }
        })
    };

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut expected = 0_u8;
            let mut seen = 0_usize;
            while seen < TOTAL {
                let chunk = queue.pop(3).unwrap();
                for &byte in &chunk {
                    assert_eq!(byte, expected, "byte {seen} out of order");
                    expected = expected.wrapping_add(1);
                }
                seen += chunk.len();
            }
        })
    };

    producer.join().unwrap();
    consumer.join().unwrap();
    assert!(queue.is_empty());
}
