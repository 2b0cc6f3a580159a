//! In-process analogue of the classic device client: size the queue once,
//! then stream bytes through it from a few producer threads while a few
//! consumer threads drain it.

use std::{sync::Arc, thread};

use anyhow::Result;
use byteq::{ByteQueue, PopError};
use tracing::info;
use tracing_subscriber::EnvFilter;

const MESSAGES_PER_PRODUCER: u32 = 100;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let queue = Arc::new(ByteQueue::with_capacity(64)?);

    let producers: Vec<_> = (0..2_u32)
        .map(|id| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || -> Result<()> {
                for round in 0..MESSAGES_PER_PRODUCER {
                    let payload = format!("producer {id} message {round}\n");
                    queue.push(payload.as_bytes())?;
                }
                info!(id, "producer done");
                Ok(())
            })
        })
        .collect();

    let consumers: Vec<_> = (0..2_u32)
        .map(|id| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let mut total = 0_usize;
                loop {
                    match queue.pop(32) {
                        Ok(chunk) => total += chunk.len(),
                        Err(PopError::Interrupted) => break,
                        Err(err) => panic!("pop failed: {err}"),
                    }
                }
                info!(id, total, "consumer done");
            })
        })
        .collect();

    for producer in producers {
        producer.join().expect("producer panicked")?;
    }
    queue.close();
    for consumer in consumers {
        consumer.join().expect("consumer panicked");
    }

    info!("all bytes delivered");
    Ok(())
}
