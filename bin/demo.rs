//! SPSC session demo: one producer, one consumer, a 256-slot ring.
//!
//! Run with: `cargo run --bin demo --release`

use crossbeam_utils::Backoff;
use ringspsc_rs::{Config, Ring};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const N: u64 = 10_000_000;

fn main() {
    println!("RingSPSC Demo");
    println!("=============\n");

    let config = Config::new(8, 128, true); // 256 slots, metrics on
    println!("Configuration:");
    println!("  Ring capacity: {} slots", config.capacity());
    println!("  Items: {}\n", N);

    let ring = Arc::new(Ring::<u64>::new(config));
    let done = Arc::new(AtomicBool::new(false));

    let start = Instant::now();

    // Producer: sequential integers, retrying with backoff when full.
    let producer = {
        let ring = Arc::clone(&ring);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut retries = 0u64;
            for i in 0..N {
                let backoff = Backoff::new();
                while !ring.try_add(i) {
                    backoff.snooze();
                    retries += 1;
                }
            }
            done.store(true, Ordering::Release);
            retries
        })
    };

    // Consumer: drain until the producer is done and the ring is empty.
    let consumer = {
        let ring = Arc::clone(&ring);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut sum = 0u64;
            let mut retries = 0u64;
            loop {
                let read = ring.try_read(|batch| {
                    for seq in batch.start()..batch.end() {
                        sum += *batch.get(seq);
                    }
                });
                if !read {
                    if done.load(Ordering::Acquire) && ring.is_empty() {
                        break;
                    }
                    Backoff::new().snooze();
                    retries += 1;
                }
            }
            (sum, retries)
        })
    };

    let producer_retries = producer.join().expect("producer panicked");
    let (sum, consumer_retries) = consumer.join().expect("consumer panicked");
    let elapsed = start.elapsed();

    let expected = N * (N - 1) / 2;
    assert_eq!(sum, expected, "sum mismatch: data was lost or duplicated");

    let metrics = ring.metrics();
    println!("Results:");
    println!("  Sum: {} (expected {})", sum, expected);
    println!("  Producer retries: {}", producer_retries);
    println!("  Consumer retries: {}", consumer_retries);
    println!("  Read batches: {}", metrics.batches_dequeued);
    println!(
        "  Throughput: {:.1} M items/s",
        N as f64 / elapsed.as_secs_f64() / 1e6
    );
    println!("  Elapsed: {:?}", elapsed);
}
