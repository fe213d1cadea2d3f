//! RingSPSC - Bounded Lock-Free Single-Producer Single-Consumer Ring Buffer
//!
//! A fixed-capacity circular buffer moving values from exactly one producer
//! thread to exactly one consumer thread. No locks, no blocking, no
//! allocation on the hot path: every operation either completes or reports
//! "not currently possible" through a boolean, and callers bring their own
//! backoff (spin, yield, sleep).
//!
//! # Key Features
//!
//! - 128-byte alignment of the two head counters (prefetcher false sharing
//!   elimination)
//! - All-or-nothing batch enqueue (a batch that doesn't fit leaves no
//!   partial write behind)
//! - Zero-copy batch consumption: the consumer callback gets a wrap-aware
//!   view over the ring storage instead of a copied-out buffer
//! - Cached head counters to minimize cross-core traffic
//!
//! # Example
//!
//! ```
//! use ringspsc_rs::{Config, Ring};
//!
//! let ring = Ring::<u64>::new(Config::new(8, 128, false)); // 256 slots
//!
//! // Producer side
//! ring.try_add(1);
//! ring.try_add_batch(&[2, 3, 4]);
//!
//! // Consumer side: one callback for everything currently readable
//! let mut sum = 0;
//! ring.try_read(|batch| {
//!     for seq in batch.start()..batch.end() {
//!         sum += *batch.get(seq);
//!     }
//! });
//! assert_eq!(sum, 10);
//! ```
//!
//! # Concurrency contract
//!
//! One thread calls the `try_add*` methods, one thread calls `try_read`, for
//! the lifetime of the session. More writers or readers than that is
//! undefined by design — the ring does not detect it. Session shutdown is
//! coordinated outside the ring (e.g. a shared completion flag); the ring
//! itself is simply abandoned when both sides are done.

mod config;
mod invariants;
mod metrics;
mod ring;
mod view;

pub use config::{Config, ConfigError, HIGH_THROUGHPUT_CONFIG, LOW_LATENCY_CONFIG};
pub use metrics::{Metrics, MetricsSnapshot};
pub use ring::Ring;
pub use view::{Iter, ReadBatch};
