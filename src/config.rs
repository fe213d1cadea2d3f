use thiserror::Error;

/// Error returned by the checked configuration constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Capacity must be a power of two so indices can wrap with a mask.
    #[error("capacity {capacity} is not a power of two")]
    CapacityNotPowerOfTwo {
        /// The rejected capacity.
        capacity: usize,
    },
    /// The batch bound must be strictly smaller than the capacity, otherwise
    /// a full batch could never fit and `try_add_batch` would always fail.
    #[error("batch bound {max_batch} does not fit capacity {capacity} (need max_batch < capacity)")]
    BatchBoundTooLarge {
        /// The rejected batch bound.
        max_batch: usize,
        /// The ring capacity it was checked against.
        capacity: usize,
    },
}

/// Configuration for a [`Ring`](crate::Ring).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Ring buffer size as power of 2 (default: 16 = 64K slots)
    pub ring_bits: u8,
    /// Largest batch the producer will ever submit to `try_add_batch`.
    ///
    /// Must be strictly smaller than the capacity. This is a construction-time
    /// contract; batch calls only debug-assert it.
    pub max_batch: usize,
    /// Enable metrics collection (slight overhead)
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a new configuration with custom settings.
    ///
    /// # Panics
    ///
    /// Panics if `max_batch` does not fit the capacity implied by `ring_bits`.
    pub const fn new(ring_bits: u8, max_batch: usize, enable_metrics: bool) -> Self {
        assert!(
            max_batch < 1 << ring_bits,
            "max_batch must be strictly smaller than the ring capacity"
        );
        Self {
            ring_bits,
            max_batch,
            enable_metrics,
        }
    }

    /// Checked constructor for capacities taken from runtime configuration.
    ///
    /// Validates that `capacity` is a power of two and that `max_batch` fits,
    /// instead of asserting like [`Config::new`].
    pub fn from_capacity(capacity: usize, max_batch: usize) -> Result<Self, ConfigError> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(ConfigError::CapacityNotPowerOfTwo { capacity });
        }
        if max_batch >= capacity {
            return Err(ConfigError::BatchBoundTooLarge {
                max_batch,
                capacity,
            });
        }
        Ok(Self {
            ring_bits: capacity.trailing_zeros() as u8,
            max_batch,
            enable_metrics: false,
        })
    }

    /// Returns the capacity of the ring buffer.
    #[inline]
    pub const fn capacity(&self) -> usize {
        1 << self.ring_bits
    }

    /// Returns the mask for index wrapping.
    #[inline]
    pub const fn mask(&self) -> usize {
        self.capacity() - 1
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ring_bits: 16, // 64K slots
            max_batch: 128,
            enable_metrics: false,
        }
    }
}

/// Low latency configuration (4K slots, fits in L1 cache)
pub const LOW_LATENCY_CONFIG: Config = Config::new(12, 128, false);

/// High throughput configuration (256K slots, large batches)
pub const HIGH_THROUGHPUT_CONFIG: Config = Config::new(18, 4096, false);
