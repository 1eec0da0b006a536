//! Snowflake ID Generator
//!
//! Twitter-style distributed unique ID generation. Every row in the portal
//! schema is keyed by one of these i64 IDs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Custom epoch (2024-01-01T00:00:00.000Z)
const PORTAL_EPOCH: u64 = 1704067200000;

/// Snowflake ID generator
pub struct SnowflakeGenerator {
    machine_id: u64,
    node_id: u64,
    sequence: AtomicU64,
    last_timestamp: AtomicU64,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator
    pub fn new(machine_id: u64, node_id: u64) -> Self {
        Self {
            machine_id: machine_id & 0x1F, // 5 bits
            node_id: node_id & 0x1F,       // 5 bits
            sequence: AtomicU64::new(0),
            last_timestamp: AtomicU64::new(0),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        let mut timestamp = self.current_timestamp();
        let last = self.last_timestamp.load(Ordering::SeqCst);

        let sequence = if timestamp == last {
            let sequence = (self.sequence.fetch_add(1, Ordering::SeqCst) + 1) & 0xFFF;
            if sequence == 0 {
                // Sequence exhausted for this millisecond, spin until the clock moves
                timestamp = self.wait_for_next_millis(last);
                self.last_timestamp.store(timestamp, Ordering::SeqCst);
                self.sequence.store(0, Ordering::SeqCst);
            }
            sequence
        } else {
            self.last_timestamp.store(timestamp, Ordering::SeqCst);
            self.sequence.store(0, Ordering::SeqCst);
            0
        };

        let id = ((timestamp - PORTAL_EPOCH) << 22)
            | (self.machine_id << 17)
            | (self.node_id << 12)
            | sequence;

        id as i64
    }

    /// Spin until the clock advances past `last`
    fn wait_for_next_millis(&self, last: u64) -> u64 {
        let mut timestamp = self.current_timestamp();
        while timestamp <= last {
            std::hint::spin_loop();
            timestamp = self.current_timestamp();
        }
        timestamp
    }

    /// Get current timestamp in milliseconds
    fn current_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis() as u64
    }
}

/// Extract timestamp from snowflake ID
pub fn extract_timestamp(snowflake: i64) -> u64 {
    ((snowflake as u64) >> 22) + PORTAL_EPOCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique() {
        let gen = SnowflakeGenerator::new(1, 1);
        let id1 = gen.generate();
        let id2 = gen.generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_monotonic() {
        let gen = SnowflakeGenerator::new(1, 0);
        let mut last = gen.generate();
        for _ in 0..100 {
            let next = gen.generate();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn test_generate_burst_has_no_duplicates() {
        // More than 4096 IDs guarantees at least one sequence wraparound
        let gen = SnowflakeGenerator::new(2, 3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(gen.generate()));
        }
    }

    #[test]
    fn test_extract_timestamp() {
        let gen = SnowflakeGenerator::new(1, 1);
        let id = gen.generate();
        let ts = extract_timestamp(id);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        assert!(ts <= now);
        assert!(ts > now - 1000); // Within 1 second
    }
}
