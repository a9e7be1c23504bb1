//! Host system readings.

/// Heap and uptime readings from the SoC.
pub trait SystemInfo {
    /// Free heap in bytes.
    fn free_memory(&self) -> usize;

    /// Milliseconds since boot.
    fn uptime_millis(&self) -> u64;
}
