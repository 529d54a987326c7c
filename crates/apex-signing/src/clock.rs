//! Time sources used when stamping and checking signed requests.

/// Trait contract for reading the current Unix time in seconds.
pub trait Clock: Send + Sync {
    fn now_unix_seconds(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
/// Wall-clock time source.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_seconds(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Pinned time source for deterministic fixtures.
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_unix_seconds(&self) -> u64 {
        self.0
    }
}
