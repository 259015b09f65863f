use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared toggle that forces IPv4-only connections once set.
///
/// With dual-stacked DNS it is possible for a host to advertise an IPv6
/// address without having IPv6 connectivity. A dispatcher that detects this
/// failure class sets the toggle and retries; transports holding a clone
/// route every subsequent exchange over IPv4.
///
/// Clones share one underlying flag. The flag only ever goes from unset to
/// set, and reads/writes are atomic, so sharing it across threads is safe.
#[derive(Clone, Debug, Default)]
pub struct ForceIpv4(Arc<AtomicBool>);

impl ForceIpv4 {
    /// Create a new, unset toggle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force IPv4 for every transport holding a clone of this toggle.
    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether IPv4 is currently forced.
    pub fn enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
