// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cache counters.

/// Running counters for an [`LruCache`](crate::LruCache).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups through `get` that found their key.
    pub hits: u64,
    /// Lookups through `get` that did not.
    pub misses: u64,
    /// Values stored through `set`.
    pub insertions: u64,
    /// Entries dropped because the capacity was exceeded.
    pub evictions: u64,
    /// Entries dropped through `invalidate` or `clear`.
    pub invalidations: u64,
}

impl CacheStats {
    /// Fraction of `get` calls that hit, or `None` before the first lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return None;
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "Ratios only need a few significant digits."
        )]
        let rate = self.hits as f64 / lookups as f64;
        Some(rate)
    }
}
