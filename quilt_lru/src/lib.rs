// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quilt LRU: a fixed-capacity least-recently-used cache.
//!
//! [`LruCache`] pairs a hash map from keys to slots with a doubly-linked recency list
//! threaded through a slot arena. Every operation is O(1) amortized:
//!
//! - [`LruCache::get`] returns a value and marks it most recently used.
//! - [`LruCache::set`] stores a value at the front and evicts the least recently used
//!   entry once the capacity is exceeded.
//! - [`LruCache::has`] tests membership without touching recency.
//! - [`LruCache::invalidate`] drops one key; absent keys are ignored.
//!
//! Hit, miss and eviction counters are kept in [`CacheStats`].
//!
//! # Example
//!
//! ```rust
//! use quilt_lru::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.set("a", 1);
//! cache.set("b", 2);
//! assert_eq!(cache.get(&"a"), Some(&1));
//!
//! // "b" is now the least recently used entry and gets evicted.
//! cache.set("c", 3);
//! assert!(!cache.has(&"b"));
//! assert_eq!(cache.len(), 2);
//! assert_eq!(cache.stats().evictions, 1);
//! ```

mod cache;
mod stats;

pub use cache::{Keys, LruCache};
pub use stats::CacheStats;
