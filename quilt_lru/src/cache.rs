// Copyright 2025 the Quilt Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hash map plus slot-arena linked list.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::stats::CacheStats;

#[derive(Clone, Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>, // towards the front (more recent)
    next: Option<usize>, // towards the back (less recent)
}

/// Fixed-capacity least-recently-used cache.
///
/// Every key in the map owns exactly one live slot in the recency list and every live slot
/// is reachable from the map; [`LruCache::is_consistent`] checks this.
pub struct LruCache<K, V> {
    map: HashMap<K, usize>,
    slots: Vec<Option<Node<K, V>>>,
    free_list: Vec<usize>,
    front: Option<usize>,
    back: Option<usize>,
    limit: usize,
    stats: CacheStats,
}

impl<K, V> Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.map.len())
            .field("limit", &self.limit)
            .field("free_slots", &self.free_list.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<K: Clone + Eq + Hash, V> LruCache<K, V> {
    /// Create an empty cache holding at most `limit` entries.
    pub fn new(limit: usize) -> Self {
        assert!(limit > 0, "cache capacity must be positive");
        Self {
            map: HashMap::new(),
            slots: Vec::new(),
            free_list: Vec::new(),
            front: None,
            back: None,
            limit,
            stats: CacheStats::default(),
        }
    }

    /// Maximum number of entries.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Counters since construction or the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Zero all counters.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Look up a key and mark it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&slot) = self.map.get(key) else {
            self.stats.misses += 1;
            return None;
        };
        self.stats.hits += 1;
        self.promote(slot);
        Some(&self.node(slot).value)
    }

    /// Look up a key without touching recency or counters.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let &slot = self.map.get(key)?;
        Some(&self.node(slot).value)
    }

    /// Membership test. Does not reorder.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Store `value` as the most recently used entry.
    ///
    /// An existing entry for `key` is replaced in place. If the insert pushes the cache over
    /// its limit, the least recently used entry is evicted.
    pub fn set(&mut self, key: K, value: V) -> &V {
        self.stats.insertions += 1;
        if let Some(&slot) = self.map.get(&key) {
            self.node_mut(slot).value = value;
            self.promote(slot);
            return &self.node(slot).value;
        }

        let node = Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        };
        let slot = if let Some(slot) = self.free_list.pop() {
            self.slots[slot] = Some(node);
            slot
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        };
        self.map.insert(key, slot);
        self.attach_front(slot);

        if self.map.len() > self.limit
            && let Some(back) = self.back
        {
            self.remove_slot(back);
            self.stats.evictions += 1;
        }
        &self.node(slot).value
    }

    /// Drop `key` if present, returning its value.
    pub fn invalidate<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let &slot = self.map.get(key)?;
        self.stats.invalidations += 1;
        Some(self.remove_slot(slot).1)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.stats.invalidations += self.map.len() as u64;
        self.map.clear();
        self.slots.clear();
        self.free_list.clear();
        self.front = None;
        self.back = None;
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            cache: self,
            cursor: self.front,
        }
    }

    /// Verify that the map and the recency list describe the same set of entries.
    pub fn is_consistent(&self) -> bool {
        let mut seen = 0_usize;
        let mut prev = None;
        let mut cursor = self.front;
        while let Some(slot) = cursor {
            let Some(node) = self.slots.get(slot).and_then(Option::as_ref) else {
                return false;
            };
            if node.prev != prev || self.map.get(&node.key) != Some(&slot) {
                return false;
            }
            seen += 1;
            if seen > self.map.len() {
                return false;
            }
            prev = cursor;
            cursor = node.next;
        }
        let live = self.slots.iter().filter(|s| s.is_some()).count();
        seen == self.map.len()
            && live == seen
            && self.back == prev
            && self.map.len() <= self.limit
            && self.free_list.iter().all(|&slot| self.slots[slot].is_none())
    }

    fn node(&self, slot: usize) -> &Node<K, V> {
        self.slots[slot].as_ref().expect("dangling cache slot")
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<K, V> {
        self.slots[slot].as_mut().expect("dangling cache slot")
    }

    fn promote(&mut self, slot: usize) {
        if self.front != Some(slot) {
            self.detach(slot);
            self.attach_front(slot);
        }
    }

    fn detach(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.node_mut(slot);
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.front = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.back = prev,
        }
    }

    fn attach_front(&mut self, slot: usize) {
        let old_front = self.front;
        {
            let node = self.node_mut(slot);
            node.prev = None;
            node.next = old_front;
        }
        match old_front {
            Some(f) => self.node_mut(f).prev = Some(slot),
            None => self.back = Some(slot),
        }
        self.front = Some(slot);
    }

    fn remove_slot(&mut self, slot: usize) -> (K, V) {
        self.detach(slot);
        let node = self.slots[slot].take().expect("dangling cache slot");
        self.free_list.push(slot);
        self.map.remove(&node.key);
        (node.key, node.value)
    }
}

/// Iterator over cache keys in recency order. See [`LruCache::keys`].
pub struct Keys<'a, K, V> {
    cache: &'a LruCache<K, V>,
    cursor: Option<usize>,
}

impl<K, V> Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keys")
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let node = self.cache.slots.get(self.cursor?)?.as_ref()?;
        self.cursor = node.next;
        Some(&node.key)
    }
}
