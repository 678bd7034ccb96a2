// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessera LRU: a fixed-capacity least-recently-used cache.
//!
//! [`EvictionCache`] maps keys to values and keeps them ordered by recency of use.
//! When an insertion pushes the cache over its capacity, the least recently used
//! entry is evicted and handed to the cache's [`EvictionListener`].
//!
//! The listener is owned by the cache rather than registered as a shared callback.
//! That keeps the structure free of interior mutability: an embedder that needs to
//! react to evictions either passes a closure, or stores a small buffer type as the
//! listener and drains it through [`EvictionCache::listener_mut`] after each mutation.
//!
//! ## Recency rules
//!
//! - [`EvictionCache::insert`] and [`EvictionCache::get`] mark an entry as most recently used.
//! - [`EvictionCache::peek`], [`EvictionCache::contains`] and [`EvictionCache::iter`] never
//!   change recency.
//!
//! ## Example
//!
//! ```rust
//! use tessera_lru::EvictionCache;
//!
//! let mut evicted = Vec::new();
//! let mut cache = EvictionCache::with_listener(2, |key: &'static str, value: u32| {
//!     evicted.push((key, value));
//! });
//!
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! // Touch "a" so that "b" becomes the eviction candidate.
//! assert_eq!(cache.get(&"a"), Some(&1));
//! cache.insert("c", 3);
//!
//! assert!(!cache.contains(&"b"));
//! assert_eq!(cache.len(), 2);
//! drop(cache);
//! assert_eq!(evicted, vec![("b", 2)]);
//! ```
//!
//! ## Complexity
//!
//! Entries live in a slab and are threaded onto an index-linked doubly linked list,
//! with a hash map from key to slab slot. Insertion, lookup-with-promotion, removal,
//! and eviction are all O(1).
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cache;
mod listener;

pub use cache::{EvictionCache, Iter};
pub use listener::EvictionListener;
