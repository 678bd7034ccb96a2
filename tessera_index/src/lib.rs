// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tessera Index: a generic 2D AABB index with point and rectangle queries.
//!
//! The index stores payloads under generational [`Key`]s and delegates the spatial
//! part to a [`Backend`]:
//!
//! - [`FlatVec`]: linear scans, for small sets.
//! - [`RTree`] (and the [`RTreeF32`]/[`RTreeF64`]/[`RTreeI64`] aliases): bulk-loadable
//!   R-tree for large point and shape sets.
//!
//! Queries only narrow by bounding box. Exact shape tests belong to the caller; see
//! `tessera_precise_hit` and the pick index in `tessera_pyramid`.
//!
//! ```rust
//! use tessera_index::{Aabb2D, Index, RTreeI64};
//!
//! let mut index: Index<i64, u32, RTreeI64> = Index::new();
//! let keys = index.extend((0..100).map(|i| (Aabb2D::from_xywh(i * 10, 0, 8, 8), i as u32)));
//! assert_eq!(keys.len(), 100);
//!
//! let hit: Vec<_> = index.query_point(425, 4).map(|(_, id)| *id).collect();
//! assert_eq!(hit, [42]);
//! ```
//!
//! Float inputs are assumed to be finite (no NaNs).
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod backend;
pub mod backends;
mod index;
mod types;

pub use backend::Backend;
pub use backends::flatvec::FlatVec;
pub use backends::rtree::{RTree, RTreeF32, RTreeF64, RTreeI64};
pub use index::{Index, Key};
pub use types::{Aabb2D, Scalar};
