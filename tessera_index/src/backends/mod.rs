// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans (small, simple).
//! - `rtree`: R-tree with STR bulk loading, least-enlargement insertion, and a
//!   margin/overlap driven split (aliases: `RTreeF32`, `RTreeF64`, `RTreeI64`).

pub mod flatvec;
pub mod rtree;
