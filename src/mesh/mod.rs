// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh ingest, the welded mesh graph, and discrete differential-geometry operators.

pub mod graph;
pub mod operators;
pub mod weld;

pub use graph::MeshGraph;
pub use operators::DiscreteOperators;
pub use weld::{weld, WeldedGeometry, DEFAULT_WELD_EPSILON};
