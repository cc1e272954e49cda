// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Geodesic Kernel
//!
//! Heat Method geodesic distances and shortest paths on triangle meshes.
//! Given a triangle soup, builds a welded mesh graph for exact combinatorial
//! shortest paths (A*), and a pre-factored Heat Method solver for continuous
//! distance fields and steepest-descent geodesic tracing.

pub mod error;
pub mod heat;
pub mod io;
pub mod mesh;
pub mod pathfinding;
pub mod utils;

pub use error::{GeodesicError, Result};
pub use heat::{GeodesicPath, HeatGeodesicSolver};
pub use mesh::{weld, DiscreteOperators, MeshGraph, WeldedGeometry, DEFAULT_WELD_EPSILON};
pub use pathfinding::{closed_loop_from_vertices, closed_smooth, resample_by_arc_length, smooth, ClosedLoop};
