// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! A* shortest paths over the mesh graph, and path post-processing for display.

pub mod astar;
pub mod postprocess;

pub use postprocess::{closed_loop_from_vertices, closed_smooth, resample_by_arc_length, simplify, smooth, ClosedLoop};
