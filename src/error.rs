// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Structured error taxonomy for the geodesic engine.

use thiserror::Error;

/// Errors produced by mesh ingest, the graph, the path finder, and the heat solver.
#[derive(Debug, Error)]
pub enum GeodesicError {
    /// Positions or faces were empty at ingest.
    #[error("mesh is empty: {0} vertices, {1} faces")]
    EmptyMesh(usize, usize),

    /// A triangle's three welded indices were not distinct.
    #[error("{0} triangle(s) had non-distinct welded indices and were dropped")]
    InvalidTriangle(usize),

    /// Every triangle collapsed to a degenerate triangle after welding.
    #[error("all {0} triangle(s) are degenerate after welding")]
    DegenerateGeometry(usize),

    /// A source/target/sources index fell outside `[0, n)`.
    #[error("index {index} out of range for {len} vertices")]
    IndexOutOfRange { index: usize, len: usize },

    /// A solver method was called on a solver that failed (or never finished) construction.
    #[error("solver is not initialized")]
    NotInitialized,

    /// Sparse factorization or a linear solve signaled failure.
    #[error("sparse solver failed: {0}")]
    SolverFailure(String),

    /// `distance_field` passed to `trace_path` did not match the solver's vertex count.
    #[error("distance field has {actual} entries, expected {expected}")]
    FieldSizeMismatch { expected: usize, actual: usize },

    /// A closed loop could not be built from fewer than three distinct vertices.
    #[error("closed loop requires at least 3 distinct vertices, got {0}")]
    InsufficientPoints(usize),
}

pub type Result<T> = std::result::Result<T, GeodesicError>;
