// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! The Heat Method distance-field solver and its steepest-descent path tracer.

pub mod solver;

pub use solver::{GeodesicPath, HeatGeodesicSolver};
