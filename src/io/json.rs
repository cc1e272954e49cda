// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON polyline export for geodesic path output.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A single point in the exported polyline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Point3<f64>> for PathPoint {
    fn from(p: Point3<f64>) -> Self {
        Self { x: p.x, y: p.y, z: p.z }
    }
}

/// Top-level export document: `{"path": [{"x","y","z"}, ...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathDocument {
    pub path: Vec<PathPoint>,
}

impl PathDocument {
    pub fn new(points: &[Point3<f64>]) -> Self {
        Self {
            path: points.iter().copied().map(PathPoint::from).collect(),
        }
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
