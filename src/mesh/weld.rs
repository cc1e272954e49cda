// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Coincident-vertex welding for a triangle soup.

use crate::error::{GeodesicError, Result};
use nalgebra::Point3;
use std::collections::HashMap;

/// Default welding epsilon, in world units.
pub const DEFAULT_WELD_EPSILON: f64 = 1e-5;

/// Output of [`weld`]: a canonical vertex set plus the maps needed to rewrite faces.
#[derive(Debug, Clone)]
pub struct WeldedGeometry {
    /// Canonical, deduplicated positions.
    pub positions: Vec<Point3<f64>>,
    /// `orig_to_welded[i]` is the welded index of original vertex `i`.
    pub orig_to_welded: Vec<usize>,
    /// Triangles rewritten through `orig_to_welded`, degenerate ones dropped.
    pub triangles: Vec<[usize; 3]>,
    /// Number of input triangles dropped for having non-distinct welded indices.
    pub degenerate_faces: usize,
}

type BucketKey = (i64, i64, i64);

fn quantize(p: &Point3<f64>, epsilon: f64) -> BucketKey {
    (
        (p.x / epsilon).round() as i64,
        (p.y / epsilon).round() as i64,
        (p.z / epsilon).round() as i64,
    )
}

/// Weld a triangle soup: collapse vertices that quantize to the same epsilon-bucket
/// and rewrite triangles through the resulting canonical index map.
///
/// The first original vertex seen in a bucket becomes that bucket's canonical index;
/// later vertices in the same bucket map to it. A face whose three welded indices are
/// not pairwise distinct is dropped (and counted in `degenerate_faces`), not aborted.
pub fn weld(
    positions: &[Point3<f64>],
    faces: &[[usize; 3]],
    epsilon: f64,
) -> Result<WeldedGeometry> {
    if positions.is_empty() || faces.is_empty() {
        return Err(GeodesicError::EmptyMesh(positions.len(), faces.len()));
    }

    let mut buckets: HashMap<BucketKey, usize> = HashMap::with_capacity(positions.len());
    let mut welded_positions = Vec::with_capacity(positions.len());
    let mut orig_to_welded = Vec::with_capacity(positions.len());

    for p in positions {
        let key = quantize(p, epsilon);
        let welded_index = *buckets.entry(key).or_insert_with(|| {
            let idx = welded_positions.len();
            welded_positions.push(*p);
            idx
        });
        orig_to_welded.push(welded_index);
    }

    let mut triangles = Vec::with_capacity(faces.len());
    let mut degenerate_faces = 0usize;
    for face in faces {
        for &v in face {
            if v >= positions.len() {
                return Err(GeodesicError::IndexOutOfRange {
                    index: v,
                    len: positions.len(),
                });
            }
        }
        let welded = [
            orig_to_welded[face[0]],
            orig_to_welded[face[1]],
            orig_to_welded[face[2]],
        ];
        if welded[0] == welded[1] || welded[1] == welded[2] || welded[0] == welded[2] {
            degenerate_faces += 1;
            continue;
        }
        triangles.push(welded);
    }

    if triangles.is_empty() {
        return Err(GeodesicError::DegenerateGeometry(faces.len()));
    }

    log::debug!(
        "welded {} vertices -> {} ({} buckets), dropped {} degenerate face(s)",
        positions.len(),
        welded_positions.len(),
        buckets.len(),
        degenerate_faces,
    );

    Ok(WeldedGeometry {
        positions: welded_positions,
        orig_to_welded,
        triangles,
        degenerate_faces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welds_coincident_vertices() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0), // duplicate of 0
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 2, 3], [1, 2, 3]];
        let welded = weld(&positions, &faces, DEFAULT_WELD_EPSILON).unwrap();

        assert_eq!(welded.positions.len(), 3);
        assert_eq!(welded.orig_to_welded[0], welded.orig_to_welded[1]);
        assert_eq!(welded.degenerate_faces, 0);
        // Both faces reference the same welded triangle.
        assert_eq!(welded.triangles[0], welded.triangles[1]);
    }

    #[test]
    fn drops_degenerate_faces_but_keeps_mesh() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        // Face (0,0,1) is degenerate: index 0 repeated.
        let faces = vec![[0, 0, 1], [0, 1, 2]];
        let welded = weld(&positions, &faces, DEFAULT_WELD_EPSILON).unwrap();

        assert_eq!(welded.degenerate_faces, 1);
        assert_eq!(welded.triangles.len(), 1);
    }

    #[test]
    fn fails_on_all_degenerate() {
        let positions = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let faces = vec![[0, 0, 1]];
        let err = weld(&positions, &faces, DEFAULT_WELD_EPSILON).unwrap_err();
        assert!(matches!(err, GeodesicError::DegenerateGeometry(1)));
    }

    #[test]
    fn fails_on_out_of_range_face_index() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        // Vertex 5 doesn't exist; a malformed OBJ `f` line could produce this.
        let faces = vec![[0, 1, 5]];
        let err = weld(&positions, &faces, DEFAULT_WELD_EPSILON).unwrap_err();
        assert!(matches!(
            err,
            GeodesicError::IndexOutOfRange { index: 5, len: 3 }
        ));
    }

    #[test]
    fn fails_on_empty_input() {
        let err = weld(&[], &[], DEFAULT_WELD_EPSILON).unwrap_err();
        assert!(matches!(err, GeodesicError::EmptyMesh(0, 0)));
    }

    #[test]
    fn welding_is_order_insensitive_within_a_bucket() {
        // Two vertices within epsilon of each other should weld to the same index
        // regardless of which one is visited first, as long as input order is fixed.
        let epsilon = 1e-3;
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0001, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let faces = vec![[0, 1, 2]];
        let welded = weld(&positions, &faces, epsilon).unwrap();
        // Face is degenerate since 0 and 1 weld together.
        assert_eq!(welded.degenerate_faces, 1);
    }
}
