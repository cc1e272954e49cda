// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Discrete differential-geometry operators: cotangent Laplacian, lumped Voronoi
//! mass, and per-face gradient, assembled once per mesh and reused by the solver.

use nalgebra::{Point3, Vector3};
use nalgebra_sparse::{CooMatrix, CscMatrix};
use std::collections::HashMap;

/// Degenerate-face area threshold; faces at or below this contribute zero to
/// gradient/divergence and Voronoi mass.
const AREA_EPSILON: f64 = 1e-12;

/// Sparse operators derived once at construction and treated as immutable for the
/// solver's lifetime.
pub struct DiscreteOperators {
    /// n x n symmetric PSD cotangent Laplacian.
    pub laplacian: CscMatrix<f64>,
    /// n x n diagonal lumped (Voronoi) mass matrix.
    pub mass: CscMatrix<f64>,
    /// 3m x n per-face gradient operator.
    pub gradient: CscMatrix<f64>,
    /// Per-face area, length m.
    pub face_areas: Vec<f64>,
}

fn cotangent(p: &Point3<f64>, q: &Point3<f64>, r: &Point3<f64>) -> f64 {
    // cot of the angle at vertex p, opposite edge q-r.
    let u = q - p;
    let v = r - p;
    let cross_norm = u.cross(&v).norm();
    if cross_norm < 1e-18 {
        return 0.0;
    }
    u.dot(&v) / cross_norm
}

fn triangle_area(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
    0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
}

/// Assemble the cotangent Laplacian, Voronoi mass, face gradient, and face areas.
pub fn build(positions: &[Point3<f64>], triangles: &[[usize; 3]]) -> DiscreteOperators {
    let n = positions.len();
    let m = triangles.len();

    let mut off_diag: HashMap<(usize, usize), f64> = HashMap::new();
    let mut mass_diag = vec![0.0_f64; n];
    let mut face_areas = Vec::with_capacity(m);

    for tri in triangles {
        let [i, j, k] = *tri;
        let (pi, pj, pk) = (&positions[i], &positions[j], &positions[k]);
        let area = triangle_area(pi, pj, pk);
        face_areas.push(area);

        if area <= AREA_EPSILON {
            continue;
        }

        let cot_i = cotangent(pi, pj, pk);
        let cot_j = cotangent(pj, pk, pi);
        let cot_k = cotangent(pk, pi, pj);

        // Edge (i,j) is opposite vertex k; edge (j,k) opposite i; edge (k,i) opposite j.
        for &(a, b, cot_opposite) in &[(i, j, cot_k), (j, k, cot_i), (k, i, cot_j)] {
            let key = if a < b { (a, b) } else { (b, a) };
            *off_diag.entry(key).or_insert(0.0) += -0.5 * cot_opposite;
        }

        // Mixed Voronoi area, falling back to barycentric thirds for obtuse triangles.
        let is_obtuse_at = |cot: f64| cot < 0.0;
        if is_obtuse_at(cot_i) || is_obtuse_at(cot_j) || is_obtuse_at(cot_k) {
            let third = area / 3.0;
            mass_diag[i] += if is_obtuse_at(cot_i) { area / 2.0 } else { third };
            mass_diag[j] += if is_obtuse_at(cot_j) { area / 2.0 } else { third };
            mass_diag[k] += if is_obtuse_at(cot_k) { area / 2.0 } else { third };
        } else {
            let len_jk_sq = (pk - pj).norm_squared();
            let len_ki_sq = (pi - pk).norm_squared();
            let len_ij_sq = (pj - pi).norm_squared();
            mass_diag[i] += (cot_j * len_ki_sq + cot_k * len_ij_sq) / 8.0;
            mass_diag[j] += (cot_k * len_ij_sq + cot_i * len_jk_sq) / 8.0;
            mass_diag[k] += (cot_i * len_jk_sq + cot_j * len_ki_sq) / 8.0;
        }
    }

    let mut laplacian_coo = CooMatrix::new(n, n);
    let mut row_sums = vec![0.0_f64; n];
    for (&(a, b), &weight) in &off_diag {
        laplacian_coo.push(a, b, weight);
        laplacian_coo.push(b, a, weight);
        row_sums[a] += weight;
        row_sums[b] += weight;
    }
    for v in 0..n {
        laplacian_coo.push(v, v, -row_sums[v]);
    }
    let laplacian = CscMatrix::from(&laplacian_coo);

    let mut mass_coo = CooMatrix::new(n, n);
    for (v, &diag) in mass_diag.iter().enumerate() {
        mass_coo.push(v, v, diag);
    }
    let mass = CscMatrix::from(&mass_coo);

    let mut gradient_coo = CooMatrix::new(3 * m, n);
    for (f, tri) in triangles.iter().enumerate() {
        let [i, j, k] = *tri;
        let area = face_areas[f];
        if area <= AREA_EPSILON {
            continue;
        }
        let (pi, pj, pk) = (&positions[i], &positions[j], &positions[k]);
        let normal = (pj - pi).cross(&(pk - pi)).normalize();

        // grad(phi_v) for each vertex is the in-plane 90-degree rotation of the
        // opposite edge, scaled by 1/(2 * area).
        let grad_i = normal.cross(&(pk - pj)) / (2.0 * area);
        let grad_j = normal.cross(&(pi - pk)) / (2.0 * area);
        let grad_k = normal.cross(&(pj - pi)) / (2.0 * area);

        let row0 = 3 * f;
        for &(vertex, grad) in &[(i, grad_i), (j, grad_j), (k, grad_k)] {
            push_vector(&mut gradient_coo, row0, vertex, &grad);
        }
    }
    let gradient = CscMatrix::from(&gradient_coo);

    DiscreteOperators {
        laplacian,
        mass,
        gradient,
        face_areas,
    }
}

fn push_vector(coo: &mut CooMatrix<f64>, row0: usize, col: usize, v: &Vector3<f64>) {
    coo.push(row0, col, v.x);
    coo.push(row0 + 1, col, v.y);
    coo.push(row0 + 2, col, v.z);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn laplacian_rows_sum_to_zero() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let triangles = vec![[0, 1, 2], [1, 3, 2]];
        let ops = build(&positions, &triangles);

        let dense = nalgebra_sparse::convert::serial::convert_csc_dense(&ops.laplacian);
        for r in 0..dense.nrows() {
            let sum: f64 = dense.row(r).iter().sum();
            assert!(sum.abs() < 1e-9, "row {r} sums to {sum}");
        }
    }

    #[test]
    fn mass_is_positive_for_nondegenerate_mesh() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let triangles = vec![[0, 1, 2]];
        let ops = build(&positions, &triangles);
        let dense = nalgebra_sparse::convert::serial::convert_csc_dense(&ops.mass);
        for v in 0..3 {
            assert!(dense[(v, v)] > 0.0);
        }
    }

    #[test]
    fn degenerate_face_contributes_zero_area() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0), // colinear -> zero area
        ];
        let triangles = vec![[0, 1, 2]];
        let ops = build(&positions, &triangles);
        assert!(ops.face_areas[0] < AREA_EPSILON);
    }
}
