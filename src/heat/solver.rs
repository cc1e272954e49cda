// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Heat Method geodesic distance solver and steepest-descent path tracer.

use crate::error::{GeodesicError, Result};
use crate::mesh::operators::{self, DiscreteOperators};
use nalgebra::{DVector, Point3, Vector3};
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::CscMatrix;

/// Regularization added to the Poisson matrix to handle the Laplacian's
/// single-dimensional null space on a connected component.
const POISSON_REGULARIZATION: f64 = 1e-8;

/// Floor applied to the diffusion time scale so degenerate (near-zero) mesh scales
/// don't produce a singular heat matrix.
const MIN_TIME_SCALE: f64 = 1e-7;

/// Minimum gradient norm treated as non-zero when normalizing the negative gradient
/// field in step 2 of the Heat Method.
const GRADIENT_NORM_EPSILON: f64 = 1e-12;

/// Thin wrapper around a sparse Cholesky factorization that accepts and returns
/// plain `DVector<f64>`, independent of the exact shape `nalgebra_sparse` hands back.
struct SparseFactor {
    inner: CscCholesky<f64>,
}

impl SparseFactor {
    fn factor(matrix: &CscMatrix<f64>) -> Result<Self> {
        let inner = CscCholesky::factor(matrix)
            .map_err(|e| GeodesicError::SolverFailure(format!("{e:?}")))?;
        Ok(Self { inner })
    }

    fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>> {
        let solution = self.inner.solve(rhs);
        let values: Vec<f64> = solution.iter().copied().collect();
        if values.len() != rhs.len() || values.iter().any(|v| !v.is_finite()) {
            return Err(GeodesicError::SolverFailure(
                "linear solve produced a non-finite or mis-shaped result".to_string(),
            ));
        }
        Ok(DVector::from_vec(values))
    }
}

/// An extracted geodesic path: the welded-vertex walk, its 3-D polyline, and its
/// length (the distance-field value at the target).
#[derive(Debug, Clone)]
pub struct GeodesicPath {
    pub vertices: Vec<usize>,
    pub polyline: Vec<Point3<f64>>,
    pub length: f64,
    /// True if steepest descent hit a local minimum before reaching `source`; the
    /// walk is a best-effort prefix with `source` prepended in that case.
    pub stalled: bool,
}

/// Pre-factored Heat Method solver for a single mesh, reused across many source
/// queries. Construction is the only place operators and factorizations are built;
/// both are immutable for the solver's lifetime.
pub struct HeatGeodesicSolver {
    positions: Vec<Point3<f64>>,
    triangles: Vec<[usize; 3]>,
    operators: DiscreteOperators,
    heat_factor: SparseFactor,
    poisson_factor: SparseFactor,
    neighbors: Vec<Vec<usize>>,
}

impl HeatGeodesicSolver {
    /// Build the solver from a triangle soup, welding first, then assembling and
    /// factorizing `M + tL` and `L + εM`.
    pub fn new(positions: &[Point3<f64>], faces: &[[usize; 3]], time_scale: f64) -> Result<Self> {
        let welded = crate::mesh::weld::weld(positions, faces, crate::mesh::weld::DEFAULT_WELD_EPSILON)?;
        let average_edge_length = average_edge_length(&welded.positions, &welded.triangles);
        Self::assemble(welded.positions, welded.triangles, average_edge_length, time_scale)
    }

    /// Build from an already-welded position/triangle set plus its mean edge length,
    /// e.g. reusing a [`MeshGraph`] the caller already built.
    pub fn from_welded(
        positions: Vec<Point3<f64>>,
        triangles: Vec<[usize; 3]>,
        average_edge_length: f64,
        time_scale: f64,
    ) -> Result<Self> {
        Self::assemble(positions, triangles, average_edge_length, time_scale)
    }

    fn assemble(
        positions: Vec<Point3<f64>>,
        triangles: Vec<[usize; 3]>,
        average_edge_length: f64,
        time_scale: f64,
    ) -> Result<Self> {
        let n = positions.len();
        let operators = operators::build(&positions, &triangles);

        let t = (time_scale * average_edge_length * average_edge_length).max(MIN_TIME_SCALE);

        let heat_matrix = csc_add(&operators.mass, &csc_scale(&operators.laplacian, t));
        let poisson_matrix = csc_add(
            &operators.laplacian,
            &csc_scale(&operators.mass, POISSON_REGULARIZATION),
        );

        let heat_factor = SparseFactor::factor(&heat_matrix)?;
        let poisson_factor = SparseFactor::factor(&poisson_matrix)?;

        let mut neighbors = vec![Vec::new(); n];
        for tri in &triangles {
            for &(a, b) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if !neighbors[a].contains(&b) {
                    neighbors[a].push(b);
                }
                if !neighbors[b].contains(&a) {
                    neighbors[b].push(a);
                }
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        log::debug!(
            "heat solver built: {n} vertices, {} triangles, t={t:.6}",
            triangles.len()
        );

        Ok(Self {
            positions,
            triangles,
            operators,
            heat_factor,
            poisson_factor,
            neighbors,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.vertex_count() {
            return Err(GeodesicError::IndexOutOfRange {
                index,
                len: self.vertex_count(),
            });
        }
        Ok(())
    }

    /// Compute the Heat Method distance field from a set of source vertices.
    pub fn compute_distance(&self, sources: &[usize]) -> Result<Vec<f64>> {
        if sources.is_empty() {
            return Err(GeodesicError::IndexOutOfRange {
                index: 0,
                len: self.vertex_count(),
            });
        }
        for &s in sources {
            self.check_index(s)?;
        }

        log::debug!("compute_distance: {} source(s)", sources.len());

        let n = self.vertex_count();
        let mut delta = DVector::<f64>::zeros(n);
        for &s in sources {
            delta[s] = 1.0;
        }

        // Step 1: short-time heat diffusion, solve (M + tL) u = M delta.
        let rhs = csc_mul_vec(&self.operators.mass, &delta);
        let u = self.heat_factor.solve(&rhs)?;

        // Step 2: per-face negative gradient of u (via the cached gradient operator), normalized.
        let m = self.triangles.len();
        let grad_u = csc_mul_vec(&self.operators.gradient, &u);
        let mut field = vec![Vector3::zeros(); m];
        for f in 0..m {
            let neg_grad = -Vector3::new(grad_u[3 * f], grad_u[3 * f + 1], grad_u[3 * f + 2]);
            let norm = neg_grad.norm();
            field[f] = if norm > GRADIENT_NORM_EPSILON {
                neg_grad / norm
            } else {
                Vector3::zeros()
            };
        }

        // Step 3: stacked, area-weighted field, then div = G^T * weighted_field.
        let mut stacked = DVector::<f64>::zeros(3 * m);
        for (f, x) in field.iter().enumerate() {
            let area = self.operators.face_areas[f];
            stacked[3 * f] = x.x * area;
            stacked[3 * f + 1] = x.y * area;
            stacked[3 * f + 2] = x.z * area;
        }
        let div = csc_transpose_mul_vec(&self.operators.gradient, &stacked);

        // Step 4: solve (L + eps M) phi = div.
        let phi = self.poisson_factor.solve(&div)?;

        // Step 5: shift so the minimum is zero, clamp non-negative.
        let min_phi = phi.iter().cloned().fold(f64::INFINITY, f64::min);
        let distances: Vec<f64> = phi.iter().map(|&v| (v - min_phi).max(0.0)).collect();

        Ok(distances)
    }

    /// Greedy steepest-descent trace from `target` back to `source` over the field.
    pub fn trace_path(
        &self,
        field: &[f64],
        source: usize,
        target: usize,
        descent_epsilon: f64,
    ) -> Result<GeodesicPath> {
        if field.len() != self.vertex_count() {
            return Err(GeodesicError::FieldSizeMismatch {
                expected: self.vertex_count(),
                actual: field.len(),
            });
        }
        self.check_index(source)?;
        self.check_index(target)?;

        let n = self.vertex_count();
        let max_iterations = 2 * n;

        let mut walk = vec![target];
        let mut current = target;
        let mut stalled = true;

        for _ in 0..max_iterations {
            if current == source {
                stalled = false;
                break;
            }
            let mut best: Option<(usize, f64)> = None;
            for &neighbor in &self.neighbors[current] {
                let decrease = field[current] - field[neighbor];
                if decrease > descent_epsilon {
                    if best.map(|(_, d)| field[neighbor] < d).unwrap_or(true) {
                        best = Some((neighbor, field[neighbor]));
                    }
                }
            }
            match best {
                Some((next, _)) => {
                    walk.push(next);
                    current = next;
                }
                None => break, // local minimum
            }
        }

        if current == source {
            stalled = false;
        }

        walk.reverse();
        if stalled && walk.first() != Some(&source) {
            walk.insert(0, source);
        }

        if stalled {
            log::warn!(
                "trace_path stalled before reaching source {source} (target {target})"
            );
        }

        let polyline: Vec<Point3<f64>> = walk.iter().map(|&v| self.positions[v]).collect();

        Ok(GeodesicPath {
            vertices: walk,
            polyline,
            length: field[target],
            stalled,
        })
    }
}

/// Mean Euclidean edge length over a welded triangle list; `0.01` if there are no edges.
fn average_edge_length(positions: &[Point3<f64>], triangles: &[[usize; 3]]) -> f64 {
    use std::collections::HashSet;
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut total = 0.0;
    let mut count = 0usize;
    for tri in triangles {
        for &(a, b) in &[(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let key = if a < b { (a, b) } else { (b, a) };
            if seen.insert(key) {
                total += (positions[a] - positions[b]).norm();
                count += 1;
            }
        }
    }
    if count == 0 {
        0.01
    } else {
        total / count as f64
    }
}

fn csc_scale(matrix: &CscMatrix<f64>, scalar: f64) -> CscMatrix<f64> {
    matrix * scalar
}

fn csc_add(a: &CscMatrix<f64>, b: &CscMatrix<f64>) -> CscMatrix<f64> {
    a + b
}

fn csc_mul_vec(matrix: &CscMatrix<f64>, v: &DVector<f64>) -> DVector<f64> {
    matrix * v
}

fn csc_transpose_mul_vec(matrix: &CscMatrix<f64>, v: &DVector<f64>) -> DVector<f64> {
    matrix.transpose() * v
}
