// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Path post-processing: Douglas-Peucker simplification, centripetal Catmull-Rom
//! smoothing, and arc-length-equidistant resampling.

use crate::error::{GeodesicError, Result};
use crate::mesh::graph::MeshGraph;
use nalgebra::Point3;

/// Result of [`closed_loop_from_vertices`]: the simplified welded-vertex sequence
/// plus the resampled polyline, flattened to `[x0, y0, z0, x1, y1, z1, ...]` per the
/// published external JSON/array contract for renderer consumption.
#[derive(Debug, Clone)]
pub struct ClosedLoop {
    pub simplified_vertices: Vec<usize>,
    pub polyline_flat: Vec<f64>,
}

/// Perpendicular distance from `p` to the segment `a-b`, clamping the projection to
/// the segment span (so points beyond an endpoint measure distance to that endpoint).
fn point_segment_distance(p: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-18 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    let projection = a + ab * t;
    (p - projection).norm()
}

fn simplify_range(points: &[Point3<f64>], start: usize, end: usize, epsilon: f64, keep: &mut [bool]) {
    if end <= start + 1 {
        return;
    }
    let mut max_dist = 0.0;
    let mut max_index = start;
    for i in (start + 1)..end {
        let dist = point_segment_distance(&points[i], &points[start], &points[end]);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }
    if max_dist > epsilon {
        keep[max_index] = true;
        simplify_range(points, start, max_index, epsilon, keep);
        simplify_range(points, max_index, end, epsilon, keep);
    }
}

/// Douglas-Peucker simplification. Always keeps both endpoints; `epsilon` is the
/// perpendicular-distance tolerance below which interior points are dropped.
pub fn simplify(points: &[Point3<f64>], epsilon: f64) -> Vec<Point3<f64>> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    *keep.last_mut().unwrap() = true;
    simplify_range(points, 0, points.len() - 1, epsilon, &mut keep);

    points
        .iter()
        .zip(keep.iter())
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

/// Simplify welded-vertex indices by their positions, returning the surviving indices.
pub fn simplify_indices(graph: &MeshGraph, indices: &[usize], epsilon: Option<f64>) -> Vec<usize> {
    let epsilon = epsilon.unwrap_or(graph.average_edge_length() * 0.1);
    if indices.len() < 3 {
        return indices.to_vec();
    }
    let points: Vec<Point3<f64>> = indices
        .iter()
        .filter_map(|&i| graph.position(i))
        .collect();
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    *keep.last_mut().unwrap() = true;
    simplify_range(&points, 0, points.len() - 1, epsilon, &mut keep);
    indices
        .iter()
        .zip(keep.iter())
        .filter_map(|(&v, &k)| k.then_some(v))
        .collect()
}

fn chord_param(p0: &Point3<f64>, p1: &Point3<f64>, prev_t: f64) -> f64 {
    // Centripetal parametrization: knot spacing uses sqrt(chord length).
    let d = (p1 - p0).norm().sqrt();
    prev_t + d.max(1e-12)
}

fn catmull_rom_point(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    t0: f64,
    t1: f64,
    t2: f64,
    t3: f64,
    t: f64,
) -> Point3<f64> {
    let a1 = p0 * ((t1 - t) / (t1 - t0)) + p1.coords * ((t - t0) / (t1 - t0));
    let a2 = p1 * ((t2 - t) / (t2 - t1)) + p2.coords * ((t - t1) / (t2 - t1));
    let a3 = p2 * ((t3 - t) / (t3 - t2)) + p3.coords * ((t - t2) / (t3 - t2));

    let b1 = a1 * ((t2 - t) / (t2 - t0)) + a2.coords * ((t - t0) / (t2 - t0));
    let b2 = a2 * ((t3 - t) / (t3 - t1)) + a3.coords * ((t - t1) / (t3 - t1));

    Point3::from(b1 * ((t2 - t) / (t2 - t1)) + b2.coords * ((t - t1) / (t2 - t1)))
}

/// Centripetal Catmull-Rom interpolation through control points.
///
/// Two points produce a straight line (linear interpolation). Three or more produce
/// `(n - 1) * samples_per_segment + 1` samples spanning the full control polyline.
pub fn smooth(points: &[Point3<f64>], samples_per_segment: usize) -> Vec<Point3<f64>> {
    if points.len() < 2 {
        return points.to_vec();
    }
    if points.len() == 2 {
        let samples = samples_per_segment.max(1);
        return (0..=samples)
            .map(|i| {
                let t = i as f64 / samples as f64;
                Point3::from(points[0].coords.lerp(&points[1].coords, t))
            })
            .collect();
    }

    let n = points.len();
    let samples = samples_per_segment.max(1);
    let mut result = Vec::with_capacity((n - 1) * samples + 1);

    for seg in 0..(n - 1) {
        // Phantom control points at the open ends (clamp instead of wrapping).
        let p0 = if seg == 0 { points[0] } else { points[seg - 1] };
        let p1 = points[seg];
        let p2 = points[seg + 1];
        let p3 = if seg + 2 < n { points[seg + 2] } else { points[n - 1] };

        let t0 = 0.0;
        let t1 = chord_param(&p0, &p1, t0);
        let t2 = chord_param(&p1, &p2, t1);
        let t3 = chord_param(&p2, &p3, t2);

        let last_sample = if seg == n - 2 { samples } else { samples - 1 };
        for s in 0..=last_sample {
            let u = s as f64 / samples as f64;
            let t = t1 + (t2 - t1) * u;
            result.push(catmull_rom_point(&p0, &p1, &p2, &p3, t0, t1, t2, t3, t));
        }
    }
    result
}

/// Closed centripetal Catmull-Rom: treats the control polyline as a loop and emits
/// `n * samples_per_segment` samples over the full cycle.
pub fn closed_smooth(points: &[Point3<f64>], samples_per_segment: usize) -> Vec<Point3<f64>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let samples = samples_per_segment.max(1);
    let mut result = Vec::with_capacity(n * samples);

    let at = |i: isize| -> Point3<f64> {
        let idx = i.rem_euclid(n as isize) as usize;
        points[idx]
    };

    for seg in 0..n {
        let p0 = at(seg as isize - 1);
        let p1 = at(seg as isize);
        let p2 = at(seg as isize + 1);
        let p3 = at(seg as isize + 2);

        let t0 = 0.0;
        let t1 = chord_param(&p0, &p1, t0);
        let t2 = chord_param(&p1, &p2, t1);
        let t3 = chord_param(&p2, &p3, t2);

        for s in 0..samples {
            let u = s as f64 / samples as f64;
            let t = t1 + (t2 - t1) * u;
            result.push(catmull_rom_point(&p0, &p1, &p2, &p3, t0, t1, t2, t3, t));
        }
    }
    result
}

/// Resample a polyline to (approximately) equal arc-length spacing.
///
/// `numSamples = max(2, ceil(total_length / spacing) + 1)`. The final sample is
/// overwritten with the exact input endpoint unless the remaining gap exceeds 10% of
/// the target spacing, in which case the endpoint is appended as an extra sample.
pub fn resample_by_arc_length(points: &[Point3<f64>], spacing: f64) -> Vec<Point3<f64>> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let spacing = spacing.max(1e-9);

    let mut cumulative = vec![0.0; points.len()];
    for i in 1..points.len() {
        cumulative[i] = cumulative[i - 1] + (points[i] - points[i - 1]).norm();
    }
    let total = *cumulative.last().unwrap();
    if total < 1e-12 {
        return vec![points[0], *points.last().unwrap()];
    }

    let num_samples = ((total / spacing).ceil() as usize + 1).max(2);

    let mut result = Vec::with_capacity(num_samples);
    let mut seg = 0usize;
    for i in 0..num_samples {
        let target = total * (i as f64) / ((num_samples - 1) as f64);
        while seg + 1 < cumulative.len() - 1 && cumulative[seg + 1] < target {
            seg += 1;
        }
        let seg_start = cumulative[seg];
        let seg_end = cumulative[seg + 1];
        let local_t = if seg_end - seg_start > 1e-18 {
            (target - seg_start) / (seg_end - seg_start)
        } else {
            0.0
        };
        let point = Point3::from(points[seg].coords.lerp(&points[seg + 1].coords, local_t));
        result.push(point);
    }

    let last_point = *points.last().unwrap();
    let last_sample = *result.last().unwrap();
    let remaining_gap = (last_point - last_sample).norm();
    if remaining_gap > 0.1 * spacing {
        result.push(last_point);
    } else {
        *result.last_mut().unwrap() = last_point;
    }
    result
}

/// Compose the closed-loop pipeline: filter out-of-range indices, collapse
/// consecutive duplicates, drop a head-tail duplicate, connect consecutive vertices
/// via shortest path, dedupe across segment boundaries, remove a wrap-around
/// duplicate, simplify, closed-smooth, and resample.
pub fn closed_loop_from_vertices(graph: &MeshGraph, surface_vertices: &[usize]) -> Result<ClosedLoop> {
    let n = graph.positions().len();
    let mut filtered: Vec<usize> = surface_vertices.iter().copied().filter(|&v| v < n).collect();

    filtered.dedup();
    if filtered.len() >= 2 && filtered.first() == filtered.last() {
        filtered.pop();
    }

    let distinct: std::collections::HashSet<usize> = filtered.iter().copied().collect();
    if distinct.len() < 3 {
        return Err(GeodesicError::InsufficientPoints(distinct.len()));
    }

    let mut stitched: Vec<usize> = Vec::new();
    for window in filtered.windows(2) {
        let segment = graph.shortest_path(window[0], window[1]);
        if segment.is_empty() {
            continue;
        }
        if stitched.last() == Some(&segment[0]) {
            stitched.extend_from_slice(&segment[1..]);
        } else {
            stitched.extend_from_slice(&segment);
        }
    }
    // Close the loop: connect the last vertex back to the first.
    if let (Some(&last), Some(&first)) = (filtered.last(), filtered.first()) {
        let closing = graph.shortest_path(last, first);
        if !closing.is_empty() {
            if stitched.last() == Some(&closing[0]) {
                stitched.extend_from_slice(&closing[1..]);
            } else {
                stitched.extend_from_slice(&closing);
            }
        }
    }

    stitched.dedup();
    if stitched.len() >= 2 && stitched.first() == stitched.last() {
        stitched.pop();
    }

    let distinct_stitched: std::collections::HashSet<usize> = stitched.iter().copied().collect();
    if distinct_stitched.len() < 3 {
        return Err(GeodesicError::InsufficientPoints(distinct_stitched.len()));
    }

    let simplified_vertices = simplify_indices(graph, &stitched, None);
    if simplified_vertices.len() < 3 {
        return Err(GeodesicError::InsufficientPoints(simplified_vertices.len()));
    }

    let control_points: Vec<Point3<f64>> = simplified_vertices
        .iter()
        .filter_map(|&v| graph.position(v))
        .collect();

    // closed_smooth's samples wrap around the loop but never revisit its own first
    // point; close the polyline explicitly before handing it to the open-curve
    // arc-length resampler so first and last resampled points coincide.
    let mut smoothed = closed_smooth(&control_points, 4);
    if let Some(&first) = smoothed.first() {
        smoothed.push(first);
    }
    let resampled = graph.resample_default(&smoothed);

    let mut polyline_flat = Vec::with_capacity(resampled.len() * 3);
    for p in &resampled {
        polyline_flat.push(p.x);
        polyline_flat.push(p.y);
        polyline_flat.push(p.z);
    }

    Ok(ClosedLoop {
        simplified_vertices,
        polyline_flat,
    })
}
