// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe Geodesic CLI
//!
//! Offline wrapper around the geodesic engine: load an OBJ mesh, run the Heat
//! Method between two vertices, and write the traced path as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use geomesh_geodesic::{HeatGeodesicSolver, MeshGraph};
use geomesh_geodesic::io::{obj, PathDocument};
use std::path::PathBuf;

const DEFAULT_TIME_SCALE: f64 = 1.0;
const DEFAULT_DESCENT_EPSILON: f64 = 1e-9;

/// Compute a geodesic path between two vertices of a triangle mesh.
#[derive(Parser)]
#[command(name = "geodesic-cli")]
#[command(about = "Heat Method geodesic distances and paths on triangle meshes", long_about = None)]
struct Cli {
    /// Input mesh in Wavefront OBJ format (v/f lines only)
    mesh: PathBuf,

    /// Source vertex index (0-based, into the OBJ's vertex list)
    source: usize,

    /// Target vertex index (0-based, into the OBJ's vertex list)
    target: usize,

    /// Output JSON path
    #[arg(default_value = "geodesic_path.json")]
    output: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mesh = obj::read_obj(&cli.mesh)
        .with_context(|| format!("failed to load mesh {}", cli.mesh.display()))?;
    log::info!(
        "loaded {} with {} vertices, {} faces",
        cli.mesh.display(),
        mesh.positions.len(),
        mesh.faces.len()
    );

    let graph = MeshGraph::build_default(&mesh.positions, &mesh.faces)
        .context("failed to build mesh graph")?;

    let source = graph
        .merged_index(cli.source)
        .context("source vertex index out of range")?;
    let target = graph
        .merged_index(cli.target)
        .context("target vertex index out of range")?;

    let solver = HeatGeodesicSolver::new(&mesh.positions, &mesh.faces, DEFAULT_TIME_SCALE)
        .context("failed to build heat solver")?;

    let field = solver
        .compute_distance(&[source])
        .context("heat method distance computation failed")?;
    let path = solver
        .trace_path(&field, source, target, DEFAULT_DESCENT_EPSILON)
        .context("failed to trace geodesic path")?;

    if path.stalled {
        log::warn!("path tracer stalled before reaching the source vertex");
    }
    log::info!(
        "geodesic length {:.6}, {} polyline point(s)",
        path.length,
        path.polyline.len()
    );

    let document = PathDocument::new(&path.polyline);
    let json = document
        .to_json_string()
        .context("failed to serialize path to JSON")?;
    std::fs::write(&cli.output, json)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    println!(
        "wrote {} ({} points, length {:.6}) -> {}",
        if path.stalled { "partial path" } else { "path" },
        path.polyline.len(),
        path.length,
        cli.output.display()
    );

    Ok(())
}
