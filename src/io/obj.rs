// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Minimal OBJ reader for the CLI wrapper.
//!
//! Only `v` (vertex position) and `f` (face) lines are recognized; normals,
//! texture coordinates, materials, and groups are ignored. This is a CLI-only
//! collaborator, not part of the core engine's public contract — the core takes
//! plain `(positions, faces)` and knows nothing about file formats.

use anyhow::{anyhow, bail, Context, Result};
use nalgebra::Point3;
use std::path::Path;

/// Parsed OBJ geometry: positions plus zero-based triangle indices.
pub struct ObjMesh {
    pub positions: Vec<Point3<f64>>,
    pub faces: Vec<[usize; 3]>,
}

/// Read a `.obj` file, keeping only vertex positions and (triangulated) faces.
pub fn read_obj(path: &Path) -> Result<ObjMesh> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read OBJ file: {}", path.display()))?;

    let mut positions = Vec::new();
    let mut faces = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let tag = match tokens.next() {
            Some(t) => t,
            None => continue,
        };

        match tag {
            "v" => {
                let coords: Vec<f64> = tokens
                    .take(3)
                    .map(|t| t.parse::<f64>())
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| anyhow!("line {}: malformed vertex: {e}", line_no + 1))?;
                if coords.len() != 3 {
                    bail!("line {}: vertex needs 3 coordinates", line_no + 1);
                }
                positions.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            "f" => {
                // Face references may be "v", "v/vt", "v/vt/vn", or "v//vn"; only
                // the vertex index is relevant here. OBJ indices are 1-based and
                // may be negative (relative to the current vertex count).
                let indices: Vec<usize> = tokens
                    .map(|t| parse_face_index(t, positions.len(), line_no + 1))
                    .collect::<Result<_>>()?;
                if indices.len() < 3 {
                    bail!("line {}: face needs at least 3 vertices", line_no + 1);
                }
                // Fan-triangulate polygons with more than 3 vertices.
                for i in 1..indices.len() - 1 {
                    faces.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
            _ => continue,
        }
    }

    if positions.is_empty() {
        bail!("OBJ file {} has no vertices", path.display());
    }
    if faces.is_empty() {
        bail!("OBJ file {} has no faces", path.display());
    }

    Ok(ObjMesh { positions, faces })
}

fn parse_face_index(token: &str, vertex_count: usize, line_no: usize) -> Result<usize> {
    let vertex_part = token.split('/').next().unwrap_or(token);
    let raw: i64 = vertex_part
        .parse()
        .map_err(|e| anyhow!("line {line_no}: malformed face index '{token}': {e}"))?;
    let zero_based = if raw > 0 {
        (raw - 1) as usize
    } else if raw < 0 {
        vertex_count
            .checked_sub((-raw) as usize)
            .ok_or_else(|| anyhow!("line {line_no}: relative face index out of range"))?
    } else {
        bail!("line {line_no}: face index cannot be zero");
    };
    Ok(zero_based)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn reads_triangle() {
        let file = write_temp(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        );
        let mesh = read_obj(file.path()).unwrap();
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn fan_triangulates_quad() {
        let file = write_temp(
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n",
        );
        let mesh = read_obj(file.path()).unwrap();
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.faces[0], [0, 1, 2]);
        assert_eq!(mesh.faces[1], [0, 2, 3]);
    }

    #[test]
    fn ignores_normals_and_texcoords_in_face_refs() {
        let file = write_temp(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0 0\nf 1/1/1 2/2/1 3/3/1\n",
        );
        let mesh = read_obj(file.path()).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn errors_on_empty_mesh() {
        let file = write_temp("# no geometry here\n");
        assert!(read_obj(file.path()).is_err());
    }
}
