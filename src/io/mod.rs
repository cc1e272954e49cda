// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! File format collaborators for the CLI wrapper. Not part of the core engine:
//! the engine operates on plain positions and face indices and never touches disk.

pub mod json;
pub mod obj;

pub use json::PathDocument;
pub use obj::{read_obj, ObjMesh};
