//! URL handling module for Sumi-Mirror
//!
//! This module provides seed validation, reference resolution against a base URL,
//! origin comparison and the path heuristic used by the pattern scanners.

mod normalize;
mod origin;

pub use normalize::{looks_like_path, normalize_seed, resolve_reference};
pub use origin::{same_origin, Origin};
