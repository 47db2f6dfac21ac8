//! JSON patch support: synthesizing "add" patches for partially existing
//! paths, RFC 6902 operation records, and applying them in memory.

pub mod apply;
pub mod generator;
pub mod operation;

pub use apply::{apply, apply_all};
pub use generator::generate_patch;
pub use operation::{Op, PatchOperation, PatchSet};
