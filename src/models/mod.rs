//! Model artifact management: path validation, labels, integrity checks.

mod loader;

pub use loader::{file_sha256, LoadError, ModelLoader, ModelPath};
