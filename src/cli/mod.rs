// Copyright 2026 bloom-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI module for bloom-core commands.
//!
//! ## Usage
//!
//! ```bash
//! bloom-core classify photo.jpg              # Top prediction
//! bloom-core classify photo.jpg --top-k 3    # Top three, one per line
//! bloom-core config show                     # Effective configuration
//! ```

pub mod classify_cmd;
pub mod config_cmd;

pub use classify_cmd::{run_classify, ClassifyArgs};

use thiserror::Error;

/// Exit code for success.
pub const EXIT_OK: i32 = 0;
/// Exit code when classification produced no predictions.
pub const EXIT_NO_PREDICTIONS: i32 = 1;
/// Exit code for usage or configuration errors.
pub const EXIT_CONFIG: i32 = 2;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    Usage(String),

    #[error("Failed to read image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to prepare classifier: {0}")]
    Bootstrap(#[from] crate::BootstrapError),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}
