//! Runtime configuration loading from environment variables.
//!
//! All values come from `BLOOM_*` environment variables with sensible
//! defaults. Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `BLOOM_BASE_PATH` | `.` | Directory containing `models/` |
//! | `BLOOM_MODEL_PATH` | `models/flower_classifier.onnx` | Model file, relative to base |
//! | `BLOOM_LABELS_PATH` | `models/labels.txt` | Labels file, relative to base |
//! | `BLOOM_MODEL_SHA256` | unset | Expected model digest (hex) |
//! | `BLOOM_TOP_K` | 1 | Predictions shown per image |
//! | `BLOOM_INPUT_SIZE` | 224 | Model input edge (pixels) |
//! | `BLOOM_CROP` | `center-crop` | `center-crop`, `scale-fit`, `scale-fill` |
//! | `BLOOM_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `BLOOM_LOG_LEVEL` | `info` | Tracing filter directive |
//! | `BLOOM_LOG_FILE` | unset | Log file (stderr when unset) |

use std::path::PathBuf;

use serde::Serialize;

use crate::engine::CropAndScale;
use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_MODEL_PATH: &str = "models/flower_classifier.onnx";
pub const DEFAULT_LABELS_PATH: &str = "models/labels.txt";
pub const DEFAULT_TOP_K: usize = 1;
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub base_path: String,
    pub model_path: String,
    pub labels_path: String,
    pub model_sha256: Option<String>,
    pub top_k: usize,
    pub input_size: u32,
    pub crop_and_scale: &'static str,
    pub log_format: &'static str,
    pub log_level: String,
    pub log_file: Option<String>,
}

/// All configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub base_path: PathBuf,
    pub model_path: String,
    pub labels_path: String,
    pub model_sha256: Option<String>,
    pub top_k: usize,
    pub input_size: u32,
    pub crop_and_scale: CropAndScale,
    pub log: LogConfig,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `u32` env var, returning `default` on missing or invalid.
fn parse_u32(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u32>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Non-empty string env var.
fn parse_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn load_log_config() -> LogConfig {
    let format = parse_string("BLOOM_LOG_FORMAT")
        .and_then(|v| LogFormat::from_name(&v))
        .unwrap_or_default();
    let level = parse_string("BLOOM_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
    let output_path = parse_string("BLOOM_LOG_FILE").map(PathBuf::from);
    LogConfig {
        format,
        level,
        output_path,
    }
}

/// Load all configuration from environment variables.
pub fn load() -> EnvConfig {
    let base_path = parse_string("BLOOM_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let model_path =
        parse_string("BLOOM_MODEL_PATH").unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());
    let labels_path =
        parse_string("BLOOM_LABELS_PATH").unwrap_or_else(|| DEFAULT_LABELS_PATH.to_string());
    let model_sha256 = parse_string("BLOOM_MODEL_SHA256");
    let top_k = parse_usize("BLOOM_TOP_K", DEFAULT_TOP_K).max(1);
    let input_size = parse_u32("BLOOM_INPUT_SIZE", DEFAULT_INPUT_SIZE).clamp(16, 2048);
    let crop_and_scale = parse_string("BLOOM_CROP")
        .and_then(|v| CropAndScale::from_name(&v))
        .unwrap_or_default();

    EnvConfig {
        base_path,
        model_path,
        labels_path,
        model_sha256,
        top_k,
        input_size,
        crop_and_scale,
        log: load_log_config(),
    }
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            base_path: self.base_path.display().to_string(),
            model_path: self.model_path.clone(),
            labels_path: self.labels_path.clone(),
            model_sha256: self.model_sha256.clone(),
            top_k: self.top_k,
            input_size: self.input_size,
            crop_and_scale: self.crop_and_scale.as_str(),
            log_format: match self.log.format {
                LogFormat::Json => "json",
                LogFormat::Pretty => "pretty",
            },
            log_level: self.log.level.clone(),
            log_file: self
                .log
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}
