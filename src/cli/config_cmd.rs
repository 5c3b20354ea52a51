// Copyright 2026 bloom-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults.
//!
//! These commands read configuration directly from environment variables.

use crate::config::{self, EffectiveConfig};

/// Print effective config as key-value pairs, or JSON.
pub fn run_show(json: bool) -> i32 {
    let cfg = config::load().effective_config();
    if json {
        match serde_json::to_string_pretty(&cfg) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Failed to encode config: {}", e);
                return super::EXIT_CONFIG;
            }
        }
    } else {
        for line in format_config(&cfg) {
            println!("{}", line);
        }
    }
    super::EXIT_OK
}

/// Print documented default values (no env overrides).
pub fn run_defaults() {
    println!("BLOOM_BASE_PATH=.");
    println!("BLOOM_MODEL_PATH={}", config::DEFAULT_MODEL_PATH);
    println!("BLOOM_LABELS_PATH={}", config::DEFAULT_LABELS_PATH);
    println!("BLOOM_MODEL_SHA256=");
    println!("BLOOM_TOP_K={}", config::DEFAULT_TOP_K);
    println!("BLOOM_INPUT_SIZE={}", config::DEFAULT_INPUT_SIZE);
    println!("BLOOM_CROP=center-crop");
    println!("BLOOM_LOG_FORMAT=json");
    println!("BLOOM_LOG_LEVEL=info");
    println!("BLOOM_LOG_FILE=");
}

fn format_config(cfg: &EffectiveConfig) -> Vec<String> {
    vec![
        format!("BLOOM_BASE_PATH={}", cfg.base_path),
        format!("BLOOM_MODEL_PATH={}", cfg.model_path),
        format!("BLOOM_LABELS_PATH={}", cfg.labels_path),
        format!(
            "BLOOM_MODEL_SHA256={}",
            cfg.model_sha256.as_deref().unwrap_or("")
        ),
        format!("BLOOM_TOP_K={}", cfg.top_k),
        format!("BLOOM_INPUT_SIZE={}", cfg.input_size),
        format!("BLOOM_CROP={}", cfg.crop_and_scale),
        format!("BLOOM_LOG_FORMAT={}", cfg.log_format),
        format!("BLOOM_LOG_LEVEL={}", cfg.log_level),
        format!("BLOOM_LOG_FILE={}", cfg.log_file.as_deref().unwrap_or("")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_config_lists_every_key() {
        let cfg = EffectiveConfig {
            base_path: "/srv/bloom".into(),
            model_path: "models/a.onnx".into(),
            labels_path: "models/a.txt".into(),
            model_sha256: None,
            top_k: 2,
            input_size: 224,
            crop_and_scale: "scale-fit",
            log_format: "pretty",
            log_level: "debug".into(),
            log_file: Some("/var/log/bloom.log".into()),
        };
        let lines = format_config(&cfg);
        assert_eq!(lines.len(), 10);
        assert!(lines.contains(&"BLOOM_LOG_FILE=/var/log/bloom.log".to_string()));
        assert!(lines.contains(&"BLOOM_TOP_K=2".to_string()));
        assert!(lines.contains(&"BLOOM_MODEL_SHA256=".to_string()));
        assert!(lines.contains(&"BLOOM_CROP=scale-fit".to_string()));
    }
}
