// Copyright 2026 bloom-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! `classify` subcommand: classify one image file and print the result.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{error, info};

use super::{CliError, EXIT_CONFIG, EXIT_NO_PREDICTIONS, EXIT_OK};
use crate::config;
use crate::telemetry::init_logging;
use crate::vision::{CapturedImage, ImageOrientation, Prediction};
use crate::{Runtime, RuntimeConfig};

/// Parsed arguments for `classify`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyArgs {
    pub image: PathBuf,
    pub orientation: ImageOrientation,
    pub top_k: Option<usize>,
    pub json: bool,
}

impl ClassifyArgs {
    /// Parse the arguments following `classify`.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut image = None;
        let mut orientation = ImageOrientation::Up;
        let mut top_k = None;
        let mut json = false;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--orientation" => {
                    let value = next_value(&mut iter, "--orientation")?;
                    orientation = ImageOrientation::from_name(value).ok_or_else(|| {
                        CliError::Usage(format!("unknown orientation: {}", value))
                    })?;
                }
                "--top-k" => {
                    let value = next_value(&mut iter, "--top-k")?;
                    let k = value
                        .parse::<usize>()
                        .ok()
                        .filter(|k| *k > 0)
                        .ok_or_else(|| CliError::Usage(format!("invalid --top-k: {}", value)))?;
                    top_k = Some(k);
                }
                "--json" => json = true,
                flag if flag.starts_with("--") => {
                    return Err(CliError::Usage(format!("unknown option: {}", flag)));
                }
                path => {
                    if image.replace(PathBuf::from(path)).is_some() {
                        return Err(CliError::Usage("only one image may be given".into()));
                    }
                }
            }
        }

        let image = image.ok_or_else(|| CliError::Usage("missing image path".into()))?;
        Ok(Self {
            image,
            orientation,
            top_k,
            json,
        })
    }
}

fn next_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<&'a str, CliError> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| CliError::Usage(format!("{} requires a value", flag)))
}

#[derive(Debug, Serialize)]
struct ClassifyOutput<'a> {
    image: String,
    request_id: String,
    predictions: &'a [Prediction],
    message: &'a str,
}

/// Run `classify` with the arguments after the subcommand. Returns an exit code.
pub async fn run_classify(args: &[String]) -> i32 {
    let parsed = match ClassifyArgs::parse(args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_CONFIG;
        }
    };

    let env = config::load();
    if let Err(e) = init_logging(&env.log) {
        eprintln!("Logging disabled: {}", e);
    }

    let mut runtime_config = RuntimeConfig::from(&env);
    if let Some(k) = parsed.top_k {
        runtime_config.top_k = k;
    }

    match classify_file(&parsed, Runtime::new(runtime_config)).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "classify command failed");
            eprintln!("{}", e);
            EXIT_CONFIG
        }
    }
}

async fn classify_file(args: &ClassifyArgs, runtime: Runtime) -> Result<i32, CliError> {
    let image = CapturedImage::open(&args.image, args.orientation)?;
    let classifier = runtime.classifier().await?;

    let ticket = classifier.submit(&image);
    let request_id = ticket.request_id();
    info!(request_id = %request_id, image = %args.image.display(), "classification submitted");

    let predictions = ticket.await;
    let message = runtime.presenter().render(predictions.as_deref());

    if args.json {
        let output = ClassifyOutput {
            image: args.image.display().to_string(),
            request_id: request_id.to_string(),
            predictions: predictions.as_deref().unwrap_or(&[]),
            message: &message,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", message);
    }

    Ok(match predictions {
        Some(p) if !p.is_empty() => EXIT_OK,
        _ => EXIT_NO_PREDICTIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use image::{Rgb, RgbImage};

    use crate::engine::{
        BackendError, ClassificationObservation, ClassificationRequest, ClassifierModel,
        VisionBackend, VisionOutput,
    };

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_minimal() {
        let parsed = ClassifyArgs::parse(&args(&["rose.jpg"])).unwrap();
        assert_eq!(parsed.image, PathBuf::from("rose.jpg"));
        assert_eq!(parsed.orientation, ImageOrientation::Up);
        assert_eq!(parsed.top_k, None);
        assert!(!parsed.json);
    }

    #[test]
    fn test_parse_all_options() {
        let parsed = ClassifyArgs::parse(&args(&[
            "--orientation",
            "rightMirrored",
            "tulip.png",
            "--top-k",
            "3",
            "--json",
        ]))
        .unwrap();
        assert_eq!(parsed.image, PathBuf::from("tulip.png"));
        assert_eq!(parsed.orientation, ImageOrientation::RightMirrored);
        assert_eq!(parsed.top_k, Some(3));
        assert!(parsed.json);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(ClassifyArgs::parse(&args(&[])).is_err());
        assert!(ClassifyArgs::parse(&args(&["a.jpg", "b.jpg"])).is_err());
        assert!(ClassifyArgs::parse(&args(&["a.jpg", "--top-k", "0"])).is_err());
        assert!(ClassifyArgs::parse(&args(&["a.jpg", "--orientation"])).is_err());
        assert!(ClassifyArgs::parse(&args(&["a.jpg", "--verbose"])).is_err());
    }

    struct TopRose;

    #[async_trait::async_trait]
    impl VisionBackend for TopRose {
        fn backend_id(&self) -> &str {
            "top-rose"
        }

        async fn perform(
            &self,
            _request: &ClassificationRequest,
        ) -> Result<Option<VisionOutput>, BackendError> {
            Ok(Some(VisionOutput::Classifications(vec![
                ClassificationObservation::new("Rose, Rosa", 0.912),
            ])))
        }
    }

    fn rose_runtime() -> Runtime {
        let model = ClassifierModel::new("flowers", Arc::new(TopRose));
        Runtime::with_model(RuntimeConfig::default(), model)
    }

    fn classify_args(image: PathBuf, json: bool) -> ClassifyArgs {
        ClassifyArgs {
            image,
            orientation: ImageOrientation::Up,
            top_k: None,
            json,
        }
    }

    #[tokio::test]
    async fn test_missing_image_is_image_error() {
        let parsed = classify_args(PathBuf::from("/nonexistent/bloom/photo.jpg"), false);
        let result = classify_file(&parsed, rose_runtime()).await;
        assert!(matches!(result, Err(CliError::Image(_))));
    }

    #[tokio::test]
    async fn test_classified_image_exits_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rose.png");
        RgbImage::from_pixel(8, 8, Rgb([220, 30, 60])).save(&path).unwrap();

        let code = classify_file(&classify_args(path.clone(), false), rose_runtime())
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);

        let code = classify_file(&classify_args(path, true), rose_runtime())
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }
}
