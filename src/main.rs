//! bloom-core entry point.
//!
//! ## CLI Subcommands
//!
//! - `bloom-core classify <image>` - Classify a photo
//! - `bloom-core config show` - Show effective configuration
//! - `bloom-core config defaults` - Show default configuration

use std::process::ExitCode;

use bloom_core::cli::{config_cmd, run_classify, EXIT_CONFIG};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "classify" => {
            let code = run_classify(&args[2..]).await;
            ExitCode::from(code as u8)
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    let json = args.get(3).map(|s| s.as_str()) == Some("--json");
                    ExitCode::from(config_cmd::run_show(json) as u8)
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_usage();
                    ExitCode::from(EXIT_CONFIG as u8)
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("bloom-core {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::from(EXIT_CONFIG as u8)
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "bloom-core - flower image classification v{}

USAGE:
    bloom-core [COMMAND] [OPTIONS]

COMMANDS:
    classify     Classify an image file
    config       Show configuration (show, defaults)
    version      Show version information
    help         Show this help message

CLASSIFY OPTIONS:
    --orientation NAME  Capture orientation (up, down, left, right, upMirrored, ...)
    --top-k N           Number of predictions to show (default: BLOOM_TOP_K)
    --json              Output in JSON format

EXAMPLES:
    bloom-core classify rose.jpg
    bloom-core classify IMG_0042.jpg --orientation right --top-k 3
    bloom-core config show --json

ENVIRONMENT:
    BLOOM_BASE_PATH      Directory containing models/ (default: .)
    BLOOM_MODEL_PATH     Model file (default: models/flower_classifier.onnx)
    BLOOM_LABELS_PATH    Labels file (default: models/labels.txt)
    BLOOM_MODEL_SHA256   Expected model digest
    BLOOM_TOP_K          Predictions shown per image (default: 1)
    BLOOM_INPUT_SIZE     Model input edge in pixels (default: 224)
    BLOOM_CROP           center-crop, scale-fit or scale-fill (default: center-crop)
    BLOOM_LOG_FORMAT     json or pretty (default: json)
    BLOOM_LOG_LEVEL      Log filter (default: info)
    BLOOM_LOG_FILE       Log file (default: stderr)

EXIT CODES:
    0  Success
    1  No predictions
    2  Usage or configuration error
",
        version
    );
}
