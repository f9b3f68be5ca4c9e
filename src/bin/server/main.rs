//! Lesion classifier server and CLI
//!
//! Classifies skin-lesion images via CLI or HTTP server.
//!
//! # Usage
//!
//! ## CLI Mode
//! ```bash
//! lesion-classifier-server classify --file lesion.jpg --model models/skin_lesion.onnx
//! lesion-classifier-server classify --url "https://example.com/lesion.png" --model models/skin_lesion.onnx --output json
//! ```
//!
//! ## Server Mode
//! ```bash
//! lesion-classifier-server serve --model models/skin_lesion.onnx --port 5000
//! ```

mod cli;
mod config;
mod predict;
mod server;

use clap::{Parser, Subcommand};
use lesion_classifier::core::MAX_UPLOAD_BYTES;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "lesion-classifier-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Skin-lesion classification via CLI or HTTP server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single image via CLI
    Classify {
        /// URL of the image to classify
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,

        /// Local file path of the image to classify
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Path to the ONNX classifier model
        #[arg(long, env = "LESION_MODEL")]
        model: PathBuf,

        /// Output format (json, pretty)
        #[arg(long, default_value = "pretty")]
        output: String,

        /// Device to use (cpu, cuda, cuda:0, etc.)
        #[arg(long, default_value = "cpu", env = "LESION_DEVICE")]
        device: String,
    },
    /// Start the HTTP server
    Serve {
        /// Path to the ONNX classifier model
        #[arg(long, env = "LESION_MODEL")]
        model: PathBuf,

        /// Port to listen on
        #[arg(long, short, default_value = "5000", env = "PORT")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0", env = "LESION_HOST")]
        host: String,

        /// Device to use (cpu, cuda, cuda:0, etc.)
        #[arg(long, default_value = "cpu", env = "LESION_DEVICE")]
        device: String,

        /// Directory uploads are stored in
        #[arg(long = "upload-dir", default_value = "static/uploads", env = "LESION_UPLOAD_DIR")]
        upload_dir: PathBuf,

        /// Maximum request body size in bytes
        #[arg(long = "max-upload-bytes", default_value_t = MAX_UPLOAD_BYTES)]
        max_upload_bytes: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    lesion_classifier::utils::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            url,
            file,
            model,
            output,
            device,
        } => {
            let config = config::ClassifierConfig { model, device };

            if let Some(url) = url {
                info!("Processing URL: {}", url);
                cli::process_url(&url, &config, &output).await?;
            } else if let Some(file) = file {
                info!("Processing file: {}", file.display());
                cli::process_file(&file, &config, &output)?;
            } else {
                eprintln!("Error: Either --url or --file must be provided");
                std::process::exit(1);
            }
        }
        Commands::Serve {
            model,
            port,
            host,
            device,
            upload_dir,
            max_upload_bytes,
        } => {
            let config = config::ServerConfig {
                classifier: config::ClassifierConfig { model, device },
                host,
                port,
                upload_dir,
                max_upload_bytes,
            };

            info!("Starting server on {}:{}", config.host, config.port);
            server::run_server(config).await?;
        }
    }

    Ok(())
}
