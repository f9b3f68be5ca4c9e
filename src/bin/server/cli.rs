//! CLI mode for lesion classification.

use crate::config::ClassifierConfig;
use crate::predict::{PredictResponse, build_predictor, download_bytes, filename_from_url};
use lesion_classifier::domain::{ClassificationResult, SourceImage};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Classify an image downloaded from a URL
pub async fn process_url(
    url: &str,
    config: &ClassifierConfig,
    output_format: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let start = Instant::now();

    info!("Downloading image from URL...");
    let bytes = download_bytes(url).await?;
    let download_time = start.elapsed();
    info!("Downloaded {} bytes in {:.2}ms", bytes.len(), download_time.as_secs_f64() * 1000.0);

    let source = SourceImage::new(filename_from_url(url), bytes)?;
    classify(&source, config, output_format)
}

/// Classify a local image file
pub fn process_file(
    path: &Path,
    config: &ClassifierConfig,
    output_format: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let start = Instant::now();

    info!("Loading image from file...");
    let source = SourceImage::from_path(path)?;
    info!("Loaded in {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

    classify(&source, config, output_format)
}

fn classify(
    source: &SourceImage,
    config: &ClassifierConfig,
    output_format: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Loading classifier...");
    let init_start = Instant::now();
    let predictor = build_predictor(config)?;
    info!("Classifier loaded in {:.2}ms", init_start.elapsed().as_secs_f64() * 1000.0);

    info!("Classifying {}...", source.filename());
    let start = Instant::now();
    let result = predictor.predict(source)?;
    let processing_time = start.elapsed();
    info!("Classification completed in {:.2}ms", processing_time.as_secs_f64() * 1000.0);

    output_result(&result, source.filename(), output_format, processing_time.as_secs_f64() * 1000.0)
}

/// Output the classification result in the specified format
fn output_result(
    result: &ClassificationResult,
    filename: &str,
    format: &str,
    processing_time_ms: f64,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match format {
        "json" => {
            let response = PredictResponse::from_result(result, None, processing_time_ms);
            println!("{}", serde_json::to_string(&response)?);
        }
        _ => {
            println!("\n=== Classification Result ===");
            println!("Image: {}", filename);
            println!("Processing time: {:.2}ms", processing_time_ms);
            println!();
            println!("Label:      {}", result.label);
            println!("Confidence: {}", result.confidence);
        }
    }

    Ok(())
}
