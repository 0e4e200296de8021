//! `narrator describe <image>`: run the pipeline once on a local file.

use std::path::Path;

use anyhow::{Context, Result};
use narrator_config::NarratorConfig;
use narrator_core::PipelineResult;
use narrator_media::UploadStager;

use crate::providers::build_pipeline;

pub async fn run(config: &NarratorConfig, image: &Path) -> Result<()> {
    let result = describe_image(config, image).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Stage a copy of `image` and process it. The source file is left in place.
async fn describe_image(config: &NarratorConfig, image: &Path) -> Result<PipelineResult> {
    let pipeline = build_pipeline(config)?;
    let stager = UploadStager::new(config.storage.upload_dir.clone());
    let payload = stager
        .stage_file(image)
        .await
        .with_context(|| format!("Failed to stage {}", image.display()))?;
    Ok(pipeline.process(payload).await?)
}
