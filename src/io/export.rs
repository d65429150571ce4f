use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use crate::render::present::RgbaFrame;

pub fn save_png(frame: &RgbaFrame, path: &Path) -> Result<()> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.pixels.clone())
        .context("Failed to create image from pixel data")?;
    img.save(path)
        .with_context(|| format!("Failed to save frame to {}", path.display()))?;
    log::info!(
        "Frame {}x{} saved to {}",
        frame.width,
        frame.height,
        path.display()
    );
    Ok(())
}

pub fn default_export_path(sample_count: u32) -> PathBuf {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    PathBuf::from(format!("render_{timestamp}_{sample_count}spp.png"))
}
