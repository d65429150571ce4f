// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::config::RenderConfig;

pub fn load_config(path: &Path) -> Result<RenderConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read render config: {}", path.display()))?;

    let config = parse_config(&contents, path.extension().and_then(|e| e.to_str()))
        .with_context(|| format!("Failed to parse render config: {}", path.display()))?;

    config
        .render
        .validate()
        .with_context(|| format!("Invalid render config: {}", path.display()))?;

    let opts = &config.render;
    log::info!(
        "Loaded render config: {}x{} render, {}x{} tiles, max spp {}",
        opts.render_resolution[0],
        opts.render_resolution[1],
        opts.tile_width,
        opts.tile_height,
        opts.max_spp
    );

    Ok(config)
}

/// JSON when the extension says so, YAML otherwise.
pub fn parse_config(contents: &str, extension: Option<&str>) -> Result<RenderConfig> {
    let config = match extension {
        Some("json") => serde_json::from_str(contents).context("JSON syntax")?,
        _ => serde_yml::from_str(contents).context("YAML syntax")?,
    };
    Ok(config)
}
