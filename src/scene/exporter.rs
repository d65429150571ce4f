// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::config::RenderConfig;

pub fn save_config(config: &RenderConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config).context("Failed to serialize render config")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write render config: {}", path.display()))?;
    log::info!("Saved render config to {}", path.display());
    Ok(())
}
