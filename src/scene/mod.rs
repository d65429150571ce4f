// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod config;
pub mod exporter;
pub mod loader;
#[allow(clippy::module_inception)]
pub mod scene;

pub use config::{CameraConfig, DenoiseCadence, RenderConfig, RenderExtent, RenderOptions};
pub use scene::Scene;
