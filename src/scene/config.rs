// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tile size must be non-zero (got {0}x{1})")]
    ZeroTileSize(u32, u32),
    #[error("render resolution must be non-zero (got {0}x{1})")]
    ZeroRenderResolution(u32, u32),
    #[error("window resolution must be non-zero (got {0}x{1})")]
    ZeroWindowResolution(u32, u32),
    #[error("denoiser_frame_cnt must be at least 1")]
    ZeroDenoiserCadence,
    #[error("preview_scale must be in (0, 1] (got {0})")]
    PreviewScale(f32),
}

/// How often the denoiser is re-run once it has produced a first image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenoiseCadence {
    /// Every `denoiser_frame_cnt × tile count` ticks, so the ratio of
    /// denoise calls to sample passes is independent of tile size.
    #[default]
    Tiles,
    /// Every `denoiser_frame_cnt` completed sample passes.
    Samples,
}

/// Options the host owns; the scheduler only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub render_resolution: [u32; 2],
    pub window_resolution: [u32; 2],
    pub tile_width: u32,
    pub tile_height: u32,
    pub max_depth: u32,
    /// `-1` renders forever; `0` (or any other negative) is already converged.
    pub max_spp: i32,
    pub preview_scale: f32,

    pub enable_denoiser: bool,
    pub denoiser_frame_cnt: u32,
    pub denoiser_cadence: DenoiseCadence,

    pub use_env_map: bool,
    pub hdr_multiplier: f32,
    pub enable_rr: bool,
    pub rr_depth: u32,
    pub use_uniform_light: bool,
    pub uniform_light_col: [f32; 3],
    pub hide_emitters: bool,
    pub enable_background: bool,
    pub transparent_background: bool,
    pub background_col: [f32; 3],

    pub enable_tonemap: bool,
    pub use_aces: bool,
    pub simple_aces_fit: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            render_resolution: [DEFAULT_RENDER_WIDTH, DEFAULT_RENDER_HEIGHT],
            window_resolution: [DEFAULT_RENDER_WIDTH, DEFAULT_RENDER_HEIGHT],
            tile_width: DEFAULT_TILE_WIDTH,
            tile_height: DEFAULT_TILE_HEIGHT,
            max_depth: DEFAULT_MAX_DEPTH,
            max_spp: DEFAULT_MAX_SPP,
            preview_scale: DEFAULT_PREVIEW_SCALE,
            enable_denoiser: false,
            denoiser_frame_cnt: DEFAULT_DENOISER_FRAME_CNT,
            denoiser_cadence: DenoiseCadence::Tiles,
            use_env_map: false,
            hdr_multiplier: DEFAULT_HDR_MULTIPLIER,
            enable_rr: true,
            rr_depth: DEFAULT_RR_DEPTH,
            use_uniform_light: false,
            uniform_light_col: DEFAULT_UNIFORM_LIGHT_COL,
            hide_emitters: false,
            enable_background: false,
            transparent_background: false,
            background_col: DEFAULT_BACKGROUND_COL,
            enable_tonemap: true,
            use_aces: false,
            simple_aces_fit: false,
        }
    }
}

impl RenderOptions {
    pub fn extent(&self) -> RenderExtent {
        RenderExtent {
            render_width: self.render_resolution[0],
            render_height: self.render_resolution[1],
            window_width: self.window_resolution[0],
            window_height: self.window_resolution[1],
            preview_scale: self.preview_scale,
        }
    }

    /// `None` when unbounded.
    pub fn sample_limit(&self) -> Option<u32> {
        match self.max_spp {
            UNBOUNDED_SPP => None,
            n if n > 0 => Some(n as u32),
            _ => Some(0),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(ConfigError::ZeroTileSize(self.tile_width, self.tile_height));
        }
        let [rw, rh] = self.render_resolution;
        if rw == 0 || rh == 0 {
            return Err(ConfigError::ZeroRenderResolution(rw, rh));
        }
        let [ww, wh] = self.window_resolution;
        if ww == 0 || wh == 0 {
            return Err(ConfigError::ZeroWindowResolution(ww, wh));
        }
        if self.denoiser_frame_cnt == 0 {
            return Err(ConfigError::ZeroDenoiserCadence);
        }
        if !(self.preview_scale > 0.0 && self.preview_scale <= 1.0) {
            return Err(ConfigError::PreviewScale(self.preview_scale));
        }
        Ok(())
    }
}

/// Output and display resolutions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderExtent {
    pub render_width: u32,
    pub render_height: u32,
    pub window_width: u32,
    pub window_height: u32,
    pub preview_scale: f32,
}

impl RenderExtent {
    pub fn render_pixels(&self) -> usize {
        self.render_width as usize * self.render_height as usize
    }

    /// Never smaller than 1×1.
    pub fn preview_size(&self) -> (u32, u32) {
        let w = (self.window_width as f32 * self.preview_scale) as u32;
        let h = (self.window_height as f32 * self.preview_scale) as u32;
        (w.max(1), h.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_position")]
    pub position: [f32; 3],

    /// Pitch, yaw, roll in degrees.
    #[serde(default)]
    pub rotation: [f32; 3],

    #[serde(default = "default_fov")]
    pub fov: f32,

    #[serde(default = "default_focal_dist")]
    pub focal_dist: f32,

    #[serde(default = "default_aperture", skip_serializing_if = "is_zero")]
    pub aperture: f32,
}

fn default_position() -> [f32; 3] {
    DEFAULT_CAMERA_POSITION
}

fn default_fov() -> f32 {
    DEFAULT_FOV
}

fn default_focal_dist() -> f32 {
    DEFAULT_FOCAL_DIST
}

fn default_aperture() -> f32 {
    DEFAULT_APERTURE
}

fn is_zero(v: &f32) -> bool {
    *v == 0.0
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_position(),
            rotation: [0.0, 0.0, 0.0],
            fov: default_fov(),
            focal_dist: default_focal_dist(),
            aperture: default_aperture(),
        }
    }
}

/// Top-level render configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default, alias = "renderOptions")]
    pub render: RenderOptions,

    #[serde(default)]
    pub camera: CameraConfig,
}
