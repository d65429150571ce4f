// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// GPU / compute
pub const WORKGROUP_SIZE: u32 = 8;

// Float RGBA images (tile, preview, accumulation, outputs): vec4<f32> = 16 bytes per pixel
pub const RGBA_F32_BYTES_PER_PIXEL: u64 = 16;

// Tiling defaults
pub const DEFAULT_TILE_WIDTH: u32 = 256;
pub const DEFAULT_TILE_HEIGHT: u32 = 256;

// Preview renders at a fraction of the window extent with a shallow trace.
pub const DEFAULT_PREVIEW_SCALE: f32 = 0.25;
pub const PREVIEW_MAX_DEPTH: u32 = 2;

// Render option defaults
pub const DEFAULT_MAX_DEPTH: u32 = 2;
pub const UNBOUNDED_SPP: i32 = -1;
pub const DEFAULT_MAX_SPP: i32 = UNBOUNDED_SPP;
pub const DEFAULT_DENOISER_FRAME_CNT: u32 = 20;
pub const DEFAULT_RR_DEPTH: u32 = 2;
pub const DEFAULT_HDR_MULTIPLIER: f32 = 1.0;
pub const DEFAULT_UNIFORM_LIGHT_COL: [f32; 3] = [0.3, 0.3, 0.3];
pub const DEFAULT_BACKGROUND_COL: [f32; 3] = [1.0, 1.0, 1.0];

// Extent defaults
pub const DEFAULT_RENDER_WIDTH: u32 = 1280;
pub const DEFAULT_RENDER_HEIGHT: u32 = 720;

// Camera defaults
pub const DEFAULT_FOV: f32 = 60.0;
pub const DEFAULT_FOCAL_DIST: f32 = 0.1;
pub const DEFAULT_APERTURE: f32 = 0.0;
pub const DEFAULT_CAMERA_POSITION: [f32; 3] = [0.0, 1.0, -6.0];

// CLI defaults
pub const DEFAULT_MAX_TICKS: u64 = 4096;
pub const PROGRESS_LOG_INTERVAL: u64 = 64;

