// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pass descriptions and the uniform blocks handed to the backend.
//!
//! The scheduler never touches pixels. Each tick it emits a short list of
//! [`PassInvocation`]s naming the kernel, the image it reads, the image and
//! region it writes, and a fully marshalled uniform block.

use bytemuck::{Pod, Zeroable};

use crate::camera::camera::{Camera, CameraUniform};
use crate::constants::PREVIEW_MAX_DEPTH;
use crate::scene::config::{RenderExtent, RenderOptions};

use super::state::BufferIndex;
use super::tile::{TileCursor, TileGrid, Viewport};

/// GPU images whose identity the core owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageId {
    /// Tile-sized scratch written by the tile trace.
    TileWork,
    /// Low-resolution image shown while the scene is changing.
    Preview,
    /// Running per-pixel radiance sum.
    Accumulation,
    /// One half of the double-buffered presentation store.
    Output(BufferIndex),
    /// Last image returned by the denoiser.
    Denoised,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    Tile,
    Preview,
    Accumulate,
    Tonemap,
}

impl PassKind {
    /// Shader module name of the pass.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tile => "tile",
            Self::Preview => "preview",
            Self::Accumulate => "accumulate",
            Self::Tonemap => "tonemap",
        }
    }

    pub const ALL: &[Self] = &[Self::Tile, Self::Preview, Self::Accumulate, Self::Tonemap];
}

/// Sizes of every image the backend has to allocate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTargets {
    pub grid: TileGrid,
    pub extent: RenderExtent,
}

impl RenderTargets {
    pub fn tiled(options: &RenderOptions) -> Self {
        let extent = options.extent();
        Self {
            grid: TileGrid::new(
                extent.render_width,
                extent.render_height,
                options.tile_width,
                options.tile_height,
            ),
            extent,
        }
    }

    /// One tile covering the whole frame.
    pub fn whole_frame(options: &RenderOptions) -> Self {
        let extent = options.extent();
        Self {
            grid: TileGrid::whole_frame(extent.render_width, extent.render_height),
            extent,
        }
    }

    pub fn image_size(&self, image: ImageId) -> (u32, u32) {
        match image {
            ImageId::TileWork => (self.grid.tile_width, self.grid.tile_height),
            ImageId::Preview => self.extent.preview_size(),
            ImageId::Accumulation | ImageId::Output(_) | ImageId::Denoised => {
                (self.grid.render_width, self.grid.render_height)
            }
        }
    }

    pub fn render_size(&self) -> (u32, u32) {
        (self.grid.render_width, self.grid.render_height)
    }
}

/// Must match the WGSL `TraceParams` struct layout exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TraceUniforms {
    pub camera: CameraUniform,
    pub screen_resolution: [f32; 2],
    pub inv_num_tiles: [f32; 2],
    pub tile_offset: [f32; 2],
    pub frame_num: u32,
    pub max_depth: u32,
    pub uniform_light_col: [f32; 3],
    pub hdr_multiplier: f32,
    pub target_size: [u32; 2],
    pub use_env_map: u32,
    pub _pad: u32,
}

/// Must match the WGSL `AccumParams` struct layout exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct AccumulateUniforms {
    /// Column and top-down row of the region in the accumulation image.
    pub region_origin: [u32; 2],
    pub region_size: [u32; 2],
    pub accum_width: u32,
    pub tile_width: u32,
    /// Where the region starts inside the working tile. Clipping at the top
    /// edge drops the first rows of the tile.
    pub src_origin: [u32; 2],
}

/// Must match the WGSL `ToneParams` struct layout exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TonemapUniforms {
    pub background_col: [f32; 3],
    pub inv_sample_counter: f32,
    pub size: [u32; 2],
    pub enable_tonemap: u32,
    pub use_aces: u32,
    pub simple_aces_fit: u32,
    pub _pad: [u32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassUniforms {
    Trace(TraceUniforms),
    Accumulate(AccumulateUniforms),
    Tonemap(TonemapUniforms),
}

/// One unit of backend work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassInvocation {
    pub kind: PassKind,
    pub input: Option<ImageId>,
    pub target: ImageId,
    /// Region of `target` that may change.
    pub viewport: Viewport,
    pub uniforms: PassUniforms,
}

fn trace_uniforms(
    options: &RenderOptions,
    camera: &Camera,
    screen_resolution: (u32, u32),
    target_size: (u32, u32),
) -> TraceUniforms {
    TraceUniforms {
        camera: camera.to_uniform(),
        screen_resolution: [screen_resolution.0 as f32, screen_resolution.1 as f32],
        inv_num_tiles: [1.0, 1.0],
        tile_offset: [0.0, 0.0],
        frame_num: 0,
        max_depth: options.max_depth,
        uniform_light_col: options.uniform_light_col,
        hdr_multiplier: options.hdr_multiplier,
        target_size: [target_size.0, target_size.1],
        use_env_map: options.use_env_map as u32,
        _pad: 0,
    }
}

/// Trace the tile under `cursor` into the working image.
pub fn trace_tile(
    grid: &TileGrid,
    cursor: TileCursor,
    frame_counter: u64,
    options: &RenderOptions,
    camera: &Camera,
) -> PassInvocation {
    let mut uniforms = trace_uniforms(
        options,
        camera,
        (grid.render_width, grid.render_height),
        (grid.tile_width, grid.tile_height),
    );
    uniforms.inv_num_tiles = grid.inv_num_tiles;
    uniforms.tile_offset = grid.tile_offset(cursor);
    // Seeds only need to differ between ticks.
    uniforms.frame_num = frame_counter as u32;

    PassInvocation {
        kind: PassKind::Tile,
        input: None,
        target: ImageId::TileWork,
        viewport: grid.tile_viewport(),
        uniforms: PassUniforms::Trace(uniforms),
    }
}

/// Cheap full-view trace at preview resolution with a shallow depth.
pub fn preview(extent: &RenderExtent, options: &RenderOptions, camera: &Camera) -> PassInvocation {
    let size = extent.preview_size();
    let mut uniforms = trace_uniforms(options, camera, size, size);
    uniforms.max_depth = PREVIEW_MAX_DEPTH.min(options.max_depth.max(1));

    PassInvocation {
        kind: PassKind::Preview,
        input: None,
        target: ImageId::Preview,
        viewport: Viewport::full(size.0, size.1),
        uniforms: PassUniforms::Trace(uniforms),
    }
}

/// Add the working tile into the accumulation image at the tile's region.
pub fn accumulate(grid: &TileGrid, cursor: TileCursor) -> PassInvocation {
    let region = grid.tile_region(cursor);
    PassInvocation {
        kind: PassKind::Accumulate,
        input: Some(ImageId::TileWork),
        target: ImageId::Accumulation,
        viewport: region,
        uniforms: PassUniforms::Accumulate(AccumulateUniforms {
            region_origin: [region.x, region.top_row(grid.render_height)],
            region_size: [region.width, region.height],
            accum_width: grid.render_width,
            tile_width: grid.tile_width,
            src_origin: [0, grid.tile_height - region.height],
        }),
    }
}

/// Normalize and range-compress the whole accumulation into one output half.
pub fn tonemap(
    grid: &TileGrid,
    buffer: BufferIndex,
    sample_counter: u32,
    options: &RenderOptions,
) -> PassInvocation {
    PassInvocation {
        kind: PassKind::Tonemap,
        input: Some(ImageId::Accumulation),
        target: ImageId::Output(buffer),
        viewport: Viewport::full(grid.render_width, grid.render_height),
        uniforms: PassUniforms::Tonemap(TonemapUniforms {
            background_col: options.background_col,
            inv_sample_counter: 1.0 / sample_counter.max(1) as f32,
            size: [grid.render_width, grid.render_height],
            enable_tonemap: options.enable_tonemap as u32,
            use_aces: options.use_aces as u32,
            simple_aces_fit: options.simple_aces_fit as u32,
            _pad: [0; 3],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::config::CameraConfig;

    fn make_camera() -> Camera {
        Camera::from_config(&CameraConfig::default())
    }

    #[test]
    fn test_uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<TraceUniforms>(), 128);
        assert_eq!(std::mem::size_of::<AccumulateUniforms>(), 32);
        assert_eq!(std::mem::size_of::<TonemapUniforms>(), 48);
    }

    #[test]
    fn test_trace_tile_marshalling() {
        let grid = TileGrid::new(500, 500, 250, 250);
        let opts = RenderOptions {
            max_depth: 5,
            ..Default::default()
        };
        let pass = trace_tile(&grid, TileCursor { x: 1, y: 0 }, 9, &opts, &make_camera());
        assert_eq!(pass.kind, PassKind::Tile);
        assert_eq!(pass.target, ImageId::TileWork);
        assert_eq!(pass.viewport, Viewport::full(250, 250));
        let PassUniforms::Trace(u) = pass.uniforms else {
            panic!("expected trace uniforms");
        };
        assert_eq!(u.tile_offset, [0.5, 0.0]);
        assert_eq!(u.inv_num_tiles, [0.5, 0.5]);
        assert_eq!(u.screen_resolution, [500.0, 500.0]);
        assert_eq!(u.frame_num, 9);
        assert_eq!(u.max_depth, 5);
    }

    #[test]
    fn test_preview_uses_reduced_depth_and_scale() {
        let opts = RenderOptions {
            window_resolution: [800, 400],
            max_depth: 8,
            ..Default::default()
        };
        let pass = preview(&opts.extent(), &opts, &make_camera());
        assert_eq!(pass.viewport, Viewport::full(200, 100));
        let PassUniforms::Trace(u) = pass.uniforms else {
            panic!("expected trace uniforms");
        };
        assert_eq!(u.max_depth, PREVIEW_MAX_DEPTH);
        assert_eq!(u.target_size, [200, 100]);
    }

    #[test]
    fn test_accumulate_region_is_top_down() {
        let grid = TileGrid::new(640, 480, 256, 256);
        let pass = accumulate(&grid, TileCursor { x: 2, y: 1 });
        let PassUniforms::Accumulate(u) = pass.uniforms else {
            panic!("expected accumulate uniforms");
        };
        assert_eq!(u.region_origin, [512, 0]);
        assert_eq!(u.region_size, [128, 224]);
        assert_eq!(u.src_origin, [0, 32]);

        let pass = accumulate(&grid, TileCursor { x: 0, y: 0 });
        let PassUniforms::Accumulate(u) = pass.uniforms else {
            panic!("expected accumulate uniforms");
        };
        assert_eq!(u.region_origin, [0, 224]);
        assert_eq!(u.region_size, [256, 256]);
        assert_eq!(u.src_origin, [0, 0]);
    }

    #[test]
    fn test_tonemap_normalizes_by_sample_count() {
        let grid = TileGrid::new(64, 64, 32, 32);
        let pass = tonemap(&grid, BufferIndex::Second, 4, &RenderOptions::default());
        assert_eq!(pass.target, ImageId::Output(BufferIndex::Second));
        let PassUniforms::Tonemap(u) = pass.uniforms else {
            panic!("expected tonemap uniforms");
        };
        assert_eq!(u.inv_sample_counter, 0.25);
    }

    #[test]
    fn test_image_sizes() {
        let opts = RenderOptions {
            render_resolution: [640, 480],
            window_resolution: [1280, 720],
            tile_width: 128,
            tile_height: 64,
            ..Default::default()
        };
        let targets = RenderTargets::tiled(&opts);
        assert_eq!(targets.image_size(ImageId::TileWork), (128, 64));
        assert_eq!(targets.image_size(ImageId::Preview), (320, 180));
        assert_eq!(targets.image_size(ImageId::Denoised), (640, 480));

        let whole = RenderTargets::whole_frame(&opts);
        assert_eq!(whole.image_size(ImageId::TileWork), (640, 480));
        assert_eq!(whole.grid.tile_count(), 1);
    }
}
