// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::scene::config::RenderOptions;

use super::denoise_gate::DenoiseState;
use super::passes::ImageId;
use super::state::{BufferIndex, SchedulerState};

/// Image the host should show (and export) right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentSource {
    Preview,
    Stable(BufferIndex),
    Denoised,
}

impl PresentSource {
    pub fn image(self) -> ImageId {
        match self {
            Self::Preview => ImageId::Preview,
            Self::Stable(half) => ImageId::Output(half),
            Self::Denoised => ImageId::Denoised,
        }
    }
}

/// Never returns the half currently being written.
pub fn select(state: &SchedulerState, dirty: bool, options: &RenderOptions) -> PresentSource {
    // No complete pass yet, or the camera is moving: only the preview is coherent.
    if dirty || state.sample_counter == 1 {
        return PresentSource::Preview;
    }
    if options.enable_denoiser && state.denoise == DenoiseState::Denoised {
        return PresentSource::Denoised;
    }
    PresentSource::Stable(state.stable_buffer())
}

/// 8-bit RGBA pixels, rows top-down. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaFrame {
    /// Nearest-neighbour resize, used to bring the preview up to render size.
    pub fn resized_nearest(&self, width: u32, height: u32) -> RgbaFrame {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            let sy = (y as u64 * self.height as u64 / height as u64) as usize;
            for x in 0..width {
                let sx = (x as u64 * self.width as u64 / width as u64) as usize;
                let idx = (sy * self.width as usize + sx) * 4;
                pixels.extend_from_slice(&self.pixels[idx..idx + 4]);
            }
        }
        RgbaFrame {
            width,
            height,
            pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tile::TileGrid;

    #[test]
    fn test_dirty_or_first_sample_shows_preview() {
        let grid = TileGrid::new(100, 100, 50, 50);
        let mut state = SchedulerState::new(&grid);
        let opts = RenderOptions::default();
        assert_eq!(select(&state, false, &opts), PresentSource::Preview);

        state.sample_counter = 3;
        assert_eq!(select(&state, true, &opts), PresentSource::Preview);
        assert_eq!(
            select(&state, false, &opts),
            PresentSource::Stable(BufferIndex::Second)
        );
    }

    #[test]
    fn test_denoised_requires_enabled_denoiser() {
        let grid = TileGrid::new(100, 100, 50, 50);
        let mut state = SchedulerState::new(&grid);
        state.sample_counter = 3;
        state.denoise = DenoiseState::Denoised;

        let mut opts = RenderOptions {
            enable_denoiser: true,
            ..Default::default()
        };
        assert_eq!(select(&state, false, &opts), PresentSource::Denoised);
        assert_eq!(PresentSource::Denoised.image(), ImageId::Denoised);

        opts.enable_denoiser = false;
        assert_eq!(
            select(&state, false, &opts).image(),
            ImageId::Output(BufferIndex::Second)
        );
    }

    #[test]
    fn test_resize_nearest() {
        let frame = RgbaFrame {
            width: 2,
            height: 1,
            pixels: vec![10, 10, 10, 255, 200, 200, 200, 255],
        };
        let big = frame.resized_nearest(4, 2);
        assert_eq!(big.pixels.len(), 4 * 2 * 4);
        assert_eq!(&big.pixels[0..4], &[10, 10, 10, 255]);
        assert_eq!(&big.pixels[4..8], &[10, 10, 10, 255]);
        assert_eq!(&big.pixels[8..12], &[200, 200, 200, 255]);
        assert_eq!(&big.pixels[28..32], &[200, 200, 200, 255]);
    }
}
