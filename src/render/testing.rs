// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! CPU stand-in for the GPU backend used by renderer tests.
//!
//! Trace passes write a constant radiance, accumulate adds the working tile
//! into its region and tonemap divides by the sample count. That is enough to
//! observe which image holds which pass.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use super::backend::{BackendError, RenderBackend, to_unorm8};
use super::passes::{ImageId, PassInvocation, PassKind, PassUniforms, RenderTargets};
use super::state::BufferIndex;

pub const TILE_RADIANCE: f32 = 1.0;
pub const PREVIEW_RADIANCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Execute(PassKind, ImageId),
    Clear(ImageId),
    Submit,
    ReadRgb(ImageId),
    WriteRgb(ImageId),
    ReadRgba8(ImageId),
}

pub struct RecordingBackend {
    pub targets: RenderTargets,
    pub calls: Vec<Call>,
    /// Make every pass of this kind fail.
    pub fail_on: Option<PassKind>,
    images: HashMap<ImageId, Vec<[f32; 4]>>,
    drop_flag: Option<Rc<Cell<bool>>>,
}

impl RecordingBackend {
    pub fn new(targets: RenderTargets) -> Self {
        let mut images = HashMap::new();
        for image in [
            ImageId::TileWork,
            ImageId::Preview,
            ImageId::Accumulation,
            ImageId::Output(BufferIndex::First),
            ImageId::Output(BufferIndex::Second),
            ImageId::Denoised,
        ] {
            let (w, h) = targets.image_size(image);
            images.insert(image, vec![[0.0; 4]; w as usize * h as usize]);
        }
        Self {
            targets,
            calls: Vec::new(),
            fail_on: None,
            images,
            drop_flag: None,
        }
    }

    /// Set `flag` when the backend is dropped.
    pub fn with_drop_flag(mut self, flag: Rc<Cell<bool>>) -> Self {
        self.drop_flag = Some(flag);
        self
    }

    pub fn image(&self, image: ImageId) -> &[[f32; 4]] {
        self.images.get(&image).map(Vec::as_slice).unwrap_or(&[])
    }

    fn pixels_mut(&mut self, image: ImageId) -> &mut Vec<[f32; 4]> {
        self.images.entry(image).or_default()
    }

    fn fill(&mut self, image: ImageId, value: f32) {
        for px in self.pixels_mut(image).iter_mut() {
            *px = [value, value, value, 1.0];
        }
    }

    fn accumulate(&mut self, pass: &PassInvocation) {
        let PassUniforms::Accumulate(u) = pass.uniforms else {
            return;
        };
        let work = self.image(ImageId::TileWork).to_vec();
        let accum = self.pixels_mut(ImageId::Accumulation);
        let [sx, sy] = u.src_origin;
        let [dx, dy] = u.region_origin;
        for row in 0..u.region_size[1] {
            for col in 0..u.region_size[0] {
                let src = ((sy + row) * u.tile_width + sx + col) as usize;
                let dst = ((dy + row) * u.accum_width + dx + col) as usize;
                for c in 0..4 {
                    accum[dst][c] += work[src][c];
                }
            }
        }
    }

    fn tonemap(&mut self, pass: &PassInvocation) {
        let PassUniforms::Tonemap(u) = pass.uniforms else {
            return;
        };
        let accum = self.image(ImageId::Accumulation).to_vec();
        let out = self.pixels_mut(pass.target);
        for (dst, src) in out.iter_mut().zip(accum) {
            *dst = [
                src[0] * u.inv_sample_counter,
                src[1] * u.inv_sample_counter,
                src[2] * u.inv_sample_counter,
                1.0,
            ];
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn execute(&mut self, pass: &PassInvocation) -> Result<(), BackendError> {
        self.calls.push(Call::Execute(pass.kind, pass.target));
        if self.fail_on == Some(pass.kind) {
            return Err(BackendError::Other(format!("{} failed", pass.kind.name())));
        }
        match pass.kind {
            PassKind::Tile => self.fill(pass.target, TILE_RADIANCE),
            PassKind::Preview => self.fill(pass.target, PREVIEW_RADIANCE),
            PassKind::Accumulate => self.accumulate(pass),
            PassKind::Tonemap => self.tonemap(pass),
        }
        Ok(())
    }

    fn clear(&mut self, image: ImageId) -> Result<(), BackendError> {
        self.calls.push(Call::Clear(image));
        for px in self.pixels_mut(image).iter_mut() {
            *px = [0.0; 4];
        }
        Ok(())
    }

    fn submit(&mut self) -> Result<(), BackendError> {
        self.calls.push(Call::Submit);
        Ok(())
    }

    fn read_rgb(&mut self, image: ImageId) -> Result<Vec<f32>, BackendError> {
        self.calls.push(Call::ReadRgb(image));
        Ok(self
            .image(image)
            .iter()
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect())
    }

    fn write_rgb(&mut self, image: ImageId, rgb: &[f32]) -> Result<(), BackendError> {
        self.calls.push(Call::WriteRgb(image));
        let (w, h) = self.image_size(image);
        let expected = w as usize * h as usize * 3;
        if rgb.len() != expected {
            return Err(BackendError::SizeMismatch {
                image,
                expected,
                actual: rgb.len(),
            });
        }
        let pixels = self.pixels_mut(image);
        for (dst, src) in pixels.iter_mut().zip(rgb.chunks_exact(3)) {
            *dst = [src[0], src[1], src[2], 1.0];
        }
        Ok(())
    }

    fn read_rgba8(&mut self, image: ImageId) -> Result<Vec<u8>, BackendError> {
        self.calls.push(Call::ReadRgba8(image));
        Ok(self
            .image(image)
            .iter()
            .flat_map(|px| px.map(to_unorm8))
            .collect())
    }

    fn image_size(&self, image: ImageId) -> (u32, u32) {
        self.targets.image_size(image)
    }
}

impl Drop for RecordingBackend {
    fn drop(&mut self) {
        if let Some(flag) = &self.drop_flag {
            flag.set(true);
        }
    }
}
