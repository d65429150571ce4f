// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

use super::passes::{ImageId, PassInvocation};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("pass `{0}` is not supported by this backend")]
    UnsupportedPass(&'static str),
    #[error("image {image:?} holds {expected} values, got {actual}")]
    SizeMismatch {
        image: ImageId,
        expected: usize,
        actual: usize,
    },
    #[error("readback of {0:?} failed: {1}")]
    Readback(ImageId, String),
    #[error("backend failure: {0}")]
    Other(String),
}

/// The rendering device as seen by the scheduler.
///
/// Work is recorded in call order and only guaranteed to have run after
/// [`RenderBackend::submit`]. Readbacks and uploads flush pending work first.
pub trait RenderBackend {
    fn execute(&mut self, pass: &PassInvocation) -> Result<(), BackendError>;

    /// Zero every pixel of `image`.
    fn clear(&mut self, image: ImageId) -> Result<(), BackendError>;

    fn submit(&mut self) -> Result<(), BackendError>;

    /// Interleaved linear RGB, `width × height × 3` floats, rows top-down.
    fn read_rgb(&mut self, image: ImageId) -> Result<Vec<f32>, BackendError>;

    fn write_rgb(&mut self, image: ImageId, rgb: &[f32]) -> Result<(), BackendError>;

    /// 8-bit RGBA, `width × height × 4` bytes, rows top-down.
    fn read_rgba8(&mut self, image: ImageId) -> Result<Vec<u8>, BackendError>;

    fn image_size(&self, image: ImageId) -> (u32, u32);
}

/// Quantize a linear `[0, 1]` float to 8 bits.
pub fn to_unorm8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_unorm8() {
        assert_eq!(to_unorm8(-1.0), 0);
        assert_eq!(to_unorm8(0.0), 0);
        assert_eq!(to_unorm8(0.5), 128);
        assert_eq!(to_unorm8(1.0), 255);
        assert_eq!(to_unorm8(f32::NAN), 0);
    }
}
