// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! External denoiser service.
//!
//! The renderer only decides when to call it; implementations own the filter.

#[cfg(feature = "oidn")]
pub mod oidn;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DenoiseError {
    #[error("denoiser expected {expected} floats for {width}x{height} RGB, got {actual}")]
    Shape {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("denoiser failed: {0}")]
    Failed(String),
}

/// Synchronous denoiser over interleaved RGB floats, rows top-down.
pub trait Denoiser {
    /// Returns a buffer of the same shape as `color`.
    fn denoise(&mut self, color: &[f32], width: u32, height: u32) -> Result<Vec<f32>, DenoiseError>;
}

/// Check that `data` is exactly `width × height` RGB triples.
pub fn check_shape(data: &[f32], width: u32, height: u32) -> Result<(), DenoiseError> {
    let expected = width as usize * height as usize * 3;
    if data.len() != expected {
        return Err(DenoiseError::Shape {
            width,
            height,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// The denoiser this build offers, if any.
pub fn default_denoiser() -> Option<Box<dyn Denoiser>> {
    #[cfg(feature = "oidn")]
    {
        Some(Box::new(oidn::OidnDenoiser::new()))
    }
    #[cfg(not(feature = "oidn"))]
    {
        None
    }
}
