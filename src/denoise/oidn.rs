// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{DenoiseError, Denoiser, check_shape};

/// Intel Open Image Denoise, generic ray-tracing filter on display-encoded color.
pub struct OidnDenoiser {
    device: oidn::Device,
}

impl OidnDenoiser {
    pub fn new() -> Self {
        Self {
            device: oidn::Device::new(),
        }
    }
}

impl Default for OidnDenoiser {
    fn default() -> Self {
        Self::new()
    }
}

impl Denoiser for OidnDenoiser {
    fn denoise(&mut self, color: &[f32], width: u32, height: u32) -> Result<Vec<f32>, DenoiseError> {
        check_shape(color, width, height)?;

        let mut output = vec![0.0f32; color.len()];
        oidn::RayTracing::new(&self.device)
            .image_dimensions(width as usize, height as usize)
            .hdr(false)
            .srgb(true)
            .filter(color, &mut output)
            .map_err(|e| DenoiseError::Failed(format!("OIDN filtering failed: {e:?}")))?;

        if let Err((_, message)) = self.device.get_error() {
            return Err(DenoiseError::Failed(message));
        }

        log::debug!("OIDN denoised {width}x{height}");
        Ok(output)
    }
}
