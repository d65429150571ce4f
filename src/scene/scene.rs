// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::camera::camera::Camera;

use super::config::{RenderConfig, RenderOptions};

/// The host-side view of the scene that the renderer observes each tick.
///
/// `dirty` means the camera or instance transforms changed since the last
/// tick. The renderer consumes it; everything else is read-only to it.
#[derive(Debug, Clone)]
pub struct Scene {
    pub options: RenderOptions,
    camera: Camera,
    dirty: bool,
}

impl Scene {
    /// A freshly loaded scene starts dirty so the first tick resets and previews.
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            options: config.render.clone(),
            camera: Camera::from_config(&config.camera),
            dirty: true,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
