// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};

use crate::scene::config::CameraConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,   // degrees
    pub pitch: f32, // degrees
    pub fov: f32,   // degrees
    pub focal_dist: f32,
    pub aperture: f32,
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: Vec3::from(config.position),
            yaw: config.rotation[1],
            pitch: config.rotation[0],
            fov: config.fov,
            focal_dist: config.focal_dist,
            aperture: config.aperture,
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            glam::EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            0.0,
        )
    }

    pub fn basis_vectors(&self) -> (Vec3, Vec3, Vec3) {
        let rot = self.orientation();
        let forward = rot * Vec3::Z;
        let right = rot * Vec3::X;
        let up = rot * Vec3::Y;
        (right, up, forward)
    }

    pub fn to_uniform(&self) -> CameraUniform {
        let (right, up, forward) = self.basis_vectors();
        CameraUniform {
            position: self.position.into(),
            fov: self.fov.to_radians(),
            right: right.into(),
            focal_dist: self.focal_dist,
            up: up.into(),
            aperture: self.aperture,
            forward: forward.into(),
            _pad: 0.0,
        }
    }
}

/// Must match the WGSL `Camera` struct layout exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub position: [f32; 3],
    pub fov: f32,
    pub right: [f32; 3],
    pub focal_dist: f32,
    pub up: [f32; 3],
    pub aperture: f32,
    pub forward: [f32; 3],
    pub _pad: f32,
}
