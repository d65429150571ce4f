// Copyright (C) Pavlo Hrytsenko <pashagricenko@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::Write;

use crate::scene::config::RenderOptions;

/// Compile-time switches baked into every kernel.
///
/// Changing any of these needs a pipeline rebuild; everything else the
/// kernels read comes through uniforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderDefines {
    pub envmap: bool,
    pub russian_roulette: bool,
    pub rr_depth: u32,
    pub uniform_light: bool,
    pub hide_emitters: bool,
    pub background: bool,
    pub transparent_background: bool,
}

impl ShaderDefines {
    pub fn from_options(options: &RenderOptions) -> Self {
        Self {
            envmap: options.use_env_map,
            russian_roulette: options.enable_rr,
            rr_depth: options.rr_depth,
            uniform_light: options.use_uniform_light,
            hide_emitters: options.hide_emitters,
            background: options.enable_background,
            transparent_background: options.transparent_background,
        }
    }

    /// WGSL `const` declarations for every switch.
    pub fn prelude(&self) -> String {
        let flags = [
            ("OPT_ENVMAP", self.envmap),
            ("OPT_RR", self.russian_roulette),
            ("OPT_UNIFORM_LIGHT", self.uniform_light),
            ("OPT_HIDE_EMITTERS", self.hide_emitters),
            ("OPT_BACKGROUND", self.background),
            ("OPT_TRANSPARENT_BACKGROUND", self.transparent_background),
        ];

        let mut out = String::new();
        for (name, value) in flags {
            let _ = writeln!(out, "const {name}: bool = {value};");
        }
        let _ = writeln!(out, "const OPT_RR_DEPTH: u32 = {}u;", self.rr_depth);
        out
    }
}
