use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Modules compiled into the binary, keyed by module name.
const EMBEDDED_MODULES: &[(&str, &str)] = &[
    ("common", include_str!("wgsl/common.wgsl")),
    ("camera", include_str!("wgsl/camera.wgsl")),
    ("scene", include_str!("wgsl/scene.wgsl")),
    ("trace", include_str!("wgsl/trace.wgsl")),
    ("tonemap_ops", include_str!("wgsl/tonemap_ops.wgsl")),
    ("tile", include_str!("wgsl/tile.wgsl")),
    ("preview", include_str!("wgsl/preview.wgsl")),
    ("accumulate", include_str!("wgsl/accumulate.wgsl")),
    ("tonemap", include_str!("wgsl/tonemap.wgsl")),
];

/// WGSL shader composer that resolves `// #import module_name` directives.
///
/// Each `.wgsl` file can declare imports at the top, and the composer
/// concatenates them in dependency order with deduplication.
pub struct ShaderComposer {
    modules: HashMap<String, String>,
}

impl ShaderComposer {
    /// The kernels shipped with the crate.
    pub fn embedded() -> Self {
        let modules = EMBEDDED_MODULES
            .iter()
            .map(|&(name, source)| (name.to_string(), source.to_string()))
            .collect();
        Self { modules }
    }

    /// Embedded kernels with every `.wgsl` file under `dir` layered on top.
    pub fn with_overrides(dir: &Path) -> Result<Self> {
        let mut composer = Self::embedded();
        let overrides = Self::from_directory(dir)?;
        for (name, source) in overrides.modules {
            if composer.has_module(&name) {
                log::info!("Shader module `{name}` overridden from {}", dir.display());
            } else {
                log::info!("Shader module `{name}` added from {}", dir.display());
            }
            composer.register(&name, &source);
        }
        Ok(composer)
    }

    /// Load all `.wgsl` files from a directory tree.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut modules = HashMap::new();
        Self::load_dir(dir, dir, &mut modules)?;
        Ok(Self { modules })
    }

    fn load_dir(base: &Path, dir: &Path, modules: &mut HashMap<String, String>) -> Result<()> {
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read shader directory: {}", dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                Self::load_dir(base, &path, modules)?;
            } else if path.extension().is_some_and(|ext| ext == "wgsl") {
                let module_name = Self::path_to_module_name(base, &path);
                let source = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read shader: {}", path.display()))?;
                modules.insert(module_name, source);
            }
        }
        Ok(())
    }

    /// `base/lib/rng.wgsl` -> `lib::rng`
    fn path_to_module_name(base: &Path, path: &Path) -> String {
        let relative = path.strip_prefix(base).unwrap_or(path);
        let stem = relative.with_extension("");
        stem.to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "::")
    }

    /// Compose a shader by resolving all imports recursively.
    pub fn compose(&self, entry_module: &str) -> Result<String> {
        let mut output = String::new();
        let mut visited = HashSet::new();
        self.resolve(entry_module, &mut output, &mut visited)?;
        Ok(output)
    }

    /// Like [`compose`](Self::compose), with `prelude` emitted ahead of every module.
    pub fn compose_with_prelude(&self, entry_module: &str, prelude: &str) -> Result<String> {
        let body = self.compose(entry_module)?;
        Ok(format!("{prelude}\n{body}"))
    }

    fn resolve(
        &self,
        module_name: &str,
        output: &mut String,
        visited: &mut HashSet<String>,
    ) -> Result<()> {
        if visited.contains(module_name) {
            return Ok(());
        }
        visited.insert(module_name.to_string());

        let source = self
            .modules
            .get(module_name)
            .with_context(|| format!("Shader module not found: {module_name}"))?;

        let mut body = String::new();
        for line in source.lines() {
            let trimmed = line.trim();
            if let Some(import_name) = trimmed.strip_prefix("// #import ") {
                self.resolve(import_name.trim(), output, visited)?;
            } else {
                body.push_str(line);
                body.push('\n');
            }
        }
        output.push_str(&body);
        output.push('\n');

        Ok(())
    }

    pub fn register(&mut self, name: &str, source: &str) {
        self.modules.insert(name.to_string(), source.to_string());
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::passes::PassKind;

    fn make_composer(entries: &[(&str, &str)]) -> ShaderComposer {
        let mut composer = ShaderComposer {
            modules: HashMap::new(),
        };
        for &(name, src) in entries {
            composer.register(name, src);
        }
        composer
    }

    #[test]
    fn test_import_resolution() {
        let composer = make_composer(&[
            ("utils", "fn helper() -> f32 { return 1.0; }"),
            ("main", "// #import utils\nfn main() { let x = helper(); }"),
        ]);

        let result = composer.compose("main").unwrap();
        assert!(result.contains("fn helper()"));
        assert!(result.contains("fn main()"));
        assert!(result.find("fn helper()").unwrap() < result.find("fn main()").unwrap());
    }

    #[test]
    fn test_deduplication() {
        let composer = make_composer(&[
            ("base", "fn base_fn() {}"),
            ("a", "// #import base\nfn a_fn() {}"),
            ("b", "// #import base\nfn b_fn() {}"),
            ("main", "// #import a\n// #import b\nfn main_fn() {}"),
        ]);

        let result = composer.compose("main").unwrap();
        assert_eq!(result.matches("fn base_fn()").count(), 1);
    }

    #[test]
    fn test_missing_module_is_an_error() {
        let composer = make_composer(&[("main", "// #import nowhere\n")]);
        let err = composer.compose("main").unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_every_pass_composes_from_embedded() {
        let composer = ShaderComposer::embedded();
        for kind in PassKind::ALL {
            let source = composer.compose(kind.name()).unwrap();
            assert!(source.contains("fn main("), "{} has no entry point", kind.name());
            assert!(!source.contains("// #import"));
        }
        let tile = composer.compose("tile").unwrap();
        assert_eq!(tile.matches("fn pcg_hash(").count(), 1);
    }

    #[test]
    fn test_prelude_comes_first() {
        let composer = make_composer(&[("main", "fn main() {}")]);
        let result = composer
            .compose_with_prelude("main", "const FLAG: bool = true;")
            .unwrap();
        assert!(result.starts_with("const FLAG"));
    }

    #[test]
    fn test_directory_overrides_embedded_module() {
        let dir = std::env::temp_dir().join(format!("tpt_shaders_{}", std::process::id()));
        std::fs::create_dir_all(dir.join("extra")).unwrap();
        std::fs::write(dir.join("tonemap.wgsl"), "fn main() { /* custom */ }").unwrap();
        std::fs::write(dir.join("extra").join("util.wgsl"), "fn util() {}").unwrap();

        let composer = ShaderComposer::with_overrides(&dir).unwrap();
        assert!(composer.compose("tonemap").unwrap().contains("custom"));
        assert!(composer.has_module("tile"));
        assert!(composer.has_module("extra::util"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
