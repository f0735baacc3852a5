//! Named shader resources.
//!
//! Shaders are looked up by name: `<shader_dir>/<name>.wgsl` on disk wins,
//! otherwise the built-in source compiled into the binary is used. All WGSL
//! is parsed and validated before a module is created, so a broken shader is
//! an error value instead of a device panic.

use log::{debug, info};
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use thiserror::Error;
use wgpu::naga;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

/// Built-in shader for the textured sphere bodies.
pub const BODY_SHADER: &str = "body";
/// Built-in shader for the cubemap skybox.
pub const SKYBOX_SHADER: &str = "skybox";

const BUILTIN_SHADERS: &[(&str, &str)] = &[
    (BODY_SHADER, include_str!("../shaders/body.wgsl")),
    (SKYBOX_SHADER, include_str!("../shaders/skybox.wgsl")),
];

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader '{name}' failed to compile: {message}")]
    CompilationFailed { name: String, message: String },

    #[error("shader file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read shader file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("shader '{name}' not found on disk or among built-ins")]
    Unknown { name: String },

    #[error("no shader directory configured for file-based loading")]
    NoShaderDir,
}

/// Source of a built-in shader.
pub fn builtin_source(name: &str) -> Option<&'static str> {
    BUILTIN_SHADERS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, source)| *source)
}

/// Parse and validate WGSL without touching a device.
pub fn validate_wgsl(name: &str, source: &str) -> Result<(), ShaderError> {
    let module =
        naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::CompilationFailed {
            name: name.to_string(),
            message: e.emit_to_string(source),
        })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::CompilationFailed {
        name: name.to_string(),
        message: e.emit_to_string(source),
    })?;

    Ok(())
}

/// Compiled shader modules by name.
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
    shader_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            shader_dir: None,
        }
    }

    /// Directory searched for `<name>.wgsl` overrides.
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = Some(dir.into());
        self
    }

    /// Validate and compile WGSL source under `name`.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        debug!("Loading shader '{}' from source", name);
        validate_wgsl(name, source)?;

        let module = Arc::new(device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        }));

        if self
            .modules
            .insert(name.to_string(), Arc::clone(&module))
            .is_some()
        {
            info!("Replaced shader '{}'", name);
        } else {
            info!("Loaded shader '{}'", name);
        }

        Ok(module)
    }

    /// Load `filename` from the shader directory under `name`.
    pub fn load_from_file(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        filename: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let path = self
            .shader_dir
            .as_ref()
            .ok_or(ShaderError::NoShaderDir)?
            .join(filename);

        debug!("Loading shader '{}' from file: {:?}", name, path);

        if !path.exists() {
            return Err(ShaderError::FileNotFound { path });
        }

        let source = std::fs::read_to_string(&path)?;
        self.load_from_source(device, name, &source)
    }

    /// Load a shader by name, preferring `<shader_dir>/<name>.wgsl` over the
    /// built-in. Already-loaded names are returned from the cache.
    pub fn load_named(
        &mut self,
        device: &wgpu::Device,
        name: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        if let Some(module) = self.get(name) {
            return Ok(module);
        }
        match self.resolve_source(name)? {
            NamedSource::File(source) => self.load_from_source(device, name, &source),
            NamedSource::Builtin(source) => self.load_from_source(device, name, source),
        }
    }

    fn resolve_source(&self, name: &str) -> Result<NamedSource, ShaderError> {
        if let Some(dir) = &self.shader_dir {
            let path = dir.join(format!("{name}.wgsl"));
            if path.is_file() {
                debug!("Shader '{}' overridden by {:?}", name, path);
                return Ok(NamedSource::File(std::fs::read_to_string(&path)?));
            }
        }
        builtin_source(name)
            .map(NamedSource::Builtin)
            .ok_or_else(|| ShaderError::Unknown {
                name: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<Arc<wgpu::ShaderModule>> {
        self.modules.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

enum NamedSource {
    File(String),
    Builtin(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_SHADER: &str = r#"
        @vertex
        fn vs_main(@builtin(vertex_index) idx: u32) -> @builtin(position) vec4<f32> {
            return vec4<f32>(0.0, 0.0, 0.0, 1.0);
        }

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 0.0, 0.0, 1.0);
        }
    "#;

    const INVALID_SHADER: &str = r#"
        @vertex
        fn vs_main() -> @builtin(position) vec4<f32> {
            return undeclared_variable;
        }
    "#;

    fn create_test_device() -> Option<wgpu::Device> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .ok()?;

        let (device, _queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).ok()?;

        Some(device)
    }

    #[test]
    fn test_builtin_shaders_validate() {
        for (name, source) in BUILTIN_SHADERS {
            validate_wgsl(name, source).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin_source(BODY_SHADER).is_some());
        assert!(builtin_source(SKYBOX_SHADER).is_some());
        assert!(builtin_source("bloom").is_none());
    }

    #[test]
    fn test_invalid_shader_is_compilation_error() {
        let err = validate_wgsl("bad", INVALID_SHADER).unwrap_err();
        match err {
            ShaderError::CompilationFailed { name, message } => {
                assert_eq!(name, "bad");
                assert!(message.contains("undeclared_variable"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_body_shader_honours_vertex_contract() {
        let source = builtin_source(BODY_SHADER).unwrap();
        for needle in [
            "@location(0) position",
            "@location(1) color",
            "@location(2) uv",
            "model",
            "view",
            "projection",
        ] {
            assert!(source.contains(needle), "body.wgsl lacks {needle}");
        }
    }

    #[test]
    fn test_load_invalid_shader_returns_error() {
        let Some(device) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let result = library.load_from_source(&device, "bad", INVALID_SHADER);
        assert!(matches!(
            result,
            Err(ShaderError::CompilationFailed { .. })
        ));
        assert!(library.is_empty());
    }

    #[test]
    fn test_load_named_uses_builtin() {
        let Some(device) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        library.load_named(&device, BODY_SHADER).unwrap();
        let a = library.load_named(&device, BODY_SHADER).unwrap();
        let b = library.get(BODY_SHADER).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_load_named_prefers_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("skybox.wgsl"), INVALID_SHADER).unwrap();
        let library = ShaderLibrary::new().with_shader_dir(dir.path());
        match library.resolve_source(SKYBOX_SHADER).unwrap() {
            NamedSource::File(source) => assert_eq!(source, INVALID_SHADER),
            NamedSource::Builtin(_) => panic!("built-in used despite override"),
        }
    }

    #[test]
    fn test_unknown_name_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let library = ShaderLibrary::new().with_shader_dir(dir.path());
        assert!(matches!(
            library.resolve_source("missing"),
            Err(ShaderError::Unknown { .. })
        ));
    }

    #[test]
    fn test_load_from_file_without_shader_dir_returns_error() {
        let Some(device) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let result = library.load_from_file(&device, "test", "test.wgsl");
        assert!(matches!(result, Err(ShaderError::NoShaderDir)));
    }

    #[test]
    fn test_load_from_file_missing_returns_not_found() {
        let Some(device) = create_test_device() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let mut library = ShaderLibrary::new().with_shader_dir(dir.path());
        let result = library.load_from_file(&device, "test", "nope.wgsl");
        assert!(matches!(result, Err(ShaderError::FileNotFound { .. })));
    }

    #[test]
    fn test_shader_library_starts_empty() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert!(library.get("nonexistent").is_none());
    }

    #[test]
    fn test_valid_source_validates() {
        assert!(validate_wgsl("ok", VALID_SHADER).is_ok());
    }
}
