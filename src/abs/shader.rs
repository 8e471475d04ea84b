//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! Compile and link status is always checked; failures carry the driver's info log.

use std::{path::Path, sync::Arc};

use glam::Mat4;

use crate::{
    abs::gpu::{Gpu, ShaderStage},
    error::Error,
};

/// Represents an individual compiled shader object.
pub struct Shader<G: Gpu> {
    gpu: Arc<G>,
    id: G::Shader,
}

impl<G: Gpu> Shader<G> {
    /// Compiles a new shader from the given source code.
    pub fn new(gpu: &Arc<G>, stage: ShaderStage, source: &str) -> Result<Self, Error> {
        let shader = gpu.create_shader(stage).map_err(Error::Gpu)?;

        if !gpu.compile_shader(shader, source) {
            let log = gpu.shader_info_log(shader);
            gpu.delete_shader(shader);
            return Err(Error::ShaderCompile { stage, log });
        }

        Ok(Self {
            gpu: Arc::clone(gpu),
            id: shader,
        })
    }

    /// Reads `path` and compiles its contents.
    pub fn from_file(gpu: &Arc<G>, stage: ShaderStage, path: &Path) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        log::debug!("compiling {stage} shader {}", path.display());
        Self::new(gpu, stage, &source)
    }
}

impl<G: Gpu> Drop for Shader<G> {
    fn drop(&mut self) {
        self.gpu.delete_shader(self.id);
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram<G: Gpu> {
    gpu: Arc<G>,
    id: G::Program,
}

impl<G: Gpu> ShaderProgram<G> {
    /// Links a new shader program from the given shaders.
    ///
    /// The shaders are detached again once linked, so dropping them afterwards frees them.
    pub fn new(gpu: &Arc<G>, shaders: &[&Shader<G>]) -> Result<Self, Error> {
        let program = gpu.create_program().map_err(Error::Gpu)?;

        for shader in shaders {
            gpu.attach_shader(program, shader.id);
        }

        let linked = gpu.link_program(program);

        for shader in shaders {
            gpu.detach_shader(program, shader.id);
        }

        if !linked {
            let log = gpu.program_info_log(program);
            gpu.delete_program(program);
            return Err(Error::ProgramLink { log });
        }

        Ok(Self {
            gpu: Arc::clone(gpu),
            id: program,
        })
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        self.gpu.use_program(Some(self.id));
    }

    /// Sets the matrix uniform declared at `layout(location = location)`.
    pub fn set_uniform_at(&self, location: u32, value: &Mat4) {
        self.gpu.program_uniform_mat4(self.id, location, value);
    }

    pub fn id(&self) -> G::Program {
        self.id
    }
}

impl<G: Gpu> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gpu.delete_program(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abs::gpu::recording::{Call, RecordingGpu};

    const VERT: &str = "#version 460 core\nvoid main() { gl_Position = vec4(0.0); }";
    const FRAG: &str = "#version 460 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }";

    #[test]
    fn valid_sources_link_into_a_program() {
        let gpu = Arc::new(RecordingGpu::default());
        let vert = Shader::new(&gpu, ShaderStage::Vertex, VERT).unwrap();
        let frag = Shader::new(&gpu, ShaderStage::Fragment, FRAG).unwrap();
        let program = ShaderProgram::new(&gpu, &[&vert, &frag]).unwrap();

        assert_ne!(program.id(), 0);
        assert_eq!(gpu.count(|c| matches!(c, Call::AttachShader { .. })), 2);
        assert_eq!(gpu.count(|c| matches!(c, Call::DetachShader { .. })), 2);

        drop(vert);
        drop(frag);
        // only the program is left
        assert_eq!(gpu.live_objects(), 1);

        drop(program);
        assert_eq!(gpu.live_objects(), 0);
    }

    #[test]
    fn invalid_source_reports_compile_failure() {
        let gpu = Arc::new(RecordingGpu::default());
        let err = Shader::new(&gpu, ShaderStage::Fragment, "this is not glsl").err().unwrap();

        match err {
            Error::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("syntax error"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(gpu.live_objects(), 0);
    }

    #[test]
    fn link_failure_deletes_the_program() {
        let gpu = Arc::new(RecordingGpu::failing_link());
        let vert = Shader::new(&gpu, ShaderStage::Vertex, VERT).unwrap();
        let frag = Shader::new(&gpu, ShaderStage::Fragment, FRAG).unwrap();

        let err = ShaderProgram::new(&gpu, &[&vert, &frag]).err().unwrap();
        assert!(matches!(err, Error::ProgramLink { .. }));
        assert_eq!(gpu.count(|c| matches!(c, Call::DetachShader { .. })), 2);
        assert_eq!(gpu.count(|c| matches!(c, Call::DeleteProgram(_))), 1);
    }

    #[test]
    fn missing_source_file_is_an_io_error() {
        let gpu = Arc::new(RecordingGpu::default());
        let err = Shader::from_file(&gpu, ShaderStage::Vertex, Path::new("nope/cube.vert"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Io { .. }));
        assert!(gpu.calls().is_empty());
    }

    #[test]
    fn uniforms_go_to_fixed_locations() {
        let gpu = Arc::new(RecordingGpu::default());
        let vert = Shader::new(&gpu, ShaderStage::Vertex, VERT).unwrap();
        let frag = Shader::new(&gpu, ShaderStage::Fragment, FRAG).unwrap();
        let program = ShaderProgram::new(&gpu, &[&vert, &frag]).unwrap();

        program.set_uniform_at(4, &Mat4::IDENTITY);
        assert!(gpu.calls().contains(&Call::Uniform {
            program: program.id(),
            location: 4,
            value: Mat4::IDENTITY,
        }));
    }
}
