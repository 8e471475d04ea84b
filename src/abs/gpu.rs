//! The part of the OpenGL API the renderer drives.
//!
//! [`Gpu`] is implemented for [`glow::Context`]. The shader, buffer and renderer code above it is
//! written against the trait, so the whole load/resize/render/unload cycle can also run against
//! a recording backend in tests.

use std::fmt;

use glam::{Mat4, Vec4};
use glow::HasContext;

/// Pipeline stage of a shader object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// The matching `GL_*_SHADER` enum.
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// One float attribute inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttrib {
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components.
    pub components: i32,
    /// Byte offset from the start of the vertex.
    pub offset: i32,
}

/// Graphics calls used by the renderer.
///
/// Handles are opaque and owned by the RAII wrappers in [`crate::abs`]; nothing else deletes them.
pub trait Gpu {
    type Shader: Copy + PartialEq + fmt::Debug;
    type Program: Copy + PartialEq + fmt::Debug;
    type Buffer: Copy + PartialEq + fmt::Debug;
    type VertexArray: Copy + PartialEq + fmt::Debug;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Uploads `source`, compiles it and returns the compile status.
    fn compile_shader(&self, shader: Self::Shader, source: &str) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Links `program` and returns the link status.
    fn link_program(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    /// Writes a matrix to a fixed `layout(location = N)` uniform of `program` without binding it.
    fn program_uniform_mat4(&self, program: Self::Program, location: u32, value: &Mat4);
    fn delete_program(&self, program: Self::Program);

    /// Creates an immutable buffer holding exactly `data`.
    fn create_immutable_buffer(&self, data: &[u8]) -> Result<Self::Buffer, String>;
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Creates a vertex array reading interleaved vertices of `stride` bytes from
    /// `vertex_buffer` at binding 0, with `index_buffer` as its element source.
    fn create_vertex_array(
        &self,
        vertex_buffer: Self::Buffer,
        index_buffer: Self::Buffer,
        stride: i32,
        attribs: &[VertexAttrib],
    ) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    fn viewport(&self, width: i32, height: i32);
    fn set_clear_color(&self, color: Vec4);
    fn enable_depth_test(&self);
    /// Clears the colour and depth buffers.
    fn clear(&self);
    /// Draws `count` `u32` indices from the bound vertex array as a triangle list.
    fn draw_indexed_triangles(&self, count: i32);
}

impl Gpu for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type VertexArray = glow::VertexArray;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, stage.gl_enum()) }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) -> bool {
        unsafe {
            HasContext::shader_source(self, shader, source);
            HasContext::compile_shader(self, shader);
            HasContext::get_shader_compile_status(self, shader)
        }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { HasContext::get_shader_info_log(self, shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) -> bool {
        unsafe {
            HasContext::link_program(self, program);
            HasContext::get_program_link_status(self, program)
        }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { HasContext::get_program_info_log(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn program_uniform_mat4(&self, program: Self::Program, location: u32, value: &Mat4) {
        let location = glow::NativeUniformLocation(location);
        unsafe {
            HasContext::program_uniform_matrix_4_f32_slice(
                self,
                program,
                Some(&location),
                false,
                value.as_ref(),
            );
        }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn create_immutable_buffer(&self, data: &[u8]) -> Result<Self::Buffer, String> {
        let size = i32::try_from(data.len()).map_err(|e| e.to_string())?;
        unsafe {
            let buffer = HasContext::create_buffer(self)?;
            HasContext::bind_buffer(self, glow::COPY_WRITE_BUFFER, Some(buffer));
            HasContext::buffer_storage(self, glow::COPY_WRITE_BUFFER, size, Some(data), 0);
            HasContext::bind_buffer(self, glow::COPY_WRITE_BUFFER, None);
            Ok(buffer)
        }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn create_vertex_array(
        &self,
        vertex_buffer: Self::Buffer,
        index_buffer: Self::Buffer,
        stride: i32,
        attribs: &[VertexAttrib],
    ) -> Result<Self::VertexArray, String> {
        unsafe {
            let vao = HasContext::create_vertex_array(self)?;

            HasContext::bind_vertex_array(self, Some(vao));
            HasContext::bind_buffer(self, glow::ARRAY_BUFFER, Some(vertex_buffer));
            HasContext::bind_buffer(self, glow::ELEMENT_ARRAY_BUFFER, Some(index_buffer));

            for attrib in attribs {
                HasContext::enable_vertex_attrib_array(self, attrib.location);
                HasContext::vertex_attrib_pointer_f32(
                    self,
                    attrib.location,
                    attrib.components,
                    glow::FLOAT,
                    false,
                    stride,
                    attrib.offset,
                );
            }

            HasContext::bind_vertex_array(self, None);
            HasContext::bind_buffer(self, glow::ARRAY_BUFFER, None);
            HasContext::bind_buffer(self, glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(vao)
        }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vertex_array) }
    }

    fn viewport(&self, width: i32, height: i32) {
        unsafe { HasContext::viewport(self, 0, 0, width, height) }
    }

    fn set_clear_color(&self, color: Vec4) {
        unsafe { HasContext::clear_color(self, color.x, color.y, color.z, color.w) }
    }

    fn enable_depth_test(&self) {
        unsafe { HasContext::enable(self, glow::DEPTH_TEST) }
    }

    fn clear(&self) {
        unsafe { HasContext::clear(self, glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT) }
    }

    fn draw_indexed_triangles(&self, count: i32) {
        unsafe { HasContext::draw_elements(self, glow::TRIANGLES, count, glow::UNSIGNED_INT, 0) }
    }
}
