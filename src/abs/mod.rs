//! This module contains the thin OpenGL layer the renderer is built on,
//! including application setup, the GPU call surface, shader management, buffers and debug output.

pub mod app;
pub mod debug;
pub mod gpu;
pub mod mesh;
pub mod shader;

pub use app::*;
pub use gpu::*;
pub use mesh::*;
pub use shader::*;
