//! Mesh management module.
//!
//! This module defines [`Buffer`], [`VertexArray`] and the [`IndexedMesh`] built from them.
//! Vertices should implement the [`VertexLayout`] trait.

use std::sync::Arc;

use crate::{
    abs::gpu::{Gpu, VertexAttrib},
    error::Error,
};

/// Describes how a vertex type is laid out in memory.
pub trait VertexLayout: bytemuck::Pod {
    /// Attributes read from one interleaved vertex.
    const ATTRIBS: &'static [VertexAttrib];

    /// Size of one vertex in bytes.
    fn stride() -> i32 {
        std::mem::size_of::<Self>() as i32
    }
}

/// An immutable GPU buffer. Its size and contents are fixed at creation.
pub struct Buffer<G: Gpu> {
    gpu: Arc<G>,
    id: G::Buffer,
    size: usize,
}

impl<G: Gpu> Buffer<G> {
    pub fn new(gpu: &Arc<G>, data: &[u8]) -> Result<Self, Error> {
        let id = gpu.create_immutable_buffer(data).map_err(Error::Gpu)?;
        Ok(Self {
            gpu: Arc::clone(gpu),
            id,
            size: data.len(),
        })
    }

    pub fn id(&self) -> G::Buffer {
        self.id
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<G: Gpu> Drop for Buffer<G> {
    fn drop(&mut self) {
        self.gpu.delete_buffer(self.id);
    }
}

/// A vertex array object binding one vertex buffer and one index buffer.
pub struct VertexArray<G: Gpu> {
    gpu: Arc<G>,
    id: G::VertexArray,
}

impl<G: Gpu> VertexArray<G> {
    pub fn new<V: VertexLayout>(
        gpu: &Arc<G>,
        vertices: &Buffer<G>,
        indices: &Buffer<G>,
    ) -> Result<Self, Error> {
        let id = gpu
            .create_vertex_array(vertices.id(), indices.id(), V::stride(), V::ATTRIBS)
            .map_err(Error::Gpu)?;
        Ok(Self {
            gpu: Arc::clone(gpu),
            id,
        })
    }

    pub fn bind(&self) {
        self.gpu.bind_vertex_array(Some(self.id));
    }

    pub fn unbind(&self) {
        self.gpu.bind_vertex_array(None);
    }

    pub fn id(&self) -> G::VertexArray {
        self.id
    }
}

impl<G: Gpu> Drop for VertexArray<G> {
    fn drop(&mut self) {
        self.gpu.delete_vertex_array(self.id);
    }
}

/// Represents an indexed triangle mesh stored on the GPU side.
pub struct IndexedMesh<G: Gpu> {
    gpu: Arc<G>,
    // dropped first, before the buffers it refers to
    vao: VertexArray<G>,
    vbo: Buffer<G>,
    ebo: Buffer<G>,
    index_count: usize,
}

impl<G: Gpu> IndexedMesh<G> {
    /// Uploads the given vertex and index data.
    pub fn new<V: VertexLayout>(
        gpu: &Arc<G>,
        vertices: &[V],
        indices: &[u32],
    ) -> Result<Self, Error> {
        let vbo = Buffer::new(gpu, bytemuck::cast_slice(vertices))?;
        let ebo = Buffer::new(gpu, bytemuck::cast_slice(indices))?;
        let vao = VertexArray::new::<V>(gpu, &vbo, &ebo)?;

        Ok(Self {
            gpu: Arc::clone(gpu),
            vao,
            vbo,
            ebo,
            index_count: indices.len(),
        })
    }

    /// Draws the mesh with a single indexed draw call.
    pub fn draw(&self) {
        self.vao.bind();
        self.gpu.draw_indexed_triangles(self.index_count as i32);
        self.vao.unbind();
    }

    pub fn vertex_buffer(&self) -> &Buffer<G> {
        &self.vbo
    }

    pub fn index_buffer(&self) -> &Buffer<G> {
        &self.ebo
    }

    pub fn vertex_array(&self) -> &VertexArray<G> {
        &self.vao
    }

    /// Number of indices drawn per call.
    pub fn index_count(&self) -> usize {
        self.index_count
    }
}
