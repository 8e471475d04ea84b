use std::mem::offset_of;

use bytemuck::{Pod, Zeroable};

use crate::abs::{VertexAttrib, VertexLayout};

/// Interleaved vertex as read by `shaders/cube.vert`: 40 bytes, no padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl VertexLayout for Vertex {
    const ATTRIBS: &'static [VertexAttrib] = &[
        VertexAttrib {
            location: 0,
            components: 3,
            offset: offset_of!(Vertex, position) as i32,
        },
        VertexAttrib {
            location: 1,
            components: 3,
            offset: offset_of!(Vertex, normal) as i32,
        },
        VertexAttrib {
            location: 2,
            components: 4,
            offset: offset_of!(Vertex, color) as i32,
        },
    ];
}

const FACING_CAMERA: [f32; 3] = [0.0, 0.0, -1.0];

/// The one triangle on screen, two units in front of the camera.
pub const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [0.0, 1.0, -2.0],
        normal: FACING_CAMERA,
        color: [1.0, 0.0, 0.0, 1.0],
    },
    Vertex {
        position: [-1.0, 0.0, -2.0],
        normal: FACING_CAMERA,
        color: [0.0, 128.0 / 255.0, 0.0, 1.0],
    },
    Vertex {
        position: [1.0, 0.0, -2.0],
        normal: FACING_CAMERA,
        color: [0.0, 0.0, 1.0, 1.0],
    },
];

/// Draw order for [`TRIANGLE`]; reversed winding relative to `0, 1, 2`.
pub const TRIANGLE_INDICES: [u32; 3] = [0, 2, 1];
