//! The renderer: one shader program, one indexed triangle, one draw per frame.

use std::{sync::Arc, time::Duration};

use glam::{Mat4, Vec4};

use crate::{
    abs::{Gpu, IndexedMesh, Shader, ShaderProgram, ShaderStage},
    camera::{self, Camera},
    error::Error,
    host::Lifecycle,
    settings::RenderSettings,
    vertex::{TRIANGLE, TRIANGLE_INDICES},
};

/// `layout(location = 0) uniform mat4 projection`
pub const PROJECTION_LOCATION: u32 = 0;
/// `layout(location = 4) uniform mat4 camera`
pub const CAMERA_LOCATION: u32 = 4;

/// GPU objects that exist between load and unload.
struct Resources<G: Gpu> {
    program: ShaderProgram<G>,
    mesh: IndexedMesh<G>,
}

/// Owns every GPU object the demo uses and implements the window lifecycle.
pub struct RenderBootstrap<G: Gpu> {
    gpu: Arc<G>,
    settings: RenderSettings,
    camera: Camera,
    viewport: Option<(u32, u32)>,
    projection: Option<Mat4>,
    resources: Option<Resources<G>>,
    frames: u64,
}

impl<G: Gpu> RenderBootstrap<G> {
    pub fn new(gpu: Arc<G>, settings: RenderSettings) -> Self {
        Self {
            gpu,
            settings,
            camera: Camera::default(),
            viewport: None,
            projection: None,
            resources: None,
            frames: 0,
        }
    }

    fn load_program(&self) -> Result<ShaderProgram<G>, Error> {
        let vert = Shader::from_file(&self.gpu, ShaderStage::Vertex, &self.settings.vertex_shader)?;
        let frag = Shader::from_file(
            &self.gpu,
            ShaderStage::Fragment,
            &self.settings.fragment_shader,
        )?;
        // the shader objects are deleted when they go out of scope
        ShaderProgram::new(&self.gpu, &[&vert, &frag])
    }

    fn upload_projection(&self) {
        if let (Some(resources), Some(projection)) = (&self.resources, &self.projection) {
            resources
                .program
                .set_uniform_at(PROJECTION_LOCATION, projection);
        }
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.resources.is_some()
    }

    #[cfg(test)]
    /// Last projection computed from a non-empty viewport.
    pub fn projection(&self) -> Option<&Mat4> {
        self.projection.as_ref()
    }

    #[cfg(test)]
    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    #[cfg(test)]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    #[cfg(test)]
    /// Frames drawn since load.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[cfg(test)]
    pub fn program(&self) -> Option<&ShaderProgram<G>> {
        self.resources.as_ref().map(|r| &r.program)
    }

    #[cfg(test)]
    pub fn mesh(&self) -> Option<&IndexedMesh<G>> {
        self.resources.as_ref().map(|r| &r.mesh)
    }
}

impl<G: Gpu> Lifecycle for RenderBootstrap<G> {
    fn on_load(&mut self) -> Result<(), Error> {
        self.gpu
            .set_clear_color(Vec4::from_array(self.settings.clear_color));
        self.gpu.enable_depth_test();

        let program = self.load_program()?;
        let mesh = IndexedMesh::new(&self.gpu, &TRIANGLE, &TRIANGLE_INDICES)?;

        log::info!(
            "loaded shader program {:?}, vertex buffer {:?} ({} bytes), index buffer {:?} ({} indices), vertex array {:?}",
            program.id(),
            mesh.vertex_buffer().id(),
            mesh.vertex_buffer().size(),
            mesh.index_buffer().id(),
            mesh.index_count(),
            mesh.vertex_array().id()
        );

        log::debug!(
            "camera rotation {}, matrix is identity: {}",
            self.camera.rotation(),
            *self.camera.matrix() == Mat4::IDENTITY
        );

        self.resources = Some(Resources { program, mesh });
        self.frames = 0;

        // a resize may have arrived before load
        self.upload_projection();
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.viewport = Some((width, height));
        self.gpu
            .viewport(width.min(i32::MAX as u32) as i32, height.min(i32::MAX as u32) as i32);

        match camera::projection(width, height) {
            Some(projection) => {
                log::debug!("viewport resized to {width}x{height}");
                self.projection = Some(projection);
                self.upload_projection();
            }
            None => log::debug!("viewport is empty ({width}x{height}), keeping projection"),
        }
    }

    fn on_render(&mut self, _elapsed: Duration) {
        let Some(resources) = &self.resources else {
            return;
        };

        self.gpu.clear();

        resources.program.use_program();
        resources
            .program
            .set_uniform_at(CAMERA_LOCATION, self.camera.matrix());

        resources.mesh.draw();
        self.frames += 1;
    }

    fn on_unload(&mut self) {
        if self.resources.take().is_some() {
            log::info!("released GPU resources after {} frames", self.frames);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use glam::Vec3;

    use super::*;
    use crate::{
        abs::recording::{Call, RecordingGpu},
        vertex::Vertex,
    };

    fn shader_settings() -> RenderSettings {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        RenderSettings {
            vertex_shader: root.join("shaders/cube.vert"),
            fragment_shader: root.join("shaders/cube.frag"),
            ..RenderSettings::default()
        }
    }

    fn loaded(gpu: &Arc<RecordingGpu>) -> RenderBootstrap<RecordingGpu> {
        let mut bootstrap = RenderBootstrap::new(Arc::clone(gpu), shader_settings());
        bootstrap.on_load().unwrap();
        bootstrap
    }

    fn projection_uploads(gpu: &RecordingGpu) -> Vec<Mat4> {
        gpu.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Uniform {
                    location: PROJECTION_LOCATION,
                    value,
                    ..
                } => Some(value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn load_creates_one_of_each_object() {
        let gpu = Arc::new(RecordingGpu::default());
        let bootstrap = loaded(&gpu);

        assert!(bootstrap.is_loaded());
        assert_eq!(gpu.count(|c| matches!(c, Call::CreateProgram(_))), 1);
        assert_eq!(gpu.count(|c| matches!(c, Call::CreateBuffer { .. })), 2);
        assert_eq!(gpu.count(|c| matches!(c, Call::CreateVertexArray { .. })), 1);

        let mesh = bootstrap.mesh().unwrap();
        let handles = [
            bootstrap.program().unwrap().id(),
            mesh.vertex_buffer().id(),
            mesh.index_buffer().id(),
            mesh.vertex_array().id(),
        ];
        for (i, a) in handles.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in &handles[i + 1..] {
                assert_ne!(a, b);
            }
        }

        // intermediate shader objects are gone, only program + 2 buffers + vao remain
        assert_eq!(gpu.count(|c| matches!(c, Call::DeleteShader(_))), 2);
        assert_eq!(gpu.live_objects(), 4);
    }

    #[test]
    fn load_sets_clear_colour_and_depth_test_first() {
        let gpu = Arc::new(RecordingGpu::default());
        let _bootstrap = loaded(&gpu);

        let calls = gpu.calls();
        assert_eq!(
            &calls[..2],
            &[
                Call::ClearColor(Vec4::new(127.0 / 255.0, 1.0, 212.0 / 255.0, 1.0)),
                Call::EnableDepthTest,
            ]
        );
    }

    #[test]
    fn load_uploads_the_triangle_and_its_indices() {
        let gpu = Arc::new(RecordingGpu::default());
        let bootstrap = loaded(&gpu);
        let mesh = bootstrap.mesh().unwrap();

        let uploads: Vec<(u32, Vec<u8>)> = gpu
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateBuffer { id, data } => Some((id, data)),
                _ => None,
            })
            .collect();

        assert_eq!(uploads[0].0, mesh.vertex_buffer().id());
        assert_eq!(uploads[0].1, bytemuck::cast_slice::<Vertex, u8>(&TRIANGLE));
        assert_eq!(uploads[1].0, mesh.index_buffer().id());
        assert_eq!(uploads[1].1, bytemuck::cast_slice::<u32, u8>(&[0, 2, 1]));

        assert!(gpu.calls().iter().any(|call| matches!(
            call,
            Call::CreateVertexArray { vertex_buffer, index_buffer, stride: 40, .. }
                if *vertex_buffer == mesh.vertex_buffer().id()
                    && *index_buffer == mesh.index_buffer().id()
        )));
    }

    #[test]
    fn invalid_shader_fails_load() {
        let gpu = Arc::new(RecordingGpu::failing_link());
        let mut bootstrap = RenderBootstrap::new(Arc::clone(&gpu), shader_settings());

        assert!(matches!(bootstrap.on_load(), Err(Error::ProgramLink { .. })));
        assert!(!bootstrap.is_loaded());
        assert_eq!(gpu.live_objects(), 0);
    }

    #[test]
    fn missing_shader_file_fails_load() {
        let gpu = Arc::new(RecordingGpu::default());
        let settings = RenderSettings {
            fragment_shader: PathBuf::from("no/such/cube.frag"),
            ..shader_settings()
        };
        let mut bootstrap = RenderBootstrap::new(Arc::clone(&gpu), settings);

        match bootstrap.on_load() {
            Err(Error::Io { path, .. }) => assert_eq!(path, PathBuf::from("no/such/cube.frag")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(()) => panic!("load succeeded without a fragment shader"),
        }
        assert_eq!(gpu.live_objects(), 0);
    }

    #[test]
    fn resize_sets_viewport_and_projection() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut bootstrap = loaded(&gpu);
        gpu.clear_calls();

        bootstrap.on_resize(800, 600);

        assert!(gpu.calls().contains(&Call::Viewport(800, 600)));
        let expected = camera::projection(800, 600).unwrap();
        assert_eq!(projection_uploads(&gpu), vec![expected]);
        assert_eq!(bootstrap.projection(), Some(&expected));
    }

    #[test]
    fn second_resize_overwrites_the_first() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut bootstrap = loaded(&gpu);
        gpu.clear_calls();

        bootstrap.on_resize(800, 600);
        bootstrap.on_resize(1920, 1080);

        let uploads = projection_uploads(&gpu);
        assert_eq!(uploads.len(), 2);
        assert_eq!(*uploads.last().unwrap(), camera::projection(1920, 1080).unwrap());
        assert_eq!(bootstrap.projection(), camera::projection(1920, 1080).as_ref());
        assert_eq!(bootstrap.viewport(), Some((1920, 1080)));
    }

    #[test]
    fn empty_resize_keeps_the_projection() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut bootstrap = loaded(&gpu);
        bootstrap.on_resize(800, 600);
        gpu.clear_calls();

        bootstrap.on_resize(0, 0);

        assert_eq!(gpu.calls(), vec![Call::Viewport(0, 0)]);
        assert_eq!(bootstrap.projection(), camera::projection(800, 600).as_ref());
    }

    #[test]
    fn resize_before_load_is_applied_at_load() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut bootstrap = RenderBootstrap::new(Arc::clone(&gpu), shader_settings());

        bootstrap.on_resize(640, 480);
        assert!(projection_uploads(&gpu).is_empty());

        bootstrap.on_load().unwrap();
        assert_eq!(
            projection_uploads(&gpu),
            vec![camera::projection(640, 480).unwrap()]
        );
    }

    #[test]
    fn render_draws_once_with_identity_camera() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut bootstrap = loaded(&gpu);
        bootstrap.on_resize(800, 600);
        gpu.clear_calls();

        bootstrap.on_render(Duration::from_millis(16));

        let program = bootstrap.program().unwrap().id();
        let vao = bootstrap.mesh().unwrap().vertex_array().id();
        assert_eq!(
            gpu.calls(),
            vec![
                Call::Clear,
                Call::UseProgram(Some(program)),
                Call::Uniform {
                    program,
                    location: CAMERA_LOCATION,
                    value: Mat4::IDENTITY,
                },
                Call::BindVertexArray(Some(vao)),
                Call::DrawIndexed(3),
                Call::BindVertexArray(None),
            ]
        );
        assert_eq!(bootstrap.frames(), 1);
    }

    #[test]
    fn triangle_lands_where_the_projection_puts_it() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut bootstrap = loaded(&gpu);
        bootstrap.on_resize(800, 600);

        let clip = *bootstrap.projection().unwrap() * *bootstrap.camera().matrix();
        let ndc: Vec<Vec3> = TRIANGLE
            .iter()
            .map(|v| clip.project_point3(Vec3::from_array(v.position)))
            .collect();

        // w = 2 for every vertex; x is scaled by 1 / aspect = 0.75
        assert!(ndc[0].abs_diff_eq(Vec3::new(0.0, 0.5, ndc[0].z), 1e-6));
        assert!(ndc[1].abs_diff_eq(Vec3::new(-0.375, 0.0, ndc[1].z), 1e-6));
        assert!(ndc[2].abs_diff_eq(Vec3::new(0.375, 0.0, ndc[2].z), 1e-6));
        for p in &ndc {
            assert!(p.z > -1.0 && p.z < 1.0);
        }
    }

    #[test]
    fn render_before_load_does_nothing() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut bootstrap = RenderBootstrap::new(Arc::clone(&gpu), shader_settings());

        bootstrap.on_render(Duration::ZERO);
        assert!(gpu.calls().is_empty());
        assert_eq!(bootstrap.frames(), 0);
    }

    #[test]
    fn full_lifecycle_releases_everything() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut bootstrap = RenderBootstrap::new(Arc::clone(&gpu), shader_settings());

        bootstrap.on_load().unwrap();
        bootstrap.on_resize(800, 600);
        for _ in 0..3 {
            bootstrap.on_render(Duration::from_millis(16));
        }
        assert_eq!(gpu.count(|c| matches!(c, Call::DrawIndexed(_))), 3);

        bootstrap.on_unload();

        assert!(!bootstrap.is_loaded());
        assert_eq!(gpu.live_objects(), 0);
        assert_eq!(gpu.count(|c| matches!(c, Call::DeleteProgram(_))), 1);
        assert_eq!(gpu.count(|c| matches!(c, Call::DeleteBuffer(_))), 2);
        assert_eq!(gpu.count(|c| matches!(c, Call::DeleteVertexArray(_))), 1);

        // a second unload has nothing left to release
        gpu.clear_calls();
        bootstrap.on_unload();
        assert!(gpu.calls().is_empty());
    }
}
