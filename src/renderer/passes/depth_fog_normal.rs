use std::rc::Rc;

use glam::{Mat3, Mat4};

use crate::error::Result;
use crate::renderer::context::Context;
use crate::renderer::framebuffer::Framebuffer;
use crate::renderer::gl::{Uniform, UniformMatrix};
use crate::renderer::shader::Shader;
use crate::renderer::shaders;
use crate::renderer::texture::Texture;
use crate::scene::{self, MapPlane, Renderable, ViewState};

use super::bind_optional;

const INITIAL_SIZE: i32 = 128;
const MAP_PLANE_SIZE: f32 = 5000.0;

/// Renders scene depth into a sampled depth texture, and view-space normals
/// packed with fog intensity into the color texture.
///
/// The same pass doubles as the sun's shadow map: pass the sun's matrices and
/// the shadow map size instead of the camera's.
pub struct DepthFogNormalMap {
    context: Context,
    shader: Shader,
    framebuffer: Framebuffer,
    map_plane: MapPlane,
}

impl DepthFogNormalMap {
    pub fn new(context: &Context) -> Result<DepthFogNormalMap> {
        Ok(DepthFogNormalMap {
            context: context.clone(),
            shader: Shader::new(context, &shaders::FOG_NORMAL)?,
            framebuffer: Framebuffer::new(context, INITIAL_SIZE, INITIAL_SIZE, true),
            map_plane: MapPlane::new(context, MAP_PLANE_SIZE)?,
        })
    }

    pub fn render(
        &mut self,
        items: &[Rc<dyn Renderable>],
        view: &ViewState,
        view_matrix: Mat4,
        proj_matrix: Mat4,
        size: (i32, i32),
    ) {
        let gl = self.context.gl();
        let shader = &self.shader;

        shader.enable();
        self.framebuffer.set_size(size.0, size.1);
        self.framebuffer.enable();
        gl.viewport(0, 0, size.0, size.1);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.clear_color_and_depth();

        shader.set_uniforms(&[
            ("uViewDirOnMap", Uniform::Vec2(view.view_dir_on_map)),
            ("uLowerEdgePoint", Uniform::Vec2(view.lower_left_on_map)),
            ("uFogDistance", Uniform::Float(view.fog_distance)),
            ("uFogBlurDistance", Uniform::Float(view.fog_blur_distance)),
            ("uTime", Uniform::Float(view.time)),
        ]);

        self.map_plane.update(view);
        let view_proj = proj_matrix * view_matrix;
        let draw = |item: &dyn Renderable, model: Mat4| {
            shader.set_uniform_matrices(&[
                ("uMatrix", UniformMatrix::Mat4(view_proj * model)),
                ("uModelMatrix", UniformMatrix::Mat4(model)),
                ("uNormalMatrix", UniformMatrix::Mat3(normal_matrix(view_matrix * model))),
            ]);

            let buffers = item.buffers();
            shader.bind_buffer(&buffers.positions, "aPosition");
            bind_optional(shader, buffers.normals.as_ref(), "aNormal");
            bind_optional(shader, buffers.filters.as_ref(), "aFilter");

            gl.draw_triangles(0, buffers.positions.num_items());
        };

        for (item, model) in scene::visible(items, view.zoom) {
            draw(item, model);
        }
        let plane: &dyn Renderable = &self.map_plane;
        if let Some(model) = scene::visible_matrix(plane, view.zoom) {
            draw(plane, model);
        }

        shader.disable();
        self.framebuffer.disable();
        gl.viewport(0, 0, view.viewport.0, view.viewport.1);
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// `None` only if the target was built without depth texture support.
    pub fn depth_texture(&self) -> Option<&Texture> {
        self.framebuffer.depth_texture()
    }

    pub fn fog_normal_texture(&self) -> &Texture {
        self.framebuffer.render_texture()
    }
}

/// Inverse transpose of the model-view rotation part.
fn normal_matrix(model_view: Mat4) -> Mat3 {
    let rotation = Mat3::from_mat4(model_view);
    if rotation.determinant() == 0.0 {
        log::trace!("model-view matrix is not invertible, using identity for normals");
        return Mat3::IDENTITY;
    }
    rotation.inverse().transpose()
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::renderer::gl::recording::{Call, RecordingGl};
    use crate::scene::{Mesh, MeshData};

    fn setup() -> (Rc<RecordingGl>, Context) {
        let gl = Rc::new(RecordingGl::new());
        let context = Context::new(gl.clone(), true);
        (gl, context)
    }

    fn building(context: &Context, matrix: Option<Mat4>) -> Rc<dyn Renderable> {
        let mut data = MeshData::default();
        data.add_extruded_rect(Vec2::ZERO, Vec2::ONE, 5.0, Vec3::ONE, [0.0; 3]);
        let mesh = Mesh::new(context, &data, 0.0, 20.0).unwrap();
        mesh.set_matrix(matrix);
        Rc::new(mesh)
    }

    #[test]
    fn draws_items_and_the_map_plane() {
        let (gl, context) = setup();
        let mut pass = DepthFogNormalMap::new(&context).unwrap();
        let items = vec![building(&context, Some(Mat4::IDENTITY)), building(&context, None)];
        let view = ViewState {
            viewport: (800, 600),
            ..ViewState::default()
        };
        gl.clear_calls();
        pass.render(&items, &view, Mat4::IDENTITY, Mat4::IDENTITY, (400, 300));

        assert_eq!(
            gl.count(|c| *c == Call::DrawTriangles { count: 30 }),
            1
        );
        assert_eq!(gl.count(|c| *c == Call::DrawTriangles { count: 6 }), 1);
        let calls = gl.calls();
        assert!(calls.contains(&Call::Viewport { width: 400, height: 300 }));
        assert_eq!(calls.last(), Some(&Call::Viewport { width: 800, height: 600 }));
        assert_eq!((pass.framebuffer().width(), pass.framebuffer().height()), (400, 300));
        assert!(pass.depth_texture().is_some());
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let scale = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let normals = normal_matrix(scale);
        assert_eq!(normals * Vec3::X, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn degenerate_transforms_fall_back_to_identity() {
        let flat = Mat4::from_scale(Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(normal_matrix(flat), Mat3::IDENTITY);
    }
}
