use glam::Vec2;

use crate::error::Result;
use crate::renderer::context::Context;
use crate::renderer::framebuffer::Framebuffer;
use crate::renderer::gl::{Capability, Uniform, UniformMatrix};
use crate::renderer::shader::Shader;
use crate::renderer::shaders;
use crate::scene::{self, MapPlane, Renderable, Sun, ViewState};

use super::bind_optional;

const MAP_PLANE_SIZE: f32 = 5000.0;
const SHADOW_TEXTURE_UNIT: u32 = 0;

/// Darkens the ground where the sun's depth map says it is occluded, blended
/// over whatever the map underneath already drew.
pub struct MapShadows {
    context: Context,
    shader: Shader,
    map_plane: MapPlane,
}

impl MapShadows {
    pub fn new(context: &Context) -> Result<MapShadows> {
        Ok(MapShadows {
            context: context.clone(),
            shader: Shader::new(context, &shaders::MAP_SHADOWS)?,
            map_plane: MapPlane::new(context, MAP_PLANE_SIZE)?,
        })
    }

    /// `shadow_map` is the sun's depth pass; without a depth texture there is
    /// nothing to sample and the overlay is skipped.
    pub fn render(&self, view: &ViewState, sun: &Sun, shadow_map: &Framebuffer, strength: f32) {
        let Some(depth) = shadow_map.depth_texture() else {
            return;
        };
        self.map_plane.update(view);
        let Some(model) = scene::visible_matrix(&self.map_plane, view.zoom) else {
            return;
        };

        let gl = self.context.gl();
        let shader = &self.shader;
        shader.enable();
        gl.set_capability(Capability::Blend, true);
        gl.blend_alpha();

        shader.set_uniforms(&[
            ("uDirToSun", Uniform::Vec3(sun.direction)),
            ("uViewDirOnMap", Uniform::Vec2(view.view_dir_on_map)),
            ("uLowerEdgePoint", Uniform::Vec2(view.lower_left_on_map)),
            ("uFogDistance", Uniform::Float(view.fog_distance)),
            ("uFogBlurDistance", Uniform::Float(view.fog_blur_distance)),
            (
                "uShadowTexDimensions",
                Uniform::Vec2(Vec2::new(shadow_map.width() as f32, shadow_map.height() as f32)),
            ),
            ("uShadowStrength", Uniform::Float(strength)),
        ]);
        shader.bind_texture("uShadowTexIndex", SHADOW_TEXTURE_UNIT, depth);

        shader.set_uniform_matrices(&[
            ("uModelMatrix", UniformMatrix::Mat4(model)),
            ("uMatrix", UniformMatrix::Mat4(view.view_proj() * model)),
            ("uSunMatrix", UniformMatrix::Mat4(sun.view_proj() * model)),
        ]);

        let buffers = self.map_plane.buffers();
        shader.bind_buffer(&buffers.positions, "aPosition");
        bind_optional(shader, buffers.normals.as_ref(), "aNormal");
        gl.draw_triangles(0, buffers.positions.num_items());

        gl.set_capability(Capability::Blend, false);
        shader.disable();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::renderer::gl::recording::{Call, RecordingGl};

    fn setup() -> (Rc<RecordingGl>, Context) {
        let gl = Rc::new(RecordingGl::new());
        let context = Context::new(gl.clone(), true);
        (gl, context)
    }

    #[test]
    fn blends_the_plane_once() {
        let (gl, context) = setup();
        let pass = MapShadows::new(&context).unwrap();
        let shadow_map = Framebuffer::new(&context, 64, 64, true);
        gl.clear_calls();
        pass.render(&ViewState::default(), &Sun::default(), &shadow_map, 0.75);

        assert_eq!(gl.count(|c| *c == Call::DrawTriangles { count: 6 }), 1);
        let blend: Vec<_> = gl
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Capability(Capability::Blend, _)))
            .collect();
        assert_eq!(
            blend,
            vec![
                Call::Capability(Capability::Blend, true),
                Call::Capability(Capability::Blend, false)
            ]
        );
        assert_eq!(context.diagnostics().warning_count(), 0);
    }

    #[test]
    fn needs_a_depth_texture() {
        let (gl, context) = setup();
        let pass = MapShadows::new(&context).unwrap();
        let plain = Framebuffer::new(&context, 64, 64, false);
        gl.clear_calls();
        pass.render(&ViewState::default(), &Sun::default(), &plain, 0.75);
        assert_eq!(gl.draw_count(), 0);
    }
}
