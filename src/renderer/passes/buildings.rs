use std::path::Path;
use std::rc::Rc;

use glam::{Mat3, Vec3};

use crate::error::Result;
use crate::renderer::context::Context;
use crate::renderer::framebuffer::Framebuffer;
use crate::renderer::gl::{Capability, Uniform, UniformMatrix};
use crate::renderer::shader::Shader;
use crate::renderer::shaders;
use crate::renderer::texture::Texture;
use crate::scene::{self, Renderable, Sun, ViewState};

use super::bind_optional;

const LIGHT_COLOR: Vec3 = Vec3::new(0.5, 0.5, 0.5);
const WALL_TEXTURE_UNIT: u32 = 0;
const SHADOW_TEXTURE_UNIT: u32 = 1;

/// The visible color pass. Uses the shadow-receiving shader when given the
/// sun's depth map, and the plain one otherwise.
pub struct Buildings {
    context: Context,
    shader_no_shadows: Shader,
    shader_shadows: Shader,
    wall_texture: Texture,
    highlight_id: Vec3,
    pub show_backfaces: bool,
}

impl Buildings {
    pub fn new(context: &Context, wall_texture: Option<&Path>) -> Result<Buildings> {
        let wall_texture = match wall_texture {
            Some(path) => Texture::load(context, path).unwrap_or_else(|err| {
                log::warn!("using plain walls, {}: {err}", path.display());
                Texture::solid_color(context, [1.0, 1.0, 1.0])
            }),
            None => Texture::solid_color(context, [1.0, 1.0, 1.0]),
        };
        Ok(Buildings {
            context: context.clone(),
            shader_no_shadows: Shader::new(context, &shaders::BUILDINGS)?,
            shader_shadows: Shader::new(context, &shaders::BUILDINGS_SHADOWS)?,
            wall_texture,
            highlight_id: Vec3::ZERO,
            show_backfaces: false,
        })
    }

    /// Highlights the object with this identity color, or nothing with `None`.
    pub fn set_highlight(&mut self, id_color: Option<[f32; 3]>) {
        self.highlight_id = id_color.map_or(Vec3::ZERO, Vec3::from);
    }

    pub fn render(
        &self,
        items: &[Rc<dyn Renderable>],
        view: &ViewState,
        sun: &Sun,
        shadow_map: Option<&Framebuffer>,
    ) {
        let gl = self.context.gl();
        let shadow_depth = shadow_map.and_then(|fb| fb.depth_texture().map(|tex| (fb, tex)));
        let shader = if shadow_depth.is_some() {
            &self.shader_shadows
        } else {
            &self.shader_no_shadows
        };
        shader.enable();

        if self.show_backfaces {
            gl.set_capability(Capability::CullFace, false);
        }

        shader.set_uniforms(&[
            ("uFogDistance", Uniform::Float(view.fog_distance)),
            ("uFogBlurDistance", Uniform::Float(view.fog_blur_distance)),
            ("uHighlightColor", Uniform::Vec3(view.highlight_color)),
            ("uHighlightID", Uniform::Vec3(self.highlight_id)),
            ("uLightColor", Uniform::Vec3(LIGHT_COLOR)),
            ("uLightDirection", Uniform::Vec3(sun.direction)),
            ("uLowerEdgePoint", Uniform::Vec2(view.lower_left_on_map)),
            ("uTime", Uniform::Float(view.time)),
            ("uViewDirOnMap", Uniform::Vec2(view.view_dir_on_map)),
        ]);

        shader.bind_texture("uWallTexIndex", WALL_TEXTURE_UNIT, &self.wall_texture);

        match shadow_depth {
            Some((framebuffer, depth)) => {
                let dimensions = glam::Vec2::new(framebuffer.width() as f32, framebuffer.height() as f32);
                shader.set_uniform("uShadowTexDimensions", Uniform::Vec2(dimensions));
                shader.bind_texture("uShadowTexIndex", SHADOW_TEXTURE_UNIT, depth);
            }
            None => {
                shader.set_uniform_matrix("uNormalTransform", UniformMatrix::Mat3(Mat3::IDENTITY));
            }
        }

        let view_proj = view.view_proj();
        let sun_view_proj = sun.view_proj();
        for (item, model) in scene::visible(items, view.zoom) {
            shader.set_uniform_matrices(&[
                ("uModelMatrix", UniformMatrix::Mat4(model)),
                ("uMatrix", UniformMatrix::Mat4(view_proj * model)),
            ]);
            if shadow_depth.is_some() {
                shader.set_uniform_matrix("uSunMatrix", UniformMatrix::Mat4(sun_view_proj * model));
            }

            let buffers = item.buffers();
            shader.bind_buffer(&buffers.positions, "aPosition");
            bind_optional(shader, buffers.tex_coords.as_ref(), "aTexCoord");
            bind_optional(shader, buffers.normals.as_ref(), "aNormal");
            bind_optional(shader, buffers.colors.as_ref(), "aColor");
            bind_optional(shader, buffers.filters.as_ref(), "aFilter");
            bind_optional(shader, buffers.ids.as_ref(), "aID");

            gl.draw_triangles(0, buffers.positions.num_items());
        }

        if self.show_backfaces {
            gl.set_capability(Capability::CullFace, true);
        }

        shader.disable();
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec2};

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
        data.add_extruded_rect(Vec2::ZERO, Vec2::new(10.0, 10.0), 20.0, Vec3::ONE, [0.0; 3]);
        let mesh = Mesh::new(context, &data, 14.0, 20.0).unwrap();
        mesh.set_matrix(matrix);
        Rc::new(mesh)
    }

    #[test]
    fn items_without_a_transform_are_skipped() {
        let (gl, context) = setup();
        let buildings = Buildings::new(&context, None).unwrap();
        let items = vec![
            building(&context, Some(Mat4::IDENTITY)),
            building(&context, None),
            building(&context, Some(Mat4::from_translation(Vec3::X))),
        ];
        gl.clear_calls();
        buildings.render(&items, &ViewState::default(), &Sun::default(), None);
        assert_eq!(gl.draw_count(), 2);
        assert_eq!(
            gl.count(|c| *c == Call::DrawTriangles { count: 30 }),
            2
        );
    }

    #[test]
    fn zoom_range_filters_items() {
        let (gl, context) = setup();
        let buildings = Buildings::new(&context, None).unwrap();
        let items = vec![building(&context, Some(Mat4::IDENTITY))];
        let view = ViewState {
            zoom: 12.0,
            ..ViewState::default()
        };
        gl.clear_calls();
        buildings.render(&items, &view, &Sun::default(), None);
        assert_eq!(gl.draw_count(), 0);
    }

    #[test]
    fn shadow_map_selects_the_shadow_shader() {
        let (gl, context) = setup();
        let buildings = Buildings::new(&context, None).unwrap();
        let shadow_map = Framebuffer::new(&context, 256, 256, true);
        let items = vec![building(&context, Some(Mat4::IDENTITY))];
        gl.clear_calls();
        buildings.render(&items, &ViewState::default(), &Sun::default(), Some(&shadow_map));
        let depth = shadow_map.depth_texture().unwrap().handle();
        let calls = gl.calls();
        assert!(calls.contains(&Call::ActiveTexture(SHADOW_TEXTURE_UNIT)));
        assert!(calls.contains(&Call::BindTexture(depth)));
        // No warnings: every uniform used exists in the shadow variant.
        assert_eq!(context.diagnostics().warning_count(), 0);
    }

    #[test]
    fn backfaces_toggle_culling_around_the_pass() {
        let (gl, context) = setup();
        let mut buildings = Buildings::new(&context, None).unwrap();
        buildings.show_backfaces = true;
        gl.clear_calls();
        buildings.render(&[], &ViewState::default(), &Sun::default(), None);
        let toggles: Vec<_> = gl
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Capability(Capability::CullFace, _)))
            .collect();
        assert_eq!(
            toggles,
            vec![
                Call::Capability(Capability::CullFace, false),
                Call::Capability(Capability::CullFace, true)
            ]
        );
    }

    #[test]
    fn unreadable_wall_texture_falls_back_to_white() {
        let (_gl, context) = setup();
        let buildings = Buildings::new(&context, Some(Path::new("/nonexistent/wall.png"))).unwrap();
        assert_eq!(buildings.wall_texture.width(), 1);
    }
}
