//! GPU side of the map: resource wrappers over a [`gl::GlApi`], the shader
//! programs, the render passes and the scheduler deciding when to run them.

use crate::config::RenderConfig;
use crate::error::Result;
use crate::scene::{SceneIndex, Sun, ViewState};

pub mod buffer;
pub mod context;
pub mod diagnostics;
pub mod frame_control;
pub mod framebuffer;
pub mod gl;
pub mod passes;
pub mod picking;
pub mod shader;
pub mod shaders;
pub mod texture;

pub use context::{Capabilities, Context};
pub use frame_control::{FrameControl, FrameRequester};
pub use picking::{Picking, PickingRegistry};

use gl::Capability;
use passes::{Buildings, DepthFogNormalMap, MapShadows};

const BACKGROUND_COLOR: [f32; 3] = [0.75, 0.78, 0.82];

/// The passes that need sampled depth textures. Absent in degraded mode.
struct Effects {
    fog_normal: DepthFogNormalMap,
    sun_depth: DepthFogNormalMap,
    map_shadows: MapShadows,
    shadow_map_size: i32,
    shadow_strength: f32,
}

pub struct Renderer {
    context: Context,
    frame_control: FrameControl,
    buildings: Buildings,
    effects: Option<Effects>,
}

impl Renderer {
    pub fn new(context: &Context, config: &RenderConfig) -> Result<Renderer> {
        let gl = context.gl();
        gl.cull_back_faces();
        gl.set_capability(Capability::CullFace, true);
        gl.set_capability(Capability::DepthTest, true);

        let mut buildings = Buildings::new(context, config.wall_texture.as_deref())?;
        buildings.show_backfaces = config.show_backfaces;

        let effects = if config.wants_shadows(context.capabilities().depth_texture) {
            Some(Effects {
                fog_normal: DepthFogNormalMap::new(context)?,
                sun_depth: DepthFogNormalMap::new(context)?,
                map_shadows: MapShadows::new(context)?,
                shadow_map_size: config.shadow_map_size as i32,
                shadow_strength: config.shadow_strength,
            })
        } else {
            log::info!("rendering without shadows or fog/normal maps");
            None
        };

        let mut frame_control = FrameControl::new();
        if config.frame_control {
            frame_control.enable();
        }

        Ok(Renderer {
            context: context.clone(),
            frame_control,
            buildings,
            effects,
        })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn frame_control(&mut self) -> &mut FrameControl {
        &mut self.frame_control
    }

    pub fn buildings(&mut self) -> &mut Buildings {
        &mut self.buildings
    }

    /// The camera's fog/normal/depth target from the last drawn frame, for
    /// screen-space effects. `None` in degraded mode.
    pub fn fog_normal_map(&self) -> Option<&DepthFogNormalMap> {
        self.effects.as_ref().map(|effects| &effects.fog_normal)
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        log::debug!("viewport resized to {width}x{height}");
        self.context.gl().viewport(0, 0, width, height);
        self.frame_control.request_frame();
    }

    /// Draws a frame if one is due. Returns whether anything was drawn, so the
    /// host knows whether to swap buffers.
    pub fn render(&mut self, scene: &SceneIndex, view: &ViewState, sun: &Sun) -> bool {
        if !self.frame_control.poll() {
            return false;
        }

        let items = scene.snapshot();
        let (width, height) = view.viewport;

        if let Some(effects) = &mut self.effects {
            let size = (width.max(1), height.max(1));
            effects
                .fog_normal
                .render(&items, view, view.view_matrix, view.proj_matrix, size);
            let shadow_size = (effects.shadow_map_size, effects.shadow_map_size);
            effects
                .sun_depth
                .render(&items, view, sun.view_matrix, sun.proj_matrix, shadow_size);
        }

        let gl = self.context.gl();
        gl.viewport(0, 0, width, height);
        let [r, g, b] = BACKGROUND_COLOR;
        gl.clear_color(r, g, b, 1.0);
        gl.clear_color_and_depth();

        let shadow_map = self.effects.as_ref().map(|effects| effects.sun_depth.framebuffer());
        self.buildings.render(&items, view, sun, shadow_map);

        if let Some(effects) = &self.effects {
            effects.map_shadows.render(
                view,
                sun,
                effects.sun_depth.framebuffer(),
                effects.shadow_strength,
            );
        }

        true
    }
}
