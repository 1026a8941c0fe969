//! Object picking by color: every object is drawn in a flat color encoding
//! its registry index, and the pixel under the pointer is decoded back.
//!
//! Index `k` is packed little-endian into the color channels: red holds the
//! low byte, green the middle byte, blue the high byte. Index 0 (black, the
//! clear color) means "nothing here".

use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::error::Result;
use crate::scene::{self, Renderable, ViewState};

use super::context::Context;
use super::framebuffer::Framebuffer;
use super::gl::{Uniform, UniformMatrix};
use super::shader::Shader;
use super::shaders;

/// Largest index that fits in three 8-bit channels.
pub const MAX_INDEX: u32 = 0xff_ff_ff;

pub fn index_to_color(index: u32) -> [f32; 3] {
    [
        (index & 0xff) as f32 / 255.0,
        ((index >> 8) & 0xff) as f32 / 255.0,
        ((index >> 16) & 0xff) as f32 / 255.0,
    ]
}

/// Decodes a read-back pixel. Alpha is ignored.
pub fn color_to_index(pixel: [u8; 4]) -> u32 {
    pixel[0] as u32 | (pixel[1] as u32) << 8 | (pixel[2] as u32) << 16
}

/// Append-only mapping between object identities and dense indices,
/// starting at 1.
#[derive(Debug, Clone)]
pub struct PickingRegistry<T> {
    ids: Vec<T>,
    indices: HashMap<T, u32>,
}

impl<T: Eq + Hash + Clone> PickingRegistry<T> {
    pub fn new() -> PickingRegistry<T> {
        PickingRegistry {
            ids: Vec::new(),
            indices: HashMap::new(),
        }
    }

    /// The index of `id`, assigning the next free one on first sight.
    pub fn index_of(&mut self, id: &T) -> u32 {
        if let Some(&index) = self.indices.get(id) {
            return index;
        }
        let index = self.ids.len() as u32 + 1;
        if index > MAX_INDEX {
            log::warn!("picking registry is full, new objects will not be pickable");
            return 0;
        }
        self.ids.push(id.clone());
        self.indices.insert(id.clone(), index);
        index
    }

    /// The identity color for `id`, with components in 0..=1.
    pub fn id_to_color(&mut self, id: &T) -> [f32; 3] {
        index_to_color(self.index_of(id))
    }

    pub fn resolve(&self, index: u32) -> Option<&T> {
        let position = index.checked_sub(1)?;
        self.ids.get(position as usize)
    }

    /// Number of registered identities (not counting the reserved index 0).
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<T: Eq + Hash + Clone> Default for PickingRegistry<T> {
    fn default() -> Self {
        PickingRegistry::new()
    }
}

struct PendingPick<T> {
    x: f32,
    y: f32,
    reply: Sender<Option<T>>,
}

/// Renders the picking pass and answers "what is under this pixel".
pub struct Picking<T> {
    context: Context,
    shader: Shader,
    framebuffer: Framebuffer,
    size: i32,
    registry: PickingRegistry<T>,
    pending: Vec<PendingPick<T>>,
}

impl<T: Eq + Hash + Clone> Picking<T> {
    /// `size` is the edge length of the square off-screen target, which is
    /// independent of the screen resolution.
    pub fn new(context: &Context, size: i32) -> Result<Picking<T>> {
        Ok(Picking {
            context: context.clone(),
            shader: Shader::new(context, &shaders::PICKING)?,
            framebuffer: Framebuffer::new(context, size, size, false),
            size,
            registry: PickingRegistry::new(),
            pending: Vec::new(),
        })
    }

    pub fn id_to_color(&mut self, id: &T) -> [f32; 3] {
        self.registry.id_to_color(id)
    }

    pub fn registry(&self) -> &PickingRegistry<T> {
        &self.registry
    }

    /// Draws every visible item in its identity color into the picking target.
    pub fn render(&mut self, items: &[Rc<dyn Renderable>], view: &ViewState) {
        let gl = self.context.gl();
        let shader = &self.shader;

        self.framebuffer.set_size(self.size, self.size);
        shader.enable();
        self.framebuffer.enable();
        gl.viewport(0, 0, self.size, self.size);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.clear_color_and_depth();

        shader.set_uniforms(&[
            ("uViewDirOnMap", Uniform::Vec2(view.view_dir_on_map)),
            ("uLowerEdgePoint", Uniform::Vec2(view.lower_left_on_map)),
            ("uFogDistance", Uniform::Float(view.fog_distance)),
            ("uFogBlurDistance", Uniform::Float(view.fog_blur_distance)),
            ("uTime", Uniform::Float(view.time)),
        ]);

        let view_proj = view.view_proj();
        for (item, model) in scene::visible(items, view.zoom) {
            let buffers = item.buffers();
            let (Some(ids), Some(filters)) = (&buffers.ids, &buffers.filters) else {
                continue;
            };
            shader.set_uniform_matrices(&[
                ("uModelMatrix", UniformMatrix::Mat4(model)),
                ("uMatrix", UniformMatrix::Mat4(view_proj * model)),
            ]);
            shader.bind_buffer(&buffers.positions, "aPosition");
            shader.bind_buffer(ids, "aID");
            shader.bind_buffer(filters, "aFilter");
            gl.draw_triangles(0, buffers.positions.num_items());
        }

        shader.disable();
        self.framebuffer.disable();
        gl.viewport(0, 0, view.viewport.0, view.viewport.1);
    }

    /// Asks for the object under screen position `(x, y)` (origin top left).
    /// The answer arrives on the returned channel once the host calls
    /// [`Picking::process_pending`], at the next frame boundary.
    pub fn get_target(&mut self, x: f32, y: f32) -> Receiver<Option<T>> {
        let (reply, receiver) = mpsc::channel();
        self.pending.push(PendingPick { x, y, reply });
        receiver
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Answers every queued [`Picking::get_target`] request, rendering the
    /// picking pass once for all of them.
    pub fn process_pending(&mut self, items: &[Rc<dyn Renderable>], view: &ViewState) {
        if self.pending.is_empty() {
            return;
        }
        self.render(items, view);
        for pick in std::mem::take(&mut self.pending) {
            let target = self.read_target(pick.x, pick.y, view.viewport);
            // The requester may have stopped waiting, which is fine.
            let _ = pick.reply.send(target);
        }
    }

    fn read_target(&mut self, x: f32, y: f32, viewport: (i32, i32)) -> Option<T> {
        let (x, y) = to_target_coords(x, y, viewport, self.size)?;
        let pixel = self.framebuffer.get_pixel(x, self.size - 1 - y)?;
        let index = color_to_index(pixel);
        self.registry.resolve(index).cloned()
    }
}

/// Scales a screen position into the square picking target, flooring to
/// whole pixels. `None` for degenerate viewports.
fn to_target_coords(x: f32, y: f32, viewport: (i32, i32), size: i32) -> Option<(i32, i32)> {
    let (width, height) = viewport;
    if width <= 0 || height <= 0 {
        return None;
    }
    let x = (x / width as f32 * size as f32).floor();
    let y = (y / height as f32 * size as f32).floor();
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some((x as i32, y as i32))
}
