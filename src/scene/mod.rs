//! The renderer's view of the scene: an ordered list of items that know their
//! transform and own their vertex buffers.

use std::rc::Rc;

use glam::Mat4;

use crate::renderer::buffer::VertexBuffer;

mod map_plane;
mod mesh;
mod view;

pub use map_plane::MapPlane;
pub use mesh::{Mesh, MeshData, ALWAYS_VISIBLE};
pub use view::{Sun, ViewState};

/// Per-vertex buffers of a renderable item. Only positions are required;
/// passes skip the attributes an item doesn't have.
pub struct ItemBuffers {
    pub positions: VertexBuffer,
    pub normals: Option<VertexBuffer>,
    pub tex_coords: Option<VertexBuffer>,
    pub colors: Option<VertexBuffer>,
    /// Opacity-over-time windows, see `renderer::shaders`.
    pub filters: Option<VertexBuffer>,
    /// Identity colors for picking.
    pub ids: Option<VertexBuffer>,
}

pub trait Renderable {
    /// The model transform, or `None` while the item can't be placed yet (e.g.
    /// still loading). Such items are skipped for the frame.
    fn matrix(&self) -> Option<Mat4>;
    fn min_zoom(&self) -> f32;
    fn max_zoom(&self) -> f32;
    fn buffers(&self) -> &ItemBuffers;
}

/// Returns the item's transform if it should be drawn at `zoom`.
pub fn visible_matrix(item: &dyn Renderable, zoom: f32) -> Option<Mat4> {
    if zoom < item.min_zoom() || zoom > item.max_zoom() {
        return None;
    }
    item.matrix()
}

/// The items drawable at `zoom`, in draw order, with their transforms.
pub fn visible(
    items: &[Rc<dyn Renderable>],
    zoom: f32,
) -> impl Iterator<Item = (&dyn Renderable, Mat4)> + '_ {
    items.iter().filter_map(move |item| {
        let item = item.as_ref();
        visible_matrix(item, zoom).map(|matrix| (item, matrix))
    })
}

/// Ordered collection of everything that gets drawn. Insertion order is draw
/// order.
#[derive(Default)]
pub struct SceneIndex {
    items: Vec<Rc<dyn Renderable>>,
}

impl SceneIndex {
    pub fn new() -> SceneIndex {
        SceneIndex::default()
    }

    pub fn add(&mut self, item: Rc<dyn Renderable>) {
        self.items.push(item);
    }

    /// Removes `item` (compared by identity). Returns whether it was present.
    pub fn remove(&mut self, item: &Rc<dyn Renderable>) -> bool {
        let before = self.items.len();
        self.items.retain(|existing| !Rc::ptr_eq(existing, item));
        self.items.len() != before
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// A copy of the current item list. A pass iterates its snapshot, so
    /// loaders adding or removing items mid-frame affect the next frame only.
    pub fn snapshot(&self) -> Vec<Rc<dyn Renderable>> {
        self.items.clone()
    }
}
