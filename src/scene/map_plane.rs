use std::cell::Cell;

use glam::Mat4;

use crate::error::Result;
use crate::renderer::buffer::VertexBuffer;
use crate::renderer::context::Context;

use super::mesh::ALWAYS_VISIBLE;
use super::{ItemBuffers, Renderable, ViewState};

/// A flat square of ground that follows the map center, so screen-space
/// effects and shadows have something to land on between buildings.
pub struct MapPlane {
    buffers: ItemBuffers,
    matrix: Cell<Option<Mat4>>,
}

impl MapPlane {
    pub fn new(context: &Context, size: f32) -> Result<MapPlane> {
        let h = size / 2.0;
        let corners = [[-h, -h, 0.0], [h, -h, 0.0], [h, h, 0.0], [-h, h, 0.0]];
        let positions: Vec<f32> = [0, 1, 2, 0, 2, 3]
            .iter()
            .flat_map(|&i| corners[i])
            .collect();
        let normals: Vec<f32> = [0.0, 0.0, 1.0].repeat(6);
        let filters: Vec<f32> = ALWAYS_VISIBLE.repeat(6);
        Ok(MapPlane {
            buffers: ItemBuffers {
                positions: VertexBuffer::new(context, 3, &positions)?,
                normals: Some(VertexBuffer::new(context, 3, &normals)?),
                tex_coords: None,
                colors: None,
                filters: Some(VertexBuffer::new(context, 4, &filters)?),
                ids: None,
            },
            matrix: Cell::new(None),
        })
    }

    /// Moves the plane under the current map center.
    pub fn update(&self, view: &ViewState) {
        let translation = Mat4::from_translation(view.map_center.extend(0.0));
        self.matrix.set(Some(translation));
    }
}

impl Renderable for MapPlane {
    fn matrix(&self) -> Option<Mat4> {
        self.matrix.get()
    }

    fn min_zoom(&self) -> f32 {
        0.0
    }

    fn max_zoom(&self) -> f32 {
        f32::MAX
    }

    fn buffers(&self) -> &ItemBuffers {
        &self.buffers
    }
}
