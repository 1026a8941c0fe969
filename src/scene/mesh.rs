use std::cell::Cell;

use glam::{Mat4, Vec2, Vec3};

use crate::error::Result;
use crate::renderer::buffer::VertexBuffer;
use crate::renderer::context::Context;

use super::{ItemBuffers, Renderable};

/// Filter window for geometry that is visible right away.
pub const ALWAYS_VISIBLE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

/// World units covered by one repetition of the wall texture.
const WALL_TILE_SIZE: f32 = 10.0;

/// Triangle-list vertex data for a [`Mesh`], one entry per vertex in every
/// array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub colors: Vec<[f32; 3]>,
    pub filters: Vec<[f32; 4]>,
    pub ids: Vec<[f32; 3]>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, tex_coord: Vec2, color: Vec3, id: [f32; 3]) {
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        self.tex_coords.push(tex_coord.to_array());
        self.colors.push(color.to_array());
        self.filters.push(ALWAYS_VISIBLE);
        self.ids.push(id);
    }

    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, uv_size: Vec2, color: Vec3, id: [f32; 3]) {
        let uvs = [
            Vec2::ZERO,
            Vec2::new(uv_size.x, 0.0),
            uv_size,
            Vec2::new(0.0, uv_size.y),
        ];
        for i in [0, 1, 2, 0, 2, 3] {
            self.push_vertex(corners[i], normal, uvs[i], color, id);
        }
    }

    /// Adds a block building: four walls and a flat roof over the
    /// axis-aligned footprint `min..max`, `height` tall.
    pub fn add_extruded_rect(&mut self, min: Vec2, max: Vec2, height: f32, color: Vec3, id: [f32; 3]) {
        let footprint = [
            Vec2::new(min.x, min.y),
            Vec2::new(max.x, min.y),
            Vec2::new(max.x, max.y),
            Vec2::new(min.x, max.y),
        ];
        for i in 0..4 {
            let (p, q) = (footprint[i], footprint[(i + 1) % 4]);
            let edge = q - p;
            let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero();
            let corners = [p.extend(0.0), q.extend(0.0), q.extend(height), p.extend(height)];
            let uv_size = Vec2::new(edge.length(), height) / WALL_TILE_SIZE;
            self.push_quad(corners, normal, uv_size, color, id);
        }
        let roof = footprint.map(|p| p.extend(height));
        self.push_quad(roof, Vec3::Z, Vec2::ZERO, color, id);
    }

    /// Makes every vertex grow in between `start` and `end` on the filter
    /// clock.
    pub fn fade_in(&mut self, start: f32, end: f32) {
        for filter in &mut self.filters {
            *filter = [start, end, 0.0, 1.0];
        }
    }
}

/// A renderable item backed by its own GPU buffers.
pub struct Mesh {
    buffers: ItemBuffers,
    matrix: Cell<Option<Mat4>>,
    min_zoom: f32,
    max_zoom: f32,
}

impl Mesh {
    pub fn new(context: &Context, data: &MeshData, min_zoom: f32, max_zoom: f32) -> Result<Mesh> {
        let optional = |size: i32, data: &[f32]| -> Result<Option<VertexBuffer>> {
            if data.is_empty() {
                Ok(None)
            } else {
                VertexBuffer::new(context, size, data).map(Some)
            }
        };
        let buffers = ItemBuffers {
            positions: VertexBuffer::new(context, 3, bytemuck::cast_slice(&data.positions))?,
            normals: optional(3, bytemuck::cast_slice(&data.normals))?,
            tex_coords: optional(2, bytemuck::cast_slice(&data.tex_coords))?,
            colors: optional(3, bytemuck::cast_slice(&data.colors))?,
            filters: optional(4, bytemuck::cast_slice(&data.filters))?,
            ids: optional(3, bytemuck::cast_slice(&data.ids))?,
        };
        Ok(Mesh {
            buffers,
            matrix: Cell::new(None),
            min_zoom,
            max_zoom,
        })
    }

    /// Places the mesh, or takes it out of rendering with `None`.
    pub fn set_matrix(&self, matrix: Option<Mat4>) {
        self.matrix.set(matrix);
    }
}

impl Renderable for Mesh {
    fn matrix(&self) -> Option<Mat4> {
        self.matrix.get()
    }

    fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    fn buffers(&self) -> &ItemBuffers {
        &self.buffers
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::renderer::gl::recording::RecordingGl;

    #[test]
    fn extruded_rect_has_walls_and_roof() {
        let mut data = MeshData::default();
        data.add_extruded_rect(Vec2::ZERO, Vec2::new(4.0, 2.0), 10.0, Vec3::ONE, [0.5; 3]);
        assert_eq!(data.vertex_count(), 5 * 6);
        assert_eq!(data.ids.len(), data.vertex_count());
        // The first wall runs along the bottom edge and faces -y.
        assert_eq!(data.normals[0], [0.0, -1.0, 0.0]);
        assert_eq!(data.normals[29], [0.0, 0.0, 1.0]);
        assert!(data.positions.iter().all(|p| p[2] == 0.0 || p[2] == 10.0));
    }

    #[test]
    fn fade_in_rewrites_every_window() {
        let mut data = MeshData::default();
        data.add_extruded_rect(Vec2::ZERO, Vec2::ONE, 1.0, Vec3::ONE, [0.0; 3]);
        data.fade_in(2.0, 3.0);
        assert!(data.filters.iter().all(|f| *f == [2.0, 3.0, 0.0, 1.0]));
    }

    #[test]
    fn mesh_buffers_follow_the_data() {
        let context = Context::new(Rc::new(RecordingGl::new()), true);
        let mut data = MeshData::default();
        data.add_extruded_rect(Vec2::ZERO, Vec2::ONE, 1.0, Vec3::ONE, [0.0; 3]);
        data.tex_coords.clear();
        let mesh = Mesh::new(&context, &data, 0.0, 20.0).unwrap();
        assert_eq!(mesh.buffers().positions.num_items(), 30);
        assert_eq!(mesh.buffers().filters.as_ref().unwrap().item_size(), 4);
        assert!(mesh.buffers().tex_coords.is_none());
        assert_eq!(mesh.matrix(), None);
        mesh.set_matrix(Some(Mat4::IDENTITY));
        assert_eq!(mesh.matrix(), Some(Mat4::IDENTITY));
    }
}
