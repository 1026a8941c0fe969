//! The passes that draw the scene item list: visible buildings, the
//! depth/fog/normal map (also used as the sun's shadow map), and the shadow
//! overlay on the map plane.

use super::buffer::VertexBuffer;
use super::shader::Shader;

mod buildings;
mod depth_fog_normal;
mod map_shadows;

pub use buildings::Buildings;
pub use depth_fog_normal::DepthFogNormalMap;
pub use map_shadows::MapShadows;

/// Binds `buffer` to `attribute` if the item has one, and clears whatever the
/// previous item left there otherwise.
fn bind_optional(shader: &Shader, buffer: Option<&VertexBuffer>, attribute: &str) {
    match buffer {
        Some(buffer) => shader.bind_buffer(buffer, attribute),
        None => shader.clear_attribute(attribute),
    }
}
