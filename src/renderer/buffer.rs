use crate::error::{RenderError, Result};

use super::context::Context;
use super::gl::BufferHandle;

/// A vertex buffer of tightly packed f32 attributes, `item_size` floats per
/// vertex. The GPU handle is released when the buffer is dropped.
pub struct VertexBuffer {
    context: Context,
    buffer: BufferHandle,
    item_size: i32,
    num_items: i32,
}

impl VertexBuffer {
    pub fn new(context: &Context, item_size: i32, data: &[f32]) -> Result<VertexBuffer> {
        if !(1..=4).contains(&item_size) {
            return Err(RenderError::InvalidBuffer(format!(
                "item size must be between 1 and 4, got {item_size}"
            )));
        }
        if data.len() % item_size as usize != 0 {
            return Err(RenderError::InvalidBuffer(format!(
                "{} floats is not a whole number of {item_size}-component items",
                data.len()
            )));
        }
        let gl = context.gl();
        let buffer = gl.create_buffer();
        gl.bind_array_buffer(buffer);
        gl.array_buffer_data_f32(data);
        Ok(VertexBuffer {
            context: context.clone(),
            buffer,
            item_size,
            num_items: (data.len() / item_size as usize) as i32,
        })
    }

    /// Components per vertex.
    pub fn item_size(&self) -> i32 {
        self.item_size
    }

    /// Number of vertices.
    pub fn num_items(&self) -> i32 {
        self.num_items
    }

    /// Makes this the bound array buffer.
    pub fn bind(&self) {
        self.context.gl().bind_array_buffer(self.buffer);
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        self.context.gl().delete_buffer(self.buffer);
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
    fn counts_items_from_item_size() {
        let (gl, context) = setup();
        let buffer = VertexBuffer::new(&context, 3, &[0.0; 18]).unwrap();
        assert_eq!(buffer.item_size(), 3);
        assert_eq!(buffer.num_items(), 6);
        assert!(gl.calls().contains(&Call::BufferData { len: 18 }));
    }

    #[test]
    fn rejects_bad_layouts() {
        let (_gl, context) = setup();
        assert!(matches!(
            VertexBuffer::new(&context, 0, &[]),
            Err(RenderError::InvalidBuffer(_))
        ));
        assert!(matches!(
            VertexBuffer::new(&context, 5, &[0.0; 5]),
            Err(RenderError::InvalidBuffer(_))
        ));
        assert!(matches!(
            VertexBuffer::new(&context, 3, &[0.0; 4]),
            Err(RenderError::InvalidBuffer(_))
        ));
    }

    #[test]
    fn drop_releases_the_handle() {
        let (gl, context) = setup();
        let buffer = VertexBuffer::new(&context, 2, &[0.0; 4]).unwrap();
        let handle = buffer.buffer;
        drop(buffer);
        assert!(gl.calls().contains(&Call::DeleteBuffer(handle)));
    }
}
