use std::path::Path;

use image::RgbaImage;

use crate::error::Result;

use super::context::Context;
use super::gl::{TextureFilter, TextureFormat, TextureHandle};

/// A 2D texture owned by one component and deleted on drop.
pub struct Texture {
    context: Context,
    texture: TextureHandle,
    width: i32,
    height: i32,
}

impl Texture {
    /// Allocates an uninitialized texture, used as a render target.
    pub fn empty(context: &Context, format: TextureFormat, width: i32, height: i32) -> Texture {
        let gl = context.gl();
        let texture = gl.create_texture();
        gl.bind_texture_2d(texture);
        gl.tex_image_2d(format, width, height, None);
        gl.tex_filter(TextureFilter::Nearest);
        Texture {
            context: context.clone(),
            texture,
            width,
            height,
        }
    }

    /// A 1x1 texture of a single color, for use until a real image arrives.
    pub fn solid_color(context: &Context, color: [f32; 3]) -> Texture {
        let [r, g, b] = color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        let image = RgbaImage::from_pixel(1, 1, image::Rgba([r, g, b, 255]));
        Texture::from_image(context, &image)
    }

    pub fn from_image(context: &Context, image: &RgbaImage) -> Texture {
        let gl = context.gl();
        let (width, height) = (image.width() as i32, image.height() as i32);
        let texture = gl.create_texture();
        gl.bind_texture_2d(texture);
        gl.tex_image_2d(TextureFormat::Rgba8, width, height, Some(image.as_raw()));
        gl.tex_filter(TextureFilter::Mipmapped);
        Texture {
            context: context.clone(),
            texture,
            width,
            height,
        }
    }

    pub fn load(context: &Context, path: impl AsRef<Path>) -> Result<Texture> {
        let path = path.as_ref();
        let image = image::open(path)?.to_rgba8();
        log::debug!(
            "loaded texture {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Texture::from_image(context, &image))
    }

    /// Binds the texture to texture unit `unit`.
    pub fn enable(&self, unit: u32) {
        let gl = self.context.gl();
        gl.active_texture(unit);
        gl.bind_texture_2d(self.texture);
    }

    pub fn handle(&self) -> TextureHandle {
        self.texture
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.context.gl().delete_texture(self.texture);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::renderer::gl::recording::{Call, RecordingGl};

    #[test]
    fn solid_color_uploads_a_single_pixel() {
        let gl = Rc::new(RecordingGl::new());
        let context = Context::new(gl.clone(), true);
        let texture = Texture::solid_color(&context, [1.0, 1.0, 1.0]);
        assert_eq!((texture.width(), texture.height()), (1, 1));
        assert!(gl.calls().contains(&Call::TexImage {
            format: TextureFormat::Rgba8,
            width: 1,
            height: 1
        }));
    }

    #[test]
    fn enable_activates_the_unit_before_binding() {
        let gl = Rc::new(RecordingGl::new());
        let context = Context::new(gl.clone(), true);
        let texture = Texture::empty(&context, TextureFormat::Depth, 64, 32);
        gl.clear_calls();
        texture.enable(3);
        assert_eq!(
            gl.calls(),
            vec![Call::ActiveTexture(3), Call::BindTexture(texture.handle())]
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let context = Context::new(Rc::new(RecordingGl::new()), true);
        assert!(Texture::load(&context, "/nonexistent/wall.png").is_err());
    }
}
