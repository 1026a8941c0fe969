use super::context::Context;
use super::gl::{FramebufferHandle, RenderbufferHandle, TextureFormat};
use super::texture::Texture;

enum DepthAttachment {
    Renderbuffer(RenderbufferHandle),
    Texture(Texture),
}

struct Storage {
    framebuffer: FramebufferHandle,
    color: Texture,
    depth: DepthAttachment,
}

/// An off-screen render target: an RGBA color texture plus either a plain
/// depth renderbuffer or, for passes whose depth gets sampled later, a depth
/// texture.
pub struct Framebuffer {
    context: Context,
    width: i32,
    height: i32,
    use_depth_texture: bool,
    storage: Storage,
    /// Set once the target has been bound for rendering since its storage was
    /// (re)allocated. Reads before that have no defined contents.
    written: bool,
}

impl Framebuffer {
    pub fn new(context: &Context, width: i32, height: i32, use_depth_texture: bool) -> Framebuffer {
        let storage = Framebuffer::allocate(context, width, height, use_depth_texture);
        Framebuffer {
            context: context.clone(),
            width,
            height,
            use_depth_texture,
            storage,
            written: false,
        }
    }

    fn allocate(context: &Context, width: i32, height: i32, use_depth_texture: bool) -> Storage {
        let gl = context.gl();
        let framebuffer = gl.create_framebuffer();
        gl.bind_framebuffer(Some(framebuffer));

        let color = Texture::empty(context, TextureFormat::Rgba8, width, height);
        gl.framebuffer_texture_2d(TextureFormat::Rgba8, color.handle());

        let depth = if use_depth_texture {
            let texture = Texture::empty(context, TextureFormat::Depth, width, height);
            gl.framebuffer_texture_2d(TextureFormat::Depth, texture.handle());
            DepthAttachment::Texture(texture)
        } else {
            DepthAttachment::Renderbuffer(gl.create_depth_renderbuffer(width, height))
        };

        gl.bind_framebuffer(None);
        Storage {
            framebuffer,
            color,
            depth,
        }
    }

    fn release(&self) {
        let gl = self.context.gl();
        gl.delete_framebuffer(self.storage.framebuffer);
        if let DepthAttachment::Renderbuffer(renderbuffer) = self.storage.depth {
            gl.delete_renderbuffer(renderbuffer);
        }
    }

    /// Resizes the target. Storage is thrown away and recreated, so the
    /// contents are undefined afterwards.
    pub fn set_size(&mut self, width: i32, height: i32) {
        if width == self.width && height == self.height {
            return;
        }
        log::debug!(
            "resizing framebuffer from {}x{} to {width}x{height}",
            self.width,
            self.height
        );
        self.release();
        self.storage = Framebuffer::allocate(&self.context, width, height, self.use_depth_texture);
        self.width = width;
        self.height = height;
        self.written = false;
    }

    /// Directs rendering into this target.
    pub fn enable(&mut self) {
        self.context
            .gl()
            .bind_framebuffer(Some(self.storage.framebuffer));
        self.written = true;
    }

    /// Directs rendering back to the default framebuffer.
    pub fn disable(&self) {
        self.context.gl().bind_framebuffer(None);
    }

    /// Reads one RGBA pixel, in target coordinates with the origin at the
    /// bottom left. `None` when out of bounds or nothing was rendered yet.
    /// The default framebuffer is bound again afterwards.
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if !self.written || x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        let gl = self.context.gl();
        gl.bind_framebuffer(Some(self.storage.framebuffer));
        let pixel = gl.read_pixel(x, y);
        gl.bind_framebuffer(None);
        Some(pixel)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn render_texture(&self) -> &Texture {
        &self.storage.color
    }

    pub fn depth_texture(&self) -> Option<&Texture> {
        match &self.storage.depth {
            DepthAttachment::Texture(texture) => Some(texture),
            DepthAttachment::Renderbuffer(_) => None,
        }
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        self.release();
    }
}
