//! The slice of OpenGL ES this crate uses, behind a trait so that every
//! resource gets its context handed to it instead of reaching for a global.

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

mod native;
#[cfg(test)]
pub mod recording;

pub use native::GlesContext;

pub type ProgramHandle = u32;
pub type ShaderHandle = u32;
pub type BufferHandle = u32;
pub type TextureHandle = u32;
pub type FramebufferHandle = u32;
pub type RenderbufferHandle = u32;
pub type AttribLocation = u32;
pub type UniformLocation = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// A non-matrix uniform value. The variant must match the GLSL declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformMatrix {
    Mat3(Mat3),
    Mat4(Mat4),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8,
    Depth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
    /// Trilinear, mipmaps are generated after upload.
    Mipmapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CullFace,
    DepthTest,
    Blend,
}

pub trait GlApi {
    fn create_shader(&self, stage: ShaderStage) -> ShaderHandle;
    /// Uploads the source and compiles it, returning the info log on failure.
    fn compile_shader(&self, shader: ShaderHandle, source: &str) -> Result<(), String>;
    fn delete_shader(&self, shader: ShaderHandle);

    fn create_program(&self) -> ProgramHandle;
    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle);
    /// Links the program, returning the info log on failure.
    fn link_program(&self, program: ProgramHandle) -> Result<(), String>;
    fn use_program(&self, program: ProgramHandle);
    fn delete_program(&self, program: ProgramHandle);
    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation>;
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    fn enable_vertex_attrib_array(&self, location: AttribLocation);
    fn disable_vertex_attrib_array(&self, location: AttribLocation);
    /// Points `location` at the bound array buffer: `size` tightly packed
    /// floats per vertex, no offset.
    fn vertex_attrib_pointer_f32(&self, location: AttribLocation, size: i32);
    fn uniform(&self, location: UniformLocation, value: &Uniform);
    fn uniform_matrix(&self, location: UniformLocation, value: &UniformMatrix);

    fn create_buffer(&self) -> BufferHandle;
    fn bind_array_buffer(&self, buffer: BufferHandle);
    /// Uploads `data` into the bound array buffer as static draw data.
    fn array_buffer_data_f32(&self, data: &[f32]);
    fn delete_buffer(&self, buffer: BufferHandle);

    fn create_texture(&self) -> TextureHandle;
    fn active_texture(&self, unit: u32);
    fn bind_texture_2d(&self, texture: TextureHandle);
    /// Allocates (and optionally fills) the bound 2D texture. `pixels` must be
    /// tightly packed RGBA8 when given.
    fn tex_image_2d(&self, format: TextureFormat, width: i32, height: i32, pixels: Option<&[u8]>);
    fn tex_filter(&self, filter: TextureFilter);
    fn delete_texture(&self, texture: TextureHandle);

    fn create_framebuffer(&self) -> FramebufferHandle;
    /// Binds `framebuffer`, or the default framebuffer with `None`.
    fn bind_framebuffer(&self, framebuffer: Option<FramebufferHandle>);
    fn framebuffer_texture_2d(&self, format: TextureFormat, texture: TextureHandle);
    fn delete_framebuffer(&self, framebuffer: FramebufferHandle);
    /// Creates a non-sampled depth renderbuffer and attaches it to the bound
    /// framebuffer.
    fn create_depth_renderbuffer(&self, width: i32, height: i32) -> RenderbufferHandle;
    fn delete_renderbuffer(&self, renderbuffer: RenderbufferHandle);
    /// Reads one RGBA8 pixel from the bound framebuffer.
    fn read_pixel(&self, x: i32, y: i32) -> [u8; 4];

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_color_and_depth(&self);
    fn set_capability(&self, capability: Capability, enabled: bool);
    /// Standard `SRC_ALPHA, ONE_MINUS_SRC_ALPHA` blending.
    fn blend_alpha(&self);
    fn cull_back_faces(&self);
    fn draw_triangles(&self, first: i32, count: i32);

    fn supports_depth_texture(&self) -> bool;
}
