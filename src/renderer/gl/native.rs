use std::ffi::{c_void, CStr, CString};
use std::ptr;

use super::{
    AttribLocation, BufferHandle, Capability, FramebufferHandle, GlApi, ProgramHandle,
    RenderbufferHandle, ShaderHandle, ShaderStage, TextureFilter, TextureFormat, TextureHandle,
    Uniform, UniformLocation, UniformMatrix,
};

#[allow(
    clippy::all,
    dead_code,
    non_camel_case_types,
    non_snake_case,
    non_upper_case_globals,
    unused_imports
)]
mod bindings {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}

use bindings::types::{GLchar, GLenum, GLint};

/// Calls a function of the loaded function table. In debug builds, any GL
/// error raised by the call panics with the error's name and the call site.
macro_rules! call {
    ($gl:expr, $func:ident($($arg:expr),* $(,)?)) => {{
        let result = unsafe { $gl.$func($($arg),*) };
        if cfg!(debug_assertions) {
            let error = unsafe { $gl.GetError() };
            if error != bindings::NO_ERROR {
                let error_number_stringified;
                let error_name = match error {
                    bindings::INVALID_ENUM => "INVALID_ENUM",
                    bindings::INVALID_VALUE => "INVALID_VALUE",
                    bindings::INVALID_OPERATION => "INVALID_OPERATION",
                    bindings::OUT_OF_MEMORY => "OUT_OF_MEMORY",
                    bindings::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
                    _ => {
                        error_number_stringified = format!("{error}");
                        &error_number_stringified
                    }
                };
                panic!(
                    "OpenGL error {error_name} from gl{} at {}:{}",
                    stringify!($func),
                    file!(),
                    line!(),
                );
            }
        }
        result
    }};
}

const INFO_LOG_CAPACITY: usize = 4096;
const DEPTH_TEXTURE_EXTENSIONS: [&str; 3] = [
    "GL_OES_depth_texture",
    "GL_ARB_depth_texture",
    "WEBGL_depth_texture",
];

/// An OpenGL ES 3.0 context, driven through bindings loaded with the
/// platform's proc address lookup.
pub struct GlesContext {
    gl: bindings::Gles2,
    /// Attribute state lives in this one vertex array for the context's lifetime.
    vao: u32,
}

impl GlesContext {
    /// Loads the function table. The GL context must be current on this thread.
    pub fn load_with<F>(loader: F) -> GlesContext
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        let gl = bindings::Gles2::load_with(loader);
        let mut vao = 0;
        call!(gl, GenVertexArrays(1, &mut vao));
        call!(gl, BindVertexArray(vao));
        let context = GlesContext { gl, vao };
        log::info!(
            "loaded GL context: {}, renderer: {}",
            context.get_string(bindings::VERSION).unwrap_or_default(),
            context.get_string(bindings::RENDERER).unwrap_or_default(),
        );
        context
    }

    fn get_string(&self, name: GLenum) -> Option<String> {
        let string = call!(self.gl, GetString(name));
        if string.is_null() {
            return None;
        }
        let string = unsafe { CStr::from_ptr(string as *const std::ffi::c_char) };
        Some(string.to_string_lossy().into_owned())
    }

    fn extensions(&self) -> Vec<String> {
        self.get_string(bindings::EXTENSIONS)
            .map(|list| list.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    fn info_log(&self, handle: u32, is_program: bool) -> String {
        let mut info_log = [0u8; INFO_LOG_CAPACITY];
        let mut length = 0;
        if is_program {
            call!(
                self.gl,
                GetProgramInfoLog(
                    handle,
                    INFO_LOG_CAPACITY as i32,
                    &mut length,
                    info_log.as_mut_ptr() as *mut GLchar,
                )
            );
        } else {
            call!(
                self.gl,
                GetShaderInfoLog(
                    handle,
                    INFO_LOG_CAPACITY as i32,
                    &mut length,
                    info_log.as_mut_ptr() as *mut GLchar,
                )
            );
        }
        let length = (length.max(0) as usize).min(INFO_LOG_CAPACITY);
        String::from_utf8_lossy(&info_log[..length]).into_owned()
    }
}

impl Drop for GlesContext {
    fn drop(&mut self) {
        call!(self.gl, DeleteVertexArrays(1, &self.vao));
    }
}

fn texture_formats(format: TextureFormat) -> (GLint, GLenum, GLenum) {
    match format {
        TextureFormat::Rgba8 => (
            bindings::RGBA8 as GLint,
            bindings::RGBA,
            bindings::UNSIGNED_BYTE,
        ),
        TextureFormat::Depth => (
            bindings::DEPTH_COMPONENT24 as GLint,
            bindings::DEPTH_COMPONENT,
            bindings::UNSIGNED_INT,
        ),
    }
}

fn capability_enum(capability: Capability) -> GLenum {
    match capability {
        Capability::CullFace => bindings::CULL_FACE,
        Capability::DepthTest => bindings::DEPTH_TEST,
        Capability::Blend => bindings::BLEND,
    }
}

impl GlApi for GlesContext {
    fn create_shader(&self, stage: ShaderStage) -> ShaderHandle {
        let stage = match stage {
            ShaderStage::Vertex => bindings::VERTEX_SHADER,
            ShaderStage::Fragment => bindings::FRAGMENT_SHADER,
        };
        call!(self.gl, CreateShader(stage))
    }

    fn compile_shader(&self, shader: ShaderHandle, source: &str) -> Result<(), String> {
        let sources = [source.as_bytes().as_ptr() as *const GLchar];
        let source_lens = [source.len() as GLint];
        call!(
            self.gl,
            ShaderSource(shader, 1, sources.as_ptr(), source_lens.as_ptr())
        );
        call!(self.gl, CompileShader(shader));
        let mut compile_status = 0;
        call!(
            self.gl,
            GetShaderiv(shader, bindings::COMPILE_STATUS, &mut compile_status)
        );
        if compile_status == bindings::FALSE as GLint {
            return Err(self.info_log(shader, false));
        }
        Ok(())
    }

    fn delete_shader(&self, shader: ShaderHandle) {
        call!(self.gl, DeleteShader(shader));
    }

    fn create_program(&self) -> ProgramHandle {
        call!(self.gl, CreateProgram())
    }

    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle) {
        call!(self.gl, AttachShader(program, shader));
    }

    fn link_program(&self, program: ProgramHandle) -> Result<(), String> {
        call!(self.gl, LinkProgram(program));
        let mut link_status = 0;
        call!(
            self.gl,
            GetProgramiv(program, bindings::LINK_STATUS, &mut link_status)
        );
        if link_status == bindings::FALSE as GLint {
            return Err(self.info_log(program, true));
        }
        Ok(())
    }

    fn use_program(&self, program: ProgramHandle) {
        call!(self.gl, UseProgram(program));
    }

    fn delete_program(&self, program: ProgramHandle) {
        call!(self.gl, DeleteProgram(program));
    }

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation> {
        let name = CString::new(name).ok()?;
        let location = call!(
            self.gl,
            GetAttribLocation(program, name.as_ptr() as *const GLchar)
        );
        u32::try_from(location).ok()
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let name = CString::new(name).ok()?;
        let location = call!(
            self.gl,
            GetUniformLocation(program, name.as_ptr() as *const GLchar)
        );
        (location >= 0).then_some(location)
    }

    fn enable_vertex_attrib_array(&self, location: AttribLocation) {
        call!(self.gl, EnableVertexAttribArray(location));
    }

    fn disable_vertex_attrib_array(&self, location: AttribLocation) {
        call!(self.gl, DisableVertexAttribArray(location));
    }

    fn vertex_attrib_pointer_f32(&self, location: AttribLocation, size: i32) {
        call!(
            self.gl,
            VertexAttribPointer(
                location,
                size,
                bindings::FLOAT,
                bindings::FALSE,
                0,
                ptr::null::<c_void>(),
            )
        );
    }

    fn uniform(&self, location: UniformLocation, value: &Uniform) {
        match value {
            Uniform::Int(v) => call!(self.gl, Uniform1i(location, *v)),
            Uniform::Float(v) => call!(self.gl, Uniform1f(location, *v)),
            Uniform::Vec2(v) => call!(self.gl, Uniform2fv(location, 1, v.as_ref().as_ptr())),
            Uniform::Vec3(v) => call!(self.gl, Uniform3fv(location, 1, v.as_ref().as_ptr())),
            Uniform::Vec4(v) => call!(self.gl, Uniform4fv(location, 1, v.as_ref().as_ptr())),
        }
    }

    fn uniform_matrix(&self, location: UniformLocation, value: &UniformMatrix) {
        match value {
            UniformMatrix::Mat3(m) => {
                let columns = m.to_cols_array();
                call!(
                    self.gl,
                    UniformMatrix3fv(location, 1, bindings::FALSE, columns.as_ptr())
                );
            }
            UniformMatrix::Mat4(m) => {
                let columns = m.to_cols_array();
                call!(
                    self.gl,
                    UniformMatrix4fv(location, 1, bindings::FALSE, columns.as_ptr())
                );
            }
        }
    }

    fn create_buffer(&self) -> BufferHandle {
        let mut buffer = 0;
        call!(self.gl, GenBuffers(1, &mut buffer));
        buffer
    }

    fn bind_array_buffer(&self, buffer: BufferHandle) {
        call!(self.gl, BindBuffer(bindings::ARRAY_BUFFER, buffer));
    }

    fn array_buffer_data_f32(&self, data: &[f32]) {
        let data: &[u8] = bytemuck::cast_slice(data);
        call!(
            self.gl,
            BufferData(
                bindings::ARRAY_BUFFER,
                data.len() as isize,
                data.as_ptr() as *const c_void,
                bindings::STATIC_DRAW,
            )
        );
    }

    fn delete_buffer(&self, buffer: BufferHandle) {
        call!(self.gl, DeleteBuffers(1, &buffer));
    }

    fn create_texture(&self) -> TextureHandle {
        let mut texture = 0;
        call!(self.gl, GenTextures(1, &mut texture));
        texture
    }

    fn active_texture(&self, unit: u32) {
        call!(self.gl, ActiveTexture(bindings::TEXTURE0 + unit));
    }

    fn bind_texture_2d(&self, texture: TextureHandle) {
        call!(self.gl, BindTexture(bindings::TEXTURE_2D, texture));
    }

    fn tex_image_2d(&self, format: TextureFormat, width: i32, height: i32, pixels: Option<&[u8]>) {
        let (internal_format, pixel_format, pixel_type) = texture_formats(format);
        let pixels = pixels.map_or(ptr::null(), |p| p.as_ptr() as *const c_void);
        call!(
            self.gl,
            TexImage2D(
                bindings::TEXTURE_2D,
                0,
                internal_format,
                width,
                height,
                0,
                pixel_format,
                pixel_type,
                pixels,
            )
        );
    }

    fn tex_filter(&self, filter: TextureFilter) {
        let (min, mag) = match filter {
            TextureFilter::Nearest => (bindings::NEAREST, bindings::NEAREST),
            TextureFilter::Linear => (bindings::LINEAR, bindings::LINEAR),
            TextureFilter::Mipmapped => (bindings::LINEAR_MIPMAP_LINEAR, bindings::LINEAR),
        };
        let target = bindings::TEXTURE_2D;
        call!(self.gl, TexParameteri(target, bindings::TEXTURE_MIN_FILTER, min as GLint));
        call!(self.gl, TexParameteri(target, bindings::TEXTURE_MAG_FILTER, mag as GLint));
        // Images tile across walls, render targets must not bleed at the edges.
        let wrap = match filter {
            TextureFilter::Mipmapped => bindings::REPEAT,
            _ => bindings::CLAMP_TO_EDGE,
        } as GLint;
        call!(self.gl, TexParameteri(target, bindings::TEXTURE_WRAP_S, wrap));
        call!(self.gl, TexParameteri(target, bindings::TEXTURE_WRAP_T, wrap));
        if filter == TextureFilter::Mipmapped {
            call!(self.gl, GenerateMipmap(target));
        }
    }

    fn delete_texture(&self, texture: TextureHandle) {
        call!(self.gl, DeleteTextures(1, &texture));
    }

    fn create_framebuffer(&self) -> FramebufferHandle {
        let mut framebuffer = 0;
        call!(self.gl, GenFramebuffers(1, &mut framebuffer));
        framebuffer
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferHandle>) {
        call!(
            self.gl,
            BindFramebuffer(bindings::FRAMEBUFFER, framebuffer.unwrap_or(0))
        );
    }

    fn framebuffer_texture_2d(&self, format: TextureFormat, texture: TextureHandle) {
        let attachment = match format {
            TextureFormat::Rgba8 => bindings::COLOR_ATTACHMENT0,
            TextureFormat::Depth => bindings::DEPTH_ATTACHMENT,
        };
        call!(
            self.gl,
            FramebufferTexture2D(
                bindings::FRAMEBUFFER,
                attachment,
                bindings::TEXTURE_2D,
                texture,
                0
            )
        );
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferHandle) {
        call!(self.gl, DeleteFramebuffers(1, &framebuffer));
    }

    fn create_depth_renderbuffer(&self, width: i32, height: i32) -> RenderbufferHandle {
        let mut renderbuffer = 0;
        call!(self.gl, GenRenderbuffers(1, &mut renderbuffer));
        call!(self.gl, BindRenderbuffer(bindings::RENDERBUFFER, renderbuffer));
        call!(
            self.gl,
            RenderbufferStorage(
                bindings::RENDERBUFFER,
                bindings::DEPTH_COMPONENT16,
                width,
                height
            )
        );
        call!(
            self.gl,
            FramebufferRenderbuffer(
                bindings::FRAMEBUFFER,
                bindings::DEPTH_ATTACHMENT,
                bindings::RENDERBUFFER,
                renderbuffer,
            )
        );
        call!(self.gl, BindRenderbuffer(bindings::RENDERBUFFER, 0));
        renderbuffer
    }

    fn delete_renderbuffer(&self, renderbuffer: RenderbufferHandle) {
        call!(self.gl, DeleteRenderbuffers(1, &renderbuffer));
    }

    fn read_pixel(&self, x: i32, y: i32) -> [u8; 4] {
        let mut pixel = [0u8; 4];
        call!(
            self.gl,
            ReadPixels(
                x,
                y,
                1,
                1,
                bindings::RGBA,
                bindings::UNSIGNED_BYTE,
                pixel.as_mut_ptr() as *mut c_void,
            )
        );
        pixel
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        call!(self.gl, Viewport(x, y, width, height));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        call!(self.gl, ClearColor(r, g, b, a));
    }

    fn clear_color_and_depth(&self) {
        call!(
            self.gl,
            Clear(bindings::COLOR_BUFFER_BIT | bindings::DEPTH_BUFFER_BIT)
        );
    }

    fn set_capability(&self, capability: Capability, enabled: bool) {
        let capability = capability_enum(capability);
        if enabled {
            call!(self.gl, Enable(capability));
        } else {
            call!(self.gl, Disable(capability));
        }
    }

    fn blend_alpha(&self) {
        call!(
            self.gl,
            BlendFunc(bindings::SRC_ALPHA, bindings::ONE_MINUS_SRC_ALPHA)
        );
    }

    fn cull_back_faces(&self) {
        call!(self.gl, CullFace(bindings::BACK));
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        call!(self.gl, DrawArrays(bindings::TRIANGLES, first, count));
    }

    fn supports_depth_texture(&self) -> bool {
        let version = self.get_string(bindings::VERSION).unwrap_or_default();
        if version.starts_with("OpenGL ES 3") {
            return true;
        }
        let extensions = self.extensions();
        DEPTH_TEXTURE_EXTENSIONS
            .iter()
            .any(|wanted| extensions.iter().any(|ext| ext == wanted))
    }
}
