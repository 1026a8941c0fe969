//! A `GlApi` that draws nothing and remembers every state-changing call, for
//! tests that need to see what a pass or resource asked the GPU to do.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UseProgram(ProgramHandle),
    DeleteProgram(ProgramHandle),
    DeleteShader(ShaderHandle),
    EnableAttrib(AttribLocation),
    DisableAttrib(AttribLocation),
    AttribPointer { location: AttribLocation, size: i32 },
    Uniform(UniformLocation, Uniform),
    UniformMatrix(UniformLocation, UniformMatrix),
    BindArrayBuffer(BufferHandle),
    BufferData { len: usize },
    DeleteBuffer(BufferHandle),
    ActiveTexture(u32),
    BindTexture(TextureHandle),
    TexImage { format: TextureFormat, width: i32, height: i32 },
    DeleteTexture(TextureHandle),
    BindFramebuffer(Option<FramebufferHandle>),
    DeleteFramebuffer(FramebufferHandle),
    DeleteRenderbuffer(RenderbufferHandle),
    ReadPixel { x: i32, y: i32 },
    Viewport { width: i32, height: i32 },
    Clear,
    Capability(Capability, bool),
    DrawTriangles { count: i32 },
}

#[derive(Default)]
struct State {
    next_handle: u32,
    calls: Vec<Call>,
    missing_names: HashSet<String>,
    compile_error: Option<String>,
    link_error: Option<String>,
    attrib_locations: HashMap<String, AttribLocation>,
    uniform_locations: HashMap<String, UniformLocation>,
    pixel: [u8; 4],
    depth_texture: bool,
}

impl State {
    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

#[derive(Default)]
pub struct RecordingGl {
    state: RefCell<State>,
}

impl RecordingGl {
    pub fn new() -> RecordingGl {
        let gl = RecordingGl::default();
        gl.state.borrow_mut().depth_texture = true;
        gl
    }

    pub fn without_depth_texture(self) -> RecordingGl {
        self.state.borrow_mut().depth_texture = false;
        self
    }

    /// Makes the driver report `name` as absent from every program.
    pub fn strip_name(&self, name: &str) {
        self.state.borrow_mut().missing_names.insert(name.to_string());
    }

    pub fn fail_compile(&self, log: &str) {
        self.state.borrow_mut().compile_error = Some(log.to_string());
    }

    pub fn fail_link(&self, log: &str) {
        self.state.borrow_mut().link_error = Some(log.to_string());
    }

    /// The value every subsequent `read_pixel` returns.
    pub fn set_pixel(&self, pixel: [u8; 4]) {
        self.state.borrow_mut().pixel = pixel;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn draw_count(&self) -> usize {
        self.count(|call| matches!(call, Call::DrawTriangles { .. }))
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn attrib_location_of(&self, name: &str) -> Option<AttribLocation> {
        self.state.borrow().attrib_locations.get(name).copied()
    }

    pub fn uniform_location_of(&self, name: &str) -> Option<UniformLocation> {
        self.state.borrow().uniform_locations.get(name).copied()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GlApi for RecordingGl {
    fn create_shader(&self, _stage: ShaderStage) -> ShaderHandle {
        self.state.borrow_mut().handle()
    }

    fn compile_shader(&self, _shader: ShaderHandle, _source: &str) -> Result<(), String> {
        match &self.state.borrow().compile_error {
            Some(log) => Err(log.clone()),
            None => Ok(()),
        }
    }

    fn delete_shader(&self, shader: ShaderHandle) {
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> ProgramHandle {
        self.state.borrow_mut().handle()
    }

    fn attach_shader(&self, _program: ProgramHandle, _shader: ShaderHandle) {}

    fn link_program(&self, _program: ProgramHandle) -> Result<(), String> {
        match &self.state.borrow().link_error {
            Some(log) => Err(log.clone()),
            None => Ok(()),
        }
    }

    fn use_program(&self, program: ProgramHandle) {
        self.record(Call::UseProgram(program));
    }

    fn delete_program(&self, program: ProgramHandle) {
        self.record(Call::DeleteProgram(program));
    }

    fn attrib_location(&self, _program: ProgramHandle, name: &str) -> Option<AttribLocation> {
        let mut state = self.state.borrow_mut();
        if state.missing_names.contains(name) {
            return None;
        }
        let next = state.attrib_locations.len() as AttribLocation;
        Some(*state.attrib_locations.entry(name.to_string()).or_insert(next))
    }

    fn uniform_location(&self, _program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let mut state = self.state.borrow_mut();
        if state.missing_names.contains(name) {
            return None;
        }
        let next = state.uniform_locations.len() as UniformLocation;
        Some(*state.uniform_locations.entry(name.to_string()).or_insert(next))
    }

    fn enable_vertex_attrib_array(&self, location: AttribLocation) {
        self.record(Call::EnableAttrib(location));
    }

    fn disable_vertex_attrib_array(&self, location: AttribLocation) {
        self.record(Call::DisableAttrib(location));
    }

    fn vertex_attrib_pointer_f32(&self, location: AttribLocation, size: i32) {
        self.record(Call::AttribPointer { location, size });
    }

    fn uniform(&self, location: UniformLocation, value: &Uniform) {
        self.record(Call::Uniform(location, *value));
    }

    fn uniform_matrix(&self, location: UniformLocation, value: &UniformMatrix) {
        self.record(Call::UniformMatrix(location, *value));
    }

    fn create_buffer(&self) -> BufferHandle {
        self.state.borrow_mut().handle()
    }

    fn bind_array_buffer(&self, buffer: BufferHandle) {
        self.record(Call::BindArrayBuffer(buffer));
    }

    fn array_buffer_data_f32(&self, data: &[f32]) {
        self.record(Call::BufferData { len: data.len() });
    }

    fn delete_buffer(&self, buffer: BufferHandle) {
        self.record(Call::DeleteBuffer(buffer));
    }

    fn create_texture(&self) -> TextureHandle {
        self.state.borrow_mut().handle()
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture_2d(&self, texture: TextureHandle) {
        self.record(Call::BindTexture(texture));
    }

    fn tex_image_2d(&self, format: TextureFormat, width: i32, height: i32, _pixels: Option<&[u8]>) {
        self.record(Call::TexImage { format, width, height });
    }

    fn tex_filter(&self, _filter: TextureFilter) {}

    fn delete_texture(&self, texture: TextureHandle) {
        self.record(Call::DeleteTexture(texture));
    }

    fn create_framebuffer(&self) -> FramebufferHandle {
        self.state.borrow_mut().handle()
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferHandle>) {
        self.record(Call::BindFramebuffer(framebuffer));
    }

    fn framebuffer_texture_2d(&self, _format: TextureFormat, _texture: TextureHandle) {}

    fn delete_framebuffer(&self, framebuffer: FramebufferHandle) {
        self.record(Call::DeleteFramebuffer(framebuffer));
    }

    fn create_depth_renderbuffer(&self, _width: i32, _height: i32) -> RenderbufferHandle {
        self.state.borrow_mut().handle()
    }

    fn delete_renderbuffer(&self, renderbuffer: RenderbufferHandle) {
        self.record(Call::DeleteRenderbuffer(renderbuffer));
    }

    fn read_pixel(&self, x: i32, y: i32) -> [u8; 4] {
        self.record(Call::ReadPixel { x, y });
        self.state.borrow().pixel
    }

    fn viewport(&self, _x: i32, _y: i32, width: i32, height: i32) {
        self.record(Call::Viewport { width, height });
    }

    fn clear_color(&self, _r: f32, _g: f32, _b: f32, _a: f32) {}

    fn clear_color_and_depth(&self) {
        self.record(Call::Clear);
    }

    fn set_capability(&self, capability: Capability, enabled: bool) {
        self.record(Call::Capability(capability, enabled));
    }

    fn blend_alpha(&self) {}

    fn cull_back_faces(&self) {}

    fn draw_triangles(&self, _first: i32, count: i32) {
        self.record(Call::DrawTriangles { count });
    }

    fn supports_depth_texture(&self) -> bool {
        self.state.borrow().depth_texture
    }
}
