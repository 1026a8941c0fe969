use std::collections::HashMap;

use crate::error::{RenderError, Result};

use super::buffer::VertexBuffer;
use super::context::Context;
use super::gl::{
    AttribLocation, ProgramHandle, ShaderStage, Uniform, UniformLocation, UniformMatrix,
};
use super::texture::Texture;

/// Everything needed to build a [`Shader`]: the two stages and the names the
/// renderer will later bind by.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSource {
    pub name: &'static str,
    pub vertex: &'static str,
    pub fragment: &'static str,
    pub attributes: &'static [&'static str],
    pub uniforms: &'static [&'static str],
}

/// A linked shader program with its attribute and uniform locations resolved
/// up front.
///
/// Names the driver doesn't report (optimized out, or simply not declared) are
/// reported once per shader and name, and binding them afterwards does nothing.
pub struct Shader {
    context: Context,
    name: String,
    program: ProgramHandle,
    attributes: HashMap<String, AttribLocation>,
    uniforms: HashMap<String, UniformLocation>,
}

impl Shader {
    pub fn new(context: &Context, source: &ShaderSource) -> Result<Shader> {
        let program = compile(context, source)?;
        let mut shader = Shader {
            context: context.clone(),
            name: source.name.to_string(),
            program,
            attributes: HashMap::new(),
            uniforms: HashMap::new(),
        };
        context.gl().use_program(program);
        shader.resolve_bindings(source.attributes, source.uniforms);
        log::debug!(
            "created shader \"{}\" with {} attributes, {} uniforms",
            shader.name,
            shader.attributes.len(),
            shader.uniforms.len()
        );
        Ok(shader)
    }

    fn resolve_bindings(&mut self, attribute_names: &[&str], uniform_names: &[&str]) {
        let gl = self.context.gl();
        let diagnostics = self.context.diagnostics();
        for &name in attribute_names {
            match gl.attrib_location(self.program, name) {
                Some(location) => {
                    self.attributes.insert(name.to_string(), location);
                }
                None => {
                    diagnostics.warn_once(
                        &self.name,
                        name,
                        format_args!(
                            "unable to locate attribute \"{name}\" in shader \"{}\"",
                            self.name
                        ),
                    );
                }
            }
        }
        for &name in uniform_names {
            match gl.uniform_location(self.program, name) {
                Some(location) => {
                    self.uniforms.insert(name.to_string(), location);
                }
                None => {
                    diagnostics.warn_once(
                        &self.name,
                        name,
                        format_args!(
                            "unable to locate uniform \"{name}\" in shader \"{}\"",
                            self.name
                        ),
                    );
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    /// Makes this the current program and turns on its attribute arrays.
    /// Pair every call with [`Shader::disable`].
    pub fn enable(&self) -> &Shader {
        let gl = self.context.gl();
        gl.use_program(self.program);
        for &location in self.attributes.values() {
            gl.enable_vertex_attrib_array(location);
        }
        self
    }

    pub fn disable(&self) {
        let gl = self.context.gl();
        for &location in self.attributes.values() {
            gl.disable_vertex_attrib_array(location);
        }
    }

    fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        let location = self.uniforms.get(name).copied();
        if location.is_none() {
            self.context.diagnostics().warn_once(
                &self.name,
                name,
                format_args!(
                    "attempt to bind to invalid uniform \"{name}\" in shader \"{}\"",
                    self.name
                ),
            );
        }
        location
    }

    pub fn set_uniform(&self, name: &str, value: Uniform) {
        if let Some(location) = self.uniform_location(name) {
            self.context.gl().uniform(location, &value);
        }
    }

    pub fn set_uniforms(&self, uniforms: &[(&str, Uniform)]) {
        for &(name, value) in uniforms {
            self.set_uniform(name, value);
        }
    }

    pub fn set_uniform_matrix(&self, name: &str, value: UniformMatrix) {
        if let Some(location) = self.uniform_location(name) {
            self.context.gl().uniform_matrix(location, &value);
        }
    }

    pub fn set_uniform_matrices(&self, uniforms: &[(&str, UniformMatrix)]) {
        for &(name, value) in uniforms {
            self.set_uniform_matrix(name, value);
        }
    }

    /// Feeds `buffer` into `attribute`, as `item_size` packed floats per vertex.
    pub fn bind_buffer(&self, buffer: &VertexBuffer, attribute: &str) {
        let Some(&location) = self.attributes.get(attribute) else {
            self.context.diagnostics().warn_once(
                &self.name,
                attribute,
                format_args!(
                    "attempt to bind VBO to invalid attribute \"{attribute}\" in shader \"{}\"",
                    self.name
                ),
            );
            return;
        };
        let gl = self.context.gl();
        buffer.bind();
        gl.vertex_attrib_pointer_f32(location, buffer.item_size());
        gl.enable_vertex_attrib_array(location);
    }

    /// Stops reading `attribute` from a buffer, for items that don't have
    /// one. The shader sees the attribute's constant value instead, until the
    /// next [`Shader::bind_buffer`] for it.
    pub fn clear_attribute(&self, attribute: &str) {
        if let Some(&location) = self.attributes.get(attribute) {
            self.context.gl().disable_vertex_attrib_array(location);
        }
    }

    /// Binds `texture` to `unit` and points the sampler `uniform` at it.
    pub fn bind_texture(&self, uniform: &str, unit: u32, texture: &Texture) {
        texture.enable(unit);
        self.set_uniform(uniform, Uniform::Int(unit as i32));
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.disable();
        self.context.gl().delete_program(self.program);
    }
}

fn compile(context: &Context, source: &ShaderSource) -> Result<ProgramHandle> {
    let gl = context.gl();
    let mut stages = Vec::with_capacity(2);
    for (stage, text) in [
        (ShaderStage::Vertex, source.vertex),
        (ShaderStage::Fragment, source.fragment),
    ] {
        let shader = gl.create_shader(stage);
        if let Err(log) = gl.compile_shader(shader, text) {
            gl.delete_shader(shader);
            for &compiled in &stages {
                gl.delete_shader(compiled);
            }
            return Err(RenderError::ShaderCompile {
                shader: source.name.to_string(),
                stage: stage.name(),
                log,
            });
        }
        stages.push(shader);
    }

    let program = gl.create_program();
    for &shader in &stages {
        gl.attach_shader(program, shader);
    }
    let linked = gl.link_program(program);
    for &shader in &stages {
        gl.delete_shader(shader);
    }
    if let Err(log) = linked {
        gl.delete_program(program);
        return Err(RenderError::ShaderLink {
            shader: source.name.to_string(),
            log,
        });
    }
    Ok(program)
}
