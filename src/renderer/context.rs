use std::rc::Rc;

use super::diagnostics::Diagnostics;
use super::gl::GlApi;

/// Optional GPU features, queried once when the context is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Depth attachments can be sampled as textures. Without this, the
    /// fog/normal/depth pass and shadows are skipped.
    pub depth_texture: bool,
}

struct Inner {
    gl: Rc<dyn GlApi>,
    diagnostics: Diagnostics,
    capabilities: Capabilities,
}

/// Handle to one GL context. Every GPU resource is created from one of these
/// and keeps a clone of it so it can release its handles on drop.
#[derive(Clone)]
pub struct Context {
    inner: Rc<Inner>,
}

impl Context {
    /// Wraps `gl` and queries its capabilities. Optional features are only
    /// requested when `high_quality` is set.
    pub fn new(gl: Rc<dyn GlApi>, high_quality: bool) -> Context {
        let capabilities = Capabilities {
            depth_texture: high_quality && gl.supports_depth_texture(),
        };
        if high_quality && !capabilities.depth_texture {
            log::warn!("depth textures are not supported, shadows and fog maps are disabled");
        }
        log::debug!("GPU capabilities: {capabilities:?}");
        Context {
            inner: Rc::new(Inner {
                gl,
                diagnostics: Diagnostics::new(),
                capabilities,
            }),
        }
    }

    pub fn gl(&self) -> &dyn GlApi {
        self.inner.gl.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.inner.diagnostics
    }

    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::gl::recording::RecordingGl;

    #[test]
    fn depth_texture_needs_high_quality_and_driver_support() {
        let supported = Context::new(Rc::new(RecordingGl::new()), true);
        assert!(supported.capabilities().depth_texture);

        let low_quality = Context::new(Rc::new(RecordingGl::new()), false);
        assert!(!low_quality.capabilities().depth_texture);

        let unsupported = Context::new(Rc::new(RecordingGl::new().without_depth_texture()), true);
        assert!(!unsupported.capabilities().depth_texture);
    }

    #[test]
    fn clones_share_diagnostics() {
        let context = Context::new(Rc::new(RecordingGl::new()), true);
        let clone = context.clone();
        context
            .diagnostics()
            .warn_once("shader", "uMatrix", format_args!("missing"));
        assert!(clone.diagnostics().has_warned("shader", "uMatrix"));
    }
}
