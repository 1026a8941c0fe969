//! Decides whether the next tick is worth a GPU frame.
//!
//! Anything that causes a visual change either asks for frames through a
//! [`FrameRequester`], or emits one of the signals [`FrameControl`] listens to
//! once enabled. The render loop calls [`FrameControl::poll`] every tick.
//! Disabled (the default), every poll says a frame is due.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::events::{Emitter, ListenerId, Signal};

const APP_SIGNALS: [Signal; 1] = [Signal::FeatureLoaded];
const MAP_SIGNALS: [Signal; 2] = [Signal::Change, Signal::Resize];

#[derive(Debug, Default)]
struct Requests {
    frames: Cell<u32>,
    until: Cell<Option<Instant>>,
}

/// Shared handle for asking the renderer to draw. Requests only ever raise
/// what is already pending, so repeated requests don't pile up.
#[derive(Debug, Clone, Default)]
pub struct FrameRequester {
    requests: Rc<Requests>,
}

impl FrameRequester {
    pub fn request_frame(&self) {
        self.request_frames(1);
    }

    /// Makes sure at least `count` more frames get drawn.
    pub fn request_frames(&self, count: u32) {
        if self.requests.frames.get() < count {
            self.requests.frames.set(count);
        }
    }

    /// Keeps drawing every tick until `deadline` has passed.
    pub fn request_frames_until(&self, deadline: Instant) {
        match self.requests.until.get() {
            Some(current) if current >= deadline => {}
            _ => self.requests.until.set(Some(deadline)),
        }
    }

    pub fn pending_frames(&self) -> u32 {
        self.requests.frames.get()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.requests.until.get()
    }
}

struct Listeners {
    emitter: Rc<Emitter>,
    ids: Vec<ListenerId>,
}

pub struct FrameControl {
    enabled: bool,
    requester: FrameRequester,
    app: Option<Rc<Emitter>>,
    map: Option<Rc<Emitter>>,
    app_listeners: Option<Listeners>,
    map_listeners: Option<Listeners>,
}

impl FrameControl {
    pub fn new() -> FrameControl {
        FrameControl {
            enabled: false,
            requester: FrameRequester::default(),
            app: None,
            map: None,
            app_listeners: None,
            map_listeners: None,
        }
    }

    /// Supplies the emitters whose signals should trigger frames.
    pub fn connect(&mut self, app: Rc<Emitter>, map: Rc<Emitter>) {
        self.remove_listeners();
        self.app = Some(app);
        self.map = Some(map);
        if self.enabled {
            self.add_listeners();
        }
    }

    /// Switches to drawing only requested frames. The first frame after
    /// switching is always drawn.
    pub fn enable(&mut self) {
        log::debug!("frame control enabled");
        self.enabled = true;
        self.add_listeners();
        self.requester.request_frame();
    }

    /// Switches back to drawing every tick.
    pub fn disable(&mut self) {
        log::debug!("frame control disabled");
        self.enabled = false;
        self.remove_listeners();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn requester(&self) -> FrameRequester {
        self.requester.clone()
    }

    pub fn request_frame(&self) {
        self.requester.request_frame();
    }

    pub fn request_frames(&self, count: u32) {
        self.requester.request_frames(count);
    }

    pub fn request_frames_until(&self, deadline: Instant) {
        self.requester.request_frames_until(deadline);
    }

    fn attach(emitter: &Rc<Emitter>, signals: &[Signal], requester: &FrameRequester) -> Listeners {
        let ids = signals
            .iter()
            .map(|&signal| {
                let requester = requester.clone();
                emitter.on(signal, move || requester.request_frame())
            })
            .collect();
        Listeners {
            emitter: emitter.clone(),
            ids,
        }
    }

    fn add_listeners(&mut self) {
        let (Some(app), Some(map)) = (&self.app, &self.map) else {
            return;
        };
        if self.app_listeners.is_none() {
            self.app_listeners = Some(Self::attach(app, &APP_SIGNALS, &self.requester));
        }
        if self.map_listeners.is_none() {
            self.map_listeners = Some(Self::attach(map, &MAP_SIGNALS, &self.requester));
        }
    }

    fn remove_listeners(&mut self) {
        for listeners in [self.app_listeners.take(), self.map_listeners.take()]
            .into_iter()
            .flatten()
        {
            for id in listeners.ids {
                listeners.emitter.off(id);
            }
        }
    }

    fn listening(&self) -> bool {
        self.app_listeners.is_some() && self.map_listeners.is_some()
    }

    /// Whether a frame should be drawn now. May use up one requested frame.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }

        // Whoever enabled us may have done so before the emitters existed.
        if !self.listening() {
            self.add_listeners();
            return true;
        }

        let frames = &self.requester.requests.frames;
        if frames.get() > 0 {
            frames.set(frames.get() - 1);
            return true;
        }

        matches!(self.requester.deadline(), Some(deadline) if now <= deadline)
    }
}

impl Default for FrameControl {
    fn default() -> Self {
        FrameControl::new()
    }
}

impl Drop for FrameControl {
    fn drop(&mut self) {
        self.remove_listeners();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn connected() -> (FrameControl, Rc<Emitter>, Rc<Emitter>) {
        let app = Rc::new(Emitter::new());
        let map = Rc::new(Emitter::new());
        let mut control = FrameControl::new();
        control.connect(app.clone(), map.clone());
        (control, app, map)
    }

    #[test]
    fn frame_requests_take_the_maximum() {
        let control = FrameControl::new();
        control.request_frames(3);
        control.request_frames(2);
        assert_eq!(control.requester().pending_frames(), 3);
        control.request_frame();
        control.request_frame();
        assert_eq!(control.requester().pending_frames(), 3);
        control.request_frames(5);
        assert_eq!(control.requester().pending_frames(), 5);
    }

    #[test]
    fn deadlines_take_the_maximum() {
        let control = FrameControl::new();
        let now = Instant::now();
        let later = now + Duration::from_secs(2);
        control.request_frames_until(later);
        control.request_frames_until(now);
        assert_eq!(control.requester().deadline(), Some(later));
    }

    #[test]
    fn disabled_always_renders_and_keeps_requests() {
        let mut control = FrameControl::new();
        let deadline = Instant::now() + Duration::from_secs(1);
        control.request_frames(2);
        control.request_frames_until(deadline);
        for _ in 0..5 {
            assert!(control.poll());
        }
        assert_eq!(control.requester().pending_frames(), 2);
        assert_eq!(control.requester().deadline(), Some(deadline));
    }

    #[test]
    fn enabled_goes_idle_after_the_seeded_frame() {
        let (mut control, _app, _map) = connected();
        control.enable();
        assert!(control.poll());
        assert!(!control.poll());
        assert!(!control.poll());
        control.request_frames(2);
        assert!(control.poll());
        assert!(control.poll());
        assert!(!control.poll());
    }

    #[test]
    fn renders_until_the_deadline() {
        let (mut control, _app, _map) = connected();
        control.enable();
        let now = Instant::now();
        assert!(control.poll_at(now));
        control.request_frames_until(now + Duration::from_millis(100));
        assert!(control.poll_at(now + Duration::from_millis(50)));
        assert!(control.poll_at(now + Duration::from_millis(100)));
        assert!(!control.poll_at(now + Duration::from_millis(101)));
    }

    #[test]
    fn signals_request_frames() {
        let (mut control, app, map) = connected();
        control.enable();
        assert!(control.poll());
        assert!(!control.poll());

        map.emit(Signal::Resize);
        map.emit(Signal::Change);
        assert!(control.poll());
        assert!(!control.poll());

        app.emit(Signal::FeatureLoaded);
        assert!(control.poll());
        assert!(!control.poll());
    }

    #[test]
    fn disable_detaches_listeners() {
        let (mut control, app, map) = connected();
        control.enable();
        assert_eq!(app.listener_count() + map.listener_count(), 3);
        control.disable();
        assert_eq!(app.listener_count() + map.listener_count(), 0);
    }

    #[test]
    fn late_connection_is_picked_up_by_poll() {
        let mut control = FrameControl::new();
        control.enable();
        // Without emitters there is nothing to wait for, so keep drawing.
        assert!(control.poll());
        assert!(control.poll());

        let app = Rc::new(Emitter::new());
        let map = Rc::new(Emitter::new());
        control.connect(app.clone(), map.clone());
        assert_eq!(map.listener_count(), 2);
        // The frame requested by enable() is still pending.
        assert!(control.poll());
        assert!(!control.poll());
    }

    #[test]
    fn requester_handles_share_state() {
        let (mut control, _app, _map) = connected();
        control.enable();
        assert!(control.poll());
        let requester = control.requester();
        requester.request_frame();
        assert!(control.poll());
        assert!(!control.poll());
    }
}
