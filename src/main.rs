use std::error::Error;
use std::ffi::c_void;
use std::fmt::Display;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use glam::{Mat4, Vec2, Vec3};
use sdl2::event::{Event, WindowEvent};
use sdl2::mouse::MouseButton;
use sdl2::video::{GLProfile, Window};
use sdl2::EventPump;

use mapscene_gl::events::{Emitter, Signal};
use mapscene_gl::logging::init_logging;
use mapscene_gl::renderer::gl::GlesContext;
use mapscene_gl::renderer::{Context, Picking, Renderer};
use mapscene_gl::scene::{Mesh, MeshData, SceneIndex, Sun, ViewState};
use mapscene_gl::RenderConfig;

#[cfg(target_family = "wasm")]
mod emscripten_h;

const GRID: i32 = 5;
const BLOCK_SIZE: f32 = 40.0;
const FADE_IN: Duration = Duration::from_secs(1);

/// Identity of a picked block: its grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BlockId(i32, i32);

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig {
            frame_control: true,
            ..RenderConfig::default()
        },
    };
    init_logging(config.log_filter.as_deref());

    let sdl_context = sdl2::init().map_err(SdlErr)?;
    let video_subsystem = sdl_context.video().map_err(SdlErr)?;
    let gl_attr = video_subsystem.gl_attr();
    gl_attr.set_context_profile(GLProfile::GLES);
    gl_attr.set_context_version(3, 0);
    // Linear->SRGB conversion is done in shader, thanks to lacking WebGL support.
    gl_attr.set_framebuffer_srgb_compatible(false);
    let window = video_subsystem
        .window(env!("CARGO_PKG_NAME"), 948, 533)
        .resizable()
        .opengl()
        .build()?;
    let _gl_context = window.gl_create_context().map_err(SdlErr)?;
    let event_pump = sdl_context.event_pump().map_err(SdlErr)?;

    let gl = GlesContext::load_with(|s| video_subsystem.gl_get_proc_address(s) as *const c_void);
    if let Err(err) = video_subsystem.gl_set_swap_interval(1) {
        log::warn!("vsync unavailable: {err}");
    }
    let context = Context::new(Rc::new(gl), config.high_quality);
    let mut state = State::new(&context, &config, window, event_pump)?;

    #[cfg(target_family = "wasm")]
    emscripten_h::set_main_loop(move || state.run_frame());
    #[cfg(not(target_family = "wasm"))]
    loop {
        state.run_frame()
    }
}

struct State {
    window: Window,
    event_pump: EventPump,
    renderer: Renderer,
    picking: Picking<BlockId>,
    pick: Option<Receiver<Option<BlockId>>>,
    scene: SceneIndex,
    view: ViewState,
    sun: Sun,
    map: Rc<Emitter>,
    _app: Rc<Emitter>,
    started: Instant,
}

impl State {
    fn new(
        context: &Context,
        config: &RenderConfig,
        window: Window,
        event_pump: EventPump,
    ) -> anyhow::Result<State> {
        let mut renderer = Renderer::new(context, config)?;
        let app = Rc::new(Emitter::new());
        let map = Rc::new(Emitter::new());
        renderer.frame_control().connect(app.clone(), map.clone());

        let mut picking = Picking::new(context, config.picking_size as i32)?;
        let mut scene = SceneIndex::new();
        scene.add(Rc::new(city_blocks(context, &mut picking)?));
        app.emit(Signal::FeatureLoaded);
        renderer
            .frame_control()
            .request_frames_until(Instant::now() + FADE_IN);

        let (width, height) = window.drawable_size();
        Ok(State {
            view: camera(width as i32, height as i32),
            sun: sun(),
            window,
            event_pump,
            renderer,
            picking,
            pick: None,
            scene,
            map,
            _app: app,
            started: Instant::now(),
        })
    }

    fn run_frame(&mut self) {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => std::process::exit(0),
                Event::Window {
                    win_event: WindowEvent::Resized(..),
                    ..
                } => {
                    let (width, height) = self.window.drawable_size();
                    let (width, height) = (width as i32, height as i32);
                    self.renderer.resize(width, height);
                    self.view = ViewState {
                        time: self.view.time,
                        ..camera(width, height)
                    };
                    self.map.emit(Signal::Resize);
                }
                Event::MouseButtonDown {
                    mouse_btn: MouseButton::Left,
                    x,
                    y,
                    ..
                } => {
                    // Mouse positions are in window units, the viewport in pixels.
                    let (window_width, _) = self.window.size();
                    let scale = self.view.viewport.0 as f32 / window_width.max(1) as f32;
                    self.pick = Some(self.picking.get_target(x as f32 * scale, y as f32 * scale));
                }
                _ => {}
            }
        }

        self.view.time = self.started.elapsed().as_secs_f32();
        self.picking.process_pending(&self.scene.snapshot(), &self.view);
        self.check_pick();

        if self.renderer.render(&self.scene, &self.view, &self.sun) {
            self.window.gl_swap_window();
        } else {
            #[cfg(not(target_family = "wasm"))]
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn check_pick(&mut self) {
        let Some(receiver) = &self.pick else {
            return;
        };
        let target = match receiver.try_recv() {
            Ok(target) => target,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => None,
        };
        self.pick = None;
        match target {
            Some(block) => log::info!("picked {block:?}"),
            None => log::info!("picked nothing"),
        }
        let color = target.map(|block| self.picking.id_to_color(&block));
        self.renderer.buildings().set_highlight(color);
        self.map.emit(Signal::Change);
    }
}

fn city_blocks(context: &Context, picking: &mut Picking<BlockId>) -> anyhow::Result<Mesh> {
    let mut data = MeshData::default();
    let half = GRID as f32 * BLOCK_SIZE / 2.0;
    for row in 0..GRID {
        for column in 0..GRID {
            let min = Vec2::new(column as f32, row as f32) * BLOCK_SIZE - half;
            let max = min + Vec2::splat(BLOCK_SIZE * 0.7);
            let height = 10.0 + ((row * 7 + column * 3) % 5) as f32 * 12.0;
            let tint = 0.55 + 0.05 * ((row + column) % 4) as f32;
            let id = picking.id_to_color(&BlockId(column, row));
            data.add_extruded_rect(min, max, height, Vec3::splat(tint), id);
        }
    }
    data.fade_in(0.0, FADE_IN.as_secs_f32());
    let mesh = Mesh::new(context, &data, 0.0, 22.0)?;
    mesh.set_matrix(Some(Mat4::IDENTITY));
    Ok(mesh)
}

fn camera(width: i32, height: i32) -> ViewState {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    let eye = Vec3::new(0.0, -260.0, 220.0);
    ViewState {
        viewport: (width, height),
        view_matrix: Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Z),
        proj_matrix: Mat4::perspective_rh_gl(45f32.to_radians(), aspect, 1.0, 2000.0),
        view_dir_on_map: Vec2::Y,
        lower_left_on_map: Vec2::new(-200.0, -200.0),
        fog_distance: 600.0,
        fog_blur_distance: 200.0,
        ..ViewState::default()
    }
}

fn sun() -> Sun {
    let direction = Vec3::new(0.3, -0.4, 0.87).normalize();
    Sun {
        direction,
        view_matrix: Mat4::look_at_rh(direction * 800.0, Vec3::ZERO, Vec3::Z),
        proj_matrix: Mat4::orthographic_rh_gl(-250.0, 250.0, -250.0, 250.0, 1.0, 1600.0),
    }
}

#[derive(Debug)]
pub struct SdlErr(String);
impl Display for SdlErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sdl error: {}", self.0)
    }
}
impl Error for SdlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
