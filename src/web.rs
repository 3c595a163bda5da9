//! Browser mount/unmount glue
//!
//! Wires an [`Engine`] to a canvas: WebGPU surface, pointer and keyboard
//! listeners, the animation-frame loop and the DOM HUD. Everything acquired
//! here is released by [`FlappyHandle::unmount`] (or by dropping the handle).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, EventTarget, HtmlCanvasElement, KeyboardEvent, PointerEvent};

use crate::audio::WebAudio;
use crate::consts::FRAME_DT;
use crate::engine::{Collaborators, Engine, HudSnapshot};
use crate::leaderboard::LocalLeaderboard;
use crate::platform::music::MediaElementPlayer;
use crate::platform::share::ClipboardSink;
use crate::platform::{Action, LocalStore, MusicPlayer, PlayerIdentity, action_for_key, action_for_pointer};
use crate::renderer::assets::ImageAssets;
use crate::renderer::{RenderState, build_scene, tessellate};
use crate::settings::Settings;
use crate::sim::GamePhase;
use crate::tuning::Tuning;

/// Host-provided configuration
#[derive(Debug, Clone, Default)]
pub struct MountOptions {
    /// URL prefix for sprite images
    pub asset_base: String,
    /// `<audio>` element to duck while mounted
    pub music_element_id: Option<String>,
    /// Tuning overrides as JSON
    pub tuning_json: Option<String>,
    /// Fixed RNG seed (defaults to the current time)
    pub seed: Option<u64>,
}

#[derive(Debug, Error)]
pub enum MountError {
    #[error("no browser window")]
    NoWindow,
    #[error("no canvas with id {0}")]
    NoCanvas(String),
    #[error("could not create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("could not create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// DOM overlay element ids
const HUD_SCORE: &str = "flappy-score";
const HUD_BEST: &str = "flappy-best";
const HUD_START: &str = "flappy-start";
const HUD_OVER: &str = "flappy-over";
const HUD_FINAL_SCORE: &str = "flappy-final-score";

/// Game instance holding all state
struct Game {
    engine: Engine,
    render: RenderState,
    assets: ImageAssets,
    canvas: HtmlCanvasElement,
    last_time: f64,
}

impl Game {
    /// One animation frame: simulate, draw, publish HUD changes
    fn frame(&mut self, time: f64) {
        let dt = if self.last_time > 0.0 {
            ((time - self.last_time) / 1000.0) as f32
        } else {
            FRAME_DT
        };
        self.last_time = time;

        self.sync_canvas_size();
        self.render.upload_ready_assets(&self.assets);
        self.engine.update(dt);

        let scene = build_scene(self.engine.state(), &self.render, self.engine.settings());
        let mesh = tessellate(&scene, self.render.size);
        match self.render.render(&mesh) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => {
                self.render.resize(self.render.size.0, self.render.size.1);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        if let Some(hud) = self.engine.take_hud_update() {
            update_hud(&hud);
        }
    }

    /// Match the backing store to the displayed size
    fn sync_canvas_size(&mut self) {
        let Some(window) = web_sys::window() else { return };
        let (width, height) = canvas_pixel_size(&window, &self.canvas);
        if (width, height) != self.render.size && width > 0 && height > 0 {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.render.resize(width, height);
        }
    }

    fn handle(&mut self, action: Action) {
        match action {
            Action::Jump => self.engine.jump(),
            Action::ToggleAutopilot => {
                let enabled = !self.engine.autopilot();
                self.engine.set_autopilot(enabled);
            }
        }
    }
}

fn canvas_pixel_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
    let dpr = window.device_pixel_ratio();
    (
        (canvas.client_width() as f64 * dpr) as u32,
        (canvas.client_height() as f64 * dpr) as u32,
    )
}

/// Update HUD elements in DOM
fn update_hud(hud: &HudSnapshot) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    set_text(&document, HUD_SCORE, &hud.score.to_string());
    set_text(&document, HUD_BEST, &hud.best.to_string());
    set_text(&document, HUD_FINAL_SCORE, &hud.score.to_string());
    set_visible(&document, HUD_START, hud.phase == GamePhase::Idle);
    set_visible(&document, HUD_OVER, hud.phase == GamePhase::Over);
}

fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

fn set_visible(document: &Document, id: &str, visible: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let _ = if visible {
            el.remove_attribute("hidden")
        } else {
            el.set_attribute("hidden", "")
        };
    }
}

/// A registered DOM listener, removed on drop
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    fn add(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Option<Self> {
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .ok()?;
        Some(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Everything owned by a live mount
struct Mounted {
    game: Rc<RefCell<Game>>,
    frame_id: Rc<Cell<Option<i32>>>,
    frame_callback: FrameCallback,
    listeners: Vec<Listener>,
}

impl Mounted {
    fn teardown(self) {
        if let (Some(window), Some(id)) = (web_sys::window(), self.frame_id.take()) {
            let _ = window.cancel_animation_frame(id);
        }
        // The callback holds a handle to itself; dropping it breaks the cycle
        self.frame_callback.borrow_mut().take();
        drop(self.listeners);
        // Last reference: the engine drops here, resuming music and closing audio
        drop(self.game);
        log::info!("Flappy unmounted");
    }
}

fn request_frame(callback: &FrameCallback) -> Option<i32> {
    let window = web_sys::window()?;
    let callback = callback.borrow();
    let callback = callback.as_ref()?;
    window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .ok()
}

fn start_loop(game: Rc<RefCell<Game>>, frame_id: Rc<Cell<Option<i32>>>) -> FrameCallback {
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let next = callback.clone();
    let ids = frame_id.clone();
    *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
        game.borrow_mut().frame(time);
        ids.set(request_frame(&next));
    }));
    frame_id.set(request_frame(&callback));
    callback
}

fn setup_input_handlers(canvas: &HtmlCanvasElement, game: &Rc<RefCell<Game>>) -> Vec<Listener> {
    let mut listeners = Vec::new();

    // Pointer covers mouse, touch and pen
    {
        let game = game.clone();
        listeners.extend(Listener::add(canvas, "pointerdown", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else { return };
            if let Some(action) = action_for_pointer(event.button()) {
                event.prevent_default();
                game.borrow_mut().handle(action);
            }
        }));
    }

    // Keyboard
    if let Some(window) = web_sys::window() {
        let game = game.clone();
        listeners.extend(Listener::add(&window, "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else { return };
            if event.repeat() {
                return;
            }
            if let Some(action) = action_for_key(&event.key()) {
                // Keep space from scrolling the page
                event.prevent_default();
                game.borrow_mut().handle(action);
            }
        }));
    }

    listeners
}

fn load_tuning(json: Option<&str>) -> Tuning {
    match json.map(Tuning::from_json) {
        Some(Ok(tuning)) => tuning,
        Some(Err(e)) => {
            log::warn!("Ignoring tuning overrides: {}", e);
            Tuning::default()
        }
        None => Tuning::default(),
    }
}

/// Mount the game onto a canvas and start the loop
pub async fn mount(canvas_id: &str, options: MountOptions) -> Result<FlappyHandle, MountError> {
    console_error_panic_hook::set_once();
    // Already initialised when the host mounts a second time
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or(MountError::NoWindow)?;
    let document = window.document().ok_or(MountError::NoWindow)?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(canvas_id)
        .and_then(|el| el.dyn_into().ok())
        .ok_or_else(|| MountError::NoCanvas(canvas_id.to_string()))?;

    let (width, height) = canvas_pixel_size(&window, &canvas);
    let (width, height) = (width.max(1), height.max(1));
    canvas.set_width(width);
    canvas.set_height(height);

    // Initialize WebGPU
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await?;
    log::info!("Using adapter: {:?}", adapter.get_info().name);
    let render = RenderState::new(surface, &adapter, width, height).await?;

    let store = LocalStore;
    let settings = Settings::load(&store);
    let player = PlayerIdentity::load_or_create(&store, &mut rand::rng(), &settings.player_name);
    let music = options
        .music_element_id
        .as_deref()
        .and_then(MediaElementPlayer::by_id)
        .map(|player| Box::new(player) as Box<dyn MusicPlayer>);
    let seed = options.seed.unwrap_or_else(|| js_sys::Date::now() as u64);

    let engine = Engine::new(
        load_tuning(options.tuning_json.as_deref()),
        seed,
        settings,
        Collaborators {
            audio: Box::new(WebAudio::new()),
            leaderboard: Box::new(LocalLeaderboard::load(store)),
            player,
            music,
        },
    );

    let game = Rc::new(RefCell::new(Game {
        engine,
        render,
        assets: ImageAssets::load(&options.asset_base),
        canvas: canvas.clone(),
        last_time: 0.0,
    }));
    update_hud(&game.borrow().engine.hud());

    let listeners = setup_input_handlers(&canvas, &game);
    let frame_id = Rc::new(Cell::new(None));
    let frame_callback = start_loop(game.clone(), frame_id.clone());

    log::info!("Flappy mounted on #{} (seed {})", canvas_id, seed);

    Ok(FlappyHandle {
        mounted: Some(Mounted {
            game,
            frame_id,
            frame_callback,
            listeners,
        }),
    })
}

/// JS entry point: `await mount(canvasId, assetBase, musicElementId)`
#[wasm_bindgen(js_name = mount)]
pub async fn mount_js(
    canvas_id: String,
    asset_base: String,
    music_element_id: Option<String>,
) -> Result<FlappyHandle, JsValue> {
    let options = MountOptions {
        asset_base,
        music_element_id,
        ..MountOptions::default()
    };
    mount(&canvas_id, options)
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Host handle for a mounted game
#[wasm_bindgen]
pub struct FlappyHandle {
    mounted: Option<Mounted>,
}

impl FlappyHandle {
    fn with_game<T>(&self, f: impl FnOnce(&mut Game) -> T) -> Option<T> {
        let mounted = self.mounted.as_ref()?;
        let mut game = mounted.game.try_borrow_mut().ok()?;
        Some(f(&mut game))
    }
}

#[wasm_bindgen]
impl FlappyHandle {
    pub fn jump(&self) {
        self.with_game(|g| g.engine.jump());
    }

    pub fn restart(&self) {
        self.with_game(|g| g.engine.restart());
    }

    /// Copy the score summary to the clipboard and return it
    pub fn share(&self) -> String {
        self.with_game(|g| g.engine.share(&mut ClipboardSink))
            .unwrap_or_default()
    }

    pub fn score(&self) -> u32 {
        self.with_game(|g| g.engine.state().score).unwrap_or(0)
    }

    pub fn best(&self) -> u32 {
        self.with_game(|g| g.engine.best_score()).unwrap_or(0)
    }

    #[wasm_bindgen(js_name = setAutopilot)]
    pub fn set_autopilot(&self, enabled: bool) {
        self.with_game(|g| g.engine.set_autopilot(enabled));
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&self, muted: bool) {
        self.with_game(|g| g.engine.update_settings(&LocalStore, |s| s.muted = muted));
    }

    /// Master volume, clamped to 0..=1
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f32) {
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
        self.with_game(|g| {
            g.engine
                .update_settings(&LocalStore, |s| s.master_volume = volume)
        });
    }

    #[wasm_bindgen(js_name = setScreenShake)]
    pub fn set_screen_shake(&self, enabled: bool) {
        self.with_game(|g| {
            g.engine
                .update_settings(&LocalStore, |s| s.screen_shake = enabled)
        });
    }

    #[wasm_bindgen(js_name = setReducedMotion)]
    pub fn set_reduced_motion(&self, enabled: bool) {
        self.with_game(|g| {
            g.engine
                .update_settings(&LocalStore, |s| s.reduced_motion = enabled)
        });
    }

    /// Leaderboard display name; blank names are ignored
    #[wasm_bindgen(js_name = setPlayerName)]
    pub fn set_player_name(&self, name: String) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let name = name.to_string();
        self.with_game(|g| g.engine.update_settings(&LocalStore, |s| s.player_name = name));
    }

    /// Stop the loop and release everything. Safe to call twice.
    pub fn unmount(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.teardown();
        }
    }
}

impl Drop for FlappyHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}
