//! Flappy entry point
//!
//! On the web this mounts the game on the page's `#canvas`. Natively it runs
//! a headless autopilot round and logs the result:
//!
//! ```text
//! flappy-engine [tuning.json] [seconds]
//! ```

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod page {
    use std::cell::RefCell;

    use flappy_engine::web::{FlappyHandle, MountOptions, mount};

    thread_local! {
        // Lives until the page goes away
        static PAGE_GAME: RefCell<Option<FlappyHandle>> = const { RefCell::new(None) };
    }

    pub async fn run() {
        let options = MountOptions {
            asset_base: "assets".to_string(),
            music_element_id: Some("site-music".to_string()),
            ..MountOptions::default()
        };
        match mount("canvas", options).await {
            Ok(handle) => PAGE_GAME.with(|g| *g.borrow_mut() = Some(handle)),
            Err(e) => log::error!("Failed to start: {}", e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    page::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Flappy (native) starting headless autopilot run...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => flappy_engine::Tuning::default(),
    };
    let seconds: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60);

    headless::run(tuning, seconds);
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> Result<flappy_engine::Tuning, String> {
    let json = std::fs::read_to_string(path).map_err(|e| format!("Cannot read {}: {}", path, e))?;
    flappy_engine::Tuning::from_json(&json).map_err(|e| format!("{}: {}", path, e))
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use flappy_engine::audio::NullAudio;
    use flappy_engine::consts::{FRAME_DT, GAME_ID};
    use flappy_engine::engine::Collaborators;
    use flappy_engine::platform::{MemoryStore, PlayerIdentity};
    use flappy_engine::renderer::{NoAssets, build_scene, tessellate};
    use flappy_engine::{Engine, LocalLeaderboard, Settings, Tuning};

    pub fn run(tuning: Tuning, seconds: u32) {
        let store = MemoryStore::new();
        let settings = Settings::default();
        let player = PlayerIdentity::load_or_create(&store, &mut rand::rng(), "Autopilot");
        let seed = rand::random::<u64>();

        let mut engine = Engine::new(
            tuning,
            seed,
            settings,
            Collaborators {
                audio: Box::new(NullAudio),
                leaderboard: Box::new(LocalLeaderboard::load(MemoryStore::new())),
                player,
                music: None,
            },
        );
        engine.set_autopilot(true);

        let frames = seconds * 60;
        for _ in 0..frames {
            engine.update(FRAME_DT);
            if let Some(hud) = engine.take_hud_update() {
                log::debug!("HUD: {:?}", hud);
            }
            if engine.state().is_over() {
                break;
            }
        }

        let state = engine.state();
        let scene = build_scene(state, &NoAssets, engine.settings());
        let mesh = tessellate(&scene, (400, 600));
        log::info!(
            "Finished after {} frames in phase {:?} (seed {})",
            state.clock_ticks,
            state.phase,
            seed
        );
        log::info!(
            "Last frame: {} draw commands, {} vertices",
            scene.commands.len(),
            mesh.vertices.len()
        );
        for (i, entry) in engine.leaderboard().get_top(GAME_ID).iter().enumerate() {
            log::info!("#{} {} {}", i + 1, entry.player_name, entry.score);
        }
        println!("{}", engine.share_summary());
    }
}
