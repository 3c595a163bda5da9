//! Score/lifecycle controller
//!
//! Owns the simulation state and is the only caller of [`tick`]. Hosts feed
//! it wall-clock deltas and input; it turns sim events into side effects
//! (tones, leaderboard submission, best score) and publishes a small HUD
//! projection that only changes when the score or phase does.

use crate::audio::{AudioBackend, ToneKind, play_tone};
use crate::consts::{FRAME_DT, GAME_ID, MAX_FRAME_DELTA, MAX_SUBSTEPS};
use crate::leaderboard::{Leaderboard, RankedEntry};
use crate::platform::{
    KeyValueStore, MusicDuck, MusicPlayer, PlayerIdentity, ShareSink, score_summary,
};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Read-only projection for overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub score: u32,
    pub best: u32,
}

/// Everything the engine needs from the outside world
pub struct Collaborators {
    pub audio: Box<dyn AudioBackend>,
    pub leaderboard: Box<dyn Leaderboard>,
    pub player: PlayerIdentity,
    /// Site music to duck while mounted
    pub music: Option<Box<dyn MusicPlayer>>,
}

/// Game instance holding all state
pub struct Engine {
    state: GameState,
    input: TickInput,
    accumulator: f32,
    settings: Settings,
    audio: Box<dyn AudioBackend>,
    leaderboard: Box<dyn Leaderboard>,
    player: PlayerIdentity,
    best_score: u32,
    last_hud: Option<HudSnapshot>,
    // Dropped with the engine, which resumes the music
    _music: Option<MusicDuck>,
}

impl Engine {
    pub fn new(tuning: Tuning, seed: u64, settings: Settings, collaborators: Collaborators) -> Self {
        let Collaborators {
            audio,
            leaderboard,
            player,
            music,
        } = collaborators;

        let best_score = leaderboard
            .get_rank(GAME_ID, &player.id)
            .map(|r| r.score)
            .unwrap_or(0);

        log::info!("Engine created (seed {}, best {})", seed, best_score);

        Self {
            state: GameState::new(tuning, seed),
            input: TickInput::default(),
            accumulator: 0.0,
            settings,
            audio,
            leaderboard,
            player,
            best_score,
            last_hud: None,
            _music: music.map(MusicDuck::engage),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.player.name = settings.player_name.clone();
        self.settings = settings;
    }

    /// Edit the current settings and persist the result. A failed write
    /// still applies the change for this session.
    pub fn update_settings(&mut self, store: &dyn KeyValueStore, edit: impl FnOnce(&mut Settings)) {
        let mut settings = self.settings.clone();
        edit(&mut settings);
        if let Err(e) = settings.save(store) {
            log::warn!("Could not save settings: {}", e);
        }
        self.set_settings(settings);
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn leaderboard(&self) -> &dyn Leaderboard {
        self.leaderboard.as_ref()
    }

    pub fn player_rank(&self) -> Option<RankedEntry> {
        self.leaderboard.get_rank(GAME_ID, &self.player.id)
    }

    /// Queue a jump; also wakes the audio output (needs a user gesture)
    pub fn jump(&mut self) {
        self.audio.resume();
        self.input.jump = true;
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
        log::info!("Autopilot: {}", enabled);
    }

    pub fn autopilot(&self) -> bool {
        self.input.autopilot
    }

    /// Back to the hover screen, from any phase
    pub fn restart(&mut self) {
        self.state.reset();
        self.accumulator = 0.0;
        self.input.jump = false;
        log::info!("Game restarted");
    }

    /// Run simulation ticks for a wall-clock delta (seconds)
    pub fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DELTA);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= FRAME_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input);
            self.accumulator -= FRAME_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.jump = false;

            self.handle_events();
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(FRAME_DT);
        }
    }

    fn handle_events(&mut self) {
        let volume = self.settings.effective_volume();
        for event in self.state.drain_events() {
            match event {
                GameEvent::Started => {}
                GameEvent::Jumped => play_tone(self.audio.as_mut(), ToneKind::Jump, volume),
                GameEvent::Scored { .. } => play_tone(self.audio.as_mut(), ToneKind::Score, volume),
                GameEvent::Died { score } => {
                    play_tone(self.audio.as_mut(), ToneKind::Death, volume);
                    self.record_score(score);
                }
            }
        }
    }

    /// Best-effort: failures are logged and never reach the player
    fn record_score(&mut self, score: u32) {
        if score > self.best_score {
            self.best_score = score;
        }
        if let Err(e) =
            self.leaderboard
                .submit_score(GAME_ID, &self.player.id, &self.player.name, score)
        {
            log::warn!("Score submission failed: {}", e);
        }
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            phase: self.state.phase,
            score: self.state.score,
            best: self.best_score,
        }
    }

    /// The HUD snapshot if it changed since the last call
    pub fn take_hud_update(&mut self) -> Option<HudSnapshot> {
        let hud = self.hud();
        if self.last_hud == Some(hud) {
            return None;
        }
        self.last_hud = Some(hud);
        Some(hud)
    }

    pub fn share_summary(&self) -> String {
        let rank = self.player_rank().map(|r| r.rank);
        score_summary(self.state.score, self.best_score, rank)
    }

    /// Hand the summary to a share target and return it
    pub fn share(&self, sink: &mut dyn ShareSink) -> String {
        let text = self.share_summary();
        sink.share(&text);
        text
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.audio.close();
        log::info!("Engine torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::tests::RecordingAudio;
    use crate::audio::tone_spec;
    use crate::leaderboard::{LeaderboardError, LeaderboardEntry, LocalLeaderboard};
    use crate::platform::MemoryStore;
    use crate::platform::music::tests::FakePlayer;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shares the recording with the test after the engine takes ownership
    #[derive(Clone, Default)]
    struct SharedAudio(Rc<RefCell<RecordingAudio>>);

    impl AudioBackend for SharedAudio {
        fn resume(&mut self) {
            self.0.borrow_mut().resume();
        }
        fn play(&mut self, spec: &crate::audio::ToneSpec, volume: f32) {
            self.0.borrow_mut().play(spec, volume);
        }
        fn close(&mut self) {
            self.0.borrow_mut().close();
        }
    }

    /// Always fails, to prove submission errors stay invisible
    struct BrokenLeaderboard;

    impl Leaderboard for BrokenLeaderboard {
        fn submit_score(&mut self, _: &str, _: &str, _: &str, _: u32) -> Result<(), LeaderboardError> {
            Err(LeaderboardError::EmptyName)
        }
        fn get_top(&self, _: &str) -> Vec<LeaderboardEntry> {
            Vec::new()
        }
        fn get_rank(&self, _: &str, _: &str) -> Option<RankedEntry> {
            None
        }
    }

    fn player() -> PlayerIdentity {
        PlayerIdentity {
            id: "player-1".into(),
            name: "Ami".into(),
        }
    }

    fn engine_with(audio: SharedAudio, leaderboard: Box<dyn Leaderboard>) -> Engine {
        Engine::new(
            Tuning::default(),
            7,
            Settings::default(),
            Collaborators {
                audio: Box::new(audio),
                leaderboard,
                player: player(),
                music: None,
            },
        )
    }

    fn engine() -> (Engine, SharedAudio) {
        let audio = SharedAudio::default();
        let lb = Box::new(LocalLeaderboard::load(MemoryStore::new()));
        (engine_with(audio.clone(), lb), audio)
    }

    fn step(engine: &mut Engine, frames: u32) {
        for _ in 0..frames {
            engine.update(FRAME_DT + 1e-6);
        }
    }

    #[test]
    fn first_jump_starts_and_wakes_audio() {
        let (mut engine, audio) = engine();
        engine.jump();
        step(&mut engine, 1);
        assert_eq!(engine.state().phase, GamePhase::Running);
        assert_eq!(audio.0.borrow().resumed, 1);
    }

    #[test]
    fn jump_while_running_plays_jump_tone() {
        let (mut engine, audio) = engine();
        engine.jump();
        step(&mut engine, 1);
        engine.jump();
        step(&mut engine, 1);
        let played = &audio.0.borrow().played;
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].0, *tone_spec(ToneKind::Jump));
    }

    #[test]
    fn jump_is_consumed_once() {
        let (mut engine, _audio) = engine();
        engine.jump();
        step(&mut engine, 1);
        engine.jump();
        step(&mut engine, 3);
        // Only one impulse: velocity grew by gravity on the two frames after it
        let t = &engine.state().tuning;
        let expected = t.jump_impulse + 3.0 * t.gravity;
        assert!((engine.state().player.velocity - expected).abs() < 1e-4);
    }

    #[test]
    fn death_submits_score_and_plays_death_tone() {
        let (mut engine, audio) = engine();
        engine.jump();
        step(&mut engine, 200);
        assert_eq!(engine.state().phase, GamePhase::Over);

        let rank = engine.player_rank().expect("score submitted");
        assert_eq!(rank.score, 0);
        assert_eq!(rank.rank, 1);
        let deaths = audio
            .0
            .borrow()
            .played
            .iter()
            .filter(|(spec, _)| *spec == *tone_spec(ToneKind::Death))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn jump_after_death_does_nothing_until_restart() {
        let (mut engine, _audio) = engine();
        engine.jump();
        step(&mut engine, 200);
        engine.jump();
        step(&mut engine, 1);
        assert_eq!(engine.state().phase, GamePhase::Over);

        engine.restart();
        assert_eq!(engine.state().phase, GamePhase::Idle);
        assert_eq!(engine.state().score, 0);
        assert!(engine.state().obstacles.is_empty());
    }

    #[test]
    fn failed_submission_is_swallowed() {
        let audio = SharedAudio::default();
        let mut engine = engine_with(audio, Box::new(BrokenLeaderboard));
        engine.state.score = 4;
        engine.jump();
        step(&mut engine, 200);
        assert_eq!(engine.state().phase, GamePhase::Over);
        assert!(engine.best_score() >= 4);
    }

    #[test]
    fn hud_only_reports_changes() {
        let (mut engine, _audio) = engine();
        assert!(engine.take_hud_update().is_some());
        step(&mut engine, 10);
        assert!(engine.take_hud_update().is_none());
        engine.jump();
        step(&mut engine, 1);
        assert_eq!(
            engine.take_hud_update().map(|h| h.phase),
            Some(GamePhase::Running)
        );
    }

    #[test]
    fn muted_settings_play_nothing() {
        let (mut engine, audio) = engine();
        engine.set_settings(Settings {
            muted: true,
            ..Settings::default()
        });
        engine.jump();
        step(&mut engine, 1);
        engine.jump();
        step(&mut engine, 1);
        assert!(audio.0.borrow().played.is_empty());
    }

    #[test]
    fn updated_settings_persist_and_rename_player() {
        let (mut engine, audio) = engine();
        let store = MemoryStore::new();
        engine.update_settings(&store, |s| {
            s.master_volume = 0.5;
            s.player_name = "Noor".into();
        });

        let reloaded = Settings::load(&store);
        assert_eq!(&reloaded, engine.settings());
        assert_eq!(reloaded.master_volume, 0.5);

        engine.jump();
        step(&mut engine, 1);
        engine.jump();
        step(&mut engine, 1);
        let (_, volume) = audio.0.borrow().played[0].clone();
        assert!((volume - 0.5).abs() < 1e-6);

        step(&mut engine, 200);
        assert_eq!(engine.player_rank().unwrap().player_name, "Noor");
    }

    #[test]
    fn invalid_tuning_falls_back_to_defaults() {
        let engine = Engine::new(
            Tuning {
                spawn_interval: 0,
                ..Tuning::default()
            },
            1,
            Settings::default(),
            Collaborators {
                audio: Box::new(SharedAudio::default()),
                leaderboard: Box::new(LocalLeaderboard::load(MemoryStore::new())),
                player: player(),
                music: None,
            },
        );
        assert_eq!(engine.state().tuning, Tuning::default());
    }

    #[test]
    fn large_delta_is_capped() {
        let (mut engine, _audio) = engine();
        engine.update(5.0);
        assert!(engine.state().clock_ticks <= MAX_SUBSTEPS as u64);
    }

    #[test]
    fn teardown_restores_music_and_closes_audio_mid_game() {
        let music = FakePlayer::default();
        music.playing.set(true);
        let audio = SharedAudio::default();
        let mut engine = Engine::new(
            Tuning::default(),
            1,
            Settings::default(),
            Collaborators {
                audio: Box::new(audio.clone()),
                leaderboard: Box::new(LocalLeaderboard::load(MemoryStore::new())),
                player: player(),
                music: Some(Box::new(music.clone())),
            },
        );
        assert!(!music.playing.get());
        engine.jump();
        step(&mut engine, 5);
        assert_eq!(engine.state().phase, GamePhase::Running);

        drop(engine);
        assert!(music.playing.get());
        assert!(audio.0.borrow().closed);
    }

    #[derive(Default)]
    struct CollectSink(Vec<String>);

    impl ShareSink for CollectSink {
        fn share(&mut self, text: &str) {
            self.0.push(text.to_string());
        }
    }

    #[test]
    fn share_hands_summary_to_sink() {
        let (engine, _audio) = engine();
        let mut sink = CollectSink::default();
        let text = engine.share(&mut sink);
        assert_eq!(sink.0, vec![text.clone()]);
        assert!(text.contains("scored 0"));
    }

    #[test]
    fn best_score_seeded_from_leaderboard() {
        let mut lb = LocalLeaderboard::load(MemoryStore::new());
        lb.submit_score(GAME_ID, "player-1", "Ami", 42).unwrap();
        let engine = Engine::new(
            Tuning::default(),
            1,
            Settings::default(),
            Collaborators {
                audio: Box::new(SharedAudio::default()),
                leaderboard: Box::new(lb),
                player: player(),
                music: None,
            },
        );
        assert_eq!(engine.best_score(), 42);
        let summary = engine.share_summary();
        assert!(summary.contains("best: 42"));
        assert!(summary.contains("#1"));
    }
}
