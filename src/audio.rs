//! Procedural sound effects
//!
//! Every tone is described by a [`ToneSpec`] in a static table; a backend
//! turns that description into sound. No sample assets, no persistent audio graph.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToneKind {
    /// Player flapped
    Jump,
    /// Obstacle cleared
    Score,
    /// Run ended
    Death,
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// Declarative description of a single synthesized tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub waveform: Waveform,
    pub start_hz: f32,
    /// Exponential ramp target reached at the end of the tone
    pub end_hz: Option<f32>,
    /// Linear attack from silence to `peak_gain`
    pub attack_secs: f64,
    pub peak_gain: f32,
    /// Total length; the gain decays exponentially from the attack peak to the end
    pub duration_secs: f64,
}

/// Gain floor for exponential decay (Web Audio cannot ramp to zero)
pub const GAIN_FLOOR: f32 = 0.001;

const JUMP: ToneSpec = ToneSpec {
    waveform: Waveform::Sine,
    start_hz: 420.0,
    end_hz: Some(780.0),
    attack_secs: 0.005,
    peak_gain: 0.25,
    duration_secs: 0.1,
};

const SCORE: ToneSpec = ToneSpec {
    waveform: Waveform::Square,
    start_hz: 880.0,
    end_hz: Some(1320.0),
    attack_secs: 0.005,
    peak_gain: 0.12,
    duration_secs: 0.12,
};

const DEATH: ToneSpec = ToneSpec {
    waveform: Waveform::Sawtooth,
    start_hz: 400.0,
    end_hz: Some(80.0),
    attack_secs: 0.01,
    peak_gain: 0.2,
    duration_secs: 0.4,
};

/// Look up the tone description for an effect
pub fn tone_spec(kind: ToneKind) -> &'static ToneSpec {
    match kind {
        ToneKind::Jump => &JUMP,
        ToneKind::Score => &SCORE,
        ToneKind::Death => &DEATH,
    }
}

/// Something that can render tones. Failures are swallowed by implementors.
pub trait AudioBackend {
    /// Acquire or resume the output (call from a user gesture)
    fn resume(&mut self);
    /// Play one tone at the given volume (0.0 - 1.0)
    fn play(&mut self, spec: &ToneSpec, volume: f32);
    /// Release the output
    fn close(&mut self);
}

/// Play a sound effect through a backend
pub fn play_tone(backend: &mut dyn AudioBackend, kind: ToneKind, volume: f32) {
    if volume <= 0.0 {
        return;
    }
    backend.play(tone_spec(kind), volume.min(1.0));
}

/// Silent backend (native builds and tests)
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioBackend for NullAudio {
    fn resume(&mut self) {}
    fn play(&mut self, _spec: &ToneSpec, _volume: f32) {}
    fn close(&mut self) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioBackend, GAIN_FLOOR, ToneSpec, Waveform};

    /// Web Audio backend; the context is created on the first gesture
    #[derive(Default)]
    pub struct WebAudio {
        ctx: Option<AudioContext>,
    }

    impl WebAudio {
        pub fn new() -> Self {
            Self { ctx: None }
        }

        /// Create an oscillator routed through a fresh gain node
        fn create_osc(ctx: &AudioContext, spec: &ToneSpec) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(match spec.waveform {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Square => OscillatorType::Square,
                Waveform::Triangle => OscillatorType::Triangle,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
            });
            osc.frequency().set_value(spec.start_hz);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }
    }

    impl AudioBackend for WebAudio {
        fn resume(&mut self) {
            if self.ctx.is_none() {
                // May fail outside a secure context
                match AudioContext::new() {
                    Ok(ctx) => self.ctx = Some(ctx),
                    Err(e) => {
                        log::warn!("Failed to create AudioContext - audio disabled: {:?}", e);
                        return;
                    }
                }
            }
            if let Some(ctx) = &self.ctx {
                if ctx.state() == AudioContextState::Suspended {
                    let _ = ctx.resume();
                }
            }
        }

        fn play(&mut self, spec: &ToneSpec, volume: f32) {
            let Some(ctx) = &self.ctx else { return };
            let Some((osc, gain)) = Self::create_osc(ctx, spec) else {
                log::debug!("Could not build oscillator graph");
                return;
            };
            let t = ctx.current_time();
            let end = t + spec.duration_secs;
            let peak = (spec.peak_gain * volume).max(GAIN_FLOOR);

            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(peak, t + spec.attack_secs)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(GAIN_FLOOR, end)
                .ok();

            if let Some(end_hz) = spec.end_hz {
                osc.frequency().set_value_at_time(spec.start_hz, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(end_hz, end)
                    .ok();
            }

            osc.start().ok();
            osc.stop_with_when(end + 0.02).ok();
        }

        fn close(&mut self) {
            if let Some(ctx) = self.ctx.take() {
                let _ = ctx.close();
                log::debug!("AudioContext closed");
            }
        }
    }

    impl Drop for WebAudio {
        fn drop(&mut self) {
            self.close();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every tone played, for controller tests
    #[derive(Debug, Default)]
    pub(crate) struct RecordingAudio {
        pub played: Vec<(ToneSpec, f32)>,
        pub resumed: usize,
        pub closed: bool,
    }

    impl AudioBackend for RecordingAudio {
        fn resume(&mut self) {
            self.resumed += 1;
        }
        fn play(&mut self, spec: &ToneSpec, volume: f32) {
            self.played.push((*spec, volume));
        }
        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[test]
    fn tones_are_short_and_audible() {
        for kind in [ToneKind::Jump, ToneKind::Score, ToneKind::Death] {
            let spec = tone_spec(kind);
            assert!(spec.duration_secs >= 0.01 && spec.duration_secs <= 0.5);
            assert!(spec.attack_secs < spec.duration_secs);
            assert!(spec.peak_gain > GAIN_FLOOR && spec.peak_gain <= 1.0);
            assert!(spec.start_hz > 20.0);
        }
    }

    #[test]
    fn death_tone_falls() {
        let spec = tone_spec(ToneKind::Death);
        assert!(spec.end_hz.unwrap() < spec.start_hz);
    }

    #[test]
    fn muted_volume_plays_nothing() {
        let mut audio = RecordingAudio::default();
        play_tone(&mut audio, ToneKind::Jump, 0.0);
        assert!(audio.played.is_empty());

        play_tone(&mut audio, ToneKind::Score, 2.0);
        assert_eq!(audio.played.len(), 1);
        assert_eq!(audio.played[0].0, *tone_spec(ToneKind::Score));
        assert_eq!(audio.played[0].1, 1.0);
    }
}
