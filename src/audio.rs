//! Procedural sound effects over the Web Audio API
//!
//! Every cue is synthesized from oscillator voices at play time, so the
//! build ships no audio assets.

use web_sys::{AudioContext, AudioContextState, OscillatorType};

/// Sound cues the game can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Two fingers down, trace begins
    TraceStart,
    /// Ring covered the shape
    Covered,
    /// Ring fell short
    Missed,
    /// Round skipped without a trace
    Skip,
}

/// Owns the AudioContext and synthesizes effects on demand
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    /// AudioContext creation can fail outside a secure context; the game
    /// then runs silent rather than refusing to start.
    pub fn new() -> Self {
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("AudioContext unavailable, running without sound");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume the context; browsers keep it suspended until a user gesture
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        use OscillatorType::{Sawtooth, Sine, Triangle};
        match effect {
            // Soft tap when the trace takes hold
            SoundEffect::TraceStart => self.voice(ctx, Triangle, 300.0, 300.0, 0.06, vol * 0.2, 0.0),
            // Coin-style ascending arpeggio
            SoundEffect::Covered => {
                for (i, freq) in [660.0, 880.0, 1320.0].into_iter().enumerate() {
                    self.voice(ctx, Sine, freq, freq, 0.2, vol * 0.3, i as f64 * 0.08);
                }
            }
            // Sour downward slide with a thud underneath
            SoundEffect::Missed => {
                self.voice(ctx, Sawtooth, 220.0, 90.0, 0.4, vol * 0.35, 0.0);
                self.voice(ctx, Sine, 70.0, 70.0, 0.2, vol * 0.3, 0.0);
            }
            // Quick downward blip
            SoundEffect::Skip => self.voice(ctx, Triangle, 500.0, 250.0, 0.12, vol * 0.2, 0.0),
        }
    }

    /// One oscillator voice: frequency glides `f0` to `f1` while the gain
    /// decays from `peak` toward silence over `dur` seconds, starting
    /// `delay` seconds from now.
    fn voice(
        &self,
        ctx: &AudioContext,
        wave: OscillatorType,
        f0: f32,
        f1: f32,
        dur: f64,
        peak: f32,
        delay: f64,
    ) {
        let (Ok(osc), Ok(gain)) = (ctx.create_oscillator(), ctx.create_gain()) else {
            return;
        };
        osc.set_type(wave);
        if osc.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(&ctx.destination()).is_err()
        {
            return;
        }

        let t = ctx.current_time() + delay;
        let _ = gain.gain().set_value_at_time(peak, t);
        let _ = gain.gain().exponential_ramp_to_value_at_time(0.01, t + dur);
        let _ = osc.frequency().set_value_at_time(f0, t);
        if f0 != f1 {
            let _ = osc.frequency().exponential_ramp_to_value_at_time(f1, t + dur);
        }
        let _ = osc.start_with_when(t);
        let _ = osc.stop_with_when(t + dur + 0.05);
    }
}
