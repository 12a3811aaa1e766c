use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

/// Short reaction cues. Waveform detail is deliberately minimal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(in crate::app) enum Cue {
    Correct,
    Wrong,
    Win,
    Lose,
}

impl Cue {
    const fn frequency(self) -> f32 {
        match self {
            Self::Correct => 660.0,
            Self::Wrong => 164.0,
            Self::Win => 880.0,
            Self::Lose => 110.0,
        }
    }

    const fn duration_secs(self) -> f64 {
        match self {
            Self::Correct | Self::Wrong => 0.18,
            Self::Win | Self::Lose => 0.6,
        }
    }

    const fn waveform(self) -> OscillatorType {
        match self {
            Self::Correct | Self::Win => OscillatorType::Triangle,
            Self::Wrong | Self::Lose => OscillatorType::Sawtooth,
        }
    }
}

/// Shared handle to the one audio device of the page.
///
/// Browsers only allow an `AudioContext` after a user gesture, so the context
/// is created lazily on the first cue, which always follows a click or a key
/// press here. Cloning the handle shares the device and the mute flag.
#[derive(Clone, Default)]
pub(in crate::app) struct AudioCx {
    inner: Rc<RefCell<AudioInner>>,
}

#[derive(Default)]
struct AudioInner {
    ctx: Option<AudioContext>,
    muted: bool,
}

impl AudioCx {
    pub(in crate::app) fn is_muted(&self) -> bool {
        self.inner.borrow().muted
    }

    /// Returns the new state. Toggling twice restores the previous one.
    pub(in crate::app) fn toggle_mute(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.muted = !inner.muted;
        log::debug!("audio muted: {}", inner.muted);
        inner.muted
    }

    pub(in crate::app) fn play(&self, cue: Cue) {
        let mut inner = self.inner.borrow_mut();
        if inner.muted {
            return;
        }
        if inner.ctx.is_none() {
            match AudioContext::new() {
                Ok(ctx) => inner.ctx = Some(ctx),
                Err(err) => {
                    log::warn!("audio device unavailable: {err:?}");
                    return;
                }
            }
        }
        let Some(ctx) = inner.ctx.as_ref() else {
            return;
        };
        if let Err(err) = beep(ctx, cue) {
            log::warn!("could not play cue {cue:?}: {err:?}");
        }
    }
}

fn beep(ctx: &AudioContext, cue: Cue) -> Result<(), JsValue> {
    let oscillator = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;
    oscillator.set_type(cue.waveform());
    oscillator.frequency().set_value(cue.frequency());

    let now = ctx.current_time();
    let end = now + cue.duration_secs();
    gain.gain().set_value(0.15);
    gain.gain().exponential_ramp_to_value_at_time(0.001, end)?;

    oscillator.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;
    oscillator.start()?;
    oscillator.stop_with_when(end)?;
    Ok(())
}
