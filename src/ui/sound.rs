//! Sound engine: procedural menu blips via rodio.
//!
//! All sounds are generated as in-memory WAV buffers at init time.
//! Playback is fire-and-forget (non-blocking) via rodio's Sink.
//!
//! Build without the "sound" feature to disable audio entirely
//! (the stub SoundEngine does nothing).

use crate::sim::event::UiEvent;

/// One effect per kind of menu feedback.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Move,
    Confirm,
    Open,
    Close,
}

impl Sfx {
    pub fn for_event(ev: UiEvent) -> Sfx {
        match ev {
            UiEvent::SelectionMoved => Sfx::Move,
            UiEvent::Activated => Sfx::Confirm,
            UiEvent::ModalOpened => Sfx::Open,
            UiEvent::ModalClosed => Sfx::Close,
        }
    }
}

/// Several events in one frame (activate + open) play only the last,
/// most specific one.
pub fn sfx_for_frame(events: &[UiEvent]) -> Option<Sfx> {
    events.last().map(|&e| Sfx::for_event(e))
}

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use std::f32::consts::PI;

    use super::Sfx;

    pub const SAMPLE_RATE: u32 = 22050;

    pub fn samples_for(sfx: Sfx) -> Vec<f32> {
        match sfx {
            Sfx::Move => gen_blip(880.0, 0.03, 0.2),
            Sfx::Confirm => gen_notes(&[659.0, 988.0], 0.05),
            Sfx::Open => gen_sweep(400.0, 900.0, 0.09),
            Sfx::Close => gen_sweep(900.0, 400.0, 0.09),
        }
    }

    /// Simple sine blip at given frequency and duration
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                (t * freq * 2.0 * PI).sin() * env * volume
            })
            .collect()
    }

    /// Short square-ish notes back to back
    fn gen_notes(notes: &[f32], note_dur: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * 2.0 * PI).sin() * 0.7
                    + (t * freq * 3.0 * 2.0 * PI).sin() * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Linear pitch sweep
    fn gen_sweep(from: f32, to: f32, duration: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq * 2.0 * PI / SAMPLE_RATE as f32;
                phase.sin() * (1.0 - t).powf(0.6) * 0.22
            })
            .collect()
    }

    /// Wrap mono f32 samples into a 16-bit PCM WAV buffer.
    pub fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::debug;

    use super::synth::{make_wav, samples_for};
    use super::Sfx;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_move: Arc<Vec<u8>>,
        sfx_confirm: Arc<Vec<u8>>,
        sfx_open: Arc<Vec<u8>>,
        sfx_close: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    debug!("no audio output: {e}");
                    return None;
                }
            };
            let wav = |sfx| Arc::new(make_wav(&samples_for(sfx)));
            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_move: wav(Sfx::Move),
                sfx_confirm: wav(Sfx::Confirm),
                sfx_open: wav(Sfx::Open),
                sfx_close: wav(Sfx::Close),
            })
        }

        pub fn play(&self, sfx: Sfx) {
            let buf = match sfx {
                Sfx::Move => &self.sfx_move,
                Sfx::Confirm => &self.sfx_confirm,
                Sfx::Open => &self.sfx_open,
                Sfx::Close => &self.sfx_close,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }
}

// ── Public API: no-ops when the sound feature is off ──

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}
