//! Read-only inspection of the PSG.
//!
//! This module captures visualization-ready data from a running [`Psg`]:
//! generator outputs, channel volumes, mixer enables and debug overrides.
//! Capturing never touches emulated state, so a debug overlay can poll it at
//! any cadence without affecting the audio.
//!
//! # Example
//!
//! ```
//! use ay38912::Psg;
//! use ay38912::channel_state::PsgSnapshot;
//!
//! let psg = Psg::new();
//! let snapshot = PsgSnapshot::capture(&psg);
//!
//! for (i, ch) in snapshot.channels.iter().enumerate() {
//!     println!("Channel {}: {:?}Hz, volume={}", i, ch.frequency_hz, ch.volume);
//! }
//! ```

use crate::constants::{generator_clock, DEFAULT_MASTER_CLOCK, NUM_CHANNELS};
use crate::psg::{AmplitudeMode, Psg};

/// State of a single channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelSnapshot {
    /// Tone period (12-bit, 0-4095).
    pub tone_period: u16,
    /// Tone frequency in Hz (period 0 counts as 1).
    pub frequency_hz: f32,
    /// Current tone generator output bit.
    pub tone_bit: u8,
    /// Whether the mixer enables tone on this channel.
    pub tone_enabled: bool,
    /// Whether the mixer enables noise on this channel.
    pub noise_enabled: bool,
    /// Debug tone override.
    pub override_tone: bool,
    /// Debug noise override.
    pub override_noise: bool,
    /// Whether the envelope drives this channel's volume.
    pub envelope_mode: bool,
    /// Instantaneous volume (0-15).
    pub volume: u8,
    /// Instantaneous channel sample in [-1.0, 1.0].
    pub sample: f32,
}

/// Envelope generator state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvelopeSnapshot {
    /// Envelope period (16-bit).
    pub period: u16,
    /// Envelope shape (0-15).
    pub shape: u8,
    /// Current level (0-15).
    pub level: u8,
    /// Whether the level is frozen.
    pub holding: bool,
    /// Frequency of one 16-step ramp in Hz (period 0 counts as 1).
    pub frequency_hz: f32,
}

/// Noise generator state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoiseSnapshot {
    /// Noise period (5-bit, 0-31).
    pub period: u8,
    /// Current output bit.
    pub bit: u8,
    /// Raw 17-bit shift register.
    pub shift_register: u32,
}

/// Complete state of all channels and generators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PsgSnapshot {
    /// State of channels A, B, C.
    pub channels: [ChannelSnapshot; NUM_CHANNELS],
    /// Envelope generator state.
    pub envelope: EnvelopeSnapshot,
    /// Noise generator state.
    pub noise: NoiseSnapshot,
    /// Mixed output sample.
    pub sample: f32,
}

impl PsgSnapshot {
    /// Capture the chip state assuming the console's 1.5 MHz PSG clock.
    pub fn capture(psg: &Psg) -> Self {
        Self::capture_with_clock(psg, DEFAULT_MASTER_CLOCK)
    }

    /// Capture the chip state with a custom input clock for frequency fields.
    ///
    /// # Arguments
    ///
    /// * `psg` - Chip to inspect
    /// * `master_clock` - PSG input clock in Hz
    pub fn capture_with_clock(psg: &Psg, master_clock: u32) -> Self {
        let gens = psg.generators();
        let tick_rate = generator_clock(master_clock);

        let channels = std::array::from_fn(|i| {
            let channel = &psg.channels()[i];
            let tone = &gens.tones[channel.tone_index()];
            ChannelSnapshot {
                tone_period: tone.period(),
                frequency_hz: tick_rate / (2.0 * f32::from(tone.period().max(1))),
                tone_bit: tone.value(),
                tone_enabled: channel.tone_enabled(),
                noise_enabled: channel.noise_enabled(),
                override_tone: channel.override_tone(),
                override_noise: channel.override_noise(),
                envelope_mode: channel.amplitude().mode() == AmplitudeMode::Envelope,
                volume: channel.volume(gens),
                sample: channel.sample(gens),
            }
        });

        let env = &gens.envelope;
        let envelope = EnvelopeSnapshot {
            period: env.period(),
            shape: env.shape(),
            level: env.value(),
            holding: env.is_holding(),
            frequency_hz: tick_rate / (16.0 * f32::from(env.period().max(1))),
        };

        let noise = NoiseSnapshot {
            period: gens.noise.period(),
            bit: gens.noise.value(),
            shift_register: gens.noise.shift_register(),
        };

        Self {
            channels,
            envelope,
            noise,
            sample: psg.sample(),
        }
    }

    /// Normalized volume (0.0-1.0) of each channel, for meters.
    pub fn volume_levels(&self) -> [f32; NUM_CHANNELS] {
        self.channels.map(|ch| f32::from(ch.volume) / 15.0)
    }
}
