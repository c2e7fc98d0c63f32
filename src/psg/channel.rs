//! Channel output stage
//!
//! Each channel gates its tone generator and the shared noise generator
//! through the mixer enables, then scales the result by its amplitude control.

use crate::constants::MAX_LEVEL;
use crate::generators::{EnvelopeGenerator, GeneratorBank};

/// Volume source for a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "save-state", derive(serde::Serialize, serde::Deserialize))]
pub enum AmplitudeMode {
    /// Volume taken from the fixed 4-bit field
    #[default]
    Fixed,
    /// Volume follows the shared envelope generator
    Envelope,
}

/// Per-channel volume selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "save-state", derive(serde::Serialize, serde::Deserialize))]
pub struct AmplitudeControl {
    mode: AmplitudeMode,
    fixed_volume: u8,
}

impl AmplitudeControl {
    /// Select fixed or envelope-driven volume
    #[inline]
    pub fn set_mode(&mut self, mode: AmplitudeMode) {
        self.mode = mode;
    }

    /// Current volume source
    #[inline]
    pub fn mode(&self) -> AmplitudeMode {
        self.mode
    }

    /// Set the fixed volume, only the low 4 bits are kept
    #[inline]
    pub fn set_fixed_volume(&mut self, volume: u8) {
        self.fixed_volume = volume & MAX_LEVEL;
    }

    /// Fixed volume field
    #[inline]
    pub fn fixed_volume(&self) -> u8 {
        self.fixed_volume
    }

    /// Instantaneous volume (0-15)
    #[inline]
    pub fn volume(&self, envelope: &EnvelopeGenerator) -> u8 {
        match self.mode {
            AmplitudeMode::Fixed => self.fixed_volume,
            AmplitudeMode::Envelope => envelope.value(),
        }
    }
}

/// One of the three audio channels
///
/// The channel does not own any generator: `tone` indexes into the
/// [`GeneratorBank`] and noise/envelope are read from the same bank.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "save-state", derive(serde::Serialize, serde::Deserialize))]
pub struct PsgChannel {
    tone: usize,
    amplitude: AmplitudeControl,
    tone_enabled: bool,
    noise_enabled: bool,
    /// Debug-only: treat tone as enabled regardless of the mixer
    override_tone: bool,
    /// Debug-only: treat noise as enabled regardless of the mixer
    override_noise: bool,
}

impl PsgChannel {
    /// Create a power-on channel fed by tone generator `tone`
    pub fn new(tone: usize) -> Self {
        Self {
            tone,
            amplitude: AmplitudeControl::default(),
            tone_enabled: false,
            noise_enabled: false,
            override_tone: false,
            override_noise: false,
        }
    }

    /// Instantaneous sample in [-1.0, 1.0]
    ///
    /// A disabled source reads as a constant 1, so a channel with both
    /// sources disabled outputs a steady `+volume`.
    #[inline]
    pub fn sample(&self, bank: &GeneratorBank) -> f32 {
        let tone_active = self.tone_enabled || self.override_tone;
        let noise_active = self.noise_enabled || self.override_noise;

        let tone_bit = bank.tones[self.tone].value() != 0 || !tone_active;
        let noise_bit = bank.noise.value() != 0 || !noise_active;

        let volume = f32::from(self.volume(bank)) / f32::from(MAX_LEVEL);
        if tone_bit && noise_bit {
            volume
        } else {
            -volume
        }
    }

    /// Instantaneous volume (0-15)
    #[inline]
    pub fn volume(&self, bank: &GeneratorBank) -> u8 {
        self.amplitude.volume(&bank.envelope)
    }

    /// Index of the tone generator feeding this channel
    #[inline]
    pub fn tone_index(&self) -> usize {
        self.tone
    }

    /// Mixer-driven tone enable
    #[inline]
    pub fn set_tone_enabled(&mut self, enabled: bool) {
        self.tone_enabled = enabled;
    }

    /// Mixer-driven noise enable
    #[inline]
    pub fn set_noise_enabled(&mut self, enabled: bool) {
        self.noise_enabled = enabled;
    }

    /// True when the mixer enables tone on this channel
    #[inline]
    pub fn tone_enabled(&self) -> bool {
        self.tone_enabled
    }

    /// True when the mixer enables noise on this channel
    #[inline]
    pub fn noise_enabled(&self) -> bool {
        self.noise_enabled
    }

    /// Force tone active regardless of the mixer
    #[inline]
    pub fn set_override_tone(&mut self, enabled: bool) {
        self.override_tone = enabled;
    }

    /// Force noise active regardless of the mixer
    #[inline]
    pub fn set_override_noise(&mut self, enabled: bool) {
        self.override_noise = enabled;
    }

    /// True when the tone debug override is set
    #[inline]
    pub fn override_tone(&self) -> bool {
        self.override_tone
    }

    /// True when the noise debug override is set
    #[inline]
    pub fn override_noise(&self) -> bool {
        self.override_noise
    }

    /// Amplitude control
    #[inline]
    pub fn amplitude(&self) -> &AmplitudeControl {
        &self.amplitude
    }

    /// Mutable amplitude control
    #[inline]
    pub fn amplitude_mut(&mut self) -> &mut AmplitudeControl {
        &mut self.amplitude
    }
}
