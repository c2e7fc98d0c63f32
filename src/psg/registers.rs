//! AY-3-8912 Register Definitions
//!
//! Defines the 16 registers (R0-R13, R14-R15 for the I/O port) that control
//! the PSG chip, plus bitflag views of the mixer and amplitude registers.

use std::fmt;

use bitflags::bitflags;

use crate::constants::NUM_REGISTERS;
use crate::PsgError;

/// AY-3-8912 Register Address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "save-state", derive(serde::Serialize, serde::Deserialize))]
pub enum Register {
    /// Channel A tone period (low byte) - R0
    #[default]
    ToneALow = 0x00,
    /// Channel A tone period (high nibble) - R1
    ToneAHigh = 0x01,
    /// Channel B tone period (low byte) - R2
    ToneBLow = 0x02,
    /// Channel B tone period (high nibble) - R3
    ToneBHigh = 0x03,
    /// Channel C tone period (low byte) - R4
    ToneCLow = 0x04,
    /// Channel C tone period (high nibble) - R5
    ToneCHigh = 0x05,
    /// Noise period - R6
    NoisePeriod = 0x06,
    /// Mixer Control (enable/disable tone and noise per channel) - R7
    MixerControl = 0x07,
    /// Channel A Amplitude - R8
    AmplitudeA = 0x08,
    /// Channel B Amplitude - R9
    AmplitudeB = 0x09,
    /// Channel C Amplitude - R10
    AmplitudeC = 0x0A,
    /// Envelope period (low byte) - R11
    EnvelopePeriodLow = 0x0B,
    /// Envelope period (high byte) - R12
    EnvelopePeriodHigh = 0x0C,
    /// Envelope Shape - R13
    EnvelopeShape = 0x0D,
    /// I/O Port A data store - R14
    PortA = 0x0E,
    /// I/O Port B data store - R15
    PortB = 0x0F,
}

impl Register {
    /// All registers in address order
    pub const ALL: [Register; NUM_REGISTERS] = [
        Register::ToneALow,
        Register::ToneAHigh,
        Register::ToneBLow,
        Register::ToneBHigh,
        Register::ToneCLow,
        Register::ToneCHigh,
        Register::NoisePeriod,
        Register::MixerControl,
        Register::AmplitudeA,
        Register::AmplitudeB,
        Register::AmplitudeC,
        Register::EnvelopePeriodLow,
        Register::EnvelopePeriodHigh,
        Register::EnvelopeShape,
        Register::PortA,
        Register::PortB,
    ];

    /// Decode the register selected by an address-latch bus cycle
    ///
    /// Only the low 4 bits of the data bus take part in the latch.
    pub fn from_latch(data_bus: u8) -> Self {
        match Register::try_from(data_bus & 0x0F) {
            Ok(reg) => reg,
            Err(_) => unreachable!("masked register address {data_bus:#04x} out of range"),
        }
    }

    /// Get the register address value
    pub fn addr(&self) -> u8 {
        *self as u8
    }

    /// Index into the backing register array
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl TryFrom<u8> for Register {
    type Error = PsgError;

    fn try_from(addr: u8) -> Result<Self, Self::Error> {
        Register::ALL
            .get(addr as usize)
            .copied()
            .ok_or(PsgError::InvalidRegister(addr))
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::ToneALow => write!(f, "R0 (Channel A Tone Period Low)"),
            Register::ToneAHigh => write!(f, "R1 (Channel A Tone Period High)"),
            Register::ToneBLow => write!(f, "R2 (Channel B Tone Period Low)"),
            Register::ToneBHigh => write!(f, "R3 (Channel B Tone Period High)"),
            Register::ToneCLow => write!(f, "R4 (Channel C Tone Period Low)"),
            Register::ToneCHigh => write!(f, "R5 (Channel C Tone Period High)"),
            Register::NoisePeriod => write!(f, "R6 (Noise Period)"),
            Register::MixerControl => write!(f, "R7 (Mixer Control)"),
            Register::AmplitudeA => write!(f, "R8 (Channel A Amplitude)"),
            Register::AmplitudeB => write!(f, "R9 (Channel B Amplitude)"),
            Register::AmplitudeC => write!(f, "R10 (Channel C Amplitude)"),
            Register::EnvelopePeriodLow => write!(f, "R11 (Envelope Period Low)"),
            Register::EnvelopePeriodHigh => write!(f, "R12 (Envelope Period High)"),
            Register::EnvelopeShape => write!(f, "R13 (Envelope Shape)"),
            Register::PortA => write!(f, "R14 (I/O Port A)"),
            Register::PortB => write!(f, "R15 (I/O Port B)"),
        }
    }
}

bitflags! {
    /// Mixer Control Register (R7) bitflags
    ///
    /// A set bit disables the source (inverted logic, as on the real chip).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MixerFlags: u8 {
        /// Channel A tone disable
        const TONE_A = 0x01;
        /// Channel B tone disable
        const TONE_B = 0x02;
        /// Channel C tone disable
        const TONE_C = 0x04;
        /// Channel A noise disable
        const NOISE_A = 0x08;
        /// Channel B noise disable
        const NOISE_B = 0x10;
        /// Channel C noise disable
        const NOISE_C = 0x20;
        /// I/O port A direction (unsupported)
        const IO_A = 0x40;
        /// I/O port B direction (unsupported)
        const IO_B = 0x80;
    }
}

impl MixerFlags {
    const TONE: [MixerFlags; 3] = [MixerFlags::TONE_A, MixerFlags::TONE_B, MixerFlags::TONE_C];
    const NOISE: [MixerFlags; 3] = [MixerFlags::NOISE_A, MixerFlags::NOISE_B, MixerFlags::NOISE_C];

    /// Create mixer flags from raw register value
    pub fn from_register(value: u8) -> Self {
        MixerFlags::from_bits_truncate(value)
    }

    /// Check if tone is enabled for a channel (0=A, 1=B, 2=C)
    pub fn is_tone_enabled(&self, channel: usize) -> bool {
        !self.contains(Self::TONE[channel])
    }

    /// Check if noise is enabled for a channel (0=A, 1=B, 2=C)
    pub fn is_noise_enabled(&self, channel: usize) -> bool {
        !self.contains(Self::NOISE[channel])
    }

    /// True when any I/O port control bit is requested
    pub fn uses_io_ports(&self) -> bool {
        self.intersects(MixerFlags::IO_A | MixerFlags::IO_B)
    }
}

bitflags! {
    /// Amplitude Control Register (R8-R10) bitflags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AmplitudeFlags: u8 {
        /// Fixed volume (0-15)
        const FIXED_VOLUME = 0x0F;
        /// Volume follows the envelope generator
        const ENVELOPE_MODE = 0x10;
    }
}

impl AmplitudeFlags {
    /// Create amplitude flags from raw register value, bits 5-7 are unused
    pub fn from_register(value: u8) -> Self {
        AmplitudeFlags::from_bits_truncate(value)
    }

    /// Fixed volume field
    pub fn fixed_volume(&self) -> u8 {
        (*self & AmplitudeFlags::FIXED_VOLUME).bits()
    }

    /// True when the envelope drives this channel's volume
    pub fn is_envelope_mode(&self) -> bool {
        self.contains(AmplitudeFlags::ENVELOPE_MODE)
    }
}
