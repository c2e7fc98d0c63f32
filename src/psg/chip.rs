//! AY-3-8912 PSG emulation
//!
//! Pin-level model of the chip: the host drives the data bus and the two
//! control lines, then advances the input clock. Every clock the control
//! lines are decoded into a [`PsgMode`]; register access happens only on the
//! transition out of `Inactive`. Every 16th clock the generators tick.

use tracing::{debug, trace, warn};

use super::channel::{AmplitudeMode, PsgChannel};
use super::mode::PsgMode;
use super::registers::{AmplitudeFlags, MixerFlags, Register};
use crate::constants::{NUM_CHANNELS, NUM_REGISTERS};
use crate::generators::{GeneratorBank, MasterDivider};
use crate::{PsgError, Result};

/// AY-3-8912 programmable sound generator
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "save-state", derive(serde::Serialize, serde::Deserialize))]
pub struct Psg {
    /// Backing store for registers without dedicated generator state
    registers: [u8; NUM_REGISTERS],
    /// Data bus (DA0-DA7)
    da: u8,
    /// Bus direction control line
    bdir: bool,
    /// Bus control 1 line
    bc1: bool,
    /// Mode decoded on the previous clock
    mode: PsgMode,
    latched: Register,
    divider: MasterDivider,
    generators: GeneratorBank,
    channels: [PsgChannel; NUM_CHANNELS],
}

impl Psg {
    /// Create a chip in its power-on state
    pub fn new() -> Self {
        Self {
            registers: [0; NUM_REGISTERS],
            da: 0,
            bdir: false,
            bc1: false,
            mode: PsgMode::Inactive,
            latched: Register::default(),
            divider: MasterDivider::new(),
            generators: GeneratorBank::new(),
            channels: [PsgChannel::new(0), PsgChannel::new(1), PsgChannel::new(2)],
        }
    }

    /// Restore power-on state
    ///
    /// Everything returns to the freshly constructed value, including mixer
    /// enables, amplitude controls, debug overrides and the control lines.
    pub fn reset(&mut self) {
        debug!("psg reset");
        *self = Self::new();
    }

    /// Drive the data bus
    #[inline]
    pub fn write_da(&mut self, value: u8) {
        self.da = value;
    }

    /// Sample the data bus
    #[inline]
    pub fn read_da(&self) -> u8 {
        self.da
    }

    /// Set the BDIR control line
    #[inline]
    pub fn set_bdir(&mut self, level: bool) {
        self.bdir = level;
    }

    /// Set the BC1 control line
    #[inline]
    pub fn set_bc1(&mut self, level: bool) {
        self.bc1 = level;
    }

    /// Set both control lines at once
    #[inline]
    pub fn set_bus_lines(&mut self, bdir: bool, bc1: bool) {
        self.bdir = bdir;
        self.bc1 = bc1;
    }

    /// Current BDIR level
    #[inline]
    pub fn bdir(&self) -> bool {
        self.bdir
    }

    /// Current BC1 level
    #[inline]
    pub fn bc1(&self) -> bool {
        self.bc1
    }

    /// Mode decoded on the most recent clock
    #[inline]
    pub fn mode(&self) -> PsgMode {
        self.mode
    }

    /// Register selected by the last address latch
    #[inline]
    pub fn latched_register(&self) -> Register {
        self.latched
    }

    /// Advance the chip by `cycles` input clocks
    pub fn update(&mut self, cycles: u32) {
        for _ in 0..cycles {
            self.clock();
        }
    }

    fn clock(&mut self) {
        let last_mode = self.mode;
        self.mode = PsgMode::from_lines(self.bdir, self.bc1);

        if last_mode == PsgMode::Inactive {
            match self.mode {
                PsgMode::Inactive => {}
                PsgMode::Read => {
                    self.da = self.read_register(self.latched);
                    trace!(register = %self.latched, value = self.da, "bus read");
                }
                PsgMode::Write => {
                    trace!(register = %self.latched, value = self.da, "bus write");
                    self.write_register(self.latched, self.da);
                }
                PsgMode::LatchAddress => {
                    self.latched = Register::from_latch(self.da);
                    trace!(register = %self.latched, "address latched");
                }
            }
        }

        // Generators tick every 16 input clocks
        if self.divider.clock() {
            self.generators.clock();
        }
    }

    /// Unweighted mean of the three channel samples, in [-1.0, 1.0]
    pub fn sample(&self) -> f32 {
        let sum: f32 = self
            .channels
            .iter()
            .map(|channel| channel.sample(&self.generators))
            .sum();
        sum / NUM_CHANNELS as f32
    }

    /// Advance the chip and fill `out` with evenly spaced samples
    ///
    /// `cycles` is split over the output slots; any remainder goes one clock
    /// at a time to the first slots. Each slot is sampled after its clocks.
    pub fn update_and_sample(&mut self, cycles: u32, out: &mut [f32]) {
        if out.is_empty() {
            self.update(cycles);
            return;
        }

        let slots = out.len() as u32;
        let per_slot = cycles / slots;
        let remainder = cycles % slots;
        for (i, slot) in out.iter_mut().enumerate() {
            let extra = u32::from((i as u32) < remainder);
            self.update(per_slot + extra);
            *slot = self.sample();
        }
    }

    /// Read a register as the bus Read cycle does
    pub fn read_register(&self, reg: Register) -> u8 {
        let gens = &self.generators;
        match reg {
            Register::ToneALow => gens.tones[0].period_low(),
            Register::ToneAHigh => gens.tones[0].period_high(),
            Register::ToneBLow => gens.tones[1].period_low(),
            Register::ToneBHigh => gens.tones[1].period_high(),
            Register::ToneCLow => gens.tones[2].period_low(),
            Register::ToneCHigh => gens.tones[2].period_high(),
            Register::NoisePeriod => gens.noise.period(),
            Register::EnvelopePeriodLow => gens.envelope.period_low(),
            Register::EnvelopePeriodHigh => gens.envelope.period_high(),
            Register::EnvelopeShape => gens.envelope.shape(),
            Register::MixerControl
            | Register::AmplitudeA
            | Register::AmplitudeB
            | Register::AmplitudeC
            | Register::PortA
            | Register::PortB => self.registers[reg.index()],
        }
    }

    /// Write a register as the bus Write cycle does
    ///
    /// Generator-backed registers (R0-R6, R11-R13) update the generator only;
    /// the rest are also kept in the backing array.
    pub fn write_register(&mut self, reg: Register, value: u8) {
        let gens = &mut self.generators;
        match reg {
            Register::ToneALow => return gens.tones[0].set_period_low(value),
            Register::ToneAHigh => return gens.tones[0].set_period_high(value),
            Register::ToneBLow => return gens.tones[1].set_period_low(value),
            Register::ToneBHigh => return gens.tones[1].set_period_high(value),
            Register::ToneCLow => return gens.tones[2].set_period_low(value),
            Register::ToneCHigh => return gens.tones[2].set_period_high(value),
            Register::NoisePeriod => return gens.noise.set_period(value),
            Register::EnvelopePeriodLow => return gens.envelope.set_period_low(value),
            Register::EnvelopePeriodHigh => return gens.envelope.set_period_high(value),
            Register::EnvelopeShape => return gens.envelope.set_shape(value),
            Register::MixerControl => {
                let flags = MixerFlags::from_register(value);
                if flags.uses_io_ports() {
                    warn!(value, "I/O port control bits in mixer register are not supported");
                }
                for (i, channel) in self.channels.iter_mut().enumerate() {
                    channel.set_tone_enabled(flags.is_tone_enabled(i));
                    channel.set_noise_enabled(flags.is_noise_enabled(i));
                }
            }
            Register::AmplitudeA | Register::AmplitudeB | Register::AmplitudeC => {
                let flags = AmplitudeFlags::from_register(value);
                let channel = &mut self.channels[reg.index() - Register::AmplitudeA.index()];
                let amplitude = channel.amplitude_mut();
                amplitude.set_mode(if flags.is_envelope_mode() {
                    AmplitudeMode::Envelope
                } else {
                    AmplitudeMode::Fixed
                });
                amplitude.set_fixed_volume(flags.fixed_volume());
            }
            Register::PortA | Register::PortB => {}
        }

        self.registers[reg.index()] = value;
    }

    /// Dump all 16 registers as the bus would read them
    pub fn dump_registers(&self) -> [u8; NUM_REGISTERS] {
        Register::ALL.map(|reg| self.read_register(reg))
    }

    /// Force tone active on a channel regardless of the mixer (debug only)
    pub fn set_tone_override(&mut self, channel: usize, enabled: bool) -> Result<()> {
        self.channel_mut(channel)?.set_override_tone(enabled);
        Ok(())
    }

    /// Force noise active on a channel regardless of the mixer (debug only)
    pub fn set_noise_override(&mut self, channel: usize, enabled: bool) -> Result<()> {
        self.channel_mut(channel)?.set_override_noise(enabled);
        Ok(())
    }

    fn channel_mut(&mut self, channel: usize) -> Result<&mut PsgChannel> {
        self.channels
            .get_mut(channel)
            .ok_or(PsgError::InvalidChannel(channel))
    }

    /// Channel by index (0=A, 1=B, 2=C)
    pub fn channel(&self, channel: usize) -> Result<&PsgChannel> {
        self.channels
            .get(channel)
            .ok_or(PsgError::InvalidChannel(channel))
    }

    /// All three channels
    #[inline]
    pub fn channels(&self) -> &[PsgChannel; NUM_CHANNELS] {
        &self.channels
    }

    /// Generator arena (read-only)
    #[inline]
    pub fn generators(&self) -> &GeneratorBank {
        &self.generators
    }

    /// Master divider (read-only)
    #[inline]
    pub fn divider(&self) -> &MasterDivider {
        &self.divider
    }
}

impl Default for Psg {
    fn default() -> Self {
        Self::new()
    }
}
