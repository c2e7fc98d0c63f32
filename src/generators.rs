//! Sound generators for the AY-3-8912 PSG
//!
//! This module contains the individual generator components:
//! - Master divider (input clock / 16)
//! - Tone generators (3 channels)
//! - Noise generator (shared LFSR)
//! - Envelope generator (shared)
//! - Generator bank (arena owning all of the above except the divider)
//!
//! All generators share one convention: a down-counter that, on reaching
//! zero, reloads with `max(period, 1)` and advances the generator output.
//! Period 0 therefore behaves exactly like period 1.

use bitflags::bitflags;

use crate::constants::{
    ENVELOPE_SHAPE_MASK, MASTER_DIVIDER, MAX_LEVEL, NOISE_LFSR_BITS, NOISE_PERIOD_MASK,
    NOISE_SEED, NUM_CHANNELS, TONE_PERIOD_HIGH_MASK,
};

/// Divides the chip input clock down to the shared generator tick
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "save-state", derive(serde::Serialize, serde::Deserialize))]
pub struct MasterDivider {
    counter: u32,
}

impl MasterDivider {
    /// Create a new divider
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one input clock, returns true on every 16th call
    #[inline]
    pub fn clock(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= MASTER_DIVIDER {
            self.counter = 0;
            true
        } else {
            false
        }
    }

    /// Input clocks seen since the last generator tick
    #[inline]
    pub fn phase(&self) -> u32 {
        self.counter
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

/// Tone generator for a single channel
///
/// 12-bit period split over two registers. The output toggles every time the
/// counter expires, giving a 50% duty square wave at
/// `generator_clock / (2 * period)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "save-state", derive(serde::Serialize, serde::Deserialize))]
pub struct ToneGenerator {
    /// Current counter value
    counter: u16,
    /// Period from registers (12-bit, R0/R1, R2/R3, R4/R5)
    period: u16,
    /// Square wave output level
    output: bool,
}

impl ToneGenerator {
    /// Create a new tone generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick the generator
    #[inline]
    pub fn clock(&mut self) {
        self.counter = self.counter.saturating_sub(1);
        if self.counter == 0 {
            self.counter = self.period.max(1);
            self.output = !self.output;
        }
    }

    /// Current output bit (0 or 1)
    #[inline]
    pub fn value(&self) -> u8 {
        u8::from(self.output)
    }

    /// Set the low 8 bits of the period
    #[inline]
    pub fn set_period_low(&mut self, value: u8) {
        self.period = (self.period & 0x0F00) | u16::from(value);
    }

    /// Set the high 4 bits of the period, upper nibble of `value` is ignored
    #[inline]
    pub fn set_period_high(&mut self, value: u8) {
        self.period = (self.period & 0x00FF) | (u16::from(value & TONE_PERIOD_HIGH_MASK) << 8);
    }

    /// Low 8 bits of the period
    #[inline]
    pub fn period_low(&self) -> u8 {
        (self.period & 0x00FF) as u8
    }

    /// High 4 bits of the period
    #[inline]
    pub fn period_high(&self) -> u8 {
        (self.period >> 8) as u8 & TONE_PERIOD_HIGH_MASK
    }

    /// Full 12-bit period
    #[inline]
    pub fn period(&self) -> u16 {
        self.period
    }

    /// Ticks left until the next toggle
    #[inline]
    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Noise generator using a 17-bit LFSR
///
/// On every counter expiry the register shifts right by one and the XOR of
/// bits 0 and 3 is fed back into bit 16. The output is bit 0.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "save-state", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseGenerator {
    /// Current counter value
    counter: u8,
    /// Period from register R6 (5-bit)
    period: u8,
    /// 17-bit LFSR state
    lfsr: u32,
}

impl NoiseGenerator {
    /// Create a new noise generator
    pub fn new() -> Self {
        Self {
            counter: 0,
            period: 0,
            lfsr: NOISE_SEED, // Must be non-zero
        }
    }

    /// Tick the generator
    #[inline]
    pub fn clock(&mut self) {
        self.counter = self.counter.saturating_sub(1);
        if self.counter == 0 {
            self.counter = self.period.max(1);
            let feedback = (self.lfsr ^ (self.lfsr >> 3)) & 1;
            self.lfsr = (self.lfsr >> 1) | (feedback << (NOISE_LFSR_BITS - 1));
        }
    }

    /// Current output bit (0 or 1)
    #[inline]
    pub fn value(&self) -> u8 {
        (self.lfsr & 1) as u8
    }

    /// Set the period from register R6, upper 3 bits are ignored
    #[inline]
    pub fn set_period(&mut self, value: u8) {
        self.period = value & NOISE_PERIOD_MASK;
    }

    /// Current 5-bit period
    #[inline]
    pub fn period(&self) -> u8 {
        self.period
    }

    /// Raw shift register contents
    #[inline]
    pub fn shift_register(&self) -> u32 {
        self.lfsr
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

bitflags! {
    /// Envelope Shape Register (R13) bitflags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EnvelopeShape: u8 {
        /// Keep cycling after the first ramp
        const CONTINUE = 0x08;
        /// First ramp counts up (0 -> 15) instead of down
        const ATTACK = 0x04;
        /// Reverse direction at the end of every ramp
        const ALTERNATE = 0x02;
        /// Freeze once the first cycle completes
        const HOLD = 0x01;
    }
}

impl EnvelopeShape {
    /// Create shape flags from raw register value
    pub fn from_register(value: u8) -> Self {
        EnvelopeShape::from_bits_truncate(value & ENVELOPE_SHAPE_MASK)
    }
}

/// Envelope generator with 16 shapes
///
/// A 5-bit step counter walks one up+down cycle (two ramps of 16 levels).
/// Whether and where the generator freezes depends on the shape:
///
/// | continue | hold | alternate | behaviour                              |
/// |----------|------|-----------|----------------------------------------|
/// | 0        | x    | x         | one ramp, then hold at its end level   |
/// | 1        | 0    | 0         | sawtooth forever                       |
/// | 1        | 0    | 1         | triangle forever                       |
/// | 1        | 1    | 0         | one ramp, then hold at its end level   |
/// | 1        | 1    | 1         | one up+down pass, then hold            |
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "save-state", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvelopeGenerator {
    /// Current counter value
    counter: u16,
    /// Period from registers R11/R12 (16-bit)
    period: u16,
    /// Shape register R13 (4-bit)
    shape: u8,
    /// Step within the current up+down cycle (0-31)
    step: u8,
    /// Direction of the current ramp
    rising: bool,
    /// Level frozen until the next shape write
    holding: bool,
}

impl EnvelopeGenerator {
    /// Create a new envelope generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick the generator
    #[inline]
    pub fn clock(&mut self) {
        self.counter = self.counter.saturating_sub(1);
        if self.counter != 0 {
            return;
        }
        self.counter = self.period.max(1);
        if !self.holding {
            self.advance();
        }
    }

    fn advance(&mut self) {
        let shape = EnvelopeShape::from_register(self.shape);
        let alternate = shape.contains(EnvelopeShape::ALTERNATE);

        if self.step & 0x0F == 0x0F {
            let hold = if !shape.contains(EnvelopeShape::CONTINUE) {
                true
            } else if shape.contains(EnvelopeShape::HOLD) {
                // alternating shapes hold after the full up+down pass
                !alternate || self.step == 0x1F
            } else {
                false
            };

            if hold {
                self.holding = true;
                return;
            }
            if alternate {
                self.rising = !self.rising;
            }
        }

        self.step = (self.step + 1) & 0x1F;
    }

    /// Current envelope level (0-15)
    #[inline]
    pub fn value(&self) -> u8 {
        let position = self.step & 0x0F;
        if self.rising {
            position
        } else {
            MAX_LEVEL - position
        }
    }

    /// Set the envelope shape from register R13
    ///
    /// This restarts the envelope: the step counter returns to 0, the
    /// direction follows the attack bit and the counter reloads so the first
    /// step lands one full period later.
    pub fn set_shape(&mut self, value: u8) {
        self.shape = value & ENVELOPE_SHAPE_MASK;
        self.step = 0;
        self.rising = EnvelopeShape::from_register(self.shape).contains(EnvelopeShape::ATTACK);
        self.holding = false;
        self.counter = self.period.max(1);
    }

    /// Current shape register
    #[inline]
    pub fn shape(&self) -> u8 {
        self.shape
    }

    /// Set the low byte of the period
    #[inline]
    pub fn set_period_low(&mut self, value: u8) {
        self.period = (self.period & 0xFF00) | u16::from(value);
    }

    /// Set the high byte of the period
    #[inline]
    pub fn set_period_high(&mut self, value: u8) {
        self.period = (self.period & 0x00FF) | (u16::from(value) << 8);
    }

    /// Low byte of the period
    #[inline]
    pub fn period_low(&self) -> u8 {
        (self.period & 0x00FF) as u8
    }

    /// High byte of the period
    #[inline]
    pub fn period_high(&self) -> u8 {
        (self.period >> 8) as u8
    }

    /// Full 16-bit period
    #[inline]
    pub fn period(&self) -> u16 {
        self.period
    }

    /// Step within the current cycle (0-31)
    #[inline]
    pub fn step(&self) -> u8 {
        self.step
    }

    /// True once a holding shape has frozen its level
    #[inline]
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Arena owning every generator of the chip
///
/// Channels refer to their tone generator by index and read the shared noise
/// and envelope generators from here, so there is exactly one instance of
/// each piece of hardware.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "save-state", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorBank {
    /// Tone generators for channels A, B, C
    pub tones: [ToneGenerator; NUM_CHANNELS],
    /// Shared noise generator
    pub noise: NoiseGenerator,
    /// Shared envelope generator
    pub envelope: EnvelopeGenerator,
}

impl GeneratorBank {
    /// Create a bank of power-on generators
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every generator by one tick: tones A, B, C, then noise, then envelope
    #[inline]
    pub fn clock(&mut self) {
        for tone in &mut self.tones {
            tone.clock();
        }
        self.noise.clock();
        self.envelope.clock();
    }

    /// Reset every generator
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_tone(tone: &mut ToneGenerator, ticks: u32) -> u32 {
        let mut toggles = 0;
        for _ in 0..ticks {
            let before = tone.value();
            tone.clock();
            if tone.value() != before {
                toggles += 1;
            }
        }
        toggles
    }

    #[test]
    fn test_master_divider_fires_every_sixteenth_clock() {
        let mut divider = MasterDivider::new();
        let fired: Vec<usize> = (1..=64).filter(|_| divider.clock()).collect();
        assert_eq!(fired, vec![16, 32, 48, 64]);
    }

    #[test]
    fn test_tone_period_registers() {
        let mut tone = ToneGenerator::new();
        tone.set_period_low(0x34);
        tone.set_period_high(0xF2); // upper nibble ignored
        assert_eq!(tone.period(), 0x234);
        assert_eq!(tone.period_low(), 0x34);
        assert_eq!(tone.period_high(), 0x02);

        tone.set_period_low(0xFF);
        assert_eq!(tone.period(), 0x2FF);
    }

    #[test]
    fn test_tone_periodicity() {
        for period in [1u16, 2, 3, 16, 100, 0x0FFF] {
            let mut tone = ToneGenerator::new();
            tone.set_period_low((period & 0xFF) as u8);
            tone.set_period_high((period >> 8) as u8);
            // Settle onto the new period
            tone.clock();

            let start = tone.value();
            let toggles = clock_tone(&mut tone, 2 * u32::from(period));
            assert_eq!(toggles, 2, "period {period}");
            assert_eq!(tone.value(), start, "period {period}");
        }
    }

    #[test]
    fn test_tone_zero_period_behaves_like_one() {
        let mut zero = ToneGenerator::new();
        let mut one = ToneGenerator::new();
        one.set_period_low(1);

        for _ in 0..10 {
            let before = zero.value();
            zero.clock();
            one.clock();
            assert_ne!(zero.value(), before, "period 0 toggles every tick");
            assert_eq!(zero.value(), one.value());
        }
    }

    #[test]
    fn test_noise_generator_lfsr() {
        let mut noise = NoiseGenerator::new();

        // LFSR should produce varying output
        let mut outputs = Vec::new();
        for _ in 0..100 {
            noise.clock();
            outputs.push(noise.value());
        }

        let has_variation = outputs.windows(2).any(|w| w[0] != w[1]);
        assert!(
            has_variation,
            "Noise generator should produce varying output"
        );
    }

    #[test]
    fn test_noise_never_stalls() {
        let mut noise = NoiseGenerator::new();
        let seed = noise.shift_register();
        let full_cycle = (1u32 << NOISE_LFSR_BITS) - 1;

        for tick in 1..=full_cycle {
            noise.clock();
            assert_ne!(noise.shift_register(), 0, "LFSR stalled at tick {tick}");
            assert!(noise.shift_register() < (1 << NOISE_LFSR_BITS));
            if tick < full_cycle {
                assert_ne!(noise.shift_register(), seed, "short cycle at {tick}");
            }
        }
        assert_eq!(noise.shift_register(), seed);
    }

    #[test]
    fn test_noise_period_slows_shifting() {
        let mut noise = NoiseGenerator::new();
        noise.set_period(0xE4); // masked to 4
        assert_eq!(noise.period(), 4);

        noise.clock(); // expires immediately, reloads 4
        let after_first = noise.shift_register();
        for _ in 0..3 {
            noise.clock();
            assert_eq!(noise.shift_register(), after_first);
        }
        noise.clock();
        assert_ne!(noise.shift_register(), after_first);
    }

    #[test]
    fn test_envelope_decay_once_then_hold() {
        let period = 3u32;
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period_low(period as u8);
        envelope.set_shape(0x00);
        assert_eq!(envelope.value(), 15);

        for tick in 1..=16 * period {
            envelope.clock();
            let expected = 15u32.saturating_sub(tick / period);
            assert_eq!(u32::from(envelope.value()), expected, "tick {tick}");
        }
        assert!(envelope.is_holding());

        for _ in 0..1000 {
            envelope.clock();
            assert_eq!(envelope.value(), 0);
        }
    }

    #[test]
    fn test_envelope_attack_once_holds_high() {
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period_low(1);
        envelope.set_shape(0x04);
        assert_eq!(envelope.value(), 0);

        for _ in 0..100 {
            envelope.clock();
        }
        assert!(envelope.is_holding());
        assert_eq!(envelope.value(), 15);
    }

    #[test]
    fn test_envelope_sawtooth_up_repeats() {
        let period = 2u32;
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period_low(period as u8);
        envelope.set_shape(0x0C);

        let mut levels = vec![envelope.value()];
        for _ in 0..(3 * 16 * period) {
            envelope.clock();
            levels.push(envelope.value());
        }

        for (tick, level) in levels.iter().enumerate() {
            let expected = ((tick as u32 / period) % 16) as u8;
            assert_eq!(*level, expected, "tick {tick}");
        }
        assert!(!envelope.is_holding());
    }

    #[test]
    fn test_envelope_triangle_reverses() {
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period_low(1);
        envelope.set_shape(0x0E); // continue, attack, alternate

        let mut levels = vec![envelope.value()];
        for _ in 0..63 {
            envelope.clock();
            levels.push(envelope.value());
        }

        let up: Vec<u8> = (0..=15).collect();
        let down: Vec<u8> = (0..=15).rev().collect();
        assert_eq!(&levels[0..16], up.as_slice());
        assert_eq!(&levels[16..32], down.as_slice());
        assert_eq!(&levels[32..48], up.as_slice());
        assert_eq!(&levels[48..64], down.as_slice());
    }

    #[test]
    fn test_envelope_hold_without_alternate_freezes_after_first_ramp() {
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period_low(1);
        envelope.set_shape(0x09); // continue, hold, decay

        for _ in 0..15 {
            envelope.clock();
        }
        assert_eq!(envelope.value(), 0);
        for _ in 0..50 {
            envelope.clock();
        }
        assert!(envelope.is_holding());
        assert_eq!(envelope.value(), 0);

        envelope.set_shape(0x0D); // continue, attack, hold
        for _ in 0..50 {
            envelope.clock();
        }
        assert_eq!(envelope.value(), 15);
    }

    #[test]
    fn test_envelope_hold_alternate_freezes_after_full_pass() {
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period_low(1);
        envelope.set_shape(0x0F); // continue, attack, alternate, hold

        for _ in 0..15 {
            envelope.clock();
        }
        assert_eq!(envelope.value(), 15);
        assert!(!envelope.is_holding());

        for _ in 0..16 {
            envelope.clock();
        }
        assert_eq!(envelope.value(), 0);

        for _ in 0..50 {
            envelope.clock();
        }
        assert!(envelope.is_holding());
        assert_eq!(envelope.value(), 0);
    }

    #[test]
    fn test_envelope_set_shape_restarts() {
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period_low(1);
        envelope.set_shape(0x08);
        for _ in 0..7 {
            envelope.clock();
        }
        assert_eq!(envelope.step(), 7);

        envelope.set_shape(0x18); // upper nibble ignored
        assert_eq!(envelope.shape(), 0x08);
        assert_eq!(envelope.step(), 0);
        assert_eq!(envelope.value(), 15);
    }

    #[test]
    fn test_envelope_period_registers() {
        let mut envelope = EnvelopeGenerator::new();
        envelope.set_period_low(0xCD);
        envelope.set_period_high(0xAB);
        assert_eq!(envelope.period(), 0xABCD);
        assert_eq!(envelope.period_low(), 0xCD);
        assert_eq!(envelope.period_high(), 0xAB);
    }

    #[test]
    fn test_bank_clocks_every_generator() {
        let mut bank = GeneratorBank::new();
        bank.tones[1].set_period_low(2);
        bank.noise.set_period(1);

        bank.clock();
        assert!(bank.tones.iter().all(|tone| tone.value() == 1));
        assert_ne!(bank.noise.shift_register(), NOISE_SEED);
        assert_eq!(bank.envelope.step(), 1);

        bank.clock();
        assert_eq!(bank.tones[0].value(), 0);
        assert_eq!(bank.tones[1].value(), 1);

        bank.reset();
        assert_eq!(bank, GeneratorBank::default());
    }
}
