//! AY-3-8912 Hardware Constants
//!
//! Shared constants used across PSG components.

/// Number of audio channels (A, B, C)
pub const NUM_CHANNELS: usize = 3;

/// Number of addressable registers (R0-R15)
pub const NUM_REGISTERS: usize = 16;

/// Input clocks per generator tick
pub const MASTER_DIVIDER: u32 = 16;

/// PSG input clock on the vector console (1.5 MHz, shared with the CPU E clock)
pub const DEFAULT_MASTER_CLOCK: u32 = 1_500_000;

/// Valid bits of a tone period high register (R1, R3, R5)
pub const TONE_PERIOD_HIGH_MASK: u8 = 0x0F;

/// Valid bits of the noise period register (R6)
pub const NOISE_PERIOD_MASK: u8 = 0x1F;

/// Valid bits of the envelope shape register (R13)
pub const ENVELOPE_SHAPE_MASK: u8 = 0x0F;

/// Highest volume / envelope level
pub const MAX_LEVEL: u8 = 15;

/// Seed of the noise shift register after reset (must be non-zero)
pub const NOISE_SEED: u32 = 1;

/// Width of the noise shift register in bits
pub const NOISE_LFSR_BITS: u32 = 17;

/// Compute the generator tick rate for a given input clock
///
/// # Arguments
/// * `master_clock` - PSG input clock in Hz
///
/// # Returns
/// Generator ticks per second
#[inline]
pub fn generator_clock(master_clock: u32) -> f32 {
    master_clock as f32 / MASTER_DIVIDER as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_clock_divides_by_sixteen() {
        assert_eq!(generator_clock(DEFAULT_MASTER_CLOCK), 93_750.0);
        assert_eq!(generator_clock(1_600), 100.0);
    }

    #[test]
    fn test_noise_seed_fits_register() {
        assert_ne!(NOISE_SEED, 0);
        assert!(NOISE_SEED < (1 << NOISE_LFSR_BITS));
    }
}
