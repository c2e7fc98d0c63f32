//! JSON save states
//!
//! A save state holds everything needed to resume bit-exactly: bus mode,
//! latched address, data bus, the register file, every generator counter and
//! output, and each channel's enables, overrides and amplitude control.

use serde_json::Value;
use tracing::debug;

use crate::constants::{MASTER_DIVIDER, NOISE_LFSR_BITS};
use crate::psg::Psg;
use crate::{PsgError, Result};

/// Highest envelope step (two 16-level ramps)
const ENVELOPE_LAST_STEP: u8 = 0x1F;

impl Psg {
    /// Capture the full chip state
    pub fn save_state(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Restore a state produced by [`Psg::save_state`]
    ///
    /// On error the chip is left untouched. A state that decodes but breaks a
    /// hardware invariant is rejected with [`PsgError::InvalidState`].
    pub fn load_state(&mut self, state: &Value) -> Result<()> {
        let restored: Psg = serde_json::from_value(state.clone())?;
        restored.validate()?;
        *self = restored;
        debug!("psg state restored");
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (index, channel) in self.channels().iter().enumerate() {
            if channel.tone_index() != index {
                return Err(PsgError::InvalidState(format!(
                    "channel {index} wired to tone generator {}",
                    channel.tone_index()
                )));
            }
        }

        let lfsr = self.generators().noise.shift_register();
        if lfsr == 0 || lfsr >= 1 << NOISE_LFSR_BITS {
            return Err(PsgError::InvalidState(format!(
                "noise shift register {lfsr:#x} outside 1..2^{NOISE_LFSR_BITS}"
            )));
        }

        let step = self.generators().envelope.step();
        if step > ENVELOPE_LAST_STEP {
            return Err(PsgError::InvalidState(format!(
                "envelope step {step} above {ENVELOPE_LAST_STEP}"
            )));
        }

        let phase = self.divider().phase();
        if phase >= MASTER_DIVIDER {
            return Err(PsgError::InvalidState(format!(
                "divider phase {phase} not below {MASTER_DIVIDER}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::psg::{Psg, Register};
    use crate::{PsgBus, PsgError};

    fn busy_chip() -> Psg {
        let mut psg = Psg::new();
        psg.bus_write(0x00, 0x07);
        psg.bus_write(0x06, 0x03);
        psg.bus_write(0x07, 0x30);
        psg.bus_write(0x08, 0x1F);
        psg.bus_write(0x0B, 0x02);
        psg.bus_write(0x0D, 0x0A);
        psg.set_tone_override(1, true).unwrap();
        psg.update(777);
        psg
    }

    #[test]
    fn test_resume_is_bit_exact() {
        let mut original = busy_chip();
        let state = original.save_state().unwrap();

        let mut restored = Psg::new();
        restored.load_state(&state).unwrap();
        assert_eq!(restored, original);

        for _ in 0..200 {
            original.update(13);
            restored.update(13);
            assert_eq!(original.sample().to_bits(), restored.sample().to_bits());
        }
    }

    #[test]
    fn test_state_keeps_mid_cycle_bus_mode() {
        let mut psg = Psg::new();
        psg.write_da(Register::PortB.addr());
        psg.set_bus_lines(true, true);
        psg.update(1);

        let mut restored = Psg::new();
        restored.load_state(&psg.save_state().unwrap()).unwrap();
        assert_eq!(restored.mode(), psg.mode());
        assert_eq!(restored.latched_register(), Register::PortB);
        assert!(restored.bdir() && restored.bc1());
    }

    #[test]
    fn test_bad_state_is_rejected() {
        let mut psg = busy_chip();
        let before = psg.clone();
        let result = psg.load_state(&serde_json::json!({"mode": "Sideways"}));
        assert!(matches!(result, Err(PsgError::State(_))));
        assert_eq!(psg, before);
    }

    /// Load a tampered copy of `busy_chip` and expect `InvalidState`
    fn assert_rejected(tamper: impl FnOnce(&mut serde_json::Value)) {
        let mut state = busy_chip().save_state().unwrap();
        tamper(&mut state);

        let mut psg = Psg::new();
        psg.bus_write(0x08, 0x0F);
        let before = psg.clone();
        let result = psg.load_state(&state);
        assert!(matches!(result, Err(PsgError::InvalidState(_))), "{result:?}");
        assert_eq!(psg, before);
    }

    #[test]
    fn test_tone_index_out_of_range_is_rejected() {
        assert_rejected(|state| state["channels"][0]["tone"] = 7.into());
    }

    #[test]
    fn test_swapped_tone_wiring_is_rejected() {
        assert_rejected(|state| state["channels"][1]["tone"] = 2.into());
    }

    #[test]
    fn test_zero_noise_register_is_rejected() {
        assert_rejected(|state| state["generators"]["noise"]["lfsr"] = 0.into());
    }

    #[test]
    fn test_noise_register_wider_than_17_bits_is_rejected() {
        assert_rejected(|state| state["generators"]["noise"]["lfsr"] = (1u32 << 17).into());
    }

    #[test]
    fn test_envelope_step_past_cycle_is_rejected() {
        assert_rejected(|state| {
            state["generators"]["envelope"]["step"] = 255.into();
            state["generators"]["envelope"]["shape"] = 8.into();
        });
    }

    #[test]
    fn test_divider_phase_past_wrap_is_rejected() {
        assert_rejected(|state| state["divider"]["counter"] = 16.into());
    }

    #[test]
    fn test_boundary_values_are_accepted() {
        let mut state = busy_chip().save_state().unwrap();
        state["generators"]["noise"]["lfsr"] = ((1u32 << 17) - 1).into();
        state["generators"]["envelope"]["step"] = 31.into();

        let mut psg = Psg::new();
        psg.load_state(&state).unwrap();
        psg.update(16 * 40);
        assert!(psg.sample().abs() <= 1.0);
    }
}
