//! AY-3-8912 PSG Emulation Domain
//!
//! Pin-level emulation of the General Instrument AY-3-8912 as wired into the
//! vector console: bus mode decoding, register file, channel mixing.
//!
//! Implementation:
//! - `chip` - bus state machine, register dispatch, sample mixing
//! - `channel` - per-channel gating and amplitude control
//! - `mode` - control line decoding
//! - `registers` - register addresses and bitflag views

pub mod channel;
pub mod chip;
pub mod mode;
pub mod registers;

// Re-export public API
pub use channel::{AmplitudeControl, AmplitudeMode, PsgChannel};
pub use chip::Psg;
pub use mode::PsgMode;
pub use registers::{AmplitudeFlags, MixerFlags, Register};
