//! AY-3-8912 PSG Emulator for the vector console
//!
//! A cycle-accurate, pin-level emulator of the General Instrument AY-3-8912
//! Programmable Sound Generator as wired into a vector-graphics game console.
//! The host CPU/bus emulator drives the data bus and the BDIR/BC1 control
//! lines; the chip decodes bus cycles on their edges exactly like the silicon.
//!
//! # Features
//! - Edge-triggered bus mode decoding (latch / read / write)
//! - Three tone generators, shared 17-bit LFSR noise, shared 16-shape envelope
//! - Input clock divided by 16 into the generator tick
//! - Per-channel mixer gating with debug overrides
//! - Read-only inspection snapshots for debug overlays
//! - JSON save states
//!
//! # Crate feature flags
//! - `save-state` (default): serde-based save/load of the full chip state
//!
//! # Logging
//! Diagnostics are emitted through `tracing`; install a subscriber in the host
//! to see them. Unsupported configuration (mixer I/O port bits) is reported
//! at `WARN`, bus cycles at `TRACE`.
//!
//! # Quick start
//! ```
//! use ay38912::{Psg, PsgBus};
//!
//! let mut psg = Psg::new();
//! psg.bus_write(0x00, 0x10); // Tone A period low
//! psg.bus_write(0x07, 0x3E); // Mixer: tone A only
//! psg.bus_write(0x08, 0x0F); // Volume A
//!
//! // 32 generator ticks
//! psg.update(512);
//! let sample = psg.sample();
//! assert!(sample.abs() <= 1.0);
//! ```

#![warn(missing_docs)]

pub mod bus;
pub mod channel_state;
pub mod constants;
pub mod generators;
pub mod psg;
pub mod shared;
#[cfg(feature = "save-state")]
pub mod state;

/// Error types for PSG operations
///
/// Invalid bus usage inside the chip is a programming error and panics;
/// these errors cover host-facing lookups and save states.
#[derive(thiserror::Error, Debug)]
pub enum PsgError {
    /// Register address outside 0-15
    #[error("Invalid register address: {0:#04x}")]
    InvalidRegister(u8),

    /// Channel index outside 0-2
    #[error("Invalid channel index: {0}")]
    InvalidChannel(usize),

    /// Save state could not be encoded or decoded
    #[cfg(feature = "save-state")]
    #[error("Save state error: {0}")]
    State(#[from] serde_json::Error),

    /// Save state decoded but describes a chip that cannot exist
    #[cfg(feature = "save-state")]
    #[error("Invalid save state: {0}")]
    InvalidState(String),
}

/// Result type for PSG operations
pub type Result<T> = std::result::Result<T, PsgError>;

// Public API exports
pub use bus::PsgBus;
pub use channel_state::PsgSnapshot;
pub use generators::{
    EnvelopeGenerator, GeneratorBank, MasterDivider, NoiseGenerator, ToneGenerator,
};
pub use psg::{Psg, PsgMode, Register};
pub use shared::SharedPsg;
