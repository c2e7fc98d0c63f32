//! Bus control modes
//!
//! The chip decodes its two control lines (BDIR, BC1) into one of four bus
//! modes every input clock. Actions fire only on the edge out of `Inactive`.

/// Bus mode decoded from BDIR and BC1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "save-state", derive(serde::Serialize, serde::Deserialize))]
pub enum PsgMode {
    /// BDIR=0, BC1=0
    #[default]
    Inactive = 0b00,
    /// BDIR=0, BC1=1: register contents are driven onto the data bus
    Read = 0b01,
    /// BDIR=1, BC1=0: data bus is written into the latched register
    Write = 0b10,
    /// BDIR=1, BC1=1: data bus low nibble selects the register
    LatchAddress = 0b11,
}

impl PsgMode {
    /// Decode the mode from the two control lines
    #[inline]
    pub fn from_lines(bdir: bool, bc1: bool) -> Self {
        match (bdir, bc1) {
            (false, false) => PsgMode::Inactive,
            (false, true) => PsgMode::Read,
            (true, false) => PsgMode::Write,
            (true, true) => PsgMode::LatchAddress,
        }
    }

    /// Encoded (BDIR << 1) | BC1 value
    #[inline]
    pub fn bits(&self) -> u8 {
        *self as u8
    }
}
