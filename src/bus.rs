//! Host bus abstraction for the AY-3-8912
//!
//! This module defines the pin-level interface a CPU/bus emulator drives:
//! the 8-bit data bus, the BDIR/BC1 control lines and the input clock.

use crate::psg::Psg;

/// Pin-level view of the PSG for a host bus emulator
///
/// The host sets the data bus and control lines *before* advancing the clock
/// for the ticks during which they are held, matching real bus timing where
/// signals are stable across a clock edge.
///
/// # Example
///
/// ```
/// use ay38912::{Psg, PsgBus};
///
/// fn play_note<B: PsgBus>(chip: &mut B) {
///     chip.bus_write(0x00, 0x10); // Channel A period low
///     chip.bus_write(0x01, 0x00); // Channel A period high
///     chip.bus_write(0x07, 0x3E); // Mixer: enable tone A
///     chip.bus_write(0x08, 0x0F); // Channel A volume
///
///     chip.update(512);
///     let sample = chip.sample();
/// }
///
/// play_note(&mut Psg::new());
/// ```
pub trait PsgBus {
    /// Drive the data bus
    fn write_data_bus(&mut self, value: u8);

    /// Sample the data bus
    fn read_data_bus(&self) -> u8;

    /// Set the BDIR and BC1 control lines
    fn set_bus_lines(&mut self, bdir: bool, bc1: bool);

    /// Advance the input clock by `cycles` ticks
    fn update(&mut self, cycles: u32);

    /// Current mixed output sample in [-1.0, 1.0]
    fn sample(&self) -> f32;

    /// Restore power-on state
    fn reset(&mut self);

    /// Run an address-latch bus cycle (latch, then inactive), 2 clocks
    ///
    /// Only the low 4 bits of `addr` reach the address latch.
    fn latch_address(&mut self, addr: u8) {
        self.write_data_bus(addr);
        self.set_bus_lines(true, true);
        self.update(1);
        self.set_bus_lines(false, false);
        self.update(1);
    }

    /// Latch `addr` and write `value` into it, 4 clocks
    fn bus_write(&mut self, addr: u8, value: u8) {
        self.latch_address(addr);
        self.write_data_bus(value);
        self.set_bus_lines(true, false);
        self.update(1);
        self.set_bus_lines(false, false);
        self.update(1);
    }

    /// Latch `addr` and read it back over the data bus, 4 clocks
    fn bus_read(&mut self, addr: u8) -> u8 {
        self.latch_address(addr);
        self.set_bus_lines(false, true);
        self.update(1);
        let value = self.read_data_bus();
        self.set_bus_lines(false, false);
        self.update(1);
        value
    }
}

impl PsgBus for Psg {
    fn write_data_bus(&mut self, value: u8) {
        self.write_da(value);
    }

    fn read_data_bus(&self) -> u8 {
        self.read_da()
    }

    fn set_bus_lines(&mut self, bdir: bool, bc1: bool) {
        Psg::set_bus_lines(self, bdir, bc1)
    }

    fn update(&mut self, cycles: u32) {
        Psg::update(self, cycles)
    }

    fn sample(&self) -> f32 {
        Psg::sample(self)
    }

    fn reset(&mut self) {
        Psg::reset(self)
    }
}
