//! Thread-shared PSG handle
//!
//! The chip model is not safe for concurrent mutation. Hosts that clock it on
//! an emulation thread and pull samples on an audio thread share one
//! [`SharedPsg`] so every access goes through a single mutex.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::psg::Psg;

/// Cloneable handle to a mutex-protected [`Psg`]
#[derive(Debug, Clone, Default)]
pub struct SharedPsg {
    inner: Arc<Mutex<Psg>>,
}

impl SharedPsg {
    /// Wrap a chip for sharing
    pub fn new(psg: Psg) -> Self {
        Self {
            inner: Arc::new(Mutex::new(psg)),
        }
    }

    /// Lock the chip for a sequence of accesses
    pub fn lock(&self) -> MutexGuard<'_, Psg> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the chip
    pub fn with<R>(&self, f: impl FnOnce(&mut Psg) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Advance by one frame's worth of clocks and sample, under one lock
    pub fn run_frame(&self, cycles: u32) -> f32 {
        let mut psg = self.inner.lock();
        psg.update(cycles);
        psg.sample()
    }
}

impl From<Psg> for SharedPsg {
    fn from(psg: Psg) -> Self {
        Self::new(psg)
    }
}
