mod accel;
mod board;
mod bus;
mod config;
pub mod ssu;

use std::fmt;

use thiserror::Error;

use crate::cpu::CpuError;

pub use accel::{AccelSample, Accelerometer};
pub use board::Machine;
pub use bus::MachineBus;
pub use config::{Entry, MachineConfig};
pub use ssu::{OpenLine, SerialDevice, Ssu};

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum MachineError {
    #[error("image of {len} bytes does not fit in memory at 0x{base:04X}")]
    ImageTooLarge { len: usize, base: u16 },
    #[error(transparent)]
    Cpu(#[from] CpuError),
}

/// Why [`Machine::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// PC reached the first address past the loaded image.
    EndOfImage,
    /// SLEEP executed; with interrupts never taken it cannot resume.
    Sleep,
    /// The configured step limit was hit.
    StepLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::EndOfImage => "end of image",
            StopReason::Sleep => "sleep",
            StopReason::StepLimit => "step limit",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Instructions executed by this run.
    pub steps: u64,
    pub stop: StopReason,
}
