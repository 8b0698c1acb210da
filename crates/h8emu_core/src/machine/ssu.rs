//! Synchronous serial communication unit.
//!
//! Only the register block and the byte exchange are modelled. The
//! firmware drives it through ordinary memory accesses; the machine bus
//! hands every byte written to SSTDR to the attached [`SerialDevice`] at
//! the end of the instruction.

use bitflags::bitflags;

use crate::cpu::{Bus, MemoryBus};

pub const SSCRH: u16 = 0xF0E0;
pub const SSCRL: u16 = 0xF0E1;
pub const SSMR: u16 = 0xF0E2;
pub const SSER: u16 = 0xF0E3;
pub const SSSR: u16 = 0xF0E4;
pub const SSRDR: u16 = 0xF0E9;
pub const SSTDR: u16 = 0xF0EB;

bitflags! {
    /// SSSR status bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct SsStatus: u8 {
        const ORER = 1 << 6;
        const TEND = 1 << 3;
        const TDRE = 1 << 2;
        const RDRF = 1 << 1;
        const CE = 1 << 0;
    }
}

bitflags! {
    /// SSER enable bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct SsEnable: u8 {
        const TE = 1 << 7;
        const RE = 1 << 6;
    }
}

/// Something on the other end of the serial link.
pub trait SerialDevice {
    /// Shift one byte out and return the byte shifted in.
    fn exchange(&mut self, tx: u8) -> u8;

    /// The firmware disabled the link; any half-received frame is dropped.
    fn deselect(&mut self) {}
}

/// Device that answers every byte with 0xFF, like a floating line.
#[derive(Default, Clone, Copy, Debug)]
pub struct OpenLine;

impl SerialDevice for OpenLine {
    fn exchange(&mut self, _tx: u8) -> u8 {
        0xFF
    }
}

pub struct Ssu {
    device: Box<dyn SerialDevice>,
    transfers: u64,
}

impl std::fmt::Debug for Ssu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ssu")
            .field("transfers", &self.transfers)
            .finish_non_exhaustive()
    }
}

impl Ssu {
    pub fn new(device: Box<dyn SerialDevice>) -> Self {
        Self {
            device,
            transfers: 0,
        }
    }

    /// Number of bytes exchanged so far.
    pub fn transfers(&self) -> u64 {
        self.transfers
    }

    /// Status after reset: transmit buffer empty.
    pub(super) fn reset(&self, memory: &mut MemoryBus) {
        memory.poke8(SSSR as u32, SsStatus::TDRE.bits());
        memory.poke8(SSRDR as u32, 0);
    }

    /// React to a byte written by the CPU during the last instruction.
    pub(super) fn service_write(&mut self, memory: &mut MemoryBus, addr: u16, value: u8) {
        match addr {
            SSTDR => {
                let rx = self.device.exchange(value);
                self.transfers += 1;
                memory.poke8(SSRDR as u32, rx);
                let status = SsStatus::from_bits_retain(memory.peek8(SSSR as u32))
                    | SsStatus::TDRE
                    | SsStatus::TEND
                    | SsStatus::RDRF;
                memory.poke8(SSSR as u32, status.bits());
                log::trace!("ssu: tx 0x{value:02X} rx 0x{rx:02X}");
            }
            SSER => {
                if !SsEnable::from_bits_retain(value).intersects(SsEnable::TE | SsEnable::RE) {
                    self.device.deselect();
                }
            }
            _ => {}
        }
    }
}
