mod alu;
pub mod bus;
pub mod ccr;
pub mod decode;
mod disasm;
mod exec;
mod operand;
pub mod regs;

#[cfg(test)]
mod tests;

use thiserror::Error;

pub use bus::{Bus, MemoryBus, ADDRESS_MASK, MEMORY_SIZE};
pub use ccr::{Ccr, Condition};
pub use decode::{
    decode, decode_with, DecodeError, DecodeOptions, Instruction, Op, Operand, Shift, Size,
    MAX_INSTRUCTION_LEN,
};
pub use disasm::Disassembly;
pub use regs::{Registers, SP};

/// Errors that abort execution of an instruction.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum CpuError {
    #[error("cannot decode instruction at 0x{pc:04X}")]
    Decode { pc: u16, source: DecodeError },
    #[error("`{mnemonic}` at 0x{pc:04X} has no execution rule")]
    Unimplemented { pc: u16, mnemonic: &'static str },
}

/// Core options that change how instructions are interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuConfig {
    /// Swap BXOR and BIXOR in the `@ERd` / `@aa:8` bit group.
    pub memory_bit_xor_swapped: bool,
}

impl CpuConfig {
    fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            memory_bit_xor_swapped: self.memory_bit_xor_swapped,
        }
    }
}

/// What the executor decided about the next PC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Next,
    Jump(u16),
    Sleep,
}

/// One executed instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Address the instruction was fetched from.
    pub pc: u16,
    pub instruction: Instruction,
}

/// H8/300H CPU core in normal (64 KiB) mode.
///
/// The core owns registers, flags and the program counter; memory is
/// reached only through the [`Bus`] handed to [`Cpu::step`].
#[derive(Clone, Debug, Default)]
pub struct Cpu {
    pub regs: Registers,
    pub ccr: Ccr,
    pub pc: u16,
    /// Set by SLEEP. Nothing can wake the core since interrupts are never
    /// taken.
    pub sleeping: bool,
    config: CpuConfig,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CpuConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> CpuConfig {
        self.config
    }

    /// Clear registers, flags and PC. The configuration is kept.
    pub fn reset(&mut self) {
        *self = Self::with_config(self.config);
    }

    #[inline]
    pub fn set_ccr(&mut self, value: u8) {
        self.ccr = Ccr::from_bits_retain(value);
    }

    /// Decode the instruction at `pc` without executing it.
    pub fn fetch_decode<B: Bus>(&self, bus: &B, pc: u16) -> Result<Instruction, CpuError> {
        let bytes = fetch_window(bus, pc);
        decode_with(&bytes, self.config.decode_options())
            .map_err(|source| CpuError::Decode { pc, source })
    }

    /// Execute exactly one instruction, bracketed by the bus
    /// `begin_instruction` / `end_instruction` hooks.
    ///
    /// Both error kinds are raised before any register, flag or memory
    /// write, so a failed step leaves the machine untouched.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<Step, CpuError> {
        bus.begin_instruction();
        let pc = self.pc;
        let instruction = self.fetch_decode(bus, pc)?;
        let next = pc.wrapping_add(instruction.len as u16);

        match self.execute(bus, &instruction, next)? {
            Flow::Next => self.pc = next,
            Flow::Jump(target) => self.pc = target,
            Flow::Sleep => {
                self.pc = next;
                self.sleeping = true;
            }
        }
        bus.end_instruction();

        Ok(Step { pc, instruction })
    }
}

/// Instruction bytes starting at `pc`, wrapping at the end of the bank.
pub(crate) fn fetch_window<B: Bus + ?Sized>(bus: &B, pc: u16) -> [u8; MAX_INSTRUCTION_LEN] {
    std::array::from_fn(|i| bus.peek8(pc as u32 + i as u32))
}
