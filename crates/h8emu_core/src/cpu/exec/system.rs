use crate::cpu::decode::{Instruction, Size};
use crate::cpu::{Bus, Cpu, Flow};

impl Cpu {
    /// LDC: load CCR from a register, an immediate or memory. Word-sized
    /// memory forms carry CCR in the upper byte.
    pub(super) fn exec_ldc<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let src = self.resolve(insn.src, insn.size);
        let value = self.read_loc(bus, src, insn.size);
        let ccr = match insn.size {
            Size::Byte => value as u8,
            _ => (value >> 8) as u8,
        };
        self.set_ccr(ccr);
        Flow::Next
    }

    pub(super) fn exec_stc<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let ccr = self.ccr.bits() as u32;
        let value = match insn.size {
            Size::Byte => ccr,
            _ => ccr << 8,
        };
        let dst = self.resolve(insn.dst, insn.size);
        self.write_loc(bus, dst, insn.size, value);
        Flow::Next
    }
}
