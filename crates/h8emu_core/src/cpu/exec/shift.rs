use crate::cpu::decode::{Instruction, Shift};
use crate::cpu::{Bus, Cpu, Flow};

impl Cpu {
    /// Single-bit shifts and rotates on a register.
    pub(super) fn exec_shift<B: Bus>(&mut self, bus: &mut B, kind: Shift, insn: &Instruction) -> Flow {
        let size = insn.size;
        let dst = self.resolve(insn.dst, size);
        let value = self.read_loc(bus, dst, size);
        let result = self.alu_shift(kind, value, size);
        self.write_loc(bus, dst, size, result);
        Flow::Next
    }
}
