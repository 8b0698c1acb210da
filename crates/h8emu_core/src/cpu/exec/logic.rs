use crate::cpu::decode::{Instruction, Op, Size};
use crate::cpu::{Bus, Cpu, Flow};

impl Cpu {
    pub(super) fn exec_logic<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let size = insn.size;
        let src = self.resolve(insn.src, size);
        let b = self.read_loc(bus, src, size);
        let dst = self.resolve(insn.dst, size);
        let a = self.read_loc(bus, dst, size);

        let result = match insn.op {
            Op::And => a & b,
            Op::Or => a | b,
            _ => a ^ b,
        };
        self.write_loc(bus, dst, size, result);
        self.flags_mov(result, size);
        Flow::Next
    }

    pub(super) fn exec_not<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let size = insn.size;
        let dst = self.resolve(insn.dst, size);
        let result = !self.read_loc(bus, dst, size) & size.mask();
        self.write_loc(bus, dst, size, result);
        self.flags_mov(result, size);
        Flow::Next
    }

    /// ANDC/ORC/XORC #imm,CCR.
    pub(super) fn exec_ccr_logic<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let src = self.resolve(insn.src, Size::Byte);
        let imm = self.read_loc(bus, src, Size::Byte) as u8;
        let ccr = self.ccr.bits();
        let value = match insn.op {
            Op::Andc => ccr & imm,
            Op::Orc => ccr | imm,
            _ => ccr ^ imm,
        };
        self.set_ccr(value);
        Flow::Next
    }
}
