use crate::cpu::decode::{Instruction, Size};
use crate::cpu::{Bus, Cpu, Flow};

impl Cpu {
    /// MOV in every width and addressing mode, PUSH/POP included.
    pub(super) fn exec_mov<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let src = self.resolve(insn.src, insn.size);
        let value = self.read_loc(bus, src, insn.size);
        let dst = self.resolve(insn.dst, insn.size);
        self.write_loc(bus, dst, insn.size, value);
        self.flags_mov(value, insn.size);
        Flow::Next
    }

    /// EEPMOV.B/W: copy R4L (or R4) bytes from @ER5 to @ER6.
    ///
    /// Both pointers advance and the counter ends at zero. Flags are not
    /// affected.
    pub(super) fn exec_eepmov<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let mut count = match insn.size {
            Size::Byte => self.regs.rl(4) as u32,
            _ => self.regs.r(4) as u32,
        };
        let mut src = self.regs.er(5);
        let mut dst = self.regs.er(6);
        while count > 0 {
            let byte = bus.read8(src);
            bus.write8(dst, byte);
            src = src.wrapping_add(1);
            dst = dst.wrapping_add(1);
            count -= 1;
        }
        self.regs.set_er(5, src);
        self.regs.set_er(6, dst);
        match insn.size {
            Size::Byte => self.regs.set_rl(4, 0),
            _ => self.regs.set_r(4, 0),
        }
        Flow::Next
    }
}
