use crate::cpu::ccr::Condition;
use crate::cpu::decode::{Instruction, Operand};
use crate::cpu::{Bus, Cpu, Flow};

/// PC-relative target; displacements count from the end of the
/// instruction.
#[inline]
fn pc_relative(next: u16, operand: Operand) -> Option<u16> {
    match operand {
        Operand::Pc8(d) => Some(next.wrapping_add(d as i16 as u16)),
        Operand::Pc16(d) => Some(next.wrapping_add(d as u16)),
        _ => None,
    }
}

impl Cpu {
    fn transfer_target<B: Bus>(&mut self, bus: &mut B, insn: &Instruction, next: u16) -> u16 {
        if let Some(target) = pc_relative(next, insn.dst) {
            return target;
        }
        match insn.dst {
            Operand::Ind(n) => self.regs.er(n as usize) as u16,
            Operand::Abs24(aa) => aa as u16,
            // Normal mode vectors are 16 bits wide.
            Operand::MemInd(aa) => bus.read16(aa as u32),
            _ => next,
        }
    }

    pub(super) fn exec_bcc(&mut self, cond: Condition, insn: &Instruction, next: u16) -> Flow {
        match pc_relative(next, insn.dst) {
            Some(target) if cond.holds(self.ccr) => Flow::Jump(target),
            _ => Flow::Next,
        }
    }

    pub(super) fn exec_jmp<B: Bus>(&mut self, bus: &mut B, insn: &Instruction, next: u16) -> Flow {
        Flow::Jump(self.transfer_target(bus, insn, next))
    }

    /// BSR/JSR: push the 16-bit return address, then jump.
    pub(super) fn exec_call<B: Bus>(&mut self, bus: &mut B, insn: &Instruction, next: u16) -> Flow {
        // The target is computed first: JSR @ER7 jumps to the old SP value.
        let target = self.transfer_target(bus, insn, next);
        let sp = self.regs.sp().wrapping_sub(2);
        self.regs.set_sp(sp);
        bus.write16(sp, next);
        Flow::Jump(target)
    }

    /// RTS: pop the return address straight into PC.
    pub(super) fn exec_rts<B: Bus>(&mut self, bus: &mut B) -> Flow {
        let sp = self.regs.sp();
        let ret = bus.read16(sp);
        self.regs.set_sp(sp.wrapping_add(2));
        Flow::Jump(ret)
    }
}
