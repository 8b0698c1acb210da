mod arith;
mod bit;
mod control;
mod logic;
mod shift;
mod system;
mod transfer;

use super::decode::{Instruction, Op};
use super::{Bus, Cpu, CpuError, Flow};

impl Cpu {
    /// Execute a decoded instruction. `next` is the address of the
    /// following instruction, which is both the fall-through PC and the
    /// base of PC-relative targets.
    pub(super) fn execute<B: Bus>(
        &mut self,
        bus: &mut B,
        insn: &Instruction,
        next: u16,
    ) -> Result<Flow, CpuError> {
        let flow = match insn.op {
            Op::Nop => Flow::Next,
            Op::Sleep => Flow::Sleep,

            Op::Mov => self.exec_mov(bus, insn),
            Op::Eepmov => self.exec_eepmov(bus, insn),

            Op::Add | Op::Addx | Op::Sub | Op::Subx | Op::Cmp => self.exec_arith(bus, insn),
            Op::Adds | Op::Subs => self.exec_adds_subs(bus, insn),
            Op::Inc | Op::Dec => self.exec_inc_dec(bus, insn),
            Op::Neg => self.exec_neg(bus, insn),
            Op::Daa | Op::Das => self.exec_decimal_adjust(bus, insn),
            Op::Mulxu | Op::Mulxs => self.exec_mul(bus, insn),
            Op::Divxu | Op::Divxs => self.exec_div(bus, insn),
            Op::Extu | Op::Exts => self.exec_extend(bus, insn),

            Op::And | Op::Or | Op::Xor => self.exec_logic(bus, insn),
            Op::Not => self.exec_not(bus, insn),
            Op::Andc | Op::Orc | Op::Xorc => self.exec_ccr_logic(bus, insn),

            Op::Shift(kind) => self.exec_shift(bus, kind, insn),

            Op::Bset
            | Op::Bclr
            | Op::Bnot
            | Op::Btst
            | Op::Bld
            | Op::Bild
            | Op::Bst
            | Op::Bist
            | Op::Band
            | Op::Biand
            | Op::Bor
            | Op::Bior
            | Op::Bxor
            | Op::Bixor => self.exec_bit(bus, insn),

            Op::Bcc(cond) => self.exec_bcc(cond, insn, next),
            Op::Bsr | Op::Jsr => self.exec_call(bus, insn, next),
            Op::Jmp => self.exec_jmp(bus, insn, next),
            Op::Rts => self.exec_rts(bus),

            Op::Ldc => self.exec_ldc(bus, insn),
            Op::Stc => self.exec_stc(bus, insn),

            Op::Rte | Op::Trapa => {
                log::error!("unimplemented {:?} at 0x{:04X}", insn.op, self.pc);
                return Err(CpuError::Unimplemented {
                    pc: self.pc,
                    mnemonic: insn.op.mnemonic(),
                });
            }
        };
        Ok(flow)
    }
}
