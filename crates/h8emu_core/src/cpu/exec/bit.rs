use crate::cpu::ccr::Ccr;
use crate::cpu::decode::{Instruction, Op, Size};
use crate::cpu::{Bus, Cpu, Flow};

impl Cpu {
    /// Bit manipulation on a byte register or a byte in memory.
    ///
    /// The bit number comes from a 3-bit immediate or from the low three
    /// bits of an 8-bit register.
    pub(super) fn exec_bit<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let src = self.resolve(insn.src, Size::Byte);
        let mask = 1u8 << (self.read_loc(bus, src, Size::Byte) & 7);

        let loc = self.resolve(insn.dst, Size::Byte);
        let value = self.read_loc(bus, loc, Size::Byte) as u8;
        let set = value & mask != 0;
        let c = self.ccr.c();

        let written = match insn.op {
            Op::Bset => Some(value | mask),
            Op::Bclr => Some(value & !mask),
            Op::Bnot => Some(value ^ mask),
            Op::Bst => Some(if c { value | mask } else { value & !mask }),
            Op::Bist => Some(if c { value & !mask } else { value | mask }),
            Op::Btst => {
                self.set_flag(Ccr::Z, !set);
                None
            }
            Op::Bld => {
                self.set_flag(Ccr::C, set);
                None
            }
            Op::Bild => {
                self.set_flag(Ccr::C, !set);
                None
            }
            Op::Band => {
                self.set_flag(Ccr::C, c & set);
                None
            }
            Op::Biand => {
                self.set_flag(Ccr::C, c & !set);
                None
            }
            Op::Bor => {
                self.set_flag(Ccr::C, c | set);
                None
            }
            Op::Bior => {
                self.set_flag(Ccr::C, c | !set);
                None
            }
            Op::Bxor => {
                self.set_flag(Ccr::C, c ^ set);
                None
            }
            Op::Bixor => {
                self.set_flag(Ccr::C, c ^ !set);
                None
            }
            _ => None,
        };

        if let Some(result) = written {
            self.write_loc(bus, loc, Size::Byte, result as u32);
        }
        Flow::Next
    }
}
