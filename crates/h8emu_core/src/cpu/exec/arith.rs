use crate::cpu::ccr::Ccr;
use crate::cpu::decode::{Instruction, Op, Size};
use crate::cpu::{Bus, Cpu, Flow};

/// Width of the destination of MULX/DIVX: twice the source width.
#[inline]
fn widened(size: Size) -> Size {
    match size {
        Size::Byte => Size::Word,
        _ => Size::Long,
    }
}

#[inline]
fn sign_extend(value: u32, size: Size) -> i64 {
    match size {
        Size::Byte => value as u8 as i8 as i64,
        Size::Word => value as u16 as i16 as i64,
        Size::Long => value as i32 as i64,
    }
}

impl Cpu {
    /// ADD, ADDX, SUB, SUBX and CMP with a register or immediate source.
    pub(super) fn exec_arith<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let size = insn.size;
        let src = self.resolve(insn.src, size);
        let b = self.read_loc(bus, src, size);
        let dst = self.resolve(insn.dst, size);
        let a = self.read_loc(bus, dst, size);

        let result = match insn.op {
            Op::Add => self.alu_add(a, b, size),
            Op::Addx => self.alu_addx(a, b, size),
            Op::Sub => self.alu_sub(a, b, size),
            Op::Subx => self.alu_subx(a, b, size),
            _ => {
                self.alu_sub(a, b, size);
                return Flow::Next;
            }
        };
        self.write_loc(bus, dst, size, result);
        Flow::Next
    }

    /// ADDS/SUBS #1/2/4: plain 32-bit address arithmetic, no flags.
    pub(super) fn exec_adds_subs<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let src = self.resolve(insn.src, Size::Long);
        let step = self.read_loc(bus, src, Size::Long);
        let dst = self.resolve(insn.dst, Size::Long);
        let value = self.read_loc(bus, dst, Size::Long);
        let value = if insn.op == Op::Adds {
            value.wrapping_add(step)
        } else {
            value.wrapping_sub(step)
        };
        self.write_loc(bus, dst, Size::Long, value);
        Flow::Next
    }

    pub(super) fn exec_inc_dec<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let size = insn.size;
        let src = self.resolve(insn.src, size);
        let step = self.read_loc(bus, src, size) as i32;
        let step = if insn.op == Op::Dec { -step } else { step };
        let dst = self.resolve(insn.dst, size);
        let value = self.read_loc(bus, dst, size);
        let result = self.alu_inc(value, step, size);
        self.write_loc(bus, dst, size, result);
        Flow::Next
    }

    pub(super) fn exec_neg<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let size = insn.size;
        let dst = self.resolve(insn.dst, size);
        let value = self.read_loc(bus, dst, size);
        let result = self.alu_sub(0, value, size);
        self.write_loc(bus, dst, size, result);
        Flow::Next
    }

    pub(super) fn exec_decimal_adjust<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let dst = self.resolve(insn.dst, Size::Byte);
        let value = self.read_loc(bus, dst, Size::Byte) as u8;
        let result = if insn.op == Op::Daa {
            self.alu_daa(value)
        } else {
            self.alu_das(value)
        };
        self.write_loc(bus, dst, Size::Byte, result as u32);
        Flow::Next
    }

    /// MULXU/MULXS: the low half of Rd times Rs, result in all of Rd.
    pub(super) fn exec_mul<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let narrow = insn.size;
        let wide = widened(narrow);
        let rs = self.resolve(insn.src, narrow);
        let rd = self.resolve(insn.dst, wide);

        let multiplier = self.read_loc(bus, rs, narrow);
        let multiplicand = self.read_loc(bus, rd, wide) & narrow.mask();

        let product = if insn.op == Op::Mulxs {
            let product =
                (sign_extend(multiplicand, narrow) * sign_extend(multiplier, narrow)) as u32
                    & wide.mask();
            self.set_flag(Ccr::N, product & wide.sign_bit() != 0);
            self.set_flag(Ccr::Z, product == 0);
            product
        } else {
            multiplicand * multiplier
        };
        self.write_loc(bus, rd, wide, product);
        Flow::Next
    }

    /// DIVXU/DIVXS: Rd (double width) divided by Rs. The quotient goes to
    /// the low half of Rd, the remainder to the high half.
    pub(super) fn exec_div<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let narrow = insn.size;
        let wide = widened(narrow);
        let rs = self.resolve(insn.src, narrow);
        let rd = self.resolve(insn.dst, wide);
        let shift = narrow.bytes() * 8;

        let divisor = self.read_loc(bus, rs, narrow);
        let dividend = self.read_loc(bus, rd, wide);

        self.set_flag(Ccr::Z, divisor == 0);
        if insn.op == Op::Divxu {
            self.set_flag(Ccr::N, divisor & narrow.sign_bit() != 0);
        }
        if divisor == 0 {
            return Flow::Next;
        }

        let (quotient, remainder) = if insn.op == Op::Divxs {
            let dividend = sign_extend(dividend, wide);
            let divisor = sign_extend(divisor, narrow);
            let quotient = dividend / divisor;
            self.set_flag(Ccr::N, quotient < 0);
            (quotient as u32, (dividend % divisor) as u32)
        } else {
            (dividend / divisor, dividend % divisor)
        };

        let result = ((remainder & narrow.mask()) << shift) | (quotient & narrow.mask());
        self.write_loc(bus, rd, wide, result);
        Flow::Next
    }

    /// EXTU/EXTS: widen the low half of Rd/ERd in place.
    pub(super) fn exec_extend<B: Bus>(&mut self, bus: &mut B, insn: &Instruction) -> Flow {
        let size = insn.size;
        let half = match size {
            Size::Long => Size::Word,
            _ => Size::Byte,
        };
        let dst = self.resolve(insn.dst, size);
        let low = self.read_loc(bus, dst, size) & half.mask();
        let result = if insn.op == Op::Exts {
            sign_extend(low, half) as u32 & size.mask()
        } else {
            low
        };
        self.write_loc(bus, dst, size, result);
        self.flags_mov(result, size);
        Flow::Next
    }
}
