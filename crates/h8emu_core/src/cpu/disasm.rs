//! Text rendering of decoded instructions, in lower-case H8 assembler
//! syntax with hex numbers.

use std::fmt;

use super::decode::{Instruction, Op, Operand, Shift, Size};

impl Op {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Nop => "nop",
            Op::Sleep => "sleep",
            Op::Mov => "mov",
            Op::Eepmov => "eepmov",
            Op::Add => "add",
            Op::Addx => "addx",
            Op::Adds => "adds",
            Op::Inc => "inc",
            Op::Sub => "sub",
            Op::Subx => "subx",
            Op::Subs => "subs",
            Op::Dec => "dec",
            Op::Cmp => "cmp",
            Op::Neg => "neg",
            Op::Daa => "daa",
            Op::Das => "das",
            Op::Mulxu => "mulxu",
            Op::Mulxs => "mulxs",
            Op::Divxu => "divxu",
            Op::Divxs => "divxs",
            Op::Extu => "extu",
            Op::Exts => "exts",
            Op::And => "and",
            Op::Or => "or",
            Op::Xor => "xor",
            Op::Not => "not",
            Op::Shift(kind) => kind.mnemonic(),
            Op::Bset => "bset",
            Op::Bclr => "bclr",
            Op::Bnot => "bnot",
            Op::Btst => "btst",
            Op::Bld => "bld",
            Op::Bild => "bild",
            Op::Bst => "bst",
            Op::Bist => "bist",
            Op::Band => "band",
            Op::Biand => "biand",
            Op::Bor => "bor",
            Op::Bior => "bior",
            Op::Bxor => "bxor",
            Op::Bixor => "bixor",
            Op::Bcc(cond) => cond.mnemonic(),
            Op::Bsr => "bsr",
            Op::Jmp => "jmp",
            Op::Jsr => "jsr",
            Op::Rts => "rts",
            Op::Rte => "rte",
            Op::Trapa => "trapa",
            Op::Ldc => "ldc",
            Op::Stc => "stc",
            Op::Andc => "andc",
            Op::Orc => "orc",
            Op::Xorc => "xorc",
        }
    }

    /// Whether the assembler spells out the operand size.
    fn sized(self) -> bool {
        matches!(
            self,
            Op::Mov
                | Op::Eepmov
                | Op::Add
                | Op::Sub
                | Op::Cmp
                | Op::Inc
                | Op::Dec
                | Op::Neg
                | Op::Mulxu
                | Op::Mulxs
                | Op::Divxu
                | Op::Divxs
                | Op::Extu
                | Op::Exts
                | Op::And
                | Op::Or
                | Op::Xor
                | Op::Not
                | Op::Shift(_)
        )
    }
}

impl Shift {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Shift::Shll => "shll",
            Shift::Shlr => "shlr",
            Shift::Shal => "shal",
            Shift::Shar => "shar",
            Shift::Rotl => "rotl",
            Shift::Rotr => "rotr",
            Shift::Rotxl => "rotxl",
            Shift::Rotxr => "rotxr",
        }
    }
}

impl Instruction {
    /// Render the instruction as if it were fetched from `pc`, so
    /// PC-relative targets print as absolute addresses.
    pub fn disassemble(&self, pc: u16) -> Disassembly<'_> {
        Disassembly { insn: self, pc }
    }
}

/// Displayable form returned by [`Instruction::disassemble`].
pub struct Disassembly<'a> {
    insn: &'a Instruction,
    pc: u16,
}

/// One operand with the register width it is shown at.
struct Shown {
    operand: Operand,
    size: Size,
    next: u16,
}

impl fmt::Display for Shown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Operand::None => Ok(()),
            Operand::Reg(field) => {
                let n = field & 7;
                let high = field & 0x8 != 0;
                match self.size {
                    Size::Byte => write!(f, "r{n}{}", if high { 'l' } else { 'h' }),
                    Size::Word => write!(f, "{}{n}", if high { 'e' } else { 'r' }),
                    Size::Long => write!(f, "er{n}"),
                }
            }
            Operand::Imm(value) => match self.size {
                Size::Byte => write!(f, "#0x{value:02x}"),
                Size::Word => write!(f, "#0x{value:04x}"),
                Size::Long => write!(f, "#0x{value:08x}"),
            },
            Operand::Abs8(aa) => write!(f, "@0x{aa:02x}:8"),
            Operand::Abs16(aa) => write!(f, "@0x{aa:04x}:16"),
            Operand::Abs24(aa) => write!(f, "@0x{aa:06x}:24"),
            Operand::Ind(n) => write!(f, "@er{n}"),
            Operand::Disp16(n, d) => write!(f, "@({},er{n})", signed_hex(d as i32)),
            Operand::Disp24(n, d) => write!(f, "@({},er{n})", signed_hex(d)),
            Operand::PostInc(n) => write!(f, "@er{n}+"),
            Operand::PreDec(n) => write!(f, "@-er{n}"),
            Operand::MemInd(aa) => write!(f, "@@0x{aa:02x}"),
            Operand::Pc8(d) => write!(f, "0x{:04x}", self.next.wrapping_add(d as i16 as u16)),
            Operand::Pc16(d) => write!(f, "0x{:04x}", self.next.wrapping_add(d as u16)),
            Operand::Ccr => f.write_str("ccr"),
        }
    }
}

fn signed_hex(value: i32) -> String {
    if value < 0 {
        format!("-0x{:x}", value.unsigned_abs())
    } else {
        format!("0x{value:x}")
    }
}

impl Disassembly<'_> {
    /// Register width used when printing the source and destination.
    fn operand_sizes(&self) -> (Size, Size) {
        let insn = self.insn;
        match insn.op {
            Op::Mulxu | Op::Mulxs | Op::Divxu | Op::Divxs => {
                let wide = if insn.size == Size::Byte {
                    Size::Word
                } else {
                    Size::Long
                };
                (insn.size, wide)
            }
            Op::Adds | Op::Subs => (Size::Byte, Size::Long),
            Op::Inc | Op::Dec => (Size::Byte, insn.size),
            _ => (insn.size, insn.size),
        }
    }

    fn shown(&self, operand: Operand, size: Size) -> Shown {
        Shown {
            operand,
            size,
            next: self.pc.wrapping_add(self.insn.len as u16),
        }
    }
}

impl fmt::Display for Disassembly<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let insn = self.insn;
        let suffix = if insn.op.sized() { insn.size.suffix() } else { "" };

        // PUSH/POP are MOV.W/L through the stack pointer.
        if insn.op == Op::Mov && insn.size != Size::Byte {
            match (insn.src, insn.dst) {
                (Operand::Reg(_), Operand::PreDec(7)) => {
                    return write!(f, "push{suffix} {}", self.shown(insn.src, insn.size));
                }
                (Operand::PostInc(7), Operand::Reg(_)) => {
                    return write!(f, "pop{suffix} {}", self.shown(insn.dst, insn.size));
                }
                _ => {}
            }
        }

        let (src_size, dst_size) = self.operand_sizes();
        // INC.B/DEC.B take no step operand.
        let src = match (insn.op, insn.size) {
            (Op::Inc | Op::Dec, Size::Byte) => Operand::None,
            _ => insn.src,
        };

        f.write_str(insn.op.mnemonic())?;
        f.write_str(suffix)?;
        let src_shown = self.shown(src, src_size);
        let dst_shown = self.shown(insn.dst, dst_size);
        match (src, insn.dst) {
            (Operand::None, Operand::None) => Ok(()),
            (Operand::None, _) => write!(f, " {dst_shown}"),
            (_, Operand::None) => write!(f, " {src_shown}"),
            _ => write!(f, " {src_shown},{dst_shown}"),
        }
    }
}
