//! Instruction decoder.
//!
//! Decoding is a pure function of the instruction bytes. The first byte
//! selects a handler through a 256-entry dispatch table that is built once
//! from `(mask, pattern)` entries; each handler pulls whatever extension
//! words its encoding needs and produces an [`Instruction`].

use lazy_static::lazy_static;
use thiserror::Error;

use super::ccr::Condition;

/// Longest encoding: `MOV.L @(d:24,ERs),ERd` (prefix + 4 words).
pub const MAX_INSTRUCTION_LEN: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Size {
    Byte,
    Word,
    Long,
}

impl Size {
    #[inline]
    pub fn bytes(self) -> u32 {
        match self {
            Size::Byte => 1,
            Size::Word => 2,
            Size::Long => 4,
        }
    }

    #[inline]
    pub fn mask(self) -> u32 {
        match self {
            Size::Byte => 0xFF,
            Size::Word => 0xFFFF,
            Size::Long => 0xFFFF_FFFF,
        }
    }

    #[inline]
    pub fn sign_bit(self) -> u32 {
        match self {
            Size::Byte => 0x80,
            Size::Word => 0x8000,
            Size::Long => 0x8000_0000,
        }
    }

    /// Low part used for the half-carry: nibble, byte or halfword.
    #[inline]
    pub fn low_mask(self) -> u32 {
        match self {
            Size::Byte => 0xF,
            Size::Word => 0xFF,
            Size::Long => 0xFFFF,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Size::Byte => ".b",
            Size::Word => ".w",
            Size::Long => ".l",
        }
    }
}

/// Operand location as encoded in the instruction.
///
/// Register fields keep the raw 4-bit nibble; which view it names (RnH/RnL,
/// Rn/En or ERn) follows from the operand size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    None,
    Reg(u8),
    Imm(u32),
    /// `@aa:8`, always in the 0xFF00 page.
    Abs8(u8),
    Abs16(u16),
    Abs24(u32),
    /// `@ERn`
    Ind(u8),
    /// `@(d:16,ERn)`
    Disp16(u8, i16),
    /// `@(d:24,ERn)`
    Disp24(u8, i32),
    /// `@ERn+`
    PostInc(u8),
    /// `@-ERn`
    PreDec(u8),
    /// `@@aa:8`, branch target read from a vector in page zero.
    MemInd(u8),
    /// 8-bit PC-relative displacement.
    Pc8(i8),
    /// 16-bit PC-relative displacement.
    Pc16(i16),
    Ccr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Nop,
    Sleep,
    Mov,
    Eepmov,
    Add,
    Addx,
    Adds,
    Inc,
    Sub,
    Subx,
    Subs,
    Dec,
    Cmp,
    Neg,
    Daa,
    Das,
    Mulxu,
    Mulxs,
    Divxu,
    Divxs,
    Extu,
    Exts,
    And,
    Or,
    Xor,
    Not,
    Shift(Shift),
    Bset,
    Bclr,
    Bnot,
    Btst,
    Bld,
    Bild,
    Bst,
    Bist,
    Band,
    Biand,
    Bor,
    Bior,
    Bxor,
    Bixor,
    Bcc(Condition),
    Bsr,
    Jmp,
    Jsr,
    Rts,
    Rte,
    Trapa,
    Ldc,
    Stc,
    Andc,
    Orc,
    Xorc,
}

/// One-bit shift and rotate kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shift {
    Shll,
    Shlr,
    Shal,
    Shar,
    Rotl,
    Rotr,
    /// Rotate left through C.
    Rotxl,
    /// Rotate right through C.
    Rotxr,
}

/// A fully decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub op: Op,
    pub size: Size,
    pub src: Operand,
    pub dst: Operand,
    /// Number of bytes consumed, opcode word included.
    pub len: u8,
}

impl Instruction {
    fn new(op: Op, size: Size, src: Operand, dst: Operand) -> Self {
        Self {
            op,
            size,
            src,
            dst,
            len: 0,
        }
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("undefined instruction word 0x{word:04X}")]
    Undefined { word: u16 },
    #[error("undefined extension word 0x{ext:04X} after 0x{word:04X}")]
    UndefinedExtension { word: u16, ext: u16 },
    #[error("instruction needs {needed} bytes but only {available} are available")]
    Truncated { needed: usize, available: usize },
}

/// Knobs for encodings whose interpretation is not settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Decode `7C/7E .. 75 ..` with the inverted/plain XOR pair swapped.
    pub memory_bit_xor_swapped: bool,
}

/// Decode one instruction from the start of `bytes`.
pub fn decode(bytes: &[u8]) -> Result<Instruction, DecodeError> {
    decode_with(bytes, DecodeOptions::default())
}

pub fn decode_with(bytes: &[u8], options: DecodeOptions) -> Result<Instruction, DecodeError> {
    let mut fetch = Fetch::new(bytes, options)?;
    let handler = DISPATCH[fetch.b0 as usize];
    let mut insn = handler(&mut fetch)?;
    insn.len = fetch.pos as u8;
    Ok(insn)
}

type Handler = fn(&mut Fetch<'_>) -> Result<Instruction, DecodeError>;

/// First-byte patterns. Earlier entries win.
const PATTERNS: &[(u8, u8, Handler)] = &[
    (0xFF, 0x00, nop),
    (0xFF, 0x01, prefix_01),
    (0xFF, 0x02, stc_reg),
    (0xFF, 0x03, ldc_reg),
    (0xFC, 0x04, ccr_imm),
    (0xEF, 0x0A, inc_dec_byte_or_long_arith),
    (0xEF, 0x0B, adds_subs_inc_dec),
    (0xEF, 0x0F, daa_das_or_long_move),
    (0xFF, 0x17, not_neg_ext),
    (0xFC, 0x10, shift),
    (0xF0, 0x00, reg_reg),
    (0xF0, 0x10, reg_reg),
    (0xF0, 0x20, mov_abs8),
    (0xF0, 0x30, mov_abs8),
    (0xF0, 0x40, bcc8),
    (0xFC, 0x50, mul_div),
    (0xFF, 0x54, rts_rte),
    (0xFF, 0x56, rts_rte),
    (0xFF, 0x57, trapa),
    (0xFF, 0x55, bsr8),
    (0xFF, 0x5C, bsr16),
    (0xFF, 0x58, bcc16),
    (0xFB, 0x59, jump_indirect),
    (0xFB, 0x5A, jump_abs24),
    (0xFB, 0x5B, jump_mem_indirect),
    (0xFC, 0x60, bit_reg),
    (0xFF, 0x67, bit_store_reg),
    (0xFC, 0x64, reg_reg),
    (0xF8, 0x68, mov_mem),
    (0xFC, 0x70, bit_imm_reg),
    (0xFC, 0x74, bit_logic_reg),
    (0xFF, 0x78, mov_mem),
    (0xFF, 0x79, imm_arith),
    (0xFF, 0x7A, imm_arith),
    (0xFF, 0x7B, eepmov),
    (0xFC, 0x7C, bit_mem),
    (0x80, 0x80, imm8),
];

fn undefined(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    Err(f.undefined())
}

lazy_static! {
    static ref DISPATCH: [Handler; 256] = {
        let mut table = [undefined as Handler; 256];
        for (byte, slot) in table.iter_mut().enumerate() {
            let byte = byte as u8;
            if let Some((_, _, handler)) = PATTERNS
                .iter()
                .find(|(mask, pattern, _)| byte & mask == *pattern)
            {
                *slot = *handler;
            }
        }
        table
    };
}

/// Cursor over the instruction bytes.
///
/// The opcode word is split into four nibbles: `ah al bh bl`.
struct Fetch<'a> {
    bytes: &'a [u8],
    pos: usize,
    options: DecodeOptions,
    b0: u8,
    b1: u8,
}

impl<'a> Fetch<'a> {
    fn new(bytes: &'a [u8], options: DecodeOptions) -> Result<Self, DecodeError> {
        if bytes.len() < 2 {
            return Err(DecodeError::Truncated {
                needed: 2,
                available: bytes.len(),
            });
        }
        Ok(Self {
            bytes,
            pos: 2,
            options,
            b0: bytes[0],
            b1: bytes[1],
        })
    }

    #[inline]
    fn word0(&self) -> u16 {
        u16::from_be_bytes([self.b0, self.b1])
    }

    #[inline]
    fn al(&self) -> u8 {
        self.b0 & 0xF
    }

    #[inline]
    fn bh(&self) -> u8 {
        self.b1 >> 4
    }

    #[inline]
    fn bl(&self) -> u8 {
        self.b1 & 0xF
    }

    fn undefined(&self) -> DecodeError {
        DecodeError::Undefined { word: self.word0() }
    }

    fn undefined_ext(&self, ext: u16) -> DecodeError {
        DecodeError::UndefinedExtension {
            word: self.word0(),
            ext,
        }
    }

    fn byte(&mut self) -> Result<u8, DecodeError> {
        let value = *self.bytes.get(self.pos).ok_or(DecodeError::Truncated {
            needed: self.pos + 1,
            available: self.bytes.len(),
        })?;
        self.pos += 1;
        Ok(value)
    }

    fn word(&mut self) -> Result<u16, DecodeError> {
        let hi = self.byte()?;
        let lo = self.byte()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn long(&mut self) -> Result<u32, DecodeError> {
        let hi = self.word()? as u32;
        let lo = self.word()? as u32;
        Ok((hi << 16) | lo)
    }

    /// `00 aa aa aa`: a 24-bit field carried in a long extension.
    fn field24(&mut self) -> Result<u32, DecodeError> {
        let value = self.long()?;
        if value >> 24 != 0 {
            return Err(self.undefined_ext((value >> 16) as u16));
        }
        Ok(value)
    }
}

#[inline]
fn sign_extend24(value: u32) -> i32 {
    ((value << 8) as i32) >> 8
}

/// ERn fields must have bit 3 clear.
#[inline]
fn er_field(f: &Fetch<'_>, field: u8) -> Result<u8, DecodeError> {
    if field & 0x8 != 0 {
        Err(f.undefined())
    } else {
        Ok(field)
    }
}

fn nop(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    if f.b1 != 0 {
        return Err(f.undefined());
    }
    Ok(Instruction::new(Op::Nop, Size::Byte, Operand::None, Operand::None))
}

fn prefix_01(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    match f.b1 {
        0x00 => {
            let ext = f.word()?;
            let [c0, c1] = ext.to_be_bytes();
            let (mem, reg, store) = mem_form(f, Size::Long, c0, c1)?;
            let reg = Operand::Reg(er_field(f, reg).map_err(|_| f.undefined_ext(ext))?);
            Ok(if store {
                Instruction::new(Op::Mov, Size::Long, reg, mem)
            } else {
                Instruction::new(Op::Mov, Size::Long, mem, reg)
            })
        }
        0x40 => {
            let ext = f.word()?;
            let [c0, c1] = ext.to_be_bytes();
            if c0 == 0x69 || c0 == 0x6D || c0 == 0x6F || c0 == 0x78 || c0 == 0x6B {
                let (mem, reg, store) = mem_form(f, Size::Word, c0, c1)?;
                if reg != 0 {
                    return Err(f.undefined_ext(ext));
                }
                Ok(if store {
                    Instruction::new(Op::Stc, Size::Word, Operand::Ccr, mem)
                } else {
                    Instruction::new(Op::Ldc, Size::Word, mem, Operand::Ccr)
                })
            } else {
                Err(f.undefined_ext(ext))
            }
        }
        0x80 => Ok(Instruction::new(
            Op::Sleep,
            Size::Byte,
            Operand::None,
            Operand::None,
        )),
        0xC0 | 0xD0 => {
            let ext = f.word()?;
            let [c0, c1] = ext.to_be_bytes();
            let (rs, rd) = (c1 >> 4, c1 & 0xF);
            let (op, size) = match (f.b1, c0) {
                (0xC0, 0x50) => (Op::Mulxs, Size::Byte),
                (0xC0, 0x52) => (Op::Mulxs, Size::Word),
                (0xD0, 0x51) => (Op::Divxs, Size::Byte),
                (0xD0, 0x53) => (Op::Divxs, Size::Word),
                _ => return Err(f.undefined_ext(ext)),
            };
            if size == Size::Word && rd & 0x8 != 0 {
                return Err(f.undefined_ext(ext));
            }
            Ok(Instruction::new(op, size, Operand::Reg(rs), Operand::Reg(rd)))
        }
        0xF0 => {
            let ext = f.word()?;
            let [c0, c1] = ext.to_be_bytes();
            let (rs, rd) = (c1 >> 4, c1 & 0xF);
            let op = match c0 {
                0x64 => Op::Or,
                0x65 => Op::Xor,
                0x66 => Op::And,
                _ => return Err(f.undefined_ext(ext)),
            };
            if rs & 0x8 != 0 || rd & 0x8 != 0 {
                return Err(f.undefined_ext(ext));
            }
            Ok(Instruction::new(op, Size::Long, Operand::Reg(rs), Operand::Reg(rd)))
        }
        _ => Err(f.undefined()),
    }
}

fn stc_reg(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    if f.bh() != 0 {
        return Err(f.undefined());
    }
    Ok(Instruction::new(
        Op::Stc,
        Size::Byte,
        Operand::Ccr,
        Operand::Reg(f.bl()),
    ))
}

fn ldc_reg(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    if f.bh() != 0 {
        return Err(f.undefined());
    }
    Ok(Instruction::new(
        Op::Ldc,
        Size::Byte,
        Operand::Reg(f.bl()),
        Operand::Ccr,
    ))
}

fn ccr_imm(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let op = match f.b0 {
        0x04 => Op::Orc,
        0x05 => Op::Xorc,
        0x06 => Op::Andc,
        _ => Op::Ldc,
    };
    Ok(Instruction::new(
        op,
        Size::Byte,
        Operand::Imm(f.b1 as u32),
        Operand::Ccr,
    ))
}

/// Two-register forms `op Rs,Rd` for bytes and words.
fn reg_reg(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let (op, size) = match f.b0 {
        0x08 => (Op::Add, Size::Byte),
        0x09 => (Op::Add, Size::Word),
        0x0C => (Op::Mov, Size::Byte),
        0x0D => (Op::Mov, Size::Word),
        0x0E => (Op::Addx, Size::Byte),
        0x14 => (Op::Or, Size::Byte),
        0x15 => (Op::Xor, Size::Byte),
        0x16 => (Op::And, Size::Byte),
        0x18 => (Op::Sub, Size::Byte),
        0x19 => (Op::Sub, Size::Word),
        0x1C => (Op::Cmp, Size::Byte),
        0x1D => (Op::Cmp, Size::Word),
        0x1E => (Op::Subx, Size::Byte),
        0x64 => (Op::Or, Size::Word),
        0x65 => (Op::Xor, Size::Word),
        0x66 => (Op::And, Size::Word),
        _ => return Err(f.undefined()),
    };
    Ok(Instruction::new(
        op,
        size,
        Operand::Reg(f.bh()),
        Operand::Reg(f.bl()),
    ))
}

/// `0A`/`1A`: INC.B/DEC.B Rd, or ADD.L/SUB.L ERs,ERd.
fn inc_dec_byte_or_long_arith(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let is_sub = f.b0 & 0x10 != 0;
    let (bh, bl) = (f.bh(), f.bl());
    if bh == 0 {
        let op = if is_sub { Op::Dec } else { Op::Inc };
        return Ok(Instruction::new(
            op,
            Size::Byte,
            Operand::Imm(1),
            Operand::Reg(bl),
        ));
    }
    if bh & 0x8 == 0 {
        return Err(f.undefined());
    }
    let op = if is_sub { Op::Sub } else { Op::Add };
    Ok(Instruction::new(
        op,
        Size::Long,
        Operand::Reg(bh & 0x7),
        Operand::Reg(er_field(f, bl)?),
    ))
}

/// `0B`/`1B`: ADDS/SUBS and the word/long INC/DEC forms.
fn adds_subs_inc_dec(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let is_sub = f.b0 & 0x10 != 0;
    let bl = f.bl();
    let (op, size, step) = match (f.bh(), is_sub) {
        (0x0, false) => (Op::Adds, Size::Long, 1),
        (0x8, false) => (Op::Adds, Size::Long, 2),
        (0x9, false) => (Op::Adds, Size::Long, 4),
        (0x0, true) => (Op::Subs, Size::Long, 1),
        (0x8, true) => (Op::Subs, Size::Long, 2),
        (0x9, true) => (Op::Subs, Size::Long, 4),
        (0x5, false) => (Op::Inc, Size::Word, 1),
        (0xD, false) => (Op::Inc, Size::Word, 2),
        (0x7, false) => (Op::Inc, Size::Long, 1),
        (0xF, false) => (Op::Inc, Size::Long, 2),
        (0x5, true) => (Op::Dec, Size::Word, 1),
        (0xD, true) => (Op::Dec, Size::Word, 2),
        (0x7, true) => (Op::Dec, Size::Long, 1),
        (0xF, true) => (Op::Dec, Size::Long, 2),
        _ => return Err(f.undefined()),
    };
    let dst = if size == Size::Long {
        er_field(f, bl)?
    } else {
        bl
    };
    Ok(Instruction::new(
        op,
        size,
        Operand::Imm(step),
        Operand::Reg(dst),
    ))
}

/// `0F`/`1F`: DAA/DAS Rd, or MOV.L/CMP.L ERs,ERd.
fn daa_das_or_long_move(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let is_1f = f.b0 & 0x10 != 0;
    let (bh, bl) = (f.bh(), f.bl());
    if bh == 0 {
        let op = if is_1f { Op::Das } else { Op::Daa };
        return Ok(Instruction::new(
            op,
            Size::Byte,
            Operand::None,
            Operand::Reg(bl),
        ));
    }
    if bh & 0x8 == 0 {
        return Err(f.undefined());
    }
    let op = if is_1f { Op::Cmp } else { Op::Mov };
    Ok(Instruction::new(
        op,
        Size::Long,
        Operand::Reg(bh & 0x7),
        Operand::Reg(er_field(f, bl)?),
    ))
}

fn shift(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let (bh, bl) = (f.bh(), f.bl());
    let size = match bh & 0x7 {
        0 => Size::Byte,
        1 => Size::Word,
        3 => Size::Long,
        _ => return Err(f.undefined()),
    };
    let alt = bh & 0x8 != 0;
    let kind = match (f.b0, alt) {
        (0x10, false) => Shift::Shll,
        (0x10, true) => Shift::Shal,
        (0x11, false) => Shift::Shlr,
        (0x11, true) => Shift::Shar,
        (0x12, false) => Shift::Rotxl,
        (0x12, true) => Shift::Rotl,
        (0x13, false) => Shift::Rotxr,
        _ => Shift::Rotr,
    };
    let dst = if size == Size::Long {
        er_field(f, bl)?
    } else {
        bl
    };
    Ok(Instruction::new(
        Op::Shift(kind),
        size,
        Operand::None,
        Operand::Reg(dst),
    ))
}

fn not_neg_ext(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let bl = f.bl();
    let (op, size) = match f.bh() {
        0x0 => (Op::Not, Size::Byte),
        0x1 => (Op::Not, Size::Word),
        0x3 => (Op::Not, Size::Long),
        0x5 => (Op::Extu, Size::Word),
        0x7 => (Op::Extu, Size::Long),
        0x8 => (Op::Neg, Size::Byte),
        0x9 => (Op::Neg, Size::Word),
        0xB => (Op::Neg, Size::Long),
        0xD => (Op::Exts, Size::Word),
        0xF => (Op::Exts, Size::Long),
        _ => return Err(f.undefined()),
    };
    let dst = if size == Size::Long {
        er_field(f, bl)?
    } else {
        bl
    };
    Ok(Instruction::new(op, size, Operand::None, Operand::Reg(dst)))
}

/// `2r aa` / `3r aa`: MOV.B between a register and `@aa:8`.
fn mov_abs8(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let reg = Operand::Reg(f.al());
    let mem = Operand::Abs8(f.b1);
    Ok(if f.b0 & 0xF0 == 0x20 {
        Instruction::new(Op::Mov, Size::Byte, mem, reg)
    } else {
        Instruction::new(Op::Mov, Size::Byte, reg, mem)
    })
}

fn bcc8(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    Ok(Instruction::new(
        Op::Bcc(Condition::from_nibble(f.al())),
        Size::Byte,
        Operand::None,
        Operand::Pc8(f.b1 as i8),
    ))
}

fn bcc16(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    if f.bl() != 0 {
        return Err(f.undefined());
    }
    let disp = f.word()? as i16;
    Ok(Instruction::new(
        Op::Bcc(Condition::from_nibble(f.bh())),
        Size::Word,
        Operand::None,
        Operand::Pc16(disp),
    ))
}

fn bsr8(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    Ok(Instruction::new(
        Op::Bsr,
        Size::Byte,
        Operand::None,
        Operand::Pc8(f.b1 as i8),
    ))
}

fn bsr16(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    if f.b1 != 0 {
        return Err(f.undefined());
    }
    let disp = f.word()? as i16;
    Ok(Instruction::new(
        Op::Bsr,
        Size::Word,
        Operand::None,
        Operand::Pc16(disp),
    ))
}

/// `50`-`53`: MULXU/DIVXU, byte and word forms.
fn mul_div(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let (op, size) = match f.b0 {
        0x50 => (Op::Mulxu, Size::Byte),
        0x51 => (Op::Divxu, Size::Byte),
        0x52 => (Op::Mulxu, Size::Word),
        _ => (Op::Divxu, Size::Word),
    };
    let rd = if size == Size::Word {
        er_field(f, f.bl())?
    } else {
        f.bl()
    };
    Ok(Instruction::new(
        op,
        size,
        Operand::Reg(f.bh()),
        Operand::Reg(rd),
    ))
}

fn rts_rte(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    if f.b1 != 0x70 {
        return Err(f.undefined());
    }
    let op = if f.b0 == 0x54 { Op::Rts } else { Op::Rte };
    Ok(Instruction::new(op, Size::Word, Operand::None, Operand::None))
}

fn trapa(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    if f.bl() != 0 || f.bh() & 0xC != 0 {
        return Err(f.undefined());
    }
    Ok(Instruction::new(
        Op::Trapa,
        Size::Byte,
        Operand::Imm(f.bh() as u32),
        Operand::None,
    ))
}

#[inline]
fn jump_op(f: &Fetch<'_>) -> Op {
    if f.b0 & 0x4 != 0 {
        Op::Jsr
    } else {
        Op::Jmp
    }
}

fn jump_indirect(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    if f.bl() != 0 {
        return Err(f.undefined());
    }
    let reg = er_field(f, f.bh())?;
    Ok(Instruction::new(
        jump_op(f),
        Size::Word,
        Operand::None,
        Operand::Ind(reg),
    ))
}

fn jump_abs24(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let low = f.word()? as u32;
    let addr = ((f.b1 as u32) << 16) | low;
    Ok(Instruction::new(
        jump_op(f),
        Size::Word,
        Operand::None,
        Operand::Abs24(addr),
    ))
}

fn jump_mem_indirect(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    Ok(Instruction::new(
        jump_op(f),
        Size::Word,
        Operand::None,
        Operand::MemInd(f.b1),
    ))
}

/// `60`-`63`: BSET/BNOT/BCLR/BTST Rn,Rd.
fn bit_reg(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    Ok(Instruction::new(
        bit_rn_op(f.b0),
        Size::Byte,
        Operand::Reg(f.bh()),
        Operand::Reg(f.bl()),
    ))
}

fn bit_rn_op(code: u8) -> Op {
    match code & 0x3 {
        0 => Op::Bset,
        1 => Op::Bnot,
        2 => Op::Bclr,
        _ => Op::Btst,
    }
}

/// `67`: BST/BIST #xx:3,Rd.
fn bit_store_reg(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let bh = f.bh();
    let op = if bh & 0x8 != 0 { Op::Bist } else { Op::Bst };
    Ok(Instruction::new(
        op,
        Size::Byte,
        Operand::Imm((bh & 0x7) as u32),
        Operand::Reg(f.bl()),
    ))
}

/// `70`-`73`: BSET/BNOT/BCLR/BTST #xx:3,Rd.
fn bit_imm_reg(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let bh = f.bh();
    if bh & 0x8 != 0 {
        return Err(f.undefined());
    }
    Ok(Instruction::new(
        bit_rn_op(f.b0),
        Size::Byte,
        Operand::Imm(bh as u32),
        Operand::Reg(f.bl()),
    ))
}

fn bit_logic_op(code: u8, invert: bool) -> Op {
    match (code & 0x3, invert) {
        (0, false) => Op::Bor,
        (0, true) => Op::Bior,
        (1, false) => Op::Bxor,
        (1, true) => Op::Bixor,
        (2, false) => Op::Band,
        (2, true) => Op::Biand,
        (_, false) => Op::Bld,
        (_, true) => Op::Bild,
    }
}

/// `74`-`77`: BOR/BXOR/BAND/BLD and their inverted forms on a register.
fn bit_logic_reg(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let bh = f.bh();
    Ok(Instruction::new(
        bit_logic_op(f.b0, bh & 0x8 != 0),
        Size::Byte,
        Operand::Imm((bh & 0x7) as u32),
        Operand::Reg(f.bl()),
    ))
}

/// `7C`-`7F`: bit instructions whose operand is `@ERd` or `@aa:8`.
fn bit_mem(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let dst = if f.b0 & 0x2 == 0 {
        if f.bl() != 0 {
            return Err(f.undefined());
        }
        Operand::Ind(er_field(f, f.bh())?)
    } else {
        Operand::Abs8(f.b1)
    };
    let writes = f.b0 & 0x1 != 0;
    let ext = f.word()?;
    let [c0, c1] = ext.to_be_bytes();
    if c1 & 0xF != 0 {
        return Err(f.undefined_ext(ext));
    }
    let field = c1 >> 4;
    let imm = Operand::Imm((field & 0x7) as u32);
    let (op, src) = match (writes, c0) {
        (false, 0x63) => (Op::Btst, Operand::Reg(field)),
        (false, 0x73) if field & 0x8 == 0 => (Op::Btst, imm),
        (false, 0x74..=0x77) => {
            let mut invert = field & 0x8 != 0;
            if c0 == 0x75 && f.options.memory_bit_xor_swapped {
                invert = !invert;
            }
            (bit_logic_op(c0, invert), imm)
        }
        (true, 0x60..=0x62) => (bit_rn_op(c0), Operand::Reg(field)),
        (true, 0x70..=0x72) if field & 0x8 == 0 => (bit_rn_op(c0), imm),
        (true, 0x67) => {
            let op = if field & 0x8 != 0 { Op::Bist } else { Op::Bst };
            (op, imm)
        }
        _ => return Err(f.undefined_ext(ext)),
    };
    Ok(Instruction::new(op, Size::Byte, src, dst))
}

/// Register/memory MOV.B and MOV.W forms (`68`-`6F`, `78`).
fn mov_mem(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let size = match f.b0 {
        0x78 => Size::Byte,
        b if b & 0x1 == 0 => Size::Byte,
        _ => Size::Word,
    };
    let (b0, b1) = (f.b0, f.b1);
    let (mem, reg, store) = mem_form(f, size, b0, b1)?;
    // The 78 form carries its real size in the second word.
    let size = match mem {
        Operand::Disp24(..) if f.bytes.get(2) == Some(&0x6B) => Size::Word,
        _ => size,
    };
    let reg = Operand::Reg(reg);
    Ok(if store {
        Instruction::new(Op::Mov, size, reg, mem)
    } else {
        Instruction::new(Op::Mov, size, mem, reg)
    })
}

/// Decode the memory side of a MOV/LDC/STC encoding whose first word is
/// `c0 c1`. Returns the memory operand, the register field and whether the
/// transfer goes register -> memory.
fn mem_form(
    f: &mut Fetch<'_>,
    size: Size,
    c0: u8,
    c1: u8,
) -> Result<(Operand, u8, bool), DecodeError> {
    let word = u16::from_be_bytes([c0, c1]);
    let prefixed = f.b0 == 0x01;
    let bad = |f: &Fetch<'_>| {
        if prefixed {
            f.undefined_ext(word)
        } else {
            f.undefined()
        }
    };
    let (hi, lo) = (c1 >> 4, c1 & 0xF);
    let wide = size != Size::Byte;
    // Byte moves use the even opcode of each pair, word/long the odd one.
    let parity_ok = |code: u8| (code & 0x1 == 1) == wide;
    let store = hi & 0x8 != 0;
    let ern = hi & 0x7;
    match c0 {
        0x68 | 0x69 if parity_ok(c0) => Ok((Operand::Ind(ern), lo, store)),
        0x6C | 0x6D if parity_ok(c0) => {
            let mem = if store {
                Operand::PreDec(ern)
            } else {
                Operand::PostInc(ern)
            };
            Ok((mem, lo, store))
        }
        0x6E | 0x6F if parity_ok(c0) => {
            let disp = f.word()? as i16;
            Ok((Operand::Disp16(ern, disp), lo, store))
        }
        0x6A | 0x6B if parity_ok(c0) => match hi {
            0x0 | 0x8 => {
                let addr = f.word()?;
                Ok((Operand::Abs16(addr), lo, hi == 0x8))
            }
            0x2 | 0xA => {
                let addr = f.field24()?;
                Ok((Operand::Abs24(addr), lo, hi == 0xA))
            }
            _ => Err(bad(f)),
        },
        0x78 => {
            if lo != 0 || hi & 0x8 != 0 {
                return Err(bad(f));
            }
            let ext = f.word()?;
            let [d0, d1] = ext.to_be_bytes();
            let expected = if wide { 0x6B } else { 0x6A };
            // The MOV.B/MOV.W forms pick the size from the second word.
            let size_ok = d0 == expected || (f.b0 == 0x78 && (d0 == 0x6A || d0 == 0x6B));
            let (dh, dl) = (d1 >> 4, d1 & 0xF);
            if !size_ok || (dh != 0x2 && dh != 0xA) {
                return Err(DecodeError::UndefinedExtension { word, ext });
            }
            let disp = sign_extend24(f.field24()?);
            Ok((Operand::Disp24(hi, disp), dl, dh == 0xA))
        }
        _ => Err(bad(f)),
    }
}

/// `79`/`7A`: word/long immediate ALU forms.
fn imm_arith(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let long = f.b0 == 0x7A;
    let op = match f.bh() {
        0 => Op::Mov,
        1 => Op::Add,
        2 => Op::Cmp,
        3 => Op::Sub,
        4 => Op::Or,
        5 => Op::Xor,
        6 => Op::And,
        _ => return Err(f.undefined()),
    };
    if long {
        let rd = er_field(f, f.bl())?;
        let imm = f.long()?;
        Ok(Instruction::new(
            op,
            Size::Long,
            Operand::Imm(imm),
            Operand::Reg(rd),
        ))
    } else {
        let imm = f.word()? as u32;
        Ok(Instruction::new(
            op,
            Size::Word,
            Operand::Imm(imm),
            Operand::Reg(f.bl()),
        ))
    }
}

fn eepmov(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let size = match f.b1 {
        0x5C => Size::Byte,
        0xD4 => Size::Word,
        _ => return Err(f.undefined()),
    };
    let ext = f.word()?;
    if ext != 0x598F {
        return Err(f.undefined_ext(ext));
    }
    Ok(Instruction::new(
        Op::Eepmov,
        size,
        Operand::None,
        Operand::None,
    ))
}

/// `8r`-`Fr`: byte ALU with an 8-bit immediate.
fn imm8(f: &mut Fetch<'_>) -> Result<Instruction, DecodeError> {
    let op = match f.b0 >> 4 {
        0x8 => Op::Add,
        0x9 => Op::Addx,
        0xA => Op::Cmp,
        0xB => Op::Subx,
        0xC => Op::Or,
        0xD => Op::Xor,
        0xE => Op::And,
        _ => Op::Mov,
    };
    Ok(Instruction::new(
        op,
        Size::Byte,
        Operand::Imm(f.b1 as u32),
        Operand::Reg(f.al()),
    ))
}
