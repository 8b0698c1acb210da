use super::ccr::Ccr;
use super::decode::{Shift, Size};
use super::Cpu;

impl Cpu {
    #[inline]
    pub(super) fn set_flag(&mut self, flag: Ccr, value: bool) {
        self.ccr.set(flag, value);
    }

    /// N and Z from a result of the given width.
    #[inline]
    fn set_nz(&mut self, result: u32, size: Size) {
        self.set_flag(Ccr::N, result & size.sign_bit() != 0);
        self.set_flag(Ccr::Z, result & size.mask() == 0);
    }

    /// Flag update shared by MOV, logic ops and shift results: V cleared,
    /// N/Z from the value, C and H untouched.
    #[inline]
    pub(super) fn flags_mov(&mut self, value: u32, size: Size) {
        self.set_nz(value, size);
        self.set_flag(Ccr::V, false);
    }

    /// ADD/ADDX core. Returns the truncated sum and sets H N V C; Z is left
    /// to the caller since ADDX treats it differently.
    fn add_core(&mut self, a: u32, b: u32, carry_in: bool, size: Size) -> u32 {
        let mask = size.mask();
        let low = size.low_mask();
        let (a, b) = (a & mask, b & mask);
        let c = carry_in as u64;

        let full = a as u64 + b as u64 + c;
        let result = (full & mask as u64) as u32;
        let half = (a & low) as u64 + (b & low) as u64 + c;

        self.set_flag(Ccr::H, half > low as u64);
        self.set_flag(Ccr::N, result & size.sign_bit() != 0);
        self.set_flag(Ccr::V, !(a ^ b) & (result ^ a) & size.sign_bit() != 0);
        self.set_flag(Ccr::C, full > mask as u64);
        result
    }

    /// SUB/SUBX core, same contract as [`Cpu::add_core`].
    fn sub_core(&mut self, a: u32, b: u32, borrow_in: bool, size: Size) -> u32 {
        let mask = size.mask();
        let low = size.low_mask();
        let (a, b) = (a & mask, b & mask);
        let c = borrow_in as u64;

        let result = a.wrapping_sub(b).wrapping_sub(c as u32) & mask;

        self.set_flag(Ccr::H, (b & low) as u64 + c > (a & low) as u64);
        self.set_flag(Ccr::N, result & size.sign_bit() != 0);
        self.set_flag(Ccr::V, (a ^ b) & (a ^ result) & size.sign_bit() != 0);
        self.set_flag(Ccr::C, b as u64 + c > a as u64);
        result
    }

    pub(super) fn alu_add(&mut self, a: u32, b: u32, size: Size) -> u32 {
        let result = self.add_core(a, b, false, size);
        self.set_flag(Ccr::Z, result == 0);
        result
    }

    pub(super) fn alu_sub(&mut self, a: u32, b: u32, size: Size) -> u32 {
        let result = self.sub_core(a, b, false, size);
        self.set_flag(Ccr::Z, result == 0);
        result
    }

    /// ADDX: carry-in from C; Z can only be cleared, so multi-precision
    /// chains keep a running "all zero" result.
    pub(super) fn alu_addx(&mut self, a: u32, b: u32, size: Size) -> u32 {
        let result = self.add_core(a, b, self.ccr.c(), size);
        if result != 0 {
            self.set_flag(Ccr::Z, false);
        }
        result
    }

    pub(super) fn alu_subx(&mut self, a: u32, b: u32, size: Size) -> u32 {
        let result = self.sub_core(a, b, self.ccr.c(), size);
        if result != 0 {
            self.set_flag(Ccr::Z, false);
        }
        result
    }

    /// INC/DEC by a signed step: N Z V as for ADD, C and H preserved.
    pub(super) fn alu_inc(&mut self, a: u32, step: i32, size: Size) -> u32 {
        let mask = size.mask();
        let a = a & mask;
        let b = step as u32 & mask;
        let result = a.wrapping_add(b) & mask;

        self.set_nz(result, size);
        self.set_flag(Ccr::V, !(a ^ b) & (result ^ a) & size.sign_bit() != 0);
        result
    }

    /// One-bit shift or rotate of `value`; sets C from the bit shifted out
    /// and the rest of the flags through the MOV rule.
    pub(super) fn alu_shift(&mut self, kind: Shift, value: u32, size: Size) -> u32 {
        let mask = size.mask();
        let top = size.sign_bit();
        let value = value & mask;
        let old_c = self.ccr.c();

        let (result, carry) = match kind {
            Shift::Shll | Shift::Shal => ((value << 1) & mask, value & top != 0),
            Shift::Shlr => (value >> 1, value & 1 != 0),
            Shift::Shar => ((value >> 1) | (value & top), value & 1 != 0),
            Shift::Rotl => {
                let out = value & top != 0;
                (((value << 1) | out as u32) & mask, out)
            }
            Shift::Rotr => {
                let out = value & 1 != 0;
                ((value >> 1) | if out { top } else { 0 }, out)
            }
            Shift::Rotxl => (((value << 1) | old_c as u32) & mask, value & top != 0),
            Shift::Rotxr => ((value >> 1) | if old_c { top } else { 0 }, value & 1 != 0),
        };

        self.flags_mov(result, size);
        self.set_flag(Ccr::C, carry);
        if kind == Shift::Shal {
            self.set_flag(Ccr::V, carry != (result & top != 0));
        }
        result
    }

    /// Decimal adjust after a BCD addition.
    pub(super) fn alu_daa(&mut self, value: u8) -> u8 {
        let mut adjust = 0u8;
        let mut carry = self.ccr.c();
        if self.ccr.h() || value & 0x0F > 0x09 {
            adjust |= 0x06;
        }
        if carry || value > 0x99 {
            adjust |= 0x60;
            carry = true;
        }
        let result = value.wrapping_add(adjust);
        self.set_nz(result as u32, Size::Byte);
        self.set_flag(Ccr::C, carry);
        result
    }

    /// Decimal adjust after a BCD subtraction. C is kept.
    pub(super) fn alu_das(&mut self, value: u8) -> u8 {
        let mut adjust = 0u8;
        if self.ccr.h() {
            adjust |= 0x06;
        }
        if self.ccr.c() {
            adjust |= 0x60;
        }
        let result = value.wrapping_sub(adjust);
        self.set_nz(result as u32, Size::Byte);
        result
    }
}
