/// General registers of the H8/300H.
///
/// Each of the eight 32-bit registers ERn is one big-endian byte buffer:
///
/// ```text
///  byte:   0      1      2      3
///        [ En (upper word) ][ Rn (lower word) ]
///                           [ RnH ][ RnL ]
/// ```
///
/// All narrower views are computed offsets into that buffer, so a write
/// through any view is visible through every overlapping one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    er: [[u8; 4]; 8],
}

/// Index of the register that doubles as the stack pointer.
pub const SP: usize = 7;

impl Registers {
    #[inline]
    pub fn er(&self, n: usize) -> u32 {
        u32::from_be_bytes(self.er[n & 7])
    }

    #[inline]
    pub fn set_er(&mut self, n: usize, value: u32) {
        self.er[n & 7] = value.to_be_bytes();
    }

    #[inline]
    pub fn e(&self, n: usize) -> u16 {
        let b = &self.er[n & 7];
        u16::from_be_bytes([b[0], b[1]])
    }

    #[inline]
    pub fn set_e(&mut self, n: usize, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        let b = &mut self.er[n & 7];
        b[0] = hi;
        b[1] = lo;
    }

    #[inline]
    pub fn r(&self, n: usize) -> u16 {
        let b = &self.er[n & 7];
        u16::from_be_bytes([b[2], b[3]])
    }

    #[inline]
    pub fn set_r(&mut self, n: usize, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        let b = &mut self.er[n & 7];
        b[2] = hi;
        b[3] = lo;
    }

    #[inline]
    pub fn rh(&self, n: usize) -> u8 {
        self.er[n & 7][2]
    }

    #[inline]
    pub fn set_rh(&mut self, n: usize, value: u8) {
        self.er[n & 7][2] = value;
    }

    #[inline]
    pub fn rl(&self, n: usize) -> u8 {
        self.er[n & 7][3]
    }

    #[inline]
    pub fn set_rl(&mut self, n: usize, value: u8) {
        self.er[n & 7][3] = value;
    }

    /// 8-bit register selected by an instruction nibble: bits 0-2 pick the
    /// register, bit 3 picks RnL (set) or RnH (clear).
    #[inline]
    pub fn reg8(&self, field: u8) -> u8 {
        let n = (field & 7) as usize;
        if field & 0x8 != 0 {
            self.rl(n)
        } else {
            self.rh(n)
        }
    }

    #[inline]
    pub fn set_reg8(&mut self, field: u8, value: u8) {
        let n = (field & 7) as usize;
        if field & 0x8 != 0 {
            self.set_rl(n, value);
        } else {
            self.set_rh(n, value);
        }
    }

    /// 16-bit register selected by an instruction nibble: bit 3 picks En
    /// (set) or Rn (clear).
    #[inline]
    pub fn reg16(&self, field: u8) -> u16 {
        let n = (field & 7) as usize;
        if field & 0x8 != 0 {
            self.e(n)
        } else {
            self.r(n)
        }
    }

    #[inline]
    pub fn set_reg16(&mut self, field: u8, value: u16) {
        let n = (field & 7) as usize;
        if field & 0x8 != 0 {
            self.set_e(n, value);
        } else {
            self.set_r(n, value);
        }
    }

    #[inline]
    pub fn sp(&self) -> u32 {
        self.er(SP)
    }

    #[inline]
    pub fn set_sp(&mut self, value: u32) {
        self.set_er(SP, value);
    }

    /// All eight ERn values, ER0 first.
    pub fn snapshot(&self) -> [u32; 8] {
        std::array::from_fn(|n| self.er(n))
    }
}
