use bitflags::bitflags;

bitflags! {
    /// Condition code register.
    ///
    /// Bit layout matches the hardware CCR byte so LDC/STC can move it
    /// verbatim.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Ccr: u8 {
        /// Interrupt mask. Stored but never acted upon.
        const I = 1 << 7;
        const UI = 1 << 6;
        const H = 1 << 5;
        const U = 1 << 4;
        const N = 1 << 3;
        const Z = 1 << 2;
        const V = 1 << 1;
        const C = 1 << 0;
    }
}

impl Ccr {
    #[inline]
    pub fn c(self) -> bool {
        self.contains(Ccr::C)
    }

    #[inline]
    pub fn v(self) -> bool {
        self.contains(Ccr::V)
    }

    #[inline]
    pub fn z(self) -> bool {
        self.contains(Ccr::Z)
    }

    #[inline]
    pub fn n(self) -> bool {
        self.contains(Ccr::N)
    }

    #[inline]
    pub fn h(self) -> bool {
        self.contains(Ccr::H)
    }
}

/// Branch condition, numbered as in the `cc` field of Bcc.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    Always,
    Never,
    Hi,
    Ls,
    /// Carry clear (BHS).
    Cc,
    /// Carry set (BLO).
    Cs,
    Ne,
    Eq,
    Vc,
    Vs,
    Pl,
    Mi,
    Ge,
    Lt,
    Gt,
    Le,
}

impl Condition {
    pub const ALL: [Condition; 16] = [
        Condition::Always,
        Condition::Never,
        Condition::Hi,
        Condition::Ls,
        Condition::Cc,
        Condition::Cs,
        Condition::Ne,
        Condition::Eq,
        Condition::Vc,
        Condition::Vs,
        Condition::Pl,
        Condition::Mi,
        Condition::Ge,
        Condition::Lt,
        Condition::Gt,
        Condition::Le,
    ];

    #[inline]
    pub fn from_nibble(cc: u8) -> Self {
        Self::ALL[(cc & 0xF) as usize]
    }

    /// Evaluate the predicate against the current flags.
    pub fn holds(self, ccr: Ccr) -> bool {
        let (c, v, z, n) = (ccr.c(), ccr.v(), ccr.z(), ccr.n());
        match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::Hi => !(c | z),
            Condition::Ls => c | z,
            Condition::Cc => !c,
            Condition::Cs => c,
            Condition::Ne => !z,
            Condition::Eq => z,
            Condition::Vc => !v,
            Condition::Vs => v,
            Condition::Pl => !n,
            Condition::Mi => n,
            Condition::Ge => !(n ^ v),
            Condition::Lt => n ^ v,
            Condition::Gt => !(z | (n ^ v)),
            Condition::Le => z | (n ^ v),
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Condition::Always => "bra",
            Condition::Never => "brn",
            Condition::Hi => "bhi",
            Condition::Ls => "bls",
            Condition::Cc => "bcc",
            Condition::Cs => "bcs",
            Condition::Ne => "bne",
            Condition::Eq => "beq",
            Condition::Vc => "bvc",
            Condition::Vs => "bvs",
            Condition::Pl => "bpl",
            Condition::Mi => "bmi",
            Condition::Ge => "bge",
            Condition::Lt => "blt",
            Condition::Gt => "bgt",
            Condition::Le => "ble",
        }
    }
}
