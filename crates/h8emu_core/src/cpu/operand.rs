use super::decode::{Operand, Size};
use super::{Bus, Cpu};

/// Concrete operand location after address resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Location {
    /// Register nibble; the view follows the access size.
    Reg(u8),
    Imm(u32),
    Mem(u32),
    Ccr,
}

impl Cpu {
    /// Resolve `operand` for an access of `size`.
    ///
    /// Post-increment and pre-decrement update the address register here,
    /// by the access width, so each operand must be resolved exactly once.
    pub(super) fn resolve(&mut self, operand: Operand, size: Size) -> Location {
        match operand {
            Operand::Reg(field) => Location::Reg(field),
            Operand::Imm(value) => Location::Imm(value),
            Operand::Ccr => Location::Ccr,
            Operand::Abs8(aa) => Location::Mem(0xFF00 | aa as u32),
            // Short absolute addresses live in the 0xFF0000 bank.
            Operand::Abs16(aa) => Location::Mem(aa as i16 as i32 as u32 & 0x00FF_FFFF),
            Operand::Abs24(aa) => Location::Mem(aa),
            Operand::Ind(n) => Location::Mem(self.regs.er(n as usize)),
            Operand::Disp16(n, d) => {
                Location::Mem(self.regs.er(n as usize).wrapping_add(d as i32 as u32))
            }
            Operand::Disp24(n, d) => Location::Mem(self.regs.er(n as usize).wrapping_add(d as u32)),
            Operand::PostInc(n) => {
                let addr = self.regs.er(n as usize);
                self.regs
                    .set_er(n as usize, addr.wrapping_add(size.bytes()));
                Location::Mem(addr)
            }
            Operand::PreDec(n) => {
                let addr = self.regs.er(n as usize).wrapping_sub(size.bytes());
                self.regs.set_er(n as usize, addr);
                Location::Mem(addr)
            }
            Operand::MemInd(aa) => Location::Mem(aa as u32),
            Operand::None | Operand::Pc8(_) | Operand::Pc16(_) => Location::Imm(0),
        }
    }

    pub(super) fn read_loc<B: Bus>(&mut self, bus: &mut B, loc: Location, size: Size) -> u32 {
        match loc {
            Location::Reg(field) => self.read_reg(field, size),
            Location::Imm(value) => value & size.mask(),
            Location::Ccr => self.ccr.bits() as u32,
            Location::Mem(addr) => match size {
                Size::Byte => bus.read8(addr) as u32,
                Size::Word => bus.read16(addr) as u32,
                Size::Long => bus.read32(addr),
            },
        }
    }

    pub(super) fn write_loc<B: Bus>(&mut self, bus: &mut B, loc: Location, size: Size, value: u32) {
        match loc {
            Location::Reg(field) => self.write_reg(field, size, value),
            Location::Ccr => self.set_ccr(value as u8),
            Location::Mem(addr) => match size {
                Size::Byte => bus.write8(addr, value as u8),
                Size::Word => bus.write16(addr, value as u16),
                Size::Long => bus.write32(addr, value),
            },
            Location::Imm(_) => {
                log::debug!("write to immediate operand ignored");
            }
        }
    }

    #[inline]
    pub(super) fn read_reg(&self, field: u8, size: Size) -> u32 {
        match size {
            Size::Byte => self.regs.reg8(field) as u32,
            Size::Word => self.regs.reg16(field) as u32,
            Size::Long => self.regs.er((field & 7) as usize),
        }
    }

    #[inline]
    pub(super) fn write_reg(&mut self, field: u8, size: Size, value: u32) {
        match size {
            Size::Byte => self.regs.set_reg8(field, value as u8),
            Size::Word => self.regs.set_reg16(field, value as u16),
            Size::Long => self.regs.set_er((field & 7) as usize, value),
        }
    }
}
