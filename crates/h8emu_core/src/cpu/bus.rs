/// Size of the single emulated address bank (64 KiB).
pub const MEMORY_SIZE: usize = 0x10000;

/// Every address is reduced to this many bits before it reaches memory.
pub const ADDRESS_MASK: u32 = 0xFFFF;

/// Abstraction over the H8 address space.
///
/// Addresses are passed at their nominal width (8, 16 or 24 bits) and
/// implementations reduce them modulo 64 KiB; an out-of-range address is
/// never an error. Multi-byte accesses are big-endian and are performed as
/// sequential byte accesses so that peripherals see every byte.
pub trait Bus {
    fn read8(&mut self, addr: u32) -> u8;
    fn write8(&mut self, addr: u32, value: u8);

    /// Side-effect-free read used for instruction fetch and tracing.
    fn peek8(&self, addr: u32) -> u8;

    fn read16(&mut self, addr: u32) -> u16 {
        let hi = self.read8(addr);
        let lo = self.read8(addr.wrapping_add(1));
        u16::from_be_bytes([hi, lo])
    }

    fn read32(&mut self, addr: u32) -> u32 {
        let hi = self.read16(addr) as u32;
        let lo = self.read16(addr.wrapping_add(2)) as u32;
        (hi << 16) | lo
    }

    fn write16(&mut self, addr: u32, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.write8(addr, hi);
        self.write8(addr.wrapping_add(1), lo);
    }

    fn write32(&mut self, addr: u32, value: u32) {
        self.write16(addr, (value >> 16) as u16);
        self.write16(addr.wrapping_add(2), value as u16);
    }

    /// Hook that marks the beginning of a single CPU instruction. Called by
    /// [`Cpu::step`](super::Cpu::step) before the fetch.
    fn begin_instruction(&mut self) {}

    /// Hook that finalises a single CPU instruction. Peripherals that react
    /// to register writes are serviced here, once per executed instruction.
    fn end_instruction(&mut self) {}
}

/// Flat 64 KiB memory with a per-instruction write log.
#[derive(Clone)]
pub struct MemoryBus {
    memory: [u8; MEMORY_SIZE],
    writes: Vec<(u16, u8)>,
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self {
            memory: [0; MEMORY_SIZE],
            writes: Vec::new(),
        }
    }
}

impl std::fmt::Debug for MemoryBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBus")
            .field("writes", &self.writes)
            .finish_non_exhaustive()
    }
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `data` into memory starting at `base`, wrapping at the end of
    /// the bank. Loading does not go through the write log.
    pub fn load(&mut self, base: u32, data: &[u8]) {
        for (offset, byte) in data.iter().enumerate() {
            let addr = base.wrapping_add(offset as u32) & ADDRESS_MASK;
            self.memory[addr as usize] = *byte;
        }
    }

    /// Store a byte without recording it in the write log. Used by
    /// peripherals updating their own registers.
    pub fn poke8(&mut self, addr: u32, value: u8) {
        self.memory[(addr & ADDRESS_MASK) as usize] = value;
    }

    /// Writes performed by the last instruction. The log is reset when the
    /// next one begins.
    pub fn writes(&self) -> &[(u16, u8)] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }
}

impl Bus for MemoryBus {
    #[inline]
    fn read8(&mut self, addr: u32) -> u8 {
        self.memory[(addr & ADDRESS_MASK) as usize]
    }

    #[inline]
    fn write8(&mut self, addr: u32, value: u8) {
        let addr = (addr & ADDRESS_MASK) as u16;
        self.memory[addr as usize] = value;
        self.writes.push((addr, value));
    }

    #[inline]
    fn peek8(&self, addr: u32) -> u8 {
        self.memory[(addr & ADDRESS_MASK) as usize]
    }

    fn begin_instruction(&mut self) {
        self.writes.clear();
    }
}
