use crate::cpu::{Bus, MemoryBus};

use super::ssu::{OpenLine, SerialDevice, Ssu};

/// System bus: flat memory plus the serial unit mapped into it.
#[derive(Debug)]
pub struct MachineBus {
    pub(crate) memory: MemoryBus,
    pub(crate) ssu: Ssu,
}

impl Default for MachineBus {
    fn default() -> Self {
        Self::new(Box::new(OpenLine))
    }
}

impl MachineBus {
    pub fn new(device: Box<dyn SerialDevice>) -> Self {
        let mut bus = Self {
            memory: MemoryBus::new(),
            ssu: Ssu::new(device),
        };
        bus.ssu.reset(&mut bus.memory);
        bus
    }

    pub fn memory(&self) -> &MemoryBus {
        &self.memory
    }

    pub fn ssu(&self) -> &Ssu {
        &self.ssu
    }

    /// Writes performed by the instruction in flight.
    pub fn writes(&self) -> &[(u16, u8)] {
        self.memory.writes()
    }
}

impl Bus for MachineBus {
    #[inline]
    fn read8(&mut self, addr: u32) -> u8 {
        self.memory.read8(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u32, value: u8) {
        self.memory.write8(addr, value);
    }

    #[inline]
    fn peek8(&self, addr: u32) -> u8 {
        self.memory.peek8(addr)
    }

    fn begin_instruction(&mut self) {
        self.memory.begin_instruction();
    }

    /// Peripheral registers are serviced once the instruction is done, in
    /// the order the CPU wrote them.
    fn end_instruction(&mut self) {
        let Self { memory, ssu } = self;
        let writes: Vec<(u16, u8)> = memory.writes().to_vec();
        for (addr, value) in writes {
            ssu.service_write(memory, addr, value);
        }
        memory.end_instruction();
    }
}
