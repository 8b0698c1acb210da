use super::ssu::SerialDevice;

/// Raw acceleration sample, one signed 10-bit value per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccelSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// Register-file accelerometer reached over the serial link.
///
/// Every transaction is a two-byte frame. The first byte carries the
/// direction in bit 7 (set for a read) and the register address in bits
/// 0-6; the second byte is the value for a write, or a dummy byte clocked
/// out while the register value is clocked in for a read.
#[derive(Clone, Debug)]
pub struct Accelerometer {
    registers: [u8; Self::REGISTER_COUNT],
    command: Option<u8>,
}

impl Accelerometer {
    pub const REGISTER_COUNT: usize = 0x80;
    pub const CHIP_ID: u8 = 0x02;

    const REG_CHIP_ID: usize = 0x00;
    const REG_DATA: usize = 0x02;
    const READ: u8 = 0x80;
    const IDLE: u8 = 0xFF;

    pub fn new(sample: AccelSample) -> Self {
        let mut accel = Self {
            registers: [0; Self::REGISTER_COUNT],
            command: None,
        };
        accel.registers[Self::REG_CHIP_ID] = Self::CHIP_ID;
        accel.set_sample(sample);
        accel
    }

    /// Latch a new sample into the data registers.
    ///
    /// Each axis is clamped to 10 bits and stored as an LSB register
    /// holding bits 1:0 in its top two bits, followed by an MSB register
    /// holding bits 9:2.
    pub fn set_sample(&mut self, sample: AccelSample) {
        for (axis, value) in [sample.x, sample.y, sample.z].into_iter().enumerate() {
            let raw = value.clamp(-512, 511) as u16 & 0x3FF;
            let reg = Self::REG_DATA + axis * 2;
            self.registers[reg] = ((raw & 0x3) << 6) as u8;
            self.registers[reg + 1] = (raw >> 2) as u8;
        }
    }

    pub fn register(&self, addr: u8) -> u8 {
        self.registers[(addr & 0x7F) as usize]
    }
}

impl Default for Accelerometer {
    fn default() -> Self {
        Self::new(AccelSample::default())
    }
}

impl SerialDevice for Accelerometer {
    fn exchange(&mut self, tx: u8) -> u8 {
        let Some(command) = self.command.take() else {
            self.command = Some(tx);
            return Self::IDLE;
        };

        let addr = (command & 0x7F) as usize;
        if command & Self::READ != 0 {
            self.registers[addr]
        } else {
            // The chip id is read-only.
            if addr != Self::REG_CHIP_ID {
                self.registers[addr] = tx;
            }
            Self::IDLE
        }
    }

    fn deselect(&mut self) {
        self.command = None;
    }
}
