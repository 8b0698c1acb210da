use std::ops::Range;

use h8emu_common::{NullSink, Snapshot, TraceRecord, TraceSink};

use crate::cpu::{fetch_window, Bus, Cpu, Step, ADDRESS_MASK, MEMORY_SIZE};

use super::accel::Accelerometer;
use super::ssu::SerialDevice;
use super::{Entry, MachineBus, MachineConfig, MachineError, RunSummary, StopReason};

/// CPU, bus and trace observer wired together.
///
/// This is the entry point used by the command-line runner: load an image,
/// then [`step`](Machine::step) or [`run`](Machine::run) it.
pub struct Machine<S: TraceSink = NullSink> {
    pub cpu: Cpu,
    pub bus: MachineBus,
    pub sink: S,
    config: MachineConfig,
    image: Range<u32>,
}

impl Machine<NullSink> {
    pub fn new(config: MachineConfig) -> Self {
        Self::with_sink(config, NullSink)
    }
}

impl<S: TraceSink> Machine<S> {
    /// Machine with the accelerometer attached to the serial unit.
    pub fn with_sink(config: MachineConfig, sink: S) -> Self {
        let device = Box::new(Accelerometer::new(config.accelerometer));
        Self::with_device(config, device, sink)
    }

    pub fn with_device(config: MachineConfig, device: Box<dyn SerialDevice>, sink: S) -> Self {
        let base = config.load_base as u32;
        let mut machine = Self {
            cpu: Cpu::with_config(config.cpu),
            bus: MachineBus::new(device),
            sink,
            config,
            image: base..base,
        };
        machine.reset();
        machine
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Address range occupied by the loaded image.
    pub fn image(&self) -> Range<u32> {
        self.image.clone()
    }

    /// Reset the CPU and apply the configured stack pointer and entry point.
    /// Memory is left alone.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.regs.set_sp(self.config.initial_sp);
        self.cpu.pc = match self.config.entry {
            Entry::ImageStart => self.config.load_base,
            Entry::ResetVector => u16::from_be_bytes([self.bus.peek8(0), self.bus.peek8(1)]),
            Entry::At(pc) => pc,
        };
        log::debug!(
            "reset: pc=0x{:04X} sp=0x{:08X}",
            self.cpu.pc,
            self.cpu.regs.sp()
        );
    }

    /// Copy a raw image to the load base and reset the CPU.
    pub fn load_rom(&mut self, image: &[u8]) -> Result<(), MachineError> {
        let base = self.config.load_base;
        let end = base as usize + image.len();
        if end > MEMORY_SIZE {
            return Err(MachineError::ImageTooLarge {
                len: image.len(),
                base,
            });
        }
        self.bus.memory.load(base as u32, image);
        self.image = base as u32..end as u32;
        log::debug!(
            "loaded {} bytes at 0x{:04X}..0x{:05X}",
            image.len(),
            base,
            end
        );
        self.reset();
        Ok(())
    }

    /// Execute one instruction and emit a trace record. The serial unit is
    /// serviced by the bus when the CPU closes the instruction.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        let regs = self.cpu.regs;
        let ccr = self.cpu.ccr;

        let step = self.cpu.step(&mut self.bus).map_err(|err| {
            log::error!("{err}");
            err
        })?;

        for &(addr, value) in self.bus.writes() {
            if self.image.contains(&(addr as u32)) {
                log::warn!(
                    "0x{:04X}: write 0x{value:02X} into the image at 0x{addr:04X}",
                    step.pc
                );
            }
        }

        if self.sink.enabled() {
            let changed =
                self.cpu.regs != regs || self.cpu.ccr != ccr || !self.bus.writes().is_empty();
            let snapshot = changed.then(|| self.snapshot());
            let window = fetch_window(&self.bus, step.pc);
            let text = step.instruction.disassemble(step.pc).to_string();
            self.sink.instruction(&TraceRecord {
                pc: step.pc,
                bytes: &window[..step.instruction.len as usize],
                text: &text,
                snapshot: snapshot.as_ref(),
            });
        }

        Ok(step)
    }

    /// Step until the PC leaves the image, SLEEP executes or the step limit
    /// is reached.
    pub fn run(&mut self) -> Result<RunSummary, MachineError> {
        let mut steps = 0u64;
        let stop = loop {
            if self.cpu.sleeping {
                break StopReason::Sleep;
            }
            // An image that fills the top of memory ends where the PC wraps.
            if self.cpu.pc as u32 == self.image.end & ADDRESS_MASK {
                break StopReason::EndOfImage;
            }
            if self.config.max_steps.is_some_and(|max| steps >= max) {
                break StopReason::StepLimit;
            }
            self.step()?;
            steps += 1;
        };
        log::debug!("run stopped after {steps} steps: {stop}");
        Ok(RunSummary { steps, stop })
    }

    /// Registers, CCR and the memory writes of the last instruction.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            er: self.cpu.regs.snapshot(),
            ccr: self.cpu.ccr.bits(),
            writes: self.bus.writes().to_vec(),
        }
    }
}
