pub mod cpu;
pub mod machine;

pub use cpu::{Cpu, CpuConfig, CpuError};
pub use machine::{Machine, MachineConfig, MachineError, RunSummary, StopReason};
