use typed_builder::TypedBuilder;

use super::accel::AccelSample;
use crate::cpu::CpuConfig;

/// Where execution starts after an image is loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Entry {
    /// First byte of the image.
    #[default]
    ImageStart,
    /// The 16-bit reset vector at address 0.
    ResetVector,
    At(u16),
}

#[derive(TypedBuilder, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// Address the image is copied to.
    #[builder(default = 0x0000)]
    pub load_base: u16,
    #[builder(default)]
    pub entry: Entry,
    #[builder(default = 0)]
    pub initial_sp: u32,
    /// Stop a run after this many instructions.
    #[builder(default, setter(strip_option))]
    pub max_steps: Option<u64>,
    #[builder(default)]
    pub cpu: CpuConfig,
    #[builder(default)]
    pub accelerometer: AccelSample,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
