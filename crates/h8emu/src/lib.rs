use std::io;

use anyhow::{bail, Context, Result};
use h8emu_common::{LogSink, NullSink, TextSink, TraceSink};
use h8emu_core::machine::{AccelSample, Entry};
use h8emu_core::{CpuConfig, Machine, MachineConfig, RunSummary};

pub const USAGE: &str = "\
usage: h8emu <rom> [options]

options:
  --base ADDR         load the image at ADDR (default 0x0000)
  --entry ADDR|reset  start at ADDR, or at the reset vector at 0x0000
  --sp ADDR           initial stack pointer (default 0)
  --max-steps N       stop after N instructions
  --accel X,Y,Z       accelerometer sample reported over the serial link
  --legacy-bxor       decode memory BXOR/BIXOR the way older firmware tools did
  --trace             print every instruction and state change to stdout
  --trace-log         send the instruction trace to the log at trace level";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceMode {
    #[default]
    Off,
    Stdout,
    Log,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub rom: String,
    pub config: MachineConfig,
    pub trace: TraceMode,
}

/// Parse the command line, program name already stripped.
pub fn parse_args<I>(args: I) -> Result<Options>
where
    I: IntoIterator<Item = String>,
{
    let mut rom = None;
    let mut load_base = 0u16;
    let mut entry = Entry::ImageStart;
    let mut initial_sp = 0u32;
    let mut max_steps = None;
    let mut accelerometer = AccelSample::default();
    let mut cpu = CpuConfig::default();
    let mut trace = TraceMode::Off;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .with_context(|| format!("missing value for {name}"))
        };
        match arg.as_str() {
            "--base" => load_base = parse_u16(&value("--base")?)?,
            "--entry" => {
                let text = value("--entry")?;
                entry = match text.as_str() {
                    "reset" => Entry::ResetVector,
                    _ => Entry::At(parse_u16(&text)?),
                };
            }
            "--sp" => initial_sp = parse_u32(&value("--sp")?)?,
            "--max-steps" => {
                let text = value("--max-steps")?;
                let steps = text
                    .parse::<u64>()
                    .with_context(|| format!("invalid step count '{text}'"))?;
                max_steps = Some(steps);
            }
            "--accel" => accelerometer = parse_sample(&value("--accel")?)?,
            "--legacy-bxor" => cpu.memory_bit_xor_swapped = true,
            "--trace" => trace = TraceMode::Stdout,
            "--trace-log" => trace = TraceMode::Log,
            other if other.starts_with("--") => bail!("unknown option '{other}'"),
            _ if rom.is_some() => bail!("unexpected argument '{arg}'"),
            _ => rom = Some(arg),
        }
    }

    let Some(rom) = rom else {
        bail!("no ROM path given");
    };
    let mut config = MachineConfig::builder()
        .load_base(load_base)
        .entry(entry)
        .initial_sp(initial_sp)
        .cpu(cpu)
        .accelerometer(accelerometer)
        .build();
    config.max_steps = max_steps;
    Ok(Options { rom, config, trace })
}

fn parse_u32(text: &str) -> Result<u32> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.with_context(|| format!("invalid address '{text}'"))
}

fn parse_u16(text: &str) -> Result<u16> {
    let value = parse_u32(text)?;
    u16::try_from(value).with_context(|| format!("address '{text}' is outside the 64 KiB space"))
}

fn parse_sample(text: &str) -> Result<AccelSample> {
    let axes = text
        .split(',')
        .map(|axis| {
            axis.trim()
                .parse::<i16>()
                .with_context(|| format!("invalid accelerometer axis '{axis}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    let [x, y, z] = axes[..] else {
        bail!("accelerometer sample needs three axes, got '{text}'");
    };
    Ok(AccelSample { x, y, z })
}

pub fn run(options: &Options) -> Result<RunSummary> {
    let rom = std::fs::read(&options.rom)
        .with_context(|| format!("failed to read ROM file '{}'", options.rom))?;
    log::info!("Running ROM '{}' ({} bytes)", options.rom, rom.len());

    let sink: Box<dyn TraceSink> = match options.trace {
        TraceMode::Off => Box::new(NullSink),
        TraceMode::Stdout => Box::new(TextSink::new(io::stdout())),
        TraceMode::Log => Box::new(LogSink),
    };
    let mut machine = Machine::with_sink(options.config, sink);
    machine.load_rom(&rom)?;

    let summary = machine
        .run()
        .with_context(|| format!("execution stopped at 0x{:04X}", machine.cpu.pc))?;
    println!("{}", machine.snapshot());
    println!("stopped: {} after {} steps", summary.stop, summary.steps);
    Ok(summary)
}
