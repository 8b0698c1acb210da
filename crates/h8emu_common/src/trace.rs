use std::fmt;
use std::io::{self, Write};

/// Register/flag/memory state captured after an instruction that changed
/// something.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub er: [u32; 8],
    /// Raw CCR byte, laid out `I UI H U N Z V C` from bit 7 down to bit 0.
    pub ccr: u8,
    /// Memory writes performed during the instruction, in program order.
    pub writes: Vec<(u16, u8)>,
}

impl Snapshot {
    #[inline]
    fn flag(&self, bit: u8) -> u8 {
        (self.ccr >> bit) & 1
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, er) in self.er.iter().enumerate() {
            write!(f, "er{i}: [0x{er:08X}], ")?;
        }
        writeln!(f)?;
        write!(
            f,
            "I: {}, H: {}, N: {}, Z: {}, V: {}, C: {}",
            self.flag(7),
            self.flag(5),
            self.flag(3),
            self.flag(2),
            self.flag(1),
            self.flag(0),
        )?;
        for (addr, value) in &self.writes {
            write!(f, "\n@0x{addr:04X} <- 0x{value:02X}")?;
        }
        Ok(())
    }
}

/// One executed instruction as seen by a trace observer.
#[derive(Clone, Copy, Debug)]
pub struct TraceRecord<'a> {
    /// Address of the first byte of the instruction.
    pub pc: u16,
    /// Raw instruction bytes.
    pub bytes: &'a [u8],
    /// Rendered mnemonic and operands, e.g. `add.b #0x05,r0l`.
    pub text: &'a str,
    /// Present only when the instruction mutated registers, flags or memory.
    pub snapshot: Option<&'a Snapshot>,
}

impl fmt::Display for TraceRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x} - {}", self.pc, self.text)?;
        if let Some(snapshot) = self.snapshot {
            write!(f, "\n{snapshot}\n")?;
        }
        Ok(())
    }
}

/// Observer for executed instructions.
///
/// The core never prints anything itself; frontends decide where trace
/// output goes by handing the machine one of these.
pub trait TraceSink {
    fn instruction(&mut self, record: &TraceRecord<'_>);

    /// Whether records should be built at all. Rendering an instruction is
    /// not free, so sinks that drop everything can opt out.
    fn enabled(&self) -> bool {
        true
    }
}

impl<T: TraceSink + ?Sized> TraceSink for Box<T> {
    fn instruction(&mut self, record: &TraceRecord<'_>) {
        (**self).instruction(record);
    }

    fn enabled(&self) -> bool {
        (**self).enabled()
    }
}

/// Discards everything.
#[derive(Default, Clone, Copy, Debug)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn instruction(&mut self, _record: &TraceRecord<'_>) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// Forwards every record to `log::trace!` under the `h8emu::trace` target.
#[derive(Default, Clone, Copy, Debug)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn instruction(&mut self, record: &TraceRecord<'_>) {
        log::trace!(target: "h8emu::trace", "{record}");
    }
}

/// Writes records as text lines, one block per instruction.
///
/// Write errors do not interrupt emulation; the first one is kept and can
/// be collected with [`TextSink::take_error`].
pub struct TextSink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for TextSink<W> {
    fn instruction(&mut self, record: &TraceRecord<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.out, "{record}") {
            self.error = Some(err);
        }
    }
}

/// Keeps rendered records in memory. Handy for golden-output tests.
#[derive(Default, Clone, Debug)]
pub struct RecordingSink {
    pub lines: Vec<String>,
    pub snapshots: Vec<Option<Snapshot>>,
}

impl TraceSink for RecordingSink {
    fn instruction(&mut self, record: &TraceRecord<'_>) {
        self.lines.push(format!("{:x} - {}", record.pc, record.text));
        self.snapshots.push(record.snapshot.cloned());
    }
}
