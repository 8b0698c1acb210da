pub mod trace;

pub use trace::{LogSink, NullSink, RecordingSink, Snapshot, TextSink, TraceRecord, TraceSink};
