mod error;
mod pipeline;
mod sink;

pub use error::{PipelineError, SinkError};
pub use pipeline::{
    Pipeline, PipelineOptions, PipelineReport, DEFAULT_CHANNEL_CAPACITY, DEFAULT_FLUSH_TIMEOUT,
};
pub use sink::{CsvSink, FlushGate, MemorySink, Sink};
