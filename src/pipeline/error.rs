use std::time::Duration;

use thiserror::Error;

use crate::resample::ResampleError;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("flush abandoned before the output was published")]
    Abandoned,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("resample error: {0}")]
    Resample(#[from] ResampleError),
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
    #[error("run cancelled before flush")]
    Cancelled,
    #[error("flush did not finish within {0:?}")]
    FlushTimeout(Duration),
    #[error("producer stopped without finishing the stream")]
    Unfinished,
    #[error("pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("consumer exited without signalling completion")]
    CompletionDropped,
}
