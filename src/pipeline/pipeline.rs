use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use super::error::PipelineError;
use super::sink::{FlushGate, Sink};
use crate::abort::AbortSignal;
use crate::resample::{ResampleError, Sample};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(30);

/// What the producer hands to the consumer. Only `Finished` allows a flush;
/// a channel that closes without it means the producer died.
enum Handoff {
    Sample(Sample),
    Failed(PipelineError),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    pub channel_capacity: usize,
    pub flush_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineReport {
    pub samples: usize,
    pub elapsed: Duration,
}

/// Single-producer, single-consumer handoff from a sample stream to a `Sink`.
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Streams `samples` into `sink` and waits for the consumer to confirm the
    /// final flush. Nothing is flushed if production fails or is aborted.
    pub async fn run<I, S>(
        &self,
        samples: I,
        sink: S,
        abort: AbortSignal,
    ) -> Result<PipelineReport, PipelineError>
    where
        I: Iterator<Item = Result<Sample, ResampleError>> + Send + 'static,
        S: Sink,
    {
        let started = Instant::now();
        let (tx, rx) = mpsc::channel(self.options.channel_capacity.max(1));
        let (done_tx, done_rx) = oneshot::channel();
        let flush_timeout = self.options.flush_timeout;

        let producer = tokio::spawn(produce(samples, tx, abort));
        let consumer = tokio::spawn(async move {
            let outcome = consume(rx, sink, flush_timeout).await;
            let _ = done_tx.send(outcome);
        });

        let outcome = match done_rx.await {
            Ok(outcome) => outcome,
            Err(_) => {
                consumer.await?;
                return Err(PipelineError::CompletionDropped);
            }
        };
        consumer.await?;
        let produced = producer.await?;
        let samples = outcome?;
        log::debug!("producer handed off {} samples", produced);

        Ok(PipelineReport {
            samples,
            elapsed: started.elapsed(),
        })
    }
}

async fn produce<I>(samples: I, tx: mpsc::Sender<Handoff>, mut abort: AbortSignal) -> usize
where
    I: Iterator<Item = Result<Sample, ResampleError>>,
{
    let mut sent = 0;
    for item in samples {
        let failed = item.is_err();
        let handoff = match item {
            Ok(sample) => Handoff::Sample(sample),
            Err(e) => Handoff::Failed(e.into()),
        };
        tokio::select! {
            biased;
            _ = abort.triggered() => {
                log::warn!("Abort requested after {} samples", sent);
                let _ = tx.send(Handoff::Failed(PipelineError::Cancelled)).await;
                return sent;
            }
            delivered = tx.send(handoff) => {
                if delivered.is_err() {
                    // Consumer has already given up.
                    return sent;
                }
            }
        }
        if failed {
            return sent;
        }
        sent += 1;
    }
    let _ = tx.send(Handoff::Finished).await;
    sent
}

async fn consume<S: Sink>(
    mut rx: mpsc::Receiver<Handoff>,
    mut sink: S,
    flush_timeout: Duration,
) -> Result<usize, PipelineError> {
    let mut buffer = Vec::new();
    loop {
        match rx.recv().await {
            Some(Handoff::Sample(sample)) => buffer.push(sample),
            Some(Handoff::Finished) => break,
            Some(Handoff::Failed(e)) => {
                log::error!("Discarding {} buffered samples: {}", buffer.len(), e);
                return Err(e);
            }
            None => {
                log::error!(
                    "Producer exited early, discarding {} buffered samples",
                    buffer.len()
                );
                return Err(PipelineError::Unfinished);
            }
        }
    }

    let count = buffer.len();
    let gate = FlushGate::new();
    let flush_gate = gate.clone();
    let mut flush = tokio::task::spawn_blocking(move || sink.flush(&buffer, &flush_gate));
    match timeout(flush_timeout, &mut flush).await {
        Ok(joined) => joined??,
        Err(_) if gate.close() => {
            return Err(PipelineError::FlushTimeout(flush_timeout));
        }
        Err(_) => {
            // Output already committed, let it land.
            log::debug!("Flush committed as the timeout fired");
            flush.await??;
        }
    }
    Ok(count)
}
