use tokio::sync::oneshot;

/// Requests that a running pipeline stop producing and discard its buffer.
#[derive(Debug)]
pub struct AbortHandle {
    tx: oneshot::Sender<()>,
}

impl AbortHandle {
    pub fn abort(self) {
        let _ = self.tx.send(());
    }
}

/// Receiving side of an `AbortHandle`. Dropping the handle without calling
/// `abort` never triggers the signal.
#[derive(Debug)]
pub struct AbortSignal {
    rx: Option<oneshot::Receiver<()>>,
    fired: bool,
}

pub fn channel() -> (AbortHandle, AbortSignal) {
    let (tx, rx) = oneshot::channel();
    (
        AbortHandle { tx },
        AbortSignal {
            rx: Some(rx),
            fired: false,
        },
    )
}

impl AbortSignal {
    /// A signal that is never triggered.
    pub fn never() -> Self {
        Self {
            rx: None,
            fired: false,
        }
    }

    /// Resolves once `abort` has been called. Safe to call again after it resolved.
    pub async fn triggered(&mut self) {
        if self.fired {
            return;
        }
        if let Some(rx) = self.rx.as_mut() {
            match rx.await {
                Ok(()) => {
                    self.fired = true;
                    self.rx = None;
                    return;
                }
                Err(_) => self.rx = None,
            }
        }
        std::future::pending::<()>().await
    }
}
