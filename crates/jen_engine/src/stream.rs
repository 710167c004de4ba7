use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{EngineError, StreamEvent};

/// Sending half handed to a polling task.
///
/// `end` and `error` consume the emitter, so a task cannot emit anything
/// after its terminal event.
pub(crate) struct Emitter<T, S> {
    tx: mpsc::UnboundedSender<StreamEvent<T, S>>,
}

impl<T, S> Emitter<T, S> {
    /// Returns `false` once the consumer is gone.
    pub(crate) fn data(&self, data: T) -> bool {
        self.tx.send(StreamEvent::Data(data)).is_ok()
    }

    pub(crate) fn end(self, status: S) {
        let _ = self.tx.send(StreamEvent::End(status));
    }

    pub(crate) fn error(self, err: EngineError) {
        let _ = self.tx.send(StreamEvent::Error(err));
    }
}

/// Consumer handle of a running stream.
///
/// Dropping the handle cancels the polling task, including any pending
/// timer or in-flight request.
pub struct EventStream<T, S> {
    events: mpsc::UnboundedReceiver<StreamEvent<T, S>>,
    cancel: CancellationToken,
}

impl<T, S> EventStream<T, S>
where
    T: Send + 'static,
    S: Send + 'static,
{
    /// Spawns `run` on the current tokio runtime.
    pub(crate) fn spawn<F, Fut>(run: F) -> Self
    where
        F: FnOnce(Emitter<T, S>, CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(run(Emitter { tx }, cancel.clone()));
        Self { events, cancel }
    }
}

impl<T, S> EventStream<T, S> {
    /// Next event, or `None` after the terminal event has been taken.
    pub async fn next_event(&mut self) -> Option<StreamEvent<T, S>> {
        self.events.recv().await
    }

    /// Stops polling. Events already queued can still be read.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<T, S> Drop for EventStream<T, S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<T, S> Stream for EventStream<T, S> {
    type Item = StreamEvent<T, S>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().events.poll_recv(cx)
    }
}
