use std::{
    collections::VecDeque,
    fmt,
    pin::Pin,
    task::{ready, Context, Poll},
};

use futures_core::Stream;
use imbl::Vector;
use tokio::sync::broadcast::{
    error::{RecvError, TryRecvError},
    Receiver,
};
use tokio_util::sync::ReusableBoxFuture;

use super::{BroadcastMessage, SourceChange, SourceUpdate};

/// A subscriber for updates of an [`ObservableList`][super::ObservableList].
///
/// Use its [`Stream`] implementation to receive the updates; `StreamExt` from
/// futures-util has the usual convenience methods. Updates committed together
/// in a transaction are yielded one by one, in order.
///
/// A subscriber that falls behind by more than the list's capacity skips the
/// updates it missed and gets a single [`SourceChange::Reset`] with the newest
/// state instead.
pub struct SourceSubscriber<T> {
    recv: ReusableBoxFuture<'static, Received<T>>,
    queued: VecDeque<SourceUpdate<T>>,
}

type Received<T> = (Result<BroadcastMessage<T>, RecvError>, Receiver<BroadcastMessage<T>>);

impl<T: Clone + Send + Sync + 'static> SourceSubscriber<T> {
    pub(super) fn new(rx: Receiver<BroadcastMessage<T>>) -> Self {
        Self { recv: ReusableBoxFuture::new(receive(rx)), queued: VecDeque::new() }
    }
}

impl<T: Clone + Send + Sync + 'static> Stream for SourceSubscriber<T> {
    type Item = SourceUpdate<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if let Some(update) = self.queued.pop_front() {
            return Poll::Ready(Some(update));
        }

        let (result, mut rx) = ready!(self.recv.poll(cx));
        let next = match result {
            Ok(msg) => {
                self.queued.extend(msg.updates.into_vec());
                self.queued.pop_front()
            }
            Err(RecvError::Closed) => None,
            Err(RecvError::Lagged(_skipped)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    target: "sortview_source::list::broadcast",
                    "Subscriber lagged behind by {_skipped} messages, resetting"
                );

                newest_state(&mut rx)
                    .map(|state| SourceUpdate { change: SourceChange::Reset, state })
            }
        };

        self.recv.set(receive(rx));
        Poll::Ready(next)
    }
}

// The boxed future is pinned on its own, `queued` is never pinned.
impl<T> Unpin for SourceSubscriber<T> {}

impl<T> fmt::Debug for SourceSubscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSubscriber")
            .field("queued", &self.queued.len())
            .finish_non_exhaustive()
    }
}

async fn receive<T: Clone>(mut rx: Receiver<BroadcastMessage<T>>) -> Received<T> {
    let result = rx.recv().await;
    (result, rx)
}

/// Drain everything buffered after a lag and return the state of the last
/// message, or `None` if the list is gone.
///
/// # Panics
///
/// If the channel is empty without having yielded a message, which tokio's
/// broadcast channel never does after reporting a lag.
fn newest_state<T: Clone>(rx: &mut Receiver<BroadcastMessage<T>>) -> Option<Vector<T>> {
    let mut newest = None;
    loop {
        match rx.try_recv() {
            Ok(msg) => newest = msg.updates.into_vec().pop().map(|update| update.state),
            // Lagged again while draining; the next `try_recv` continues with
            // the oldest message still buffered.
            Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty) => match newest {
                Some(state) => return Some(state),
                // A lag always leaves the newest message in the buffer.
                None => unreachable!("no message left to receive after lag"),
            },
            Err(TryRecvError::Closed) => {
                #[cfg(feature = "tracing")]
                tracing::info!(
                    target: "sortview_source::list::broadcast",
                    "List dropped while the subscriber was lagging"
                );
                return None;
            }
        }
    }
}
