//! Session event queue
//!
//! Everything a session reacts to (input, frame ticks, load completions)
//! arrives as a [`ViewerEvent`] on one queue owned by the session. Producers
//! hold an [`EventSender`], which may live on another thread; the session
//! drains the queue on its own thread and handles each event to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::asset::{AssetError, LoadedAsset};
use crate::backend::FrameHandle;
use crate::environment::EnvironmentMap;
use crate::pointer::{TouchPoint, Viewport};

/// Input to a viewer session
#[derive(Debug)]
pub enum ViewerEvent {
    /// Viewport size changed (logical pixels)
    Resize(Viewport),
    /// Mouse moved to a client position
    PointerMove { x: f32, y: f32 },
    /// Active touches after a touch move
    TouchMove { touches: Vec<TouchPoint> },
    /// Page scrolled to a vertical offset
    Scroll { offset: f32 },
    /// A requested frame fired; `time` is in seconds
    Frame { handle: FrameHandle, time: f64 },
    ModelLoaded(LoadOutcome<LoadedAsset>),
    EnvironmentLoaded(LoadOutcome<EnvironmentMap>),
}

/// Shared cancellation flag of one session's outstanding work
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Whether both tokens are clones of the same flag
    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Result of one asynchronous load, tagged with the token it was issued under
#[derive(Debug)]
pub struct LoadOutcome<T> {
    pub path: String,
    pub token: CancelToken,
    pub result: Result<T, AssetError>,
}

/// Sending half of a session queue
#[derive(Debug, Clone)]
pub struct EventSender(Sender<ViewerEvent>);

impl EventSender {
    /// Push an event. Returns false once the session is gone.
    pub fn send(&self, event: ViewerEvent) -> bool {
        self.0.send(event).is_ok()
    }
}

/// Single-consumer event queue of a session
#[derive(Debug)]
pub struct EventQueue {
    sender: EventSender,
    receiver: Receiver<ViewerEvent>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender: EventSender(sender),
            receiver,
        }
    }

    /// New producer handle
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Take every event queued so far, in arrival order
    pub fn drain(&self) -> Vec<ViewerEvent> {
        self.receiver.try_iter().collect()
    }
}

/// One pending load handed to an [`AssetLoader`](crate::backend::AssetLoader).
///
/// The loader resolves `path` however it likes, on any thread, and calls
/// [`complete`](Self::complete) exactly once.
pub struct LoadRequest<T> {
    path: String,
    token: CancelToken,
    sender: EventSender,
    wrap: fn(LoadOutcome<T>) -> ViewerEvent,
}

impl<T> std::fmt::Debug for LoadRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadRequest")
            .field("path", &self.path)
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

impl<T> LoadRequest<T> {
    pub(crate) fn new(
        path: impl Into<String>,
        token: CancelToken,
        sender: EventSender,
        wrap: fn(LoadOutcome<T>) -> ViewerEvent,
    ) -> Self {
        Self {
            path: path.into(),
            token,
            sender,
            wrap,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// True once the issuing session started unmounting
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Deliver the result to the session queue.
    ///
    /// Results of cancelled requests are dropped here. Returns whether the
    /// result was queued.
    pub fn complete(self, result: Result<T, AssetError>) -> bool {
        if self.token.is_cancelled() {
            tracing::debug!("Dropping result of cancelled load '{}'", self.path);
            return false;
        }
        let outcome = LoadOutcome {
            path: self.path,
            token: self.token,
            result,
        };
        self.sender.send((self.wrap)(outcome))
    }
}

impl LoadRequest<LoadedAsset> {
    pub fn model(path: impl Into<String>, token: CancelToken, sender: EventSender) -> Self {
        Self::new(path, token, sender, ViewerEvent::ModelLoaded)
    }
}

impl LoadRequest<EnvironmentMap> {
    pub fn environment(
        path: impl Into<String>,
        token: CancelToken,
        sender: EventSender,
    ) -> Self {
        Self::new(path, token, sender, ViewerEvent::EnvironmentLoaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_preserves_order() {
        let queue = EventQueue::new();
        let sender = queue.sender();
        sender.send(ViewerEvent::Scroll { offset: 1.0 });
        sender.send(ViewerEvent::PointerMove { x: 2.0, y: 3.0 });
        let events = queue.drain();
        assert!(matches!(events[0], ViewerEvent::Scroll { .. }));
        assert!(matches!(events[1], ViewerEvent::PointerMove { .. }));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_sender_crosses_threads() {
        let queue = EventQueue::new();
        let sender = queue.sender();
        std::thread::spawn(move || sender.send(ViewerEvent::Scroll { offset: 5.0 }))
            .join()
            .unwrap();
        assert_eq!(queue.drain().len(), 1);
    }

    #[test]
    fn test_cancelled_request_is_dropped() {
        let queue = EventQueue::new();
        let token = CancelToken::new();
        let request = LoadRequest::environment("sky.hdr", token.clone(), queue.sender());
        token.cancel();
        assert!(request.is_cancelled());
        assert!(!request.complete(Err(AssetError::Cancelled)));
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_completed_request_is_queued() {
        let queue = EventQueue::new();
        let token = CancelToken::new();
        let request = LoadRequest::model("toucan.glb", token.clone(), queue.sender());
        assert!(request.complete(Err(AssetError::Io("offline".into()))));
        match queue.drain().pop() {
            Some(ViewerEvent::ModelLoaded(outcome)) => {
                assert_eq!(outcome.path, "toucan.glb");
                assert!(outcome.token.same_as(&token));
                assert!(outcome.result.is_err());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_send_after_queue_dropped() {
        let queue = EventQueue::new();
        let sender = queue.sender();
        drop(queue);
        assert!(!sender.send(ViewerEvent::Scroll { offset: 0.0 }));
    }
}
