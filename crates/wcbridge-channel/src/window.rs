//! Cross-window messaging and named windows.
//!
//! A [`Window`] owns the receiving end of its message queue; anyone holding
//! a [`WindowHandle`] can `post_message` into it. Each message carries the
//! id and origin of the window that sent it, which is what receivers use to
//! decide whether to trust it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::ChannelError;

/// Location of a window that has not been navigated yet.
pub const BLANK_LOCATION: &str = "about:blank";

/// Target origin that matches any receiving window.
pub const ANY_ORIGIN: &str = "*";

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(u64);

impl WindowId {
    fn next() -> Self {
        Self(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A message delivered into a window.
#[derive(Debug, Clone)]
pub struct WindowMessage {
    pub data: serde_json::Value,
    pub source: WindowId,
    pub origin: String,
}

/// Sending side of a window's message queue.
#[derive(Debug, Clone)]
pub struct WindowHandle {
    id: WindowId,
    origin: String,
    tx: mpsc::UnboundedSender<WindowMessage>,
}

impl WindowHandle {
    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Post `data` into this window on behalf of `source`.
    ///
    /// Delivery happens only when `target_origin` is `*` or equals this
    /// window's origin. Returns whether the message was queued.
    pub fn post_message(
        &self,
        data: serde_json::Value,
        source: &WindowHandle,
        target_origin: &str,
    ) -> bool {
        if target_origin != ANY_ORIGIN && target_origin != self.origin {
            tracing::debug!(
                target_origin,
                origin = %self.origin,
                "postMessage dropped: origin mismatch"
            );
            return false;
        }
        self.tx
            .send(WindowMessage {
                data,
                source: source.id,
                origin: source.origin.clone(),
            })
            .is_ok()
    }
}

/// A browsing context with its own inbox.
pub struct Window {
    handle: WindowHandle,
    rx: mpsc::UnboundedReceiver<WindowMessage>,
}

impl Window {
    pub fn new(origin: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handle: WindowHandle {
                id: WindowId::next(),
                origin: origin.into(),
                tx,
            },
            rx,
        }
    }

    pub fn id(&self) -> WindowId {
        self.handle.id
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle.clone()
    }

    pub async fn recv(&mut self) -> Option<WindowMessage> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<WindowMessage> {
        self.rx.try_recv().ok()
    }
}

// ---------------------------------------------------------------------------
// Named windows
// ---------------------------------------------------------------------------

/// A top-level window the relay can open, navigate and focus.
pub trait TabWindow: Send + Sync {
    fn location(&self) -> String;
    fn navigate(&self, url: &str);
    fn focus(&self);
    fn is_closed(&self) -> bool;
}

/// Opens a window by logical name, returning the existing one when a live
/// window already carries that name (`window.open('', name)` semantics).
pub trait WindowOpener: Send + Sync {
    fn open_named(&self, name: &str) -> Result<Arc<dyn TabWindow>, ChannelError>;
}

/// In-memory tab used by [`NamedWindows`].
pub struct MemoryTab {
    location: Mutex<String>,
    navigations: AtomicUsize,
    focuses: AtomicUsize,
    closed: AtomicBool,
}

impl MemoryTab {
    fn blank() -> Self {
        Self {
            location: Mutex::new(BLANK_LOCATION.to_string()),
            navigations: AtomicUsize::new(0),
            focuses: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::Relaxed)
    }

    pub fn focuses(&self) -> usize {
        self.focuses.load(Ordering::Relaxed)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl TabWindow for MemoryTab {
    fn location(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn navigate(&self, url: &str) {
        *self.location.lock().unwrap_or_else(|e| e.into_inner()) = url.to_string();
        self.navigations.fetch_add(1, Ordering::Relaxed);
    }

    fn focus(&self) {
        self.focuses.fetch_add(1, Ordering::Relaxed);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// In-memory [`WindowOpener`]: one [`MemoryTab`] per live name.
#[derive(Default)]
pub struct NamedWindows {
    windows: Mutex<HashMap<String, Arc<MemoryTab>>>,
    opened: AtomicUsize,
}

impl NamedWindows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of windows actually created (reuses excluded).
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }

    pub fn get(&self, name: &str) -> Option<Arc<MemoryTab>> {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }
}

impl WindowOpener for NamedWindows {
    fn open_named(&self, name: &str) -> Result<Arc<dyn TabWindow>, ChannelError> {
        if name.is_empty() {
            return Err(ChannelError::Open("window name must not be empty".into()));
        }
        let mut map = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let tab = match map.get(name) {
            Some(tab) if !tab.is_closed() => tab.clone(),
            _ => {
                let tab = Arc::new(MemoryTab::blank());
                map.insert(name.to_string(), tab.clone());
                self.opened.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(name, "Opened new window");
                tab
            }
        };
        Ok(tab as Arc<dyn TabWindow>)
    }
}
