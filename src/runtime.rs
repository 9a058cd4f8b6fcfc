//! Runtime for widget sessions
//!
//! Each session is a single task that owns its transcript, exchange state
//! and surface. All mutation happens on that task; callers talk to it
//! through a `SessionHandle`.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ExchangeRuntime;

use crate::resolver::ReplyResolver;
use crate::state_machine::{Event, ExchangeContext, ExchangeState, TransitionError};
use crate::surface::{Surface, Visibility, WidgetView};
use crate::transcript::{Message, MessageId, Transcript};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch, RwLock};

const COMMAND_CHANNEL_SIZE: usize = 32;
const BROADCAST_CHANNEL_SIZE: usize = 128;

/// Errors surfaced to session callers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("No suggestion at index {0}")]
    UnknownSuggestion(usize),
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session has shut down")]
    Closed,
}

/// Acknowledgement channel for user commands
pub type Ack = oneshot::Sender<Result<(), SessionError>>;

/// Commands processed by a session runtime, in arrival order
#[derive(Debug)]
pub enum SessionCommand {
    /// Typed text submitted from the input box
    Submit { text: String, ack: Option<Ack> },
    /// A suggested prompt was picked
    SelectSuggestion { index: usize, ack: Option<Ack> },
    /// Outcome of a background resolution
    Exchange(Event),
    Open,
    Close,
    Toggle,
    UpdateDraft { text: String },
}

/// Events sent to subscribed renderers
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    Message {
        message: Message,
    },
    StateChange {
        state: ExchangeState,
        /// Typing indicator shown
        typing: bool,
    },
    Visibility {
        visibility: Visibility,
    },
    Scroll {
        message_id: MessageId,
    },
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    broadcast_tx: broadcast::Sender<WidgetEvent>,
    view_rx: watch::Receiver<WidgetView>,
}

impl SessionHandle {
    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    async fn send_acked(
        &self,
        build: impl FnOnce(Ack) -> SessionCommand,
    ) -> Result<(), SessionError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(build(ack_tx)).await?;
        ack_rx.await.map_err(|_| SessionError::Closed)?
    }

    /// Submit typed text. Blank input or a reply in flight is rejected.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), SessionError> {
        let text = text.into();
        self.send_acked(|ack| SessionCommand::Submit {
            text,
            ack: Some(ack),
        })
        .await
    }

    /// Submit the suggestion at `index`, exactly as if it had been typed
    pub async fn select_suggestion(&self, index: usize) -> Result<(), SessionError> {
        self.send_acked(|ack| SessionCommand::SelectSuggestion {
            index,
            ack: Some(ack),
        })
        .await
    }

    pub async fn open(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Open).await
    }

    pub async fn close(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Close).await
    }

    pub async fn toggle(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Toggle).await
    }

    pub async fn update_draft(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::UpdateDraft { text: text.into() })
            .await
    }

    /// Latest published render snapshot
    pub fn view(&self) -> WidgetView {
        self.view_rx.borrow().clone()
    }

    /// Wait until the published view satisfies `pred`
    #[cfg(test)]
    pub async fn wait_for_view(
        &self,
        timeout: Duration,
        pred: impl FnMut(&WidgetView) -> bool,
    ) -> Option<WidgetView> {
        let mut rx = self.view_rx.clone();
        let view = match tokio::time::timeout(timeout, rx.wait_for(pred)).await {
            Ok(Ok(view)) => Some(view.clone()),
            _ => None,
        };
        view
    }

    /// Subscribe to session updates
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Number of live event streams, e.g. open SSE connections
    pub fn subscriber_count(&self) -> usize {
        self.broadcast_tx.receiver_count()
    }
}

/// Start a session runtime in the background and return its handle
pub fn spawn_session<R>(context: ExchangeContext, resolver: Arc<R>) -> SessionHandle
where
    R: ReplyResolver + ?Sized + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let (broadcast_tx, _) = broadcast::channel(BROADCAST_CHANNEL_SIZE);
    let (view_tx, view_rx) = watch::channel(Surface::new().view(ExchangeState::Idle, &Transcript::new()));

    let session_id = context.session_id.clone();
    let runtime = ExchangeRuntime::new(
        context,
        resolver,
        command_rx,
        command_tx.downgrade(),
        broadcast_tx.clone(),
        view_tx,
    );

    tokio::spawn(async move {
        runtime.run().await;
        tracing::info!(session_id = %session_id, "Session runtime finished");
    });

    SessionHandle {
        command_tx,
        broadcast_tx,
        view_rx,
    }
}

struct SessionEntry {
    handle: SessionHandle,
    last_activity: Instant,
}

/// Manager for all widget sessions
pub struct SessionManager {
    resolver: Arc<dyn ReplyResolver>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionManager {
    pub fn new(resolver: Arc<dyn ReplyResolver>) -> Self {
        Self {
            resolver,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a new session with an empty transcript
    pub async fn create(&self) -> (String, SessionHandle) {
        let session_id = uuid::Uuid::new_v4().to_string();
        let handle = spawn_session(ExchangeContext::new(&session_id), self.resolver.clone());

        self.sessions.write().await.insert(
            session_id.clone(),
            SessionEntry {
                handle: handle.clone(),
                last_activity: Instant::now(),
            },
        );

        tracing::info!(session_id = %session_id, "Session created");
        (session_id, handle)
    }

    /// Get the handle of a running session, marking it active
    pub async fn get(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        entry.last_activity = Instant::now();
        Ok(entry.handle.clone())
    }

    /// End a session. The runtime stops once the last handle is dropped.
    pub async fn remove(&self, session_id: &str) -> Result<(), SessionError> {
        if self.sessions.write().await.remove(session_id).is_none() {
            return Err(SessionError::NotFound(session_id.to_string()));
        }
        tracing::info!(session_id = %session_id, "Session removed");
        Ok(())
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// End every session untouched for at least `ttl` that has no open
    /// event stream. Returns how many were ended.
    pub async fn expire_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|session_id, entry| {
            let keep =
                entry.last_activity.elapsed() < ttl || entry.handle.subscriber_count() > 0;
            if !keep {
                tracing::info!(session_id = %session_id, "Session expired");
            }
            keep
        });

        before - sessions.len()
    }

    /// Sweep idle sessions in the background until the manager is dropped
    pub fn spawn_reaper(self: &Arc<Self>, ttl: Duration) -> tokio::task::JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = (ttl / 2).max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            // Skip the first immediate tick
            timer.tick().await;

            tracing::info!(ttl_secs = ttl.as_secs(), "Session reaper started");

            loop {
                timer.tick().await;
                let Some(manager) = weak.upgrade() else {
                    break;
                };
                let expired = manager.expire_idle(ttl).await;
                if expired > 0 {
                    let remaining = manager.session_count().await;
                    tracing::info!(expired, remaining, "Expired idle sessions");
                }
            }

            tracing::debug!("Session reaper stopped");
        })
    }
}
