//! Chat sessions and their registry.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use tokio::sync::{Mutex, mpsc};

use super::annotation::split_reply;
use super::message::Message;
use crate::content::Language;
use crate::events::{ChatEvent, RejectReason};
use crate::genai::{TextRequest, TextStreamer, prompt};
use crate::store::LocalStore;

/// Store key holding a visitor's serialized history.
pub const CHAT_HISTORY_KEY: &str = "slashtech_chat_history";

/// Default idle time after which a session is dropped from memory (30 minutes).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Events of one accepted turn, ending with [`ChatEvent::Done`].
pub type TurnStream = Pin<Box<dyn Stream<Item = ChatEvent> + Send>>;

/// Result of [`ChatSession::send`].
pub enum SendOutcome {
    /// Nothing was appended.
    Rejected(RejectReason),
    /// The user message was appended and the turn is running.
    Started(TurnStream),
}

impl std::fmt::Debug for SendOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(reason) => f.debug_tuple("Rejected").field(reason).finish(),
            Self::Started(_) => f.write_str("Started(..)"),
        }
    }
}

/// The chat widget state of one visitor.
///
/// Holds the ordered message history and the busy flag that keeps a
/// visitor to one turn at a time. Every change to the history is mirrored
/// to the visitor's store namespace under [`CHAT_HISTORY_KEY`].
#[derive(Debug, Clone)]
pub struct ChatSession {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    visitor_id: String,
    messages: RwLock<Vec<Message>>,
    /// Set while a turn is in flight.
    busy: AtomicBool,
    /// Bumped by `clear`; a turn stops touching the history once it changes.
    epoch: AtomicU64,
    /// Serializes store writes so the last write carries the latest history.
    persist_lock: Mutex<()>,
    store: Arc<dyn LocalStore>,
    last_activity: RwLock<DateTime<Utc>>,
}

/// Resets the busy flag when the turn ends, however it ends.
struct BusyGuard(Arc<SessionInner>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.busy.store(false, Ordering::Release);
    }
}

impl ChatSession {
    /// Materialize a visitor's session, reading the stored history once.
    ///
    /// A missing or unreadable history starts the session empty.
    pub async fn open(visitor_id: impl Into<String>, store: Arc<dyn LocalStore>) -> Self {
        let visitor_id = visitor_id.into();

        let messages = match store.get_item(&visitor_id, CHAT_HISTORY_KEY).await {
            Ok(Some(raw)) => serde_json::from_str::<Vec<Message>>(&raw).unwrap_or_else(|e| {
                tracing::warn!(visitor_id = %visitor_id, error = %e, "Discarding unreadable chat history");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(visitor_id = %visitor_id, error = %e, "Failed to read chat history");
                Vec::new()
            }
        };

        tracing::debug!(
            visitor_id = %visitor_id,
            message_count = messages.len(),
            "Opened chat session"
        );

        Self {
            inner: Arc::new(SessionInner {
                visitor_id,
                messages: RwLock::new(messages),
                busy: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                persist_lock: Mutex::new(()),
                store,
                last_activity: RwLock::new(Utc::now()),
            }),
        }
    }

    #[must_use]
    pub fn visitor_id(&self) -> &str {
        &self.inner.visitor_id
    }

    /// Snapshot of the history.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.inner.messages.read().unwrap().clone()
    }

    #[must_use]
    pub fn message_count(&self) -> usize {
        self.inner.messages.read().unwrap().len()
    }

    /// Whether a turn is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    /// Send `input` as a new turn answered in `lang`.
    ///
    /// Empty or whitespace-only input, or a send while another turn is in
    /// flight, changes nothing. Otherwise the trimmed text is appended as a
    /// user message and the answer is streamed from `streamer` on a
    /// background task. The turn runs to completion even if the returned
    /// stream is dropped.
    pub async fn send(
        &self,
        input: &str,
        lang: Language,
        streamer: Arc<dyn TextStreamer>,
    ) -> SendOutcome {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return SendOutcome::Rejected(RejectReason::EmptyInput);
        }
        if self
            .inner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(visitor_id = %self.visitor_id(), "Send ignored while a turn is in flight");
            return SendOutcome::Rejected(RejectReason::Busy);
        }
        let guard = BusyGuard(Arc::clone(&self.inner));

        let epoch = self.inner.epoch.load(Ordering::Acquire);
        self.push(epoch, Message::user(trimmed));
        self.persist().await;

        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            name: "chat.turn.started",
            visitor_id = %self.visitor_id(),
            request_id = %request_id,
            lang = %lang,
            "Chat turn started"
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _ = tx.send(ChatEvent::Start {
            request_id: request_id.clone(),
            visitor_id: self.visitor_id().to_string(),
            user_text: trimmed.to_string(),
        });

        let session = self.clone();
        let prompt = trimmed.to_string();
        tokio::spawn(async move {
            session
                .run_turn(prompt, lang, streamer, epoch, &request_id, &tx)
                .await;
            drop(guard);
            let _ = tx.send(ChatEvent::Done);
        });

        SendOutcome::Started(Box::pin(async_stream::stream! {
            while let Some(event) = rx.recv().await {
                yield event;
            }
        }))
    }

    /// Empty the history and delete the stored key.
    pub async fn clear(&self) {
        let _write = self.inner.persist_lock.lock().await;
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        self.inner.messages.write().unwrap().clear();
        self.touch();

        if let Err(e) = self
            .inner
            .store
            .remove_item(&self.inner.visitor_id, CHAT_HISTORY_KEY)
            .await
        {
            tracing::warn!(visitor_id = %self.visitor_id(), error = %e, "Failed to remove chat history");
        }
        tracing::info!(name: "chat.history.cleared", visitor_id = %self.visitor_id(), "Chat history cleared");
    }

    async fn run_turn(
        &self,
        prompt: String,
        lang: Language,
        streamer: Arc<dyn TextStreamer>,
        epoch: u64,
        request_id: &str,
        tx: &mpsc::UnboundedSender<ChatEvent>,
    ) {
        let req = TextRequest {
            prompt,
            system_instruction: prompt::system_instruction(lang),
        };

        let mut stream = match streamer.stream_text(req).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(
                    name: "chat.turn.failed",
                    request_id = %request_id,
                    stage = "open",
                    error = %e,
                    "Chat stream could not be opened"
                );
                self.fail(epoch, lang, tx).await;
                return;
            }
        };

        let ai_index = self.push(epoch, Message::ai(""));
        self.persist().await;

        let mut full_text = String::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) if chunk.text.is_empty() => {}
                Ok(chunk) => {
                    full_text.push_str(&chunk.text);
                    if let Some(index) = ai_index {
                        self.replace(epoch, index, &full_text);
                    }
                    self.persist().await;
                    tracing::trace!(request_id = %request_id, delta_length = chunk.text.len(), "Message delta");
                    let _ = tx.send(ChatEvent::MessageDelta {
                        text: chunk.text,
                        full_text: full_text.clone(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        name: "chat.turn.failed",
                        request_id = %request_id,
                        stage = "stream",
                        received = full_text.len(),
                        error = %e,
                        "Chat stream interrupted"
                    );
                    self.fail(epoch, lang, tx).await;
                    return;
                }
            }
        }

        tracing::info!(
            name: "chat.turn.completed",
            request_id = %request_id,
            content_length = full_text.len(),
            "Chat turn completed"
        );
        let _ = tx.send(ChatEvent::MessageComplete {
            reply: split_reply(&full_text),
        });
    }

    async fn fail(&self, epoch: u64, lang: Language, tx: &mpsc::UnboundedSender<ChatEvent>) {
        let text = lang.failure_message();
        self.push(epoch, Message::ai(text));
        self.persist().await;
        let _ = tx.send(ChatEvent::MessageFailed {
            text: text.to_string(),
        });
    }

    /// Append unless the history was cleared since `epoch`; returns the index.
    fn push(&self, epoch: u64, message: Message) -> Option<usize> {
        let mut guard = self.inner.messages.write().unwrap();
        if self.inner.epoch.load(Ordering::Acquire) != epoch {
            return None;
        }
        guard.push(message);
        let index = guard.len() - 1;
        drop(guard);
        self.touch();
        Some(index)
    }

    fn replace(&self, epoch: u64, index: usize, text: &str) {
        let mut guard = self.inner.messages.write().unwrap();
        if self.inner.epoch.load(Ordering::Acquire) != epoch {
            return;
        }
        if let Some(message) = guard.get_mut(index) {
            message.text.clear();
            message.text.push_str(text);
        }
        drop(guard);
        self.touch();
    }

    /// Mirror the current history to the store.
    ///
    /// Store failures are logged and do not affect the turn.
    async fn persist(&self) {
        let _write = self.inner.persist_lock.lock().await;
        let snapshot = self.messages();
        let store = &self.inner.store;
        let visitor_id = &self.inner.visitor_id;

        let result = if snapshot.is_empty() {
            store.remove_item(visitor_id, CHAT_HISTORY_KEY).await
        } else {
            match serde_json::to_string(&snapshot) {
                Ok(raw) => store.set_item(visitor_id, CHAT_HISTORY_KEY, &raw).await,
                Err(e) => {
                    tracing::error!(visitor_id = %visitor_id, error = %e, "Failed to serialize chat history");
                    return;
                }
            }
        };

        if let Err(e) = result {
            tracing::warn!(visitor_id = %visitor_id, error = %e, "Failed to persist chat history");
        }
    }

    fn touch(&self) {
        *self.inner.last_activity.write().unwrap() = Utc::now();
    }

    /// Whether the session has been idle longer than `timeout`.
    #[must_use]
    pub fn is_idle_for(&self, timeout: Duration) -> bool {
        let last = *self.inner.last_activity.read().unwrap();
        match (Utc::now() - last).to_std() {
            Ok(idle) => idle > timeout,
            // Clock went backwards.
            Err(_) => false,
        }
    }
}

/// Registry of live chat sessions keyed by visitor id.
///
/// Sessions are opened lazily from the store and dropped from memory after
/// a period of inactivity; their history stays in the store.
#[derive(Debug, Clone)]
pub struct ChatSessions {
    inner: Arc<ChatSessionsInner>,
}

#[derive(Debug)]
struct ChatSessionsInner {
    sessions: RwLock<HashMap<String, ChatSession>>,
    store: Arc<dyn LocalStore>,
}

impl ChatSessions {
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            inner: Arc::new(ChatSessionsInner {
                sessions: RwLock::new(HashMap::new()),
                store,
            }),
        }
    }

    /// A fresh visitor id.
    #[must_use]
    pub fn new_visitor_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Get the live session for `visitor_id`, opening it from the store if needed.
    ///
    /// The session is marked active while the registry lock is held, so an
    /// eviction pass cannot drop it between lookup and use.
    pub async fn get_or_open(&self, visitor_id: &str) -> ChatSession {
        {
            let guard = self.inner.sessions.read().unwrap();
            if let Some(session) = guard.get(visitor_id) {
                session.touch();
                return session.clone();
            }
        }

        let opened = ChatSession::open(visitor_id, Arc::clone(&self.inner.store)).await;
        let mut guard = self.inner.sessions.write().unwrap();
        // Another request may have opened it meanwhile; keep the first.
        let session = guard.entry(visitor_id.to_string()).or_insert(opened);
        session.touch();
        session.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.sessions.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop idle sessions that have no turn in flight.
    ///
    /// Returns the number of sessions removed.
    pub fn evict_idle(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.sessions.write().unwrap();
        let before = guard.len();
        guard.retain(|_, session| session.is_busy() || !session.is_idle_for(timeout));
        before - guard.len()
    }
}
