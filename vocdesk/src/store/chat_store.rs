//! The conversation store: session identity, message log and pending template.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use uuid::Uuid;

use crate::api::Backend;
use crate::models::{Message, PendingTemplate, TemplateFields};

use super::state::{Action, ChatState};

/// Shown when a chat message could not be answered.
pub const SEND_FAILED_MESSAGE: &str = "오류가 발생했습니다. 다시 시도해 주세요.";
/// Shown when the ticket could not be created.
pub const CONFIRM_FAILED_MESSAGE: &str =
    "Jira 티켓 생성 중 오류가 발생했습니다. 다시 시도해 주세요.";

/// What a store operation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing happened: empty input, nothing pending, or a request in flight.
    Skipped,
    /// The backend answered and the log was updated.
    Completed,
    /// The request failed and an error message was appended.
    Failed,
}

/// Owns the conversation for one session and is its only writer.
///
/// At most one request is in flight at a time. The in-flight gate is separate
/// from the loading flag in [`ChatState`]: it is taken before the user message
/// is appended and released only after the final state has been published.
pub struct ChatStore<B> {
    backend: B,
    session_id: String,
    state: watch::Sender<ChatState>,
    in_flight: AtomicBool,
}

impl<B: Backend> ChatStore<B> {
    /// Start a new session with a freshly generated id.
    pub fn new(backend: B) -> Self {
        Self::with_session_id(backend, Uuid::now_v7().to_string())
    }

    pub fn with_session_id(backend: B, session_id: String) -> Self {
        let (state, _) = watch::channel(ChatState::default());
        Self {
            backend,
            session_id,
            state,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> ChatState {
        self.state.borrow().clone()
    }

    /// Receive every new state as it is published.
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }

    pub fn pending(&self) -> Option<PendingTemplate> {
        self.state.borrow().pending().cloned()
    }

    fn apply(&self, action: Action) {
        self.state.send_modify(|state| {
            let current = std::mem::take(state);
            *state = current.reduce(action);
        });
    }

    /// Take the in-flight gate, or `None` if a request is already running.
    fn begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(InFlight {
            gate: &self.in_flight,
            state: &self.state,
        })
    }

    /// Send a user message and record the backend's answer.
    pub async fn send(&self, text: &str) -> Dispatch {
        if text.trim().is_empty() {
            return Dispatch::Skipped;
        }
        let Some(_flight) = self.begin() else {
            tracing::debug!(session_id = %self.session_id, "send ignored: request in flight");
            return Dispatch::Skipped;
        };

        self.apply(Action::Submitted(Message::user(text)));

        match self.backend.send_message(&self.session_id, text).await {
            Ok(resp) => {
                tracing::debug!(session_id = %resp.session_id, kind = %resp.kind, "reply received");
                self.apply(Action::reply(resp));
                Dispatch::Completed
            }
            Err(_) => {
                self.apply(Action::Failed(Message::assistant_text(SEND_FAILED_MESSAGE)));
                Dispatch::Failed
            }
        }
    }

    /// Create the ticket for the pending template using `fields`, which may
    /// be an edited copy of the proposal.
    pub async fn confirm(&self, fields: TemplateFields) -> Dispatch {
        let Some(_flight) = self.begin() else {
            tracing::debug!(session_id = %self.session_id, "confirm ignored: request in flight");
            return Dispatch::Skipped;
        };
        let Some(pending) = self.pending() else {
            return Dispatch::Skipped;
        };

        self.apply(Action::ConfirmStarted);

        match self
            .backend
            .confirm_ticket(&self.session_id, &pending.template_id, &fields)
            .await
        {
            Ok(ticket) => {
                tracing::info!(
                    session_id = %self.session_id,
                    ticket_key = %ticket.ticket_key,
                    "ticket created"
                );
                self.apply(Action::ticket_created(ticket));
                Dispatch::Completed
            }
            Err(_) => {
                self.apply(Action::Failed(Message::assistant_text(
                    CONFIRM_FAILED_MESSAGE,
                )));
                Dispatch::Failed
            }
        }
    }

    /// Drop the pending template. No request is made.
    pub fn cancel_pending(&self) {
        self.apply(Action::PendingCancelled);
    }
}

/// Held for the duration of one request.
///
/// Dropping it clears the loading flag if the request never settled (its
/// future was dropped mid-flight), then reopens the gate.
struct InFlight<'a> {
    gate: &'a AtomicBool,
    state: &'a watch::Sender<ChatState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.state.borrow().is_loading() {
            self.state.send_modify(|state| {
                let current = std::mem::take(state);
                *state = current.reduce(Action::Abandoned);
            });
        }
        self.gate.store(false, Ordering::Release);
    }
}
