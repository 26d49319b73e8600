//! Conversation state as an immutable value plus a pure reducer.

use crate::api::{ChatResponse, ConfirmResponse};
use crate::models::{Message, MessageKind, MessageMetadata, MessageRole, PendingTemplate};

/// Snapshot of one conversation.
///
/// The message log only ever grows. `pending` holds the single template that
/// can still be confirmed; older previews in the log are history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    messages: Vec<Message>,
    is_loading: bool,
    pending: Option<PendingTemplate>,
}

/// Everything that can happen to a [`ChatState`].
#[derive(Debug, Clone)]
pub enum Action {
    /// The user sent a message; a request is now in flight.
    Submitted(Message),
    /// The backend answered a chat message.
    Replied {
        message: Message,
        pending: Option<PendingTemplate>,
    },
    /// A confirmation request is now in flight.
    ConfirmStarted,
    /// The backend created the ticket.
    TicketCreated(Message),
    /// A request failed; `message` explains it to the user.
    Failed(Message),
    /// The user discarded the pending template.
    PendingCancelled,
    /// A request ended without an answer (its future was dropped).
    Abandoned,
}

impl Action {
    /// Turn a chat reply into the assistant message it renders as, and the
    /// template it proposes, if any.
    pub fn reply(resp: ChatResponse) -> Self {
        let pending = pending_from(resp.kind, resp.metadata.as_ref());
        let message = Message::new(MessageRole::Assistant, resp.kind, resp.message)
            .with_metadata(resp.metadata);
        Self::Replied { message, pending }
    }

    /// Turn a created ticket into its announcement message.
    pub fn ticket_created(ticket: ConfirmResponse) -> Self {
        let content = format!("Jira 티켓 **{}**이(가) 생성되었습니다!", ticket.ticket_key);
        let message = Message::new(MessageRole::Assistant, MessageKind::TicketCreated, content)
            .with_metadata(Some(MessageMetadata::ticket(
                ticket.ticket_key,
                ticket.ticket_url,
            )));
        Self::TicketCreated(message)
    }
}

/// A reply proposes a template only if it is a preview carrying a template id.
fn pending_from(kind: MessageKind, metadata: Option<&MessageMetadata>) -> Option<PendingTemplate> {
    if kind != MessageKind::TemplatePreview {
        return None;
    }
    let meta = metadata?;
    let template_id = meta.template_id.clone().filter(|id| !id.is_empty())?;
    Some(PendingTemplate {
        template_id,
        template_name: meta.template_name.clone().unwrap_or_default(),
        fields: meta.fields.clone().unwrap_or_default(),
    })
}

impl ChatState {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub const fn pending(&self) -> Option<&PendingTemplate> {
        self.pending.as_ref()
    }

    /// The most recent created ticket, newest first.
    pub fn last_ticket(&self) -> Option<(&str, &str)> {
        self.messages.iter().rev().find_map(Message::ticket)
    }

    /// Apply an action and return the next state.
    #[must_use]
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::Submitted(message) => {
                self.messages.push(message);
                self.is_loading = true;
            }
            Action::Replied { message, pending } => {
                self.messages.push(message);
                self.pending = pending;
                self.is_loading = false;
            }
            Action::ConfirmStarted => {
                self.is_loading = true;
            }
            Action::TicketCreated(message) => {
                self.messages.push(message);
                self.pending = None;
                self.is_loading = false;
            }
            Action::Failed(message) => {
                self.messages.push(message);
                self.is_loading = false;
            }
            Action::PendingCancelled => {
                self.pending = None;
            }
            Action::Abandoned => {
                self.is_loading = false;
            }
        }
        self
    }
}
