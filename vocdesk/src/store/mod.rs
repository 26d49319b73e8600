//! Conversation state store.
//!
//! `state` is the pure part (value + reducer); `chat_store` drives it against
//! a [`Backend`](crate::api::Backend).

mod chat_store;
mod state;

pub use chat_store::{ChatStore, Dispatch};
pub use state::ChatState;
