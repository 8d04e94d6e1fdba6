//! Provider-neutral contract for executing a single streamed model turn.
//!
//! This crate intentionally defines only the message projection, the
//! operation-schema envelope, the fragment-based event stream, and the
//! channel failure taxonomy. It excludes transport details, retry policy,
//! and orchestration concerns, which belong to concrete channel
//! implementations and to `code_assistant` respectively.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Model-facing projection of one transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChannelMessage {
    System {
        text: String,
    },
    User {
        text: String,
    },
    Assistant {
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        calls: Vec<AssistantCall>,
    },
    ToolResult {
        call_id: String,
        tool_name: String,
        content: String,
    },
}

/// A completed tool call recorded on an assistant message.
///
/// `arguments` is the raw argument text exactly as finalized from the
/// stream; it is not re-parsed for projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantCall {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: String,
}

/// JSON-schema envelope for one operation exposed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Input required to start one channel turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    pub messages: Vec<ChannelMessage>,
    pub operations: Vec<OperationSchema>,
}

/// One partial piece of an in-progress tool call, bound to a slot index.
///
/// Fragments for the same slot arrive in order; slots interleave
/// arbitrarily. Any subset of the optional fields may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallFragment {
    pub slot: usize,
    pub call_id: Option<String>,
    pub name_delta: Option<String>,
    pub arguments_delta: Option<String>,
}

impl CallFragment {
    #[must_use]
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    #[must_use]
    pub fn with_name_delta(mut self, delta: impl Into<String>) -> Self {
        self.name_delta = Some(delta.into());
        self
    }

    #[must_use]
    pub fn with_arguments_delta(mut self, delta: impl Into<String>) -> Self {
        self.arguments_delta = Some(delta.into());
        self
    }
}

/// Incremental event emitted while a channel turn streams.
///
/// End-of-stream is signalled by `request_turn` returning, not by a
/// dedicated event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    TextDelta(String),
    CallFragment(CallFragment),
}

/// Failure conditions a channel may surface for one turn.
///
/// All variants terminate the turn; the caller observes them as "no
/// response" and must not record a partial assistant entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("connection failure: {0}")]
    Connection(String),
    #[error("authentication failure: {0}")]
    Authentication(String),
    #[error("rate limit reached: {0}")]
    RateLimit(String),
    #[error("channel failure: {0}")]
    Other(String),
}

/// Channel interface for executing one turn request.
///
/// Implementations emit events in stream order through `emit` and return
/// once the stream ends. The callback is serial from the caller's
/// perspective; no events may be emitted after the call returns.
pub trait ModelChannel {
    fn request_turn(
        &self,
        request: &TurnRequest,
        emit: &mut dyn FnMut(ChannelEvent),
    ) -> Result<(), ChannelError>;
}
