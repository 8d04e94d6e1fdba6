//! Explicit session state threaded through every call: the transcript, the
//! active model identifier, and the optional workspace root, with a defined
//! save/restore lifecycle.

use std::path::{Path, PathBuf};

use model_channel::{AssistantCall, ChannelMessage, TurnRequest};
use session_store::{RecordedCall as StoredCall, SessionEntry, SessionRecord, SessionStoreError};

use crate::fs::{Filesystem, FsError};
use crate::ops::operation_schemas;
use crate::paths::PathResolver;
use crate::transcript::{ConversationEntry, RecordedCall, Role, TranscriptStore};

pub const SYSTEM_DIRECTIVE_ENV_VAR: &str = "CODE_ASSISTANT_SYSTEM_DIRECTIVE";
pub const DEFAULT_SYSTEM_DIRECTIVE: &str = "You are a careful software engineering assistant. \
    Use the provided operations to read before you edit, keep edits minimal and exact, and \
    state plainly when a request cannot be satisfied.";

/// Reads the directive base from the environment, falling back to the
/// built-in default when unset or blank.
#[must_use]
pub fn directive_from_env() -> String {
    sanitize_directive(std::env::var(SYSTEM_DIRECTIVE_ENV_VAR).ok())
}

fn sanitize_directive(raw: Option<String>) -> String {
    match raw {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => DEFAULT_SYSTEM_DIRECTIVE.to_string(),
    }
}

fn render_directive(base: &str, active_model: &str, workspace_root: Option<&Path>) -> String {
    let workspace_info = match workspace_root {
        Some(root) => root.display().to_string(),
        None => "not set; relative paths resolve from the working directory".to_string(),
    };

    format!("{base}\n\nActive model: {active_model}\nWorkspace root: {workspace_info}")
}

/// Result of attaching one file to the conversation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    AlreadyAttached,
}

/// One assistant session. Constructed at session start and passed
/// explicitly; there is no ambient global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    transcript: TranscriptStore,
    directive_base: String,
    active_model: String,
    workspace_root: Option<PathBuf>,
}

impl Session {
    #[must_use]
    pub fn new(active_model: impl Into<String>, workspace_root: Option<PathBuf>) -> Self {
        Self::with_directive_base(DEFAULT_SYSTEM_DIRECTIVE, active_model, workspace_root)
    }

    #[must_use]
    pub fn with_directive_base(
        directive_base: impl Into<String>,
        active_model: impl Into<String>,
        workspace_root: Option<PathBuf>,
    ) -> Self {
        let directive_base = directive_base.into();
        let active_model = active_model.into();
        let transcript = TranscriptStore::new(render_directive(
            &directive_base,
            &active_model,
            workspace_root.as_deref(),
        ));

        Self {
            transcript,
            directive_base,
            active_model,
            workspace_root,
        }
    }

    #[must_use]
    pub fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut TranscriptStore {
        &mut self.transcript
    }

    #[must_use]
    pub fn active_model(&self) -> &str {
        &self.active_model
    }

    #[must_use]
    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }

    #[must_use]
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(self.workspace_root.clone())
    }

    /// Switches the active model; the directive refreshes in place.
    pub fn set_active_model(&mut self, active_model: impl Into<String>) {
        self.active_model = active_model.into();
        self.refresh_directive();
    }

    /// Switches (or unsets) the workspace root; the directive refreshes in
    /// place. Callers holding a dispatcher should rebuild it with
    /// [`Session::resolver`].
    pub fn set_workspace_root(&mut self, workspace_root: Option<PathBuf>) {
        self.workspace_root = workspace_root;
        self.refresh_directive();
    }

    fn refresh_directive(&mut self) {
        self.transcript.refresh_directive(render_directive(
            &self.directive_base,
            &self.active_model,
            self.workspace_root.as_deref(),
        ));
    }

    /// Projects the transcript plus operation schemas into one channel
    /// request.
    #[must_use]
    pub fn turn_request(&self) -> TurnRequest {
        let messages = self
            .transcript
            .entries()
            .iter()
            .map(project_entry)
            .collect();

        TurnRequest {
            messages,
            operations: operation_schemas(),
        }
    }

    /// Snapshots one file into the conversation context, keyed by its
    /// normalized path. Attaching an already-attached path is a no-op.
    pub fn attach_file(
        &mut self,
        fs: &dyn Filesystem,
        raw_path: &str,
    ) -> Result<AttachOutcome, FsError> {
        let resolved = self.resolver().resolve(raw_path);
        let display = resolved.display().to_string();

        if self.transcript.file_context(&display).is_some() {
            return Ok(AttachOutcome::AlreadyAttached);
        }

        let snapshot = fs.read(&resolved)?;
        self.transcript.upsert_file_context(display, snapshot);
        Ok(AttachOutcome::Attached)
    }

    /// Removes the context snapshot for a path; true when one existed.
    pub fn remove_file_context(&mut self, raw_path: &str) -> bool {
        let resolved = self.resolver().resolve(raw_path);
        self.transcript
            .remove_file_context(&resolved.display().to_string())
    }

    #[must_use]
    pub fn file_context_paths(&self) -> Vec<&str> {
        self.transcript.file_context_paths()
    }

    /// Converts this session into a persistable record.
    pub fn to_record(&self) -> Result<SessionRecord, SessionStoreError> {
        let entries = self
            .transcript
            .entries()
            .iter()
            .map(store_entry)
            .collect();

        session_store::new_record(
            self.active_model.clone(),
            self.workspace_root
                .as_ref()
                .map(|root| root.display().to_string()),
            entries,
        )
    }

    /// Restores a session from a persisted record. The directive re-renders
    /// against the restored model and workspace, replacing any stale
    /// persisted text in place.
    #[must_use]
    pub fn from_record(record: SessionRecord, directive_base: impl Into<String>) -> Self {
        let directive_base = directive_base.into();
        let workspace_root = record.workspace_root.map(PathBuf::from);
        let rendered = render_directive(
            &directive_base,
            &record.active_model,
            workspace_root.as_deref(),
        );

        let entries: Vec<ConversationEntry> =
            record.entries.into_iter().map(restore_entry).collect();
        let mut transcript = TranscriptStore::from_entries(entries, rendered.clone());
        transcript.refresh_directive(rendered);

        Self {
            transcript,
            directive_base,
            active_model: record.active_model,
            workspace_root,
        }
    }
}

fn project_entry(entry: &ConversationEntry) -> ChannelMessage {
    match entry.role {
        Role::System => ChannelMessage::System {
            text: entry.content.clone().unwrap_or_default(),
        },
        Role::User => ChannelMessage::User {
            text: entry.content.clone().unwrap_or_default(),
        },
        Role::Assistant => ChannelMessage::Assistant {
            text: entry.content.clone(),
            calls: entry
                .calls
                .iter()
                .map(|call| AssistantCall {
                    call_id: call.call_id.clone(),
                    tool_name: call.tool_name.clone(),
                    arguments: call.arguments.clone(),
                })
                .collect(),
        },
        Role::Tool => ChannelMessage::ToolResult {
            call_id: entry.call_id.clone().unwrap_or_default(),
            tool_name: entry.tool_name.clone().unwrap_or_default(),
            content: entry.content.clone().unwrap_or_default(),
        },
    }
}

fn store_entry(entry: &ConversationEntry) -> SessionEntry {
    if entry.is_file_context() {
        return SessionEntry::FileContext {
            path: entry.path.clone().unwrap_or_default(),
            text: entry.file_snapshot().unwrap_or_default().to_string(),
        };
    }

    match entry.role {
        Role::System => SessionEntry::SystemDirective {
            text: entry.content.clone().unwrap_or_default(),
        },
        Role::User => SessionEntry::UserText {
            text: entry.content.clone().unwrap_or_default(),
        },
        Role::Assistant => SessionEntry::AssistantText {
            text: entry.content.clone(),
            calls: entry
                .calls
                .iter()
                .map(|call| StoredCall {
                    call_id: call.call_id.clone(),
                    tool_name: call.tool_name.clone(),
                    arguments: call.arguments.clone(),
                })
                .collect(),
        },
        Role::Tool => SessionEntry::ToolResult {
            call_id: entry.call_id.clone().unwrap_or_default(),
            tool_name: entry.tool_name.clone().unwrap_or_default(),
            content: entry.content.clone().unwrap_or_default(),
        },
    }
}

fn restore_entry(entry: SessionEntry) -> ConversationEntry {
    match entry {
        SessionEntry::SystemDirective { text } => ConversationEntry::directive(text),
        SessionEntry::FileContext { path, text } => ConversationEntry::file_context(path, text),
        SessionEntry::UserText { text } => ConversationEntry::user(text),
        SessionEntry::AssistantText { text, calls } => ConversationEntry::assistant(
            text,
            calls
                .into_iter()
                .map(|call| RecordedCall {
                    call_id: call.call_id,
                    tool_name: call.tool_name,
                    arguments: call.arguments,
                })
                .collect(),
        ),
        SessionEntry::ToolResult {
            call_id,
            tool_name,
            content,
        } => ConversationEntry::tool_result(call_id, tool_name, content),
    }
}
