use serde::{Deserialize, Serialize};

/// Record format accepted and produced by this crate.
///
/// Version 2 carries structured entries; version 1 files (free-form message
/// maps) are not readable and fail loading with an explicit error.
pub const FORMAT_VERSION: u32 = 2;

/// Durable snapshot of one assistant session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionRecord {
    pub format_version: u32,
    pub session_id: String,
    pub saved_at: String,
    pub active_model: String,
    pub workspace_root: Option<String>,
    pub entries: Vec<SessionEntry>,
}

/// One persisted conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum SessionEntry {
    SystemDirective {
        text: String,
    },
    FileContext {
        path: String,
        text: String,
    },
    UserText {
        text: String,
    },
    AssistantText {
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        calls: Vec<RecordedCall>,
    },
    ToolResult {
        call_id: String,
        tool_name: String,
        content: String,
    },
}

/// Tool call recorded on a persisted assistant entry, arguments kept as the
/// raw text finalized from the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordedCall {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: String,
}
