//! Ordered, append-only conversation log and its trimming policy.

use std::collections::HashSet;

/// How many non-directive, non-file-context entries survive a trim pass.
pub const RETAINED_TAIL_ENTRIES: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Tag for entries carrying auxiliary context rather than dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTag {
    FileContext,
}

/// Completed tool call recorded on an assistant entry. Arguments stay as
/// the raw text finalized from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub role: Role,
    pub content: Option<String>,
    pub calls: Vec<RecordedCall>,
    pub tag: Option<EntryTag>,
    pub call_id: Option<String>,
    pub tool_name: Option<String>,
    pub path: Option<String>,
}

impl ConversationEntry {
    #[must_use]
    pub fn directive(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(text.into()),
            calls: Vec::new(),
            tag: None,
            call_id: None,
            tool_name: None,
            path: None,
        }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(text.into()),
            calls: Vec::new(),
            tag: None,
            call_id: None,
            tool_name: None,
            path: None,
        }
    }

    #[must_use]
    pub fn assistant(content: Option<String>, calls: Vec<RecordedCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            calls,
            tag: None,
            call_id: None,
            tool_name: None,
            path: None,
        }
    }

    #[must_use]
    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            calls: Vec::new(),
            tag: None,
            call_id: Some(call_id.into()),
            tool_name: Some(tool_name.into()),
            path: None,
        }
    }

    /// Snapshot of one file's content, keyed by its normalized path.
    #[must_use]
    pub fn file_context(path: impl Into<String>, snapshot: impl Into<String>) -> Self {
        let path = path.into();
        let snapshot = snapshot.into();
        Self {
            role: Role::System,
            content: Some(format!("Content of file '{path}':\n\n{snapshot}")),
            calls: Vec::new(),
            tag: Some(EntryTag::FileContext),
            call_id: None,
            tool_name: None,
            path: Some(path),
        }
    }

    #[must_use]
    pub fn is_file_context(&self) -> bool {
        self.tag == Some(EntryTag::FileContext)
    }

    /// The raw snapshot text of a file-context entry, without the content
    /// marker [`file_context`](Self::file_context) wraps around it.
    #[must_use]
    pub fn file_snapshot(&self) -> Option<&str> {
        if !self.is_file_context() {
            return None;
        }

        let path = self.path.as_deref()?;
        let marker = format!("Content of file '{path}':\n\n");
        self.content.as_deref()?.strip_prefix(marker.as_str())
    }
}

/// Ordered log of conversation entries; the only long-lived owner of them.
///
/// The leading system directive is pinned at index 0. Trimming retains the
/// directive, every file-context entry, and the most recent
/// [`RETAINED_TAIL_ENTRIES`] other entries, preserving relative order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptStore {
    entries: Vec<ConversationEntry>,
    retain_tail: usize,
}

impl TranscriptStore {
    #[must_use]
    pub fn new(directive: impl Into<String>) -> Self {
        Self::with_retain_tail(directive, RETAINED_TAIL_ENTRIES)
    }

    #[must_use]
    pub fn with_retain_tail(directive: impl Into<String>, retain_tail: usize) -> Self {
        Self {
            entries: vec![ConversationEntry::directive(directive)],
            retain_tail,
        }
    }

    /// Rebuilds a store from restored entries, inserting `fallback_directive`
    /// at index 0 when the restored log lacks a leading directive.
    #[must_use]
    pub fn from_entries(
        mut entries: Vec<ConversationEntry>,
        fallback_directive: impl Into<String>,
    ) -> Self {
        let has_directive = entries
            .first()
            .is_some_and(|entry| entry.role == Role::System && entry.tag.is_none());
        if !has_directive {
            entries.insert(0, ConversationEntry::directive(fallback_directive));
        }

        Self {
            entries,
            retain_tail: RETAINED_TAIL_ENTRIES,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    #[must_use]
    pub fn directive(&self) -> &ConversationEntry {
        &self.entries[0]
    }

    /// Rewrites the directive content in place; index 0 never moves.
    pub fn refresh_directive(&mut self, text: impl Into<String>) {
        self.entries[0].content = Some(text.into());
    }

    pub fn push(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(ConversationEntry::user(text));
    }

    /// Live snapshot entry for a normalized path, if any.
    #[must_use]
    pub fn file_context(&self, path: &str) -> Option<&ConversationEntry> {
        self.entries
            .iter()
            .find(|entry| entry.is_file_context() && entry.path.as_deref() == Some(path))
    }

    #[must_use]
    pub fn file_context_paths(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.is_file_context())
            .filter_map(|entry| entry.path.as_deref())
            .collect()
    }

    /// Removes the stale snapshot for `path` (if any) and appends a fresh
    /// one, upholding the one-live-snapshot-per-path invariant.
    pub fn upsert_file_context(&mut self, path: impl Into<String>, snapshot: impl Into<String>) {
        let path = path.into();
        self.remove_file_context(&path);
        self.push(ConversationEntry::file_context(path, snapshot));
    }

    pub fn remove_file_context(&mut self, path: &str) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !(entry.is_file_context() && entry.path.as_deref() == Some(path)));
        self.entries.len() < before
    }

    /// Applies the retention policy; returns how many entries were dropped.
    pub fn trim(&mut self) -> usize {
        let mut other_indices = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if index == 0 && entry.role == Role::System && entry.tag.is_none() {
                continue;
            }
            if entry.is_file_context() {
                continue;
            }
            other_indices.push(index);
        }

        if other_indices.len() <= self.retain_tail {
            return 0;
        }

        let cutoff = other_indices.len() - self.retain_tail;
        let dropped: HashSet<usize> = other_indices[..cutoff].iter().copied().collect();

        let before = self.entries.len();
        let mut index = 0usize;
        self.entries.retain(|_| {
            let keep = !dropped.contains(&index);
            index += 1;
            keep
        });

        let removed = before - self.entries.len();
        tracing::debug!(removed, retained = self.entries.len(), "trimmed transcript");
        removed
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{ConversationEntry, Role, TranscriptStore};

    fn store_with_noise(other_count: usize) -> TranscriptStore {
        let mut store = TranscriptStore::new("directive");
        store.upsert_file_context("/w/a.txt", "alpha");
        for index in 0..other_count {
            store.push_user(format!("message {index}"));
        }
        store.upsert_file_context("/w/b.txt", "beta");
        store
    }

    #[test]
    fn new_store_pins_the_directive_at_index_zero() {
        let store = TranscriptStore::new("directive");
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.directive().role, Role::System);
        assert_eq!(store.directive().content.as_deref(), Some("directive"));
    }

    #[test]
    fn trim_keeps_directive_file_contexts_and_recent_tail() {
        let mut store = store_with_noise(45);
        let removed = store.trim();

        assert_eq!(removed, 15);
        let entries = store.entries();
        assert_eq!(entries[0].content.as_deref(), Some("directive"));
        assert_eq!(store.file_context_paths(), vec!["/w/a.txt", "/w/b.txt"]);

        let others: Vec<&ConversationEntry> = entries
            .iter()
            .enumerate()
            .filter(|(index, entry)| *index != 0 && !entry.is_file_context())
            .map(|(_, entry)| entry)
            .collect();
        assert_eq!(others.len(), 30);
        assert_eq!(others[0].content.as_deref(), Some("message 15"));
        assert_eq!(others[29].content.as_deref(), Some("message 44"));
    }

    #[test]
    fn trim_preserves_relative_order_of_retained_entries() {
        let mut store = store_with_noise(45);
        store.trim();

        // The first file context precedes the retained tail; the second one
        // was appended after it and must stay behind it.
        let positions: Vec<usize> = store
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_file_context())
            .map(|(index, _)| index)
            .collect();
        assert_eq!(positions[0], 1);
        assert_eq!(positions[1], store.entries().len() - 1);
    }

    #[test]
    fn trim_below_threshold_is_a_no_op() {
        let mut store = store_with_noise(12);
        let before = store.entries().to_vec();

        assert_eq!(store.trim(), 0);
        assert_eq!(store.entries(), before.as_slice());
    }

    #[test]
    fn upsert_replaces_the_stale_snapshot_for_a_path() {
        let mut store = TranscriptStore::new("directive");
        store.upsert_file_context("/w/a.txt", "old");
        store.push_user("between");
        store.upsert_file_context("/w/a.txt", "new");

        let snapshots: Vec<&ConversationEntry> = store
            .entries()
            .iter()
            .filter(|entry| entry.is_file_context())
            .collect();
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0]
            .content
            .as_deref()
            .is_some_and(|content| content.ends_with("new")));
        // The fresh snapshot landed after the interleaved user entry.
        assert!(store.entries().last().expect("non-empty").is_file_context());
    }

    #[test]
    fn remove_file_context_reports_whether_anything_matched() {
        let mut store = TranscriptStore::new("directive");
        store.upsert_file_context("/w/a.txt", "alpha");

        assert!(store.remove_file_context("/w/a.txt"));
        assert!(!store.remove_file_context("/w/a.txt"));
        assert!(store.file_context("/w/a.txt").is_none());
    }

    #[test]
    fn refresh_directive_rewrites_content_without_moving_it() {
        let mut store = TranscriptStore::new("old directive");
        store.push_user("hello");
        store.refresh_directive("new directive");

        assert_eq!(store.directive().content.as_deref(), Some("new directive"));
        assert_eq!(store.entries().len(), 2);
    }

    #[test]
    fn restored_entries_without_a_directive_gain_one() {
        let store = TranscriptStore::from_entries(
            vec![ConversationEntry::user("restored")],
            "fallback directive",
        );

        assert_eq!(
            store.directive().content.as_deref(),
            Some("fallback directive")
        );
        assert_eq!(store.entries().len(), 2);
    }
}
