#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use code_assistant::assembler::ToolInvocation;
use code_assistant::dispatch::ToolDispatcher;
use code_assistant::fs::LocalFs;
use code_assistant::gate::{ConfirmationPrompt, GateDecision};
use code_assistant::session::Session;

/// Scripted operator: replays queued gate decisions, then accepts
/// everything. Sensitive-write confirmations answer with one fixed value.
pub struct ScriptedPrompt {
    decisions: VecDeque<GateDecision>,
    sensitive_answer: bool,
    pub reviewed_batches: Vec<Vec<ToolInvocation>>,
    pub sensitive_requests: Vec<PathBuf>,
}

impl ScriptedPrompt {
    pub fn accept_all() -> Self {
        Self::with_decisions(Vec::new())
    }

    pub fn with_decisions(decisions: Vec<GateDecision>) -> Self {
        Self {
            decisions: decisions.into(),
            sensitive_answer: true,
            reviewed_batches: Vec::new(),
            sensitive_requests: Vec::new(),
        }
    }

    pub fn declining_sensitive() -> Self {
        Self {
            decisions: VecDeque::new(),
            sensitive_answer: false,
            reviewed_batches: Vec::new(),
            sensitive_requests: Vec::new(),
        }
    }

    pub fn review_count(&self) -> usize {
        self.reviewed_batches.len()
    }
}

impl ConfirmationPrompt for ScriptedPrompt {
    fn review_batch(&mut self, batch: &[ToolInvocation]) -> GateDecision {
        self.reviewed_batches.push(batch.to_vec());
        self.decisions.pop_front().unwrap_or(GateDecision::Accepted)
    }

    fn confirm_sensitive_write(&mut self, path: &Path) -> bool {
        self.sensitive_requests.push(path.to_path_buf());
        self.sensitive_answer
    }
}

/// Fresh workspace-rooted session plus a dispatcher over the real
/// filesystem inside a temp directory.
pub fn workspace_fixture() -> (TempDir, Session, ToolDispatcher) {
    let dir = TempDir::new().expect("temp workspace");
    let root = dir
        .path()
        .canonicalize()
        .expect("canonical workspace root");

    let session = Session::with_directive_base("Test directive.", "mock-model", Some(root));
    let dispatcher = ToolDispatcher::new(Box::new(LocalFs::new()), session.resolver());
    (dir, session, dispatcher)
}

pub fn invocation(
    call_id: &str,
    tool_name: &str,
    arguments: impl Into<String>,
) -> ToolInvocation {
    ToolInvocation {
        call_id: call_id.to_string(),
        tool_name: tool_name.to_string(),
        arguments: arguments.into(),
    }
}

pub fn seed_file(session: &Session, relative: &str, content: &str) -> PathBuf {
    let path = session
        .workspace_root()
        .expect("fixture sessions always have a root")
        .join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(&path, content).expect("seed file");
    path
}

pub fn read_seeded(session: &Session, relative: &str) -> String {
    let path = session
        .workspace_root()
        .expect("fixture sessions always have a root")
        .join(relative);
    std::fs::read_to_string(path).expect("read seeded file")
}
