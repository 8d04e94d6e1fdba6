//! Validation and execution of one tool invocation against its concrete
//! operation.
//!
//! The dispatcher never lets a failure escape: argument parse errors,
//! schema violations, and filesystem faults all convert into a
//! [`ToolResult`] whose content is a human-readable diagnostic, so the turn
//! continues with the model informed of what went wrong.

use std::path::{Path, PathBuf};

use serde_json::Value;

use diff_edit_engine::{apply_snippet_edit, unified_preview, EditError, EditOutcome};

use crate::assembler::ToolInvocation;
use crate::fs::Filesystem;
use crate::gate::ConfirmationPrompt;
use crate::ops::{
    CreateManyArgs, CreateOneArgs, ListDirectoryArgs, Operation, PendingEditDirective,
    ReadManyArgs, ReadOneArgs,
};
use crate::paths::{is_sensitive_system_path, PathResolver};
use crate::transcript::TranscriptStore;

const MULTI_READ_HEADER: &str =
    "==================== MULTIPLE FILE RESULTS ====================";

/// Outcome of one dispatched invocation. `content` is always populated;
/// success or failure is encoded in the text, never in a raised error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub call_id: String,
    pub tool_name: String,
    pub content: String,
}

/// Executes invocations in slot order against the filesystem collaborator.
pub struct ToolDispatcher {
    fs: Box<dyn Filesystem>,
    resolver: PathResolver,
}

impl ToolDispatcher {
    #[must_use]
    pub fn new(fs: Box<dyn Filesystem>, resolver: PathResolver) -> Self {
        Self { fs, resolver }
    }

    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Validates and executes one invocation; always returns a result.
    pub fn dispatch(
        &mut self,
        invocation: &ToolInvocation,
        transcript: &mut TranscriptStore,
        prompt: &mut dyn ConfirmationPrompt,
    ) -> ToolResult {
        tracing::debug!(
            call_id = %invocation.call_id,
            tool_name = %invocation.tool_name,
            "dispatching invocation"
        );

        let content = match self.execute(invocation, transcript, prompt) {
            Ok(content) => content,
            Err(diagnostic) => {
                tracing::warn!(
                    call_id = %invocation.call_id,
                    tool_name = %invocation.tool_name,
                    %diagnostic,
                    "invocation failed"
                );
                diagnostic
            }
        };

        ToolResult {
            call_id: invocation.call_id.clone(),
            tool_name: invocation.tool_name.clone(),
            content,
        }
    }

    fn execute(
        &mut self,
        invocation: &ToolInvocation,
        transcript: &mut TranscriptStore,
        prompt: &mut dyn ConfirmationPrompt,
    ) -> Result<String, String> {
        let Some(operation) = Operation::parse(&invocation.tool_name) else {
            return Err(format!(
                "Unknown operation '{}'. Known operations: {}.",
                invocation.tool_name,
                Operation::ALL
                    .iter()
                    .map(Operation::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        };

        // Streamed argument text may legitimately be empty for operations
        // without required fields.
        let raw = if invocation.arguments.trim().is_empty() {
            "{}"
        } else {
            invocation.arguments.as_str()
        };
        let payload: Value = serde_json::from_str(raw).map_err(|error| {
            format!(
                "Could not parse arguments for '{}': invalid JSON: {error}. Arguments received: {}",
                operation.as_str(),
                invocation.arguments
            )
        })?;

        match operation {
            Operation::ReadOne => {
                let args: ReadOneArgs = parse_args(operation, payload)?;
                self.read_one(&args.path)
            }
            Operation::ReadMany => {
                let args: ReadManyArgs = parse_args(operation, payload)?;
                Ok(self.read_many(&args.paths))
            }
            Operation::CreateOne => {
                let args: CreateOneArgs = parse_args(operation, payload)?;
                self.create_one(&args.path, &args.content, prompt)
            }
            Operation::CreateMany => {
                let args: CreateManyArgs = parse_args(operation, payload)?;
                self.create_many(args, prompt)
            }
            Operation::Edit => {
                let directive: PendingEditDirective = parse_args(operation, payload)?;
                self.edit(&directive, transcript, prompt)
            }
            Operation::ListDirectory => {
                let args: ListDirectoryArgs = parse_args(operation, payload)?;
                self.list_directory(args.path.as_deref())
            }
        }
    }

    fn read_one(&mut self, raw_path: &str) -> Result<String, String> {
        let resolved = self.resolver.resolve(raw_path);
        let content = self
            .fs
            .read(&resolved)
            .map_err(|error| format!("Failed to read file '{}': {error}", resolved.display()))?;

        Ok(format!(
            "Content of file '{}':\n\n{content}",
            resolved.display()
        ))
    }

    fn read_many(&mut self, raw_paths: &[String]) -> String {
        let mut sections = vec![MULTI_READ_HEADER.to_string()];

        for raw_path in raw_paths {
            let resolved = self.resolver.resolve(raw_path);
            let section = match self.fs.read(&resolved) {
                Ok(content) => {
                    format!("Content of file '{}':\n\n{content}", resolved.display())
                }
                Err(error) => format!("Error reading '{}': {error}", resolved.display()),
            };
            sections.push(section);
        }

        sections.join("\n\n")
    }

    fn create_one(
        &mut self,
        raw_path: &str,
        content: &str,
        prompt: &mut dyn ConfirmationPrompt,
    ) -> Result<String, String> {
        let resolved = self.resolver.resolve(raw_path);
        let notice = self.guarded_write(&resolved, content, prompt)?;

        let mut message = format!(
            "Successfully created/updated file '{}'.",
            resolved.display()
        );
        if let Some(notice) = notice {
            message.push('\n');
            message.push_str(&notice);
        }

        Ok(message)
    }

    fn create_many(
        &mut self,
        args: CreateManyArgs,
        prompt: &mut dyn ConfirmationPrompt,
    ) -> Result<String, String> {
        let mut created: Vec<String> = Vec::new();

        for file in &args.files {
            let resolved = self.resolver.resolve(&file.path);
            match self.guarded_write(&resolved, &file.content, prompt) {
                Ok(_notice) => created.push(resolved.display().to_string()),
                Err(error) if created.is_empty() => return Err(error),
                Err(error) => {
                    return Err(format!(
                        "{error} ({} file(s) were already written before the failure: {})",
                        created.len(),
                        created.join(", ")
                    ));
                }
            }
        }

        Ok(format!(
            "Successfully created/updated {} files: {}.",
            created.len(),
            created.join(", ")
        ))
    }

    fn edit(
        &mut self,
        directive: &PendingEditDirective,
        transcript: &mut TranscriptStore,
        prompt: &mut dyn ConfirmationPrompt,
    ) -> Result<String, String> {
        let resolved = self.resolver.resolve(&directive.path);
        let display = resolved.display().to_string();

        // The snippet must have been grounded in real content; snapshot the
        // file into the transcript when no live context exists for it.
        if transcript.file_context(&display).is_none() {
            let snapshot = self.fs.read(&resolved).map_err(|error| {
                format!("Could not bring '{display}' into context: {error}. Edit aborted.")
            })?;
            transcript.upsert_file_context(display.clone(), snapshot);
        }

        let current = self
            .fs
            .read(&resolved)
            .map_err(|error| format!("Failed to read file '{display}': {error}"))?;

        match apply_snippet_edit(
            &current,
            &directive.original_snippet,
            &directive.replacement_snippet,
        ) {
            Err(EditError::EmptyOriginalSnippet) => {
                Err(format!("original_snippet for '{display}' must not be empty."))
            }
            Err(EditError::SnippetNotFound { expected }) => Err(format!(
                "Original snippet not found in '{display}'. File not changed.\n\
                 Expected snippet (verbatim):\n{expected}"
            )),
            Ok(EditOutcome::NoChange { .. }) => Ok(format!(
                "Snippet replacement resulted in no change to '{display}'; file left unmodified."
            )),
            Ok(EditOutcome::Applied {
                content,
                occurrences,
            }) => {
                let notice = self.guarded_write(&resolved, &content, prompt)?;
                transcript.upsert_file_context(display.clone(), content.clone());

                let mut message = format!("Successfully applied edit to file '{display}'.");
                if occurrences > 1 {
                    message = format!(
                        "Warning: original snippet found {occurrences} times in '{display}'; \
                         replaced the leftmost occurrence.\n{}\n\n{message}",
                        unified_preview(&current, &content)
                    );
                }
                if let Some(notice) = notice {
                    message.push('\n');
                    message.push_str(&notice);
                }

                Ok(message)
            }
        }
    }

    fn list_directory(&mut self, raw_path: Option<&str>) -> Result<String, String> {
        let target = match raw_path {
            Some(raw) => self.resolver.resolve(raw),
            None => match self.resolver.workspace_root() {
                Some(root) => root.to_path_buf(),
                None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            },
        };

        let entries = self
            .fs
            .list(&target)
            .map_err(|error| format!("Failed to list directory '{}': {error}", target.display()))?;

        if entries.is_empty() {
            return Ok(format!("Directory '{}' is empty.", target.display()));
        }

        let listing: Vec<String> = entries
            .iter()
            .map(|entry| {
                format!(
                    "- {} ({})",
                    entry.name,
                    if entry.is_dir { "dir" } else { "file" }
                )
            })
            .collect();

        Ok(format!(
            "Contents of directory '{}':\n{}",
            target.display(),
            listing.join("\n")
        ))
    }

    /// Applies the write-side guards shared by create and edit: sensitive
    /// system locations need explicit confirmation, writes landing outside
    /// the workspace root carry a passive notice.
    fn guarded_write(
        &mut self,
        resolved: &Path,
        content: &str,
        prompt: &mut dyn ConfirmationPrompt,
    ) -> Result<Option<String>, String> {
        if is_sensitive_system_path(resolved) && !prompt.confirm_sensitive_write(resolved) {
            return Err(format!(
                "Permission denied: write to sensitive system path '{}' was declined.",
                resolved.display()
            ));
        }

        let notice = if self.resolver.is_outside_workspace(resolved) {
            tracing::warn!(path = %resolved.display(), "write outside the active workspace root");
            Some(format!(
                "Note: '{}' is outside the active workspace root.",
                resolved.display()
            ))
        } else {
            None
        };

        self.fs
            .write(resolved, content)
            .map_err(|error| format!("Failed to write file '{}': {error}", resolved.display()))?;

        Ok(notice)
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(
    operation: Operation,
    payload: Value,
) -> Result<T, String> {
    serde_json::from_value(payload).map_err(|error| {
        format!(
            "Invalid arguments for '{}': {error}.",
            operation.as_str()
        )
    })
}
