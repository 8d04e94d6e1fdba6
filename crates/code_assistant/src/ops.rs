//! Closed operation set, typed argument records, and the schema envelope
//! advertised to the model.

use serde::Deserialize;
use serde_json::json;

use model_channel::OperationSchema;

/// The closed set of filesystem-affecting operations the model may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ReadOne,
    ReadMany,
    CreateOne,
    CreateMany,
    Edit,
    ListDirectory,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::ReadOne,
        Operation::ReadMany,
        Operation::CreateOne,
        Operation::CreateMany,
        Operation::Edit,
        Operation::ListDirectory,
    ];

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "read-one" => Self::ReadOne,
            "read-many" => Self::ReadMany,
            "create-one" => Self::CreateOne,
            "create-many" => Self::CreateMany,
            "edit" => Self::Edit,
            "list-directory" => Self::ListDirectory,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOne => "read-one",
            Self::ReadMany => "read-many",
            Self::CreateOne => "create-one",
            Self::CreateMany => "create-many",
            Self::Edit => "edit",
            Self::ListDirectory => "list-directory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadOneArgs {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReadManyArgs {
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateOneArgs {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileToCreate {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateManyArgs {
    pub files: Vec<FileToCreate>,
}

/// Argument shape of the edit operation: replace one exact snippet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingEditDirective {
    pub path: String,
    pub original_snippet: String,
    pub replacement_snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListDirectoryArgs {
    #[serde(default)]
    pub path: Option<String>,
}

/// Builds the JSON schema envelopes sent with every channel request.
#[must_use]
pub fn operation_schemas() -> Vec<OperationSchema> {
    vec![
        OperationSchema {
            name: Operation::ReadOne.as_str().to_string(),
            description: "Read the content of a single file. Always read a file before \
                          attempting to edit it, so the original snippet is exact."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the file, relative to the workspace root or absolute.",
                    }
                },
                "required": ["path"],
            }),
        },
        OperationSchema {
            name: Operation::ReadMany.as_str().to_string(),
            description: "Read the content of multiple files in one call.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "paths": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Paths to read, relative to the workspace root or absolute.",
                    }
                },
                "required": ["paths"],
            }),
        },
        OperationSchema {
            name: Operation::CreateOne.as_str().to_string(),
            description: "Create a new file or overwrite an existing one with the provided \
                          content."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string" },
                    "content": {
                        "type": "string",
                        "description": "The full content to write.",
                    }
                },
                "required": ["path", "content"],
            }),
        },
        OperationSchema {
            name: Operation::CreateMany.as_str().to_string(),
            description: "Create multiple files at once.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "files": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "path": { "type": "string" },
                                "content": { "type": "string" },
                            },
                            "required": ["path", "content"],
                        },
                    }
                },
                "required": ["files"],
            }),
        },
        OperationSchema {
            name: Operation::Edit.as_str().to_string(),
            description: "Edit an existing file by replacing one exact snippet of its current \
                          content. The original snippet must match verbatim; read the file \
                          first. Ambiguous snippets replace only the leftmost occurrence."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string" },
                    "original_snippet": {
                        "type": "string",
                        "description": "Exact, verbatim text to find in the current content.",
                    },
                    "replacement_snippet": {
                        "type": "string",
                        "description": "Text that replaces the original snippet.",
                    }
                },
                "required": ["path", "original_snippet", "replacement_snippet"],
            }),
        },
        OperationSchema {
            name: Operation::ListDirectory.as_str().to_string(),
            description: "List files and subdirectories of a directory. Defaults to the \
                          workspace root when no path is given."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string" }
                },
                "required": [],
            }),
        },
    ]
}
