//! Agentic tool-orchestration core.
//!
//! One user message drives a bounded request/dispatch cycle: the model
//! channel streams text and tool-call fragments, the assembler rebuilds
//! complete invocations, the confirmation gate puts a human between
//! proposal and execution, the dispatcher runs each operation against the
//! filesystem collaborator, and results fold back into the transcript,
//! which trims itself after every user append and result batch.
//!
//! Contract notes:
//! - The dispatcher never raises past its boundary; every failure becomes
//!   a `ToolResult` diagnostic the model can react to next cycle.
//! - Only a channel failure or the iteration cap ends a turn early, and
//!   both leave the transcript on its last fully-applied state.
//! - Execution is single-threaded and cooperative; invocations within a
//!   batch dispatch strictly in slot order.
//!
//! Transport, console rendering, flag parsing, and configuration files are
//! external collaborators reached only through the `model_channel`,
//! `ConfirmationPrompt`, and `Filesystem` seams.

pub mod assembler;
pub mod dispatch;
pub mod fs;
pub mod gate;
pub mod ops;
pub mod paths;
pub mod session;
pub mod transcript;
pub mod turn;
