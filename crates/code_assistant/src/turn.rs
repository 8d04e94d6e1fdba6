//! Per-turn state machine: request model output, assemble invocations,
//! gate, dispatch, fold results back, repeat, bounded by an iteration cap.

use model_channel::{ChannelError, ChannelEvent, ModelChannel};

use crate::assembler::StreamingCallAssembler;
use crate::dispatch::ToolDispatcher;
use crate::gate::{ConfirmationGate, ConfirmationPrompt, GateOutcome};
use crate::session::Session;
use crate::transcript::{ConversationEntry, RecordedCall};

/// Upper bound on request/dispatch cycles within one user turn.
pub const MAX_TOOL_ITERATIONS: usize = 5;

/// Synthetic entry appended when the operator rejects a proposed batch, so
/// the model learns the batch never ran.
pub const REJECTION_NOTICE: &str =
    "User rejected the proposed tool calls. Proceed without them or suggest an alternative.";

/// How one turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model produced a response without further tool proposals.
    Completed,
    /// The iteration cap was exhausted while the model kept proposing
    /// tools; the transcript ends on the last fully-completed cycle.
    IterationCapReached,
    /// The channel failed; nothing from the failed attempt was recorded.
    ChannelFailed(ChannelError),
}

/// Drives one turn at a time against a session.
pub struct TurnController<'a> {
    channel: &'a dyn ModelChannel,
    dispatcher: &'a mut ToolDispatcher,
    prompt: &'a mut dyn ConfirmationPrompt,
    iteration_cap: usize,
}

impl<'a> TurnController<'a> {
    #[must_use]
    pub fn new(
        channel: &'a dyn ModelChannel,
        dispatcher: &'a mut ToolDispatcher,
        prompt: &'a mut dyn ConfirmationPrompt,
    ) -> Self {
        Self {
            channel,
            dispatcher,
            prompt,
            iteration_cap: MAX_TOOL_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_iteration_cap(mut self, iteration_cap: usize) -> Self {
        self.iteration_cap = iteration_cap;
        self
    }

    /// Processes one user message to completion, cap, or channel failure.
    pub fn process_user_message(&mut self, session: &mut Session, text: &str) -> TurnOutcome {
        session.transcript_mut().push_user(text);
        session.transcript_mut().trim();

        for iteration in 1..=self.iteration_cap {
            tracing::debug!(iteration, cap = self.iteration_cap, "requesting model turn");

            let request = session.turn_request();
            let mut streamed_text = String::new();
            let mut assembler = StreamingCallAssembler::new();

            let stream_result = self.channel.request_turn(&request, &mut |event| match event {
                ChannelEvent::TextDelta(delta) => streamed_text.push_str(&delta),
                ChannelEvent::CallFragment(fragment) => assembler.apply(&fragment),
            });

            if let Err(error) = stream_result {
                // The failed attempt leaves no partial assistant entry.
                tracing::error!(%error, iteration, "channel failure ended the turn");
                return TurnOutcome::ChannelFailed(error);
            }

            let invocations = assembler.finish();
            let content = if streamed_text.is_empty() {
                None
            } else {
                Some(streamed_text)
            };
            let calls: Vec<RecordedCall> = invocations
                .iter()
                .map(|invocation| RecordedCall {
                    call_id: invocation.call_id.clone(),
                    tool_name: invocation.tool_name.clone(),
                    arguments: invocation.arguments.clone(),
                })
                .collect();
            session
                .transcript_mut()
                .push(ConversationEntry::assistant(content, calls));

            if invocations.is_empty() {
                return TurnOutcome::Completed;
            }

            match ConfirmationGate::review(&mut *self.prompt, invocations) {
                GateOutcome::Rejected => {
                    tracing::info!(iteration, "batch rejected at the confirmation gate");
                    session.transcript_mut().push_user(REJECTION_NOTICE);
                    session.transcript_mut().trim();
                    continue;
                }
                GateOutcome::Proceed(batch) => {
                    let mut results = Vec::with_capacity(batch.len());
                    for invocation in &batch {
                        results.push(self.dispatcher.dispatch(
                            invocation,
                            session.transcript_mut(),
                            &mut *self.prompt,
                        ));
                    }

                    for result in results {
                        session.transcript_mut().push(ConversationEntry::tool_result(
                            result.call_id,
                            result.tool_name,
                            result.content,
                        ));
                    }
                    session.transcript_mut().trim();
                }
            }
        }

        tracing::warn!(
            cap = self.iteration_cap,
            "iteration cap reached; aborting the turn"
        );
        TurnOutcome::IterationCapReached
    }
}
