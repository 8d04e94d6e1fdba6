//! Deterministic scripted implementation of the shared `model_channel`
//! contract.
//!
//! This crate contains no transport or protocol logic and is intended for
//! local development and contract-level integration testing. The core
//! consumes the stream synchronously, so scripted turns replay without
//! timing delays.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use model_channel::{
    CallFragment, ChannelError, ChannelEvent, ModelChannel, TurnRequest,
};

/// One scripted channel turn: the events to emit, then the final result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedTurn {
    events: Vec<ChannelEvent>,
    failure: Option<ChannelError>,
}

impl ScriptedTurn {
    /// A turn that streams the given events and completes normally.
    #[must_use]
    pub fn events(events: Vec<ChannelEvent>) -> Self {
        Self {
            events,
            failure: None,
        }
    }

    /// A turn that streams only assistant text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::events(vec![ChannelEvent::TextDelta(text.into())])
    }

    /// A turn that emits nothing and completes normally.
    #[must_use]
    pub fn silent() -> Self {
        Self::events(Vec::new())
    }

    /// A turn proposing one complete tool call delivered as fragments.
    #[must_use]
    pub fn single_call(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self::events(vec![ChannelEvent::CallFragment(
            CallFragment::new(0)
                .with_call_id(call_id)
                .with_name_delta(tool_name)
                .with_arguments_delta(arguments),
        )])
    }

    /// A turn that fails after emitting the given events.
    #[must_use]
    pub fn failure(events: Vec<ChannelEvent>, error: ChannelError) -> Self {
        Self {
            events,
            failure: Some(error),
        }
    }
}

/// Scripted channel that replays queued turns in order.
///
/// When the queue drains, the channel either repeats its final turn
/// (`repeating`) or emits silent completions, so callers never observe a
/// spurious failure from script exhaustion.
#[derive(Debug)]
pub struct ScriptedChannel {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    repeat_last: bool,
    observed: Mutex<Vec<TurnRequest>>,
}

impl ScriptedChannel {
    #[must_use]
    pub fn new(turns: Vec<ScriptedTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            repeat_last: false,
            observed: Mutex::new(Vec::new()),
        }
    }

    /// A channel that replays `turn` for every request, without draining.
    #[must_use]
    pub fn repeating(turn: ScriptedTurn) -> Self {
        Self {
            turns: Mutex::new(VecDeque::from([turn])),
            repeat_last: true,
            observed: Mutex::new(Vec::new()),
        }
    }

    /// Number of turn requests this channel has served.
    #[must_use]
    pub fn request_count(&self) -> usize {
        lock_unpoisoned(&self.observed).len()
    }

    /// Snapshot of every request observed so far, in arrival order.
    #[must_use]
    pub fn observed_requests(&self) -> Vec<TurnRequest> {
        lock_unpoisoned(&self.observed).clone()
    }

    fn next_turn(&self) -> ScriptedTurn {
        let mut turns = lock_unpoisoned(&self.turns);
        if self.repeat_last {
            return turns
                .front()
                .cloned()
                .unwrap_or_else(ScriptedTurn::silent);
        }

        turns.pop_front().unwrap_or_else(ScriptedTurn::silent)
    }
}

impl ModelChannel for ScriptedChannel {
    fn request_turn(
        &self,
        request: &TurnRequest,
        emit: &mut dyn FnMut(ChannelEvent),
    ) -> Result<(), ChannelError> {
        lock_unpoisoned(&self.observed).push(request.clone());

        let turn = self.next_turn();
        for event in turn.events {
            emit(event);
        }

        match turn.failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
