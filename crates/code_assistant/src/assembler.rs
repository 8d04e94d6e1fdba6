//! Reconstruction of complete tool invocations from streamed fragments.

use std::collections::BTreeMap;

use model_channel::CallFragment;

/// One model-requested operation with raw, still-unparsed argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: String,
}

#[derive(Debug, Default)]
struct SlotAccumulator {
    call_id: Option<String>,
    tool_name: String,
    arguments: String,
}

/// Accumulates call fragments per slot and finalizes them after the stream
/// ends.
///
/// Name and argument text concatenate monotonically per slot; an
/// identifier, once set, is never overwritten. Argument text is never
/// inspected before finalization; intermediate concatenations may be
/// syntactically invalid JSON and that is expected.
#[derive(Debug, Default)]
pub struct StreamingCallAssembler {
    slots: BTreeMap<usize, SlotAccumulator>,
}

impl StreamingCallAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, fragment: &CallFragment) {
        let slot = self.slots.entry(fragment.slot).or_default();

        if let Some(call_id) = &fragment.call_id {
            if slot.call_id.is_none() {
                slot.call_id = Some(call_id.clone());
            }
        }

        if let Some(delta) = &fragment.name_delta {
            slot.tool_name.push_str(delta);
        }

        if let Some(delta) = &fragment.arguments_delta {
            slot.arguments.push_str(delta);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Emits completed invocations in slot order.
    ///
    /// A slot yields an invocation only when both an identifier and a
    /// non-empty name were observed; incomplete slots guard against
    /// partial or corrupt proposals and are dropped silently.
    #[must_use]
    pub fn finish(self) -> Vec<ToolInvocation> {
        self.slots
            .into_values()
            .filter_map(|slot| {
                let call_id = slot.call_id?;
                if slot.tool_name.is_empty() {
                    return None;
                }

                Some(ToolInvocation {
                    call_id,
                    tool_name: slot.tool_name,
                    arguments: slot.arguments,
                })
            })
            .collect()
    }
}
