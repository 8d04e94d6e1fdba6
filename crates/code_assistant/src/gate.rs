//! Interactive accept/reject/edit checkpoint between proposal and dispatch.

use std::path::Path;

use serde_json::{Map, Value};

use crate::assembler::ToolInvocation;

/// Replacement value for one argument field, as typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub name: String,
    pub value: String,
}

/// Operator selection of one invocation to amend before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSelection {
    /// Zero-based position of the invocation within the proposed batch.
    pub index: usize,
    pub fields: Vec<FieldEdit>,
}

/// Operator verdict on one proposed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Accepted,
    Rejected,
    Edited(EditSelection),
}

/// Human collaborator behind the gate. Console rendering and input live on
/// the other side of this seam; scripted implementations drive tests.
pub trait ConfirmationPrompt {
    /// Reviews one proposed batch before any dispatch.
    fn review_batch(&mut self, batch: &[ToolInvocation]) -> GateDecision;

    /// Confirms a write to a sensitive top-level system location.
    /// Returning false aborts only that write.
    fn confirm_sensitive_write(&mut self, path: &Path) -> bool;
}

/// Result of gating one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Dispatch the (possibly amended) batch; no second confirmation pass.
    Proceed(Vec<ToolInvocation>),
    /// Discard the batch without dispatching anything.
    Rejected,
}

pub struct ConfirmationGate;

impl ConfirmationGate {
    /// Runs one PROPOSED batch through the operator's decision.
    pub fn review(
        prompt: &mut dyn ConfirmationPrompt,
        batch: Vec<ToolInvocation>,
    ) -> GateOutcome {
        match prompt.review_batch(&batch) {
            GateDecision::Accepted => GateOutcome::Proceed(batch),
            GateDecision::Rejected => GateOutcome::Rejected,
            GateDecision::Edited(selection) => {
                GateOutcome::Proceed(apply_selection(batch, selection))
            }
        }
    }
}

fn apply_selection(mut batch: Vec<ToolInvocation>, selection: EditSelection) -> Vec<ToolInvocation> {
    let Some(invocation) = batch.get_mut(selection.index) else {
        tracing::warn!(
            index = selection.index,
            batch_len = batch.len(),
            "edit selection out of range; dispatching batch unchanged"
        );
        return batch;
    };

    let mut arguments = parse_argument_object(&invocation.arguments);
    for field in selection.fields {
        arguments.insert(field.name, coerce_argument(&field.value));
    }

    match serde_json::to_string(&Value::Object(arguments)) {
        Ok(serialized) => invocation.arguments = serialized,
        Err(error) => {
            tracing::warn!(%error, "failed to serialize amended arguments; keeping originals");
        }
    }

    batch
}

fn parse_argument_object(raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Best-effort coercion of an operator-typed replacement value.
///
/// Attempt order is fixed and documented: boolean, integer, float, then
/// string as the fallback. `"true"`/`"false"` must match exactly; numeric
/// parses use the trimmed input.
#[must_use]
pub fn coerce_argument(raw: &str) -> Value {
    let trimmed = raw.trim();

    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(integer) = trimmed.parse::<i64>() {
        return Value::from(integer);
    }

    if let Ok(float) = trimmed.parse::<f64>() {
        if float.is_finite() {
            return Value::from(float);
        }
    }

    Value::String(raw.to_string())
}
