use serde_json::{Map, Value};

use crate::registry::{FieldKind, RecordSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// Required field absent, null, or empty string.
    Missing,
    /// Present but not coercible to the declared numeric kind.
    NotNumeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub kind: IssueKind,
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

fn coerces(value: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::Numeric => match value {
            Value::Number(_) => true,
            Value::String(s) => s.trim().parse::<f64>().is_ok(),
            _ => false,
        },
        FieldKind::Integer => match value {
            Value::Number(n) => n.is_i64() || n.is_u64(),
            Value::String(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        },
        _ => true,
    }
}

/// Check a normalized payload against a schema entry. Collects every
/// problem in one pass rather than failing on the first, so the caller
/// can report all offending fields at once. Never errors itself; an
/// empty vector means the payload is acceptable.
pub fn validate(payload: &Map<String, Value>, schema: &RecordSchema) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    for field in schema.fields {
        let value = payload.get(field.field);
        if is_empty(value) {
            if field.required {
                issues.push(FieldIssue { field: field.field, kind: IssueKind::Missing });
            }
            continue;
        }
        if let Some(value) = value {
            if !coerces(value, field.kind) {
                issues.push(FieldIssue { field: field.field, kind: IssueKind::NotNumeric });
            }
        }
    }
    issues
}

/// Render the issue list into the client-facing message, keeping missing
/// and non-numeric fields in distinct clauses.
pub fn to_message(issues: &[FieldIssue]) -> String {
    let missing: Vec<&str> = issues
        .iter()
        .filter(|i| i.kind == IssueKind::Missing)
        .map(|i| i.field)
        .collect();
    let invalid: Vec<&str> = issues
        .iter()
        .filter(|i| i.kind == IssueKind::NotNumeric)
        .map(|i| i.field)
        .collect();

    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("Missing required fields: {}", missing.join(", ")));
    }
    if !invalid.is_empty() {
        parts.push(format!("Invalid numeric values for: {}", invalid.join(", ")));
    }
    parts.join("; ")
}
