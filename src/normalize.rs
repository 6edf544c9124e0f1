use serde_json::Value;

/// Rewrite a camelCase identifier to snake_case. An underscore is inserted
/// before every uppercase letter except at position 0, then the whole key
/// is lowercased. Keys that are already snake_case pass through unchanged.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i != 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Normalize every mapping key in a JSON document to snake_case,
/// recursing through nested objects and arrays. Scalars pass through.
/// Idempotent: normalizing twice yields the same document.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (camel_to_snake(&k), normalize_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}
