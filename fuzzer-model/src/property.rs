use serde_json::Value;

/// Semantic JSON-schema type used by the value/mutate strategies and by the
/// resource pool's type index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimpleProperty {
    String,
    Integer,
    Float,
    Boolean,
    Object,
    Array,
    Empty,
    Unknown,
}

impl SimpleProperty {
    /// Classify a JSON-Schema fragment (`openapiv3`-shaped, represented as
    /// raw `serde_json::Value` here since the core never needs the full
    /// typed schema, only its `type`/`properties`/`items`).
    ///
    /// Tie-break per spec §4.2: object/array take precedence over
    /// primitives; within primitives the first of
    /// `{string, integer, number, boolean}` applies.
    pub fn of_schema(schema: &Value) -> SimpleProperty {
        let Some(obj) = schema.as_object() else {
            return SimpleProperty::Unknown;
        };

        if obj.contains_key("properties") || type_is(obj, "object") {
            return SimpleProperty::Object;
        }
        if obj.contains_key("items") || type_is(obj, "array") {
            return SimpleProperty::Array;
        }
        if type_is(obj, "string") {
            return SimpleProperty::String;
        }
        if type_is(obj, "integer") {
            return SimpleProperty::Integer;
        }
        if type_is(obj, "number") {
            return SimpleProperty::Float;
        }
        if type_is(obj, "boolean") {
            return SimpleProperty::Boolean;
        }
        SimpleProperty::Unknown
    }

    /// Classify an already-materialized JSON value (used when extracting
    /// resources from a response body, §4.4).
    pub fn of_value(value: &Value) -> SimpleProperty {
        match value {
            Value::Null => SimpleProperty::Empty,
            Value::Bool(_) => SimpleProperty::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => SimpleProperty::Integer,
            Value::Number(_) => SimpleProperty::Float,
            Value::String(_) => SimpleProperty::String,
            Value::Array(_) => SimpleProperty::Array,
            Value::Object(_) => SimpleProperty::Object,
        }
    }
}

fn type_is(obj: &serde_json::Map<String, Value>, want: &str) -> bool {
    match obj.get("type") {
        Some(Value::String(s)) => s == want,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(want)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_and_array_precede_primitives() {
        let schema = json!({"type": ["object", "string"], "properties": {}});
        assert_eq!(SimpleProperty::of_schema(&schema), SimpleProperty::Object);

        let schema = json!({"type": "array", "items": {"type": "string"}});
        assert_eq!(SimpleProperty::of_schema(&schema), SimpleProperty::Array);
    }

    #[test]
    fn primitive_tie_break_order() {
        assert_eq!(
            SimpleProperty::of_schema(&json!({"type": "string"})),
            SimpleProperty::String
        );
        assert_eq!(
            SimpleProperty::of_schema(&json!({"type": "integer"})),
            SimpleProperty::Integer
        );
        assert_eq!(
            SimpleProperty::of_schema(&json!({"type": "number"})),
            SimpleProperty::Float
        );
        assert_eq!(
            SimpleProperty::of_schema(&json!({"type": "boolean"})),
            SimpleProperty::Boolean
        );
    }

    #[test]
    fn of_value_distinguishes_integer_and_float() {
        assert_eq!(SimpleProperty::of_value(&json!(3)), SimpleProperty::Integer);
        assert_eq!(SimpleProperty::of_value(&json!(3.5)), SimpleProperty::Float);
        assert_eq!(SimpleProperty::of_value(&json!(null)), SimpleProperty::Empty);
    }
}
