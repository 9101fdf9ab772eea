use super::{Mapping, Value};

/// JSON objects become `object` mappings in document order, arrays become lists.
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::list(items.into_iter().map(Value::from)),
            serde_json::Value::Object(fields) => {
                let mut map = Mapping::with_type_name("object");
                for (key, item) in fields {
                    map.insert(key, Value::from(item));
                }
                Value::map(map)
            }
        }
    }
}
