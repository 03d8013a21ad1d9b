use serde_json::Value;

/// A per-language string table: nested JSON objects addressed by dotted keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    root: Value,
}

impl Dictionary {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn parse(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json).map(Self::from_value)
    }

    pub fn is_empty(&self) -> bool {
        match &self.root {
            Value::Object(map) => map.is_empty(),
            _ => true,
        }
    }

    /// Look up `"booking.select"` style keys. Only non-empty strings count as
    /// a hit; anything else (objects, numbers, `""`) is treated as missing.
    pub fn get(&self, key: &str) -> Option<&str> {
        let mut current = &self.root;
        for part in key.split('.') {
            current = current.as_object()?.get(part)?;
        }
        current.as_str().filter(|s| !s.is_empty())
    }

    /// Every dotted key that resolves to a string, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(&self.root, String::new(), &mut keys);
        keys
    }
}

fn collect_keys(value: &Value, prefix: String, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                let key = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", prefix, name)
                };
                collect_keys(child, key, out);
            }
        }
        Value::String(_) => out.push(prefix),
        _ => {}
    }
}

/// Replace every `{name}` with its value. Placeholders without a matching
/// substitution are left as they are.
pub fn substitute(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (name, value) in substitutions {
        result = result.replace(&format!("{{{}}}", name), value);
    }
    result
}
