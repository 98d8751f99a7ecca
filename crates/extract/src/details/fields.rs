use super::MalformedField;
use serde_json::{Map, Value};

/// Typed, forgiving accessors over the `data` object of a store payload.
///
/// Missing keys and explicit `null`s are absent values. A key that is present
/// with the wrong shape is also returned as absent, but is recorded so the
/// caller can report it.
#[derive(Debug)]
pub(crate) struct Fields<'a> {
    object: Option<&'a Map<String, Value>>,
    malformed: Vec<MalformedField>,
}

/// Fields Internals
impl<'a> Fields<'a> {
    pub(crate) fn new(details: &'a Value) -> Self {
        let mut fields = Self {
            object: details.as_object(),
            malformed: Vec::new(),
        };
        if fields.object.is_none() && !details.is_null() {
            fields.reject("data", details);
        }
        fields
    }

    pub(crate) fn into_malformed(self) -> Vec<MalformedField> {
        self.malformed
    }

    fn value(&self, key: &str) -> Option<&'a Value> {
        self.object.and_then(|object| object.get(key)).filter(|value| !value.is_null())
    }

    fn reject(&mut self, field: &'static str, value: &Value) {
        tracing::warn!(field, %value, "dropping malformed store field");
        self.malformed.push(MalformedField {
            field,
            value: value.to_string(),
        });
    }

    fn trimmed(value: &str) -> Option<String> {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Fields Public
impl<'a> Fields<'a> {
    pub(crate) fn text(&mut self, key: &'static str) -> Option<String> {
        let value = self.value(key)?;
        match value.as_str() {
            Some(s) => Self::trimmed(s),
            None => {
                self.reject(key, value);
                None
            },
        }
    }

    pub(crate) fn flag(&mut self, key: &'static str) -> Option<bool> {
        let value = self.value(key)?;
        match value {
            Value::Bool(b) => Some(*b),
            // Older payloads encode some flags as 0/1.
            Value::Number(n) if n.as_u64() == Some(0) => Some(false),
            Value::Number(n) if n.as_u64() == Some(1) => Some(true),
            _ => {
                self.reject(key, value);
                None
            },
        }
    }

    /// Non-negative integer, also accepted as a numeric string (`"18"`).
    pub(crate) fn count(&mut self, key: &'static str) -> Option<u32> {
        let value = self.value(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.reject(key, value);
        }
        parsed
    }

    /// A list of strings; non-string entries are dropped individually.
    pub(crate) fn strings(&mut self, key: &'static str) -> Vec<String> {
        let Some(value) = self.value(key) else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.reject(key, value);
            return Vec::new();
        };
        let mut strings = Vec::with_capacity(items.len());
        for item in items {
            match item.as_str() {
                Some(s) => strings.extend(Self::trimmed(s)),
                None => self.reject(key, item),
            }
        }
        strings
    }

    /// A list of `{"id": .., "description": ".."}` objects, reduced to their
    /// descriptions.
    pub(crate) fn descriptions(&mut self, key: &'static str) -> Vec<String> {
        let Some(value) = self.value(key) else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.reject(key, value);
            return Vec::new();
        };
        let mut descriptions = Vec::with_capacity(items.len());
        for item in items {
            match item.get("description").and_then(Value::as_str) {
                Some(s) => descriptions.extend(Self::trimmed(s)),
                None => self.reject(key, item),
            }
        }
        descriptions
    }

    /// A nested object, handed back as its own accessor.
    pub(crate) fn nested(&mut self, key: &'static str) -> Option<Fields<'a>> {
        let value = self.value(key)?;
        if value.is_object() {
            Some(Fields::new(value))
        } else {
            self.reject(key, value);
            None
        }
    }

    /// Fold a nested accessor's problems into this one.
    pub(crate) fn absorb(&mut self, nested: Fields<'a>) {
        self.malformed.extend(nested.malformed);
    }
}
