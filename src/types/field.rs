use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::ids::{EntityId, IdKind};

/// A nullable column as it appears in an update payload.
///
/// `Absent` leaves the stored value alone, `Clear` writes NULL and `Set`
/// writes the carried value. Deserializing a present key yields `Clear` for
/// `null`, `""` and `"null"`, and `Set` for anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Absent,
    Clear,
    Set(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Absent
    }
}

impl<T> FieldUpdate<T> {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldUpdate::Absent)
    }

    #[must_use]
    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldUpdate::Set(value) => Some(value),
            _ => None,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<FieldUpdate<U>, E> {
        Ok(match self {
            FieldUpdate::Absent => FieldUpdate::Absent,
            FieldUpdate::Clear => FieldUpdate::Clear,
            FieldUpdate::Set(value) => FieldUpdate::Set(f(value)?),
        })
    }

    /// Resolves the update against the value currently stored.
    #[must_use]
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            FieldUpdate::Absent => current,
            FieldUpdate::Clear => None,
            FieldUpdate::Set(value) => Some(value),
        }
    }

    /// The value to write on insert, where absent and cleared both mean NULL.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        self.apply(None)
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}

impl FieldUpdate<Value> {
    /// Classifies a present payload value.
    #[must_use]
    pub fn from_raw(raw: Value) -> Self {
        match &raw {
            Value::Null => FieldUpdate::Clear,
            Value::String(s) if s.is_empty() || s == "null" => FieldUpdate::Clear,
            _ => FieldUpdate::Set(raw),
        }
    }

    /// Coerces a `Set` value to an id of the given kind, returning the
    /// offending value on failure.
    pub fn coerce_id(self, kind: IdKind) -> Result<FieldUpdate<EntityId>, Value> {
        self.try_map(|raw| kind.coerce(&raw).ok_or(raw))
    }
}

impl<'de> Deserialize<'de> for FieldUpdate<Value> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(FieldUpdate::from_raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Payload {
        #[serde(default)]
        department_id: FieldUpdate<Value>,
    }

    fn parse(body: Value) -> FieldUpdate<Value> {
        serde_json::from_value::<Payload>(body).unwrap().department_id
    }

    #[test]
    fn test_missing_key_is_absent() {
        assert_eq!(parse(json!({})), FieldUpdate::Absent);
    }

    #[test]
    fn test_null_and_empty_values_clear() {
        assert_eq!(parse(json!({"department_id": null})), FieldUpdate::Clear);
        assert_eq!(parse(json!({"department_id": ""})), FieldUpdate::Clear);
        assert_eq!(parse(json!({"department_id": "null"})), FieldUpdate::Clear);
    }

    #[test]
    fn test_value_sets() {
        assert_eq!(
            parse(json!({"department_id": 4})),
            FieldUpdate::Set(json!(4))
        );
    }

    #[test]
    fn test_coerce_reports_bad_value() {
        let bad = FieldUpdate::Set(json!("four")).coerce_id(IdKind::Integer);
        assert_eq!(bad, Err(json!("four")));

        let good = FieldUpdate::Set(json!("4")).coerce_id(IdKind::Integer);
        assert_eq!(good, Ok(FieldUpdate::Set(EntityId::Int(4))));
    }

    #[test]
    fn test_apply_against_current() {
        assert_eq!(FieldUpdate::<i64>::Absent.apply(Some(1)), Some(1));
        assert_eq!(FieldUpdate::<i64>::Clear.apply(Some(1)), None);
        assert_eq!(FieldUpdate::Set(2).apply(Some(1)), Some(2));
    }
}
