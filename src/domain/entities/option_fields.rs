use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Represents optional field semantics in PATCH/UPDATE requests.
///
/// - `Unchanged` → key absent from the payload, column untouched
/// - `SetToNull` → explicit `null`, column cleared
/// - `SetToValue` → set to provided value
///
/// Fields of this type must carry `#[serde(default)]` so that a missing key
/// lands on `Unchanged`.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionField<T> {
    Unchanged,
    SetToNull,
    SetToValue(T),
}

impl<T> Default for OptionField<T> {
    fn default() -> Self {
        OptionField::Unchanged
    }
}

impl<'de, T> Deserialize<'de> for OptionField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => OptionField::SetToValue(value),
            None => OptionField::SetToNull,
        })
    }
}

/// Serializes as the JSON the caller would have sent: `Unchanged` and
/// `SetToNull` both render as `null`.
impl<T> Serialize for OptionField<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value_ref().serialize(serializer)
    }
}

impl<T> OptionField<T> {
    /// True when `Unchanged`.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// If `SetToValue`, returns a reference to inner value.
    pub fn value_ref(&self) -> Option<&T> {
        if let Self::SetToValue(v) = self {
            Some(v)
        } else {
            None
        }
    }

    /// Transforms the inner value if `SetToValue`, short-circuiting on error.
    pub fn try_map_value<U, E, F>(self, f: F) -> Result<OptionField<U>, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        Ok(match self {
            Self::Unchanged => OptionField::Unchanged,
            Self::SetToNull => OptionField::SetToNull,
            Self::SetToValue(v) => OptionField::SetToValue(f(v)?),
        })
    }

    /// Writes the change into a nullable slot; `Unchanged` leaves it as is.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Self::Unchanged => {}
            Self::SetToNull => *target = None,
            Self::SetToValue(v) => *target = Some(v),
        }
    }
}
