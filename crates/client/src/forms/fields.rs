//! Repeatable form fields with per-kind caps.
//!
//! A list always holds at least one field; the first one can be cleared
//! but not removed.

use serde::{Deserialize, Serialize};

/// Neighbourhoods offered in the location picker.
pub const BANGALORE_LOCATIONS: [&str; 7] = [
    "Indiranagar",
    "Whitefield",
    "Koramangala",
    "HSR Layout",
    "Electronic City",
    "Yelahanka",
    "Malleshwaram",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Genre,
    Language,
    Location,
}

impl FieldKind {
    /// Most fields a list of this kind may hold.
    pub fn max(self) -> usize {
        match self {
            FieldKind::Genre | FieldKind::Language => 10,
            FieldKind::Location => BANGALORE_LOCATIONS.len(),
        }
    }

    /// Form field name each value is submitted under.
    pub fn form_name(self) -> &'static str {
        match self {
            FieldKind::Genre => "genre",
            FieldKind::Language => "language",
            FieldKind::Location => "location",
        }
    }

    fn limit_message(self) -> &'static str {
        match self {
            FieldKind::Genre => "Maximum 10 genres allowed",
            FieldKind::Language => "Maximum 10 languages allowed",
            FieldKind::Location => "You can select all Bangalore locations",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldListError {
    #[error("{}", .0.limit_message())]
    LimitReached(FieldKind),

    #[error("the first {} field cannot be removed", .0.form_name())]
    FirstField(FieldKind),

    #[error("no {} field at position {index}", .kind.form_name())]
    OutOfRange { kind: FieldKind, index: usize },

    #[error("unknown location: {0}")]
    UnknownLocation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList {
    kind: FieldKind,
    values: Vec<String>,
}

impl FieldList {
    /// A list with one empty field.
    pub fn new(kind: FieldKind) -> Self {
        Self { kind, values: vec![String::new()] }
    }

    /// Fill the first field and append the rest, enforcing the cap.
    pub fn from_values<I, V>(kind: FieldKind, values: I) -> Result<Self, FieldListError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let mut list = Self::new(kind);
        for (i, value) in values.into_iter().enumerate() {
            if i == 0 {
                list.set(0, value)?;
            } else {
                list.add(value)?;
            }
        }
        Ok(list)
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Append a field. Returns its position.
    pub fn add(&mut self, value: impl Into<String>) -> Result<usize, FieldListError> {
        if self.values.len() >= self.kind.max() {
            return Err(FieldListError::LimitReached(self.kind));
        }
        let value = self.check(value.into())?;
        self.values.push(value);
        Ok(self.values.len() - 1)
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) -> Result<(), FieldListError> {
        let value = self.check(value.into())?;
        let slot = self
            .values
            .get_mut(index)
            .ok_or(FieldListError::OutOfRange { kind: self.kind, index })?;
        *slot = value;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<String, FieldListError> {
        if index == 0 {
            return Err(FieldListError::FirstField(self.kind));
        }
        if index >= self.values.len() {
            return Err(FieldListError::OutOfRange { kind: self.kind, index });
        }
        Ok(self.values.remove(index))
    }

    /// Back to a single empty field.
    pub fn reset(&mut self) {
        self.values.truncate(1);
        self.values[0].clear();
    }

    /// Trimmed, non-empty values in order.
    pub fn filled(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn check(&self, value: String) -> Result<String, FieldListError> {
        if self.kind == FieldKind::Location && !value.is_empty() && !BANGALORE_LOCATIONS.contains(&value.as_str()) {
            return Err(FieldListError::UnknownLocation(value));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_list_has_one_empty_field() {
        let list = FieldList::new(FieldKind::Genre);
        assert_eq!(list.len(), 1);
        assert!(list.filled().is_empty());
    }

    #[test]
    fn test_genre_cap() {
        let mut list = FieldList::new(FieldKind::Genre);
        for i in 1..10 {
            list.add(format!("genre {i}")).unwrap();
        }
        assert_eq!(list.len(), 10);

        let err = list.add("one too many").unwrap_err();
        assert_eq!(err, FieldListError::LimitReached(FieldKind::Genre));
        assert_eq!(err.to_string(), "Maximum 10 genres allowed");
    }

    #[test]
    fn test_location_cap_and_values() {
        let mut list = FieldList::from_values(FieldKind::Location, BANGALORE_LOCATIONS).unwrap();
        assert_eq!(list.len(), 7);
        assert_eq!(
            list.add("Indiranagar").unwrap_err().to_string(),
            "You can select all Bangalore locations"
        );

        let mut fresh = FieldList::new(FieldKind::Location);
        assert!(matches!(fresh.set(0, "Mysore"), Err(FieldListError::UnknownLocation(_))));
    }

    #[test]
    fn test_remove_rules() {
        let mut list = FieldList::from_values(FieldKind::Language, ["English", "Kannada", "Hindi"]).unwrap();

        assert_eq!(list.remove(1).unwrap(), "Kannada");
        assert_eq!(list.remove(0), Err(FieldListError::FirstField(FieldKind::Language)));
        assert!(matches!(list.remove(5), Err(FieldListError::OutOfRange { index: 5, .. })));
        assert_eq!(list.values(), ["English", "Hindi"]);
    }

    #[test]
    fn test_reset_keeps_one_cleared_field() {
        let mut list = FieldList::from_values(FieldKind::Genre, ["Live Music", "DJ"]).unwrap();
        list.reset();
        assert_eq!(list.values(), [""]);
    }

    #[test]
    fn test_filled_trims_and_skips_blank() {
        let list = FieldList::from_values(FieldKind::Genre, ["  Jazz ", "", "   ", "Carnatic"]).unwrap();
        assert_eq!(list.filled(), vec!["Jazz", "Carnatic"]);
    }
}
