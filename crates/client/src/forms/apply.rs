//! Apply-as-artist form.
//!
//! The page posts its form verbatim, so the request is kept as an ordered
//! list of named fields rather than a fixed struct.

use serde::{Deserialize, Serialize};

use super::{FieldList, FormError, FormPayload, ValidationError, is_valid_email, is_valid_video_url};

const REQUIRED: [(&str, &str); 3] = [
    ("name", "Name is required"),
    ("email", "Valid email is required"),
    ("artistType", "Artist type is required"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRequest {
    fields: Vec<(String, String)>,
}

impl ApplyRequest {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Append every filled location as a `location` field.
    pub fn with_locations(mut self, locations: &FieldList) -> Self {
        for value in locations.filled() {
            self.push(locations.kind().form_name(), value);
        }
        self
    }

    fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.trim())
    }

    /// Check required fields and video links, then build the payload.
    pub fn validate(&self) -> Result<FormPayload, FormError> {
        let mut errors = Vec::new();

        for (field, message) in REQUIRED {
            let missing = self.value(field).is_none_or(str::is_empty);
            if missing || (field == "email" && !self.value(field).is_some_and(is_valid_email)) {
                errors.push(ValidationError::new(field, message));
            }
        }

        let other_checked = self.value("otherInstrumentCheck").is_some();
        let mut payload = FormPayload::default();

        for (name, value) in &self.fields {
            let value = value.trim();
            if name.starts_with("videoLink") && !value.is_empty() && !is_valid_video_url(value) {
                errors.push(ValidationError::new("videoLink", "Please enter a valid YouTube or Vimeo link"));
            }
            if name == "otherInstrument" && !other_checked {
                payload.push(name.as_str(), "");
            } else {
                payload.push(name.as_str(), value);
            }
        }

        if errors.is_empty() { Ok(payload) } else { Err(FormError::Invalid(errors)) }
    }
}
