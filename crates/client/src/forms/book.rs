//! Book-an-artist form.

use serde::{Deserialize, Serialize};

use super::{FormError, FormPayload, ValidationError, is_valid_email};

/// A booking enquiry as entered on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub genres: Vec<String>,
    pub languages: Vec<String>,
}

impl BookRequest {
    /// Check every field and build the payload.
    ///
    /// All failing fields are reported together, in form order.
    pub fn validate(&self) -> Result<FormPayload, FormError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();
        let location = self.location.trim();
        let genres = non_empty(&self.genres);
        let languages = non_empty(&self.languages);

        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push(ValidationError::new("name", "Name is required"));
        }
        if !is_valid_email(email) {
            errors.push(ValidationError::new("email", "Valid email is required"));
        }
        if phone.is_empty() {
            errors.push(ValidationError::new("phone", "Phone number is required"));
        }
        if location.is_empty() {
            errors.push(ValidationError::new("location", "Event location is required"));
        }
        if genres.is_empty() {
            errors.push(ValidationError::new("genres", "Please add at least one genre"));
        }
        if languages.is_empty() {
            errors.push(ValidationError::new("languages", "Please add at least one language"));
        }
        if !errors.is_empty() {
            return Err(FormError::Invalid(errors));
        }

        let mut payload = FormPayload::default();
        payload.push("name", name);
        payload.push("email", email);
        payload.push("phone", phone);
        payload.push("location", location);
        payload.push("genres", genres.join(", "));
        payload.push("languages", languages.join(", "));
        Ok(payload)
    }
}

fn non_empty(values: &[String]) -> Vec<&str> {
    values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()).collect()
}
