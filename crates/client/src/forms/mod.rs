//! Form flows posted to the third-party form backend.
//!
//! ### Submission
//! - Endpoint: a Formspree form URL (`https://formspree.io/f/<id>`)
//! - `POST` multipart form data with `Accept: application/json`
//! - 2xx is accepted; any other status or a transport error is a failure
//!   the page reports with a generic retry message.

pub mod apply;
pub mod book;
pub mod fields;
pub mod validation;

pub use apply::ApplyRequest;
pub use book::BookRequest;
pub use fields::{BANGALORE_LOCATIONS, FieldKind, FieldList, FieldListError};
pub use validation::{is_valid_email, is_valid_video_url};

use reqwest::header;
use reqwest::multipart::Form;
use serde::Serialize;

/// A field that failed validation, with the message shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Errors from form validation and submission.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("VALIDATION_FAILED: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),

    #[error("SUBMIT_FAILED: form backend responded with status {status}")]
    Rejected { status: u16 },

    #[error("SUBMIT_FAILED: network error: {0}")]
    Network(String),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| e.message).collect::<Vec<_>>().join("; ")
}

/// Which of the site's two forms a submission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Booking,
    Application,
}

impl FormKind {
    pub fn success_message(self) -> &'static str {
        match self {
            FormKind::Booking => "Thank you! Your booking request has been sent. We will contact you shortly.",
            FormKind::Application => "Thank you for applying! We will review your profile and get back to you soon.",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            FormKind::Booking => "There was an error submitting your request. Please try again.",
            FormKind::Application => "There was an error submitting your application. Please try again.",
        }
    }
}

/// Ordered form fields, as the backend receives them. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    fn to_multipart(&self) -> Form {
        self.fields
            .iter()
            .fold(Form::new(), |form, (name, value)| form.text(name.clone(), value.clone()))
    }
}

/// What the backend said about an accepted submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub kind: FormKind,
    pub status: u16,
    pub message: &'static str,
    /// Parsed JSON body, when the backend sent one.
    pub body: Option<serde_json::Value>,
}

/// HTTP client for the form backend.
#[derive(Debug, Clone)]
pub struct FormClient {
    http: reqwest::Client,
}

impl FormClient {
    pub fn new(user_agent: &str) -> Result<Self, FormError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .use_rustls_tls()
            .build()
            .map_err(|e| FormError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Post a validated payload.
    pub async fn submit(
        &self, kind: FormKind, endpoint: &str, payload: &FormPayload,
    ) -> Result<SubmitOutcome, FormError> {
        let response = self
            .http
            .post(endpoint)
            .header(header::ACCEPT, "application/json")
            .multipart(payload.to_multipart())
            .send()
            .await
            .map_err(|e| FormError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(?kind, status = status.as_u16(), "form submission rejected");
            return Err(FormError::Rejected { status: status.as_u16() });
        }

        let body = response.json::<serde_json::Value>().await.ok();
        tracing::info!(?kind, status = status.as_u16(), "form submitted");

        Ok(SubmitOutcome { kind, status: status.as_u16(), message: kind.success_message(), body })
    }

    /// Validate and post a booking request.
    pub async fn submit_booking(&self, endpoint: &str, request: &BookRequest) -> Result<SubmitOutcome, FormError> {
        let payload = request.validate()?;
        self.submit(FormKind::Booking, endpoint, &payload).await
    }

    /// Validate and post an artist application.
    pub async fn submit_application(
        &self, endpoint: &str, request: &ApplyRequest,
    ) -> Result<SubmitOutcome, FormError> {
        let payload = request.validate()?;
        self.submit(FormKind::Application, endpoint, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn booking() -> BookRequest {
        BookRequest {
            name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            phone: "+91 98450 00000".into(),
            location: "Koramangala".into(),
            genres: vec!["Live Music".into(), "DJ".into()],
            languages: vec!["Kannada".into()],
        }
    }

    #[tokio::test]
    async fn test_submit_booking_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/f/book"))
            .and(header_matcher("accept", "application/json"))
            .and(body_string_contains("Live Music, DJ"))
            .and(body_string_contains("name=\"languages\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = FormClient::new("stagecraft/0.1").unwrap();
        let outcome = client
            .submit_booking(&format!("{}/f/book", server.uri()), &booking())
            .await
            .unwrap();

        assert_eq!(outcome.kind, FormKind::Booking);
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.body, Some(serde_json::json!({"ok": true})));
    }

    #[tokio::test]
    async fn test_submit_rejected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let client = FormClient::new("stagecraft/0.1").unwrap();
        let result = client.submit_booking(&server.uri(), &booking()).await;
        assert!(matches!(result, Err(FormError::Rejected { status: 422 })));
    }

    #[tokio::test]
    async fn test_invalid_booking_never_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let request = BookRequest { email: "not-an-email".into(), ..booking() };
        let client = FormClient::new("stagecraft/0.1").unwrap();
        let result = client.submit_booking(&server.uri(), &request).await;

        match result {
            Err(FormError::Invalid(errors)) => {
                assert_eq!(errors, vec![ValidationError::new("email", "Valid email is required")]);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_application_network_error() {
        let server = MockServer::start().await;
        let endpoint = server.uri();
        drop(server);

        let mut request = ApplyRequest::default();
        request.push("name", "The Raga Collective");
        request.push("email", "band@example.com");
        request.push("artistType", "Band");

        let client = FormClient::new("stagecraft/0.1").unwrap();
        let result = client.submit_application(&endpoint, &request).await;
        assert!(matches!(result, Err(FormError::Network(_))));
    }

    #[test]
    fn test_invalid_display_joins_messages() {
        let err = FormError::Invalid(vec![
            ValidationError::new("name", "Name is required"),
            ValidationError::new("phone", "Phone number is required"),
        ]);
        assert_eq!(err.to_string(), "VALIDATION_FAILED: Name is required; Phone number is required");
    }

    #[test]
    fn test_payload_get_returns_first_value() {
        let mut payload = FormPayload::default();
        payload.push("location", "Whitefield");
        payload.push("location", "Yelahanka");
        assert_eq!(payload.get("location"), Some("Whitefield"));
        assert_eq!(payload.fields().len(), 2);
    }
}
