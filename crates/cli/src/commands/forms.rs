//! Book and apply form submissions.

use anyhow::{Context as _, Result};
use serde::Serialize;
use serde_json::Value;
use stagecraft_client::forms::{FormPayload, SubmitOutcome};
use stagecraft_client::{ApplyRequest, BookRequest, FieldKind, FieldList, FormClient, FormError, FormKind};

use super::Context;
use crate::args::{ApplyArgs, BookArgs};

#[derive(Debug, Serialize)]
pub struct DryRunOutput {
    pub kind: FormKind,
    pub endpoint: String,
    pub payload: FormPayload,
}

pub async fn book_impl(ctx: &Context, args: BookArgs) -> Result<Value> {
    let genres = FieldList::from_values(FieldKind::Genre, args.genres)?;
    let languages = FieldList::from_values(FieldKind::Language, args.languages)?;

    let request = BookRequest {
        name: args.name,
        email: args.email,
        phone: args.phone,
        location: args.location,
        genres: genres.filled(),
        languages: languages.filled(),
    };
    let endpoint = &ctx.config.book_form_endpoint;

    if args.dry_run {
        let payload = request.validate()?;
        return Ok(serde_json::to_value(DryRunOutput { kind: FormKind::Booking, endpoint: endpoint.clone(), payload })?);
    }

    let client = FormClient::new(&ctx.config.user_agent)?;
    let outcome = client.submit_booking(endpoint, &request).await;
    report(FormKind::Booking, outcome)
}

pub async fn apply_impl(ctx: &Context, args: ApplyArgs) -> Result<Value> {
    let locations = FieldList::from_values(FieldKind::Location, args.locations)?;

    let mut request = ApplyRequest::default();
    for (name, value) in args.fields {
        request.push(name, value);
    }
    let request = request.with_locations(&locations);
    let endpoint = &ctx.config.apply_form_endpoint;

    if args.dry_run {
        let payload = request.validate()?;
        return Ok(serde_json::to_value(DryRunOutput {
            kind: FormKind::Application,
            endpoint: endpoint.clone(),
            payload,
        })?);
    }

    let client = FormClient::new(&ctx.config.user_agent)?;
    let outcome = client.submit_application(endpoint, &request).await;
    report(FormKind::Application, outcome)
}

/// Validation errors are reported as-is; backend and transport failures get
/// the page's generic retry message.
fn report(kind: FormKind, outcome: Result<SubmitOutcome, FormError>) -> Result<Value> {
    match outcome {
        Ok(outcome) => Ok(serde_json::to_value(outcome)?),
        Err(e @ FormError::Invalid(_)) => Err(e.into()),
        Err(e) => Err(e).context(kind.failure_message()),
    }
}
