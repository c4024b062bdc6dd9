//! HTTP client for the local mail service's `/send-email` endpoint.

use crate::config::LauncherConfig;
use crate::error::email_client::EmailClientError;
use crate::SEND_EMAIL_ENDPOINT;

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

const REMOTE_ERROR_FIELD: &str = "error";
const EMPTY_BODY_MESSAGE: &str = "<empty response body>";

/// Body of `POST /send-email`.
///
/// Serialized as `{"email", "subject", "plainText", "htmlContent"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub email: String,
    pub subject: String,
    pub plain_text: String,
    pub html_content: String,
}

impl EmailRequest {
    pub fn new(
        email: impl Into<String>,
        subject: impl Into<String>,
        plain_text: impl Into<String>,
        html_content: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            subject: subject.into(),
            plain_text: plain_text.into(),
            html_content: html_content.into(),
        }
    }

    /// Recipient, subject and plain text must be non-empty; HTML may be empty.
    ///
    /// Address syntax is left to the service, which reports it as a remote error.
    #[track_caller]
    pub fn validate(&self) -> Result<(), EmailClientError> {
        if self.email.is_empty() {
            return Err(EmailClientError::Validation {
                message: "Recipient address is required".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.subject.is_empty() {
            return Err(EmailClientError::Validation {
                message: "Subject is required".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.plain_text.is_empty() {
            return Err(EmailClientError::Validation {
                message: "Plain text content is required".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    message: String,
}

#[derive(Clone)]
pub struct EmailClient {
    base_url: Url,
    endpoint: String,
    client: Client,
}

impl EmailClient {
    /// Client for `base_url` with the default endpoint and no request timeout.
    pub fn new(base_url_str: &str) -> Result<Self, EmailClientError> {
        let base_url = Url::parse(base_url_str)?;
        let client = Client::builder().build()?;

        Ok(Self {
            base_url,
            endpoint: SEND_EMAIL_ENDPOINT.to_string(),
            client,
        })
    }

    pub fn from_config(config: &LauncherConfig) -> Result<Self, EmailClientError> {
        let base_url = Url::parse(&config.base_url())?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            base_url,
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send one email through the local service.
    ///
    /// # Returns
    ///
    /// * `Ok(message)` - The `message` field of a 2xx response
    /// * `Err(EmailClientError::Remote)` - Non-success status; carries the `error` field
    /// * `Err(EmailClientError)` - Invalid request, transport failure, or malformed response
    pub async fn send_email(&self, request: &EmailRequest) -> Result<String, EmailClientError> {
        request.validate()?;

        let url = self.base_url.join(&self.endpoint)?;

        debug!("POST {url} (recipient: {})", request.email);

        let response = self.client.post(url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = remote_error_message(&body);
            warn!("Mail service rejected request: HTTP {} - {message}", status.as_u16());

            return Err(EmailClientError::Remote {
                status: HttpStatusCode::from(status.as_u16()),
                message,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let parsed: SendEmailResponse = serde_json::from_str(&body)?;

        info!("Email to {} accepted: {}", request.email, parsed.message);
        Ok(parsed.message)
    }
}

/// The `error` field of a JSON error body, or the raw body otherwise.
pub(crate) fn remote_error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get(REMOTE_ERROR_FIELD).map(|field| match field {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        });

    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => EMPTY_BODY_MESSAGE.to_string(),
        None => body.trim().to_string(),
    }
}
