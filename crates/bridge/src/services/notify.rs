//! Best-effort notification of the internal backend when codes are issued.

use std::time::Duration;

use pelican_core::ForwardingCodes;
use serde::Serialize;
use tracing::instrument;

/// Notification client for the internal backend.
///
/// When no `NOTIFY_URL` is configured the notifier is inert. Failures never
/// propagate - callers record them as warnings on an otherwise successful
/// run.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CodesIssuedPayload<'a> {
    customer_name: &'a str,
    simple_code: &'a str,
    signature_code: &'a str,
}

/// Error sending a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {0}")]
    Status(u16),
}

impl Notifier {
    /// Create a notifier; `url` of `None` disables it.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created, which should never
    /// happen with a static configuration.
    #[must_use]
    pub fn new(url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, url }
    }

    /// Tell the backend that a customer was issued their code pair.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response. A `None`
    /// url is a silent no-op.
    #[instrument(skip(self, codes), fields(customer_name = %customer_name))]
    pub async fn codes_issued(
        &self,
        customer_name: &str,
        codes: &ForwardingCodes,
    ) -> Result<(), NotifyError> {
        let Some(url) = &self.url else {
            return Ok(());
        };

        let payload = CodesIssuedPayload {
            customer_name,
            simple_code: &codes.simple,
            signature_code: &codes.signature,
        };

        let response = self.client.post(url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        tracing::info!("Backend notified of issued codes");
        Ok(())
    }
}
