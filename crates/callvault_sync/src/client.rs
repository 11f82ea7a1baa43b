use crate::{PageQuery, RecordingsPage};
use async_trait::async_trait;
use callvault_error::{TransportError, TransportErrorKind};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, instrument};

const RECORDINGS_PATH: &str = "/users/me/recordings";

/// Lists cloud recordings for the authenticated user.
#[async_trait]
pub trait MeetingsClient: Send + Sync {
    /// Fetch one page of recordings.
    ///
    /// HTTP 429 must come back as [`TransportErrorKind::RateLimited`].
    async fn list_recordings(&self, query: &PageQuery) -> Result<RecordingsPage, TransportError>;
}

/// [`MeetingsClient`] over HTTPS with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpMeetingsClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl HttpMeetingsClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.zoom.us/v2`
    /// * `access_token` - OAuth access token sent as a bearer token
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, "Creating meetings client");
        Self {
            client: Client::new(),
            base_url,
            access_token: access_token.into(),
        }
    }

    /// API root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MeetingsClient for HttpMeetingsClient {
    #[instrument(skip(self, query), fields(token = query.next_page_token.as_deref()))]
    async fn list_recordings(&self, query: &PageQuery) -> Result<RecordingsPage, TransportError> {
        debug!("Requesting recordings page");

        let response = self
            .client
            .get(format!("{}{}", self.base_url, RECORDINGS_PATH))
            .bearer_auth(&self.access_token)
            .query(&query.query_pairs())
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send recordings request");
                TransportError::new(TransportErrorKind::Request(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            debug!(body = %body, "Recordings listing rate limited");
            return Err(TransportError::new(TransportErrorKind::RateLimited {
                status: status.as_u16(),
                message: body,
            }));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Recordings listing returned error");
            return Err(TransportError::new(TransportErrorKind::Status {
                status: status.as_u16(),
                message: body,
            }));
        }

        let page: RecordingsPage = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse recordings page");
            TransportError::new(TransportErrorKind::Request(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        debug!(count = page.meetings.len(), "Received recordings page");
        Ok(page)
    }
}
