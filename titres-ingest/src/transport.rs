//! Upload transport
//!
//! Sends a validated spreadsheet to the ingestion endpoint as multipart
//! form data. The deployment's [`TransportStrategy`] picks route and field
//! naming once at startup; both strategies yield the same response shape.
//!
//! There is no automatic retry: the batch endpoint is not idempotent, so a
//! failed upload surfaces immediately and re-submission is a user decision.

use crate::error::TransportError;
use crate::job::SpreadsheetFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use titres_common::config::TransportStrategy;
use tracing::debug;

/// Route used by the title-management API integration
const TITLE_API_IMPORT_PATH: &str = "/titres/import-excel/";

/// Route used by the generic upload integration
const DIRECT_UPLOAD_PATH: &str = "/upload-excel";

/// Default timeout for upload requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ingestion endpoint resolved from configuration
///
/// Resolution happens exactly once, when the transport is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// Full upload URL
    pub url: String,
    /// Name of the multipart field carrying the file content
    pub file_field: &'static str,
}

impl ResolvedEndpoint {
    /// Resolve the active endpoint from base URL and strategy
    pub fn resolve(base_url: &str, strategy: TransportStrategy) -> Self {
        let base = base_url.trim_end_matches('/');
        match strategy {
            TransportStrategy::TitleApi => Self {
                url: format!("{}{}", base, TITLE_API_IMPORT_PATH),
                file_field: "fichier",
            },
            TransportStrategy::DirectUpload => Self {
                url: format!("{}{}", base, DIRECT_UPLOAD_PATH),
                file_field: "file",
            },
        }
    }
}

/// Seam between the pipeline and the wire
///
/// The production implementation is [`HttpTransport`]; tests substitute a
/// canned one to drive the pipeline without a server.
#[async_trait]
pub trait IngestTransport: Send + Sync {
    /// URL uploads go to, for logging and diagnostics
    fn endpoint(&self) -> &str;

    /// Upload the file and return the raw response body
    ///
    /// Interpreting the body is the reducer's job; the transport only
    /// guarantees the HTTP exchange succeeded.
    async fn upload(
        &self,
        file: &SpreadsheetFile,
        actor: &str,
    ) -> Result<String, TransportError>;
}

/// Structured error body the backend sends on rejection
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Production transport over reqwest
pub struct HttpTransport {
    http_client: Client,
    endpoint: ResolvedEndpoint,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint strategy
    pub fn new(base_url: &str, strategy: TransportStrategy, timeout: Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            endpoint: ResolvedEndpoint::resolve(base_url, strategy),
        }
    }

    /// Create a transport with the default timeout
    pub fn with_default_timeout(base_url: &str, strategy: TransportStrategy) -> Self {
        Self::new(base_url, strategy, DEFAULT_TIMEOUT)
    }

    /// MIME type for an accepted spreadsheet extension
    fn mime_for_extension(extension: &str) -> &'static str {
        match extension {
            "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "xls" => "application/vnd.ms-excel",
            "csv" => "text/csv",
            _ => "application/octet-stream",
        }
    }

    /// Turn a non-success response into a TransportError
    ///
    /// Prefers the structured error body; if that does not parse, a
    /// generic message is synthesized rather than failing opaquely.
    fn error_from_response(status: u16, body: &str) -> TransportError {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .unwrap_or_else(|| format!("Import request failed with status {}", status));
        TransportError::Http { status, message }
    }
}

#[async_trait]
impl IngestTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint.url
    }

    async fn upload(
        &self,
        file: &SpreadsheetFile,
        actor: &str,
    ) -> Result<String, TransportError> {
        debug!(
            url = %self.endpoint.url,
            file_name = %file.file_name,
            size = file.size,
            "Uploading spreadsheet"
        );

        let content = tokio::fs::read(&file.path).await?;
        let part = Part::bytes(content)
            .file_name(file.file_name.clone())
            .mime_str(Self::mime_for_extension(&file.extension()))
            .map_err(|e| TransportError::Network(format!("Invalid upload part: {}", e)))?;

        let form = Form::new()
            .part(self.endpoint.file_field, part)
            .text("utilisateur", actor.to_string());

        let response = self
            .http_client
            .post(&self.endpoint.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::error_from_response(status.as_u16(), &body));
        }

        debug!(status = status.as_u16(), bytes = body.len(), "Upload accepted");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_title_api_endpoint() {
        let endpoint =
            ResolvedEndpoint::resolve("http://backend:8000/api", TransportStrategy::TitleApi);
        assert_eq!(endpoint.url, "http://backend:8000/api/titres/import-excel/");
        assert_eq!(endpoint.file_field, "fichier");
    }

    #[test]
    fn test_resolve_direct_upload_endpoint() {
        let endpoint =
            ResolvedEndpoint::resolve("http://backend:8000/api/", TransportStrategy::DirectUpload);
        assert_eq!(endpoint.url, "http://backend:8000/api/upload-excel");
        assert_eq!(endpoint.file_field, "file");
    }

    #[test]
    fn test_error_from_structured_body() {
        let err = HttpTransport::error_from_response(400, r#"{"error": "Fichier illisible"}"#);
        match err {
            TransportError::Http { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Fichier illisible");
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_from_message_field() {
        let err = HttpTransport::error_from_response(422, r#"{"message": "Format refusé"}"#);
        match err {
            TransportError::Http { message, .. } => assert_eq!(message, "Format refusé"),
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_from_unparseable_body_is_generic() {
        let err = HttpTransport::error_from_response(500, "<html>Internal Server Error</html>");
        match err {
            TransportError::Http { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Import request failed with status 500");
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[test]
    fn test_mime_for_extensions() {
        assert_eq!(
            HttpTransport::mime_for_extension("xlsx"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(HttpTransport::mime_for_extension("xls"), "application/vnd.ms-excel");
        assert_eq!(HttpTransport::mime_for_extension("csv"), "text/csv");
        assert_eq!(
            HttpTransport::mime_for_extension("bin"),
            "application/octet-stream"
        );
    }
}
