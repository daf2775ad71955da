//! Pieces shared by every call to the Azure AI Vision REST surface.

use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::Url;
use serde::Deserialize;

use crate::errors::{Result, VisionError};

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Error document returned by the service on a rejected request.
#[derive(Debug, Deserialize)]
struct ServiceErrorDocument {
    error: ServiceErrorBody,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: String,
}

pub(crate) fn build_http_client() -> Result<HttpClient> {
    HttpClient::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| VisionError::Transport {
            operation: "http client construction".to_string(),
            source: e,
        })
}

/// Joins an operation path onto the endpoint. Query parameters are added by
/// the caller through `query_pairs_mut` so every value is percent-encoded.
pub(crate) fn service_url(endpoint: &str, operation: &str) -> Result<Url> {
    Url::parse(&format!("{endpoint}{operation}")).map_err(|e| VisionError::Configuration {
        message: format!("invalid service endpoint {endpoint:?}: {e}"),
    })
}

/// Turns a non-success response into `VisionError::Http`.
///
/// The message is `error.message` from the JSON error document, or the raw
/// body when the service answered with something else.
pub(crate) fn http_error(response: Response) -> VisionError {
    let status = response.status();
    let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
    let body = response.text().unwrap_or_default();
    let message = match serde_json::from_str::<ServiceErrorDocument>(&body) {
        Ok(document) => document.error.message,
        Err(_) => body,
    };

    VisionError::Http {
        status: status.as_u16(),
        reason,
        message,
    }
}
