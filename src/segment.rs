use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, warn};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::Serialize;

use crate::config::Config;
use crate::errors::{Result, VisionError};
use crate::service::{build_http_client, service_url, SUBSCRIPTION_KEY_HEADER};

pub const SEGMENT_API_VERSION: &str = "2023-02-01-preview";
pub const BACKGROUND_OUTPUT: &str = "backgroundForeground.png";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SegmentMode {
    #[default]
    BackgroundRemoval,
    ForegroundMatting,
}

impl SegmentMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BackgroundRemoval => "backgroundRemoval",
            Self::ForegroundMatting => "foregroundMatting",
        }
    }
}

impl fmt::Display for SegmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "backgroundRemoval" => Ok(Self::BackgroundRemoval),
            "foregroundMatting" => Ok(Self::ForegroundMatting),
            other => Err(format!(
                "{other} is not supported. Supported modes: `backgroundRemoval`, `foregroundMatting`"
            )),
        }
    }
}

#[derive(Serialize)]
struct SegmentRequest<'a> {
    url: &'a str,
}

/// Raw answer of the segment call. The body is kept as-is whatever the status.
#[derive(Debug, Clone)]
pub struct SegmentResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl SegmentResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Builds the URL the service fetches the image from. The local file is never
/// uploaded, so this only resolves for images published under `base`.
///
/// The path is used as given; only Windows separators are turned into `/`.
pub fn public_image_url(base: &str, image_file: &Path) -> String {
    let relative = image_file.to_string_lossy().replace('\\', "/");
    format!("{}/{relative}?raw=true", base.trim_end_matches('/'))
}

/// Blocking client for `computervision/imageanalysis:segment`.
pub struct SegmentationClient {
    http: HttpClient,
    endpoint: String,
    key: String,
}

impl SegmentationClient {
    /// `endpoint` must end with `/`; see [`Config::endpoint_base`].
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: build_http_client()?,
            endpoint: endpoint.into(),
            key: key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.endpoint_base(), config.key.clone())
    }

    pub fn segment_url(&self, mode: SegmentMode) -> Result<Url> {
        let mut url = service_url(&self.endpoint, "computervision/imageanalysis:segment")?;
        url.query_pairs_mut()
            .append_pair("api-version", SEGMENT_API_VERSION)
            .append_pair("mode", mode.as_str());
        Ok(url)
    }

    pub fn segment(&self, image_url: &str, mode: SegmentMode) -> Result<SegmentResponse> {
        let url = self.segment_url(mode)?;
        debug!("POST {url} for {image_url}");

        let response = self
            .http
            .post(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(CONTENT_TYPE, "application/json")
            .json(&SegmentRequest { url: image_url })
            .send()
            .map_err(|e| VisionError::Transport {
                operation: "segmentation request".to_string(),
                source: e,
            })?;

        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| VisionError::Transport {
            operation: "segmentation response".to_string(),
            source: e,
        })?;

        Ok(SegmentResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Writes the segment response body to `backgroundForeground.png`,
/// replacing any previous file.
pub fn save_segmentation(response: &SegmentResponse, output_dir: &Path) -> Result<PathBuf> {
    if !response.is_success() {
        warn!(
            "segmentation returned status {}; writing the response body anyway",
            response.status
        );
    }

    let output_file = output_dir.join(BACKGROUND_OUTPUT);
    fs::write(&output_file, &response.body).map_err(|e| VisionError::FileSystem {
        path: output_file.clone(),
        operation: "write segmentation result".to_string(),
        source: e,
    })?;
    Ok(output_file)
}
