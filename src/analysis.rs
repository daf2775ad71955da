use std::fmt;

use log::{debug, info};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::{Result, VisionError};
use crate::service::{build_http_client, http_error, service_url, SUBSCRIPTION_KEY_HEADER};
use crate::traits::ImageAnalyzer;

pub const ANALYZE_API_VERSION: &str = "2023-10-01";

/// Feature kinds the workflow asks the service for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualFeature {
    Caption,
    DenseCaptions,
    Tags,
    Objects,
    People,
}

impl VisualFeature {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Caption => "caption",
            Self::DenseCaptions => "denseCaptions",
            Self::Tags => "tags",
            Self::Objects => "objects",
            Self::People => "people",
        }
    }
}

pub const REQUESTED_FEATURES: [VisualFeature; 5] = [
    VisualFeature::Caption,
    VisualFeature::DenseCaptions,
    VisualFeature::Tags,
    VisualFeature::Objects,
    VisualFeature::People,
];

/// Axis-aligned box in pixel coordinates of the analyzed image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    #[serde(rename = "w")]
    pub width: u32,
    #[serde(rename = "h")]
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{x: {}, y: {}, w: {}, h: {}}}",
            self.x, self.y, self.width, self.height
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedTag {
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenseCaption {
    pub text: String,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedObject {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub tags: Vec<DetectedTag>,
}

impl DetectedObject {
    /// The tag used for display; the service orders tags by confidence.
    pub fn first_tag(&self) -> Option<&DetectedTag> {
        self.tags.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedPerson {
    pub bounding_box: BoundingBox,
    pub confidence: f64,
}

/// `{"values": [...]}` wrapper the service uses for every list result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueList<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

impl<T> From<Vec<T>> for ValueList<T> {
    fn from(values: Vec<T>) -> Self {
        Self { values }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
}

/// Analysis response. Every sub-result is optional: the service only returns
/// what was requested and what it could compute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ImageMetadata>,
    #[serde(rename = "captionResult", default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
    #[serde(rename = "denseCaptionsResult", default, skip_serializing_if = "Option::is_none")]
    pub dense_captions: Option<ValueList<DenseCaption>>,
    #[serde(rename = "tagsResult", default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<ValueList<DetectedTag>>,
    #[serde(rename = "objectsResult", default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<ValueList<DetectedObject>>,
    #[serde(rename = "peopleResult", default, skip_serializing_if = "Option::is_none")]
    pub people: Option<ValueList<DetectedPerson>>,
}

impl AnalysisResult {
    pub fn objects(&self) -> Option<&[DetectedObject]> {
        self.objects.as_ref().map(|list| list.values.as_slice())
    }

    pub fn people(&self) -> Option<&[DetectedPerson]> {
        self.people.as_ref().map(|list| list.values.as_slice())
    }

    pub fn dense_captions(&self) -> Option<&[DenseCaption]> {
        self.dense_captions.as_ref().map(|list| list.values.as_slice())
    }

    pub fn tags(&self) -> Option<&[DetectedTag]> {
        self.tags.as_ref().map(|list| list.values.as_slice())
    }
}

/// Optional query parameters of the analyze call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub language: Option<String>,
    pub gender_neutral_caption: bool,
}

/// Blocking client for `computervision/imageanalysis:analyze`.
pub struct AnalysisClient {
    http: HttpClient,
    endpoint: String,
    key: String,
    options: AnalysisOptions,
}

impl AnalysisClient {
    /// `endpoint` must end with `/`; see [`Config::endpoint_base`].
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: build_http_client()?,
            endpoint: endpoint.into(),
            key: key.into(),
            options: AnalysisOptions::default(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.endpoint_base(), config.key.clone())?.with_options(AnalysisOptions {
            language: config.language.clone(),
            gender_neutral_caption: config.gender_neutral_caption,
        }))
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn analyze_url(&self, features: &[VisualFeature]) -> Result<Url> {
        let features = features
            .iter()
            .map(|feature| feature.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let mut url = service_url(&self.endpoint, "computervision/imageanalysis:analyze")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("api-version", ANALYZE_API_VERSION)
                .append_pair("features", &features);
            if let Some(language) = &self.options.language {
                query.append_pair("language", language);
            }
            if self.options.gender_neutral_caption {
                query.append_pair("gender-neutral-caption", "true");
            }
        }
        Ok(url)
    }
}

impl ImageAnalyzer for AnalysisClient {
    fn analyze(&self, image_data: &[u8], features: &[VisualFeature]) -> Result<AnalysisResult> {
        let url = self.analyze_url(features)?;
        debug!("POST {url} ({} bytes)", image_data.len());

        let response = self
            .http
            .post(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image_data.to_vec())
            .send()
            .map_err(|e| VisionError::Transport {
                operation: "image analysis request".to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(http_error(response));
        }

        let body = response.bytes().map_err(|e| VisionError::Transport {
            operation: "image analysis response".to_string(),
            source: e,
        })?;
        let result: AnalysisResult = serde_json::from_slice(&body)?;
        info!(
            "analysis finished (model version {})",
            result.model_version.as_deref().unwrap_or("unknown")
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "modelVersion": "2023-10-01",
        "metadata": {"width": 640, "height": 480},
        "captionResult": {"text": "a man walking a dog on a leash", "confidence": 0.8734},
        "denseCaptionsResult": {"values": [
            {"text": "a dog on a leash", "confidence": 0.71, "boundingBox": {"x": 5, "y": 6, "w": 7, "h": 8}}
        ]},
        "tagsResult": {"values": [{"name": "outdoor", "confidence": 0.99}]},
        "objectsResult": {"values": [
            {"boundingBox": {"x": 10, "y": 20, "w": 30, "h": 40},
             "tags": [{"name": "dog", "confidence": 0.91}, {"name": "animal", "confidence": 0.5}]}
        ]},
        "peopleResult": {"values": [
            {"boundingBox": {"x": 1, "y": 2, "w": 3, "h": 4}, "confidence": 0.95}
        ]}
    }"#;

    #[test]
    fn parses_full_response() {
        let result: AnalysisResult = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(result.model_version.as_deref(), Some("2023-10-01"));
        assert_eq!(result.metadata, Some(ImageMetadata { width: 640, height: 480 }));
        assert_eq!(result.caption.as_ref().unwrap().text, "a man walking a dog on a leash");
        assert_eq!(result.dense_captions().unwrap().len(), 1);
        assert_eq!(result.tags().unwrap()[0].name, "outdoor");

        let objects = result.objects().unwrap();
        assert_eq!(objects[0].bounding_box, BoundingBox::new(10, 20, 30, 40));
        assert_eq!(objects[0].first_tag().unwrap().name, "dog");

        let people = result.people().unwrap();
        assert_eq!(people[0].bounding_box, BoundingBox::new(1, 2, 3, 4));
        assert_eq!(people[0].confidence, 0.95);
    }

    #[test]
    fn missing_sections_stay_absent() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"modelVersion": "2023-10-01"}"#).unwrap();

        assert!(result.objects().is_none());
        assert!(result.people().is_none());
        assert!(result.caption.is_none());
    }

    #[test]
    fn object_without_tags_has_no_display_tag() {
        let object: DetectedObject =
            serde_json::from_str(r#"{"boundingBox": {"x": 0, "y": 0, "w": 1, "h": 1}}"#).unwrap();
        assert!(object.first_tag().is_none());
    }

    #[test]
    fn bounding_box_display() {
        assert_eq!(
            BoundingBox::new(10, 20, 30, 40).to_string(),
            "{x: 10, y: 20, w: 30, h: 40}"
        );
    }

    fn query(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }

    #[test]
    fn analyze_url_lists_all_features() -> Result<()> {
        let client = AnalysisClient::new("https://vision.example/", "key")?;
        let url = client.analyze_url(&REQUESTED_FEATURES)?;

        assert_eq!(url.path(), "/computervision/imageanalysis:analyze");
        assert_eq!(
            query(&url),
            vec![
                ("api-version".to_string(), "2023-10-01".to_string()),
                (
                    "features".to_string(),
                    "caption,denseCaptions,tags,objects,people".to_string()
                ),
            ]
        );
        Ok(())
    }

    #[test]
    fn analyze_url_appends_options() -> Result<()> {
        let client = AnalysisClient::new("https://vision.example/", "key")?.with_options(
            AnalysisOptions {
                language: Some("en".to_string()),
                gender_neutral_caption: true,
            },
        );
        let url = client.analyze_url(&[VisualFeature::Caption])?;

        assert_eq!(
            &query(&url)[1..],
            &[
                ("features".to_string(), "caption".to_string()),
                ("language".to_string(), "en".to_string()),
                ("gender-neutral-caption".to_string(), "true".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn language_cannot_add_query_parameters() -> Result<()> {
        let client = AnalysisClient::new("https://vision.example/", "key")?.with_options(
            AnalysisOptions {
                language: Some("en&features=tags".to_string()),
                gender_neutral_caption: false,
            },
        );
        let url = client.analyze_url(&REQUESTED_FEATURES)?;
        let pairs = query(&url);

        let features: Vec<_> = pairs.iter().filter(|(name, _)| name == "features").collect();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].1, "caption,denseCaptions,tags,objects,people");
        assert!(pairs.contains(&("language".to_string(), "en&features=tags".to_string())));
        Ok(())
    }
}
