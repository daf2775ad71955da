#![allow(dead_code)]

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use image_analysis_rs::config::DEFAULT_PUBLIC_IMAGE_BASE;
use image_analysis_rs::{Config, SegmentMode};

pub const TEST_KEY: &str = "test-key";
pub const ANALYZE_PATH: &str = "/computervision/imageanalysis:analyze";
pub const SEGMENT_PATH: &str = "/computervision/imageanalysis:segment";

pub fn write_test_image(dir: &Path) -> PathBuf {
    let image_file = dir.join("street.jpg");
    RgbImage::from_pixel(160, 120, Rgb([90, 90, 90]))
        .save(&image_file)
        .unwrap();
    image_file
}

pub fn build_config(server_uri: &str, image_file: PathBuf, output_dir: &Path) -> Config {
    Config {
        image_file,
        endpoint: format!("{server_uri}/"),
        key: TEST_KEY.to_string(),
        output_dir: output_dir.to_path_buf(),
        font: None,
        language: None,
        gender_neutral_caption: false,
        segment_mode: SegmentMode::BackgroundRemoval,
        public_image_base: DEFAULT_PUBLIC_IMAGE_BASE.to_string(),
    }
}

pub fn analysis_body() -> Value {
    json!({
        "modelVersion": "2023-10-01",
        "metadata": {"width": 160, "height": 120},
        "captionResult": {"text": "a man walking a dog", "confidence": 0.8734},
        "denseCaptionsResult": {"values": [
            {"text": "a dog", "confidence": 0.7, "boundingBox": {"x": 10, "y": 20, "w": 30, "h": 40}}
        ]},
        "tagsResult": {"values": [{"name": "outdoor", "confidence": 0.99}]},
        "objectsResult": {"values": [
            {"boundingBox": {"x": 10, "y": 20, "w": 30, "h": 40},
             "tags": [{"name": "dog", "confidence": 0.8734}]}
        ]},
        "peopleResult": {"values": [
            {"boundingBox": {"x": 60, "y": 10, "w": 40, "h": 90}, "confidence": 0.95}
        ]}
    })
}

pub fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub async fn mount_analysis(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(ANALYZE_PATH))
        .and(query_param("api-version", "2023-10-01"))
        .and(query_param("features", "caption,denseCaptions,tags,objects,people"))
        .and(header("Ocp-Apim-Subscription-Key", TEST_KEY))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(template)
        .mount(server)
        .await;
}

pub async fn mount_segmentation(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(SEGMENT_PATH))
        .and(query_param("api-version", "2023-02-01-preview"))
        .and(query_param("mode", "backgroundRemoval"))
        .and(header("Ocp-Apim-Subscription-Key", TEST_KEY))
        .respond_with(template)
        .mount(server)
        .await;
}
