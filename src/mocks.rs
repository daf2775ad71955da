use parking_lot::Mutex;

use crate::analysis::{AnalysisResult, VisualFeature};
use crate::errors::{Result, VisionError};
use crate::traits::ImageAnalyzer;

#[derive(Debug, Clone)]
enum MockResponse {
    Result(AnalysisResult),
    Http {
        status: u16,
        reason: String,
        message: String,
    },
}

/// Mock analyzer for tests: answers every call with a canned result or HTTP
/// error and records the features it was asked for.
#[derive(Debug)]
pub struct MockAnalyzer {
    response: MockResponse,
    calls: Mutex<Vec<Vec<VisualFeature>>>,
}

impl MockAnalyzer {
    pub fn returning(result: AnalysisResult) -> Self {
        Self {
            response: MockResponse::Result(result),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, reason: &str, message: &str) -> Self {
        Self {
            response: MockResponse::Http {
                status,
                reason: reason.to_string(),
                message: message.to_string(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<VisualFeature>> {
        self.calls.lock().clone()
    }
}

impl ImageAnalyzer for MockAnalyzer {
    fn analyze(&self, _image_data: &[u8], features: &[VisualFeature]) -> Result<AnalysisResult> {
        self.calls.lock().push(features.to_vec());
        match &self.response {
            MockResponse::Result(result) => Ok(result.clone()),
            MockResponse::Http {
                status,
                reason,
                message,
            } => Err(VisionError::Http {
                status: *status,
                reason: reason.clone(),
                message: message.clone(),
            }),
        }
    }
}
