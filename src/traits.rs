use crate::analysis::{AnalysisResult, VisualFeature};
use crate::errors::Result;

/// Remote image analysis, abstracted so the workflow can run against a mock.
pub trait ImageAnalyzer: Send + Sync {
    /// Analyzes encoded image bytes for the requested feature kinds.
    ///
    /// A rejected request is reported as `VisionError::Http`.
    fn analyze(&self, image_data: &[u8], features: &[VisualFeature]) -> Result<AnalysisResult>;
}
