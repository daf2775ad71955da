pub mod analysis;
pub mod annotate;
pub mod config;
pub mod draw;
pub mod errors;
pub mod report;
pub mod segment;
pub mod service;
pub mod traits;

pub mod mocks;

use std::fs;
use std::path::PathBuf;

use log::info;

pub use analysis::{AnalysisClient, AnalysisResult, BoundingBox, VisualFeature, REQUESTED_FEATURES};
pub use annotate::Annotator;
pub use config::Config;
pub use errors::{Result, VisionError};
pub use segment::{SegmentMode, SegmentationClient};
pub use traits::*;

#[cfg(test)]
pub use mocks::*;

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// `None` when the service rejected the analysis request.
    pub analysis: Option<AnalysisResult>,
    pub annotated: Vec<PathBuf>,
    pub background: PathBuf,
    pub segmentation_status: u16,
}

/// Analyze, annotate, then request background removal for one image.
pub struct Workflow<A: ImageAnalyzer> {
    analyzer: A,
    segmenter: SegmentationClient,
    config: Config,
}

impl<A: ImageAnalyzer> Workflow<A> {
    pub const fn new(analyzer: A, segmenter: SegmentationClient, config: Config) -> Self {
        Self {
            analyzer,
            segmenter,
            config,
        }
    }

    pub fn run(&self) -> Result<RunSummary> {
        let image_data = self.read_image()?;

        let analysis = self.analyze_image(&image_data)?;
        let annotated = match &analysis {
            Some(result) => self.annotate(result)?,
            None => Vec::new(),
        };

        let (background, segmentation_status) = self.remove_background()?;

        Ok(RunSummary {
            analysis,
            annotated,
            background,
            segmentation_status,
        })
    }

    pub fn read_image(&self) -> Result<Vec<u8>> {
        let path = &self.config.image_file;
        let data = fs::read(path).map_err(|e| VisionError::FileSystem {
            path: path.clone(),
            operation: "read image".to_string(),
            source: e,
        })?;
        info!("read {} ({} bytes)", path.display(), data.len());
        Ok(data)
    }

    /// Runs the analysis call. A rejected request is printed and turned into
    /// `None`; any other failure is returned.
    pub fn analyze_image(&self, image_data: &[u8]) -> Result<Option<AnalysisResult>> {
        println!("\nAnalyzing image...");

        match self.analyzer.analyze(image_data, &REQUESTED_FEATURES) {
            Ok(result) => Ok(Some(result)),
            Err(err @ VisionError::Http { .. }) => {
                println!("{err}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn annotate(&self, result: &AnalysisResult) -> Result<Vec<PathBuf>> {
        report::print_summary(result);

        let font = annotate::load_font(self.config.font.as_deref());
        Annotator::new(&self.config.output_dir, font).annotate(&self.config.image_file, result)
    }

    pub fn remove_background(&self) -> Result<(PathBuf, u16)> {
        println!("\nRemoving background from image...");

        let image_url =
            segment::public_image_url(&self.config.public_image_base, &self.config.image_file);
        let response = self.segmenter.segment(&image_url, self.config.segment_mode)?;
        let path = segment::save_segmentation(&response, &self.config.output_dir)?;

        println!("  Results saved in {} \n", path.display());
        Ok((path, response.status))
    }
}

impl Workflow<AnalysisClient> {
    pub fn from_config(config: Config) -> Result<Self> {
        let analyzer = AnalysisClient::from_config(&config)?;
        let segmenter = SegmentationClient::from_config(&config)?;
        Ok(Self::new(analyzer, segmenter, config))
    }
}
