use clap::Parser;
use std::path::PathBuf;

use crate::segment::SegmentMode;

pub const DEFAULT_IMAGE: &str = "images/street.jpg";

/// Raw-content location the segmentation service downloads the image from.
pub const DEFAULT_PUBLIC_IMAGE_BASE: &str = "https://github.com/MicrosoftLearning/mslearn-ai-vision/blob/main/Labfiles/01-analyze-images/Python/image-analysis";

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Image to analyze
    #[arg(default_value = DEFAULT_IMAGE)]
    pub image_file: PathBuf,

    /// Azure AI services endpoint, e.g. https://<resource>.cognitiveservices.azure.com/
    #[arg(long, env = "AI_SERVICE_ENDPOINT", default_value = "")]
    pub endpoint: String,

    #[arg(long, env = "AI_SERVICE_KEY", default_value = "", hide_env_values = true)]
    pub key: String,

    /// Directory that receives objects.jpg, people.jpg and backgroundForeground.png
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// TrueType/OpenType font used for object labels
    #[arg(long, env = "AI_LABEL_FONT", value_parser = check_font)]
    pub font: Option<PathBuf>,

    /// Caption language (service default when omitted)
    #[arg(long)]
    pub language: Option<String>,

    #[arg(long, default_value_t = false)]
    pub gender_neutral_caption: bool,

    #[arg(long, default_value = "backgroundRemoval", value_parser = check_segment_mode)]
    pub segment_mode: SegmentMode,

    #[arg(long, default_value = DEFAULT_PUBLIC_IMAGE_BASE)]
    pub public_image_base: String,
}

impl Config {
    /// Endpoint with exactly one trailing slash, so request paths can be appended.
    pub fn endpoint_base(&self) -> String {
        let trimmed = self.endpoint.trim().trim_end_matches('/');
        format!("{trimmed}/")
    }
}

fn check_font(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if !path.is_file() {
        return Err(format!("font file {} does not exist", path.display()));
    }
    Ok(path)
}

fn check_segment_mode(s: &str) -> Result<SegmentMode, String> {
    s.parse()
}
