use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use image::{ImageFormat, RgbImage};
use log::{debug, info, warn};

use crate::analysis::{AnalysisResult, DetectedObject, DetectedPerson};
use crate::draw::{draw_bounding_box, draw_label, to_coord, CYAN, STROKE_WIDTH};
use crate::errors::{Result, VisionError};

pub const OBJECTS_OUTPUT: &str = "objects.jpg";
pub const PEOPLE_OUTPUT: &str = "people.jpg";

/// Places tried, in order, when no label font is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// `0.8734` -> `87.34%`
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

pub fn object_line(object: &DetectedObject) -> String {
    match object.first_tag() {
        Some(tag) => format!(
            " {} (confidence: {})",
            tag.name,
            format_confidence(tag.confidence)
        ),
        None => " (untagged object)".to_string(),
    }
}

/// The bounding box is printed where a label would go.
pub fn person_line(person: &DetectedPerson) -> String {
    format!(
        " {} (confidence: {})",
        person.bounding_box,
        format_confidence(person.confidence)
    )
}

fn read_font(path: &Path) -> Option<FontVec> {
    let data = fs::read(path).ok()?;
    match FontVec::try_from_vec(data) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("ignoring font {}: {e}", path.display());
            None
        }
    }
}

/// Loads the label font from `explicit`, or the first usable system font.
pub fn load_font(explicit: Option<&Path>) -> Option<FontVec> {
    if let Some(path) = explicit {
        if let Some(font) = read_font(path) {
            debug!("label font: {}", path.display());
            return Some(font);
        }
    }

    let font = FONT_CANDIDATES.iter().copied().map(Path::new).find_map(|path| {
        let font = read_font(path)?;
        debug!("label font: {}", path.display());
        Some(font)
    });
    if font.is_none() {
        warn!("no label font found; object labels are drawn without text");
    }
    font
}

/// Draws detections onto fresh decodes of the source image.
pub struct Annotator {
    output_dir: PathBuf,
    font: Option<FontVec>,
}

impl Annotator {
    pub fn new(output_dir: impl Into<PathBuf>, font: Option<FontVec>) -> Self {
        Self {
            output_dir: output_dir.into(),
            font,
        }
    }

    /// Writes `objects.jpg` and `people.jpg` for the categories that are
    /// present and non-empty, returning the files written.
    pub fn annotate(&self, image_path: &Path, result: &AnalysisResult) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        if let Some(objects) = result.objects().filter(|objects| !objects.is_empty()) {
            written.push(self.annotate_objects(image_path, objects)?);
        }
        if let Some(people) = result.people().filter(|people| !people.is_empty()) {
            written.push(self.annotate_people(image_path, people)?);
        }

        Ok(written)
    }

    pub fn annotate_objects(&self, image_path: &Path, objects: &[DetectedObject]) -> Result<PathBuf> {
        println!("\nObjects in image:");
        let mut canvas = open_canvas(image_path)?;

        for object in objects {
            println!("{}", object_line(object));

            let bbox = &object.bounding_box;
            draw_bounding_box(&mut canvas, bbox, CYAN, STROKE_WIDTH);
            if let Some(tag) = object.first_tag() {
                draw_label(
                    &mut canvas,
                    to_coord(bbox.x),
                    to_coord(bbox.y),
                    &tag.name,
                    self.font.as_ref(),
                    CYAN,
                );
            }
        }

        self.save(&canvas, OBJECTS_OUTPUT)
    }

    pub fn annotate_people(&self, image_path: &Path, people: &[DetectedPerson]) -> Result<PathBuf> {
        println!("\nPeople in image:");
        let mut canvas = open_canvas(image_path)?;

        for person in people {
            draw_bounding_box(&mut canvas, &person.bounding_box, CYAN, STROKE_WIDTH);
            println!("{}", person_line(person));
        }

        self.save(&canvas, PEOPLE_OUTPUT)
    }

    fn save(&self, canvas: &RgbImage, file_name: &str) -> Result<PathBuf> {
        let output_file = self.output_dir.join(file_name);
        canvas
            .save_with_format(&output_file, ImageFormat::Jpeg)
            .map_err(|e| VisionError::ImageProcessing {
                path: output_file.display().to_string(),
                operation: "save annotated image".to_string(),
                source: Box::new(e),
            })?;

        info!("wrote {}", output_file.display());
        println!("  Results saved in {}", output_file.display());
        Ok(output_file)
    }
}

fn open_canvas(image_path: &Path) -> Result<RgbImage> {
    let image = image::open(image_path).map_err(|e| VisionError::ImageProcessing {
        path: image_path.display().to_string(),
        operation: "open source image".to_string(),
        source: Box::new(e),
    })?;
    Ok(image.into_rgb8())
}
