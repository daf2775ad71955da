//! Text summary of the caption, dense captions and tags.

use crate::analysis::AnalysisResult;
use crate::annotate::format_confidence;

pub fn summary_lines(result: &AnalysisResult) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(caption) = &result.caption {
        lines.push("\nCaption:".to_string());
        lines.push(format!(
            " Caption: '{}' (confidence: {})",
            caption.text,
            format_confidence(caption.confidence)
        ));
    }

    if let Some(captions) = result.dense_captions() {
        lines.push("\nDense Captions:".to_string());
        lines.extend(captions.iter().map(|caption| {
            format!(
                " Caption: '{}' (confidence: {})",
                caption.text,
                format_confidence(caption.confidence)
            )
        }));
    }

    if let Some(tags) = result.tags() {
        lines.push("\nTags:".to_string());
        lines.extend(
            tags.iter()
                .map(|tag| format!(" {} (confidence: {})", tag.name, format_confidence(tag.confidence))),
        );
    }

    lines
}

pub fn print_summary(result: &AnalysisResult) {
    for line in summary_lines(result) {
        println!("{line}");
    }
}
