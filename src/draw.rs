use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::analysis::BoundingBox;

pub const CYAN: Rgb<u8> = Rgb([0, 255, 255]);
pub const LABEL_TEXT: Rgb<u8> = Rgb([0, 0, 0]);
pub const STROKE_WIDTH: u32 = 3;
pub const LABEL_SCALE: f32 = 16.0;
const LABEL_PADDING: u32 = 2;

/// Canvas coordinate for a service-reported pixel offset, saturating at `i32::MAX`.
pub fn to_coord(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Inclusive corner pixels of the outline drawn for `bbox`.
pub fn rectangle_corners(bbox: &BoundingBox) -> ((i32, i32), (i32, i32)) {
    let left = to_coord(bbox.x);
    let top = to_coord(bbox.y);
    (
        (left, top),
        (
            left.saturating_add(to_coord(bbox.width)),
            top.saturating_add(to_coord(bbox.height)),
        ),
    )
}

/// Draws the outline of `bbox` with `stroke` pixels growing inward from the
/// outer edge. Parts outside the canvas are clipped.
pub fn draw_bounding_box(canvas: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, stroke: u32) {
    let ((left, top), (right, bottom)) = rectangle_corners(bbox);

    // Edges more than `stroke` past the canvas are never visible.
    let margin = i64::from(stroke);
    let clamp_x = |v: i32| i64::from(v).clamp(-margin, i64::from(canvas.width()) + margin);
    let clamp_y = |v: i32| i64::from(v).clamp(-margin, i64::from(canvas.height()) + margin);
    let (left, right) = (clamp_x(left), clamp_x(right));
    let (top, bottom) = (clamp_y(top), clamp_y(bottom));

    for i in 0..margin {
        let width = right - left + 1 - 2 * i;
        let height = bottom - top + 1 - 2 * i;
        if width <= 0 || height <= 0 {
            break;
        }
        let (Ok(x), Ok(y), Ok(w), Ok(h)) = (
            i32::try_from(left + i),
            i32::try_from(top + i),
            u32::try_from(width),
            u32::try_from(height),
        ) else {
            break;
        };
        draw_hollow_rect_mut(canvas, Rect::at(x, y).of_size(w, h), color);
    }
}

/// Pixel size of `text` at `scale`. Without a font the size is estimated so
/// the label background keeps a sensible footprint.
pub fn label_size(text: &str, font: Option<&FontVec>, scale: f32) -> (u32, u32) {
    match font {
        Some(font) => text_size(PxScale::from(scale), font, text),
        None => {
            let glyphs = text.chars().count() as f32;
            ((glyphs * scale * 0.5).ceil() as u32, scale.ceil() as u32)
        }
    }
}

/// Draws `text` on a filled `background` box sitting just above `(x, y)`,
/// or just below the top edge when there is no room above.
///
/// Returns the rectangle covered by the background.
pub fn draw_label(
    canvas: &mut RgbImage,
    x: i32,
    y: i32,
    text: &str,
    font: Option<&FontVec>,
    background: Rgb<u8>,
) -> Rect {
    let (text_width, text_height) = label_size(text, font, LABEL_SCALE);
    let box_width = text_width.max(1) + 2 * LABEL_PADDING;
    let box_height = text_height.max(1) + 2 * LABEL_PADDING;
    let top = y.saturating_sub(to_coord(box_height)).max(0);
    let x = x.min(to_coord(canvas.width()));

    let area = Rect::at(x, top).of_size(box_width, box_height);
    draw_filled_rect_mut(canvas, area, background);

    if let Some(font) = font {
        draw_text_mut(
            canvas,
            LABEL_TEXT,
            x + LABEL_PADDING as i32,
            top + LABEL_PADDING as i32,
            PxScale::from(LABEL_SCALE),
            font,
            text,
        );
    }
    area
}
