//! Overlay Renderer
//!
//! Draws every detection onto the frame: four L-shaped corner brackets
//! instead of a full outline, so overlapping boxes stay readable, and a filled
//! label plate above the top-left corner in the class color.

pub mod palette;
pub mod text;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::config::OverlaySettings;
use crate::vision::{BoundingBox, Detection};

pub use palette::Palette;
pub use text::LabelFont;

/// Fixed drawing parameters
#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    /// Bracket arm length in pixels
    pub bracket_length: u32,
    /// Bracket line thickness in pixels
    pub bracket_thickness: u32,
    /// Label text color
    pub text_color: Rgb<u8>,
    /// Space between label text and plate edge
    pub plate_padding: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            bracket_length: 30,
            bracket_thickness: 3,
            text_color: Rgb([0, 0, 0]),
            plate_padding: 5,
        }
    }
}

impl From<&OverlaySettings> for OverlayStyle {
    fn from(settings: &OverlaySettings) -> Self {
        Self {
            bracket_length: settings.bracket_length.max(1),
            bracket_thickness: settings.bracket_thickness.max(1),
            text_color: Rgb(settings.text_color),
            plate_padding: settings.plate_padding,
        }
    }
}

/// Draws detections onto frames. Holds only read-only state.
pub struct OverlayRenderer {
    palette: Palette,
    font: LabelFont,
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(palette: Palette, font: LabelFont, style: OverlayStyle) -> Self {
        Self { palette, font, style }
    }

    /// Draw all detections onto `frame` in place
    pub fn render(&self, frame: &mut RgbImage, detections: &[Detection]) {
        for detection in detections {
            let color = self.palette.color_for(detection.class_index);

            for segment in bracket_segments(
                &detection.bbox,
                self.style.bracket_length,
                self.style.bracket_thickness,
            ) {
                draw_filled_rect_mut(frame, segment, color);
            }

            let text = self.font.measure(&detection.label);
            let plate = label_plate(&detection.bbox, text, self.style.plate_padding);
            draw_filled_rect_mut(frame, plate, color);

            let pad = self.style.plate_padding as i32;
            self.font.draw(
                frame,
                self.style.text_color,
                plate.left() + pad,
                plate.top() + pad,
                &detection.label,
            );
        }
    }
}

/// The eight filled strips forming the corner brackets of `bbox`.
///
/// Arms are clamped to the box size; thickness is centered on the box edge.
pub fn bracket_segments(bbox: &BoundingBox, length: u32, thickness: u32) -> [Rect; 8] {
    let t = thickness.max(1);
    let half = (t / 2) as i32;
    let arm_x = length.clamp(1, bbox.width());
    let arm_y = length.clamp(1, bbox.height());

    let horizontal =
        |x: i32, y: i32| Rect::at(x.saturating_sub(half), y.saturating_sub(half)).of_size(arm_x + t, t);
    let vertical =
        |x: i32, y: i32| Rect::at(x.saturating_sub(half), y.saturating_sub(half)).of_size(t, arm_y + t);

    let BoundingBox { x1, y1, x2, y2 } = *bbox;
    let (ax, ay) = (arm_x as i32, arm_y as i32);

    [
        // top-left
        horizontal(x1, y1),
        vertical(x1, y1),
        // top-right
        horizontal(x2 - ax, y1),
        vertical(x2, y1),
        // bottom-left
        horizontal(x1, y2),
        vertical(x1, y2 - ay),
        // bottom-right
        horizontal(x2 - ax, y2),
        vertical(x2, y2 - ay),
    ]
}

/// Plate rectangle for a label of `text_size`, sitting on the box's top-left
/// corner and pushed inside the frame when the box touches the top edge
pub fn label_plate(bbox: &BoundingBox, text_size: (u32, u32), padding: u32) -> Rect {
    let width = text_size.0 + 2 * padding;
    let height = text_size.1 + 2 * padding;
    let x = bbox.x1.max(0);
    let y = bbox.y1.saturating_sub(height as i32).max(0);
    Rect::at(x, y).of_size(width.max(1), height.max(1))
}
