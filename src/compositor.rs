use std::io::Cursor;

use image::{Rgba, RgbaImage, imageops};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::ProductOptions,
    editor::PlacementState,
    error::{CaseError, CaseResult},
    geometry::{self, Rect},
};

/// Wrap-around edge of the physical case, in device-independent pixels,
/// added on all four sides of the template frame.
pub const CASE_BLEED_PX: u32 = 30;

/// Measurement capability the host UI provides: the current rendered bounding
/// rectangles of the editor viewport and the template frame, in device pixels.
/// Must be read at the instant of confirm; responsive layout invalidates
/// cached values. `None` means the region is not mounted yet.
pub trait FrameMetrics {
    fn viewport_rect(&self) -> Option<Rect>;
    fn template_rect(&self) -> Option<Rect>;
}

/// Fixed measurements, for hosts with settled layout and for tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticFrameMetrics {
    pub viewport: Option<Rect>,
    pub template: Option<Rect>,
}

impl FrameMetrics for StaticFrameMetrics {
    fn viewport_rect(&self) -> Option<Rect> {
        self.viewport
    }

    fn template_rect(&self) -> Option<Rect> {
        self.template
    }
}

/// Everything the compositor needs for one render, captured at confirm time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompositeJob {
    pub placement: PlacementState,
    pub viewport: Rect,
    pub template: Rect,
    pub options: ProductOptions,
}

/// An exported print-ready raster.
#[derive(Clone, Debug)]
pub struct CompositeArtifact {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Decodes the uploaded source. A corrupt or unreadable payload is a
/// composite error surfaced to the user.
pub fn decode_source(bytes: &[u8]) -> CaseResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| CaseError::composite(format!("decode source image: {e}")))?;
    Ok(dyn_img.to_rgba8())
}

/// Renders the print-ready raster: the template frame's rendered area plus
/// the bleed margin, filled with the case color, with the artwork drawn at
/// its on-screen placement size shifted by the margin. The draw resolution
/// deliberately equals the on-screen rendered resolution.
pub fn render(job: &CompositeJob, source: &RgbaImage) -> CaseResult<RgbaImage> {
    let viewport = geometry::measured(job.viewport, "editor viewport")?;
    let template = geometry::measured(job.template, "template frame")?;

    let actual_offset = geometry::template_relative(job.placement.offset, viewport, template);

    let out_width = template.width().round() as u32 + 2 * CASE_BLEED_PX;
    let out_height = template.height().round() as u32 + 2 * CASE_BLEED_PX;
    let mut out = RgbaImage::from_pixel(out_width, out_height, Rgba(job.options.color.rgba()));

    let draw_width = job.placement.size.width.round().max(1.0) as u32;
    let draw_height = job.placement.size.height.round().max(1.0) as u32;
    let art = imageops::resize(source, draw_width, draw_height, imageops::FilterType::CatmullRom);

    // Placements partially outside the frame clip naturally against the
    // output bounds.
    let x = (actual_offset.x + f64::from(CASE_BLEED_PX)).round() as i64;
    let y = (actual_offset.y + f64::from(CASE_BLEED_PX)).round() as i64;
    imageops::overlay(&mut out, &art, x, y);

    Ok(out)
}

/// Encodes a raster as PNG. An empty buffer is a hard failure, never a
/// silently accepted export.
pub fn encode_png(raster: &RgbaImage) -> CaseResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(raster.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| CaseError::composite(format!("encode composite png: {e}")))?;
    if buf.is_empty() {
        return Err(CaseError::composite("png export produced an empty buffer"));
    }
    Ok(buf)
}

/// Render + export in one step.
pub fn compose(job: &CompositeJob, source: &RgbaImage) -> CaseResult<CompositeArtifact> {
    let raster = render(job, source)?;
    let (width, height) = raster.dimensions();
    let png = encode_png(&raster)?;
    Ok(CompositeArtifact { width, height, png })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CaseColor;
    use crate::geometry::{Point, Size};

    fn solid_source(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(rgba))
    }

    fn job(placement_offset: Point, placement_size: Size) -> CompositeJob {
        CompositeJob {
            placement: PlacementState {
                offset: placement_offset,
                size: placement_size,
            },
            viewport: Rect::new(0.0, 0.0, 640.0, 960.0),
            template: Rect::new(64.0, 96.0, 304.0, 586.0),
            options: ProductOptions::default(),
        }
    }

    #[test]
    fn output_is_template_size_plus_bleed_on_all_sides() {
        let source = solid_source(10, 10, [255, 0, 0, 255]);
        let raster = render(&job(Point::new(100.0, 150.0), Size::new(40.0, 40.0)), &source).unwrap();
        // template 240x490, +30 on each side
        assert_eq!(raster.dimensions(), (300, 550));
    }

    #[test]
    fn artwork_lands_at_template_relative_offset_plus_bleed() {
        let source = solid_source(10, 10, [255, 0, 0, 255]);
        // placement (170, 195) with frame at (64, 96): actual (106, 99)
        let raster = render(&job(Point::new(170.0, 195.0), Size::new(40.0, 40.0)), &source).unwrap();

        let inside = raster.get_pixel(106 + 30 + 5, 99 + 30 + 5);
        assert_eq!(inside.0, [255, 0, 0, 255]);

        // One pixel before the artwork's left edge is still case-colored.
        let outside = raster.get_pixel(106 + 30 - 1, 99 + 30 + 5);
        assert_eq!(outside.0, CaseColor::Black.rgba());
    }

    #[test]
    fn bleed_corners_carry_the_case_color() {
        let source = solid_source(10, 10, [255, 0, 0, 255]);
        let mut j = job(Point::new(100.0, 150.0), Size::new(40.0, 40.0));
        j.options.color = CaseColor::Rose;
        let raster = render(&j, &source).unwrap();
        assert_eq!(raster.get_pixel(0, 0).0, CaseColor::Rose.rgba());
        assert_eq!(raster.get_pixel(299, 549).0, CaseColor::Rose.rgba());
    }

    #[test]
    fn placement_outside_the_frame_clips_instead_of_failing() {
        let source = solid_source(10, 10, [0, 0, 255, 255]);
        // Dragged left of the frame: actual (-44, -16), draw pos (-14, 14),
        // so only the right part of the artwork survives.
        let raster = render(&job(Point::new(20.0, 80.0), Size::new(40.0, 40.0)), &source).unwrap();
        assert_eq!(raster.dimensions(), (300, 550));
        assert_eq!(raster.get_pixel(10, 20).0, [0, 0, 255, 255]);
        assert_eq!(raster.get_pixel(30, 20).0, CaseColor::Black.rgba());
    }

    #[test]
    fn unmeasured_template_is_a_geometry_error() {
        let source = solid_source(4, 4, [1, 2, 3, 255]);
        let mut j = job(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        j.template = Rect::new(64.0, 96.0, 64.0, 586.0); // zero width
        let err = render(&j, &source).unwrap_err();
        assert_eq!(err.kind(), "geometry");
    }

    #[test]
    fn decode_rejects_garbage_as_composite_error() {
        let err = decode_source(b"not an image").unwrap_err();
        assert_eq!(err.kind(), "composite");
    }

    #[test]
    fn encode_png_roundtrips_through_decode() {
        let raster = solid_source(8, 6, [9, 8, 7, 255]);
        let png = encode_png(&raster).unwrap();
        assert!(!png.is_empty());
        let back = decode_source(&png).unwrap();
        assert_eq!(back.dimensions(), (8, 6));
        assert_eq!(back.get_pixel(3, 3).0, [9, 8, 7, 255]);
    }

    #[test]
    fn compose_reports_output_dimensions() {
        let source = solid_source(10, 10, [255, 0, 0, 255]);
        let artifact = compose(&job(Point::new(100.0, 150.0), Size::new(40.0, 40.0)), &source)
            .unwrap();
        assert_eq!((artifact.width, artifact.height), (300, 550));
        assert!(!artifact.png.is_empty());
    }
}
