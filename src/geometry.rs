use crate::error::{CaseError, CaseResult};

pub use kurbo::{Point, Rect, Size, Vec2};

/// On-screen ceiling for the initial rendered size of an upload, in editor
/// pixels. Larger sources are halved until they fit.
pub const RENDER_CEILING_PX: f64 = 320.0;

/// Native pixel grid of an uploaded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelDims {
    pub width: u32,
    pub height: u32,
}

impl PixelDims {
    pub fn new(width: u32, height: u32) -> CaseResult<Self> {
        if width == 0 || height == 0 {
            return Err(CaseError::input("source image has zero-size dimensions"));
        }
        Ok(Self { width, height })
    }

    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn to_size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Initial rendered size for a source image: repeated exact halving until both
/// dimensions fit [`RENDER_CEILING_PX`]. Power-of-two reduction keeps the
/// aspect ratio exact and the result bit-identical across runs.
pub fn initial_render_size(source: PixelDims) -> Size {
    let mut width = f64::from(source.width);
    let mut height = f64::from(source.height);
    while width > RENDER_CEILING_PX || height > RENDER_CEILING_PX {
        width /= 2.0;
        height /= 2.0;
    }
    Size::new(width, height)
}

/// Re-expresses a viewport-relative point relative to the template frame's own
/// origin. The draggable layer reports coordinates against the viewport, but
/// the crop is computed against the product template, which sits inside the
/// viewport with padding.
pub fn template_relative(offset: Point, viewport: Rect, template: Rect) -> Point {
    Point::new(
        offset.x - (template.x0 - viewport.x0),
        offset.y - (template.y0 - viewport.y0),
    )
}

/// Maps a rectangle at on-screen rendered scale into the source image's native
/// pixel grid, using the `source / rendered` ratio independently per axis.
pub fn scale_to_source(rect: Rect, rendered: Size, source: PixelDims) -> CaseResult<Rect> {
    if rendered.width <= 0.0 || rendered.height <= 0.0 {
        return Err(CaseError::geometry(
            "rendered size must be positive to scale into source pixels",
        ));
    }
    let rx = f64::from(source.width) / rendered.width;
    let ry = f64::from(source.height) / rendered.height;
    Ok(Rect::new(
        rect.x0 * rx,
        rect.y0 * ry,
        rect.x1 * rx,
        rect.y1 * ry,
    ))
}

/// Validates a runtime-measured bounding rectangle. Layout that has not
/// settled yields zero-size or non-finite rects; those must abort the caller
/// rather than silently substituting a default.
pub fn measured(rect: Rect, region: &str) -> CaseResult<Rect> {
    let finite =
        rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite();
    if !finite || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return Err(CaseError::geometry(format!(
            "{region} is not measurable yet (got {rect:?})"
        )));
    }
    Ok(rect)
}
