use serde::{Deserialize, Serialize};

use crate::{
    error::CaseResult,
    geometry::{self, Point, Size, Vec2},
    model::SourceImage,
};

/// Default top-left offset of a fresh placement, in editor-viewport pixels.
/// Chosen to land the artwork roughly centered inside the template frame.
pub const DEFAULT_OFFSET_X: f64 = 150.0;
pub const DEFAULT_OFFSET_Y: f64 = 205.0;

/// Floor on the rendered size so a resize can never invert the rectangle.
pub const MIN_RENDER_PX: f64 = 10.0;

/// The user-chosen position and size of the artwork, in editor-viewport
/// pixels. Ephemeral; discarded once the compositor produces a raster.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementState {
    pub offset: Point,
    pub size: Size,
}

impl PlacementState {
    pub fn rect(&self) -> geometry::Rect {
        geometry::Rect::from_origin_size(self.offset, self.size)
    }
}

/// Corner handles of the resize gesture. All four preserve the aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    fn grows_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    fn grows_up(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

/// Interactive placement of the uploaded artwork inside the template frame.
///
/// Offsets and sizes may move partially (or fully) outside the template; the
/// final crop only samples what lands inside the frame, so no bound clamping
/// is applied here.
#[derive(Clone, Debug)]
pub struct PlacementEditor {
    state: PlacementState,
    aspect: f64, // source width / height, locked for the whole session
}

impl PlacementEditor {
    /// Seeds the placement with the downscaled-to-ceiling size and the fixed
    /// default offset.
    pub fn new(source: &SourceImage) -> CaseResult<Self> {
        let dims = source.dims();
        Ok(Self {
            state: PlacementState {
                offset: Point::new(DEFAULT_OFFSET_X, DEFAULT_OFFSET_Y),
                size: geometry::initial_render_size(dims),
            },
            aspect: dims.aspect(),
        })
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn source_aspect(&self) -> f64 {
        self.aspect
    }

    /// Drag gesture: moves the placement, size untouched.
    pub fn drag_to(&mut self, offset: Point) {
        self.state.offset = offset;
    }

    pub fn drag_by(&mut self, delta: Vec2) {
        self.state.offset += delta;
    }

    /// Resize gesture from one corner handle. The dominant drag axis drives
    /// the new width and the height follows from the source aspect ratio, so
    /// the lock holds for every handle and direction. Left/top handles keep
    /// the opposite corner anchored by shifting the offset.
    pub fn resize(&mut self, handle: ResizeHandle, drag: Vec2) {
        let PlacementState { offset, size } = self.state;

        let dw = if handle.grows_left() { -drag.x } else { drag.x };
        let dh = if handle.grows_up() { -drag.y } else { drag.y };

        // Candidates expressed in width units; dh converts via the aspect.
        let from_width = size.width + dw;
        let from_height = (size.height + dh) * self.aspect;
        let new_width = if dw.abs() >= dh.abs() * self.aspect {
            from_width
        } else {
            from_height
        }
        .max(MIN_RENDER_PX);
        let new_height = new_width / self.aspect;

        let mut new_offset = offset;
        if handle.grows_left() {
            new_offset.x += size.width - new_width;
        }
        if handle.grows_up() {
            new_offset.y += size.height - new_height;
        }

        self.state = PlacementState {
            offset: new_offset,
            size: Size::new(new_width, new_height),
        };
    }
}
