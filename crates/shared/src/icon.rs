//! Geometry of the building glyph drawn for each point of interest.
//!
//! Markers live inside the map layer, which the pan/zoom transform scales.
//! Every glyph dimension is pre-divided by the current zoom so the scaling
//! cancels out and the glyph keeps a constant size on screen.

/// Glyph size in screen pixels.
pub const ICON_BASE: f64 = 18.0;

/// Outline width in screen pixels.
pub const STROKE_BASE: f64 = 2.0;

pub const LINE_COLOR: u32 = 0x333333;
pub const BODY_COLOR: u32 = 0xffffff;
pub const BODY_HOVER_COLOR: u32 = 0xffff99;
pub const ROOF_HOVER_COLOR: u32 = 0xffe066;
pub const COLUMN_COLOR: u32 = 0xdddddd;
pub const DOOR_COLOR: u32 = 0x666666;
pub const SHADOW_ALPHA: f64 = 0.08;

/// Size in layer units that renders as `base` screen pixels at `zoom`.
pub fn screen_size(base: f64, zoom: f64) -> f64 {
    base / zoom.max(0.0001)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
}

/// Glyph parts in coordinates local to the anchor point, which sits at the
/// bottom centre of the body. Negative y is up.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingGlyph {
    pub stroke: f64,
    pub roof: [(f64, f64); 3],
    pub body: Rect,
    pub columns: [Rect; 3],
    pub door: Rect,
    pub crest: Circle,
    pub shadow: Ellipse,
    pub roof_color: u32,
    pub body_color: u32,
    pub crest_color: u32,
}

impl BuildingGlyph {
    /// Glyph for a point of `color`, sized for the current `zoom`. Hover only
    /// changes the palette.
    pub fn new(color: u32, zoom: f64, hover: bool) -> Self {
        let s = screen_size(ICON_BASE, zoom);
        let stroke = screen_size(STROKE_BASE, zoom);

        let roof_h = 0.45 * s;
        let body_h = 0.75 * s;
        let body_w = 1.05 * s;
        let col_w = 0.1 * s;
        let door_w = 0.22 * s;
        let door_h = 0.35 * s;

        let roof = [
            (0.0, -(roof_h + body_h)),
            (-body_w * 0.58, -body_h),
            (body_w * 0.58, -body_h),
        ];
        let body = Rect {
            x: -body_w / 2.0,
            y: -body_h,
            w: body_w,
            h: body_h,
        };

        let col_gap = (body_w - 4.0 * col_w) / 4.0;
        let col_y = -body_h + stroke;
        let col_h = body_h - door_h - stroke * 2.0;
        let column = |i: usize| Rect {
            x: -body_w / 2.0 + col_gap + i as f64 * (col_w + col_gap) + col_w * 0.5,
            y: col_y,
            w: col_w,
            h: col_h,
        };

        Self {
            stroke,
            roof,
            body,
            columns: [column(0), column(1), column(2)],
            door: Rect {
                x: -door_w / 2.0,
                y: -door_h,
                w: door_w,
                h: door_h,
            },
            crest: Circle {
                cx: 0.0,
                cy: -body_h - roof_h * 0.5,
                r: 0.12 * s,
            },
            shadow: Ellipse {
                cx: 0.0,
                cy: stroke,
                rx: body_w * 0.6,
                ry: stroke * 2.5,
            },
            roof_color: if hover { ROOF_HOVER_COLOR } else { color },
            body_color: if hover { BODY_HOVER_COLOR } else { BODY_COLOR },
            crest_color: color,
        }
    }

    /// Local-space box around the roof apex, body and shadow.
    pub fn extent(&self) -> Rect {
        let half_w = self.roof[2].0.max(self.shadow.rx);
        let top = self.roof[0].1;
        let bottom = self.shadow.cy + self.shadow.ry;
        Rect {
            x: -half_w,
            y: top,
            w: half_w * 2.0,
            h: bottom - top,
        }
    }
}
