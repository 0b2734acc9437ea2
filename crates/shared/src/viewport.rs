/// Pan offset and zoom scale of the map layer.
///
/// The layer is drawn at `screen = world * scale + offset`, which is what a CSS
/// `translate(offset) scale(scale)` with origin `0 0` produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewportTransform {
    pub fn to_world(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        (
            (screen_x - self.offset_x) / self.scale,
            (screen_y - self.offset_y) / self.scale,
        )
    }

    pub fn to_screen(&self, world_x: f64, world_y: f64) -> (f64, f64) {
        (
            world_x * self.scale + self.offset_x,
            world_y * self.scale + self.offset_y,
        )
    }

    pub fn css(&self) -> String {
        format!(
            "transform: translate({}px, {}px) scale({}); transform-origin: 0 0;",
            self.offset_x, self.offset_y, self.scale
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    /// Factor per mouse-wheel notch and per double-click.
    pub step_wheel: f64,
    /// Finer factor for trackpad pinch (wheel with ctrl held).
    pub step_pinch: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.6,
            max: 20.0,
            step_wheel: 1.2,
            step_pinch: 1.05,
        }
    }
}

impl ZoomConfig {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }

    /// Factor for one wheel event. Scrolling up (negative delta) zooms in.
    pub fn wheel_factor(&self, delta_y: f64, pinch: bool) -> f64 {
        let step = if pinch { self.step_pinch } else { self.step_wheel };
        if delta_y < 0.0 {
            step
        } else {
            1.0 / step
        }
    }
}

/// Fixed rectangle the pan offset is held inside. It does not depend on the
/// zoom level or the content size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for PanBounds {
    fn default() -> Self {
        Self {
            min_x: -200.0,
            max_x: 200.0,
            min_y: -200.0,
            max_y: 200.0,
        }
    }
}

impl PanBounds {
    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x.clamp(self.min_x, self.max_x),
            y.clamp(self.min_y, self.max_y),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportController {
    transform: ViewportTransform,
    zoom: ZoomConfig,
    bounds: PanBounds,
}

impl ViewportController {
    pub fn new(zoom: ZoomConfig, bounds: PanBounds) -> Self {
        Self {
            transform: ViewportTransform::default(),
            zoom,
            bounds,
        }
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn zoom_config(&self) -> &ZoomConfig {
        &self.zoom
    }

    /// Zoom by `factor` keeping the world point under `(screen_x, screen_y)`
    /// fixed on screen. Returns `true` if the scale changed.
    ///
    /// The offset is corrected from the anchor, not clamped to the pan bounds:
    /// clamping here would pull the anchor out from under the cursor.
    pub fn zoom_at_point(&mut self, screen_x: f64, screen_y: f64, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let old_scale = self.transform.scale;
        let new_scale = self.zoom.clamp(old_scale * factor);
        if (new_scale - old_scale).abs() < 1e-12 {
            return false;
        }

        let (world_x, world_y) = self.transform.to_world(screen_x, screen_y);
        self.transform.scale = new_scale;
        self.transform.offset_x = screen_x - world_x * new_scale;
        self.transform.offset_y = screen_y - world_y * new_scale;
        true
    }

    /// Shift the offset by `(dx, dy)`, clamped per axis to the pan bounds.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_to(self.transform.offset_x + dx, self.transform.offset_y + dy);
    }

    /// Set the offset, clamped per axis to the pan bounds.
    pub fn pan_to(&mut self, x: f64, y: f64) {
        let (x, y) = self.bounds.clamp(x, y);
        self.transform.offset_x = x;
        self.transform.offset_y = y;
    }

    pub fn reset(&mut self) {
        self.transform = ViewportTransform::default();
    }
}
