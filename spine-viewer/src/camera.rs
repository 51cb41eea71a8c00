/// Axis-aligned rectangle in skeleton world units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub offset: [f32; 2],
    pub size: [f32; 2],
}

impl Bounds {
    pub fn from_min_max(min: [f32; 2], max: [f32; 2]) -> Self {
        Self {
            offset: min,
            size: [max[0] - min[0], max[1] - min[1]],
        }
    }

    /// Bounds of a set of points, `None` when empty or non-finite.
    pub fn from_points(points: impl IntoIterator<Item = [f32; 2]>) -> Option<Self> {
        let mut min = [f32::INFINITY; 2];
        let mut max = [f32::NEG_INFINITY; 2];
        for p in points {
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
        }
        if min.iter().chain(max.iter()).all(|v| v.is_finite()) {
            Some(Self::from_min_max(min, max))
        } else {
            None
        }
    }

    pub fn center(&self) -> [f32; 2] {
        [
            self.offset[0] + self.size[0] / 2.0,
            self.offset[1] + self.size[1] / 2.0,
        ]
    }

    pub fn long_side(&self) -> f32 {
        self.size[0].max(self.size[1])
    }
}

/// Pixel size of a render surface.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Orthographic 2D camera. `zoom` is world units per pixel: smaller zooms in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub center: [f32; 2],
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Centers on `bounds` and zooms so the content fills `padding` of the constraining axis.
    ///
    /// A viewport relatively wider than the content is constrained by content height, otherwise
    /// by content width.
    pub fn fit(bounds: Bounds, viewport: SurfaceSize, padding: f32) -> Self {
        let vw = viewport.width.max(1) as f32;
        let vh = viewport.height.max(1) as f32;
        let cw = bounds.size[0].abs().max(1.0e-3);
        let ch = bounds.size[1].abs().max(1.0e-3);
        let padding = if padding > 0.0 { padding } else { 1.0 };

        let zoom = if vw / vh > cw / ch {
            (ch / vh) / padding
        } else {
            (cw / vw) / padding
        };

        Self {
            center: bounds.center(),
            zoom,
        }
    }

    /// Column-major clip-space matrix for a `viewport`-sized target.
    pub fn clip_from_world(&self, viewport: SurfaceSize) -> [[f32; 4]; 4] {
        let vw = viewport.width.max(1) as f32;
        let vh = viewport.height.max(1) as f32;
        let zoom = self.zoom.max(f32::MIN_POSITIVE);

        let sx = 2.0 / (vw * zoom);
        let sy = 2.0 / (vh * zoom);
        let [cx, cy] = self.center;

        [
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [-cx * sx, -cy * sy, 0.0, 1.0],
        ]
    }
}
