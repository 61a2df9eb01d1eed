#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSize {
    width: usize,
    height: usize,
    spacing: f32,
}

impl GridSize {
    pub fn new(width: usize, height: usize, spacing: f32) -> Self {
        assert!(width > 0, "width must be > 0");
        assert!(height > 0, "height must be > 0");
        assert!(spacing > 0.0, "spacing must be > 0");
        Self {
            width,
            height,
            spacing,
        }
    }

    pub fn with_border(interior_width: usize, interior_height: usize, spacing: f32) -> Self {
        Self::new(interior_width + 2, interior_height + 2, spacing)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn extent(&self) -> (f32, f32) {
        (
            self.width as f32 * self.spacing,
            self.height as f32 * self.spacing,
        )
    }

    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.width && j < self.height);
        i * self.height + j
    }

    pub fn cell_center(&self, i: usize, j: usize) -> (f32, f32) {
        (
            (i as f32 + 0.5) * self.spacing,
            (j as f32 + 0.5) * self.spacing,
        )
    }
}
