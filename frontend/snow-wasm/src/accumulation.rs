//! Ground accumulation: a 1-D height map of settled snow.

use crate::constants::*;
use crate::surface::{Canvas, ColorStop, LinearGradient, Path};

#[derive(Clone, Debug)]
pub struct AccumulationField {
    heights: Vec<f32>,
    segment_width: f32,
    max_height: f32,
}

impl AccumulationField {
    pub fn new(width: f32, segment_width: f32, max_height: f32) -> Self {
        let mut field = Self {
            heights: Vec::new(),
            segment_width: segment_width.max(f32::EPSILON),
            max_height,
        };
        field.reset(width);
        field
    }

    /// Drops all settled snow and re-segments for a surface of `width`.
    pub fn reset(&mut self, width: f32) {
        let segments = if width > 0.0 {
            (width / self.segment_width).ceil() as usize
        } else {
            0
        };
        self.heights.clear();
        self.heights.resize(segments, 0.0);
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn segment_width(&self) -> f32 {
        self.segment_width
    }

    pub fn segment_of(&self, x: f32) -> Option<usize> {
        let index = (x / self.segment_width).floor();
        if index >= 0.0 && (index as usize) < self.heights.len() {
            Some(index as usize)
        } else {
            None
        }
    }

    pub fn height_at(&self, x: f32) -> f32 {
        self.segment_of(x).map_or(0.0, |i| self.heights[i])
    }

    /// Spreads `amount` over the segment under `x` and two neighbours on each
    /// side, weighted `1 - |offset| * 0.3`. Heights never decrease here.
    pub fn deposit(&mut self, x: f32, amount: f32) {
        if amount.is_nan() || amount <= 0.0 || !x.is_finite() {
            return;
        }
        let centre = (x / self.segment_width).floor() as i64;
        let len = self.heights.len() as i64;
        for offset in -DEPOSIT_SPREAD..=DEPOSIT_SPREAD {
            let index = centre + offset;
            if index < 0 || index >= len {
                continue;
            }
            let falloff = 1.0 - offset.abs() as f32 * DEPOSIT_FALLOFF;
            let height = &mut self.heights[index as usize];
            *height = (*height + amount * falloff).min(self.max_height).max(*height);
        }
    }

    /// Builds the pile silhouette. Each sample bends toward the midpoint of
    /// itself and its predecessor, using the predecessor as control point.
    pub fn outline(&self, surface_width: f32, surface_height: f32) -> Path {
        let mut path = Path::new();
        path.move_to(0.0, surface_height);
        for (i, &height) in self.heights.iter().enumerate() {
            let x = i as f32 * self.segment_width;
            let y = surface_height - height;
            if i == 0 {
                path.line_to(x, y);
            } else {
                let prev_x = (i - 1) as f32 * self.segment_width;
                let prev_y = surface_height - self.heights[i - 1];
                path.quad_to(prev_x, prev_y, (prev_x + x) / 2.0, (prev_y + y) / 2.0);
            }
        }
        path.line_to(surface_width, surface_height);
        path.close();
        path
    }

    pub fn gradient(&self, surface_height: f32) -> LinearGradient {
        LinearGradient::vertical(
            surface_height - self.max_height,
            surface_height,
            vec![
                ColorStop::new(0.0, PILE_TOP_RGBA),
                ColorStop::new(PILE_MID_STOP, PILE_MID_RGBA),
                ColorStop::new(1.0, PILE_BASE_RGBA),
            ],
        )
    }

    pub fn render<C: Canvas>(&self, canvas: &mut C) {
        if self.heights.is_empty() {
            return;
        }
        let (width, height) = (canvas.width() as f32, canvas.height() as f32);
        let path = self.outline(width, height);
        canvas.fill_path(&path, &self.gradient(height));
    }
}
