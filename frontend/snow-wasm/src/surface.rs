//! Drawable surface abstraction and a software RGBA rasterizer.
//!
//! The engine only needs the small slice of a 2-D context that a canvas
//! exposes: clearing, radially faded disks and filling a path with a
//! vertical gradient. [`PixelCanvas`] implements that slice on a plain byte
//! buffer so the wasm host can blit it straight into an `ImageData`.

use crate::constants::CURVE_SUBDIVISIONS;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    /// Straight (non-premultiplied) RGBA in `0.0..=1.0`.
    pub rgba: [f32; 4],
}

impl ColorStop {
    pub const fn new(offset: f32, rgba: [f32; 4]) -> Self {
        Self { offset, rgba }
    }
}

/// Samples a sorted stop list at `t`, clamping outside the first and last stop.
pub fn sample_stops(stops: &[ColorStop], t: f32) -> [f32; 4] {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return [0.0; 4],
    };
    if t <= first.offset {
        return first.rgba;
    }
    if t >= last.offset {
        return last.rgba;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let f = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return std::array::from_fn(|i| a.rgba[i] + (b.rgba[i] - a.rgba[i]) * f);
        }
    }
    last.rgba
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub y0: f32,
    pub y1: f32,
    pub stops: Vec<ColorStop>,
}

impl LinearGradient {
    pub fn vertical(y0: f32, y1: f32, stops: Vec<ColorStop>) -> Self {
        Self { y0, y1, stops }
    }

    pub fn color_at(&self, y: f32) -> [f32; 4] {
        let span = self.y1 - self.y0;
        let t = if span.abs() > f32::EPSILON {
            ((y - self.y0) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        sample_stops(&self.stops, t)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadTo { cx: f32, cy: f32, x: f32, y: f32 },
    Close,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::MoveTo(x, y));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::LineTo(x, y));
    }

    pub fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.commands.push(PathCommand::QuadTo { cx, cy, x, y });
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Flattens every subpath into a closed polygon.
    pub fn flatten(&self) -> Vec<Vec<(f32, f32)>> {
        let mut polygons = Vec::new();
        let mut current: Vec<(f32, f32)> = Vec::new();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(x, y) => {
                    if current.len() > 1 {
                        polygons.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push((x, y));
                }
                PathCommand::LineTo(x, y) => current.push((x, y)),
                PathCommand::QuadTo { cx, cy, x, y } => {
                    let (sx, sy) = current.last().copied().unwrap_or((cx, cy));
                    for step in 1..=CURVE_SUBDIVISIONS {
                        let t = step as f32 / CURVE_SUBDIVISIONS as f32;
                        let mt = 1.0 - t;
                        current.push((
                            mt * mt * sx + 2.0 * mt * t * cx + t * t * x,
                            mt * mt * sy + 2.0 * mt * t * cy + t * t * y,
                        ));
                    }
                }
                PathCommand::Close => {
                    if current.len() > 1 {
                        let start = current[0];
                        polygons.push(std::mem::take(&mut current));
                        current.push(start);
                    }
                }
            }
        }
        if current.len() > 1 {
            polygons.push(current);
        }
        polygons
    }
}

pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Changes the pixel dimensions. Like a canvas element, this wipes the contents.
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self);
    fn fill_radial(&mut self, cx: f32, cy: f32, radius: f32, stops: &[ColorStop]);
    fn fill_path(&mut self, path: &Path, gradient: &LinearGradient);
}

#[derive(Clone, Debug)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    fn blend(&mut self, x: usize, y: usize, src: [f32; 4]) {
        let sa = src[3].clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let i = (y * self.width as usize + x) * 4;
        let dst = &mut self.pixels[i..i + 4];
        let da = f32::from(dst[3]) / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let dc = f32::from(dst[c]) / 255.0;
            let oc = (src[c] * sa + dc * da * (1.0 - sa)) / out_a;
            dst[c] = to_byte(oc);
        }
        dst[3] = to_byte(out_a);
    }

    fn span_rows(&self, min_y: f32, max_y: f32) -> std::ops::Range<usize> {
        let h = self.height as f32;
        let start = min_y.floor().clamp(0.0, h) as usize;
        let end = max_y.ceil().clamp(0.0, h) as usize;
        start..end
    }

    fn span_cols(&self, min_x: f32, max_x: f32) -> std::ops::Range<usize> {
        let w = self.width as f32;
        let start = min_x.floor().clamp(0.0, w) as usize;
        let end = max_x.ceil().clamp(0.0, w) as usize;
        start..end
    }
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Canvas for PixelCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 4, 0);
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn fill_radial(&mut self, cx: f32, cy: f32, radius: f32, stops: &[ColorStop]) {
        if radius <= 0.0 {
            return;
        }
        let rows = self.span_rows(cy - radius, cy + radius);
        let cols = self.span_cols(cx - radius, cx + radius);
        for py in rows {
            let dy = py as f32 + 0.5 - cy;
            for px in cols.clone() {
                let dx = px as f32 + 0.5 - cx;
                let distance = (dx * dx + dy * dy).sqrt();
                if distance > radius {
                    continue;
                }
                self.blend(px, py, sample_stops(stops, distance / radius));
            }
        }
    }

    fn fill_path(&mut self, path: &Path, gradient: &LinearGradient) {
        let polygons = path.flatten();
        let (min_y, max_y) = polygons
            .iter()
            .flatten()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &(_, y)| {
                (lo.min(y), hi.max(y))
            });
        if min_y >= max_y {
            return;
        }

        let mut crossings: Vec<f32> = Vec::new();
        for py in self.span_rows(min_y, max_y) {
            let sy = py as f32 + 0.5;
            crossings.clear();
            for polygon in &polygons {
                for (i, &(ax, ay)) in polygon.iter().enumerate() {
                    let (bx, by) = polygon[(i + 1) % polygon.len()];
                    if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                        crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
                    }
                }
            }
            crossings.sort_by(f32::total_cmp);

            let color = gradient.color_at(sy);
            let w = self.width as f32;
            for pair in crossings.chunks_exact(2) {
                // Pixel centres inside [pair[0], pair[1]).
                let start = (pair[0] - 0.5).ceil().clamp(0.0, w) as usize;
                let end = (pair[1] - 0.5).ceil().clamp(0.0, w) as usize;
                for px in start..end {
                    self.blend(px, py, color);
                }
            }
        }
    }
}
