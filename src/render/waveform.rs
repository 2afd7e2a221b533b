//! Waveform geometry for the envelope canvas.
//!
//! [`Renderer`] turns a snapshot of the visualization buffer into canvas
//! coordinates (origin top-left, y growing downwards).  It holds only the
//! canvas size and scale, so the UI can call it on every repaint.
//!
//! # Example
//!
//! ```rust
//! use audio_recorder::render::Renderer;
//!
//! let renderer = Renderer::new(300.0, 100.0);
//! let path = renderer.render(&[0.0, 0.5, 0.25]);
//!
//! // Centre-line anchor plus one vertex per point.
//! assert_eq!(path.len(), 4);
//! assert_eq!(path.points[2].x, 150.0);
//! assert_eq!(path.points[2].y, 25.0); // 50 - 0.5 * 100 * 0.5
//! ```

/// Default vertical scale: full-scale input spans half the canvas height.
pub const DEFAULT_AMPLITUDE_SCALE: f32 = 0.5;

/// A canvas coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A connected polyline.  Empty when there is nothing to draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveformPath {
    pub points: Vec<Point>,
}

impl WaveformPath {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// An axis-aligned bar, mirrored around the centre line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Maps envelope points onto a `width × height` canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderer {
    pub width: f32,
    pub height: f32,
    /// A point `p` is drawn `p * height * amplitude_scale` from the centre.
    pub amplitude_scale: f32,
}

impl Renderer {
    /// Renderer with [`DEFAULT_AMPLITUDE_SCALE`].
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_scale(width, height, DEFAULT_AMPLITUDE_SCALE)
    }

    pub fn with_scale(width: f32, height: f32, amplitude_scale: f32) -> Self {
        Self {
            width,
            height,
            amplitude_scale,
        }
    }

    fn amplitude(&self, point: f32) -> f32 {
        point * self.height * self.amplitude_scale
    }

    /// Polyline from `(0, H/2)` through `(i * W / (N - 1), H/2 - a_i)`.
    ///
    /// Fewer than two points give an empty path.
    pub fn render(&self, points: &[f32]) -> WaveformPath {
        if points.len() < 2 {
            return WaveformPath::default();
        }

        let mid_y = self.height / 2.0;
        let step = self.width / (points.len() - 1) as f32;

        let mut path = Vec::with_capacity(points.len() + 1);
        path.push(Point { x: 0.0, y: mid_y });
        path.extend(points.iter().enumerate().map(|(i, &p)| Point {
            x: i as f32 * step,
            y: mid_y - self.amplitude(p),
        }));

        WaveformPath { points: path }
    }

    /// One bar per point, each `W / N` wide and spanning `H/2 ± a_i`.
    pub fn render_bars(&self, points: &[f32]) -> Vec<Bar> {
        if points.is_empty() {
            return Vec::new();
        }

        let mid_y = self.height / 2.0;
        let step = self.width / points.len() as f32;

        points
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let amplitude = self.amplitude(p);
                let left = i as f32 * step;
                Bar {
                    left,
                    top: mid_y - amplitude,
                    right: left + step,
                    bottom: mid_y + amplitude,
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
