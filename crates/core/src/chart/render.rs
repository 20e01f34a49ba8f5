use crate::chart::history::PricePoint;
use image::{Rgb, RgbImage};

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 700;
const MARGIN: u32 = 40;

const BACKGROUND: Rgb<u8> = Rgb([24, 26, 32]);
const AXIS: Rgb<u8> = Rgb([110, 110, 120]);
const GRID: Rgb<u8> = Rgb([44, 47, 56]);
const CLOSE: Rgb<u8> = Rgb([0, 255, 255]);
const OPEN: Rgb<u8> = Rgb([255, 0, 255]);

const GRID_LINES: u32 = 5;
const DASH: u32 = 6;

/// Draws close (solid) and open (dashed) price lines over a shared y-scale.
pub fn draw_history(points: &[PricePoint]) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    draw_frame(&mut img);

    if points.is_empty() {
        return img;
    }

    let (lo, hi) = points
        .iter()
        .flat_map(|p| [p.open, p.close])
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return img;
    }

    let scale = Scale {
        n: points.len(),
        lo,
        hi,
    };
    draw_series(&mut img, &scale, points.iter().map(|p| p.open), OPEN, true);
    draw_series(&mut img, &scale, points.iter().map(|p| p.close), CLOSE, false);
    img
}

struct Scale {
    n: usize,
    lo: f64,
    hi: f64,
}

impl Scale {
    fn x(&self, idx: usize) -> i64 {
        let span = (WIDTH - 2 * MARGIN) as f64;
        if self.n < 2 {
            return (MARGIN as f64 + span / 2.0) as i64;
        }
        (MARGIN as f64 + span * idx as f64 / (self.n - 1) as f64).round() as i64
    }

    fn y(&self, v: f64) -> i64 {
        let span = (HEIGHT - 2 * MARGIN) as f64;
        let frac = if self.hi > self.lo {
            (v - self.lo) / (self.hi - self.lo)
        } else {
            0.5
        };
        ((HEIGHT - MARGIN) as f64 - frac * span).round() as i64
    }
}

fn draw_frame(img: &mut RgbImage) {
    let (left, right) = (MARGIN as i64, (WIDTH - MARGIN) as i64);
    let (top, bottom) = (MARGIN as i64, (HEIGHT - MARGIN) as i64);

    for i in 1..GRID_LINES {
        let y = top + (bottom - top) * i as i64 / GRID_LINES as i64;
        line(img, (left, y), (right, y), GRID, false, &mut 0);
    }
    line(img, (left, bottom), (right, bottom), AXIS, false, &mut 0);
    line(img, (left, top), (left, bottom), AXIS, false, &mut 0);
}

fn draw_series(
    img: &mut RgbImage,
    scale: &Scale,
    values: impl Iterator<Item = f64>,
    color: Rgb<u8>,
    dashed: bool,
) {
    let mut prev: Option<(i64, i64)> = None;
    let mut step = 0u32;
    for (idx, v) in values.enumerate() {
        if !v.is_finite() {
            prev = None;
            continue;
        }
        let pt = (scale.x(idx), scale.y(v));
        match prev {
            Some(p) => line(img, p, pt, color, dashed, &mut step),
            None => plot(img, pt.0, pt.1, color),
        }
        prev = Some(pt);
    }
}

// Bresenham; `step` carries the dash phase across segments.
fn line(
    img: &mut RgbImage,
    (mut x0, mut y0): (i64, i64),
    (x1, y1): (i64, i64),
    color: Rgb<u8>,
    dashed: bool,
    step: &mut u32,
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if !dashed || (*step / DASH) % 2 == 0 {
            plot(img, x0, y0, color);
        }
        *step = step.wrapping_add(1);

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn plot(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}
