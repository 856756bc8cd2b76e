//! Tray icon bitmaps
//!
//! A round white badge with a green up-triangle in checksum mode, a red
//! down-triangle in lowercase mode, and a black question glyph while paused.

use image::{Rgba, RgbaImage};

use crate::address::NormalizationMode;

pub const ICON_SIZE: u32 = 64;

const BADGE: [u8; 3] = [255, 255, 255];
const BADGE_ALPHA: u32 = 220;
const GREEN: [u8; 3] = [0, 128, 0];
const RED: [u8; 3] = [255, 0, 0];
const BLACK: [u8; 3] = [0, 0, 0];

type Point = (f32, f32);

fn in_ellipse((x, y): Point, left: f32, top: f32, right: f32, bottom: f32) -> bool {
    let (cx, cy) = ((left + right) / 2.0, (top + bottom) / 2.0);
    let (rx, ry) = ((right - left) / 2.0, (bottom - top) / 2.0);
    let dx = (x - cx) / rx;
    let dy = (y - cy) / ry;
    dx * dx + dy * dy <= 1.0
}

fn in_rect((x, y): Point, left: f32, top: f32, right: f32, bottom: f32) -> bool {
    x >= left && x <= right && y >= top && y <= bottom
}

fn in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let side = |p1: Point, p2: Point| (p.0 - p2.0) * (p1.1 - p2.1) - (p1.0 - p2.0) * (p.1 - p2.1);
    let d1 = side(a, b);
    let d2 = side(b, c);
    let d3 = side(c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Glyph color at `p`, if any
fn glyph(p: Point, mode: NormalizationMode, enabled: bool) -> Option<[u8; 3]> {
    if enabled {
        return match mode {
            NormalizationMode::Checksum => {
                in_triangle(p, (32.0, 20.0), (22.0, 44.0), (42.0, 44.0)).then_some(GREEN)
            }
            NormalizationMode::Lowercase => {
                in_triangle(p, (22.0, 20.0), (42.0, 20.0), (32.0, 44.0)).then_some(RED)
            }
        };
    }

    // Hook, stem and dot of the paused glyph
    let ring = in_ellipse(p, 20.0, 18.0, 44.0, 35.0) && !in_ellipse(p, 22.0, 20.0, 42.0, 33.0);
    let stem = in_rect(p, 30.0, 28.0, 34.0, 40.0);
    let dot = in_ellipse(p, 30.0, 42.0, 34.0, 46.0);
    (ring || stem || dot).then_some(BLACK)
}

/// Render the tray bitmap for a mode and monitoring state
pub fn render(mode: NormalizationMode, enabled: bool) -> RgbaImage {
    let opacity: u32 = if enabled { 255 } else { 200 };
    let size = ICON_SIZE as f32;

    RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let p = (x as f32 + 0.5, y as f32 + 0.5);
        if !in_ellipse(p, 0.0, 0.0, size, size) {
            return Rgba([0, 0, 0, 0]);
        }
        match glyph(p, mode, enabled) {
            Some([r, g, b]) => Rgba([r, g, b, opacity as u8]),
            None => {
                let [r, g, b] = BADGE;
                Rgba([r, g, b, (BADGE_ALPHA * opacity / 255) as u8])
            }
        }
    })
}
