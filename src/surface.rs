use std::io::Cursor;

use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use rayon::prelude::*;

use crate::config::MAX_DPR;
use crate::error::Error;

/// Row-major RGBA raster addressed in CSS pixels.
///
/// Drawing calls take CSS coordinates and scale them by the device pixel
/// ratio into the physical buffer. A zero-sized surface accepts every call
/// and draws nothing.
#[derive(Clone, Debug)]
pub struct Surface {
    pub data: Vec<u8>,
    /// Physical width in pixels.
    pub w: usize,
    /// Physical height in pixels.
    pub h: usize,
    css_w: u32,
    css_h: u32,
    dpr: f64,
}

/// Cap the ratio at 2x; anything non-positive or NaN counts as 1x.
pub fn effective_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 { dpr.min(MAX_DPR) } else { 1.0 }
}

impl Surface {
    pub fn new(css_w: u32, css_h: u32, dpr: f64) -> Self {
        let mut s = Self {
            data: Vec::new(),
            w: 0,
            h: 0,
            css_w: 0,
            css_h: 0,
            dpr: 1.0,
        };
        s.resize(css_w, css_h, dpr);
        s
    }

    /// Re-derive the physical size. Contents are discarded.
    pub fn resize(&mut self, css_w: u32, css_h: u32, dpr: f64) {
        self.dpr = effective_dpr(dpr);
        self.css_w = css_w;
        self.css_h = css_h;
        self.w = (css_w as f64 * self.dpr).floor() as usize;
        self.h = (css_h as f64 * self.dpr).floor() as usize;
        self.data = vec![0u8; self.w * self.h * 4];
    }

    pub fn css_width(&self) -> u32 {
        self.css_w
    }

    pub fn css_height(&self) -> u32 {
        self.css_h
    }

    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        (y * self.w + x) * 4
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [u8; 4] {
        let i = self.idx(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Physical-pixel write; out-of-bounds is ignored.
    #[inline]
    pub fn put(&mut self, x: i64, y: i64, color: [u8; 4]) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return;
        }
        let i = self.idx(x as usize, y as usize);
        self.data[i..i + 4].copy_from_slice(&color);
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        if self.is_empty() {
            return;
        }
        self.data.par_chunks_mut(4).for_each(|px| px.copy_from_slice(&color));
    }

    /// Fill whole physical rows/columns sitting on the given CSS lines.
    /// Used for the reference grid, where each line is one CSS pixel wide.
    pub fn hairlines(&mut self, xs: &[f64], ys: &[f64], color: [u8; 4]) {
        if self.is_empty() {
            return;
        }
        let (w, h) = (self.w, self.h);
        let dpr = self.dpr;
        let thick = (dpr.round() as usize).max(1);
        let spread = |vs: &[f64], limit: usize| -> Vec<usize> {
            vs.iter()
                .map(|v| (v * dpr).round() as usize)
                .flat_map(|start| start..start + thick)
                .filter(|&p| p < limit)
                .collect()
        };
        let cols = spread(xs, w);
        let rows = spread(ys, h);

        self.data
            .par_chunks_mut(w * 4)
            .enumerate()
            .for_each(|(y, row)| {
                if rows.contains(&y) {
                    for px in row.chunks_mut(4) {
                        px.copy_from_slice(&color);
                    }
                } else {
                    for &x in &cols {
                        row[x * 4..x * 4 + 4].copy_from_slice(&color);
                    }
                }
            });
    }

    /// Filled disc centred at a CSS point.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: [u8; 4]) {
        if self.is_empty() {
            return;
        }
        let (px, py, r) = (cx * self.dpr, cy * self.dpr, radius * self.dpr);
        let r2 = r * r;
        for y in (py - r).floor() as i64..=(py + r).ceil() as i64 {
            for x in (px - r).floor() as i64..=(px + r).ceil() as i64 {
                let dx = x as f64 + 0.5 - px;
                let dy = y as f64 + 0.5 - py;
                if dx * dx + dy * dy <= r2 {
                    self.put(x, y, color);
                }
            }
        }
    }

    /// Straight segment between CSS points with the given CSS line width.
    pub fn line(&mut self, a: (f64, f64), b: (f64, f64), width: f64, color: [u8; 4]) {
        if self.is_empty() {
            return;
        }
        let half = (width * self.dpr / 2.0).max(0.5);
        let lo = (-half, -half);
        let hi = (self.w as f64 + half, self.h as f64 + half);
        let a = (a.0 * self.dpr, a.1 * self.dpr);
        let b = (b.0 * self.dpr, b.1 * self.dpr);
        // Only the visible part is stepped, so cost tracks the surface size.
        let Some(((x0, y0), (x1, y1))) = clip_segment(a, b, lo, hi) else {
            return;
        };
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            self.stamp(x, y, half, color);
        }
    }

    fn stamp(&mut self, x: f64, y: f64, half: f64, color: [u8; 4]) {
        if half <= 0.5 {
            self.put(x.floor() as i64, y.floor() as i64, color);
            return;
        }
        let lo_x = (x - half).floor() as i64;
        let hi_x = (x + half).ceil() as i64 - 1;
        let lo_y = (y - half).floor() as i64;
        let hi_y = (y + half).ceil() as i64 - 1;
        for yy in lo_y..=hi_y {
            for xx in lo_x..=hi_x {
                self.put(xx, yy, color);
            }
        }
    }

    /// Horizontal dashed line in CSS space: `on` pixels drawn, `off` skipped.
    pub fn dashed_hline(&mut self, y: f64, on: f64, off: f64, width: f64, color: [u8; 4]) {
        let end = self.css_w as f64;
        let mut x = 0.0;
        while x < end && on > 0.0 {
            let stop = (x + on).min(end);
            self.line((x, y), (stop, y), width, color);
            x += on + off;
        }
    }

    /// Connect consecutive CSS points into one path.
    pub fn polyline(&mut self, points: &[(f64, f64)], width: f64, color: [u8; 4]) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width, color);
        }
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Cursor::new(Vec::new());
        PngEncoder::new(&mut buf).write_image(
            &self.data,
            self.w as u32,
            self.h as u32,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(buf.into_inner())
    }
}

/// Liang-Barsky clip of segment `a`-`b` to the box `lo`..`hi`.
/// `None` when nothing is inside or a coordinate is not finite.
///
/// A clipped end is pinned to the boundary it was cut at, so segments far
/// larger than the box keep their visible part intact.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    lo: (f64, f64),
    hi: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    if !(a.0.is_finite() && a.1.is_finite() && dx.is_finite() && dy.is_finite()) {
        return None;
    }
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let (mut start, mut end) = (a, b);
    // (p, q, boundary value, boundary is vertical)
    for (p, q, edge, vertical) in [
        (-dx, a.0 - lo.0, lo.0, true),
        (dx, hi.0 - a.0, hi.0, true),
        (-dy, a.1 - lo.1, lo.1, false),
        (dy, hi.1 - a.1, hi.1, false),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        let at = |r: f64| {
            if vertical {
                (edge, a.1 + r * dy)
            } else {
                (a.0 + r * dx, edge)
            }
        };
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            if r > t0 {
                t0 = r;
                start = at(r);
            }
        } else {
            if r < t0 {
                return None;
            }
            if r < t1 {
                t1 = r;
                end = at(r);
            }
        }
    }
    Some((start, end))
}

/// Inline PNG bytes as a `data:` URL for the browser.
pub fn png_data_url(png: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(png);
    format!("data:image/png;base64,{}", b64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];

    #[test]
    fn dpr_is_capped_at_two() {
        let s = Surface::new(100, 50, 3.0);
        assert_eq!((s.w, s.h), (200, 100));
        assert_eq!(s.dpr(), 2.0);
        let s = Surface::new(100, 50, 0.0);
        assert_eq!((s.w, s.h), (100, 50));
    }

    #[test]
    fn resize_rederives_buffer() {
        let mut s = Surface::new(100, 50, 1.0);
        s.resize(40, 20, 1.5);
        assert_eq!((s.w, s.h), (60, 30));
        assert_eq!(s.data.len(), 60 * 30 * 4);
        assert_eq!(s.css_width(), 40);
    }

    #[test]
    fn zero_sized_surface_draws_nothing() {
        let mut s = Surface::new(0, 320, 1.0);
        assert!(s.is_empty());
        s.clear(RED);
        s.line((0.0, 0.0), (10.0, 10.0), 2.0, RED);
        s.fill_circle(5.0, 5.0, 3.0, RED);
        s.hairlines(&[0.0], &[0.0], RED);
        assert!(s.data.is_empty());
    }

    #[test]
    fn line_scales_with_dpr() {
        let mut s = Surface::new(20, 20, 2.0);
        s.clear([0, 0, 0, 255]);
        s.line((0.0, 5.0), (19.0, 5.0), 1.0, RED);
        assert_eq!(s.get(20, 10), RED);
        assert_eq!(s.get(20, 5), [0, 0, 0, 255]);
    }

    #[test]
    fn huge_segments_are_clipped_to_the_surface() {
        let mut s = Surface::new(20, 20, 1.0);
        s.clear([0, 0, 0, 255]);
        s.line((5.0, -1e300), (6.0, 1e300), 1.0, RED);
        assert_eq!(s.get(5, 10), RED);
        assert_eq!(s.get(6, 10), [0, 0, 0, 255]);

        // entirely off-surface or non-finite: nothing drawn
        s.clear([0, 0, 0, 255]);
        s.line((0.0, -1e9), (20.0, -1e9), 2.0, RED);
        s.line((0.0, 5.0), (20.0, f64::INFINITY), 2.0, RED);
        assert!(s.data.chunks(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn grid_lines_are_one_css_pixel_wide() {
        let mut s = Surface::new(100, 100, 2.0);
        s.clear([0, 0, 0, 255]);
        s.hairlines(&[50.0], &[50.0], RED);
        assert_eq!(s.get(3, 100), RED);
        assert_eq!(s.get(3, 101), RED);
        assert_eq!(s.get(3, 102), [0, 0, 0, 255]);
        assert_eq!(s.get(101, 3), RED);
        assert_eq!(s.get(102, 3), [0, 0, 0, 255]);
    }

    #[test]
    fn dashes_leave_gaps() {
        let mut s = Surface::new(20, 10, 1.0);
        s.clear([0, 0, 0, 255]);
        s.dashed_hline(5.0, 4.0, 6.0, 1.0, RED);
        assert_eq!(s.get(1, 5), RED);
        assert_eq!(s.get(7, 5), [0, 0, 0, 255]);
        assert_eq!(s.get(11, 5), RED);
    }

    #[test]
    fn png_data_url_roundtrips_header() {
        let s = Surface::new(4, 4, 1.0);
        let png = s.encode_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let url = png_data_url(&png);
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}
