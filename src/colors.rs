use rayon::prelude::*;

use crate::fluid::{should_parallel, Fluid};
use crate::scene::{Obstacle, ObstacleShape};

const OBSTACLE_FILL: [u8; 3] = [201, 36, 201];

pub fn sci_color(value: f32, min: f32, max: f32) -> [u8; 3] {
    let range = max - min;
    let t = if range == 0.0 {
        0.5
    } else {
        (value.min(max - 1e-4).max(min) - min) / range
    };
    let segment = (t / 0.25).floor();
    let s = (t - segment * 0.25) / 0.25;
    let (r, g, b) = match segment as i32 {
        0 => (0.0, s, 1.0),
        1 => (0.0, 1.0, 1.0 - s),
        2 => (s, 1.0, 0.0),
        _ => (1.0, 1.0 - s, 0.0),
    };
    [(255.0 * r) as u8, (255.0 * g) as u8, (255.0 * b) as u8]
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintOptions {
    pub show_pressure: bool,
    pub show_smoke: bool,
    pub paint_palette: bool,
}

pub fn paint_cells(fluid: &Fluid, options: PaintOptions, pixels: &mut [u8]) {
    let width = fluid.size.width();
    let height = fluid.size.height();
    debug_assert_eq!(pixels.len(), width * height * 4);

    let (min_p, max_p) = if options.show_pressure {
        fluid
            .pressure
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), value| {
                (lo.min(*value), hi.max(*value))
            })
    } else {
        (0.0, 0.0)
    };

    let paint_row = |row_from_top: usize, row: &mut [u8]| {
        let j = height - 1 - row_from_top;
        for i in 0..width {
            let at = fluid.size.idx(i, j);
            let color = if options.show_pressure {
                let mut color = sci_color(fluid.pressure[at], min_p, max_p);
                if options.show_smoke {
                    let shade = (255.0 * fluid.smoke[at]) as u8;
                    for channel in &mut color {
                        *channel = channel.saturating_sub(shade);
                    }
                }
                color
            } else if options.show_smoke {
                let smoke = fluid.smoke[at];
                if options.paint_palette {
                    sci_color(smoke, 0.0, 1.0)
                } else {
                    let shade = (255.0 * smoke) as u8;
                    [shade, shade, shade]
                }
            } else if fluid.open(i, j) {
                [255, 255, 255]
            } else {
                [0, 0, 0]
            };
            row[i * 4..i * 4 + 3].copy_from_slice(&color);
            row[i * 4 + 3] = 255;
        }
    };

    if should_parallel(width * height) {
        pixels
            .par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(row_from_top, row)| paint_row(row_from_top, row));
    } else {
        for (row_from_top, row) in pixels.chunks_mut(width * 4).enumerate() {
            paint_row(row_from_top, row);
        }
    }
}

pub fn overlay_obstacle(
    fluid: &Fluid,
    obstacle: Obstacle,
    shape: ObstacleShape,
    pressure_view: bool,
    pixels: &mut [u8],
) {
    let width = fluid.size.width();
    let height = fluid.size.height();
    debug_assert_eq!(pixels.len(), width * height * 4);

    let fill = if pressure_view {
        [255, 255, 255]
    } else {
        OBSTACLE_FILL
    };
    for i in 0..width {
        for j in 0..height {
            let (cx, cy) = fluid.size.cell_center(i, j);
            if !shape.covers(cx - obstacle.x, cy - obstacle.y, obstacle.radius) {
                continue;
            }
            let offset = ((height - 1 - j) * width + i) * 4;
            pixels[offset..offset + 3].copy_from_slice(&fill);
            pixels[offset + 3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pixels: &[u8], width: usize, px: usize, py: usize) -> [u8; 4] {
        let offset = (py * width + px) * 4;
        [
            pixels[offset],
            pixels[offset + 1],
            pixels[offset + 2],
            pixels[offset + 3],
        ]
    }

    #[test]
    fn sci_color_spans_blue_to_red() {
        assert_eq!(sci_color(0.0, 0.0, 1.0), [0, 0, 255]);
        assert_eq!(sci_color(0.5, 0.0, 1.0), [0, 255, 0]);
        assert_eq!(sci_color(1.0, 0.0, 1.0), [255, 0, 0]);
    }

    #[test]
    fn sci_color_blends_inside_a_segment() {
        assert_eq!(sci_color(0.125, 0.0, 1.0), [0, 127, 255]);
    }

    #[test]
    fn sci_color_collapses_empty_ranges_to_midpoint() {
        assert_eq!(sci_color(7.0, 3.0, 3.0), sci_color(0.5, 0.0, 1.0));
    }

    #[test]
    fn smoke_view_paints_grayscale_rows_flipped() {
        let mut fluid = Fluid::new(1.0, 1, 1, 1.0);
        fluid.set_smoke(1, 1, 0.0);
        let mut pixels = vec![0u8; 3 * 3 * 4];
        let options = PaintOptions {
            show_smoke: true,
            ..PaintOptions::default()
        };
        paint_cells(&fluid, options, &mut pixels);
        assert_eq!(pixel(&pixels, 3, 1, 1), [0, 0, 0, 255]);
        assert_eq!(pixel(&pixels, 3, 0, 0), [255, 255, 255, 255]);
        assert_eq!(pixel(&pixels, 3, 2, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn palette_mode_maps_smoke_through_sci_color() {
        let mut fluid = Fluid::new(1.0, 1, 1, 1.0);
        fluid.set_smoke(1, 1, 0.0);
        let mut pixels = vec![0u8; 3 * 3 * 4];
        let options = PaintOptions {
            show_smoke: true,
            paint_palette: true,
            ..PaintOptions::default()
        };
        paint_cells(&fluid, options, &mut pixels);
        assert_eq!(pixel(&pixels, 3, 1, 1), [0, 0, 255, 255]);
        assert_eq!(pixel(&pixels, 3, 0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn pressure_view_spreads_field_range_over_palette() {
        let mut fluid = Fluid::new(1.0, 1, 1, 1.0);
        let at = fluid.size.idx(1, 1);
        fluid.pressure[at] = 10.0;
        let mut pixels = vec![0u8; 3 * 3 * 4];
        let options = PaintOptions {
            show_pressure: true,
            ..PaintOptions::default()
        };
        paint_cells(&fluid, options, &mut pixels);
        assert_eq!(pixel(&pixels, 3, 1, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&pixels, 3, 0, 2), [0, 0, 255, 255]);
    }

    #[test]
    fn pressure_view_darkens_under_smoke() {
        let mut fluid = Fluid::new(1.0, 1, 1, 1.0);
        let at = fluid.size.idx(1, 1);
        fluid.pressure[at] = 10.0;
        let mut pixels = vec![0u8; 3 * 3 * 4];
        let options = PaintOptions {
            show_pressure: true,
            show_smoke: true,
            ..PaintOptions::default()
        };
        paint_cells(&fluid, options, &mut pixels);
        assert_eq!(pixel(&pixels, 3, 1, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn bare_view_separates_open_and_solid_cells() {
        let mut fluid = Fluid::new(1.0, 1, 1, 1.0);
        let at = fluid.size.idx(0, 0);
        fluid.openness[at] = 1.0;
        let mut pixels = vec![0u8; 3 * 3 * 4];
        paint_cells(&fluid, PaintOptions::default(), &mut pixels);
        assert_eq!(pixel(&pixels, 3, 0, 2), [255, 255, 255, 255]);
        assert_eq!(pixel(&pixels, 3, 1, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn obstacle_overlay_fills_covered_cells_only() {
        let fluid = Fluid::new(1.0, 1, 1, 1.0);
        let mut pixels = vec![0u8; 3 * 3 * 4];
        let obstacle = Obstacle {
            x: 1.5,
            y: 1.5,
            radius: 0.6,
        };
        overlay_obstacle(&fluid, obstacle, ObstacleShape::Circle, false, &mut pixels);
        assert_eq!(pixel(&pixels, 3, 1, 1), [201, 36, 201, 255]);
        assert_eq!(pixel(&pixels, 3, 0, 0), [0, 0, 0, 0]);
    }
}
