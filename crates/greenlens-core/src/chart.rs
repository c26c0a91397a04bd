//! Pie-chart rendering for the ranked class breakdown.
//!
//! Rasterizes directly with `image` to keep the services free of
//! system font and windowing dependencies. Labels and exact
//! percentages travel in the JSON payload; the chart shows the
//! proportions with a color legend strip.

use std::path::Path;

use image::{Rgb, RgbImage};
use tracing::debug;

use crate::classify::RankedClasses;
use crate::error::{Error, Result};

const CHART_WIDTH: u32 = 800;
const CHART_HEIGHT: u32 = 600;

/// Matches the original chart orientation (matplotlib startangle=140,
/// counter-clockwise).
const START_ANGLE_DEG: f64 = 140.0;

/// Slice colors, cycled when there are more classes.
const PALETTE: [[u8; 3]; 10] = [
    [66, 133, 244],
    [219, 68, 55],
    [244, 180, 0],
    [15, 157, 88],
    [171, 71, 188],
    [255, 112, 67],
    [0, 172, 193],
    [124, 179, 66],
    [255, 167, 38],
    [92, 107, 192],
];

/// Render the ranked classes as a pie chart PNG at `path`.
///
/// Callers skip the call when the list is empty; an empty list here is
/// an error rather than a blank image.
pub fn render_pie_chart(classes: &RankedClasses, path: &Path) -> Result<()> {
    if classes.is_empty() {
        return Err(Error::Chart("nothing to chart".into()));
    }

    let total: f64 = classes.iter().map(|(_, pct)| f64::from(*pct)).sum();
    if total <= 0.0 {
        return Err(Error::Chart("chart slices sum to zero".into()));
    }

    // Slice boundaries as cumulative fractions of the circle.
    let mut boundaries = Vec::with_capacity(classes.len() + 1);
    let mut cumulative = 0.0;
    boundaries.push(0.0);
    for (_, pct) in classes {
        cumulative += f64::from(*pct) / total;
        boundaries.push(cumulative.min(1.0));
    }

    let mut canvas = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, Rgb([255, 255, 255]));

    let cx = f64::from(CHART_WIDTH) * 0.42;
    let cy = f64::from(CHART_HEIGHT) / 2.0;
    let radius = f64::from(CHART_HEIGHT.min(CHART_WIDTH)) * 0.38;
    let start = START_ANGLE_DEG.to_radians();

    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let dx = f64::from(x) - cx;
        let dy = cy - f64::from(y); // flip: screen y grows downward
        if dx * dx + dy * dy > radius * radius {
            continue;
        }

        // Counter-clockwise fraction of the circle from the start angle.
        let angle = (dy.atan2(dx) - start).rem_euclid(std::f64::consts::TAU);
        let fraction = angle / std::f64::consts::TAU;

        let slice = boundaries
            .windows(2)
            .position(|b| fraction >= b[0] && fraction < b[1])
            .unwrap_or(classes.len() - 1);
        *pixel = Rgb(PALETTE[slice % PALETTE.len()]);
    }

    draw_legend(&mut canvas, classes.len());

    canvas
        .save(path)
        .map_err(|e| Error::Chart(format!("write chart: {e}")))?;

    debug!("chart written to {}", path.display());
    Ok(())
}

/// Color swatches along the right edge, one per slice in rank order.
fn draw_legend(canvas: &mut RgbImage, slices: usize) {
    const SWATCH: u32 = 24;
    const GAP: u32 = 12;
    let x0 = CHART_WIDTH - 120;

    for slice in 0..slices {
        let y0 = 40 + slice as u32 * (SWATCH + GAP);
        if y0 + SWATCH >= CHART_HEIGHT {
            break;
        }
        let color = Rgb(PALETTE[slice % PALETTE.len()]);
        for y in y0..y0 + SWATCH {
            for x in x0..x0 + SWATCH {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_png_for_a_nonempty_breakdown() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("chart.png");
        let classes = vec![
            ("Speech".to_string(), 60.0),
            ("Dog".to_string(), 25.0),
            ("Music".to_string(), 15.0),
        ];

        render_pie_chart(&classes, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn single_class_fills_the_whole_disc() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("chart.png");
        let classes = vec![("Speech".to_string(), 100.0)];

        render_pie_chart(&classes, &path).unwrap();

        let rendered = image::open(&path).unwrap().to_rgb8();
        // Center of the disc carries the first palette color.
        let center = rendered.get_pixel(
            (f64::from(CHART_WIDTH) * 0.42) as u32,
            CHART_HEIGHT / 2,
        );
        assert_eq!(center.0, PALETTE[0]);
    }

    #[test]
    fn empty_breakdown_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("chart.png");
        assert!(render_pie_chart(&Vec::new(), &path).is_err());
    }
}
