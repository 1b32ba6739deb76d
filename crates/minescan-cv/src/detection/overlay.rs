//! Overlay rendering for visual debugging.
//!
//! A pure consumer of a finished reading: annotations are drawn onto a
//! copy of the screenshot and never feed back into the pipeline.

use super::config::VisualizationConfig;
use super::detector::BoardReading;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use minescan_core::grid::GridGeometry;

const GRID_COLOR: Rgb<u8> = Rgb([64, 96, 255]);
const MINE_COLOR: Rgb<u8> = Rgb([255, 48, 48]);
const ANCHOR_COLOR: Rgb<u8> = Rgb([32, 200, 64]);
const PEAK_RADIUS: i32 = 3;

/// Draw the board grid and the located peaks onto `image`.
pub fn render_overlay(
    mut image: RgbImage,
    reading: &BoardReading,
    geometry: &GridGeometry,
    vis: &VisualizationConfig,
) -> RgbImage {
    if vis.draw_grid {
        draw_board_grid(&mut image, reading, geometry);
    }
    if vis.draw_peaks {
        for peak in reading.mine_peaks.iter() {
            draw_filled_circle_mut(
                &mut image,
                (peak.col as i32, peak.row as i32),
                PEAK_RADIUS,
                MINE_COLOR,
            );
        }
        if let Some(anchor) = &reading.anchor_peak {
            draw_filled_circle_mut(
                &mut image,
                (anchor.col as i32, anchor.row as i32),
                PEAK_RADIUS,
                ANCHOR_COLOR,
            );
        }
    }
    image
}

fn draw_board_grid(image: &mut RgbImage, reading: &BoardReading, geometry: &GridGeometry) {
    let size = geometry.square_size as u32;
    for gx in 0..reading.descriptor.width {
        for gy in 0..reading.descriptor.height {
            let x = geometry.origin_x + i64::from(gx) * geometry.square_size;
            let y = geometry.origin_y + i64::from(gy) * geometry.square_size;
            let rect = Rect::at(x as i32, y as i32).of_size(size, size);
            draw_hollow_rect_mut(image, rect, GRID_COLOR);
        }
    }
}
