use std::path::Path;

use crate::error::CaveResult;
use crate::grid::{CellState, Grid};

// Tile colours of the 2D cave view
const SOIL_RGB: [u8; 3] = [102, 51, 0]; // brown
const WATER_RGB: [u8; 3] = [153, 255, 255]; // pale cyan

// Flatten a grid into a row-major byte buffer (1 = soil, 0 = water)
// For storing into MongoDB as a flat array
pub fn flatten_grid(grid: &Grid) -> Vec<u8> {
    grid.to_bytes()
}

fn cell_to_rgb(state: CellState) -> [u8; 3] {
    match state {
        CellState::Soil => SOIL_RGB,
        CellState::Water => WATER_RGB,
    }
}

// RGB byte buffer, top image row = highest y, so the picture matches the mesh seen from above
pub fn to_cave_image(grid: &Grid) -> Vec<u8> {
    let (w, h) = (grid.width(), grid.height());
    let mut buf = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let y = h - 1 - row;
        for x in 0..w {
            buf.extend_from_slice(&cell_to_rgb(grid.get(x, y)));
        }
    }
    buf
}

// Write the cave image as PNG (or any format `image` infers from the extension)
pub fn save_png(grid: &Grid, path: impl AsRef<Path>) -> CaveResult<()> {
    image::save_buffer(
        path,
        &to_cave_image(grid),
        grid.width() as u32,
        grid.height() as u32,
        image::ColorType::Rgb8,
    )?;
    Ok(())
}
