use cavern::{CaveAutomaton, identify_rooms};
use image::{Rgb, RgbImage};
use palette::{Gradient, LinSrgb};
use std::path::Path;

fn main() {
    let (width, height) = (192usize, 108usize);
    let grid = CaveAutomaton::new(45, 20).generate(width, height, 2025);
    let rooms = identify_rooms(&grid);

    // One colour per room, largest room at the warm end
    let gradient = Gradient::with_domain(vec![
        (0.00, LinSrgb::new(0.9, 0.3, 0.1)), // orange
        (0.50, LinSrgb::new(0.2, 0.7, 0.3)), // green
        (1.00, LinSrgb::new(0.1, 0.2, 0.8)), // blue
    ]);

    // Rock stays dark
    let mut img = RgbImage::from_pixel(width as u32, height as u32, Rgb([40, 25, 10]));
    for (i, room) in rooms.iter().enumerate() {
        let t = if rooms.len() > 1 {
            i as f32 / (rooms.len() - 1) as f32
        } else {
            0.0
        };
        let col: LinSrgb = gradient.get(t);
        let rgb = col.into_format::<u8>();
        for tile in &room.tiles {
            // flip so the highest y is the top row
            let py = height as u32 - 1 - tile.y as u32;
            img.put_pixel(tile.x as u32, py, Rgb([rgb.red, rgb.green, rgb.blue]));
        }
    }

    let path = Path::new("cave_rooms.png");
    img.save(path).unwrap();
    println!("Saved {} rooms to {:?}", rooms.len(), path);
}
