// Generates and saves three 192×108 cave images:
// Raw random fill
// After cellular-automaton smoothing
// After room connection

use cavern::utils::save_png;
use cavern::{CaveAutomaton, RoomConnector, identify_rooms};

fn main() {
    let (width, height) = (192, 108);
    let seed = 42;
    let fill_percent = 43;

    // 1) Raw random fill, no smoothing
    let automaton = CaveAutomaton::new(fill_percent, 20);
    let raw = automaton.initialise(width, height, seed);
    save_png(&raw, "cave_raw.png").unwrap();
    println!("Saved cave_raw.png");

    // 2) Smoothed
    let mut smoothed = raw.clone();
    automaton.apply(&mut smoothed);
    save_png(&smoothed, "cave_smoothed.png").unwrap();
    println!("Saved cave_smoothed.png");

    // 3) Connected
    let mut connected = smoothed.clone();
    let rooms = identify_rooms(&connected);
    RoomConnector::new(3).connect(&mut connected, &rooms);
    save_png(&connected, "cave_connected.png").unwrap();
    println!("Saved cave_connected.png ({} rooms joined)", rooms.len());
}
