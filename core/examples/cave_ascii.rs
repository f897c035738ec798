use cavern::{CaveAutomaton, CellState, RoomConnector, identify_rooms};

fn main() {
    // Generate a 64×32 cave with seed 2025, 45% rock, 5 smoothing passes
    let mut grid = CaveAutomaton::new(45, 5).generate(64, 32, 2025);

    // Connect every room to its neighbour with 3-wide corridors
    let rooms = identify_rooms(&grid);
    let report = RoomConnector::new(3).connect(&mut grid, &rooms);
    println!(
        "{} rooms, {} corridors, {} stitches",
        rooms.len(),
        report.corridors,
        report.stitches
    );

    // Print it, highest row first
    for y in (0..grid.height()).rev() {
        let line: String = (0..grid.width())
            .map(|x| match grid.get(x, y) {
                CellState::Soil => '#',
                CellState::Water => '.',
            })
            .collect();
        println!("{line}");
    }
}
