// Rooms are maximal 4-connected sets of water tiles.

use glam::{IVec2, Vec2};
use tracing::debug;

use crate::grid::{CellState, Grid};

const NEIGHBOURS_4: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub tiles: Vec<IVec2>,
    pub centre: Vec2,
}

impl Room {
    pub fn new(tiles: Vec<IVec2>) -> Self {
        let centre = if tiles.is_empty() {
            Vec2::ZERO
        } else {
            let (sx, sy) = tiles.iter().fold((0.0f64, 0.0f64), |(sx, sy), t| {
                (sx + t.x as f64, sy + t.y as f64)
            });
            let n = tiles.len() as f64;
            Vec2::new((sx / n) as f32, (sy / n) as f32)
        };
        Self { tiles, centre }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    // Centre rounded half-to-even onto the grid.
    pub fn centre_tile(&self) -> IVec2 {
        IVec2::new(
            self.centre.x.round_ties_even() as i32,
            self.centre.y.round_ties_even() as i32,
        )
    }

    // Member tiles touching soil (or the grid edge) on a 4-neighbour side.
    pub fn edge_tiles(&self, grid: &Grid) -> Vec<IVec2> {
        self.tiles
            .iter()
            .copied()
            .filter(|t| {
                NEIGHBOURS_4.iter().any(|d| {
                    let n = *t + *d;
                    grid.get_signed(n.x as i64, n.y as i64) != Some(CellState::Water)
                })
            })
            .collect()
    }
}

// Largest first; scan is x-outer, y-inner
pub fn identify_rooms(grid: &Grid) -> Vec<Room> {
    let (w, h) = (grid.width(), grid.height());
    let mut visited = vec![false; w * h];
    let mut rooms = Vec::new();

    for x in 0..w {
        for y in 0..h {
            if visited[y * w + x] || grid.get(x, y).is_soil() {
                continue;
            }
            rooms.push(Room::new(flood_fill(grid, &mut visited, x, y)));
        }
    }

    // stable: ties stay in discovery order
    rooms.sort_by(|a, b| b.len().cmp(&a.len()));
    rooms
}

// Worklist flood fill over 4-connected water; each cell is pushed at most once
fn flood_fill(grid: &Grid, visited: &mut [bool], x: usize, y: usize) -> Vec<IVec2> {
    let w = grid.width();
    let mut tiles = Vec::new();
    let mut stack = vec![IVec2::new(x as i32, y as i32)];
    visited[y * w + x] = true;

    while let Some(t) = stack.pop() {
        tiles.push(t);
        for d in NEIGHBOURS_4 {
            let n = t + d;
            if !grid.in_bounds(n.x as i64, n.y as i64) {
                continue;
            }
            let i = n.y as usize * w + n.x as usize;
            if !visited[i] && grid.get(n.x as usize, n.y as usize).is_water() {
                visited[i] = true;
                stack.push(n);
            }
        }
    }
    tiles
}

// Nearest centre to `rooms[index]`; ties go to the first in list order
pub fn find_closest_room(rooms: &[Room], index: usize) -> Option<usize> {
    let centre = rooms[index].centre;
    let mut closest = None;
    let mut closest_distance = f32::MAX;

    for (j, other) in rooms.iter().enumerate() {
        if j == index {
            continue;
        }
        let distance = centre.distance(other.centre);
        if distance < closest_distance {
            closest_distance = distance;
            closest = Some(j);
        }
    }
    closest
}

// Walk from `start` to `end` (x first, then y), clearing a square of
// half-width `corridor_width / 2` around each step.
// The square is clipped to the interior; `start` itself is not cleared.
pub fn carve_corridor(grid: &mut Grid, start: IVec2, end: IVec2, corridor_width: u32) -> usize {
    let half = (corridor_width / 2) as i32;
    let mut p = start;
    let mut steps = 0;

    while p != end {
        if p.x != end.x {
            p.x += (end.x - p.x).signum();
        } else {
            p.y += (end.y - p.y).signum();
        }
        steps += 1;

        for i in -half..=half {
            for j in -half..=half {
                let (x, y) = ((p.x + i) as i64, (p.y + j) as i64);
                if !grid.in_bounds(x, y) {
                    continue;
                }
                let centre = i == 0 && j == 0;
                if centre || !grid.is_border(x as usize, y as usize) {
                    grid.set(x as usize, y as usize, CellState::Water);
                }
            }
        }
    }
    steps
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectReport {
    pub corridors: usize,
    // corridors added after the nearest-centre pass
    pub stitches: usize,
}

pub struct RoomConnector {
    corridor_width: u32,
}

impl RoomConnector {
    pub fn new(corridor_width: u32) -> Self {
        Self { corridor_width }
    }

    pub fn corridor_width(&self) -> u32 {
        self.corridor_width
    }

    // Link every room but the last to its nearest neighbour by centre, then
    // stitch any regions still apart so the grid ends as one open region.
    pub fn connect(&self, grid: &mut Grid, rooms: &[Room]) -> ConnectReport {
        let mut report = ConnectReport::default();

        for i in 0..rooms.len().saturating_sub(1) {
            let Some(j) = find_closest_room(rooms, i) else {
                continue;
            };
            let from = rooms[i].centre_tile();
            let to = rooms[j].centre_tile();
            carve_corridor(grid, from, to, self.corridor_width);
            report.corridors += 1;
        }

        report.stitches = self.stitch(grid);
        debug!(
            rooms = rooms.len(),
            corridors = report.corridors,
            stitches = report.stitches,
            "rooms connected"
        );
        report
    }

    // Join the largest region to its nearest neighbour (by edge tiles) until
    // one region remains. Every pass merges at least two regions.
    fn stitch(&self, grid: &mut Grid) -> usize {
        let mut stitches = 0;
        let mut rooms = identify_rooms(grid);
        let max_passes = rooms.len();

        for _ in 0..max_passes {
            if rooms.len() <= 1 {
                break;
            }
            let main_edge = rooms[0].edge_tiles(grid);
            let mut best: Option<(IVec2, IVec2)> = None;
            let mut best_distance = i64::MAX;

            for other in &rooms[1..] {
                for b in other.edge_tiles(grid) {
                    for &a in &main_edge {
                        let d = (a - b).as_i64vec2().length_squared();
                        if d < best_distance {
                            best_distance = d;
                            best = Some((a, b));
                        }
                    }
                }
            }

            let Some((a, b)) = best else { break };
            carve_corridor(grid, a, b, self.corridor_width);
            stitches += 1;
            rooms = identify_rooms(grid);
        }
        stitches
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec2, Vec2};

    use super::{Room, RoomConnector, carve_corridor, find_closest_room, identify_rooms};
    use crate::grid::{CellState, Grid};

    fn two_pockets() -> Grid {
        // 20x20 solid rock with two 3x3 open pockets
        let mut grid = Grid::filled(20, 20, CellState::Soil);
        for x in 2..5 {
            for y in 2..5 {
                grid.set(x, y, CellState::Water);
            }
        }
        for x in 13..16 {
            for y in 12..15 {
                grid.set(x, y, CellState::Water);
            }
        }
        grid
    }

    #[test]
    fn open_interior_is_one_room() {
        let mut grid = Grid::filled(10, 10, CellState::Water);
        for x in 0..10 {
            for y in 0..10 {
                if grid.is_border(x, y) {
                    grid.set(x, y, CellState::Soil);
                }
            }
        }
        let rooms = identify_rooms(&grid);
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].len(), 64);
        assert_eq!(rooms[0].centre, Vec2::new(4.5, 4.5));

        let before = grid.clone();
        let report = RoomConnector::new(3).connect(&mut grid, &rooms);
        assert_eq!(report.corridors, 0);
        assert_eq!(report.stitches, 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn two_pockets_become_one() {
        let mut grid = two_pockets();
        let rooms = identify_rooms(&grid);
        assert_eq!(rooms.len(), 2);
        assert!(rooms.iter().all(|r| r.len() == 9));
        assert_eq!(rooms[0].centre, Vec2::new(3.0, 3.0));

        let report = RoomConnector::new(3).connect(&mut grid, &rooms);
        assert_eq!(report.corridors, 1);
        assert_eq!(identify_rooms(&grid).len(), 1);
        assert!(grid.border_sealed());
    }

    #[test]
    fn rooms_sorted_largest_first() {
        let grid = Grid::from_ascii(&[
            "#########", //
            "#.#...#.#", //
            "#.#...#.#", //
            "#########",
        ]);
        let rooms = identify_rooms(&grid);
        let sizes: Vec<usize> = rooms.iter().map(Room::len).collect();
        assert_eq!(sizes, vec![6, 2, 2]);
        // equal sizes keep x-outer scan order
        assert_eq!(rooms[1].centre.x, 1.0);
        assert_eq!(rooms[2].centre.x, 7.0);
    }

    #[test]
    fn closest_room_tie_goes_to_first() {
        let rooms = vec![
            Room::new(vec![IVec2::new(5, 5)]),
            Room::new(vec![IVec2::new(2, 5)]),
            Room::new(vec![IVec2::new(8, 5)]),
        ];
        assert_eq!(find_closest_room(&rooms, 0), Some(1));
        assert_eq!(find_closest_room(&rooms[..1], 0), None);
    }

    #[test]
    fn centre_rounds_half_to_even() {
        let room = Room::new(vec![IVec2::new(2, 3), IVec2::new(3, 4)]);
        assert_eq!(room.centre, Vec2::new(2.5, 3.5));
        assert_eq!(room.centre_tile(), IVec2::new(2, 4));
    }

    #[test]
    fn corridor_walks_x_then_y() {
        let mut grid = Grid::filled(12, 12, CellState::Soil);
        let steps = carve_corridor(&mut grid, IVec2::new(2, 2), IVec2::new(6, 8), 1);
        assert_eq!(steps, 10);
        // start is not cleared; the elbow is at (6, 2)
        assert_eq!(grid.get(2, 2), CellState::Soil);
        assert_eq!(grid.get(6, 2), CellState::Water);
        assert_eq!(grid.get(6, 8), CellState::Water);
        assert_eq!(grid.get(2, 8), CellState::Soil);
        assert_eq!(grid.count(CellState::Water), 10);
    }

    #[test]
    fn wide_corridor_never_opens_border() {
        let mut grid = Grid::filled(8, 8, CellState::Soil);
        carve_corridor(&mut grid, IVec2::new(1, 1), IVec2::new(6, 1), 3);
        assert!(grid.border_sealed());
        assert_eq!(grid.get(3, 2), CellState::Water);
        assert_eq!(grid.get(3, 0), CellState::Soil);
    }

    #[test]
    fn stitch_joins_room_whose_corridor_misses_it() {
        // C-shaped room: its centre sits in rock inside the C, and the corridor
        // to the right-hand room runs through the mouth without touching it
        let mut grid = Grid::from_ascii(&[
            "###############", //
            "#.....#########", //
            "#.#############", //
            "#.###########.#", //
            "#.#############", //
            "#.....#########", //
            "###############",
        ]);
        let rooms = identify_rooms(&grid);
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].centre_tile(), IVec2::new(3, 3));

        let report = RoomConnector::new(1).connect(&mut grid, &rooms);
        assert_eq!(report.corridors, 1);
        assert_eq!(report.stitches, 1);
        assert_eq!(identify_rooms(&grid).len(), 1);
    }
}
