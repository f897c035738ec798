use crate::error::{CaveError, CaveResult};

// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    // Solid rock.
    #[default]
    Soil,
    // Open, navigable water.
    Water,
}

impl CellState {
    pub fn is_soil(self) -> bool {
        self == CellState::Soil
    }

    pub fn is_water(self) -> bool {
        self == CellState::Water
    }

    // Soil = 1, Water = 0 (the storage and image encoding)
    pub fn to_byte(self) -> u8 {
        match self {
            CellState::Soil => 1,
            CellState::Water => 0,
        }
    }

    pub fn from_byte(b: u8) -> Self {
        if b == 0 {
            CellState::Water
        } else {
            CellState::Soil
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            CellState::Soil => CellState::Water,
            CellState::Water => CellState::Soil,
        }
    }
}

// Binary occupancy grid, addressed as (x, y) with x in [0, width) and y in [0, height).
// Stored row-major: index = y * width + x.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl Grid {
    // A grid of the given size where every cell is `state`.
    pub fn filled(width: usize, height: usize, state: CellState) -> Self {
        Self {
            width,
            height,
            cells: vec![state; width * height],
        }
    }

    // Rebuild a grid from a row-major byte buffer (1 = soil, 0 = water).
    pub fn from_bytes(width: usize, height: usize, bytes: &[u8]) -> CaveResult<Self> {
        let expected = width * height;
        if bytes.len() != expected {
            return Err(CaveError::GridSize {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells: bytes.iter().map(|&b| CellState::from_byte(b)).collect(),
        })
    }

    // Parse an ASCII picture, top row first: '#' is soil, anything else water.
    // Row 0 of the text becomes y = height - 1 so the picture reads the way the mesh lies.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut grid = Self::filled(width, height, CellState::Soil);
        for (row, line) in rows.iter().enumerate() {
            let y = height - 1 - row;
            for (x, ch) in line.chars().enumerate().take(width) {
                let state = if ch == '#' {
                    CellState::Soil
                } else {
                    CellState::Water
                };
                grid.set(x, y, state);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> CellState {
        self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, state: CellState) {
        let i = self.index(x, y);
        self.cells[i] = state;
    }

    // Signed lookup; None when (x, y) lies off the grid
    #[inline]
    pub fn get_signed(&self, x: i64, y: i64) -> Option<CellState> {
        if self.in_bounds(x, y) {
            Some(self.get(x as usize, y as usize))
        } else {
            None
        }
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    // True if every border cell is soil
    pub fn border_sealed(&self) -> bool {
        self.cells()
            .filter(|&(x, y, _)| self.is_border(x, y))
            .all(|(_, _, s)| s.is_soil())
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&s| s == state).count()
    }

    // Every cell as (x, y, state), row by row
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &s)| (i % self.width, i / self.width, s))
    }

    // Same size, soil and water swapped. Used for the water surface mesh.
    pub fn inverted(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(|s| s.inverted()).collect(),
        }
    }

    // Row-major byte buffer (1 = soil, 0 = water)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|s| s.to_byte()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{CellState, Grid};

    #[test]
    fn bytes_roundtrip_and_size_check() {
        let g = Grid::from_ascii(&["###", "#.#", "###"]);
        let bytes = g.to_bytes();
        assert_eq!(bytes, vec![1, 1, 1, 1, 0, 1, 1, 1, 1]);
        assert_eq!(Grid::from_bytes(3, 3, &bytes).unwrap(), g);
        assert!(Grid::from_bytes(4, 3, &bytes).is_err());
    }

    #[test]
    fn ascii_top_row_is_highest_y() {
        let g = Grid::from_ascii(&["#..", "###"]);
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 2);
        assert_eq!(g.get(0, 1), CellState::Soil);
        assert_eq!(g.get(1, 1), CellState::Water);
        assert_eq!(g.get(1, 0), CellState::Soil);
    }

    #[test]
    fn border_and_inversion() {
        let g = Grid::from_ascii(&["####", "#..#", "####"]);
        assert!(g.border_sealed());
        assert!(g.is_border(3, 1));
        assert!(!g.is_border(1, 1));

        let inv = g.inverted();
        assert_eq!(inv.count(CellState::Water), g.count(CellState::Soil));
        assert!(!inv.border_sealed());
    }

    #[test]
    fn signed_lookup_off_grid() {
        let g = Grid::filled(2, 2, CellState::Water);
        assert_eq!(g.get_signed(-1, 0), None);
        assert_eq!(g.get_signed(1, 2), None);
        assert_eq!(g.get_signed(1, 1), Some(CellState::Water));
    }
}
