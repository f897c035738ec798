use super::nodes::{NodeArena, NodeId};

// The eight points of a cell a triangle fan can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPoint {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
    CentreTop = 4,
    CentreRight = 5,
    CentreBottom = 6,
    CentreLeft = 7,
}

// Quad between four neighbouring corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    points: [NodeId; 8], // indexed by CellPoint
    configuration: u8,
}

impl Cell {
    pub fn new(
        arena: &NodeArena,
        top_left: NodeId,
        top_right: NodeId,
        bottom_right: NodeId,
        bottom_left: NodeId,
    ) -> Self {
        let points = [
            top_left,
            top_right,
            bottom_right,
            bottom_left,
            arena.right_of(top_left),
            arena.above_of(bottom_right),
            arena.right_of(bottom_left),
            arena.above_of(bottom_left),
        ];
        let bit = |id: NodeId, value: u8| if arena.get(id).active { value } else { 0 };
        let configuration =
            bit(top_left, 8) | bit(top_right, 4) | bit(bottom_right, 2) | bit(bottom_left, 1);

        Self {
            points,
            configuration,
        }
    }

    #[inline]
    pub fn node(&self, point: CellPoint) -> NodeId {
        self.points[point as usize]
    }

    // 4-bit corner code: topLeft=8, topRight=4, bottomRight=2, bottomLeft=1.
    #[inline]
    pub fn configuration(&self) -> u8 {
        self.configuration
    }
}

// (width - 1) x (height - 1) cells, stored and visited x-outer / y-inner
#[derive(Debug, Clone)]
pub struct CellGrid {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
}

impl CellGrid {
    pub fn build(arena: &NodeArena) -> Self {
        let width = arena.width().saturating_sub(1);
        let height = arena.height().saturating_sub(1);
        let mut cells = Vec::with_capacity(width * height);

        for x in 0..width {
            for y in 0..height {
                cells.push(Cell::new(
                    arena,
                    arena.corner(x, y + 1),
                    arena.corner(x + 1, y + 1),
                    arena.corner(x + 1, y),
                    arena.corner(x, y),
                ));
            }
        }

        Self {
            cells,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> &Cell {
        &self.cells[x * self.height + y]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }
}
