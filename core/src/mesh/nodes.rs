use glam::Vec3;

use crate::grid::Grid;

// Index into a `NodeArena`.
pub type NodeId = u32;

// A mesh node: either a corner sitting on a grid point, or one of the edge
// midpoints owned by a corner. Edge midpoints are shared by the cells on
// both sides of the edge, so each one gets a single mesh vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub position: Vec3,
    pub is_corner: bool,
    // soil under a corner; always false for edge nodes
    pub active: bool,
    // midpoint half a cell along +z (corners only)
    pub above: Option<NodeId>,
    // midpoint half a cell along +x (corners only)
    pub right: Option<NodeId>,
    // assigned lazily the first time a triangle uses the node
    pub vertex: Option<u32>,
}

impl Node {
    fn edge(position: Vec3) -> Self {
        Self {
            position,
            is_corner: false,
            active: false,
            above: None,
            right: None,
            vertex: None,
        }
    }
}

// Flat storage for every corner and edge node of one grid.
#[derive(Debug, Clone)]
pub struct NodeArena {
    nodes: Vec<Node>,
    corners: Vec<NodeId>, // x-major: corners[x * height + y]
    width: usize,
    height: usize,
}

impl NodeArena {
    // One corner per grid point, centred on the origin, plus its two midpoints.
    pub fn build(grid: &Grid, cell_size: f32) -> Self {
        let (width, height) = (grid.width(), grid.height());
        let map_width = width as f32 * cell_size;
        let map_height = height as f32 * cell_size;
        let half = cell_size / 2.0;

        let mut nodes = Vec::with_capacity(width * height * 3);
        let mut corners = Vec::with_capacity(width * height);

        for x in 0..width {
            for y in 0..height {
                let position = Vec3::new(
                    -map_width / 2.0 + x as f32 * cell_size + half,
                    0.0,
                    -map_height / 2.0 + y as f32 * cell_size + half,
                );
                let id = nodes.len() as NodeId;
                nodes.push(Node {
                    position,
                    is_corner: true,
                    active: grid.get(x, y).is_soil(),
                    above: Some(id + 1),
                    right: Some(id + 2),
                    vertex: None,
                });
                nodes.push(Node::edge(position + Vec3::Z * half));
                nodes.push(Node::edge(position + Vec3::X * half));
                corners.push(id);
            }
        }

        Self {
            nodes,
            corners,
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

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn corner(&self, x: usize, y: usize) -> NodeId {
        self.corners[x * self.height + y]
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    // Companion midpoints of a corner. Edge nodes have none; callers only
    // ask corners, so an edge id here is a logic error.
    pub fn above_of(&self, corner: NodeId) -> NodeId {
        self.get(corner).above.unwrap_or(corner)
    }

    pub fn right_of(&self, corner: NodeId) -> NodeId {
        self.get(corner).right.unwrap_or(corner)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::NodeArena;
    use crate::grid::{CellState, Grid};

    #[test]
    fn corners_are_centred_and_own_two_midpoints() {
        let mut grid = Grid::filled(2, 2, CellState::Water);
        grid.set(1, 0, CellState::Soil);
        let arena = NodeArena::build(&grid, 1.0);
        assert_eq!(arena.len(), 12);

        let c = arena.get(arena.corner(0, 0));
        assert!(c.is_corner);
        assert!(!c.active);
        assert_eq!(c.position, Vec3::new(-0.5, 0.0, -0.5));
        let origin = arena.corner(0, 0);
        assert_eq!(
            arena.get(arena.above_of(origin)).position,
            Vec3::new(-0.5, 0.0, 0.0)
        );
        assert_eq!(
            arena.get(arena.right_of(origin)).position,
            Vec3::new(0.0, 0.0, -0.5)
        );

        let soil = arena.get(arena.corner(1, 0));
        assert!(soil.active);
        let edge = arena.get(soil.above.unwrap());
        assert!(!edge.is_corner);
        assert_eq!(edge.above, None);
    }

    #[test]
    fn cell_size_scales_positions() {
        let grid = Grid::filled(4, 2, CellState::Soil);
        let arena = NodeArena::build(&grid, 2.0);
        // map is 8 x 4 units
        assert_eq!(arena.get(arena.corner(0, 0)).position, Vec3::new(-3.0, 0.0, -1.0));
        assert_eq!(arena.get(arena.corner(3, 1)).position, Vec3::new(3.0, 0.0, 1.0));
    }
}
