// Marching squares: corner nodes share edge midpoints, each 2x2 block gets a
// 4-bit configuration, and each configuration maps to a fixed fan.

pub mod cases;
pub mod cells;
pub mod extrude;
pub mod nodes;

use std::io::{self, Write};

use glam::Vec3;

use crate::grid::Grid;
use cells::{Cell, CellGrid};
use nodes::{NodeArena, NodeId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub points: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    // Flat index buffer, three per triangle
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    // Wavefront OBJ (1-based indices)
    pub fn write_obj<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for p in &self.points {
            writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for [a, b, c] in &self.triangles {
            writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1)?;
        }
        Ok(())
    }
}

// Euler rotation (degrees) and translation applied by the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    pub rotation: Vec3,
    pub translation: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacedMesh {
    pub mesh: Mesh,
    pub placement: Placement,
}

// Triangulated top surface plus extrusion to `depth` (bottom copy at `y - depth`).
pub fn triangulate(grid: &Grid, cell_size: f32, depth: f32) -> Mesh {
    let mut mesh = triangulate_surface(grid, cell_size);
    extrude::extrude(&mut mesh, depth);
    mesh
}

// Flat top surface only: soil cells covered, water left open.
pub fn triangulate_surface(grid: &Grid, cell_size: f32) -> Mesh {
    let mut arena = NodeArena::build(grid, cell_size);
    let cells = CellGrid::build(&arena);
    let mut builder = SurfaceBuilder::default();
    for cell in cells.iter() {
        builder.cell(&mut arena, cell);
    }
    builder.mesh
}

#[derive(Default)]
struct SurfaceBuilder {
    mesh: Mesh,
}

impl SurfaceBuilder {
    fn cell(&mut self, arena: &mut NodeArena, cell: &Cell) {
        let fan = cases::fan(cell.configuration());
        if fan.is_empty() {
            return;
        }
        let mut ids = [0 as NodeId; 6];
        for (slot, &point) in ids.iter_mut().zip(fan) {
            *slot = cell.node(point);
        }
        self.fan(arena, &ids[..fan.len()]);
    }

    fn fan(&mut self, arena: &mut NodeArena, ids: &[NodeId]) {
        let mut vertices = [0u32; 6];
        for (slot, &id) in vertices.iter_mut().zip(ids) {
            *slot = self.vertex(arena, id);
        }
        for i in 2..ids.len() {
            self.mesh
                .triangles
                .push([vertices[0], vertices[i - 1], vertices[i]]);
        }
    }

    // First use assigns the next mesh index; later uses reuse it
    fn vertex(&mut self, arena: &mut NodeArena, id: NodeId) -> u32 {
        let node = arena.get_mut(id);
        if let Some(v) = node.vertex {
            return v;
        }
        let v = self.mesh.points.len() as u32;
        self.mesh.points.push(node.position);
        node.vertex = Some(v);
        v
    }
}
