use std::collections::HashMap;

use glam::Vec3;

use super::Mesh;

// Undirected edge key
#[inline]
fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

// How many triangles use each undirected edge of `triangles`.
pub fn edge_usage(triangles: &[[u32; 3]]) -> HashMap<(u32, u32), u32> {
    let mut usage = HashMap::with_capacity(triangles.len() * 3);
    for &[a, b, c] in triangles {
        for (p, q) in [(a, b), (b, c), (c, a)] {
            *usage.entry(edge_key(p, q)).or_insert(0) += 1;
        }
    }
    usage
}

// Copy points to `y - depth`; walls only on edges used by one triangle
pub fn extrude(mesh: &mut Mesh, depth: f32) {
    let point_count = mesh.points.len() as u32;
    let top: Vec<[u32; 3]> = mesh.triangles.clone();

    let sunk: Vec<Vec3> = mesh
        .points
        .iter()
        .map(|p| Vec3::new(p.x, p.y - depth, p.z))
        .collect();
    mesh.points.extend(sunk);

    // back faces
    for &[a, b, c] in &top {
        mesh.triangles
            .push([c + point_count, b + point_count, a + point_count]);
    }

    // side walls, in top winding order
    let usage = edge_usage(&top);
    for &[a, b, c] in &top {
        for (p, q) in [(a, b), (b, c), (c, a)] {
            if usage.get(&edge_key(p, q)) != Some(&1) {
                continue;
            }
            let (p2, q2) = (p + point_count, q + point_count);
            mesh.triangles.push([p, q, q2]);
            mesh.triangles.push([p, q2, p2]);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::{edge_usage, extrude};
    use crate::mesh::Mesh;

    fn quad() -> Mesh {
        Mesh {
            points: vec![
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
            ],
            triangles: vec![[0, 1, 2], [0, 2, 3]],
        }
    }

    #[test]
    fn shared_diagonal_is_interior() {
        let usage = edge_usage(&quad().triangles);
        assert_eq!(usage[&(0, 2)], 2);
        assert_eq!(usage[&(0, 1)], 1);
        assert_eq!(usage.len(), 5);
    }

    #[test]
    fn quad_extrusion_walls_only_the_rim() {
        let mut mesh = quad();
        extrude(&mut mesh, 2.0);
        assert_eq!(mesh.points.len(), 8);
        assert_eq!(mesh.points[4], Vec3::new(0.0, -2.0, 1.0));
        // 2 top + 2 back + 4 rim edges x 2
        assert_eq!(mesh.triangles.len(), 12);
        assert_eq!(mesh.triangles[2], [6, 5, 4]);
        assert_eq!(mesh.triangles[4], [0, 1, 5]);
        assert_eq!(mesh.triangles[5], [0, 5, 4]);
    }

    #[test]
    fn negative_depth_raises_copy() {
        let mut mesh = quad();
        extrude(&mut mesh, -7.0);
        assert!(mesh.points[4..].iter().all(|p| p.y == 7.0));
    }

    #[test]
    fn empty_mesh_stays_empty() {
        let mut mesh = Mesh::default();
        extrude(&mut mesh, 1.0);
        assert!(mesh.points.is_empty());
        assert!(mesh.triangles.is_empty());
    }
}
