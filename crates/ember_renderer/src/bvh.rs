//! Per-mesh bounding volume hierarchy construction.
//!
//! Builds a flat binary tree over a mesh's triangle list by recursive
//! median split on the longest axis of the node bounds. The triangle list
//! is permuted in place so every leaf addresses a contiguous index range;
//! the vertex list is never touched.

use ember_math::{max_dimension, Aabb, Vec3};

use crate::triangle::Triangle;

/// Maximum index spread `end - start` a leaf may cover before splitting.
pub const MAX_TRIANGLES_PER_LEAF: usize = 8;

/// A node of the flat BVH. Node 0 is the root.
///
/// A leaf has `left == right == -1` and covers the inclusive triangle range
/// `[start, end]` of the mesh's reordered triangle list. Interior nodes have
/// both children recorded as indices into the node vector; because the
/// vector grows while children are built, nodes are always addressed by
/// index, never by reference.
#[derive(Debug, Copy, Clone)]
pub struct BvhNode {
    pub bounds: Aabb,
    pub left: i32,
    pub right: i32,
    pub start: i32,
    pub end: i32,
}

impl BvhNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left < 0
    }
}

/// Build the BVH for a triangle list, reordering it in place.
///
/// Returns an empty vector for an empty mesh; otherwise node 0 is the root.
pub fn build(vertices: &[Vec3], triangles: &mut [Triangle]) -> Vec<BvhNode> {
    if triangles.is_empty() {
        return Vec::new();
    }

    // Rough node-count hint; correctness does not depend on it.
    let leaf_estimate = (triangles.len() + MAX_TRIANGLES_PER_LEAF - 1) / MAX_TRIANGLES_PER_LEAF;
    let mut nodes = Vec::with_capacity(2 * leaf_estimate);

    nodes.push(BvhNode {
        bounds: triangle_range_bounds(vertices, triangles),
        left: -1,
        right: -1,
        start: 0,
        end: (triangles.len() - 1) as i32,
    });
    split(&mut nodes, 0, vertices, triangles);
    nodes
}

/// Bounds over every vertex of every triangle in the slice.
fn triangle_range_bounds(vertices: &[Vec3], triangles: &[Triangle]) -> Aabb {
    let mut bounds = Aabb::EMPTY;
    for tri in triangles {
        bounds.expand(vertices[tri.v0 as usize]);
        bounds.expand(vertices[tri.v1 as usize]);
        bounds.expand(vertices[tri.v2 as usize]);
    }
    bounds
}

#[inline]
fn centroid(vertices: &[Vec3], tri: &Triangle) -> Vec3 {
    (vertices[tri.v0 as usize] + vertices[tri.v1 as usize] + vertices[tri.v2 as usize]) / 3.0
}

fn split(nodes: &mut Vec<BvhNode>, node_index: usize, vertices: &[Vec3], triangles: &mut [Triangle]) {
    let (start, end, size) = {
        let node = &nodes[node_index];
        (node.start as usize, node.end as usize, node.bounds.size())
    };

    if end - start <= MAX_TRIANGLES_PER_LEAF {
        return;
    }

    // Median split on the longest axis: quickselect places the median
    // triangle (by centroid) at `mid` and partitions the rest around it.
    let axis = max_dimension(size);
    let mid = start + (end - start) / 2;
    triangles[start..=end].select_nth_unstable_by(mid - start, |a, b| {
        let ca = centroid(vertices, a)[axis];
        let cb = centroid(vertices, b)[axis];
        ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let left_index = nodes.len();
    nodes.push(BvhNode {
        bounds: triangle_range_bounds(vertices, &triangles[start..=mid]),
        left: -1,
        right: -1,
        start: start as i32,
        end: mid as i32,
    });

    let right_index = nodes.len();
    nodes.push(BvhNode {
        bounds: triangle_range_bounds(vertices, &triangles[mid + 1..=end]),
        left: -1,
        right: -1,
        start: (mid + 1) as i32,
        end: end as i32,
    });

    nodes[node_index].left = left_index as i32;
    nodes[node_index].right = right_index as i32;

    split(nodes, left_index, vertices, triangles);
    split(nodes, right_index, vertices, triangles);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A z-facing quad grid: `n x n` cells, two triangles per cell.
    fn grid_mesh(n: u32) -> (Vec<Vec3>, Vec<Triangle>) {
        let mut vertices = Vec::new();
        for y in 0..=n {
            for x in 0..=n {
                vertices.push(Vec3::new(x as f32, y as f32, -5.0));
            }
        }
        let stride = n + 1;
        let mut triangles = Vec::new();
        for y in 0..n {
            for x in 0..n {
                let v0 = y * stride + x;
                let v1 = v0 + 1;
                let v2 = v0 + stride;
                let v3 = v2 + 1;
                triangles.push(Triangle::new(v0, v1, v3));
                triangles.push(Triangle::new(v0, v3, v2));
            }
        }
        (vertices, triangles)
    }

    fn check_node(
        nodes: &[BvhNode],
        vertices: &[Vec3],
        triangles: &[Triangle],
        index: usize,
    ) -> usize {
        let node = &nodes[index];
        let start = node.start as usize;
        let end = node.end as usize;
        assert!(start <= end);

        // Bounds contain every vertex of the range
        for tri in &triangles[start..=end] {
            for v in [tri.v0, tri.v1, tri.v2] {
                let p = vertices[v as usize];
                assert!(p.cmpge(node.bounds.min).all() && p.cmple(node.bounds.max).all());
            }
        }

        if node.is_leaf() {
            assert!(end - start <= MAX_TRIANGLES_PER_LEAF);
            end - start + 1
        } else {
            let left = &nodes[node.left as usize];
            let right = &nodes[node.right as usize];

            // Children partition the parent's range
            assert_eq!(left.start, node.start);
            assert_eq!(right.end, node.end);
            assert_eq!(left.end + 1, right.start);

            check_node(nodes, vertices, triangles, node.left as usize)
                + check_node(nodes, vertices, triangles, node.right as usize)
        }
    }

    #[test]
    fn test_empty_mesh_has_no_nodes() {
        let mut triangles: Vec<Triangle> = Vec::new();
        assert!(build(&[], &mut triangles).is_empty());
    }

    #[test]
    fn test_single_leaf() {
        let (vertices, mut triangles) = grid_mesh(2); // 8 triangles
        let nodes = build(&vertices, &mut triangles);

        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_leaf());
        assert_eq!(nodes[0].start, 0);
        assert_eq!(nodes[0].end, 7);
    }

    #[test]
    fn test_tree_invariants() {
        let (vertices, mut triangles) = grid_mesh(16); // 512 triangles
        let count = triangles.len();
        let nodes = build(&vertices, &mut triangles);

        assert!(nodes.len() > 1);
        assert_eq!(nodes[0].start, 0);
        assert_eq!(nodes[0].end as usize, count - 1);

        // Every triangle is reachable exactly once through the leaves
        let leaf_total = check_node(&nodes, &vertices, &triangles, 0);
        assert_eq!(leaf_total, count);
    }

    #[test]
    fn test_permutation_preserves_triangle_set() {
        let (vertices, mut triangles) = grid_mesh(8);
        let mut before: Vec<_> = triangles.clone();
        build(&vertices, &mut triangles);

        let mut after = triangles.clone();
        let key = |t: &Triangle| (t.v0, t.v1, t.v2);
        before.sort_by_key(key);
        after.sort_by_key(key);
        assert_eq!(before, after);
    }
}
