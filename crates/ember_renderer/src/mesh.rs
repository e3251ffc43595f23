//! Triangle mesh ownership and intersection.

use ember_math::{Aabb, Ray, Vec3, EPSILON};

use crate::bvh::{self, BvhNode};
use crate::hit::HitRecord;
use crate::triangle::{intersect_triangle, Triangle};

/// An immutable triangle mesh.
///
/// Construction computes area-weighted vertex normals, the bounding box, and
/// the BVH; nothing is mutated afterwards. The triangle list is the
/// BVH-reordered one, so leaf `[start, end]` ranges index into it directly.
#[derive(Debug)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    /// One unit normal per vertex; the zero vector for isolated vertices.
    pub vertex_normals: Vec<Vec3>,
    pub triangles: Vec<Triangle>,
    pub aabb: Aabb,
    /// False when the mesh is flat in some axis; such meshes skip the AABB
    /// gate and the BVH and scan their triangles linearly.
    pub has_aabb: bool,
    pub bvh: Vec<BvhNode>,
    /// Index into the owning scene's material table.
    pub material_index: Option<usize>,
}

impl Mesh {
    /// Build a mesh from vertex positions and index triples.
    ///
    /// Indices are assumed validated by the loader.
    pub fn new(vertices: Vec<Vec3>, indices: &[u32], material_index: Option<usize>) -> Self {
        let mut triangles: Vec<Triangle> = indices
            .chunks_exact(3)
            .map(|c| Triangle::new(c[0], c[1], c[2]))
            .collect();

        let vertex_normals = compute_vertex_normals(&vertices, &triangles);

        let mut aabb = Aabb::EMPTY;
        for v in &vertices {
            aabb.expand(*v);
        }
        let size = aabb.size();
        let has_aabb = size.x > EPSILON && size.y > EPSILON && size.z > EPSILON;

        let bvh = bvh::build(&vertices, &mut triangles);
        log::debug!(
            "mesh: {} vertices, {} triangles, {} bvh nodes, has_aabb={}",
            vertices.len(),
            triangles.len(),
            bvh.len(),
            has_aabb
        );

        Self {
            vertices,
            vertex_normals,
            triangles,
            aabb,
            has_aabb,
            bvh,
            material_index,
        }
    }

    /// Intersect a ray with this mesh, updating the running-best record.
    ///
    /// `rec.t` carries the closest distance found so far (initialized to the
    /// query ceiling by the scene); only strictly closer hits overwrite it.
    /// In any-hit mode the first accepted hit returns immediately.
    pub fn intersect<'a>(
        &'a self,
        ray: &Ray,
        backface: bool,
        any: bool,
        max_t: f32,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        if self.triangles.is_empty() {
            return false;
        }
        if self.has_aabb && !self.aabb.hit(ray) {
            return false;
        }

        if self.has_aabb && !self.bvh.is_empty() {
            self.traverse(0, ray, backface, any, max_t, rec)
        } else {
            self.intersect_range(ray, backface, any, 0, self.triangles.len() - 1, rec)
        }
    }

    /// Recursive BVH descent in closest-hit or any-hit mode.
    fn traverse<'a>(
        &'a self,
        node_index: i32,
        ray: &Ray,
        backface: bool,
        any: bool,
        max_t: f32,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        // A previous leaf already found an occluder
        if any && rec.t < max_t {
            return true;
        }

        let node = &self.bvh[node_index as usize];
        if !node.bounds.hit(ray) {
            return false;
        }

        if node.is_leaf() {
            self.intersect_range(ray, backface, any, node.start as usize, node.end as usize, rec)
        } else {
            let hit_left = self.traverse(node.left, ray, backface, any, max_t, rec);
            if any && hit_left {
                return true;
            }
            let hit_right = self.traverse(node.right, ray, backface, any, max_t, rec);
            hit_left || hit_right
        }
    }

    /// Test the inclusive triangle range `[start, end]` against the ray.
    fn intersect_range<'a>(
        &'a self,
        ray: &Ray,
        backface: bool,
        any: bool,
        start: usize,
        end: usize,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        let mut found = false;
        let mut tmp = HitRecord::new(rec.t);

        for i in start..=end {
            let tri = &self.triangles[i];
            let hit = intersect_triangle(
                ray,
                self.vertices[tri.v0 as usize],
                self.vertices[tri.v1 as usize],
                self.vertices[tri.v2 as usize],
                backface,
                rec.t,
                &mut tmp,
            );
            if hit && tmp.t < rec.t {
                *rec = tmp;
                rec.mesh = Some(self);
                rec.triangle_index = i;
                found = true;
                if any {
                    return true;
                }
            }
        }
        found
    }

    /// Terminator-corrected smooth intersection.
    ///
    /// Replaces the geometric normal with the Phong-interpolated vertex
    /// normal and nudges the shading point per Hanika, "Hacking the Shadow
    /// Terminator" (Ray Tracing Gems II, 2021), so that shadow rays from
    /// low-poly silhouettes do not self-intersect their own facets.
    pub fn smooth_intersection<'a>(&self, rec: &HitRecord<'a>) -> HitRecord<'a> {
        let tri = &self.triangles[rec.triangle_index];
        let p = rec.ip;

        let a = self.vertices[tri.v0 as usize];
        let b = self.vertices[tri.v1 as usize];
        let c = self.vertices[tri.v2 as usize];

        let na = self.vertex_normals[tri.v0 as usize];
        let nb = self.vertex_normals[tri.v1 as usize];
        let nc = self.vertex_normals[tri.v2 as usize];

        // Project the hit point onto each vertex's tangent plane; clamping
        // the distance at zero corrects concavities only.
        let tmp_w = p - a;
        let tmp_u = p - b;
        let tmp_v = p - c;
        let dot_w = tmp_w.dot(na).min(0.0);
        let dot_u = tmp_u.dot(nb).min(0.0);
        let dot_v = tmp_v.dot(nc).min(0.0);
        let tmp_w = tmp_w - dot_w * na;
        let tmp_u = tmp_u - dot_u * nb;
        let tmp_v = tmp_v - dot_v * nc;

        let mut smooth = *rec;
        smooth.ip = p + rec.u * tmp_u + rec.v * tmp_v + rec.w * tmp_w;
        smooth.normal = (na * rec.w + nb * rec.u + nc * rec.v).normalize();
        smooth
    }
}

/// Area-weighted vertex normals: each face's raw cross product accumulates
/// onto its three vertices, so larger faces weigh more, then the sums are
/// normalized. Isolated vertices keep the zero vector.
fn compute_vertex_normals(vertices: &[Vec3], triangles: &[Triangle]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; vertices.len()];

    for tri in triangles {
        let a = vertices[tri.v0 as usize];
        let b = vertices[tri.v1 as usize];
        let c = vertices[tri.v2 as usize];
        let face_normal = (b - a).cross(c - a);

        normals[tri.v0 as usize] += face_normal;
        normals[tri.v1 as usize] += face_normal;
        normals[tri.v2 as usize] += face_normal;
    }

    for n in &mut normals {
        let len = n.length();
        if len > 0.0 {
            *n /= len;
        }
    }
    normals
}
