//! Triangle meshes shared by every instance of a group.

use crate::group::GroupKind;
use crate::{Vec2, Vec3};
use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};

/// Per-vertex attributes: object-space position and normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// The mesh drawn for each instance of `kind`.
    pub fn for_group(kind: GroupKind) -> Self {
        match kind {
            GroupKind::Leaves => Self::cuboid(Vec3::new(1.0, 0.15, 0.4)),
            GroupKind::Lights => Self::uv_sphere(1.0, 8, 8),
            GroupKind::Ornaments => Self::uv_sphere(1.0, 12, 12),
            GroupKind::Gifts => Self::cuboid(Vec3::ONE),
        }
    }

    /// Box centered at the origin with flat-shaded faces.
    pub fn cuboid(size: Vec3) -> Self {
        let half = size * 0.5;
        // (normal, u, v) with u x v = normal, so each quad winds counter-clockwise from outside.
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut mesh = Mesh::default();
        for (normal, u, v) in faces {
            let center = normal * half;
            let (u, v) = (u * half, v * half);
            mesh.push_quad(
                [center - u - v, center + u - v, center + u + v, center - u + v],
                normal,
            );
        }
        mesh
    }

    /// Latitude/longitude sphere with smooth normals.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut mesh = Mesh::default();
        for iy in 0..=height_segments {
            let phi = iy as f32 / height_segments as f32 * PI;
            for ix in 0..=width_segments {
                let theta = ix as f32 / width_segments as f32 * TAU;
                let normal = Vec3::new(
                    -theta.cos() * phi.sin(),
                    phi.cos(),
                    theta.sin() * phi.sin(),
                );
                mesh.vertices.push(Vertex::new(normal * radius, normal));
            }
        }

        let row = width_segments + 1;
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                // Poles collapse to a single point; skip the degenerate triangle there.
                if iy != 0 {
                    mesh.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    mesh.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        mesh
    }

    /// Extrude a counter-clockwise outline in the XY plane along Z, centered on Z = 0.
    ///
    /// The caps are fanned from the origin, so the outline must be star-shaped
    /// around it (true for [`crate::pulse::star_outline`]).
    pub fn star_prism(outline: &[Vec2], depth: f32) -> Self {
        let mut mesh = Mesh::default();
        if outline.len() < 3 {
            return mesh;
        }
        let front = depth * 0.5;
        let back = -front;

        for (z, normal) in [(front, Vec3::Z), (back, Vec3::NEG_Z)] {
            let base = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex::new(Vec3::new(0.0, 0.0, z), normal));
            mesh.vertices
                .extend(outline.iter().map(|p| Vertex::new(p.extend(z), normal)));
            let n = outline.len() as u32;
            for i in 0..n {
                let j = (i + 1) % n;
                if z > 0.0 {
                    mesh.indices.extend_from_slice(&[base, base + 1 + i, base + 1 + j]);
                } else {
                    mesh.indices.extend_from_slice(&[base, base + 1 + j, base + 1 + i]);
                }
            }
        }

        for (i, &p) in outline.iter().enumerate() {
            let q = outline[(i + 1) % outline.len()];
            let edge = q - p;
            let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero();
            mesh.push_quad(
                [p.extend(back), q.extend(back), q.extend(front), p.extend(front)],
                normal,
            );
        }
        mesh
    }

    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        let base = self.vertices.len() as u32;
        self.vertices
            .extend(corners.iter().map(|&c| Vertex::new(c, normal)));
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}
