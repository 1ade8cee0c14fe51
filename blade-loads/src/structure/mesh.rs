//! In-memory shell mesh with the solid-modelling queries of the load mapping

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::edges::EdgeSegment;
use super::fe::{GeometryKernel, MeshQuery};
use crate::error::{BladeError, BladeResult};
use crate::math::Vec3;

/// A 3D node of the shell mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// X coordinate (chordwise)
    pub x: f64,
    /// Y coordinate (spanwise)
    pub y: f64,
    /// Z coordinate (thickness direction)
    pub z: f64,
}

impl Node {
    /// Create a new node at the given coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Get the coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Calculate distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        (other.to_vec3() - self.to_vec3()).norm()
    }
}

/// A shell element given by its corner nodes (counter-clockwise)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellElement {
    pub nodes: Vec<usize>,
}

/// Leading and trailing edge point of one planform station
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordStation {
    pub leading: Vec3,
    pub trailing: Vec3,
}

impl ChordStation {
    pub fn new(leading: [f64; 3], trailing: [f64; 3]) -> Self {
        Self {
            leading: Vec3::from(leading),
            trailing: Vec3::from(trailing),
        }
    }
}

/// Shell mesh plus keypoints, boundary lines and areas.
///
/// Numbering is 1-based for every entity, as in the FE solver.
#[derive(Debug, Clone, Default)]
pub struct ShellMesh {
    nodes: BTreeMap<usize, Node>,
    elements: BTreeMap<usize, ShellElement>,
    keypoints: BTreeMap<usize, Vec3>,
    /// Boundary lines as polylines
    lines: BTreeMap<usize, Vec<Vec3>>,
    areas: BTreeMap<usize, Vec<usize>>,
}

impl ShellMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the mesh
    pub fn add_node(&mut self, id: usize, node: Node) -> BladeResult<()> {
        if self.nodes.contains_key(&id) {
            return Err(BladeError::InvalidInput(format!("node {} already exists", id)));
        }
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Add a shell element to the mesh
    pub fn add_element(&mut self, id: usize, nodes: Vec<usize>) -> BladeResult<()> {
        if self.elements.contains_key(&id) {
            return Err(BladeError::InvalidInput(format!("element {} already exists", id)));
        }
        if nodes.len() < 3 {
            return Err(BladeError::InvalidInput(format!(
                "element {} needs at least 3 nodes",
                id
            )));
        }
        if let Some(missing) = nodes.iter().find(|n| !self.nodes.contains_key(*n)) {
            return Err(BladeError::InvalidInput(format!(
                "element {} references missing node {}",
                id, missing
            )));
        }
        self.elements.insert(id, ShellElement { nodes });
        Ok(())
    }

    /// Add a boundary line through the given points
    pub fn add_line(&mut self, id: usize, points: Vec<Vec3>) -> BladeResult<()> {
        if points.len() < 2 {
            return Err(BladeError::InvalidInput(format!("line {} needs two points", id)));
        }
        self.lines.insert(id, points);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn keypoint_count(&self) -> usize {
        self.keypoints.len()
    }

    /// Mesh a blade planform between chord stations.
    ///
    /// Each segment between two stations is meshed with `n_chord` ×
    /// `n_span` quads and gets its own leading edge line `2k + 1` and
    /// trailing edge line `2k + 2` (k = segment index). Stations must be
    /// ordered by increasing span coordinate.
    pub fn from_planform(stations: &[ChordStation], n_chord: usize, n_span: usize) -> BladeResult<Self> {
        if stations.len() < 2 || n_chord == 0 || n_span == 0 {
            return Err(BladeError::InvalidInput(
                "planform mesh needs two stations and a positive division".to_string(),
            ));
        }
        if stations.windows(2).any(|w| w[1].leading.y <= w[0].leading.y) {
            return Err(BladeError::InvalidInput(
                "planform stations must be ordered by span".to_string(),
            ));
        }

        let mut mesh = Self::new();
        let rows = (stations.len() - 1) * n_span + 1;
        let cols = n_chord + 1;

        for row in 0..rows {
            let segment = (row / n_span).min(stations.len() - 2);
            let t = (row - segment * n_span) as f64 / n_span as f64;
            let (a, b) = (&stations[segment], &stations[segment + 1]);
            let le = a.leading.lerp(&b.leading, t);
            let te = a.trailing.lerp(&b.trailing, t);
            for col in 0..cols {
                let p = le.lerp(&te, col as f64 / n_chord as f64);
                mesh.add_node(row * cols + col + 1, Node::new(p.x, p.y, p.z))?;
            }
        }

        let mut id = 1;
        for row in 0..rows - 1 {
            for col in 0..n_chord {
                let n1 = row * cols + col + 1;
                mesh.add_element(id, vec![n1, n1 + 1, n1 + 1 + cols, n1 + cols])?;
                id += 1;
            }
        }

        for (k, w) in stations.windows(2).enumerate() {
            mesh.add_line(2 * k + 1, vec![w[0].leading, w[1].leading])?;
            mesh.add_line(2 * k + 2, vec![w[0].trailing, w[1].trailing])?;
        }
        Ok(mesh)
    }

    /// Edge lookup table matching the lines of [`ShellMesh::from_planform`]
    pub fn planform_edge_segments(stations: &[ChordStation]) -> Vec<EdgeSegment> {
        let n = stations.len().saturating_sub(1);
        (0..n)
            .map(|k| EdgeSegment {
                max_span: if k + 1 == n {
                    f64::INFINITY
                } else {
                    stations[k + 1].leading.y
                },
                leading_line: 2 * k + 1,
                trailing_line: 2 * k + 2,
            })
            .collect()
    }

    fn element(&self, element: usize) -> BladeResult<&ShellElement> {
        self.elements
            .get(&element)
            .ok_or_else(|| BladeError::InvalidInput(format!("element {} not found", element)))
    }

    fn corners(&self, element: usize) -> BladeResult<Vec<Vec3>> {
        self.element(element)?
            .nodes
            .iter()
            .map(|&n| self.node_location(n))
            .collect()
    }

    /// Fan triangulation from the first corner: (area, centroid) per triangle
    fn triangles(corners: &[Vec3]) -> Vec<(f64, Vec3)> {
        (1..corners.len() - 1)
            .map(|i| {
                let (a, b, c) = (corners[0], corners[i], corners[i + 1]);
                (0.5 * (b - a).cross(&(c - a)).norm(), (a + b + c) / 3.0)
            })
            .collect()
    }

    fn next_keypoint_id(&self) -> usize {
        self.keypoints.keys().next_back().map_or(1, |k| k + 1)
    }
}

impl MeshQuery for ShellMesh {
    fn element_ids(&self) -> Vec<usize> {
        self.elements.keys().copied().collect()
    }

    fn centroid(&self, element: usize) -> BladeResult<Vec3> {
        let tris = Self::triangles(&self.corners(element)?);
        let total: f64 = tris.iter().map(|(a, _)| a).sum();
        if total <= 0.0 {
            return Err(BladeError::InvalidInput(format!(
                "element {} is degenerate",
                element
            )));
        }
        Ok(tris.iter().fold(Vec3::zeros(), |acc, (a, c)| acc + c * *a) / total)
    }

    fn area(&self, element: usize) -> BladeResult<f64> {
        Ok(Self::triangles(&self.corners(element)?)
            .iter()
            .map(|(a, _)| a)
            .sum())
    }

    fn element_nodes(&self, element: usize) -> BladeResult<Vec<usize>> {
        Ok(self.element(element)?.nodes.clone())
    }

    fn node_location(&self, node: usize) -> BladeResult<Vec3> {
        self.nodes
            .get(&node)
            .map(Node::to_vec3)
            .ok_or_else(|| BladeError::InvalidInput(format!("node {} not found", node)))
    }
}

impl GeometryKernel for ShellMesh {
    fn keypoint(&mut self, id: usize, location: Vec3) -> BladeResult<()> {
        self.keypoints.insert(id, location);
        Ok(())
    }

    fn area_from_keypoints(&mut self, keypoints: &[usize]) -> BladeResult<usize> {
        if keypoints.len() < 3 {
            return Err(BladeError::InvalidInput("area needs three keypoints".to_string()));
        }
        if let Some(missing) = keypoints.iter().find(|k| !self.keypoints.contains_key(*k)) {
            return Err(BladeError::InvalidInput(format!("keypoint {} not found", missing)));
        }
        let id = self.areas.keys().next_back().map_or(1, |a| a + 1);
        self.areas.insert(id, keypoints.to_vec());
        Ok(id)
    }

    fn intersect_line_area(&mut self, line: usize, area: usize) -> BladeResult<Option<usize>> {
        let points = self
            .lines
            .get(&line)
            .ok_or_else(|| BladeError::InvalidInput(format!("line {} not found", line)))?;
        let corners = self
            .areas
            .get(&area)
            .ok_or_else(|| BladeError::InvalidInput(format!("area {} not found", area)))?
            .iter()
            .map(|k| self.keypoint_location(*k))
            .collect::<BladeResult<Vec<_>>>()?;

        let normal = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
        if normal.norm() < 1e-12 {
            return Err(BladeError::InvalidInput(format!("area {} is degenerate", area)));
        }
        let normal = normal.normalize();

        let hit = points.windows(2).find_map(|seg| {
            let d0 = normal.dot(&(seg[0] - corners[0]));
            let d1 = normal.dot(&(seg[1] - corners[0]));
            if d0 == 0.0 {
                Some(seg[0])
            } else if d0 * d1 <= 0.0 {
                Some(seg[0] + (seg[1] - seg[0]) * (d0 / (d0 - d1)))
            } else {
                None
            }
        });

        // the hit must lie inside the (convex) area
        let inside = |p: &Vec3| {
            let n = corners.len();
            (0..n).all(|i| {
                let edge = corners[(i + 1) % n] - corners[i];
                edge.cross(&(p - corners[i])).dot(&normal) >= -1e-9
            })
        };

        match hit {
            Some(p) if inside(&p) => {
                let id = self.next_keypoint_id();
                self.keypoints.insert(id, p);
                Ok(Some(id))
            }
            _ => Ok(None),
        }
    }

    fn keypoint_location(&self, id: usize) -> BladeResult<Vec3> {
        self.keypoints
            .get(&id)
            .copied()
            .ok_or_else(|| BladeError::InvalidInput(format!("keypoint {} not found", id)))
    }

    fn delete_keypoint(&mut self, id: usize) -> BladeResult<()> {
        self.keypoints
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| BladeError::InvalidInput(format!("keypoint {} not found", id)))
    }

    fn delete_area(&mut self, area: usize) -> BladeResult<()> {
        self.areas
            .remove(&area)
            .map(|_| ())
            .ok_or_else(|| BladeError::InvalidInput(format!("area {} not found", area)))
    }
}
