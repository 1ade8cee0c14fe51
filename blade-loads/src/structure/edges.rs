//! Leading and trailing edge lookup by cutting the blade surface

use serde::{Deserialize, Serialize};

use super::fe::GeometryKernel;
use crate::error::{BladeError, BladeResult};
use crate::math::Vec3;

/// Boundary lines governing the blade up to a span coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSegment {
    /// Upper span coordinate (inclusive) of this segment
    pub max_span: f64,
    pub leading_line: usize,
    pub trailing_line: usize,
}

/// Edge points and chord length at one span coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges {
    pub leading: Vec3,
    pub trailing: Vec3,
    pub chord: f64,
}

/// Finds the blade edges by intersecting a temporary cutting plane
/// `y = span` with the boundary lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLocator {
    /// Segments ordered by `max_span`
    pub segments: Vec<EdgeSegment>,
    /// Half size of the cutting plane in x and z
    pub plane_extent: f64,
    /// First keypoint number of the temporary plane corners
    pub keypoint_base: usize,
}

impl EdgeLocator {
    pub fn new(segments: Vec<EdgeSegment>) -> Self {
        Self {
            segments,
            plane_extent: 1000.0,
            keypoint_base: 100_000,
        }
    }

    /// Line layout of the three-part blade model (root, mid, tip)
    pub fn three_part_blade() -> Self {
        Self::new(vec![
            EdgeSegment { max_span: 92.0, leading_line: 5, trailing_line: 2 },
            EdgeSegment { max_span: 390.0, leading_line: 6, trailing_line: 3 },
            EdgeSegment { max_span: f64::INFINITY, leading_line: 7, trailing_line: 12 },
        ])
    }

    fn segment(&self, span: f64) -> BladeResult<&EdgeSegment> {
        self.segments
            .iter()
            .find(|s| span <= s.max_span)
            .or_else(|| self.segments.last())
            .ok_or_else(|| BladeError::GeometryQuery {
                span,
                reason: "no edge segments configured".to_string(),
            })
    }

    /// Leading edge, trailing edge and chord length at `span`
    pub fn locate(&self, kernel: &mut impl GeometryKernel, span: f64) -> BladeResult<Edges> {
        let seg = *self.segment(span)?;
        let leading = self.intersect(kernel, seg.leading_line, span)?;
        let trailing = self.intersect(kernel, seg.trailing_line, span)?;

        let chord = (trailing - leading).norm();
        if !(chord > 1e-9) {
            return Err(BladeError::GeometryQuery {
                span,
                reason: format!("degenerate chord length {:e}", chord),
            });
        }
        Ok(Edges { leading, trailing, chord })
    }

    fn intersect(&self, kernel: &mut impl GeometryKernel, line: usize, span: f64) -> BladeResult<Vec3> {
        let e = self.plane_extent;
        let corners = [(-e, -e), (e, -e), (e, e), (-e, e)];
        let ids: Vec<usize> = (1..=4).map(|i| self.keypoint_base + i).collect();
        for (id, (x, z)) in ids.iter().zip(corners.iter()) {
            kernel.keypoint(*id, Vec3::new(*x, span, *z))?;
        }
        let area = kernel.area_from_keypoints(&ids)?;

        let hit = kernel.intersect_line_area(line, area);
        let location = match hit {
            Ok(Some(kp)) => {
                let location = kernel.keypoint_location(kp);
                kernel.delete_keypoint(kp)?;
                location
            }
            Ok(None) => Err(BladeError::GeometryQuery {
                span,
                reason: format!("cutting plane misses line {}", line),
            }),
            Err(e) => Err(BladeError::GeometryQuery {
                span,
                reason: e.to_string(),
            }),
        };

        kernel.delete_area(area)?;
        for id in &ids {
            kernel.delete_keypoint(*id)?;
        }
        location
    }
}
