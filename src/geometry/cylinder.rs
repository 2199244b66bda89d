use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::SurfaceMatch;

/// An infinite circular cylinder in 3D space.
///
/// Stored in canonical form: the unit axis direction and the foot of the
/// perpendicular from the global origin to the axis line, so any two
/// descriptions of the same axis line canonicalize to the same point
/// regardless of which point on the axis was given or which way the axis
/// vector ran.
///
/// `signed_eval` is negative inside the cylinder and positive outside.
#[derive(Debug, Clone)]
pub struct Cylinder {
    foot: Point3,
    axis: Vector3,
    radius: f64,
}

impl Cylinder {
    /// Creates a new cylinder from a point on its axis, the axis
    /// direction, and the radius.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive or the axis is
    /// zero-length.
    pub fn new(point: Point3, axis: Vector3, radius: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("cylinder radius must be positive".into()).into());
        }

        let len = axis.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = axis / len;

        let foot = point - axis * axis.dot(&point.coords);
        Ok(Self { foot, axis, radius })
    }

    /// Returns the canonical axis point (foot of perpendicular from the origin).
    #[must_use]
    pub fn foot(&self) -> &Point3 {
        &self.foot
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Distance from `point` to the axis, minus the radius.
    #[must_use]
    pub fn signed_eval(&self, point: &Point3) -> f64 {
        let d = point - self.foot;
        let radial = d - self.axis * d.dot(&self.axis);
        radial.norm() - self.radius
    }

    /// Compares canonical forms within `tolerance`.
    ///
    /// The axis line is undirected, so a reversed axis vector still
    /// matches; orientation never flips for a quadric.
    #[must_use]
    pub fn coincident(&self, other: &Self, tolerance: f64) -> SurfaceMatch {
        if self.axis.dot(&other.axis).abs() > 1.0 - tolerance
            && (self.foot - other.foot).norm() < tolerance
            && (self.radius - other.radius).abs() < tolerance
        {
            SurfaceMatch::Coincident
        } else {
            SurfaceMatch::Distinct
        }
    }
}
