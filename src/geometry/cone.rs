use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::SurfaceMatch;

/// A single-sheet circular cone in 3D space.
///
/// Defined by an apex, a directed unit axis pointing into the opening
/// sheet, and a half-angle in `(0, pi/2)`. Points behind the apex are
/// outside: `signed_eval` compares radial distance against the cone
/// opening measured along the directed axis only.
#[derive(Debug, Clone)]
pub struct Cone {
    apex: Point3,
    axis: Vector3,
    half_angle: f64,
    tan_half: f64,
}

impl Cone {
    /// Creates a new cone.
    ///
    /// # Arguments
    ///
    /// * `apex` - The apex (tip) of the cone
    /// * `axis` - Axis direction from the apex into the opening (will be normalized)
    /// * `half_angle` - Half-angle in radians (must be in `(0, pi/2)`)
    ///
    /// # Errors
    ///
    /// Returns an error if the half-angle is out of range or the axis is
    /// zero-length.
    pub fn new(apex: Point3, axis: Vector3, half_angle: f64) -> Result<Self> {
        if half_angle <= TOLERANCE || half_angle >= std::f64::consts::FRAC_PI_2 - TOLERANCE {
            return Err(
                GeometryError::Degenerate("cone half-angle must be in (0, pi/2)".into()).into(),
            );
        }

        let len = axis.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = axis / len;

        Ok(Self {
            apex,
            axis,
            half_angle,
            tan_half: half_angle.tan(),
        })
    }

    /// Returns the apex point.
    #[must_use]
    pub fn apex(&self) -> &Point3 {
        &self.apex
    }

    /// Returns the axis direction (unit vector, apex toward opening).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the half-angle in radians.
    #[must_use]
    pub fn half_angle(&self) -> f64 {
        self.half_angle
    }

    /// Radial distance of `point` from the axis, minus the cone opening
    /// at the point's axial position. Negative inside the open sheet.
    #[must_use]
    pub fn signed_eval(&self, point: &Point3) -> f64 {
        let d = point - self.apex;
        let axial = d.dot(&self.axis);
        let radial = (d - self.axis * axial).norm();
        radial - axial * self.tan_half
    }

    /// Compares canonical forms within `tolerance`. The axis is directed,
    /// so the mirror sheet is a distinct surface.
    #[must_use]
    pub fn coincident(&self, other: &Self, tolerance: f64) -> SurfaceMatch {
        if self.axis.dot(&other.axis) > 1.0 - tolerance
            && (self.apex - other.apex).norm() < tolerance
            && (self.half_angle - other.half_angle).abs() < tolerance
        {
            SurfaceMatch::Coincident
        } else {
            SurfaceMatch::Distinct
        }
    }
}
