use crate::error::{GeometryError, Result};
use crate::math::{Point3, TOLERANCE};

use super::SurfaceMatch;

/// A sphere in 3D space, defined by center and radius.
///
/// `signed_eval` is negative inside and positive outside.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Point3,
    radius: f64,
}

impl Sphere {
    /// Creates a new sphere.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive.
    pub fn new(center: Point3, radius: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("sphere radius must be positive".into()).into());
        }
        Ok(Self { center, radius })
    }

    /// Returns the center of the sphere.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Distance from `point` to the center, minus the radius.
    #[must_use]
    pub fn signed_eval(&self, point: &Point3) -> f64 {
        (point - self.center).norm() - self.radius
    }

    /// Compares canonical forms within `tolerance`.
    #[must_use]
    pub fn coincident(&self, other: &Self, tolerance: f64) -> SurfaceMatch {
        if (self.center - other.center).norm() < tolerance
            && (self.radius - other.radius).abs() < tolerance
        {
            SurfaceMatch::Coincident
        } else {
            SurfaceMatch::Distinct
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn signed_eval_sides() {
        let s = Sphere::new(Point3::new(1.0, 0.0, 0.0), 2.0).unwrap();
        assert!(s.signed_eval(&Point3::new(1.0, 1.0, 0.0)) < 0.0);
        assert!(s.signed_eval(&Point3::new(5.0, 0.0, 0.0)) > 0.0);
        assert_relative_eq!(s.signed_eval(&Point3::new(3.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn coincident_within_tolerance() {
        let a = Sphere::new(Point3::origin(), 1.0).unwrap();
        let b = Sphere::new(Point3::new(1e-7, 0.0, 0.0), 1.0 + 1e-7).unwrap();
        let c = Sphere::new(Point3::new(0.1, 0.0, 0.0), 1.0).unwrap();
        assert_eq!(a.coincident(&b, 1e-5), SurfaceMatch::Coincident);
        assert_eq!(a.coincident(&c, 1e-5), SurfaceMatch::Distinct);
    }

    #[test]
    fn invalid_radius() {
        assert!(Sphere::new(Point3::origin(), -1.0).is_err());
    }
}
