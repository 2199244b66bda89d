use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::SurfaceMatch;

/// An infinite oriented plane in 3D space.
///
/// Stored in canonical form as a unit normal `n` and signed offset `d`
/// such that the plane is the locus `n . p = d`. The positive half-space
/// is the side the normal points into.
#[derive(Debug, Clone)]
pub struct Plane {
    normal: Vector3,
    offset: f64,
}

impl Plane {
    /// Creates a plane through `origin` with the given normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is zero-length.
    pub fn new(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;
        let offset = normal.dot(&origin.coords);
        Ok(Self { normal, offset })
    }

    /// Creates a plane through three points.
    ///
    /// The normal is `(b - a) x (c - a)`, so the points wind
    /// counter-clockwise when viewed from the positive side.
    ///
    /// # Errors
    ///
    /// Returns an error if the points are collinear.
    pub fn from_points(a: Point3, b: Point3, c: Point3) -> Result<Self> {
        let normal = (b - a).cross(&(c - a));
        if normal.norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("plane points are collinear".into()).into());
        }
        Self::new(a, normal)
    }

    /// Returns the unit normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the signed offset `d` in `n . p = d`.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Signed distance from `point` to the plane, positive on the normal side.
    #[must_use]
    pub fn signed_eval(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Compares canonical forms within `tolerance`.
    ///
    /// A plane built with the reversed normal is the same surface with
    /// opposite orientation and reports [`SurfaceMatch::Reversed`].
    #[must_use]
    pub fn coincident(&self, other: &Self, tolerance: f64) -> SurfaceMatch {
        let align = self.normal.dot(&other.normal);
        if align > 1.0 - tolerance && (self.offset - other.offset).abs() < tolerance {
            SurfaceMatch::Coincident
        } else if align < tolerance - 1.0 && (self.offset + other.offset).abs() < tolerance {
            SurfaceMatch::Reversed
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
        let p = Plane::new(Point3::origin(), Vector3::y()).unwrap();
        assert!(p.signed_eval(&Point3::new(0.0, 2.0, 0.0)) > 0.0);
        assert!(p.signed_eval(&Point3::new(5.0, -2.0, 1.0)) < 0.0);
        assert_relative_eq!(p.signed_eval(&Point3::new(3.0, 0.0, -7.0)), 0.0);
    }

    #[test]
    fn offset_from_origin() {
        let p = Plane::new(Point3::new(0.0, 4.0, 0.0), Vector3::new(0.0, 2.0, 0.0)).unwrap();
        assert_relative_eq!(p.offset(), 4.0);
        assert_relative_eq!(p.signed_eval(&Point3::new(1.0, 7.0, 1.0)), 3.0);
    }

    #[test]
    fn from_points_winding() {
        let p = Plane::from_points(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        // CCW in the XY plane gives a +Z normal
        assert!(p.signed_eval(&Point3::new(0.0, 0.0, 1.0)) > 0.0);
    }

    #[test]
    fn coincident_same_and_reversed() {
        let a = Plane::new(Point3::new(0.0, 1.0, 0.0), Vector3::y()).unwrap();
        let b = Plane::new(Point3::new(9.0, 1.0, -3.0), Vector3::new(0.0, 0.5, 0.0)).unwrap();
        let c = Plane::new(Point3::new(9.0, 1.0, -3.0), -Vector3::y()).unwrap();
        let d = Plane::new(Point3::new(0.0, 2.0, 0.0), Vector3::y()).unwrap();
        assert_eq!(a.coincident(&b, 1e-5), SurfaceMatch::Coincident);
        assert_eq!(a.coincident(&c, 1e-5), SurfaceMatch::Reversed);
        assert_eq!(a.coincident(&d, 1e-5), SurfaceMatch::Distinct);
    }

    #[test]
    fn zero_normal_rejected() {
        assert!(Plane::new(Point3::origin(), Vector3::zeros()).is_err());
    }

    #[test]
    fn collinear_points_rejected() {
        let r = Plane::from_points(
            Point3::origin(),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        );
        assert!(r.is_err());
    }
}
