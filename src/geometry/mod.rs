mod cone;
mod cylinder;
mod plane;
mod sphere;

pub use cone::Cone;
pub use cylinder::Cylinder;
pub use plane::Plane;
pub use sphere::Sphere;

use crate::math::Point3;

/// Kind tag for a registered primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// An infinite plane.
    Plane,
    /// An infinite circular cylinder.
    Cylinder,
    /// A single-sheet circular cone.
    Cone,
    /// A sphere.
    Sphere,
}

/// Outcome of comparing two primitives by canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMatch {
    /// Different surfaces.
    Distinct,
    /// The same surface with the same orientation.
    Coincident,
    /// The same surface with reversed orientation (planes only).
    Reversed,
}

/// An analytic surface, owned by the surface registry after registration.
///
/// The signed half-space convention is shared by every kind: `signed_eval`
/// is positive on the "positive" side of the surface (the normal side of a
/// plane, outside a cylinder/cone/sphere), negative on the other side, and
/// zero on the surface itself.
#[derive(Debug, Clone)]
pub enum Primitive {
    /// A planar surface.
    Plane(Plane),
    /// A cylindrical surface.
    Cylinder(Cylinder),
    /// A conical surface.
    Cone(Cone),
    /// A spherical surface.
    Sphere(Sphere),
}

impl Primitive {
    /// Returns the kind tag of this primitive.
    #[must_use]
    pub fn kind(&self) -> SurfaceKind {
        match self {
            Self::Plane(_) => SurfaceKind::Plane,
            Self::Cylinder(_) => SurfaceKind::Cylinder,
            Self::Cone(_) => SurfaceKind::Cone,
            Self::Sphere(_) => SurfaceKind::Sphere,
        }
    }

    /// Evaluates the signed half-space value of `point`.
    #[must_use]
    pub fn signed_eval(&self, point: &Point3) -> f64 {
        match self {
            Self::Plane(s) => s.signed_eval(point),
            Self::Cylinder(s) => s.signed_eval(point),
            Self::Cone(s) => s.signed_eval(point),
            Self::Sphere(s) => s.signed_eval(point),
        }
    }

    /// Compares two primitives by canonical form within `tolerance`.
    ///
    /// Primitives of different kinds are always [`SurfaceMatch::Distinct`];
    /// near-duplicates outside the tolerance are distinct surfaces by
    /// design, never an error.
    #[must_use]
    pub fn coincident(&self, other: &Self, tolerance: f64) -> SurfaceMatch {
        match (self, other) {
            (Self::Plane(a), Self::Plane(b)) => a.coincident(b, tolerance),
            (Self::Cylinder(a), Self::Cylinder(b)) => a.coincident(b, tolerance),
            (Self::Cone(a), Self::Cone(b)) => a.coincident(b, tolerance),
            (Self::Sphere(a), Self::Sphere(b)) => a.coincident(b, tolerance),
            _ => SurfaceMatch::Distinct,
        }
    }
}

impl From<Plane> for Primitive {
    fn from(surface: Plane) -> Self {
        Self::Plane(surface)
    }
}

impl From<Cylinder> for Primitive {
    fn from(surface: Cylinder) -> Self {
        Self::Cylinder(surface)
    }
}

impl From<Cone> for Primitive {
    fn from(surface: Cone) -> Self {
        Self::Cone(surface)
    }
}

impl From<Sphere> for Primitive {
    fn from(surface: Sphere) -> Self {
        Self::Sphere(surface)
    }
}
