mod cell;
mod index;

pub use cell::{Cell, CellId, CellRegistry, Exterior};
pub use index::IndexBlock;

use std::collections::BTreeMap;

use crate::error::RegistryError;
use crate::geometry::{Primitive, SurfaceMatch};

use index::IndexAllocator;

/// Default deduplication tolerance, in facility length units.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

/// A signed reference to a registered [`Primitive`].
///
/// The magnitude identifies the surface; the sign selects which half-space
/// counts as "inside" when the handle is used in a region expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(i64);

impl Handle {
    /// Creates a handle from a raw signed value; zero is not a handle.
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        (value != 0).then_some(Self(value))
    }

    /// Returns the raw signed value.
    #[must_use]
    pub fn value(self) -> i64 {
        self.0
    }

    /// Returns the magnitude identifying the surface.
    #[must_use]
    pub fn magnitude(self) -> i64 {
        self.0.abs()
    }

    /// Returns `true` if the handle selects the positive half-space.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns the handle for the opposite half-space.
    #[must_use]
    pub fn flipped(self) -> Self {
        Self(-self.0)
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Central store of analytic surfaces, deduplicated by canonical form.
///
/// Registering logically-identical geometry any number of times yields a
/// behaviorally-equivalent handle, keeping downstream cell counts
/// proportional to distinct geometry rather than call count. New
/// magnitudes come from per-component [`IndexBlock`]s so repeated
/// sub-structures never collide.
#[derive(Debug)]
pub struct SurfaceRegistry {
    tolerance: f64,
    surfaces: BTreeMap<i64, Primitive>,
    allocator: IndexAllocator,
}

impl SurfaceRegistry {
    /// Creates an empty registry with the default tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_TOLERANCE)
    }

    /// Creates an empty registry with an explicit dedup tolerance.
    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            surfaces: BTreeMap::new(),
            allocator: IndexAllocator::new(1),
        }
    }

    /// Returns the dedup tolerance.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Reserves a contiguous block of surface magnitudes for one component.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is non-positive or the id space is
    /// exhausted.
    pub fn reserve_block(&mut self, size: i64) -> Result<IndexBlock, RegistryError> {
        self.allocator.reserve(size)
    }

    /// Registers a primitive, deduplicating against existing entries.
    ///
    /// If a surface coincident within the tolerance already exists, its
    /// handle is returned (negated when the match has reversed
    /// orientation, so the sign semantics of the request are preserved).
    /// Otherwise the next magnitude of `block` is consumed and a positive
    /// handle returned.
    ///
    /// # Errors
    ///
    /// Returns an error if `block` is exhausted.
    pub fn register(
        &mut self,
        block: &mut IndexBlock,
        primitive: Primitive,
    ) -> Result<Handle, RegistryError> {
        for (&magnitude, existing) in &self.surfaces {
            match primitive.coincident(existing, self.tolerance) {
                SurfaceMatch::Coincident => return Ok(Handle(magnitude)),
                SurfaceMatch::Reversed => return Ok(Handle(-magnitude)),
                SurfaceMatch::Distinct => {}
            }
        }
        let magnitude = block.take()?;
        self.surfaces.insert(magnitude, primitive);
        Ok(Handle(magnitude))
    }

    /// Looks up the primitive behind a handle.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownHandle`] if the magnitude was never
    /// registered. This is a programming-error class: callers report it
    /// with the owning component's identity and abort that build.
    pub fn resolve(&self, handle: Handle) -> Result<&Primitive, RegistryError> {
        self.surfaces
            .get(&handle.magnitude())
            .ok_or(RegistryError::UnknownHandle(handle.value()))
    }

    /// Returns the number of distinct registered surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Returns `true` if no surface has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl Default for SurfaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Plane, Sphere};
    use crate::math::{Point3, Vector3};

    fn y_plane(y: f64) -> Primitive {
        Plane::new(Point3::new(0.0, y, 0.0), Vector3::y())
            .unwrap()
            .into()
    }

    #[test]
    fn register_dedup_idempotent() {
        let mut reg = SurfaceRegistry::new();
        let mut block = reg.reserve_block(10).unwrap();
        let first = reg.register(&mut block, y_plane(0.0)).unwrap();
        for _ in 0..5 {
            let again = reg.register(&mut block, y_plane(0.0)).unwrap();
            assert_eq!(first, again);
        }
        assert_eq!(reg.len(), 1);
        assert_eq!(block.remaining(), 9);
    }

    #[test]
    fn reversed_plane_reuses_surface_with_flipped_sign() {
        let mut reg = SurfaceRegistry::new();
        let mut block = reg.reserve_block(10).unwrap();
        let up = reg.register(&mut block, y_plane(0.0)).unwrap();
        let down = reg
            .register(
                &mut block,
                Plane::new(Point3::origin(), -Vector3::y()).unwrap().into(),
            )
            .unwrap();
        assert_eq!(down, up.flipped());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn near_duplicate_outside_tolerance_is_distinct() {
        let mut reg = SurfaceRegistry::with_tolerance(1e-5);
        let mut block = reg.reserve_block(10).unwrap();
        let a = reg.register(&mut block, y_plane(0.0)).unwrap();
        let b = reg.register(&mut block, y_plane(1e-3)).unwrap();
        assert_ne!(a.magnitude(), b.magnitude());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn blocks_do_not_alias() {
        let mut reg = SurfaceRegistry::new();
        let mut a = reg.reserve_block(100).unwrap();
        let mut b = reg.reserve_block(100).unwrap();
        let ha = reg.register(&mut a, y_plane(1.0)).unwrap();
        let hb = reg
            .register(&mut b, Sphere::new(Point3::origin(), 1.0).unwrap().into())
            .unwrap();
        assert!(a.contains(ha.magnitude()));
        assert!(b.contains(hb.magnitude()));
        assert!(!a.contains(hb.magnitude()));
    }

    #[test]
    fn resolve_unknown_handle_fails() {
        let reg = SurfaceRegistry::new();
        let handle = Handle::new(42).unwrap();
        assert!(matches!(
            reg.resolve(handle),
            Err(RegistryError::UnknownHandle(42))
        ));
    }

    #[test]
    fn handle_zero_rejected() {
        assert!(Handle::new(0).is_none());
        assert_eq!(Handle::new(-7).unwrap().magnitude(), 7);
    }
}
