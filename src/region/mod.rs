mod parse;
mod template;

pub use template::CompositeTemplate;

use std::fmt;

use crate::error::{RegionError, Result};
use crate::math::Point3;
use crate::registry::{Handle, SurfaceRegistry};

/// A Boolean region over signed surface handles, describing a solid.
///
/// The tree is the primary representation; the whitespace/`:` text grammar
/// consumed and produced by [`Region::parse`] and [`fmt::Display`] is a
/// serialization boundary for the downstream transport-engine format.
#[derive(Debug, Clone)]
pub enum Region {
    /// One signed half-space test.
    Literal(Handle),
    /// Logical complement. Lowered by De Morgan on display, since the
    /// interchange grammar has no NOT token.
    Not(Box<Region>),
    /// Intersection of the children; empty means "everywhere".
    And(Vec<Region>),
    /// Union of the children.
    Or(Vec<Region>),
}

impl Region {
    /// The empty, always-true region: the identity element for
    /// intersection.
    #[must_use]
    pub fn all() -> Self {
        Self::And(Vec::new())
    }

    /// A single-literal region.
    #[must_use]
    pub fn literal(handle: Handle) -> Self {
        Self::Literal(handle)
    }

    /// Parses region text: whitespace-separated signed integers intersect
    /// by adjacency, `:` unions (binding looser), parentheses group, and a
    /// leading `-` selects the opposite half-space of a literal.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::Malformed`] on unbalanced parentheses, a
    /// dangling operator, an empty group, or a zero literal.
    pub fn parse(text: &str) -> std::result::Result<Self, RegionError> {
        parse::parse(text, &|magnitude| magnitude)
    }

    /// Parses region text, remapping each literal's local magnitude to a
    /// global one (the usual case when a component authored its formula
    /// against block-local ids).
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::Malformed`] on bad text or when the map
    /// produces a non-positive magnitude.
    pub fn parse_mapped(
        text: &str,
        map: impl Fn(i64) -> i64,
    ) -> std::result::Result<Self, RegionError> {
        parse::parse(text, &map)
    }

    /// Returns `true` if the region contains no literal at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals().is_empty()
    }

    /// Collects every literal handle in the tree, in syntactic order.
    #[must_use]
    pub fn literals(&self) -> Vec<Handle> {
        fn walk(region: &Region, out: &mut Vec<Handle>) {
            match region {
                Region::Literal(h) => out.push(*h),
                Region::Not(inner) => walk(inner, out),
                Region::And(children) | Region::Or(children) => {
                    for child in children {
                        walk(child, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Intersects two regions structurally, without reparsing. The empty
    /// region is the identity.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        match (self, other) {
            (Self::And(mut a), Self::And(b)) => {
                a.extend(b);
                Self::And(a)
            }
            (Self::And(mut a), r) => {
                a.push(r);
                Self::And(a)
            }
            (r, Self::And(mut b)) => {
                b.insert(0, r);
                Self::And(b)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    /// Unions two regions structurally.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::EmptyUnion`] if either side is empty: the
    /// result would be universally true and collapse any containment
    /// test, which is always a caller bug.
    pub fn union(self, other: Self) -> std::result::Result<Self, RegionError> {
        if self.is_empty() || other.is_empty() {
            return Err(RegionError::EmptyUnion);
        }
        Ok(match (self, other) {
            (Self::Or(mut a), Self::Or(b)) => {
                a.extend(b);
                Self::Or(a)
            }
            (Self::Or(mut a), r) => {
                a.push(r);
                Self::Or(a)
            }
            (r, Self::Or(mut b)) => {
                b.insert(0, r);
                Self::Or(b)
            }
            (a, b) => Self::Or(vec![a, b]),
        })
    }

    /// Returns the logical negation via De Morgan's laws: AND and OR swap
    /// and every literal's sign flips.
    #[must_use]
    pub fn complement(&self) -> Self {
        match self {
            Self::Literal(h) => Self::Literal(h.flipped()),
            Self::Not(inner) => (**inner).clone(),
            Self::And(children) => Self::Or(children.iter().map(Self::complement).collect()),
            Self::Or(children) => Self::And(children.iter().map(Self::complement).collect()),
        }
    }

    /// Replaces every occurrence of `target` with `replacement`, and of
    /// `target`'s negation with the replacement's complement. Used to
    /// back-fill a placeholder boundary once a neighbouring component has
    /// defined its actual exit surface.
    #[must_use]
    pub fn substitute(&self, target: Handle, replacement: &Self) -> Self {
        match self {
            Self::Literal(h) if *h == target => replacement.clone(),
            Self::Literal(h) if *h == target.flipped() => replacement.complement(),
            Self::Literal(h) => Self::Literal(*h),
            Self::Not(inner) => Self::Not(Box::new(inner.substitute(target, replacement))),
            Self::And(children) => Self::And(
                children
                    .iter()
                    .map(|c| c.substitute(target, replacement))
                    .collect(),
            ),
            Self::Or(children) => Self::Or(
                children
                    .iter()
                    .map(|c| c.substitute(target, replacement))
                    .collect(),
            ),
        }
    }

    /// Tests whether `point` lies in the region.
    ///
    /// Each literal resolves its primitive in `registry` and tests the
    /// half-space its sign selects; AND/OR short-circuit. Points exactly
    /// on a surface are on neither side.
    ///
    /// # Errors
    ///
    /// Returns an error if a literal's handle does not resolve; an
    /// unresolved handle is never treated as "outside".
    pub fn is_valid(&self, point: &Point3, registry: &SurfaceRegistry) -> Result<bool> {
        match self {
            Self::Literal(h) => {
                let value = registry.resolve(*h)?.signed_eval(point);
                Ok(if h.is_positive() {
                    value > 0.0
                } else {
                    value < 0.0
                })
            }
            Self::Not(inner) => Ok(!inner.is_valid(point, registry)?),
            Self::And(children) => {
                for child in children {
                    if !child.is_valid(point, registry)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(children) => {
                for child in children {
                    if child.is_valid(point, registry)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Rewrites the tree without `Not` nodes by pushing complements down
    /// to the literals.
    fn lowered(&self) -> Self {
        match self {
            Self::Literal(_) => self.clone(),
            Self::Not(inner) => inner.lowered().complement(),
            Self::And(children) => Self::And(children.iter().map(Self::lowered).collect()),
            Self::Or(children) => Self::Or(children.iter().map(Self::lowered).collect()),
        }
    }

    fn fmt_lowered(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(h) => write!(f, "{h}"),
            // lowered() removes Not nodes; handle one anyway
            Self::Not(inner) => inner.lowered().complement().fmt_lowered(f),
            Self::And(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    if matches!(child, Self::Or(grand) if grand.len() > 1) {
                        write!(f, "( ")?;
                        child.fmt_lowered(f)?;
                        write!(f, " )")?;
                    } else {
                        child.fmt_lowered(f)?;
                    }
                }
                Ok(())
            }
            Self::Or(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " : ")?;
                    }
                    child.fmt_lowered(f)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Region {
    /// Serializes to the interchange grammar. Round-trips logically:
    /// `parse(r.to_string())` accepts/rejects exactly the points `r` does.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.lowered().fmt_lowered(f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Plane;
    use crate::math::Vector3;
    use crate::registry::IndexBlock;

    fn h(value: i64) -> Handle {
        Handle::new(value).unwrap()
    }

    /// Registers the six faces of the unit cube [-1,1]^3 so that the
    /// formula "1 -2 3 -4 5 -6" is its interior.
    fn unit_box() -> (SurfaceRegistry, IndexBlock) {
        let mut reg = SurfaceRegistry::new();
        let mut block = reg.reserve_block(10).unwrap();
        let faces = [
            (Point3::new(-1.0, 0.0, 0.0), Vector3::x()),
            (Point3::new(1.0, 0.0, 0.0), Vector3::x()),
            (Point3::new(0.0, -1.0, 0.0), Vector3::y()),
            (Point3::new(0.0, 1.0, 0.0), Vector3::y()),
            (Point3::new(0.0, 0.0, -1.0), Vector3::z()),
            (Point3::new(0.0, 0.0, 1.0), Vector3::z()),
        ];
        for (origin, normal) in faces {
            reg.register(&mut block, Plane::new(origin, normal).unwrap().into())
                .unwrap();
        }
        (reg, block)
    }

    #[test]
    fn box_membership() {
        let (reg, _) = unit_box();
        let cube = Region::parse("1 -2 3 -4 5 -6").unwrap();
        assert!(cube.is_valid(&Point3::origin(), &reg).unwrap());
        assert!(!cube
            .is_valid(&Point3::new(100.0, 100.0, 100.0), &reg)
            .unwrap());
    }

    #[test]
    fn complement_law() {
        let (reg, _) = unit_box();
        let cube = Region::parse("1 -2 3 -4 5 -6").unwrap();
        let outside = cube.complement();
        for point in [
            Point3::origin(),
            Point3::new(100.0, 100.0, 100.0),
            Point3::new(0.5, -0.5, 0.9),
            Point3::new(0.0, 1.5, 0.0),
        ] {
            assert_eq!(
                outside.is_valid(&point, &reg).unwrap(),
                !cube.is_valid(&point, &reg).unwrap(),
            );
        }
    }

    #[test]
    fn union_and_grouping() {
        let (reg, _) = unit_box();
        // The cube, or everything past x=1
        let r = Region::parse("( -2 3 -4 5 -6 1 : 2 )").unwrap();
        assert!(r.is_valid(&Point3::new(0.5, 0.0, 0.0), &reg).unwrap());
        assert!(r.is_valid(&Point3::new(9.0, 9.0, 9.0), &reg).unwrap());
        assert!(!r.is_valid(&Point3::new(-5.0, 0.0, 0.0), &reg).unwrap());
    }

    #[test]
    fn unresolved_handle_is_an_error_not_false() {
        let (reg, _) = unit_box();
        let r = Region::parse("1 99").unwrap();
        assert!(r.is_valid(&Point3::origin(), &reg).is_err());
    }

    #[test]
    fn display_round_trips_behaviour() {
        let (reg, _) = unit_box();
        let original = Region::parse("1 -2 ( 3 -4 : 5 -6 )").unwrap();
        let reparsed = Region::parse(&original.to_string()).unwrap();
        let mut sample = Vec::new();
        for ix in -2..=2 {
            for iy in -2..=2 {
                for iz in -2..=2 {
                    sample.push(Point3::new(
                        f64::from(ix) * 0.7,
                        f64::from(iy) * 0.7,
                        f64::from(iz) * 0.7,
                    ));
                }
            }
        }
        for point in sample {
            assert_eq!(
                original.is_valid(&point, &reg).unwrap(),
                reparsed.is_valid(&point, &reg).unwrap(),
            );
        }
    }

    #[test]
    fn display_parenthesizes_unions_inside_intersections() {
        let r = Region::Literal(h(1)).intersect(
            Region::Literal(h(2))
                .union(Region::Literal(h(3)))
                .unwrap(),
        );
        assert_eq!(r.to_string(), "1 ( 2 : 3 )");
    }

    #[test]
    fn not_lowered_on_display() {
        let r = Region::Not(Box::new(Region::parse("1 -2").unwrap()));
        assert_eq!(r.to_string(), "-1 : 2");
    }

    #[test]
    fn complement_of_complement_is_identity() {
        let (reg, _) = unit_box();
        let cube = Region::parse("1 -2 3 -4 5 -6").unwrap();
        let twice = cube.complement().complement();
        for point in [Point3::origin(), Point3::new(3.0, 0.0, 0.0)] {
            assert_eq!(
                cube.is_valid(&point, &reg).unwrap(),
                twice.is_valid(&point, &reg).unwrap(),
            );
        }
    }

    #[test]
    fn substitute_replaces_both_senses() {
        let r = Region::parse("1 -2").unwrap();
        let replacement = Region::parse("7 8").unwrap();
        let swapped = r.substitute(h(2), &replacement);
        // -2 becomes the complement of "7 8"
        assert_eq!(swapped.to_string(), "1 ( -7 : -8 )");
        let swapped = r.substitute(h(1), &replacement);
        assert_eq!(swapped.to_string(), "7 8 -2");
    }

    #[test]
    fn empty_region_is_and_identity() {
        let r = Region::all().intersect(Region::parse("1").unwrap());
        assert_eq!(r.literals(), vec![h(1)]);
        assert!(Region::all().is_empty());
    }

    #[test]
    fn union_with_empty_region_is_rejected() {
        let r = Region::all().union(Region::parse("1").unwrap());
        assert!(matches!(r, Err(RegionError::EmptyUnion)));
    }

    #[test]
    fn parse_mapped_offsets_magnitudes() {
        let r = Region::parse_mapped("1 -2", |m| m + 100).unwrap();
        assert_eq!(r.literals(), vec![h(101), h(-102)]);
    }
}
