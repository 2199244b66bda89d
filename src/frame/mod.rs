use crate::error::{FrameError, GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::region::Region;

/// A named exit point on a frame: a position, an outward axis, and
/// optionally the boundary region a downstream component may adopt as its
/// own cut. A published boundary is a read-only exterior contract.
#[derive(Debug, Clone)]
pub struct LinkPoint {
    position: Point3,
    axis: Vector3,
    boundary: Option<Region>,
}

impl LinkPoint {
    /// Returns the link position.
    #[must_use]
    pub fn position(&self) -> &Point3 {
        &self.position
    }

    /// Returns the outward axis (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the boundary region, if one was published.
    #[must_use]
    pub fn boundary(&self) -> Option<&Region> {
        self.boundary.as_ref()
    }
}

/// An oriented local coordinate frame with an ordered list of link
/// points.
///
/// Components author their dimensions in frame-local coordinates and map
/// them out with [`AttachmentFrame::to_global`]. A frame is usually
/// derived from an upstream frame's link point, chaining placements along
/// a beamline; the outward axis of the link becomes the new frame's +Y.
///
/// The axes are unit length and mutually orthogonal (right-handed,
/// `x = y cross z`) at construction and stay that way.
#[derive(Debug, Clone)]
pub struct AttachmentFrame {
    origin: Point3,
    x: Vector3,
    y: Vector3,
    z: Vector3,
    links: Vec<LinkPoint>,
}

impl AttachmentFrame {
    /// The global frame: origin at the world origin, axes aligned with
    /// the world axes.
    #[must_use]
    pub fn origin_frame() -> Self {
        Self {
            origin: Point3::origin(),
            x: Vector3::x(),
            y: Vector3::y(),
            z: Vector3::z(),
            links: Vec::new(),
        }
    }

    /// Creates a frame at `origin` facing along `forward` (the new +Y),
    /// with `up` fixing the roll (the new +Z is `up` made orthogonal to
    /// `forward`).
    ///
    /// # Errors
    ///
    /// Returns an error if `forward` is zero-length or `up` is parallel
    /// to it.
    pub fn new(origin: Point3, forward: Vector3, up: Vector3) -> Result<Self> {
        let len = forward.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let y = forward / len;

        let z = up - y * up.dot(&y);
        let z_len = z.norm();
        if z_len < TOLERANCE {
            return Err(
                GeometryError::Degenerate("up vector is parallel to the frame axis".into()).into(),
            );
        }
        let z = z / z_len;
        let x = y.cross(&z);

        Ok(Self {
            origin,
            x,
            y,
            z,
            links: Vec::new(),
        })
    }

    /// Derives a frame from `parent`'s link point `index`: the link
    /// position becomes the origin and the outward axis the new +Y. The
    /// up-vector is the parent axis least aligned with the link axis.
    ///
    /// Any offset or rotation the component itself applies is layered on
    /// top of the returned frame, never baked into the parent's link.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::LinkIndexOutOfRange`] on a bad index.
    pub fn from_link_point(parent: &Self, index: usize) -> Result<Self> {
        let link = parent.link_point(index)?;
        // Same reference-pick as completing a plane basis from a normal
        let up = if link.axis.dot(&parent.z).abs() < 0.9 {
            parent.z
        } else {
            parent.x
        };
        Self::new(link.position, link.axis, up)
    }

    /// Derives a frame from a link point with an explicit up-vector.
    ///
    /// # Errors
    ///
    /// Returns an error on a bad index, or if `up` is parallel to the
    /// link axis.
    pub fn from_link_point_up(parent: &Self, index: usize, up: Vector3) -> Result<Self> {
        let link = parent.link_point(index)?;
        Self::new(link.position, link.axis, up)
    }

    /// Returns the frame origin.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the local X axis (unit vector).
    #[must_use]
    pub fn x_axis(&self) -> &Vector3 {
        &self.x
    }

    /// Returns the local Y axis (unit vector, the beam direction).
    #[must_use]
    pub fn y_axis(&self) -> &Vector3 {
        &self.y
    }

    /// Returns the local Z axis (unit vector).
    #[must_use]
    pub fn z_axis(&self) -> &Vector3 {
        &self.z
    }

    /// Maps a frame-local point to global coordinates.
    #[must_use]
    pub fn to_global(&self, local: &Point3) -> Point3 {
        self.origin + self.x * local.x + self.y * local.y + self.z * local.z
    }

    /// Maps a frame-local direction to global coordinates.
    #[must_use]
    pub fn direction_to_global(&self, local: &Vector3) -> Vector3 {
        self.x * local.x + self.y * local.y + self.z * local.z
    }

    /// Records or overwrites one of this frame's exit points. The list
    /// grows to hold `index`, back-filling gaps with placeholder links at
    /// the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if `axis` is zero-length.
    pub fn set_link_point(
        &mut self,
        index: usize,
        position: Point3,
        axis: Vector3,
        boundary: Option<Region>,
    ) -> Result<()> {
        let len = axis.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        if index >= self.links.len() {
            let origin = self.origin;
            let beam = self.y;
            self.links.resize_with(index + 1, || LinkPoint {
                position: origin,
                axis: beam,
                boundary: None,
            });
        }
        self.links[index] = LinkPoint {
            position,
            axis: axis / len,
            boundary,
        };
        Ok(())
    }

    /// Returns the link point at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::LinkIndexOutOfRange`] if never set. This is
    /// a programming-error class, fatal for the component that triggered
    /// it.
    pub fn link_point(&self, index: usize) -> Result<&LinkPoint> {
        self.links.get(index).ok_or_else(|| {
            FrameError::LinkIndexOutOfRange {
                index,
                len: self.links.len(),
            }
            .into()
        })
    }

    /// Returns the number of recorded link points.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}
