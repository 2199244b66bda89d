use std::fmt;

use slotmap::SlotMap;

use crate::error::ComponentError;
use crate::frame::AttachmentFrame;

slotmap::new_key_type! {
    /// Unique identifier for a component in the store.
    pub struct ComponentId;
}

/// Build phase of a component instance.
///
/// Transitions are strictly ordered; skipping a phase (e.g. registering
/// cells before a frame exists) is a programming error reported as
/// [`ComponentError::OutOfOrder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildState {
    /// Just created, no frame yet.
    Unplaced,
    /// Frame derived from an upstream link point (or the origin).
    Framed,
    /// Primitives registered.
    Surfaced,
    /// Cells registered and exterior recorded.
    Built,
    /// Own link points published.
    Linked,
    /// Excluded from its parent's cells.
    Inserted,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unplaced => "unplaced",
            Self::Framed => "framed",
            Self::Surfaced => "surfaced",
            Self::Built => "built",
            Self::Linked => "linked",
            Self::Inserted => "inserted",
        };
        f.write_str(name)
    }
}

/// The capability mix of a component, composed instead of inherited:
/// a component may or may not carry a frame, an exterior, and cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Owns an attachment frame.
    pub frame: bool,
    /// Records an exterior for containment.
    pub exterior: bool,
    /// Registers simulation cells.
    pub cells: bool,
}

impl Capabilities {
    /// All capabilities, the common case.
    #[must_use]
    pub fn full() -> Self {
        Self {
            frame: true,
            exterior: true,
            cells: true,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}

/// Per-component record: identity, capability mix, build phase, frame.
#[derive(Debug)]
pub struct ComponentData {
    name: String,
    capabilities: Capabilities,
    state: BuildState,
    frame: Option<AttachmentFrame>,
}

impl ComponentData {
    /// Returns the component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the capability mix.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Returns the current build phase.
    #[must_use]
    pub fn state(&self) -> BuildState {
        self.state
    }
}

/// Arena owning every component instance of a simulation run.
#[derive(Debug, Default)]
pub struct ComponentStore {
    components: SlotMap<ComponentId, ComponentData>,
}

impl ComponentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component with the full capability mix.
    pub fn add(&mut self, name: &str) -> ComponentId {
        self.add_with(name, Capabilities::full())
    }

    /// Adds a component with an explicit capability mix.
    pub fn add_with(&mut self, name: &str, capabilities: Capabilities) -> ComponentId {
        self.components.insert(ComponentData {
            name: name.to_string(),
            capabilities,
            state: BuildState::Unplaced,
            frame: None,
        })
    }

    /// Returns a component's record.
    ///
    /// # Errors
    ///
    /// Returns an error if the component is not in the store.
    pub fn get(&self, id: ComponentId) -> Result<&ComponentData, ComponentError> {
        self.components
            .get(id)
            .ok_or(ComponentError::UnknownComponent)
    }

    /// Returns a component's name.
    ///
    /// # Errors
    ///
    /// Returns an error if the component is not in the store.
    pub fn name(&self, id: ComponentId) -> Result<&str, ComponentError> {
        Ok(self.get(id)?.name())
    }

    /// Returns a component's build phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the component is not in the store.
    pub fn state(&self, id: ComponentId) -> Result<BuildState, ComponentError> {
        Ok(self.get(id)?.state())
    }

    /// Attaches the derived frame, moving `Unplaced` to `Framed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the component lacks the frame capability or is
    /// not in the `Unplaced` phase.
    pub fn set_frame(
        &mut self,
        id: ComponentId,
        frame: AttachmentFrame,
    ) -> Result<(), ComponentError> {
        self.require(id, "frame", |c| c.frame)?;
        let data = self.advance(id, BuildState::Unplaced, BuildState::Framed)?;
        data.frame = Some(frame);
        Ok(())
    }

    /// Returns the component's frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the component has not been framed yet.
    pub fn frame(&self, id: ComponentId) -> Result<&AttachmentFrame, ComponentError> {
        let data = self.get(id)?;
        data.frame.as_ref().ok_or(ComponentError::OutOfOrder {
            component: data.name.clone(),
            expected: BuildState::Framed,
            actual: data.state,
        })
    }

    /// Returns the component's frame mutably, to publish link points.
    ///
    /// # Errors
    ///
    /// Returns an error if the component has not been framed yet.
    pub fn frame_mut(&mut self, id: ComponentId) -> Result<&mut AttachmentFrame, ComponentError> {
        let data = self
            .components
            .get_mut(id)
            .ok_or(ComponentError::UnknownComponent)?;
        match data.frame.as_mut() {
            Some(frame) => Ok(frame),
            None => Err(ComponentError::OutOfOrder {
                component: data.name.clone(),
                expected: BuildState::Framed,
                actual: data.state,
            }),
        }
    }

    /// Marks the component's primitives registered (`Framed` to
    /// `Surfaced`).
    ///
    /// # Errors
    ///
    /// Returns an error on an out-of-order transition.
    pub fn mark_surfaced(&mut self, id: ComponentId) -> Result<(), ComponentError> {
        self.advance(id, BuildState::Framed, BuildState::Surfaced)?;
        Ok(())
    }

    /// Marks cells registered and the exterior recorded (`Surfaced` to
    /// `Built`).
    ///
    /// # Errors
    ///
    /// Returns an error if the component lacks the cells or exterior
    /// capability, or on an out-of-order transition.
    pub fn mark_built(&mut self, id: ComponentId) -> Result<(), ComponentError> {
        self.require(id, "cells", |c| c.cells)?;
        self.require(id, "exterior", |c| c.exterior)?;
        self.advance(id, BuildState::Surfaced, BuildState::Built)?;
        Ok(())
    }

    /// Marks the component's own link points published (`Built` to
    /// `Linked`).
    ///
    /// # Errors
    ///
    /// Returns an error on an out-of-order transition.
    pub fn mark_linked(&mut self, id: ComponentId) -> Result<(), ComponentError> {
        self.advance(id, BuildState::Built, BuildState::Linked)?;
        Ok(())
    }

    /// Marks the component inserted into its parent (`Linked` to
    /// `Inserted`).
    ///
    /// # Errors
    ///
    /// Returns an error on an out-of-order transition.
    pub fn mark_inserted(&mut self, id: ComponentId) -> Result<(), ComponentError> {
        self.advance(id, BuildState::Linked, BuildState::Inserted)?;
        Ok(())
    }

    fn require(
        &self,
        id: ComponentId,
        capability: &'static str,
        has: impl Fn(Capabilities) -> bool,
    ) -> Result<(), ComponentError> {
        let data = self.get(id)?;
        if has(data.capabilities) {
            Ok(())
        } else {
            Err(ComponentError::MissingCapability {
                component: data.name.clone(),
                capability,
            })
        }
    }

    fn advance(
        &mut self,
        id: ComponentId,
        expected: BuildState,
        next: BuildState,
    ) -> Result<&mut ComponentData, ComponentError> {
        let data = self
            .components
            .get_mut(id)
            .ok_or(ComponentError::UnknownComponent)?;
        if data.state != expected {
            return Err(ComponentError::OutOfOrder {
                component: data.name.clone(),
                expected,
                actual: data.state,
            });
        }
        data.state = next;
        Ok(data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};

    #[test]
    fn full_build_sequence() {
        let mut store = ComponentStore::new();
        let id = store.add("moderator");
        assert_eq!(store.state(id).unwrap(), BuildState::Unplaced);

        store
            .set_frame(id, AttachmentFrame::origin_frame())
            .unwrap();
        store.mark_surfaced(id).unwrap();
        store.mark_built(id).unwrap();
        store
            .frame_mut(id)
            .unwrap()
            .set_link_point(0, Point3::origin(), Vector3::y(), None)
            .unwrap();
        store.mark_linked(id).unwrap();
        store.mark_inserted(id).unwrap();
        assert_eq!(store.state(id).unwrap(), BuildState::Inserted);
    }

    #[test]
    fn skipping_a_phase_is_rejected() {
        let mut store = ComponentStore::new();
        let id = store.add("shield");
        let err = store.mark_surfaced(id).unwrap_err();
        match err {
            ComponentError::OutOfOrder {
                component,
                expected,
                actual,
            } => {
                assert_eq!(component, "shield");
                assert_eq!(expected, BuildState::Framed);
                assert_eq!(actual, BuildState::Unplaced);
            }
            other => panic!("expected OutOfOrder, got {other:?}"),
        }
    }

    #[test]
    fn frame_before_framed_is_rejected() {
        let mut store = ComponentStore::new();
        let id = store.add("target");
        assert!(store.frame(id).is_err());
    }

    #[test]
    fn missing_capability_is_reported() {
        let mut store = ComponentStore::new();
        let id = store.add_with(
            "marker",
            Capabilities {
                frame: true,
                exterior: false,
                cells: false,
            },
        );
        store
            .set_frame(id, AttachmentFrame::origin_frame())
            .unwrap();
        store.mark_surfaced(id).unwrap();
        let err = store.mark_built(id).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::MissingCapability { capability: "cells", .. }
        ));
    }

    #[test]
    fn double_transition_is_rejected() {
        let mut store = ComponentStore::new();
        let id = store.add("duct");
        store
            .set_frame(id, AttachmentFrame::origin_frame())
            .unwrap();
        assert!(store.set_frame(id, AttachmentFrame::origin_frame()).is_err());
    }

    #[test]
    fn unknown_component_is_rejected() {
        let mut store = ComponentStore::new();
        let id = store.add("gone");
        store.components.remove(id);
        assert!(matches!(
            store.state(id),
            Err(ComponentError::UnknownComponent)
        ));
    }
}
