use crate::component::{ComponentSet, ElementType, SelectionCollection, SelectionUpdate};
use crate::error::{Result, SelectionError};
use crate::topology::{MeshRef, Topology};

use super::partition::shells_touching;

/// The host's selection mask mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectMode {
    #[default]
    Object,
    Component,
}

/// Host state an invert needs to pick its granularity.
#[derive(Debug, Clone, Default)]
pub struct SceneContext {
    pub mode: SelectMode,
    /// Active component mask flags, in priority order.
    pub mask: Vec<ElementType>,
    /// Meshes drilled into for component selection.
    pub hilited: Vec<MeshRef>,
    /// Visible top-level objects.
    pub visible_objects: Vec<MeshRef>,
}

/// Inverts the selection at object, component or shell granularity.
pub struct Invert {
    shell: bool,
}

impl Invert {
    /// Creates a new `Invert` operation.
    #[must_use]
    pub fn new() -> Self {
        Self { shell: false }
    }

    /// Inverts whole shells touched by the selection instead of whole meshes.
    #[must_use]
    pub fn shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    /// Executes the invert, returning a toggle against the live selection.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::AmbiguousGranularity`] if the element type
    /// cannot be inferred from the selection or the component mask.
    pub fn execute<T: Topology + ?Sized>(
        &self,
        topology: &T,
        selection: &SelectionCollection,
        context: &SceneContext,
    ) -> Result<SelectionUpdate> {
        if context.mode == SelectMode::Object && context.hilited.is_empty() {
            if context.visible_objects.is_empty() {
                tracing::warn!("nothing to invert");
            }
            return Ok(SelectionUpdate::ToggleObjects(context.visible_objects.clone()));
        }
        if context.mode == SelectMode::Object && selection.is_empty() {
            return Err(SelectionError::AmbiguousGranularity.into());
        }
        let element = selection
            .element_type()
            .or_else(|| context.mask.first().copied())
            .ok_or(SelectionError::AmbiguousGranularity)?;

        let mut toggled = SelectionCollection::new();
        if self.shell && !selection.is_empty() {
            for set in selection.merged().iter() {
                toggled.add(shells_touching(topology, set))?;
            }
        } else {
            let meshes = if context.hilited.is_empty() {
                selection.meshes()
            } else {
                context.hilited.clone()
            };
            for mesh in meshes {
                toggled.add(ComponentSet::complete(mesh, element))?;
            }
        }

        if toggled.is_empty() {
            tracing::warn!("nothing to invert");
        }
        tracing::debug!(sets = toggled.len(), %element, shell = self.shell, "inverting selection");
        Ok(SelectionUpdate::Toggle(toggled))
    }
}

impl Default for Invert {
    fn default() -> Self {
        Self::new()
    }
}
