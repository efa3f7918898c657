use crate::component::{ComponentSet, ElementType, Pick, SelectionCollection, SelectionUpdate};
use crate::config::Preferences;
use crate::error::{Result, SelectionError, TopologyError};
use crate::topology::{ConvertOptions, PathMode, Topology};

/// Adds the shortest path between the last two picked elements.
pub struct InBetween;

impl InBetween {
    /// Creates a new `InBetween` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the operation on an order-tracked selection.
    ///
    /// Edges prefer a ring path and fall back to a loop path; UVs bridge
    /// along UV-space edges converted back to UVs.
    ///
    /// # Errors
    ///
    /// Returns an error if order tracking is off, fewer than two picks are
    /// tracked, the last two picks differ in mesh or element type, or no path
    /// connects them.
    pub fn execute<T: Topology + ?Sized>(
        &self,
        topology: &T,
        selection: &SelectionCollection,
        preferences: &Preferences,
    ) -> Result<SelectionUpdate> {
        if !preferences.track_selection_order {
            return Err(SelectionError::OrderTrackingDisabled.into());
        }
        let (start, end) = last_pair(selection)?;
        let seeds = [start.index, end.index];

        let path = match start.element {
            ElementType::Edge => topology
                .shortest_path(start.mesh, start.element, &seeds, PathMode::Ring)
                .or_else(|| topology.shortest_path(start.mesh, start.element, &seeds, PathMode::Loop)),
            ElementType::Uv => topology.shortest_path(start.mesh, start.element, &seeds, PathMode::Uv),
            ElementType::Vertex | ElementType::Face => {
                topology.shortest_path(start.mesh, start.element, &seeds, PathMode::Loop)
            }
        }
        .ok_or(TopologyError::NoPathFound)?;

        let mut bridge = ComponentSet::from_indices(start.mesh, path.element, path.indices);
        if start.element == ElementType::Uv && path.element != ElementType::Uv {
            let uvs = topology.convert(&bridge, ElementType::Uv, ConvertOptions::default());
            if uvs.is_empty() {
                return Err(TopologyError::NoPathFound.into());
            }
            bridge = ComponentSet::from_indices(start.mesh, ElementType::Uv, uvs);
        }
        tracing::debug!(elements = bridge.len(), element = %bridge.element(), "bridged picks");
        Ok(SelectionUpdate::Add(SelectionCollection::from_sets([bridge])))
    }
}

impl Default for InBetween {
    fn default() -> Self {
        Self::new()
    }
}

/// The last two picks, which must share a mesh and element type.
pub(crate) fn last_pair(selection: &SelectionCollection) -> Result<(Pick, Pick)> {
    let picks = selection.last(2)?;
    let (start, end) = (picks[0], picks[1]);
    if start.mesh != end.mesh {
        return Err(SelectionError::MeshMismatch.into());
    }
    if start.element != end.element {
        return Err(SelectionError::Incompatible {
            expected: start.element,
            found: end.element,
        }
        .into());
    }
    Ok((start, end))
}
