use crate::component::{ComponentSet, ElementType, SelectionCollection, SelectionUpdate};
use crate::error::{Result, SelectionError};
use crate::topology::{ConvertOptions, MeshRef, Topology};

use super::partition::shells_touching;

/// Converts `set` to `through` and back to its own type.
fn round_trip<T: Topology + ?Sized>(
    topology: &T,
    set: &ComponentSet,
    through: ElementType,
) -> Option<ComponentSet> {
    let options = ConvertOptions::default();
    let middle = topology.convert(set, through, options);
    if middle.is_empty() {
        return None;
    }
    let middle = ComponentSet::from_indices(set.mesh(), through, middle);
    let back = topology.convert(&middle, set.element(), options);
    (!back.is_empty()).then(|| ComponentSet::from_indices(set.mesh(), set.element(), back))
}

fn require_selection(selection: &SelectionCollection) -> Result<SelectionCollection> {
    if selection.is_empty() {
        return Err(SelectionError::NothingSelected.into());
    }
    Ok(selection.merged())
}

/// Selects the ring of elements adjacent to the selection, dropping the
/// selection itself.
pub struct Adjacent;

impl Adjacent {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the operation, returning a toggle.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection is empty.
    pub fn execute<T: Topology + ?Sized>(
        &self,
        topology: &T,
        selection: &SelectionCollection,
    ) -> Result<SelectionUpdate> {
        let mut toggled = SelectionCollection::new();
        for set in require_selection(selection)?.iter() {
            let through = match set.element() {
                ElementType::Face | ElementType::Vertex | ElementType::Uv => ElementType::Edge,
                ElementType::Edge => ElementType::Vertex,
            };
            if let Some(grown) = round_trip(topology, set, through) {
                toggled.add(grown)?;
            }
        }
        Ok(SelectionUpdate::Toggle(toggled))
    }
}

impl Default for Adjacent {
    fn default() -> Self {
        Self::new()
    }
}

/// Grows or shrinks the selection by one step of adjacency.
pub struct Traverse {
    expand: bool,
}

impl Traverse {
    /// Creates a new `Traverse`, growing if `expand` and shrinking otherwise.
    #[must_use]
    pub fn new(expand: bool) -> Self {
        Self { expand }
    }

    /// Executes the traversal.
    ///
    /// Growing goes through shared vertices (shared edges for vertices and
    /// UVs). Shrinking removes every element with a neighbour outside the
    /// selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection is empty.
    pub fn execute<T: Topology + ?Sized>(
        &self,
        topology: &T,
        selection: &SelectionCollection,
    ) -> Result<SelectionUpdate> {
        let mut change = SelectionCollection::new();
        for set in require_selection(selection)?.iter() {
            if self.expand {
                let through = match set.element() {
                    ElementType::Face | ElementType::Edge => ElementType::Vertex,
                    ElementType::Vertex | ElementType::Uv => ElementType::Edge,
                };
                if let Some(grown) = round_trip(topology, set, through) {
                    change.add(grown)?;
                }
            } else if !set.is_complete_sentinel() {
                let outer = set.indices().iter().copied().filter(|&i| {
                    topology
                        .neighbors(set.mesh(), set.element(), i)
                        .iter()
                        .any(|n| !set.contains(*n))
                });
                if let Some(outer) = set.with_indices(outer) {
                    change.add(outer)?;
                }
            }
        }
        if self.expand {
            Ok(SelectionUpdate::Add(change))
        } else {
            Ok(SelectionUpdate::Remove(change))
        }
    }
}

/// Extends the selection to the full shells it touches.
pub struct Flood;

impl Flood {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the flood.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection is empty.
    pub fn execute<T: Topology + ?Sized>(
        &self,
        topology: &T,
        selection: &SelectionCollection,
    ) -> Result<SelectionUpdate> {
        let mut flooded = SelectionCollection::new();
        for set in require_selection(selection)?.iter() {
            flooded.add(shells_touching(topology, set))?;
        }
        Ok(SelectionUpdate::Add(flooded))
    }
}

impl Default for Flood {
    fn default() -> Self {
        Self::new()
    }
}

/// Selects faces that are not quads.
pub struct NonQuads {
    meshes: Vec<MeshRef>,
    ngons: bool,
}

impl NonQuads {
    /// Creates a query for faces with more than four corners on `meshes`.
    #[must_use]
    pub fn new(meshes: Vec<MeshRef>) -> Self {
        Self {
            meshes,
            ngons: true,
        }
    }

    /// Looks for n-gons if `true`, triangles if `false`.
    #[must_use]
    pub fn ngons(mut self, ngons: bool) -> Self {
        self.ngons = ngons;
        self
    }

    /// Executes the query, returning a replacement selection.
    #[must_use]
    pub fn execute<T: Topology + ?Sized>(&self, topology: &T) -> SelectionUpdate {
        let mut found = SelectionCollection::new();
        let mut total = 0;
        for &mesh in &self.meshes {
            let count = topology.element_count(mesh, ElementType::Face);
            let faces: Vec<u32> = (0..count)
                .filter_map(|f| u32::try_from(f).ok())
                .filter(|&f| {
                    let corners = topology.face_vertex_count(mesh, f);
                    if self.ngons {
                        corners > 4
                    } else {
                        corners == 3
                    }
                })
                .collect();
            total += faces.len();
            if !faces.is_empty() {
                found.push(ComponentSet::from_indices(mesh, ElementType::Face, faces));
            }
        }
        let kind = if self.ngons { "n-gon" } else { "triangle" };
        tracing::info!(count = total, kind, "selected non-quad faces");
        SelectionUpdate::Replace(found)
    }
}
