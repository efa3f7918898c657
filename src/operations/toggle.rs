use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::component::{ComponentSet, ElementType, Pick, SelectionCollection, SelectionUpdate};
use crate::config::ToggleConfig;
use crate::error::{Result, SelectionError, TopologyError};
use crate::math::is_parallel;
use crate::topology::{PathMode, Topology};

use super::partition::{connected_runs, shell_containing};

/// What a hovered non-border edge toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToggleRequest {
    /// The edge loop through the edge.
    #[default]
    Loop,
    /// The edge ring through the edge.
    Ring,
    /// The connected region holding the edge.
    Region,
}

/// Selects or deselects the region derived from the hovered element.
///
/// Whether the region is added or removed depends on the hovered element's
/// membership in the current selection.
pub struct ToggleUnderCursor {
    hovered: Option<Pick>,
    request: ToggleRequest,
    config: ToggleConfig,
}

impl ToggleUnderCursor {
    /// Creates a new toggle for the hovered element, if any.
    #[must_use]
    pub fn new(hovered: Option<Pick>) -> Self {
        Self {
            hovered,
            request: ToggleRequest::default(),
            config: ToggleConfig::default(),
        }
    }

    #[must_use]
    pub fn request(mut self, request: ToggleRequest) -> Self {
        self.request = request;
        self
    }

    #[must_use]
    pub fn config(mut self, config: ToggleConfig) -> Self {
        self.config = config;
        self
    }

    /// Executes the toggle against the current selection.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is hovered or no loop or ring runs
    /// through the hovered edge.
    pub fn execute<T: Topology + ?Sized>(
        &self,
        topology: &T,
        selection: &SelectionCollection,
    ) -> Result<SelectionUpdate> {
        let hovered = self.hovered.ok_or(SelectionError::NothingPreselected)?;
        if hovered.element != ElementType::Edge || self.request == ToggleRequest::Region {
            return region_toggle(topology, selection, hovered);
        }

        let edges = if topology.is_border(hovered.mesh, hovered.index) {
            collinear_border(topology, hovered, self.config.parallel_tolerance)
        } else {
            let mode = match self.request {
                ToggleRequest::Ring => PathMode::Ring,
                _ => PathMode::Loop,
            };
            topology
                .shortest_path(hovered.mesh, ElementType::Edge, &[hovered.index], mode)
                .ok_or(TopologyError::NoPathFound)?
                .indices
        };
        tracing::debug!(edges = edges.len(), request = ?self.request, "toggling edges under cursor");

        let set = ComponentSet::from_indices(hovered.mesh, ElementType::Edge, edges);
        let change = SelectionCollection::from_sets([set]);
        if selection.contains_index(hovered.mesh, hovered.element, hovered.index) {
            Ok(SelectionUpdate::Remove(change))
        } else {
            Ok(SelectionUpdate::Add(change))
        }
    }
}

/// Deselects the loop (edges) or shell (other types) under the cursor.
pub struct ClearUnderCursor {
    hovered: Option<Pick>,
}

impl ClearUnderCursor {
    #[must_use]
    pub fn new(hovered: Option<Pick>) -> Self {
        Self { hovered }
    }

    /// Executes the clear.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is hovered.
    pub fn execute<T: Topology + ?Sized>(&self, topology: &T) -> Result<SelectionUpdate> {
        let hovered = self.hovered.ok_or(SelectionError::NothingPreselected)?;
        let set = if hovered.element == ElementType::Edge {
            let edges = topology
                .shortest_path(hovered.mesh, ElementType::Edge, &[hovered.index], PathMode::Loop)
                .map_or_else(|| vec![hovered.index], |path| path.indices);
            ComponentSet::from_indices(hovered.mesh, ElementType::Edge, edges)
        } else {
            shell_containing(topology, hovered.mesh, hovered.element, hovered.index)
                .ok_or(SelectionError::NothingPreselected)?
        };
        Ok(SelectionUpdate::Remove(SelectionCollection::from_sets([set])))
    }
}

/// Border edges reachable from the hovered edge through parallel border edges.
fn collinear_border<T: Topology + ?Sized>(topology: &T, hovered: Pick, tolerance: f64) -> Vec<u32> {
    let direction = |edge: u32| {
        let (a, b) = topology.edge_points(hovered.mesh, edge);
        b - a
    };
    let seed = direction(hovered.index);
    let mut visited = HashSet::from([hovered.index]);
    let mut run = vec![hovered.index];
    let mut queue = VecDeque::from([hovered.index]);
    while let Some(current) = queue.pop_front() {
        for neighbor in topology.neighbors(hovered.mesh, ElementType::Edge, current) {
            if visited.contains(&neighbor)
                || !topology.is_border(hovered.mesh, neighbor)
                || !is_parallel(&seed, &direction(neighbor), tolerance)
            {
                continue;
            }
            visited.insert(neighbor);
            run.push(neighbor);
            queue.push_back(neighbor);
        }
    }
    run
}

/// Adds or removes the connected run around the hovered element.
///
/// Nothing selected on the mesh selects the whole shell; a fully selected
/// shell is deselected. Otherwise the selected elements of the shell are
/// split into runs with the hovered element included: a hovered element
/// already selected removes its run, an unselected one adds the members of
/// its run that are not selected yet.
fn region_toggle<T: Topology + ?Sized>(
    topology: &T,
    selection: &SelectionCollection,
    hovered: Pick,
) -> Result<SelectionUpdate> {
    let shell = shell_containing(topology, hovered.mesh, hovered.element, hovered.index)
        .ok_or(SelectionError::NothingPreselected)?;
    let domain = topology.element_count(hovered.mesh, hovered.element);
    let Some(current) = selection.get(hovered.mesh, hovered.element) else {
        return Ok(SelectionUpdate::Add(SelectionCollection::from_sets([shell])));
    };
    if shell.is_subset_of(&current, domain) {
        return Ok(SelectionUpdate::Remove(SelectionCollection::from_sets([shell])));
    }

    let selected = current.resolve(domain);
    let hovered_selected = selected.contains(&hovered.index);
    let mut members: BTreeSet<u32> = shell
        .indices()
        .iter()
        .copied()
        .filter(|i| selected.contains(i))
        .collect();
    members.insert(hovered.index);
    let run: Vec<u32> = connected_runs(topology, hovered.mesh, hovered.element, &members)
        .into_iter()
        .find(|run| run.contains(&hovered.index))
        .unwrap_or_else(|| vec![hovered.index])
        .into_iter()
        .filter(|i| hovered_selected || !selected.contains(i))
        .collect();
    tracing::debug!(elements = run.len(), remove = hovered_selected, "toggling region under cursor");

    let change = SelectionCollection::from_sets([ComponentSet::from_indices(
        hovered.mesh,
        hovered.element,
        run,
    )]);
    if hovered_selected {
        Ok(SelectionUpdate::Remove(change))
    } else {
        Ok(SelectionUpdate::Add(change))
    }
}
