use std::collections::BTreeSet;

use crate::error::{Result, SelectionError};
use crate::topology::{MeshRef, Topology};

use super::{ComponentSet, ElementType};

/// One selected element in the host's flat selection representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pick {
    pub mesh: MeshRef,
    pub element: ElementType,
    pub index: u32,
}

impl Pick {
    #[must_use]
    pub fn new(mesh: MeshRef, element: ElementType, index: u32) -> Self {
        Self {
            mesh,
            element,
            index,
        }
    }

    /// The pick as a single-element component set.
    #[must_use]
    pub fn to_set(self) -> ComponentSet {
        ComponentSet::single(self.mesh, self.element, self.index)
    }
}

/// Ordered aggregation of component sets across meshes.
///
/// Normally holds one entry per (mesh, element type) pair. Order-tracked
/// selections keep one entry per pick so the last picks can be recovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionCollection {
    sets: Vec<ComponentSet>,
}

impl SelectionCollection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the given sets as-is, preserving their order.
    #[must_use]
    pub fn from_sets(sets: impl IntoIterator<Item = ComponentSet>) -> Self {
        Self {
            sets: sets.into_iter().collect(),
        }
    }

    /// Builds a set-style selection, merging picks per (mesh, element type).
    #[must_use]
    pub fn from_picks(picks: impl IntoIterator<Item = Pick>) -> Self {
        let mut selection = Self::new();
        for pick in picks {
            match selection.position(pick.mesh, pick.element) {
                Some(i) => {
                    let merged = selection.sets[i].indices().iter().copied().chain([pick.index]);
                    selection.sets[i] = ComponentSet::from_indices(pick.mesh, pick.element, merged);
                }
                None => selection.sets.push(pick.to_set()),
            }
        }
        selection
    }

    /// Builds an order-tracked selection with one entry per pick.
    #[must_use]
    pub fn from_ordered_picks(picks: impl IntoIterator<Item = Pick>) -> Self {
        Self::from_sets(picks.into_iter().map(Pick::to_set))
    }

    /// Appends a set as a new entry.
    pub fn push(&mut self, set: ComponentSet) {
        self.sets.push(set);
    }

    /// Unions a set into the entry for its (mesh, element type), appending
    /// a new entry if there is none.
    ///
    /// # Errors
    ///
    /// Propagates set-combination errors.
    pub fn add(&mut self, set: ComponentSet) -> Result<()> {
        match self.position(set.mesh(), set.element()) {
            Some(i) => self.sets[i] = self.sets[i].union(&set)?,
            None => self.sets.push(set),
        }
        Ok(())
    }

    /// Removes and returns the last entry.
    pub fn pop(&mut self) -> Option<ComponentSet> {
        self.sets.pop()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Number of entries (not elements).
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentSet> {
        self.sets.iter()
    }

    /// Element type of the first entry.
    #[must_use]
    pub fn element_type(&self) -> Option<ElementType> {
        self.sets.first().map(ComponentSet::element)
    }

    /// Meshes referenced by the selection, in first-seen order.
    #[must_use]
    pub fn meshes(&self) -> Vec<MeshRef> {
        let mut meshes = Vec::new();
        for set in &self.sets {
            if !meshes.contains(&set.mesh()) {
                meshes.push(set.mesh());
            }
        }
        meshes
    }

    /// The merged set of one (mesh, element type) pair.
    #[must_use]
    pub fn get(&self, mesh: MeshRef, element: ElementType) -> Option<ComponentSet> {
        self.sets
            .iter()
            .filter(|s| s.mesh() == mesh && s.element() == element)
            .fold(None, |acc: Option<ComponentSet>, set| match acc {
                None => Some(set.clone()),
                Some(acc) => acc.union(set).ok(),
            })
    }

    /// Returns `true` if every element of `set` is selected.
    #[must_use]
    pub fn contains(&self, set: &ComponentSet) -> bool {
        let Some(current) = self.get(set.mesh(), set.element()) else {
            return false;
        };
        if current.is_complete_sentinel() {
            return true;
        }
        !set.is_complete_sentinel() && set.indices().is_subset(current.indices())
    }

    /// Returns `true` if the element is selected.
    #[must_use]
    pub fn contains_index(&self, mesh: MeshRef, element: ElementType, index: u32) -> bool {
        self.sets
            .iter()
            .any(|s| s.mesh() == mesh && s.element() == element && s.contains(index))
    }

    /// The last `n` picks, oldest first.
    ///
    /// Only explicit indices count as picks; a complete entry carries no
    /// pick order.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidSelectionCount`] if fewer than `n`
    /// picks are available.
    pub fn last(&self, n: usize) -> Result<Vec<Pick>> {
        let picks: Vec<Pick> = self
            .sets
            .iter()
            .flat_map(|s| {
                s.indices()
                    .iter()
                    .map(move |&index| Pick::new(s.mesh(), s.element(), index))
            })
            .collect();
        if picks.len() < n {
            return Err(SelectionError::InvalidSelectionCount {
                expected: n,
                found: picks.len(),
            }
            .into());
        }
        Ok(picks[picks.len() - n..].to_vec())
    }

    /// One entry per (mesh, element type), in first-seen order.
    #[must_use]
    pub fn merged(&self) -> Self {
        let mut merged = Self::new();
        for set in &self.sets {
            if merged.position(set.mesh(), set.element()).is_none() {
                if let Some(union) = self.get(set.mesh(), set.element()) {
                    merged.sets.push(union);
                }
            }
        }
        merged
    }

    /// Flattens to host picks, expanding complete entries.
    #[must_use]
    pub fn to_picks<T: Topology + ?Sized>(&self, topology: &T) -> BTreeSet<Pick> {
        self.merged()
            .sets
            .iter()
            .flat_map(|s| {
                let domain = topology.element_count(s.mesh(), s.element());
                s.resolve(domain)
                    .into_iter()
                    .map(move |index| Pick::new(s.mesh(), s.element(), index))
            })
            .collect()
    }

    fn position(&self, mesh: MeshRef, element: ElementType) -> Option<usize> {
        self.sets
            .iter()
            .position(|s| s.mesh() == mesh && s.element() == element)
    }
}

impl FromIterator<ComponentSet> for SelectionCollection {
    fn from_iter<I: IntoIterator<Item = ComponentSet>>(iter: I) -> Self {
        Self::from_sets(iter)
    }
}

/// A selection result for the host to apply in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionUpdate {
    /// Replace the whole component selection.
    Replace(SelectionCollection),
    /// Add to the current selection.
    Add(SelectionCollection),
    /// Remove from the current selection.
    Remove(SelectionCollection),
    /// Toggle membership against the current selection.
    Toggle(SelectionCollection),
    /// Toggle membership of whole objects.
    ToggleObjects(Vec<MeshRef>),
}

impl SelectionUpdate {
    /// The component payload, if any.
    #[must_use]
    pub fn components(&self) -> Option<&SelectionCollection> {
        match self {
            Self::Replace(s) | Self::Add(s) | Self::Remove(s) | Self::Toggle(s) => Some(s),
            Self::ToggleObjects(_) => None,
        }
    }

    /// Computes the component selection after applying this update.
    ///
    /// Entries untouched by the update are kept as they are.
    ///
    /// # Errors
    ///
    /// Propagates set-combination errors.
    pub fn apply<T: Topology + ?Sized>(
        &self,
        current: &SelectionCollection,
        topology: &T,
    ) -> Result<SelectionCollection> {
        let mut result = current.merged();
        let changes = match self {
            Self::Replace(s) => return Ok(s.merged()),
            Self::ToggleObjects(_) => return Ok(result),
            Self::Add(s) | Self::Remove(s) | Self::Toggle(s) => s.merged(),
        };

        for set in changes.sets {
            let domain = topology.element_count(set.mesh(), set.element());
            let position = result.position(set.mesh(), set.element());
            match (self, position) {
                (Self::Add(_) | Self::Toggle(_), None) => result.sets.push(set),
                (Self::Add(_), Some(i)) => result.sets[i] = result.sets[i].union(&set)?,
                (Self::Remove(_), Some(i)) => match result.sets[i].difference(&set, domain)? {
                    Some(rest) => result.sets[i] = rest,
                    None => {
                        result.sets.remove(i);
                    }
                },
                (Self::Toggle(_), Some(i)) => match result.sets[i].toggle(&set, domain)? {
                    Some(rest) => result.sets[i] = rest,
                    None => {
                        result.sets.remove(i);
                    }
                },
                _ => {}
            }
        }
        Ok(result)
    }

    /// Computes the object selection after applying this update.
    #[must_use]
    pub fn apply_objects(&self, current: &[MeshRef]) -> Vec<MeshRef> {
        let Self::ToggleObjects(objects) = self else {
            return current.to_vec();
        };
        let mut result: Vec<MeshRef> = current
            .iter()
            .copied()
            .filter(|m| !objects.contains(m))
            .collect();
        result.extend(objects.iter().copied().filter(|m| !current.contains(m)));
        result
    }
}
