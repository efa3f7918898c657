use crate::component::{ComponentSet, ElementType, SelectionCollection, SelectionUpdate};
use crate::error::{Result, SelectionError};
use crate::topology::{ConvertOptions, Topology};

/// Outcome of a component conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// The source already has the target type.
    Unchanged,
    /// The converted set, `None` if no target element qualified.
    Converted(Option<ComponentSet>),
}

impl Conversion {
    /// The resulting set, falling back to `source` when unchanged.
    #[must_use]
    pub fn into_set(self, source: &ComponentSet) -> Option<ComponentSet> {
        match self {
            Self::Unchanged => Some(source.clone()),
            Self::Converted(set) => set,
        }
    }
}

/// Converts a component set to another element type.
///
/// Vertex to edge conversion is internal (both endpoints selected) unless a
/// border conversion is explicitly requested.
pub struct Convert {
    source: ComponentSet,
    target: ElementType,
    options: ConvertOptions,
}

impl Convert {
    /// Creates a new `Convert` operation with default options.
    #[must_use]
    pub fn new(source: ComponentSet, target: ElementType) -> Self {
        Self {
            source,
            target,
            options: ConvertOptions::default(),
        }
    }

    /// Creates a conversion to a target named by the host.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` names no known element type.
    pub fn from_name(source: ComponentSet, target: &str) -> Result<Self> {
        Ok(Self::new(source, target.parse()?))
    }

    /// Restricts the result to the border of the converted region.
    #[must_use]
    pub fn border(mut self, border: bool) -> Self {
        self.options.border = Some(border);
        self
    }

    /// Only keeps target elements entirely covered by the source.
    #[must_use]
    pub fn internal(mut self, internal: bool) -> Self {
        self.options.internal = internal;
        self
    }

    /// Executes the conversion.
    ///
    /// # Errors
    ///
    /// Does not currently fail; the signature leaves room for adapters that
    /// reject a conversion.
    pub fn execute<T: Topology + ?Sized>(&self, topology: &T) -> Result<Conversion> {
        let from = self.source.element();
        if from == self.target {
            return Ok(Conversion::Unchanged);
        }
        let mut options = self.options;
        if from == ElementType::Vertex
            && self.target == ElementType::Edge
            && !options.is_border()
        {
            options.internal = true;
        }
        let indices = topology.convert(&self.source, self.target, options);
        let converted = (!indices.is_empty())
            .then(|| ComponentSet::from_indices(self.source.mesh(), self.target, indices));
        Ok(Conversion::Converted(converted))
    }
}

/// Converts a whole selection to another element type.
///
/// Returns `None` (nothing to apply) if any component already has the target
/// type.
pub struct ConvertSelection {
    target: ElementType,
    border: bool,
    internal: bool,
}

impl ConvertSelection {
    /// Creates a new `ConvertSelection` operation.
    #[must_use]
    pub fn new(target: ElementType) -> Self {
        Self {
            target,
            border: false,
            internal: false,
        }
    }

    /// Creates a selection conversion to a target named by the host.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` names no known element type.
    pub fn from_name(target: &str) -> Result<Self> {
        Ok(Self::new(target.parse()?))
    }

    #[must_use]
    pub fn border(mut self, border: bool) -> Self {
        self.border = border;
        self
    }

    #[must_use]
    pub fn internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    /// Executes the conversion, returning a replacement selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection is empty.
    pub fn execute<T: Topology + ?Sized>(
        &self,
        topology: &T,
        selection: &SelectionCollection,
    ) -> Result<Option<SelectionUpdate>> {
        if selection.is_empty() {
            return Err(SelectionError::NothingSelected.into());
        }
        let mut converted = SelectionCollection::new();
        for set in selection.merged().iter() {
            if set.element() == self.target {
                tracing::info!(target_type = %self.target, "selection is already this type");
                return Ok(None);
            }
            let mut op = Convert::new(set.clone(), self.target).internal(self.internal);
            if self.border {
                op = op.border(true);
            }
            if let Conversion::Converted(Some(result)) = op.execute(topology)? {
                converted.add(result)?;
            }
        }
        tracing::debug!(sets = converted.len(), target_type = %self.target, "converted selection");
        Ok(Some(SelectionUpdate::Replace(converted)))
    }
}
