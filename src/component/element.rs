use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TopologyError;

/// The granularity of a mesh component selection.
///
/// The derived ordering only keeps collections deterministic; conversions
/// between types are pairwise rules, not a hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Vertex,
    Edge,
    Face,
    Uv,
}

impl ElementType {
    /// All element types, in selection-mask priority order.
    pub const ALL: [Self; 4] = [Self::Vertex, Self::Edge, Self::Face, Self::Uv];

    /// Short host-facing name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::Face => "face",
            Self::Uv => "uv",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertex" | "vert" | "vtx" => Ok(Self::Vertex),
            "edge" | "e" => Ok(Self::Edge),
            "face" | "f" | "polygon" => Ok(Self::Face),
            "uv" | "map" => Ok(Self::Uv),
            _ => Err(TopologyError::InvalidElementType(s.to_owned())),
        }
    }
}
