pub mod component_set;
pub mod element;
pub mod selection;

pub use component_set::{domain_indices, ComponentSet};
pub use element::ElementType;
pub use selection::{Pick, SelectionCollection, SelectionUpdate};
