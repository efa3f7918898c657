mod convert;
mod coplanar;
mod grow;
mod inbetween;
mod invert;
mod partition;
mod pattern;
mod toggle;

pub use convert::{Conversion, Convert, ConvertSelection};
pub use coplanar::{CoplanarMode, CoplanarSession, Growth};
pub use grow::{Adjacent, Flood, NonQuads, Traverse};
pub use inbetween::InBetween;
pub use invert::{Invert, SceneContext, SelectMode};
pub use partition::{
    shell_containing, shells, shells_touching, GroupKey, NormalKey, Partition, ShellGroup,
};
pub use pattern::PatternWalker;
pub use toggle::{ClearUnderCursor, ToggleRequest, ToggleUnderCursor};
