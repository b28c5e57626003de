mod builder;
mod types;

pub use builder::WantsGraph;
pub use types::{NodeIndex, WantsEdge};
