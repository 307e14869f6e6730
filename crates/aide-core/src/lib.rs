pub mod chart;
pub mod color;
pub mod dom;
pub mod hit;
pub mod id;
pub mod markup;
pub mod radial;
pub mod selector;

pub use chart::{ChartControl, ChartData, Dataset, Field};
pub use color::{Rgb, computed_gradient};
pub use dom::{Document, Element, Rect};
pub use hit::element_at;
pub use id::{ClassName, ElementId};
pub use markup::parse_markup;
pub use radial::{Offset, button_position, radial_position};
pub use selector::Selector;

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
