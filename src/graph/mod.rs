mod build;
mod centrality;
mod model;
mod property;
mod scale;

pub use build::{apply_distance_layout, build_value_pair_graph, BuildConfig, DistanceBasis, ValuePair};
pub use centrality::{betweenness_centrality, degree_centrality, weighted_degree};
pub use model::{EdgeAttrs, NodeAttrs, NodeCategory, PropertyGraph};
pub use property::{improvement_color, improvement_label, improvement_size, Property};
pub use scale::{edge_length, edge_width, Span};
