pub mod closure;
pub mod graph;
pub mod projector;

pub use closure::{Adjacency, ClosureResolver, ConceptEdges, StoreAdjacency};
pub use graph::ConceptGraph;
pub use projector::{PairProjector, project_rows};
