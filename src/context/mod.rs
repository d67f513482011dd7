pub mod extractor;
pub mod graph;
pub mod resolver;
pub mod selector;
