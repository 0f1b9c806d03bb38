//! Query services layered over the datasource trait.

pub mod troves;

pub use troves::TroveQueryService;
