pub mod asset;
pub mod columns;
pub mod contract;
pub mod recommendation;
