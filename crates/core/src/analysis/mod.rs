pub mod batch;
pub mod recommend;
pub mod stats;
pub mod summary;
