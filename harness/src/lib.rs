pub mod config;
pub mod embeddings;
pub mod mem;
pub mod report;
pub mod runner;
pub mod similarity;
