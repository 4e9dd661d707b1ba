/// Tensor batches for training and inference
pub mod batcher;

/// Lazy mini-batch iteration over in-memory data
pub mod batches;

/// The classifier and its checkpoints
pub mod classifier;

/// Classifier Errors
pub mod error;

/// Training
pub mod training;

/// Inference
pub mod inference;

pub use batcher::{Batcher, Item};
pub use batches::{Batches, Chunk};
pub use classifier::TextClassifier;
pub use error::Error;
pub use training::{EpochMetrics, FitConfig};
