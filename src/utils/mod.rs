/// File utilities
pub mod files;

/// Tensor Utilities
pub mod tensors;

/// Utilities for classification tasks
pub mod classes;
