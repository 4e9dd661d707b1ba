/// Pre-tokenized labelled examples stored as CSV
pub mod indexed;

/// Embedding matrices stored as whitespace-separated text
pub mod embeddings;
