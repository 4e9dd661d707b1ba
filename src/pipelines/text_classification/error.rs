use crate::models::text_rnn::EmbeddingsError;

/// Text Classification Error
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The embedding matrix could not be used
    #[error(transparent)]
    Embeddings(#[from] EmbeddingsError),

    /// A model hyperparameter is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Inputs and labels are not aligned
    #[error("found {inputs} inputs but {labels} labels")]
    LengthMismatch {
        /// Number of input sequences
        inputs: usize,
        /// Number of labels
        labels: usize,
    },

    /// A token has no row in the embedding matrix
    #[error("token index {index} is out of range for a vocabulary of {vocab_size}")]
    TokenOutOfRange {
        /// The offending token
        index: usize,
        /// Rows in the embedding matrix
        vocab_size: usize,
    },

    /// A label is not a valid class id
    #[error("label {label} is out of range for {n_classes} classes")]
    LabelOutOfRange {
        /// The offending label
        label: usize,
        /// Total number of classes
        n_classes: usize,
    },

    /// Batches must hold at least one item
    #[error("batch size must be greater than zero")]
    ZeroBatchSize,

    /// There is nothing to train on
    #[error("training set is empty")]
    EmptyDataset,

    /// Model weights could not be recorded or restored
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// The model configuration could not be restored
    #[error("unable to load config file: {0}")]
    Config(String),

    /// Filesystem or stdout failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
