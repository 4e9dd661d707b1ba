/// Model configuration
pub mod config;

/// The frozen embedding table
pub mod embedding;

/// LSTM cells and the bidirectional encoder
pub mod lstm;

/// The classification model
pub mod model;

pub use config::Config;
pub use embedding::{Embeddings, EmbeddingsError};
pub use lstm::{BiLstm, LstmCell};
pub use model::Model;
