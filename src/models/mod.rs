/// Bidirectional LSTM text classification model
pub mod text_rnn;
