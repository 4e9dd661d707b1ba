use burn::{
    nn::{DropoutConfig, LinearConfig},
    tensor::backend::Backend,
    LearningRate,
};

use super::{lstm::LstmCellConfig, BiLstm, Model};

/// The Model Configuration
#[derive(burn::config::Config, Debug)]
pub struct Config {
    /// Sequences are padded or truncated to this many tokens
    pub max_seq_len: usize,

    /// Total number of classes
    #[config(default = 2)]
    pub n_classes: usize,

    /// Width of the hidden state for each LSTM direction
    #[config(default = 128)]
    pub rnn_hidden_units: usize,

    /// Dropout rate applied to the embedded tokens
    #[config(default = 0.4)]
    pub embed_dropout: f64,

    /// Dropout rate applied to the pooled features
    #[config(default = 0.4)]
    pub dense_dropout: f64,

    /// Learning rate
    #[config(default = 1e-3)]
    pub learning_rate: LearningRate,

    /// Adam epsilon
    #[config(default = 1e-8)]
    pub adam_epsilon: f32,

    /// Bias added to the forget gate before the sigmoid
    #[config(default = 1.0)]
    pub forget_bias: f64,

    /// The padding token ID
    #[config(default = 0)]
    pub pad_token_id: usize,

    /// Seed for parameter initialization
    #[config(default = 42)]
    pub seed: u64,

    /// The directory checkpoints are written to
    #[config(default = "\"tmp/text_rnn\".to_string()")]
    pub model_path: String,
}

impl Config {
    /// Initializes a model for embeddings of width `d_embed` with fresh weights
    pub fn init<B: Backend>(&self, d_embed: usize, device: &B::Device) -> Model<B> {
        let cell = LstmCellConfig::new(d_embed, self.rnn_hidden_units)
            .with_forget_bias(self.forget_bias);

        let encoder = BiLstm {
            forward: cell.init(device),
            backward: cell.init(device),
        };

        // Max-pool and mean-pool of both directions
        let output = LinearConfig::new(4 * self.rnn_hidden_units, self.n_classes).init(device);

        Model {
            embed_dropout: DropoutConfig::new(self.embed_dropout).init(),
            encoder,
            dense_dropout: DropoutConfig::new(self.dense_dropout).init(),
            output,
            n_classes: self.n_classes,
        }
    }
}
