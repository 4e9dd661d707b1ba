use burn::{
    module::Module,
    nn::{loss::CrossEntropyLossConfig, Dropout, Linear},
    tensor::{activation::softmax, backend::Backend, Int, Tensor},
    train::ClassificationOutput,
};

use crate::pipelines::text_classification::batcher::{Infer, Train};

use super::{embedding, BiLstm};

/// Bidirectional LSTM for Text Classification
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// Dropout on the embedded tokens
    pub embed_dropout: Dropout,

    /// The bidirectional recurrent encoder
    pub encoder: BiLstm<B>,

    /// Dropout on the pooled features
    pub dense_dropout: Dropout,

    /// Linear layer projecting pooled features to class logits
    pub output: Linear<B>,

    /// Total number of classes
    pub n_classes: usize,
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Compute class logits for a batch of tokens: [batch_size, n_classes]
    ///
    /// Dropout is only applied when `B` is an autodiff backend, so the module returned by
    /// `AutodiffModule::valid` runs in inference mode.
    pub fn logits(&self, table: Tensor<B, 2>, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let embedded = embedding::lookup(table, tokens);
        let embedded = self.embed_dropout.forward(embedded);

        let encoded = self.encoder.forward(embedded);
        let [batch_size, _seq_length, d_encoded] = encoded.dims();

        let max = encoded.clone().max_dim(1).reshape([batch_size, d_encoded]);
        let mean = encoded.mean_dim(1).reshape([batch_size, d_encoded]);

        let pooled = Tensor::cat(vec![max, mean], 1);
        let pooled = self.dense_dropout.forward(pooled);

        self.output.forward(pooled)
    }

    /// Defines forward pass for training
    pub fn forward(&self, table: Tensor<B, 2>, item: Train<B>) -> ClassificationOutput<B> {
        let output = self.logits(table, item.input.tokens);
        let targets = item.targets.to_device(&output.device());

        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput {
            loss,
            output,
            targets,
        }
    }

    /// Defines forward pass for inference, returning class probabilities
    pub fn infer(&self, table: Tensor<B, 2>, input: Infer<B>) -> Tensor<B, 2> {
        softmax(self.logits(table, input.tokens), 1)
    }
}
