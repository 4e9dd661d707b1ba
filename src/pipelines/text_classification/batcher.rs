use burn::{
    data::dataloader,
    tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor},
};
use derive_new::new;

use crate::utils::tensors;

/// An inference batch for text classification
#[derive(Debug, Clone, new)]
pub struct Infer<B: Backend> {
    /// Token ids as 2D tensor: [batch_size, max_seq_len]
    pub tokens: Tensor<B, 2, Int>,
}

/// A training batch for text classification
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Model input
    pub input: Infer<B>,

    /// Class ids for the batch
    pub targets: Tensor<B, 1, Int>,
}

/// A labelled example
#[derive(Clone, Debug, PartialEq, new)]
pub struct Item {
    /// Token ids, of any length
    pub tokens: Vec<usize>,

    /// The class id
    pub label: usize,
}

/// Struct for batching token sequences into tensors
#[derive(Clone, new)]
pub struct Batcher<B: Backend> {
    /// Sequences are padded or truncated to this length
    pub max_seq_len: usize,

    /// ID of the padding token
    pub pad_token_id: usize,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,
}

/// Implement Batcher trait for Batcher struct for inference
impl<B: Backend> dataloader::batcher::Batcher<Vec<usize>, Infer<B>> for Batcher<B> {
    /// Collects token sequences into an inference batch
    fn batch(&self, items: Vec<Vec<usize>>) -> Infer<B> {
        Infer {
            tokens: tensors::pad_to(self.pad_token_id, items, self.max_seq_len, &self.device),
        }
    }
}

/// Implement Batcher trait for Batcher struct for training
impl<B: Backend> dataloader::batcher::Batcher<Item, Train<B>> for Batcher<B> {
    /// Collects labelled items into a training batch
    fn batch(&self, items: Vec<Item>) -> Train<B> {
        let batch_size = items.len();

        let (tokens, labels): (Vec<_>, Vec<_>) = items
            .into_iter()
            .map(|item| (item.tokens, item.label))
            .unzip();

        let input: Infer<B> = self.batch(tokens);

        let targets = Tensor::from_data(
            Data::<B::IntElem, 1>::new(
                labels.into_iter().map(|label| (label as i64).elem()).collect(),
                Shape::new([batch_size]),
            ),
            &self.device,
        );

        Train { input, targets }
    }
}
