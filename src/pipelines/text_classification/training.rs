use std::io::{self, Write};

use burn::{
    data::dataloader::batcher::Batcher as _,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use derive_new::new;
use rand::{rngs::StdRng, SeedableRng};

use crate::utils::classes;

use super::{batcher::Train, Batcher, Batches, Chunk, Error, Item, TextClassifier};

/// Define configuration struct for a call to `fit`
#[derive(burn::config::Config, Debug)]
pub struct FitConfig {
    /// Batch size
    #[config(default = 64)]
    pub batch_size: usize,

    /// Number of epochs
    #[config(default = 1)]
    pub num_epochs: usize,

    /// Save the model whenever validation accuracy improves
    #[config(default = false)]
    pub save_model: bool,

    /// Seed for shuffling the training data each epoch
    #[config(default = 42)]
    pub seed: u64,
}

/// Summary of one training epoch
#[derive(Clone, Debug, PartialEq, new)]
pub struct EpochMetrics {
    /// 1-based epoch number
    pub epoch: usize,

    /// Mean loss over the epoch's batches
    pub loss: f64,

    /// Mean training accuracy over the epoch's batches
    pub accuracy: f64,

    /// Accuracy on the validation data, when given
    pub valid_accuracy: Option<f64>,

    /// Whether a checkpoint was written after this epoch
    pub saved: bool,
}

impl<B: AutodiffBackend> TextClassifier<B> {
    /// Train on `inputs` and `labels`, one Adam step per mini-batch, printing progress to stdout.
    ///
    /// With validation data, validation accuracy is reported after every epoch, and when
    /// `save_model` is set the model is saved to the configured path each time that accuracy
    /// beats the best seen so far in this call.
    pub fn fit(
        &mut self,
        inputs: &[Vec<usize>],
        labels: &[usize],
        validation: Option<(&[Vec<usize>], &[usize])>,
        config: &FitConfig,
    ) -> Result<Vec<EpochMetrics>, Error> {
        if inputs.is_empty() {
            return Err(Error::EmptyDataset);
        }

        if config.batch_size == 0 {
            return Err(Error::ZeroBatchSize);
        }

        self.check_inputs(inputs)?;
        self.check_labels(inputs, labels)?;

        if let Some((valid_inputs, valid_labels)) = validation {
            self.check_inputs(valid_inputs)?;
            self.check_labels(valid_inputs, valid_labels)?;
        }

        let batcher = Batcher::<B>::new(
            self.config.max_seq_len,
            self.config.pad_token_id,
            self.device.clone(),
        );

        let mut optim = AdamConfig::new()
            .with_epsilon(self.config.adam_epsilon)
            .init();

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut stdout = io::stdout();

        let mut best_accuracy = 0.0;
        let mut history = Vec::with_capacity(config.num_epochs);

        for epoch in 1..=config.num_epochs {
            println!("Epoch {}/{}", epoch, config.num_epochs);

            let mut total_loss = 0.0;
            let mut total_accuracy = 0.0;
            let mut count = 0;

            for chunk in Batches::new(inputs, Some(labels), config.batch_size)?.shuffled(&mut rng) {
                let Chunk {
                    inputs: batch_inputs,
                    labels: batch_labels,
                } = chunk;

                // Built from labelled data, so every chunk carries its labels
                let batch_labels = batch_labels.unwrap_or_default();
                debug_assert_eq!(batch_labels.len(), batch_inputs.len());

                let items = batch_inputs
                    .iter()
                    .cloned()
                    .zip(batch_labels.iter().copied())
                    .map(|(tokens, label)| Item::new(tokens, label))
                    .collect();

                let item: Train<B> = batcher.batch(items);
                let output = self.model.forward(self.table.clone(), item);

                let loss = output.loss.clone().into_scalar().elem::<f64>();
                let grads = GradientsParams::from_grads(output.loss.backward(), &self.model);

                self.model = optim.step(self.config.learning_rate, self.model.clone(), grads);

                // Accuracy comes from a second, inference-mode pass with the updated weights
                let predictions = self.predict(&batch_inputs, config.batch_size)?;

                count += 1;
                total_loss += loss;
                total_accuracy += classes::accuracy(&batch_labels, &predictions);

                print!(
                    "\r - loss:{:.4} - acc:{:.4}",
                    total_loss / count as f64,
                    total_accuracy / count as f64
                );
                stdout.flush()?;
            }
            println!();

            let valid_accuracy = match validation {
                Some((valid_inputs, valid_labels)) => {
                    let accuracy = self.evaluate(valid_inputs, valid_labels, config.batch_size)?;
                    println!(" - val_acc:{:.4}", accuracy);

                    Some(accuracy)
                }
                None => None,
            };

            let mut saved = false;

            if let Some(accuracy) = valid_accuracy {
                if config.save_model && best_accuracy < accuracy {
                    best_accuracy = accuracy;
                    self.save(&self.config.model_path)?;
                    saved = true;
                }
            }

            let metrics = EpochMetrics::new(
                epoch,
                total_loss / count as f64,
                total_accuracy / count as f64,
                valid_accuracy,
                saved,
            );

            log::debug!("Finished epoch: {:?}", metrics);

            history.push(metrics);
        }

        Ok(history)
    }
}
