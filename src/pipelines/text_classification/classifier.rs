use std::{
    fs,
    path::Path,
    sync::{Mutex, PoisonError},
};

use burn::{
    config::Config as _,
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::{backend::AutodiffBackend, Tensor},
};

use crate::models::text_rnn::{Config, Embeddings, Model};

use super::Error;

/// Checkpoints keep full precision so a restored model predicts exactly like the saved one
type CheckpointRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// The backend RNG is process-wide: seeding and drawing the initial weights happen under this lock
static INIT: Mutex<()> = Mutex::new(());

/// File name of the model configuration inside a checkpoint directory
pub const CONFIG_FILE: &str = "config.json";

/// File stem of the model weights inside a checkpoint directory
pub const MODEL_FILE: &str = "model";

/// A bidirectional LSTM text classifier together with the execution context it runs in: the
/// frozen embedding table, the trainable module and the device they live on
#[derive(Debug)]
pub struct TextClassifier<B: AutodiffBackend> {
    pub(crate) config: Config,
    pub(crate) table: Tensor<B, 2>,
    pub(crate) vocab_size: usize,
    pub(crate) model: Model<B>,
    pub(crate) device: B::Device,
}

impl<B: AutodiffBackend> TextClassifier<B> {
    /// Build a classifier with freshly initialized weights around a frozen embedding matrix
    pub fn new(config: Config, embeddings: &Embeddings, device: B::Device) -> Result<Self, Error> {
        validate(&config, embeddings)?;

        let model = {
            let _guard = INIT.lock().unwrap_or_else(PoisonError::into_inner);

            B::seed(config.seed);

            // Parameters are initialized lazily on first use, so draw them all while seeded
            let model = config.init::<B>(embeddings.d_embed(), &device);
            model.clone().load_record(model.into_record())
        };
        let table = embeddings.to_tensor::<B>(&device);

        log::debug!(
            "Initialized text classifier: vocab_size={}, d_embed={}, hidden={}, classes={}",
            embeddings.vocab_size(),
            embeddings.d_embed(),
            config.rnn_hidden_units,
            config.n_classes
        );

        Ok(Self {
            config,
            table,
            vocab_size: embeddings.vocab_size(),
            model,
            device,
        })
    }

    /// Rebuild a classifier from a checkpoint directory written by [`TextClassifier::save`]
    pub fn load<P: AsRef<Path>>(
        dir: P,
        embeddings: &Embeddings,
        device: B::Device,
    ) -> Result<Self, Error> {
        let dir = dir.as_ref();

        let config = Config::load(dir.join(CONFIG_FILE)).map_err(|e| Error::Config(e.to_string()))?;

        let mut classifier = Self::new(config, embeddings, device)?;
        classifier.restore(dir)?;

        Ok(classifier)
    }

    /// Write the configuration and the trainable weights to a checkpoint directory
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<(), Error> {
        let dir = dir.as_ref();

        fs::create_dir_all(dir)?;

        self.config.save(dir.join(CONFIG_FILE))?;

        CheckpointRecorder::new()
            .record(self.model.clone().into_record(), dir.join(MODEL_FILE))
            .map_err(|e| Error::Checkpoint(e.to_string()))?;

        log::info!("Saved checkpoint to {}", dir.display());

        Ok(())
    }

    /// Replace the trainable weights with the ones stored in a checkpoint directory
    pub fn restore<P: AsRef<Path>>(&mut self, dir: P) -> Result<(), Error> {
        let dir = dir.as_ref();

        let record = CheckpointRecorder::new()
            .load(dir.join(MODEL_FILE), &self.device)
            .map_err(|e| Error::Checkpoint(e.to_string()))?;

        self.model = self.model.clone().load_record(record);

        log::info!("Restored checkpoint from {}", dir.display());

        Ok(())
    }

    /// The model configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The trainable module
    pub fn model(&self) -> &Model<B> {
        &self.model
    }

    /// The device computation runs on
    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Every token that will reach the embedding lookup must have a row in the table
    pub(crate) fn check_inputs(&self, inputs: &[Vec<usize>]) -> Result<(), Error> {
        let max_token = inputs
            .iter()
            .flat_map(|tokens| tokens.iter().take(self.config.max_seq_len))
            .max();

        match max_token {
            Some(&index) if index >= self.vocab_size => Err(Error::TokenOutOfRange {
                index,
                vocab_size: self.vocab_size,
            }),
            _ => Ok(()),
        }
    }

    /// Labels must be aligned with the inputs and name a known class
    pub(crate) fn check_labels(&self, inputs: &[Vec<usize>], labels: &[usize]) -> Result<(), Error> {
        if inputs.len() != labels.len() {
            return Err(Error::LengthMismatch {
                inputs: inputs.len(),
                labels: labels.len(),
            });
        }

        match labels.iter().find(|&&label| label >= self.config.n_classes) {
            Some(&label) => Err(Error::LabelOutOfRange {
                label,
                n_classes: self.config.n_classes,
            }),
            None => Ok(()),
        }
    }
}

fn validate(config: &Config, embeddings: &Embeddings) -> Result<(), Error> {
    if config.max_seq_len == 0 {
        return Err(Error::InvalidConfig("max_seq_len must be positive".into()));
    }

    if config.n_classes == 0 {
        return Err(Error::InvalidConfig("n_classes must be positive".into()));
    }

    if config.rnn_hidden_units == 0 {
        return Err(Error::InvalidConfig("rnn_hidden_units must be positive".into()));
    }

    for (name, rate) in [
        ("embed_dropout", config.embed_dropout),
        ("dense_dropout", config.dense_dropout),
    ] {
        if !(0.0..1.0).contains(&rate) {
            return Err(Error::InvalidConfig(format!(
                "{name} must be in [0, 1), got {rate}"
            )));
        }
    }

    if config.pad_token_id >= embeddings.vocab_size() {
        return Err(Error::TokenOutOfRange {
            index: config.pad_token_id,
            vocab_size: embeddings.vocab_size(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use burn::backend::{Autodiff, NdArray};

    use super::*;

    type TestBackend = Autodiff<NdArray>;

    fn embeddings() -> Embeddings {
        Embeddings::from_rows(vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap()
    }

    #[test]
    fn test_rejects_invalid_dropout() {
        let config = Config::new(4).with_dense_dropout(1.0);

        let result = TextClassifier::<TestBackend>::new(config, &embeddings(), Default::default());

        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_pad_token_outside_vocabulary() {
        let config = Config::new(4).with_pad_token_id(3);

        let result = TextClassifier::<TestBackend>::new(config, &embeddings(), Default::default());

        assert!(matches!(
            result,
            Err(Error::TokenOutOfRange {
                index: 3,
                vocab_size: 3
            })
        ));
    }

    #[test]
    fn test_checks_tokens_within_sequence_length() {
        let classifier =
            TextClassifier::<TestBackend>::new(Config::new(2), &embeddings(), Default::default())
                .unwrap();

        // Tokens past max_seq_len are truncated away and never looked up
        assert!(classifier.check_inputs(&[vec![1, 2, 99]]).is_ok());
        assert!(matches!(
            classifier.check_inputs(&[vec![1, 7]]),
            Err(Error::TokenOutOfRange {
                index: 7,
                vocab_size: 3
            })
        ));
    }

    #[test]
    fn test_checks_labels() {
        let classifier =
            TextClassifier::<TestBackend>::new(Config::new(2), &embeddings(), Default::default())
                .unwrap();

        assert!(classifier.check_labels(&[vec![1], vec![2]], &[0, 1]).is_ok());
        assert!(matches!(
            classifier.check_labels(&[vec![1]], &[0, 1]),
            Err(Error::LengthMismatch { .. })
        ));
        assert!(matches!(
            classifier.check_labels(&[vec![1]], &[2]),
            Err(Error::LabelOutOfRange {
                label: 2,
                n_classes: 2
            })
        ));
    }
}
