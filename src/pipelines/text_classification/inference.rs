use burn::{
    data::dataloader::batcher::Batcher as _, module::AutodiffModule,
    tensor::backend::AutodiffBackend,
};

use crate::utils::classes;

use super::{batcher::Infer, Batcher, Batches, Error, TextClassifier};

impl<B: AutodiffBackend> TextClassifier<B> {
    /// Class probabilities for every input, in input order: one row of `n_classes` per input
    pub fn predict_prob(
        &self,
        inputs: &[Vec<usize>],
        batch_size: usize,
    ) -> Result<Vec<Vec<f32>>, Error> {
        self.check_inputs(inputs)?;

        // The inner backend has no autodiff, which turns both dropout layers off
        let model = self.model.valid();
        let table = self.table.clone().inner();

        let batcher = Batcher::<B::InnerBackend>::new(
            self.config.max_seq_len,
            self.config.pad_token_id,
            self.device.clone(),
        );

        let mut probs = Vec::with_capacity(inputs.len());

        for chunk in Batches::new(inputs, None, batch_size)? {
            let input: Infer<B::InnerBackend> = batcher.batch(chunk.inputs);

            let values = model
                .infer(table.clone(), input)
                .into_data()
                .convert::<f32>()
                .value;

            probs.extend(values.chunks(self.config.n_classes).map(<[f32]>::to_vec));
        }

        Ok(probs)
    }

    /// The most probable class for every input, in input order
    pub fn predict(&self, inputs: &[Vec<usize>], batch_size: usize) -> Result<Vec<usize>, Error> {
        let probs = self.predict_prob(inputs, batch_size)?;

        Ok(probs.iter().map(|row| classes::argmax(row)).collect())
    }

    /// Fraction of `inputs` whose predicted class matches its label
    pub fn evaluate(
        &self,
        inputs: &[Vec<usize>],
        labels: &[usize],
        batch_size: usize,
    ) -> Result<f64, Error> {
        self.check_labels(inputs, labels)?;

        let predictions = self.predict(inputs, batch_size)?;

        Ok(classes::accuracy(labels, &predictions))
    }
}
