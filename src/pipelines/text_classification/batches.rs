use derive_new::new;
use rand::{seq::SliceRandom, Rng};

use super::Error;

/// A contiguous slice of the data, with labels when the data is labelled
#[derive(Clone, Debug, PartialEq, new)]
pub struct Chunk<T> {
    /// Inputs in batch order
    pub inputs: Vec<T>,

    /// Labels aligned with `inputs`
    pub labels: Option<Vec<usize>>,
}

/// Lazily slices inputs, and optionally labels, into chunks of at most `batch_size` items. The
/// last chunk may be shorter. Consumed by iteration.
#[derive(Debug)]
pub struct Batches<'a, T> {
    inputs: &'a [T],
    labels: Option<&'a [usize]>,
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
}

impl<'a, T: Clone> Batches<'a, T> {
    /// Iterate over the data in its original order
    pub fn new(
        inputs: &'a [T],
        labels: Option<&'a [usize]>,
        batch_size: usize,
    ) -> Result<Self, Error> {
        if batch_size == 0 {
            return Err(Error::ZeroBatchSize);
        }

        if let Some(labels) = labels {
            if labels.len() != inputs.len() {
                return Err(Error::LengthMismatch {
                    inputs: inputs.len(),
                    labels: labels.len(),
                });
            }
        }

        Ok(Self {
            inputs,
            labels,
            order: (0..inputs.len()).collect(),
            batch_size,
            cursor: 0,
        })
    }

    /// Shuffle the whole dataset once before slicing, keeping labels aligned
    pub fn shuffled<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.order[self.cursor..].shuffle(rng);
        self
    }
}

impl<'a, T: Clone> Iterator for Batches<'a, T> {
    type Item = Chunk<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }

        let end = (self.cursor + self.batch_size).min(self.order.len());
        let indices = &self.order[self.cursor..end];
        self.cursor = end;

        let inputs = indices.iter().map(|&i| self.inputs[i].clone()).collect();
        let labels = self
            .labels
            .map(|labels| indices.iter().map(|&i| labels[i]).collect());

        Some(Chunk { inputs, labels })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.order.len() - self.cursor).div_ceil(self.batch_size);

        (remaining, Some(remaining))
    }
}

impl<'a, T: Clone> ExactSizeIterator for Batches<'a, T> {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_partitions_in_order() {
        let inputs: Vec<usize> = (0..10).collect();

        let chunks: Vec<_> = Batches::new(&inputs, None, 4).unwrap().collect();

        assert_eq!(
            chunks,
            vec![
                Chunk::new(vec![0, 1, 2, 3], None),
                Chunk::new(vec![4, 5, 6, 7], None),
                Chunk::new(vec![8, 9], None),
            ]
        );
    }

    #[test]
    fn test_chunk_sizes_cover_dataset() {
        for len in 1..30 {
            for batch_size in 1..12 {
                let inputs: Vec<usize> = (0..len).collect();
                let batches = Batches::new(&inputs, None, batch_size).unwrap();
                assert_eq!(batches.len(), len.div_ceil(batch_size));

                let sizes: Vec<_> = batches.map(|chunk| chunk.inputs.len()).collect();

                assert_eq!(sizes.iter().sum::<usize>(), len);
                assert!(sizes.iter().all(|&size| size > 0 && size <= batch_size));
            }
        }
    }

    #[test]
    fn test_shuffle_keeps_labels_aligned() {
        let inputs: Vec<usize> = (0..50).collect();
        let labels: Vec<usize> = inputs.iter().map(|i| i * 10).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let chunks: Vec<_> = Batches::new(&inputs, Some(&labels), 8)
            .unwrap()
            .shuffled(&mut rng)
            .collect();

        let mut seen = Vec::new();
        for chunk in chunks {
            let labels = chunk.labels.unwrap();
            for (input, label) in chunk.inputs.into_iter().zip(labels) {
                assert_eq!(label, input * 10);
                seen.push(input);
            }
        }

        assert_ne!(seen, inputs);
        seen.sort_unstable();
        assert_eq!(seen, inputs);
    }

    #[test]
    fn test_labelled_chunks_carry_labels() {
        let inputs: Vec<usize> = (0..10).collect();
        let labels = vec![1; 10];

        for chunk in Batches::new(&inputs, Some(&labels), 4).unwrap() {
            assert_eq!(chunk.labels.map(|labels| labels.len()), Some(chunk.inputs.len()));
        }
    }

    #[test]
    fn test_empty_inputs_yield_nothing() {
        let inputs: Vec<usize> = vec![];

        assert_eq!(Batches::new(&inputs, None, 3).unwrap().count(), 0);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let inputs = vec![1, 2, 3];

        assert!(matches!(
            Batches::new(&inputs, None, 0),
            Err(Error::ZeroBatchSize)
        ));
        assert!(matches!(
            Batches::new(&inputs, Some(&[0usize, 1][..]), 2),
            Err(Error::LengthMismatch {
                inputs: 3,
                labels: 2
            })
        ));
    }
}
