use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// A frozen embedding table mapping vocabulary indices to dense vectors, stored row-major
#[derive(Clone, Debug, PartialEq)]
pub struct Embeddings {
    vocab_size: usize,
    d_embed: usize,
    values: Vec<f32>,
}

impl Embeddings {
    /// Build a table from one row per vocabulary index
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, EmbeddingsError> {
        let d_embed = rows.first().map(Vec::len).unwrap_or(0);

        if d_embed == 0 {
            return Err(EmbeddingsError::Empty);
        }

        let vocab_size = rows.len();
        let mut values = Vec::with_capacity(vocab_size * d_embed);

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != d_embed {
                return Err(EmbeddingsError::Ragged {
                    index,
                    expected: d_embed,
                    found: row.len(),
                });
            }

            values.extend(row);
        }

        Ok(Self {
            vocab_size,
            d_embed,
            values,
        })
    }

    /// The number of rows in the table
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// The width of each embedding vector
    pub fn d_embed(&self) -> usize {
        self.d_embed
    }

    /// The vector for a single vocabulary index
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.vocab_size {
            return None;
        }

        Some(&self.values[index * self.d_embed..(index + 1) * self.d_embed])
    }

    /// Copy the table onto a device as a 2D tensor: [vocab_size, d_embed]
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::from_data(
            Data::<B::FloatElem, 2>::new(
                self.values.iter().map(|value| value.elem()).collect(),
                Shape::new([self.vocab_size, self.d_embed]),
            ),
            device,
        )
    }
}

/// Look up each token of a [batch_size, seq_length] batch, giving [batch_size, seq_length, d_embed]
pub fn lookup<B: Backend>(table: Tensor<B, 2>, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3> {
    let [batch_size, seq_length] = tokens.dims();
    let [_vocab_size, d_embed] = table.dims();

    table
        .select(0, tokens.reshape([batch_size * seq_length]))
        .reshape([batch_size, seq_length, d_embed])
}

/// Embedding table Error
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EmbeddingsError {
    /// No rows, or rows without any columns
    #[error("embedding matrix is empty")]
    Empty,

    /// A row with a different width than the first one
    #[error("embedding row {index} has {found} columns, expected {expected}")]
    Ragged {
        /// The offending row
        index: usize,
        /// Width of the first row
        expected: usize,
        /// Width of the offending row
        found: usize,
    },
}
