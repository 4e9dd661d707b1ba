use std::{num::ParseIntError, path::Path};

use burn::data::dataset::{self, Dataset as _, InMemDataset};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// A CSV row: a class id and its space-separated token ids
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, new)]
pub struct Item {
    /// The class id of the text
    pub label: usize,

    /// Vocabulary indices separated by spaces, e.g. "12 4 87"
    pub tokens: String,
}

impl Item {
    /// Parse the token ids
    pub fn token_ids(&self) -> Result<Vec<usize>, ParseIntError> {
        self.tokens.split_whitespace().map(str::parse).collect()
    }
}

/// A dataset of pre-tokenized examples with a `label,tokens` header
pub struct Dataset {
    /// Underlying In-Memory dataset
    dataset: InMemDataset<Item>,
}

/// Implement the Dataset trait for the indexed dataset
impl dataset::Dataset<Item> for Dataset {
    /// Returns a specific item from the dataset
    fn get(&self, index: usize) -> Option<Item> {
        self.dataset.get(index)
    }

    /// Returns the length of the dataset
    fn len(&self) -> usize {
        self.dataset.len()
    }
}

impl Dataset {
    /// Load a dataset from a CSV file
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let reader = csv::ReaderBuilder::new();

        let dataset: InMemDataset<Item> = InMemDataset::from_csv(path, &reader)?;

        Ok(Self { dataset })
    }

    /// Build a dataset from items already in memory
    pub fn from_items(items: Vec<Item>) -> Self {
        Self {
            dataset: InMemDataset::new(items),
        }
    }

    /// Split into token id sequences and their labels
    pub fn split(&self) -> anyhow::Result<(Vec<Vec<usize>>, Vec<usize>)> {
        let mut inputs = Vec::with_capacity(self.len());
        let mut labels = Vec::with_capacity(self.len());

        for (index, item) in self.dataset.iter().enumerate() {
            let tokens = item
                .token_ids()
                .map_err(|e| anyhow!("Invalid tokens in row {}: {}", index + 1, e))?;

            inputs.push(tokens);
            labels.push(item.label);
        }

        Ok((inputs, labels))
    }
}
