/// Index of the largest value, preferring the first on ties
pub fn argmax(row: &[f32]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, max), (index, &value)| {
            if value > max {
                (index, value)
            } else {
                (best, max)
            }
        })
        .0
}

/// Fraction of predictions matching their labels, 0 for an empty set
pub fn accuracy(labels: &[usize], predictions: &[usize]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }

    let correct = labels
        .iter()
        .zip(predictions)
        .filter(|(label, prediction)| label == prediction)
        .count();

    correct as f64 / labels.len() as f64
}
