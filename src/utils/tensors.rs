use std::iter;

use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Pad or truncate each token sequence to exactly `seq_length` tokens, padding at the end
pub fn pad_to<B: Backend>(
    pad_token: usize,
    tokens_list: Vec<Vec<usize>>,
    seq_length: usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let batch_size = tokens_list.len();

    let values = tokens_list
        .into_iter()
        .flat_map(|tokens| {
            tokens
                .into_iter()
                .chain(iter::repeat(pad_token))
                .take(seq_length)
        })
        .map(|token| (token as i64).elem())
        .collect();

    Tensor::from_data(
        Data::<B::IntElem, 2>::new(values, Shape::new([batch_size, seq_length])),
        device,
    )
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_pad_to_uses_pad_token() {
        let tensor = pad_to::<NdArray>(9, vec![vec![1], vec![], vec![2, 3]], 2, &Default::default());

        assert_eq!(
            tensor.into_data().convert::<i64>().value,
            vec![1, 9, 9, 9, 2, 3]
        );
    }
}
