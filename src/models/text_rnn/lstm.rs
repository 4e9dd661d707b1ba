use burn::{
    config::Config,
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{activation::sigmoid, backend::Backend, Tensor},
};

/// Configuration for a single LSTM cell
#[derive(Config, Debug)]
pub struct LstmCellConfig {
    /// The size of each input vector
    pub d_input: usize,

    /// The size of the hidden and cell state
    pub d_hidden: usize,

    /// Bias added to the forget gate before the sigmoid
    #[config(default = 1.0)]
    pub forget_bias: f64,
}

impl LstmCellConfig {
    /// Initialize a cell with fresh weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> LstmCell<B> {
        LstmCell {
            gates: LinearConfig::new(self.d_input + self.d_hidden, 4 * self.d_hidden).init(device),
            d_hidden: self.d_hidden,
            forget_bias: self.forget_bias,
        }
    }
}

/// A basic LSTM cell: one affine map of `[x_t, h_{t-1}]` to the input, candidate, forget and
/// output gates, in that order
#[derive(Module, Debug)]
pub struct LstmCell<B: Backend> {
    /// Weights for all four gates
    pub gates: Linear<B>,

    /// The size of the hidden and cell state
    pub d_hidden: usize,

    /// Bias added to the forget gate before the sigmoid
    pub forget_bias: f64,
}

impl<B: Backend> LstmCell<B> {
    /// Run the cell over a [batch_size, seq_length, d_input] sequence from a zero state, returning
    /// the hidden state at every step: [batch_size, seq_length, d_hidden]
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch_size, seq_length, d_input] = input.dims();
        let device = input.device();

        let mut hidden = Tensor::zeros([batch_size, self.d_hidden], &device);
        let mut cell = Tensor::zeros([batch_size, self.d_hidden], &device);
        let mut outputs = Vec::with_capacity(seq_length);

        for t in 0..seq_length {
            let x = input
                .clone()
                .slice([0..batch_size, t..t + 1, 0..d_input])
                .reshape([batch_size, d_input]);

            (hidden, cell) = self.step(x, hidden, cell);

            outputs.push(hidden.clone().reshape([batch_size, 1, self.d_hidden]));
        }

        Tensor::cat(outputs, 1)
    }

    /// A single time step, returning the next (hidden, cell) state
    pub fn step(
        &self,
        x: Tensor<B, 2>,
        hidden: Tensor<B, 2>,
        cell: Tensor<B, 2>,
    ) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let [batch_size, _] = x.dims();
        let d = self.d_hidden;

        let gates = self.gates.forward(Tensor::cat(vec![x, hidden], 1));
        let gate = |i: usize| gates.clone().slice([0..batch_size, i * d..(i + 1) * d]);

        let input_gate = sigmoid(gate(0));
        let candidate = gate(1).tanh();
        let forget_gate = sigmoid(gate(2).add_scalar(self.forget_bias));
        let output_gate = sigmoid(gate(3));

        let cell = cell * forget_gate + input_gate * candidate;
        let hidden = cell.clone().tanh() * output_gate;

        (hidden, cell)
    }
}

/// Two LSTM cells reading a sequence in opposite directions
#[derive(Module, Debug)]
pub struct BiLstm<B: Backend> {
    /// Reads the sequence from first to last token
    pub forward: LstmCell<B>,

    /// Reads the sequence from last to first token
    pub backward: LstmCell<B>,
}

impl<B: Backend> BiLstm<B> {
    /// Encode a [batch_size, seq_length, d_input] sequence into [batch_size, seq_length, 2 * d_hidden],
    /// with both directions aligned by position
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        let forward = self.forward.forward(input.clone());
        let backward = reverse_time(self.backward.forward(reverse_time(input)));

        Tensor::cat(vec![forward, backward], 2)
    }
}

/// Reverse a [batch_size, seq_length, d] tensor along the time axis
fn reverse_time<B: Backend>(input: Tensor<B, 3>) -> Tensor<B, 3> {
    let [batch_size, seq_length, d] = input.dims();

    let steps = (0..seq_length)
        .rev()
        .map(|t| input.clone().slice([0..batch_size, t..t + 1, 0..d]))
        .collect();

    Tensor::cat(steps, 1)
}

#[cfg(test)]
mod tests {
    use burn::{
        backend::NdArray,
        tensor::{Data, Shape},
    };

    use super::*;

    type TestBackend = NdArray;

    fn sequence(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 3> {
        Tensor::from_data(
            Data::new(
                vec![0.1f32, -0.2, 0.3, 0.4, -0.5, 0.6, 0.7, 0.8, -0.9],
                Shape::new([1, 3, 3]),
            ),
            device,
        )
    }

    #[test]
    fn test_cell_output_shape() {
        let device = Default::default();
        let cell = LstmCellConfig::new(3, 5).init::<TestBackend>(&device);

        let output = cell.forward(sequence(&device));

        assert_eq!(output.dims(), [1, 3, 5]);
    }

    #[test]
    fn test_hidden_state_is_bounded() {
        let device = Default::default();
        let cell = LstmCellConfig::new(3, 4).init::<TestBackend>(&device);

        let values = cell
            .forward(sequence(&device))
            .into_data()
            .convert::<f32>()
            .value;

        assert!(values.iter().all(|v| v.abs() < 1.0));
    }

    #[test]
    fn test_reverse_time() {
        let device = Default::default();

        let reversed = reverse_time(sequence(&device)).into_data().convert::<f32>().value;

        assert_eq!(
            reversed,
            vec![0.7, 0.8, -0.9, 0.4, -0.5, 0.6, 0.1, -0.2, 0.3]
        );
    }

    #[test]
    fn test_bidirectional_concatenates_directions() {
        let device = Default::default();
        let cell = LstmCellConfig::new(3, 2);
        let encoder = BiLstm::<TestBackend> {
            forward: cell.init(&device),
            backward: cell.init(&device),
        };

        let encoded = encoder.forward(sequence(&device));

        assert_eq!(encoded.dims(), [1, 3, 4]);
    }

    #[test]
    fn test_backward_direction_sees_future_tokens() {
        let device = Default::default();
        let cell = LstmCellConfig::new(3, 2);
        let encoder = BiLstm::<TestBackend> {
            forward: cell.init(&device),
            backward: cell.init(&device),
        };

        // Changing only the last token leaves the forward state at t = 0 untouched, but the
        // backward state at t = 0 has already read it
        let input = sequence(&device);
        let changed = input.clone().slice_assign(
            [0..1, 2..3, 0..3],
            Tensor::from_data(Data::new(vec![5.0f32, 5.0, 5.0], Shape::new([1, 1, 3])), &device),
        );

        let first = encoder.forward(input).slice([0..1, 0..1, 0..4]);
        let second = encoder.forward(changed).slice([0..1, 0..1, 0..4]);

        let first = first.into_data().convert::<f32>().value;
        let second = second.into_data().convert::<f32>().value;

        assert_eq!(first[..2], second[..2]);
        assert_ne!(first[2..], second[2..]);
    }
}
