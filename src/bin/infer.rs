//! Command line tool for inference

use anyhow::{anyhow, Context, Result};
use pico_args::Arguments;
use serde::Serialize;
use text_rnn::{
    backend::{self, Backend},
    datasets::{embeddings, indexed},
    pipelines::text_classification::TextClassifier,
    utils::classes,
};

const HELP: &str = "\
Usage: infer MODEL_DIR EMBEDDINGS INPUT_CSV [OPTIONS]

Arguments:
  MODEL_DIR            Checkpoint directory written by 'train'
  EMBEDDINGS           The embedding matrix the model was trained with
  INPUT_CSV            Examples with a 'label,tokens' header

Options:
  -h, --help           Print help
  -b, --batch-size     Batch size (defaults to 64)
  -p, --probs          Include class probabilities in the output
";

#[derive(Debug)]
struct Args {
    /// Prints the usage menu
    help: bool,

    /// The checkpoint directory
    model_dir: String,

    /// The embedding matrix
    embeddings: String,

    /// The examples to classify
    input: String,

    /// Batch size
    batch_size: Option<usize>,

    /// Include class probabilities
    probs: bool,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut pargs = Arguments::from_env();

    let help = pargs.contains(["-h", "--help"]);
    let probs = pargs.contains(["-p", "--probs"]);
    let batch_size = pargs.opt_value_from_str(["-b", "--batch-size"])?;

    if help {
        return Ok(Args {
            help,
            model_dir: String::new(),
            embeddings: String::new(),
            input: String::new(),
            batch_size,
            probs,
        });
    }

    let args = Args {
        help,
        model_dir: pargs.free_from_str()?,
        embeddings: pargs.free_from_str()?,
        input: pargs.free_from_str()?,
        batch_size,
        probs,
    };

    Ok(args)
}

/// One line of output per example
#[derive(Serialize)]
struct Prediction<'a> {
    index: usize,
    label: usize,
    predicted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    probs: Option<&'a [f32]>,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = parse_args().map_err(|e| anyhow!("{}\n\n{}", e, HELP))?;

    if args.help {
        println!("{}", HELP);
        return Ok(());
    }

    let embeddings = embeddings::load(&args.embeddings).await?;

    let (inputs, labels) = indexed::Dataset::load(&args.input)
        .with_context(|| format!("Unable to load examples from {}", args.input))?
        .split()?;

    let classifier =
        TextClassifier::<Backend>::load(&args.model_dir, &embeddings, backend::device())?;

    // Get model predictions
    let probs = classifier.predict_prob(&inputs, args.batch_size.unwrap_or(64))?;

    let mut correct = 0;

    for (index, (row, &label)) in probs.iter().zip(labels.iter()).enumerate() {
        let predicted = classes::argmax(row);

        if label == predicted {
            correct += 1;
        }

        let line = Prediction {
            index,
            label,
            predicted,
            probs: args.probs.then_some(row.as_slice()),
        };

        println!("{}", serde_json::to_string(&line)?);
    }

    if !inputs.is_empty() {
        log::info!(
            "Accuracy: {:.4} ({}/{})",
            correct as f64 / inputs.len() as f64,
            correct,
            inputs.len()
        );
    }

    Ok(())
}
