//! Command line tool to train a text classifier

use anyhow::{anyhow, Context};
use burn::data::dataset::Dataset as _;
use pico_args::Arguments;
use text_rnn::{
    backend::{self, Backend},
    datasets::{embeddings, indexed},
    models::text_rnn::Config,
    pipelines::text_classification::{FitConfig, TextClassifier},
};

const HELP: &str = "\
Usage: train TRAIN_CSV EMBEDDINGS [OPTIONS]

Arguments:
  TRAIN_CSV            Training examples with a 'label,tokens' header
  EMBEDDINGS           Embedding matrix, one whitespace-separated row per token id

Options:
  -h, --help           Print help
  -v, --valid          Validation examples with a 'label,tokens' header
  -n, --num-epochs     Number of epochs to train for (defaults to 1)
  -b, --batch-size     Batch size (defaults to 64)
  -l, --max-len        Maximum sequence length (defaults to 50)
  -c, --classes        Number of classes (defaults to the largest label + 1)
  -u, --hidden-units   LSTM hidden units per direction (defaults to 128)
  -r, --learning-rate  Learning rate (defaults to 0.001)
  -o, --output         Checkpoint directory (defaults to 'tmp/text_rnn')
  --save               Save the model whenever validation accuracy improves (requires --valid)
";

#[derive(Debug)]
struct Args {
    train: String,
    embeddings: String,
    valid: Option<String>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
    max_len: Option<usize>,
    classes: Option<usize>,
    hidden_units: Option<usize>,
    learning_rate: Option<f64>,
    output: Option<String>,
    save: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        Self::parse_from(Arguments::from_env())
    }

    fn parse_from(mut pargs: Arguments) -> anyhow::Result<Option<Self>> {

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            valid: pargs.opt_value_from_str(["-v", "--valid"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            max_len: pargs.opt_value_from_str(["-l", "--max-len"])?,
            classes: pargs.opt_value_from_str(["-c", "--classes"])?,
            hidden_units: pargs.opt_value_from_str(["-u", "--hidden-units"])?,
            learning_rate: pargs.opt_value_from_str(["-r", "--learning-rate"])?,
            output: pargs.opt_value_from_str(["-o", "--output"])?,
            save: pargs.contains("--save"),
            train: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: TRAIN_CSV"),
                _ => anyhow!("{}", e),
            })?,
            embeddings: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => {
                    anyhow!("Missing required argument: EMBEDDINGS")
                }
                _ => anyhow!("{}", e),
            })?,
        };

        // Checkpoints are only written when validation accuracy improves
        if args.save && args.valid.is_none() {
            return Err(anyhow!("--save requires --valid\n\n{}", HELP));
        }

        Ok(Some(args))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let embeddings = embeddings::load(&args.embeddings).await?;

    let train = indexed::Dataset::load(&args.train)
        .with_context(|| format!("Unable to load training data from {}", args.train))?;
    let (inputs, labels) = train.split()?;

    log::info!("Loaded {} training examples", train.len());

    let valid = match &args.valid {
        Some(path) => Some(
            indexed::Dataset::load(path)
                .with_context(|| format!("Unable to load validation data from {}", path))?
                .split()?,
        ),
        None => None,
    };

    let n_classes = match args.classes {
        Some(classes) => classes,
        None => labels.iter().max().map(|label| label + 1).unwrap_or(2),
    };

    let mut config = Config::new(args.max_len.unwrap_or(50)).with_n_classes(n_classes);

    if let Some(hidden_units) = args.hidden_units {
        config.rnn_hidden_units = hidden_units;
    }

    if let Some(learning_rate) = args.learning_rate {
        config.learning_rate = learning_rate;
    }

    if let Some(output) = &args.output {
        config.model_path = output.to_string();
    }

    let mut fit_config = FitConfig::new().with_save_model(args.save);

    if let Some(num_epochs) = args.num_epochs {
        fit_config.num_epochs = num_epochs;
    }

    if let Some(batch_size) = args.batch_size {
        fit_config.batch_size = batch_size;
    }

    let model_path = config.model_path.clone();
    let mut classifier = TextClassifier::<Backend>::new(config, &embeddings, backend::device())?;

    let validation = valid
        .as_ref()
        .map(|(inputs, labels)| (inputs.as_slice(), labels.as_slice()));

    let history = classifier.fit(&inputs, &labels, validation, &fit_config)?;

    // Without checkpointing on improvement, keep the final weights
    if !fit_config.save_model {
        classifier.save(&model_path)?;
    }

    if let Some(best) = history
        .iter()
        .filter_map(|metrics| metrics.valid_accuracy.map(|accuracy| (metrics.epoch, accuracy)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
    {
        println!("Best validation accuracy {:.4} at epoch {}", best.1, best.0);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    fn arguments(args: &[&str]) -> Arguments {
        Arguments::from_vec(args.iter().map(OsString::from).collect())
    }

    #[test]
    fn test_save_requires_validation_data() {
        let result = Args::parse_from(arguments(&["--save", "train.csv", "vectors.txt"]));

        assert!(result.is_err());
    }

    #[test]
    fn test_save_with_validation_data() {
        let args = Args::parse_from(arguments(&[
            "--save",
            "-v",
            "valid.csv",
            "train.csv",
            "vectors.txt",
        ]))
        .unwrap()
        .unwrap();

        assert!(args.save);
        assert_eq!(args.valid.as_deref(), Some("valid.csv"));
        assert_eq!(args.train, "train.csv");
    }
}
