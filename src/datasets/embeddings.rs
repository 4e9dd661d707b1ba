use std::path::Path;

use crate::{models::text_rnn::Embeddings, utils::files::read_lines};

/// Load an embedding matrix with one whitespace-separated row of floats per vocabulary index
pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Embeddings> {
    let path = path.as_ref();

    let lines = read_lines(path)
        .await
        .map_err(|e| anyhow!("Unable to read embeddings from {}: {}", path.display(), e))?;

    let rows = lines
        .into_iter()
        .map(|(number, line)| {
            line.split_whitespace()
                .map(str::parse::<f32>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| anyhow!("Invalid embedding on line {}: {}", number, e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let embeddings = Embeddings::from_rows(rows)?;

    log::info!(
        "Loaded {} embeddings of width {} from {}",
        embeddings.vocab_size(),
        embeddings.d_embed(),
        path.display()
    );

    Ok(embeddings)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_load_embeddings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 0 0\n0.5 -1 2\n\n1e-1 3 4").unwrap();

        let embeddings = load(file.path()).await.unwrap();

        assert_eq!(embeddings.vocab_size(), 3);
        assert_eq!(embeddings.d_embed(), 3);
        assert_eq!(embeddings.row(2), Some(&[0.1, 3.0, 4.0][..]));
    }

    #[tokio::test]
    async fn test_rejects_ragged_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 0 0\n1 1").unwrap();

        assert!(load(file.path()).await.is_err());
    }
}
