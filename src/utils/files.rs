use std::path::Path;

use tokio::{
    fs::File,
    io::{self, AsyncBufReadExt, BufReader},
};

/// Read the non-blank lines of a file, paired with their 1-based line numbers
pub async fn read_lines<P: AsRef<Path>>(path: P) -> io::Result<Vec<(usize, String)>> {
    let file = File::open(path).await?;
    let mut reader = BufReader::new(file).lines();

    let mut lines = Vec::new();
    let mut number = 0;

    while let Some(line) = reader.next_line().await? {
        number += 1;

        if !line.trim().is_empty() {
            lines.push((number, line));
        }
    }

    Ok(lines)
}
