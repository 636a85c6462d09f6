//! Loading the list of page links to check.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Header naming the link column in CSV input.
pub const URL_COLUMN: &str = "URL";

/// Errors that can occur while loading links.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{} has no URL column", path.display())]
    MissingUrlColumn { path: PathBuf },
}

/// Load links from `path`.
///
/// `.csv` files are read by header and must have a `URL` column (any case).
/// Other files hold one link per line; blank lines and `#` comments are
/// skipped.
pub fn load_links(path: &Path) -> Result<Vec<String>, InputError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        return load_csv_links(path);
    }

    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_link_lines(&text))
}

/// Parse one link per line.
pub fn parse_link_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn load_csv_links(path: &Path) -> Result<Vec<String>, InputError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let column = reader
        .headers()?
        .iter()
        .position(|header| header.eq_ignore_ascii_case(URL_COLUMN))
        .ok_or_else(|| InputError::MissingUrlColumn {
            path: path.to_path_buf(),
        })?;

    let mut links = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(link) = record.get(column).filter(|link| !link.is_empty()) {
            links.push(link.to_string());
        }
    }
    Ok(links)
}
