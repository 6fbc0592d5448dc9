//! Symbol list input from a text file.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Read ticker symbols from a file, one per line. Blank lines and `#`
/// comments are skipped; symbols are trimmed and uppercased. Duplicates are
/// kept here — the pipeline skips a symbol only once it has succeeded.
pub fn read_symbols_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read symbol file {:?}", path))?;

    let symbols: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_uppercase)
        .collect();

    debug!("{} symbols from {:?}", symbols.len(), path);
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_trims_and_uppercases() {
        let path = std::env::temp_dir().join(format!("symbols-{}.txt", std::process::id()));
        std::fs::write(&path, "# watchlist\nschb\n  VOO \n\nqqq\n").unwrap();

        let symbols = read_symbols_file(&path).unwrap();
        assert_eq!(symbols, vec!["SCHB", "VOO", "QQQ"]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_symbols_file(Path::new("/nonexistent/symbols.txt")).is_err());
    }
}
