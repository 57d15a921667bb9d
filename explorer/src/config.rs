//! Runtime configuration for the explorer CLI.
//!
//! Every value has a compile-time default and can be overridden through an
//! environment variable. Command-line flags take precedence over both.

use opening_index::DEFAULT_CHUNK_SIZE;
use std::path::PathBuf;

/// Default artifact directory, relative to the working directory.
const DEFAULT_DATA_DIR: &str = "./data";

/// Default number of results per page for CLI queries.
const DEFAULT_PAGE_SIZE: usize = opening_index::query::DEFAULT_PAGE_SIZE;

/// Get the directory holding built index artifacts.
///
/// Priority:
/// 1. `EXPLORER_DATA_DIR` env variable if set
/// 2. `./data` as fallback
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("EXPLORER_DATA_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from(DEFAULT_DATA_DIR)
}

/// Get the chunk size used by `build`.
///
/// Falls back to the default when `EXPLORER_CHUNK_SIZE` is unset, unparsable
/// or zero.
pub fn get_chunk_size() -> u64 {
    std::env::var("EXPLORER_CHUNK_SIZE")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&size| size > 0)
        .unwrap_or(DEFAULT_CHUNK_SIZE)
}

/// Get the default page size for paginated queries.
pub fn get_page_size() -> usize {
    std::env::var("EXPLORER_PAGE_SIZE")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&size| size > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Directory for daily rolling log files. When unset, logs go to stderr.
pub fn get_log_dir() -> Option<PathBuf> {
    std::env::var("EXPLORER_LOG_DIR").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_dir() {
        let dir = get_data_dir();
        match std::env::var("EXPLORER_DATA_DIR") {
            Ok(val) => assert_eq!(dir, PathBuf::from(val)),
            Err(_) => assert_eq!(dir, PathBuf::from(DEFAULT_DATA_DIR)),
        }
    }

    #[test]
    fn test_get_chunk_size_default() {
        if std::env::var("EXPLORER_CHUNK_SIZE").is_err() {
            assert_eq!(get_chunk_size(), 4000);
        }
        assert!(get_chunk_size() > 0);
    }

    #[test]
    fn test_get_page_size_default() {
        if std::env::var("EXPLORER_PAGE_SIZE").is_err() {
            assert_eq!(get_page_size(), 50);
        }
        assert!(get_page_size() > 0);
    }
}
