//! Reading whitespace-separated numeric text files into flat buffers.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{InferenceError, Result};

/// Read exactly `count` floats from the text file at `path`.
///
/// Values may be separated by any whitespace, newlines included. Tokens after
/// the first `count` are ignored.
///
/// # Errors
///
/// - [`InferenceError::Io`] if the file cannot be read.
/// - [`InferenceError::InvalidNumber`] if one of the first `count` tokens is not
///   a number.
/// - [`InferenceError::TooFewValues`] if the file holds fewer than `count` tokens.
pub fn load_array(path: impl AsRef<Path>, count: usize) -> Result<Vec<f32>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| InferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let values = parse_array(&contents, count).map_err(|err| match err {
        ParseFailure::Invalid { position, token } => InferenceError::InvalidNumber {
            path: path.to_path_buf(),
            position,
            token,
        },
        ParseFailure::Short { found } => InferenceError::TooFewValues {
            path: path.to_path_buf(),
            expected: count,
            found,
        },
    })?;

    info!(path = %path.display(), values = values.len(), "loaded array");
    Ok(values)
}

#[derive(Debug, PartialEq)]
enum ParseFailure {
    Invalid { position: usize, token: String },
    Short { found: usize },
}

fn parse_array(contents: &str, count: usize) -> std::result::Result<Vec<f32>, ParseFailure> {
    let mut values = Vec::with_capacity(count);
    for (position, token) in contents.split_whitespace().take(count).enumerate() {
        let value = token.parse::<f32>().map_err(|_| ParseFailure::Invalid {
            position,
            token: token.to_string(),
        })?;
        values.push(value);
    }

    if values.len() < count {
        return Err(ParseFailure::Short {
            found: values.len(),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_whitespace() {
        let values = parse_array("1 2.5\n-3e-1\t4\n\n", 4).unwrap();
        assert_eq!(values, vec![1.0, 2.5, -0.3, 4.0]);
    }

    #[test]
    fn test_parse_ignores_extra_tokens() {
        let values = parse_array("1 2 3 garbage", 3).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_parse_short() {
        assert_eq!(parse_array("1 2", 3), Err(ParseFailure::Short { found: 2 }));
    }

    #[test]
    fn test_parse_invalid_token() {
        assert_eq!(
            parse_array("1 x 3", 3),
            Err(ParseFailure::Invalid {
                position: 1,
                token: "x".to_string()
            })
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_array("/definitely/not/here.txt", 1).unwrap_err();
        assert!(matches!(err, InferenceError::Io { .. }));
    }
}
