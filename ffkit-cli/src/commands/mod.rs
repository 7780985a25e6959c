//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

use ffkit_core::{CoreResult, SeekTime};

/// `convert`: transcodes one file, optionally deinterlacing it first.
pub mod convert;

/// `interlace`: runs idet and prints the verdict.
pub mod interlace;

/// `probe`: prints ffprobe information for one or more files.
pub mod probe;

/// `thumbnail`: extracts one frame.
pub mod thumbnail;

/// Parses a position given either as plain seconds (`12.5`) or as
/// `H:MM:SS[.mmm]`.
pub fn parse_seek_time(text: &str) -> CoreResult<SeekTime> {
    match text.trim().parse::<f64>() {
        Ok(seconds) => SeekTime::from_seconds(seconds),
        Err(_) => SeekTime::parse(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seek_time() {
        assert_eq!(parse_seek_time("12.5").unwrap(), SeekTime::from_millis(12_500));
        assert_eq!(parse_seek_time("0:01:00").unwrap(), SeekTime::from_millis(60_000));
        assert!(parse_seek_time("-3").is_err());
        assert!(parse_seek_time("soon").is_err());
    }
}
