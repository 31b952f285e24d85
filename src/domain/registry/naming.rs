//! Artifact file naming convention
//!
//! Artifacts are named `{symbol}-{model_type}-{YYYYMMDD}[-HHMMSS].{ext}` with `-`
//! or `_` separators, matched case-insensitively. The file stem doubles as the
//! model id.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::{normalize_symbol, ModelId};

/// File extensions recognised as model artifacts
const ARTIFACT_EXTENSIONS: &[&str] = &["bin", "json"];

static ARTIFACT_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<symbol>[a-z0-9]+)[-_](?P<model_type>[a-z0-9]+)[-_](?P<date>\d{8})(?:[-_t](?P<time>\d{6}|\d{4}))?\.(?P<ext>bin|json)$",
    )
    .unwrap()
});

/// Parts extracted from a conforming artifact file name
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactName {
    pub model_id: ModelId,
    pub symbol: String,
    pub model_type: String,
    pub created_at: Option<DateTime<Utc>>,
    pub extension: String,
}

impl ArtifactName {
    /// Parses a path's file name, returning `None` when it does not follow the convention
    pub fn parse(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let captures = ARTIFACT_NAME_PATTERN.captures(file_name)?;

        let stem = path.file_stem()?.to_str()?;
        let model_id = ModelId::new(stem).ok()?;
        let symbol = normalize_symbol(&captures["symbol"]).ok()?;

        let created_at = parse_timestamp(
            &captures["date"],
            captures.name("time").map(|m| m.as_str()),
        );

        Some(Self {
            model_id,
            symbol,
            model_type: captures["model_type"].to_ascii_lowercase(),
            created_at,
            extension: captures["ext"].to_ascii_lowercase(),
        })
    }
}

fn parse_timestamp(date: &str, time: Option<&str>) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;

    let time = match time {
        Some(t) if t.len() == 6 => NaiveTime::parse_from_str(t, "%H%M%S").ok()?,
        Some(t) => NaiveTime::parse_from_str(t, "%H%M").ok()?,
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
    };

    Some(date.and_time(time).and_utc())
}

/// Whether a path carries one of the recognised artifact extensions
pub fn has_artifact_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            ARTIFACT_EXTENSIONS
                .iter()
                .any(|known| e.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_basic_name() {
        let name = ArtifactName::parse(&PathBuf::from("/models/btc-lstm-20240101.bin")).unwrap();

        assert_eq!(name.model_id.as_str(), "btc-lstm-20240101");
        assert_eq!(name.symbol, "BTC");
        assert_eq!(name.model_type, "lstm");
        assert_eq!(name.extension, "bin");
        assert_eq!(
            name.created_at.unwrap().to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let name = ArtifactName::parse(&PathBuf::from("ETH_GRU_20240102_153000.JSON")).unwrap();

        assert_eq!(name.symbol, "ETH");
        assert_eq!(name.model_type, "gru");
        assert_eq!(name.extension, "json");
        assert_eq!(name.model_id.as_str(), "ETH_GRU_20240102_153000");
        assert_eq!(
            name.created_at.unwrap().to_rfc3339(),
            "2024-01-02T15:30:00+00:00"
        );
    }

    #[test]
    fn test_parse_short_time() {
        let name = ArtifactName::parse(&PathBuf::from("sol-lstm-20240301T0915.bin")).unwrap();
        assert_eq!(
            name.created_at.unwrap().to_rfc3339(),
            "2024-03-01T09:15:00+00:00"
        );
    }

    #[test]
    fn test_parse_rejects_non_conforming_names() {
        assert!(ArtifactName::parse(&PathBuf::from("notes.txt")).is_none());
        assert!(ArtifactName::parse(&PathBuf::from("btc-lstm.bin")).is_none());
        assert!(ArtifactName::parse(&PathBuf::from("btc-lstm-2024.bin")).is_none());
        assert!(ArtifactName::parse(&PathBuf::from("btc-lstm-20240101.pkl")).is_none());
    }

    #[test]
    fn test_invalid_calendar_date_has_no_timestamp() {
        let name = ArtifactName::parse(&PathBuf::from("btc-lstm-20241399.bin")).unwrap();
        assert!(name.created_at.is_none());
    }

    #[test]
    fn test_has_artifact_extension() {
        assert!(has_artifact_extension(&PathBuf::from("a.bin")));
        assert!(has_artifact_extension(&PathBuf::from("a.JSON")));
        assert!(!has_artifact_extension(&PathBuf::from("a.tmp")));
        assert!(!has_artifact_extension(&PathBuf::from("noext")));
    }
}
