//! Parsing of the run naming convention.
//!
//! An archive's base filename encodes the run parameters as exactly four
//! tokens, `<model>-<scenario>-<year>-<floodzoneToken>` (older archives used
//! `_` as the delimiter). The parser keeps the raw tokens so a parsed
//! identifier can reproduce the original filename.

use serde::{Deserialize, Serialize};

use crate::error::{IntakeError, IntakeResult};

/// Floodzone token that marks a run as constrained to the floodzone.
pub const WITH_FLOODZONE_TOKEN: &str = "withfz";

/// Delimiter convention used by the archive filename.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingConvention {
    /// Current convention, `-` separated.
    Dashed,
    /// Legacy convention, `_` separated.
    Legacy,
}

impl NamingConvention {
    pub fn delimiter(&self) -> char {
        match self {
            NamingConvention::Dashed => '-',
            NamingConvention::Legacy => '_',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloodzoneStatus {
    WithFloodzone,
    WithoutFloodzone,
}

impl FloodzoneStatus {
    pub fn from_token(token: &str) -> Self {
        if token == WITH_FLOODZONE_TOKEN {
            FloodzoneStatus::WithFloodzone
        } else {
            FloodzoneStatus::WithoutFloodzone
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, FloodzoneStatus::WithFloodzone)
    }
}

/// The four-field scenario key encoded in an archive's filename.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentifier {
    pub model: String,
    pub scenario: String,
    pub year: i32,
    /// Year exactly as it appeared in the filename. `year` is parsed from
    /// it, but re-joining must not normalise the original token.
    pub year_token: String,
    pub floodzone_token: String,
    pub convention: NamingConvention,
}

impl RunIdentifier {
    /// Parse a base filename (extension already stripped), detecting the
    /// delimiter convention from the name itself.
    pub fn parse(base_name: &str) -> IntakeResult<Self> {
        let convention = if base_name.contains('-') {
            NamingConvention::Dashed
        } else {
            NamingConvention::Legacy
        };
        Self::parse_with(base_name, convention)
    }

    pub fn parse_with(base_name: &str, convention: NamingConvention) -> IntakeResult<Self> {
        let tokens: Vec<&str> = base_name.split(convention.delimiter()).collect();
        if tokens.len() != 4 {
            return Err(IntakeError::MalformedRunIdentifier {
                name: base_name.to_string(),
                reason: format!("found {} tokens, expected 4", tokens.len()),
            });
        }
        let year = tokens[2]
            .parse::<i32>()
            .map_err(|_| IntakeError::MalformedRunIdentifier {
                name: base_name.to_string(),
                reason: format!("year token {:?} is not an integer", tokens[2]),
            })?;
        Ok(RunIdentifier {
            model: tokens[0].to_string(),
            scenario: tokens[1].to_string(),
            year,
            year_token: tokens[2].to_string(),
            floodzone_token: tokens[3].to_string(),
            convention,
        })
    }

    pub fn floodzone(&self) -> FloodzoneStatus {
        FloodzoneStatus::from_token(&self.floodzone_token)
    }

    /// Re-join the four raw tokens with the parsed convention's delimiter,
    /// reproducing the original base filename exactly.
    pub fn base_name(&self) -> String {
        let d = self.convention.delimiter();
        format!(
            "{}{d}{}{d}{}{d}{}",
            self.model, self.scenario, self.year_token, self.floodzone_token
        )
    }

    /// Scenario tag embedded in output filenames and the catalog title,
    /// e.g. `SSP2_2050_withfz`.
    pub fn run_tag(&self) -> String {
        format!(
            "{}_{}_{}",
            self.scenario, self.year_token, self.floodzone_token
        )
    }
}
