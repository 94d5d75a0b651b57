use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::units::{normalize, Measurement};

/// Persisted column names, in sample field order
pub const COLUMNS: [&str; 12] = [
    "timepoint",
    "CONTAINER_ID",
    "NAME",
    "CPU_%",
    "MEM_USAGE",
    "MEM_LIMIT",
    "MEM_%",
    "NET_I",
    "NET_O",
    "BLOCK_I",
    "BLOCK_O",
    "PIDS",
];

/// Data tokens in a `docker stats` table row once `/` separators are gone
const TOKENS_WITH_NAME: usize = 11;
/// Same row without the NAME column
const TOKENS_WITHOUT_NAME: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("stats output has no data line")]
    MissingDataLine,

    #[error("expected 11 (or 10) stats columns, found {0}")]
    ColumnCount(usize),

    #[error("column {column} is not numeric: {token:?}")]
    NotNumeric { column: &'static str, token: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// One normalized observation of a container. Byte-like fields are megabytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timepoint: DateTime<Local>,
    #[serde(rename = "CONTAINER_ID")]
    pub container_id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "CPU_%")]
    pub cpu_percent: f64,
    #[serde(rename = "MEM_USAGE")]
    pub mem_usage: f64,
    #[serde(rename = "MEM_LIMIT")]
    pub mem_limit: f64,
    #[serde(rename = "MEM_%")]
    pub mem_percent: f64,
    #[serde(rename = "NET_I")]
    pub net_in: f64,
    #[serde(rename = "NET_O")]
    pub net_out: f64,
    #[serde(rename = "BLOCK_I")]
    pub block_in: f64,
    #[serde(rename = "BLOCK_O")]
    pub block_out: f64,
    #[serde(rename = "PIDS")]
    pub pids: u64,
}

impl Sample {
    /// Parse the full `docker stats --no-stream` output (header + one data line)
    pub fn parse_output(output: &str, timepoint: DateTime<Local>) -> ParseResult<Self> {
        let line = output
            .lines()
            .nth(1)
            .filter(|line| !line.trim().is_empty())
            .ok_or(ParseError::MissingDataLine)?;

        Self::parse_line(line, timepoint)
    }

    /// Parse one stats table row taken at `timepoint`
    pub fn parse_line(line: &str, timepoint: DateTime<Local>) -> ParseResult<Self> {
        let tokens: Vec<String> = line
            .split_whitespace()
            .filter(|token| *token != "/")
            .map(|token| token.replace('%', ""))
            .collect();

        let (container_id, name, measures) = match tokens.len() {
            TOKENS_WITH_NAME => (tokens[0].clone(), tokens[1].clone(), &tokens[2..]),
            TOKENS_WITHOUT_NAME => (tokens[0].clone(), tokens[0].clone(), &tokens[1..]),
            n => return Err(ParseError::ColumnCount(n)),
        };

        let values: Vec<Measurement> = measures.iter().map(|token| normalize(token)).collect();
        let number = |index: usize| -> ParseResult<f64> {
            values[index].as_f64().ok_or_else(|| ParseError::NotNumeric {
                column: COLUMNS[index + 3],
                token: measures[index].clone(),
            })
        };

        Ok(Self {
            timepoint,
            container_id,
            name,
            cpu_percent: number(0)?,
            mem_usage: number(1)?,
            mem_limit: number(2)?,
            mem_percent: number(3)?,
            net_in: number(4)?,
            net_out: number(5)?,
            block_in: number(6)?,
            block_out: number(7)?,
            pids: measures[8].parse::<u64>().map_err(|_| ParseError::NotNumeric {
                column: COLUMNS[11],
                token: measures[8].clone(),
            })?,
        })
    }

    /// The sample as a bracketed sequence in column order
    pub fn to_sequence(&self) -> String {
        serde_json::json!([
            self.timepoint.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            self.container_id,
            self.name,
            self.cpu_percent,
            self.mem_usage,
            self.mem_limit,
            self.mem_percent,
            self.net_in,
            self.net_out,
            self.block_in,
            self.block_out,
            self.pids,
        ])
        .to_string()
    }

    /// Values of the fields drawn on the summary chart, in panel order
    pub fn chart_values(&self) -> [f64; 7] {
        [
            self.cpu_percent,
            self.mem_usage,
            self.net_in,
            self.net_out,
            self.block_in,
            self.block_out,
            self.pids as f64,
        ]
    }
}
