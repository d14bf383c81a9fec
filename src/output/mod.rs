pub mod json;
pub mod xml;

use crate::metrics::RepoMetrics;
use crate::render::TreeLine;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Xml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            _ => Err(format!("Invalid format: {}. Use text, json, or xml", s)),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct TreeOutput<'a> {
    pub project: String,
    pub entries: &'a [TreeLine],
}

#[derive(Serialize, Debug)]
pub struct StatsOutput<'a> {
    pub project: String,
    #[serde(flatten)]
    pub metrics: &'a RepoMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("xml".parse::<OutputFormat>().unwrap(), OutputFormat::Xml);
        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Invalid format"));
    }
}
