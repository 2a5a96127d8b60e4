use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upstream model service the backend should route a turn to.
///
/// Purely a routing hint: it is sent with every request and has no effect on
/// local behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Provider {
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider '{0}' (expected one of: openai, deepseek)")]
pub struct UnknownProvider(pub String);

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::DeepSeek => "deepseek",
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![Provider::OpenAI, Provider::DeepSeek]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::DeepSeek => "DeepSeek",
        }
    }

    /// The provider after this one, wrapping around.
    pub fn next(&self) -> Provider {
        match self {
            Provider::OpenAI => Provider::DeepSeek,
            Provider::DeepSeek => Provider::OpenAI,
        }
    }
}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "deepseek" => Ok(Provider::DeepSeek),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<Provider>(), Ok(Provider::OpenAI));
        assert_eq!(" deepseek ".parse::<Provider>(), Ok(Provider::DeepSeek));
    }

    #[test]
    fn test_parse_unknown() {
        let err = "ollama".parse::<Provider>().unwrap_err();
        assert_eq!(err, UnknownProvider("ollama".to_string()));
    }

    #[test]
    fn test_next_cycles_through_all() {
        let start = Provider::default();
        let mut p = start;
        for _ in 0..Provider::all().len() {
            p = p.next();
        }
        assert_eq!(p, start);
    }

    #[test]
    fn test_wire_name_matches_as_str() {
        for p in Provider::all() {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
        }
    }
}
