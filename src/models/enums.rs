use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the restaurant catalog is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceStrategy {
    /// Read-only JSON file
    Json,
    /// Writable in-process store
    #[default]
    #[serde(alias = "h2")]
    Memory,
    /// Memory store first, then the JSON file
    Both,
}

impl DataSourceStrategy {
    pub fn uses_json(&self) -> bool {
        matches!(self, DataSourceStrategy::Json | DataSourceStrategy::Both)
    }

    pub fn uses_memory(&self) -> bool {
        matches!(self, DataSourceStrategy::Memory | DataSourceStrategy::Both)
    }
}

impl fmt::Display for DataSourceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceStrategy::Json => write!(f, "json"),
            DataSourceStrategy::Memory => write!(f, "memory"),
            DataSourceStrategy::Both => write!(f, "both"),
        }
    }
}

impl FromStr for DataSourceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(DataSourceStrategy::Json),
            "memory" | "h2" => Ok(DataSourceStrategy::Memory),
            "both" => Ok(DataSourceStrategy::Both),
            _ => Err(format!("Invalid data source strategy: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_display_and_parse() {
        for strategy in [
            DataSourceStrategy::Json,
            DataSourceStrategy::Memory,
            DataSourceStrategy::Both,
        ] {
            let parsed: DataSourceStrategy = strategy.to_string().parse().unwrap();
            assert_eq!(parsed, strategy);
        }

        assert_eq!("BOTH".parse::<DataSourceStrategy>(), Ok(DataSourceStrategy::Both));
        assert_eq!("h2".parse::<DataSourceStrategy>(), Ok(DataSourceStrategy::Memory));
        assert!("postgres".parse::<DataSourceStrategy>().is_err());
    }

    #[test]
    fn test_strategy_sources() {
        assert!(DataSourceStrategy::Json.uses_json());
        assert!(!DataSourceStrategy::Json.uses_memory());
        assert!(DataSourceStrategy::Memory.uses_memory());
        assert!(DataSourceStrategy::Both.uses_json() && DataSourceStrategy::Both.uses_memory());
        assert_eq!(DataSourceStrategy::default(), DataSourceStrategy::Memory);
    }

    #[test]
    fn test_strategy_serde() {
        assert_eq!(
            serde_json::to_string(&DataSourceStrategy::Both).unwrap(),
            "\"both\""
        );
        let parsed: DataSourceStrategy = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(parsed, DataSourceStrategy::Json);
    }
}
