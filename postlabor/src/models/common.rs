use serde::{Deserialize, Serialize};

/// Orchestration variant.
///
/// `Standard` researches evergreen topics and asks the model for an insight.
/// `News` polls news queries, skips result sets made of already-known
/// sources and asks the model whether anything is breaking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResearchMode {
    #[default]
    Standard,
    News,
}

impl std::fmt::Display for ResearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::News => write!(f, "news"),
        }
    }
}

impl std::str::FromStr for ResearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "news" => Ok(Self::News),
            _ => Err(format!("Unknown research mode: {s}")),
        }
    }
}

/// Terminal classification of a single topic run.
///
/// `NoResults`, `NotFresh` and `NotSignificant` are expected outcomes, not
/// failures. Only `Error` reports something going wrong.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResearchStatus {
    Cached,
    NoResults,
    NotFresh,
    NotSignificant,
    Success,
    Error,
}

impl ResearchStatus {
    /// True for outcomes that wrote a new record.
    pub fn persisted(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for ResearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cached => write!(f, "cached"),
            Self::NoResults => write!(f, "no_results"),
            Self::NotFresh => write!(f, "not_fresh"),
            Self::NotSignificant => write!(f, "not_significant"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}
