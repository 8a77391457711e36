use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// The fixed settlement currency. Every trade moves the asset leg against it.
pub const QUOTE_TICKER: &str = "RUB";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Instrument {
    pub ticker: String,
    pub name: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InstrumentBody {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(custom = "validate_ticker")]
    pub ticker: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InstrumentView {
    pub name: String,
    pub ticker: String,
}

impl From<Instrument> for InstrumentView {
    fn from(instrument: Instrument) -> Self {
        Self {
            name: instrument.name,
            ticker: instrument.ticker,
        }
    }
}

/// Tickers are 2-10 uppercase ASCII letters.
pub fn validate_ticker(ticker: &str) -> Result<(), ValidationError> {
    let len_ok = (2..=10).contains(&ticker.len());
    if len_ok && ticker.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("ticker"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_tickers() {
        for ticker in ["RUB", "USD", "AAA", "GAZPROM", "ABCDEFGHIJ"] {
            assert!(validate_ticker(ticker).is_ok(), "{ticker} should be valid");
        }
    }

    #[test]
    fn rejects_invalid_tickers() {
        for ticker in ["", "A", "abc", "AAPL1", "TOOLONGTICKER", "AA A", "ЮКОС"] {
            assert!(validate_ticker(ticker).is_err(), "{ticker} should be invalid");
        }
    }

    #[test]
    fn instrument_body_validates_ticker() {
        let body = InstrumentBody {
            name: "Gazprom".to_string(),
            ticker: "gaz".to_string(),
        };
        assert!(body.validate().is_err());
    }
}
