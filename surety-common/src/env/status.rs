use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SuretyError;

/// Flight status reported by oracles. Discriminants are the on-ledger codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum StatusCode {
    Unknown = 0,
    OnTime = 10,
    LateAirline = 20,
    LateWeather = 30,
    LateTechnical = 40,
    LateOther = 50,
}

impl StatusCode {
    pub const ALL: [StatusCode; 6] = [
        StatusCode::Unknown,
        StatusCode::OnTime,
        StatusCode::LateAirline,
        StatusCode::LateWeather,
        StatusCode::LateTechnical,
        StatusCode::LateOther,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_late(self) -> bool {
        matches!(
            self,
            StatusCode::LateAirline
                | StatusCode::LateWeather
                | StatusCode::LateTechnical
                | StatusCode::LateOther
        )
    }

    /// Only delays caused by the airline trigger insurance payouts.
    pub fn is_payable(self) -> bool {
        self == StatusCode::LateAirline
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        Self::Unknown
    }
}

impl From<StatusCode> for u8 {
    fn from(s: StatusCode) -> Self {
        s as u8
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = SuretyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(StatusCode::Unknown),
            10 => Ok(StatusCode::OnTime),
            20 => Ok(StatusCode::LateAirline),
            30 => Ok(StatusCode::LateWeather),
            40 => Ok(StatusCode::LateTechnical),
            50 => Ok(StatusCode::LateOther),
            other => Err(SuretyError::InvalidStatusCode(other)),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::OnTime => "ON_TIME",
            StatusCode::LateAirline => "LATE_AIRLINE",
            StatusCode::LateWeather => "LATE_WEATHER",
            StatusCode::LateTechnical => "LATE_TECHNICAL",
            StatusCode::LateOther => "LATE_OTHER",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_wire_values() {
        let codes: Vec<u8> = StatusCode::ALL.iter().map(|s| s.code()).collect();
        assert_eq!(codes, vec![0, 10, 20, 30, 40, 50]);
        for status in StatusCode::ALL {
            assert_eq!(StatusCode::try_from(status.code()).unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!(matches!(StatusCode::try_from(25), Err(SuretyError::InvalidStatusCode(25))));
    }

    #[test]
    fn test_only_airline_delay_is_payable() {
        let payable: Vec<_> = StatusCode::ALL.into_iter().filter(|s| s.is_payable()).collect();
        assert_eq!(payable, vec![StatusCode::LateAirline]);
        assert!(!StatusCode::OnTime.is_late());
        assert!(StatusCode::LateWeather.is_late());
    }

    #[test]
    fn test_serde_uses_numeric_code() {
        assert_eq!(serde_json::to_string(&StatusCode::LateAirline).unwrap(), "20");
        let parsed: StatusCode = serde_json::from_str("40").unwrap();
        assert_eq!(parsed, StatusCode::LateTechnical);
        assert!(serde_json::from_str::<StatusCode>("41").is_err());
    }
}
