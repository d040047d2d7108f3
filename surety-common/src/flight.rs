use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SuretyError;

pub const FLIGHT_CODE_LEN: usize = 32;

/// Flight designator stored as a zero-padded `bytes32`, e.g. `UA3716`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightCode([u8; FLIGHT_CODE_LEN]);

impl FlightCode {
    pub fn new(code: &str) -> Result<Self, SuretyError> {
        if code.is_empty() {
            return Err(SuretyError::InvalidFlightCode("empty flight code".to_string()));
        }
        if !code.is_ascii() || code.as_bytes().contains(&0) {
            return Err(SuretyError::InvalidFlightCode(format!("{code:?} is not printable ASCII")));
        }
        if code.len() > FLIGHT_CODE_LEN {
            return Err(SuretyError::InvalidFlightCode(format!(
                "{code} is longer than {FLIGHT_CODE_LEN} bytes"
            )));
        }

        let mut bytes = [0u8; FLIGHT_CODE_LEN];
        bytes[..code.len()].copy_from_slice(code.as_bytes());
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; FLIGHT_CODE_LEN] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(FLIGHT_CODE_LEN);
        // Construction only admits ASCII.
        std::str::from_utf8(&self.0[..end]).unwrap_or_default()
    }
}

impl fmt::Display for FlightCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for FlightCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlightCode({})", self.as_str())
    }
}

impl FromStr for FlightCode {
    type Err = SuretyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for FlightCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FlightCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FlightCode::new(&raw).map_err(serde::de::Error::custom)
    }
}
