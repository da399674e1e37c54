use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{ClockDomain, Polarity},
    error::Result,
    unsigned::Width,
};

const fn default_freq() -> usize {
    1_000_000
}

const fn default_en() -> bool {
    true
}

/// Stimulus file for a register run.
///
/// ```json
/// {
///     "width": 8,
///     "reset_polarity": "active_high",
///     "cycles": [{ "data": 171 }, { "rst": true, "data": 255 }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    #[serde(default)]
    pub width: Width,
    /// Width of the data input, the register width if omitted.
    #[serde(default)]
    pub data_width: Option<Width>,
    /// In hertz
    #[serde(default = "default_freq")]
    pub freq: usize,
    #[serde(default)]
    pub reset_polarity: Polarity,
    #[serde(default)]
    pub cycles: Vec<CycleInput>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: Width::default(),
            data_width: None,
            freq: default_freq(),
            reset_polarity: Polarity::default(),
            cycles: Vec::new(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    #[inline]
    pub fn data_width(&self) -> Width {
        self.data_width.unwrap_or(self.width)
    }

    pub fn domain(&self) -> Result<ClockDomain> {
        ClockDomain::new(self.freq, self.reset_polarity)
    }
}

/// Inputs applied before one clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CycleInput {
    /// Raw reset line level. Deasserted when omitted.
    #[serde(default)]
    pub rst: Option<bool>,
    #[serde(default = "default_en")]
    pub en: bool,
    #[serde(default)]
    pub data: u128,
}

impl Default for CycleInput {
    fn default() -> Self {
        Self {
            rst: None,
            en: default_en(),
            data: 0,
        }
    }
}

impl CycleInput {
    pub fn data(data: u128) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    /// Asserts reset regardless of polarity.
    pub fn reset(self, polarity: Polarity) -> Self {
        Self {
            rst: Some(polarity.level(true)),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults() {
        let config = SimConfig::from_json("{}").unwrap();

        assert_eq!(config, SimConfig::default());
        assert_eq!(config.width.get(), 8);
        assert_eq!(config.data_width().get(), 8);
        assert_eq!(config.domain().unwrap().freq(), 1_000_000);
    }

    #[test]
    fn parse() {
        let config = SimConfig::from_json(
            r#"{
                "width": 4,
                "data_width": 6,
                "freq": 4,
                "reset_polarity": "active_low",
                "cycles": [{ "data": 10 }, { "rst": false }, { "en": false, "data": 3 }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.width.get(), 4);
        assert_eq!(config.data_width().get(), 6);
        assert_eq!(config.reset_polarity, Polarity::ActiveLow);
        assert_eq!(config.cycles, [
            CycleInput::data(10),
            CycleInput::default().reset(Polarity::ActiveLow),
            CycleInput {
                en: false,
                ..CycleInput::data(3)
            },
        ]);
    }

    #[test]
    fn invalid() {
        assert!(matches!(
            SimConfig::from_json(r#"{ "width": 0 }"#),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{ "wdth": 8 }"#),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            SimConfig::from_json(r#"{ "freq": 0 }"#).unwrap().domain(),
            Err(Error::InvalidFreq(0))
        ));
        assert!(matches!(
            SimConfig::from_path("/nonexistent/stimulus.json"),
            Err(Error::Io(_))
        ));
    }
}
