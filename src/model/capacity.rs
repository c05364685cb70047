use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A calendar quarter, identified by year and quarter index (1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuarterKey {
    pub year: i32,
    pub quarter: u8,
}

impl QuarterKey {
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self { year, quarter })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month0() / 3 + 1) as u8,
        }
    }

    pub fn start_date(self) -> NaiveDate {
        let month = (self.quarter as u32 - 1) * 3 + 1;
        NaiveDate::from_ymd_opt(self.year, month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(self) -> Self {
        if self.quarter >= 4 {
            Self { year: self.year + 1, quarter: 1 }
        } else {
            Self { year: self.year, quarter: self.quarter + 1 }
        }
    }

    /// Display label such as `Q1/26`.
    pub fn label(self) -> String {
        format!("Q{}/{:02}", self.quarter, self.year.rem_euclid(100))
    }

    /// Strict inverse of [`QuarterKey::label`]: exactly `Q[1-4]/yy`.
    pub fn parse_label(label: &str) -> Option<Self> {
        let rest = label.strip_prefix('Q')?;
        let (quarter, year) = rest.split_once('/')?;
        if quarter.len() != 1 || year.len() != 2 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let quarter: u8 = quarter.parse().ok()?;
        let year: i32 = year.parse().ok()?;
        Self::new(2000 + year, quarter)
    }
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// The quarter a stored capacity entry refers to.
///
/// Labels that do not follow the `Qn/yy` format are kept so they round-trip,
/// but they never match a quarter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuarterSlot {
    Known(QuarterKey),
    Unrecognized(String),
}

impl QuarterSlot {
    pub fn key(&self) -> Option<QuarterKey> {
        match self {
            QuarterSlot::Known(key) => Some(*key),
            QuarterSlot::Unrecognized(_) => None,
        }
    }
}

impl Serialize for QuarterSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QuarterSlot::Known(key) => serializer.serialize_str(&key.label()),
            QuarterSlot::Unrecognized(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for QuarterSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match QuarterKey::parse_label(&raw) {
            Some(key) => QuarterSlot::Known(key),
            None => QuarterSlot::Unrecognized(raw),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityEntry {
    pub quarter: QuarterSlot,
    pub percentage: u8,
}

/// Team-wide capacity utilisation per quarter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityUtilization {
    pub enabled: bool,
    pub quarters: Vec<CapacityEntry>,
}

impl CapacityUtilization {
    /// Utilisation for `key`, 0 when nothing is recorded. Capped at 100.
    pub fn percentage_for(&self, key: QuarterKey) -> u8 {
        self.quarters
            .iter()
            .find(|entry| entry.quarter.key() == Some(key))
            .map(|entry| entry.percentage.min(100))
            .unwrap_or(0)
    }

    pub fn set_percentage(&mut self, key: QuarterKey, percentage: u8) {
        let percentage = percentage.min(100);
        match self
            .quarters
            .iter_mut()
            .find(|entry| entry.quarter.key() == Some(key))
        {
            Some(entry) => entry.percentage = percentage,
            None => self.quarters.push(CapacityEntry {
                quarter: QuarterSlot::Known(key),
                percentage,
            }),
        }
    }
}
