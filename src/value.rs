use chrono::{Datelike, NaiveDate};

/// A strongly-typed logical value for writable register fields.
///
/// Enumerated lookups write their numeric key and therefore arrive here as
/// `Integer`; calendar fields carry a full date but only the month and day
/// components reach the device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogicalValue {
    Integer(i64),
    Date(NaiveDate),
}

impl LogicalValue {
    /// Month/day components of a calendar value, `None` for integers.
    #[inline]
    pub fn date_components(&self) -> Option<(u16, u16)> {
        match self {
            LogicalValue::Date(d) => Some((d.month() as u16, d.day() as u16)),
            LogicalValue::Integer(_) => None,
        }
    }

    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            LogicalValue::Integer(v) => Some(*v),
            LogicalValue::Date(_) => None,
        }
    }

    /// Human-readable type name used in validation errors.
    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            LogicalValue::Integer(_) => "integer",
            LogicalValue::Date(_) => "date",
        }
    }
}

impl From<i64> for LogicalValue {
    fn from(v: i64) -> Self {
        LogicalValue::Integer(v)
    }
}

impl From<NaiveDate> for LogicalValue {
    fn from(d: NaiveDate) -> Self {
        LogicalValue::Date(d)
    }
}
