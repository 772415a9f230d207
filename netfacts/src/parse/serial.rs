//! Serial number extraction from version output.

use std::fmt::Debug;
use std::ops::Range;

use super::interfaces::column;

/// Extracts a chassis serial number from version output.
///
/// The output layout is vendor specific; each device family carries its own
/// extractor so callers never depend on a particular text format.
pub trait SerialExtractor: Debug + Send + Sync {
    /// Serial number found in `output`, if any.
    fn extract(&self, output: &str) -> Option<String>;
}

/// Takes a fixed character range from the first line containing a marker.
///
/// The Cisco IOS default reads `Processor board ID FTX1234A5BC`, where the
/// serial sits in characters 19 to 30.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedOffsetSerial {
    pub line_filter: String,
    pub columns: Range<usize>,
}

impl FixedOffsetSerial {
    pub fn new(line_filter: impl Into<String>, columns: Range<usize>) -> Self {
        Self {
            line_filter: line_filter.into(),
            columns,
        }
    }
}

impl Default for FixedOffsetSerial {
    fn default() -> Self {
        Self::new("Processor", 19..30)
    }
}

impl SerialExtractor for FixedOffsetSerial {
    fn extract(&self, output: &str) -> Option<String> {
        let line = output
            .lines()
            .find(|line| line.contains(self.line_filter.as_str()))?;
        let serial = column(line, &self.columns);
        (!serial.is_empty()).then_some(serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cisco_processor_line() {
        let extractor = FixedOffsetSerial::default();
        assert_eq!(
            extractor.extract("Processor board ID FTX1234A5BC").as_deref(),
            Some("FTX1234A5BC")
        );
    }

    #[test]
    fn test_first_matching_line_wins() {
        let output = "\
cisco ISR4331/K9 (1RU) processor with 1795979K/6147K bytes of memory.
Processor board ID FDO21520TGH
Processor board ID ZZZZZZZZZZZ";
        let extractor = FixedOffsetSerial::default();
        assert_eq!(extractor.extract(output).as_deref(), Some("FDO21520TGH"));
    }

    #[test]
    fn test_missing_or_short_line() {
        let extractor = FixedOffsetSerial::default();
        assert_eq!(extractor.extract(""), None);
        assert_eq!(extractor.extract("no match here"), None);
        assert_eq!(extractor.extract("Processor board"), None);
    }

    #[test]
    fn test_other_layout() {
        let extractor = FixedOffsetSerial::new("System serial number", 23..34);
        let output = "System serial number : JAF1234ABCD";
        assert_eq!(extractor.extract(output).as_deref(), Some("JAF1234ABCD"));
    }
}
