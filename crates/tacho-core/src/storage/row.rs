//! CSV row assembly in a fixed buffer.

use core::fmt::{Display, Write};

use super::StorageError;

/// Default capacity of a row buffer, in bytes.
pub const ROW_CAPACITY: usize = 128;

/// Row terminator appended to every line on the card.
pub const ROW_TERMINATOR: &str = "\r\n";

/// One CSV row under construction.
///
/// Fields are rendered through `Display` into a bounded buffer, joined
/// by the configured delimiter. The terminator is added by the session
/// at append time, so the buffer always holds exactly the joined fields.
#[derive(Debug)]
pub struct CsvRow<'a, const CAP: usize = ROW_CAPACITY> {
    buf: heapless::String<CAP>,
    delimiter: &'a str,
    fields: usize,
}

impl<'a, const CAP: usize> CsvRow<'a, CAP> {
    pub const fn new(delimiter: &'a str) -> Self {
        Self {
            buf: heapless::String::new(),
            delimiter,
            fields: 0,
        }
    }

    /// Append one field, preceded by the delimiter when it is not the
    /// first. Fails with [`StorageError::RowTooLarge`] when the rendered
    /// field does not fit; the row is unusable after that and should be
    /// cleared.
    pub fn field<T: Display>(&mut self, value: T) -> Result<&mut Self, StorageError> {
        if self.fields > 0 {
            self.buf
                .push_str(self.delimiter)
                .map_err(|_| StorageError::RowTooLarge)?;
        }
        write!(self.buf, "{value}").map_err(|_| StorageError::RowTooLarge)?;
        self.fields += 1;
        Ok(self)
    }

    /// The joined fields, without the terminator.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.fields == 0
    }

    /// Reset for reuse with the same delimiter.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.fields = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_join_with_delimiter() {
        let mut row = CsvRow::<64>::new(",");
        row.field(12u32).unwrap();
        row.field("idle").unwrap();
        row.field(3.5f32).unwrap();
        assert_eq!(row.as_str(), "12,idle,3.5");
    }

    #[test]
    fn test_legacy_spaced_delimiter() {
        let mut row = CsvRow::<64>::new(" , ");
        row.field(1u8).unwrap();
        row.field(2u8).unwrap();
        assert_eq!(row.as_str(), "1 , 2");
    }

    #[test]
    fn test_clear_resets_row() {
        let mut row = CsvRow::<64>::new(",");
        row.field("a").unwrap();
        row.clear();
        assert!(row.is_empty());
        row.field("b").unwrap();
        assert_eq!(row.as_str(), "b");
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut row = CsvRow::<8>::new(",");
        row.field("1234").unwrap();
        assert_eq!(row.field("overflow").unwrap_err(), StorageError::RowTooLarge);
    }
}
