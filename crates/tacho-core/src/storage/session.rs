//! The single append target of a logging session.

use log::{debug, info};

use super::row::{CsvRow, ROW_TERMINATOR};
use super::sequencer::{self, LogFileId, MAX_FILE_NAME};
use super::{StorageError, Volume};
use crate::config::LogConfig;

/// An open logging session: the volume plus the one file this process
/// appends to.
///
/// The file identity is discovered once at [`LogSession::start`] and
/// never changes afterwards. Each append is a scoped
/// open/write/flush/close unit on the volume, so a pulled card or power
/// loss costs at most the row in flight.
pub struct LogSession<'a, V: Volume> {
    volume: V,
    id: LogFileId<'a>,
    file_name: heapless::String<MAX_FILE_NAME>,
    rows_written: u32,
}

impl<'a, V: Volume> LogSession<'a, V> {
    /// Run sequence discovery and open the session.
    ///
    /// When the config carries a header line it is written immediately;
    /// the sequencer guarantees the file is fresh, so the header appears
    /// exactly once per file.
    pub fn start(mut volume: V, log: &LogConfig<'a>) -> Result<Self, StorageError> {
        let id = sequencer::next_log_id(&mut volume, log)?;
        let file_name = id.file_name();
        info!("logging session -> {}/{}", id.directory, file_name);

        let mut session = Self {
            volume,
            id,
            file_name,
            rows_written: 0,
        };
        if let Some(header) = log.header {
            session.append_line(header)?;
        }
        Ok(session)
    }

    /// Append one finished row. Foreground-only; may block on the card.
    pub fn append_row<const CAP: usize>(
        &mut self,
        row: &CsvRow<'_, CAP>,
    ) -> Result<(), StorageError> {
        self.append_line(row.as_str())
    }

    fn append_line(&mut self, line: &str) -> Result<(), StorageError> {
        self.volume.append(
            self.id.directory,
            &self.file_name,
            &[line.as_bytes(), ROW_TERMINATOR.as_bytes()],
        )?;
        self.rows_written += 1;
        debug!("appended row {} to {}", self.rows_written, self.file_name);
        Ok(())
    }

    pub fn id(&self) -> &LogFileId<'a> {
        &self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Rows (including any header line) written so far.
    pub fn rows_written(&self) -> u32 {
        self.rows_written
    }

    pub fn volume_mut(&mut self) -> &mut V {
        &mut self.volume
    }

    /// End the session, handing the volume back to the caller.
    pub fn into_volume(self) -> V {
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Captures appended bytes for a single file.
    struct CaptureVolume {
        written: heapless::Vec<u8, 256>,
        fail_writes: bool,
    }

    impl CaptureVolume {
        fn new() -> Self {
            Self {
                written: heapless::Vec::new(),
                fail_writes: false,
            }
        }
    }

    impl Volume for CaptureVolume {
        fn ensure_dir(&mut self, _dir: &str) -> Result<(), StorageError> {
            Ok(())
        }

        fn list_dir(
            &mut self,
            _dir: &str,
            _visit: &mut dyn FnMut(&str),
        ) -> Result<(), StorageError> {
            Ok(())
        }

        fn append(
            &mut self,
            _dir: &str,
            _name: &str,
            parts: &[&[u8]],
        ) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::write_failure("card removed"));
            }
            for part in parts {
                self.written.extend_from_slice(part).unwrap();
            }
            Ok(())
        }
    }

    #[test]
    fn test_rows_end_with_crlf() {
        let log = LogConfig::default();
        let mut session = LogSession::start(CaptureVolume::new(), &log).unwrap();

        let mut row = CsvRow::<64>::new(log.delimiter);
        row.field(1u32).unwrap();
        row.field(2u32).unwrap();
        session.append_row(&row).unwrap();

        assert_eq!(session.rows_written(), 1);
        assert_eq!(session.volume.written.as_slice(), b"1,2\r\n");
    }

    #[test]
    fn test_header_written_once_at_start() {
        let log = LogConfig {
            header: Some("uptime_s,rpm,speed_kph"),
            ..LogConfig::default()
        };
        let session = LogSession::start(CaptureVolume::new(), &log).unwrap();

        assert_eq!(session.rows_written(), 1);
        assert_eq!(
            session.volume.written.as_slice(),
            b"uptime_s,rpm,speed_kph\r\n"
        );
    }

    #[test]
    fn test_write_failure_reaches_caller() {
        let log = LogConfig::default();
        let mut session = LogSession::start(CaptureVolume::new(), &log).unwrap();
        session.volume.fail_writes = true;

        let mut row = CsvRow::<64>::new(log.delimiter);
        row.field(9u32).unwrap();
        assert!(matches!(
            session.append_row(&row),
            Err(StorageError::WriteFailure(_))
        ));
    }
}
