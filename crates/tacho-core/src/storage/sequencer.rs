//! Startup discovery of the next unused log file number.

use core::fmt::Write;

use log::{debug, info};

use super::{StorageError, Volume};
use crate::config::LogConfig;

/// Width of the zero-padded sequence field.
const SEQ_DIGITS: usize = 4;
/// Largest sequence number the 4-digit field can carry.
pub const SEQ_MAX: u16 = 9999;
/// `_` + four digits + `.` + three-character extension.
const SUFFIX_LEN: usize = SEQ_DIGITS + 5;
/// Capacity of a rendered file name. FAT 8.3 names fit with room to
/// spare for longer host-side base names.
pub const MAX_FILE_NAME: usize = 32;

/// Identity of one log file: `<directory>/<base>_<nnnn>.<ext>`.
///
/// Chosen once at session start and fixed for the session's lifetime;
/// numbers already present on the volume are never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFileId<'a> {
    pub directory: &'a str,
    pub base_name: &'a str,
    pub extension: &'a str,
    pub sequence: u16,
}

impl LogFileId<'_> {
    /// Render the file name, zero-padding the sequence to four digits.
    pub fn file_name(&self) -> heapless::String<MAX_FILE_NAME> {
        let mut name = heapless::String::new();
        // Capacity was validated against the base name at discovery time.
        let _ = write!(
            name,
            "{}_{:04}.{}",
            self.base_name, self.sequence, self.extension
        );
        name
    }
}

/// Scan the log directory and pick the next unused sequence number.
///
/// Creates the directory when missing (an empty directory yields
/// sequence 0). A matching entry has length `len(base) + 9`, the base
/// name as prefix, `_` and `.` at their fixed offsets and four ASCII
/// digits in between; everything else in the directory is ignored. The
/// next number is strictly greater than every number seen, so an
/// existing file is never reopened or overwritten.
pub fn next_log_id<'a, V: Volume>(
    volume: &mut V,
    log: &LogConfig<'a>,
) -> Result<LogFileId<'a>, StorageError> {
    if log.base_name.is_empty() {
        return Err(StorageError::InvalidConfig("base name must not be empty"));
    }
    if log.extension.len() != 3 {
        return Err(StorageError::InvalidConfig(
            "extension must be exactly 3 characters",
        ));
    }
    if log.base_name.len() + SUFFIX_LEN > MAX_FILE_NAME {
        return Err(StorageError::InvalidConfig("base name too long"));
    }

    volume.ensure_dir(log.directory)?;

    let mut max_seen: Option<u16> = None;
    volume.list_dir(log.directory, &mut |name| {
        if let Some(seq) = parse_sequence(name, log.base_name) {
            debug!("existing log file {name} (sequence {seq})");
            max_seen = Some(max_seen.map_or(seq, |seen| seen.max(seq)));
        }
    })?;

    let sequence = match max_seen {
        None => 0,
        Some(SEQ_MAX) => return Err(StorageError::SequenceExhausted),
        Some(seen) => seen + 1,
    };

    let id = LogFileId {
        directory: log.directory,
        base_name: log.base_name,
        extension: log.extension,
        sequence,
    };
    info!(
        "next log file: {}/{} (max seen: {:?})",
        id.directory,
        id.file_name(),
        max_seen
    );
    Ok(id)
}

/// Parse the sequence field out of `name` if it matches the
/// `<base>_<nnnn>.<ext>` convention for this base name.
///
/// The prefix comparison is ASCII case-insensitive: FAT short names come
/// back uppercase (`LOG_0001.CSV`) whatever the configured base is.
/// Everything is byte-wise; host volumes can hand us non-ASCII entry
/// names, and those must be ignored, never split on a char boundary.
fn parse_sequence(name: &str, base: &str) -> Option<u16> {
    let bytes = name.as_bytes();
    if bytes.len() != base.len() + SUFFIX_LEN {
        return None;
    }
    if !bytes[..base.len()].eq_ignore_ascii_case(base.as_bytes()) {
        return None;
    }
    if bytes[base.len()] != b'_' || bytes[bytes.len() - 4] != b'.' {
        return None;
    }

    let digits = &bytes[base.len() + 1..base.len() + 1 + SEQ_DIGITS];
    let mut seq: u16 = 0;
    for &d in digits {
        if !d.is_ascii_digit() {
            return None;
        }
        seq = seq * 10 + (d - b'0') as u16;
    }
    Some(seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Volume stub serving a fixed directory listing.
    struct ListingVolume {
        entries: &'static [&'static str],
        dir_created: bool,
    }

    impl ListingVolume {
        fn new(entries: &'static [&'static str]) -> Self {
            Self {
                entries,
                dir_created: false,
            }
        }
    }

    impl Volume for ListingVolume {
        fn ensure_dir(&mut self, _dir: &str) -> Result<(), StorageError> {
            self.dir_created = true;
            Ok(())
        }

        fn list_dir(
            &mut self,
            _dir: &str,
            visit: &mut dyn FnMut(&str),
        ) -> Result<(), StorageError> {
            for entry in self.entries {
                visit(entry);
            }
            Ok(())
        }

        fn append(
            &mut self,
            _dir: &str,
            _name: &str,
            _parts: &[&[u8]],
        ) -> Result<(), StorageError> {
            unreachable!("sequencer never writes");
        }
    }

    fn config() -> LogConfig<'static> {
        LogConfig::default()
    }

    #[test]
    fn test_empty_directory_starts_at_zero() {
        let mut volume = ListingVolume::new(&[]);
        let id = next_log_id(&mut volume, &config()).unwrap();
        assert!(volume.dir_created);
        assert_eq!(id.sequence, 0);
        assert_eq!(id.file_name(), "log_0000.csv");
    }

    #[test]
    fn test_next_is_max_seen_plus_one() {
        let mut volume = ListingVolume::new(&["log_0000.csv", "log_0003.csv", "log_0007.csv"]);
        let id = next_log_id(&mut volume, &config()).unwrap();
        assert_eq!(id.sequence, 8);
        assert_eq!(id.file_name(), "log_0008.csv");
    }

    #[test]
    fn test_fat_uppercase_names_match() {
        let mut volume = ListingVolume::new(&["LOG_0011.CSV"]);
        let id = next_log_id(&mut volume, &config()).unwrap();
        assert_eq!(id.sequence, 12);
    }

    #[test]
    fn test_foreign_entries_are_ignored() {
        let mut volume = ListingVolume::new(&[
            "log2_0001.csv", // different base, different length
            "log_001.csv",   // too short
            "log_00012.csv", // too long
            "logX0004.csv",  // wrong separator
            "log_12a4.csv",  // non-digit field
            "notes.txt",
            "log_0002.csv",
        ]);
        let id = next_log_id(&mut volume, &config()).unwrap();
        assert_eq!(id.sequence, 3);
    }

    #[test]
    fn test_non_ascii_entries_are_ignored() {
        // "abñ_0001.cs" is 12 bytes, the same as len("log") + 9; the
        // multibyte prefix must be skipped, not sliced mid-character.
        let mut volume = ListingVolume::new(&["abñ_0001.cs", "log_0004.csv"]);
        let id = next_log_id(&mut volume, &config()).unwrap();
        assert_eq!(id.sequence, 5);
    }

    #[test]
    fn test_exhausted_sequence_is_surfaced() {
        let mut volume = ListingVolume::new(&["log_9999.csv"]);
        assert_eq!(
            next_log_id(&mut volume, &config()),
            Err(StorageError::SequenceExhausted)
        );
    }

    #[test]
    fn test_invalid_extension_rejected() {
        let mut volume = ListingVolume::new(&[]);
        let bad = LogConfig {
            extension: "data",
            ..LogConfig::default()
        };
        assert!(matches!(
            next_log_id(&mut volume, &bad),
            Err(StorageError::InvalidConfig(_))
        ));
    }
}
