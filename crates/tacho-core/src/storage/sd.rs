//! SD card implementation of the storage volume, over `embedded-sdmmc`.

use core::fmt::Write;

use embedded_sdmmc::{Error as SdError, Mode, SdCard, SdCardError, TimeSource, VolumeIdx, VolumeManager};

use super::sequencer::MAX_FILE_NAME;
use super::{StorageError, Volume};

/// SD card storage operations are blocking, as on the original device;
/// every call opens the volume, walks down to the log directory, does
/// its work and closes everything again in reverse order. Handles are
/// closed on drop as well, so an early error exit cannot leak one.
pub struct SdVolume<S, D, T>
where
    S: embedded_hal::spi::SpiDevice<u8>,
    D: embedded_hal::delay::DelayNs,
    T: TimeSource,
{
    volume_mgr: VolumeManager<SdCard<S, D>, T, 4, 4, 1>,
}

impl<S, D, T> SdVolume<S, D, T>
where
    S: embedded_hal::spi::SpiDevice<u8>,
    D: embedded_hal::delay::DelayNs,
    T: TimeSource,
{
    /// Take ownership of an initialized card.
    pub fn new(sd_card: SdCard<S, D>, ts: T) -> Self {
        let volume_mgr = VolumeManager::new(sd_card, ts);

        Self { volume_mgr }
    }
}

impl<S, D, T> Volume for SdVolume<S, D, T>
where
    S: embedded_hal::spi::SpiDevice<u8>,
    D: embedded_hal::delay::DelayNs,
    T: TimeSource,
{
    fn ensure_dir(&mut self, dir: &str) -> Result<(), StorageError> {
        let volume0 = self
            .volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(StorageError::unavailable)?;
        let root_dir = volume0.open_root_dir().map_err(StorageError::unavailable)?;

        match root_dir.open_dir(dir) {
            Ok(log_dir) => log_dir.close().map_err(StorageError::unavailable)?,
            Err(SdError::NotFound) => root_dir
                .make_dir_in_dir(dir)
                .map_err(StorageError::unavailable)?,
            Err(e) => return Err(StorageError::unavailable(e)),
        }

        root_dir.close().map_err(StorageError::unavailable)?;
        volume0.close().map_err(StorageError::unavailable)?;
        Ok(())
    }

    fn list_dir(
        &mut self,
        dir: &str,
        visit: &mut dyn FnMut(&str),
    ) -> Result<(), StorageError> {
        let volume0 = self
            .volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(StorageError::unavailable)?;
        let root_dir = volume0.open_root_dir().map_err(StorageError::unavailable)?;
        let log_dir = root_dir.open_dir(dir).map_err(StorageError::unavailable)?;

        log_dir
            .iterate_dir(|entry| {
                if entry.attributes.is_directory() {
                    return;
                }
                // FAT short names fit the bounded buffer by construction.
                let mut name = heapless::String::<MAX_FILE_NAME>::new();
                if write!(name, "{}", entry.name).is_ok() {
                    visit(&name);
                }
            })
            .map_err(StorageError::unavailable)?;

        log_dir.close().map_err(StorageError::unavailable)?;
        root_dir.close().map_err(StorageError::unavailable)?;
        volume0.close().map_err(StorageError::unavailable)?;
        Ok(())
    }

    fn append(&mut self, dir: &str, name: &str, parts: &[&[u8]]) -> Result<(), StorageError> {
        let volume0 = self
            .volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(StorageError::unavailable)?;
        let root_dir = volume0.open_root_dir().map_err(StorageError::unavailable)?;
        let log_dir = root_dir.open_dir(dir).map_err(StorageError::unavailable)?;

        let file = log_dir
            .open_file_in_dir(name, Mode::ReadWriteCreateOrAppend)
            .map_err(StorageError::write_failure)?;

        for part in parts {
            if let Err(e) = file.write(part) {
                // Close is still attempted; the remaining handles close
                // on drop.
                let _ = file.close();
                return Err(StorageError::write_failure(e));
            }
        }
        if let Err(e) = file.flush() {
            let _ = file.close();
            return Err(StorageError::write_failure(e));
        }

        file.close().map_err(StorageError::write_failure)?;
        log_dir.close().map_err(StorageError::unavailable)?;
        root_dir.close().map_err(StorageError::unavailable)?;
        volume0.close().map_err(StorageError::unavailable)?;
        Ok(())
    }
}

/// Shorthand for the driver error this volume maps into [`StorageError`].
pub type SdVolumeError = SdError<SdCardError>;
