use super::StorageError;

/// The mounted block filesystem as the logger sees it.
///
/// Implementations back this with whatever actually holds the files: the
/// SD card over `embedded-sdmmc` on the device, `std::fs` in the
/// simulator, an in-memory map in tests.
///
/// All three operations may block on storage I/O and are foreground-only;
/// nothing in the edge context ever touches a `Volume`.
pub trait Volume {
    /// Create `dir` under the mount root if it does not exist yet.
    fn ensure_dir(&mut self, dir: &str) -> Result<(), StorageError>;

    /// Call `visit` with the name of every entry in `dir`.
    ///
    /// One pass, no ordering guarantee; cost is proportional to the
    /// number of entries.
    fn list_dir(
        &mut self,
        dir: &str,
        visit: &mut dyn FnMut(&str),
    ) -> Result<(), StorageError>;

    /// Append `parts`, in order, to `dir/name` as one scoped unit:
    /// open for append (creating the file if needed), write every part,
    /// flush and close before returning. The handle is released on every
    /// exit path, including failed writes.
    fn append(&mut self, dir: &str, name: &str, parts: &[&[u8]]) -> Result<(), StorageError>;
}
