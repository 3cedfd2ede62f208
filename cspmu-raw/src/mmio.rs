//! Register window read/write primitives
//!
//! A CoreSight PMU exposes its registers through a memory-mapped page. On a
//! running system that page is reachable through a resource file (a PCI or
//! platform `resourceN` node, or a UIO map). This module provides 32-bit
//! accessors over such a file and the [`RegisterWindow`] trait that hosts
//! implement for other backings.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, MmioError>;

/// Errors that can occur during register window operations
#[derive(Debug, thiserror::Error)]
pub enum MmioError {
    #[error("Failed to open register window {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read register 0x{offset:X} in {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        offset: u32,
        source: std::io::Error,
    },

    #[error("Failed to write register 0x{offset:X} in {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        offset: u32,
        source: std::io::Error,
    },

    #[error("Failed to seek to register 0x{offset:X} in {path}: {source}")]
    SeekFailed {
        path: PathBuf,
        offset: u32,
        source: std::io::Error,
    },

    #[error("Register offset 0x{offset:X} is not 32-bit aligned")]
    Unaligned { offset: u32 },
}

/// 32-bit access to a PMU register page
///
/// Every write is a single store of a fully computed value; callers never
/// read-modify-write through this trait.
pub trait RegisterWindow {
    fn read32(&self, offset: u32) -> Result<u32>;

    fn write32(&self, offset: u32, value: u32) -> Result<()>;
}

fn check_aligned(offset: u32) -> Result<()> {
    if offset % 4 != 0 {
        return Err(MmioError::Unaligned { offset });
    }
    Ok(())
}

/// Read a 32-bit register from a resource file
///
/// # Errors
///
/// Returns an error if:
/// - The offset is not 4-byte aligned
/// - The resource file cannot be opened (usually requires root)
/// - The offset lies outside the mapped page
pub fn read_reg32(path: &Path, offset: u32) -> Result<u32> {
    check_aligned(offset)?;

    let mut file = File::open(path).map_err(|e| MmioError::OpenFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    file.seek(SeekFrom::Start(offset as u64))
        .map_err(|e| MmioError::SeekFailed {
            path: path.to_path_buf(),
            offset,
            source: e,
        })?;

    let mut buffer = [0u8; 4];
    file.read_exact(&mut buffer)
        .map_err(|e| MmioError::ReadFailed {
            path: path.to_path_buf(),
            offset,
            source: e,
        })?;

    Ok(u32::from_le_bytes(buffer))
}

/// Write a 32-bit register in a resource file
///
/// # Safety
///
/// Writing incorrect values to PMU registers can silently corrupt counts of
/// other users of the same PMU. Compute filter values through the vendor
/// layer instead of writing raw words.
pub fn write_reg32(path: &Path, offset: u32, value: u32) -> Result<()> {
    check_aligned(offset)?;

    let mut file = OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_SYNC) // Ensure synchronous writes
        .open(path)
        .map_err(|e| MmioError::OpenFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    file.seek(SeekFrom::Start(offset as u64))
        .map_err(|e| MmioError::SeekFailed {
            path: path.to_path_buf(),
            offset,
            source: e,
        })?;

    file.write_all(&value.to_le_bytes())
        .map_err(|e| MmioError::WriteFailed {
            path: path.to_path_buf(),
            offset,
            source: e,
        })?;

    Ok(())
}

/// Register window backed by a resource file
#[derive(Debug, Clone)]
pub struct FileWindow {
    path: PathBuf,
}

impl FileWindow {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegisterWindow for FileWindow {
    fn read32(&self, offset: u32) -> Result<u32> {
        read_reg32(&self.path, offset)
    }

    fn write32(&self, offset: u32, value: u32) -> Result<()> {
        write_reg32(&self.path, offset, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(len: usize) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        file.as_file().set_len(len as u64).unwrap();
        file
    }

    #[test]
    fn test_mmio_error_display() {
        let err = MmioError::OpenFailed {
            path: PathBuf::from("/nonexistent/resource0"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("Failed to open register window"));
    }

    #[test]
    fn test_file_window_write_then_read() {
        let scratch = scratch_file(0x1000);
        let window = FileWindow::new(scratch.path());

        window.write32(0xA08, 0x3FF).unwrap();
        window.write32(0x47C, 0xF).unwrap();

        assert_eq!(window.read32(0xA08).unwrap(), 0x3FF);
        assert_eq!(window.read32(0x47C).unwrap(), 0xF);
        assert_eq!(window.read32(0xA00).unwrap(), 0);
    }

    #[test]
    fn test_unaligned_offset_rejected() {
        let window = FileWindow::new("/nonexistent/resource0");
        assert!(matches!(
            window.write32(0xA02, 1),
            Err(MmioError::Unaligned { offset: 0xA02 })
        ));
    }

    #[test]
    fn test_read_past_end_fails() {
        let scratch = scratch_file(8);
        let err = read_reg32(scratch.path(), 0x10).unwrap_err();
        assert!(matches!(err, MmioError::ReadFailed { offset: 0x10, .. }));
    }
}
