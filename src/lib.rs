//! Create the `test.pma` sparse fixture file
//!
//! The fixture is a file of exactly [`FIXTURE_SIZE`] bytes where only the final byte has been
//! written. Everything before it is a hole: it reads back as zeroes, and on file systems that
//! support sparse files no blocks are allocated for it.
//!
//! The sequence is the classic one: `creat()` the file, `lseek()` to one before the end, and
//! `write()` a single zero byte. Any failure is reported as an [`Error`] naming the step that
//! failed; nothing is retried and a partially created file is left behind.
//!
//! # Portability
//!
//!  - File systems without sparse file support (or with it turned off) will allocate the full
//!    4 MiB. The logical contents are the same either way.
//!  - The mode is only applied when the file is newly created, and is masked by the process
//!    umask. An existing `test.pma` is truncated but keeps its permissions (same as `creat(2)`).
//!  - Only unix-like systems are supported.
#![warn(rust_2018_idioms, missing_debug_implementations, missing_docs)]

use log::{debug, trace};
use snafu::{ResultExt, Snafu};
use std::convert::TryFrom;
use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

#[cfg(unix)]
use std::os::unix::{
    fs::{MetadataExt, OpenOptionsExt},
    io::AsRawFd,
};

/// Name of the fixture file, relative to the directory it is generated in
pub const FIXTURE_NAME: &str = "test.pma";

/// Logical length of the fixture file in bytes (4 MiB)
pub const FIXTURE_SIZE: u64 = 4 * 1024 * 1024;

/// Permission bits the fixture is created with: owner read/write only
pub const FIXTURE_MODE: u32 = 0o600;

/// Failure of one of the steps that produce the fixture
#[derive(Debug, Snafu)]
pub enum Error {
    /// The fixture file could not be created (or truncated)
    #[snafu(display("could not create {}: {}", path.display(), source))]
    Create {
        /// Path we tried to create
        path: PathBuf,
        /// Underlying OS error
        source: io::Error,
    },

    /// Moving the file cursor to the final byte failed
    #[snafu(display("lseek failed: {}", source))]
    Seek {
        /// Offset we tried to seek to
        offset: u64,
        /// Underlying OS error
        source: io::Error,
    },

    /// Writing the final byte failed
    #[snafu(display("write failed: {}", source))]
    Write {
        /// Offset of the byte we tried to write
        offset: u64,
        /// Underlying OS error
        source: io::Error,
    },
}

/// Where the fixture lands when generated in `dir`
pub fn fixture_path<P: AsRef<Path>>(dir: P) -> PathBuf {
    dir.as_ref().join(FIXTURE_NAME)
}

/// Create `test.pma` in the current working directory
pub fn generate() -> Result<(), Error> {
    generate_at(Path::new(FIXTURE_NAME))
}

/// Create `test.pma` inside `dir` instead of the current working directory
pub fn generate_in<P: AsRef<Path>>(dir: P) -> Result<(), Error> {
    generate_at(&fixture_path(dir))
}

fn generate_at(path: &Path) -> Result<(), Error> {
    let offset = FIXTURE_SIZE - 1;

    debug!("creating {} (mode {:o})", path.display(), FIXTURE_MODE);
    let mut file = create(path).context(Create { path })?;

    let pos = seek_set(&file, offset).context(Seek { offset })?;
    trace!("cursor at {}", pos);

    file.write_all(&[0]).context(Write { offset })?;

    // blocks are in 512 byte units regardless of the file system block size
    if let Ok(meta) = file.metadata() {
        debug!(
            "wrote {}: {} bytes, {} bytes allocated",
            path.display(),
            meta.len(),
            meta.blocks() * 512
        );
    }

    Ok(())
}

/// Same flags as `creat(2)`: write only, create, truncate
fn create(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(FIXTURE_MODE)
        .open(path)
}

/// `lseek(fd, offset, SEEK_SET)`, returning the resulting offset
fn seek_set(file: &fs::File, offset: u64) -> io::Result<u64> {
    let off = libc::off_t::try_from(offset)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset does not fit in off_t"))?;

    let r = unsafe { libc::lseek(file.as_raw_fd(), off, libc::SEEK_SET) };
    if r < 0 {
        return Err(io::Error::last_os_error());
    }

    // non-negative, checked above
    Ok(r as u64)
}
