//! Disk Manager - low-level file I/O for database pages.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing pages
//! - Allocating new pages
//! - Managing the database file
//!
//! It is the reference [`PageFile`] implementation: a single on-disk file
//! with pages laid out sequentially.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::page_file::PageFile;

/// Manages disk I/O for a single database file.
///
/// # File Layout
/// The file is stored with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Page N is located at file offset `N × PAGE_SIZE`.
///
/// # Thread Safety
/// All state lives behind a single internal `Mutex`, so a `DiskManager`
/// can be shared as `Arc<dyn PageFile>` across threads and called
/// concurrently by the buffer pool manager; individual operations are
/// simply serialized.
///
/// # Durability
/// All writes are followed by `fsync()` to ensure durability. This is
/// conservative, matching the buffer pool's synchronous-write-at-eviction
/// model (no WAL group commit — see the crate's Non-goals).
pub struct DiskManager {
    inner: Mutex<Inner>,
    path: PathBuf,
}

struct Inner {
    file: File,
    page_count: u32,
}

impl DiskManager {
    /// Create a new database file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path.as_ref())?;

        Ok(Self {
            inner: Mutex::new(Inner { file, page_count: 0 }),
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Open an existing database file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path.as_ref())?;

        let metadata = file.metadata()?;
        let file_size = metadata.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        Ok(Self {
            inner: Mutex::new(Inner { file, page_count }),
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Open an existing database file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Get the number of pages in the database.
    pub fn page_count(&self) -> u32 {
        self.inner.lock().page_count
    }

    /// Get the total size of the database file in bytes.
    pub fn file_size(&self) -> u64 {
        (self.page_count() as u64) * (PAGE_SIZE as u64)
    }
}

impl PageFile for DiskManager {
    fn read_page(&self, page_no: PageId) -> Result<Page> {
        let mut inner = self.inner.lock();

        if page_no.0 >= inner.page_count {
            return Err(Error::PageNotFound(page_no.0));
        }

        let offset = (page_no.0 as u64) * (PAGE_SIZE as u64);
        inner.file.seek(SeekFrom::Start(offset))?;

        let mut page = Page::new();
        inner.file.read_exact(page.as_mut_slice())?;
        page.set_page_number(page_no);

        Ok(page)
    }

    fn write_page(&self, page_no: PageId, page: &Page) -> Result<()> {
        let mut inner = self.inner.lock();

        if page_no.0 >= inner.page_count {
            return Err(Error::PageNotFound(page_no.0));
        }

        let offset = (page_no.0 as u64) * (PAGE_SIZE as u64);
        inner.file.seek(SeekFrom::Start(offset))?;
        inner.file.write_all(page.as_slice())?;
        inner.file.sync_all()?;

        Ok(())
    }

    fn allocate_page(&self) -> Result<Page> {
        let mut inner = self.inner.lock();

        let page_no = PageId::new(inner.page_count);
        let offset = (page_no.0 as u64) * (PAGE_SIZE as u64);
        inner.file.seek(SeekFrom::Start(offset))?;

        let zeros = [0u8; PAGE_SIZE];
        inner.file.write_all(&zeros)?;
        inner.file.sync_all()?;

        inner.page_count += 1;

        let mut page = Page::new();
        page.set_page_number(page_no);
        Ok(page)
    }

    fn delete_page(&self, _page_no: PageId) -> Result<()> {
        // The reference implementation never reclaims page ids or shrinks
        // the file; deletion only releases the id from the buffer pool's
        // bookkeeping (see `BufferPoolManager::dispose_page`).
        Ok(())
    }

    fn filename(&self) -> String {
        self.path.display().to_string()
    }
}
