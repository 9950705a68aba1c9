//! Frame - a single slot in the buffer pool.
//!
//! Each [`Frame`] holds one page's worth of memory plus the bookkeeping
//! the replacement algorithm and pin-count protocol need: which file and
//! page currently occupy it (if any), how many pinners hold it, whether
//! it has been written since it was last clean, and its CLOCK reference
//! bit.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::PageId;
use crate::storage::{Page, PageFile};

/// One physical slot in the buffer pool's page array.
///
/// # Thread Safety
/// The page's bytes are behind an `RwLock` so readers and a single writer
/// can access the same frame concurrently; identity (`file`/`page_no`) and
/// the small atomic flags are split out so code that only needs to check
/// "is this frame free/pinned/dirty" never has to take the page lock.
pub struct Frame {
    page: RwLock<Page>,
    /// The file this frame's page belongs to, if the frame is valid.
    file: Mutex<Option<Arc<dyn PageFile>>>,
    /// The page number within `file`, if the frame is valid.
    page_no: Mutex<Option<PageId>>,
    pin_cnt: AtomicU32,
    dirty: AtomicBool,
    valid: AtomicBool,
    /// CLOCK's second-chance reference bit.
    refbit: AtomicBool,
}

impl Frame {
    /// Create a new, empty (invalid, unpinned) frame.
    pub fn new() -> Self {
        Self {
            page: RwLock::new(Page::new()),
            file: Mutex::new(None),
            page_no: Mutex::new(None),
            pin_cnt: AtomicU32::new(0),
            dirty: AtomicBool::new(false),
            valid: AtomicBool::new(false),
            refbit: AtomicBool::new(false),
        }
    }

    /// Acquire a read lock on the frame's page bytes.
    pub fn read(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    /// Acquire a write lock on the frame's page bytes.
    pub fn write(&self) -> RwLockWriteGuard<'_, Page> {
        self.page.write()
    }

    /// The file currently occupying this frame, if valid.
    pub fn file(&self) -> Option<Arc<dyn PageFile>> {
        self.file.lock().clone()
    }

    /// The page number currently occupying this frame, if valid.
    pub fn page_no(&self) -> Option<PageId> {
        *self.page_no.lock()
    }

    /// Install a page's identity into this frame and mark it valid.
    /// Replaces the page contents, resets pin count/dirty/refbit.
    pub fn install(&self, file: Arc<dyn PageFile>, page_no: PageId, page: Page) {
        *self.page.write() = page;
        *self.file.lock() = Some(file);
        *self.page_no.lock() = Some(page_no);
        self.pin_cnt.store(0, Ordering::SeqCst);
        self.dirty.store(false, Ordering::SeqCst);
        self.refbit.store(false, Ordering::SeqCst);
        self.valid.store(true, Ordering::SeqCst);
    }

    /// Clear the frame back to empty/invalid. Caller must ensure the
    /// frame has already been flushed if it was dirty.
    pub fn clear(&self) {
        *self.file.lock() = None;
        *self.page_no.lock() = None;
        self.pin_cnt.store(0, Ordering::SeqCst);
        self.dirty.store(false, Ordering::SeqCst);
        self.refbit.store(false, Ordering::SeqCst);
        self.valid.store(false, Ordering::SeqCst);
    }

    /// Increment the pin count and set the reference bit.
    pub fn pin(&self) {
        self.pin_cnt.fetch_add(1, Ordering::SeqCst);
        self.refbit.store(true, Ordering::SeqCst);
    }

    /// Decrement the pin count. Returns the pin count *before* this unpin,
    /// so a caller can detect an unpin of an already-unpinned frame (it
    /// saturates at zero rather than wrapping).
    pub fn unpin(&self) -> u32 {
        let mut current = self.pin_cnt.load(Ordering::SeqCst);
        loop {
            if current == 0 {
                return 0;
            }
            match self.pin_cnt.compare_exchange_weak(
                current,
                current - 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(prev) => return prev,
                Err(actual) => current = actual,
            }
        }
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_cnt.load(Ordering::SeqCst)
    }

    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    pub fn set_refbit(&self) {
        self.refbit.store(true, Ordering::SeqCst);
    }

    /// Read and clear the reference bit in one step, as CLOCK's sweep does.
    pub fn take_refbit(&self) -> bool {
        self.refbit.swap(false, Ordering::SeqCst)
    }

    pub fn refbit(&self) -> bool {
        self.refbit.load(Ordering::SeqCst)
    }

    /// A frame is evictable once valid and unpinned.
    pub fn is_evictable(&self) -> bool {
        self.is_valid() && !self.is_pinned()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
