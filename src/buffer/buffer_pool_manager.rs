//! Buffer Pool Manager - the core page caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Page caching between files and memory, keyed by file identity (not
//!   filename), so one pool can serve pages belonging to several distinct
//!   backing files at once
//! - Pin-based reference counting
//! - Automatic dirty page write-back through CLOCK eviction
//! - CLOCK (second-chance) victim selection

use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::debug::FrameSnapshot;
use crate::buffer::directory::PageDirectory;
use crate::buffer::replacer::ClockReplacer;
use crate::buffer::{BufferPoolStats, Frame, PageReadGuard, PageWriteGuard};
use crate::common::{Error, FrameId, PageId, Result};
use crate::storage::PageFile;

/// Manages a pool of buffer frames shared across one or more backing files.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────────┐
/// │                      BufferPoolManager                          │
/// │  ┌────────────────┐   ┌─────────────────────────────────────┐   │
/// │  │   directory    │   │         frames: Vec<Frame>          │   │
/// │  │(file,page)→Fid  │──▶│  [Frame0] [Frame1] [Frame2] ...    │   │
/// │  └────────────────┘   └─────────────────────────────────────┘   │
/// │  ┌──────────────┐  ┌────────────────┐                          │
/// │  │  free_list   │  │ ClockReplacer  │                          │
/// │  │ Vec<FrameId> │  │  (hand, size)  │                          │
/// │  └──────────────┘  └────────────────┘                          │
/// └──────────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `directory`: `RwLock` internally — many readers, few writers
/// - `free_list`: `Mutex` — always modified
/// - `replacer`: `Mutex` — hand position changes on every sweep step
/// - `frames`: no lock at the `Vec` level — fixed size, each `Frame` has
///   its own interior locks/atomics
/// - `stats`: no lock — all atomic counters
///
/// # Usage
/// ```ignore
/// let file: Arc<dyn PageFile> = Arc::new(DiskManager::create("test.db")?);
/// let bpm = BufferPoolManager::new(10);
///
/// let (page_no, mut guard) = bpm.alloc_page(&file)?;
/// guard.as_mut_slice()[0] = 0xAB;
/// // guard drops: page marked dirty, unpinned
///
/// let guard = bpm.read_page(&file, page_no)?;
/// let data = guard.as_slice();
/// ```
pub struct BufferPoolManager {
    /// Fixed pool of frames allocated at startup.
    frames: Vec<Frame>,

    /// Maps `(file, page_no)` to the frame currently holding that page.
    directory: PageDirectory,

    /// Stack of free frame IDs (LIFO for cache locality). An
    /// implementation-level fast path over always sweeping the clock for
    /// an invalid frame: every cleared frame is pushed here so the common
    /// case of a still-warming pool never touches the replacer.
    free_list: Mutex<Vec<FrameId>>,

    /// Eviction policy for selecting victim frames once the free list is empty.
    replacer: Mutex<ClockReplacer>,

    /// Performance statistics.
    stats: BufferPoolStats,

    /// Number of frames in the pool (immutable after construction).
    pool_size: usize,
}

impl BufferPoolManager {
    /// Create a new buffer pool manager with `pool_size` frames.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        let frames: Vec<Frame> = (0..pool_size).map(|_| Frame::new()).collect();
        let free_list: Vec<FrameId> = (0..pool_size).map(FrameId::new).collect();

        Self {
            frames,
            directory: PageDirectory::new(pool_size),
            free_list: Mutex::new(free_list),
            replacer: Mutex::new(ClockReplacer::new(pool_size)),
            stats: BufferPoolStats::new(),
            pool_size,
        }
    }

    // ========================================================================
    // Public API: the access engine's six operations
    // ========================================================================

    /// Fetch a page for reading (shared access).
    ///
    /// On a directory hit, sets the frame's reference bit and pins it.
    /// On a miss, selects a victim via [`ClockReplacer`], reads the page
    /// from `file`, and registers the new mapping.
    ///
    /// # Errors
    /// Propagates `file.read_page`'s error, or `Error::BufferExceeded` if
    /// every frame is pinned.
    pub fn read_page(&self, file: &Arc<dyn PageFile>, page_no: PageId) -> Result<PageReadGuard<'_>> {
        let frame_id = self.fetch_internal(file, page_no)?;
        let lock = self.frames[frame_id.0].read();
        Ok(PageReadGuard::new(self, frame_id, page_no, lock))
    }

    /// Fetch a page for writing (exclusive access). Same lookup/load path
    /// as [`Self::read_page`], returning an exclusive guard instead.
    pub fn read_page_mut(
        &self,
        file: &Arc<dyn PageFile>,
        page_no: PageId,
    ) -> Result<PageWriteGuard<'_>> {
        let frame_id = self.fetch_internal(file, page_no)?;
        let lock = self.frames[frame_id.0].write();
        Ok(PageWriteGuard::new(self, frame_id, page_no, lock))
    }

    /// Allocate a new page on `file` and load it into the pool, pinned
    /// with count 1 and clean. The caller is expected to modify it and
    /// eventually unpin with `dirty = true`.
    ///
    /// # Errors
    /// `Error::BufferExceeded` if every frame is pinned, or an I/O error
    /// from `file.allocate_page`.
    pub fn alloc_page(&self, file: &Arc<dyn PageFile>) -> Result<(PageId, PageWriteGuard<'_>)> {
        let frame_id = self.alloc_buf()?;

        let page = file.allocate_page()?;
        let page_no = page.page_number();

        let frame = &self.frames[frame_id.0];
        frame.install(Arc::clone(file), page_no, page);
        frame.pin();
        self.directory.insert(Arc::clone(file), page_no, frame_id);

        let lock = frame.write();
        Ok((page_no, PageWriteGuard::new(self, frame_id, page_no, lock)))
    }

    /// Unpin `(file, page_no)`, optionally marking it dirty.
    ///
    /// A miss is a silent no-op: higher layers may defensively unpin a
    /// page that already left the pool. Dirtiness is monotone — passing
    /// `dirty = false` never clears a dirty bit already set.
    ///
    /// # Errors
    /// `Error::PageNotPinned` if the page is resident but its pin count
    /// is already zero.
    pub fn unpin_page(&self, file: &Arc<dyn PageFile>, page_no: PageId, dirty: bool) -> Result<()> {
        let frame_id = match self.directory.lookup(file, page_no) {
            Some(frame_id) => frame_id,
            None => return Ok(()),
        };

        let frame = &self.frames[frame_id.0];
        if !frame.is_pinned() {
            return Err(Error::PageNotPinned {
                filename: file.filename(),
                page_no: page_no.0,
                frame_no: frame_id.0,
            });
        }

        if dirty {
            frame.mark_dirty();
        }
        frame.unpin();
        Ok(())
    }

    /// Flush and evict every valid frame belonging to `file`.
    ///
    /// # Errors
    /// `Error::PagePinned` on the first pinned frame belonging to `file`
    /// it encounters — frames already processed earlier in the scan stay
    /// flushed even though the call as a whole failed.
    /// `Error::BadBuffer` if a frame's file pointer matches `file` but the
    /// frame is not valid (a broken directory/descriptor invariant).
    pub fn flush_file(&self, file: &Arc<dyn PageFile>) -> Result<()> {
        for k in 0..self.pool_size {
            let frame = &self.frames[k];
            let belongs = matches!(frame.file(), Some(f) if Arc::ptr_eq(&f, file));
            if !belongs {
                continue;
            }

            if !frame.is_valid() {
                return Err(Error::BadBuffer {
                    frame_no: k,
                    dirty: frame.is_dirty(),
                    valid: false,
                    refbit: frame.refbit(),
                });
            }

            let page_no = frame.page_no().expect("valid frame must carry a page_no");

            if frame.is_pinned() {
                return Err(Error::PagePinned {
                    filename: file.filename(),
                    page_no: page_no.0,
                    frame_no: k,
                });
            }

            if frame.is_dirty() {
                file.write_page(page_no, &frame.read())?;
                frame.clear_dirty();
                self.stats.pages_written.fetch_add(1, Ordering::Relaxed);
            }

            self.directory.remove(file, page_no);
            frame.clear();
            self.free_list.lock().push(FrameId::new(k));
        }
        Ok(())
    }

    /// Remove a page from the pool and release its page id on `file`.
    ///
    /// If the page is resident and dirty, it is written back first — the
    /// source does this even though the page is about to be freed; kept
    /// here for behavioral parity rather than because it is useful.
    /// `file.delete_page` is always called, whether or not the page was
    /// resident.
    pub fn dispose_page(&self, file: &Arc<dyn PageFile>, page_no: PageId) -> Result<()> {
        if let Some(frame_id) = self.directory.lookup(file, page_no) {
            let frame = &self.frames[frame_id.0];
            if frame.is_dirty() {
                file.write_page(page_no, &frame.read())?;
            }
            frame.clear();
            self.directory.remove(file, page_no);
            self.free_list.lock().push(frame_id);
        }

        file.delete_page(page_no)
    }

    // ========================================================================
    // Public API: convenience flushing
    // ========================================================================

    /// Flush a single resident page if dirty, without evicting it.
    pub fn flush_page(&self, file: &Arc<dyn PageFile>, page_no: PageId) -> Result<()> {
        let frame_id = match self.directory.lookup(file, page_no) {
            Some(frame_id) => frame_id,
            None => return Ok(()),
        };

        let frame = &self.frames[frame_id.0];
        if frame.is_dirty() {
            file.write_page(page_no, &frame.read())?;
            frame.clear_dirty();
            self.stats.pages_written.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Flush every dirty frame in the pool, across every backing file,
    /// without evicting any of them.
    pub fn flush_all_pages(&self) -> Result<()> {
        for k in 0..self.pool_size {
            let frame = &self.frames[k];
            if !frame.is_valid() || !frame.is_dirty() {
                continue;
            }
            let file = frame.file().expect("valid frame must carry a file");
            let page_no = frame.page_no().expect("valid frame must carry a page_no");

            file.write_page(page_no, &frame.read())?;
            frame.clear_dirty();
            self.stats.pages_written.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    // ========================================================================
    // Public API: introspection
    // ========================================================================

    /// Buffer pool statistics.
    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// Number of frames in the pool.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Number of frames not currently occupied by a resident page.
    pub fn free_frame_count(&self) -> usize {
        self.free_list.lock().len()
    }

    /// Number of frames currently holding a resident page.
    pub fn valid_frame_count(&self) -> usize {
        (0..self.pool_size).filter(|&k| self.frames[k].is_valid()).count()
    }

    /// A point-in-time snapshot of every frame's descriptor, for
    /// diagnostics and tests.
    pub fn debug_dump(&self) -> Vec<FrameSnapshot> {
        (0..self.pool_size)
            .map(|k| {
                let frame = &self.frames[k];
                FrameSnapshot {
                    frame_id: FrameId::new(k),
                    valid: frame.is_valid(),
                    page_no: frame.page_no(),
                    filename: frame.file().map(|f| f.filename()),
                    pin_count: frame.pin_count(),
                    dirty: frame.is_dirty(),
                    refbit: frame.refbit(),
                }
            })
            .collect()
    }

    // ========================================================================
    // Internal: called by PageReadGuard/PageWriteGuard on drop
    // ========================================================================

    /// Unpin a frame by id, bypassing the directory lookup — the guard
    /// already knows which frame it pinned. Unlike the public
    /// `unpin_page`, this cannot observe "not pinned": the guard's own
    /// existence is proof of an outstanding pin.
    pub(crate) fn unpin_frame_internal(&self, frame_id: FrameId, dirty: bool) {
        let frame = &self.frames[frame_id.0];
        if dirty {
            frame.mark_dirty();
        }
        frame.unpin();
    }

    // ========================================================================
    // Internal: core fetch and eviction logic
    // ========================================================================

    fn fetch_internal(&self, file: &Arc<dyn PageFile>, page_no: PageId) -> Result<FrameId> {
        if let Some(frame_id) = self.directory.lookup(file, page_no) {
            self.frames[frame_id.0].pin();
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(frame_id);
        }

        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);

        let frame_id = self.alloc_buf()?;
        let page = file.read_page(page_no)?;
        self.stats.pages_read.fetch_add(1, Ordering::Relaxed);

        let frame = &self.frames[frame_id.0];
        frame.install(Arc::clone(file), page_no, page);
        frame.pin();
        self.directory.insert(Arc::clone(file), page_no, frame_id);

        Ok(frame_id)
    }

    /// Select a frame, flushing and clearing its prior occupant if any,
    /// leaving it invalid and unpinned for the caller to install into.
    fn alloc_buf(&self) -> Result<FrameId> {
        if let Some(frame_id) = self.free_list.lock().pop() {
            return Ok(frame_id);
        }

        let frame_id = self
            .replacer
            .lock()
            .evict(&self.frames)
            .ok_or(Error::BufferExceeded)?;

        let frame = &self.frames[frame_id.0];
        if frame.is_valid() {
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);

            let file = frame.file().expect("valid frame must carry a file");
            let page_no = frame.page_no().expect("valid frame must carry a page_no");

            if frame.is_dirty() {
                file.write_page(page_no, &frame.read())?;
                frame.clear_dirty();
                self.stats.pages_written.fetch_add(1, Ordering::Relaxed);
            }

            self.directory.remove(&file, page_no);
            frame.clear();
        }

        Ok(frame_id)
    }
}

impl Drop for BufferPoolManager {
    /// Flush every dirty file's pages on teardown. A file with a pinned
    /// page at this point causes `flush_file` to fail; per policy this is
    /// logged and the teardown proceeds to the next file rather than
    /// panicking out of a destructor.
    fn drop(&mut self) {
        let mut dirty_files: Vec<Arc<dyn PageFile>> = Vec::new();
        for k in 0..self.pool_size {
            let frame = &self.frames[k];
            if !frame.is_valid() || !frame.is_dirty() {
                continue;
            }
            let Some(file) = frame.file() else { continue };
            if dirty_files.iter().any(|f| Arc::ptr_eq(f, &file)) {
                continue;
            }
            dirty_files.push(file);
        }

        for file in dirty_files {
            if let Err(err) = self.flush_file(&file) {
                tracing::warn!(
                    file = %file.filename(),
                    error = %err,
                    "buffer pool teardown: could not fully flush dirty pages"
                );
            }
        }
    }
}
