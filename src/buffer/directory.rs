//! Page directory - the `(file, page_no) -> frame` hash index.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::{FrameId, PageId};
use crate::common::config::DIRECTORY_LOAD_FACTOR;
use crate::storage::{FileKey, PageFile};

/// Maps `(file identity, page_no)` to the frame currently holding that page.
///
/// Pre-sized to `ceil(pool_size * DIRECTORY_LOAD_FACTOR)` buckets so the
/// map never needs to reallocate once the pool is full, since at most one
/// entry exists per valid frame.
pub struct PageDirectory {
    entries: RwLock<HashMap<(FileKey, PageId), FrameId>>,
}

impl PageDirectory {
    pub fn new(pool_size: usize) -> Self {
        let capacity = (pool_size as f64 * DIRECTORY_LOAD_FACTOR).ceil() as usize;
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    pub fn lookup(&self, file: &Arc<dyn PageFile>, page_no: PageId) -> Option<FrameId> {
        let key = (FileKey(Arc::clone(file)), page_no);
        self.entries.read().get(&key).copied()
    }

    /// Record that `(file, page_no)` now lives in `frame_id`.
    pub fn insert(&self, file: Arc<dyn PageFile>, page_no: PageId, frame_id: FrameId) {
        let key = (FileKey(file), page_no);
        let previous = self.entries.write().insert(key, frame_id);
        debug_assert!(
            previous.is_none(),
            "page directory entry overwritten without being removed first"
        );
    }

    pub fn remove(&self, file: &Arc<dyn PageFile>, page_no: PageId) -> Option<FrameId> {
        let key = (FileKey(Arc::clone(file)), page_no);
        self.entries.write().remove(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DiskManager;
    use tempfile::tempdir;

    fn stub_file() -> Arc<dyn PageFile> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.db");
        let dm = DiskManager::create(&path).unwrap();
        std::mem::forget(dir);
        Arc::new(dm)
    }

    #[test]
    fn test_insert_and_lookup() {
        let dir = PageDirectory::new(8);
        let file = stub_file();

        dir.insert(Arc::clone(&file), PageId::new(1), FrameId::new(0));
        assert_eq!(dir.lookup(&file, PageId::new(1)), Some(FrameId::new(0)));
        assert_eq!(dir.lookup(&file, PageId::new(2)), None);
    }

    #[test]
    fn test_remove() {
        let dir = PageDirectory::new(8);
        let file = stub_file();

        dir.insert(Arc::clone(&file), PageId::new(1), FrameId::new(0));
        assert_eq!(dir.remove(&file, PageId::new(1)), Some(FrameId::new(0)));
        assert_eq!(dir.lookup(&file, PageId::new(1)), None);
        assert_eq!(dir.remove(&file, PageId::new(1)), None);
    }

    #[test]
    fn test_distinct_files_same_page_no_distinct_entries() {
        let dir = PageDirectory::new(8);
        let file_a = stub_file();
        let file_b = stub_file();

        dir.insert(Arc::clone(&file_a), PageId::new(0), FrameId::new(0));
        dir.insert(Arc::clone(&file_b), PageId::new(0), FrameId::new(1));

        assert_eq!(dir.lookup(&file_a, PageId::new(0)), Some(FrameId::new(0)));
        assert_eq!(dir.lookup(&file_b, PageId::new(0)), Some(FrameId::new(1)));
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_len_and_is_empty() {
        let dir = PageDirectory::new(4);
        assert!(dir.is_empty());

        let file = stub_file();
        dir.insert(Arc::clone(&file), PageId::new(0), FrameId::new(0));
        assert_eq!(dir.len(), 1);
        assert!(!dir.is_empty());
    }
}
