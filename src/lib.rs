//! clockpool - a CLOCK-replacement buffer pool manager for page-oriented
//! storage engines.
//!
//! # Architecture
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      BufferPoolManager                        │
//! │  ┌────────────────┐  ┌──────────────┐  ┌──────────────────┐   │
//! │  │  page directory │  │  free list   │  │  ClockReplacer  │   │
//! │  │ (file,page)→Fid  │  │ Vec<FrameId> │  │   hand, size    │   │
//! │  └────────────────┘  └──────────────┘  └──────────────────┘   │
//! │                 ↓                                              │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │              frames: Vec<Frame>  (the pool)              │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//!                            ↓ (through the `PageFile` trait)
//!                     one or more backing files
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config)
//! - [`buffer`] - The buffer pool manager, frame table, and CLOCK replacement
//! - [`storage`] - Pages and the `PageFile` trait backing files implement
//!
//! # Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use clockpool::{BufferPoolManager, PageId};
//! use clockpool::storage::{DiskManager, PageFile};
//!
//! let file: Arc<dyn PageFile> = Arc::new(DiskManager::create("my_database.db").unwrap());
//! let bpm = BufferPoolManager::new(64);
//!
//! let (page_no, mut guard) = bpm.alloc_page(&file).unwrap();
//! guard.as_mut_slice()[0] = 0xAB;
//! drop(guard); // marks dirty, unpins
//!
//! let guard = bpm.read_page(&file, page_no).unwrap();
//! assert_eq!(guard.as_slice()[0], 0xAB);
//! ```

pub mod buffer;
pub mod common;
mod error;
pub mod storage;

pub use common::config::PAGE_SIZE;
pub use common::{Error, FrameId, PageId, Result};

pub use buffer::{BufferPoolManager, BufferPoolStats, Frame, FrameSnapshot, StatsSnapshot};
pub use storage::{DiskManager, Page, PageFile};
