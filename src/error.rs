//! Error types for clockpool.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in clockpool.
///
/// Every recoverable condition the buffer pool manager can signal is a
/// variant here, rather than a raw string or a panic; the original
/// implementation's thrown exceptions (`BufferExceededException`,
/// `PageNotPinnedException`, `PagePinnedException`, `BadBufferException`,
/// `HashNotFoundException`) map one-for-one onto these variants, except
/// `HashNotFoundException`, which becomes an internal `Option`-returning
/// control path rather than a caller-visible error (see the page
/// directory).
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page does not exist on the backing file.
    #[error("page {0} not found")]
    PageNotFound(u32),

    /// The buffer pool swept every frame twice and found none unpinned.
    ///
    /// Recoverable: the caller must unpin outstanding pages and retry.
    #[error("no free frames available in buffer pool")]
    BufferExceeded,

    /// `unpin_page` was called on a page whose pin count is already zero.
    ///
    /// Indicates a caller accounting bug; always surfaced.
    #[error("page {page_no} of {filename} is not pinned (frame {frame_no})")]
    PageNotPinned {
        filename: String,
        page_no: u32,
        frame_no: usize,
    },

    /// `flush_file` encountered a page that is still pinned.
    #[error("page {page_no} of {filename} is pinned (frame {frame_no})")]
    PagePinned {
        filename: String,
        page_no: u32,
        frame_no: usize,
    },

    /// A descriptor's file pointer matched the `flush_file` argument but
    /// the frame was not valid — a broken directory/descriptor invariant.
    #[error(
        "corrupt descriptor for frame {frame_no} (dirty={dirty}, valid={valid}, refbit={refbit})"
    )]
    BadBuffer {
        frame_no: usize,
        dirty: bool,
        valid: bool,
        refbit: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageNotFound(42);
        assert_eq!(format!("{}", err), "page 42 not found");

        let err = Error::BufferExceeded;
        assert_eq!(format!("{}", err), "no free frames available in buffer pool");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_result_type_alias() {
        // This function returns our Result type
        fn might_fail() -> Result<u32> {
            Ok(42)
        }

        assert_eq!(might_fail().unwrap(), 42);
    }

    #[test]
    fn test_page_not_pinned_display() {
        let err = Error::PageNotPinned {
            filename: "test.db".into(),
            page_no: 3,
            frame_no: 1,
        };
        assert_eq!(format!("{}", err), "page 3 of test.db is not pinned (frame 1)");
    }
}
