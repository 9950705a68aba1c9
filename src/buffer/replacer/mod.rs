//! Page replacement policy.

mod clock;

pub use clock::ClockReplacer;

use super::frame::Frame;
