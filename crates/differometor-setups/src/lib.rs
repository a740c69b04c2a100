//! Ready-made interferometer topologies.
//!
//! Every builder goes through the public construction API of
//! `differometor-core` only, so each one is also a long-form example of how
//! reference ordering works: suspensions after their optics, signals after
//! the spaces or lasers they modulate, detectors last.

pub mod aligo;
pub mod mode;
pub mod uifo;
pub mod voyager;

pub use aligo::aligo;
pub use mode::Mode;
pub use uifo::{uifo, Boundary, Center, UifoOptions};
pub use voyager::voyager;
