//! Conversion between combined and split Qualcomm PIL firmware images
//!
//! A combined image (`.mbn`) is a plain ELF file. The split form keeps the
//! ELF header, the program header table and every hash segment in a `.mdt`
//! file, and every non-empty segment in a sibling `.bNN` file named after
//! its program header index. Squashing takes hash segments from the `.mdt`.
//!
//! Not supported: running split or squash concurrently against the same
//! `.mdt`/`.bNN`/`.mbn` path set.

pub mod cli;
pub mod inspect;
pub mod naming;
pub mod split;
pub mod squash;

pub use inspect::{inspect, ImageReport, SegmentReport};
pub use pil_core::{Config, Error, Result};
pub use split::{split, split_with_config};
pub use squash::{squash, squash_with_config};
