//! ELF parsing for Qualcomm PIL firmware images
//!
//! Only the identification block, the ELF header and the program header
//! table are understood. Records keep the raw bytes they were decoded from so
//! they can be written back verbatim.

pub mod common;
pub mod elf;
pub mod endian;
pub mod error;
pub mod segment;

pub use common::{append, read_at, write_at, write_header_and_phdrs, ElfHeader, ProgramHeader};
pub use elf::{
    detect_format, read_header, read_program_headers, Elf32Header, Elf32ProgramHeader, Elf64Header,
    Elf64ProgramHeader, ElfFormat, ElfImage,
};
pub use endian::{from_file_endian, to_file_endian, FileEndian};
pub use error::{ParseError, ParseResult};
pub use segment::{classify, is_hash_segment, PermissionFlags};
