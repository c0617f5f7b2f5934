//! Common types used throughout the PIL tools

use serde::{Deserialize, Serialize};

/// A virtual or physical address taken from an ELF record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub u64);

impl Address {
    pub fn new(addr: u64) -> Self {
        Self(addr)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Self(value as u64)
    }
}

/// ELF class (word size of the header and program header records)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElfClass {
    Elf32,
    Elf64,
}

impl std::fmt::Display for ElfClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElfClass::Elf32 => f.write_str("ELF32"),
            ElfClass::Elf64 => f.write_str("ELF64"),
        }
    }
}

/// Byte order of the multi-byte fields in a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn is_little_endian(&self) -> bool {
        matches!(self, ByteOrder::Little)
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ByteOrder::Little => f.write_str("little-endian"),
            ByteOrder::Big => f.write_str("big-endian"),
        }
    }
}

/// How a segment is stored in the split representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Hash segment, carried inside the .mdt after the program headers
    Hash,
    /// Regular segment, carried in its own .bNN file
    Regular,
    /// No file data (`p_filesz == 0`)
    Empty,
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentKind::Hash => f.write_str("hash"),
            SegmentKind::Regular => f.write_str("regular"),
            SegmentKind::Empty => f.write_str("empty"),
        }
    }
}
