//! Segment classification from program header flags
//!
//! Qualcomm PIL images encode a segment type in bits 24-26 of `p_flags`.
//! This is a vendor extension, not part of standard ELF.

use pil_core::SegmentKind;

pub const SEGMENT_TYPE_SHIFT: u32 = 24;
pub const SEGMENT_TYPE_MASK: u32 = 7;
pub const SEGMENT_TYPE_HASH: u32 = 2;

/// Extract the vendor segment type field from `p_flags`
#[inline]
pub fn segment_type(p_flags: u32) -> u32 {
    (p_flags >> SEGMENT_TYPE_SHIFT) & SEGMENT_TYPE_MASK
}

/// Check whether `p_flags` marks a hash segment
#[inline]
pub fn is_hash_segment(p_flags: u32) -> bool {
    segment_type(p_flags) == SEGMENT_TYPE_HASH
}

/// Decide where a segment lives in the split representation
pub fn classify(p_filesz: u64, p_flags: u32) -> SegmentKind {
    if p_filesz == 0 {
        SegmentKind::Empty
    } else if is_hash_segment(p_flags) {
        SegmentKind::Hash
    } else {
        SegmentKind::Regular
    }
}

bitflags::bitflags! {
    /// Standard ELF permission bits of `p_flags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PermissionFlags: u32 {
        const EXECUTE = 0x1;
        const WRITE = 0x2;
        const READ = 0x4;
    }
}

impl PermissionFlags {
    pub fn from_p_flags(p_flags: u32) -> Self {
        Self::from_bits_truncate(p_flags)
    }
}

impl std::fmt::Display for PermissionFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = if self.contains(Self::READ) { 'R' } else { '-' };
        let w = if self.contains(Self::WRITE) { 'W' } else { '-' };
        let x = if self.contains(Self::EXECUTE) { 'X' } else { '-' };
        write!(f, "{r}{w}{x}")
    }
}
