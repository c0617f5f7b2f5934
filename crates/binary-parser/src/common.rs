//! Common traits and file helpers for ELF records

use crate::endian::from_file_endian;
use crate::segment::classify;
use crate::{ParseError, ParseResult};
use byteorder::{ByteOrder, NativeEndian};
use pil_core::{Address, ElfClass, SegmentKind};
use std::io::{Read, Seek, SeekFrom, Write};

/// Fixed-size ELF header of one class
///
/// Implementors carry the raw bytes they were decoded from alongside the
/// decoded fields.
pub trait ElfHeader: Sized + Clone + std::fmt::Debug {
    /// Program header record type of the same class
    type ProgramHeader: ProgramHeader;

    const CLASS: ElfClass;
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decode from exactly `SIZE` raw bytes
    fn decode(raw: &[u8], little_endian: bool) -> ParseResult<Self>;

    /// Raw bytes as read from the file
    fn raw(&self) -> &[u8];

    fn machine(&self) -> u16;

    fn entry(&self) -> Address;

    /// File offset of the program header table
    fn phoff(&self) -> u64;

    /// Number of program header entries
    fn phnum(&self) -> u16;

    /// Entry size recorded in the header (`e_phentsize`)
    fn phentsize(&self) -> u16;

    /// Size of one program header entry
    fn phdr_size(&self) -> usize {
        <Self::ProgramHeader as ProgramHeader>::SIZE
    }
}

/// Fixed-size program header of one class
pub trait ProgramHeader: Sized + Clone + std::fmt::Debug {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decode from exactly `SIZE` raw bytes
    fn decode(raw: &[u8], little_endian: bool) -> ParseResult<Self>;

    /// Raw bytes as read from the file
    fn raw(&self) -> &[u8];

    fn p_type(&self) -> u32;

    fn offset(&self) -> u64;

    fn vaddr(&self) -> Address;

    fn filesz(&self) -> u64;

    fn memsz(&self) -> u64;

    fn flags(&self) -> u32;

    /// Where this segment lives in the split representation
    fn kind(&self) -> SegmentKind {
        classify(self.filesz(), self.flags())
    }
}

/// Decodes file-order fields out of a fixed-size raw record
pub(crate) struct RecordReader<'a> {
    raw: &'a [u8],
    little_endian: bool,
}

impl<'a> RecordReader<'a> {
    pub(crate) fn new(raw: &'a [u8], little_endian: bool) -> Self {
        Self { raw, little_endian }
    }

    pub(crate) fn u16_at(&self, offset: usize) -> u16 {
        from_file_endian(NativeEndian::read_u16(&self.raw[offset..]), self.little_endian)
    }

    pub(crate) fn u32_at(&self, offset: usize) -> u32 {
        from_file_endian(NativeEndian::read_u32(&self.raw[offset..]), self.little_endian)
    }

    pub(crate) fn u64_at(&self, offset: usize) -> u64 {
        from_file_endian(NativeEndian::read_u64(&self.raw[offset..]), self.little_endian)
    }
}

/// Copy `raw` into a fixed-size array, rejecting any other length
pub(crate) fn fixed<const N: usize>(raw: &[u8], what: &str) -> ParseResult<[u8; N]> {
    raw.try_into().map_err(|_| {
        ParseError::invalid_header(format!("{what} must be {N} bytes, got {}", raw.len()))
    })
}

/// Read exactly `size` bytes at `offset`
pub fn read_at<R: Read + Seek>(reader: &mut R, offset: u64, size: u64) -> ParseResult<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;

    let mut buffer = Vec::new();
    reader.by_ref().take(size).read_to_end(&mut buffer)?;

    if buffer.len() as u64 != size {
        return Err(ParseError::truncated(offset, size, buffer.len() as u64));
    }

    Ok(buffer)
}

/// Write `data` at `offset`, extending the file if needed
pub fn write_at<W: Write + Seek>(writer: &mut W, offset: u64, data: &[u8]) -> std::io::Result<()> {
    writer.seek(SeekFrom::Start(offset))?;
    writer.write_all(data)
}

/// Append `data` at the current end of the file, returning where it landed
pub fn append<W: Write + Seek>(writer: &mut W, data: &[u8]) -> std::io::Result<u64> {
    let offset = writer.seek(SeekFrom::End(0))?;
    writer.write_all(data)?;
    Ok(offset)
}

/// Place the header at offset 0 and each program header entry at
/// `phoff + index * phdr_size`, byte for byte
pub fn write_header_and_phdrs<W: Write + Seek>(
    writer: &mut W,
    header_bytes: &[u8],
    phoff: u64,
    phdr_table_bytes: &[u8],
    phdr_size: usize,
) -> std::io::Result<()> {
    write_at(writer, 0, header_bytes)?;

    for (index, entry) in phdr_table_bytes.chunks_exact(phdr_size).enumerate() {
        write_at(writer, phoff + (index * phdr_size) as u64, entry)?;
    }

    Ok(())
}
