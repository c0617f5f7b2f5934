//! ELF identification, header and program header records

use crate::common::{fixed, read_at, write_header_and_phdrs, ElfHeader, ProgramHeader, RecordReader};
use crate::error::{ParseError, ParseResult};
use pil_core::{Address, ByteOrder, ElfClass};
use std::io::{Read, Seek, Write};
use tracing::{debug, warn};

/// ELF magic
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Size of the identification block
pub const EI_NIDENT: usize = 16;
const EI_CLASS: usize = 4;
const EI_DATA: usize = 5;

/// ELF classes
const ELFCLASS32: u8 = 1;
const ELFCLASS64: u8 = 2;

/// ELF endianness
const ELFDATA2LSB: u8 = 1; // Little endian
const ELFDATA2MSB: u8 = 2; // Big endian

/// Program header types
pub const PT_NULL: u32 = 0;
pub const PT_LOAD: u32 = 1;
pub const PT_DYNAMIC: u32 = 2;
pub const PT_INTERP: u32 = 3;
pub const PT_NOTE: u32 = 4;
pub const PT_SHLIB: u32 = 5;
pub const PT_PHDR: u32 = 6;
pub const PT_TLS: u32 = 7;

/// ELF machine types seen in PIL images
const EM_386: u16 = 3;
const EM_ARM: u16 = 40;
const EM_X86_64: u16 = 62;
const EM_QDSP6: u16 = 164;
const EM_AARCH64: u16 = 183;

/// Human readable name of a program header type
pub fn segment_type_name(p_type: u32) -> String {
    match p_type {
        PT_NULL => "NULL".to_string(),
        PT_LOAD => "LOAD".to_string(),
        PT_DYNAMIC => "DYNAMIC".to_string(),
        PT_INTERP => "INTERP".to_string(),
        PT_NOTE => "NOTE".to_string(),
        PT_SHLIB => "SHLIB".to_string(),
        PT_PHDR => "PHDR".to_string(),
        PT_TLS => "TLS".to_string(),
        other => format!("{other:#x}"),
    }
}

/// Human readable name of an ELF machine
pub fn machine_name(e_machine: u16) -> String {
    match e_machine {
        EM_386 => "x86".to_string(),
        EM_ARM => "ARM".to_string(),
        EM_X86_64 => "x86-64".to_string(),
        EM_QDSP6 => "Hexagon".to_string(),
        EM_AARCH64 => "AArch64".to_string(),
        other => format!("{other:#x}"),
    }
}

/// Class and byte order from the identification block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElfFormat {
    pub class: ElfClass,
    pub byte_order: ByteOrder,
}

impl ElfFormat {
    pub fn is_little_endian(&self) -> bool {
        self.byte_order.is_little_endian()
    }

    /// Validate an identification block
    pub fn from_ident(ident: &[u8]) -> ParseResult<Self> {
        if ident.len() < EI_NIDENT {
            return Err(ParseError::truncated(0, EI_NIDENT as u64, ident.len() as u64));
        }

        if ident[0..4] != ELF_MAGIC {
            return Err(ParseError::InvalidMagic {
                expected: u32::from_be_bytes(ELF_MAGIC),
                actual: u32::from_be_bytes([ident[0], ident[1], ident[2], ident[3]]),
            });
        }

        let byte_order = match ident[EI_DATA] {
            ELFDATA2LSB => ByteOrder::Little,
            ELFDATA2MSB => ByteOrder::Big,
            other => return Err(ParseError::UnsupportedEncoding(other)),
        };

        let class = match ident[EI_CLASS] {
            ELFCLASS32 => ElfClass::Elf32,
            ELFCLASS64 => ElfClass::Elf64,
            other => return Err(ParseError::UnsupportedClass(other)),
        };

        Ok(Self { class, byte_order })
    }
}

/// Read the identification block at the start of `reader`
pub fn detect_format<R: Read + Seek>(reader: &mut R) -> ParseResult<ElfFormat> {
    let ident = read_at(reader, 0, EI_NIDENT as u64)?;
    let format = ElfFormat::from_ident(&ident)?;
    debug!("Detected {} {} image", format.class, format.byte_order);
    Ok(format)
}

/// Read the fixed-size ELF header at offset 0
pub fn read_header<H: ElfHeader, R: Read + Seek>(
    reader: &mut R,
    little_endian: bool,
) -> ParseResult<H> {
    let raw = read_at(reader, 0, H::SIZE as u64)?;
    H::decode(&raw, little_endian)
}

/// Read the `e_phnum` entries of the program header table
pub fn read_program_headers<H: ElfHeader, R: Read + Seek>(
    reader: &mut R,
    header: &H,
    little_endian: bool,
) -> ParseResult<Vec<H::ProgramHeader>> {
    let phoff = header.phoff();
    let phnum = header.phnum() as usize;
    let entry_size = header.phdr_size();

    let mut phdrs = Vec::with_capacity(phnum);
    for index in 0..phnum {
        let offset = (index as u64)
            .checked_mul(entry_size as u64)
            .and_then(|rel| rel.checked_add(phoff))
            .ok_or_else(|| {
                ParseError::invalid_header(format!("program header {index} offset overflows"))
            })?;
        let raw = read_at(reader, offset, entry_size as u64)?;
        phdrs.push(<H::ProgramHeader as ProgramHeader>::decode(&raw, little_endian)?);
    }

    Ok(phdrs)
}

/// ELF32 header
#[derive(Debug, Clone)]
pub struct Elf32Header {
    raw: [u8; 52],
    e_machine: u16,
    e_entry: u32,
    e_phoff: u32,
    e_phentsize: u16,
    e_phnum: u16,
}

impl ElfHeader for Elf32Header {
    type ProgramHeader = Elf32ProgramHeader;

    const CLASS: ElfClass = ElfClass::Elf32;
    const SIZE: usize = 52;

    fn decode(raw: &[u8], little_endian: bool) -> ParseResult<Self> {
        let raw: [u8; 52] = fixed(raw, "ELF32 header")?;
        let reader = RecordReader::new(&raw, little_endian);

        Ok(Self {
            e_machine: reader.u16_at(18),
            e_entry: reader.u32_at(24),
            e_phoff: reader.u32_at(28),
            e_phentsize: reader.u16_at(42),
            e_phnum: reader.u16_at(44),
            raw,
        })
    }

    fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn machine(&self) -> u16 {
        self.e_machine
    }

    fn entry(&self) -> Address {
        Address::from(self.e_entry)
    }

    fn phoff(&self) -> u64 {
        self.e_phoff as u64
    }

    fn phnum(&self) -> u16 {
        self.e_phnum
    }

    fn phentsize(&self) -> u16 {
        self.e_phentsize
    }
}

/// ELF64 header
#[derive(Debug, Clone)]
pub struct Elf64Header {
    raw: [u8; 64],
    e_machine: u16,
    e_entry: u64,
    e_phoff: u64,
    e_phentsize: u16,
    e_phnum: u16,
}

impl ElfHeader for Elf64Header {
    type ProgramHeader = Elf64ProgramHeader;

    const CLASS: ElfClass = ElfClass::Elf64;
    const SIZE: usize = 64;

    fn decode(raw: &[u8], little_endian: bool) -> ParseResult<Self> {
        let raw: [u8; 64] = fixed(raw, "ELF64 header")?;
        let reader = RecordReader::new(&raw, little_endian);

        Ok(Self {
            e_machine: reader.u16_at(18),
            e_entry: reader.u64_at(24),
            e_phoff: reader.u64_at(32),
            e_phentsize: reader.u16_at(54),
            e_phnum: reader.u16_at(56),
            raw,
        })
    }

    fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn machine(&self) -> u16 {
        self.e_machine
    }

    fn entry(&self) -> Address {
        Address::new(self.e_entry)
    }

    fn phoff(&self) -> u64 {
        self.e_phoff
    }

    fn phnum(&self) -> u16 {
        self.e_phnum
    }

    fn phentsize(&self) -> u16 {
        self.e_phentsize
    }
}

/// ELF32 program header
#[derive(Debug, Clone)]
pub struct Elf32ProgramHeader {
    raw: [u8; 32],
    p_type: u32,
    p_offset: u32,
    p_vaddr: u32,
    p_filesz: u32,
    p_memsz: u32,
    p_flags: u32,
}

impl ProgramHeader for Elf32ProgramHeader {
    const SIZE: usize = 32;

    fn decode(raw: &[u8], little_endian: bool) -> ParseResult<Self> {
        let raw: [u8; 32] = fixed(raw, "ELF32 program header")?;
        let reader = RecordReader::new(&raw, little_endian);

        Ok(Self {
            p_type: reader.u32_at(0),
            p_offset: reader.u32_at(4),
            p_vaddr: reader.u32_at(8),
            p_filesz: reader.u32_at(16),
            p_memsz: reader.u32_at(20),
            p_flags: reader.u32_at(24),
            raw,
        })
    }

    fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn p_type(&self) -> u32 {
        self.p_type
    }

    fn offset(&self) -> u64 {
        self.p_offset as u64
    }

    fn vaddr(&self) -> Address {
        Address::from(self.p_vaddr)
    }

    fn filesz(&self) -> u64 {
        self.p_filesz as u64
    }

    fn memsz(&self) -> u64 {
        self.p_memsz as u64
    }

    fn flags(&self) -> u32 {
        self.p_flags
    }
}

/// ELF64 program header
#[derive(Debug, Clone)]
pub struct Elf64ProgramHeader {
    raw: [u8; 56],
    p_type: u32,
    p_flags: u32,
    p_offset: u64,
    p_vaddr: u64,
    p_filesz: u64,
    p_memsz: u64,
}

impl ProgramHeader for Elf64ProgramHeader {
    const SIZE: usize = 56;

    fn decode(raw: &[u8], little_endian: bool) -> ParseResult<Self> {
        let raw: [u8; 56] = fixed(raw, "ELF64 program header")?;
        let reader = RecordReader::new(&raw, little_endian);

        Ok(Self {
            p_type: reader.u32_at(0),
            p_flags: reader.u32_at(4),
            p_offset: reader.u64_at(8),
            p_vaddr: reader.u64_at(16),
            p_filesz: reader.u64_at(32),
            p_memsz: reader.u64_at(40),
            raw,
        })
    }

    fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn p_type(&self) -> u32 {
        self.p_type
    }

    fn offset(&self) -> u64 {
        self.p_offset
    }

    fn vaddr(&self) -> Address {
        Address::new(self.p_vaddr)
    }

    fn filesz(&self) -> u64 {
        self.p_filesz
    }

    fn memsz(&self) -> u64 {
        self.p_memsz
    }

    fn flags(&self) -> u32 {
        self.p_flags
    }
}

/// ELF header and program header table of one image
#[derive(Debug, Clone)]
pub struct ElfImage<H: ElfHeader> {
    pub format: ElfFormat,
    pub header: H,
    pub program_headers: Vec<H::ProgramHeader>,
}

impl<H: ElfHeader> ElfImage<H> {
    /// Read the header and program header table from `reader`
    pub fn read<R: Read + Seek>(reader: &mut R, format: ElfFormat) -> ParseResult<Self> {
        if format.class != H::CLASS {
            return Err(ParseError::invalid_header(format!(
                "{} image read with {} records",
                format.class,
                H::CLASS
            )));
        }

        let little_endian = format.is_little_endian();
        let header: H = read_header(reader, little_endian)?;

        let entry_size = header.phdr_size();
        if header.phnum() > 0 && header.phentsize() as usize != entry_size {
            warn!(
                "e_phentsize is {} but {} program headers are {} bytes; using {}",
                header.phentsize(),
                H::CLASS,
                entry_size,
                entry_size
            );
        }

        let program_headers = read_program_headers(reader, &header, little_endian)?;
        debug!(
            "Read {} program headers at {:#x}",
            program_headers.len(),
            header.phoff()
        );

        Ok(Self {
            format,
            header,
            program_headers,
        })
    }

    /// Raw program header entries, concatenated in table order
    pub fn phdr_table_bytes(&self) -> Vec<u8> {
        self.program_headers
            .iter()
            .flat_map(|phdr| phdr.raw().iter().copied())
            .collect()
    }

    /// Write the header and program header table verbatim at their offsets
    pub fn write_headers<W: Write + Seek>(&self, writer: &mut W) -> std::io::Result<()> {
        write_header_and_phdrs(
            writer,
            self.header.raw(),
            self.header.phoff(),
            &self.phdr_table_bytes(),
            self.header.phdr_size(),
        )
    }

    /// End of the header and program header region
    pub fn headers_end(&self) -> u64 {
        let table_end =
            self.header.phoff() + (self.program_headers.len() * self.header.phdr_size()) as u64;
        table_end.max(H::SIZE as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
        buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn elf32_header(little_endian: bool, phoff: u32, phnum: u16) -> Vec<u8> {
        let mut h = vec![0u8; 52];
        put(&mut h, 0, &ELF_MAGIC);
        h[EI_CLASS] = ELFCLASS32;
        h[EI_DATA] = if little_endian { ELFDATA2LSB } else { ELFDATA2MSB };
        h[6] = 1;
        let (m, e, p, s, n) = if little_endian {
            (
                EM_QDSP6.to_le_bytes(),
                0x8C00_0000u32.to_le_bytes(),
                phoff.to_le_bytes(),
                32u16.to_le_bytes(),
                phnum.to_le_bytes(),
            )
        } else {
            (
                EM_QDSP6.to_be_bytes(),
                0x8C00_0000u32.to_be_bytes(),
                phoff.to_be_bytes(),
                32u16.to_be_bytes(),
                phnum.to_be_bytes(),
            )
        };
        put(&mut h, 18, &m);
        put(&mut h, 24, &e);
        put(&mut h, 28, &p);
        put(&mut h, 42, &s);
        put(&mut h, 44, &n);
        h
    }

    fn elf32_phdr(little_endian: bool, offset: u32, filesz: u32, flags: u32) -> Vec<u8> {
        let enc = |v: u32| if little_endian { v.to_le_bytes() } else { v.to_be_bytes() };
        let mut p = vec![0u8; 32];
        put(&mut p, 0, &enc(PT_LOAD));
        put(&mut p, 4, &enc(offset));
        put(&mut p, 8, &enc(0x8C00_0000 + offset));
        put(&mut p, 16, &enc(filesz));
        put(&mut p, 20, &enc(filesz));
        put(&mut p, 24, &enc(flags));
        p
    }

    fn elf32_image(little_endian: bool) -> Vec<u8> {
        let mut image = elf32_header(little_endian, 52, 2);
        image.extend(elf32_phdr(little_endian, 0x1000, 0x200, 0x0200_0000));
        image.extend(elf32_phdr(little_endian, 0x2000, 0x100, 0x5));
        image
    }

    #[test]
    fn test_detect_format() {
        let mut cursor = Cursor::new(elf32_image(true));
        let format = detect_format(&mut cursor).unwrap();
        assert_eq!(format.class, ElfClass::Elf32);
        assert!(format.is_little_endian());

        let mut cursor = Cursor::new(elf32_image(false));
        let format = detect_format(&mut cursor).unwrap();
        assert_eq!(format.byte_order, ByteOrder::Big);
    }

    #[test]
    fn test_detect_rejects_bad_ident() {
        let mut bad_magic = elf32_image(true);
        bad_magic[1] = b'X';
        assert!(matches!(
            ElfFormat::from_ident(&bad_magic),
            Err(ParseError::InvalidMagic { expected: 0x7F45_4C46, .. })
        ));

        let mut bad_data = elf32_image(true);
        bad_data[EI_DATA] = 3;
        assert!(matches!(
            ElfFormat::from_ident(&bad_data),
            Err(ParseError::UnsupportedEncoding(3))
        ));

        let mut bad_class = elf32_image(true);
        bad_class[EI_CLASS] = 0;
        assert!(matches!(
            ElfFormat::from_ident(&bad_class),
            Err(ParseError::UnsupportedClass(0))
        ));

        let mut short = Cursor::new(ELF_MAGIC.to_vec());
        assert!(matches!(
            detect_format(&mut short),
            Err(ParseError::TruncatedData { expected: 16, actual: 4, .. })
        ));
    }

    #[test]
    fn test_both_byte_orders_decode_same_values() {
        for little_endian in [true, false] {
            let mut cursor = Cursor::new(elf32_image(little_endian));
            let format = detect_format(&mut cursor).unwrap();
            let image = ElfImage::<Elf32Header>::read(&mut cursor, format).unwrap();

            assert_eq!(image.header.phoff(), 52);
            assert_eq!(image.header.phnum(), 2);
            assert_eq!(image.header.phentsize(), 32);
            assert_eq!(image.header.machine(), EM_QDSP6);
            assert_eq!(image.header.entry(), Address::new(0x8C00_0000));

            let phdrs = &image.program_headers;
            assert_eq!(phdrs[0].offset(), 0x1000);
            assert_eq!(phdrs[0].filesz(), 0x200);
            assert_eq!(phdrs[0].flags(), 0x0200_0000);
            assert_eq!(phdrs[0].kind(), pil_core::SegmentKind::Hash);
            assert_eq!(phdrs[1].offset(), 0x2000);
            assert_eq!(phdrs[1].filesz(), 0x100);
            assert_eq!(phdrs[1].p_type(), PT_LOAD);
            assert_eq!(phdrs[1].vaddr(), Address::new(0x8C00_2000));
            assert_eq!(phdrs[1].kind(), pil_core::SegmentKind::Regular);
        }
    }

    #[test]
    fn test_truncated_program_header_table() {
        let mut bytes = elf32_image(true);
        bytes.truncate(52 + 32 + 10);
        let mut cursor = Cursor::new(bytes);
        let format = detect_format(&mut cursor).unwrap();

        match ElfImage::<Elf32Header>::read(&mut cursor, format) {
            Err(ParseError::TruncatedData {
                offset,
                expected,
                actual,
            }) => assert_eq!((offset, expected, actual), (84, 32, 10)),
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn test_class_mismatch_is_rejected() {
        let mut cursor = Cursor::new(elf32_image(true));
        let format = detect_format(&mut cursor).unwrap();
        assert!(matches!(
            ElfImage::<Elf64Header>::read(&mut cursor, format),
            Err(ParseError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_headers_are_rewritten_verbatim() {
        let original = elf32_image(false);
        let mut cursor = Cursor::new(original.clone());
        let format = detect_format(&mut cursor).unwrap();
        let image = ElfImage::<Elf32Header>::read(&mut cursor, format).unwrap();

        let mut out = Cursor::new(Vec::new());
        image.write_headers(&mut out).unwrap();
        assert_eq!(out.into_inner(), original);
        assert_eq!(image.headers_end(), 116);
    }

    #[test]
    fn test_elf64_records() {
        let mut h = vec![0u8; 64];
        put(&mut h, 0, &ELF_MAGIC);
        h[EI_CLASS] = ELFCLASS64;
        h[EI_DATA] = ELFDATA2MSB;
        put(&mut h, 18, &EM_AARCH64.to_be_bytes());
        put(&mut h, 24, &0xFFFF_0000_8000_0000u64.to_be_bytes());
        put(&mut h, 32, &64u64.to_be_bytes());
        put(&mut h, 54, &56u16.to_be_bytes());
        put(&mut h, 56, &1u16.to_be_bytes());

        let mut p = vec![0u8; 56];
        put(&mut p, 0, &PT_LOAD.to_be_bytes());
        put(&mut p, 4, &0x0200_0006u32.to_be_bytes());
        put(&mut p, 8, &0x1_0000_0000u64.to_be_bytes());
        put(&mut p, 32, &0x40u64.to_be_bytes());
        h.extend(p);

        let mut cursor = Cursor::new(h);
        let format = detect_format(&mut cursor).unwrap();
        assert_eq!(format.class, ElfClass::Elf64);
        let image = ElfImage::<Elf64Header>::read(&mut cursor, format).unwrap();

        assert_eq!(image.header.entry(), Address::new(0xFFFF_0000_8000_0000));
        assert_eq!(image.header.phentsize(), 56);
        let phdr = &image.program_headers[0];
        assert_eq!(phdr.offset(), 0x1_0000_0000);
        assert_eq!(phdr.filesz(), 0x40);
        assert_eq!(phdr.flags(), 0x0200_0006);
        assert_eq!(image.headers_end(), 120);
    }

    #[test]
    fn test_names() {
        assert_eq!(segment_type_name(PT_NULL), "NULL");
        assert_eq!(segment_type_name(0x7000_0000), "0x70000000");
        assert_eq!(machine_name(EM_QDSP6), "Hexagon");
    }
}
