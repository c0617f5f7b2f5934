//! Layout report for combined and split images

use crate::naming::segment_file;
use pil_binary_parser::elf::{machine_name, segment_type_name};
use pil_binary_parser::{
    detect_format, Elf32Header, Elf64Header, ElfFormat, ElfHeader, ElfImage, PermissionFlags,
    ProgramHeader,
};
use pil_core::{Address, ByteOrder, Config, ElfClass, Error, Result, SegmentKind};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header summary and program header table of one image
#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub path: PathBuf,
    pub class: ElfClass,
    pub byte_order: ByteOrder,
    pub machine: String,
    pub entry: Address,
    pub phoff: u64,
    pub phnum: u16,
    /// Where squashing looks for the first hash segment inside the `.mdt`
    pub hash_stream_offset: Option<u64>,
    pub segments: Vec<SegmentReport>,
}

/// One program header and its place in the split representation
#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    pub index: usize,
    #[serde(rename = "type")]
    pub p_type: String,
    pub offset: u64,
    pub vaddr: Address,
    pub filesz: u64,
    pub memsz: u64,
    pub flags: u32,
    pub permissions: String,
    pub kind: SegmentKind,
    /// File holding the segment bytes once split
    pub stored_in: Option<String>,
}

/// Read the headers of `path` (a `.mbn` or a `.mdt`) and describe them
pub fn inspect(path: &Path, config: &Config) -> Result<ImageReport> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let format = detect_format(&mut file).map_err(|e| e.into_error(path))?;

    match format.class {
        ElfClass::Elf32 => build_report::<Elf32Header>(&mut file, path, format, config),
        ElfClass::Elf64 => build_report::<Elf64Header>(&mut file, path, format, config),
    }
}

fn build_report<H: ElfHeader>(
    file: &mut File,
    path: &Path,
    format: ElfFormat,
    config: &Config,
) -> Result<ImageReport> {
    let image = ElfImage::<H>::read(file, format).map_err(|e| e.into_error(path))?;

    let mdt_path = if config.is_mdt_path(path) {
        path.to_path_buf()
    } else {
        path.with_extension(&config.mdt_extension)
    };
    let file_name = |p: &Path| {
        p.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let segments = image
        .program_headers
        .iter()
        .enumerate()
        .map(|(index, phdr)| {
            let kind = phdr.kind();
            let stored_in = match kind {
                SegmentKind::Empty => None,
                SegmentKind::Hash => Some(file_name(&mdt_path)),
                SegmentKind::Regular => Some(file_name(&segment_file(&mdt_path, index, config))),
            };

            SegmentReport {
                index,
                p_type: segment_type_name(phdr.p_type()),
                offset: phdr.offset(),
                vaddr: phdr.vaddr(),
                filesz: phdr.filesz(),
                memsz: phdr.memsz(),
                flags: phdr.flags(),
                permissions: PermissionFlags::from_p_flags(phdr.flags()).to_string(),
                kind,
                stored_in,
            }
        })
        .collect();

    Ok(ImageReport {
        path: path.to_path_buf(),
        class: format.class,
        byte_order: format.byte_order,
        machine: machine_name(image.header.machine()),
        entry: image.header.entry(),
        phoff: image.header.phoff(),
        phnum: image.header.phnum(),
        hash_stream_offset: image.program_headers.first().map(|phdr| phdr.filesz()),
        segments,
    })
}

impl ImageReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human readable table
    pub fn write_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "File:       {}", self.path.display())?;
        writeln!(out, "Format:     {} {}", self.class, self.byte_order)?;
        writeln!(out, "Machine:    {}", self.machine)?;
        writeln!(out, "Entry:      {}", self.entry)?;
        writeln!(
            out,
            "Phdrs:      {} at {:#x}",
            self.phnum, self.phoff
        )?;
        if let Some(offset) = self.hash_stream_offset {
            writeln!(out, "Hash start: {offset:#x}")?;
        }
        writeln!(out)?;
        writeln!(
            out,
            "{:>3}  {:<8} {:>10} {:>18} {:>10} {:>10} {:>10} {:<3}  {:<7}  {}",
            "Idx", "Type", "Offset", "VirtAddr", "FileSiz", "MemSiz", "Flags", "Prm", "Kind", "File"
        )?;
        for seg in &self.segments {
            writeln!(
                out,
                "{:>3}  {:<8} {:>#10x} {:>18} {:>#10x} {:>#10x} {:>#10x} {:<3}  {:<7}  {}",
                seg.index,
                seg.p_type,
                seg.offset,
                seg.vaddr.to_string(),
                seg.filesz,
                seg.memsz,
                seg.flags,
                seg.permissions,
                seg.kind.to_string(),
                seg.stored_in.as_deref().unwrap_or("-")
            )?;
        }
        Ok(())
    }
}
