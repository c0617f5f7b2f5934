//! Rebuild a combined image from `.mdt` and `.bNN` files

use crate::naming::{require_mdt_path, segment_file};
use pil_binary_parser::{
    detect_format, read_at, write_at, Elf32Header, Elf64Header, ElfFormat, ElfHeader, ElfImage,
    ProgramHeader,
};
use pil_core::{Config, ElfClass, Error, Result, SegmentKind};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Squash `mdt_path` and its sibling segment files into `mbn_path`
pub fn squash(mdt_path: &Path, mbn_path: &Path) -> Result<()> {
    squash_with_config(mdt_path, mbn_path, &Config::default())
}

/// Squash with an explicit naming configuration
pub fn squash_with_config(mdt_path: &Path, mbn_path: &Path, config: &Config) -> Result<()> {
    require_mdt_path(mdt_path, config)?;

    let mut mdt = File::open(mdt_path).map_err(|e| Error::io(mdt_path, e))?;
    let format = detect_format(&mut mdt).map_err(|e| e.into_error(mdt_path))?;

    info!(
        "Squashing {} ({} {}) into {}",
        mdt_path.display(),
        format.class,
        format.byte_order,
        mbn_path.display()
    );

    match format.class {
        ElfClass::Elf32 => squash_image::<Elf32Header>(&mut mdt, mdt_path, mbn_path, format, config),
        ElfClass::Elf64 => squash_image::<Elf64Header>(&mut mdt, mdt_path, mbn_path, format, config),
    }
}

fn squash_image<H: ElfHeader>(
    mdt: &mut File,
    mdt_path: &Path,
    mbn_path: &Path,
    format: ElfFormat,
    config: &Config,
) -> Result<()> {
    let image = ElfImage::<H>::read(mdt, format).map_err(|e| e.into_error(mdt_path))?;

    // Fail before the output exists if a segment file is missing
    for (index, phdr) in image.program_headers.iter().enumerate() {
        if phdr.kind() == SegmentKind::Regular {
            open_segment_file(&segment_file(mdt_path, index, config))?;
        }
    }

    let mut mbn = File::create(mbn_path).map_err(|e| Error::io(mbn_path, e))?;
    image
        .write_headers(&mut mbn)
        .map_err(|e| Error::io(mbn_path, e))?;

    // Hash segments follow each other in the .mdt starting at the size of
    // the first segment
    let mut hash_offset = image
        .program_headers
        .first()
        .map_or(0, |phdr| phdr.filesz());

    for (index, phdr) in image.program_headers.iter().enumerate() {
        let segment = match phdr.kind() {
            SegmentKind::Empty => {
                debug!("Segment {index}: empty, skipped");
                continue;
            }
            SegmentKind::Hash => {
                let segment = read_at(mdt, hash_offset, phdr.filesz())
                    .map_err(|e| e.into_error(mdt_path))?;
                debug!(
                    "Segment {index}: {} hash bytes from {} at {:#x}",
                    segment.len(),
                    mdt_path.display(),
                    hash_offset
                );
                hash_offset += phdr.filesz();
                segment
            }
            SegmentKind::Regular => {
                let path = segment_file(mdt_path, index, config);
                let mut file = open_segment_file(&path)?;
                let segment =
                    read_at(&mut file, 0, phdr.filesz()).map_err(|e| e.into_error(&path))?;
                debug!(
                    "Segment {index}: {} bytes from {}",
                    segment.len(),
                    path.display()
                );
                segment
            }
        };

        write_at(&mut mbn, phdr.offset(), &segment).map_err(|e| Error::io(mbn_path, e))?;
    }

    info!(
        "Squashed {} program headers into {}",
        image.program_headers.len(),
        mbn_path.display()
    );
    Ok(())
}

fn open_segment_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::missing_segment(path, e))
}
