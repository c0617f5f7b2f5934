//! Split a combined image into `.mdt` and `.bNN` files

use crate::naming::{require_mdt_path, segment_file};
use pil_binary_parser::{
    append, detect_format, read_at, Elf32Header, Elf64Header, ElfFormat, ElfHeader, ElfImage,
    ProgramHeader,
};
use pil_core::{Config, ElfClass, Error, Result, SegmentKind};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

/// Split `mbn_path` into `mdt_path` and its sibling segment files
pub fn split(mbn_path: &Path, mdt_path: &Path) -> Result<()> {
    split_with_config(mbn_path, mdt_path, &Config::default())
}

/// Split with an explicit naming configuration
pub fn split_with_config(mbn_path: &Path, mdt_path: &Path, config: &Config) -> Result<()> {
    require_mdt_path(mdt_path, config)?;

    let mut mbn = File::open(mbn_path).map_err(|e| Error::io(mbn_path, e))?;
    let format = detect_format(&mut mbn).map_err(|e| e.into_error(mbn_path))?;

    info!(
        "Splitting {} ({} {}) into {}",
        mbn_path.display(),
        format.class,
        format.byte_order,
        mdt_path.display()
    );

    match format.class {
        ElfClass::Elf32 => split_image::<Elf32Header>(&mut mbn, mbn_path, mdt_path, format, config),
        ElfClass::Elf64 => split_image::<Elf64Header>(&mut mbn, mbn_path, mdt_path, format, config),
    }
}

fn split_image<H: ElfHeader>(
    mbn: &mut File,
    mbn_path: &Path,
    mdt_path: &Path,
    format: ElfFormat,
    config: &Config,
) -> Result<()> {
    let image = ElfImage::<H>::read(mbn, format).map_err(|e| e.into_error(mbn_path))?;
    check_hash_stream_start(&image);

    let mut mdt = File::create(mdt_path).map_err(|e| Error::io(mdt_path, e))?;
    image
        .write_headers(&mut mdt)
        .map_err(|e| Error::io(mdt_path, e))?;

    let mut written = 0usize;
    for (index, phdr) in image.program_headers.iter().enumerate() {
        let kind = phdr.kind();
        if kind == SegmentKind::Empty {
            debug!("Segment {index}: empty, skipped");
            continue;
        }

        let segment =
            read_at(mbn, phdr.offset(), phdr.filesz()).map_err(|e| e.into_error(mbn_path))?;

        if kind == SegmentKind::Hash {
            let at = append(&mut mdt, &segment).map_err(|e| Error::io(mdt_path, e))?;
            debug!(
                "Segment {index}: {} hash bytes from {:#x} appended to {} at {:#x}",
                segment.len(),
                phdr.offset(),
                mdt_path.display(),
                at
            );
            if !config.emit_hash_segment_files {
                continue;
            }
        }

        let path = segment_file(mdt_path, index, config);
        std::fs::write(&path, &segment).map_err(|e| Error::io(&path, e))?;
        debug!(
            "Segment {index}: {} bytes from {:#x} written to {}",
            segment.len(),
            phdr.offset(),
            path.display()
        );
        written += 1;
    }

    info!(
        "Split {} program headers, {} segment files written",
        image.program_headers.len(),
        written
    );
    Ok(())
}

/// Squashing reads the hash stream starting at the size of the first
/// segment, which only lines up when that segment covers the headers
fn check_hash_stream_start<H: ElfHeader>(image: &ElfImage<H>) {
    let has_hash = image
        .program_headers
        .iter()
        .any(|phdr| phdr.kind() == SegmentKind::Hash);

    if let Some(first) = image.program_headers.first() {
        if has_hash && first.filesz() != image.headers_end() {
            warn!(
                "Hash segments will be stored at {:#x} but the first segment is {:#x} bytes; \
                 squashing this .mdt will not find them",
                image.headers_end(),
                first.filesz()
            );
        }
    }
}
