//! Synthetic PIL images for integration tests

#![allow(dead_code)]

pub const PT_NULL: u32 = 0;
pub const PT_LOAD: u32 = 1;

/// Vendor flag values: segment type in bits 24-26
pub const FLAGS_PHDR: u32 = 0x0700_0000;
pub const FLAGS_HASH: u32 = 0x0220_0000;
pub const FLAGS_RX: u32 = 0x5;
pub const FLAGS_RW: u32 = 0x6;

pub struct Segment {
    pub p_type: u32,
    pub offset: u64,
    pub filesz: u64,
    pub memsz: u64,
    pub flags: u32,
    /// Bytes placed at `offset`; `None` for the segment covering the headers
    pub data: Option<Vec<u8>>,
}

pub struct ImageBuilder {
    is_64bit: bool,
    little_endian: bool,
    phoff: Option<u64>,
    segments: Vec<Segment>,
}

impl ImageBuilder {
    pub fn new(is_64bit: bool, little_endian: bool) -> Self {
        Self {
            is_64bit,
            little_endian,
            phoff: None,
            segments: Vec::new(),
        }
    }

    pub fn phoff(mut self, phoff: u64) -> Self {
        self.phoff = Some(phoff);
        self
    }

    /// Segment whose file range is the ELF header and program header table
    pub fn header_segment(mut self) -> Self {
        self.segments.push(Segment {
            p_type: PT_NULL,
            offset: 0,
            filesz: 0,
            memsz: 0,
            flags: FLAGS_PHDR,
            data: None,
        });
        self
    }

    pub fn segment(mut self, offset: u64, data: Vec<u8>, flags: u32) -> Self {
        self.segments.push(Segment {
            p_type: PT_LOAD,
            offset,
            filesz: data.len() as u64,
            memsz: data.len() as u64,
            flags,
            data: Some(data),
        });
        self
    }

    pub fn empty_segment(mut self, offset: u64, memsz: u64, flags: u32) -> Self {
        self.segments.push(Segment {
            p_type: PT_LOAD,
            offset,
            filesz: 0,
            memsz,
            flags,
            data: Some(Vec::new()),
        });
        self
    }

    pub fn ehsize(&self) -> u64 {
        if self.is_64bit {
            64
        } else {
            52
        }
    }

    pub fn phentsize(&self) -> u64 {
        if self.is_64bit {
            56
        } else {
            32
        }
    }

    pub fn headers_end(&self) -> u64 {
        self.phoff.unwrap_or(self.ehsize()) + self.segments.len() as u64 * self.phentsize()
    }

    pub fn build(&self) -> Vec<u8> {
        let phoff = self.phoff.unwrap_or(self.ehsize());
        let headers_end = self.headers_end();

        let end = self
            .segments
            .iter()
            .map(|s| s.offset + s.data.as_ref().map_or(0, |d| d.len() as u64))
            .chain(std::iter::once(headers_end))
            .max()
            .unwrap();
        let mut image = vec![0u8; end as usize];

        let header = self.header(phoff);
        image[..header.len()].copy_from_slice(&header);

        for (index, seg) in self.segments.iter().enumerate() {
            let (filesz, memsz) = match seg.data {
                None => (headers_end, headers_end),
                Some(_) => (seg.filesz, seg.memsz),
            };
            let phdr = self.phdr(seg, filesz, memsz);
            let at = (phoff + index as u64 * self.phentsize()) as usize;
            image[at..at + phdr.len()].copy_from_slice(&phdr);
        }

        for seg in &self.segments {
            if let Some(data) = &seg.data {
                let at = seg.offset as usize;
                image[at..at + data.len()].copy_from_slice(data);
            }
        }

        image
    }

    fn u16(&self, v: u16) -> Vec<u8> {
        if self.little_endian {
            v.to_le_bytes().to_vec()
        } else {
            v.to_be_bytes().to_vec()
        }
    }

    fn u32(&self, v: u32) -> Vec<u8> {
        if self.little_endian {
            v.to_le_bytes().to_vec()
        } else {
            v.to_be_bytes().to_vec()
        }
    }

    fn u64(&self, v: u64) -> Vec<u8> {
        if self.little_endian {
            v.to_le_bytes().to_vec()
        } else {
            v.to_be_bytes().to_vec()
        }
    }

    fn word(&self, v: u64) -> Vec<u8> {
        if self.is_64bit {
            self.u64(v)
        } else {
            self.u32(v as u32)
        }
    }

    fn header(&self, phoff: u64) -> Vec<u8> {
        let mut h = vec![0x7f, b'E', b'L', b'F'];
        h.push(if self.is_64bit { 2 } else { 1 });
        h.push(if self.little_endian { 1 } else { 2 });
        h.push(1);
        h.resize(16, 0);
        h.extend(self.u16(2)); // e_type
        h.extend(self.u16(164)); // e_machine
        h.extend(self.u32(1)); // e_version
        h.extend(self.word(0x8C00_0000)); // e_entry
        h.extend(self.word(phoff)); // e_phoff
        h.extend(self.word(0)); // e_shoff
        h.extend(self.u32(0x73)); // e_flags
        h.extend(self.u16(self.ehsize() as u16));
        h.extend(self.u16(self.phentsize() as u16));
        h.extend(self.u16(self.segments.len() as u16));
        h.extend(self.u16(0)); // e_shentsize
        h.extend(self.u16(0)); // e_shnum
        h.extend(self.u16(0)); // e_shstrndx
        assert_eq!(h.len() as u64, self.ehsize());
        h
    }

    fn phdr(&self, seg: &Segment, filesz: u64, memsz: u64) -> Vec<u8> {
        let vaddr = 0x8C00_0000 + seg.offset;
        let mut p = self.u32(seg.p_type);
        if self.is_64bit {
            p.extend(self.u32(seg.flags));
            p.extend(self.u64(seg.offset));
            p.extend(self.u64(vaddr));
            p.extend(self.u64(vaddr));
            p.extend(self.u64(filesz));
            p.extend(self.u64(memsz));
            p.extend(self.u64(0x1000));
        } else {
            p.extend(self.u32(seg.offset as u32));
            p.extend(self.u32(vaddr as u32));
            p.extend(self.u32(vaddr as u32));
            p.extend(self.u32(filesz as u32));
            p.extend(self.u32(memsz as u32));
            p.extend(self.u32(seg.flags));
            p.extend(self.u32(0x1000));
        }
        assert_eq!(p.len() as u64, self.phentsize());
        p
    }
}

/// Deterministic non-zero filler
pub fn pattern(seed: u8, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed) | 1)
        .collect()
}

/// Typical modem image: header segment, hash segment, code, bss, data
pub fn firmware(is_64bit: bool, little_endian: bool) -> ImageBuilder {
    ImageBuilder::new(is_64bit, little_endian)
        .header_segment()
        .segment(0x1000, pattern(0x11, 0x120), FLAGS_HASH)
        .segment(0x2000, pattern(0x22, 0x300), FLAGS_RX)
        .empty_segment(0x3000, 0x1000, FLAGS_RW)
        .segment(0x3000, pattern(0x44, 0x80), FLAGS_RW)
}
