//! Minimal 1-bit grayscale PNG writer for QR symbols.
//!
//! The output holds exactly three chunks: `IHDR`, one `IDAT` and `IEND`.
//! Rows are filtered with "none" when they start a run of identical rows and
//! "up" for every repeat, so a module row costs one real scanline.

use miniz_oxide::deflate::compress_to_vec;
use tracing::debug;

use crate::error::EncodeError;
use crate::qrcode::QrCode;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// The complete, constant `IEND` chunk.
pub const IEND_CHUNK: [u8; 12] = [0, 0, 0, 0, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82];

pub const MIN_MODULE_SIZE: u32 = 1;
pub const MAX_MODULE_SIZE: u32 = 100;
pub const MAX_QUIET_ZONE: u32 = 400;

const ZLIB_HEADER: [u8; 2] = [0x78, 0x9c];
const DEFLATE_LEVEL: u8 = 6;

const FILTER_NONE: u8 = 0;
const FILTER_UP: u8 = 2;

/// Pixel geometry of the rendered image.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PngOptions {
    module_size: u32,
    quiet_zone: u32,
}

impl Default for PngOptions {
    fn default() -> Self {
        Self {
            module_size: 2,
            quiet_zone: 8,
        }
    }
}

impl PngOptions {
    /// `module_size` is in 1..=100 pixels; `quiet_zone` is in pixels and
    /// must span at least four modules and at most 400 pixels.
    pub fn new(module_size: u32, quiet_zone: u32) -> Result<Self, EncodeError> {
        if !(MIN_MODULE_SIZE..=MAX_MODULE_SIZE).contains(&module_size) {
            return Err(EncodeError::invalid(format!(
                "module size {} out of range {}..={}",
                module_size, MIN_MODULE_SIZE, MAX_MODULE_SIZE
            )));
        }
        if !(module_size * 4..=MAX_QUIET_ZONE).contains(&quiet_zone) {
            return Err(EncodeError::invalid(format!(
                "quiet zone {} out of range {}..={}",
                quiet_zone,
                module_size * 4,
                MAX_QUIET_ZONE
            )));
        }
        Ok(Self {
            module_size,
            quiet_zone,
        })
    }

    /// Changes the module size, widening the quiet zone to four modules if
    /// it is currently narrower.
    pub fn with_module_size(self, module_size: u32) -> Result<Self, EncodeError> {
        let quiet_zone = self.quiet_zone.max(module_size.saturating_mul(4));
        Self::new(module_size, quiet_zone)
    }

    pub fn module_size(&self) -> u32 {
        self.module_size
    }

    pub fn quiet_zone(&self) -> u32 {
        self.quiet_zone
    }

    /// Width and height in pixels for a symbol of `modules` per side.
    pub fn image_side(&self, modules: usize) -> u32 {
        2 * self.quiet_zone + modules as u32 * self.module_size
    }
}

/// Lookup table for the reflected CRC-32 polynomial used by PNG.
const CRC_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { 0xedb8_8320 ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
};

fn crc32_update(crc: u32, bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(crc, |c, &b| CRC_TABLE[((c ^ u32::from(b)) & 0xff) as usize] ^ (c >> 8))
}

/// CRC-32 as used by PNG chunks.
pub fn crc32(bytes: &[u8]) -> u32 {
    crc32_update(0xffff_ffff, bytes) ^ 0xffff_ffff
}

/// Adler-32 as used by the zlib trailer.
pub fn adler32(bytes: &[u8]) -> u32 {
    const MOD_ADLER: u32 = 65521;
    // largest block that cannot overflow u32 before reduction
    const NMAX: usize = 5552;
    let (mut a, mut b) = (1u32, 0u32);
    for block in bytes.chunks(NMAX) {
        for &byte in block {
            a += u32::from(byte);
            b += a;
        }
        a %= MOD_ADLER;
        b %= MOD_ADLER;
    }
    (b << 16) | a
}

/// Appends one chunk: length, tag, data and the CRC of tag plus data.
fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(data);
    let crc = crc32_update(crc32_update(0xffff_ffff, tag), data) ^ 0xffff_ffff;
    out.extend_from_slice(&crc.to_be_bytes());
}

/// Filtered scanlines of the whole image, ready for deflate.
///
/// Each scanline is a filter byte followed by the packed pixels, MSB first,
/// black as 0. Bits past the right edge are white.
pub(crate) fn raster(qr: &QrCode, options: &PngOptions) -> Vec<u8> {
    let side = options.image_side(qr.size() as usize) as usize;
    let stride = side.div_ceil(8);
    let modulesize = options.module_size as usize;
    let border = options.quiet_zone as usize;
    let mut raw: Vec<u8> = Vec::with_capacity((stride + 1) * side);

    let blank = vec![0xffu8; stride];
    push_run(&mut raw, &blank, border);
    for y in 0..qr.size() {
        let mut line = blank.clone();
        for x in (0..qr.size()).filter(|&x| qr.get_module(x, y)) {
            let left = border + x as usize * modulesize;
            for p in left..left + modulesize {
                line[p / 8] &= !(0x80 >> (p % 8));
            }
        }
        push_run(&mut raw, &line, modulesize);
    }
    push_run(&mut raw, &blank, border);
    debug_assert_eq!(raw.len(), (stride + 1) * side);
    raw
}

/// One unfiltered scanline, then `count - 1` "up" rows of zeros.
fn push_run(raw: &mut Vec<u8>, line: &[u8], count: usize) {
    if count == 0 {
        return;
    }
    raw.push(FILTER_NONE);
    raw.extend_from_slice(line);
    for _ in 1..count {
        raw.push(FILTER_UP);
        raw.resize(raw.len() + line.len(), 0);
    }
}

/// Renders `qr` as a complete PNG byte stream.
pub fn encode_png(qr: &QrCode, options: &PngOptions) -> Vec<u8> {
    let side = options.image_side(qr.size() as usize);
    let raw = raster(qr, options);

    let deflated = compress_to_vec(&raw, DEFLATE_LEVEL);
    let mut zlib: Vec<u8> = Vec::with_capacity(deflated.len() + 6);
    zlib.extend_from_slice(&ZLIB_HEADER);
    zlib.extend_from_slice(&deflated);
    zlib.extend_from_slice(&adler32(&raw).to_be_bytes());

    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&side.to_be_bytes());
    ihdr[4..8].copy_from_slice(&side.to_be_bytes());
    ihdr[8] = 1; // bit depth
    // color type, compression, filter and interlace are all 0

    let mut out: Vec<u8> = Vec::with_capacity(PNG_SIGNATURE.len() + 25 + zlib.len() + 12 + IEND_CHUNK.len());
    out.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr);
    write_chunk(&mut out, b"IDAT", &zlib);
    out.extend_from_slice(&IEND_CHUNK);

    debug!(side, raw = raw.len(), idat = zlib.len(), total = out.len(), "png encoded");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qrcode::QrCodeEcc;

    fn chunks(png: &[u8]) -> Vec<([u8; 4], &[u8], u32)> {
        let mut rest = &png[8..];
        let mut result = Vec::new();
        while !rest.is_empty() {
            let len = u32::from_be_bytes(rest[0..4].try_into().unwrap()) as usize;
            let tag: [u8; 4] = rest[4..8].try_into().unwrap();
            let data = &rest[8..8 + len];
            let crc = u32::from_be_bytes(rest[8 + len..12 + len].try_into().unwrap());
            result.push((tag, data, crc));
            rest = &rest[12 + len..];
        }
        result
    }

    #[test]
    fn test_checksums() {
        assert_eq!(crc32(b"123456789"), 0xcbf4_3926);
        assert_eq!(crc32(b""), 0);
        assert_eq!(adler32(b"Wikipedia"), 0x11e6_0398);
        assert_eq!(adler32(b""), 1);
        // long input crosses several reduction blocks
        let long = vec![0xffu8; 20_000];
        let (mut a, mut b) = (1u64, 0u64);
        for &x in &long {
            a = (a + u64::from(x)) % 65521;
            b = (b + a) % 65521;
        }
        assert_eq!(adler32(&long), ((b << 16) | a) as u32);
    }

    #[test]
    fn test_iend_constant() {
        let mut out = Vec::new();
        write_chunk(&mut out, b"IEND", &[]);
        assert_eq!(out, IEND_CHUNK);
    }

    #[test]
    fn test_options_validation() {
        assert_eq!(PngOptions::default(), PngOptions::new(2, 8).unwrap());
        assert!(PngOptions::new(0, 8).is_err());
        assert!(PngOptions::new(101, 404).is_err());
        assert!(PngOptions::new(3, 11).is_err());
        assert!(PngOptions::new(3, 12).is_ok());
        assert!(PngOptions::new(1, 401).is_err());
        assert!(PngOptions::new(100, 400).is_ok());
        let options = PngOptions::default().with_module_size(10).unwrap();
        assert_eq!(options.quiet_zone(), 40);
        let options = PngOptions::new(1, 50).unwrap().with_module_size(3).unwrap();
        assert_eq!(options.quiet_zone(), 50);
    }

    #[test]
    fn test_structure_of_hello() {
        let qr = QrCode::encode_text("HELLO", QrCodeEcc::Medium).unwrap();
        let png = encode_png(&qr, &PngOptions::default());
        assert_eq!(png[..8], PNG_SIGNATURE);
        assert_eq!(png[png.len() - 12..], IEND_CHUNK);

        let chunks = chunks(&png);
        let tags: Vec<&[u8; 4]> = chunks.iter().map(|(tag, _, _)| tag).collect();
        assert_eq!(tags, vec![b"IHDR", b"IDAT", b"IEND"]);
        for (tag, data, crc) in &chunks {
            let mut covered = tag.to_vec();
            covered.extend_from_slice(data);
            assert_eq!(crc32(&covered), *crc);
        }

        let ihdr = chunks[0].1;
        assert_eq!(ihdr, &[0, 0, 0, 58, 0, 0, 0, 58, 1, 0, 0, 0, 0]);

        let idat = chunks[1].1;
        assert_eq!(idat[..2], ZLIB_HEADER);
        let inflated = miniz_oxide::inflate::decompress_to_vec_zlib(idat).unwrap();
        assert_eq!(inflated, raster(&qr, &PngOptions::default()));
        let trailer = u32::from_be_bytes(idat[idat.len() - 4..].try_into().unwrap());
        assert_eq!(trailer, adler32(&inflated));
    }

    #[test]
    fn test_raster_rows() {
        let qr = QrCode::encode_text("HELLO", QrCodeEcc::Medium).unwrap();
        let raw = raster(&qr, &PngOptions::default());
        // 58 pixels pack into 8 bytes, plus the filter byte
        let row = |r: usize| &raw[r * 9..(r + 1) * 9];
        assert_eq!(raw.len(), 58 * 9);
        assert_eq!(row(0), &[0, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        for r in 1..8 {
            assert_eq!(row(r), &[2, 0, 0, 0, 0, 0, 0, 0, 0]);
        }
        // first module row: the finder's top edge starts at pixel 8
        assert_eq!(row(8)[0], 0);
        assert_eq!(row(8)[1], 0xff);
        assert_eq!(row(8)[2], 0x00);
        assert_eq!(row(9)[0], 2);
        // padding past pixel 57 stays white
        for r in (8..50).step_by(2) {
            assert_eq!(row(r)[8] & 0x3f, 0x3f);
        }
        assert_eq!(row(50), row(0));
    }
}
