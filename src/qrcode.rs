//! QR code encoding functionality.
//!
//! This module ties the pipeline stages together. It provides the finished [`QrCode`] symbol, the
//! stateful [`QrEncoder`] front end, and the small value types shared by every stage: error
//! correction level, version and mask.

use core::fmt;
use core::str::FromStr;
use std::io::Write;

use image::{ImageBuffer, Luma};
use tracing::debug;

use crate::bitstream;
use crate::ecc;
use crate::error::EncodeError;
use crate::mask;
use crate::matrix::{self, Grid};
use crate::png::{self, PngOptions};
use crate::segment::SymbolPlan;

/// A QR Code symbol, representing a square grid of dark and light modules.
///
/// Instances are immutable after creation.
///
/// # Creation
///
/// - High-level: Use [`QrCode::encode_text`], [`QrCode::encode_binary`] or [`QrEncoder`].
/// - Mid-level: Use [`QrCode::encode_segments`] with several segments and an optional ECI value.
/// - Low-level: Build a [`SymbolPlan`] and pass it to [`QrCode::from_plan`].
///
/// # Example
///
/// ```rust
/// use qrpng::qrcode::{QrCode, QrCodeEcc};
///
/// let qr = QrCode::encode_text("Hello, World!", QrCodeEcc::Low).unwrap();
///
/// println!("Version: {}", qr.version().value());
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QrCode {
    version: Version,
    ecl: QrCodeEcc,
    mask: Mask,
    /// The width and height of this QR Code, measured in modules, between
    /// 21 and 177 (inclusive). This is equal to version * 4 + 17.
    size: usize,
    /// The modules of this QR Code (true = dark), row-major.
    modules: Vec<bool>,
}

impl QrCode {
    /// Encodes a text string into a QR code.
    ///
    /// The whole string becomes one segment; its mode is the densest one that fits every byte.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrpng::qrcode::{QrCode, QrCodeEcc};
    ///
    /// let qr = QrCode::encode_text("HELLO", QrCodeEcc::Medium).unwrap();
    /// assert_eq!(qr.size(), 21);
    /// ```
    pub fn encode_text(text: &str, ecl: QrCodeEcc) -> Result<Self, EncodeError> {
        Self::encode_segments(&[text.as_bytes()], ecl, None)
    }

    /// Encodes binary data into a QR code.
    pub fn encode_binary(data: &[u8], ecl: QrCodeEcc) -> Result<Self, EncodeError> {
        Self::encode_segments(&[data], ecl, None)
    }

    /// Encodes several segments, each classified on its own, behind an optional ECI header.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::InvalidArgument`] for an empty segment list, an empty segment or an
    /// ECI value above 999999, and [`EncodeError::CapacityExceeded`] if a version 40 symbol at
    /// `ecl` cannot hold the data.
    #[tracing::instrument(level = "debug", skip_all, fields(segments = segments.len(), ecl = ?ecl))]
    pub fn encode_segments(
        segments: &[&[u8]],
        ecl: QrCodeEcc,
        eci: Option<u32>
    ) -> Result<Self, EncodeError> {
        let plan = SymbolPlan::new(segments, ecl, eci)?;
        Ok(Self::from_plan(&plan))
    }

    /// Runs every stage after version selection: packing, error correction, placement, masking
    /// and format stamping.
    pub fn from_plan(plan: &SymbolPlan) -> Self {
        let version = plan.version();
        let ecl = plan.error_correction_level();

        let datacodewords: Vec<u8> = bitstream::pack(plan);
        let allcodewords: Vec<u8> = ecc::add_ecc_and_interleave(&datacodewords, version, ecl);

        let funcmods = Grid::with_function_patterns(version);
        let placed = matrix::place_codewords(&funcmods, &allcodewords);
        let choice = mask::select_mask(&placed);
        let grid = matrix::stamp_format_and_version(choice.grid, ecl, choice.mask);

        debug!(
            version = version.value(),
            ?ecl,
            mask = choice.mask.value(),
            score = choice.score,
            "symbol encoded"
        );
        Self::from_grid(&grid, ecl, choice.mask)
    }

    fn from_grid(grid: &Grid, ecl: QrCodeEcc, mask: Mask) -> Self {
        let size = grid.size();
        let modules = (0..size)
            .flat_map(|y| (0..size).map(move |x| (y, x)))
            .map(|(y, x)| grid.is_dark(y, x))
            .collect();
        Self {
            version: grid.version(),
            ecl,
            mask,
            size,
            modules,
        }
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this QR Code's size, in the range [21, 177].
    pub fn size(&self) -> i32 {
        self.size as i32
    }

    /// Returns this QR Code's error correction level.
    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.ecl
    }

    /// Returns this QR Code's mask, in the range [0, 7].
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules. Coordinates outside the QR
    /// code's bounds return `false`.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate (0 is left).
    /// * `y` - Y-coordinate (0 is top).
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size();
        range.contains(&x) && range.contains(&y) && self.modules[(y as usize) * self.size + (x as usize)]
    }

    /// All modules, row-major, `true` for dark.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    /// Serializes this symbol as a 1-bit grayscale PNG.
    pub fn to_png(&self, options: &PngOptions) -> Vec<u8> {
        png::encode_png(self, options)
    }

    /// Writes the PNG stream to `sink` in a single write.
    pub fn write_png<W: Write>(&self, options: &PngOptions, mut sink: W) -> Result<(), EncodeError> {
        sink.write_all(&self.to_png(options))?;
        sink.flush()?;
        Ok(())
    }

    /// Renders the symbol into an in-memory grayscale image with the same geometry as the PNG.
    pub fn to_image_buffer(&self, options: &PngOptions) -> ImageBuffer<Luma<u8>, Vec<u8>> {
        let modulesize = options.module_size();
        let border = options.quiet_zone();
        let side = options.image_side(self.size);
        let mut img = ImageBuffer::new(side, side);

        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let qr_x = (x as i64 - i64::from(border)).div_euclid(i64::from(modulesize));
            let qr_y = (y as i64 - i64::from(border)).div_euclid(i64::from(modulesize));
            *pixel = if self.get_module(qr_x as i32, qr_y as i32) {
                Luma([0u8]) // Black
            } else {
                Luma([255u8]) // White
            };
        }
        img
    }
}

/// Text rendering with a four module border, two characters per module.
impl fmt::Display for QrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border: i32 = 4;
        for y in -border..self.size() + border {
            for x in -border..self.size() + border {
                let c: char = if self.get_module(x, y) { '█' } else { ' ' };
                write!(f, "{0}{0}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Stateful front end that keeps the settings and the last encoded symbol.
///
/// Settings are validated as they are set. The symbol is replaced on every successful encode and
/// cleared on a failed one, so [`QrEncoder::to_png`] never serializes stale data.
///
/// # Example
///
/// ```rust
/// use qrpng::{QrCodeEcc, QrEncoder};
///
/// let mut encoder = QrEncoder::new().error_correction(QrCodeEcc::Quartile).module_size(4).unwrap();
/// encoder.encode_text("https://example.com").unwrap();
/// let png: Vec<u8> = encoder.to_png().unwrap();
/// assert_eq!(&png[1..4], b"PNG");
/// ```
#[derive(Clone, Debug, Default)]
pub struct QrEncoder {
    ecl: QrCodeEcc,
    png: PngOptions,
    eci: Option<u32>,
    quiet_zone_set: bool,
    qr: Option<QrCode>,
}

impl QrEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_correction(mut self, ecl: QrCodeEcc) -> Self {
        self.ecl = ecl;
        self
    }

    /// Sets pixels per module (1 to 100).
    ///
    /// A default quiet zone is raised to four modules if it is narrower. A quiet zone set through
    /// [`QrEncoder::quiet_zone`] is never changed: if it is narrower than four modules of the new
    /// size, this fails with [`EncodeError::InvalidArgument`].
    pub fn module_size(mut self, module_size: u32) -> Result<Self, EncodeError> {
        self.png = if self.quiet_zone_set {
            PngOptions::new(module_size, self.png.quiet_zone())?
        } else {
            self.png.with_module_size(module_size)?
        };
        Ok(self)
    }

    /// Sets the quiet zone in pixels, from four modules of the current module size up to 400.
    ///
    /// The value is kept as given; a later [`QrEncoder::module_size`] that would need a wider
    /// quiet zone fails instead of widening it.
    pub fn quiet_zone(mut self, quiet_zone: u32) -> Result<Self, EncodeError> {
        self.png = PngOptions::new(self.png.module_size(), quiet_zone)?;
        self.quiet_zone_set = true;
        Ok(self)
    }

    /// Sets or clears the ECI assignment value written ahead of the segments.
    pub fn eci(mut self, eci: Option<u32>) -> Result<Self, EncodeError> {
        if let Some(assignval) = eci {
            if assignval > crate::segment::MAX_ECI {
                return Err(EncodeError::invalid(format!("ECI value {} out of range", assignval)));
            }
        }
        self.eci = eci;
        Ok(self)
    }

    pub fn png_options(&self) -> &PngOptions {
        &self.png
    }

    /// Encodes `segments` and keeps the result for later serialization.
    pub fn encode(&mut self, segments: &[&[u8]]) -> Result<&QrCode, EncodeError> {
        self.qr = None;
        let qr = QrCode::encode_segments(segments, self.ecl, self.eci)?;
        Ok(self.qr.insert(qr))
    }

    pub fn encode_bytes(&mut self, data: &[u8]) -> Result<&QrCode, EncodeError> {
        self.encode(&[data])
    }

    pub fn encode_text(&mut self, text: &str) -> Result<&QrCode, EncodeError> {
        self.encode(&[text.as_bytes()])
    }

    /// Encodes each string as its own segment.
    pub fn encode_texts(&mut self, texts: &[&str]) -> Result<&QrCode, EncodeError> {
        let segments: Vec<&[u8]> = texts.iter().map(|t| t.as_bytes()).collect();
        self.encode(&segments)
    }

    /// The last encoded symbol.
    pub fn qr_code(&self) -> Result<&QrCode, EncodeError> {
        self.qr.as_ref().ok_or(EncodeError::PrematureUse)
    }

    pub fn to_png(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(self.qr_code()?.to_png(&self.png))
    }

    pub fn write_png<W: Write>(&self, sink: W) -> Result<(), EncodeError> {
        self.qr_code()?.write_png(&self.png, sink)
    }
}

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    #[default]
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl QrCodeEcc {
    /// Returns an unsigned 2-bit integer (in the range 0 to 3).
    pub(crate) fn ordinal(self) -> usize {
        use QrCodeEcc::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// Returns the 2-bit level indicator used in format information.
    pub(crate) fn format_bits(self) -> u8 {
        use QrCodeEcc::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }
}

/// Parses `l`, `m`, `q` or `h` (either case), or the full level name.
impl FromStr for QrCodeEcc {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use QrCodeEcc::*;
        match s.to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(Low),
            "m" | "medium" => Ok(Medium),
            "q" | "quartile" => Ok(Quartile),
            "h" | "high" => Ok(High),
            _ => Err(EncodeError::invalid(format!("unknown error correction level {:?}", s))),
        }
    }
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40].
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length in modules.
    pub const fn dimension(self) -> usize {
        (self.0 as usize) * 4 + 17
    }
}

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Mask(u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }
}
