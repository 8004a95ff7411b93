//! Segment classification and version selection.
//!
//! Each input segment gets the densest mode that can represent all of its
//! bytes. [`SymbolPlan`] then picks the smallest version whose data capacity
//! holds every segment at the requested error correction level.

use tracing::debug;

use crate::error::EncodeError;
use crate::qrcode::{QrCodeEcc, Version};
use crate::tables::{self, CHAR_VALUE, NOT_ALPHANUMERIC};

/// Largest ECI assignment value that can be encoded.
pub const MAX_ECI: u32 = 999_999;

/// Mode indicator of an ECI header.
pub(crate) const ECI_MODE_BITS: u32 = 0x7;

/// Encoding mode of a segment. Ordered from densest to most general.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum SegmentMode {
    Numeric,
    Alphanumeric,
    Byte,
}

impl SegmentMode {
    pub(crate) fn mode_bits(self) -> u32 {
        use SegmentMode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
        }
    }

    /// Width of the character count field at the given version.
    pub fn num_char_count_bits(self, ver: Version) -> u8 {
        use SegmentMode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
        })[usize::from((ver.value() + 7) / 17)]
    }

    /// Payload bits for `numchars` characters, headers excluded.
    pub fn payload_bits(self, numchars: usize) -> usize {
        use SegmentMode::*;
        match self {
            Numeric => numchars / 3 * 10 + [0, 4, 7][numchars % 3],
            Alphanumeric => numchars / 2 * 11 + (numchars % 2) * 6,
            Byte => numchars * 8,
        }
    }
}

/// Returns the densest mode able to hold every byte of `data`.
///
/// Digits alone give [`SegmentMode::Numeric`]. Any other member of the
/// alphanumeric charset escalates to [`SegmentMode::Alphanumeric`], and any
/// byte outside it makes the whole segment [`SegmentMode::Byte`].
pub fn classify(data: &[u8]) -> SegmentMode {
    let mut mode = SegmentMode::Numeric;
    for &b in data {
        let value = CHAR_VALUE[usize::from(b)];
        if value == NOT_ALPHANUMERIC {
            return SegmentMode::Byte;
        }
        if value >= 10 {
            mode = SegmentMode::Alphanumeric;
        }
    }
    mode
}

/// A classified input segment. Immutable once built.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DataSegment<'a> {
    mode: SegmentMode,
    data: &'a [u8],
}

impl<'a> DataSegment<'a> {
    /// Classifies `data`. Empty segments are rejected.
    pub fn new(data: &'a [u8]) -> Result<Self, EncodeError> {
        if data.is_empty() {
            return Err(EncodeError::invalid("segment is empty"));
        }
        Ok(Self {
            mode: classify(data),
            data,
        })
    }

    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Character count; one character per input byte in every mode.
    pub fn num_chars(&self) -> usize {
        self.data.len()
    }

    /// Header, count field and payload bits at the given version, or `None`
    /// if the character count overflows the count field.
    pub fn bit_length(&self, ver: Version) -> Option<usize> {
        let ccbits: u8 = self.mode.num_char_count_bits(ver);
        if self.num_chars() >= 1usize << ccbits {
            return None;
        }
        Some(4 + usize::from(ccbits) + self.mode.payload_bits(self.num_chars()))
    }
}

/// Bits taken by an ECI header: mode indicator plus 8, 16 or 24 value bits.
pub fn eci_bit_length(assignval: u32) -> usize {
    4 + if assignval <= 127 {
        8
    } else if assignval <= 16383 {
        16
    } else {
        24
    }
}

/// Total bits of the optional ECI header and every segment at `ver`.
pub fn total_bits(segs: &[DataSegment], eci: Option<u32>, ver: Version) -> Option<usize> {
    let mut result: usize = eci.map_or(0, eci_bit_length);
    for seg in segs {
        result = result.checked_add(seg.bit_length(ver)?)?;
    }
    Some(result)
}

/// Version, error correction level and segments of one symbol.
///
/// Built once per encode; everything downstream reads from it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SymbolPlan<'a> {
    version: Version,
    ecl: QrCodeEcc,
    eci: Option<u32>,
    segments: Vec<DataSegment<'a>>,
    data_bits: usize,
}

impl<'a> SymbolPlan<'a> {
    /// Classifies `segments` and chooses the smallest version that fits.
    pub fn new(
        segments: &[&'a [u8]],
        ecl: QrCodeEcc,
        eci: Option<u32>
    ) -> Result<Self, EncodeError> {
        if segments.is_empty() {
            return Err(EncodeError::invalid("no segments to encode"));
        }
        if let Some(assignval) = eci {
            if assignval > MAX_ECI {
                return Err(
                    EncodeError::invalid(format!("ECI value {} out of range 0..={}", assignval, MAX_ECI))
                );
            }
        }
        let segs: Vec<DataSegment<'a>> = segments
            .iter()
            .map(|&data| DataSegment::new(data))
            .collect::<Result<_, _>>()?;

        // Find the minimal version number to use
        let mut version: Version = Version::MIN;
        let data_bits: usize = loop {
            let datacapacitybits: usize = tables::max_data_codewords(version, ecl) * 8;
            let dataused: Option<usize> = total_bits(&segs, eci, version);
            match dataused {
                Some(n) if n <= datacapacitybits => break n,
                _ if version >= Version::MAX => {
                    return Err(EncodeError::CapacityExceeded {
                        required_bits: dataused.unwrap_or(usize::MAX),
                        capacity_bits: datacapacitybits,
                    });
                }
                _ => version = Version::new(version.value() + 1),
            }
        };

        debug!(
            version = version.value(),
            ?ecl,
            data_bits,
            modes = ?segs.iter().map(|s| s.mode()).collect::<Vec<_>>(),
            "symbol plan"
        );
        Ok(Self {
            version,
            ecl,
            eci,
            segments: segs,
            data_bits,
        })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.ecl
    }

    pub fn eci(&self) -> Option<u32> {
        self.eci
    }

    pub fn segments(&self) -> &[DataSegment<'a>] {
        &self.segments
    }

    /// Bits used by headers and payloads, before terminator and padding.
    pub fn data_bits(&self) -> usize {
        self.data_bits
    }

    pub fn data_codewords(&self) -> usize {
        tables::max_data_codewords(self.version, self.ecl)
    }

    pub fn capacity_bits(&self) -> usize {
        self.data_codewords() * 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(b"1234567890"), SegmentMode::Numeric);
        assert_eq!(classify(b"HELLO WORLD"), SegmentMode::Alphanumeric);
        assert_eq!(classify(b"12:30"), SegmentMode::Alphanumeric);
        assert_eq!(classify(b"Hello World"), SegmentMode::Byte);
        assert_eq!(classify(b"HELLO\n"), SegmentMode::Byte);
        assert_eq!(classify(&[0xc3, 0xa9]), SegmentMode::Byte);
    }

    #[test]
    fn test_payload_bits() {
        assert_eq!(SegmentMode::Numeric.payload_bits(8), 27);
        assert_eq!(SegmentMode::Numeric.payload_bits(1), 4);
        assert_eq!(SegmentMode::Numeric.payload_bits(2), 7);
        assert_eq!(SegmentMode::Alphanumeric.payload_bits(5), 28);
        assert_eq!(SegmentMode::Byte.payload_bits(3), 24);
    }

    #[test]
    fn test_count_field_brackets() {
        let numeric = SegmentMode::Numeric;
        assert_eq!(numeric.num_char_count_bits(Version::new(9)), 10);
        assert_eq!(numeric.num_char_count_bits(Version::new(10)), 12);
        assert_eq!(numeric.num_char_count_bits(Version::new(26)), 12);
        assert_eq!(numeric.num_char_count_bits(Version::new(27)), 14);
        assert_eq!(SegmentMode::Byte.num_char_count_bits(Version::new(40)), 16);
        assert_eq!(SegmentMode::Alphanumeric.num_char_count_bits(Version::new(1)), 9);
    }

    #[test]
    fn test_eci_bit_length() {
        assert_eq!(eci_bit_length(0), 12);
        assert_eq!(eci_bit_length(127), 12);
        assert_eq!(eci_bit_length(128), 20);
        assert_eq!(eci_bit_length(16383), 20);
        assert_eq!(eci_bit_length(16384), 28);
        assert_eq!(eci_bit_length(MAX_ECI), 28);
    }

    #[test]
    fn test_single_digit_fits_version_1() {
        let plan = SymbolPlan::new(&[b"1"], QrCodeEcc::Low, None).unwrap();
        assert_eq!(plan.version(), Version::new(1));
        assert_eq!(plan.data_bits(), 4 + 10 + 4);
        assert_eq!(plan.data_codewords(), 19);
    }

    #[test]
    fn test_hello_is_version_1_medium() {
        let plan = SymbolPlan::new(&[b"HELLO"], QrCodeEcc::Medium, None).unwrap();
        assert_eq!(plan.version(), Version::new(1));
        assert_eq!(plan.segments()[0].mode(), SegmentMode::Alphanumeric);
    }

    #[test]
    fn test_version_grows_with_data() {
        // 1-L holds 17 bytes in byte mode, 18 needs version 2
        let data = [b'a'; 18];
        let plan = SymbolPlan::new(&[&data[..17]], QrCodeEcc::Low, None).unwrap();
        assert_eq!(plan.version(), Version::new(1));
        let plan = SymbolPlan::new(&[&data[..]], QrCodeEcc::Low, None).unwrap();
        assert_eq!(plan.version(), Version::new(2));
    }

    #[test]
    fn test_eci_counts_toward_capacity() {
        let data = [b'a'; 17];
        let plan = SymbolPlan::new(&[&data[..]], QrCodeEcc::Low, Some(26)).unwrap();
        assert_eq!(plan.version(), Version::new(2));
        assert_eq!(plan.data_bits(), 12 + 4 + 8 + 17 * 8);
    }

    #[test]
    fn test_max_byte_payload_at_high() {
        let data = vec![b'a'; 1274];
        let plan = SymbolPlan::new(&[&data[..1273]], QrCodeEcc::High, None).unwrap();
        assert_eq!(plan.version(), Version::MAX);
        match SymbolPlan::new(&[&data[..]], QrCodeEcc::High, None) {
            Err(EncodeError::CapacityExceeded { required_bits, capacity_bits }) => {
                assert_eq!(required_bits, 4 + 16 + 1274 * 8);
                assert_eq!(capacity_bits, 1276 * 8);
            }
            other => panic!("expected capacity error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(matches!(
            SymbolPlan::new(&[], QrCodeEcc::Medium, None),
            Err(EncodeError::InvalidArgument(_))
        ));
        assert!(matches!(
            SymbolPlan::new(&[b"A", b""], QrCodeEcc::Medium, None),
            Err(EncodeError::InvalidArgument(_))
        ));
        assert!(matches!(
            SymbolPlan::new(&[b"A"], QrCodeEcc::Medium, Some(MAX_ECI + 1)),
            Err(EncodeError::InvalidArgument(_))
        ));
    }
}
