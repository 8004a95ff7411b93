//! Constant tables from the QR Code Model 2 standard.
//!
//! Everything here is read-only data. Tables indexed by version carry a
//! placeholder at index 0 so that `table[version]` reads naturally.

use crate::qrcode::{QrCodeEcc, Version};

/// GF(256) discrete logarithm, primitive polynomial x^8 + x^4 + x^3 + x^2 + 1.
/// `LOG_TABLE[0]` is undefined and stored as 0.
pub const LOG_TABLE: [u8; 256] = [
    0, 0, 1, 25, 2, 50, 26, 198, 3, 223, 51, 238, 27, 104, 199, 75,
    4, 100, 224, 14, 52, 141, 239, 129, 28, 193, 105, 248, 200, 8, 76, 113,
    5, 138, 101, 47, 225, 36, 15, 33, 53, 147, 142, 218, 240, 18, 130, 69,
    29, 181, 194, 125, 106, 39, 249, 185, 201, 154, 9, 120, 77, 228, 114, 166,
    6, 191, 139, 98, 102, 221, 48, 253, 226, 152, 37, 179, 16, 145, 34, 136,
    54, 208, 148, 206, 143, 150, 219, 189, 241, 210, 19, 92, 131, 56, 70, 64,
    30, 66, 182, 163, 195, 72, 126, 110, 107, 58, 40, 84, 250, 133, 186, 61,
    202, 94, 155, 159, 10, 21, 121, 43, 78, 212, 229, 172, 115, 243, 167, 87,
    7, 112, 192, 247, 140, 128, 99, 13, 103, 74, 222, 237, 49, 197, 254, 24,
    227, 165, 153, 119, 38, 184, 180, 124, 17, 68, 146, 217, 35, 32, 137, 46,
    55, 63, 209, 91, 149, 188, 207, 205, 144, 135, 151, 178, 220, 252, 190, 97,
    242, 86, 211, 171, 20, 42, 93, 158, 132, 60, 57, 83, 71, 109, 65, 162,
    31, 45, 67, 216, 183, 123, 164, 118, 196, 23, 73, 236, 127, 12, 111, 246,
    108, 161, 59, 82, 41, 157, 85, 170, 251, 96, 134, 177, 187, 204, 62, 90,
    203, 89, 95, 176, 156, 169, 160, 81, 11, 245, 22, 235, 122, 117, 44, 215,
    79, 174, 213, 233, 230, 231, 173, 232, 116, 214, 244, 234, 168, 80, 88, 175,
];

/// GF(256) antilogarithm, `EXP_TABLE[i] = 2^i`. Index 255 wraps back to 1.
pub const EXP_TABLE: [u8; 256] = [
    1, 2, 4, 8, 16, 32, 64, 128, 29, 58, 116, 232, 205, 135, 19, 38,
    76, 152, 45, 90, 180, 117, 234, 201, 143, 3, 6, 12, 24, 48, 96, 192,
    157, 39, 78, 156, 37, 74, 148, 53, 106, 212, 181, 119, 238, 193, 159, 35,
    70, 140, 5, 10, 20, 40, 80, 160, 93, 186, 105, 210, 185, 111, 222, 161,
    95, 190, 97, 194, 153, 47, 94, 188, 101, 202, 137, 15, 30, 60, 120, 240,
    253, 231, 211, 187, 107, 214, 177, 127, 254, 225, 223, 163, 91, 182, 113, 226,
    217, 175, 67, 134, 17, 34, 68, 136, 13, 26, 52, 104, 208, 189, 103, 206,
    129, 31, 62, 124, 248, 237, 199, 147, 59, 118, 236, 197, 151, 51, 102, 204,
    133, 23, 46, 92, 184, 109, 218, 169, 79, 158, 33, 66, 132, 21, 42, 84,
    168, 77, 154, 41, 82, 164, 85, 170, 73, 146, 57, 114, 228, 213, 183, 115,
    230, 209, 191, 99, 198, 145, 63, 126, 252, 229, 215, 179, 123, 246, 241, 255,
    227, 219, 171, 75, 150, 49, 98, 196, 149, 55, 110, 220, 165, 87, 174, 65,
    130, 25, 50, 100, 200, 141, 7, 14, 28, 56, 112, 224, 221, 167, 83, 166,
    81, 162, 89, 178, 121, 242, 249, 239, 195, 155, 43, 86, 172, 69, 138, 9,
    18, 36, 72, 144, 61, 122, 244, 245, 247, 243, 251, 235, 203, 139, 11, 22,
    44, 88, 176, 125, 250, 233, 207, 131, 27, 54, 108, 216, 173, 71, 142, 1,
];

/// Total codewords (data + error correction) for each version.
pub const MAX_CODEWORDS: [u16; 41] = [
    0, 26, 44, 70, 100, 134, 172, 196, 242, 292, 346, 404, 466, 532, 581, 655, 733, 815, 901, 991,
    1085, 1156, 1258, 1364, 1474, 1588, 1706, 1828, 1921, 2051, 2185, 2323, 2465, 2611, 2761,
    2876, 3034, 3196, 3362, 3532, 3706,
];

pub static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

pub static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

/// Block structure of one (version, EC level) pair.
///
/// Group 2 blocks carry exactly one more data codeword than group 1 blocks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockLayout {
    pub blocks_group1: usize,
    pub data_codewords_group1: usize,
    pub blocks_group2: usize,
    pub data_codewords_group2: usize,
    pub ecc_codewords_per_block: usize,
}

impl BlockLayout {
    pub fn new(ver: Version, ecl: QrCodeEcc) -> Self {
        let numblocks = table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl);
        let blockecclen = table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl);
        let rawcodewords = max_codewords(ver);
        let numshortblocks = numblocks - rawcodewords % numblocks;
        let shortblockdatalen = rawcodewords / numblocks - blockecclen;
        Self {
            blocks_group1: numshortblocks,
            data_codewords_group1: shortblockdatalen,
            blocks_group2: numblocks - numshortblocks,
            data_codewords_group2: shortblockdatalen + 1,
            ecc_codewords_per_block: blockecclen,
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks_group1 + self.blocks_group2
    }

    pub fn data_codewords(&self) -> usize {
        self.blocks_group1 * self.data_codewords_group1
            + self.blocks_group2 * self.data_codewords_group2
    }
}

/// Total codewords of a symbol of the given version.
pub fn max_codewords(ver: Version) -> usize {
    usize::from(MAX_CODEWORDS[usize::from(ver.value())])
}

/// Data codewords available at the given version and EC level.
pub fn max_data_codewords(ver: Version, ecl: QrCodeEcc) -> usize {
    max_codewords(ver)
        - table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl)
            * table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl)
}

fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: QrCodeEcc) -> usize {
    table[ecl.ordinal()][usize::from(ver.value())] as usize
}

/// Alignment pattern center coordinates (shared by rows and columns).
pub static ALIGNMENT_POSITIONS: [&[u8]; 41] = [
    &[],
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

/// 7×7 finder pattern, one row per byte, leftmost module in bit 6.
pub const FINDER_PATTERN: [u8; 7] = [
    0b111_1111,
    0b100_0001,
    0b101_1101,
    0b101_1101,
    0b101_1101,
    0b100_0001,
    0b111_1111,
];

/// 5×5 alignment pattern, leftmost module in bit 4.
pub const ALIGNMENT_PATTERN: [u8; 5] = [0b11111, 0b10001, 0b10101, 0b10001, 0b11111];

/// Format information, BCH(15,5) protected and XORed with 0x5412.
/// Indexed by `[QrCodeEcc::ordinal()][mask]`.
pub const FORMAT_INFO: [[u16; 8]; 4] = [
    [0x77c4, 0x72f3, 0x7daa, 0x789d, 0x662f, 0x6318, 0x6c41, 0x6976], // Low
    [0x5412, 0x5125, 0x5e7c, 0x5b4b, 0x45f9, 0x40ce, 0x4f97, 0x4aa0], // Medium
    [0x355f, 0x3068, 0x3f31, 0x3a06, 0x24b4, 0x2183, 0x2eda, 0x2bed], // Quartile
    [0x1689, 0x13be, 0x1ce7, 0x19d0, 0x0762, 0x0255, 0x0d0c, 0x083b], // High
];

/// Version information, BCH(18,6) protected. Zero below version 7.
pub const VERSION_INFO: [u32; 41] = [
    0, 0, 0, 0, 0, 0, 0, 0x07c94,
    0x085bc, 0x09a99, 0x0a4d3, 0x0bbf6, 0x0c762, 0x0d847, 0x0e60d, 0x0f928,
    0x10b78, 0x1145d, 0x12a17, 0x13532, 0x149a6, 0x15683, 0x168c9, 0x177ec,
    0x18ec4, 0x191e1, 0x1afab, 0x1b08e, 0x1cc1a, 0x1d33f, 0x1ed75, 0x1f250,
    0x209d5, 0x216f0, 0x228ba, 0x2379f, 0x24b0b, 0x2542e, 0x26a64, 0x27541,
    0x28c69,
];

/// Where bit `i` (LSB first) of the format code goes in the first copy,
/// as `(row, column)` around the top-left finder.
pub const FORMAT_INFO_NEAR: [(i16, i16); 15] = [
    (0, 8), (1, 8), (2, 8), (3, 8), (4, 8), (5, 8), (7, 8), (8, 8),
    (8, 7), (8, 5), (8, 4), (8, 3), (8, 2), (8, 1), (8, 0),
];

/// Second copy of the format code. Negative coordinates count back from
/// the symbol dimension.
pub const FORMAT_INFO_WRAP: [(i16, i16); 15] = [
    (8, -1), (8, -2), (8, -3), (8, -4), (8, -5), (8, -6), (8, -7), (8, -8),
    (-7, 8), (-6, 8), (-5, 8), (-4, 8), (-3, 8), (-2, 8), (-1, 8),
];

/// Marker for bytes outside the alphanumeric character set.
pub const NOT_ALPHANUMERIC: u8 = 0xff;

pub const ALPHANUMERIC_CHARSET: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Byte to alphanumeric value. Digits map to 0..=9, the rest of the
/// charset to 10..=44, everything else to [`NOT_ALPHANUMERIC`].
pub const CHAR_VALUE: [u8; 256] = {
    let mut table = [NOT_ALPHANUMERIC; 256];
    let mut i = 0;
    while i < ALPHANUMERIC_CHARSET.len() {
        table[ALPHANUMERIC_CHARSET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gf_tables_are_inverse() {
        for i in 0..255usize {
            assert_eq!(usize::from(LOG_TABLE[usize::from(EXP_TABLE[i])]), i);
        }
        assert_eq!(EXP_TABLE[255], 1);
    }

    #[test]
    fn test_max_codewords_match_raw_module_count() {
        for ver in 1..=40usize {
            let mut raw: usize = (16 * ver + 128) * ver + 64;
            if ver >= 2 {
                let numalign: usize = ver / 7 + 2;
                raw -= (25 * numalign - 10) * numalign - 55;
                if ver >= 7 {
                    raw -= 36;
                }
            }
            assert_eq!(usize::from(MAX_CODEWORDS[ver]), raw / 8, "version {}", ver);
        }
    }

    #[test]
    fn test_block_layout_covers_all_codewords() {
        for ver in 1..=40u8 {
            let ver = Version::new(ver);
            for ecl in [QrCodeEcc::Low, QrCodeEcc::Medium, QrCodeEcc::Quartile, QrCodeEcc::High] {
                let layout = BlockLayout::new(ver, ecl);
                assert_eq!(layout.data_codewords(), max_data_codewords(ver, ecl));
                assert_eq!(
                    layout.data_codewords() + layout.num_blocks() * layout.ecc_codewords_per_block,
                    max_codewords(ver)
                );
            }
        }
        // 5-Q: 2 blocks of 15 and 2 blocks of 16 data codewords
        let layout = BlockLayout::new(Version::new(5), QrCodeEcc::Quartile);
        assert_eq!(
            layout,
            BlockLayout {
                blocks_group1: 2,
                data_codewords_group1: 15,
                blocks_group2: 2,
                data_codewords_group2: 16,
                ecc_codewords_per_block: 18,
            }
        );
    }

    #[test]
    fn test_alignment_positions_follow_spacing_rule() {
        assert!(ALIGNMENT_POSITIONS[1].is_empty());
        for ver in 2..=40u8 {
            let numalign: u8 = ver / 7 + 2;
            let size: u8 = ver * 4 + 17;
            let step: u8 = if ver == 32 {
                26
            } else {
                ((ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2)) * 2
            };
            let mut expected: Vec<u8> = (0..numalign - 1).map(|i| size - 7 - i * step).collect();
            expected.push(6);
            expected.reverse();
            assert_eq!(ALIGNMENT_POSITIONS[usize::from(ver)], expected.as_slice(), "version {}", ver);
        }
    }

    #[test]
    fn test_format_info_matches_bch() {
        for ecl in [QrCodeEcc::Low, QrCodeEcc::Medium, QrCodeEcc::Quartile, QrCodeEcc::High] {
            for mask in 0u8..8 {
                let data = u32::from((ecl.format_bits() << 3) | mask);
                let mut rem: u32 = data;
                for _ in 0..10 {
                    rem = (rem << 1) ^ ((rem >> 9) * 0x537);
                }
                let bits = ((data << 10) | rem) ^ 0x5412;
                assert_eq!(u32::from(FORMAT_INFO[ecl.ordinal()][usize::from(mask)]), bits);
            }
        }
    }

    #[test]
    fn test_version_info_matches_bch() {
        for ver in 0..7 {
            assert_eq!(VERSION_INFO[ver], 0);
        }
        for ver in 7u32..=40 {
            let mut rem: u32 = ver;
            for _ in 0..12 {
                rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
            }
            assert_eq!(VERSION_INFO[ver as usize], (ver << 12) | rem, "version {}", ver);
        }
    }

    #[test]
    fn test_char_values() {
        assert_eq!(CHAR_VALUE[usize::from(b'0')], 0);
        assert_eq!(CHAR_VALUE[usize::from(b'9')], 9);
        assert_eq!(CHAR_VALUE[usize::from(b'A')], 10);
        assert_eq!(CHAR_VALUE[usize::from(b':')], 44);
        assert_eq!(CHAR_VALUE[usize::from(b'a')], NOT_ALPHANUMERIC);
        assert_eq!(CHAR_VALUE[0x80], NOT_ALPHANUMERIC);
    }
}
