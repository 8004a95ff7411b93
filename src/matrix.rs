//! Module grid, function patterns and codeword placement.

use crate::qrcode::{Mask, QrCodeEcc, Version};
use crate::tables::{
    ALIGNMENT_PATTERN, ALIGNMENT_POSITIONS, FINDER_PATTERN, FORMAT_INFO, FORMAT_INFO_NEAR,
    FORMAT_INFO_WRAP, VERSION_INFO,
};

const DARK: u8 = 0x01;
const FUNCTION: u8 = 0x02;

/// Square grid of modules, stored row-major.
///
/// Each cell holds a color bit and a flag marking function modules
/// (finders, timing, alignment, format and version areas). Cells without
/// the flag carry data and are the only ones a mask touches.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    size: usize,
    cells: Vec<u8>,
}

impl Grid {
    fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Builds an empty grid of the given version with every function
    /// pattern drawn and every data cell light.
    pub fn with_function_patterns(ver: Version) -> Self {
        let size: usize = usize::from(ver.value()) * 4 + 17;
        let mut result = Self::new(size);

        result.draw_finder(0, 0);
        result.draw_finder(0, size - 7);
        result.draw_finder(size - 7, 0);

        for i in 8..size - 8 {
            result.set_function(6, i, i % 2 == 0);
            result.set_function(i, 6, i % 2 == 0);
        }

        let alignpatpos: &[u8] = ALIGNMENT_POSITIONS[usize::from(ver.value())];
        for &row in alignpatpos {
            for &col in alignpatpos {
                let (row, col) = (usize::from(row), usize::from(col));
                if !result.in_finder_zone(row, col) {
                    result.draw_alignment(row, col);
                }
            }
        }

        // Reserve the format areas; the bits are written after masking
        for &(row, col) in FORMAT_INFO_NEAR.iter().chain(FORMAT_INFO_WRAP.iter()) {
            let (row, col) = result.resolve(row, col);
            result.set_function(row, col, false);
        }
        result.set_function(size - 8, 8, true);

        if ver.value() >= 7 {
            for i in 0..18 {
                let (a, b) = (size - 11 + i % 3, i / 3);
                result.set_function(b, a, false);
                result.set_function(a, b, false);
            }
        }
        result
    }

    /// Side length in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn version(&self) -> Version {
        Version::new(((self.size - 17) / 4) as u8)
    }

    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        self.cells[self.index(row, col)] & DARK != 0
    }

    pub fn is_function(&self, row: usize, col: usize) -> bool {
        self.cells[self.index(row, col)] & FUNCTION != 0
    }

    /// Number of dark modules in the whole grid.
    pub fn dark_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c & DARK != 0).count()
    }

    /// Flips the color of a data cell. Function cells are left alone.
    pub(crate) fn toggle_data(&mut self, row: usize, col: usize) {
        let index = self.index(row, col);
        if self.cells[index] & FUNCTION == 0 {
            self.cells[index] ^= DARK;
        }
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(row < self.size && col < self.size, "Module out of bounds");
        row * self.size + col
    }

    fn set_function(&mut self, row: usize, col: usize, isdark: bool) {
        let index = self.index(row, col);
        self.cells[index] = FUNCTION | u8::from(isdark);
    }

    fn set_data(&mut self, row: usize, col: usize, isdark: bool) {
        let index = self.index(row, col);
        self.cells[index] = u8::from(isdark);
    }

    /// Maps table coordinates to cells, negatives counting from the far edge.
    fn resolve(&self, row: i16, col: i16) -> (usize, usize) {
        let size = self.size as i16;
        let wrap = |v: i16| if v < 0 { (size + v) as usize } else { v as usize };
        (wrap(row), wrap(col))
    }

    fn in_finder_zone(&self, row: usize, col: usize) -> bool {
        let near = |v: usize| v < 9;
        let far = |v: usize| v + 9 > self.size;
        (near(row) && near(col)) || (near(row) && far(col)) || (far(row) && near(col))
    }

    /// Draws a finder whose top-left module is at (`top`, `left`), with the
    /// light separator ring clipped to the grid.
    fn draw_finder(&mut self, top: usize, left: usize) {
        for dy in -1i32..=7 {
            for dx in -1i32..=7 {
                let (row, col) = (top as i32 + dy, left as i32 + dx);
                if row < 0 || col < 0 || row >= self.size as i32 || col >= self.size as i32 {
                    continue;
                }
                let isdark = (0..7).contains(&dy)
                    && (0..7).contains(&dx)
                    && (FINDER_PATTERN[dy as usize] >> (6 - dx)) & 1 != 0;
                self.set_function(row as usize, col as usize, isdark);
            }
        }
    }

    fn draw_alignment(&mut self, row: usize, col: usize) {
        for (dy, bits) in ALIGNMENT_PATTERN.iter().enumerate() {
            for dx in 0..5 {
                self.set_function(row + dy - 2, col + dx - 2, (bits >> (4 - dx)) & 1 != 0);
            }
        }
    }
}

/// Places `codewords` into the data cells of `grid` along the zigzag path,
/// starting at the bottom-right corner. Each byte goes MSB first.
///
/// # Panics
///
/// Panics if `codewords` is not the full codeword count of the grid's version.
pub fn place_codewords(grid: &Grid, codewords: &[u8]) -> Grid {
    assert_eq!(
        codewords.len(),
        crate::tables::max_codewords(grid.version()),
        "Illegal argument"
    );
    let mut result = grid.clone();
    let size: usize = result.size;
    let totalbits: usize = codewords.len() * 8;
    let mut i: usize = 0;
    let mut right: usize = size - 1;
    loop {
        if right == 6 {
            right = 5;
        }
        let upward: bool = ((right + 1) & 2) == 0;
        for vert in 0..size {
            let row = if upward { size - 1 - vert } else { vert };
            for j in 0..2 {
                let col = right - j;
                if !result.is_function(row, col) && i < totalbits {
                    let bit = (codewords[i >> 3] >> (7 - (i & 7))) & 1 != 0;
                    result.set_data(row, col, bit);
                    i += 1;
                }
            }
        }
        if right < 3 {
            break;
        }
        right -= 2;
    }
    debug_assert_eq!(i, totalbits);
    result
}

/// Writes the format code for (`ecl`, `mask`) and, from version 7 up,
/// the version code into the reserved areas.
pub fn stamp_format_and_version(mut grid: Grid, ecl: QrCodeEcc, mask: Mask) -> Grid {
    let bits: u16 = FORMAT_INFO[ecl.ordinal()][usize::from(mask.value())];
    for (i, (&near, &wrap)) in FORMAT_INFO_NEAR.iter().zip(FORMAT_INFO_WRAP.iter()).enumerate() {
        let isdark = (bits >> i) & 1 != 0;
        let (row, col) = grid.resolve(near.0, near.1);
        grid.set_function(row, col, isdark);
        let (row, col) = grid.resolve(wrap.0, wrap.1);
        grid.set_function(row, col, isdark);
    }

    let ver = grid.version();
    if ver.value() >= 7 {
        let bits: u32 = VERSION_INFO[usize::from(ver.value())];
        let size = grid.size;
        for i in 0..18 {
            let isdark = (bits >> i) & 1 != 0;
            let (a, b) = (size - 11 + i % 3, i / 3);
            // top-right block, then its transpose at the bottom-left
            grid.set_function(b, a, isdark);
            grid.set_function(a, b, isdark);
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_cell_count(grid: &Grid) -> usize {
        let size = grid.size();
        (0..size)
            .flat_map(|r| (0..size).map(move |c| (r, c)))
            .filter(|&(r, c)| !grid.is_function(r, c))
            .count()
    }

    #[test]
    fn test_data_cells_match_raw_module_count() {
        for ver in 1..=40usize {
            let grid = Grid::with_function_patterns(Version::new(ver as u8));
            let mut raw: usize = (16 * ver + 128) * ver + 64;
            if ver >= 2 {
                let numalign: usize = ver / 7 + 2;
                raw -= (25 * numalign - 10) * numalign - 55;
                if ver >= 7 {
                    raw -= 36;
                }
            }
            assert_eq!(data_cell_count(&grid), raw, "version {}", ver);
        }
    }

    #[test]
    fn test_function_patterns_version_1() {
        let grid = Grid::with_function_patterns(Version::new(1));
        assert_eq!(grid.size(), 21);
        // finder corners and centers
        for &(r, c) in &[(0, 0), (6, 6), (3, 3), (0, 20), (3, 17), (20, 0), (17, 3)] {
            assert!(grid.is_dark(r, c), "({}, {})", r, c);
        }
        // inner ring and separators
        for &(r, c) in &[(1, 1), (7, 7), (7, 13), (13, 7), (5, 5), (1, 19)] {
            assert!(!grid.is_dark(r, c) && grid.is_function(r, c), "({}, {})", r, c);
        }
        // timing pattern
        assert!(grid.is_dark(6, 8) && !grid.is_dark(6, 9) && grid.is_dark(6, 12));
        assert!(grid.is_dark(8, 6) && !grid.is_dark(9, 6));
        // dark module
        assert!(grid.is_dark(13, 8) && grid.is_function(13, 8));
        assert!(!grid.is_function(9, 9));
    }

    #[test]
    fn test_alignment_skips_finder_corners() {
        let grid = Grid::with_function_patterns(Version::new(7));
        // 7: centers at 6, 22, 38
        assert!(grid.is_dark(22, 22) && !grid.is_dark(21, 22) && grid.is_dark(20, 22));
        assert!(grid.is_dark(6, 22) && grid.is_dark(38, 22) && grid.is_dark(38, 38));
        // the top-left finder is not overwritten by a (6, 6) alignment
        assert!(!grid.is_dark(5, 5));
    }

    #[test]
    fn test_placement_starts_bottom_right() {
        let grid = Grid::with_function_patterns(Version::new(1));
        let mut codewords = vec![0u8; 26];
        codewords[0] = 0b1010_0000;
        let placed = place_codewords(&grid, &codewords);
        assert!(placed.is_dark(20, 20));
        assert!(!placed.is_dark(20, 19));
        assert!(placed.is_dark(19, 20));
        assert!(!placed.is_dark(19, 19));
        // function cells are untouched
        assert_eq!(placed.is_dark(13, 8), grid.is_dark(13, 8));
    }

    #[test]
    fn test_placement_fills_every_codeword_bit() {
        let grid = Grid::with_function_patterns(Version::new(2));
        let placed = place_codewords(&grid, &[0xff; 44]);
        // 44 codewords = 352 bits of 359 data cells; 7 remainder cells stay light
        assert_eq!(placed.dark_count() - grid.dark_count(), 352);
    }

    #[test]
    fn test_format_bits_are_duplicated() {
        let grid = Grid::with_function_patterns(Version::new(1));
        let mask = Mask::new(0);
        let stamped = stamp_format_and_version(grid, QrCodeEcc::Medium, mask);
        let bits: u16 = 0x5412;
        for i in 0..15 {
            let expected = (bits >> i) & 1 != 0;
            let (r, c) = FORMAT_INFO_NEAR[i];
            assert_eq!(stamped.is_dark(r as usize, c as usize), expected);
            let (r, c) = stamped.resolve(FORMAT_INFO_WRAP[i].0, FORMAT_INFO_WRAP[i].1);
            assert_eq!(stamped.is_dark(r, c), expected);
        }
        assert!(stamped.is_dark(13, 8));
    }

    #[test]
    fn test_version_info_layouts() {
        let grid = Grid::with_function_patterns(Version::new(7));
        let stamped = stamp_format_and_version(grid, QrCodeEcc::Low, Mask::new(3));
        // 0x07c94: bit 2 is set, bit 0 is not
        assert!(!stamped.is_dark(0, 34) && !stamped.is_dark(34, 0));
        assert!(stamped.is_dark(0, 36) && stamped.is_dark(36, 0));
        for i in 0..18 {
            let (a, b) = (34 + i % 3, i / 3);
            assert_eq!(stamped.is_dark(b, a), stamped.is_dark(a, b));
            assert_eq!(stamped.is_dark(b, a), (0x07c94 >> i) & 1 != 0);
        }
    }
}
