//! Reed-Solomon error correction over GF(256) and block interleaving.

use crate::qrcode::{QrCodeEcc, Version};
use crate::tables::{self, BlockLayout, EXP_TABLE, LOG_TABLE};

/// Smallest and largest EC codewords per block used by any symbol.
pub const MIN_ECC_CODEWORDS: usize = 7;
pub const MAX_ECC_CODEWORDS: usize = 30;

/// Generator polynomials for every block degree from 7 to 30, indexed by
/// `degree - 7`. Coefficients run from highest to lowest power, with the
/// leading (monic) term dropped.
pub static GENERATOR_POLYNOMIALS: [[u8; MAX_ECC_CODEWORDS]; MAX_ECC_CODEWORDS - MIN_ECC_CODEWORDS + 1] =
    build_generators();

/// Multiplies two field elements through the log/antilog tables.
pub const fn gf_mul(x: u8, y: u8) -> u8 {
    if x == 0 || y == 0 {
        return 0;
    }
    EXP_TABLE[(LOG_TABLE[x as usize] as usize + LOG_TABLE[y as usize] as usize) % 255]
}

const fn build_generators() -> [[u8; MAX_ECC_CODEWORDS]; MAX_ECC_CODEWORDS - MIN_ECC_CODEWORDS + 1] {
    let mut table = [[0u8; MAX_ECC_CODEWORDS]; MAX_ECC_CODEWORDS - MIN_ECC_CODEWORDS + 1];
    let mut degree = MIN_ECC_CODEWORDS;
    while degree <= MAX_ECC_CODEWORDS {
        // Product of (x - 2^i) for i in 0..degree
        let mut divisor = [0u8; MAX_ECC_CODEWORDS];
        divisor[degree - 1] = 1;
        let mut root: u8 = 1;
        let mut i = 0;
        while i < degree {
            let mut j = 0;
            while j < degree {
                divisor[j] = gf_mul(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
                j += 1;
            }
            root = gf_mul(root, 0x02);
            i += 1;
        }
        table[degree - MIN_ECC_CODEWORDS] = divisor;
        degree += 1;
    }
    table
}

/// Returns the generator of the given degree.
///
/// # Panics
///
/// Panics if `degree` is outside 7..=30.
pub fn generator_polynomial(degree: usize) -> &'static [u8] {
    assert!((MIN_ECC_CODEWORDS..=MAX_ECC_CODEWORDS).contains(&degree), "Degree out of range");
    &GENERATOR_POLYNOMIALS[degree - MIN_ECC_CODEWORDS][..degree]
}

/// Remainder of `data * x^n` divided by `generator`, where n is the
/// generator degree. These are the EC codewords of one block.
pub fn compute_remainder(data: &[u8], generator: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; generator.len()];
    for &b in data {
        let factor: u8 = b ^ result[0];
        result.copy_within(1.., 0);
        let last = result.len() - 1;
        result[last] = 0;
        if factor == 0 {
            continue;
        }
        let logfactor = usize::from(LOG_TABLE[usize::from(factor)]);
        for (x, &y) in result.iter_mut().zip(generator) {
            if y != 0 {
                *x ^= EXP_TABLE[(usize::from(LOG_TABLE[usize::from(y)]) + logfactor) % 255];
            }
        }
    }
    result
}

/// Splits `data` into EC blocks, appends each block's EC codewords and
/// interleaves the result into final codeword order.
///
/// # Panics
///
/// Panics if `data` is not exactly the data capacity of `ver` at `ecl`.
pub fn add_ecc_and_interleave(data: &[u8], ver: Version, ecl: QrCodeEcc) -> Vec<u8> {
    let layout = BlockLayout::new(ver, ecl);
    assert_eq!(data.len(), layout.data_codewords());
    let generator: &[u8] = generator_polynomial(layout.ecc_codewords_per_block);

    let mut blocks: Vec<(&[u8], Vec<u8>)> = Vec::with_capacity(layout.num_blocks());
    let mut dat: &[u8] = data;
    for i in 0..layout.num_blocks() {
        let datlen: usize = if i < layout.blocks_group1 {
            layout.data_codewords_group1
        } else {
            layout.data_codewords_group2
        };
        let (block, rest) = dat.split_at(datlen);
        blocks.push((block, compute_remainder(block, generator)));
        dat = rest;
    }
    debug_assert_eq!(dat.len(), 0);

    let mut result: Vec<u8> = Vec::with_capacity(tables::max_codewords(ver));
    for j in 0..layout.data_codewords_group2 {
        for (block, _) in &blocks {
            if let Some(&b) = block.get(j) {
                result.push(b);
            }
        }
    }
    for j in 0..layout.ecc_codewords_per_block {
        for (_, ecc) in &blocks {
            result.push(ecc[j]);
        }
    }
    debug_assert_eq!(result.len(), tables::max_codewords(ver));
    result
}
