//! Packs a [`SymbolPlan`] into data codewords.

use crate::segment::{SegmentMode, SymbolPlan, ECI_MODE_BITS};
use crate::tables::CHAR_VALUE;

/// Big-endian bit accumulator over a growable byte vector.
///
/// Fields are shifted into `accumulator`; whole bytes are moved out as soon
/// as they are complete, so fewer than 8 bits are ever pending.
#[derive(Clone, Debug, Default)]
pub struct BitBuffer {
    data: Vec<u8>,
    accumulator: u32,
    filled: u8,
}

impl BitBuffer {
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            accumulator: 0,
            filled: 0,
        }
    }

    /// Number of bits appended so far.
    pub fn len(&self) -> usize {
        self.data.len() * 8 + usize::from(self.filled)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends the low `len` bits of `val`, most significant first.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 24 && (val >> len) == 0);
        self.accumulator = (self.accumulator << len) | val;
        self.filled += len;
        while self.filled >= 8 {
            self.filled -= 8;
            self.data.push((self.accumulator >> self.filled) as u8);
        }
        self.accumulator &= (1u32 << self.filled) - 1;
    }

    /// Pads the pending bits with zeros up to a byte boundary.
    pub fn flush(&mut self) {
        if self.filled > 0 {
            self.data.push((self.accumulator << (8 - self.filled)) as u8);
            self.accumulator = 0;
            self.filled = 0;
        }
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.flush();
        self.data
    }
}

/// Serializes every segment of `plan`, then terminates and pads the stream.
///
/// The result always holds exactly `plan.data_codewords()` bytes.
pub fn pack(plan: &SymbolPlan) -> Vec<u8> {
    let datacapacitybits: usize = plan.capacity_bits();
    let mut bb = BitBuffer::with_capacity(plan.data_codewords());

    if let Some(assignval) = plan.eci() {
        append_eci(&mut bb, assignval);
    }
    for seg in plan.segments() {
        let mode: SegmentMode = seg.mode();
        bb.append_bits(mode.mode_bits(), 4);
        bb.append_bits(seg.num_chars() as u32, mode.num_char_count_bits(plan.version()));
        match mode {
            SegmentMode::Numeric => append_numeric(&mut bb, seg.data()),
            SegmentMode::Alphanumeric => append_alphanumeric(&mut bb, seg.data()),
            SegmentMode::Byte => {
                for &b in seg.data() {
                    bb.append_bits(b.into(), 8);
                }
            }
        }
    }
    debug_assert_eq!(bb.len(), plan.data_bits());

    // Add terminator and pad up to a byte if applicable
    let numzerobits: usize = core::cmp::min(4, datacapacitybits - bb.len());
    bb.append_bits(0, numzerobits as u8);
    bb.flush();

    // Pad with alternating bytes until data capacity is reached
    for &padbyte in [0xec, 0x11].iter().cycle() {
        if bb.len() >= datacapacitybits {
            break;
        }
        bb.append_bits(padbyte, 8);
    }
    let result = bb.into_bytes();
    debug_assert_eq!(result.len(), plan.data_codewords());
    result
}

fn append_eci(bb: &mut BitBuffer, assignval: u32) {
    bb.append_bits(ECI_MODE_BITS, 4);
    if assignval <= 127 {
        bb.append_bits(assignval, 8);
    } else if assignval <= 16383 {
        bb.append_bits(0x8000 | assignval, 16);
    } else {
        bb.append_bits(0xc0_0000 | assignval, 24);
    }
}

fn append_numeric(bb: &mut BitBuffer, digits: &[u8]) {
    for group in digits.chunks(3) {
        let value = group
            .iter()
            .fold(0u32, |acc, &b| acc * 10 + u32::from(CHAR_VALUE[usize::from(b)]));
        bb.append_bits(value, (group.len() * 3 + 1) as u8);
    }
}

fn append_alphanumeric(bb: &mut BitBuffer, text: &[u8]) {
    for pair in text.chunks(2) {
        match *pair {
            [a, b] => {
                let value = u32::from(CHAR_VALUE[usize::from(a)]) * 45 + u32::from(CHAR_VALUE[usize::from(b)]);
                bb.append_bits(value, 11);
            }
            [a] => bb.append_bits(CHAR_VALUE[usize::from(a)].into(), 6),
            _ => unreachable!(),
        }
    }
}
