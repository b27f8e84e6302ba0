//! Stand-in patterns for QR codes and barcodes.
//!
//! These are visual placeholders, not scannable encodings: the modules are
//! derived from a hash of the value so different values look different and the
//! same value always draws the same way.

#[cfg(test)]
#[path = "pattern_test.rs"]
mod pattern_test;

/// Modules per side of the QR stand-in (version 1 QR size).
pub const QR_MODULES: usize = 21;

const FINDER: usize = 7;

fn fnv1a(value: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in value.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

/// Deterministic pseudo-random bit stream seeded from a value.
struct Bits(u64);

impl Bits {
    fn new(value: &str) -> Self {
        Self(fnv1a(value) | 1)
    }

    fn next(&mut self) -> u64 {
        // xorshift64
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

fn in_finder(row: usize, col: usize) -> Option<bool> {
    let corners = [(0, 0), (0, QR_MODULES - FINDER), (QR_MODULES - FINDER, 0)];
    for (r0, c0) in corners {
        // One-module quiet separator around each finder.
        let r_in = row + 1 >= r0 && row <= r0 + FINDER;
        let c_in = col + 1 >= c0 && col <= c0 + FINDER;
        if r_in && c_in {
            if row < r0 || row >= r0 + FINDER || col < c0 || col >= c0 + FINDER {
                return Some(false);
            }
            let (r, c) = (row - r0, col - c0);
            let ring = r == 0 || r == FINDER - 1 || c == 0 || c == FINDER - 1;
            let core = (2..=4).contains(&r) && (2..=4).contains(&c);
            return Some(ring || core);
        }
    }
    None
}

/// Dark modules of the QR stand-in as `(row, col)` pairs.
#[must_use]
pub fn qr_modules(value: &str) -> Vec<(usize, usize)> {
    let mut bits = Bits::new(value);
    let mut dark = Vec::new();
    for row in 0..QR_MODULES {
        for col in 0..QR_MODULES {
            let on = match in_finder(row, col) {
                Some(on) => on,
                None => bits.next() & 1 == 1,
            };
            if on {
                dark.push((row, col));
            }
        }
    }
    dark
}

/// Barcode stand-in as alternating bar/space widths in modules, starting with a bar.
#[must_use]
pub fn barcode_bars(value: &str) -> Vec<u8> {
    let mut bits = Bits::new(value);
    let mut widths = vec![2, 1, 1, 1];
    let bars = 24 + value.len().min(16) * 2;
    for _ in 0..bars {
        // Always in 1..=3.
        #[allow(clippy::cast_possible_truncation)]
        widths.push((bits.next() % 3) as u8 + 1);
    }
    widths.extend([1, 1, 2]);
    widths
}
