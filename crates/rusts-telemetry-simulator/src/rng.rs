//! Fast, lock-free, non-seedable random bit source.
//!
//! Each thread owns an xorshift64* state seeded once from `rand::random`, so
//! concurrent callers never share a cache line and never take a lock. The
//! output is fast and uniform enough for tag/field synthesis; it is not
//! cryptographically secure and is not reproducible across runs.

use std::cell::Cell;

thread_local! {
    static STATE: Cell<u64> = Cell::new(seed());
}

fn seed() -> u64 {
    // xorshift locks up on a zero state
    match rand::random::<u64>() {
        0 => 0x9E37_79B9_7F4A_7C15,
        s => s,
    }
}

/// Next 64 random bits.
#[inline]
pub fn draw64() -> u64 {
    STATE.with(|state| {
        let mut x = state.get();
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        state.set(x);
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    })
}

/// Next 32 random bits (the high half of a 64-bit draw).
#[inline]
pub fn draw32() -> u32 {
    (draw64() >> 32) as u32
}

/// Uniform value in `[0, n)`; returns 0 when `n == 0`.
///
/// Uses multiply-shift reduction instead of a modulo.
#[inline]
pub fn draw32_below(n: u32) -> u32 {
    ((draw32() as u64 * n as u64) >> 32) as u32
}

/// Uniform float in `[0, 1)`.
#[inline]
pub fn draw_unit() -> f64 {
    (draw64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Extracts the `index`-th `width`-bit slice of `word`.
///
/// Lets one 64-bit draw feed several small fields.
#[inline]
pub fn bits(word: u64, index: u32, width: u32) -> u32 {
    debug_assert!(width > 0 && width <= 32);
    debug_assert!((index + 1) * width <= 64);
    bits_at(word, index * width, width)
}

/// Extracts `width` bits of `word` starting at bit `offset`.
///
/// For callers packing slices of mixed widths into one draw.
#[inline]
pub fn bits_at(word: u64, offset: u32, width: u32) -> u32 {
    debug_assert!(width > 0 && width <= 32);
    debug_assert!(offset + width <= 64);
    ((word >> offset) & ((1u64 << width) - 1)) as u32
}

/// Maps an unsigned `width`-bit slice onto `[lo, hi]`.
#[inline]
pub fn scale(slice: u32, width: u32, lo: f64, hi: f64) -> f64 {
    let max = ((1u64 << width) - 1) as f64;
    lo + (hi - lo) * (slice as f64 / max)
}
