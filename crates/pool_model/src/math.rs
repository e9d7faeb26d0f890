//! Checked arithmetic helpers - no unwrap, no panics

/// Add u128, `None` on overflow
pub fn add_u128(a: u128, b: u128) -> Option<u128> {
    a.checked_add(b)
}

/// Subtract u128, `None` on underflow
pub fn sub_u128(a: u128, b: u128) -> Option<u128> {
    a.checked_sub(b)
}

/// floor(a * b / d)
///
/// Returns `None` when `d == 0` or the quotient does not fit in u128.
/// Falls back to splitting `a` by `d` when the direct product overflows:
/// a = q*d + r, so floor(a*b/d) = q*b + floor(r*b/d).
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / d);
    }
    let q = a / d;
    let r = a % d;
    let whole = q.checked_mul(b)?;
    let frac = r.checked_mul(b)? / d;
    whole.checked_add(frac)
}
