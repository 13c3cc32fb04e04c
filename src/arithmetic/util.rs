//! Limb arithmetic helpers.

/// Computes `a + b + carry`, returning the result along with the new carry.
#[inline(always)]
pub(crate) const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let ret = (a as u128) + (b as u128) + (carry as u128);
    (ret as u64, (ret >> 64) as u64)
}

/// Computes `a - (b + borrow)`, returning the result along with the new
/// borrow (0 or `u64::MAX`; only its top bit is consumed).
#[inline(always)]
pub(crate) const fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let ret = (a as u128).wrapping_sub((b as u128) + ((borrow >> 63) as u128));
    (ret as u64, (ret >> 64) as u64)
}

#[cfg(test)]
pub(crate) fn u64_array_to_biguint(words: &[u64; 4]) -> num_bigint::BigUint {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| num_bigint::BigUint::from(*w) << (i * 64))
        .sum()
}

#[cfg(test)]
pub(crate) fn biguint_to_u64_array(x: &num_bigint::BigUint) -> [u64; 4] {
    use num_traits::ToPrimitive;

    let mask = num_bigint::BigUint::from(u64::MAX);
    let mut words = [0u64; 4];
    for (i, word) in words.iter_mut().enumerate() {
        *word = ((x >> (i * 64)) & &mask).to_u64().expect("limb fits u64");
    }
    words
}
