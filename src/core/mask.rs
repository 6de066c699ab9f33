//! Boolean row masks and their elementwise operations
//!
//! A mask carries one entry per table row, true meaning the row satisfies a
//! query. The `*_assign` operations write into the accumulator buffer so an
//! n-ary fold reuses one allocation.

use crate::core::error::{Error, Result};

/// Boolean row mask, one entry per table row
pub type Mask = Vec<bool>;

/// Create an all-true mask of the given length
pub fn ones(len: usize) -> Mask {
    vec![true; len]
}

fn check_len(acc: &[bool], other: &[bool]) -> Result<()> {
    if acc.len() != other.len() {
        return Err(Error::LengthMismatch {
            expected: acc.len(),
            actual: other.len(),
        });
    }
    Ok(())
}

/// Elementwise AND of `acc` and `other`, written into `acc`
pub fn and_assign(acc: &mut Mask, other: &[bool]) -> Result<()> {
    check_len(acc, other)?;
    for (a, &b) in acc.iter_mut().zip(other) {
        *a = *a && b;
    }
    Ok(())
}

/// Elementwise OR of `acc` and `other`, written into `acc`
pub fn or_assign(acc: &mut Mask, other: &[bool]) -> Result<()> {
    check_len(acc, other)?;
    for (a, &b) in acc.iter_mut().zip(other) {
        *a = *a || b;
    }
    Ok(())
}

/// Elementwise XOR of `acc` and `other`, written into `acc`
pub fn xor_assign(acc: &mut Mask, other: &[bool]) -> Result<()> {
    check_len(acc, other)?;
    for (a, &b) in acc.iter_mut().zip(other) {
        *a ^= b;
    }
    Ok(())
}

/// Elementwise NOT, in place
pub fn invert(mask: &mut Mask) {
    for b in mask.iter_mut() {
        *b = !*b;
    }
}

/// Complement of a mask, as a new allocation
pub fn complement(mask: &[bool]) -> Mask {
    mask.iter().map(|&b| !b).collect()
}

/// Number of true entries
pub fn count_true(mask: &[bool]) -> usize {
    mask.iter().filter(|&&b| b).count()
}

/// Ascending indices of the true entries
pub fn nonzero(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &b)| if b { Some(i) } else { None })
        .collect()
}
