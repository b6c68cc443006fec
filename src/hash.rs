//! The polynomial hash convention shared by every key strategy.
//!
//! Composite values fold their children with `seed = 31 * seed + contribution`,
//! starting from [`SEED`]. All arithmetic wraps on overflow.

/// Initial accumulator of every composite fold.
pub const SEED: i64 = 1;

/// Multiplier applied to the accumulator before each contribution.
pub const MULTIPLIER: i64 = 31;

/// Contribution of `true`.
pub const TRUE_HASH: i64 = 1231;

/// Contribution of `false`.
pub const FALSE_HASH: i64 = 1237;

/// Contribution of an absent value and of a cycle marker.
pub const NULL_HASH: i64 = 0;

/// Folds one contribution into an accumulator.
#[inline]
pub fn fold(seed: i64, contribution: i64) -> i64 {
    seed.wrapping_mul(MULTIPLIER).wrapping_add(contribution)
}

/// Folds a sequence of contributions starting from [`SEED`].
pub fn fold_all<I>(contributions: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    contributions.into_iter().fold(SEED, fold)
}

/// Hashes a string as a polynomial over its UTF-16 code units.
///
/// The accumulator is 32 bits wide and sign-extended on return, which keeps
/// text contributions identical to the ones other runtimes compute for the
/// same string.
pub fn string_hash(value: &str) -> i64 {
    let hash = value
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)));
    i64::from(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_wraps() {
        assert_eq!(fold(SEED, -1), 30);
        assert_eq!(fold(i64::MAX, 0), i64::MAX.wrapping_mul(31));
    }

    #[test]
    fn test_fold_all_empty_is_seed() {
        assert_eq!(fold_all(std::iter::empty()), SEED);
        assert_eq!(fold_all([1, 2]), (31 + 1) * 31 + 2);
    }

    #[test]
    fn test_string_hash_values() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("argString"), 1_292_905_991);
        assert_eq!(string_hash("childArgString"), 1_737_119_819);
    }

    #[test]
    fn test_string_hash_uses_utf16_units() {
        // U+1F600 is a surrogate pair: 0xD83D, 0xDE00
        assert_eq!(string_hash("\u{1F600}"), 0xD83D * 31 + 0xDE00);
    }
}
