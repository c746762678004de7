//! Random alphanumeric strings without look-alike characters.
//!
//! The alphabet skips `0`, `1`, `l`, `o` and `O`, leaving 8 digits and 49
//! letters. Strings of up to 25 characters never repeat a character, so
//! there are `57! / (57 - length)!` of them (57, 3 192, 175 560, ...).

use rand::seq::SliceRandom;
use rand::Rng;

/// Digits used in random strings.
pub const NUMBERS: [char; 8] = ['2', '3', '4', '5', '6', '7', '8', '9'];

/// Letters used in random strings.
pub const LETTERS: [char; 49] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't',
    'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// The full alphabet: [`NUMBERS`] followed by [`LETTERS`].
pub const ALPHANUM: [char; 57] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j',
    'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B', 'C', 'D',
    'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W',
    'X', 'Y', 'Z',
];

const SAMPLE_SIZE: usize = 25;

/// Returns a random string of `length` characters from [`ALPHANUM`].
///
/// Characters are drawn in batches of 25 distinct characters; batches are
/// appended until there are enough, then the pool is shuffled and cut.
///
/// ```
/// use django_core_common::utils::random::{random_alphanum, ALPHANUM};
///
/// let s = random_alphanum(40);
/// assert_eq!(s.chars().count(), 40);
/// assert!(s.chars().all(|c| ALPHANUM.contains(&c)));
/// ```
pub fn random_alphanum(length: usize) -> String {
    random_alphanum_with(&mut rand::thread_rng(), length)
}

/// [`random_alphanum`] with a caller supplied RNG.
pub fn random_alphanum_with<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    let mut chars: Vec<char> = ALPHANUM.choose_multiple(rng, SAMPLE_SIZE).copied().collect();
    while chars.len() < length {
        chars.extend(ALPHANUM.choose_multiple(rng, SAMPLE_SIZE).copied());
    }
    chars.shuffle(rng);
    chars.truncate(length);
    chars.into_iter().collect()
}

/// Returns a random key whose length lies in `low..=high`.
///
/// A `low` above `high` is treated as a fixed length of `low`.
pub fn generate_key(low: usize, high: usize) -> String {
    let mut rng = rand::thread_rng();
    let length = if low >= high {
        low
    } else {
        rng.gen_range(low..=high)
    };
    random_alphanum_with(&mut rng, length)
}

/// [`generate_key`] with the customary 7 to 10 character range.
pub fn generate_default_key() -> String {
    generate_key(7, 10)
}

/// Number of distinct strings [`random_alphanum`] can return for `length`,
/// saturating at `u128::MAX`.
///
/// Up to 25 characters this is exact. Longer strings may repeat characters
/// and `57^length` is used as the bound.
pub fn combinations(length: usize) -> u128 {
    let base = ALPHANUM.len() as u128;
    let mut total: u128 = 1;
    for i in 0..length {
        let choices = if length <= SAMPLE_SIZE {
            base - i as u128
        } else {
            base
        };
        total = total.saturating_mul(choices);
    }
    total
}

/// Whether [`random_alphanum`] could have returned `value`.
pub fn is_reachable(value: &str) -> bool {
    let length = value.chars().count();
    if !value.chars().all(|c| ALPHANUM.contains(&c)) {
        return false;
    }
    if length > SAMPLE_SIZE {
        return true;
    }
    let mut seen = Vec::with_capacity(length);
    value.chars().all(|c| {
        let fresh = !seen.contains(&c);
        seen.push(c);
        fresh
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_is_numbers_then_letters() {
        let joined: Vec<char> = NUMBERS.iter().chain(LETTERS.iter()).copied().collect();
        assert_eq!(joined, ALPHANUM.to_vec());
        let unique: HashSet<char> = ALPHANUM.iter().copied().collect();
        assert_eq!(unique.len(), 57);
        for banned in ['0', '1', 'l', 'o', 'O'] {
            assert!(!unique.contains(&banned));
        }
    }

    #[test]
    fn test_random_alphanum_lengths() {
        for length in [0, 1, 10, 25, 26, 75, 200] {
            let s = random_alphanum(length);
            assert_eq!(s.chars().count(), length);
            assert!(s.chars().all(|c| ALPHANUM.contains(&c)));
        }
    }

    #[test]
    fn test_short_values_have_no_repeats() {
        let mut rng = StdRng::seed_from_u64(7);
        let s = random_alphanum_with(&mut rng, SAMPLE_SIZE);
        let unique: HashSet<char> = s.chars().collect();
        assert_eq!(unique.len(), SAMPLE_SIZE);
    }

    #[test]
    fn test_generate_key_range() {
        for _ in 0..50 {
            let len = generate_default_key().len();
            assert!((7..=10).contains(&len));
        }
        assert_eq!(generate_key(12, 3).len(), 12);
    }

    #[test]
    fn test_combinations() {
        assert_eq!(combinations(0), 1);
        assert_eq!(combinations(1), 57);
        assert_eq!(combinations(2), 3_192);
        assert_eq!(combinations(3), 175_560);
        assert_eq!(combinations(26), 57_u128.pow(26));
        assert_eq!(combinations(75), u128::MAX);
    }

    #[test]
    fn test_is_reachable() {
        assert!(is_reachable("a8"));
        assert!(!is_reachable("aa"));
        assert!(!is_reachable("0"));
        assert!(!is_reachable("lo"));
        let mut rng = StdRng::seed_from_u64(3);
        for length in [1, 5, 25, 40] {
            assert!(is_reachable(&random_alphanum_with(&mut rng, length)));
        }
        assert!(is_reachable(&"a".repeat(30)));
    }
}
