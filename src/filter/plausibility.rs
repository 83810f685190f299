//! Heuristic gate that rejects geocoder noise (category headers, bare
//! coordinates, non-address POIs) before an address is accepted.

use hashbrown::HashSet;
use regex::Regex;
use std::sync::LazyLock;

/// Non-word characters. Combining marks are not word characters here, so a
/// decomposed "é" counts once.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]|\p{M}").expect("static regex is valid"));

/// Word characters that are neither digits nor combining marks
static LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\W\d\p{M}]").expect("static regex is valid"));

const MIN_COMPACT_LEN: usize = 30;
const MAX_COMPACT_LEN: usize = 300;
const MIN_LETTERS: usize = 20;
const MIN_DISTINCT_CHARS: usize = 5;
const MIN_COMMAS: usize = 2;

const BLACKLIST: &[char] = &[
    '`', ':', '%', '@', '*', '^', '[', ']', '{', '}', '_', '«', '»',
];

/// Returns true if `address` looks like a real, comma-separated street
/// address. All checks must pass.
pub fn looks_like_address(address: &str) -> bool {
    let address = address.trim().to_lowercase();

    let compact_len = NON_WORD.replace_all(&address, "").chars().count();
    if !(MIN_COMPACT_LEN..=MAX_COMPACT_LEN).contains(&compact_len) {
        return false;
    }

    if LETTER.find_iter(&address).count() < MIN_LETTERS {
        return false;
    }

    if !address.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }

    if address.chars().collect::<HashSet<char>>().len() < MIN_DISTINCT_CHARS {
        return false;
    }

    let stripped = address.replace(['-', ';'], "");
    let has_numbered_section = stripped
        .split(',')
        .any(|section| section.trim().chars().any(|c| c.is_ascii_digit()));
    if !has_numbered_section || address.matches(',').count() < MIN_COMMAS {
        return false;
    }

    !address.contains(BLACKLIST)
}
