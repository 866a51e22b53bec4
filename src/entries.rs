//! Entry list handling: parsing free-form text into labels, shuffling, and
//! sorting with Czech collation rules.

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

/// Shown on an empty wheel so there is always something to draw.
pub const PLACEHOLDER: &str = "—";

/// Split newline-delimited text into trimmed, non-blank labels.
pub fn parse_entries(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Number of non-blank lines in `text`.
pub fn entry_count(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Labels to draw: the entries, or the placeholder when there are none.
pub fn display_labels(entries: &[String]) -> Vec<String> {
    if entries.is_empty() {
        vec![PLACEHOLDER.to_string()]
    } else {
        entries.to_vec()
    }
}

/// True when `entries` is only the drawing placeholder.
pub fn is_placeholder(entries: &[String]) -> bool {
    entries.len() == 1 && entries[0] == PLACEHOLDER
}

pub fn shuffle_entries<R: Rng + ?Sized>(entries: &mut [String], rng: &mut R) {
    entries.shuffle(rng);
}

pub fn sort_entries(entries: &mut [String]) {
    entries.sort_by(|a, b| czech_cmp(a, b));
}

/// Compare two labels the way a Czech dictionary orders them.
///
/// Primary level: `ch` is a letter between `h` and `i`; `č ř š ž` follow
/// `c r s z`; whitespace and punctuation sort before digits, digits before
/// letters. Secondary level: any other accented Latin letter (`á ě ů`, but
/// also `à ç ñ ô`) ranks with its base letter and differs only by accent.
/// Tertiary level: uppercase before lowercase.
pub fn czech_cmp(a: &str, b: &str) -> Ordering {
    CollationKey::new(a)
        .cmp(&CollationKey::new(b))
        .then_with(|| a.cmp(b))
}

const SPACE_BASE: u32 = 0x1;
const PUNCT_BASE: u32 = 0x100;
const DIGIT_BASE: u32 = 0x20_0000;
const LETTER_BASE: u32 = 0x30_0000;
const OTHER_BASE: u32 = 0x40_0000;

const ALPHABET: [&str; 31] = [
    "a", "b", "c", "č", "d", "e", "f", "g", "h", "ch", "i", "j", "k", "l", "m", "n", "o", "p",
    "q", "r", "ř", "s", "š", "t", "u", "v", "w", "x", "y", "z", "ž",
];

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    primary: Vec<u32>,
    secondary: Vec<u8>,
    tertiary: Vec<u8>,
}

impl CollationKey {
    fn new(text: &str) -> Self {
        let mut key = Self {
            primary: Vec::with_capacity(text.len()),
            secondary: Vec::with_capacity(text.len()),
            tertiary: Vec::with_capacity(text.len()),
        };

        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            let upper = c.is_uppercase();
            let lower = c.to_lowercase().next().unwrap_or(c);

            if lower == 'c' && matches!(chars.peek(), Some('h' | 'H')) {
                chars.next();
                key.push(letter_weight("ch"), 0, upper);
                continue;
            }

            let (base, accent) = strip_secondary(lower);
            let mut buf = [0u8; 4];
            let weight = if c.is_whitespace() {
                SPACE_BASE
            } else if let Some(digit) = c.to_digit(10) {
                DIGIT_BASE + digit
            } else if let Some(weight) = letter_weight(base.encode_utf8(&mut buf)) {
                weight
            } else if c.is_alphabetic() {
                OTHER_BASE + base as u32
            } else {
                PUNCT_BASE + c as u32
            };
            key.push(Some(weight), accent, upper);
        }
        key
    }

    fn push(&mut self, weight: Option<u32>, accent: u8, upper: bool) {
        if let Some(weight) = weight {
            self.primary.push(weight);
            self.secondary.push(accent);
            // uppercase first
            self.tertiary.push(if upper { 0 } else { 1 });
        }
    }
}

fn letter_weight(letter: &str) -> Option<u32> {
    ALPHABET
        .iter()
        .position(|&l| l == letter)
        .map(|pos| LETTER_BASE + pos as u32)
}

/// Combining marks in the order their letters sort after the bare base letter.
const ACCENT_ORDER: [char; 10] = [
    '\u{301}', // acute
    '\u{300}', // grave
    '\u{306}', // breve
    '\u{302}', // circumflex
    '\u{30C}', // caron
    '\u{30A}', // ring
    '\u{308}', // diaeresis
    '\u{30B}', // double acute
    '\u{303}', // tilde
    '\u{307}', // dot above
];

/// Split a lowercase letter into its collation base and accent rank.
///
/// Letters of the Czech alphabet (`č ř š ž` included) are their own base.
/// Anything else that decomposes canonically falls back to its first
/// component, ranked by its first combining mark.
fn strip_secondary(c: char) -> (char, u8) {
    let mut buf = [0u8; 4];
    if letter_weight(c.encode_utf8(&mut buf)).is_some() {
        return (c, 0);
    }

    let mut base = None;
    let mut mark = None;
    decompose_canonical(c, |part| {
        if base.is_none() {
            base = Some(part);
        } else if mark.is_none() && is_combining_mark(part) {
            mark = Some(part);
        }
    });

    match (base, mark) {
        (Some(base), Some(mark)) if base != c => (base, accent_rank(mark)),
        _ => (c, 0),
    }
}

fn accent_rank(mark: char) -> u8 {
    match ACCENT_ORDER.iter().position(|&m| m == mark) {
        Some(pos) => pos as u8 + 1,
        None => 0x20 + (mark as u32).saturating_sub(0x300).min(0xdf) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_drops_blank_lines_and_trims() {
        let text = "  CS \n\n\r\nRakashu\r\n   \nKAJINKA\n";
        assert_eq!(parse_entries(text), owned(&["CS", "Rakashu", "KAJINKA"]));
        assert_eq!(entry_count(text), 3);
        assert!(parse_entries(" \n\t\n").is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        assert_eq!(parse_entries("CS\nCS\nCS"), owned(&["CS", "CS", "CS"]));
    }

    #[test]
    fn empty_list_displays_placeholder() {
        let labels = display_labels(&[]);
        assert_eq!(labels, owned(&[PLACEHOLDER]));
        assert!(is_placeholder(&labels));
        assert!(!is_placeholder(&owned(&["CS"])));
    }

    #[test]
    fn shuffle_keeps_the_multiset() {
        let mut entries = owned(&["CS", "CS", "CS", "Rakashu", "KAJINKA", "SKULL", "NIKOLKA"]);
        let mut rng = StdRng::seed_from_u64(21);
        shuffle_entries(&mut entries, &mut rng);
        let mut sorted = entries.clone();
        sorted.sort();
        let mut expected = owned(&["CS", "CS", "CS", "Rakashu", "KAJINKA", "SKULL", "NIKOLKA"]);
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn czech_alphabet_order() {
        let mut entries = owned(&[
            "žába", "zebra", "SKULL", "řeka", "Rakashu", "NIKOLKA", "NEPORAZITELNY", "KAJINKA",
            "chata", "hrad", "čaj", "CS", "cihla", "Ábel", "abeceda",
        ]);
        sort_entries(&mut entries);
        assert_eq!(
            entries,
            owned(&[
                "abeceda", "Ábel", "cihla", "CS", "čaj", "hrad", "chata", "KAJINKA",
                "NEPORAZITELNY", "NIKOLKA", "Rakashu", "řeka", "SKULL", "zebra", "žába",
            ])
        );
    }

    #[test]
    fn accents_and_case_break_ties_only() {
        let mut entries = owned(&["dasa", "ďas", "das"]);
        sort_entries(&mut entries);
        assert_eq!(entries, owned(&["das", "ďas", "dasa"]));

        let mut entries = owned(&["b", "B", "a"]);
        sort_entries(&mut entries);
        assert_eq!(entries, owned(&["a", "B", "b"]));
    }

    #[test]
    fn digits_and_punctuation_come_first() {
        let mut entries = owned(&["b", "10", "a", "2", "-x"]);
        sort_entries(&mut entries);
        assert_eq!(entries, owned(&["-x", "10", "2", "a", "b"]));
    }

    #[test]
    fn foreign_accents_sort_with_their_base_letter() {
        let mut entries = owned(&["b", "àb", "d", "çaj", "o", "ña"]);
        sort_entries(&mut entries);
        assert_eq!(entries, owned(&["àb", "b", "çaj", "d", "ña", "o"]));

        let mut entries = owned(&["ôa", "oa", "óa", "ob"]);
        sort_entries(&mut entries);
        assert_eq!(entries, owned(&["oa", "óa", "ôa", "ob"]));
    }

    #[test]
    fn czech_letters_keep_their_own_place() {
        // ç is a c variant, č is a separate letter after c
        let mut entries = owned(&["čb", "ça", "cz", "Ça"]);
        sort_entries(&mut entries);
        assert_eq!(entries, owned(&["Ça", "ça", "cz", "čb"]));
    }

    #[test]
    fn capital_ch_digraph_is_one_letter() {
        assert_eq!(czech_cmp("Chrudim", "Hustopeče"), Ordering::Greater);
        assert_eq!(czech_cmp("CHLUM", "Ivančice"), Ordering::Less);
    }
}
