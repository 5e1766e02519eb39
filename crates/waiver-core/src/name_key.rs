// Player-name folding used as the join key between independent sources.
//
// The sources share no player identifiers, so records are matched on a
// canonical form of the display name. Distinct players whose names fold to
// the same key are merged; that false-merge risk is accepted.

use unicode_normalization::UnicodeNormalization;

/// Characters that are dropped without splitting the surrounding word, so
/// that "O'Brien" folds to "obrien" rather than "o brien".
const ELIDED: &[char] = &['\'', '\u{2019}', '\u{2018}', '\u{02BC}', '`'];

/// Fold a display name into its join key.
///
/// Decomposes to base Latin letters (accents and other combining marks are
/// dropped), lowercases, elides apostrophes, replaces every run of other
/// non-letter characters with a single space and trims. Total: any input,
/// including an empty or entirely non-Latin string, yields a (possibly
/// empty) key.
pub fn normalize(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.nfkd() {
        if ELIDED.contains(&c) {
            continue;
        }
        if c.is_ascii_alphabetic() {
            if pending_space && !key.is_empty() {
                key.push(' ');
            }
            pending_space = false;
            key.push(c.to_ascii_lowercase());
        } else if c.is_ascii() {
            pending_space = true;
        }
        // Non-ASCII remnants (combining marks, non-Latin scripts) vanish
        // without introducing a separator.
    }

    key
}
