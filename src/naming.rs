//! Natural-sort ordering for file and folder names.
//!
//! Camera and scanner output is named like `IMG_2.jpg`, `IMG_10.jpg`. A plain
//! byte-wise sort puts `IMG_10` before `IMG_2`; people expect the opposite.
//! [`NaturalKey`] splits a name into alternating digit and text runs and
//! compares digit runs by numeric value:
//!
//! - `"img2"` < `"img10"` (2 < 10, not `'2'` > `'1'`)
//! - `"a1"` < `"a2"` < `"a10"`
//! - `"Photo"` and `"photo"` compare equal on text, then fall back to a
//!   byte-wise tie-break so the order stays total and reproducible.
//!
//! Digit runs sort before text runs at the same position, so `"1-intro"`
//! comes before `"intro"`. Numbers are compared as strings with leading zeros
//! stripped, so arbitrarily long digit runs never overflow.

use std::cmp::Ordering;

/// One run of a name: either consecutive ASCII digits or everything between them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    /// Digit run with leading zeros stripped. `len` is compared first, so
    /// a longer number is always larger.
    Number { len: usize, digits: String },
    /// Case-folded text run.
    Text(String),
}

/// Sort key implementing natural ordering for a single name.
///
/// Build once per name (`sort_by_cached_key`) rather than re-splitting on
/// every comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalKey {
    chunks: Vec<Chunk>,
    raw: String,
}

impl NaturalKey {
    pub fn new(name: &str) -> Self {
        Self {
            chunks: split_chunks(name),
            raw: name.to_string(),
        }
    }
}

impl Ord for NaturalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chunks
            .cmp(&other.chunks)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for NaturalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two names in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    NaturalKey::new(a).cmp(&NaturalKey::new(b))
}

fn split_chunks(name: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut rest = name;

    while let Some(first) = rest.chars().next() {
        let is_digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);

        if is_digit {
            let trimmed = run.trim_start_matches('0');
            chunks.push(Chunk::Number {
                len: trimmed.len(),
                digits: trimmed.to_string(),
            });
        } else {
            chunks.push(Chunk::Text(run.to_lowercase()));
        }
        rest = tail;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        v.sort_by_cached_key(|s| NaturalKey::new(s));
        v
    }

    #[test]
    fn numeric_runs_compare_by_value() {
        assert_eq!(
            sorted(&["a2.jpg", "a10.jpg", "a1.jpg"]),
            vec!["a1.jpg", "a2.jpg", "a10.jpg"]
        );
    }

    #[test]
    fn img_prefix_camera_names() {
        assert_eq!(natural_cmp("img2", "img10"), Ordering::Less);
        assert_eq!(natural_cmp("IMG_0099", "IMG_0100"), Ordering::Less);
    }

    #[test]
    fn text_comparison_ignores_case_first() {
        assert_eq!(
            sorted(&["beach.jpg", "Apple.jpg", "cliff.jpg"]),
            vec!["Apple.jpg", "beach.jpg", "cliff.jpg"]
        );
    }

    #[test]
    fn case_variants_tie_break_deterministically() {
        let a = sorted(&["photo.jpg", "Photo.jpg"]);
        let b = sorted(&["Photo.jpg", "photo.jpg"]);
        assert_eq!(a, b);
        assert_eq!(a, vec!["Photo.jpg", "photo.jpg"]);
    }

    #[test]
    fn leading_zeros_equal_value_tie_break() {
        assert_eq!(sorted(&["01.jpg", "1.jpg"]), vec!["01.jpg", "1.jpg"]);
        assert_eq!(natural_cmp("002", "10"), Ordering::Less);
    }

    #[test]
    fn digits_sort_before_text() {
        assert_eq!(natural_cmp("1-intro", "intro"), Ordering::Less);
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(natural_cmp("a", "a1"), Ordering::Less);
        assert_eq!(natural_cmp("trip", "trip 2"), Ordering::Less);
    }

    #[test]
    fn very_long_numbers_do_not_overflow() {
        let big = "99999999999999999999999999999";
        let bigger = "100000000000000000000000000000";
        assert_eq!(natural_cmp(big, bigger), Ordering::Less);
    }

    #[test]
    fn empty_name_sorts_first() {
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
        assert_eq!(natural_cmp("", ""), Ordering::Equal);
    }
}
