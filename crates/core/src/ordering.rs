//! Canonical ordering of route names.
//!
//! The sidebar, the legend and the group color assigner must all agree on the
//! order of selected routes, otherwise a route's dot in the list and its line
//! on the map end up with different colors. Everything that sorts routes for
//! display goes through [`canonical_cmp`].

use std::cmp::Ordering;
use std::iter::Peekable;
use std::sync::Arc;

use sitp_transit::RouteMeta;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Numeric-aware comparison that ignores case and accents
///
/// Runs of ASCII digits compare by value, so `"2" < "10"` and `"B2" < "B10"`.
/// Other characters are compared after lowercasing and stripping diacritics,
/// with punctuation and spaces sorting before digits and digits before
/// letters. Strings differing only by case, accents or leading zeros compare
/// equal.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = fold(a).peekable();
    let mut right = fold(b).peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ord = cmp_digit_runs(&take_digits(&mut left), &take_digits(&mut right));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = CharClass::of(l).cmp(&CharClass::of(r)).then(l.cmp(&r));
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

/// [`natural_cmp`] with a byte-order tie break, so distinct strings never compare equal
pub fn canonical_cmp(a: &str, b: &str) -> Ordering {
    natural_cmp(a, b).then_with(|| a.cmp(b))
}

/// Display order for routes: short name, then route id
pub fn route_cmp(a: &RouteMeta, b: &RouteMeta) -> Ordering {
    canonical_cmp(&a.short_name, &b.short_name).then_with(|| a.id.cmp(&b.id))
}

pub fn sort_routes(routes: &mut [Arc<RouteMeta>]) {
    routes.sort_by(|a, b| route_cmp(a, b));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Punctuation,
    Digit,
    Letter,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_ascii_digit() {
            CharClass::Digit
        } else if c.is_alphanumeric() {
            CharClass::Letter
        } else {
            CharClass::Punctuation
        }
    }
}

/// Lowercase, decomposed, with combining marks dropped
fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase)
}

fn take_digits<I: Iterator<Item = char>>(chars: &mut Peekable<I>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        digits.push(c);
    }
    digits
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    // Same length without leading zeros means lexical order is numeric order
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
