use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use weft_dom::ident::{IdError, IdFormat, IdGenerator};
use weft_dom::Identifier;

#[test]
fn identifiers_follow_the_format() {
    let mut ids = IdGenerator::default();
    let format = IdFormat::default();
    for _ in 0..200 {
        let id = ids.next().unwrap();
        let s = id.as_str();
        assert_eq!(s.len(), 16);
        assert!(format.matches(s), "{s} should match the default format");
        assert!(s[..2].chars().all(|c| c.is_ascii_digit()));
        assert!(!s.contains('-'));
        assert_eq!(s, s.to_ascii_lowercase());
    }
}

#[test]
fn identifiers_are_unique_within_a_generator() {
    let mut ids = IdGenerator::new(IdFormat {
        header_len: 1,
        body_len: 2,
    });
    let mut seen = HashSet::new();
    for _ in 0..500 {
        assert!(seen.insert(ids.next().unwrap()));
    }
    assert_eq!(ids.issued(), 500);
}

#[test]
fn excluded_identifiers_are_redrawn() {
    let mut a = IdGenerator::with_rng(IdFormat::default(), StdRng::seed_from_u64(7));
    let taken = a.next().unwrap();

    // Same seed draws `taken` first; the registry forces a redraw.
    let mut b = IdGenerator::with_rng(IdFormat::default(), StdRng::seed_from_u64(7))
        .excluding([&taken]);
    let fresh = b.next().unwrap();
    assert_ne!(fresh, taken);
    assert!(IdFormat::default().matches(fresh.as_str()));
}

#[test]
fn empty_body_is_rejected() {
    for format in [
        IdFormat { header_len: 1, body_len: 0 },
        IdFormat { header_len: 0, body_len: 0 },
    ] {
        assert_eq!(IdGenerator::new(format).next(), Err(IdError::EmptyBody));
    }
}

#[test]
fn exhausted_format_fails_instead_of_spinning() {
    let format = IdFormat {
        header_len: 0,
        body_len: 1,
    };
    assert_eq!(format.capacity(), Some(37));

    let mut ids = IdGenerator::with_rng(format, StdRng::seed_from_u64(3));
    let all: HashSet<_> = (0..37).map(|_| ids.next().unwrap()).collect();
    assert_eq!(all.len(), 37);
    assert_eq!(ids.next(), Err(IdError::Exhausted { capacity: 37 }));
    assert_eq!(ids.next(), Err(IdError::Exhausted { capacity: 37 }));
}

#[test]
fn excluded_identifiers_count_against_capacity() {
    let format = IdFormat {
        header_len: 1,
        body_len: 1,
    };
    assert_eq!(format.capacity(), Some(370));

    let taken: Vec<Identifier> = (0..10)
        .flat_map(|h| {
            "0123456789_abcdefghijklmnopqrstuvwxyz"
                .chars()
                .map(move |b| Identifier::new_unchecked(format!("{h}{b}")))
        })
        .collect();
    // identifiers of another shape do not use up the space
    let foreign = Identifier::new_unchecked("not-an-id");
    let mut ids = IdGenerator::new(format).excluding(taken.iter().chain([&foreign]));
    assert_eq!(ids.issued(), 371);
    assert_eq!(ids.next(), Err(IdError::Exhausted { capacity: 370 }));
}

#[test]
fn huge_formats_have_no_capacity_limit() {
    let format = IdFormat {
        header_len: 2,
        body_len: 40,
    };
    assert_eq!(format.capacity(), None);
    assert!(IdGenerator::new(format).next().is_ok());
}
