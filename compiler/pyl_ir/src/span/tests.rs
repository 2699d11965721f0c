use super::*;

#[test]
fn merge_covers_both() {
    let a = Span::new(4, 9);
    let b = Span::new(2, 6);
    assert_eq!(a.merge(b), Span::new(2, 9));
}

#[test]
fn merge_ignores_dummy() {
    let a = Span::new(4, 9);
    assert_eq!(a.merge(Span::DUMMY), a);
    assert_eq!(Span::DUMMY.merge(a), a);
}

#[test]
fn dummy_is_default_and_empty() {
    assert_eq!(Span::default(), Span::DUMMY);
    assert!(Span::DUMMY.is_empty());
    assert!(!Span::new(0, 0).is_dummy());
}

#[test]
fn from_range_round_trips() {
    let span = Span::from_range(3..11);
    assert_eq!(span.to_range(), 3..11);
    assert_eq!(span.len(), 8);
}

#[test]
fn debug_format() {
    assert_eq!(format!("{:?}", Span::new(1, 2)), "1..2");
    assert_eq!(format!("{:?}", Span::DUMMY), "Span::DUMMY");
}
