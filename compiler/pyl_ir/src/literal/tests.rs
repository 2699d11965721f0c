use super::*;
use pretty_assertions::assert_eq;

#[test]
fn float_repr_fixed_range() {
    assert_eq!(float_repr(1.0), "1.0");
    assert_eq!(float_repr(0.5), "0.5");
    assert_eq!(float_repr(-2.25), "-2.25");
    assert_eq!(float_repr(123_456.0), "123456.0");
    assert_eq!(float_repr(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(float_repr(0.0001), "0.0001");
    assert_eq!(float_repr(-0.0), "-0.0");
    assert_eq!(float_repr(1e15), "1000000000000000.0");
}

#[test]
fn float_repr_exponent_range() {
    assert_eq!(float_repr(1e16), "1e+16");
    assert_eq!(float_repr(1.5e-5), "1.5e-05");
    assert_eq!(float_repr(2.5e100), "2.5e+100");
    assert_eq!(float_repr(f64::INFINITY), "inf");
}

#[test]
fn str_repr_quote_selection() {
    assert_eq!(str_repr("abc"), "'abc'");
    assert_eq!(str_repr("it's"), "\"it's\"");
    assert_eq!(str_repr("both ' and \""), "'both \\' and \"'");
    assert_eq!(str_repr("tab\there\n"), "'tab\\there\\n'");
    assert_eq!(str_repr("\u{7}"), "'\\x07'");
}

#[test]
fn bytes_repr_escapes() {
    assert_eq!(bytes_repr(b"ab\x00\xff"), "b'ab\\x00\\xff'");
    assert_eq!(bytes_repr(b"'"), "b\"'\"");
}

#[test]
fn literal_source_spelling() {
    assert_eq!(Literal::Bool(true).to_source().as_deref(), Some("True"));
    assert_eq!(Literal::Imaginary(2.0).to_source().as_deref(), Some("2j"));
    assert_eq!(Literal::Imaginary(0.5).to_source().as_deref(), Some("0.5j"));
    assert_eq!(Literal::Float(f64::NAN).to_source(), None);
    assert_eq!(Literal::Ellipsis.to_source().as_deref(), Some("..."));
}
