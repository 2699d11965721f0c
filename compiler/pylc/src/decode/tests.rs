use pretty_assertions::assert_eq;

use super::*;

#[test]
fn utf8_wins_when_valid() {
    assert_eq!(decode("x = 'é'\n".as_bytes()), Some(("x = 'é'\n".to_owned(), Codec::Utf8)));
}

#[test]
fn utf8_bom_is_stripped() {
    let bytes = b"\xEF\xBB\xBFx = 1\n";
    assert_eq!(decode(bytes), Some(("x = 1\n".to_owned(), Codec::Utf8)));
}

#[test]
fn utf16_needs_a_byte_order_mark() {
    let mut le = vec![0xFF, 0xFE];
    le.extend("x = 1\n".encode_utf16().flat_map(u16::to_le_bytes));
    assert_eq!(decode(&le), Some(("x = 1\n".to_owned(), Codec::Utf16)));

    let mut be = vec![0xFE, 0xFF];
    be.extend("y\n".encode_utf16().flat_map(u16::to_be_bytes));
    assert_eq!(Codec::Utf16.decode(&be), Some("y\n".to_owned()));

    assert_eq!(Codec::Utf16.decode(b"ab"), None);
}

#[test]
fn invalid_utf8_falls_back_to_latin1() {
    assert_eq!(decode(b"s = 'caf\xE9'\n"), Some(("s = 'café'\n".to_owned(), Codec::Latin1)));
}

#[test]
fn later_codecs_are_strict() {
    assert_eq!(Codec::Ascii.decode(b"abc"), Some("abc".to_owned()));
    assert_eq!(Codec::Ascii.decode(b"\x80"), None);
    assert_eq!(Codec::Gbk.decode(b"\xC4\xE3\xBA\xC3"), Some("你好".to_owned()));
    assert_eq!(Codec::Gbk.decode(b"\xFF"), None);
}

#[test]
fn unreadable_files_report_io() {
    let err = read_source(Path::new("/nonexistent/unit.py"));
    assert!(matches!(err, Err(DecodeError::Io { .. })));
}
