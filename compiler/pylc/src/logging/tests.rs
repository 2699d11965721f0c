use super::*;

#[test]
fn critical_shares_the_error_filter() {
    assert_eq!(LogLevel::Critical.directive(), "error");
    assert_eq!(LogLevel::default().directive(), "info");
}

#[test]
fn levels_parse_from_the_command_line() {
    assert_eq!(LogLevel::from_str("critical", true), Ok(LogLevel::Critical));
    assert!(LogLevel::from_str("trace", true).is_err());
}
