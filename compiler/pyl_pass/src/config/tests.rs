use std::str::FromStr;

use super::*;

#[test]
fn levels_are_ordered() {
    assert!(OptLevel::O0 < OptLevel::O1);
    assert!(OptLevel::O2 < OptLevel::O3);
    assert_eq!(OptLevel::ALL.iter().max(), Some(&OptLevel::O3));
}

#[test]
fn levels_parse_from_their_names() {
    assert_eq!(OptLevel::from_str("O2"), Ok(OptLevel::O2));
    assert!(OptLevel::from_str("O4").is_err());
    assert_eq!(OptLevel::O3.to_string(), "O3");
}
