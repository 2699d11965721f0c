#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn names_round_trip_through_strum() {
    assert_eq!("ZeroDivisionError".parse::<ExcType>().unwrap(), ExcType::ZeroDivisionError);
    assert_eq!(ExcType::UnboundLocalError.to_string(), "UnboundLocalError");
    let name: &'static str = ExcType::KeyError.into();
    assert_eq!(name, "KeyError");
    assert!("NotAnError".parse::<ExcType>().is_err());
}

#[test]
fn hierarchy() {
    assert!(ExcType::ZeroDivisionError.is_subclass_of(ExcType::ArithmeticError));
    assert!(ExcType::ZeroDivisionError.is_subclass_of(ExcType::Exception));
    assert!(ExcType::KeyError.is_subclass_of(ExcType::LookupError));
    assert!(ExcType::UnboundLocalError.is_subclass_of(ExcType::NameError));
    assert!(ExcType::RecursionError.is_subclass_of(ExcType::RuntimeError));
    assert!(ExcType::TypeError.is_subclass_of(ExcType::BaseException));
    assert!(!ExcType::TypeError.is_subclass_of(ExcType::ValueError));
    assert!(!ExcType::NameError.is_subclass_of(ExcType::UnboundLocalError));
    assert!(!ExcType::BaseException.is_subclass_of(ExcType::Exception));
}

#[test]
fn raised_display() {
    let err = ObjectError::raised(ExcType::ValueError, "negative shift count");
    assert_eq!(err.to_string(), "ValueError: negative shift count");
}
