//! Parser tests.
//!
//! - `parser`: statements, expressions and precedence
//! - `fstring`: f-string bodies and replacement fields
//! - `errors`: inputs the parser must reject

mod parser;
