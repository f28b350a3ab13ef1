//! Safe literal expressions
//!
//! Legacy sources may carry property values as literal expressions. Only
//! numbers, strings, booleans, `None` and nested lists, tuples, dicts and
//! sets are accepted; names, attribute access and operators are rejected
//! rather than evaluated.

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::LiteralExpr;
pub use grammar::parse_literal;
