//! Error types for reading definition sources

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::model::ScopeError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors raised while reading definition sources
#[derive(Debug, Error)]
pub enum ReadError {
    /// The source could not be read at all
    #[error("failed to read {location}: {error}")]
    Io {
        location: String,
        #[source]
        error: std::io::Error,
    },

    /// The document as a whole cannot be interpreted
    #[error("malformed source {location}: {message}")]
    MalformedSource { location: String, message: String },

    /// An explicitly given scope token is not recognized
    #[error("{location}: object '{object}': {source}")]
    UnknownScope {
        location: String,
        object: String,
        source: ScopeError,
    },

    /// A `parent` id that names no declaration in the same source
    #[error("{location}: object '{object}' inherits from unknown template '{parent}'")]
    UnknownTemplate {
        location: String,
        object: String,
        parent: String,
    },

    /// A template chain that loops back on itself
    #[error("{location}: circular template chain: {}", chain.join(" -> "))]
    CircularTemplate { location: String, chain: Vec<String> },
}

impl ReadError {
    pub fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSource {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Location of the source the error belongs to
    pub fn location(&self) -> &str {
        match self {
            Self::Io { location, .. }
            | Self::MalformedSource { location, .. }
            | Self::UnknownScope { location, .. }
            | Self::UnknownTemplate { location, .. }
            | Self::CircularTemplate { location, .. } => location,
        }
    }
}

/// Syntax error in a literal expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiteralError {
    #[error("literal error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl LiteralError {
    pub fn span(&self) -> &Span {
        match self {
            LiteralError::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            LiteralError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);
                if written.is_err() {
                    return self.to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::literal::lexer::Token>> for LiteralError {
    fn from(err: chumsky::error::Rich<'a, crate::literal::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(tok) if tok.is_unsupported() => format!(
                    "unsupported expression: {} (only literals are allowed)",
                    format_token(tok)
                ),
                Some(tok) => format!("Unexpected {}", format_token(tok)),
                None => "Unexpected end of input".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        LiteralError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::literal::lexer::Token) -> String {
    use crate::literal::lexer::Token;
    match tok {
        Token::Ident(s) => format!("name '{}'", s),
        Token::Str(s) => format!("string {:?}", s),
        Token::Int(n) => format!("number {}", n),
        Token::Float(x) => format!("number {}", x),
        Token::True => "'True'".to_string(),
        Token::False => "'False'".to_string(),
        Token::None => "'None'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::BracketOpen => "'['".to_string(),
        Token::BracketClose => "']'".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::BraceOpen => "'{'".to_string(),
        Token::BraceClose => "'}'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::Error => "unrecognized character".to_string(),
    }
}
