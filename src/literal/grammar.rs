//! Literal expression grammar using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::literal::ast::LiteralExpr;
use crate::literal::lexer::Token;
use crate::model::Literal;

/// Parse a literal expression
pub fn parse_literal(input: &str) -> Result<LiteralExpr, Vec<crate::LiteralError>> {
    let len = input.len();

    let token_iter = crate::literal::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    literal_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

fn literal_parser<'a, I>() -> impl Parser<'a, I, LiteralExpr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let positive = select! {
        Token::Int(n) => Literal::Int(n),
        Token::Float(x) => Literal::Float(x),
        Token::Str(s) => Literal::Str(s),
        Token::True => Literal::Bool(true),
        Token::False => Literal::Bool(false),
        Token::None => Literal::None,
    };

    let negative = just(Token::Minus).ignore_then(select! {
        Token::Int(n) => Literal::Int(-n),
        Token::Float(x) => Literal::Float(-x),
    });

    let atom = choice((positive, negative)).labelled("literal");

    recursive(|expr| {
        let list = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
            .map(LiteralExpr::List);

        // `(x)` is a grouping, `(x,)` and `()` are tuples
        let parenthesized = expr
            .clone()
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .then(just(Token::Comma).or_not())
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
            .map(|(mut items, trailing)| {
                if items.len() == 1 && trailing.is_none() {
                    if let Some(single) = items.pop() {
                        return single;
                    }
                }
                LiteralExpr::Tuple(items)
            });

        let dict = atom
            .clone()
            .then_ignore(just(Token::Colon))
            .then(expr.clone())
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
            .map(LiteralExpr::Dict);

        let set = expr
            .clone()
            .separated_by(just(Token::Comma))
            .at_least(1)
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
            .map(LiteralExpr::Set);

        choice((
            atom.clone().map(LiteralExpr::Atom),
            list,
            parenthesized,
            dict,
            set,
        ))
    })
}
