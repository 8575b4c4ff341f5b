// SPDX-License-Identifier: MIT

//! Tokenizer for script expressions

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Contains,
    EqEq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

/// A token and the byte offset where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

static KEYWORDS: Lazy<HashMap<&'static str, Token>> = Lazy::new(|| {
    HashMap::from([
        ("true", Token::True),
        ("false", Token::False),
        ("null", Token::Null),
        ("and", Token::And),
        ("or", Token::Or),
        ("not", Token::Not),
        ("contains", Token::Contains),
    ])
});

/// Split `input` into tokens
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, EngineError> {
    let mut chars = input.char_indices().peekable();
    let mut tokens = Vec::new();

    while let Some(&(position, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let token = if c.is_ascii_digit() {
            lex_number(input, &mut chars)?
        } else if c == '\'' || c == '"' {
            lex_string(&mut chars)?
        } else if c.is_ascii_alphabetic() || c == '_' {
            lex_word(input, &mut chars)
        } else {
            chars.next();
            match c {
                '(' => Token::LParen,
                ')' => Token::RParen,
                '[' => Token::LBracket,
                ']' => Token::RBracket,
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '%' => Token::Percent,
                '=' if next_is(&mut chars, '=') => Token::EqEq,
                '!' if next_is(&mut chars, '=') => Token::NotEq,
                '!' => Token::Not,
                '<' if next_is(&mut chars, '=') => Token::Lte,
                '<' => Token::Lt,
                '>' if next_is(&mut chars, '=') => Token::Gte,
                '>' => Token::Gt,
                '&' if next_is(&mut chars, '&') => Token::And,
                '|' if next_is(&mut chars, '|') => Token::Or,
                _ => return Err(EngineError::UnexpectedChar { ch: c, position }),
            }
        };

        tokens.push(Spanned { token, position });
    }

    Ok(tokens)
}

/// Consume the next char if it is `expected`
fn next_is(chars: &mut Peekable<CharIndices<'_>>, expected: char) -> bool {
    chars.next_if(|&(_, c)| c == expected).is_some()
}

fn lex_number(input: &str, chars: &mut Peekable<CharIndices<'_>>) -> Result<Token, EngineError> {
    let start = chars.peek().map(|&(i, _)| i).unwrap_or(input.len());
    let mut end = start;
    let mut is_float = false;

    while let Some(&(i, c)) = chars.peek() {
        if c.is_ascii_digit() {
            end = i + 1;
            chars.next();
        } else if c == '.' && !is_float && digit_follows(input, i) {
            is_float = true;
            end = i + 1;
            chars.next();
        } else {
            break;
        }
    }

    let text = &input[start..end];
    let invalid = || EngineError::InvalidNumber {
        text: text.to_string(),
        position: start,
    };
    if is_float {
        text.parse::<f64>().map(Token::Float).map_err(|_| invalid())
    } else {
        text.parse::<i64>().map(Token::Int).map_err(|_| invalid())
    }
}

fn digit_follows(input: &str, dot: usize) -> bool {
    input.as_bytes().get(dot + 1).is_some_and(|b| b.is_ascii_digit())
}

fn lex_string(chars: &mut Peekable<CharIndices<'_>>) -> Result<Token, EngineError> {
    let Some((position, quote)) = chars.next() else {
        return Err(EngineError::UnterminatedString { position: 0 });
    };
    let mut value = String::new();

    loop {
        match chars.next() {
            None => return Err(EngineError::UnterminatedString { position }),
            Some((_, c)) if c == quote => return Ok(Token::Str(value)),
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, escaped)) => value.push(escaped),
                None => return Err(EngineError::UnterminatedString { position }),
            },
            Some((_, c)) => value.push(c),
        }
    }
}

fn lex_word(input: &str, chars: &mut Peekable<CharIndices<'_>>) -> Token {
    let start = chars.peek().map(|&(i, _)| i).unwrap_or(input.len());
    let mut end = start;
    while let Some((i, c)) = chars.next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '_') {
        end = i + c.len_utf8();
    }

    let word = &input[start..end];
    KEYWORDS
        .get(word)
        .cloned()
        .unwrap_or_else(|| Token::Ident(word.to_string()))
}
