//! Tokenizer for the checker snippet language.

use crate::error::SnippetError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Str(String),
    Ident(String),
    True,
    False,
    While,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    /// Statement separator: `;` or a line break.
    Sep,
}

/// A token plus the byte offset where it started, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Tokenize a snippet. `#` starts a comment running to end of line; line
/// breaks and `;` both separate statements.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, SnippetError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    let err = |offset: usize, message: String| SnippetError::Syntax { offset, message };

    while pos < bytes.len() {
        let start = pos;
        let Some(c) = source[pos..].chars().next() else {
            break;
        };

        match c {
            ' ' | '\t' | '\r' => pos += 1,
            '\n' => {
                tokens.push(Spanned {
                    token: Token::Sep,
                    offset: start,
                });
                pos += 1;
            }
            ';' => {
                tokens.push(Spanned {
                    token: Token::Sep,
                    offset: start,
                });
                pos += 1;
            }
            '#' => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    pos += 1;
                }
            }
            '(' => push_single(&mut tokens, Token::LParen, start, &mut pos),
            ')' => push_single(&mut tokens, Token::RParen, start, &mut pos),
            '{' => push_single(&mut tokens, Token::LBrace, start, &mut pos),
            '}' => push_single(&mut tokens, Token::RBrace, start, &mut pos),
            ',' => push_single(&mut tokens, Token::Comma, start, &mut pos),
            '+' => push_single(&mut tokens, Token::Plus, start, &mut pos),
            '-' => push_single(&mut tokens, Token::Minus, start, &mut pos),
            '*' => push_single(&mut tokens, Token::Star, start, &mut pos),
            '/' => push_single(&mut tokens, Token::Slash, start, &mut pos),
            '%' => push_single(&mut tokens, Token::Percent, start, &mut pos),
            '=' => {
                pos += 1;
                if bytes.get(pos) == Some(&b'=') {
                    pos += 1;
                    tokens.push(Spanned {
                        token: Token::EqEq,
                        offset: start,
                    });
                } else {
                    tokens.push(Spanned {
                        token: Token::Assign,
                        offset: start,
                    });
                }
            }
            '!' => {
                pos += 1;
                if bytes.get(pos) == Some(&b'=') {
                    pos += 1;
                    tokens.push(Spanned {
                        token: Token::NotEq,
                        offset: start,
                    });
                } else {
                    tokens.push(Spanned {
                        token: Token::Bang,
                        offset: start,
                    });
                }
            }
            '<' => {
                pos += 1;
                if bytes.get(pos) == Some(&b'=') {
                    pos += 1;
                    tokens.push(Spanned {
                        token: Token::Le,
                        offset: start,
                    });
                } else {
                    tokens.push(Spanned {
                        token: Token::Lt,
                        offset: start,
                    });
                }
            }
            '>' => {
                pos += 1;
                if bytes.get(pos) == Some(&b'=') {
                    pos += 1;
                    tokens.push(Spanned {
                        token: Token::Ge,
                        offset: start,
                    });
                } else {
                    tokens.push(Spanned {
                        token: Token::Gt,
                        offset: start,
                    });
                }
            }
            '&' => {
                if bytes.get(pos + 1) == Some(&b'&') {
                    pos += 2;
                    tokens.push(Spanned {
                        token: Token::AndAnd,
                        offset: start,
                    });
                } else {
                    return Err(err(start, "expected '&&'".into()));
                }
            }
            '|' => {
                if bytes.get(pos + 1) == Some(&b'|') {
                    pos += 2;
                    tokens.push(Spanned {
                        token: Token::OrOr,
                        offset: start,
                    });
                } else {
                    return Err(err(start, "expected '||'".into()));
                }
            }
            '"' | '\'' => {
                let quote = c;
                pos += 1;
                let mut text = String::new();
                loop {
                    let Some(ch) = source[pos..].chars().next() else {
                        return Err(err(start, "unterminated string literal".into()));
                    };
                    pos += ch.len_utf8();
                    if ch == quote {
                        break;
                    }
                    if ch == '\\' {
                        let Some(escaped) = source[pos..].chars().next() else {
                            return Err(err(start, "unterminated string literal".into()));
                        };
                        pos += escaped.len_utf8();
                        match escaped {
                            'n' => text.push('\n'),
                            't' => text.push('\t'),
                            '\\' | '\'' | '"' => text.push(escaped),
                            other => {
                                return Err(err(
                                    start,
                                    format!("unknown escape '\\{other}' in string literal"),
                                ));
                            }
                        }
                    } else {
                        text.push(ch);
                    }
                }
                tokens.push(Spanned {
                    token: Token::Str(text),
                    offset: start,
                });
            }
            '0'..='9' => {
                let mut end = pos;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                let digits = &source[pos..end];
                let value = digits
                    .parse::<i64>()
                    .map_err(|_| err(start, format!("integer literal out of range: {digits}")))?;
                tokens.push(Spanned {
                    token: Token::Int(value),
                    offset: start,
                });
                pos = end;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = pos;
                while end < bytes.len()
                    && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                {
                    end += 1;
                }
                let word = &source[pos..end];
                let token = match word {
                    "true" => Token::True,
                    "false" => Token::False,
                    "while" => Token::While,
                    _ => Token::Ident(word.to_string()),
                };
                tokens.push(Spanned {
                    token,
                    offset: start,
                });
                pos = end;
            }
            other => {
                return Err(err(start, format!("unexpected character '{other}'")));
            }
        }
    }

    Ok(tokens)
}

fn push_single(tokens: &mut Vec<Spanned>, token: Token, start: usize, pos: &mut usize) {
    tokens.push(Spanned {
        token,
        offset: start,
    });
    *pos += 1;
}
