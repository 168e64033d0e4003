use crate::span::{Span, Spanned};
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Num(String),

    LBrace,   // {
    RBrace,   // }
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Colon,    // :
    Question, // ?
    Eq,       // =
    Dot,      // .
    At,       // @
    AtAt,     // @@
    Newline,

    /// A character outside the schema alphabet. Kept as a token so the
    /// parser can report it against the declaration it appears in.
    Unknown(char),

    Eof,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("Unterminated string")]
    UnterminatedString,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Remove `//` line comments, keeping every newline so line numbers survive.
///
/// Markers inside double-quoted string literals are not comments.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for line in input.split_inclusive('\n') {
        let (body, eol) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        let cut = comment_start(body).unwrap_or(body.len());
        out.push_str(&body[..cut]);
        out.push_str(eol);
    }
    out
}

fn comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
        } else if b == b'"' {
            in_string = true;
        } else if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            return Some(i);
        }
    }
    None
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    errors: Vec<Spanned<LexError>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            errors: Vec::new(),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map(|&(i, _)| i).unwrap_or(self.input.len())
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some('\n') => break,
                Some(c) if c.is_whitespace() => {
                    self.chars.next();
                }
                Some('/') if self.input[self.offset()..].starts_with("//") => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.chars.next();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_ident(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    fn read_string(&mut self, start: usize) -> String {
        let mut s = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.chars.next();
                    return s;
                }
                Some('\\') => {
                    self.chars.next();
                    if let Some(c) = self.peek_char() {
                        if c == '\n' {
                            continue;
                        }
                        self.chars.next();
                        match c {
                            'n' => s.push('\n'),
                            't' => s.push('\t'),
                            'r' => s.push('\r'),
                            _ => s.push(c),
                        }
                    }
                }
                // Strings never span lines; the newline stays for the parser.
                Some('\n') | None => {
                    let end = self.offset();
                    self.errors
                        .push(Spanned::new(LexError::UnterminatedString, Span::new(start, end)));
                    return s;
                }
                Some(c) => {
                    s.push(c);
                    self.chars.next();
                }
            }
        }
    }

    fn read_number(&mut self, first: char) -> String {
        let mut s = String::from(first);
        let mut seen_dot = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                s.push(c);
                self.chars.next();
            } else if c == '.' && !seen_dot && self.digit_after_dot() {
                seen_dot = true;
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    fn digit_after_dot(&mut self) -> bool {
        let offset = self.offset();
        self.input[offset..]
            .chars()
            .nth(1)
            .is_some_and(|c| c.is_ascii_digit())
    }

    pub fn next_token(&mut self) -> SpannedToken {
        self.skip_whitespace_and_comments();

        let (start, c) = match self.chars.next() {
            Some(pair) => pair,
            None => {
                let end = self.input.len();
                return SpannedToken {
                    token: Token::Eof,
                    span: Span::new(end, end),
                };
            }
        };

        let token = match c {
            '\n' => Token::Newline,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            ':' => Token::Colon,
            '?' => Token::Question,
            '=' => Token::Eq,
            '.' => Token::Dot,
            '@' => {
                if self.peek_char() == Some('@') {
                    self.chars.next();
                    Token::AtAt
                } else {
                    Token::At
                }
            }
            '"' => Token::Str(self.read_string(start)),
            '-' if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => {
                Token::Num(self.read_number(c))
            }
            c if c.is_ascii_digit() => Token::Num(self.read_number(c)),
            c if c.is_alphabetic() || c == '_' => Token::Ident(self.read_ident(c)),
            c => Token::Unknown(c),
        };

        let end = self.offset();
        SpannedToken {
            token,
            span: Span::new(start, end),
        }
    }

    /// Tokenize the whole input. The token list always ends with `Eof`.
    pub fn tokenize(mut self) -> (Vec<SpannedToken>, Vec<Spanned<LexError>>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok.token == Token::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        (tokens, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        let (tokens, _) = Lexer::new(input).tokenize();
        tokens.into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("model User { }"),
            vec![
                Token::Ident("model".into()),
                Token::Ident("User".into()),
                Token::LBrace,
                Token::RBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_field_modifiers() {
        assert_eq!(
            kinds("tags String[]\nbio String?"),
            vec![
                Token::Ident("tags".into()),
                Token::Ident("String".into()),
                Token::LBracket,
                Token::RBracket,
                Token::Newline,
                Token::Ident("bio".into()),
                Token::Ident("String".into()),
                Token::Question,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_attribute_markers() {
        assert_eq!(
            kinds("@id @@index @db.Uuid"),
            vec![
                Token::At,
                Token::Ident("id".into()),
                Token::AtAt,
                Token::Ident("index".into()),
                Token::At,
                Token::Ident("db".into()),
                Token::Dot,
                Token::Ident("Uuid".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds(r#"@default("a\"b") 42 -1 3.14"#),
            vec![
                Token::At,
                Token::Ident("default".into()),
                Token::LParen,
                Token::Str("a\"b".into()),
                Token::RParen,
                Token::Num("42".into()),
                Token::Num("-1".into()),
                Token::Num("3.14".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let (tokens, _) = Lexer::new("名前 String").tokenize();
        assert_eq!(tokens[0].token, Token::Ident("名前".into()));
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].span, Span::new(7, 13));
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = Lexer::new("a @default(\"oops\nb Int").tokenize();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].value, LexError::UnterminatedString);
        assert!(tokens.iter().any(|t| t.token == Token::Newline));
        assert!(tokens.iter().any(|t| t.token == Token::Ident("b".into())));
    }

    #[test]
    fn test_unknown_char() {
        assert_eq!(
            kinds("a $ b"),
            vec![
                Token::Ident("a".into()),
                Token::Unknown('$'),
                Token::Ident("b".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_skips_comments() {
        assert_eq!(
            kinds("a // tail\nb"),
            vec![
                Token::Ident("a".into()),
                Token::Newline,
                Token::Ident("b".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_strip_comments_preserves_lines() {
        let input = "// header\nmodel User { // inline\n  id Int\n}";
        assert_eq!(strip_comments(input), "\nmodel User { \n  id Int\n}");
    }

    #[test]
    fn test_strip_comments_ignores_markers_in_strings() {
        let input = "url String @default(\"https://example.com\") // note";
        assert_eq!(
            strip_comments(input),
            "url String @default(\"https://example.com\") "
        );
    }

    #[test]
    fn test_strip_comments_empty() {
        assert_eq!(strip_comments(""), "");
    }
}
