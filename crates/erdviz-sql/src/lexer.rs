//! DDL tokenizer used by the vendor backend

use std::iter::Peekable;
use std::str::Chars;

/// DDL token types
///
/// Only words that steer statement structure are keywords; everything else
/// (type names, AUTO_INCREMENT, CASCADE, ...) stays an identifier and is
/// compared case-insensitively by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Alter,
    Add,
    Table,
    View,
    Index,
    Unique,
    Primary,
    Key,
    Foreign,
    References,
    Constraint,
    Not,
    Null,
    Default,
    On,
    If,
    Exists,
    Check,

    // Identifiers and literals
    Ident(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,

    // End of input
    Eof,
}

impl Token {
    /// Whether this is an identifier equal to `word`, ignoring case
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Ident(s) if s.eq_ignore_ascii_case(word))
    }

    /// Source-like text for reassembling expressions
    pub fn text(&self) -> String {
        match self {
            Token::Create => "CREATE".to_string(),
            Token::Alter => "ALTER".to_string(),
            Token::Add => "ADD".to_string(),
            Token::Table => "TABLE".to_string(),
            Token::View => "VIEW".to_string(),
            Token::Index => "INDEX".to_string(),
            Token::Unique => "UNIQUE".to_string(),
            Token::Primary => "PRIMARY".to_string(),
            Token::Key => "KEY".to_string(),
            Token::Foreign => "FOREIGN".to_string(),
            Token::References => "REFERENCES".to_string(),
            Token::Constraint => "CONSTRAINT".to_string(),
            Token::Not => "NOT".to_string(),
            Token::Null => "NULL".to_string(),
            Token::Default => "DEFAULT".to_string(),
            Token::On => "ON".to_string(),
            Token::If => "IF".to_string(),
            Token::Exists => "EXISTS".to_string(),
            Token::Check => "CHECK".to_string(),
            Token::Ident(s) | Token::Num(s) => s.clone(),
            Token::Str(s) => format!("'{}'", s.replace('\'', "''")),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Comma => ",".to_string(),
            Token::Semicolon => ";".to_string(),
            Token::Dot => ".".to_string(),
            Token::Eof => String::new(),
        }
    }
}

/// DDL lexer
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    current_char: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars().peekable();
        let current_char = chars.next();
        Self { chars, current_char }
    }

    fn advance(&mut self) {
        self.current_char = self.chars.next();
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.current_char {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // skip *
        while let Some(c) = self.current_char {
            self.advance();
            if c == '*' && self.current_char == Some('/') {
                self.advance();
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    fn read_quoted(&mut self, close: char, backslash_escapes: bool) -> String {
        self.advance(); // skip opening quote
        let mut s = String::new();
        while let Some(c) = self.current_char {
            if c == close {
                // Doubled quote is an escaped quote
                if self.peek() == Some(&close) {
                    s.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            } else if c == '\\' && backslash_escapes {
                self.advance();
                if let Some(escaped) = self.current_char {
                    match escaped {
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        'r' => s.push('\r'),
                        _ => s.push(escaped),
                    }
                    self.advance();
                }
            } else {
                s.push(c);
                self.advance();
            }
        }
        s
    }

    fn read_number(&mut self) -> String {
        let mut num = String::new();
        let mut has_dot = false;

        if self.current_char == Some('-') {
            num.push('-');
            self.advance();
        }

        while let Some(c) = self.current_char {
            if c.is_ascii_digit() {
                num.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num.push(c);
                self.advance();
            } else {
                break;
            }
        }
        num
    }

    fn keyword_or_ident(s: String) -> Token {
        match s.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "ALTER" => Token::Alter,
            "ADD" => Token::Add,
            "TABLE" => Token::Table,
            "VIEW" => Token::View,
            "INDEX" => Token::Index,
            "UNIQUE" => Token::Unique,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "FOREIGN" => Token::Foreign,
            "REFERENCES" => Token::References,
            "CONSTRAINT" => Token::Constraint,
            "NOT" => Token::Not,
            "NULL" => Token::Null,
            "DEFAULT" => Token::Default,
            "ON" => Token::On,
            "IF" => Token::If,
            "EXISTS" => Token::Exists,
            "CHECK" => Token::Check,
            _ => Token::Ident(s),
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            match self.current_char {
                None => return Token::Eof,

                Some('-') => {
                    if self.peek() == Some(&'-') {
                        self.skip_line_comment();
                        continue;
                    } else if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        return Token::Num(self.read_number());
                    } else {
                        self.advance();
                        continue;
                    }
                }

                Some('/') => {
                    self.advance();
                    if self.current_char == Some('*') {
                        self.skip_block_comment();
                    }
                    continue;
                }

                Some('#') => {
                    self.skip_line_comment();
                    continue;
                }

                Some('(') => {
                    self.advance();
                    return Token::LParen;
                }
                Some(')') => {
                    self.advance();
                    return Token::RParen;
                }
                Some(',') => {
                    self.advance();
                    return Token::Comma;
                }
                Some(';') => {
                    self.advance();
                    return Token::Semicolon;
                }
                Some('.') => {
                    self.advance();
                    return Token::Dot;
                }

                Some('"') => return Token::Ident(self.read_quoted('"', false)),
                Some('`') => return Token::Ident(self.read_quoted('`', false)),
                Some('[') => {
                    // `[]` array suffix or SQL Server style [identifier]
                    if self.peek() == Some(&']') {
                        self.advance();
                        self.advance();
                        return Token::Ident("[]".to_string());
                    }
                    return Token::Ident(self.read_quoted(']', false));
                }

                Some('\'') => return Token::Str(self.read_quoted('\'', true)),

                Some(c) if c.is_ascii_digit() => {
                    return Token::Num(self.read_number());
                }

                Some(c) if c.is_alphabetic() || c == '_' => {
                    let ident = self.read_identifier();
                    return Self::keyword_or_ident(ident);
                }

                Some(_) => {
                    // Operators and casts carry no structure
                    self.advance();
                    continue;
                }
            }
        }
    }

    /// Collect all tokens, ending with `Eof`
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_create_table() {
        let tokens = Lexer::new("CREATE TABLE users (id INT);").tokenize();

        assert_eq!(
            tokens,
            vec![
                Token::Create,
                Token::Table,
                Token::Ident("users".to_string()),
                Token::LParen,
                Token::Ident("id".to_string()),
                Token::Ident("INT".to_string()),
                Token::RParen,
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn quoted_identifiers() {
        let tokens = Lexer::new(r#"CREATE TABLE "User Table" (`column name` INT, [x] TEXT[]);"#).tokenize();

        assert_eq!(tokens[2], Token::Ident("User Table".to_string()));
        assert_eq!(tokens[4], Token::Ident("column name".to_string()));
        assert_eq!(tokens[7], Token::Ident("x".to_string()));
        assert_eq!(tokens[9], Token::Ident("[]".to_string()));
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = Lexer::new("-- comment\nCREATE /* block */ TABLE t # mysql\n(id INT);").tokenize();

        assert_eq!(tokens[0], Token::Create);
        assert_eq!(tokens[1], Token::Table);
        assert_eq!(tokens[3], Token::LParen);
    }

    #[test]
    fn string_literals_and_numbers() {
        let tokens = Lexer::new("COMMENT 'it''s \\\"x\\\"' DEFAULT -1.5").tokenize();

        assert!(tokens[0].is_word("comment"));
        assert_eq!(tokens[1], Token::Str("it's \"x\"".to_string()));
        assert_eq!(tokens[2], Token::Default);
        assert_eq!(tokens[3], Token::Num("-1.5".to_string()));
    }
}
