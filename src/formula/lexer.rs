use crate::error::CompilationError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    /// `^` or `**`
    Caret,
    LParen,
    RParen,
    Comma,
    Eof,
}

impl Token {
    /// Human readable form used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Ident(name) => format!("'{name}'"),
            Token::Plus => "'+'".into(),
            Token::Minus => "'-'".into(),
            Token::Star => "'*'".into(),
            Token::Slash => "'/'".into(),
            Token::Caret => "'^'".into(),
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::Comma => "','".into(),
            Token::Eof => "end of formula".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    /// Character offset of the token's first character.
    pub pos: usize,
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    /// Split the whole input into tokens, terminated by `Token::Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, CompilationError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let is_eof = spanned.token == Token::Eof;
            tokens.push(spanned);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek_at(0).is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Result<Spanned, CompilationError> {
        self.skip_whitespace();

        let start = self.pos;
        let Some(ch) = self.peek_at(0) else {
            return Ok(Spanned {
                token: Token::Eof,
                pos: start,
            });
        };

        let token = match ch {
            '+' => self.single(Token::Plus),
            '-' => self.single(Token::Minus),
            '/' => self.single(Token::Slash),
            '^' => self.single(Token::Caret),
            '(' => self.single(Token::LParen),
            ')' => self.single(Token::RParen),
            ',' => self.single(Token::Comma),
            '*' => {
                if self.peek_at(1) == Some('*') {
                    self.pos += 2;
                    Token::Caret
                } else {
                    self.single(Token::Star)
                }
            }
            c if c.is_ascii_digit() || c == '.' => self.number()?,
            c if c.is_alphabetic() || c == '_' => self.ident(),
            other => {
                return Err(CompilationError::UnexpectedChar {
                    ch: other,
                    pos: start,
                })
            }
        };

        Ok(Spanned { token, pos: start })
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn number(&mut self) -> Result<Token, CompilationError> {
        let start = self.pos;
        while self
            .peek_at(0)
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }

        // Exponent only when digits follow; `2e` is two times Euler's number.
        if matches!(self.peek_at(0), Some('e' | 'E')) {
            let exponent_digits = match self.peek_at(1) {
                Some('+' | '-') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_digits {
                self.pos += 2;
                while self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| CompilationError::InvalidNumber { text, pos: start })
    }

    fn ident(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_at(0)
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.')
        {
            self.pos += 1;
        }
        Token::Ident(self.chars[start..self.pos].iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .expect("lexes")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn lexes_operators_and_numbers() {
        assert_eq!(
            tokens("2.5*t ** 2 - .5"),
            vec![
                Token::Number(2.5),
                Token::Star,
                Token::Ident("t".into()),
                Token::Caret,
                Token::Number(2.0),
                Token::Minus,
                Token::Number(0.5),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn exponent_requires_digits() {
        assert_eq!(tokens("1e-3"), vec![Token::Number(0.001), Token::Eof]);
        assert_eq!(
            tokens("2e"),
            vec![Token::Number(2.0), Token::Ident("e".into()), Token::Eof]
        );
    }

    #[test]
    fn keeps_dotted_names_together() {
        assert_eq!(
            tokens("Math.sin(π)"),
            vec![
                Token::Ident("Math.sin".into()),
                Token::LParen,
                Token::Ident("π".into()),
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn rejects_code_characters() {
        let err = Lexer::new("t; process.exit()").tokenize().unwrap_err();
        assert_eq!(err, CompilationError::UnexpectedChar { ch: ';', pos: 1 });
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = Lexer::new("1.2.3").tokenize().unwrap_err();
        assert!(matches!(err, CompilationError::InvalidNumber { .. }));
    }
}
