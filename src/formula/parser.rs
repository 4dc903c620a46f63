use crate::{
    error::CompilationError,
    formula::{
        ast::{BinOp, Expr, Name},
        lexer::{Lexer, Spanned, Token},
    },
};

/// Parse a formula into a typed expression tree.
///
/// Grammar, lowest precedence first:
///
/// ```text
/// expr    := term (('+' | '-') term)*
/// term    := unary (('*' | '/') unary | power)*     // juxtaposition multiplies
/// unary   := ('-' | '+') unary | power
/// power   := primary ('^' unary)?                   // right-associative
/// primary := number | name | name '(' args ')' | '(' expr ')'
/// ```
///
/// Nesting and operator chains together may not go deeper than
/// [`MAX_DEPTH`], which also bounds the depth of the returned tree.
pub fn parse(input: &str) -> Result<Expr, CompilationError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    match parser.peek() {
        Token::Eof => Ok(expr),
        other => Err(CompilationError::UnexpectedToken {
            expected: "operator or end of formula",
            found: other.describe(),
            pos: parser.position(),
        }),
    }
}

pub const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Spanned>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// One level deeper in the tree being built. Parsing stops at the first
    /// error, so only the success paths give the level back.
    fn descend(&mut self) -> Result<(), CompilationError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CompilationError::TooDeep {
                max: MAX_DEPTH,
                pos: self.position(),
            });
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with Eof.
        self.tokens
            .get(self.pos)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.pos)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> Result<(), CompilationError> {
        if *self.peek() == expected {
            self.advance();
            return Ok(());
        }
        Err(self.unexpected(what))
    }

    fn unexpected(&self, expected: &'static str) -> CompilationError {
        match self.peek() {
            Token::Eof => CompilationError::UnexpectedEnd { expected },
            other => CompilationError::UnexpectedToken {
                expected,
                found: other.describe(),
                pos: self.position(),
            },
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, CompilationError> {
        let depth = self.depth;
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => {
                    self.depth = depth;
                    return Ok(lhs);
                }
            };
            self.advance();
            // Each link of a chain nests the tree one level deeper
            self.descend()?;
            let rhs = self.parse_term()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_term(&mut self) -> Result<Expr, CompilationError> {
        let depth = self.depth;
        let mut lhs = self.parse_unary()?;
        loop {
            if matches!(
                self.peek(),
                Token::Star | Token::Slash | Token::Number(_) | Token::Ident(_) | Token::LParen
            ) {
                self.descend()?;
            }
            let rhs = match self.peek() {
                Token::Star => {
                    self.advance();
                    binary(BinOp::Mul, lhs, self.parse_unary()?)
                }
                Token::Slash => {
                    self.advance();
                    binary(BinOp::Div, lhs, self.parse_unary()?)
                }
                // `2π t`, `3(t + 1)`
                Token::Number(_) | Token::Ident(_) | Token::LParen => {
                    binary(BinOp::Mul, lhs, self.parse_power()?)
                }
                _ => {
                    self.depth = depth;
                    return Ok(lhs);
                }
            };
            lhs = rhs;
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, CompilationError> {
        self.descend()?;
        let expr = self.parse_signed()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_signed(&mut self) -> Result<Expr, CompilationError> {
        match self.peek() {
            Token::Minus => {
                self.advance();
                Ok(Expr::Neg(Box::new(self.parse_unary()?)))
            }
            Token::Plus => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, CompilationError> {
        let base = self.parse_primary()?;
        if *self.peek() == Token::Caret {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, CompilationError> {
        let pos = self.position();
        match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Token::Ident(name) => {
                self.advance();
                self.parse_name(name, pos)
            }
            _ => Err(self.unexpected("number, name or '('")),
        }
    }

    fn parse_name(&mut self, name: String, pos: usize) -> Result<Expr, CompilationError> {
        match Name::lookup(&name) {
            Some(Name::Time) => Ok(Expr::Time),
            Some(Name::Constant(value)) => Ok(Expr::Number(value)),
            Some(Name::Unary(func)) => {
                let [arg] = self.parse_args::<1>(&name)?;
                Ok(Expr::Unary {
                    func,
                    arg: Box::new(arg),
                })
            }
            Some(Name::Binary(func)) => {
                let [a, b] = self.parse_args::<2>(&name)?;
                Ok(Expr::Call2 {
                    func,
                    a: Box::new(a),
                    b: Box::new(b),
                })
            }
            None => Err(CompilationError::UnknownName { name, pos }),
        }
    }

    fn parse_args<const N: usize>(&mut self, name: &str) -> Result<[Expr; N], CompilationError> {
        self.expect(Token::LParen, "'(' after function name")?;
        let mut args = Vec::with_capacity(N);
        if *self.peek() == Token::RParen {
            self.advance();
        } else {
            loop {
                args.push(self.parse_expr()?);
                match self.peek() {
                    Token::Comma => {
                        self.advance();
                    }
                    Token::RParen => {
                        self.advance();
                        break;
                    }
                    _ => return Err(self.unexpected("',' or ')'")),
                }
            }
        }

        let found = args.len();
        args.try_into().map_err(|_| CompilationError::Arity {
            name: name.to_string(),
            expected: N,
            found,
        })
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
