//! Tokenizer and recursive-descent parser for formula phrases
//!
//! A phrase is literal text interleaved with `${expression}$` blocks. A formula
//! without any block is parsed as one bare expression.
//!
//! Expression grammar, lowest precedence first:
//!
//! ```text
//! comparison     := additive (("==" | "!=" | "<" | "<=" | ">" | ">=") additive)?
//! additive       := multiplicative (("+" | "-") multiplicative)*
//! multiplicative := unary (("*" | "/" | "%") unary)*
//! unary          := "-" unary | primary
//! primary        := number | string | dice | reference | call | "(" comparison ")"
//! ```

use super::dice::DiceTerm;
use super::FormulaError;

const BLOCK_OPEN: &str = "${";
const BLOCK_CLOSE: &str = "}$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterOrEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Reference(String),
    Dice(DiceTerm),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Group(Box<Expr>),
}

/// One piece of a phrase.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Block(Expr),
}

/// A parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Phrase {
    /// No `${...}$` block: the whole formula is an expression.
    Bare(Expr),
    Template(Vec<Segment>),
}

/// Parse a formula into a phrase.
pub fn parse_phrase(formula: &str) -> Result<Phrase, FormulaError> {
    if !formula.contains(BLOCK_OPEN) {
        return parse_expression(formula).map(Phrase::Bare);
    }

    let mut segments = Vec::new();
    let mut rest = formula;
    while let Some(open) = rest.find(BLOCK_OPEN) {
        if open > 0 {
            segments.push(Segment::Text(rest[..open].to_string()));
        }
        let after_open = &rest[open + BLOCK_OPEN.len()..];
        let close = after_open.find(BLOCK_CLOSE).ok_or_else(|| {
            FormulaError::syntax(formula, "unterminated ${ block, expected }$")
        })?;
        segments.push(Segment::Block(parse_expression(&after_open[..close])?));
        rest = &after_open[close + BLOCK_CLOSE.len()..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest.to_string()));
    }

    Ok(Phrase::Template(segments))
}

/// Parse a single expression.
pub fn parse_expression(source: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(FormulaError::syntax(source, "empty expression"));
    }
    let mut parser = Parser {
        source,
        tokens,
        position: 0,
    };
    let expr = parser.comparison()?;
    if let Some(token) = parser.peek() {
        return Err(FormulaError::syntax(
            source,
            format!("unexpected {:?} after expression", token),
        ));
    }
    Ok(expr)
}

// =============================================================================
// Tokenizer
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Ident(String),
    Dice(u32, u32),
    Op(&'static str),
    LParen,
    RParen,
    Comma,
}

fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '+' | '-' | '*' | '/' | '%' => {
                tokens.push(Token::Op(match c {
                    '+' => "+",
                    '-' => "-",
                    '*' => "*",
                    '/' => "/",
                    _ => "%",
                }));
                i += 1;
            }
            '=' | '!' | '<' | '>' => {
                let doubled = chars.get(i + 1) == Some(&'=');
                let op = match (c, doubled) {
                    ('=', true) => "==",
                    ('!', true) => "!=",
                    ('<', true) => "<=",
                    ('>', true) => ">=",
                    ('<', false) => "<",
                    ('>', false) => ">",
                    _ => {
                        return Err(FormulaError::syntax(
                            source,
                            format!("unexpected '{}'", c),
                        ))
                    }
                };
                tokens.push(Token::Op(op));
                i += if doubled { 2 } else { 1 };
            }
            '"' | '\'' => {
                let quote = c;
                let mut text = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(FormulaError::syntax(source, "unterminated string")),
                        Some('\\') if i + 1 < chars.len() => {
                            text.push(chars[i + 1]);
                            i += 2;
                        }
                        Some(ch) if *ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(ch) => {
                            text.push(*ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Text(text));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();

                // `2d6`: an integer immediately followed by d and digits
                if chars.get(i) == Some(&'d')
                    && chars.get(i + 1).is_some_and(char::is_ascii_digit)
                    && !literal.contains('.')
                {
                    i += 1;
                    let sides_start = i;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                    let sides: String = chars[sides_start..i].iter().collect();
                    tokens.push(Token::Dice(
                        parse_count(source, &literal)?,
                        parse_count(source, &sides)?,
                    ));
                    continue;
                }

                let value = literal.parse::<f64>().map_err(|_| {
                    FormulaError::syntax(source, format!("invalid number '{}'", literal))
                })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric()
                        || chars[i] == '_'
                        || (chars[i] == '.'
                            && chars.get(i + 1).is_some_and(|next| {
                                next.is_ascii_alphanumeric() || *next == '_'
                            })))
                {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();

                // `d20` is shorthand for `1d20`
                match ident.strip_prefix('d') {
                    Some(sides) if !sides.is_empty() && sides.chars().all(|ch| ch.is_ascii_digit()) => {
                        tokens.push(Token::Dice(1, parse_count(source, sides)?));
                    }
                    _ => tokens.push(Token::Ident(ident)),
                }
            }
            other => {
                return Err(FormulaError::syntax(
                    source,
                    format!("unexpected character '{}'", other),
                ))
            }
        }
    }

    Ok(tokens)
}

fn parse_count(source: &str, digits: &str) -> Result<u32, FormulaError> {
    digits
        .parse::<u32>()
        .map_err(|_| FormulaError::InvalidDice(format!("'{}' in '{}'", digits, source)))
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn eat_op(&mut self, candidates: &[&'static str]) -> Option<&'static str> {
        match self.peek() {
            Some(Token::Op(op)) if candidates.contains(op) => {
                let op = *op;
                self.position += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), FormulaError> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(FormulaError::syntax(
                self.source,
                format!("expected {:?}, found {:?}", expected, token),
            )),
            None => Err(FormulaError::syntax(
                self.source,
                format!("expected {:?}, found end of input", expected),
            )),
        }
    }

    fn comparison(&mut self) -> Result<Expr, FormulaError> {
        let left = self.additive()?;
        let Some(op) = self.eat_op(&["==", "!=", "<", "<=", ">", ">="]) else {
            return Ok(left);
        };
        let right = self.additive()?;
        let op = match op {
            "==" => BinaryOp::Equal,
            "!=" => BinaryOp::NotEqual,
            "<" => BinaryOp::Less,
            "<=" => BinaryOp::LessOrEqual,
            ">" => BinaryOp::Greater,
            _ => BinaryOp::GreaterOrEqual,
        };
        Ok(binary(op, left, right))
    }

    fn additive(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.multiplicative()?;
        while let Some(op) = self.eat_op(&["+", "-"]) {
            let right = self.multiplicative()?;
            let op = if op == "+" {
                BinaryOp::Add
            } else {
                BinaryOp::Subtract
            };
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn multiplicative(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.unary()?;
        while let Some(op) = self.eat_op(&["*", "/", "%"]) {
            let right = self.unary()?;
            let op = match op {
                "*" => BinaryOp::Multiply,
                "/" => BinaryOp::Divide,
                _ => BinaryOp::Remainder,
            };
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        if self.eat_op(&["-"]).is_some() {
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(operand),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Text(text)) => Ok(Expr::Text(text)),
            Some(Token::Dice(count, sides)) => Ok(Expr::Dice(DiceTerm::new(count, sides)?)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.position += 1;
                    let args = self.arguments()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Reference(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.comparison()?;
                self.expect(Token::RParen)?;
                Ok(Expr::Group(Box::new(inner)))
            }
            Some(token) => Err(FormulaError::syntax(
                self.source,
                format!("unexpected {:?}", token),
            )),
            None => Err(FormulaError::syntax(self.source, "unexpected end of input")),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, FormulaError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.position += 1;
            return Ok(args);
        }
        loop {
            args.push(self.comparison()?);
            match self.advance() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok(args),
                _ => {
                    return Err(FormulaError::syntax(
                        self.source,
                        "expected ',' or ')' in argument list",
                    ))
                }
            }
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_binds_multiplication_tighter() {
        let expr = parse_expression("1 + 2 * 3").unwrap();
        let Expr::Binary { op, right, .. } = expr else {
            panic!("expected binary expression");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::Multiply, .. }));
    }

    #[test]
    fn parses_dotted_references_and_dice() {
        let expr = parse_expression("1d20 + attacks.a1.bonus").unwrap();
        let Expr::Binary { left, right, .. } = expr else {
            panic!("expected binary expression");
        };
        assert_eq!(*left, Expr::Dice(DiceTerm { count: 1, sides: 20 }));
        assert_eq!(*right, Expr::Reference("attacks.a1.bonus".to_string()));

        assert_eq!(
            parse_expression("d8").unwrap(),
            Expr::Dice(DiceTerm { count: 1, sides: 8 })
        );
    }

    #[test]
    fn parses_calls_and_strings() {
        let expr = parse_expression("if(level >= 5, 'veteran', \"novice\")").unwrap();
        let Expr::Call { name, args } = expr else {
            panic!("expected call");
        };
        assert_eq!(name, "if");
        assert_eq!(args.len(), 3);
        assert_eq!(args[1], Expr::Text("veteran".to_string()));
    }

    #[test]
    fn phrase_splits_text_and_blocks() {
        let phrase = parse_phrase("Hits for ${1d8 + str}$ damage").unwrap();
        let Phrase::Template(segments) = phrase else {
            panic!("expected template phrase");
        };
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::Text("Hits for ".to_string()));
        assert!(matches!(segments[1], Segment::Block(_)));
    }

    #[test]
    fn reports_syntax_errors() {
        for source in ["", "1 +", "(1 + 2", "1 = 2", "a $ b", "'open", "max(1 2)"] {
            let err = parse_expression(source).unwrap_err();
            assert!(!err.is_unresolvable(), "{source}: {err}");
        }
        assert!(parse_phrase("${1 + 2").is_err());
    }
}
