//! Local evaluation of the GROQ subset the site issues.
//!
//! ```text
//! query      := '*' '[' expr ']' order? slice? projection?
//! order      := '|' 'order' '(' path ('asc'|'desc')? (',' ...)* ')'
//! slice      := '[' int ']' | '[' int ('..'|'...') int ']'
//! projection := '{' item (',' item)* ','? '}'
//! item       := '...' | ident | string ':' path
//! expr       := and ('||' and)*
//! and        := unary ('&&' unary)*
//! unary      := '!' unary | '(' expr ')' | 'defined' '(' path ')'
//!             | path ('==' | '!=') operand
//! operand    := string | number | 'true' | 'false' | 'null' | '$' ident
//! ```
//!
//! Anything outside this grammar is rejected with [`StoreError::Query`].

use super::{Params, StoreError};
use serde_json::{Map, Value};
use std::cmp::Ordering;

// ============================================================================
// AST
// ============================================================================

/// A parsed query, ready to run against a document list.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    filter: Expr,
    order: Vec<(Path, Direction)>,
    slice: Option<Slice>,
    projection: Option<Vec<Item>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Eq(Path, Operand),
    Ne(Path, Operand),
    Defined(Path),
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Literal(Value),
    Param(String),
}

/// Dotted attribute access, e.g. `slug.current`.
#[derive(Debug, Clone, PartialEq)]
struct Path(Vec<String>);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slice {
    Index(usize),
    /// `end` is exclusive for `...`, inclusive for `..`
    Range { start: usize, end: usize, inclusive: bool },
}

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Spread,
    Field { key: String, path: Path },
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Star,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Pipe,
    And,
    Or,
    Bang,
    Eq,
    Ne,
    Comma,
    Colon,
    Dot,
    DotDot,
    Ellipsis,
    Ident(String),
    Str(String),
    Param(String),
    Number(Value),
}

fn malformed(message: impl Into<String>) -> StoreError {
    StoreError::Query(message.into())
}

fn tokenize(input: &str) -> Result<Vec<Token>, StoreError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '*' => Token::Star,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            ':' => Token::Colon,
            '&' if next == Some('&') => {
                i += 1;
                Token::And
            }
            '|' if next == Some('|') => {
                i += 1;
                Token::Or
            }
            '|' => Token::Pipe,
            '=' if next == Some('=') => {
                i += 1;
                Token::Eq
            }
            '!' if next == Some('=') => {
                i += 1;
                Token::Ne
            }
            '!' => Token::Bang,
            '.' => {
                let dots = chars[i..].iter().take_while(|&&c| c == '.').count();
                match dots {
                    1 => Token::Dot,
                    2 => {
                        i += 1;
                        Token::DotDot
                    }
                    3 => {
                        i += 2;
                        Token::Ellipsis
                    }
                    _ => return Err(malformed(format!("unexpected `{}`", ".".repeat(dots)))),
                }
            }
            '"' | '\'' => {
                let (text, end) = lex_string(&chars, i)?;
                i = end;
                Token::Str(text)
            }
            '$' => {
                let end = scan_ident(&chars, i + 1);
                if end == i + 1 {
                    return Err(malformed("`$` must be followed by a parameter name"));
                }
                let name: String = chars[i + 1..end].iter().collect();
                i = end;
                tokens.push(Token::Param(name));
                continue;
            }
            c if c.is_ascii_digit() || (c == '-' && next.is_some_and(|n| n.is_ascii_digit())) => {
                let (number, end) = lex_number(&chars, i)?;
                i = end;
                tokens.push(Token::Number(number));
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                let end = scan_ident(&chars, i);
                let ident: String = chars[i..end].iter().collect();
                i = end;
                tokens.push(Token::Ident(ident));
                continue;
            }
            other => return Err(malformed(format!("unexpected character `{other}`"))),
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

fn scan_ident(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
        end += 1;
    }
    end
}

/// Returns the unescaped text and the index of the closing quote.
fn lex_string(chars: &[char], start: usize) -> Result<(String, usize), StoreError> {
    let quote = chars[start];
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .ok_or_else(|| malformed("unterminated string"))?;
                text.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    other => *other,
                });
                i += 2;
            }
            c if c == quote => return Ok((text, i)),
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    Err(malformed("unterminated string"))
}

fn lex_number(chars: &[char], start: usize) -> Result<(Value, usize), StoreError> {
    let mut end = start + 1;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }
    // A fraction needs a digit after the dot, so `0...10` stays a range
    let fractional = chars.get(end) == Some(&'.')
        && chars.get(end + 1).is_some_and(|c| c.is_ascii_digit());
    if fractional {
        end += 1;
        while end < chars.len() && chars[end].is_ascii_digit() {
            end += 1;
        }
    }

    let text: String = chars[start..end].iter().collect();
    let value = if fractional {
        text.parse::<f64>().ok().map(Value::from)
    } else {
        text.parse::<i64>().ok().map(Value::from)
    };
    value
        .map(|v| (v, end))
        .ok_or_else(|| malformed(format!("invalid number `{text}`")))
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), StoreError> {
        match self.next() {
            Some(found) if found == token => Ok(()),
            Some(found) => Err(malformed(format!("expected {token:?}, found {found:?}"))),
            None => Err(malformed(format!("expected {token:?}, found end of query"))),
        }
    }

    fn ident(&mut self) -> Result<String, StoreError> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name),
            Some(found) => Err(malformed(format!("expected attribute name, found {found:?}"))),
            None => Err(malformed("expected attribute name, found end of query")),
        }
    }

    fn index(&mut self) -> Result<usize, StoreError> {
        match self.next() {
            Some(Token::Number(n)) => n
                .as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| malformed("slice bounds must be non-negative integers")),
            _ => Err(malformed("expected slice index")),
        }
    }

    fn query(&mut self) -> Result<Query, StoreError> {
        self.expect(Token::Star)?;
        self.expect(Token::LBracket)?;
        let filter = self.or()?;
        self.expect(Token::RBracket)?;

        let mut order = Vec::new();
        if self.eat(&Token::Pipe) {
            if self.ident()? != "order" {
                return Err(malformed("only `order(...)` may follow `|`"));
            }
            self.expect(Token::LParen)?;
            loop {
                let path = self.path()?;
                let direction = match self.peek() {
                    Some(Token::Ident(dir)) if dir == "asc" => Direction::Asc,
                    Some(Token::Ident(dir)) if dir == "desc" => Direction::Desc,
                    _ => {
                        order.push((path, Direction::Asc));
                        if self.eat(&Token::Comma) {
                            continue;
                        }
                        break;
                    }
                };
                self.pos += 1;
                order.push((path, direction));
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        }

        let slice = if self.eat(&Token::LBracket) {
            let start = self.index()?;
            let slice = match self.peek() {
                Some(Token::DotDot | Token::Ellipsis) => {
                    let inclusive = self.next() == Some(Token::DotDot);
                    let end = self.index()?;
                    Slice::Range { start, end, inclusive }
                }
                _ => Slice::Index(start),
            };
            self.expect(Token::RBracket)?;
            Some(slice)
        } else {
            None
        };

        let projection = if self.eat(&Token::LBrace) {
            Some(self.projection()?)
        } else {
            None
        };

        if let Some(extra) = self.peek() {
            return Err(malformed(format!("unexpected {extra:?} after query")));
        }

        Ok(Query {
            filter,
            order,
            slice,
            projection,
        })
    }

    fn projection(&mut self) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        loop {
            if self.eat(&Token::RBrace) {
                return Ok(items);
            }
            let item = match self.next() {
                Some(Token::Ellipsis) => Item::Spread,
                Some(Token::Ident(name)) => Item::Field {
                    path: Path(vec![name.clone()]),
                    key: name,
                },
                Some(Token::Str(key)) => {
                    self.expect(Token::Colon)?;
                    Item::Field {
                        key,
                        path: self.path()?,
                    }
                }
                Some(found) => return Err(malformed(format!("unexpected {found:?} in projection"))),
                None => return Err(malformed("unterminated projection")),
            };
            items.push(item);
            if !self.eat(&Token::Comma) {
                self.expect(Token::RBrace)?;
                return Ok(items);
            }
        }
    }

    fn or(&mut self) -> Result<Expr, StoreError> {
        let mut lhs = self.and()?;
        while self.eat(&Token::Or) {
            lhs = Expr::Or(Box::new(lhs), Box::new(self.and()?));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, StoreError> {
        let mut lhs = self.unary()?;
        while self.eat(&Token::And) {
            lhs = Expr::And(Box::new(lhs), Box::new(self.unary()?));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, StoreError> {
        if self.eat(&Token::Bang) {
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        if self.eat(&Token::LParen) {
            let inner = self.or()?;
            self.expect(Token::RParen)?;
            return Ok(inner);
        }
        if matches!(self.peek(), Some(Token::Ident(name)) if name == "defined")
            && self.tokens.get(self.pos + 1) == Some(&Token::LParen)
        {
            self.pos += 2;
            let path = self.path()?;
            self.expect(Token::RParen)?;
            return Ok(Expr::Defined(path));
        }

        let path = self.path()?;
        match self.next() {
            Some(Token::Eq) => Ok(Expr::Eq(path, self.operand()?)),
            Some(Token::Ne) => Ok(Expr::Ne(path, self.operand()?)),
            Some(found) => Err(malformed(format!("expected `==` or `!=`, found {found:?}"))),
            None => Err(malformed("expected `==` or `!=`, found end of query")),
        }
    }

    fn path(&mut self) -> Result<Path, StoreError> {
        let mut segments = vec![self.ident()?];
        while self.eat(&Token::Dot) {
            segments.push(self.ident()?);
        }
        Ok(Path(segments))
    }

    fn operand(&mut self) -> Result<Operand, StoreError> {
        match self.next() {
            Some(Token::Str(s)) => Ok(Operand::Literal(Value::String(s))),
            Some(Token::Number(n)) => Ok(Operand::Literal(n)),
            Some(Token::Param(name)) => Ok(Operand::Param(name)),
            Some(Token::Ident(word)) => match word.as_str() {
                "true" => Ok(Operand::Literal(Value::Bool(true))),
                "false" => Ok(Operand::Literal(Value::Bool(false))),
                "null" => Ok(Operand::Literal(Value::Null)),
                _ => Err(malformed(format!("comparing two attributes (`{word}`) is not supported"))),
            },
            Some(found) => Err(malformed(format!("expected a value, found {found:?}"))),
            None => Err(malformed("expected a value, found end of query")),
        }
    }
}

/// Parse a query string.
pub fn parse(input: &str) -> Result<Query, StoreError> {
    let mut parser = Parser {
        tokens: tokenize(input)?,
        pos: 0,
    };
    parser.query()
}

// ============================================================================
// Evaluation
// ============================================================================

impl Path {
    fn lookup<'v>(&self, doc: &'v Value) -> Option<&'v Value> {
        self.0
            .iter()
            .try_fold(doc, |value, key| value.get(key))
            .filter(|v| !v.is_null())
    }
}

impl Operand {
    fn resolve<'a>(&'a self, params: &'a Params) -> Result<&'a Value, StoreError> {
        match self {
            Self::Literal(value) => Ok(value),
            Self::Param(name) => params
                .get(name)
                .ok_or_else(|| malformed(format!("param ${name} referenced, but not provided"))),
        }
    }
}

impl Expr {
    fn matches(&self, doc: &Value, params: &Params) -> Result<bool, StoreError> {
        Ok(match self {
            Self::And(a, b) => a.matches(doc, params)? && b.matches(doc, params)?,
            Self::Or(a, b) => a.matches(doc, params)? || b.matches(doc, params)?,
            Self::Not(inner) => !inner.matches(doc, params)?,
            Self::Defined(path) => path.lookup(doc).is_some(),
            Self::Eq(path, operand) => {
                values_equal(path.lookup(doc).unwrap_or(&Value::Null), operand.resolve(params)?)
            }
            Self::Ne(path, operand) => {
                !values_equal(path.lookup(doc).unwrap_or(&Value::Null), operand.resolve(params)?)
            }
        })
    }
}

/// JSON equality, except numbers compare by value (`1 == 1.0`).
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Total order for `order(...)`; missing values sort after everything else.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::String(_) => 2,
            _ => 3,
        }
    }

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => rank(x).cmp(&rank(y)),
    }
}

impl Query {
    /// Run against `documents`, producing what the remote API would put in
    /// its `result` member.
    pub fn evaluate(&self, documents: &[Value], params: &Params) -> Result<Value, StoreError> {
        let mut matched = Vec::new();
        for doc in documents {
            if self.filter.matches(doc, params)? {
                matched.push(doc);
            }
        }

        if !self.order.is_empty() {
            // stable sort keeps dataset order for ties
            matched.sort_by(|a, b| {
                self.order
                    .iter()
                    .map(|(path, direction)| {
                        let ord = compare_values(path.lookup(a), path.lookup(b));
                        match direction {
                            Direction::Asc => ord,
                            Direction::Desc => ord.reverse(),
                        }
                    })
                    .find(|ord| ord.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
        }

        match self.slice {
            Some(Slice::Index(i)) => Ok(matched
                .get(i)
                .map(|doc| self.project(doc))
                .unwrap_or(Value::Null)),
            Some(Slice::Range { start, end, inclusive }) => {
                let end = if inclusive { end.saturating_add(1) } else { end };
                let end = end.min(matched.len());
                let start = start.min(end);
                Ok(Value::Array(
                    matched[start..end].iter().map(|doc| self.project(doc)).collect(),
                ))
            }
            None => Ok(Value::Array(
                matched.iter().map(|doc| self.project(doc)).collect(),
            )),
        }
    }

    fn project(&self, doc: &Value) -> Value {
        let Some(items) = &self.projection else {
            return doc.clone();
        };

        let mut out = Map::new();
        for item in items {
            match item {
                Item::Spread => {
                    if let Value::Object(fields) = doc {
                        out.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                    }
                }
                Item::Field { key, path } => {
                    if let Some(value) = path.lookup(doc) {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Value::Object(out)
    }
}

// ============================================================================
// Tests
// ============================================================================
