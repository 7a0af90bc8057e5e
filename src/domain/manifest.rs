//! Blade manifest (`BUILD`) reader.
//!
//! Manifests are read as pure data: a sequence of target declarations
//! `kind(name, key = value, ...)` and literal assignments `ident = value`.
//! Nothing is executed. Nested calls such as `glob([...])` are kept as
//! opaque values and never evaluated.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::target::{TargetInfo, TargetKind};
use crate::error::ManifestError;

/// Target table of one manifest, keyed by target name.
pub type TargetTable = HashMap<String, TargetInfo>;

/// A literal value appearing in a manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Number(String),
    Bool(bool),
    None,
    List(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    /// A nested call, recorded but not evaluated.
    Call { name: String, args: Vec<Arg> },
    /// An identifier with no earlier binding.
    Ident(String),
}

impl Value {
    /// Interpret the value as a list of strings. A single string is a
    /// one-element list; non-string members and opaque values are ignored.
    pub fn string_list(&self) -> Vec<String> {
        match self {
            Value::Str(s) => vec![s.clone()],
            Value::List(items) => items
                .iter()
                .filter_map(|v| match v {
                    Value::Str(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A call argument: positional when `key` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub key: Option<String>,
    pub value: Value,
}

/// Parse a manifest and collect every target it declares.
pub fn parse_manifest(source: &str, directory: &str) -> Result<TargetTable, ManifestError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        bindings: HashMap::new(),
    };
    let mut targets = TargetTable::new();

    while !parser.at(&Tok::Eof) {
        match parser.statement()? {
            Statement::Assign | Statement::Expr => {}
            Statement::Call { name, args, at } => match TargetKind::from_call(&name) {
                Some(kind) => {
                    let info = build_target(kind, &args, directory).ok_or_else(|| {
                        ManifestError::new(at, format!("{}() declared without a name", name))
                    })?;
                    targets.insert(info.name.clone(), info);
                }
                None => debug!("Skipping unsupported manifest statement {}()", name),
            },
        }
    }

    Ok(targets)
}

fn build_target(kind: TargetKind, args: &[Arg], directory: &str) -> Option<TargetInfo> {
    let keyword = |key: &str| {
        args.iter()
            .find(|a| a.key.as_deref() == Some(key))
            .map(|a| a.value.string_list())
            .unwrap_or_default()
    };

    let name = args
        .iter()
        .find(|a| a.key.as_deref() == Some("name"))
        .or_else(|| args.iter().find(|a| a.key.is_none()))
        .and_then(|a| match &a.value {
            Value::Str(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })?;

    Some(TargetInfo {
        kind,
        name,
        directory: directory.to_string(),
        deps: keyword("deps"),
        srcs: keyword("srcs"),
        hdrs: keyword("hdrs"),
    })
}

// ─────────────────────────────────────────────────────────────────────────
// Lexer
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Number(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Equals,
    Plus,
    Eof,
}

/// Source position, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn tokenize(mut self) -> Result<Vec<(Tok, Pos)>, ManifestError> {
        let mut out = Vec::new();
        loop {
            self.skip_trivia();
            let at = self.pos();
            let Some(&c) = self.chars.peek() else {
                out.push((Tok::Eof, at));
                return Ok(out);
            };
            let tok = match c {
                '(' => self.single(Tok::LParen),
                ')' => self.single(Tok::RParen),
                '[' => self.single(Tok::LBracket),
                ']' => self.single(Tok::RBracket),
                '{' => self.single(Tok::LBrace),
                '}' => self.single(Tok::RBrace),
                ',' => self.single(Tok::Comma),
                ':' => self.single(Tok::Colon),
                '=' => self.single(Tok::Equals),
                '+' => self.single(Tok::Plus),
                '"' | '\'' => Tok::Str(self.string(c, at, false)?),
                c if c.is_ascii_digit() || c == '-' => Tok::Number(self.number()),
                c if c.is_alphabetic() || c == '_' => {
                    let word = self.ident();
                    match self.chars.peek() {
                        Some(&(quote @ ('"' | '\''))) if is_string_prefix(&word) => {
                            let raw = word.contains(['r', 'R']);
                            Tok::Str(self.string(quote, at, raw)?)
                        }
                        _ => Tok::Ident(word),
                    }
                }
                other => {
                    return Err(ManifestError::new(at, format!("unexpected character {:?}", other)))
                }
            };
            out.push((tok, at));
        }
    }

    fn single(&mut self, tok: Tok) -> Tok {
        self.bump();
        tok
    }

    fn skip_trivia(&mut self) {
        while let Some(&c) = self.chars.peek() {
            match c {
                '#' => {
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                '\\' | ';' => {
                    self.bump();
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                _ => break,
            }
        }
    }

    /// String body after the opening quote. Raw strings keep backslashes.
    fn string(&mut self, quote: char, at: Pos, raw: bool) -> Result<String, ManifestError> {
        self.bump();
        // Triple-quoted strings; an empty '' is just an empty string.
        let mut triple = false;
        if self.chars.peek() == Some(&quote) {
            self.bump();
            if self.chars.peek() == Some(&quote) {
                self.bump();
                triple = true;
            } else {
                return Ok(String::new());
            }
        }

        let mut text = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(ManifestError::new(at, "unterminated string literal"));
            };
            match c {
                '\\' if raw => match self.bump() {
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => return Err(ManifestError::new(at, "unterminated string literal")),
                },
                '\\' => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('\n') => {}
                    Some(other) => text.push(other),
                    None => return Err(ManifestError::new(at, "unterminated string literal")),
                },
                '\n' if !triple => {
                    return Err(ManifestError::new(at, "newline in string literal"));
                }
                c if c == quote => {
                    if !triple {
                        return Ok(text);
                    }
                    if self.chars.peek() == Some(&quote) {
                        self.bump();
                        if self.chars.peek() == Some(&quote) {
                            self.bump();
                            return Ok(text);
                        }
                        text.push(quote);
                    }
                    text.push(quote);
                }
                c => text.push(c),
            }
        }
    }

    fn number(&mut self) -> String {
        let mut text = String::new();
        if let Some('-') = self.chars.peek() {
            text.push('-');
            self.bump();
        }
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '.' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text
    }

    fn ident(&mut self) -> String {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' || c == '.' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text
    }
}

/// `r'..'`, `u".."`, `br'..'` and friends.
fn is_string_prefix(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "f" | "br" | "rb" | "fr" | "rf"
    )
}

// ─────────────────────────────────────────────────────────────────────────
// Parser
// ─────────────────────────────────────────────────────────────────────────

enum Statement {
    Assign,
    /// A bare expression such as a docstring; carries no declaration.
    Expr,
    Call { name: String, args: Vec<Arg>, at: Pos },
}

struct Parser {
    tokens: Vec<(Tok, Pos)>,
    pos: usize,
    bindings: HashMap<String, Value>,
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos].0
    }

    fn peek_at(&self, offset: usize) -> &Tok {
        let i = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[i].0
    }

    fn here(&self) -> Pos {
        self.tokens[self.pos].1
    }

    fn at(&self, tok: &Tok) -> bool {
        self.peek() == tok
    }

    fn advance(&mut self) -> Tok {
        let tok = self.tokens[self.pos].0.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, tok: Tok) -> Result<(), ManifestError> {
        if self.at(&tok) {
            self.advance();
            Ok(())
        } else {
            Err(ManifestError::new(
                self.here(),
                format!("expected {:?}, found {:?}", tok, self.peek()),
            ))
        }
    }

    fn statement(&mut self) -> Result<Statement, ManifestError> {
        if let Tok::Str(_) = self.peek() {
            self.expr()?;
            return Ok(Statement::Expr);
        }

        let at = self.here();
        let name = match self.advance() {
            Tok::Ident(name) => name,
            other => {
                return Err(ManifestError::new(
                    at,
                    format!("expected a statement, found {:?}", other),
                ))
            }
        };

        match self.peek() {
            Tok::Equals => {
                self.advance();
                let value = self.expr()?;
                self.bindings.insert(name, value);
                Ok(Statement::Assign)
            }
            Tok::LParen => {
                self.advance();
                let args = self.args(Tok::RParen)?;
                Ok(Statement::Call { name, args, at })
            }
            other => Err(ManifestError::new(
                self.here(),
                format!("expected '(' or '=' after {}, found {:?}", name, other),
            )),
        }
    }

    /// Arguments up to and including `close`.
    fn args(&mut self, close: Tok) -> Result<Vec<Arg>, ManifestError> {
        let mut args = Vec::new();
        while !self.at(&close) {
            let keyword = match (self.peek(), self.peek_at(1)) {
                (Tok::Ident(key), Tok::Equals) => Some(key.clone()),
                _ => None,
            };
            if keyword.is_some() {
                self.advance();
                self.advance();
            }
            let value = self.expr()?;
            args.push(Arg { key: keyword, value });
            if !self.at(&close) {
                self.expect(Tok::Comma)?;
            }
        }
        self.advance();
        Ok(args)
    }

    fn expr(&mut self) -> Result<Value, ManifestError> {
        let mut value = self.primary()?;
        while self.at(&Tok::Plus) {
            let at = self.here();
            self.advance();
            let rhs = self.primary()?;
            value = match (value, rhs) {
                (Value::List(mut a), Value::List(b)) => {
                    a.extend(b);
                    Value::List(a)
                }
                (Value::Str(a), Value::Str(b)) => Value::Str(a + &b),
                _ => return Err(ManifestError::new(at, "unsupported operands for '+'")),
            };
        }
        Ok(value)
    }

    fn primary(&mut self) -> Result<Value, ManifestError> {
        let at = self.here();
        match self.advance() {
            Tok::Str(mut s) => {
                while let Tok::Str(next) = self.peek() {
                    s.push_str(next);
                    self.advance();
                }
                Ok(Value::Str(s))
            }
            Tok::Number(n) => Ok(Value::Number(n)),
            Tok::Ident(name) => {
                if self.at(&Tok::LParen) {
                    self.advance();
                    let args = self.args(Tok::RParen)?;
                    return Ok(Value::Call { name, args });
                }
                Ok(match name.as_str() {
                    "True" => Value::Bool(true),
                    "False" => Value::Bool(false),
                    "None" => Value::None,
                    _ => self
                        .bindings
                        .get(&name)
                        .cloned()
                        .unwrap_or(Value::Ident(name)),
                })
            }
            Tok::LBracket => Ok(Value::List(self.sequence(Tok::RBracket)?)),
            Tok::LParen => Ok(Value::List(self.sequence(Tok::RParen)?)),
            Tok::LBrace => {
                let mut entries = Vec::new();
                while !self.at(&Tok::RBrace) {
                    let key = self.expr()?;
                    self.expect(Tok::Colon)?;
                    let value = self.expr()?;
                    entries.push((key, value));
                    if !self.at(&Tok::RBrace) {
                        self.expect(Tok::Comma)?;
                    }
                }
                self.advance();
                Ok(Value::Dict(entries))
            }
            other => Err(ManifestError::new(
                at,
                format!("expected a value, found {:?}", other),
            )),
        }
    }

    fn sequence(&mut self, close: Tok) -> Result<Vec<Value>, ManifestError> {
        let mut items = Vec::new();
        while !self.at(&close) {
            items.push(self.expr()?);
            if !self.at(&close) {
                self.expect(Tok::Comma)?;
            }
        }
        self.advance();
        Ok(items)
    }
}
