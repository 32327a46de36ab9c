//! Recursive-descent JSON parser.
//!
//! The parser walks the input's bytes with a single cursor. Tokenizing and
//! parsing are fused: each `parse_*` method consumes exactly the bytes of the
//! construct it names, skipping whitespace around tokens, and the call stack
//! holds the parse state.
//!
//! # Key design decisions
//!
//! - **Byte cursor over `&str`**: every structural character is ASCII, so
//!   string contents can be sliced straight out of the input between quotes
//!   and escapes without re-validating UTF-8.
//! - **Strict separators**: commas are required between members and elements;
//!   leading, trailing and doubled commas are rejected.
//! - **Number lexemes**: the run of `[0-9.eE+-]` is checked against the JSON
//!   number grammar before conversion, so `1.`, `.5` and `1e` are errors.
//!   `has_fraction` is set when the lexeme has a `.` or an exponent.
//! - **Bounded nesting**: recursion depth is capped by
//!   [`ParserOptions::max_depth`].

use crate::array::Array;
use crate::error::ParseError;
use crate::number::Number;
use crate::object::Object;
use crate::value::{Value, ValueKind};

/// Default cap on array/object nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Deepest allowed array/object nesting; the top-level container is depth 1.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserOptions {
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Parse one JSON document into a [`Value`].
///
/// The whole input must be a single value surrounded by optional whitespace.
pub fn parse_value(text: &str) -> Result<Value, ParseError> {
    parse_value_with(text, ParserOptions::default())
}

/// [`parse_value`] with explicit settings.
pub fn parse_value_with(text: &str, options: ParserOptions) -> Result<Value, ParseError> {
    tracing::trace!(len = text.len(), "parsing document");
    let mut parser = Parser::new(text, options);
    let result = parser.parse_document();
    if let Err(err) = &result {
        tracing::debug!(error = %err, "parse failed");
    }
    result
}

/// Parse a document whose top-level value must be an object.
pub fn parse_object(text: &str) -> Result<Object, ParseError> {
    match parse_value(text)? {
        Value::Object(object) => Ok(object),
        other => Err(ParseError::UnexpectedRoot {
            expected: ValueKind::Object,
            found: other.kind(),
        }),
    }
}

/// Parse a document whose top-level value must be an array.
pub fn parse_array(text: &str) -> Result<Array, ParseError> {
    match parse_value(text)? {
        Value::Array(array) => Ok(array),
        other => Err(ParseError::UnexpectedRoot {
            expected: ValueKind::Array,
            found: other.kind(),
        }),
    }
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, options: ParserOptions) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    /// One value, then nothing but whitespace.
    fn parse_document(&mut self) -> Result<Value, ParseError> {
        let value = self.parse_value()?;
        self.skip_whitespace();
        if self.pos < self.bytes.len() {
            return Err(ParseError::TrailingCharacters { offset: self.pos });
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{') => self.parse_object().map(Value::Object),
            Some(b'[') => self.parse_array().map(Value::Array),
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b't') => self.parse_literal("true", Value::Bool(true)),
            Some(b'f') => self.parse_literal("false", Value::Bool(false)),
            Some(b'n') => self.parse_literal("null", Value::Null),
            Some(b'-' | b'0'..=b'9') => self.parse_number().map(Value::Number),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn parse_object(&mut self) -> Result<Object, ParseError> {
        self.expect(b'{', "'{'")?;
        self.enter()?;
        let mut object = Object::new();

        self.skip_whitespace();
        if self.eat(b'}') {
            self.depth -= 1;
            return Ok(object);
        }

        loop {
            self.skip_whitespace();
            if self.peek() != Some(b'"') {
                return Err(self.unexpected("a string key"));
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(b':', "':'")?;
            let value = self.parse_value()?;
            // Duplicate keys: the last occurrence wins.
            object.set(key, value);

            self.skip_whitespace();
            if self.eat(b',') {
                continue;
            }
            if self.eat(b'}') {
                break;
            }
            return Err(self.unexpected("',' or '}'"));
        }

        self.depth -= 1;
        Ok(object)
    }

    fn parse_array(&mut self) -> Result<Array, ParseError> {
        self.expect(b'[', "'['")?;
        self.enter()?;
        let mut array = Array::new();

        self.skip_whitespace();
        if self.eat(b']') {
            self.depth -= 1;
            return Ok(array);
        }

        loop {
            let value = self.parse_value()?;
            array.append(value);

            self.skip_whitespace();
            if self.eat(b',') {
                continue;
            }
            if self.eat(b']') {
                break;
            }
            return Err(self.unexpected("',' or ']'"));
        }

        self.depth -= 1;
        Ok(array)
    }

    /// Parse a quoted string, resolving escapes. The cursor must be on the
    /// opening quote.
    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect(b'"', "'\"'")?;
        let mut out = String::new();
        let mut run_start = self.pos;

        loop {
            match self.peek() {
                None => return Err(ParseError::UnexpectedEnd),
                Some(b'"') => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    self.parse_escape(&mut out)?;
                    run_start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Resolve one escape; the cursor is just past the backslash.
    fn parse_escape(&mut self, out: &mut String) -> Result<(), ParseError> {
        let offset = self.pos - 1;
        let Some(byte) = self.peek() else {
            return Err(ParseError::UnexpectedEnd);
        };
        self.pos += 1;
        match byte {
            b'"' => out.push('"'),
            b'\\' => out.push('\\'),
            b'/' => out.push('/'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'u' => out.push(self.parse_unicode_escape(offset)?),
            _ => return Err(ParseError::InvalidEscape { offset }),
        }
        Ok(())
    }

    /// `\uXXXX`, combining a high surrogate with a following `\uXXXX` low
    /// surrogate. Lone surrogates are rejected.
    fn parse_unicode_escape(&mut self, offset: usize) -> Result<char, ParseError> {
        let code = self.parse_hex4(offset)?;
        let scalar = match code {
            0xD800..=0xDBFF => {
                if self.bytes.get(self.pos..self.pos + 2) != Some(b"\\u".as_slice()) {
                    return Err(ParseError::InvalidUnicode { offset });
                }
                self.pos += 2;
                let low = self.parse_hex4(offset)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(ParseError::InvalidUnicode { offset });
                }
                0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => return Err(ParseError::InvalidUnicode { offset }),
            _ => code,
        };
        char::from_u32(scalar).ok_or(ParseError::InvalidUnicode { offset })
    }

    fn parse_hex4(&mut self, offset: usize) -> Result<u32, ParseError> {
        let Some(digits) = self.bytes.get(self.pos..self.pos + 4) else {
            return Err(ParseError::UnexpectedEnd);
        };
        let mut code = 0u32;
        for &d in digits {
            let nibble = (d as char)
                .to_digit(16)
                .ok_or(ParseError::InvalidUnicode { offset })?;
            code = code * 16 + nibble;
        }
        self.pos += 4;
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<Number, ParseError> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')
        ) {
            self.pos += 1;
        }
        let lexeme = &self.text[start..self.pos];
        let invalid = || ParseError::InvalidNumber {
            lexeme: lexeme.to_string(),
            offset: start,
        };

        if !is_number_lexeme(lexeme.as_bytes()) {
            return Err(invalid());
        }
        let value: f64 = lexeme.parse().map_err(|_| invalid())?;
        let has_fraction = lexeme.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'));
        // Overflow to infinity is rejected rather than stored.
        Number::with_fraction(value, has_fraction).ok_or_else(invalid)
    }

    fn parse_literal(&mut self, literal: &'static str, value: Value) -> Result<Value, ParseError> {
        let end = self.pos + literal.len();
        if self.bytes.get(self.pos..end) == Some(literal.as_bytes()) {
            self.pos = end;
            return Ok(value);
        }
        // Point at the first byte that differs.
        let matched = literal
            .bytes()
            .zip(&self.bytes[self.pos..])
            .take_while(|(want, got)| want == *got)
            .count();
        self.pos += matched;
        Err(self.unexpected(literal))
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::DepthLimitExceeded {
                limit: self.max_depth,
                offset: self.pos.saturating_sub(1),
            });
        }
        Ok(())
    }

    fn expect(&mut self, byte: u8, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }

    /// Error for whatever sits at the cursor.
    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.text[self.pos..].chars().next() {
            Some(found) => ParseError::UnexpectedChar {
                found,
                expected,
                offset: self.pos,
            },
            None => ParseError::UnexpectedEnd,
        }
    }
}

/// `-? digit+ ('.' digit+)? ([eE] [+-]? digit+)?`
fn is_number_lexeme(s: &[u8]) -> bool {
    let digits = |i: &mut usize| {
        let start = *i;
        while s.get(*i).is_some_and(u8::is_ascii_digit) {
            *i += 1;
        }
        *i > start
    };

    let mut i = 0;
    if s.first() == Some(&b'-') {
        i += 1;
    }
    if !digits(&mut i) {
        return false;
    }
    if s.get(i) == Some(&b'.') {
        i += 1;
        if !digits(&mut i) {
            return false;
        }
    }
    if matches!(s.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(s.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !digits(&mut i) {
            return false;
        }
    }
    i == s.len()
}
