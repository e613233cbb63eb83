//! Literal notation for value trees
//!
//! A small literal syntax so trees can be written down in tests, config and
//! on the command line, and printed back the same way.
//!
//! # Format Examples
//!
//! - None / Bool: `None`, `True`, `False`
//! - Int: `42`, `-7`, `0xff`
//! - Float: `3.14`, `1e-5`, `nan`, `inf`, `-inf`
//! - String: `"hello"` or `'hello'` (escapes: `\" \' \\ \n \r \t \uXXXX`)
//! - Sequence: `[1, 2, 3]`
//! - Tuple: `()`, `(1,)`, `(1, 2)`; a bare `(x)` is just grouping
//! - Map: `{"key": "value", 1: [2]}`
//!
//! Trailing commas are allowed and `#` starts a comment that runs to the
//! end of the line. Sequence literals are allocated exactly to length; map
//! literals insert their entries in order, so the map's table grows the same
//! way it would at runtime.

use crate::map::Map;
use crate::sequence::Sequence;
use crate::tuple::Tuple;
use crate::value::Value;
use std::fmt;

/// Maximum bracket nesting accepted by the parser
pub const MAX_NESTING: usize = 512;

/// Syntax error with a 1-based source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse exactly one literal
pub fn parse(source: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(source);
    parser.skip_trivia();
    if parser.is_at_end() {
        return Err(parser.error("Expected a value, found end of input"));
    }
    let value = parser.parse_value(0)?;
    parser.skip_trivia();
    if !parser.is_at_end() {
        return Err(parser.error(format!(
            "Unexpected '{}' after value",
            parser.current().unwrap_or(' ')
        )));
    }
    Ok(value)
}

/// Parse a whitespace-separated series of literals
pub fn parse_many(source: &str) -> Result<Vec<Value>, ParseError> {
    let mut parser = Parser::new(source);
    let mut values = Vec::new();
    loop {
        parser.skip_trivia();
        if parser.is_at_end() {
            return Ok(values);
        }
        values.push(parser.parse_value(0)?);
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Parser {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value, ParseError> {
        if depth >= MAX_NESTING {
            return Err(self.error(format!("Nesting deeper than {} levels", MAX_NESTING)));
        }

        match self.current() {
            Some('[') => self.parse_sequence(depth),
            Some('(') => self.parse_tuple_or_group(depth),
            Some('{') => self.parse_map(depth),
            Some(quote @ ('"' | '\'')) => self.parse_string(quote).map(Value::Str),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() => self.parse_word(),
            Some(c) => Err(self.error(format!("Unexpected '{}'", c))),
            None => Err(self.error("Unexpected end of input")),
        }
    }

    fn parse_sequence(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.advance(); // [
        let items = self.parse_items(']', depth)?;
        Ok(Value::Sequence(Sequence::from(items)))
    }

    fn parse_tuple_or_group(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.advance(); // (
        self.skip_trivia();
        if self.consume(')') {
            return Ok(Value::Tuple(Tuple::empty()));
        }

        let first = self.parse_value(depth + 1)?;
        self.skip_trivia();
        if self.consume(')') {
            return Ok(first);
        }
        self.expect(',')?;

        let mut items = vec![first];
        items.extend(self.parse_items(')', depth)?);
        Ok(Value::Tuple(Tuple::new(items)))
    }

    /// Comma-separated values up to `close`, trailing comma allowed
    fn parse_items(&mut self, close: char, depth: usize) -> Result<Vec<Value>, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.consume(close) {
                return Ok(items);
            }
            items.push(self.parse_value(depth + 1)?);
            self.skip_trivia();
            if self.consume(close) {
                return Ok(items);
            }
            self.expect(',')?;
        }
    }

    fn parse_map(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.advance(); // {
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            if self.consume('}') {
                return Ok(Value::Map(map));
            }

            let (key_line, key_column) = (self.line, self.column);
            let key = self.parse_value(depth + 1)?;
            self.skip_trivia();
            self.expect(':')?;
            self.skip_trivia();
            let value = self.parse_value(depth + 1)?;

            map.insert(key, value).map_err(|e| ParseError {
                message: e.to_string(),
                line: key_line,
                column: key_column,
            })?;

            self.skip_trivia();
            if self.consume('}') {
                return Ok(Value::Map(map));
            }
            self.expect(',')?;
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, ParseError> {
        self.advance(); // opening quote
        let mut result = String::new();
        loop {
            let Some(ch) = self.advance() else {
                return Err(self.error("Unclosed string literal"));
            };
            if ch == quote {
                return Ok(result);
            }
            if ch != '\\' {
                result.push(ch);
                continue;
            }
            match self.advance() {
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some('\\') => result.push('\\'),
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('u') => result.push(self.parse_unicode_escape()?),
                Some(c) => {
                    return Err(self.error(format!(
                        "Unknown escape sequence '\\{}' in string literal",
                        c
                    )));
                }
                None => return Err(self.error("String ends with incomplete escape sequence")),
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, ParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .advance()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("Expected four hex digits after \\u"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error(format!("Invalid code point {:04x}", code)))
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let (line, column) = (self.line, self.column);
        let mut token = String::new();
        while let Some(c) = self.current() {
            if c.is_ascii_alphanumeric() || "+-._".contains(c) {
                // a sign only continues a number right after an exponent marker
                if (c == '+' || c == '-') && !token.is_empty() && !token.ends_with(['e', 'E']) {
                    break;
                }
                token.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let err = |message: String| ParseError {
            message,
            line,
            column,
        };

        let unsigned = token.trim_start_matches(['-', '+']);
        if unsigned == "inf" {
            let f = if token.starts_with('-') {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
            return Ok(Value::Float(f));
        }

        if let Some(hex) = unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
        {
            let magnitude = i64::from_str_radix(hex, 16)
                .map_err(|e| err(format!("Invalid hex literal '{}': {}", token, e)))?;
            let n = if token.starts_with('-') {
                -magnitude
            } else {
                magnitude
            };
            return Ok(Value::Int(n));
        }

        if is_float_literal(&token) {
            token
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| err(format!("Invalid float literal '{}': {}", token, e)))
        } else {
            token
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| err(format!("Invalid integer literal '{}': {}", token, e)))
        }
    }

    fn parse_word(&mut self) -> Result<Value, ParseError> {
        let (line, column) = (self.line, self.column);
        let mut word = String::new();
        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match word.as_str() {
            "None" => Ok(Value::None),
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "nan" => Ok(Value::Float(f64::NAN)),
            "inf" => Ok(Value::Float(f64::INFINITY)),
            _ => Err(ParseError {
                message: format!("Unknown word '{}'", word),
                line,
                column,
            }),
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.current() {
            if c.is_whitespace() {
                self.advance();
            } else if c == '#' {
                while let Some(c) = self.current() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.consume(expected) {
            return Ok(());
        }
        Err(match self.current() {
            Some(c) => self.error(format!("Expected '{}', found '{}'", expected, c)),
            None => self.error(format!("Expected '{}', found end of input", expected)),
        })
    }

    fn consume(&mut self, expected: char) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            line: self.line,
            column: self.column,
        }
    }
}

/// Float literals carry a decimal point or an exponent
///
/// Checked before integer parsing so `5.0` never reads as `5`.
fn is_float_literal(token: &str) -> bool {
    let s = token.trim_start_matches(['-', '+']);
    if s.is_empty() {
        return false;
    }
    s.contains('.') || s.contains('e') || s.contains('E')
}

// ============================================================================
// Printing
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();
        format_value(self, &mut buf);
        f.write_str(&buf)
    }
}

fn format_value(value: &Value, buf: &mut String) {
    match value {
        Value::None => buf.push_str("None"),
        Value::Bool(b) => buf.push_str(if *b { "True" } else { "False" }),
        Value::Int(n) => buf.push_str(&n.to_string()),
        Value::Float(f) => format_float(*f, buf),
        Value::Str(s) => format_string(s, buf),
        Value::Sequence(seq) => {
            buf.push('[');
            format_items(seq.iter(), buf);
            buf.push(']');
        }
        Value::Tuple(tuple) => {
            buf.push('(');
            format_items(tuple.iter(), buf);
            if tuple.len() == 1 {
                buf.push(',');
            }
            buf.push(')');
        }
        Value::Map(map) => format_map(map, buf),
    }
}

fn format_float(f: f64, buf: &mut String) {
    if f.is_nan() {
        buf.push_str("nan");
    } else if f.is_infinite() {
        buf.push_str(if f < 0.0 { "-inf" } else { "inf" });
    } else {
        let s = f.to_string();
        buf.push_str(&s);
        // Ensure floats always have decimal point for disambiguation
        if !s.contains('.') {
            buf.push_str(".0");
        }
    }
}

fn format_string(s: &str, buf: &mut String) {
    buf.push('"');
    for c in s.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            c if c.is_control() => {
                buf.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => buf.push(c),
        }
    }
    buf.push('"');
}

fn format_items<'a>(items: impl Iterator<Item = &'a Value>, buf: &mut String) {
    for (i, item) in items.enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        format_value(item, buf);
    }
}

/// Maps print with keys sorted by their printed form for stable output
fn format_map(map: &Map, buf: &mut String) {
    let mut entries: Vec<(String, &Value)> = map
        .iter()
        .map(|(key, value)| {
            let mut key_buf = String::new();
            format_value(key, &mut key_buf);
            (key_buf, value)
        })
        .collect();
    entries.sort_by(|(k1, _), (k2, _)| k1.cmp(k2));

    buf.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        buf.push_str(&key);
        buf.push_str(": ");
        format_value(value, buf);
    }
    buf.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse("None").unwrap(), Value::None);
        assert_eq!(parse("True").unwrap(), Value::Bool(true));
        assert_eq!(parse("-42").unwrap(), Value::Int(-42));
        assert_eq!(parse("0xff").unwrap(), Value::Int(255));
        assert_eq!(parse("-0x10").unwrap(), Value::Int(-16));
        assert_eq!(parse("2.5").unwrap(), Value::Float(2.5));
        assert_eq!(parse("1e3").unwrap(), Value::Float(1000.0));
        assert_eq!(parse("-inf").unwrap(), Value::Float(f64::NEG_INFINITY));
        assert_eq!(parse("nan").unwrap(), Value::Float(f64::NAN));
        assert_eq!(parse("'it\\'s'").unwrap(), Value::from("it's"));
        assert_eq!(parse(r#""tab\there""#).unwrap(), Value::from("tab\there"));
        assert_eq!(parse(r#""\u0041""#).unwrap(), Value::from("A"));
    }

    #[test]
    fn test_parse_tuple_forms() {
        assert_eq!(parse("()").unwrap(), Value::Tuple(Tuple::empty()));
        assert_eq!(parse("(7)").unwrap(), Value::Int(7));
        assert_eq!(
            parse("(7,)").unwrap(),
            Value::Tuple(Tuple::new(vec![Value::Int(7)]))
        );
        assert_eq!(
            parse("( 1 , 2 , )").unwrap(),
            Value::Tuple(Tuple::new(vec![Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn test_parse_nested() {
        let value = parse(
            r#"
            # a root tuple
            ({"a": [1, 2, 3], (1, 2): None},  [], "x")
            "#,
        )
        .unwrap();
        let Value::Tuple(root) = &value else {
            panic!("Expected tuple, got {:?}", value);
        };
        assert_eq!(root.len(), 3);

        let Some(Value::Map(map)) = root.get(0) else {
            panic!("Expected map");
        };
        assert_eq!(map.len(), 2);
        let key = Value::Tuple(Tuple::new(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(map.get(&key), Some(&Value::None));

        let Some(Value::Sequence(seq)) = map.get(&Value::from("a")) else {
            panic!("Expected sequence");
        };
        assert_eq!(seq.capacity(), 3);
    }

    #[test]
    fn test_parse_many() {
        let values = parse_many("1 [2]\n(3,) # trailing\n").unwrap();
        assert_eq!(values.len(), 3);
        assert!(parse_many("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors_have_positions() {
        let err = parse("[1, 2").unwrap_err();
        assert!(err.message.contains("Expected ','"), "{}", err);

        let err = parse("(1, 2)\n  oops").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 3);

        let err = parse("{[1]: 2}").unwrap_err();
        assert!(err.message.contains("Unhashable"));
        assert_eq!((err.line, err.column), (1, 2));

        assert!(parse("\"open").is_err());
        assert!(parse("\"bad \\q\"").is_err());
        assert!(parse("nope").is_err());
        assert!(parse("").is_err());
        assert!(parse("1 2").is_err());
        assert!(parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let deep = "[".repeat(MAX_NESTING + 1) + &"]".repeat(MAX_NESTING + 1);
        let err = parse(&deep).unwrap_err();
        assert!(err.message.contains("Nesting"));

        let ok = "[".repeat(10) + &"]".repeat(10);
        assert!(parse(&ok).is_ok());
    }

    #[test]
    fn test_display_round_trip() {
        let source = r#"({"b": [1, 2.0, "q\"uote"], "a": (None,), 3: {}}, (), [True, -1.5e-7])"#;
        let value = parse(source).unwrap();
        let printed = value.to_string();
        assert_eq!(parse(&printed).unwrap(), value);
        assert!(printed.starts_with("({\"a\": (None,), \"b\": [1, 2.0, "));
        assert!(printed.ends_with("3: {}}, (), [True, -0.00000015])"));
    }

    #[test]
    fn test_display_special_floats() {
        assert_eq!(Value::Float(f64::NAN).to_string(), "nan");
        assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::from("\u{1}").to_string(), "\"\\u0001\"");
    }
}
