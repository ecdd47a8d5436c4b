//! Template parser: text + `{{ ... }}` actions into an AST.

use crate::error::TemplateError;
use crate::functions::{FunctionMap, TemplateFn};
use crate::value::Value;

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Text(String),
    Action(Pipeline),
}

/// `command | command | ...`; every stage after the first is a call that
/// receives the previous result as its last argument.
#[derive(Debug, Clone)]
pub(crate) struct Pipeline {
    pub(crate) stages: Vec<Command>,
}

#[derive(Debug, Clone)]
pub(crate) enum Command {
    Operand(Operand),
    Call {
        name: String,
        func: TemplateFn,
        args: Vec<Operand>,
    },
}

#[derive(Debug, Clone)]
pub(crate) enum Operand {
    Literal(Value),
    Field(String),
    Nested(Box<Pipeline>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(Value),
    Field(String),
    Ident(String),
    LParen,
    RParen,
    Pipe,
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

pub(crate) fn parse(
    name: &str,
    text: &str,
    functions: &FunctionMap,
) -> Result<Vec<Node>, TemplateError> {
    let mut nodes = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(rel_open) = text[pos..].find(OPEN) else {
            nodes.push(Node::Text(text[pos..].to_string()));
            break;
        };
        let open = pos + rel_open;
        let mut literal = &text[pos..open];

        let mut body_start = open + OPEN.len();
        if trim_marker_at(text, body_start) {
            literal = literal.trim_end();
            body_start += 1;
        }
        if !literal.is_empty() {
            nodes.push(Node::Text(literal.to_string()));
        }

        let close = find_close(text, body_start).ok_or_else(|| TemplateError::Parse {
            template: name.to_string(),
            offset: open,
            message: "unclosed action".to_string(),
        })?;

        let mut body_end = close;
        let trim_after = close > body_start
            && text[..close].ends_with('-')
            && text[..close - 1].ends_with(char::is_whitespace);
        if trim_after {
            body_end -= 1;
        }

        let body = &text[body_start..body_end];
        let trimmed = body.trim();
        if trimmed.starts_with("/*") && trimmed.ends_with("*/") {
            // comment
        } else if trimmed.is_empty() {
            return Err(TemplateError::Parse {
                template: name.to_string(),
                offset: open,
                message: "empty action".to_string(),
            });
        } else {
            let tokens = lex(name, body, body_start)?;
            let mut parser = Parser {
                name,
                tokens,
                pos: 0,
                functions,
                offset: body_start,
            };
            let pipeline = parser.pipeline()?;
            if let Some((tok, at)) = parser.peek() {
                return Err(parser.error(at, format!("unexpected token {tok:?}")));
            }
            nodes.push(Node::Action(pipeline));
        }

        pos = close + CLOSE.len();
        if trim_after {
            let rest = &text[pos..];
            pos += rest.len() - rest.trim_start().len();
        }
    }

    Ok(nodes)
}

fn trim_marker_at(text: &str, at: usize) -> bool {
    let rest = &text[at..];
    rest.starts_with('-') && rest[1..].starts_with(char::is_whitespace)
}

/// Position of the `}}` closing an action, skipping quoted strings.
fn find_close(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = from;
    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' && q == b'"' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'"' || b == b'`' {
                    quote = Some(b);
                } else if bytes[i..].starts_with(CLOSE.as_bytes()) {
                    return Some(i);
                }
            }
        }
        i += 1;
    }
    None
}

fn lex(name: &str, body: &str, offset: usize) -> Result<Vec<(Token, usize)>, TemplateError> {
    let err = |at: usize, message: String| TemplateError::Parse {
        template: name.to_string(),
        offset: offset + at,
        message,
    };

    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = body.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (at, c) = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push((Token::LParen, at));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, at));
                i += 1;
            }
            '|' => {
                tokens.push((Token::Pipe, at));
                i += 1;
            }
            '"' => {
                let mut s = String::new();
                i += 1;
                loop {
                    let Some(&(_, c)) = chars.get(i) else {
                        return Err(err(at, "unterminated string".to_string()));
                    };
                    i += 1;
                    match c {
                        '"' => break,
                        '\\' => {
                            let Some(&(_, e)) = chars.get(i) else {
                                return Err(err(at, "unterminated string".to_string()));
                            };
                            i += 1;
                            s.push(match e {
                                'n' => '\n',
                                't' => '\t',
                                'r' => '\r',
                                other => other,
                            });
                        }
                        other => s.push(other),
                    }
                }
                tokens.push((Token::Literal(Value::Str(s)), at));
            }
            '`' => {
                let start = i + 1;
                let end = chars[start..]
                    .iter()
                    .position(|&(_, c)| c == '`')
                    .map(|p| start + p)
                    .ok_or_else(|| err(at, "unterminated raw string".to_string()))?;
                let s: String = chars[start..end].iter().map(|&(_, c)| c).collect();
                tokens.push((Token::Literal(Value::Str(s)), at));
                i = end + 1;
            }
            '.' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_ident_char(chars[end].1) {
                    end += 1;
                }
                if end == start {
                    return Err(err(at, "expected field name after '.'".to_string()));
                }
                let field: String = chars[start..end].iter().map(|&(_, c)| c).collect();
                tokens.push((Token::Field(field), at));
                i = end;
            }
            c if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).is_some_and(|&(_, n)| n.is_ascii_digit())) =>
            {
                let start = i;
                i += 1;
                while i < chars.len()
                    && (chars[i].1.is_ascii_alphanumeric() || matches!(chars[i].1, '.' | '+' | '-'))
                {
                    i += 1;
                }
                let raw: String = chars[start..i].iter().map(|&(_, c)| c).collect();
                let value = if let Ok(n) = raw.parse::<i64>() {
                    Value::Int(n)
                } else if let Ok(x) = raw.parse::<f64>() {
                    Value::Float(x)
                } else {
                    return Err(err(at, format!("invalid number '{raw}'")));
                };
                tokens.push((Token::Literal(value), at));
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_char(chars[i].1) {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().map(|&(_, c)| c).collect();
                let token = match ident.as_str() {
                    "true" => Token::Literal(Value::Bool(true)),
                    "false" => Token::Literal(Value::Bool(false)),
                    "nil" => Token::Literal(Value::Null),
                    _ => Token::Ident(ident),
                };
                tokens.push((token, at));
            }
            other => return Err(err(at, format!("unexpected character '{other}'"))),
        }
    }

    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Parser<'a> {
    name: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
    functions: &'a FunctionMap,
    offset: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<(Token, usize)> {
        self.tokens.get(self.pos).cloned()
    }

    fn error(&self, at: usize, message: String) -> TemplateError {
        TemplateError::Parse {
            template: self.name.to_string(),
            offset: self.offset + at,
            message,
        }
    }

    fn pipeline(&mut self) -> Result<Pipeline, TemplateError> {
        let mut stages = vec![self.command(0)?];
        while let Some((Token::Pipe, at)) = self.peek() {
            self.pos += 1;
            let command = self.command(1)?;
            if matches!(command, Command::Operand(_)) {
                return Err(self.error(at, "pipeline stage must be a function call".to_string()));
            }
            stages.push(command);
        }
        Ok(Pipeline { stages })
    }

    /// A call (`name args...`) or a lone operand. `piped` is the number of
    /// extra arguments the call receives from a preceding stage.
    fn command(&mut self, piped: usize) -> Result<Command, TemplateError> {
        match self.peek() {
            Some((Token::Ident(name), _)) => {
                self.pos += 1;
                let mut args = Vec::new();
                while let Some((tok, _)) = self.peek() {
                    if matches!(tok, Token::Pipe | Token::RParen) {
                        break;
                    }
                    args.push(self.operand()?);
                }
                let func = self.resolve(&name, args.len() + piped)?;
                Ok(Command::Call { name, func, args })
            }
            Some(_) => {
                let operand = self.operand()?;
                if let Some((tok, at)) = self.peek() {
                    if !matches!(tok, Token::Pipe | Token::RParen) {
                        return Err(self.error(at, format!("unexpected operand {tok:?}")));
                    }
                }
                Ok(Command::Operand(operand))
            }
            None => {
                let at = self.tokens.last().map_or(0, |(_, at)| *at);
                Err(self.error(at, "missing command".to_string()))
            }
        }
    }

    fn operand(&mut self) -> Result<Operand, TemplateError> {
        let Some((tok, at)) = self.peek() else {
            return Err(self.error(0, "missing operand".to_string()));
        };
        self.pos += 1;
        match tok {
            Token::Literal(v) => Ok(Operand::Literal(v)),
            Token::Field(f) => Ok(Operand::Field(f)),
            Token::Ident(name) => {
                // bare identifier as an argument is a call with no arguments
                let func = self.resolve(&name, 0)?;
                Ok(Operand::Nested(Box::new(Pipeline {
                    stages: vec![Command::Call {
                        name,
                        func,
                        args: Vec::new(),
                    }],
                })))
            }
            Token::LParen => {
                let inner = self.pipeline()?;
                match self.peek() {
                    Some((Token::RParen, _)) => {
                        self.pos += 1;
                        Ok(Operand::Nested(Box::new(inner)))
                    }
                    _ => Err(self.error(at, "unclosed '('".to_string())),
                }
            }
            Token::RParen => Err(self.error(at, "unexpected ')'".to_string())),
            Token::Pipe => Err(self.error(at, "unexpected '|'".to_string())),
        }
    }

    fn resolve(&self, name: &str, argc: usize) -> Result<TemplateFn, TemplateError> {
        let def = self
            .functions
            .get(name)
            .ok_or_else(|| TemplateError::UnknownFunction {
                template: self.name.to_string(),
                function: name.to_string(),
            })?;
        if !def.arity.accepts(argc) {
            return Err(TemplateError::Arity {
                template: self.name.to_string(),
                function: name.to_string(),
                expected: def.arity.to_string(),
                got: argc,
            });
        }
        Ok(def.func)
    }
}
