//! Parser and evaluator for the naming script subset

use std::cmp::Ordering;

use tracing::trace;

use super::{Metadata, ScriptEngine, ScriptError};

/// `$num()` never pads wider than this
const MAX_NUM_WIDTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Variable(String),
    Call {
        name: &'static str,
        args: Vec<Vec<Node>>,
    },
}

struct FunctionSpec {
    name: &'static str,
    min_args: usize,
    max_args: Option<usize>,
}

const fn spec(name: &'static str, min_args: usize, max_args: Option<usize>) -> FunctionSpec {
    FunctionSpec {
        name,
        min_args,
        max_args,
    }
}

const FUNCTIONS: &[FunctionSpec] = &[
    spec("if", 2, Some(3)),
    spec("if2", 1, None),
    spec("and", 1, None),
    spec("or", 1, None),
    spec("not", 1, Some(1)),
    spec("eq", 2, Some(2)),
    spec("ne", 2, Some(2)),
    spec("gt", 2, Some(2)),
    spec("lt", 2, Some(2)),
    spec("num", 2, Some(2)),
    spec("lower", 1, Some(1)),
    spec("upper", 1, Some(1)),
    spec("left", 2, Some(2)),
    spec("right", 2, Some(2)),
    spec("trim", 1, Some(2)),
    spec("replace", 3, Some(3)),
    spec("noop", 0, None),
    spec("len", 1, Some(1)),
];

fn lookup(name: &str) -> Option<&'static FunctionSpec> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

fn is_variable_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '~' | '-')
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(script: &str) -> Self {
        Self {
            chars: script.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// 1-based position of the next unread character
    fn column(&self) -> usize {
        self.pos + 1
    }

    fn parse(mut self) -> Result<Vec<Node>, ScriptError> {
        self.parse_sequence(false)
    }

    fn parse_sequence(&mut self, in_args: bool) -> Result<Vec<Node>, ScriptError> {
        let mut nodes = Vec::new();
        let mut text = String::new();

        while let Some(c) = self.peek() {
            match c {
                ',' | ')' if in_args => break,
                '\\' => {
                    self.pos += 1;
                    let escaped = self.bump().ok_or_else(|| {
                        ScriptError::new(self.pos, "Unexpected end of script after '\\'")
                    })?;
                    text.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
                '%' => {
                    flush_text(&mut text, &mut nodes);
                    nodes.push(self.parse_variable()?);
                }
                '$' => {
                    flush_text(&mut text, &mut nodes);
                    nodes.push(self.parse_call()?);
                }
                _ => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }

        flush_text(&mut text, &mut nodes);
        Ok(nodes)
    }

    fn parse_variable(&mut self) -> Result<Node, ScriptError> {
        let start = self.column();
        self.pos += 1;

        let mut name = String::new();
        loop {
            match self.bump() {
                Some('%') => break,
                Some(c) if is_variable_char(c) => name.push(c),
                Some(c) => {
                    return Err(ScriptError::new(
                        self.pos,
                        format!("Unexpected character '{c}' in variable name"),
                    ));
                }
                None => {
                    return Err(ScriptError::new(
                        start,
                        "Unexpected end of script, unterminated variable",
                    ));
                }
            }
        }

        if name.is_empty() {
            return Err(ScriptError::new(start, "Empty variable name"));
        }
        Ok(Node::Variable(name))
    }

    fn parse_call(&mut self) -> Result<Node, ScriptError> {
        let start = self.column();
        self.pos += 1;

        let mut name = String::new();
        loop {
            match self.bump() {
                Some('(') => break,
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => name.push(c),
                Some(c) => {
                    return Err(ScriptError::new(
                        self.pos,
                        format!("Unexpected character '{c}' in function name"),
                    ));
                }
                None => {
                    return Err(ScriptError::new(
                        start,
                        "Unexpected end of script, expected '('",
                    ));
                }
            }
        }

        let spec = lookup(&name)
            .ok_or_else(|| ScriptError::new(start, format!("Unknown function '{name}'")))?;

        let mut args = Vec::new();
        loop {
            args.push(self.parse_sequence(true)?);
            match self.bump() {
                Some(',') => continue,
                Some(')') => break,
                _ => {
                    return Err(ScriptError::new(
                        start,
                        format!("Unexpected end of script, missing ')' for '${name}'"),
                    ));
                }
            }
        }

        let too_many = spec.max_args.is_some_and(|max| args.len() > max);
        if args.len() < spec.min_args || too_many {
            let expected = match spec.max_args {
                Some(max) if max == spec.min_args => format!("exactly {max}"),
                Some(max) => format!("between {} and {max}", spec.min_args),
                None => format!("at least {}", spec.min_args),
            };
            return Err(ScriptError::new(
                start,
                format!(
                    "Wrong number of arguments for '${name}': expected {expected}, got {}",
                    args.len()
                ),
            ));
        }

        Ok(Node::Call {
            name: spec.name,
            args,
        })
    }
}

fn flush_text(text: &mut String, nodes: &mut Vec<Node>) {
    if !text.is_empty() {
        nodes.push(Node::Text(std::mem::take(text)));
    }
}

fn eval_nodes(nodes: &[Node], metadata: &Metadata) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Variable(name) => {
                if let Some(value) = metadata.get(name) {
                    out.push_str(value);
                }
            }
            Node::Call { name, args } => out.push_str(&call(name, args, metadata)),
        }
    }
    out
}

fn flag(value: bool) -> String {
    if value { "1".to_string() } else { String::new() }
}

fn compare_numbers(a: &str, b: &str) -> Option<Ordering> {
    let a = a.trim().parse::<f64>().ok()?;
    let b = b.trim().parse::<f64>().ok()?;
    a.partial_cmp(&b)
}

fn call(name: &str, args: &[Vec<Node>], metadata: &Metadata) -> String {
    let arg = |i: usize| {
        args.get(i)
            .map(|a| eval_nodes(a, metadata))
            .unwrap_or_default()
    };

    match name {
        "if" => {
            if arg(0).is_empty() {
                arg(2)
            } else {
                arg(1)
            }
        }
        "if2" => args
            .iter()
            .map(|a| eval_nodes(a, metadata))
            .find(|v| !v.is_empty())
            .unwrap_or_default(),
        "and" => flag(args.iter().all(|a| !eval_nodes(a, metadata).is_empty())),
        "or" => flag(args.iter().any(|a| !eval_nodes(a, metadata).is_empty())),
        "not" => flag(arg(0).is_empty()),
        "eq" => flag(arg(0) == arg(1)),
        "ne" => flag(arg(0) != arg(1)),
        "gt" => flag(compare_numbers(&arg(0), &arg(1)) == Some(Ordering::Greater)),
        "lt" => flag(compare_numbers(&arg(0), &arg(1)) == Some(Ordering::Less)),
        "num" => match (arg(0).trim().parse::<i64>(), arg(1).trim().parse::<usize>()) {
            (Ok(number), Ok(width)) => {
                format!("{number:0width$}", width = width.min(MAX_NUM_WIDTH))
            }
            _ => String::new(),
        },
        "lower" => arg(0).to_lowercase(),
        "upper" => arg(0).to_uppercase(),
        "left" => match arg(1).trim().parse::<usize>() {
            Ok(count) => arg(0).chars().take(count).collect(),
            Err(_) => String::new(),
        },
        "right" => match arg(1).trim().parse::<usize>() {
            Ok(count) => {
                let text = arg(0);
                let skip = text.chars().count().saturating_sub(count);
                text.chars().skip(skip).collect()
            }
            Err(_) => String::new(),
        },
        "trim" => {
            if args.len() > 1 {
                let strip: Vec<char> = arg(1).chars().collect();
                arg(0).trim_matches(|c| strip.contains(&c)).to_string()
            } else {
                arg(0).trim().to_string()
            }
        }
        "replace" => {
            let search = arg(1);
            if search.is_empty() {
                arg(0)
            } else {
                arg(0).replace(&search, &arg(2))
            }
        }
        "len" => arg(0).chars().count().to_string(),
        _ => String::new(),
    }
}

/// Reference implementation of the tagger naming language subset
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggerScript;

impl TaggerScript {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptEngine for TaggerScript {
    fn evaluate(&self, script: &str, metadata: &Metadata) -> Result<String, ScriptError> {
        let nodes = Parser::new(script).parse()?;
        trace!(nodes = nodes.len(), "Evaluating naming script");
        Ok(eval_nodes(&nodes, metadata))
    }

    fn check(&self, script: &str) -> Result<(), ScriptError> {
        Parser::new(script).parse().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_FILE_NAMING_FORMAT;

    fn metadata(pairs: &[(&str, &str)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn eval(script: &str, md: &Metadata) -> String {
        TaggerScript::new().evaluate(script, md).unwrap()
    }

    #[test]
    fn test_variables_and_text() {
        let md = metadata(&[("artist", "Björk"), ("title", "Jóga")]);
        assert_eq!(eval("%artist%/%title%", &md), "Björk/Jóga");
        assert_eq!(eval("%missing%x", &md), "x");
    }

    #[test]
    fn test_conditionals() {
        let md = metadata(&[("albumartist", "Various"), ("artist", "A")]);
        assert_eq!(eval("$if(%albumartist%,yes,no)", &md), "yes");
        assert_eq!(eval("$if(%nothing%,yes,no)", &md), "no");
        assert_eq!(eval("$if(%nothing%,yes)", &md), "");
        assert_eq!(eval("$if2(%nothing%,%artist%,x)", &md), "A");
        assert_eq!(eval("$and(%artist%,%albumartist%)", &md), "1");
        assert_eq!(eval("$and(%artist%,%nothing%)", &md), "");
        assert_eq!(eval("$not(%nothing%)", &md), "1");
    }

    #[test]
    fn test_numeric_functions() {
        let md = metadata(&[("tracknumber", "7"), ("totaldiscs", "2")]);
        assert_eq!(eval("$num(%tracknumber%,2)", &md), "07");
        assert_eq!(eval("$num(abc,2)", &md), "");
        assert_eq!(eval("$gt(%totaldiscs%,1)", &md), "1");
        assert_eq!(eval("$lt(%totaldiscs%,1)", &md), "");
        assert_eq!(eval("$gt(x,1)", &md), "");
    }

    #[test]
    fn test_text_functions() {
        let md = Metadata::new();
        assert_eq!(eval("$lower(ABC)$upper(def)", &md), "abcDEF");
        assert_eq!(eval("$left(abcdef,2)$right(abcdef,2)", &md), "abef");
        assert_eq!(eval("$trim(  x  )", &md), "x");
        assert_eq!(eval("$trim(--x--,-)", &md), "x");
        assert_eq!(eval("$replace(a-b-c,-,+)", &md), "a+b+c");
        assert_eq!(eval("$len(héllo)", &md), "5");
        assert_eq!(eval("a$noop(ignored,%x%)b", &md), "ab");
    }

    #[test]
    fn test_escapes() {
        let md = Metadata::new();
        assert_eq!(eval(r"\$\%\,\\", &md), r"$%,\");
        assert_eq!(eval(r"$if(1,a\,b)", &md), "a,b");
        assert_eq!(eval(r"a\nb", &md), "a\nb");
    }

    #[test]
    fn test_top_level_punctuation_is_text() {
        assert_eq!(eval("(a, b)", &Metadata::new()), "(a, b)");
    }

    #[test]
    fn test_unknown_function() {
        let err = TaggerScript::new().check("x$invalid(").unwrap_err();
        assert_eq!(err.position, 2);
        assert!(err.message.contains("Unknown function 'invalid'"));
    }

    #[test]
    fn test_unterminated_call() {
        let err = TaggerScript::new().check("$lower(abc").unwrap_err();
        assert!(err.message.contains("missing ')'"));
    }

    #[test]
    fn test_unterminated_variable() {
        let err = TaggerScript::new().check("%artist").unwrap_err();
        assert_eq!(err.position, 1);
        assert!(err.message.contains("unterminated variable"));
    }

    #[test]
    fn test_argument_count() {
        let err = TaggerScript::new().check("$if(a)").unwrap_err();
        assert!(err.message.contains("between 2 and 3"));
        let err = TaggerScript::new().check("$lower(a,b)").unwrap_err();
        assert!(err.message.contains("exactly 1"));
    }

    #[test]
    fn test_default_format() {
        let md = metadata(&[
            ("albumartist", "The Band"),
            ("artist", "The Band"),
            ("album", "First Album"),
            ("tracknumber", "3"),
            ("totaldiscs", "1"),
            ("title", "Song"),
        ]);
        assert_eq!(
            eval(DEFAULT_FILE_NAMING_FORMAT, &md),
            "The Band/\nFirst Album/\n03 Song"
        );
        assert!(TaggerScript::new().check(DEFAULT_FILE_NAMING_FORMAT).is_ok());
    }
}
