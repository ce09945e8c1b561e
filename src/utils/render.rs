use serde_json::Value;

/// A parsed template node. Patterns are compiled once at template-load time
/// and evaluated repeatedly against different variable bags.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Var(String),
    If {
        path: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

#[derive(Debug)]
enum Token {
    Text(String),
    Var(String),
    Open { path: String, raw: String },
    Else { raw: String },
    Close { raw: String },
}

enum Term {
    Eof,
    Else(String),
    Close,
}

/// Parse a pattern into an AST.
///
/// Supported tags: `{{path.to.value}}`, `{{#if path}}...{{else}}...{{/if}}`.
/// Blocks nest, and the same condition name may appear at several depths, so
/// each `{{#if}}` is matched to its own `{{else}}`/`{{/if}}` by a stack-based
/// scan rather than a global replace. Anything that is not a recognized tag
/// (including unbalanced closers) stays in the output as literal text.
pub fn parse(pattern: &str) -> Vec<Node> {
    let tokens = tokenize(pattern);
    let mut cursor = Cursor {
        tokens: &tokens,
        pos: 0,
    };
    let (nodes, _) = parse_block(&mut cursor, true);
    nodes
}

/// Evaluate an AST against a variable bag.
///
/// `{{path}}` resolves a dotted path into the bag; a missing path renders as
/// the empty string. `{{#if path}}` tests truthiness: non-null, non-false,
/// non-zero, non-empty.
pub fn eval(nodes: &[Node], vars: &Value) -> String {
    let mut out = String::new();
    eval_into(nodes, vars, &mut out);
    out
}

/// Parse and evaluate in one step. Prefer pre-parsing when the same pattern
/// is rendered more than once.
pub fn render(pattern: &str, vars: &Value) -> String {
    eval(&parse(pattern), vars)
}

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

fn parse_block(cursor: &mut Cursor, top: bool) -> (Vec<Node>, Term) {
    let mut nodes = Vec::new();

    while cursor.pos < cursor.tokens.len() {
        let token = &cursor.tokens[cursor.pos];
        cursor.pos += 1;

        match token {
            Token::Text(s) => nodes.push(Node::Text(s.clone())),
            Token::Var(path) => nodes.push(Node::Var(path.clone())),
            Token::Else { raw } => {
                if top {
                    // Stray {{else}} outside any block: literal text.
                    nodes.push(Node::Text(raw.clone()));
                } else {
                    return (nodes, Term::Else(raw.clone()));
                }
            }
            Token::Close { raw } => {
                if top {
                    nodes.push(Node::Text(raw.clone()));
                } else {
                    return (nodes, Term::Close);
                }
            }
            Token::Open { path, raw } => {
                let (then, term) = parse_block(cursor, false);
                match term {
                    Term::Close => nodes.push(Node::If {
                        path: path.clone(),
                        then,
                        otherwise: Vec::new(),
                    }),
                    Term::Else(else_raw) => {
                        let (otherwise, term2) = parse_block(cursor, false);
                        match term2 {
                            Term::Close => nodes.push(Node::If {
                                path: path.clone(),
                                then,
                                otherwise,
                            }),
                            // Unterminated block: degrade to literal text so a
                            // broken template still renders something legible.
                            _ => {
                                nodes.push(Node::Text(raw.clone()));
                                nodes.extend(then);
                                nodes.push(Node::Text(else_raw));
                                nodes.extend(otherwise);
                                return (nodes, Term::Eof);
                            }
                        }
                    }
                    Term::Eof => {
                        nodes.push(Node::Text(raw.clone()));
                        nodes.extend(then);
                        return (nodes, Term::Eof);
                    }
                }
            }
        }
    }

    (nodes, Term::Eof)
}

fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = src;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            tokens.push(Token::Text(rest[..start].to_string()));
        }
        let tail = &rest[start..];
        match tail[2..].find("}}") {
            Some(end) => {
                let inner = &tail[2..2 + end];
                let raw = &tail[..end + 4];
                tokens.push(classify(inner.trim(), raw));
                rest = &tail[end + 4..];
            }
            None => {
                // No closing braces: the rest is literal.
                tokens.push(Token::Text(tail.to_string()));
                rest = "";
            }
        }
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }
    tokens
}

fn classify(inner: &str, raw: &str) -> Token {
    if inner == "else" {
        return Token::Else {
            raw: raw.to_string(),
        };
    }
    if inner == "/if" {
        return Token::Close {
            raw: raw.to_string(),
        };
    }
    if let Some(cond) = inner.strip_prefix("#if") {
        let path = cond.trim();
        if cond.starts_with(char::is_whitespace) && is_path(path) {
            return Token::Open {
                path: path.to_string(),
                raw: raw.to_string(),
            };
        }
        return Token::Text(raw.to_string());
    }
    if is_path(inner) {
        return Token::Var(inner.to_string());
    }
    // Unknown tag syntax passes through untouched.
    Token::Text(raw.to_string())
}

fn is_path(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn eval_into(nodes: &[Node], vars: &Value, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(s) => out.push_str(s),
            Node::Var(path) => {
                if let Some(value) = lookup(vars, path) {
                    out.push_str(&value_to_string(value));
                }
            }
            Node::If {
                path,
                then,
                otherwise,
            } => {
                if truthy(lookup(vars, path)) {
                    eval_into(then, vars, out);
                } else {
                    eval_into(otherwise, vars, out);
                }
            }
        }
    }
}

fn lookup<'a>(vars: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(vars, |value, key| value.get(key))
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
