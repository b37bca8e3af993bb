//! Command template rendering.
//!
//! Command templates are written with Go `text/template` style actions
//! (`{{.host}}`, `{{if .tls}}...{{end}}`, `{{range .peers}}...{{end}}`). They
//! are compiled into MiniJinja source and rendered against the resolved
//! variable set. Only the action subset below is understood; anything else is
//! a syntax error:
//!
//! - `{{.}}`, `{{.a.b}}`, `{{$}}`, `{{$.a}}`
//! - `{{if X}}`, `{{if not X}}`, `{{else if X}}`, `{{else}}`, `{{end}}`
//! - `{{range X}}` (with optional `{{else}}`)
//! - `{{/* comment */}}`
//! - `{{- ` / ` -}}` whitespace trimming
//!
//! Missing variables render as nothing.

use minijinja::{
    context, value::ValueKind, Environment, Error as JinjaError, ErrorKind, UndefinedBehavior,
    Value,
};
use tracing::debug;

use crate::{
    config::VarMap,
    error::{Error, Result},
};

const ROOT: &str = "__vars";

pub fn render(source: &str, vars: &VarMap) -> Result<String> {
    let compiled = compile(source)?;
    debug!(template = %compiled, "compiled command template");
    render_minijinja(&compiled, vars)
}

fn render_minijinja(source: &str, vars: &VarMap) -> Result<String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    env.set_keep_trailing_newline(true);
    env.add_filter("goprint", |v: Value| -> String { go_print(&v) });
    env.add_filter("rangeable", rangeable);

    env.add_template("gost", source)
        .map_err(|e| Error::TemplateSyntax(e.to_string()))?;
    let tpl = env
        .get_template("gost")
        .map_err(|e| Error::TemplateSyntax(e.to_string()))?;

    let ctx = context! { __vars => Value::from_serialize(vars) };
    tpl.render(ctx)
        .map_err(|e| Error::TemplateExecution(e.to_string()))
}

// -------------------- lexing --------------------

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Text(&'a str),
    Action { body: &'a str, line: usize },
}

fn lex(source: &str) -> Result<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut rest = source;
    let mut offset = 0;
    let mut trim_next = false;

    while let Some(start) = rest.find("{{") {
        let line = source[..offset + start].matches('\n').count() + 1;
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(Error::TemplateSyntax(format!(
                "line {line}: unclosed action"
            )));
        };

        let mut text = &rest[..start];
        if trim_next {
            text = trim_space_start(text);
        }

        let mut body = &after[..end];
        let trim_left = body.starts_with('-') && body[1..].starts_with(is_space);
        if trim_left {
            body = &body[1..];
            text = trim_space_end(text);
        }
        trim_next = body.ends_with('-') && body[..body.len() - 1].ends_with(is_space);
        if trim_next {
            body = &body[..body.len() - 1];
        }

        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        segments.push(Segment::Action {
            body: body.trim(),
            line,
        });

        let consumed = start + 2 + end + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }

    let tail = if trim_next { trim_space_start(rest) } else { rest };
    if !tail.is_empty() {
        segments.push(Segment::Text(tail));
    }
    Ok(segments)
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn trim_space_start(s: &str) -> &str {
    s.trim_start_matches(is_space)
}

fn trim_space_end(s: &str) -> &str {
    s.trim_end_matches(is_space)
}

// -------------------- compiling --------------------

enum Block {
    If { has_else: bool },
    Range { has_else: bool },
}

/// Translate Go-style actions into MiniJinja source.
fn compile(source: &str) -> Result<String> {
    let mut out = String::with_capacity(source.len() + 16);
    let mut blocks: Vec<Block> = Vec::new();

    for seg in lex(source)? {
        let (body, line) = match seg {
            Segment::Text(text) => {
                push_text(&mut out, text);
                continue;
            }
            Segment::Action { body, line } => (body, line),
        };

        if body.starts_with("/*") && body.ends_with("*/") && body.len() >= 4 {
            continue;
        }

        let syntax =
            |msg: &str| Error::TemplateSyntax(format!("line {line}: {msg}: {{{{{body}}}}}"));
        // `.` is the innermost range element; a range's else branch sees the outer dot.
        let depth = blocks
            .iter()
            .filter(|b| matches!(b, Block::Range { has_else: false }))
            .count();

        let (keyword, arg) = split_keyword(body);
        match keyword {
            "if" => {
                let cond = condition(arg, depth).ok_or_else(|| syntax("bad condition"))?;
                out.push_str(&format!("{{% if {cond} %}}"));
                blocks.push(Block::If { has_else: false });
            }
            "range" => {
                let expr = operand(arg, depth).ok_or_else(|| syntax("bad range operand"))?;
                out.push_str(&format!(
                    "{{% for {} in {expr}|rangeable %}}",
                    loop_var(depth + 1)
                ));
                blocks.push(Block::Range { has_else: false });
            }
            "else" => {
                let Some(block) = blocks.last_mut() else {
                    return Err(syntax("unexpected else"));
                };
                match block {
                    Block::If { has_else: false } if arg.starts_with("if ") => {
                        let cond = condition(arg[3..].trim(), depth)
                            .ok_or_else(|| syntax("bad condition"))?;
                        out.push_str(&format!("{{% elif {cond} %}}"));
                    }
                    Block::If { has_else } | Block::Range { has_else }
                        if !*has_else && arg.is_empty() =>
                    {
                        *has_else = true;
                        out.push_str("{% else %}");
                    }
                    _ => return Err(syntax("unexpected else")),
                }
            }
            "end" if arg.is_empty() => match blocks.pop() {
                Some(Block::If { .. }) => out.push_str("{% endif %}"),
                Some(Block::Range { .. }) => out.push_str("{% endfor %}"),
                None => return Err(syntax("unexpected end")),
            },
            _ => {
                let expr = operand(body, depth).ok_or_else(|| syntax("unsupported action"))?;
                out.push_str(&format!("{{{{ {expr}|goprint }}}}"));
            }
        }
    }

    if !blocks.is_empty() {
        return Err(Error::TemplateSyntax(
            "unexpected EOF: missing {{end}}".to_string(),
        ));
    }
    Ok(out)
}

fn split_keyword(body: &str) -> (&str, &str) {
    match body.split_once(char::is_whitespace) {
        Some((kw, rest)) => (kw, rest.trim()),
        None => (body, ""),
    }
}

fn loop_var(depth: usize) -> String {
    format!("__it{depth}")
}

fn condition(arg: &str, depth: usize) -> Option<String> {
    match arg.strip_prefix("not ") {
        Some(inner) => operand(inner.trim(), depth).map(|e| format!("not {e}")),
        None => operand(arg, depth),
    }
}

/// `.`, `.a.b`, `$` or `$.a.b` as a MiniJinja expression.
fn operand(arg: &str, depth: usize) -> Option<String> {
    let (mut expr, path) = if let Some(rest) = arg.strip_prefix('$') {
        (ROOT.to_string(), rest)
    } else if arg.starts_with('.') {
        let dot = if depth == 0 {
            ROOT.to_string()
        } else {
            loop_var(depth)
        };
        (dot, arg)
    } else {
        return None;
    };

    if path.is_empty() || (path == "." && !arg.starts_with('$')) {
        return Some(expr);
    }

    let fields = path.strip_prefix('.')?;
    for field in fields.split('.') {
        if !is_field_name(field) {
            return None;
        }
        expr.push_str(&format!("[\"{field}\"]"));
    }
    Some(expr)
}

fn is_field_name(s: &str) -> bool {
    let mut it = s.chars();
    match it.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    it.all(|c| c.is_alphanumeric() || c == '_')
}

/// Literal text goes through as-is unless it could be read as MiniJinja syntax.
fn push_text(out: &mut String, text: &str) {
    if !text.contains('{') {
        out.push_str(text);
        return;
    }
    // JSON string escapes are valid MiniJinja string escapes.
    let lit = serde_json::to_string(text).unwrap_or_else(|_| format!("{text:?}"));
    out.push_str("{{ ");
    out.push_str(&lit);
    out.push_str(" }}");
}

// -------------------- filters --------------------

/// Values to iterate for `range`: sequences as-is, mapping values ordered by
/// key, nothing for missing values.
fn rangeable(v: Value) -> std::result::Result<Value, JinjaError> {
    match v.kind() {
        ValueKind::Undefined | ValueKind::None => Ok(Value::from(Vec::<Value>::new())),
        ValueKind::Seq | ValueKind::Iterable => Ok(v),
        ValueKind::Map => {
            let mut keys: Vec<Value> = v.try_iter()?.collect();
            keys.sort();
            let mut items = Vec::with_capacity(keys.len());
            for key in &keys {
                items.push(v.get_item(key)?);
            }
            Ok(Value::from(items))
        }
        _ => Err(JinjaError::new(
            ErrorKind::InvalidOperation,
            format!("range can't iterate over {v}"),
        )),
    }
}

/// Print a value the way Go's `%v` does; missing and null print nothing.
fn go_print(v: &Value) -> String {
    match v.kind() {
        ValueKind::Undefined | ValueKind::None => String::new(),
        ValueKind::Bool => (if v.is_true() { "true" } else { "false" }).to_string(),
        ValueKind::String => v.as_str().unwrap_or_default().to_string(),
        ValueKind::Number if !v.is_integer() => match f64::try_from(v.clone()) {
            Ok(f) => go_float(f),
            Err(_) => v.to_string(),
        },
        ValueKind::Seq | ValueKind::Iterable => {
            let items: Vec<String> = v
                .try_iter()
                .map(|it| it.map(|x| go_print(&x)).collect())
                .unwrap_or_default();
            format!("[{}]", items.join(" "))
        }
        ValueKind::Map => {
            let mut keys: Vec<Value> = v.try_iter().map(|it| it.collect()).unwrap_or_default();
            keys.sort();
            let pairs: Vec<String> = keys
                .iter()
                .map(|k| {
                    let val = v.get_item(k).unwrap_or_default();
                    format!("{}:{}", go_print(k), go_print(&val))
                })
                .collect();
            format!("map[{}]", pairs.join(" "))
        }
        _ => v.to_string(),
    }
}

/// Go's `%v` for floats: shortest digits, exponent form when the decimal
/// exponent is below -4 or at least 6.
fn go_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return (if f > 0.0 { "+Inf" } else { "-Inf" }).to_string();
    }

    let sci = format!("{f:e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if (-4..6).contains(&exp) {
        return format!("{f}");
    }
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.abs())
}
