/// Collapse a rendered template into one command line: lines are trimmed,
/// blank lines dropped, the rest joined with single spaces.
pub fn join_lines(rendered: &str) -> String {
    rendered
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace `$NAME` and `${NAME}` with values from the process environment.
/// Unset variables expand to nothing.
pub fn expand_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Shell-style `$` expansion against an arbitrary lookup.
///
/// - `$NAME`: longest run of ASCII alphanumerics and `_`
/// - `$1`, `$@`, `$?`, ...: a single special character
/// - `${...}`: everything up to the closing brace
/// - a `$` that starts none of the above is kept as-is
/// - malformed `${` and `${}` are dropped
pub fn expand_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    let mut copied = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' || i + 1 >= bytes.len() {
            i += 1;
            continue;
        }

        out.push_str(&input[copied..i]);
        let (name, width) = shell_name(&input[i + 1..]);
        match name {
            Some(name) => out.push_str(&lookup(name).unwrap_or_default()),
            None if width == 0 => out.push('$'),
            None => {}
        }
        i += 1 + width;
        copied = i;
    }

    out.push_str(&input[copied..]);
    out
}

/// Name following a `$` and the number of bytes it occupies.
fn shell_name(s: &str) -> (Option<&str>, usize) {
    let bytes = s.as_bytes();
    if bytes[0] == b'{' {
        if bytes.len() > 2 && is_special(bytes[1]) && bytes[2] == b'}' {
            return (Some(&s[1..2]), 3);
        }
        return match s[1..].find('}') {
            Some(0) => (None, 2),
            Some(end) => (Some(&s[1..end + 1]), end + 2),
            None => (None, 1),
        };
    }
    if is_special(bytes[0]) {
        return (Some(&s[..1]), 1);
    }

    let end = bytes
        .iter()
        .position(|b| !is_ident_char(*b))
        .unwrap_or(bytes.len());
    if end == 0 {
        (None, 0)
    } else {
        (Some(&s[..end]), end)
    }
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_special(b: u8) -> bool {
    matches!(b, b'*' | b'#' | b'$' | b'@' | b'!' | b'?' | b'-') || b.is_ascii_digit()
}
