use tracing::warn;

/// Split a command line into arguments with POSIX shell quoting rules.
///
/// Malformed quoting (an unterminated quote or a trailing backslash) does not
/// fail: a warning is logged and the line is split on whitespace instead.
pub fn split_args(line: &str) -> Vec<String> {
    match shlex::split(line) {
        Some(args) => args,
        None => {
            warn!(command = line, "failed to parse arguments with shell quoting rules");
            warn!("falling back to simple whitespace split");
            line.split_whitespace().map(str::to_string).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words() {
        assert_eq!(
            split_args("-H example.com -p 8080"),
            vec!["-H", "example.com", "-p", "8080"]
        );
    }

    #[test]
    fn honours_quotes_and_escapes() {
        assert_eq!(
            split_args(r#"-L "tcp://:80?name=a b" -F 'x y' c\ d "q\"t""#),
            vec!["-L", "tcp://:80?name=a b", "-F", "x y", "c d", "q\"t"]
        );
    }

    #[test]
    fn backslash_in_double_quotes_follows_posix() {
        assert_eq!(
            split_args(r#""a\b" "c\$d" 'e\f'"#),
            vec![r"a\b", "c$d", r"e\f"]
        );
    }

    #[test]
    fn empty_quotes_are_arguments() {
        assert_eq!(split_args(r#"-a "" -b"#), vec!["-a", "", "-b"]);
    }

    #[test]
    fn unterminated_quote_falls_back() {
        assert_eq!(
            split_args(r#"-L "tcp://:80 -F x"#),
            vec!["-L", "\"tcp://:80", "-F", "x"]
        );
    }

    #[test]
    fn blank_line_has_no_args() {
        assert!(split_args("   ").is_empty());
    }
}
