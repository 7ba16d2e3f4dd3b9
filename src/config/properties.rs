//! Line-oriented `key=value` parser.
//!
//! Supports the usual properties conventions: `=`, `:` or whitespace as the
//! separator, `#`/`!` comment lines, blank lines, a trailing backslash to
//! continue a logical line onto the next physical one, and backslash escapes
//! (`\t`, `\n`, `\r`, `\f`, `\uXXXX`, and `\` before any other character
//! standing for that character).

/// Parse `text` into `(key, value)` pairs in file order. Duplicate keys are kept;
/// callers apply them in order so the last one wins.
pub(crate) fn parse(text: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut pending = String::new();

    for line in text.lines() {
        let line = line.trim_start();
        if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        match strip_continuation(line) {
            Some(head) => pending.push_str(head),
            None => {
                pending.push_str(line);
                if let Some(entry) = split_entry(&pending) {
                    entries.push(entry);
                }
                pending.clear();
            }
        }
    }

    if let Some(entry) = split_entry(&pending) {
        entries.push(entry);
    }
    entries
}

/// Returns the line without its continuation marker when it ends with an odd
/// number of backslashes.
fn strip_continuation(line: &str) -> Option<&str> {
    let trailing = line.bytes().rev().take_while(|b| *b == b'\\').count();
    if trailing % 2 == 1 {
        Some(&line[..line.len() - 1])
    } else {
        None
    }
}

fn split_entry(line: &str) -> Option<(String, String)> {
    let line = line.trim_start();
    if line.is_empty() {
        return None;
    }

    let key_end = find_separator(line).unwrap_or(line.len());
    let key = unescape(&line[..key_end]);
    if key.is_empty() {
        return None;
    }

    let rest = line[key_end..].trim_start();
    let value = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest)
        .trim_start();

    Some((key, unescape(value)))
}

/// Byte offset of the first separator not preceded by an escaping backslash.
fn find_separator(line: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            return Some(idx);
        }
    }
    None
}

/// Resolve backslash escapes. Trailing whitespace is dropped unless it was escaped.
/// A malformed `\u` sequence is kept as written.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut units = Vec::new();
    let mut escaped_end = 0;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_utf16(&mut units, &mut out);
            out.push(c);
            continue;
        }

        let Some(next) = chars.next() else {
            break;
        };
        if next == 'u' {
            let hex = chars.as_str().get(..4).unwrap_or_default();
            if hex.len() == 4 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                if let Ok(unit) = u16::from_str_radix(hex, 16) {
                    units.push(unit);
                    chars.nth(3);
                    continue;
                }
            }
            flush_utf16(&mut units, &mut out);
            out.push_str("\\u");
            continue;
        }

        flush_utf16(&mut units, &mut out);
        out.push(match next {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\u{0c}',
            other => other,
        });
        escaped_end = out.len();
    }
    if flush_utf16(&mut units, &mut out) {
        escaped_end = out.len();
    }

    let keep = out.trim_end().len().max(escaped_end);
    out.truncate(keep);
    out
}

/// Decode buffered `\uXXXX` code units, pairing surrogates. Returns whether anything
/// was written.
fn flush_utf16(units: &mut Vec<u16>, out: &mut String) -> bool {
    if units.is_empty() {
        return false;
    }
    out.extend(
        char::decode_utf16(units.drain(..)).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, String)> {
        parse(text)
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_owned(), value.to_owned())
    }

    #[test]
    fn parses_all_separator_styles() {
        let text = "a=1\nb : 2\nc 3\nd=\n  e   =   spaced value  \n";
        assert_eq!(
            pairs(text),
            vec![
                pair("a", "1"),
                pair("b", "2"),
                pair("c", "3"),
                pair("d", ""),
                pair("e", "spaced value"),
            ]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# comment\n\n! also a comment\n   \nkey=value\n";
        assert_eq!(pairs(text), vec![pair("key", "value")]);
    }

    #[test]
    fn value_may_contain_separators() {
        let text = "uri.secure=https://host:8443/path?x=1\n";
        assert_eq!(
            pairs(text),
            vec![pair("uri.secure", "https://host:8443/path?x=1")]
        );
    }

    #[test]
    fn backslash_continues_logical_line() {
        let text = "message=first \\\n    second\nnext=1\n";
        assert_eq!(
            pairs(text),
            vec![pair("message", "first second"), pair("next", "1")]
        );
    }

    #[test]
    fn escaped_backslash_does_not_continue() {
        let text = "path=C:\\\\\nnext=1";
        assert_eq!(pairs(text), vec![pair("path", "C:\\"), pair("next", "1")]);
    }

    #[test]
    fn escaped_colon_in_value_is_unescaped() {
        let text = "uri.secure=https\\://www.bbnplace.com/sms/bulksms/\n";
        assert_eq!(
            pairs(text),
            vec![pair("uri.secure", "https://www.bbnplace.com/sms/bulksms/")]
        );
    }

    #[test]
    fn escaped_separators_stay_in_key() {
        let text = "my\\ key=v\na\\=b=c\nx\\:y:z\n";
        assert_eq!(
            pairs(text),
            vec![pair("my key", "v"), pair("a=b", "c"), pair("x:y", "z")]
        );
    }

    #[test]
    fn unicode_and_control_escapes() {
        let text = "sender=caf\\u00e9\nface=\\uD83D\\uDE00\ntabs=a\\tb\\nc\nbad=\\u00zz\n";
        assert_eq!(
            pairs(text),
            vec![
                pair("sender", "café"),
                pair("face", "😀"),
                pair("tabs", "a\tb\nc"),
                pair("bad", "\\u00zz"),
            ]
        );
    }

    #[test]
    fn escaped_trailing_space_is_kept() {
        assert_eq!(pairs("greeting=hi\\ \n"), vec![pair("greeting", "hi ")]);
    }

    #[test]
    fn duplicate_keys_are_preserved_in_order() {
        let text = "a=1\na=2\n";
        assert_eq!(pairs(text), vec![pair("a", "1"), pair("a", "2")]);
    }

    #[test]
    fn dangling_continuation_at_eof_is_kept() {
        assert_eq!(pairs("k=v\\"), vec![pair("k", "v")]);
    }
}
