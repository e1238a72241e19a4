//! `.editorconfig` section globs, compiled to anchored regular expressions.
//!
//! Supported syntax: `*`, `**`, `?`, `[chars]`, `[!chars]`, `{a,b}`,
//! `{num1..num2}` and backslash escapes. A glob without `/` matches the
//! file name at any depth below the config directory; a glob with `/` is
//! relative to the config directory.

use std::path::Path;

use regex::Regex;

#[derive(Debug, Clone)]
pub struct SectionGlob {
    regex: Regex,
    /// Inclusive bounds for each `{num1..num2}` capture group, in order.
    ranges: Vec<(i64, i64)>,
}

impl SectionGlob {
    pub fn new(pattern: &str, config_dir: &Path) -> Result<Self, regex::Error> {
        let dir = normalize_separators(&config_dir.to_string_lossy());
        let dir = dir.trim_end_matches('/');

        let mut translator = Translator::default();
        let body = if pattern.contains('/') {
            // The joining slash goes through the translator so a leading
            // `**/` can match zero directories.
            let relative = format!("/{}", pattern.trim_start_matches('/'));
            format!("{}{}", regex::escape(dir), translator.translate(&relative))
        } else {
            format!("{}/(?:.*/)?{}", regex::escape(dir), translator.translate(pattern))
        };

        Ok(Self {
            regex: Regex::new(&format!("^{body}$"))?,
            ranges: translator.ranges,
        })
    }

    pub fn is_match(&self, path: &Path) -> bool {
        let path = normalize_separators(&path.to_string_lossy());
        let Some(captures) = self.regex.captures(&path) else {
            return false;
        };

        self.ranges.iter().enumerate().all(|(idx, &(lo, hi))| {
            match captures.get(idx + 1) {
                Some(m) => m
                    .as_str()
                    .parse::<i64>()
                    .is_ok_and(|n| lo <= n && n <= hi),
                None => true,
            }
        })
    }
}

fn normalize_separators(path: &str) -> String {
    if std::path::MAIN_SEPARATOR == '\\' {
        path.replace('\\', "/")
    } else {
        path.to_string()
    }
}

#[derive(Default)]
struct Translator {
    ranges: Vec<(i64, i64)>,
}

impl Translator {
    fn translate(&mut self, glob: &str) -> String {
        let chars: Vec<char> = glob.chars().collect();
        let mut out = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\\' if i + 1 < chars.len() => {
                    out.push_str(&escape_char(chars[i + 1]));
                    i += 2;
                    continue;
                }
                '/' if chars[i..].starts_with(&['/', '*', '*', '/']) => {
                    out.push_str("(?:/|/.*/)");
                    i += 4;
                    continue;
                }
                '*' if chars.get(i + 1) == Some(&'*') => {
                    out.push_str(".*");
                    i += 2;
                    continue;
                }
                '*' => out.push_str("[^/]*"),
                '?' => out.push_str("[^/]"),
                '[' => {
                    if let Some(end) = find_class_end(&chars, i) {
                        out.push_str(&class(&chars[i + 1..end]));
                        i = end + 1;
                        continue;
                    }
                    out.push_str(r"\[");
                }
                '{' => {
                    if let Some(end) = find_brace_end(&chars, i) {
                        let inner: String = chars[i + 1..end].iter().collect();
                        out.push_str(&self.braces(&inner));
                        i = end + 1;
                        continue;
                    }
                    out.push_str(r"\{");
                }
                other => out.push_str(&escape_char(other)),
            }
            i += 1;
        }

        out
    }

    fn braces(&mut self, inner: &str) -> String {
        if let Some((lo, hi)) = numeric_range(inner) {
            self.ranges.push((lo.min(hi), lo.max(hi)));
            return r"([+-]?\d+)".to_string();
        }

        let alternatives = split_top_level(inner);
        if alternatives.len() < 2 {
            return format!(r"\{{{}\}}", self.translate(inner));
        }

        let translated: Vec<String> = alternatives
            .iter()
            .map(|alt| self.translate(alt))
            .collect();
        format!("(?:{})", translated.join("|"))
    }
}

fn escape_char(c: char) -> String {
    regex::escape(c.encode_utf8(&mut [0; 4]))
}

fn class(content: &[char]) -> String {
    let (negated, content) = match content.first() {
        Some('!') => (true, &content[1..]),
        _ => (false, content),
    };

    let mut out = String::from(if negated { "[^/" } else { "[" });
    for (idx, &c) in content.iter().enumerate() {
        if c == '-' && idx > 0 && idx + 1 < content.len() {
            out.push('-');
        } else {
            out.push_str(&escape_char(c));
        }
    }
    out.push(']');
    out
}

fn find_class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if chars.get(i) == Some(&'!') {
        i += 1;
    }
    // A leading ']' belongs to the class.
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    while i < chars.len() {
        match chars[i] {
            ']' => return Some(i),
            '/' => return None,
            '\\' => i += 2,
            _ => i += 1,
        }
    }
    None
}

fn find_brace_end(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn split_top_level(inner: &str) -> Vec<String> {
    let mut parts = vec![];
    let mut current = String::new();
    let mut depth = 0;
    let mut escaped = false;

    for c in inner.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                current.push(c);
                escaped = true;
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

fn numeric_range(inner: &str) -> Option<(i64, i64)> {
    let (lo, hi) = inner.split_once("..")?;
    Some((lo.parse().ok()?, hi.parse().ok()?))
}
