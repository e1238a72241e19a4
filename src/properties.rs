//! Typed view of the properties an `.editorconfig` cascade resolves for one file.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;
use std::path::Path;

use crate::error::{Error, Result};

/// Name of the declarative config file.
pub const EDITORCONFIG_FILENAME: &str = ".editorconfig";

/// Loosely typed key/value pairs as returned by a parser (lowercase keys).
pub type RawProperties = BTreeMap<String, String>;

/// True if the file is literally named `.editorconfig`.
pub fn is_editorconfig_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name == EDITORCONFIG_FILENAME)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Tab,
    Space,
}

impl IndentStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            IndentStyle::Tab => "tab",
            IndentStyle::Space => "space",
        }
    }
}

impl fmt::Display for IndentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfLine {
    Lf,
    Crlf,
    Cr,
}

impl EndOfLine {
    pub fn as_str(self) -> &'static str {
        match self {
            EndOfLine::Lf => "lf",
            EndOfLine::Crlf => "crlf",
            EndOfLine::Cr => "cr",
        }
    }

    pub fn sequence(self) -> &'static str {
        match self {
            EndOfLine::Lf => "\n",
            EndOfLine::Crlf => "\r\n",
            EndOfLine::Cr => "\r",
        }
    }
}

impl fmt::Display for EndOfLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Properties resolved for a single path. `None` means unset and never
/// overrides a caller-supplied default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedProperties {
    pub indent_style: Option<IndentStyle>,
    pub indent_size: Option<NonZeroU32>,
    pub tab_width: Option<NonZeroU32>,
    pub end_of_line: Option<EndOfLine>,
    pub insert_final_newline: Option<bool>,
    pub trim_trailing_whitespace: Option<bool>,
    pub charset: Option<String>,
}

impl ResolvedProperties {
    /// Validate raw parser output.
    ///
    /// `indent_size = tab` is not a width and is dropped, so mapping falls
    /// back to `tab_width`. Any other width that is not a positive integer
    /// is rejected.
    pub fn from_raw(raw: &RawProperties) -> Result<Self> {
        let value = |key: &str| {
            raw.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.eq_ignore_ascii_case("unset"))
        };

        let indent_style = value("indent_style").and_then(|v| match v.to_ascii_lowercase().as_str() {
            "tab" => Some(IndentStyle::Tab),
            "space" => Some(IndentStyle::Space),
            _ => None,
        });

        let indent_size = match value("indent_size") {
            Some(v) if v.eq_ignore_ascii_case("tab") => None,
            Some(v) => Some(parse_width("indent_size", v)?),
            None => None,
        };

        let tab_width = value("tab_width")
            .map(|v| parse_width("tab_width", v))
            .transpose()?;

        let end_of_line = value("end_of_line").and_then(|v| match v.to_ascii_lowercase().as_str() {
            "lf" => Some(EndOfLine::Lf),
            "crlf" => Some(EndOfLine::Crlf),
            "cr" => Some(EndOfLine::Cr),
            _ => None,
        });

        Ok(Self {
            indent_style,
            indent_size,
            tab_width,
            end_of_line,
            insert_final_newline: value("insert_final_newline").and_then(parse_flag),
            trim_trailing_whitespace: value("trim_trailing_whitespace").and_then(parse_flag),
            charset: value("charset").map(|v| v.to_ascii_lowercase()),
        })
    }

    /// Newline sequence used when inserting a final newline.
    pub fn newline(&self) -> &'static str {
        self.end_of_line.map_or("\n", EndOfLine::sequence)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set properties as `(key, value)` pairs in `.editorconfig` spelling.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![];
        if let Some(style) = self.indent_style {
            entries.push(("indent_style", style.to_string()));
        }
        if let Some(size) = self.indent_size {
            entries.push(("indent_size", size.to_string()));
        }
        if let Some(width) = self.tab_width {
            entries.push(("tab_width", width.to_string()));
        }
        if let Some(eol) = self.end_of_line {
            entries.push(("end_of_line", eol.to_string()));
        }
        if let Some(flag) = self.insert_final_newline {
            entries.push(("insert_final_newline", flag.to_string()));
        }
        if let Some(flag) = self.trim_trailing_whitespace {
            entries.push(("trim_trailing_whitespace", flag.to_string()));
        }
        if let Some(charset) = &self.charset {
            entries.push(("charset", charset.clone()));
        }
        entries
    }
}

fn parse_width(key: &'static str, value: &str) -> Result<NonZeroU32> {
    value
        .parse::<NonZeroU32>()
        .map_err(|_| Error::InvalidResolvedSize {
            key,
            value: value.to_string(),
        })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
