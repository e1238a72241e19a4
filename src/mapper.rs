//! Conversion between declarative properties and editor options.

use std::fmt;
use std::num::NonZeroU32;

use serde::de::{Deserializer, Error as _};
use serde::Deserialize;

use crate::properties::{IndentStyle, ResolvedProperties};

/// Width used when the editor's tab size is `auto`.
pub const DEFAULT_INDENT_WIDTH: NonZeroU32 = match NonZeroU32::new(4) {
    Some(width) => width,
    None => unreachable!(),
};

/// The option surface applied to an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub insert_spaces: bool,
    pub tab_size: NonZeroU32,
}

impl EditorOptions {
    pub fn new(insert_spaces: bool, tab_size: NonZeroU32) -> Self {
        Self {
            insert_spaces,
            tab_size,
        }
    }
}

impl fmt::Display for EditorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.insert_spaces { "Spaces" } else { "Tabs" };
        write!(f, "{mode}: {}", self.tab_size)
    }
}

/// An editor setting that is either explicit or left to auto-detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configured<T> {
    Auto,
    Explicit(T),
}

impl<T> From<T> for Configured<T> {
    fn from(value: T) -> Self {
        Configured::Explicit(value)
    }
}

impl<T: fmt::Display> fmt::Display for Configured<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Configured::Auto => f.write_str("auto"),
            Configured::Explicit(value) => value.fmt(f),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Configured<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Explicit(T),
            Keyword(String),
        }

        match Repr::<T>::deserialize(deserializer)? {
            Repr::Explicit(value) => Ok(Configured::Explicit(value)),
            Repr::Keyword(word) if word.eq_ignore_ascii_case("auto") => Ok(Configured::Auto),
            Repr::Keyword(word) => Err(D::Error::custom(format!(
                "expected \"auto\" or an explicit value, found \"{word}\""
            ))),
        }
    }
}

/// The editor's own configured indentation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorDefaults {
    pub insert_spaces: Configured<bool>,
    pub tab_size: Configured<NonZeroU32>,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            insert_spaces: Configured::Explicit(true),
            tab_size: Configured::Explicit(DEFAULT_INDENT_WIDTH),
        }
    }
}

impl EditorDefaults {
    /// Concrete options for a new editor. `auto` style means tabs.
    pub fn to_options(self) -> EditorOptions {
        EditorOptions {
            insert_spaces: self.insert_spaces == Configured::Explicit(true),
            tab_size: resolve_size(self.tab_size),
        }
    }
}

impl From<EditorOptions> for EditorDefaults {
    fn from(options: EditorOptions) -> Self {
        Self {
            insert_spaces: options.insert_spaces.into(),
            tab_size: options.tab_size.into(),
        }
    }
}

/// Indentation properties as written to an `.editorconfig` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclarativeIndent {
    pub indent_style: IndentStyle,
    pub indent_size: Option<NonZeroU32>,
    pub tab_width: Option<NonZeroU32>,
}

impl From<DeclarativeIndent> for ResolvedProperties {
    fn from(indent: DeclarativeIndent) -> Self {
        Self {
            indent_style: Some(indent.indent_style),
            indent_size: indent.indent_size,
            tab_width: indent.tab_width,
            ..Default::default()
        }
    }
}

/// Apply resolved properties on top of the editor's defaults.
///
/// `tab_width` wins over `indent_size`; both describe the same visual width
/// and `tab_width` is the more specific key.
pub fn from_declarative(props: &ResolvedProperties, defaults: EditorOptions) -> EditorOptions {
    let insert_spaces = props
        .indent_style
        .map_or(defaults.insert_spaces, |style| style != IndentStyle::Tab);
    let tab_size = props
        .tab_width
        .or(props.indent_size)
        .unwrap_or(defaults.tab_size);

    EditorOptions {
        insert_spaces,
        tab_size,
    }
}

/// Describe editor defaults as declarative properties. Never fails.
pub fn to_declarative(defaults: EditorDefaults) -> DeclarativeIndent {
    let width = resolve_size(defaults.tab_size);
    match defaults.insert_spaces {
        Configured::Explicit(true) => DeclarativeIndent {
            indent_style: IndentStyle::Space,
            indent_size: Some(width),
            tab_width: None,
        },
        Configured::Explicit(false) | Configured::Auto => DeclarativeIndent {
            indent_style: IndentStyle::Tab,
            indent_size: None,
            tab_width: Some(width),
        },
    }
}

pub fn resolve_size(tab_size: Configured<NonZeroU32>) -> NonZeroU32 {
    match tab_size {
        Configured::Explicit(width) => width,
        Configured::Auto => DEFAULT_INDENT_WIDTH,
    }
}
