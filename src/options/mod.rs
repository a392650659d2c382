//! Typed option cells and the option groups built from them.
//!
//! Every cell knows its own flag name and whether it has been set. An unset
//! cell contributes nothing to the argument vector; a set cell contributes one
//! fragment formatted the way the rendering executable expects:
//!
//! | kind    | fragment                                  |
//! |---------|-------------------------------------------|
//! | string  | `--flag value` (omitted when empty)       |
//! | uint    | `--flag 40`                               |
//! | float   | `--flag 0.750` (always three decimals)    |
//! | bool    | `--flag` (omitted when `false`)           |
//! | list    | `--flag a --flag b` (one pair per `set`)  |
//! | map     | `--flag key value` per entry              |

mod groups;

pub use groups::{
    GlobalOptions, HeaderFooterOptions, Orientation, OutlineOptions, PageOptions, PageSettings,
    PageSize, TocOptions,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix that marks a token as a flag.
pub const FLAG_PREFIX: &str = "--";

/// Formats a single value as argument tokens.
pub trait ArgValue {
    /// Append the tokens for `flag` carrying this value.
    fn push_args(&self, flag: &str, args: &mut Vec<String>);
}

impl ArgValue for String {
    fn push_args(&self, flag: &str, args: &mut Vec<String>) {
        if !self.is_empty() {
            args.push(flag_token(flag));
            args.push(self.clone());
        }
    }
}

impl ArgValue for u32 {
    fn push_args(&self, flag: &str, args: &mut Vec<String>) {
        args.push(flag_token(flag));
        args.push(self.to_string());
    }
}

impl ArgValue for f64 {
    fn push_args(&self, flag: &str, args: &mut Vec<String>) {
        args.push(flag_token(flag));
        args.push(format!("{:.3}", self));
    }
}

impl ArgValue for bool {
    fn push_args(&self, flag: &str, args: &mut Vec<String>) {
        if *self {
            args.push(flag_token(flag));
        }
    }
}

fn flag_token(flag: &str) -> String {
    format!("{}{}", FLAG_PREFIX, flag)
}

/// A single-valued option cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opt<T> {
    flag: String,
    value: Option<T>,
}

/// String option (`--title "Report"`).
pub type StringOption = Opt<String>;
/// Unsigned integer option (`--dpi 600`).
pub type UintOption = Opt<u32>;
/// Floating point option (`--zoom 0.750`).
pub type FloatOption = Opt<f64>;
/// Boolean switch (`--grayscale`).
pub type BoolOption = Opt<bool>;

impl<T> Opt<T> {
    /// Create an unset option for `flag` (without the leading `--`).
    pub fn new(flag: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: None,
        }
    }

    /// Flag name without prefix.
    pub fn flag(&self) -> &str {
        &self.flag
    }

    /// Clear the option.
    pub fn unset(&mut self) {
        self.value = None;
    }

    /// Whether a value has been stored.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// The stored value.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

impl Opt<String> {
    /// Store a value and mark the option set.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }
}

impl Opt<u32> {
    /// Store a value and mark the option set.
    pub fn set(&mut self, value: u32) {
        self.value = Some(value);
    }
}

impl Opt<f64> {
    /// Store a value and mark the option set.
    pub fn set(&mut self, value: f64) {
        self.value = Some(value);
    }
}

impl Opt<bool> {
    /// Store a value and mark the option set.
    ///
    /// `false` keeps the option set but contributes no argument.
    pub fn set(&mut self, value: bool) {
        self.value = Some(value);
    }
}

impl<T: ArgValue> Opt<T> {
    /// Argument fragment for this option.
    pub fn parse(&self) -> Vec<String> {
        let mut args = Vec::new();
        self.append_args(&mut args);
        args
    }

    pub(crate) fn append_args(&self, args: &mut Vec<String>) {
        if let Some(value) = &self.value {
            value.push_args(&self.flag, args);
        }
    }
}

/// Repeatable option; every `set` appends an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOption {
    flag: String,
    value: Vec<String>,
}

impl ListOption {
    /// Create an empty list option.
    pub fn new(flag: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: Vec::new(),
        }
    }

    /// Flag name without prefix.
    pub fn flag(&self) -> &str {
        &self.flag
    }

    /// Append an item.
    pub fn set(&mut self, item: impl Into<String>) {
        self.value.push(item.into());
    }

    /// Drop all items.
    pub fn unset(&mut self) {
        self.value.clear();
    }

    /// Whether any item has been added.
    pub fn is_set(&self) -> bool {
        !self.value.is_empty()
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[String] {
        &self.value
    }

    /// Argument fragment for this option.
    pub fn parse(&self) -> Vec<String> {
        let mut args = Vec::new();
        self.append_args(&mut args);
        args
    }

    pub(crate) fn append_args(&self, args: &mut Vec<String>) {
        for item in &self.value {
            args.push(flag_token(&self.flag));
            args.push(item.clone());
        }
    }
}

/// Repeatable key/value option.
///
/// Entries are kept sorted by key so the emitted fragment is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapOption {
    flag: String,
    value: BTreeMap<String, String>,
}

impl MapOption {
    /// Create an empty map option.
    pub fn new(flag: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: BTreeMap::new(),
        }
    }

    /// Flag name without prefix.
    pub fn flag(&self) -> &str {
        &self.flag
    }

    /// Insert or replace an entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.value.insert(key.into(), value.into());
    }

    /// Insert an entry only if `key` is not present yet.
    ///
    /// Returns `true` when the entry was inserted.
    pub fn set_if_absent(&mut self, key: &str, value: &str) -> bool {
        if self.value.contains_key(key) {
            return false;
        }
        self.value.insert(key.to_string(), value.to_string());
        true
    }

    /// Drop all entries.
    pub fn unset(&mut self) {
        self.value.clear();
    }

    /// Whether any entry is present.
    pub fn is_set(&self) -> bool {
        !self.value.is_empty()
    }

    /// Look up one entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.value.get(key).map(String::as_str)
    }

    /// Iterate entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.value.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Argument fragment for this option.
    pub fn parse(&self) -> Vec<String> {
        let mut args = Vec::new();
        self.append_args(&mut args);
        args
    }

    pub(crate) fn append_args(&self, args: &mut Vec<String>) {
        for (key, value) in &self.value {
            args.push(flag_token(&self.flag));
            args.push(key.clone());
            args.push(value.clone());
        }
    }
}

/// Declares an option group: the struct, its constructor and `args()`.
///
/// Fields are emitted in declaration order.
macro_rules! option_group {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident: $ty:ident = $flag:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        impl $name {
            /// Create the group with every option unset.
            pub fn new() -> Self {
                Self {
                    $( $field: $ty::new($flag), )*
                }
            }

            /// Argument fragment for every set option, in declaration order.
            pub fn args(&self) -> Vec<String> {
                let mut args = Vec::new();
                $( self.$field.append_args(&mut args); )*
                args
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

pub(crate) use option_group;
