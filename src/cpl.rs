//! Name/value option lists
//!
//! [`CslStringList`] carries `KEY=VALUE` options to functions such as
//! [`Feature::dump_readable`](crate::vector::Feature::dump_readable) and
//! [`ShapeLayer::create`](crate::vector::ShapeLayer::create).

use std::fmt::{Debug, Formatter};

use crate::config::test_bool;
use crate::errors::{OgrError, Result};

/// An ordered list of `name=value` strings. Name lookups are case insensitive.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CslStringList {
    list: Vec<(String, String)>,
}

impl CslStringList {
    /// Creates an empty string list.
    pub fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Assigns `value` to `name`.
    ///
    /// Overwrites duplicate `name`s.
    ///
    /// Returns `Ok<()>` on success, `Err<OgrError>` if `name` has non alphanumeric
    /// characters, or `value` has newline characters.
    pub fn set_name_value(&mut self, name: &str, value: &str) -> Result<()> {
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(OgrError::BadArgument(format!(
                "Invalid characters in name: '{name}'"
            )));
        }
        if value.contains(|c| c == '\n' || c == '\r') {
            return Err(OgrError::BadArgument(format!(
                "Invalid characters in value: '{value}'"
            )));
        }

        match self
            .list
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.list.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Looks up the value corresponding to `key`.
    pub fn fetch_name_value(&self, key: &str) -> Option<&str> {
        self.list
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Looks up `key` and interprets it as a boolean, returning `default` when absent.
    pub fn fetch_bool(&self, key: &str, default: bool) -> bool {
        self.fetch_name_value(key).map_or(default, test_bool)
    }

    /// Determine the number of entries in the list.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Determine if the list has any values
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Get an iterator over the name/value elements of the list.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.list.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Debug for CslStringList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (k, v) in self.iter() {
            f.write_fmt(format_args!("{k}={v}\n"))?;
        }
        Ok(())
    }
}

/// Convenience shorthand for specifying an empty `CslStringList` to functions accepting
/// `Into<CslStringList>`.
impl From<()> for CslStringList {
    fn from(_: ()) -> Self {
        CslStringList::default()
    }
}

/// Creates a [`CslStringList`] from a slice of _key_/_value_ tuples.
impl<const N: usize> From<&[(&str, &str); N]> for CslStringList {
    fn from(pairs: &[(&str, &str); N]) -> Self {
        let mut result = Self::default();
        for (k, v) in pairs {
            result.set_name_value(k, v).expect("valid key/value pair");
        }
        result
    }
}
