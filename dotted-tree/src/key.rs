//! Canonical attribute keys

use std::borrow::{Borrow, Cow};
use std::fmt;

/// Canonical form of an attribute name
///
/// Every textual spelling of a name (`&str`, `String`, `Cow<str>`, `char`)
/// converts into the same `Key`, and `Key` borrows as `str`, so lookups by any
/// of them reach the same attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Key(String);

impl Key {
    /// View the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the owned name
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key(name.to_owned())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key(name.clone())
    }
}

impl From<Cow<'_, str>> for Key {
    fn from(name: Cow<'_, str>) -> Self {
        Key(name.into_owned())
    }
}

impl From<char> for Key {
    fn from(name: char) -> Self {
        Key(name.to_string())
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn textual_forms_normalize_to_one_key() {
        let owned = String::from("title");
        let keys = [
            Key::from("title"),
            Key::from(owned.clone()),
            Key::from(&owned),
            Key::from(Cow::Borrowed("title")),
        ];
        assert!(keys.iter().all(|k| *k == keys[0]));
    }

    #[test]
    fn key_lookups_borrow_as_str() {
        let mut map = HashMap::new();
        map.insert(Key::from("name.ngrams"), 1);
        assert_eq!(map.get("name.ngrams"), Some(&1));
    }

    #[test]
    fn into_string_returns_the_name() {
        assert_eq!(Key::from('x').into_string(), "x");
        assert_eq!(String::from(Key::from("title")), "title");
    }
}
