//! Property keys and symbols
//!
//! A property key is either a string or a symbol. Symbols are unique: two
//! symbols created with the same description never compare equal.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// Unique symbol value
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Option<Rc<str>>,
}

impl Symbol {
    /// Create a fresh symbol without a description
    pub fn new() -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: None,
        }
    }

    /// Create a fresh symbol with a description
    pub fn with_description(description: &str) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: Some(Rc::from(description)),
        }
    }

    /// Get the symbol's unique id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the symbol's description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "Symbol({})", desc),
            None => write!(f, "Symbol()"),
        }
    }
}

/// Property key: a string or a symbol
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// String key
    String(Rc<str>),
    /// Symbol key
    Symbol(Symbol),
}

impl PropertyKey {
    /// Check if this is a symbol key
    pub fn is_symbol(&self) -> bool {
        matches!(self, PropertyKey::Symbol(_))
    }

    /// Check if this is a string key
    pub fn is_string(&self) -> bool {
        matches!(self, PropertyKey::String(_))
    }

    /// Get the string contents if this is a string key
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyKey::String(s) => Some(s),
            PropertyKey::Symbol(_) => None,
        }
    }

    /// Get the array index this key denotes, if any
    ///
    /// Only canonical decimal forms count: `"0"`, `"17"`, but not `"017"` or
    /// `"4294967295"` (the largest index is 2^32 - 2).
    pub fn array_index(&self) -> Option<u32> {
        let s = self.as_str()?;
        if s.is_empty() || (s.len() > 1 && s.starts_with('0')) {
            return None;
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match s.parse::<u32>() {
            Ok(n) if n != u32::MAX => Some(n),
            _ => None,
        }
    }
}

impl fmt::Debug for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{:?}", s),
            PropertyKey::Symbol(sym) => write!(f, "{}", sym),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{}", s),
            PropertyKey::Symbol(sym) => write!(f, "{}", sym),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::String(Rc::from(s))
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::String(Rc::from(s))
    }
}

impl From<&String> for PropertyKey {
    fn from(s: &String) -> Self {
        PropertyKey::String(Rc::from(s.as_str()))
    }
}

impl From<Symbol> for PropertyKey {
    fn from(sym: Symbol) -> Self {
        PropertyKey::Symbol(sym)
    }
}

impl From<&Symbol> for PropertyKey {
    fn from(sym: &Symbol) -> Self {
        PropertyKey::Symbol(sym.clone())
    }
}

impl From<u32> for PropertyKey {
    fn from(index: u32) -> Self {
        PropertyKey::String(Rc::from(index.to_string()))
    }
}

impl From<usize> for PropertyKey {
    fn from(index: usize) -> Self {
        PropertyKey::String(Rc::from(index.to_string()))
    }
}

impl From<&PropertyKey> for PropertyKey {
    fn from(key: &PropertyKey) -> Self {
        key.clone()
    }
}
