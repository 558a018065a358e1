//! View kinds and their capability table

use std::fmt;

/// How a view passes child values back to its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transmit {
    /// Wrap children as reactive views
    Reactive,
    /// Wrap children as read-only views
    ReadOnly,
    /// Hand children back untouched
    Raw,
}

/// Static policy of a view kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Child-wrapping policy
    pub transmit: Transmit,
    /// Whether mutating traps write through
    pub can_mutate: bool,
    /// Whether views of this kind are proxies over a shadow target
    pub proxied: bool,
}

/// Kind of view a membrane can hand out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Deep, mutable
    Reactive,
    /// Deep, immutable
    ReadOnly,
    /// Top level only, mutable
    ShallowReactive,
    /// Top level only, immutable
    ShallowReadOnly,
    /// Single-value accessor object
    Ref,
}

impl ViewKind {
    /// Kinds backed by a proxy, in registry slot order
    pub const PROXIED: [ViewKind; 4] = [
        ViewKind::Reactive,
        ViewKind::ReadOnly,
        ViewKind::ShallowReactive,
        ViewKind::ShallowReadOnly,
    ];

    /// Capability table entry for this kind
    pub const fn capabilities(self) -> Capabilities {
        match self {
            ViewKind::Reactive => Capabilities {
                transmit: Transmit::Reactive,
                can_mutate: true,
                proxied: true,
            },
            ViewKind::ReadOnly => Capabilities {
                transmit: Transmit::ReadOnly,
                can_mutate: false,
                proxied: true,
            },
            ViewKind::ShallowReactive => Capabilities {
                transmit: Transmit::Raw,
                can_mutate: true,
                proxied: true,
            },
            ViewKind::ShallowReadOnly => Capabilities {
                transmit: Transmit::Raw,
                can_mutate: false,
                proxied: true,
            },
            ViewKind::Ref => Capabilities {
                transmit: Transmit::Raw,
                can_mutate: true,
                proxied: false,
            },
        }
    }

    /// Child-wrapping policy
    pub const fn transmit(self) -> Transmit {
        self.capabilities().transmit
    }

    /// Whether writes through the view reach the underlying value
    pub const fn is_mutable(self) -> bool {
        self.capabilities().can_mutate
    }

    /// Whether the view is a proxy
    pub const fn is_proxied(self) -> bool {
        self.capabilities().proxied
    }

    /// Whether children are handed back raw
    pub const fn is_shallow(self) -> bool {
        matches!(self, ViewKind::ShallowReactive | ViewKind::ShallowReadOnly)
    }

    /// Whether children are wrapped with the same policy
    pub const fn is_deep(self) -> bool {
        matches!(self, ViewKind::Reactive | ViewKind::ReadOnly)
    }

    /// Registry slot for proxied kinds
    pub(crate) const fn slot(self) -> Option<usize> {
        match self {
            ViewKind::Reactive => Some(0),
            ViewKind::ReadOnly => Some(1),
            ViewKind::ShallowReactive => Some(2),
            ViewKind::ShallowReadOnly => Some(3),
            ViewKind::Ref => None,
        }
    }

    /// Lowercase name used in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            ViewKind::Reactive => "reactive",
            ViewKind::ReadOnly => "readonly",
            ViewKind::ShallowReactive => "shallowReactive",
            ViewKind::ShallowReadOnly => "shallowReadonly",
            ViewKind::Ref => "ref",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
