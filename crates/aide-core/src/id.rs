//! Interned identifiers for the page model.
//!
//! Element ids and class names are compared constantly while resolving drop
//! targets, so both are `Copy` keys into one process-wide interner. Strings
//! live for the rest of the process, which is why [`ElementId::as_str`] hands
//! out `&'static str`.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static NAMES: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Declares a `Copy` handle over [`NAMES`]. `sigil` prefixes the `Debug`
/// output the way the name is written in a selector.
macro_rules! interned_name {
    ($(#[$meta:meta])* $name:ident, $sigil:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// The handle for `s`, interning it on first use.
            pub fn intern(s: &str) -> Self {
                Self(NAMES.get_or_intern(s))
            }

            /// The handle for `s` if it was ever interned. Never grows the
            /// interner, so it suits lookups with arbitrary input.
            pub fn lookup(s: &str) -> Option<Self> {
                NAMES.get(s).map(Self)
            }

            pub fn as_str(&self) -> &'static str {
                let names: &'static ThreadedRodeo = &NAMES;
                names.resolve(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($sigil, "{}"), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

interned_name!(
    /// Value of an element's `id` attribute.
    ElementId,
    "#"
);

interned_name!(
    /// A CSS class name.
    ClassName,
    "."
);

impl ElementId {
    /// A fresh id of the form `{prefix}_{n}`, unique within the process.
    /// Used to tell several mounted assistants apart.
    pub fn with_prefix(prefix: &str) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self::intern(&format!("{prefix}_{}", NEXT.fetch_add(1, Ordering::Relaxed)))
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| Self::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_same_handle() {
        let a = ElementId::intern("revenue_chart");
        assert_eq!(a, ElementId::intern("revenue_chart"));
        assert_eq!(a.as_str(), "revenue_chart");
        assert_eq!(format!("{a:?}"), "#revenue_chart");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = ElementId::with_prefix("aide-button");
        let b = ElementId::with_prefix("aide-button");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("aide-button_"));
    }

    #[test]
    fn lookup_does_not_intern() {
        assert_eq!(ElementId::lookup("id-nobody-interned"), None);
        let class = ClassName::intern("list-item");
        assert_eq!(ClassName::lookup("list-item"), Some(class));
        assert_eq!(format!("{class:?}"), ".list-item");
    }

    #[test]
    fn resolved_names_outlive_the_handle() {
        let name: &'static str = {
            let id = ElementId::intern("short-lived");
            id.as_str()
        };
        assert_eq!(name, "short-lived");
    }
}
