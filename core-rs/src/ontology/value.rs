//! URI and term values bound to the ontology that resolved them
//!
//! Both behave like strings: equality, ordering and hashing use the text
//! only, so `so.lookup("promoter")? == "https://identifiers.org/SO:0000167"`
//! holds and values can key a `HashMap<String, _>` lookup via `Borrow<str>`.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use crate::errors::Result;
use crate::ontology::facade::Ontology;

/// String-like trait impls shared by [`Uri`] and [`Term`]
macro_rules! string_value {
    ($name:ident) => {
        impl<'a> $name<'a> {
            pub fn as_str(&self) -> &str {
                &self.value
            }

            pub fn ontology(&self) -> &'a Ontology {
                self.ontology
            }

            pub fn into_string(self) -> String {
                self.value
            }
        }

        impl Deref for $name<'_> {
            type Target = str;

            fn deref(&self) -> &str {
                &self.value
            }
        }

        impl AsRef<str> for $name<'_> {
            fn as_ref(&self) -> &str {
                &self.value
            }
        }

        impl Borrow<str> for $name<'_> {
            fn borrow(&self) -> &str {
                &self.value
            }
        }

        impl fmt::Display for $name<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.value)
            }
        }

        impl fmt::Debug for $name<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.value)
            }
        }

        impl PartialEq for $name<'_> {
            fn eq(&self, other: &Self) -> bool {
                self.value == other.value
            }
        }

        impl Eq for $name<'_> {}

        impl PartialOrd for $name<'_> {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name<'_> {
            fn cmp(&self, other: &Self) -> Ordering {
                self.value.cmp(&other.value)
            }
        }

        impl Hash for $name<'_> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.value.as_str().hash(state)
            }
        }

        impl PartialEq<str> for $name<'_> {
            fn eq(&self, other: &str) -> bool {
                self.value == other
            }
        }

        impl PartialEq<&str> for $name<'_> {
            fn eq(&self, other: &&str) -> bool {
                self.value == *other
            }
        }

        impl PartialEq<String> for $name<'_> {
            fn eq(&self, other: &String) -> bool {
                &self.value == other
            }
        }

        impl PartialEq<$name<'_>> for str {
            fn eq(&self, other: &$name<'_>) -> bool {
                self == other.value
            }
        }

        impl PartialEq<$name<'_>> for &str {
            fn eq(&self, other: &$name<'_>) -> bool {
                *self == other.value
            }
        }

        impl PartialEq<$name<'_>> for String {
            fn eq(&self, other: &$name<'_>) -> bool {
                *self == other.value
            }
        }

        impl From<$name<'_>> for String {
            fn from(value: $name<'_>) -> String {
                value.value
            }
        }
    };
}

/// A term identifier in the public URI convention
#[derive(Clone)]
pub struct Uri<'a> {
    value: String,
    ontology: &'a Ontology,
}

string_value!(Uri);

impl<'a> Uri<'a> {
    pub fn new(value: impl Into<String>, ontology: &'a Ontology) -> Self {
        Self {
            value: value.into(),
            ontology,
        }
    }

    /// Label of this URI
    pub fn term(&self) -> Result<Term<'a>> {
        self.ontology.term_for_uri(&self.value)
    }

    pub fn is_child_of(&self, parent: &str) -> Result<bool> {
        self.ontology.is_child_of(&self.value, parent)
    }

    pub fn is_parent_of(&self, child: &str) -> Result<bool> {
        self.ontology.is_parent_of(&self.value, child)
    }

    pub fn is_descendant_of(&self, ancestor: &str) -> Result<bool> {
        self.ontology.is_descendant_of(&self.value, ancestor)
    }

    pub fn is_ancestor_of(&self, descendant: &str) -> Result<bool> {
        self.ontology.is_ancestor_of(&self.value, descendant)
    }

    /// Alias of [`Uri::is_descendant_of`]
    pub fn is_subtype_of(&self, supertype: &str) -> Result<bool> {
        self.is_descendant_of(supertype)
    }

    /// Alias of [`Uri::is_ancestor_of`]
    pub fn is_supertype_of(&self, subtype: &str) -> Result<bool> {
        self.is_ancestor_of(subtype)
    }

    /// True for the same URI without asking any backend, otherwise a
    /// subtype test
    pub fn is_a(&self, other: &str) -> Result<bool> {
        if self.value == other {
            return Ok(true);
        }
        self.is_subtype_of(other)
    }

    pub fn is_instance(&self) -> Result<bool> {
        self.ontology.is_instance(&self.value)
    }

    pub fn get_instances(&self) -> Result<Vec<Uri<'a>>> {
        self.ontology.get_instances(&self.value)
    }

    pub fn get_parents(&self) -> Result<Vec<Uri<'a>>> {
        self.ontology.get_parents(&self.value)
    }

    pub fn get_children(&self) -> Result<Vec<Uri<'a>>> {
        self.ontology.get_children(&self.value)
    }

    pub fn get_ancestors(&self) -> Result<Vec<Uri<'a>>> {
        self.ontology.get_ancestors(&self.value)
    }

    pub fn get_descendants(&self) -> Result<Vec<Uri<'a>>> {
        self.ontology.get_descendants(&self.value)
    }
}

/// A human-readable label, tagged with the URI it was resolved from
#[derive(Clone)]
pub struct Term<'a> {
    value: String,
    native_uri: String,
    ontology: &'a Ontology,
}

string_value!(Term);

impl<'a> Term<'a> {
    pub fn new(value: impl Into<String>, native_uri: impl Into<String>, ontology: &'a Ontology) -> Self {
        Self {
            value: value.into(),
            native_uri: native_uri.into(),
            ontology,
        }
    }

    /// Source URI in the ontology's own namespace
    pub fn native_uri(&self) -> &str {
        &self.native_uri
    }

    /// Source URI in the public convention
    pub fn uri(&self) -> Uri<'a> {
        Uri::new(self.ontology.sanitizer().reverse_sanitize_uri(&self.native_uri), self.ontology)
    }

    pub fn is_instance(&self) -> Result<bool> {
        self.ontology.is_instance(&self.native_uri)
    }
}
