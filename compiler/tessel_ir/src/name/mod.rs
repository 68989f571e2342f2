//! Qualified declaration names.
//!
//! Provides a cheaply clonable dotted name used as the identity key for
//! model descriptors and memo cache entries.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Dotted, fully qualified name of a declaration (`com.app.HeaderModel`).
///
/// Cloning is a reference count bump. Hashing and equality delegate to the
/// underlying `str`, so maps keyed by `QualifiedName` can be queried with a
/// plain `&str`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct QualifiedName(Arc<str>);

impl QualifiedName {
    /// The unnamed (default) package.
    pub fn root() -> Self {
        QualifiedName(Arc::from(""))
    }

    /// Create a name from a dotted string.
    pub fn new(name: impl AsRef<str>) -> Self {
        QualifiedName(Arc::from(name.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last dotted segment.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit_once('.').map_or(&*self.0, |(_, simple)| simple)
    }

    /// Everything before the last dotted segment, or the root name.
    pub fn parent(&self) -> QualifiedName {
        match self.0.rsplit_once('.') {
            Some((parent, _)) => QualifiedName::new(parent),
            None => QualifiedName::root(),
        }
    }

    /// Append a segment.
    pub fn child(&self, segment: &str) -> QualifiedName {
        if self.is_empty() {
            QualifiedName::new(segment)
        } else {
            QualifiedName::new(format!("{}.{segment}", self.0))
        }
    }

    /// Whether `self` equals `ancestor` or lies underneath it.
    ///
    /// The root name is an ancestor of everything.
    pub fn is_within(&self, ancestor: &QualifiedName) -> bool {
        if ancestor.is_empty() || self == ancestor {
            return true;
        }
        self.0
            .strip_prefix(&*ancestor.0)
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl Borrow<str> for QualifiedName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        QualifiedName::new(name)
    }
}

impl From<String> for QualifiedName {
    fn from(name: String) -> Self {
        QualifiedName(Arc::from(name))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({:?})", &*self.0)
    }
}
