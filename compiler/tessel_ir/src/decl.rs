//! Declaration handles and the small value types hosts hand back.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::TypeRef;

/// Opaque handle to a host declaration.
///
/// Only meaningful for the `SymbolTable` that produced it.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct DeclId(u32);

impl DeclId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        DeclId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

/// What kind of construct a declaration is.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    /// Package-level declaration carrying package annotations.
    Package,
    Class,
    Interface,
    Enum,
    Field,
    Method,
    Constructor,
}

impl DeclKind {
    /// Class, interface or enum.
    pub fn is_type(self) -> bool {
        matches!(self, DeclKind::Class | DeclKind::Interface | DeclKind::Enum)
    }
}

/// How a type declaration is nested in its parent.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NestingKind {
    TopLevel,
    Member,
    Local,
}

impl NestingKind {
    pub fn is_nested(self) -> bool {
        !matches!(self, NestingKind::TopLevel)
    }
}

/// A method or constructor parameter.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Arc<str>,
    pub ty: TypeRef,
}

impl Param {
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Param {
            name: Arc::from(name),
            ty,
        }
    }
}

/// Parameter lists are short; four inline slots cover nearly every setter
/// and constructor.
pub type Params = SmallVec<[Param; 4]>;

/// A declared type parameter and its upper bounds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeParam {
    pub name: Arc<str>,
    pub bounds: Vec<TypeRef>,
}

/// Position of a declaration in its source file, for diagnostics.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct SourceLocation {
    pub file: Arc<str>,
    /// 1-based line.
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: &str, line: u32) -> Self {
        SourceLocation {
            file: Arc::from(file),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
