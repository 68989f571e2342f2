//! Tessel IR - declarations, types and the host symbol table.
//!
//! This crate holds the vocabulary every other Tessel crate speaks:
//! - `QualifiedName` for declaration identity
//! - `Modifiers` and `Visibility` for access rules
//! - `DeclId`, `DeclKind` and `NestingKind` for host declaration handles
//! - `TypeRef` for the semantic type of attributes and parameters
//! - `Annotation` for the markers the processor reacts to
//! - `SymbolTable`, the read-only query interface of the host compiler
//!
//! # Design Philosophy
//!
//! The host compiler owns every declaration. Tessel only holds `DeclId`
//! handles and asks questions through `SymbolTable`; answers are owned
//! snapshots so callers never borrow host internals across threads.
//!
//! `MemorySymbolTable` is a complete in-memory host used by the CLI and by
//! tests. It models lazy completion the way a real compiler front end does.

mod annotation;
mod decl;
pub mod host;
mod modifiers;
mod name;
mod types;

pub use annotation::{
    Annotation, AnnotationKind, AttributeOptions, ModelClassOptions, PackageConfigOptions,
};
pub use decl::{DeclId, DeclKind, NestingKind, Param, Params, SourceLocation, TypeParam};
pub use host::{DeclBuilder, MemorySymbolTable, SymbolTable};
pub use modifiers::{Modifiers, Visibility};
pub use name::QualifiedName;
pub use types::{Primitive, TypeRef};
