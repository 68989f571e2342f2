//! Semantic type references.
//!
//! A `TypeRef` is what a host reports for a field type, a parameter type or
//! a superclass. Declared types carry both the handle and the qualified name
//! so they can be printed and compared without a round trip to the host.

use std::fmt;
use std::sync::Arc;

use crate::{DeclId, QualifiedName};

/// Built-in value types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Primitive {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl Primitive {
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Bool => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Char => "char",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Primitive> {
        Some(match word {
            "boolean" | "bool" => Primitive::Bool,
            "byte" => Primitive::Byte,
            "short" => Primitive::Short,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "char" => Primitive::Char,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            _ => return None,
        })
    }
}

/// The semantic type of a value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeRef {
    Void,
    Primitive(Primitive),
    /// A class, interface or enum, possibly parameterized.
    Declared {
        decl: DeclId,
        name: QualifiedName,
        args: Vec<TypeRef>,
    },
    Array(Box<TypeRef>),
    /// A type variable such as `T`.
    Var(Arc<str>),
    Function {
        params: Vec<TypeRef>,
        ret: Box<TypeRef>,
    },
}

impl TypeRef {
    /// Declared type without type arguments.
    pub fn declared(decl: DeclId, name: QualifiedName) -> Self {
        TypeRef::Declared {
            decl,
            name,
            args: Vec::new(),
        }
    }

    /// Attach type arguments to a declared type. No-op for other types.
    #[must_use]
    pub fn with_args(self, new_args: Vec<TypeRef>) -> Self {
        match self {
            TypeRef::Declared { decl, name, .. } => TypeRef::Declared {
                decl,
                name,
                args: new_args,
            },
            other => other,
        }
    }

    pub fn var(name: &str) -> Self {
        TypeRef::Var(Arc::from(name))
    }

    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    /// Declaration handle for declared types.
    pub fn decl(&self) -> Option<DeclId> {
        match self {
            TypeRef::Declared { decl, .. } => Some(*decl),
            _ => None,
        }
    }

    /// Type arguments of a declared type; empty for every other type.
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Declared { args, .. } => args,
            _ => &[],
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => f.write_str("void"),
            TypeRef::Primitive(p) => f.write_str(p.keyword()),
            TypeRef::Declared { name, args, .. } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    write_list(f, args)?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeRef::Array(element) => write!(f, "{element}[]"),
            TypeRef::Var(name) => f.write_str(name),
            TypeRef::Function { params, ret } => {
                f.write_str("(")?;
                write_list(f, params)?;
                write!(f, ") -> {ret}")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[TypeRef]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}
