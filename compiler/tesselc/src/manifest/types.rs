//! Type expressions in manifests.
//!
//! Grammar, loosely:
//!
//! ```text
//! type  := "void" | primitive | "(" list? ")" "->" type | type "[]"
//!        | name ("<" list ">")?
//! list  := type ("," type)*
//! ```
//!
//! Names resolve against the type variables in scope, then as qualified
//! names, then relative to the owner's package.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tessel_ir::{DeclId, MemorySymbolTable, Primitive, QualifiedName, SymbolTable, TypeRef};

use super::ManifestError;

/// Type variables visible from a declaration and its package.
#[derive(Debug)]
pub(super) struct TypeScope {
    vars: FxHashSet<Arc<str>>,
    package: QualifiedName,
}

impl TypeScope {
    /// Type parameters of `decl` and of every class enclosing it.
    pub(super) fn enclosing(host: &MemorySymbolTable, decl: DeclId) -> Self {
        let mut vars = FxHashSet::default();
        let mut current = Some(decl);
        while let Some(id) = current {
            vars.extend(host.type_params(id).into_iter().map(|p| p.name));
            current = host.enclosing(id);
        }
        TypeScope {
            vars,
            package: host.package_of(decl),
        }
    }

    fn has_var(&self, name: &str) -> bool {
        self.vars.contains(name)
    }
}

/// Parse `text` as a type used by `owner`.
pub(super) fn parse_type(
    host: &MemorySymbolTable,
    scope: &TypeScope,
    owner: &QualifiedName,
    text: &str,
) -> Result<TypeRef, ManifestError> {
    TypeParser { host, scope, owner, text }.parse(text)
}

struct TypeParser<'a> {
    host: &'a MemorySymbolTable,
    scope: &'a TypeScope,
    owner: &'a QualifiedName,
    /// Whole expression, for error messages.
    text: &'a str,
}

impl TypeParser<'_> {
    fn parse(&self, part: &str) -> Result<TypeRef, ManifestError> {
        let part = part.trim();
        if part.is_empty() {
            return Err(self.malformed());
        }
        if let Some(inner) = part.strip_prefix('(') {
            return self.function(inner);
        }
        if let Some(element) = part.strip_suffix("[]") {
            return Ok(TypeRef::array_of(self.parse(element)?));
        }
        if part == "void" {
            return Ok(TypeRef::Void);
        }
        if let Some(primitive) = Primitive::from_keyword(part) {
            return Ok(TypeRef::Primitive(primitive));
        }

        let (base, args) = match part.find('<') {
            Some(open) => {
                let inner = part[open + 1..]
                    .strip_suffix('>')
                    .ok_or_else(|| self.malformed())?;
                (part[..open].trim(), self.list(inner)?)
            }
            None => (part, Vec::new()),
        };
        if !is_name(base) {
            return Err(self.malformed());
        }
        if self.scope.has_var(base) {
            if !args.is_empty() {
                return Err(self.malformed());
            }
            return Ok(TypeRef::var(base));
        }
        let decl = self.lookup(base).ok_or_else(|| ManifestError::UnknownType {
            decl: self.owner.to_string(),
            ty: base.to_owned(),
        })?;
        Ok(TypeRef::declared(decl, self.host.name(decl)).with_args(args))
    }

    /// `inner` is everything after the opening parenthesis.
    fn function(&self, inner: &str) -> Result<TypeRef, ManifestError> {
        let close = matching_close(inner).ok_or_else(|| self.malformed())?;
        let ret = inner[close + 1..]
            .trim_start()
            .strip_prefix("->")
            .ok_or_else(|| self.malformed())?;
        Ok(TypeRef::Function {
            params: self.list(&inner[..close])?,
            ret: Box::new(self.parse(ret)?),
        })
    }

    fn list(&self, inner: &str) -> Result<Vec<TypeRef>, ManifestError> {
        if inner.trim().is_empty() {
            return Ok(Vec::new());
        }
        split_top_level(inner)
            .ok_or_else(|| self.malformed())?
            .into_iter()
            .map(|item| self.parse(item))
            .collect()
    }

    fn lookup(&self, name: &str) -> Option<DeclId> {
        self.host
            .find_type(&QualifiedName::new(name))
            .or_else(|| self.host.find_type(&self.scope.package.child(name)))
    }

    fn malformed(&self) -> ManifestError {
        ManifestError::MalformedType {
            decl: self.owner.to_string(),
            ty: self.text.to_owned(),
        }
    }
}

fn is_name(text: &str) -> bool {
    !text.is_empty()
        && text
            .split('.')
            .all(|segment| {
                let mut chars = segment.chars();
                chars
                    .next()
                    .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                    && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            })
}

/// Bracket depth change of the character at `i`. The `>` of `->` is not a
/// bracket.
fn depth_delta(bytes: &[u8], i: usize) -> i32 {
    match bytes[i] {
        b'<' | b'(' => 1,
        b'>' if i > 0 && bytes[i - 1] == b'-' => 0,
        b'>' | b')' => -1,
        _ => 0,
    }
}

/// Index of the `)` closing a group whose `(` was just consumed.
fn matching_close(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1;
    for (i, &byte) in bytes.iter().enumerate() {
        depth += depth_delta(bytes, i);
        if depth == 0 {
            return (byte == b')').then_some(i);
        }
    }
    None
}

/// Split at commas outside brackets. `None` when brackets do not balance.
fn split_top_level(text: &str) -> Option<Vec<&str>> {
    let bytes = text.as_bytes();
    let mut items = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        depth += depth_delta(bytes, i);
        if depth < 0 {
            return None;
        }
        if depth == 0 && byte == b',' {
            items.push(&text[start..i]);
            start = i + 1;
        }
    }
    if depth != 0 {
        return None;
    }
    items.push(&text[start..]);
    Some(items)
}
