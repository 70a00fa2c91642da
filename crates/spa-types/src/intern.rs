// Entity interner.
//
// Every distinct string (variable, procedure, constant, postfix
// expression) and every statement number is assigned a dense integer
// reference. All relational tables store references, never strings, so
// joins compare plain integers.

use std::collections::HashMap;
use std::fmt;

/// Dense integer reference to an interned entity or statement number.
///
/// References are handed out from a single counter, so the entity and
/// statement namespaces can never collide even though both are plain
/// integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct IntRef(u32);

impl IntRef {
    /// Dummy reference for sentinel rows that exist only to mark a table
    /// as non-empty. Never deinterned.
    pub(crate) const ZERO: Self = Self(0);

    /// Get the raw u32 value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for IntRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a reference points at.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Interned {
    Entity(String),
    Stmt(u32),
}

/// Two bidirectional maps over one dense reference range.
///
/// The interner is write-once-then-read-many: the upstream extractor
/// interns everything while building the knowledge base, and evaluation
/// uses only the read-only lookups.
#[derive(Debug, Default, Clone)]
pub struct Interner {
    by_entity: HashMap<String, IntRef>,
    by_stmt: HashMap<u32, IntRef>,
    values: Vec<Interned>,
}

impl Interner {
    /// Create an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_ref(&self) -> IntRef {
        IntRef(u32::try_from(self.values.len()).expect("interner overflow"))
    }

    /// Intern an entity string, creating a reference on first sight.
    pub fn entity_ref(&mut self, entity: &str) -> IntRef {
        if let Some(&r) = self.by_entity.get(entity) {
            return r;
        }
        let r = self.next_ref();
        self.by_entity.insert(entity.to_owned(), r);
        self.values.push(Interned::Entity(entity.to_owned()));
        r
    }

    /// Intern a statement number, creating a reference on first sight.
    ///
    /// Statement references are monotonic as long as statements are
    /// interned in source order, which the extractor guarantees.
    pub fn stmt_ref(&mut self, stmt_no: u32) -> IntRef {
        if let Some(&r) = self.by_stmt.get(&stmt_no) {
            return r;
        }
        let r = self.next_ref();
        self.by_stmt.insert(stmt_no, r);
        self.values.push(Interned::Stmt(stmt_no));
        r
    }

    /// Look up an entity reference without interning.
    #[must_use]
    pub fn lookup_entity(&self, entity: &str) -> Option<IntRef> {
        self.by_entity.get(entity).copied()
    }

    /// Look up a statement reference without interning.
    #[must_use]
    pub fn lookup_stmt(&self, stmt_no: u32) -> Option<IntRef> {
        self.by_stmt.get(&stmt_no).copied()
    }

    /// The entity string behind a reference.
    ///
    /// # Panics
    /// Panics if the reference is unknown or points at a statement
    /// number; such a call is a bug in the caller.
    #[must_use]
    pub fn entity(&self, r: IntRef) -> &str {
        match self.values.get(r.0 as usize) {
            Some(Interned::Entity(s)) => s,
            Some(Interned::Stmt(n)) => {
                panic!("reference {r} is statement {n}, not an entity")
            }
            None => panic!("unknown reference {r}"),
        }
    }

    /// The statement number behind a reference.
    ///
    /// # Panics
    /// Panics if the reference is unknown or points at an entity.
    #[must_use]
    pub fn stmt_num(&self, r: IntRef) -> u32 {
        match self.values.get(r.0 as usize) {
            Some(Interned::Stmt(n)) => *n,
            Some(Interned::Entity(s)) => {
                panic!("reference {r} is entity {s:?}, not a statement")
            }
            None => panic!("unknown reference {r}"),
        }
    }

    /// Whether the reference points at a statement number.
    #[must_use]
    pub fn is_stmt_ref(&self, r: IntRef) -> bool {
        matches!(self.values.get(r.0 as usize), Some(Interned::Stmt(_)))
    }

    /// Whether the reference points at an entity string.
    #[must_use]
    pub fn is_entity_ref(&self, r: IntRef) -> bool {
        matches!(self.values.get(r.0 as usize), Some(Interned::Entity(_)))
    }

    /// User-visible text for a reference from either namespace. This is
    /// what result projection prints.
    ///
    /// # Panics
    /// Panics on an unknown reference.
    #[must_use]
    pub fn display(&self, r: IntRef) -> String {
        match self.values.get(r.0 as usize) {
            Some(Interned::Entity(s)) => s.clone(),
            Some(Interned::Stmt(n)) => n.to_string(),
            None => panic!("unknown reference {r}"),
        }
    }

    /// Number of references handed out so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
