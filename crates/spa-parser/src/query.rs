// Parsed query representation: what the evaluator consumes.

/// What a clause or target parameter refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    // Synonym kinds (design entities).
    Stmt,
    Read,
    Print,
    Call,
    While,
    If,
    Assign,
    Variable,
    Constant,
    Procedure,
    ProgLine,
    /// Synonym whose declaration is missing; recorded so parsing can
    /// continue after the semantic error.
    Undefined,

    // Literal parameter kinds.
    Wildcard,
    Name,
    Number,
    /// Exact-match pattern expression (canonical postfix text).
    Expression,
    /// Substring-match pattern expression (canonical postfix text).
    SubExpression,
}

impl RefKind {
    /// Whether this synonym kind denotes statements.
    #[must_use]
    pub const fn is_stmt_kind(self) -> bool {
        matches!(
            self,
            Self::Stmt
                | Self::Read
                | Self::Print
                | Self::Call
                | Self::While
                | Self::If
                | Self::Assign
                | Self::ProgLine
        )
    }

    /// Whether this is a synonym kind at all (as opposed to a literal).
    #[must_use]
    pub const fn is_synonym_kind(self) -> bool {
        !matches!(
            self,
            Self::Wildcard | Self::Name | Self::Number | Self::Expression | Self::SubExpression
        )
    }
}

/// Attribute selected from a synonym (`p.procName`, `s.stmt#`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    None,
    ProcName,
    VarName,
    Value,
    StmtNum,
}

impl AttrKind {
    /// Whether a synonym of `kind` carries this attribute.
    #[must_use]
    pub const fn valid_for(self, kind: RefKind) -> bool {
        match self {
            Self::None => true,
            Self::ProcName => matches!(kind, RefKind::Procedure | RefKind::Call),
            Self::VarName => matches!(kind, RefKind::Variable | RefKind::Read | RefKind::Print),
            Self::Value => matches!(kind, RefKind::Constant),
            Self::StmtNum => matches!(
                kind,
                RefKind::Stmt
                    | RefKind::Read
                    | RefKind::Print
                    | RefKind::Call
                    | RefKind::While
                    | RefKind::If
                    | RefKind::Assign
            ),
        }
    }
}

/// One parameter of a clause, or one select target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryRef {
    pub kind: RefKind,
    pub text: String,
    pub attr: AttrKind,
}

impl QueryRef {
    /// A synonym reference without an attribute.
    #[must_use]
    pub fn synonym(kind: RefKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            text: name.into(),
            attr: AttrKind::None,
        }
    }

    /// A synonym reference with an attribute.
    #[must_use]
    pub fn attr_ref(kind: RefKind, name: impl Into<String>, attr: AttrKind) -> Self {
        Self {
            kind,
            text: name.into(),
            attr,
        }
    }

    /// The `_` placeholder.
    #[must_use]
    pub fn wildcard() -> Self {
        Self {
            kind: RefKind::Wildcard,
            text: "_".to_owned(),
            attr: AttrKind::None,
        }
    }

    /// A quoted entity name.
    #[must_use]
    pub fn name(text: impl Into<String>) -> Self {
        Self {
            kind: RefKind::Name,
            text: text.into(),
            attr: AttrKind::None,
        }
    }

    /// A statement-number literal (canonical form, zeros stripped).
    #[must_use]
    pub fn number(text: impl Into<String>) -> Self {
        Self {
            kind: RefKind::Number,
            text: text.into(),
            attr: AttrKind::None,
        }
    }

    /// An exact-match pattern expression in canonical postfix form.
    #[must_use]
    pub fn expression(postfix: impl Into<String>) -> Self {
        Self {
            kind: RefKind::Expression,
            text: postfix.into(),
            attr: AttrKind::None,
        }
    }

    /// A substring-match pattern expression in canonical postfix form.
    #[must_use]
    pub fn sub_expression(postfix: impl Into<String>) -> Self {
        Self {
            kind: RefKind::SubExpression,
            text: postfix.into(),
            attr: AttrKind::None,
        }
    }

    #[must_use]
    pub fn is_synonym(&self) -> bool {
        self.kind.is_synonym_kind()
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.kind == RefKind::Wildcard
    }

    #[must_use]
    pub fn is_name(&self) -> bool {
        self.kind == RefKind::Name
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        self.kind == RefKind::Number
    }

    #[must_use]
    pub fn is_attr_ref(&self) -> bool {
        self.attr != AttrKind::None
    }

    /// Whether this `with`-clause side compares as a number (as opposed
    /// to a name).
    #[must_use]
    pub fn is_number_valued(&self) -> bool {
        self.is_number()
            || (self.kind == RefKind::ProgLine && self.attr == AttrKind::None)
            || matches!(self.attr, AttrKind::StmtNum | AttrKind::Value)
    }
}

/// Constraint kind. `Uses`/`Modifies` split into their statement and
/// procedure forms during parsing, once the first argument's shape is
/// known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Follows,
    FollowsT,
    Parent,
    ParentT,
    Calls,
    CallsT,
    Next,
    NextT,
    Affects,
    AffectsT,
    NextBip,
    NextBipT,
    AffectsBip,
    AffectsBipT,
    UsesS,
    UsesP,
    ModifiesS,
    ModifiesP,
    PatternAssign,
    PatternIf,
    PatternWhile,
    With,
}

/// One constraint of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub kind: ClauseKind,
    pub params: Vec<QueryRef>,
}

impl Clause {
    #[must_use]
    pub fn new(kind: ClauseKind, params: Vec<QueryRef>) -> Self {
        Self { kind, params }
    }

    /// The synonym names this clause constrains.
    #[must_use]
    pub fn synonyms(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.is_synonym())
            .map(|p| p.text.as_str())
            .collect()
    }
}

/// A parsed query: select targets, constraints, and any semantic errors
/// collected during parsing. A query with a non-empty error buffer
/// evaluates to the empty result (`FALSE` when boolean).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub targets: Vec<QueryRef>,
    pub clauses: Vec<Clause>,
    pub boolean: bool,
    pub semantic_errors: String,
}

impl Query {
    #[must_use]
    pub fn has_semantic_errors(&self) -> bool {
        !self.semantic_errors.is_empty()
    }
}
