// Hand-written recursive descent parser for PQL.
//
// Two error channels: malformed token streams abort with a syntax error;
// semantic violations (undeclared synonyms, bad attributes, ...) are
// accumulated into the query's error buffer and parsing continues, so a
// single pass reports everything a well-formed but meaningless query
// does wrong.
//
// Whitespace tokens are significant at a few points (no space between a
// relation name and `*`, none inside `prog_line` or `stmt#`, exactly one
// space inside `such that`), so the token stream arrives with whitespace
// retained and the parser skips it explicitly everywhere else.

use std::collections::HashMap;

use spa_error::{Result, SpaError};

use crate::expr::infix_to_postfix;
use crate::query::{AttrKind, Clause, ClauseKind, Query, QueryRef, RefKind};
use crate::token::{kw, sym, Token, TokenKind};

/// Return the number with leading zeros removed; "000" collapses to "0".
fn strip_leading_zeros(s: &str) -> String {
    let stripped = s.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_owned()
    } else {
        stripped.to_owned()
    }
}

/// Which clause keyword an `and` continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastClause {
    None,
    SuchThat,
    Pattern,
    With,
}

/// Parser over a PQL token stream. Consumes itself on
/// [`PqlParser::parse_query`].
pub struct PqlParser {
    tokens: Vec<Token>,
    pos: usize,
    declared: HashMap<String, RefKind>,
    semantic_errors: String,
}

impl PqlParser {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            declared: HashMap::new(),
            semantic_errors: String::new(),
        }
    }

    /// Parse a full query. Syntax errors abort; semantic errors end up
    /// in the returned query's buffer.
    pub fn parse_query(mut self) -> Result<Query> {
        let span = tracing::debug_span!(target: "spa.pql", "parse_query");
        let _guard = span.enter();

        let mut query = Query::default();

        self.skip_whitespace();
        while !self.peek()?.is_identifier(kw::SELECT) {
            self.parse_declaration()?;
        }

        self.eat(TokenKind::Identifier, kw::SELECT)?;
        self.parse_select_targets(&mut query)?;
        self.parse_clauses(&mut query)?;

        if !self.at_end() {
            return Err(SpaError::syntax(format!(
                "Unexpected token after end of query: {}",
                self.tokens[self.pos]
            )));
        }

        if !self.semantic_errors.is_empty() {
            tracing::debug!(
                target: "spa.pql",
                errors = %self.semantic_errors.trim_end(),
                "query parsed with semantic errors"
            );
        }
        query.semantic_errors = self.semantic_errors;
        Ok(query)
    }

    // -----------------------------------------------------------------------
    // Token stream helpers
    // -----------------------------------------------------------------------

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Result<&Token> {
        self.tokens
            .get(self.pos)
            .ok_or_else(|| SpaError::syntax("Unexpected end of query"))
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        self.pos += 1;
        tok
    }

    fn skip_whitespace(&mut self) {
        while self
            .tokens
            .get(self.pos)
            .is_some_and(|t| t.kind == TokenKind::Whitespace)
        {
            self.pos += 1;
        }
    }

    /// Consume a token matching `kind` and `text` exactly; do not skip
    /// trailing whitespace (for the whitespace-sensitive spots).
    fn eat_keep_ws(&mut self, kind: TokenKind, text: &str) -> Result<Token> {
        let front = self.peek()?;
        if !front.is(kind, text) {
            return Err(SpaError::syntax(format!(
                "Expected {text} but got {front}"
            )));
        }
        Ok(self.bump())
    }

    /// Consume a token matching `kind` and `text`, then skip whitespace.
    fn eat(&mut self, kind: TokenKind, text: &str) -> Result<Token> {
        let tok = self.eat_keep_ws(kind, text)?;
        self.skip_whitespace();
        Ok(tok)
    }

    /// Consume any token of `kind`; do not skip trailing whitespace.
    fn eat_kind_keep_ws(&mut self, kind: TokenKind) -> Result<Token> {
        let front = self.peek()?;
        if front.kind != kind {
            return Err(SpaError::syntax(format!(
                "Expected {kind:?} token but got {front}"
            )));
        }
        Ok(self.bump())
    }

    /// Consume any token of `kind`, then skip whitespace.
    fn eat_kind(&mut self, kind: TokenKind) -> Result<Token> {
        let tok = self.eat_kind_keep_ws(kind)?;
        self.skip_whitespace();
        Ok(tok)
    }

    // -----------------------------------------------------------------------
    // Semantic bookkeeping
    // -----------------------------------------------------------------------

    fn add_semantic_error(&mut self, msg: impl AsRef<str>) {
        self.semantic_errors.push_str(msg.as_ref());
        self.semantic_errors.push('\n');
    }

    /// The declared kind of a synonym, reporting an undeclared use.
    fn synonym_kind(&mut self, name: &str) -> RefKind {
        if let Some(&kind) = self.declared.get(name) {
            kind
        } else {
            self.add_semantic_error(format!("Undeclared synonym: {name}"));
            RefKind::Undefined
        }
    }

    /// The declared kind of a synonym without reporting anything; used
    /// where a later production will do the reporting.
    fn synonym_kind_quiet(&self, name: &str) -> RefKind {
        self.declared
            .get(name)
            .copied()
            .unwrap_or(RefKind::Undefined)
    }

    // -----------------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------------

    // declaration : design-entity synonym (',' synonym)* ';'
    fn parse_declaration(&mut self) -> Result<()> {
        let entity = self.eat_kind_keep_ws(TokenKind::Identifier)?;
        let kind = match entity.text.as_str() {
            kw::STMT => RefKind::Stmt,
            kw::READ => RefKind::Read,
            kw::PRINT => RefKind::Print,
            kw::CALL => RefKind::Call,
            kw::WHILE => RefKind::While,
            kw::IF => RefKind::If,
            kw::ASSIGN => RefKind::Assign,
            kw::VARIABLE => RefKind::Variable,
            kw::CONSTANT => RefKind::Constant,
            kw::PROCEDURE => RefKind::Procedure,
            // prog_line is three tokens with no whitespace between them.
            kw::PROG => {
                self.eat_keep_ws(TokenKind::Delimiter, sym::UNDERSCORE)?;
                self.eat_keep_ws(TokenKind::Identifier, kw::LINE)?;
                RefKind::ProgLine
            }
            _ => {
                return Err(SpaError::syntax(format!(
                    "Invalid design entity: {entity}"
                )));
            }
        };
        self.skip_whitespace();

        self.parse_declaration_synonym(kind)?;
        while !self.peek()?.is_delimiter(sym::SEMICOLON) {
            self.eat(TokenKind::Delimiter, sym::COMMA)?;
            self.parse_declaration_synonym(kind)?;
        }
        self.eat(TokenKind::Delimiter, sym::SEMICOLON)?;
        Ok(())
    }

    fn parse_declaration_synonym(&mut self, kind: RefKind) -> Result<()> {
        let syn = self.eat_kind(TokenKind::Identifier)?;
        if syn.text == kw::BOOLEAN {
            self.add_semantic_error("A synonym cannot be named BOOLEAN");
            return Ok(());
        }
        if self.declared.contains_key(&syn.text) {
            self.add_semantic_error(format!("Duplicate synonym declaration: {}", syn.text));
            return Ok(());
        }
        self.declared.insert(syn.text, kind);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Select targets
    // -----------------------------------------------------------------------

    // target : 'BOOLEAN' | attrOrSyn | '<' attrOrSyn (',' attrOrSyn)* '>'
    fn parse_select_targets(&mut self, query: &mut Query) -> Result<()> {
        let front = self.peek()?.clone();
        if front.is_identifier(kw::BOOLEAN) {
            self.eat(TokenKind::Identifier, kw::BOOLEAN)?;
            query.boolean = true;
        } else if front.is_operator(sym::LT) {
            self.eat(TokenKind::Operator, sym::LT)?;
            self.parse_select_target(query)?;
            while self.peek()?.is_delimiter(sym::COMMA) {
                self.eat(TokenKind::Delimiter, sym::COMMA)?;
                self.parse_select_target(query)?;
            }
            self.eat(TokenKind::Operator, sym::GT)?;
        } else {
            self.parse_select_target(query)?;
        }
        Ok(())
    }

    fn parse_select_target(&mut self, query: &mut Query) -> Result<()> {
        let syn = self.eat_kind(TokenKind::Identifier)?;
        let kind = self.synonym_kind(&syn.text);
        let attr = if !self.at_end() && self.peek()?.is_delimiter(sym::DOT) {
            self.parse_attr_name(kind, &syn.text)?
        } else {
            AttrKind::None
        };
        query.targets.push(QueryRef::attr_ref(kind, syn.text, attr));
        Ok(())
    }

    /// Parse `.attrName` (the dot is still in the stream), validate it
    /// against the synonym's kind.
    fn parse_attr_name(&mut self, kind: RefKind, syn_name: &str) -> Result<AttrKind> {
        self.eat(TokenKind::Delimiter, sym::DOT)?;
        let name = self.eat_kind_keep_ws(TokenKind::Identifier)?;
        let attr = match name.text.as_str() {
            kw::PROC_NAME => AttrKind::ProcName,
            kw::VAR_NAME => AttrKind::VarName,
            kw::VALUE => AttrKind::Value,
            // `stmt#` has no whitespace before the hash.
            kw::STMT => {
                self.eat_keep_ws(TokenKind::Delimiter, sym::HASH)?;
                AttrKind::StmtNum
            }
            _ => {
                return Err(SpaError::syntax(format!(
                    "Invalid attribute name: {name}"
                )));
            }
        };
        self.skip_whitespace();

        if kind != RefKind::Undefined && !attr.valid_for(kind) {
            self.add_semantic_error(format!(
                "Attribute {} is not valid for synonym {syn_name}",
                name.text
            ));
        }
        Ok(attr)
    }

    // -----------------------------------------------------------------------
    // Clauses
    // -----------------------------------------------------------------------

    fn parse_clauses(&mut self, query: &mut Query) -> Result<()> {
        let mut last = LastClause::None;
        while !self.at_end() {
            let front = self.peek()?.clone();
            if front.is_identifier(kw::SUCH) {
                // 'such that' admits exactly one space.
                self.eat_keep_ws(TokenKind::Identifier, kw::SUCH)?;
                self.eat_keep_ws(TokenKind::Whitespace, sym::SPACE)?;
                self.eat(TokenKind::Identifier, kw::THAT)?;
                self.parse_such_that(query)?;
                last = LastClause::SuchThat;
            } else if front.is_identifier(kw::PATTERN) {
                self.eat(TokenKind::Identifier, kw::PATTERN)?;
                self.parse_pattern(query)?;
                last = LastClause::Pattern;
            } else if front.is_identifier(kw::WITH) {
                self.eat(TokenKind::Identifier, kw::WITH)?;
                self.parse_with(query)?;
                last = LastClause::With;
            } else if front.is_identifier(kw::AND) {
                self.eat(TokenKind::Identifier, kw::AND)?;
                match last {
                    LastClause::SuchThat => self.parse_such_that(query)?,
                    LastClause::Pattern => self.parse_pattern(query)?,
                    LastClause::With => self.parse_with(query)?,
                    LastClause::None => {
                        return Err(SpaError::syntax(
                            "Expected such that/pattern/with before and",
                        ));
                    }
                }
            } else {
                break; // Trailing garbage is caught by parse_query.
            }
        }
        Ok(())
    }

    // relClause : name ('*')? '(' ref ',' ref ')'
    fn parse_such_that(&mut self, query: &mut Query) -> Result<()> {
        let rel = self.eat_kind_keep_ws(TokenKind::Identifier)?;

        // A `*` must follow the relation name with no space between.
        let mut transitive = false;
        if !self.at_end() && self.peek()?.is_operator(sym::STAR) {
            let can_be_transitive = matches!(
                rel.text.as_str(),
                kw::FOLLOWS | kw::PARENT | kw::CALLS | kw::NEXT | kw::AFFECTS
                    | kw::NEXT_BIP | kw::AFFECTS_BIP
            );
            if !can_be_transitive {
                return Err(SpaError::syntax(format!(
                    "Relation {} has no transitive form",
                    rel.text
                )));
            }
            self.eat_keep_ws(TokenKind::Operator, sym::STAR)?;
            transitive = true;
        }
        self.skip_whitespace();

        let clause = match rel.text.as_str() {
            kw::FOLLOWS => self.parse_stmt_stmt_args(if transitive {
                ClauseKind::FollowsT
            } else {
                ClauseKind::Follows
            })?,
            kw::PARENT => self.parse_stmt_stmt_args(if transitive {
                ClauseKind::ParentT
            } else {
                ClauseKind::Parent
            })?,
            kw::NEXT => self.parse_stmt_stmt_args(if transitive {
                ClauseKind::NextT
            } else {
                ClauseKind::Next
            })?,
            kw::AFFECTS => self.parse_stmt_stmt_args(if transitive {
                ClauseKind::AffectsT
            } else {
                ClauseKind::Affects
            })?,
            kw::NEXT_BIP => self.parse_stmt_stmt_args(if transitive {
                ClauseKind::NextBipT
            } else {
                ClauseKind::NextBip
            })?,
            kw::AFFECTS_BIP => self.parse_stmt_stmt_args(if transitive {
                ClauseKind::AffectsBipT
            } else {
                ClauseKind::AffectsBip
            })?,
            kw::CALLS => self.parse_proc_proc_args(if transitive {
                ClauseKind::CallsT
            } else {
                ClauseKind::Calls
            })?,
            kw::USES => self.parse_uses_modifies(ClauseKind::UsesP, ClauseKind::UsesS)?,
            kw::MODIFIES => {
                self.parse_uses_modifies(ClauseKind::ModifiesP, ClauseKind::ModifiesS)?
            }
            _ => {
                return Err(SpaError::syntax(format!(
                    "Invalid relation: {}",
                    rel.text
                )));
            }
        };
        query.clauses.push(clause);
        Ok(())
    }

    fn parse_stmt_stmt_args(&mut self, kind: ClauseKind) -> Result<Clause> {
        self.eat(TokenKind::Delimiter, sym::LPAREN)?;
        let lhs = self.parse_stmt_ref()?;
        self.eat(TokenKind::Delimiter, sym::COMMA)?;
        let rhs = self.parse_stmt_ref()?;
        self.eat(TokenKind::Delimiter, sym::RPAREN)?;
        Ok(Clause::new(kind, vec![lhs, rhs]))
    }

    fn parse_proc_proc_args(&mut self, kind: ClauseKind) -> Result<Clause> {
        self.eat(TokenKind::Delimiter, sym::LPAREN)?;
        let lhs = self.parse_ent_ref(RefKind::Procedure)?;
        self.eat(TokenKind::Delimiter, sym::COMMA)?;
        let rhs = self.parse_ent_ref(RefKind::Procedure)?;
        self.eat(TokenKind::Delimiter, sym::RPAREN)?;
        Ok(Clause::new(kind, vec![lhs, rhs]))
    }

    /// `Uses` and `Modifies` pick their statement or procedure form from
    /// the shape of the first argument.
    fn parse_uses_modifies(
        &mut self,
        proc_kind: ClauseKind,
        stmt_kind: ClauseKind,
    ) -> Result<Clause> {
        self.eat(TokenKind::Delimiter, sym::LPAREN)?;
        let front = self.peek()?.clone();

        let (kind, lhs) = if front.is_delimiter(sym::UNDERSCORE) {
            self.eat(TokenKind::Delimiter, sym::UNDERSCORE)?;
            self.add_semantic_error(
                "Wildcard is not allowed as the first argument of Uses/Modifies",
            );
            (proc_kind, QueryRef::wildcard())
        } else if front.kind == TokenKind::Number {
            (stmt_kind, self.parse_stmt_ref()?)
        } else if front.is_delimiter(sym::QUOTE) {
            (proc_kind, self.parse_ent_ref(RefKind::Procedure)?)
        } else if front.kind == TokenKind::Identifier {
            if self.synonym_kind_quiet(&front.text).is_stmt_kind() {
                (stmt_kind, self.parse_stmt_ref()?)
            } else {
                (proc_kind, self.parse_ent_ref(RefKind::Procedure)?)
            }
        } else {
            return Err(SpaError::syntax(format!(
                "Expected a statement or entity reference but got {front}"
            )));
        };

        self.eat(TokenKind::Delimiter, sym::COMMA)?;
        let rhs = self.parse_ent_ref(RefKind::Variable)?;
        self.eat(TokenKind::Delimiter, sym::RPAREN)?;
        Ok(Clause::new(kind, vec![lhs, rhs]))
    }

    // stmtRef : synonym | '_' | INTEGER
    fn parse_stmt_ref(&mut self) -> Result<QueryRef> {
        let front = self.peek()?.clone();
        match front.kind {
            TokenKind::Identifier => {
                self.eat_kind(TokenKind::Identifier)?;
                let kind = self.synonym_kind(&front.text);
                if kind != RefKind::Undefined && !kind.is_stmt_kind() {
                    self.add_semantic_error(format!(
                        "Synonym {} is not a statement reference",
                        front.text
                    ));
                }
                Ok(QueryRef::synonym(kind, front.text))
            }
            TokenKind::Delimiter if front.text == sym::UNDERSCORE => {
                self.eat(TokenKind::Delimiter, sym::UNDERSCORE)?;
                Ok(QueryRef::wildcard())
            }
            TokenKind::Number => {
                self.eat_kind(TokenKind::Number)?;
                let canonical = strip_leading_zeros(&front.text);
                if canonical == "0" {
                    self.add_semantic_error("Statement number 0 is invalid");
                }
                Ok(QueryRef::number(canonical))
            }
            _ => Err(SpaError::syntax(format!(
                "Expected a statement reference but got {front}"
            ))),
        }
    }

    // entRef : synonym | '_' | '"' IDENT '"'
    fn parse_ent_ref(&mut self, expected: RefKind) -> Result<QueryRef> {
        let front = self.peek()?.clone();
        match front.kind {
            TokenKind::Identifier => {
                self.eat_kind(TokenKind::Identifier)?;
                let kind = self.synonym_kind(&front.text);
                if kind != RefKind::Undefined && kind != expected {
                    self.add_semantic_error(format!(
                        "Synonym {} is not a valid entity reference here",
                        front.text
                    ));
                }
                Ok(QueryRef::synonym(kind, front.text))
            }
            TokenKind::Delimiter if front.text == sym::UNDERSCORE => {
                self.eat(TokenKind::Delimiter, sym::UNDERSCORE)?;
                Ok(QueryRef::wildcard())
            }
            TokenKind::Delimiter if front.text == sym::QUOTE => {
                self.eat(TokenKind::Delimiter, sym::QUOTE)?;
                let name = self.eat_kind(TokenKind::Identifier)?;
                self.eat(TokenKind::Delimiter, sym::QUOTE)?;
                Ok(QueryRef::name(name.text))
            }
            _ => Err(SpaError::syntax(format!(
                "Expected an entity reference but got {front}"
            ))),
        }
    }

    // -----------------------------------------------------------------------
    // Pattern clauses
    // -----------------------------------------------------------------------

    fn parse_pattern(&mut self, query: &mut Query) -> Result<()> {
        let syn = self.eat_kind(TokenKind::Identifier)?;
        let kind = self.synonym_kind(&syn.text);

        let clause = match kind {
            RefKind::Assign => self.parse_pattern_assign(&syn.text)?,
            RefKind::While => self.parse_pattern_while(&syn.text)?,
            RefKind::If => self.parse_pattern_if(&syn.text)?,
            _ => {
                self.add_semantic_error(format!(
                    "Synonym {} cannot start a pattern clause",
                    syn.text
                ));
                self.parse_pattern_invalid(kind, &syn.text)?
            }
        };
        query.clauses.push(clause);
        Ok(())
    }

    // assign : syn-assign '(' entRef ',' expression-spec ')'
    fn parse_pattern_assign(&mut self, syn_name: &str) -> Result<Clause> {
        self.eat(TokenKind::Delimiter, sym::LPAREN)?;
        let ent = self.parse_ent_ref(RefKind::Variable)?;
        self.eat(TokenKind::Delimiter, sym::COMMA)?;
        let expr = self.parse_expr_spec()?;
        self.eat(TokenKind::Delimiter, sym::RPAREN)?;
        Ok(Clause::new(
            ClauseKind::PatternAssign,
            vec![QueryRef::synonym(RefKind::Assign, syn_name), ent, expr],
        ))
    }

    // while : syn-while '(' entRef ',' '_' ')'
    fn parse_pattern_while(&mut self, syn_name: &str) -> Result<Clause> {
        self.eat(TokenKind::Delimiter, sym::LPAREN)?;
        let ent = self.parse_ent_ref(RefKind::Variable)?;
        self.eat(TokenKind::Delimiter, sym::COMMA)?;
        self.eat(TokenKind::Delimiter, sym::UNDERSCORE)?;
        self.eat(TokenKind::Delimiter, sym::RPAREN)?;
        Ok(Clause::new(
            ClauseKind::PatternWhile,
            vec![QueryRef::synonym(RefKind::While, syn_name), ent],
        ))
    }

    // if : syn-if '(' entRef ',' '_' ',' '_' ')'
    fn parse_pattern_if(&mut self, syn_name: &str) -> Result<Clause> {
        self.eat(TokenKind::Delimiter, sym::LPAREN)?;
        let ent = self.parse_ent_ref(RefKind::Variable)?;
        self.eat(TokenKind::Delimiter, sym::COMMA)?;
        self.eat(TokenKind::Delimiter, sym::UNDERSCORE)?;
        self.eat(TokenKind::Delimiter, sym::COMMA)?;
        self.eat(TokenKind::Delimiter, sym::UNDERSCORE)?;
        self.eat(TokenKind::Delimiter, sym::RPAREN)?;
        Ok(Clause::new(
            ClauseKind::PatternIf,
            vec![QueryRef::synonym(RefKind::If, syn_name), ent],
        ))
    }

    /// A pattern on a synonym of the wrong kind is a semantic error, but
    /// the body must still be consumed gracefully so parsing can go on.
    /// Both the two-argument (assign-shaped) and three-argument
    /// (if-shaped) tails are accepted.
    fn parse_pattern_invalid(&mut self, kind: RefKind, syn_name: &str) -> Result<Clause> {
        self.eat(TokenKind::Delimiter, sym::LPAREN)?;
        let ent = self.parse_ent_ref(RefKind::Variable)?;
        self.eat(TokenKind::Delimiter, sym::COMMA)?;
        let expr = self.parse_expr_spec()?;

        if self.peek()?.is_delimiter(sym::RPAREN) {
            self.eat(TokenKind::Delimiter, sym::RPAREN)?;
            return Ok(Clause::new(
                ClauseKind::PatternAssign,
                vec![QueryRef::synonym(kind, syn_name), ent, expr],
            ));
        }

        self.eat(TokenKind::Delimiter, sym::COMMA)?;
        self.eat(TokenKind::Delimiter, sym::UNDERSCORE)?;
        self.eat(TokenKind::Delimiter, sym::RPAREN)?;
        if !expr.is_wildcard() {
            return Err(SpaError::syntax(format!(
                "Expected _ but got {}",
                expr.text
            )));
        }
        Ok(Clause::new(
            ClauseKind::PatternIf,
            vec![QueryRef::synonym(kind, syn_name), ent],
        ))
    }

    // expression-spec : '_' | '"' expr '"' | '_' '"' expr '"' '_'
    fn parse_expr_spec(&mut self) -> Result<QueryRef> {
        let front = self.peek()?.clone();
        if front.is_delimiter(sym::QUOTE) {
            return self.parse_expression(true);
        }

        self.eat(TokenKind::Delimiter, sym::UNDERSCORE)?;
        if !self.at_end() && self.peek()?.is_delimiter(sym::QUOTE) {
            let expr = self.parse_expression(false)?;
            self.eat_keep_ws(TokenKind::Delimiter, sym::UNDERSCORE)?;
            self.skip_whitespace();
            Ok(expr)
        } else {
            Ok(QueryRef::wildcard())
        }
    }

    /// Parse a quoted infix expression into its canonical postfix form.
    fn parse_expression(&mut self, exact: bool) -> Result<QueryRef> {
        self.eat(TokenKind::Delimiter, sym::QUOTE)?;

        let mut infix: Vec<Token> = Vec::new();
        while !self.peek()?.is_delimiter(sym::QUOTE) {
            let mut tok = self.bump();
            if tok.kind == TokenKind::Number {
                tok.text = strip_leading_zeros(&tok.text);
            }
            infix.push(tok);
            self.skip_whitespace();
        }
        self.eat(TokenKind::Delimiter, sym::QUOTE)?;

        let postfix = infix_to_postfix(&infix)?;
        Ok(if exact {
            QueryRef::expression(postfix)
        } else {
            QueryRef::sub_expression(postfix)
        })
    }

    // -----------------------------------------------------------------------
    // With clauses
    // -----------------------------------------------------------------------

    // withClause : ref '=' ref
    fn parse_with(&mut self, query: &mut Query) -> Result<()> {
        let lhs = self.parse_with_ref()?;
        self.eat(TokenKind::Operator, sym::EQUALS)?;
        let rhs = self.parse_with_ref()?;

        if lhs.is_number_valued() != rhs.is_number_valued() {
            self.add_semantic_error("With clause compares a name with a number");
        }
        query
            .clauses
            .push(Clause::new(ClauseKind::With, vec![lhs, rhs]));
        Ok(())
    }

    // ref : '"' IDENT '"' | INTEGER | prog_line synonym | attrRef
    fn parse_with_ref(&mut self) -> Result<QueryRef> {
        let front = self.peek()?.clone();
        match front.kind {
            TokenKind::Delimiter if front.text == sym::QUOTE => {
                self.eat(TokenKind::Delimiter, sym::QUOTE)?;
                let name = self.eat_kind(TokenKind::Identifier)?;
                self.eat(TokenKind::Delimiter, sym::QUOTE)?;
                Ok(QueryRef::name(name.text))
            }
            TokenKind::Number => {
                self.eat_kind(TokenKind::Number)?;
                Ok(QueryRef::number(strip_leading_zeros(&front.text)))
            }
            TokenKind::Identifier => {
                self.eat_kind(TokenKind::Identifier)?;
                let kind = self.synonym_kind(&front.text);
                if kind == RefKind::ProgLine {
                    return Ok(QueryRef::synonym(kind, front.text));
                }
                if !self.peek()?.is_delimiter(sym::DOT) {
                    self.add_semantic_error(format!(
                        "Synonym {} must use an attribute in a with clause",
                        front.text
                    ));
                    return Ok(QueryRef::synonym(kind, front.text));
                }
                let attr = self.parse_attr_name(kind, &front.text)?;
                Ok(QueryRef::attr_ref(kind, front.text, attr))
            }
            _ => Err(SpaError::syntax(format!(
                "Expected a with-clause reference but got {front}"
            ))),
        }
    }
}
