// Query evaluation: turn a parsed query into relation fetches, filters,
// and natural joins over the PKB, then project the final table back to
// user-visible names.

use std::collections::{HashMap, HashSet};

use spa_parser::{AttrKind, Clause, ClauseKind, Query, QueryRef, RefKind};
use spa_pkb::Pkb;
use spa_types::{IntRef, Row, Table};

use crate::preprocessor::group_clauses;

/// Evaluate `query` against `pkb` and return the result list.
///
/// Boolean queries yield exactly `["TRUE"]` or `["FALSE"]`; other
/// queries yield the deduplicated, space-joined target tuples in
/// unspecified order. A query carrying semantic errors yields the empty
/// result without touching the store.
#[must_use]
pub fn evaluate(pkb: &Pkb, query: &Query) -> Vec<String> {
    Evaluator { pkb, query }.run()
}

/// Compare two canonical (zero-stripped) decimal strings numerically.
fn numeric_lt(a: &str, b: &str) -> bool {
    a.len() < b.len() || (a.len() == b.len() && a < b)
}

/// Whether this reference's value is reached through a stmt→attribute
/// map rather than being the synonym's own reference
/// (`call.procName`, `read.varName`, `print.varName`).
fn is_indirect_attr(param: &QueryRef) -> bool {
    matches!(
        (param.kind, param.attr),
        (RefKind::Call, AttrKind::ProcName)
            | (RefKind::Read | RefKind::Print, AttrKind::VarName)
    )
}

struct Evaluator<'a> {
    pkb: &'a Pkb,
    query: &'a Query,
}

impl Evaluator<'_> {
    fn run(&self) -> Vec<String> {
        let span = tracing::debug_span!(
            target: "spa.eval",
            "evaluate",
            clauses = self.query.clauses.len(),
            boolean = self.query.boolean,
        );
        let _guard = span.enter();

        if self.query.has_semantic_errors() {
            tracing::debug!(target: "spa.eval", "semantic errors present, answering empty");
            return self.extract_results(&Table::new(1));
        }
        if self.can_short_circuit() {
            tracing::debug!(target: "spa.eval", "short-circuit hit, answering empty");
            return self.extract_results(&Table::new(1));
        }
        let final_table = self.execute();
        self.extract_results(&final_table)
    }

    // -----------------------------------------------------------------------
    // Short-circuit scan
    // -----------------------------------------------------------------------

    /// Detect clauses that can never hold, before any table is fetched.
    fn can_short_circuit(&self) -> bool {
        for clause in &self.query.clauses {
            match clause.kind {
                ClauseKind::Follows
                | ClauseKind::FollowsT
                | ClauseKind::Parent
                | ClauseKind::ParentT => {
                    let lhs = &clause.params[0];
                    let rhs = &clause.params[1];
                    // A statement never follows or contains itself.
                    if !lhs.is_wildcard() && lhs == rhs {
                        return true;
                    }
                    // Both relations run strictly forward.
                    if lhs.is_number() && rhs.is_number() && numeric_lt(&rhs.text, &lhs.text) {
                        return true;
                    }
                    // Only container statements can be parents.
                    let is_parent =
                        matches!(clause.kind, ClauseKind::Parent | ClauseKind::ParentT);
                    if is_parent
                        && lhs.is_synonym()
                        && !matches!(
                            lhs.kind,
                            RefKind::Stmt | RefKind::While | RefKind::If | RefKind::ProgLine
                        )
                    {
                        return true;
                    }
                }
                // The extractor records no uses for read statements and
                // no modifies for print statements.
                ClauseKind::UsesS if clause.params[0].kind == RefKind::Read => return true,
                ClauseKind::ModifiesS if clause.params[0].kind == RefKind::Print => {
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    // -----------------------------------------------------------------------
    // Driver
    // -----------------------------------------------------------------------

    fn execute(&self) -> Table {
        let groups = group_clauses(&self.query.targets, &self.query.clauses);
        tracing::debug!(
            target: "spa.eval",
            no_synonym = groups.no_synonym.len(),
            detached_groups = groups.detached.len(),
            attached_groups = groups.attached.len(),
            "scheduled clause groups"
        );

        // Pure existence checks.
        for &idx in &groups.no_synonym {
            if self.execute_clause(&self.query.clauses[idx]).is_empty() {
                return Table::new(1);
            }
        }

        // Components disjoint from the targets only have to be
        // satisfiable.
        for group in &groups.detached {
            if self.join_group(group).is_empty() {
                return Table::new(1);
            }
        }

        // Components that constrain the targets build the result table.
        let mut final_table = Table::sentinel_true();
        for group in &groups.attached {
            let joined = self.join_group(group);
            if joined.is_empty() {
                return Table::new(1);
            }
            final_table.natural_join(&joined);
            if final_table.is_empty() {
                return Table::new(1);
            }
        }

        // Targets not constrained by any clause become their kind's
        // whole universe.
        for target in &self.query.targets {
            if final_table.column_index(&target.text).is_none() {
                let mut universe = self.universe_table(target.kind);
                universe.set_header([target.text.clone()]);
                final_table.natural_join(&universe);
            }
        }

        final_table
    }

    /// Evaluate one clause group, joining its clause tables together.
    /// Anonymous columns are dropped before joining; a clause whose
    /// columns are all anonymous acts as a bare existence check.
    fn join_group(&self, group: &[usize]) -> Table {
        let mut accumulator = Table::sentinel_true();
        for &idx in group {
            let mut table = self.execute_clause(&self.query.clauses[idx]);
            if table.is_empty() {
                return Table::new(1);
            }
            if table.header().iter().all(String::is_empty) {
                continue; // Non-empty, nothing to bind.
            }
            while table.drop_column_named("") {}
            accumulator.natural_join(&table);
            if accumulator.is_empty() {
                return Table::new(1);
            }
            tracing::trace!(
                target: "spa.eval",
                clause = idx,
                rows = accumulator.len(),
                "joined clause result"
            );
        }
        accumulator
    }

    // -----------------------------------------------------------------------
    // Per-clause evaluation
    // -----------------------------------------------------------------------

    fn execute_clause(&self, clause: &Clause) -> Table {
        match clause.kind {
            ClauseKind::Follows => self.such_that(self.pkb.get_follows_table(), clause),
            ClauseKind::FollowsT => self.such_that(self.pkb.get_follows_t_table(), clause),
            ClauseKind::Parent => self.such_that(self.pkb.get_parent_table(), clause),
            ClauseKind::ParentT => self.such_that(self.pkb.get_parent_t_table(), clause),
            ClauseKind::UsesS => self.such_that(self.pkb.get_uses_s_table(), clause),
            ClauseKind::UsesP => self.such_that(self.pkb.get_uses_p_table(), clause),
            ClauseKind::ModifiesS => self.such_that(self.pkb.get_modifies_s_table(), clause),
            ClauseKind::ModifiesP => self.such_that(self.pkb.get_modifies_p_table(), clause),
            ClauseKind::Calls => self.such_that(self.pkb.get_calls_table(), clause),
            ClauseKind::CallsT => self.such_that(self.pkb.get_calls_t_table(), clause),
            ClauseKind::Next => self.such_that(self.pkb.get_next_table(), clause),
            ClauseKind::NextT => self.such_that(self.pkb.get_next_t_table(), clause),
            ClauseKind::Affects => self.such_that(self.pkb.get_affects_table(), clause),
            ClauseKind::AffectsT => self.such_that(self.pkb.get_affects_t_table(), clause),
            ClauseKind::NextBip => self.such_that(self.pkb.get_next_bip_table(), clause),
            ClauseKind::NextBipT => self.such_that(self.pkb.get_next_bip_t_table(), clause),
            ClauseKind::AffectsBip => self.such_that(self.pkb.get_affects_bip_table(), clause),
            ClauseKind::AffectsBipT => {
                self.such_that(self.pkb.get_affects_bip_t_table(), clause)
            }
            ClauseKind::PatternAssign => {
                self.pattern_assign(self.pkb.get_pattern_assign_table(), clause)
            }
            ClauseKind::PatternIf => {
                self.pattern_cond(self.pkb.get_pattern_if_table(), clause)
            }
            ClauseKind::PatternWhile => {
                self.pattern_cond(self.pkb.get_pattern_while_table(), clause)
            }
            ClauseKind::With => self.with_clause(clause),
        }
    }

    /// Filter and label a binary relation table for one clause.
    fn such_that(&self, mut table: Table, clause: &Clause) -> Table {
        let lhs = &clause.params[0];
        let rhs = &clause.params[1];
        let mut header_lhs = String::new();
        let mut header_rhs = String::new();

        if !lhs.is_wildcard() {
            if lhs.is_synonym() {
                header_lhs.clone_from(&lhs.text);
                if !can_omit_lhs_filter(clause.kind, lhs.kind) {
                    table.filter_column(0, &self.universe_refs(lhs.kind));
                }
            } else {
                table.filter_column(0, &self.literal_refs(lhs));
            }
        }

        // Same synonym on both sides: keep only the diagonal.
        if lhs.is_synonym() && lhs == rhs {
            let mismatched: Vec<Row> = table
                .rows()
                .iter()
                .filter(|row| row[0] != row[1])
                .cloned()
                .collect();
            for row in &mismatched {
                table.delete_row(row);
            }
            table.set_header([header_lhs, String::new()]);
            return table;
        }

        if !rhs.is_wildcard() {
            if rhs.is_synonym() {
                header_rhs.clone_from(&rhs.text);
                if !can_omit_rhs_filter(clause.kind, rhs.kind) {
                    table.filter_column(1, &self.universe_refs(rhs.kind));
                }
            } else {
                table.filter_column(1, &self.literal_refs(rhs));
            }
        }

        table.set_header([header_lhs, header_rhs]);
        table
    }

    /// Filter and label the (stmt, lhsVar, rhsPostfix) pattern table.
    fn pattern_assign(&self, mut table: Table, clause: &Clause) -> Table {
        let syn = &clause.params[0];
        let ent = &clause.params[1];
        let expr = &clause.params[2];
        let mut header_ent = String::new();

        if ent.is_synonym() {
            header_ent.clone_from(&ent.text);
            table.filter_column(1, &self.universe_refs(ent.kind));
        } else if ent.is_name() {
            table.filter_column(1, &self.literal_refs(ent));
        }

        match expr.kind {
            RefKind::Expression => {
                table.filter_column(2, &self.literal_refs(expr));
            }
            RefKind::SubExpression => {
                let interner = self.pkb.interner();
                let mismatched: Vec<Row> = table
                    .rows()
                    .iter()
                    .filter(|row| !interner.entity(row[2]).contains(&expr.text))
                    .cloned()
                    .collect();
                for row in &mismatched {
                    table.delete_row(row);
                }
            }
            _ => {} // Wildcard: any right-hand side matches.
        }

        table.drop_column(2);
        table.set_header([syn.text.clone(), header_ent]);
        table
    }

    /// Filter and label the (stmt, controlVar) table of an if/while
    /// pattern.
    fn pattern_cond(&self, mut table: Table, clause: &Clause) -> Table {
        let syn = &clause.params[0];
        let ent = &clause.params[1];
        let mut header_ent = String::new();

        if ent.is_synonym() {
            header_ent.clone_from(&ent.text);
            table.filter_column(1, &self.universe_refs(ent.kind));
        } else if ent.is_name() {
            table.filter_column(1, &self.literal_refs(ent));
        }

        table.set_header([syn.text.clone(), header_ent]);
        table
    }

    // -----------------------------------------------------------------------
    // With clauses
    // -----------------------------------------------------------------------

    fn with_clause(&self, clause: &Clause) -> Table {
        let lhs = &clause.params[0];
        let rhs = &clause.params[1];

        // Literal against literal decides the whole clause.
        let lhs_literal = lhs.is_name() || lhs.is_number();
        let rhs_literal = rhs.is_name() || rhs.is_number();
        if lhs_literal && rhs_literal {
            return if lhs.text == rhs.text {
                Table::sentinel_true()
            } else {
                Table::new(1)
            };
        }

        if lhs_literal || rhs_literal {
            let (syn, literal) = if lhs_literal { (rhs, lhs) } else { (lhs, rhs) };
            return self.with_synonym_literal(syn, literal);
        }

        // Two synonym-valued sides. The same reference trivially equals
        // itself.
        if lhs == rhs {
            let mut table = self.universe_table(lhs.kind);
            table.set_header([lhs.text.clone()]);
            return table;
        }
        self.with_synonym_pair(lhs, rhs)
    }

    /// One side is a synonym reference, the other a literal.
    fn with_synonym_literal(&self, syn: &QueryRef, literal: &QueryRef) -> Table {
        let values = self.with_literal_refs(literal, syn);
        if is_indirect_attr(syn) {
            let mut table = self.attr_mapping_table(syn);
            table.filter_column(1, &values);
            table.set_header([syn.text.clone(), String::new()]);
            table
        } else {
            let mut table = self.universe_table(syn.kind);
            table.filter_column(0, &values);
            table.set_header([syn.text.clone()]);
            table
        }
    }

    /// Two synonym-valued sides, joined on their compared values. The
    /// join compares deinterned text because number-valued attributes
    /// may live in different interner namespaces (a constant's value is
    /// an entity, a statement number is not).
    fn with_synonym_pair(&self, lhs: &QueryRef, rhs: &QueryRef) -> Table {
        let (lhs_table, lhs_idx) = self.with_side_table(lhs);
        let (rhs_table, rhs_idx) = self.with_side_table(rhs);
        let interner = self.pkb.interner();

        let mut joined = Table::with_header(
            lhs_table
                .header()
                .iter()
                .chain(rhs_table.header().iter())
                .cloned()
                .collect::<Vec<_>>(),
        );
        let mut rhs_by_value: HashMap<String, Vec<&Row>> = HashMap::new();
        for row in rhs_table.rows() {
            rhs_by_value
                .entry(interner.display(row[rhs_idx]))
                .or_default()
                .push(row);
        }
        for left in lhs_table.rows() {
            let Some(matches) = rhs_by_value.get(&interner.display(left[lhs_idx])) else {
                continue;
            };
            for right in matches {
                let mut row = left.clone();
                row.extend(right.iter().copied());
                joined.insert_row(row);
            }
        }

        while joined.drop_column_named("") {}
        joined
    }

    /// The table and compared-column index for one synonym-valued
    /// `with` side.
    fn with_side_table(&self, param: &QueryRef) -> (Table, usize) {
        if is_indirect_attr(param) {
            let mut table = self.attr_mapping_table(param);
            table.set_header([param.text.clone(), String::new()]);
            (table, 1)
        } else {
            let mut table = self.universe_table(param.kind);
            table.set_header([param.text.clone()]);
            (table, 0)
        }
    }

    /// Resolve a `with` literal in the namespace the synonym side
    /// compares in: statement numbers for `stmt#`/`prog_line`, interned
    /// entities for everything else.
    fn with_literal_refs(&self, literal: &QueryRef, syn: &QueryRef) -> HashSet<IntRef> {
        let stmt_backed = syn.attr == AttrKind::StmtNum
            || (syn.kind == RefKind::ProgLine && syn.attr == AttrKind::None);
        let interner = self.pkb.interner();
        let found = if literal.is_number() && stmt_backed {
            literal
                .text
                .parse::<u32>()
                .ok()
                .and_then(|n| interner.lookup_stmt(n))
        } else {
            interner.lookup_entity(&literal.text)
        };
        found.into_iter().collect()
    }

    // -----------------------------------------------------------------------
    // PKB access helpers
    // -----------------------------------------------------------------------

    /// References matching a literal clause argument. Number literals
    /// in clause positions are statement numbers; names and expressions
    /// are interned entities. Unknown literals match nothing.
    fn literal_refs(&self, param: &QueryRef) -> HashSet<IntRef> {
        let interner = self.pkb.interner();
        let found = if param.is_number() {
            param
                .text
                .parse::<u32>()
                .ok()
                .and_then(|n| interner.lookup_stmt(n))
        } else {
            interner.lookup_entity(&param.text)
        };
        found.into_iter().collect()
    }

    /// The one-column universe table of a synonym kind.
    fn universe_table(&self, kind: RefKind) -> Table {
        match kind {
            RefKind::Stmt | RefKind::ProgLine => self.pkb.get_stmt_table(),
            RefKind::Read => self.pkb.get_read_table(),
            RefKind::Print => self.pkb.get_print_table(),
            RefKind::Call => self.pkb.get_call_table(),
            RefKind::While => self.pkb.get_while_table(),
            RefKind::If => self.pkb.get_if_table(),
            RefKind::Assign => self.pkb.get_assign_table(),
            RefKind::Variable => self.pkb.get_var_table(),
            RefKind::Constant => self.pkb.get_const_table(),
            RefKind::Procedure => self.pkb.get_proc_table(),
            _ => unreachable!("literal kinds have no universe table"),
        }
    }

    /// The reference set of a synonym kind.
    fn universe_refs(&self, kind: RefKind) -> HashSet<IntRef> {
        match kind {
            RefKind::Stmt | RefKind::ProgLine => self.pkb.get_stmt_int_refs(),
            RefKind::Read => self.pkb.get_read_int_refs(),
            RefKind::Print => self.pkb.get_print_int_refs(),
            RefKind::Call => self.pkb.get_call_int_refs(),
            RefKind::While => self.pkb.get_while_int_refs(),
            RefKind::If => self.pkb.get_if_int_refs(),
            RefKind::Assign => self.pkb.get_assign_int_refs(),
            RefKind::Variable => self.pkb.get_var_int_refs(),
            RefKind::Constant => self.pkb.get_const_int_refs(),
            RefKind::Procedure => self.pkb.get_proc_int_refs(),
            _ => unreachable!("literal kinds have no universe"),
        }
    }

    /// The stmt→attribute table for an indirected attribute reference.
    fn attr_mapping_table(&self, param: &QueryRef) -> Table {
        match param.kind {
            RefKind::Call => self.pkb.get_call_proc_table(),
            RefKind::Read => self.pkb.get_read_var_table(),
            RefKind::Print => self.pkb.get_print_var_table(),
            _ => unreachable!("only call/read/print attributes are indirected"),
        }
    }

    // -----------------------------------------------------------------------
    // Result projection
    // -----------------------------------------------------------------------

    /// Project the final table onto the select targets.
    fn extract_results(&self, final_table: &Table) -> Vec<String> {
        if self.query.boolean {
            return vec![if final_table.is_empty() {
                "FALSE".to_owned()
            } else {
                "TRUE".to_owned()
            }];
        }
        if final_table.is_empty() {
            return Vec::new();
        }

        let columns: Vec<usize> = self
            .query
            .targets
            .iter()
            .map(|t| {
                final_table
                    .column_index(&t.text)
                    .expect("every target is joined into the final table")
            })
            .collect();

        let mut seen: HashSet<String> = HashSet::new();
        let mut results = Vec::new();
        for row in final_table.rows() {
            let line = self
                .query
                .targets
                .iter()
                .zip(&columns)
                .map(|(target, &col)| self.format_target(target, row[col]))
                .collect::<Vec<_>>()
                .join(" ");
            if seen.insert(line.clone()) {
                results.push(line);
            }
        }
        results
    }

    /// Render one target value, indirecting through the stmt→attribute
    /// maps where the attribute demands it.
    fn format_target(&self, target: &QueryRef, value: IntRef) -> String {
        let interner = self.pkb.interner();
        if is_indirect_attr(target) {
            let mapped = match target.kind {
                RefKind::Call => self.pkb.call_proc_of(value),
                RefKind::Read => self.pkb.read_var_of(value),
                RefKind::Print => self.pkb.print_var_of(value),
                _ => unreachable!(),
            };
            let mapped = mapped.expect("attribute mapping exists for every statement of its kind");
            return interner.display(mapped);
        }
        interner.display(value)
    }
}

/// Whether the left column of this relation already ranges over exactly
/// the synonym kind's universe, making the type filter redundant.
fn can_omit_lhs_filter(clause: ClauseKind, kind: RefKind) -> bool {
    match clause {
        ClauseKind::Follows
        | ClauseKind::FollowsT
        | ClauseKind::Parent
        | ClauseKind::ParentT
        | ClauseKind::UsesS
        | ClauseKind::ModifiesS
        | ClauseKind::Next
        | ClauseKind::NextT => matches!(kind, RefKind::Stmt | RefKind::ProgLine),
        ClauseKind::Affects | ClauseKind::AffectsT => {
            matches!(kind, RefKind::Stmt | RefKind::ProgLine | RefKind::Assign)
        }
        ClauseKind::UsesP
        | ClauseKind::ModifiesP
        | ClauseKind::Calls
        | ClauseKind::CallsT => kind == RefKind::Procedure,
        _ => false,
    }
}

/// Right-column analogue of [`can_omit_lhs_filter`].
fn can_omit_rhs_filter(clause: ClauseKind, kind: RefKind) -> bool {
    match clause {
        ClauseKind::Follows
        | ClauseKind::FollowsT
        | ClauseKind::Parent
        | ClauseKind::ParentT
        | ClauseKind::Next
        | ClauseKind::NextT => matches!(kind, RefKind::Stmt | RefKind::ProgLine),
        ClauseKind::Affects | ClauseKind::AffectsT => {
            matches!(kind, RefKind::Stmt | RefKind::ProgLine | RefKind::Assign)
        }
        ClauseKind::UsesS
        | ClauseKind::ModifiesS
        | ClauseKind::UsesP
        | ClauseKind::ModifiesP => kind == RefKind::Variable,
        ClauseKind::Calls | ClauseKind::CallsT => kind == RefKind::Procedure,
        _ => false,
    }
}
