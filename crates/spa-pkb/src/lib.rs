//! Program Knowledge Base: the fixed-schema relational store produced by
//! static analysis of a SIMPLE program.
//!
//! The upstream source parser and design extractor populate the store
//! through the `add_*` writers before the first query; after that the PKB
//! is read-only. Getters hand out clones of the tables so the evaluator
//! can filter and join freely without touching the store.

mod cfg;

use std::collections::{HashMap, HashSet};

use spa_error::{Result, SpaError};
use spa_types::{IntRef, Interner, Table};

pub use cfg::CfgAdjacency;

/// The knowledge base. One instance per analyzed program.
#[derive(Debug, Clone)]
pub struct Pkb {
    interner: Interner,

    // Design entities, one column each.
    var_table: Table,
    proc_table: Table,
    const_table: Table,

    // Statement numbers partitioned by kind, one column each.
    stmt_table: Table,
    if_table: Table,
    while_table: Table,
    read_table: Table,
    print_table: Table,
    assign_table: Table,
    call_table: Table,

    // Binary design abstractions.
    follows_table: Table,
    follows_t_table: Table,
    parent_table: Table,
    parent_t_table: Table,
    uses_s_table: Table,
    uses_p_table: Table,
    modifies_s_table: Table,
    modifies_p_table: Table,
    calls_table: Table,
    calls_t_table: Table,
    next_table: Table,
    next_t_table: Table,
    affects_table: Table,
    affects_t_table: Table,
    next_bip_table: Table,
    next_bip_t_table: Table,
    affects_bip_table: Table,
    affects_bip_t_table: Table,

    // Statement -> attribute mappings.
    call_proc_table: Table,
    read_var_table: Table,
    print_var_table: Table,
    call_proc_map: HashMap<IntRef, IntRef>,
    read_var_map: HashMap<IntRef, IntRef>,
    print_var_map: HashMap<IntRef, IntRef>,

    // Pattern tables.
    pattern_assign_table: Table,
    pattern_if_table: Table,
    pattern_while_table: Table,

    // Auxiliary procedure maps.
    stmt_proc: HashMap<u32, IntRef>,
    proc_start: HashMap<IntRef, u32>,
    proc_end: HashMap<IntRef, Vec<u32>>,
    proc_range: HashMap<IntRef, (u32, u32)>,

    cfg: CfgAdjacency,
}

impl Default for Pkb {
    fn default() -> Self {
        Self::new()
    }
}

impl Pkb {
    /// An empty knowledge base with the full schema in place.
    #[must_use]
    pub fn new() -> Self {
        Self {
            var_table: Table::new(1),
            proc_table: Table::new(1),
            const_table: Table::new(1),
            stmt_table: Table::new(1),
            if_table: Table::new(1),
            while_table: Table::new(1),
            read_table: Table::new(1),
            print_table: Table::new(1),
            assign_table: Table::new(1),
            call_table: Table::new(1),
            follows_table: Table::new(2),
            follows_t_table: Table::new(2),
            parent_table: Table::new(2),
            parent_t_table: Table::new(2),
            uses_s_table: Table::new(2),
            uses_p_table: Table::new(2),
            modifies_s_table: Table::new(2),
            modifies_p_table: Table::new(2),
            calls_table: Table::new(2),
            calls_t_table: Table::new(2),
            next_table: Table::new(2),
            next_t_table: Table::new(2),
            affects_table: Table::new(2),
            affects_t_table: Table::new(2),
            next_bip_table: Table::new(2),
            next_bip_t_table: Table::new(2),
            affects_bip_table: Table::new(2),
            affects_bip_t_table: Table::new(2),
            call_proc_table: Table::new(2),
            read_var_table: Table::new(2),
            print_var_table: Table::new(2),
            pattern_assign_table: Table::new(3),
            pattern_if_table: Table::new(2),
            pattern_while_table: Table::new(2),
            interner: Interner::new(),
            call_proc_map: HashMap::new(),
            read_var_map: HashMap::new(),
            print_var_map: HashMap::new(),
            stmt_proc: HashMap::new(),
            proc_start: HashMap::new(),
            proc_end: HashMap::new(),
            proc_range: HashMap::new(),
            cfg: CfgAdjacency::new(),
        }
    }

    /// The interner behind the store. Evaluation uses only its read-only
    /// lookups.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    // -----------------------------------------------------------------------
    // Writers: design entities
    // -----------------------------------------------------------------------

    pub fn add_var(&mut self, name: &str) {
        let r = self.interner.entity_ref(name);
        self.var_table.insert_row(vec![r]);
    }

    pub fn add_proc(&mut self, name: &str) {
        let r = self.interner.entity_ref(name);
        self.proc_table.insert_row(vec![r]);
    }

    pub fn add_const(&mut self, value: &str) {
        let r = self.interner.entity_ref(value);
        self.const_table.insert_row(vec![r]);
    }

    // -----------------------------------------------------------------------
    // Writers: statements
    // -----------------------------------------------------------------------

    pub fn add_stmt(&mut self, stmt_no: u32) {
        let r = self.interner.stmt_ref(stmt_no);
        self.stmt_table.insert_row(vec![r]);
    }

    fn add_stmt_of_kind(&mut self, stmt_no: u32) -> IntRef {
        let r = self.interner.stmt_ref(stmt_no);
        self.stmt_table.insert_row(vec![r]);
        r
    }

    pub fn add_if(&mut self, stmt_no: u32) {
        let r = self.add_stmt_of_kind(stmt_no);
        self.if_table.insert_row(vec![r]);
    }

    pub fn add_while(&mut self, stmt_no: u32) {
        let r = self.add_stmt_of_kind(stmt_no);
        self.while_table.insert_row(vec![r]);
    }

    pub fn add_read(&mut self, stmt_no: u32) {
        let r = self.add_stmt_of_kind(stmt_no);
        self.read_table.insert_row(vec![r]);
    }

    pub fn add_print(&mut self, stmt_no: u32) {
        let r = self.add_stmt_of_kind(stmt_no);
        self.print_table.insert_row(vec![r]);
    }

    pub fn add_assign(&mut self, stmt_no: u32) {
        let r = self.add_stmt_of_kind(stmt_no);
        self.assign_table.insert_row(vec![r]);
    }

    pub fn add_call(&mut self, stmt_no: u32) {
        let r = self.add_stmt_of_kind(stmt_no);
        self.call_table.insert_row(vec![r]);
    }

    // -----------------------------------------------------------------------
    // Writers: ordered statement relations
    // -----------------------------------------------------------------------

    fn ordered_stmt_pair(&mut self, rel: &str, earlier: u32, later: u32) -> Result<(IntRef, IntRef)> {
        if earlier >= later {
            tracing::warn!(
                target: "spa.pkb",
                rel,
                earlier,
                later,
                "rejecting out-of-order statement pair"
            );
            return Err(SpaError::domain(format!(
                "{rel}({earlier}, {later}): first statement must precede second"
            )));
        }
        Ok((self.interner.stmt_ref(earlier), self.interner.stmt_ref(later)))
    }

    pub fn add_follows(&mut self, followed: u32, follower: u32) -> Result<()> {
        let (a, b) = self.ordered_stmt_pair("Follows", followed, follower)?;
        self.follows_table.insert_row(vec![a, b]);
        Ok(())
    }

    pub fn add_follows_t(&mut self, followed: u32, follower: u32) -> Result<()> {
        let (a, b) = self.ordered_stmt_pair("Follows*", followed, follower)?;
        self.follows_t_table.insert_row(vec![a, b]);
        Ok(())
    }

    pub fn add_parent(&mut self, container: u32, child: u32) -> Result<()> {
        let (a, b) = self.ordered_stmt_pair("Parent", container, child)?;
        self.parent_table.insert_row(vec![a, b]);
        Ok(())
    }

    pub fn add_parent_t(&mut self, container: u32, child: u32) -> Result<()> {
        let (a, b) = self.ordered_stmt_pair("Parent*", container, child)?;
        self.parent_t_table.insert_row(vec![a, b]);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Writers: uses / modifies
    // -----------------------------------------------------------------------

    /// Record that a statement uses a variable. The extractor never calls
    /// this for `read` statements; the evaluator's short-circuit relies
    /// on that.
    pub fn add_uses_s(&mut self, stmt_no: u32, var: &str) {
        let s = self.interner.stmt_ref(stmt_no);
        let v = self.interner.entity_ref(var);
        self.uses_s_table.insert_row(vec![s, v]);
    }

    /// Record that a statement modifies a variable. The extractor never
    /// calls this for `print` statements; the evaluator's short-circuit
    /// relies on that.
    pub fn add_modifies_s(&mut self, stmt_no: u32, var: &str) {
        let s = self.interner.stmt_ref(stmt_no);
        let v = self.interner.entity_ref(var);
        self.modifies_s_table.insert_row(vec![s, v]);
    }

    pub fn add_uses_p(&mut self, proc: &str, var: &str) {
        let p = self.interner.entity_ref(proc);
        let v = self.interner.entity_ref(var);
        self.uses_p_table.insert_row(vec![p, v]);
    }

    pub fn add_modifies_p(&mut self, proc: &str, var: &str) {
        let p = self.interner.entity_ref(proc);
        let v = self.interner.entity_ref(var);
        self.modifies_p_table.insert_row(vec![p, v]);
    }

    // -----------------------------------------------------------------------
    // Writers: calls / control flow / affects
    // -----------------------------------------------------------------------

    pub fn add_calls(&mut self, caller: &str, callee: &str) {
        let a = self.interner.entity_ref(caller);
        let b = self.interner.entity_ref(callee);
        self.calls_table.insert_row(vec![a, b]);
    }

    pub fn add_calls_t(&mut self, caller: &str, callee: &str) {
        let a = self.interner.entity_ref(caller);
        let b = self.interner.entity_ref(callee);
        self.calls_t_table.insert_row(vec![a, b]);
    }

    fn stmt_pair(&mut self, a: u32, b: u32) -> (IntRef, IntRef) {
        (self.interner.stmt_ref(a), self.interner.stmt_ref(b))
    }

    pub fn add_next(&mut self, from: u32, to: u32) {
        let (a, b) = self.stmt_pair(from, to);
        self.next_table.insert_row(vec![a, b]);
        self.cfg.insert(from, to);
    }

    pub fn add_next_t(&mut self, from: u32, to: u32) {
        let (a, b) = self.stmt_pair(from, to);
        self.next_t_table.insert_row(vec![a, b]);
    }

    pub fn add_affects(&mut self, assigner: u32, assignee: u32) {
        let (a, b) = self.stmt_pair(assigner, assignee);
        self.affects_table.insert_row(vec![a, b]);
    }

    pub fn add_affects_t(&mut self, assigner: u32, assignee: u32) {
        let (a, b) = self.stmt_pair(assigner, assignee);
        self.affects_t_table.insert_row(vec![a, b]);
    }

    pub fn add_next_bip(&mut self, from: u32, to: u32) {
        let (a, b) = self.stmt_pair(from, to);
        self.next_bip_table.insert_row(vec![a, b]);
    }

    pub fn add_next_bip_t(&mut self, from: u32, to: u32) {
        let (a, b) = self.stmt_pair(from, to);
        self.next_bip_t_table.insert_row(vec![a, b]);
    }

    pub fn add_affects_bip(&mut self, assigner: u32, assignee: u32) {
        let (a, b) = self.stmt_pair(assigner, assignee);
        self.affects_bip_table.insert_row(vec![a, b]);
    }

    pub fn add_affects_bip_t(&mut self, assigner: u32, assignee: u32) {
        let (a, b) = self.stmt_pair(assigner, assignee);
        self.affects_bip_t_table.insert_row(vec![a, b]);
    }

    // -----------------------------------------------------------------------
    // Writers: statement attributes and patterns
    // -----------------------------------------------------------------------

    pub fn add_call_proc(&mut self, stmt_no: u32, proc: &str) {
        let s = self.interner.stmt_ref(stmt_no);
        let p = self.interner.entity_ref(proc);
        self.call_proc_table.insert_row(vec![s, p]);
        self.call_proc_map.insert(s, p);
    }

    pub fn add_read_var(&mut self, stmt_no: u32, var: &str) {
        let s = self.interner.stmt_ref(stmt_no);
        let v = self.interner.entity_ref(var);
        self.read_var_table.insert_row(vec![s, v]);
        self.read_var_map.insert(s, v);
    }

    pub fn add_print_var(&mut self, stmt_no: u32, var: &str) {
        let s = self.interner.stmt_ref(stmt_no);
        let v = self.interner.entity_ref(var);
        self.print_var_table.insert_row(vec![s, v]);
        self.print_var_map.insert(s, v);
    }

    /// Record an assign statement's left-hand variable and the canonical
    /// postfix form of its right-hand side.
    pub fn add_pattern_assign(&mut self, stmt_no: u32, lhs: &str, rhs_postfix: &str) {
        let s = self.interner.stmt_ref(stmt_no);
        let l = self.interner.entity_ref(lhs);
        let r = self.interner.entity_ref(rhs_postfix);
        self.pattern_assign_table.insert_row(vec![s, l, r]);
    }

    pub fn add_pattern_if(&mut self, stmt_no: u32, control_var: &str) {
        let s = self.interner.stmt_ref(stmt_no);
        let v = self.interner.entity_ref(control_var);
        self.pattern_if_table.insert_row(vec![s, v]);
    }

    pub fn add_pattern_while(&mut self, stmt_no: u32, control_var: &str) {
        let s = self.interner.stmt_ref(stmt_no);
        let v = self.interner.entity_ref(control_var);
        self.pattern_while_table.insert_row(vec![s, v]);
    }

    // -----------------------------------------------------------------------
    // Writers: procedure layout and CFG
    // -----------------------------------------------------------------------

    pub fn add_stmt_proc(&mut self, stmt_no: u32, proc: &str) {
        let p = self.interner.entity_ref(proc);
        self.stmt_proc.insert(stmt_no, p);
    }

    pub fn set_proc_start(&mut self, proc: &str, stmt_no: u32) {
        let p = self.interner.entity_ref(proc);
        self.proc_start.insert(p, stmt_no);
    }

    pub fn add_proc_end(&mut self, proc: &str, stmt_no: u32) {
        let p = self.interner.entity_ref(proc);
        self.proc_end.entry(p).or_default().push(stmt_no);
    }

    pub fn set_proc_range(&mut self, proc: &str, first: u32, last: u32) {
        let p = self.interner.entity_ref(proc);
        self.proc_range.insert(p, (first, last));
    }

    pub fn add_cfg_edge(&mut self, from: u32, to: u32) {
        self.cfg.insert(from, to);
    }

    // -----------------------------------------------------------------------
    // Table getters (clones; the evaluator mutates freely)
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn get_var_table(&self) -> Table {
        self.var_table.clone()
    }

    #[must_use]
    pub fn get_proc_table(&self) -> Table {
        self.proc_table.clone()
    }

    #[must_use]
    pub fn get_const_table(&self) -> Table {
        self.const_table.clone()
    }

    #[must_use]
    pub fn get_stmt_table(&self) -> Table {
        self.stmt_table.clone()
    }

    #[must_use]
    pub fn get_if_table(&self) -> Table {
        self.if_table.clone()
    }

    #[must_use]
    pub fn get_while_table(&self) -> Table {
        self.while_table.clone()
    }

    #[must_use]
    pub fn get_read_table(&self) -> Table {
        self.read_table.clone()
    }

    #[must_use]
    pub fn get_print_table(&self) -> Table {
        self.print_table.clone()
    }

    #[must_use]
    pub fn get_assign_table(&self) -> Table {
        self.assign_table.clone()
    }

    #[must_use]
    pub fn get_call_table(&self) -> Table {
        self.call_table.clone()
    }

    #[must_use]
    pub fn get_follows_table(&self) -> Table {
        self.follows_table.clone()
    }

    #[must_use]
    pub fn get_follows_t_table(&self) -> Table {
        self.follows_t_table.clone()
    }

    #[must_use]
    pub fn get_parent_table(&self) -> Table {
        self.parent_table.clone()
    }

    #[must_use]
    pub fn get_parent_t_table(&self) -> Table {
        self.parent_t_table.clone()
    }

    #[must_use]
    pub fn get_uses_s_table(&self) -> Table {
        self.uses_s_table.clone()
    }

    #[must_use]
    pub fn get_uses_p_table(&self) -> Table {
        self.uses_p_table.clone()
    }

    #[must_use]
    pub fn get_modifies_s_table(&self) -> Table {
        self.modifies_s_table.clone()
    }

    #[must_use]
    pub fn get_modifies_p_table(&self) -> Table {
        self.modifies_p_table.clone()
    }

    #[must_use]
    pub fn get_calls_table(&self) -> Table {
        self.calls_table.clone()
    }

    #[must_use]
    pub fn get_calls_t_table(&self) -> Table {
        self.calls_t_table.clone()
    }

    #[must_use]
    pub fn get_next_table(&self) -> Table {
        self.next_table.clone()
    }

    #[must_use]
    pub fn get_next_t_table(&self) -> Table {
        self.next_t_table.clone()
    }

    #[must_use]
    pub fn get_affects_table(&self) -> Table {
        self.affects_table.clone()
    }

    #[must_use]
    pub fn get_affects_t_table(&self) -> Table {
        self.affects_t_table.clone()
    }

    #[must_use]
    pub fn get_next_bip_table(&self) -> Table {
        self.next_bip_table.clone()
    }

    #[must_use]
    pub fn get_next_bip_t_table(&self) -> Table {
        self.next_bip_t_table.clone()
    }

    #[must_use]
    pub fn get_affects_bip_table(&self) -> Table {
        self.affects_bip_table.clone()
    }

    #[must_use]
    pub fn get_affects_bip_t_table(&self) -> Table {
        self.affects_bip_t_table.clone()
    }

    #[must_use]
    pub fn get_call_proc_table(&self) -> Table {
        self.call_proc_table.clone()
    }

    #[must_use]
    pub fn get_read_var_table(&self) -> Table {
        self.read_var_table.clone()
    }

    #[must_use]
    pub fn get_print_var_table(&self) -> Table {
        self.print_var_table.clone()
    }

    #[must_use]
    pub fn get_pattern_assign_table(&self) -> Table {
        self.pattern_assign_table.clone()
    }

    #[must_use]
    pub fn get_pattern_if_table(&self) -> Table {
        self.pattern_if_table.clone()
    }

    #[must_use]
    pub fn get_pattern_while_table(&self) -> Table {
        self.pattern_while_table.clone()
    }

    // -----------------------------------------------------------------------
    // Reference-set getters
    // -----------------------------------------------------------------------

    fn column_refs(table: &Table) -> HashSet<IntRef> {
        table.rows().iter().map(|row| row[0]).collect()
    }

    #[must_use]
    pub fn get_var_int_refs(&self) -> HashSet<IntRef> {
        Self::column_refs(&self.var_table)
    }

    #[must_use]
    pub fn get_proc_int_refs(&self) -> HashSet<IntRef> {
        Self::column_refs(&self.proc_table)
    }

    #[must_use]
    pub fn get_const_int_refs(&self) -> HashSet<IntRef> {
        Self::column_refs(&self.const_table)
    }

    #[must_use]
    pub fn get_stmt_int_refs(&self) -> HashSet<IntRef> {
        Self::column_refs(&self.stmt_table)
    }

    #[must_use]
    pub fn get_if_int_refs(&self) -> HashSet<IntRef> {
        Self::column_refs(&self.if_table)
    }

    #[must_use]
    pub fn get_while_int_refs(&self) -> HashSet<IntRef> {
        Self::column_refs(&self.while_table)
    }

    #[must_use]
    pub fn get_read_int_refs(&self) -> HashSet<IntRef> {
        Self::column_refs(&self.read_table)
    }

    #[must_use]
    pub fn get_print_int_refs(&self) -> HashSet<IntRef> {
        Self::column_refs(&self.print_table)
    }

    #[must_use]
    pub fn get_assign_int_refs(&self) -> HashSet<IntRef> {
        Self::column_refs(&self.assign_table)
    }

    #[must_use]
    pub fn get_call_int_refs(&self) -> HashSet<IntRef> {
        Self::column_refs(&self.call_table)
    }

    // -----------------------------------------------------------------------
    // Single-column convenience queries
    // -----------------------------------------------------------------------

    /// Filter a binary table on `filter_idx == stmt_no`, then drop the
    /// filter column, leaving the other side of the relation.
    fn filter_drop(&self, table: &Table, filter_idx: usize, stmt_no: u32) -> Table {
        let mut filtered = table.clone();
        let values = self
            .interner
            .lookup_stmt(stmt_no)
            .map_or_else(HashSet::new, |r| HashSet::from([r]));
        filtered.filter_column(filter_idx, &values);
        filtered.drop_column(filter_idx);
        filtered
    }

    /// The statement directly following `stmt_no`.
    #[must_use]
    pub fn get_follower(&self, stmt_no: u32) -> Table {
        self.filter_drop(&self.follows_table, 0, stmt_no)
    }

    /// The statement directly preceding `stmt_no`.
    #[must_use]
    pub fn get_followed_by(&self, stmt_no: u32) -> Table {
        self.filter_drop(&self.follows_table, 1, stmt_no)
    }

    /// All statements transitively following `stmt_no`.
    #[must_use]
    pub fn get_follower_t(&self, stmt_no: u32) -> Table {
        self.filter_drop(&self.follows_t_table, 0, stmt_no)
    }

    /// All statements transitively preceding `stmt_no`.
    #[must_use]
    pub fn get_followed_by_t(&self, stmt_no: u32) -> Table {
        self.filter_drop(&self.follows_t_table, 1, stmt_no)
    }

    /// The direct container of `stmt_no`.
    #[must_use]
    pub fn get_parent(&self, stmt_no: u32) -> Table {
        self.filter_drop(&self.parent_table, 1, stmt_no)
    }

    /// The direct children of `stmt_no`.
    #[must_use]
    pub fn get_child(&self, stmt_no: u32) -> Table {
        self.filter_drop(&self.parent_table, 0, stmt_no)
    }

    /// All ancestors of `stmt_no`.
    #[must_use]
    pub fn get_parent_t(&self, stmt_no: u32) -> Table {
        self.filter_drop(&self.parent_t_table, 1, stmt_no)
    }

    /// All descendants of `stmt_no`.
    #[must_use]
    pub fn get_child_t(&self, stmt_no: u32) -> Table {
        self.filter_drop(&self.parent_t_table, 0, stmt_no)
    }

    // -----------------------------------------------------------------------
    // Higher-level queries for the evaluator
    // -----------------------------------------------------------------------

    /// Assign statements that use `var`.
    #[must_use]
    pub fn get_assign_uses(&self, var: &str) -> HashSet<u32> {
        let Some(v) = self.interner.lookup_entity(var) else {
            return HashSet::new();
        };
        let assigns = self.get_assign_int_refs();
        self.uses_s_table
            .rows()
            .iter()
            .filter(|row| row[1] == v && assigns.contains(&row[0]))
            .map(|row| self.interner.stmt_num(row[0]))
            .collect()
    }

    /// Variables modified by statement `stmt_no`.
    #[must_use]
    pub fn get_modified_by(&self, stmt_no: u32) -> HashSet<String> {
        let Some(s) = self.interner.lookup_stmt(stmt_no) else {
            return HashSet::new();
        };
        self.modifies_s_table
            .rows()
            .iter()
            .filter(|row| row[0] == s)
            .map(|row| self.interner.entity(row[1]).to_owned())
            .collect()
    }

    /// Procedure reference recorded for a call statement reference.
    #[must_use]
    pub fn call_proc_of(&self, call_stmt: IntRef) -> Option<IntRef> {
        self.call_proc_map.get(&call_stmt).copied()
    }

    /// Variable reference recorded for a read statement reference.
    #[must_use]
    pub fn read_var_of(&self, read_stmt: IntRef) -> Option<IntRef> {
        self.read_var_map.get(&read_stmt).copied()
    }

    /// Variable reference recorded for a print statement reference.
    #[must_use]
    pub fn print_var_of(&self, print_stmt: IntRef) -> Option<IntRef> {
        self.print_var_map.get(&print_stmt).copied()
    }

    /// Name of the procedure called by statement `stmt_no`.
    #[must_use]
    pub fn get_proc_name_from_call_stmt(&self, stmt_no: u32) -> Option<String> {
        let s = self.interner.lookup_stmt(stmt_no)?;
        self.call_proc_of(s).map(|p| self.interner.entity(p).to_owned())
    }

    /// Name of the variable read by statement `stmt_no`.
    #[must_use]
    pub fn get_var_name_from_read_stmt(&self, stmt_no: u32) -> Option<String> {
        let s = self.interner.lookup_stmt(stmt_no)?;
        self.read_var_of(s).map(|v| self.interner.entity(v).to_owned())
    }

    /// Name of the variable printed by statement `stmt_no`.
    #[must_use]
    pub fn get_var_name_from_print_stmt(&self, stmt_no: u32) -> Option<String> {
        let s = self.interner.lookup_stmt(stmt_no)?;
        self.print_var_of(s).map(|v| self.interner.entity(v).to_owned())
    }

    /// CFG successors of statement `stmt_no`.
    #[must_use]
    pub fn get_next_stmts_from_cfg(&self, stmt_no: u32) -> &[u32] {
        self.cfg.neighbors(stmt_no)
    }

    /// First statement of procedure `proc`.
    #[must_use]
    pub fn get_start_stmt_from_proc(&self, proc: &str) -> Option<u32> {
        let p = self.interner.lookup_entity(proc)?;
        self.proc_start.get(&p).copied()
    }

    /// Exit statements of procedure `proc`.
    #[must_use]
    pub fn get_end_stmts_from_proc(&self, proc: &str) -> &[u32] {
        self.interner
            .lookup_entity(proc)
            .and_then(|p| self.proc_end.get(&p))
            .map_or(&[], Vec::as_slice)
    }

    /// Name of the procedure containing statement `stmt_no`.
    #[must_use]
    pub fn get_proc_from_stmt(&self, stmt_no: u32) -> Option<&str> {
        self.stmt_proc
            .get(&stmt_no)
            .map(|&p| self.interner.entity(p))
    }

    /// Statement-number range `[first, last]` of procedure `proc`.
    #[must_use]
    pub fn get_proc_range(&self, proc: &str) -> Option<(u32, u32)> {
        let p = self.interner.lookup_entity(proc)?;
        self.proc_range.get(&p).copied()
    }
}
