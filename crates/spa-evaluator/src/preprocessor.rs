// Clause scheduling: partition a query's clauses into groups by the
// synonyms they share, and order each group so the cheap, selective
// work runs first.
//
// Three buckets:
//   - clauses with no synonyms at all (pure existence checks),
//   - connected components whose synonyms never reach a select target
//     (the component only has to be non-empty),
//   - components that constrain at least one target (these join into
//     the final result table).

use std::collections::HashMap;

use spa_parser::{Clause, ClauseKind, QueryRef, RefKind};

/// The scheduled shape of a query's clauses. Every `usize` indexes into
/// the original clause list, and source order is preserved inside each
/// cost tier.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ClauseGroups {
    pub no_synonym: Vec<usize>,
    pub detached: Vec<Vec<usize>>,
    pub attached: Vec<Vec<usize>>,
}

/// Cost tier for intra-group ordering. Lower runs first.
fn cost_tier(clause: &Clause) -> u8 {
    let has_literal_or_wildcard = clause.params.iter().any(|p| {
        matches!(
            p.kind,
            RefKind::Wildcard
                | RefKind::Name
                | RefKind::Number
                | RefKind::Expression
                | RefKind::SubExpression
        )
    });
    if has_literal_or_wildcard {
        return 0;
    }
    match clause.kind {
        ClauseKind::PatternAssign | ClauseKind::PatternIf | ClauseKind::PatternWhile => 1,
        ClauseKind::Next
        | ClauseKind::NextT
        | ClauseKind::Affects
        | ClauseKind::AffectsT
        | ClauseKind::NextBip
        | ClauseKind::NextBipT
        | ClauseKind::AffectsBip
        | ClauseKind::AffectsBipT => 3,
        _ => 2,
    }
}

/// Union-find over synonym slots.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new() -> Self {
        Self { parent: Vec::new() }
    }

    fn make(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        id
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Partition and order the clauses of a query.
#[must_use]
pub fn group_clauses(targets: &[QueryRef], clauses: &[Clause]) -> ClauseGroups {
    let mut groups = ClauseGroups::default();
    let mut uf = UnionFind::new();
    let mut slot_of: HashMap<String, usize> = HashMap::new();

    // Connect every synonym within a clause.
    let mut clause_slot: Vec<Option<usize>> = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let syns = clause.synonyms();
        if syns.is_empty() {
            clause_slot.push(None);
            continue;
        }
        let first = *slot_of
            .entry(syns[0].to_owned())
            .or_insert_with(|| uf.make());
        for syn in &syns[1..] {
            let slot = *slot_of
                .entry((*syn).to_owned())
                .or_insert_with(|| uf.make());
            uf.union(first, slot);
        }
        clause_slot.push(Some(first));
    }

    // Components that reach a select target.
    let target_roots: Vec<usize> = targets
        .iter()
        .filter_map(|t| slot_of.get(&t.text).copied())
        .map(|slot| uf.find(slot))
        .collect();

    // Bucket clauses by component root, preserving source order.
    let mut by_root: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut root_order: Vec<usize> = Vec::new();
    for (idx, slot) in clause_slot.iter().enumerate() {
        match slot {
            None => groups.no_synonym.push(idx),
            Some(slot) => {
                let root = uf.find(*slot);
                let bucket = by_root.entry(root).or_insert_with(|| {
                    root_order.push(root);
                    Vec::new()
                });
                bucket.push(idx);
            }
        }
    }

    for root in root_order {
        let mut group = by_root.remove(&root).unwrap_or_default();
        // Stable sort keeps source order inside each tier.
        group.sort_by_key(|&idx| cost_tier(&clauses[idx]));
        if target_roots.contains(&root) {
            groups.attached.push(group);
        } else {
            groups.detached.push(group);
        }
    }

    groups
}
