// Relational table: a header of column names over a hash-set of
// fixed-width integer rows. The join engine of the query evaluator is
// built entirely from the operations here.
//
// Columns with an empty-string name are anonymous and never participate
// in natural joins.

use std::collections::{HashMap, HashSet};

use crate::intern::IntRef;

/// A fixed-width row of interned references. Equality and hashing are by
/// value.
pub type Row = Vec<IntRef>;

/// A set of rows under a column header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: HashSet<Row>,
}

impl Table {
    /// A table with `n` anonymous columns.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            header: vec![String::new(); n],
            rows: HashSet::new(),
        }
    }

    /// A table with the given column names.
    #[must_use]
    pub fn with_header<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: HashSet::new(),
        }
    }

    /// The one-row, one-anonymous-column table that is the identity of
    /// natural join. Evaluation starts its accumulator from this.
    #[must_use]
    pub fn sentinel_true() -> Self {
        let mut t = Self::new(1);
        t.insert_row(vec![IntRef::ZERO]);
        t
    }

    /// Replace the header. The new header must have the same arity.
    pub fn set_header<I, S>(&mut self, header: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let header: Vec<String> = header.into_iter().map(Into::into).collect();
        assert_eq!(
            header.len(),
            self.header.len(),
            "replacement header arity {} != table arity {}",
            header.len(),
            self.header.len()
        );
        self.header = header;
    }

    /// Insert a row. Duplicates are ignored.
    ///
    /// # Panics
    /// Panics if the row width does not match the header.
    pub fn insert_row(&mut self, row: Row) {
        assert_eq!(
            row.len(),
            self.header.len(),
            "row width {} != table arity {}",
            row.len(),
            self.header.len()
        );
        self.rows.insert(row);
    }

    /// Remove a row, reporting whether it was present.
    pub fn delete_row(&mut self, row: &Row) -> bool {
        self.rows.remove(row)
    }

    /// Retain only the rows whose value in column `idx` is in `values`.
    pub fn filter_column(&mut self, idx: usize, values: &HashSet<IntRef>) {
        assert!(idx < self.header.len(), "filter column {idx} out of bounds");
        self.rows.retain(|row| values.contains(&row[idx]));
    }

    /// Drop the column at `idx`. Returns false when out of bounds.
    pub fn drop_column(&mut self, idx: usize) -> bool {
        if idx >= self.header.len() {
            return false;
        }
        self.header.remove(idx);
        let old = std::mem::take(&mut self.rows);
        self.rows = old
            .into_iter()
            .map(|mut row| {
                row.remove(idx);
                row
            })
            .collect();
        true
    }

    /// Drop the first column with the given name. Returns false when the
    /// name is absent.
    pub fn drop_column_named(&mut self, name: &str) -> bool {
        match self.column_index(name) {
            Some(idx) => self.drop_column(idx),
            None => false,
        }
    }

    /// Append the rows of `other`.
    ///
    /// # Panics
    /// Panics unless both tables have the same arity.
    pub fn concatenate(&mut self, other: &Self) {
        assert_eq!(
            self.header.len(),
            other.header.len(),
            "cannot concatenate arity {} into arity {}",
            other.header.len(),
            self.header.len()
        );
        self.rows.extend(other.rows.iter().cloned());
    }

    /// Natural join with `other`, in place.
    ///
    /// Joins on every pair of columns with equal, non-empty names.
    /// Anonymous columns never match. With no common names this is a
    /// cross join. Matched columns of `other` are omitted from the
    /// result; the result header is this header followed by the
    /// unmatched columns of `other`.
    pub fn natural_join(&mut self, other: &Self) {
        let pairs = self.common_columns(other);
        if pairs.is_empty() {
            self.cross_join(other);
        } else {
            self.join_on(other, &pairs, true);
        }
    }

    /// Cross join with `other`, in place. Headers are concatenated.
    pub fn cross_join(&mut self, other: &Self) {
        self.header.extend(other.header.iter().cloned());
        let old = std::mem::take(&mut self.rows);
        for left in &old {
            for right in &other.rows {
                let mut row = left.clone();
                row.extend(right.iter().copied());
                self.rows.insert(row);
            }
        }
    }

    /// Inner join on one column pair, in place. Column `j` of `other` is
    /// dropped from the result.
    pub fn inner_join(&mut self, other: &Self, i: usize, j: usize) {
        self.join_on(other, &[(i, j)], true);
    }

    /// Inner join on explicit column pairs, in place. No columns are
    /// dropped: the result keeps every column of both tables.
    pub fn inner_join_on_pairs(&mut self, other: &Self, pairs: &[(usize, usize)]) {
        self.join_on(other, pairs, false);
    }

    /// Inner join on the column that both tables name `name`.
    ///
    /// # Panics
    /// Panics unless `name` is present in both headers.
    pub fn inner_join_named(&mut self, other: &Self, name: &str) {
        let i = self
            .column_index(name)
            .unwrap_or_else(|| panic!("join column {name:?} missing from left table"));
        let j = other
            .column_index(name)
            .unwrap_or_else(|| panic!("join column {name:?} missing from right table"));
        self.inner_join(other, i, j);
    }

    /// The column names.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// The row set.
    #[must_use]
    pub fn rows(&self) -> &HashSet<Row> {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the row is present.
    #[must_use]
    pub fn contains(&self, row: &Row) -> bool {
        self.rows.contains(row)
    }

    /// Index of the first column named `name`, if any.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Pairs (i, j) of equally named, non-anonymous columns.
    fn common_columns(&self, other: &Self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, name) in self.header.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            for (j, other_name) in other.header.iter().enumerate() {
                if name == other_name {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Hash-join `other` into this table on the given column pairs.
    /// When `drop_matched` is set, the matched columns of `other` are
    /// omitted from the result rows and header.
    fn join_on(&mut self, other: &Self, pairs: &[(usize, usize)], drop_matched: bool) {
        let matched: HashSet<usize> = pairs.iter().map(|&(_, j)| j).collect();

        // Index the right side by its join key.
        let mut index: HashMap<Vec<IntRef>, Vec<&Row>> = HashMap::new();
        for row in &other.rows {
            let key: Vec<IntRef> = pairs.iter().map(|&(_, j)| row[j]).collect();
            index.entry(key).or_default().push(row);
        }

        let old = std::mem::take(&mut self.rows);
        for left in &old {
            let key: Vec<IntRef> = pairs.iter().map(|&(i, _)| left[i]).collect();
            let Some(matches) = index.get(&key) else {
                continue;
            };
            for right in matches {
                let mut row = left.clone();
                for (j, value) in right.iter().enumerate() {
                    if !(drop_matched && matched.contains(&j)) {
                        row.push(*value);
                    }
                }
                self.rows.insert(row);
            }
        }

        for (j, name) in other.header.iter().enumerate() {
            if !(drop_matched && matched.contains(&j)) {
                self.header.push(name.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;
    use proptest::prelude::*;

    // Mint refs without caring what they point at.
    fn refs(n: u32) -> Vec<IntRef> {
        let mut interner = Interner::new();
        (0..n).map(|i| interner.stmt_ref(i + 1)).collect()
    }

    fn row(r: &[IntRef], picks: &[usize]) -> Row {
        picks.iter().map(|&i| r[i]).collect()
    }

    #[test]
    fn new_table_is_anonymous_and_empty() {
        let table = Table::new(2);
        assert_eq!(table.header(), &["", ""]);
        assert!(table.is_empty());
        assert_eq!(table.column_index("a"), None);
    }

    #[test]
    fn header_lookup() {
        let table = Table::with_header(["a", "b"]);
        assert_eq!(table.column_index("a"), Some(0));
        assert_eq!(table.column_index("b"), Some(1));
        assert_eq!(table.column_index("c"), None);
    }

    #[test]
    fn insert_is_set_semantics() {
        let r = refs(3);
        let mut table = Table::new(1);
        table.insert_row(vec![r[0]]);
        table.insert_row(vec![r[0]]);
        table.insert_row(vec![r[1]]);
        assert_eq!(table.len(), 2);
        assert!(table.contains(&vec![r[1]]));
    }

    #[test]
    #[should_panic(expected = "row width")]
    fn insert_wrong_width_panics() {
        let r = refs(2);
        let mut table = Table::new(1);
        table.insert_row(vec![r[0], r[1]]);
    }

    #[test]
    fn drop_column_by_name() {
        let r = refs(4);
        let mut table = Table::with_header(["a", "b"]);
        table.insert_row(row(&r, &[0, 2]));
        table.insert_row(row(&r, &[1, 3]));
        assert!(table.drop_column_named("a"));
        assert_eq!(table.header(), &["b"]);
        assert!(table.contains(&vec![r[2]]));
        assert!(!table.drop_column_named("a"));
        // Rows that collapse to duplicates merge.
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn drop_column_out_of_bounds() {
        let mut table = Table::new(1);
        assert!(table.drop_column(0));
        assert!(!table.drop_column(0));
    }

    #[test]
    fn filter_column_keeps_matches() {
        let r = refs(4);
        let mut table = Table::with_header(["a", "b"]);
        table.insert_row(row(&r, &[0, 2]));
        table.insert_row(row(&r, &[1, 3]));
        table.filter_column(1, &HashSet::from([r[2]]));
        assert!(table.contains(&row(&r, &[0, 2])));
        assert!(!table.contains(&row(&r, &[1, 3])));
    }

    #[test]
    fn filter_with_empty_set_empties_table() {
        let r = refs(2);
        let mut table = Table::new(2);
        table.insert_row(vec![r[0], r[1]]);
        table.filter_column(0, &HashSet::new());
        assert!(table.is_empty());
    }

    #[test]
    fn concatenate_appends_rows() {
        let r = refs(3);
        let mut left = Table::new(1);
        left.insert_row(vec![r[0]]);
        let mut right = Table::new(1);
        right.insert_row(vec![r[1]]);
        right.insert_row(vec![r[2]]);
        left.concatenate(&right);
        assert_eq!(left.len(), 3);
    }

    #[test]
    fn delete_row_reports_presence() {
        let r = refs(2);
        let mut table = Table::new(1);
        table.insert_row(vec![r[0]]);
        assert!(table.delete_row(&vec![r[0]]));
        assert!(!table.delete_row(&vec![r[0]]));
        assert!(!table.delete_row(&vec![r[1]]));
    }

    #[test]
    fn natural_join_without_common_names_is_cross_join() {
        let r = refs(4);
        let mut left = Table::with_header(["a", "b"]);
        left.insert_row(row(&r, &[0, 1]));
        let mut right = Table::with_header(["c", "d"]);
        right.insert_row(row(&r, &[2, 3]));
        right.insert_row(row(&r, &[3, 2]));
        left.natural_join(&right);
        assert_eq!(left.header(), &["a", "b", "c", "d"]);
        assert_eq!(left.len(), 2);
        assert!(left.contains(&row(&r, &[0, 1, 2, 3])));
        assert!(left.contains(&row(&r, &[0, 1, 3, 2])));
    }

    #[test]
    fn natural_join_on_one_common_column() {
        let r = refs(5);
        let mut left = Table::with_header(["a", "b"]);
        left.insert_row(row(&r, &[0, 1]));
        left.insert_row(row(&r, &[2, 3]));
        let mut right = Table::with_header(["a", "c"]);
        right.insert_row(row(&r, &[0, 4]));
        left.natural_join(&right);
        assert_eq!(left.header(), &["a", "b", "c"]);
        assert_eq!(left.len(), 1);
        assert!(left.contains(&row(&r, &[0, 1, 4])));
    }

    #[test]
    fn natural_join_on_two_common_columns() {
        let r = refs(5);
        let mut left = Table::with_header(["a", "b", "c"]);
        left.insert_row(row(&r, &[0, 1, 2]));
        left.insert_row(row(&r, &[3, 4, 2]));
        let mut right = Table::with_header(["a", "c"]);
        right.insert_row(row(&r, &[0, 2]));
        right.insert_row(row(&r, &[3, 4]));
        left.natural_join(&right);
        assert_eq!(left.header(), &["a", "b", "c"]);
        assert_eq!(left.len(), 1);
        assert!(left.contains(&row(&r, &[0, 1, 2])));
    }

    #[test]
    fn anonymous_columns_never_match() {
        let r = refs(4);
        let mut left = Table::with_header(["", "b"]);
        left.insert_row(row(&r, &[0, 1]));
        let mut right = Table::with_header(["", "c"]);
        right.insert_row(row(&r, &[2, 3]));
        left.natural_join(&right);
        // Cross join: anonymous names do not unify.
        assert_eq!(left.header(), &["", "b", "", "c"]);
        assert_eq!(left.len(), 1);
        assert!(left.contains(&row(&r, &[0, 1, 2, 3])));
    }

    #[test]
    fn natural_join_of_empty_tables_keeps_joint_header() {
        let mut left = Table::with_header(["a", "b"]);
        let right = Table::with_header(["a", "c"]);
        left.natural_join(&right);
        assert_eq!(left.header(), &["a", "b", "c"]);
        assert!(left.is_empty());
    }

    #[test]
    fn inner_join_drops_right_column() {
        let r = refs(5);
        let mut left = Table::with_header(["a", "b"]);
        left.insert_row(row(&r, &[0, 1]));
        left.insert_row(row(&r, &[2, 3]));
        let mut right = Table::with_header(["a", "c"]);
        right.insert_row(row(&r, &[0, 4]));
        right.insert_row(row(&r, &[2, 4]));
        left.inner_join(&right, 0, 0);
        assert_eq!(left.header(), &["a", "b", "c"]);
        assert_eq!(left.len(), 2);
        assert!(left.contains(&row(&r, &[0, 1, 4])));
        assert!(left.contains(&row(&r, &[2, 3, 4])));
    }

    #[test]
    fn inner_join_on_pairs_keeps_all_columns() {
        let r = refs(4);
        let mut left = Table::with_header(["a", "b"]);
        left.insert_row(row(&r, &[0, 1]));
        let mut right = Table::with_header(["c", "d"]);
        right.insert_row(row(&r, &[0, 3]));
        left.inner_join_on_pairs(&right, &[(0, 0)]);
        assert_eq!(left.header(), &["a", "b", "c", "d"]);
        assert!(left.contains(&row(&r, &[0, 1, 0, 3])));
    }

    #[test]
    fn inner_join_named_resolves_both_sides() {
        let r = refs(5);
        let mut left = Table::with_header(["a", "b"]);
        left.insert_row(row(&r, &[0, 1]));
        let mut right = Table::with_header(["a", "c"]);
        right.insert_row(row(&r, &[0, 4]));
        left.inner_join_named(&right, "a");
        assert_eq!(left.header(), &["a", "b", "c"]);
        assert!(left.contains(&row(&r, &[0, 1, 4])));
    }

    #[test]
    fn sentinel_is_natural_join_identity() {
        let r = refs(3);
        let mut table = Table::with_header(["a", "b"]);
        table.insert_row(row(&r, &[0, 1]));
        table.insert_row(row(&r, &[1, 2]));
        let before = table.clone();
        let mut sentinel = Table::sentinel_true();
        sentinel.natural_join(&table);
        sentinel.drop_column(0);
        assert_eq!(sentinel, before);
    }

    // Generators for the universal properties.
    prop_compose! {
        fn arb_small_table()(
            width in 1usize..4,
            named in proptest::collection::vec(any::<bool>(), 1..4),
            raw in proptest::collection::vec(
                proptest::collection::vec(1u32..6, 1..4), 0..12),
        ) -> Table {
            let header: Vec<String> = (0..width)
                .map(|i| if *named.get(i % named.len()).unwrap_or(&false) {
                    format!("c{i}")
                } else {
                    String::new()
                })
                .collect();
            let mut interner = Interner::new();
            let mut table = Table::with_header(header);
            for row in raw {
                let row: Row = (0..width)
                    .map(|i| interner.stmt_ref(row[i % row.len()]))
                    .collect();
                table.insert_row(row);
            }
            table
        }
    }

    proptest! {
        #[test]
        fn filter_is_idempotent(table in arb_small_table(), keep in proptest::collection::hash_set(1u32..6, 0..4)) {
            let mut interner = Interner::new();
            let values: HashSet<IntRef> = keep.iter().map(|&n| interner.stmt_ref(n)).collect();
            let mut once = table.clone();
            once.filter_column(0, &values);
            let mut twice = once.clone();
            twice.filter_column(0, &values);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn drop_then_filter_commutes(table in arb_small_table(), keep in proptest::collection::hash_set(1u32..6, 0..4)) {
            prop_assume!(table.header().len() >= 2);
            let mut interner = Interner::new();
            let values: HashSet<IntRef> = keep.iter().map(|&n| interner.stmt_ref(n)).collect();
            // Filter column 0, drop the last column, in both orders.
            let last = table.header().len() - 1;
            let mut a = table.clone();
            a.filter_column(0, &values);
            a.drop_column(last);
            let mut b = table;
            b.drop_column(last);
            b.filter_column(0, &values);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn sentinel_join_identity(table in arb_small_table()) {
            let mut joined = table.clone();
            joined.natural_join(&Table::sentinel_true());
            // The sentinel contributes one anonymous column of its dummy
            // value; dropping it recovers the original table.
            let added = joined.header().len() - 1;
            joined.drop_column(added);
            prop_assert_eq!(joined, table);
        }
    }
}
