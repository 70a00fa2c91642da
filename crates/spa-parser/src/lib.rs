//! Tokenizer and PQL front-end for the SPA.
//!
//! The same character-class tokenizer serves both pipelines: the SIMPLE
//! source parser upstream (whitespace consumed, leading zeros rejected)
//! and the PQL parser here (whitespace retained because the query
//! grammar is whitespace-sensitive in places, leading zeros tolerated
//! and normalized during parsing).

pub mod expr;
pub mod parser;
pub mod query;
pub mod token;
pub mod tokenizer;

use spa_error::Result;

pub use parser::PqlParser;
pub use query::{AttrKind, Clause, ClauseKind, Query, QueryRef, RefKind};
pub use token::{Token, TokenKind};
pub use tokenizer::Tokenizer;

/// Tokenize a PQL query string with the PQL pipeline configuration.
pub fn tokenize_pql(text: &str) -> Result<Vec<Token>> {
    Tokenizer::new()
        .not_consuming_whitespace()
        .allowing_leading_zeroes()
        .tokenize(text)
}

/// Tokenize and parse a PQL query string.
pub fn parse_pql(text: &str) -> Result<Query> {
    let tokens = tokenize_pql(text)?;
    PqlParser::new(tokens).parse_query()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spa_error::SpaError;

    fn parse_ok(text: &str) -> Query {
        parse_pql(text).expect("query should parse")
    }

    fn parse_clean(text: &str) -> Query {
        let query = parse_ok(text);
        assert_eq!(query.semantic_errors, "", "unexpected semantic errors");
        query
    }

    fn syntax_err(text: &str) {
        match parse_pql(text) {
            Err(SpaError::PqlSyntax(_) | SpaError::Lex(_)) => {}
            other => panic!("expected a fatal parse error, got {other:?}"),
        }
    }

    // -------------------------------------------------------------------
    // Declarations and targets
    // -------------------------------------------------------------------

    #[test]
    fn single_select() {
        let query = parse_clean("variable v; Select v");
        assert_eq!(query.targets.len(), 1);
        assert_eq!(query.targets[0].kind, RefKind::Variable);
        assert_eq!(query.targets[0].text, "v");
        assert!(!query.boolean);
        assert!(query.clauses.is_empty());
    }

    #[test]
    fn multi_synonym_declaration() {
        let query = parse_clean("stmt s1, s2, s3; Select s2");
        assert_eq!(query.targets[0].kind, RefKind::Stmt);
        assert_eq!(query.targets[0].text, "s2");
    }

    #[test]
    fn every_design_entity_declares() {
        let query = parse_clean(
            "stmt s; read re; print pn; call c; while w; if ifs; assign a; \
             variable v; constant k; procedure p; prog_line n; Select s",
        );
        assert!(query.clauses.is_empty());
    }

    #[test]
    fn prog_line_must_be_unbroken() {
        syntax_err("prog _line n; Select n");
        syntax_err("prog_ line n; Select n");
    }

    #[test]
    fn boolean_select() {
        let query = parse_clean("stmt s; Select BOOLEAN");
        assert!(query.boolean);
        assert!(query.targets.is_empty());
    }

    #[test]
    fn tuple_select() {
        let query = parse_clean("assign a; variable v; Select <a, v>");
        assert_eq!(query.targets.len(), 2);
        assert_eq!(query.targets[0].text, "a");
        assert_eq!(query.targets[1].text, "v");
    }

    #[test]
    fn attribute_targets() {
        let query = parse_clean("call c; constant k; Select <c.procName, k.value, c.stmt#>");
        assert_eq!(query.targets[0].attr, AttrKind::ProcName);
        assert_eq!(query.targets[1].attr, AttrKind::Value);
        assert_eq!(query.targets[2].attr, AttrKind::StmtNum);
    }

    #[test]
    fn stmt_hash_must_be_unbroken() {
        syntax_err("stmt s; Select s.stmt #");
    }

    #[test]
    fn invalid_attribute_name_is_syntax_error() {
        syntax_err("stmt s; Select s.lineNo");
    }

    #[test]
    fn wrong_attribute_for_kind_is_semantic() {
        let query = parse_ok("variable v; Select v.procName");
        assert!(query.has_semantic_errors());
    }

    #[test]
    fn boolean_declaration_name_is_semantic() {
        let query = parse_ok("stmt BOOLEAN; Select BOOLEAN");
        assert!(query.has_semantic_errors());
        assert!(query.boolean);
    }

    #[test]
    fn duplicate_declaration_is_semantic() {
        let query = parse_ok("stmt s; variable s; Select s");
        assert!(query.semantic_errors.contains("Duplicate"));
    }

    #[test]
    fn undeclared_target_is_semantic() {
        let query = parse_ok("Select v");
        assert!(query.semantic_errors.contains("Undeclared"));
        assert_eq!(query.targets[0].kind, RefKind::Undefined);
    }

    // -------------------------------------------------------------------
    // Such-that clauses
    // -------------------------------------------------------------------

    #[test]
    fn follows_with_number_and_synonym() {
        let query = parse_clean("assign a; Select a such that Follows(1, a)");
        let clause = &query.clauses[0];
        assert_eq!(clause.kind, ClauseKind::Follows);
        assert_eq!(clause.params[0], QueryRef::number("1"));
        assert_eq!(clause.params[1].text, "a");
    }

    #[test]
    fn transitive_star_binds_tightly() {
        let query = parse_clean("stmt s; Select s such that Follows*(1, s)");
        assert_eq!(query.clauses[0].kind, ClauseKind::FollowsT);
        // Whitespace between the name and the star is malformed.
        syntax_err("stmt s; Select s such that Follows *(1, s)");
    }

    #[test]
    fn such_that_requires_exactly_one_space() {
        syntax_err("stmt s; Select s such  that Follows(1, s)");
        syntax_err("stmt s; Select s suchthat Follows(1, s)");
    }

    #[test]
    fn all_relations_parse() {
        let query = parse_clean(
            "stmt s1, s2; procedure p, q; variable v; \
             Select s1 such that Parent(s1, s2) and Next(s1, s2) \
             and Next*(s1, s2) and Affects(s1, s2) and Affects*(s1, s2) \
             and NextBip(s1, s2) and AffectsBip(s1, s2) \
             and Calls(p, q) and Calls*(p, q) and Uses(s1, v) and Modifies(p, v)",
        );
        let kinds: Vec<ClauseKind> = query.clauses.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ClauseKind::Parent,
                ClauseKind::Next,
                ClauseKind::NextT,
                ClauseKind::Affects,
                ClauseKind::AffectsT,
                ClauseKind::NextBip,
                ClauseKind::AffectsBip,
                ClauseKind::Calls,
                ClauseKind::CallsT,
                ClauseKind::UsesS,
                ClauseKind::ModifiesP,
            ]
        );
    }

    #[test]
    fn uses_splits_on_first_argument() {
        let by_stmt = parse_clean("stmt s; variable v; Select s such that Uses(s, v)");
        assert_eq!(by_stmt.clauses[0].kind, ClauseKind::UsesS);
        let by_number = parse_clean("variable v; Select v such that Uses(3, v)");
        assert_eq!(by_number.clauses[0].kind, ClauseKind::UsesS);
        let by_proc = parse_clean("procedure p; variable v; Select p such that Uses(p, v)");
        assert_eq!(by_proc.clauses[0].kind, ClauseKind::UsesP);
        let by_name = parse_clean("variable v; Select v such that Modifies(\"main\", v)");
        assert_eq!(by_name.clauses[0].kind, ClauseKind::ModifiesP);
    }

    #[test]
    fn uses_wildcard_first_arg_is_semantic() {
        let query = parse_ok("variable v; Select v such that Uses(_, v)");
        assert!(query.semantic_errors.contains("Wildcard"));
        assert_eq!(query.clauses[0].kind, ClauseKind::UsesP);
    }

    #[test]
    fn uses_has_no_transitive_form() {
        syntax_err("stmt s; variable v; Select s such that Uses*(s, v)");
    }

    #[test]
    fn stmt_number_zero_is_semantic() {
        let query = parse_ok("stmt s; Select s such that Follows(0, s)");
        assert!(query.semantic_errors.contains("0"));
    }

    #[test]
    fn leading_zeros_are_normalized() {
        let query = parse_clean("stmt s; Select s such that Follows(007, s)");
        assert_eq!(query.clauses[0].params[0], QueryRef::number("7"));
    }

    #[test]
    fn non_stmt_synonym_in_stmt_ref_is_semantic() {
        let query = parse_ok("variable v; stmt s; Select s such that Follows(v, s)");
        assert!(query.has_semantic_errors());
    }

    #[test]
    fn invalid_relation_is_syntax_error() {
        syntax_err("stmt s; Select s such that Foll0ws(1, s)");
        syntax_err("stmt s; Select s such that Folws(1, s)");
    }

    // -------------------------------------------------------------------
    // Pattern clauses
    // -------------------------------------------------------------------

    #[test]
    fn pattern_assign_exact_expression() {
        let query = parse_clean("assign a; Select a pattern a(\"x\", \"y + 1\")");
        let clause = &query.clauses[0];
        assert_eq!(clause.kind, ClauseKind::PatternAssign);
        assert_eq!(clause.params[1], QueryRef::name("x"));
        assert_eq!(clause.params[2], QueryRef::expression(" y 1 + "));
    }

    #[test]
    fn pattern_assign_sub_expression() {
        let query = parse_clean("assign a; variable v; Select a pattern a(v, _\"x - 1\"_)");
        assert_eq!(query.clauses[0].params[2], QueryRef::sub_expression(" x 1 - "));
    }

    #[test]
    fn pattern_assign_wildcard() {
        let query = parse_clean("assign a; Select a pattern a(_, _)");
        assert!(query.clauses[0].params[1].is_wildcard());
        assert!(query.clauses[0].params[2].is_wildcard());
    }

    #[test]
    fn pattern_expression_strips_leading_zeros() {
        let query = parse_clean("assign a; Select a pattern a(_, \"x + 007\")");
        assert_eq!(query.clauses[0].params[2], QueryRef::expression(" x 7 + "));
        // A plain zero stays.
        let query = parse_clean("assign a; Select a pattern a(_, \"0\")");
        assert_eq!(query.clauses[0].params[2], QueryRef::expression(" 0 "));
    }

    #[test]
    fn pattern_while_and_if_arity() {
        let query = parse_clean("while w; Select w pattern w(\"x\", _)");
        assert_eq!(query.clauses[0].kind, ClauseKind::PatternWhile);
        let query = parse_clean("if ifs; variable v; Select ifs pattern ifs(v, _, _)");
        assert_eq!(query.clauses[0].kind, ClauseKind::PatternIf);
        // An if pattern with only two arguments is malformed.
        syntax_err("if ifs; Select ifs pattern ifs(_, \"x\")");
    }

    #[test]
    fn pattern_on_wrong_synonym_is_semantic_but_consumed() {
        let query = parse_ok("stmt s; variable v; Select s pattern s(v, _)");
        assert!(query.has_semantic_errors());
        assert_eq!(query.clauses[0].kind, ClauseKind::PatternAssign);

        let query = parse_ok("stmt s; variable v; Select s pattern s(v, _, _)");
        assert!(query.has_semantic_errors());
        assert_eq!(query.clauses[0].kind, ClauseKind::PatternIf);
    }

    #[test]
    fn malformed_pattern_expression_is_syntax_error() {
        syntax_err("assign a; Select a pattern a(_, \"x +\")");
        syntax_err("assign a; Select a pattern a(_, \"\")");
        syntax_err("assign a; Select a pattern a(_, \"(x\")");
    }

    // -------------------------------------------------------------------
    // With clauses
    // -------------------------------------------------------------------

    #[test]
    fn with_literal_pairs() {
        let query = parse_clean("stmt s; Select s with 2 = 2 and \"a\" = \"a\"");
        assert_eq!(query.clauses.len(), 2);
        assert_eq!(query.clauses[0].kind, ClauseKind::With);
    }

    #[test]
    fn with_attr_refs() {
        let query = parse_clean(
            "call c; procedure p; Select c with c.procName = p.procName",
        );
        let clause = &query.clauses[0];
        assert_eq!(clause.params[0].attr, AttrKind::ProcName);
        assert_eq!(clause.params[1].attr, AttrKind::ProcName);
    }

    #[test]
    fn with_prog_line_is_bare() {
        let query = parse_clean("prog_line n; Select n with n = 5");
        assert_eq!(query.clauses[0].params[0].kind, RefKind::ProgLine);
        assert_eq!(query.clauses[0].params[1], QueryRef::number("5"));
    }

    #[test]
    fn with_name_vs_number_is_semantic() {
        let query = parse_ok("procedure p; Select p with p.procName = 3");
        assert!(query.has_semantic_errors());
    }

    #[test]
    fn with_synonym_without_attr_is_semantic() {
        let query = parse_ok("stmt s; Select s with s = 3");
        assert!(query.has_semantic_errors());
    }

    // -------------------------------------------------------------------
    // Clause chaining and stream hygiene
    // -------------------------------------------------------------------

    #[test]
    fn and_continues_the_previous_clause_kind() {
        let query = parse_clean(
            "stmt s1, s2, s3; Select s1 such that Follows(s1, s2) and Parent(s2, s3)",
        );
        assert_eq!(query.clauses.len(), 2);
    }

    #[test]
    fn and_without_preceding_clause_is_syntax_error() {
        syntax_err("stmt s; Select s and Follows(1, s)");
    }

    #[test]
    fn trailing_tokens_are_syntax_errors() {
        syntax_err("stmt s; Select s such that Follows(1, s) extra");
        syntax_err("stmt s; Select s ;");
    }

    #[test]
    fn newlines_are_ordinary_whitespace() {
        let query = parse_clean("stmt s;\nSelect s\nsuch that Follows(1,\n s)");
        assert_eq!(query.clauses.len(), 1);
    }

    #[test]
    fn lex_error_surfaces() {
        match parse_pql("stmt s; Select s such that Follows(1, s) ^") {
            Err(SpaError::Lex(_)) => {}
            other => panic!("expected lex error, got {other:?}"),
        }
    }

    #[test]
    fn semantic_errors_accumulate() {
        let query = parse_ok("Select v such that Uses(_, v) pattern x(_, _)");
        // Undeclared v (twice: target and clause), wildcard first arg,
        // undeclared x, non-pattern synonym.
        assert!(query.semantic_errors.lines().count() >= 4);
    }
}
