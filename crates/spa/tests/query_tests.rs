//! End-to-end query tests. Each fixture hand-populates a PKB the way
//! the upstream design extractor would for the SIMPLE program shown in
//! its doc comment.

use std::collections::HashSet;

use spa::{Pkb, QueryProcessor, SpaError};

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn results(processor: &QueryProcessor, query: &str) -> HashSet<String> {
    processor.evaluate(query).into_iter().collect()
}

/// ```text
/// procedure p {
/// 1   x = 1;
/// 2   y = x + 1; }
/// ```
fn straight_line() -> QueryProcessor {
    let mut pkb = Pkb::new();
    pkb.add_proc("p");
    pkb.add_var("x");
    pkb.add_var("y");
    pkb.add_const("1");
    pkb.add_assign(1);
    pkb.add_assign(2);
    pkb.add_follows(1, 2).unwrap();
    pkb.add_follows_t(1, 2).unwrap();
    pkb.add_modifies_s(1, "x");
    pkb.add_modifies_s(2, "y");
    pkb.add_uses_s(2, "x");
    pkb.add_modifies_p("p", "x");
    pkb.add_modifies_p("p", "y");
    pkb.add_uses_p("p", "x");
    pkb.add_next(1, 2);
    pkb.add_next_t(1, 2);
    pkb.add_pattern_assign(1, "x", " 1 ");
    pkb.add_pattern_assign(2, "y", " x 1 + ");
    pkb.add_stmt_proc(1, "p");
    pkb.add_stmt_proc(2, "p");
    pkb.set_proc_start("p", 1);
    pkb.add_proc_end("p", 2);
    pkb.set_proc_range("p", 1, 2);
    QueryProcessor::new(pkb)
}

/// ```text
/// procedure p {
/// 1   while (x > 0) {
/// 2     x = x - 1; } }
/// ```
fn single_loop() -> QueryProcessor {
    let mut pkb = Pkb::new();
    pkb.add_proc("p");
    pkb.add_var("x");
    pkb.add_const("0");
    pkb.add_const("1");
    pkb.add_while(1);
    pkb.add_assign(2);
    pkb.add_parent(1, 2).unwrap();
    pkb.add_parent_t(1, 2).unwrap();
    pkb.add_uses_s(1, "x");
    pkb.add_uses_s(2, "x");
    pkb.add_modifies_s(1, "x");
    pkb.add_modifies_s(2, "x");
    pkb.add_uses_p("p", "x");
    pkb.add_modifies_p("p", "x");
    pkb.add_next(1, 2);
    pkb.add_next(2, 1);
    for (a, b) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
        pkb.add_next_t(a, b);
    }
    pkb.add_affects(2, 2);
    pkb.add_affects_t(2, 2);
    pkb.add_pattern_while(1, "x");
    pkb.add_pattern_assign(2, "x", " x 1 - ");
    pkb.add_stmt_proc(1, "p");
    pkb.add_stmt_proc(2, "p");
    pkb.set_proc_start("p", 1);
    pkb.add_proc_end("p", 1);
    pkb.set_proc_range("p", 1, 2);
    QueryProcessor::new(pkb)
}

/// ```text
/// procedure main {
/// 1   call helper; }
/// procedure helper {
/// 2   y = 1; }
/// ```
fn caller_and_helper() -> QueryProcessor {
    let mut pkb = Pkb::new();
    pkb.add_proc("main");
    pkb.add_proc("helper");
    pkb.add_var("y");
    pkb.add_const("1");
    pkb.add_call(1);
    pkb.add_assign(2);
    pkb.add_calls("main", "helper");
    pkb.add_calls_t("main", "helper");
    pkb.add_modifies_s(1, "y");
    pkb.add_modifies_s(2, "y");
    pkb.add_modifies_p("main", "y");
    pkb.add_modifies_p("helper", "y");
    pkb.add_call_proc(1, "helper");
    pkb.add_next_bip(1, 2);
    pkb.add_next_bip_t(1, 2);
    pkb.add_pattern_assign(2, "y", " 1 ");
    pkb.add_stmt_proc(1, "main");
    pkb.add_stmt_proc(2, "helper");
    pkb.set_proc_start("main", 1);
    pkb.add_proc_end("main", 1);
    pkb.set_proc_range("main", 1, 1);
    pkb.set_proc_start("helper", 2);
    pkb.add_proc_end("helper", 2);
    pkb.set_proc_range("helper", 2, 2);
    QueryProcessor::new(pkb)
}

#[test]
fn select_all_variables() {
    let processor = straight_line();
    assert_eq!(results(&processor, "variable v; Select v"), set(&["x", "y"]));
}

#[test]
fn follows_from_first_statement() {
    let processor = straight_line();
    assert_eq!(
        results(&processor, "assign a; Select a such that Follows(1, a)"),
        set(&["2"])
    );
}

#[test]
fn nothing_parents_the_first_statement() {
    let processor = straight_line();
    assert_eq!(
        results(&processor, "stmt s; Select s such that Parent(s, 1)"),
        set(&[])
    );
}

#[test]
fn pattern_tuple_inside_loop() {
    let processor = single_loop();
    assert_eq!(
        results(
            &processor,
            "assign a; variable v; Select <a, v> pattern a(v, _\"x - 1\"_)"
        ),
        set(&["2 x"])
    );
}

#[test]
fn modifies_propagates_through_calls() {
    let processor = caller_and_helper();
    assert_eq!(
        results(&processor, "procedure p; Select p such that Modifies(p, \"y\")"),
        set(&["main", "helper"])
    );
}

#[test]
fn boolean_short_circuit_is_false() {
    let processor = straight_line();
    assert_eq!(
        processor.evaluate("Select BOOLEAN such that Follows(5, 3)"),
        vec!["FALSE".to_owned()]
    );
}

#[test]
fn boolean_positive() {
    let processor = straight_line();
    assert_eq!(
        processor.evaluate("Select BOOLEAN such that Follows(1, 2)"),
        vec!["TRUE".to_owned()]
    );
}

#[test]
fn next_bip_crosses_procedures() {
    let processor = caller_and_helper();
    assert_eq!(
        results(&processor, "prog_line n; Select n such that NextBip(1, n)"),
        set(&["2"])
    );
}

#[test]
fn call_attribute_round_trip() {
    let processor = caller_and_helper();
    assert_eq!(results(&processor, "call c; Select c.procName"), set(&["helper"]));
    assert_eq!(
        results(&processor, "call c; Select c with c.procName = \"helper\""),
        set(&["1"])
    );
}

#[test]
fn semantic_error_answers_empty() {
    let processor = straight_line();
    // v is undeclared: recoverable, answers empty.
    assert_eq!(processor.evaluate("Select v"), Vec::<String>::new());
    assert_eq!(
        processor.evaluate("variable v; Select BOOLEAN such that Uses(_, v)"),
        vec!["FALSE".to_owned()]
    );
}

#[test]
fn syntax_error_is_fatal_for_the_query_only() {
    let processor = straight_line();
    match processor.try_evaluate("variable v; Select") {
        Err(SpaError::PqlSyntax(_)) => {}
        other => panic!("expected a syntax error, got {other:?}"),
    }
    // The recovery wrapper maps it to the empty list.
    assert_eq!(
        processor.evaluate("variable v; Select"),
        Vec::<String>::new()
    );
    // And the processor still answers later queries.
    assert_eq!(results(&processor, "variable v; Select v"), set(&["x", "y"]));
}

#[test]
fn lex_error_is_fatal_for_the_query_only() {
    let processor = straight_line();
    match processor.try_evaluate("variable v; Select v such that @") {
        Err(SpaError::Lex(_)) => {}
        other => panic!("expected a lex error, got {other:?}"),
    }
}

#[test]
fn results_are_a_function_of_source_and_query() {
    let processor = single_loop();
    let query = "assign a; variable v; Select <a, v> such that Parent(1, a) pattern a(v, _)";
    let first = results(&processor, query);
    let second = results(&processor, query);
    assert_eq!(first, second);
    assert_eq!(first, set(&["2 x"]));
}

#[test]
fn unconstrained_tuple_is_a_cross_product() {
    let processor = straight_line();
    assert_eq!(
        results(&processor, "assign a; variable v; Select <a, v>"),
        set(&["1 x", "1 y", "2 x", "2 y"])
    );
}
