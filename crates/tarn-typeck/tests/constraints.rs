//! End-to-end constraint generation + unification over parsed source.
//!
//! These tests check that for every constraint pair `(a, b)` emitted
//! during generation, the resulting equivalence partition places `a`
//! and `b` in the same class.

use tarn_typeck::{CtrGen, TypeHandle, Unifier};

// ── Helpers ──────────────────────────────────────────────────────────

fn constraints_for(source: &str) -> Vec<(TypeHandle, TypeHandle)> {
    let tokens = tarn_lexer::Scanner::filtered(source).expect("lex");
    let ast = tarn_parser::parse(&tokens, source).expect("parse");
    let mut gen = CtrGen::new();
    let mut out = Vec::new();
    let root = gen.fresh();
    gen.generate(&ast, root, &mut out);
    out
}

// ── Every constraint pair unifies into one class ──────────────────────

#[test]
fn every_constraint_pair_shares_a_class() {
    let constraints = constraints_for("let x <- 5 in x + 3 end");
    let mut unifier = Unifier::new();
    unifier.solve(&constraints);
    let classes = unifier.classes();
    for (a, b) in &constraints {
        if a == b {
            continue;
        }
        assert!(
            classes[a].contains(b),
            "expected {a} and {b} in the same class"
        );
    }
}

// ── Concrete scenarios ─────────────────────────────────────────────────

#[test]
fn arithmetic_literal_ties_root_to_int() {
    let constraints = constraints_for("2 * (3 + 4)");
    let mut unifier = Unifier::new();
    unifier.solve(&constraints);
    let classes = unifier.classes();
    let int_class = &classes[&TypeHandle::int()];
    // every fresh variable minted while walking Mul/Add's subtree is int.
    assert!(int_class.len() >= 2);
}

#[test]
fn comparison_result_is_bool_but_operands_are_int() {
    let constraints = constraints_for("1 < 2");
    let mut unifier = Unifier::new();
    unifier.solve(&constraints);
    let classes = unifier.classes();
    assert!(classes[&TypeHandle::bool()].len() >= 1);
    assert!(classes[&TypeHandle::int()].len() >= 1);
}

#[test]
fn let_binder_identifier_is_typed_by_its_definition() {
    let constraints = constraints_for("let x <- 5 in x end");
    let mut unifier = Unifier::new();
    unifier.solve(&constraints);
    let classes = unifier.classes();
    let x = TypeHandle::Named("x".into());
    assert!(classes[&x].contains(&TypeHandle::int()));
}

#[test]
fn type_annotation_strengthens_binder_to_declared_base_type() {
    let constraints = constraints_for("let x : int <- 5 in x end");
    let mut unifier = Unifier::new();
    unifier.solve(&constraints);
    let classes = unifier.classes();
    let x = TypeHandle::Named("x".into());
    assert!(classes[&x].contains(&TypeHandle::int()));
}

#[test]
fn unrelated_programs_do_not_cross_contaminate_classes() {
    // Two distinct free variables never tied together stay apart.
    let constraints = constraints_for("let y <- true in y end");
    let mut unifier = Unifier::new();
    unifier.solve(&constraints);
    let classes = unifier.classes();
    let y = TypeHandle::Named("y".into());
    assert!(classes[&y].contains(&TypeHandle::bool()));
    assert!(!classes[&y].contains(&TypeHandle::int()));
}

#[test]
fn eql_forces_both_operands_into_one_shared_class() {
    let constraints = constraints_for("let a <- 1 in let b <- 2 in a = b end end");
    let mut unifier = Unifier::new();
    unifier.solve(&constraints);
    let classes = unifier.classes();
    let a = TypeHandle::Named("a".into());
    let b = TypeHandle::Named("b".into());
    assert!(classes[&a].contains(&b));
}

#[test]
fn deliberately_ill_typed_program_is_detectable_as_a_contradiction() {
    // `if true then 1 else false` ties both branches to one fresh
    // variable; that variable ends up in a class with both `int` and
    // `bool`. Solving never errors -- the caller decides to flag it.
    let constraints = constraints_for("if true then 1 else false");
    let mut unifier = Unifier::new();
    unifier.solve(&constraints);
    assert!(!unifier.contradictions().is_empty());
}
