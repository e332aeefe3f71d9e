//! Declared types and initializers.

mod common;

use common::*;
use sablier_model::expr::Expression;
use sablier_model::types::{Prefix, Type};

#[test]
fn integer_initialiser_out_of_range_is_rejected() {
    let mut builder = ModelBuilder::new();
    builder.global(
        "N",
        Type::ranged_int(constant(0), constant(10)).with_prefix(Prefix::Constant),
        Some(constant(42)),
    );

    let sink = builder.check();
    assert!(has_error(&sink, "Initialiser is out of range"));
}

#[test]
fn integer_initialiser_inside_the_range_is_accepted() {
    let mut builder = ModelBuilder::new();
    builder.global(
        "N",
        Type::ranged_int(constant(0), constant(10)).with_prefix(Prefix::Constant),
        Some(constant(10)),
    );

    let sink = builder.check();
    assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
}

#[test]
fn range_computed_from_constants_is_honoured() {
    let mut builder = ModelBuilder::new();
    let limit = builder.global(
        "limit",
        Type::int().with_prefix(Prefix::Constant),
        Some(constant(5)),
    );
    builder.global(
        "n",
        Type::ranged_int(constant(0), builder.ident(limit)),
        Some(constant(6)),
    );

    let sink = builder.check();
    assert!(has_error(&sink, "Initialiser is out of range"));
}

#[test]
fn range_endpoints_must_be_integer_expressions() {
    let mut builder = ModelBuilder::new();
    let x = builder.global("x", Type::clock(), None);
    builder.global("n", Type::ranged_int(builder.ident(x), constant(10)), None);

    let sink = builder.check();
    assert!(has_error(&sink, "Integer expression expected"));
}

#[test]
fn range_endpoints_must_not_depend_on_runtime_state() {
    let mut builder = ModelBuilder::new();
    let m = builder.global("m", Type::int(), None);
    builder.global("n", Type::ranged_int(constant(0), builder.ident(m)), None);

    let sink = builder.check();
    assert!(has_error(&sink, "Constant expression expected"));
}

#[test]
fn array_initialiser_must_cover_every_position() {
    let element = Type::ranged_int(constant(0), constant(10));

    let mut builder = ModelBuilder::new();
    builder.global(
        "short",
        Type::array(constant(3), element.clone()),
        Some(Expression::list(
            span(),
            vec![(None, constant(1)), (None, constant(2))],
        )),
    );
    let sink = builder.check();
    assert!(has_error(&sink, "Missing fields in initialiser"));

    let mut builder = ModelBuilder::new();
    builder.global(
        "long",
        Type::array(constant(3), element.clone()),
        Some(Expression::list(
            span(),
            vec![
                (None, constant(1)),
                (None, constant(2)),
                (None, constant(3)),
                (None, constant(4)),
            ],
        )),
    );
    let sink = builder.check();
    assert!(has_error(&sink, "Excess elements in array initialiser"));

    let mut builder = ModelBuilder::new();
    builder.global(
        "full",
        Type::array(constant(3), element),
        Some(Expression::list(
            span(),
            vec![(None, constant(1)), (None, constant(2)), (None, constant(3))],
        )),
    );
    let sink = builder.check();
    assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
}

#[test]
fn array_initialiser_elements_are_positional() {
    let mut builder = ModelBuilder::new();
    builder.global(
        "a",
        Type::array(constant(2), Type::int()),
        Some(Expression::list(
            span(),
            vec![(Some("first".to_string()), constant(1)), (None, constant(2))],
        )),
    );

    let sink = builder.check();
    assert!(has_error(&sink, "Unknown field specified in initialiser"));
}

#[test]
fn array_initialiser_checks_element_ranges() {
    let mut builder = ModelBuilder::new();
    builder.global(
        "a",
        Type::array(constant(2), Type::ranged_int(constant(0), constant(10))),
        Some(Expression::list(
            span(),
            vec![(None, constant(1)), (None, constant(42))],
        )),
    );

    let sink = builder.check();
    assert!(has_error(&sink, "Initialiser is out of range"));
}

#[test]
fn parameterized_array_size_forbids_initialisers() {
    let mut builder = ModelBuilder::new();
    let m = builder.global("m", Type::int(), None);
    builder.global(
        "a",
        Type::array(builder.ident(m), Type::int()),
        Some(Expression::list(span(), vec![(None, constant(1))])),
    );

    let sink = builder.check();
    // The size itself is not constant, and without it the initialiser
    // cannot be laid out.
    assert!(has_error(&sink, "Constant expression expected"));
    assert!(has_error(
        &sink,
        "Arrays with parameterized size cannot have an initialiser"
    ));
}

#[test]
fn record_initialiser_positional_and_named_elements() {
    let mut builder = ModelBuilder::new();
    let field_a = builder.system.symbols.add_symbol("a", Type::int());
    let field_b = builder.system.symbols.add_symbol("b", Type::bool());
    let frame = builder.system.symbols.add_frame(vec![field_a, field_b]);

    builder.global(
        "positional",
        Type::record(frame),
        Some(Expression::list(
            span(),
            vec![(None, constant(1)), (None, constant(0))],
        )),
    );
    builder.global(
        "named",
        Type::record(frame),
        Some(Expression::list(
            span(),
            vec![
                (Some("b".to_string()), constant(1)),
                (Some("a".to_string()), constant(2)),
            ],
        )),
    );

    let sink = builder.check();
    assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
}

#[test]
fn record_initialiser_must_cover_every_field() {
    let mut builder = ModelBuilder::new();
    let field_a = builder.system.symbols.add_symbol("a", Type::int());
    let field_b = builder.system.symbols.add_symbol("b", Type::bool());
    let frame = builder.system.symbols.add_frame(vec![field_a, field_b]);

    builder.global(
        "r",
        Type::record(frame),
        Some(Expression::list(
            span(),
            vec![(Some("b".to_string()), constant(1))],
        )),
    );

    let sink = builder.check();
    assert!(has_error(&sink, "Incomplete initialiser"));
}

#[test]
fn record_initialiser_rejects_duplicate_fields() {
    let mut builder = ModelBuilder::new();
    let field_a = builder.system.symbols.add_symbol("a", Type::int());
    let field_b = builder.system.symbols.add_symbol("b", Type::bool());
    let frame = builder.system.symbols.add_frame(vec![field_a, field_b]);

    builder.global(
        "r",
        Type::record(frame),
        Some(Expression::list(
            span(),
            vec![
                (None, constant(1)),
                (Some("a".to_string()), constant(2)),
            ],
        )),
    );

    let sink = builder.check();
    assert!(has_error(&sink, "Multiple initialisers for field"));
    assert!(has_error(&sink, "Incomplete initialiser"));
}

#[test]
fn record_initialiser_rejects_unknown_fields() {
    let mut builder = ModelBuilder::new();
    let field_a = builder.system.symbols.add_symbol("a", Type::int());
    let frame = builder.system.symbols.add_frame(vec![field_a]);

    builder.global(
        "r",
        Type::record(frame),
        Some(Expression::list(
            span(),
            vec![(Some("z".to_string()), constant(1))],
        )),
    );

    let sink = builder.check();
    assert!(has_error(&sink, "Unknown field"));
    assert!(has_error(&sink, "Incomplete initialiser"));
}

#[test]
fn record_initialiser_fast_path_for_identical_frames() {
    let mut builder = ModelBuilder::new();
    let field_a = builder.system.symbols.add_symbol("a", Type::int());
    let frame = builder.system.symbols.add_frame(vec![field_a]);

    let source = builder.global(
        "source",
        Type::record(frame).with_prefix(Prefix::Constant),
        Some(Expression::list(span(), vec![(None, constant(1))])),
    );
    builder.global(
        "copy",
        Type::record(frame).with_prefix(Prefix::Constant),
        Some(builder.ident(source)),
    );

    let sink = builder.check();
    assert!(sink.is_empty(), "unexpected diagnostics: {:?}", messages(&sink));
}

#[test]
fn record_initialiser_must_be_a_list() {
    let mut builder = ModelBuilder::new();
    let field_a = builder.system.symbols.add_symbol("a", Type::int());
    let frame = builder.system.symbols.add_frame(vec![field_a]);

    builder.global("r", Type::record(frame), Some(constant(5)));

    let sink = builder.check();
    assert!(has_error(&sink, "Invalid initialiser for struct"));
}

#[test]
fn boolean_initialiser_must_be_integer_typed() {
    let mut builder = ModelBuilder::new();
    builder.global("ok", Type::bool(), Some(constant(1)));
    builder.global(
        "bad",
        Type::bool(),
        Some(Expression::list(span(), vec![(None, constant(1))])),
    );

    let sink = builder.check();
    assert!(has_error(&sink, "Invalid initialiser"));
    assert_eq!(messages(&sink).len(), 1);
}

#[test]
fn initialiser_must_not_depend_on_runtime_state() {
    let mut builder = ModelBuilder::new();
    let m = builder.global("m", Type::int(), None);
    builder.global("n", Type::int(), Some(builder.ident(m)));

    let sink = builder.check();
    assert!(has_error(&sink, "Constant expression expected"));
}
