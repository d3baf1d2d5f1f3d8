/// Tests for statement checking: control flow conditions, loop domains,
/// print, assignment arity and implicit declaration.
#[cfg(test)]
mod statement_tests {
    use lattice_ast::{
        builder::Builder,
        nodes::{ComparisonOperatorKind, Definition, OperatorKind},
    };
    use lattice_type_checker::errors::ErrorKind;

    use crate::utils::{
        assert_no_errors, assert_single_error, check_statements, error_kinds, error_messages,
        node_type,
    };

    fn point_set(b: &Builder) -> Vec<Definition> {
        vec![
            b.element_type("Point", vec![("m", b.float_type())]),
            b.extern_definition("points", b.set_type("Point", &[])),
        ]
    }

    #[test]
    fn test_while_condition_must_be_boolean() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![b.while_loop(b.int(1), vec![b.expression_statement(b.var("ghost"))])],
        );
        // The body is checked before the condition is validated.
        assert_eq!(
            error_messages(&ctx),
            vec![
                "undeclared variable or constant 'ghost'",
                "expected a boolean conditional expression but got an expression of type 'int'",
            ]
        );
    }

    #[test]
    fn test_while_with_comparison_condition() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![
                b.variable("i", b.int_type(), Some(b.int(0))),
                b.while_loop(
                    b.compare(
                        vec![b.var("i"), b.int(10)],
                        vec![ComparisonOperatorKind::Lt],
                    ),
                    vec![b.assign(
                        vec![b.var("i")],
                        b.binary(b.var("i"), OperatorKind::Add, b.int(1)),
                    )],
                ),
            ],
        );
        assert_no_errors(&ctx);
    }

    #[test]
    fn test_if_arms_have_their_own_scopes() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![
                b.if_else(
                    b.boolean(true),
                    vec![b.variable("a", b.int_type(), Some(b.int(1)))],
                    Some(vec![b.print(b.var("a"))]),
                ),
                b.print(b.var("a")),
            ],
        );
        assert_eq!(
            error_messages(&ctx),
            vec![
                "undeclared variable or constant 'a'",
                "undeclared variable or constant 'a'",
            ]
        );
    }

    #[test]
    fn test_if_condition_must_be_boolean() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![b.if_else(b.float(1.0), vec![], None)],
        );
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "expected a boolean conditional expression but got an expression of type 'float'",
        );
    }

    #[test]
    fn test_for_range_bounds_must_be_integral() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![b.for_range("i", b.float(0.0), b.boolean(true), vec![])],
        );
        assert_eq!(
            error_messages(&ctx),
            vec![
                "expected lower bound of for-loop range to be integral but got an expression of type 'float'",
                "expected upper bound of for-loop range to be integral but got an expression of type 'bool'",
            ]
        );
    }

    #[test]
    fn test_loop_variable_is_a_readable_int() {
        let b = Builder::new();
        let i = b.var("i");
        let ctx = check_statements(
            &b,
            vec![],
            vec![b.for_range("i", b.int(0), b.int(10), vec![b.print(i.clone())])],
        );
        assert_no_errors(&ctx);
        assert_eq!(node_type(&ctx, &i).as_deref(), Some("int"));
    }

    #[test]
    fn test_loop_variable_is_not_writable() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![b.for_range(
                "i",
                b.int(0),
                b.int(10),
                vec![b.assign(vec![b.var("i")], b.int(1))],
            )],
        );
        assert_single_error(&ctx, ErrorKind::PermissionViolation, "'i' is not writable");
    }

    #[test]
    fn test_loop_variable_does_not_outlive_loop() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![
                b.for_range("i", b.int(0), b.int(3), vec![]),
                b.print(b.var("i")),
            ],
        );
        assert_single_error(
            &ctx,
            ErrorKind::UndeclaredIdentifier,
            "undeclared variable or constant 'i'",
        );
    }

    #[test]
    fn test_for_over_set() {
        let b = Builder::new();
        let p = b.var("p");
        let ctx = check_statements(
            &b,
            point_set(&b),
            vec![b.for_set("p", "points", vec![b.print(p.clone())])],
        );
        assert_no_errors(&ctx);
        assert_eq!(node_type(&ctx, &p).as_deref(), Some("int"));
    }

    #[test]
    fn test_for_over_undeclared_set() {
        let b = Builder::new();
        let ctx = check_statements(&b, vec![], vec![b.for_set("p", "cells", vec![])]);
        assert_single_error(&ctx, ErrorKind::UndeclaredIdentifier, "undeclared set 'cells'");
    }

    #[test]
    fn test_for_over_non_set() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![b.extern_definition("n", b.int_type())],
            vec![b.for_set("p", "n", vec![])],
        );
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "index set must be a set, a range, or dynamic (*)",
        );
    }

    #[test]
    fn test_print_requires_a_tensor() {
        let b = Builder::new();
        let mut definitions = point_set(&b);
        definitions.push(b.procedure("step", vec![], vec![], vec![]));
        let ctx = check_statements(
            &b,
            definitions,
            vec![
                b.print(b.var("points")),
                b.print(b.call("step", vec![])),
                b.print(b.float(1.0)),
            ],
        );
        assert_eq!(
            error_messages(&ctx),
            vec![
                "cannot print an expression of type 'set{Point}'",
                "cannot print an expression of type void",
            ]
        );
    }

    #[test]
    fn test_assignment_arity_mismatch() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![b.assign(vec![b.var("a"), b.var("c")], b.int(1))],
        );
        assert_single_error(
            &ctx,
            ErrorKind::ArityMismatch,
            "cannot assign an expression returning 1 values to 2 targets",
        );
    }

    #[test]
    fn test_assignment_type_mismatch() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![
                b.variable("x", b.int_type(), None),
                b.assign(vec![b.var("x")], b.float(1.0)),
            ],
        );
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "cannot assign a value of type 'float' to a target of type 'int'",
        );
    }

    #[test]
    fn test_scalar_assigned_to_tensor() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![
                b.variable("v", b.tensor_type(vec![b.range_index_set(3)], b.float_type()), None),
                b.assign(vec![b.var("v")], b.float(0.0)),
            ],
        );
        assert_no_errors(&ctx);
    }

    #[test]
    fn test_first_assignment_declares() {
        let b = Builder::new();
        let y = b.var("y");
        let ctx = check_statements(
            &b,
            vec![],
            vec![
                b.assign(vec![b.var("y")], b.float(1.5)),
                b.assign(vec![b.var("z")], y.clone()),
                b.assign(vec![b.var("y")], b.float(2.5)),
            ],
        );
        assert_no_errors(&ctx);
        assert_eq!(node_type(&ctx, &y).as_deref(), Some("float"));
    }

    #[test]
    fn test_implicit_declaration_after_error_has_no_type() {
        let b = Builder::new();
        let y = b.var("y");
        let ctx = check_statements(
            &b,
            vec![],
            vec![
                b.assign(vec![b.var("y")], b.var("ghost")),
                b.print(b.binary(y.clone(), OperatorKind::Add, b.int(1))),
            ],
        );
        assert_single_error(
            &ctx,
            ErrorKind::UndeclaredIdentifier,
            "undeclared variable or constant 'ghost'",
        );
        assert!(ctx.get_node_types(y.id()).is_none());
    }

    #[test]
    fn test_multiple_results_are_assigned_in_order() {
        let b = Builder::new();
        let call = b.call("split", vec![]);
        let count = b.var("count");
        let weight = b.var("weight");
        let split = b.function(
            "split",
            vec![],
            vec![b.result("n", b.int_type()), b.result("w", b.float_type())],
            vec![
                b.assign(vec![b.var("n")], b.int(1)),
                b.assign(vec![b.var("w")], b.float(2.0)),
            ],
        );
        let ctx = check_statements(
            &b,
            vec![split],
            vec![
                b.assign(vec![b.var("count"), b.var("weight")], call.clone()),
                b.print(count.clone()),
                b.print(weight.clone()),
            ],
        );
        assert_no_errors(&ctx);
        let results: Vec<String> = ctx
            .get_node_types(call.id())
            .expect("call has result types")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(results, vec!["int", "float"]);
        assert_eq!(node_type(&ctx, &count).as_deref(), Some("int"));
        assert_eq!(node_type(&ctx, &weight).as_deref(), Some("float"));
    }

    #[test]
    fn test_undeclared_call_still_checks_arguments() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![b.expression_statement(b.call("integrate", vec![b.var("ghost")]))],
        );
        assert_eq!(
            error_messages(&ctx),
            vec![
                "undeclared variable or constant 'ghost'",
                "undeclared function 'integrate'",
            ]
        );
        assert_eq!(
            error_kinds(&ctx),
            vec![ErrorKind::UndeclaredIdentifier, ErrorKind::UndeclaredIdentifier]
        );
    }

    #[test]
    fn test_constant_tensor_is_not_writable_through_reads() {
        let b = Builder::new();
        let ctx = check_statements(
            &b,
            vec![],
            vec![
                b.constant(
                    "c",
                    b.tensor_type(vec![b.range_index_set(3)], b.float_type()),
                    Some(b.dense(b.float_vector(vec![1.0, 2.0, 3.0], false))),
                ),
                b.assign(
                    vec![b.tensor_read(b.var("c"), vec![b.index(b.int(0))])],
                    b.float(0.0),
                ),
                b.assign(
                    vec![b.tensor_read(b.parenthesized(b.var("c")), vec![b.index(b.int(1))])],
                    b.float(0.0),
                ),
            ],
        );
        assert_eq!(
            error_messages(&ctx),
            vec!["'c' is not writable", "'c' is not writable"]
        );
    }
}
