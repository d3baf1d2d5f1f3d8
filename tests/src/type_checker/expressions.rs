#[cfg(test)]
mod expression_tests {
    use lattice_ast::{
        builder::Builder,
        nodes::{
            ComparisonOperatorKind, Definition, Expression, OperatorKind, Statement,
            UnaryOperatorKind,
        },
    };
    use lattice_type_checker::{errors::ErrorKind, typed_context::TypedContext};

    use crate::utils::{
        assert_no_errors, assert_single_error, check_statements, error_kinds, error_messages,
        node_type,
    };

    /// `var r: tensor[3](float)`, `var c: tensor[3](float)'`, `var m: tensor[2,3](float)`
    /// and `var cube: tensor[2,2,2](float)`.
    fn tensors(b: &Builder) -> Vec<Statement> {
        vec![
            b.variable("r", b.tensor_type(vec![b.range_index_set(3)], b.float_type()), None),
            b.variable(
                "c",
                b.column_vector_type(vec![b.range_index_set(3)], b.float_type()),
                None,
            ),
            b.variable(
                "m",
                b.tensor_type(vec![b.range_index_set(2), b.range_index_set(3)], b.float_type()),
                None,
            ),
            b.variable(
                "cube",
                b.tensor_type(
                    vec![b.range_index_set(2), b.range_index_set(2), b.range_index_set(2)],
                    b.float_type(),
                ),
                None,
            ),
        ]
    }

    /// Checks `expression` after the tensor declarations above.
    fn check_expression(
        b: &Builder,
        definitions: Vec<Definition>,
        expression: &Expression,
    ) -> TypedContext {
        let mut statements = tensors(b);
        statements.push(b.expression_statement(expression.clone()));
        check_statements(b, definitions, statements)
    }

    #[test]
    fn test_boolean_operators() {
        let b = Builder::new();
        for operator in [OperatorKind::And, OperatorKind::Or, OperatorKind::Xor] {
            let expr = b.binary(b.boolean(true), operator, b.boolean(false));
            let ctx = check_expression(&b, vec![], &expr);
            assert_no_errors(&ctx);
            assert_eq!(node_type(&ctx, &expr).as_deref(), Some("bool"), "{operator:?}");
        }
    }

    #[test]
    fn test_boolean_operator_reports_each_operand() {
        let b = Builder::new();
        let expr = b.binary(b.int(1), OperatorKind::And, b.var("r"));
        let ctx = check_expression(&b, vec![], &expr);
        assert_eq!(
            error_messages(&ctx),
            vec![
                "expected left operand of boolean operation to be a boolean but got an operand of type 'int'",
                "expected right operand of boolean operation to be a boolean but got an operand of type 'tensor[3](float)'",
            ]
        );
        assert_eq!(node_type(&ctx, &expr).as_deref(), Some("bool"));
    }

    #[test]
    fn test_not() {
        let b = Builder::new();
        let expr = b.unary(UnaryOperatorKind::Not, b.int(1));
        let ctx = check_expression(&b, vec![], &expr);
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "expected a boolean operand but got an operand of type 'int'",
        );
        assert_eq!(node_type(&ctx, &expr).as_deref(), Some("bool"));
    }

    #[test]
    fn test_chained_comparison() {
        let b = Builder::new();
        let expr = b.compare(
            vec![b.int(1), b.int(2), b.int(3)],
            vec![ComparisonOperatorKind::Lt, ComparisonOperatorKind::Le],
        );
        let ctx = check_expression(&b, vec![], &expr);
        assert_no_errors(&ctx);
        assert_eq!(node_type(&ctx, &expr).as_deref(), Some("bool"));
    }

    #[test]
    fn test_comparison_operands_must_match_first_operand() {
        let b = Builder::new();
        let expr = b.compare(
            vec![b.int(1), b.float(2.0)],
            vec![ComparisonOperatorKind::Eq],
        );
        let ctx = check_expression(&b, vec![], &expr);
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "value of type 'float' cannot be compared to value of type 'int'",
        );
    }

    #[test]
    fn test_comparison_requires_scalars() {
        let b = Builder::new();
        let expr = b.compare(vec![b.var("r"), b.float(1.0)], vec![ComparisonOperatorKind::Gt]);
        let ctx = check_expression(&b, vec![], &expr);
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "comparison operations can only be performed on scalar values, not values of type 'tensor[3](float)'",
        );
        assert_eq!(node_type(&ctx, &expr).as_deref(), Some("bool"));
    }

    #[test]
    fn test_elementwise_operators() {
        let b = Builder::new();
        for operator in [
            OperatorKind::Add,
            OperatorKind::Sub,
            OperatorKind::ElwiseMul,
            OperatorKind::ElwiseDiv,
        ] {
            let same = b.binary(b.var("m"), operator, b.var("m"));
            let ctx = check_expression(&b, vec![], &same);
            assert_no_errors(&ctx);
            assert_eq!(node_type(&ctx, &same).as_deref(), Some("tensor[2,3](float)"), "{operator:?}");

            let scaled = b.binary(b.float(2.0), operator, b.var("c"));
            let ctx = check_expression(&b, vec![], &scaled);
            assert_no_errors(&ctx);
            assert_eq!(node_type(&ctx, &scaled).as_deref(), Some("tensor[3](float)'"), "{operator:?}");
        }
    }

    #[test]
    fn test_elementwise_shape_mismatch() {
        let b = Builder::new();
        let expr = b.binary(b.var("r"), OperatorKind::Add, b.var("c"));
        let ctx = check_expression(&b, vec![], &expr);
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "cannot perform element-wise operation on tensors of type 'tensor[3](float)' and type 'tensor[3](float)''",
        );
        assert!(ctx.get_node_types(expr.id()).is_none());
    }

    #[test]
    fn test_elementwise_component_mismatch() {
        let b = Builder::new();
        let expr = b.binary(b.int(1), OperatorKind::Sub, b.float(1.0));
        let ctx = check_expression(&b, vec![], &expr);
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "cannot perform element-wise operation on tensors of type 'int' and type 'float'",
        );
    }

    #[test]
    fn test_elementwise_rejects_booleans() {
        let b = Builder::new();
        let expr = b.binary(b.boolean(true), OperatorKind::Add, b.int(1));
        let ctx = check_expression(&b, vec![], &expr);
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "expected left operand of element-wise operation to be a numeric tensor but got an operand of type 'bool'",
        );
    }

    #[test]
    fn test_negation() {
        let b = Builder::new();
        let expr = b.unary(UnaryOperatorKind::Neg, b.var("m"));
        let ctx = check_expression(&b, vec![], &expr);
        assert_no_errors(&ctx);
        assert_eq!(node_type(&ctx, &expr).as_deref(), Some("tensor[2,3](float)"));

        let expr = b.unary(UnaryOperatorKind::Neg, b.boolean(true));
        let ctx = check_expression(&b, vec![], &expr);
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "expected operand of tensor negation to be a numeric tensor but got an operand of type 'bool'",
        );
    }

    #[test]
    fn test_transpose() {
        let b = Builder::new();
        let row = b.transpose(b.var("r"));
        let matrix = b.transpose(b.var("m"));
        let twice = b.transpose(b.transpose(b.var("m")));
        let scalar = b.transpose(b.float(1.0));
        for (expr, expected) in [
            (&row, "tensor[3](float)'"),
            (&matrix, "tensor[3,2](float)"),
            (&twice, "tensor[2,3](float)"),
            (&scalar, "float"),
        ] {
            let ctx = check_expression(&b, vec![], expr);
            assert_no_errors(&ctx);
            assert_eq!(node_type(&ctx, expr).as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_transpose_of_order_three() {
        let b = Builder::new();
        let expr = b.transpose(b.var("cube"));
        let ctx = check_expression(&b, vec![], &expr);
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "operand of tensor transpose must be a tensor of order 2 or less, but got an operand of type 'tensor[2,2,2](float)'",
        );
    }

    #[test]
    fn test_exponentiation_is_unsupported() {
        let b = Builder::new();
        let expr = b.binary(b.var("ghost"), OperatorKind::Exp, b.int(2));
        let ctx = check_expression(&b, vec![], &expr);
        assert_eq!(
            error_messages(&ctx),
            vec![
                "undeclared variable or constant 'ghost'",
                "exponentiation is not supported",
            ]
        );
        assert_eq!(
            error_kinds(&ctx),
            vec![ErrorKind::UndeclaredIdentifier, ErrorKind::UnsupportedConstruct]
        );
    }

    #[test]
    fn test_parentheses_are_transparent() {
        let b = Builder::new();
        let expr = b.parenthesized(b.binary(b.var("r"), OperatorKind::Add, b.var("r")));
        let ctx = check_expression(&b, vec![], &expr);
        assert_no_errors(&ctx);
        assert_eq!(node_type(&ctx, &expr).as_deref(), Some("tensor[3](float)"));
    }

    #[test]
    fn test_intrinsic_call() {
        let b = Builder::new();
        let expr = b.call("atan2", vec![b.float(1.0), b.float(2.0)]);
        let ctx = check_expression(&b, vec![], &expr);
        assert_no_errors(&ctx);
        assert_eq!(node_type(&ctx, &expr).as_deref(), Some("float"));
    }

    #[test]
    fn test_intrinsic_argument_type() {
        let b = Builder::new();
        let expr = b.call("sin", vec![b.int(1)]);
        let ctx = check_expression(&b, vec![], &expr);
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "expected argument of type 'float' but got an argument of type 'int'",
        );
        // The result type is still known.
        assert_eq!(node_type(&ctx, &expr).as_deref(), Some("float"));
    }

    #[test]
    fn test_argument_count() {
        let b = Builder::new();
        let expr = b.call("mod", vec![b.int(7)]);
        let ctx = check_expression(&b, vec![], &expr);
        assert_single_error(
            &ctx,
            ErrorKind::ArityMismatch,
            "passed in 1 arguments but function 'mod' expects 2",
        );
    }

    #[test]
    fn test_polymorphic_intrinsics_accept_any_arguments() {
        let b = Builder::new();
        let norm = b.call("norm", vec![b.var("r")]);
        let dot = b.call("dot", vec![b.var("r"), b.var("c")]);
        let clock = b.call("clock", vec![]);
        for expr in [&norm, &dot, &clock] {
            let ctx = check_expression(&b, vec![], expr);
            assert_no_errors(&ctx);
            assert_eq!(node_type(&ctx, expr).as_deref(), Some("float"));
        }
    }

    fn helpers(b: &Builder) -> Vec<Definition> {
        vec![
            b.procedure("step", vec![], vec![], vec![]),
            b.function(
                "split",
                vec![],
                vec![b.result("n", b.int_type()), b.result("w", b.float_type())],
                vec![],
            ),
            b.function(
                "twice",
                vec![b.argument("x", b.int_type())],
                vec![b.result("y", b.int_type())],
                vec![b.assign(
                    vec![b.var("y")],
                    b.binary(b.int(2), OperatorKind::Mul, b.var("x")),
                )],
            ),
        ]
    }

    #[test]
    fn test_void_argument() {
        let b = Builder::new();
        let expr = b.call("sin", vec![b.call("step", vec![])]);
        let ctx = check_expression(&b, helpers(&b), &expr);
        assert_single_error(&ctx, ErrorKind::TypeMismatch, "must pass a non-void value as argument");
    }

    #[test]
    fn test_multiple_values_as_one_argument() {
        let b = Builder::new();
        let expr = b.call("sin", vec![b.call("split", vec![])]);
        let ctx = check_expression(&b, helpers(&b), &expr);
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "cannot pass multiple values of types ('int', 'float') as a single argument",
        );
    }

    #[test]
    fn test_user_function_call() {
        let b = Builder::new();
        let expr = b.call("twice", vec![b.call("twice", vec![b.int(3)])]);
        let ctx = check_expression(&b, helpers(&b), &expr);
        assert_no_errors(&ctx);
        assert_eq!(node_type(&ctx, &expr).as_deref(), Some("int"));

        let void_call = b.call("step", vec![]);
        let ctx = check_expression(&b, helpers(&b), &void_call);
        assert_no_errors(&ctx);
        assert_eq!(ctx.get_node_types(void_call.id()), Some(&[][..]));
    }
}
