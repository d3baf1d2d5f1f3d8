/// Whole-program tests that run the checker through `TypeCheckerBuilder`.
#[cfg(test)]
mod end_to_end_tests {
    use lattice_ast::{
        builder::Builder,
        nodes::{OperatorKind, UnaryOperatorKind},
    };
    use lattice_type_checker::{TypeCheckerBuilder, errors::ErrorKind};

    use crate::utils::{assert_no_errors, assert_single_error, node_type, type_check};

    #[test]
    fn test_function_call_result() -> anyhow::Result<()> {
        let b = Builder::new();
        let call = b.call("f", vec![b.int(3)]);
        let source_file = b.source_file(vec![
            b.function(
                "f",
                vec![b.argument("x", b.int_type())],
                vec![b.result("y", b.int_type())],
                vec![b.assign(
                    vec![b.var("y")],
                    b.binary(b.var("x"), OperatorKind::Add, b.int(1)),
                )],
            ),
            b.procedure(
                "main",
                vec![],
                vec![],
                vec![b.assign(vec![b.var("z")], call.clone())],
            ),
        ]);
        let ctx = TypeCheckerBuilder::build_typed_context(&source_file)?.typed_context();
        ctx.ensure_no_errors()?;
        assert!(ctx.diagnostics().is_empty());
        assert_eq!(node_type(&ctx, &call).as_deref(), Some("int"));
        assert_eq!(ctx.source_file().definitions.len(), 2);
        Ok(())
    }

    #[test]
    fn test_column_vector_assignment_of_wrong_component() {
        let b = Builder::new();
        let source_file = b.source_file(vec![b.procedure(
            "main",
            vec![],
            vec![],
            vec![
                b.variable(
                    "v",
                    b.column_vector_type(vec![b.range_index_set(2)], b.int_type()),
                    None,
                ),
                b.assign(
                    vec![b.var("v")],
                    b.dense(b.float_vector(vec![1.0, 2.0], false)),
                ),
            ],
        )]);
        let ctx = type_check(&source_file);
        assert_single_error(
            &ctx,
            ErrorKind::TypeMismatch,
            "cannot assign a value of type 'tensor[2](float)' to a target of type 'tensor[2](int)''",
        );
    }

    /// A mass-spring integrator:
    ///
    /// ```text
    /// element Point  { x: tensor[3](float); v: tensor[3](float); m: float }
    /// element Spring { k: float; l0: float }
    /// extern points:  set{Point};
    /// extern springs: set{Spring}(points, points);
    ///
    /// func spring_force(s: Spring, p: (Point*2)) -> (f: tensor[points](tensor[3](float)))
    ///   dx = p(1).x - p(0).x;
    ///   l = norm(dx);
    ///   fs = s.k * (l - s.l0) / l;
    ///   f(p(0)) = fs * dx;
    ///   f(p(1)) = -fs * dx;
    /// end
    ///
    /// proc step(dt: float)
    ///   f = map spring_force to springs;
    ///   points.v = points.v + dt * f;
    ///   points.x = points.x + dt * points.v;
    /// end
    ///
    /// proc main
    ///   for i in 0:100
    ///     step(0.01);
    ///   end
    /// end
    /// ```
    #[test]
    fn test_mass_spring_program() {
        let b = Builder::new();
        let vec3 = || b.tensor_type(vec![b.range_index_set(3)], b.float_type());
        let endpoint = |i| {
            b.tensor_read(b.var("p"), vec![b.index(b.int(i))])
        };
        let position = |i| b.field_read(endpoint(i), "x");
        let dx = || b.var("dx");
        let fs = || b.var("fs");

        let spring_force = b.function(
            "spring_force",
            vec![
                b.argument("s", b.element_type_ref("Spring")),
                b.argument("p", b.tuple_type("Point", 2)),
            ],
            vec![b.result(
                "f",
                b.tensor_type(vec![b.set_index_set("points")], vec3()),
            )],
            vec![
                b.assign(
                    vec![dx()],
                    b.binary(position(1), OperatorKind::Sub, position(0)),
                ),
                b.assign(vec![b.var("l")], b.call("norm", vec![dx()])),
                b.assign(
                    vec![fs()],
                    b.binary(
                        b.binary(
                            b.field_read(b.var("s"), "k"),
                            OperatorKind::Mul,
                            b.parenthesized(b.binary(
                                b.var("l"),
                                OperatorKind::Sub,
                                b.field_read(b.var("s"), "l0"),
                            )),
                        ),
                        OperatorKind::Div,
                        b.var("l"),
                    ),
                ),
                b.assign(
                    vec![b.tensor_read(b.var("f"), vec![b.index(endpoint(0))])],
                    b.binary(fs(), OperatorKind::Mul, dx()),
                ),
                b.assign(
                    vec![b.tensor_read(b.var("f"), vec![b.index(endpoint(1))])],
                    b.binary(b.unary(UnaryOperatorKind::Neg, fs()), OperatorKind::Mul, dx()),
                ),
            ],
        );

        let field = |name: &str| b.field_read(b.var("points"), name);
        let forces = b.map("spring_force", vec![], "springs");
        let step = b.procedure(
            "step",
            vec![b.argument("dt", b.float_type())],
            vec![],
            vec![
                b.assign(vec![b.var("f")], forces.clone()),
                b.assign(
                    vec![field("v")],
                    b.binary(
                        field("v"),
                        OperatorKind::Add,
                        b.binary(b.var("dt"), OperatorKind::Mul, b.var("f")),
                    ),
                ),
                b.assign(
                    vec![field("x")],
                    b.binary(
                        field("x"),
                        OperatorKind::Add,
                        b.binary(b.var("dt"), OperatorKind::Mul, field("v")),
                    ),
                ),
            ],
        );

        let main = b.procedure(
            "main",
            vec![],
            vec![],
            vec![b.for_range(
                "i",
                b.int(0),
                b.int(100),
                vec![b.expression_statement(b.call("step", vec![b.float(0.01)]))],
            )],
        );

        let source_file = b.source_file(vec![
            b.element_type(
                "Point",
                vec![("x", vec3()), ("v", vec3()), ("m", b.float_type())],
            ),
            b.element_type("Spring", vec![("k", b.float_type()), ("l0", b.float_type())]),
            b.extern_definition("points", b.set_type("Point", &[])),
            b.extern_definition("springs", b.set_type("Spring", &["points", "points"])),
            spring_force,
            step,
            main,
        ]);

        let ctx = type_check(&source_file);
        assert_no_errors(&ctx);
        assert_eq!(
            node_type(&ctx, &forces).as_deref(),
            Some("tensor[points](tensor[3](float))")
        );
        let names: Vec<String> = ctx.functions().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec!["spring_force", "step", "main"]);
        assert_eq!(ctx.element_types().len(), 2);
    }
}
