//! Built-in functions available to every compilation unit.
//!
//! Intrinsics with declared parameters are checked like user functions.
//! Intrinsics declared without parameters are polymorphic: they accept any
//! argument list and only their result type is known to the checker.

use std::rc::Rc;

use crate::type_info::{Func, FuncKind, TypeInfo, Var};

const UNARY_FLOAT: &[&str] = &["sin", "cos", "tan", "asin", "acos", "sqrt", "log", "exp"];
const BINARY_FLOAT: &[&str] = &["atan2", "pow"];
const POLYMORPHIC_FLOAT: &[&str] = &["norm", "dot", "det", "clock"];

fn intrinsic(name: &str, arguments: Vec<TypeInfo>, result: TypeInfo) -> Func {
    let arguments = arguments
        .into_iter()
        .enumerate()
        .map(|(i, ty)| Rc::new(Var::new(format!("arg{i}"), Some(ty))))
        .collect();
    Func {
        name: name.to_string(),
        arguments,
        results: vec![Rc::new(Var::new("result", Some(result)))],
        body: None,
        kind: FuncKind::Intrinsic,
    }
}

/// Every intrinsic, in registration order.
#[must_use]
pub fn intrinsics() -> Vec<Func> {
    let mut funcs = Vec::new();
    for name in UNARY_FLOAT {
        funcs.push(intrinsic(name, vec![TypeInfo::float()], TypeInfo::float()));
    }
    for name in BINARY_FLOAT {
        funcs.push(intrinsic(
            name,
            vec![TypeInfo::float(), TypeInfo::float()],
            TypeInfo::float(),
        ));
    }
    funcs.push(intrinsic(
        "mod",
        vec![TypeInfo::int(), TypeInfo::int()],
        TypeInfo::int(),
    ));
    for name in POLYMORPHIC_FLOAT {
        funcs.push(intrinsic(name, Vec::new(), TypeInfo::float()));
    }
    funcs
}
