//! Coercion schemes: how each operator family picks its parameter types
//!
//! Common types come from lower-triangular tables indexed by the larger
//! and the smaller table index of the two operand types. The tables are
//! spelled out as match arms over those index pairs.

use crate::coercion::Coercion;
use crate::ty::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoercionScheme {
    /// Binary comparison
    CompOp,
    /// Comparison of one value against several (BETWEEN, IN, CASE)
    NAryCompOp,
    ArithOp,
    /// DIV, MOD and bit complement
    IntArithOp,
    LogicalOp,
    StringOp,
    BitOp,
    ObjectOp,
}

/// Operand types paired with the coercions that bring each argument there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeResult {
    pub param_types: Vec<Type>,
    pub coercions: Vec<Coercion>,
}

impl CoercionScheme {
    /// Choose parameter types for `op` applied to `args`, or `None` if the
    /// family has no version for them. `op` is the runtime operator name
    /// without the `op` prefix, e.g. `Subtract`.
    pub fn coerce(&self, op: &str, args: &[Type]) -> Option<SchemeResult> {
        let params = match self {
            CoercionScheme::CompOp => {
                let t = pairwise(args, comp_op_common)?;
                vec![t; args.len()]
            }
            CoercionScheme::NAryCompOp => {
                let t = nary_common(args)?;
                vec![t; args.len()]
            }
            CoercionScheme::ArithOp => arith_params(op, args)?,
            CoercionScheme::IntArithOp => {
                let t = pairwise(args, int_arith_common)?;
                vec![t; args.len()]
            }
            CoercionScheme::LogicalOp => vec![Type::Boolean; args.len()],
            CoercionScheme::StringOp => vec![Type::StringAny; args.len()],
            CoercionScheme::BitOp => vec![Type::Bigint; args.len()],
            CoercionScheme::ObjectOp => vec![Type::Object; args.len()],
        };

        let coercions = args
            .iter()
            .zip(&params)
            .map(|(a, p)| Coercion::between(*a, *p))
            .collect::<Option<Vec<_>>>()?;
        Some(SchemeResult {
            param_types: params,
            coercions,
        })
    }
}

/// Common type of two comparison operands, NULL included.
///
/// This is also the join used for the branches of CASE expressions.
pub fn common_type(a: Type, b: Type) -> Option<Type> {
    comp_op_common(a, b)
}

/// Apply a symmetric table to a unary or binary argument list; a unary
/// operand is looked up against itself. A NULL result becomes OBJECT.
fn pairwise(args: &[Type], table: fn(Type, Type) -> Option<Type>) -> Option<Type> {
    let t = match args {
        [a] => table(*a, *a)?,
        [a, b] => table(*a, *b)?,
        _ => return None,
    };
    Some(null_to_object(t))
}

fn null_to_object(t: Type) -> Type {
    if t == Type::Null {
        Type::Object
    } else {
        t
    }
}

/// Order two types by table index, larger first.
fn ordered(a: Type, b: Type) -> Option<(usize, usize)> {
    let (ia, ib) = (a.idx()?, b.idx()?);
    Some(if ia >= ib { (ia, ib) } else { (ib, ia) })
}

fn nary_common(args: &[Type]) -> Option<Type> {
    let (head, rest) = args.split_first()?;
    let mut common: Option<Type> = None;
    let mut mismatch = false;
    for other in rest {
        let t = comp_op_common(*head, *other)?;
        match common {
            None => common = Some(t),
            Some(c) if c != t => mismatch = true,
            Some(_) => {}
        }
    }
    let t = if mismatch {
        Type::Object
    } else {
        common.unwrap_or_else(|| head.generalize())
    };
    Some(null_to_object(t))
}

/// Widening among the number types.
fn number_common(hi: usize, lo: usize) -> Option<Type> {
    let t = match (hi, lo) {
        (IDX_DOUBLE, _) => Type::Double,
        (IDX_FLOAT, IDX_NUMERIC) => Type::Double,
        (IDX_FLOAT, _) => Type::Float,
        (IDX_NUMERIC, _) => Type::NumericAny,
        (IDX_BIGINT, _) => Type::Bigint,
        (IDX_INT, _) => Type::Int,
        (IDX_SHORT, _) => Type::Short,
        _ => return None,
    };
    Some(t)
}

fn is_number_idx(i: usize) -> bool {
    (IDX_SHORT..=IDX_DOUBLE).contains(&i)
}

fn comp_op_common(a: Type, b: Type) -> Option<Type> {
    let (hi, lo) = ordered(a, b)?;
    match (hi, lo) {
        (IDX_NULL, IDX_NULL) => Some(Type::Null),
        (_, IDX_NULL | IDX_OBJECT) => Type::of_idx(hi),
        (IDX_BOOLEAN, IDX_BOOLEAN) => Some(Type::Boolean),
        (IDX_STRING, IDX_STRING) => Some(Type::StringAny),
        (h, IDX_STRING) if is_number_idx(h) => Some(Type::Double),
        (h, l) if is_number_idx(h) && is_number_idx(l) => number_common(h, l),
        (IDX_DATE, IDX_STRING | IDX_DATE) => Some(Type::Date),
        (IDX_TIME, IDX_STRING | IDX_SHORT | IDX_INT | IDX_BIGINT | IDX_TIME) => Some(Type::Time),
        (IDX_DATETIME, IDX_STRING | IDX_DATE | IDX_DATETIME) => Some(Type::Datetime),
        (IDX_TIMESTAMP, IDX_STRING | IDX_SHORT | IDX_INT | IDX_BIGINT | IDX_DATE | IDX_TIMESTAMP) => {
            Some(Type::Timestamp)
        }
        (IDX_TIMESTAMP, IDX_DATETIME) => Some(Type::Datetime),
        _ => None,
    }
}

/// Number-only part of the comparison table. Strings are not implicitly
/// converted for arithmetic.
fn arith_common(a: Type, b: Type) -> Option<Type> {
    let (hi, lo) = ordered(a, b)?;
    match (hi, lo) {
        (IDX_NULL, IDX_NULL) => Some(Type::Null),
        (IDX_OBJECT, IDX_NULL | IDX_OBJECT) => Some(Type::Object),
        (h, IDX_NULL | IDX_OBJECT) if is_number_idx(h) => Type::of_idx(h),
        (h, l) if is_number_idx(h) && is_number_idx(l) => number_common(h, l),
        _ => None,
    }
}

/// Extra common types for subtraction between date/time values.
fn subtract_common(a: Type, b: Type) -> Option<Type> {
    let (hi, lo) = ordered(a, b)?;
    match (hi, lo) {
        (IDX_DATE, IDX_STRING) => Some(Type::Datetime),
        (IDX_DATE, IDX_DATE) => Some(Type::Date),
        (IDX_TIME, IDX_STRING | IDX_TIME) => Some(Type::Time),
        (IDX_DATETIME, IDX_STRING | IDX_DATE | IDX_DATETIME) => Some(Type::Datetime),
        (IDX_TIMESTAMP, IDX_STRING | IDX_DATETIME) => Some(Type::Datetime),
        (IDX_TIMESTAMP, IDX_DATE | IDX_TIMESTAMP) => Some(Type::Timestamp),
        _ => None,
    }
}

fn int_arith_common(a: Type, b: Type) -> Option<Type> {
    let (hi, lo) = ordered(a, b)?;
    let int_or_bigint = |i: usize| match i {
        IDX_SHORT => Type::Short,
        IDX_INT => Type::Int,
        _ => Type::Bigint,
    };
    match (hi, lo) {
        (IDX_NULL, IDX_NULL) => Some(Type::Null),
        (IDX_OBJECT, IDX_NULL | IDX_OBJECT) => Some(Type::Object),
        (h, IDX_NULL | IDX_OBJECT) if is_number_idx(h) => Some(int_or_bigint(h)),
        (h, l) if h == l && is_number_idx(h) => Some(int_or_bigint(h)),
        (h, l) if is_number_idx(h) && is_number_idx(l) => Some(Type::Bigint),
        _ => None,
    }
}

fn arith_params(op: &str, args: &[Type]) -> Option<Vec<Type>> {
    match args {
        [_] => Some(vec![pairwise(args, arith_common)?]),
        [l, r] => {
            if let Some(t) = arith_common(*l, *r) {
                return Some(vec![null_to_object(t); 2]);
            }
            if op == "Subtract" {
                if let Some(t) = subtract_common(*l, *r) {
                    return Some(vec![t; 2]);
                }
            }
            datetime_arith(op, *l, *r)
        }
        _ => None,
    }
}

/// A date/time value shifted by a number: the number is taken as BIGINT.
fn datetime_arith(op: &str, l: Type, r: Type) -> Option<Vec<Type>> {
    let number_or_null = |t: Type| t.is_numeric() || t == Type::Null;
    match op {
        "Add" | "Subtract" if l.is_datetime() && number_or_null(r) => Some(vec![l, Type::Bigint]),
        "Add" if number_or_null(l) && r.is_datetime() => Some(vec![Type::Bigint, r]),
        "Subtract" if l == Type::Null && r.is_datetime() => Some(vec![r, r]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(scheme: CoercionScheme, op: &str, args: &[Type]) -> Option<Vec<Type>> {
        scheme.coerce(op, args).map(|r| r.param_types)
    }

    #[test]
    fn test_comp_op_is_symmetric() {
        for i in 0..TABLE_SIZE {
            for j in 0..TABLE_SIZE {
                let (a, b) = (Type::of_idx(i).unwrap(), Type::of_idx(j).unwrap());
                assert_eq!(comp_op_common(a, b), comp_op_common(b, a), "{} {}", a, b);
            }
        }
    }

    #[test]
    fn test_comp_op_widening() {
        assert_eq!(comp_op_common(Type::Int, Type::Short), Some(Type::Int));
        assert_eq!(comp_op_common(Type::Int, Type::Bigint), Some(Type::Bigint));
        assert_eq!(comp_op_common(Type::Float, Type::Bigint), Some(Type::Float));
        assert_eq!(comp_op_common(Type::Float, Type::NumericAny), Some(Type::Double));
        assert_eq!(comp_op_common(Type::StringAny, Type::Int), Some(Type::Double));
        assert_eq!(comp_op_common(Type::Char(3), Type::Char(5)), Some(Type::StringAny));
        assert_eq!(comp_op_common(Type::Timestamp, Type::Datetime), Some(Type::Datetime));
        assert_eq!(comp_op_common(Type::Boolean, Type::Int), None);
        assert_eq!(comp_op_common(Type::Date, Type::Time), None);
    }

    #[test]
    fn test_comp_op_with_null_and_object() {
        assert_eq!(comp_op_common(Type::Null, Type::Null), Some(Type::Null));
        assert_eq!(comp_op_common(Type::Char(2), Type::Null), Some(Type::StringAny));
        assert_eq!(comp_op_common(Type::Object, Type::Date), Some(Type::Date));
        assert_eq!(
            params(CoercionScheme::CompOp, "Eq", &[Type::Null, Type::Null]),
            Some(vec![Type::Object, Type::Object])
        );
    }

    #[test]
    fn test_arith_rejects_strings() {
        assert_eq!(params(CoercionScheme::ArithOp, "Add", &[Type::StringAny, Type::Int]), None);
        assert_eq!(
            params(CoercionScheme::ArithOp, "Add", &[Type::Char(1), Type::Char(1)]),
            None
        );
        assert_eq!(
            params(CoercionScheme::ArithOp, "Add", &[Type::Int, Type::Bigint]),
            Some(vec![Type::Bigint, Type::Bigint])
        );
    }

    #[test]
    fn test_datetime_arith() {
        assert_eq!(
            params(CoercionScheme::ArithOp, "Add", &[Type::Date, Type::Int]),
            Some(vec![Type::Date, Type::Bigint])
        );
        assert_eq!(
            params(CoercionScheme::ArithOp, "Add", &[Type::Int, Type::Timestamp]),
            Some(vec![Type::Bigint, Type::Timestamp])
        );
        assert_eq!(
            params(CoercionScheme::ArithOp, "Subtract", &[Type::Date, Type::Date]),
            Some(vec![Type::Date, Type::Date])
        );
        assert_eq!(
            params(CoercionScheme::ArithOp, "Subtract", &[Type::Null, Type::Time]),
            Some(vec![Type::Time, Type::Time])
        );
        assert_eq!(params(CoercionScheme::ArithOp, "Add", &[Type::Date, Type::Date]), None);
        assert_eq!(params(CoercionScheme::ArithOp, "Neg", &[Type::Date]), None);
    }

    #[test]
    fn test_int_arith() {
        assert_eq!(
            params(CoercionScheme::IntArithOp, "Mod", &[Type::Int, Type::Int]),
            Some(vec![Type::Int, Type::Int])
        );
        assert_eq!(
            params(CoercionScheme::IntArithOp, "Mod", &[Type::Int, Type::Short]),
            Some(vec![Type::Bigint, Type::Bigint])
        );
        assert_eq!(
            params(CoercionScheme::IntArithOp, "BitCompli", &[Type::Short]),
            Some(vec![Type::Short])
        );
        assert_eq!(
            params(CoercionScheme::IntArithOp, "DivInt", &[Type::Double, Type::Int]),
            Some(vec![Type::Bigint, Type::Bigint])
        );
    }

    #[test]
    fn test_nary_mismatch_goes_to_object() {
        assert_eq!(
            params(CoercionScheme::NAryCompOp, "In", &[Type::Int, Type::Int, Type::Short]),
            Some(vec![Type::Int; 3])
        );
        assert_eq!(
            params(
                CoercionScheme::NAryCompOp,
                "In",
                &[Type::Int, Type::Bigint, Type::StringAny]
            ),
            Some(vec![Type::Object; 3])
        );
        assert_eq!(
            params(CoercionScheme::NAryCompOp, "In", &[Type::Int, Type::Boolean]),
            None
        );
        assert_eq!(
            params(CoercionScheme::NAryCompOp, "Between", &[Type::Null, Type::Null, Type::Null]),
            Some(vec![Type::Object; 3])
        );
    }

    #[test]
    fn test_fixed_target_schemes() {
        let r = CoercionScheme::StringOp
            .coerce("Concat", &[Type::Int, Type::Char(3)])
            .expect("both convert to string");
        assert_eq!(r.param_types, vec![Type::StringAny; 2]);
        assert!(r.coercions[1].is_identity());
        assert_eq!(CoercionScheme::LogicalOp.coerce("And", &[Type::Int, Type::Boolean]), None);
        assert_eq!(
            params(CoercionScheme::ObjectOp, "IsNull", &[Type::Date]),
            Some(vec![Type::Object])
        );
    }

    #[test]
    fn test_common_type_of_branches() {
        assert_eq!(common_type(Type::Null, Type::Int), Some(Type::Int));
        assert_eq!(common_type(Type::Null, Type::Null), Some(Type::Null));
        assert_eq!(common_type(Type::Cursor, Type::Int), None);
    }
}
