//! Operator registry and overload resolution
//!
//! Every operator of the runtime library is registered under its name
//! without the `op` prefix. An overload set shares one coercion scheme,
//! which turns argument types into the parameter types of exactly one
//! version.

use plcsql_types::{Coercion, CoercionScheme, Type};
use std::collections::HashMap;
use std::sync::OnceLock;

/// One version of an operator, e.g. `opAdd(Integer, Integer)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpSignature {
    pub name: &'static str,
    pub params: Vec<Type>,
    /// The last parameter repeats, as in `opIn(Integer o, Integer... arr)`
    pub variadic: bool,
    pub ret: Type,
}

impl OpSignature {
    /// Versions over TIMESTAMP live under a `Timestamp` suffixed name.
    pub fn has_timestamp_param(&self) -> bool {
        self.params.contains(&Type::Timestamp)
    }

    fn accepts(&self, params: &[Type]) -> bool {
        if self.variadic {
            match (self.params.split_last(), params.len() >= self.params.len()) {
                (Some((rest_ty, fixed)), true) => {
                    params[..fixed.len()] == *fixed
                        && params[fixed.len()..].iter().all(|p| p == rest_ty)
                }
                _ => false,
            }
        } else {
            self.params == params
        }
    }
}

#[derive(Debug, Clone)]
pub struct OverloadSet {
    pub scheme: CoercionScheme,
    pub signatures: Vec<OpSignature>,
}

/// All operators, keyed by name
#[derive(Debug, Clone)]
pub struct OperatorTable {
    sets: HashMap<&'static str, OverloadSet>,
}

const NUMBERS: [Type; 6] = [
    Type::Short,
    Type::Int,
    Type::Bigint,
    Type::NumericAny,
    Type::Float,
    Type::Double,
];

const DATETIMES: [Type; 4] = [Type::Date, Type::Time, Type::Datetime, Type::Timestamp];

const INTEGERS: [Type; 3] = [Type::Short, Type::Int, Type::Bigint];

impl Default for OperatorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorTable {
    pub fn new() -> Self {
        let mut table = OperatorTable {
            sets: HashMap::new(),
        };
        table.register_comparisons();
        table.register_arithmetic();
        table.register_others();
        table
    }

    /// The table shared by every compilation in the process.
    pub fn shared() -> &'static OperatorTable {
        static TABLE: OnceLock<OperatorTable> = OnceLock::new();
        TABLE.get_or_init(OperatorTable::new)
    }

    fn add(&mut self, scheme: CoercionScheme, name: &'static str, params: Vec<Type>, ret: Type) {
        self.add_sig(
            scheme,
            OpSignature {
                name,
                params,
                variadic: false,
                ret,
            },
        );
    }

    fn add_sig(&mut self, scheme: CoercionScheme, sig: OpSignature) {
        self.sets
            .entry(sig.name)
            .or_insert_with(|| OverloadSet {
                scheme,
                signatures: Vec::new(),
            })
            .signatures
            .push(sig);
    }

    fn register_comparisons(&mut self) {
        for name in ["Eq", "NullSafeEq", "Neq", "Le", "Ge", "Lt", "Gt"] {
            for t in Type::VALUE_TYPES {
                self.add(CoercionScheme::CompOp, name, vec![t, t], Type::Boolean);
            }
        }
        for t in Type::VALUE_TYPES {
            self.add(CoercionScheme::NAryCompOp, "Between", vec![t, t, t], Type::Boolean);
            self.add_sig(
                CoercionScheme::NAryCompOp,
                OpSignature {
                    name: "In",
                    params: vec![t, t],
                    variadic: true,
                    ret: Type::Boolean,
                },
            );
        }
    }

    fn register_arithmetic(&mut self) {
        let arith = CoercionScheme::ArithOp;
        for t in NUMBERS.into_iter().chain([Type::Object]) {
            for name in ["Add", "Subtract", "Mult", "Div"] {
                self.add(arith, name, vec![t, t], t);
            }
            self.add(arith, "Neg", vec![t], t);
        }
        for t in DATETIMES {
            self.add(arith, "Add", vec![t, Type::Bigint], t);
            self.add(arith, "Add", vec![Type::Bigint, t], t);
            self.add(arith, "Subtract", vec![t, Type::Bigint], t);
            self.add(arith, "Subtract", vec![t, t], Type::Bigint);
        }

        let int_arith = CoercionScheme::IntArithOp;
        for t in INTEGERS.into_iter().chain([Type::Object]) {
            self.add(int_arith, "DivInt", vec![t, t], t);
            self.add(int_arith, "Mod", vec![t, t], t);
        }
        for t in INTEGERS {
            self.add(int_arith, "BitCompli", vec![t], Type::Bigint);
        }
        self.add(int_arith, "BitCompli", vec![Type::Object], Type::Object);

        for name in ["BitAnd", "BitOr", "BitXor", "BitShiftLeft", "BitShiftRight"] {
            self.add(
                CoercionScheme::BitOp,
                name,
                vec![Type::Bigint, Type::Bigint],
                Type::Bigint,
            );
        }
    }

    fn register_others(&mut self) {
        let logical = CoercionScheme::LogicalOp;
        for name in ["And", "Or", "Xor"] {
            self.add(logical, name, vec![Type::Boolean, Type::Boolean], Type::Boolean);
        }
        self.add(logical, "Not", vec![Type::Boolean], Type::Boolean);

        self.add(
            CoercionScheme::StringOp,
            "Concat",
            vec![Type::StringAny, Type::StringAny],
            Type::StringAny,
        );
        self.add(
            CoercionScheme::StringOp,
            "Like",
            vec![Type::StringAny; 3],
            Type::Boolean,
        );

        self.add(CoercionScheme::ObjectOp, "IsNull", vec![Type::Object], Type::Boolean);
    }

    pub fn get(&self, name: &str) -> Option<&OverloadSet> {
        self.sets.get(name)
    }

    /// Pick the version of `name` for `args`, with the coercion each
    /// argument needs to reach its parameter type.
    pub fn resolve(&self, name: &str, args: &[Type]) -> Option<(&OpSignature, Vec<Coercion>)> {
        let set = self.sets.get(name)?;
        let chosen = set.scheme.coerce(name, args)?;
        let sig = set
            .signatures
            .iter()
            .find(|sig| sig.accepts(&chosen.param_types))?;
        Some((sig, chosen.coercions))
    }
}
