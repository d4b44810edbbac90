//! This module defines the two tree types of the interpreter. [`Sexpr`] is a
//! parsed program: numbers, symbols and lists exactly as the reader produced
//! them. [`Value`] is what evaluation returns: numbers, the two truth atoms,
//! quoted symbols, lists and the distinguished `nil` marker. Quoting promotes
//! an `Sexpr` to a `Value` with [`Value::from_sexpr`].
//!
//! Ergonomic builders such as [`sym`], [`num`], [`list`] and [`val`] construct
//! trees without going through the reader, which is how callers that bring
//! their own front end drive the evaluator. Conversion traits from Rust
//! literals, arrays and vectors are provided for both types.

use crate::Error;

/// Type alias for number values in interpreter
pub type NumberType = f64;

/// Evaluating this atom fails with [`Error::ExplicitError`]
pub const ERROR_ATOM: &str = "error";
/// Evaluating this atom yields [`Value::Nil`]
pub const NIL_ATOM: &str = "nil";
/// The true atom; the only value `if` treats as true
pub const TRUE_ATOM: &str = "#t";
/// The false atom
pub const FALSE_ATOM: &str = "#f";

/// Atoms with a fixed meaning, which can never be bound
const RESERVED_ATOMS: [&str; 4] = [ERROR_ATOM, NIL_ATOM, TRUE_ATOM, FALSE_ATOM];

/// Check if an atom is a numeric literal.
///
/// Numeric literals follow Rust's `f64` decimal grammar (`42`, `-3.5`, `.5`,
/// `1e3`) and must contain at least one digit, so `inf` and `nan` remain
/// symbols.
pub fn is_numeric_literal(atom: &str) -> bool {
    atom.bytes().any(|b| b.is_ascii_digit()) && atom.parse::<NumberType>().is_ok()
}

/// Check if a string can appear as a character of an atom
pub(crate) fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | ';')
}

/// Check if a string is a legal bare symbol name, i.e. something `define`
/// may bind. Valid: a non-empty run of atom characters that does not start
/// with a quote, is not a numeric literal and is not a reserved atom.
pub fn is_valid_symbol(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('\'')
        && name.chars().all(is_atom_char)
        && !is_numeric_literal(name)
        && !RESERVED_ATOMS.contains(&name)
}

/// A parsed S-expression.
///
/// To build a tree by hand, use the helper functions:
/// - `num(3)` for numbers, `sym("x")` for symbols
/// - `list([sym("+"), num(1), num(2)])` for lists
/// - `val(3)` / `val("x")` / `val([1, 2, 3])` for anything convertible
#[derive(Debug, Clone, PartialEq)]
pub enum Sexpr {
    Number(NumberType),
    Symbol(String),
    List(Vec<Sexpr>),
}

impl Sexpr {
    /// The symbol name, if this is a symbol atom
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Sexpr::Symbol(name) => Some(name),
            _ => None,
        }
    }
}

/// Result of evaluating an [`Sexpr`].
///
/// Equality is structural: numbers compare by value, symbols by name, lists
/// element-wise, and values of different kinds are never equal. `Nil` and the
/// empty list are distinct values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(NumberType),
    /// One of the two truth atoms, `#t` or `#f`
    Bool(bool),
    /// A symbol produced by quoting
    Symbol(String),
    /// An immutable ordered sequence
    List(Vec<Value>),
    /// The value of the reserved `nil` atom
    Nil,
}

impl Value {
    /// Promote quoted S-expression data to a value.
    ///
    /// The truth atoms become booleans so that quoted `#t` equals the result
    /// of a comparison; every other atom keeps its literal meaning.
    pub fn from_sexpr(expr: &Sexpr) -> Value {
        match expr {
            Sexpr::Number(n) => Value::Number(*n),
            Sexpr::Symbol(name) if name == TRUE_ATOM => Value::Bool(true),
            Sexpr::Symbol(name) if name == FALSE_ATOM => Value::Bool(false),
            Sexpr::Symbol(name) => Value::Symbol(name.clone()),
            Sexpr::List(elements) => crate::ensure_sufficient_stack(|| {
                Value::List(elements.iter().map(Value::from_sexpr).collect())
            }),
        }
    }

    /// Quote promotion that allows the datum to nest at most `budget`
    /// levels (the datum itself counts as one). Deeper data fails with
    /// [`Error::EvaluationLimitExceeded`] carrying `limit`.
    pub fn from_sexpr_bounded(expr: &Sexpr, budget: usize, limit: usize) -> Result<Value, Error> {
        if budget == 0 {
            return Err(Error::EvaluationLimitExceeded { limit });
        }
        match expr {
            Sexpr::List(elements) => crate::ensure_sufficient_stack(|| {
                elements
                    .iter()
                    .map(|element| Value::from_sexpr_bounded(element, budget - 1, limit))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }),
            atom => Ok(Value::from_sexpr(atom)),
        }
    }

    /// Only the true atom is true; no other value is coerced
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// Kind name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Nil => "nil",
        }
    }
}

// From trait implementations - enables .into() conversion for both trees

impl From<&str> for Sexpr {
    fn from(s: &str) -> Self {
        Sexpr::Symbol(s.to_owned())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Symbol(s.to_owned())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_number {
    ($($num_type:ty),+) => {
        $(
            impl From<$num_type> for Sexpr {
                fn from(n: $num_type) -> Self {
                    Sexpr::Number(NumberType::from(n))
                }
            }

            impl From<$num_type> for Value {
                fn from(n: $num_type) -> Self {
                    Value::Number(NumberType::from(n))
                }
            }
        )+
    };
}

// Every type here converts to f64 without loss
impl_from_number!(i8, i16, i32, u8, u16, u32, f32, f64);

impl<T: Into<Sexpr>> From<Vec<T>> for Sexpr {
    fn from(v: Vec<T>) -> Self {
        Sexpr::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Sexpr>, const N: usize> From<[T; N]> for Sexpr {
    fn from(arr: [T; N]) -> Self {
        Sexpr::List(arr.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::List(arr.into_iter().map(Into::into).collect())
    }
}

// Fallible conversions from `Value` back into primitive Rust types.

impl TryFrom<Value> for NumberType {
    type Error = Error;

    fn try_from(value: Value) -> Result<NumberType, Error> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(Error::TypeError(format!(
                "expected number, got {} {other}",
                other.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for Vec<Value> {
    type Error = Error;

    fn try_from(value: Value) -> Result<Vec<Value>, Error> {
        match value {
            Value::List(elements) => Ok(elements),
            other => Err(Error::TypeError(format!(
                "expected list, got {} {other}",
                other.type_name()
            ))),
        }
    }
}

/// Helper function for creating symbol atoms
pub fn sym<S: AsRef<str>>(name: S) -> Sexpr {
    Sexpr::Symbol(name.as_ref().to_owned())
}

/// Helper function for creating number atoms
pub fn num<N: Into<NumberType>>(n: N) -> Sexpr {
    Sexpr::Number(n.into())
}

/// Helper function for creating lists of mixed elements
pub fn list<I: IntoIterator<Item = Sexpr>>(elements: I) -> Sexpr {
    Sexpr::List(elements.into_iter().collect())
}

/// Helper function for creating any S-expression convertible from a Rust value
pub fn val<T: Into<Sexpr>>(value: T) -> Sexpr {
    value.into()
}

/// Write elements separated by single spaces inside parentheses
fn write_list<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    elements: &[T],
) -> std::fmt::Result {
    write!(f, "(")?;
    for (i, elem) in elements.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{elem}")?;
    }
    write!(f, ")")
}

impl std::fmt::Display for Sexpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sexpr::Number(n) => write!(f, "{n}"),
            Sexpr::Symbol(s) => write!(f, "{s}"),
            Sexpr::List(elements) => write_list(f, elements),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{}", if *b { TRUE_ATOM } else { FALSE_ATOM }),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::List(elements) => write_list(f, elements),
            Value::Nil => write!(f, "{NIL_ATOM}"),
        }
    }
}
