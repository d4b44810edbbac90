//! Special-form registry.
//!
//! Scheem has no procedures: every list is a special form selected by its
//! head symbol. The set of forms is closed, so it is modelled as the
//! [`SpecialForm`] enum. The registry maps each head symbol to a
//! [`FormSpec`] carrying the form tag and its operand-count rule; the head is
//! resolved once per list node and the evaluator then matches exhaustively
//! on the tag.
//!
//! ```scheme
//! (+ 1 2 3)            ; arithmetic, at least 1 operand
//! (- 5)                ; negation, 1 or 2 operands
//! (define x 1)         ; binding, exactly 2 operands
//! (if (= x 1) 'one)    ; conditional, 1 to 3 operands
//! ```
//!
//! ## Adding a form
//!
//! 1. Add a variant to [`SpecialForm`]
//! 2. Add its entry to `SPECIAL_FORMS` with the head symbol and arity
//! 3. Handle the new variant in the evaluator's dispatch (the compiler
//!    enforces this)
//! 4. Add tests for evaluation order, results and every failure case

use crate::Error;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Operand-count rule of a special form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many operands
    Exact(usize),
    /// This many operands or more
    AtLeast(usize),
    /// Inclusive range of operand counts
    Range(usize, usize),
    /// Any number of operands, including none
    Any,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(min) => count >= min,
            Arity::Range(min, max) => (min..=max).contains(&count),
            Arity::Any => true,
        }
    }
}

/// "operand" or "operands" to follow a count
fn operand_noun(count: usize) -> &'static str {
    if count == 1 { "operand" } else { "operands" }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Arity::Exact(n) => write!(f, "exactly {n} {}", operand_noun(n)),
            Arity::AtLeast(min) => write!(f, "at least {min} {}", operand_noun(min)),
            Arity::Range(min, max) => write!(f, "{min} to {max} {}", operand_noun(max)),
            Arity::Any => write!(f, "any number of operands"),
        }
    }
}

/// The closed set of operators a list head can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialForm {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Define,
    Set,
    Begin,
    Quote,
    Cons,
    Car,
    Cdr,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    If,
}

/// Definition of a special form
#[derive(Debug, Clone, PartialEq)]
pub struct FormSpec {
    /// The head symbol selecting this form
    pub id: &'static str,
    pub form: SpecialForm,
    /// Accepted number of operands (elements after the head)
    pub arity: Arity,
}

impl FormSpec {
    /// Check the operand count of a use of this form
    pub fn validate_arity(&self, operand_count: usize) -> Result<(), Error> {
        if self.arity.accepts(operand_count) {
            Ok(())
        } else {
            Err(Error::arity_error(self.id, self.arity, operand_count))
        }
    }
}

/// Every special form, in the order they are documented.
static SPECIAL_FORMS: &[FormSpec] = &[
    // Arithmetic
    FormSpec {
        id: "+",
        form: SpecialForm::Add,
        arity: Arity::AtLeast(1),
    },
    FormSpec {
        id: "-",
        form: SpecialForm::Sub,
        arity: Arity::Range(1, 2),
    },
    FormSpec {
        id: "*",
        form: SpecialForm::Mul,
        arity: Arity::AtLeast(1),
    },
    FormSpec {
        id: "/",
        form: SpecialForm::Div,
        arity: Arity::Exact(2),
    },
    FormSpec {
        id: "%",
        form: SpecialForm::Rem,
        arity: Arity::Exact(2),
    },
    // Bindings
    FormSpec {
        id: "define",
        form: SpecialForm::Define,
        arity: Arity::Exact(2),
    },
    FormSpec {
        id: "set!",
        form: SpecialForm::Set,
        arity: Arity::Exact(2),
    },
    // Sequencing and data
    FormSpec {
        id: "begin",
        form: SpecialForm::Begin,
        arity: Arity::Any,
    },
    FormSpec {
        id: "quote",
        form: SpecialForm::Quote,
        arity: Arity::Exact(1),
    },
    // Lists
    FormSpec {
        id: "cons",
        form: SpecialForm::Cons,
        arity: Arity::Exact(2),
    },
    FormSpec {
        id: "car",
        form: SpecialForm::Car,
        arity: Arity::Exact(1),
    },
    FormSpec {
        id: "cdr",
        form: SpecialForm::Cdr,
        arity: Arity::Exact(1),
    },
    // Comparison
    FormSpec {
        id: "=",
        form: SpecialForm::Eq,
        arity: Arity::Exact(2),
    },
    FormSpec {
        id: "<>",
        form: SpecialForm::NotEq,
        arity: Arity::Exact(2),
    },
    FormSpec {
        id: "<",
        form: SpecialForm::Lt,
        arity: Arity::Exact(2),
    },
    FormSpec {
        id: ">",
        form: SpecialForm::Gt,
        arity: Arity::Exact(2),
    },
    FormSpec {
        id: "<=",
        form: SpecialForm::Le,
        arity: Arity::Exact(2),
    },
    FormSpec {
        id: ">=",
        form: SpecialForm::Ge,
        arity: Arity::Exact(2),
    },
    // Control flow
    FormSpec {
        id: "if",
        form: SpecialForm::If,
        arity: Arity::Range(1, 3),
    },
];

static FORMS_BY_ID: LazyLock<HashMap<&'static str, &'static FormSpec>> =
    LazyLock::new(|| SPECIAL_FORMS.iter().map(|spec| (spec.id, spec)).collect());

/// All special forms
pub fn all_forms() -> &'static [FormSpec] {
    SPECIAL_FORMS
}

/// Find a special form by its head symbol
pub fn find_form(id: &str) -> Option<&'static FormSpec> {
    FORMS_BY_ID.get(id).copied()
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;

    #[test]
    fn test_form_registry() {
        let add = find_form("+").unwrap();
        assert_eq!(add.form, SpecialForm::Add);
        assert_eq!(add.arity, Arity::AtLeast(1));

        let set = find_form("set!").unwrap();
        assert_eq!(set.form, SpecialForm::Set);
        assert!(std::ptr::eq(set, &all_forms()[6]));

        assert_eq!(find_form("if").unwrap().arity, Arity::Range(1, 3));
        assert_eq!(find_form("begin").unwrap().arity, Arity::Any);

        // Not forms: procedures from other Lisps, reserved atoms, case variants
        for id in ["lambda", "list", "error", "nil", "IF", "", "quote "] {
            assert!(find_form(id).is_none(), "{id:?} should not be a form");
        }

        // Ids are unique
        assert_eq!(FORMS_BY_ID.len(), all_forms().len());
    }

    #[test]
    fn test_arity_rules() {
        let cases = vec![
            (Arity::Exact(2), vec![(1, false), (2, true), (3, false)]),
            (Arity::AtLeast(1), vec![(0, false), (1, true), (50, true)]),
            (
                Arity::Range(1, 3),
                vec![(0, false), (1, true), (3, true), (4, false)],
            ),
            (Arity::Any, vec![(0, true), (7, true)]),
        ];
        for (arity, counts) in cases {
            for (count, expected) in counts {
                assert_eq!(arity.accepts(count), expected, "{arity:?} with {count}");
            }
        }
    }

    #[test]
    fn test_arity_display() {
        let cases = [
            (Arity::Exact(1), "exactly 1 operand"),
            (Arity::Exact(2), "exactly 2 operands"),
            (Arity::Exact(0), "exactly 0 operands"),
            (Arity::AtLeast(1), "at least 1 operand"),
            (Arity::Range(1, 3), "1 to 3 operands"),
            (Arity::Any, "any number of operands"),
        ];
        for (arity, expected) in cases {
            assert_eq!(arity.to_string(), expected);
        }

        let car = find_form("car").unwrap();
        assert_eq!(
            car.validate_arity(2).unwrap_err().to_string(),
            "ArityError: car expects exactly 1 operand, got 2"
        );
    }

    #[test]
    fn test_validate_arity_error() {
        let minus = find_form("-").unwrap();
        assert!(minus.validate_arity(1).is_ok());
        assert!(minus.validate_arity(2).is_ok());
        assert_eq!(
            minus.validate_arity(3),
            Err(Error::ArityError {
                form: "-",
                expected: Arity::Range(1, 2),
                got: 3
            })
        );
        assert_eq!(
            format!("{}", minus.validate_arity(0).unwrap_err()),
            "ArityError: - expects 1 to 2 operands, got 0"
        );
    }
}
