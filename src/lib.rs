//! Scheem - a minimal, strictly typed Lisp-family expression evaluator
//!
//! Scheem programs are S-expressions evaluated against a fixed, closed set of
//! special forms. There are no user-defined procedures, no lambda and no
//! closures: a program is a tree of special forms operating on one flat,
//! mutable environment.
//!
//! ```scheme
//! (begin
//!   (define x 5)        ; bind x, returns 0
//!   (set! x (* x 2))    ; rebind x, returns 10
//!   (if (> x 7)
//!       (cons x '(1 2)) ; => (10 1 2)
//!       'small))
//! ```
//!
//! ## Strict semantics
//!
//! - Arithmetic only accepts numbers; nothing is coerced
//! - Only the true atom `#t` counts as true in `if`
//! - Every form checks its operand count
//! - `car`/`cdr` of an empty list is an error, never a fallback value
//! - Any error aborts the whole evaluation
//!
//! ## Modules
//!
//! - `ast`: parsed S-expressions and evaluation values
//! - `specialforms`: the special-form registry and arity rules
//! - `evaluator`: the evaluator and the binding environment
//! - `scheme`: S-expression reader (feature `scheme`)

use std::fmt;

use crate::specialforms::Arity;

/// Maximum nesting depth accepted by the reader
pub const MAX_PARSE_DEPTH: usize = 512;

/// Maximum recursion depth of the evaluator. Deeper programs fail with
/// [`Error::EvaluationLimitExceeded`] instead of exhausting the call stack.
/// Set higher than the parse depth so every readable program can run.
pub const MAX_EVAL_DEPTH: usize = 1024;

/// If less than this much stack remains, recursion grows the stack first
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f` with enough stack for one more level of reader or evaluator
/// recursion, growing the stack on the heap when it runs low.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    /// Unexpected token, such as a stray closing parenthesis
    InvalidSyntax,
    /// Input ended before the expression was complete (empty input, unclosed parens)
    Incomplete,
    /// Expression nesting exceeded the maximum parse depth
    TooDeeplyNested,
    /// Extra input found after a complete expression
    TrailingContent,
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Byte offset into the source where the error was detected
    pub position: usize,
    /// Context snippet from the input showing where the error occurred (max 100 chars)
    pub context: Option<String>,
    /// The problematic token or character encountered, if identifiable
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        position: usize,
        context: Option<String>,
        found: Option<String>,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            position,
            context,
            found,
        }
    }

    /// Create a ParseError with context extracted from input at a given byte offset
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
    ) -> Self {
        Self::with_context_and_found(kind, message, input, error_offset, None)
    }

    /// Create a ParseError with context and found token
    pub fn with_context_and_found(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
        found: Option<String>,
    ) -> Self {
        const MAX_CONTEXT: usize = 100;
        const LEAD_IN: usize = 20;

        // Clamp into the input and back onto a char boundary
        let mut error_offset = error_offset.min(input.len());
        while !input.is_char_boundary(error_offset) {
            error_offset -= 1;
        }

        // Back up a few characters so the snippet shows what led to the error
        let context_start = input[..error_offset]
            .char_indices()
            .rev()
            .nth(LEAD_IN - 1)
            .map_or(0, |(idx, _)| idx);

        let tail = &input[context_start..];
        let context_str: String = tail.chars().take(MAX_CONTEXT).collect();

        let mut display_context = String::new();
        if context_start > 0 {
            display_context.push_str("[...]");
        }
        display_context.push_str(&context_str);
        if context_str.len() < tail.len() {
            display_context.push_str("[...]");
        }

        let display_context = display_context.replace('\n', "\\n").replace('\r', "");

        Self::new(kind, message, error_offset, Some(display_context), found)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxError: {} (at position {})", self.message, self.position)?;
        if let Some(found) = &self.found {
            write!(f, "\nFound: {found}")?;
        }
        if let Some(context) = &self.context {
            write!(f, "\nContext: {context}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Every way reading or evaluating a Scheem program can fail.
///
/// Errors are never recovered inside the evaluator: the first one aborts the
/// whole top-level call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Malformed source text (reader only)
    #[error(transparent)]
    SyntaxError(#[from] ParseError),
    /// Wrong operand count for a special form
    #[error("ArityError: {form} expects {expected}, got {got}")]
    ArityError {
        form: &'static str,
        expected: Arity,
        got: usize,
    },
    /// Operand evaluated to the wrong kind of value
    #[error("Type error: {0}")]
    TypeError(String),
    /// Reference to a symbol with no binding
    #[error("Unbound symbol: {0}")]
    UnboundSymbol(String),
    /// `define` of a symbol that is already bound
    #[error("Symbol already defined: {0}")]
    AlreadyDefined(String),
    /// `set!` of a symbol that is not bound
    #[error("Symbol not defined: {0}")]
    NotDefined(String),
    /// Binding target is not a legal bare symbol name
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    /// `/` or `%` with a zero divisor
    #[error("Division by zero in '{0}'")]
    DivisionByZero(&'static str),
    /// List head that does not name a special form
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    /// The reserved `error` atom was evaluated
    #[error("Explicit error")]
    ExplicitError,
    /// Expression nesting exceeded the evaluator's recursion limit
    #[error("Evaluation depth limit exceeded (max: {limit})")]
    EvaluationLimitExceeded { limit: usize },
}

impl Error {
    pub fn arity_error(form: &'static str, expected: Arity, got: usize) -> Self {
        Error::ArityError {
            form,
            expected,
            got,
        }
    }
}

pub mod ast;
pub mod evaluator;
pub mod specialforms;

#[cfg(feature = "scheme")]
pub mod scheme;

pub use ast::{Sexpr, Value};
pub use evaluator::{Environment, EvalConfig, evaluate, evaluate_isolated, evaluate_with_config};

#[cfg(feature = "scheme")]
pub use evaluator::{evaluate_source, evaluate_source_isolated};
