use crate::ast::{ERROR_ATOM, NIL_ATOM, NumberType, Sexpr, Value, is_valid_symbol};
use crate::specialforms::{FormSpec, SpecialForm, find_form};
use crate::{Error, MAX_EVAL_DEPTH, ensure_sufficient_stack};

mod environment;

pub use environment::Environment;

/// Evaluator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum expression nesting depth; deeper evaluation fails with
    /// [`Error::EvaluationLimitExceeded`]
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: MAX_EVAL_DEPTH,
        }
    }
}

/// Current nesting level, carried down the recursion
#[derive(Debug, Clone, Copy)]
struct Depth {
    level: usize,
    limit: usize,
}

impl Depth {
    fn root(config: &EvalConfig) -> Self {
        Depth {
            level: 0,
            limit: config.max_depth,
        }
    }

    fn deeper(self) -> Self {
        Depth {
            level: self.level + 1,
            ..self
        }
    }
}

/// Evaluate an S-expression against `env` (public API)
pub fn evaluate(expr: &Sexpr, env: &mut Environment) -> Result<Value, Error> {
    evaluate_with_config(expr, env, &EvalConfig::default())
}

/// Evaluate an S-expression with explicit evaluator settings
#[tracing::instrument(level = "debug", skip_all)]
pub fn evaluate_with_config(
    expr: &Sexpr,
    env: &mut Environment,
    config: &EvalConfig,
) -> Result<Value, Error> {
    eval_with_depth_tracking(expr, env, Depth::root(config))
}

/// Evaluate an S-expression in a fresh, empty environment
pub fn evaluate_isolated(expr: &Sexpr) -> Result<Value, Error> {
    let mut env = Environment::new();
    evaluate(expr, &mut env)
}

/// Parse `source` and evaluate the resulting expression against `env`
#[cfg(feature = "scheme")]
pub fn evaluate_source(source: &str, env: &mut Environment) -> Result<Value, Error> {
    let expr = crate::scheme::parse_scheme(source)?;
    evaluate(&expr, env)
}

/// Parse `source` and evaluate it in a fresh, empty environment
#[cfg(feature = "scheme")]
pub fn evaluate_source_isolated(source: &str) -> Result<Value, Error> {
    let mut env = Environment::new();
    evaluate_source(source, &mut env)
}

/// Evaluate an S-expression with depth tracking to prevent stack overflow
fn eval_with_depth_tracking(
    expr: &Sexpr,
    env: &mut Environment,
    depth: Depth,
) -> Result<Value, Error> {
    if depth.level >= depth.limit {
        tracing::debug!(limit = depth.limit, "evaluation depth limit exceeded");
        return Err(Error::EvaluationLimitExceeded { limit: depth.limit });
    }
    match expr {
        // Reserved atoms take precedence over variable lookup
        Sexpr::Symbol(name) if name == ERROR_ATOM => Err(Error::ExplicitError),
        Sexpr::Symbol(name) if name == NIL_ATOM => Ok(Value::Nil),

        Sexpr::Number(n) => Ok(Value::Number(*n)),

        // Variable lookup
        Sexpr::Symbol(name) => env
            .lookup(name)
            .cloned()
            .ok_or_else(|| Error::UnboundSymbol(name.clone())),

        Sexpr::List(elements) => ensure_sufficient_stack(|| eval_list(elements, env, depth))
            .map_err(|err| add_context(err, expr)),
    }
}

const CONTEXT_PREFIX: &str = "\n  Context: while evaluating: ";

/// Attach the innermost failing expression to free-text errors
fn add_context(error: Error, expr: &Sexpr) -> Error {
    match error {
        Error::TypeError(msg) if !msg.contains(CONTEXT_PREFIX) => {
            Error::TypeError(format!("{msg}{CONTEXT_PREFIX}{expr}"))
        }
        // Other kinds already name what went wrong
        other => other,
    }
}

/// Evaluate a list: resolve the head to a special form, check its operand
/// count and dispatch
fn eval_list(elements: &[Sexpr], env: &mut Environment, depth: Depth) -> Result<Value, Error> {
    let [head, operands @ ..] = elements else {
        return Err(Error::UnknownOperator("()".to_owned()));
    };

    let spec = head
        .as_symbol()
        .and_then(find_form)
        .ok_or_else(|| Error::UnknownOperator(head.to_string()))?;
    spec.validate_arity(operands.len())?;

    tracing::trace!(form = spec.id, operands = operands.len(), "dispatch");

    let depth = depth.deeper();
    match spec.form {
        SpecialForm::Add => eval_fold(spec, operands, env, depth, |a, b| a + b),
        SpecialForm::Mul => eval_fold(spec, operands, env, depth, |a, b| a * b),
        SpecialForm::Sub => eval_sub(spec, operands, env, depth),
        SpecialForm::Div => eval_division(spec, operands, env, depth, |a, b| a / b),
        SpecialForm::Rem => eval_division(spec, operands, env, depth, |a, b| a % b),
        SpecialForm::Define => eval_define(spec, operands, env, depth),
        SpecialForm::Set => eval_set(spec, operands, env, depth),
        SpecialForm::Begin => eval_begin(operands, env, depth),
        SpecialForm::Quote => eval_quote(spec, operands, depth),
        SpecialForm::Cons => eval_cons(spec, operands, env, depth),
        SpecialForm::Car => eval_car(spec, operands, env, depth),
        SpecialForm::Cdr => eval_cdr(spec, operands, env, depth),
        SpecialForm::Eq => {
            let (lhs, rhs) = eval_pair(spec, operands, env, depth)?;
            Ok(Value::Bool(lhs == rhs))
        }
        SpecialForm::NotEq => {
            let (lhs, rhs) = eval_pair(spec, operands, env, depth)?;
            Ok(Value::Bool(lhs != rhs))
        }
        SpecialForm::Lt => eval_lt(spec, operands, env, depth),
        SpecialForm::Gt => eval_gt(spec, operands, env, depth),
        SpecialForm::Le => eval_le(spec, operands, env, depth),
        SpecialForm::Ge => eval_ge(spec, operands, env, depth),
        SpecialForm::If => eval_if(spec, operands, env, depth),
    }
}

/// Error for operand slices whose length disagrees with the form's arity.
/// Arity is validated before dispatch, so this only guards the slice patterns.
fn operand_count_error(spec: &FormSpec, operands: &[Sexpr]) -> Error {
    Error::arity_error(spec.id, spec.arity, operands.len())
}

/// Prefix a conversion failure with the form that rejected the value
fn name_form(spec: &FormSpec, err: Error) -> Error {
    match err {
        Error::TypeError(msg) => Error::TypeError(format!("{} {msg}", spec.id)),
        other => other,
    }
}

/// Require a Number, naming the form in the error
fn expect_number(spec: &FormSpec, value: Value) -> Result<NumberType, Error> {
    NumberType::try_from(value).map_err(|err| name_form(spec, err))
}

/// Require a List, naming the form in the error
fn expect_list(spec: &FormSpec, value: Value) -> Result<Vec<Value>, Error> {
    Vec::<Value>::try_from(value).map_err(|err| name_form(spec, err))
}

fn eval_number(
    spec: &FormSpec,
    expr: &Sexpr,
    env: &mut Environment,
    depth: Depth,
) -> Result<NumberType, Error> {
    let value = eval_with_depth_tracking(expr, env, depth)?;
    expect_number(spec, value)
}

/// Evaluate exactly two operands, left to right
fn eval_pair(
    spec: &FormSpec,
    operands: &[Sexpr],
    env: &mut Environment,
    depth: Depth,
) -> Result<(Value, Value), Error> {
    let [lhs, rhs] = operands else {
        return Err(operand_count_error(spec, operands));
    };
    let lhs = eval_with_depth_tracking(lhs, env, depth)?;
    let rhs = eval_with_depth_tracking(rhs, env, depth)?;
    Ok((lhs, rhs))
}

/// `+` and `*`: fold one or more Number operands
fn eval_fold(
    spec: &FormSpec,
    operands: &[Sexpr],
    env: &mut Environment,
    depth: Depth,
    op: fn(NumberType, NumberType) -> NumberType,
) -> Result<Value, Error> {
    let [first, rest @ ..] = operands else {
        return Err(operand_count_error(spec, operands));
    };
    let mut acc = eval_number(spec, first, env, depth)?;
    for operand in rest {
        acc = op(acc, eval_number(spec, operand, env, depth)?);
    }
    Ok(Value::Number(acc))
}

/// `-`: negation with one operand, subtraction with two
fn eval_sub(
    spec: &FormSpec,
    operands: &[Sexpr],
    env: &mut Environment,
    depth: Depth,
) -> Result<Value, Error> {
    match operands {
        [operand] => Ok(Value::Number(-eval_number(spec, operand, env, depth)?)),
        [lhs, rhs] => {
            let lhs = eval_number(spec, lhs, env, depth)?;
            let rhs = eval_number(spec, rhs, env, depth)?;
            Ok(Value::Number(lhs - rhs))
        }
        _ => Err(operand_count_error(spec, operands)),
    }
}

/// `/` and `%`: both operands are evaluated and type-checked before the
/// divisor is tested for zero
fn eval_division(
    spec: &FormSpec,
    operands: &[Sexpr],
    env: &mut Environment,
    depth: Depth,
    op: fn(NumberType, NumberType) -> NumberType,
) -> Result<Value, Error> {
    let [dividend, divisor] = operands else {
        return Err(operand_count_error(spec, operands));
    };
    let dividend = eval_number(spec, dividend, env, depth)?;
    let divisor = eval_number(spec, divisor, env, depth)?;
    if divisor == 0.0 {
        return Err(Error::DivisionByZero(spec.id));
    }
    Ok(Value::Number(op(dividend, divisor)))
}

/// The literal symbol a binding form targets
fn binding_target(target: &Sexpr) -> Result<&str, Error> {
    match target {
        Sexpr::Symbol(name) if is_valid_symbol(name) => Ok(name),
        other => Err(Error::InvalidSymbol(other.to_string())),
    }
}

/// `define`: bind a fresh symbol, returning the sentinel 0
fn eval_define(
    spec: &FormSpec,
    operands: &[Sexpr],
    env: &mut Environment,
    depth: Depth,
) -> Result<Value, Error> {
    let [target, expr] = operands else {
        return Err(operand_count_error(spec, operands));
    };
    let name = binding_target(target)?;
    if env.is_bound(name) {
        return Err(Error::AlreadyDefined(name.to_owned()));
    }

    let value = eval_with_depth_tracking(expr, env, depth)?;
    // The value expression may itself have defined `name`
    env.bind(name, value)?;
    tracing::debug!(symbol = name, "define");
    Ok(Value::Number(0.0))
}

/// `set!`: rebind an existing symbol, returning the new value
fn eval_set(
    spec: &FormSpec,
    operands: &[Sexpr],
    env: &mut Environment,
    depth: Depth,
) -> Result<Value, Error> {
    let [target, expr] = operands else {
        return Err(operand_count_error(spec, operands));
    };
    let name = binding_target(target)?;
    if !env.is_bound(name) {
        return Err(Error::NotDefined(name.to_owned()));
    }

    let value = eval_with_depth_tracking(expr, env, depth)?;
    env.rebind(name, value.clone())?;
    tracing::debug!(symbol = name, "set!");
    Ok(value)
}

/// `begin`: evaluate in order, returning the last value (nil when empty)
fn eval_begin(operands: &[Sexpr], env: &mut Environment, depth: Depth) -> Result<Value, Error> {
    let mut result = Value::Nil;
    for operand in operands {
        result = eval_with_depth_tracking(operand, env, depth)?;
    }
    Ok(result)
}

/// `quote`: return the operand as data. The datum shares the nesting budget
/// of the evaluation it appears in.
fn eval_quote(spec: &FormSpec, operands: &[Sexpr], depth: Depth) -> Result<Value, Error> {
    match operands {
        [datum] => {
            let budget = depth.limit.saturating_sub(depth.level);
            Value::from_sexpr_bounded(datum, budget, depth.limit)
        }
        _ => Err(operand_count_error(spec, operands)),
    }
}

/// `cons`: prepend to a copy of a list
fn eval_cons(
    spec: &FormSpec,
    operands: &[Sexpr],
    env: &mut Environment,
    depth: Depth,
) -> Result<Value, Error> {
    let (head, tail) = eval_pair(spec, operands, env, depth)?;
    let tail = expect_list(spec, tail)?;
    let mut list = Vec::with_capacity(tail.len() + 1);
    list.push(head);
    list.extend(tail);
    Ok(Value::List(list))
}

/// Evaluate the single operand of `car`/`cdr` and split the non-empty list
/// it must produce
fn eval_split_list(
    spec: &FormSpec,
    operands: &[Sexpr],
    env: &mut Environment,
    depth: Depth,
) -> Result<(Value, std::vec::IntoIter<Value>), Error> {
    let [operand] = operands else {
        return Err(operand_count_error(spec, operands));
    };
    let value = eval_with_depth_tracking(operand, env, depth)?;
    let mut iter = expect_list(spec, value)?.into_iter();
    match iter.next() {
        Some(first) => Ok((first, iter)),
        None => Err(Error::TypeError(format!("{} of empty list", spec.id))),
    }
}

fn eval_car(
    spec: &FormSpec,
    operands: &[Sexpr],
    env: &mut Environment,
    depth: Depth,
) -> Result<Value, Error> {
    let (first, _) = eval_split_list(spec, operands, env, depth)?;
    Ok(first)
}

fn eval_cdr(
    spec: &FormSpec,
    operands: &[Sexpr],
    env: &mut Environment,
    depth: Depth,
) -> Result<Value, Error> {
    let (_, rest) = eval_split_list(spec, operands, env, depth)?;
    Ok(Value::List(rest.collect()))
}

// Macro to generate numeric ordering forms. Both operands are evaluated
// before either is type-checked.
macro_rules! numeric_comparison {
    ($name:ident, $op:tt) => {
        fn $name(
            spec: &FormSpec,
            operands: &[Sexpr],
            env: &mut Environment,
            depth: Depth,
        ) -> Result<Value, Error> {
            let (lhs, rhs) = eval_pair(spec, operands, env, depth)?;
            let lhs = expect_number(spec, lhs)?;
            let rhs = expect_number(spec, rhs)?;
            Ok(Value::Bool(lhs $op rhs))
        }
    };
}

numeric_comparison!(eval_lt, <);
numeric_comparison!(eval_gt, >);
numeric_comparison!(eval_le, <=);
numeric_comparison!(eval_ge, >=);

/// `if`: only the true atom selects the consequent. A missing branch yields
/// the truth atom matching the condition.
fn eval_if(
    spec: &FormSpec,
    operands: &[Sexpr],
    env: &mut Environment,
    depth: Depth,
) -> Result<Value, Error> {
    let [condition, branches @ ..] = operands else {
        return Err(operand_count_error(spec, operands));
    };
    if eval_with_depth_tracking(condition, env, depth)?.is_true() {
        match branches.first() {
            Some(consequent) => eval_with_depth_tracking(consequent, env, depth),
            None => Ok(Value::Bool(true)),
        }
    } else {
        match branches.get(1) {
            Some(alternative) => eval_with_depth_tracking(alternative, env, depth),
            None => Ok(Value::Bool(false)),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tree_tests {
    //! Evaluation of hand-built trees, independent of the reader
    use super::*;
    use crate::ast::{list, num, sym, val};
    use pretty_assertions::assert_eq;

    fn quote(datum: Sexpr) -> Sexpr {
        list([sym("quote"), datum])
    }

    #[test]
    fn test_define_then_set_round_trip() {
        let mut env = Environment::new();

        let result = evaluate(&list([sym("define"), sym("a"), num(3)]), &mut env).unwrap();
        assert_eq!(result, Value::from(0));
        assert_eq!(env, [("a", Value::from(3))].into_iter().collect::<Environment>());

        let set = list([sym("set!"), sym("a"), val(vec![val("+"), val(1), val(2)])]);
        assert_eq!(evaluate(&set, &mut env).unwrap(), Value::from(3));
        assert_eq!(env.lookup("a"), Some(&Value::from(3)));

        assert_eq!(
            evaluate(&list([sym("define"), sym("a"), num(4)]), &mut env),
            Err(Error::AlreadyDefined("a".into()))
        );
        assert_eq!(env.lookup("a"), Some(&Value::from(3)));
    }

    #[test]
    fn test_define_keeps_other_bindings() {
        let mut env: Environment = [("b", Value::from(1))].into_iter().collect();
        evaluate(&list([sym("define"), sym("a"), num(3)]), &mut env).unwrap();
        assert_eq!(
            env,
            [("a", Value::from(3)), ("b", Value::from(1))]
                .into_iter()
                .collect::<Environment>()
        );
    }

    #[test]
    fn test_define_rejects_number_disguised_as_symbol() {
        let cases = vec![
            list([sym("define"), sym("5"), num(3)]),
            list([sym("define"), num(5), num(3)]),
            list([sym("define"), sym("nil"), num(3)]),
            list([sym("define"), val([1]), num(3)]),
            list([sym("set!"), num(5), num(3)]),
        ];
        for expr in cases {
            let mut env = Environment::new();
            let result = evaluate(&expr, &mut env);
            assert!(
                matches!(result, Err(Error::InvalidSymbol(_))),
                "{expr}: got {result:?}"
            );
            assert!(env.is_empty());
        }
    }

    #[test]
    fn test_define_value_defining_same_symbol() {
        // (define a (begin (define a 1) 2))
        let inner = list([sym("begin"), list([sym("define"), sym("a"), num(1)]), num(2)]);
        let mut env = Environment::new();
        assert_eq!(
            evaluate(&list([sym("define"), sym("a"), inner]), &mut env),
            Err(Error::AlreadyDefined("a".into()))
        );
        assert_eq!(env.lookup("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_set_before_evaluating_value() {
        // The unbound check happens before the value expression runs
        let mut env = Environment::new();
        let expr = list([sym("set!"), sym("a"), list([sym("define"), sym("b"), num(1)])]);
        assert_eq!(
            evaluate(&expr, &mut env),
            Err(Error::NotDefined("a".into()))
        );
        assert!(!env.is_bound("b"));
    }

    #[test]
    fn test_cons_does_not_mutate_bound_list() {
        let mut env: Environment = [("l", Value::from([2, 3]))].into_iter().collect();
        let cons = list([sym("cons"), num(1), sym("l")]);

        assert_eq!(evaluate(&cons, &mut env).unwrap(), Value::from([1, 2, 3]));
        assert_eq!(evaluate(&cons, &mut env).unwrap(), Value::from([1, 2, 3]));
        assert_eq!(env.lookup("l"), Some(&Value::from([2, 3])));

        let quoted = quote(val([2, 3]));
        let cons_quoted = list([sym("cons"), num(1), quoted.clone()]);
        assert_eq!(
            evaluate_isolated(&cons_quoted).unwrap(),
            Value::from([1, 2, 3])
        );
        assert_eq!(evaluate_isolated(&quoted).unwrap(), Value::from([2, 3]));
    }

    #[test]
    fn test_quote_identity() {
        let data = vec![
            num(3),
            sym("dog"),
            val([1, 2, 3]),
            list([sym("+"), sym("x"), list([sym("error")])]),
            val(Vec::<Sexpr>::new()),
        ];
        for datum in data {
            let result = evaluate_isolated(&quote(datum.clone())).unwrap();
            assert_eq!(result, Value::from_sexpr(&datum));
        }
    }

    #[test]
    fn test_division_properties() {
        let pairs = [(7.0, 2.0), (-7.0, 2.0), (7.5, -2.0), (0.0, 3.0), (1.0, 3.0)];
        for (a, b) in pairs {
            let div = list([sym("/"), num(a), num(b)]);
            let rem = list([sym("%"), num(a), num(b)]);
            assert_eq!(evaluate_isolated(&div).unwrap(), Value::Number(a / b));
            assert_eq!(evaluate_isolated(&rem).unwrap(), Value::Number(a % b));
        }
        for form in ["/", "%"] {
            for zero in [0.0, -0.0] {
                let expr = list([sym(form), num(5), num(zero)]);
                assert_eq!(evaluate_isolated(&expr), Err(Error::DivisionByZero(form)));
            }
        }
    }

    #[test]
    fn test_evaluation_order_is_left_to_right() {
        // (begin (define x 1) (+ (set! x 10) x)) => 20
        let expr = list([
            sym("begin"),
            list([sym("define"), sym("x"), num(1)]),
            list([sym("+"), list([sym("set!"), sym("x"), num(10)]), sym("x")]),
        ]);
        assert_eq!(evaluate_isolated(&expr).unwrap(), Value::from(20));

        // The first failing operand wins
        let expr = list([sym("+"), sym("unbound"), sym("error")]);
        assert_eq!(
            evaluate_isolated(&expr),
            Err(Error::UnboundSymbol("unbound".into()))
        );
    }

    #[test]
    fn test_errors_abort_without_partial_effects_after_failure() {
        let mut env = Environment::new();
        let expr = list([
            sym("begin"),
            list([sym("define"), sym("a"), num(1)]),
            sym("error"),
            list([sym("define"), sym("b"), num(2)]),
        ]);
        assert_eq!(evaluate(&expr, &mut env), Err(Error::ExplicitError));
        // Effects before the failure persist, nothing after it runs
        assert!(env.is_bound("a"));
        assert!(!env.is_bound("b"));
    }

    #[test]
    fn test_unknown_operator_heads() {
        let cases = vec![
            (val(Vec::<Sexpr>::new()), "()"),
            (list([sym("lambda"), num(1)]), "lambda"),
            (list([num(1), num(2)]), "1"),
            (list([val([sym("+")]), num(2)]), "(+)"),
            (list([sym("error")]), "error"),
        ];
        for (expr, head) in cases {
            assert_eq!(
                evaluate_isolated(&expr),
                Err(Error::UnknownOperator(head.into())),
                "{expr}"
            );
        }
    }

    #[test]
    fn test_type_error_carries_context() {
        let expr = list([sym("*"), num(2), list([sym("+"), num(1), quote(sym("a"))])]);
        match evaluate_isolated(&expr) {
            Err(Error::TypeError(msg)) => {
                assert!(msg.starts_with("+ expected number, got symbol a"), "{msg}");
                // Only the innermost expression is attached
                assert!(msg.ends_with("while evaluating: (+ 1 (quote a))"), "{msg}");
            }
            other => panic!("expected TypeError, got {other:?}"),
        }
    }

    /// Build `(+ (+ ... (+ 1)))` nested `levels` deep
    fn nested_sum(levels: usize) -> Sexpr {
        (0..levels).fold(num(1), |inner, _| list([sym("+"), inner]))
    }

    #[test]
    fn test_evaluation_depth_limit() {
        let config = EvalConfig { max_depth: 16 };
        let mut env = Environment::new();

        assert_eq!(
            evaluate_with_config(&nested_sum(15), &mut env, &config).unwrap(),
            Value::from(1)
        );
        assert_eq!(
            evaluate_with_config(&nested_sum(16), &mut env, &config),
            Err(Error::EvaluationLimitExceeded { limit: 16 })
        );

        // The default limit also applies, without exhausting the native stack
        assert_eq!(
            evaluate(&nested_sum(MAX_EVAL_DEPTH + 10), &mut env),
            Err(Error::EvaluationLimitExceeded {
                limit: MAX_EVAL_DEPTH
            })
        );
        assert_eq!(
            evaluate(&nested_sum(MAX_EVAL_DEPTH - 1), &mut env).unwrap(),
            Value::from(1)
        );
    }

    /// Build `((...(1)...))` nested `levels` deep
    fn nested_list(levels: usize) -> Sexpr {
        (0..levels).fold(num(1), |inner, _| list([inner]))
    }

    #[test]
    fn test_quoted_data_shares_depth_limit() {
        let config = EvalConfig { max_depth: 16 };
        let mut env = Environment::new();

        // Same budget as (+ (+ ... 1)): the innermost atom must sit below the limit
        let shallow = quote(nested_list(14));
        assert_eq!(
            evaluate_with_config(&shallow, &mut env, &config).unwrap(),
            Value::from_sexpr(&nested_list(14))
        );
        assert_eq!(
            evaluate_with_config(&quote(nested_list(15)), &mut env, &config),
            Err(Error::EvaluationLimitExceeded { limit: 16 })
        );

        // Quoting under nested forms spends the remaining budget
        let under_forms = list([sym("car"), quote(nested_list(13))]);
        assert!(evaluate_with_config(&under_forms, &mut env, &config).is_ok());
        let under_forms = list([sym("car"), list([sym("cdr"), quote(nested_list(13))])]);
        assert_eq!(
            evaluate_with_config(&under_forms, &mut env, &config),
            Err(Error::EvaluationLimitExceeded { limit: 16 })
        );

        // Far deeper than the default limit: an error, not a stack overflow
        assert_eq!(
            evaluate_isolated(&quote(nested_list(MAX_EVAL_DEPTH * 4))),
            Err(Error::EvaluationLimitExceeded {
                limit: MAX_EVAL_DEPTH
            })
        );
    }
}
