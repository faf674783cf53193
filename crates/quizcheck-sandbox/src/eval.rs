//! Fuel-bounded tree-walking evaluator for checker programs.
//!
//! Every AST node charged against the sandbox's step budget, so evaluation
//! terminates even when the snippet itself would not. The evaluator never
//! panics on snippet input: every misuse is a [`Fault`] the boundary maps to
//! a checker error.

use quizcheck_core::answer;
use quizcheck_core::ast::{BinOp, Expr, Program, Stmt, UnaryOp};
use quizcheck_core::error::ParseError;
use quizcheck_core::value::Value;
use thiserror::Error;

use crate::sandbox::Sandbox;

/// A failure raised during evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    /// A value parser rejected its input.
    #[error("{0}")]
    Parse(ParseError),

    /// The snippet referenced a name outside the allowed surface.
    #[error("name '{0}' is not available to checker code")]
    UnknownName(String),

    /// The step budget ran out.
    #[error("step budget exhausted")]
    Budget,

    /// A type or arity misuse.
    #[error("{0}")]
    Type(String),

    /// Division by zero or integer overflow.
    #[error("{0}")]
    Arithmetic(String),
}

/// Run a program to completion and return the value of the last executed
/// expression statement.
pub fn exec_program(program: &Program, sandbox: &mut Sandbox) -> Result<Value, Fault> {
    let mut last = None;
    exec_stmts(&program.stmts, sandbox, &mut last)?;
    last.ok_or_else(|| Fault::Type("checker produced no result".into()))
}

fn exec_stmts(
    stmts: &[Stmt],
    sandbox: &mut Sandbox,
    last: &mut Option<Value>,
) -> Result<(), Fault> {
    for stmt in stmts {
        sandbox.spend(1)?;
        match stmt {
            Stmt::Assign { name, value } => {
                let value = eval_expr(value, sandbox)?;
                sandbox.assign(name, value);
            }
            Stmt::While { cond, body } => loop {
                sandbox.spend(1)?;
                match eval_expr(cond, sandbox)? {
                    Value::Bool(true) => exec_stmts(body, sandbox, last)?,
                    Value::Bool(false) => break,
                    other => {
                        return Err(Fault::Type(format!(
                            "while condition must be bool, got {}",
                            other.type_name()
                        )))
                    }
                }
            },
            Stmt::Expr(expr) => {
                *last = Some(eval_expr(expr, sandbox)?);
            }
        }
    }
    Ok(())
}

fn eval_expr(expr: &Expr, sandbox: &mut Sandbox) -> Result<Value, Fault> {
    sandbox.spend(1)?;
    match expr {
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Ident(name) => sandbox.lookup(name),
        Expr::Call { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(arg, sandbox)?);
            }
            sandbox.call_builtin(name, &values)
        }
        Expr::Unary { op, operand } => {
            let value = eval_expr(operand, sandbox)?;
            match (op, value) {
                (UnaryOp::Neg, Value::Int(n)) => n
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| Fault::Arithmetic("integer overflow".into())),
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (op, value) => Err(Fault::Type(format!(
                    "operator '{op}' cannot be applied to {}",
                    value.type_name()
                ))),
            }
        }
        Expr::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, sandbox),
    }
}

fn eval_binary(
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
    sandbox: &mut Sandbox,
) -> Result<Value, Fault> {
    // Logical operators short-circuit; everything else evaluates both sides.
    match op {
        BinOp::And => {
            return match eval_expr(lhs, sandbox)? {
                Value::Bool(false) => Ok(Value::Bool(false)),
                Value::Bool(true) => expect_bool(op, eval_expr(rhs, sandbox)?),
                other => Err(type_mismatch(op, &other)),
            };
        }
        BinOp::Or => {
            return match eval_expr(lhs, sandbox)? {
                Value::Bool(true) => Ok(Value::Bool(true)),
                Value::Bool(false) => expect_bool(op, eval_expr(rhs, sandbox)?),
                other => Err(type_mismatch(op, &other)),
            };
        }
        _ => {}
    }

    let left = eval_expr(lhs, sandbox)?;
    let right = eval_expr(rhs, sandbox)?;

    match op {
        BinOp::Eq => Ok(Value::Bool(values_equal(&left, &right)?)),
        BinOp::Ne => Ok(Value::Bool(!values_equal(&left, &right)?)),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let a = coerce_int(&left)?;
            let b = coerce_int(&right)?;
            let result = match op {
                BinOp::Lt => a < b,
                BinOp::Le => a <= b,
                BinOp::Gt => a > b,
                BinOp::Ge => a >= b,
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
            let (Value::Int(a), Value::Int(b)) = (&left, &right) else {
                return Err(Fault::Type(format!(
                    "operator '{op}' expects int operands, got {} and {}",
                    left.type_name(),
                    right.type_name()
                )));
            };
            arith(op, *a, *b).map(Value::Int)
        }
        BinOp::And | BinOp::Or => unreachable!("handled above"),
    }
}

fn arith(op: BinOp, a: i64, b: i64) -> Result<i64, Fault> {
    let overflow = || Fault::Arithmetic("integer overflow".into());
    match op {
        BinOp::Add => a.checked_add(b).ok_or_else(overflow),
        BinOp::Sub => a.checked_sub(b).ok_or_else(overflow),
        BinOp::Mul => a.checked_mul(b).ok_or_else(overflow),
        BinOp::Div => {
            if b == 0 {
                Err(Fault::Arithmetic("division by zero".into()))
            } else {
                a.checked_div(b).ok_or_else(overflow)
            }
        }
        BinOp::Rem => {
            if b == 0 {
                Err(Fault::Arithmetic("division by zero".into()))
            } else {
                a.checked_rem(b).ok_or_else(overflow)
            }
        }
        _ => unreachable!(),
    }
}

/// Equality across the value types snippets see.
///
/// Text compared with an integer is coerced through the `distance` grammar:
/// submissions are free text while canonical values are integers, and
/// `submitted == distance("2km")` must grade `"2000m"` correct. The
/// underlying parse failure propagates so the author sees the real message.
fn values_equal(left: &Value, right: &Value) -> Result<bool, Fault> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
            Ok(answer::distance(s).map_err(Fault::Parse)? == *n)
        }
        (a, b) => Err(Fault::Type(format!(
            "cannot compare {} with {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// Ordering is numeric only; text coerces through the `distance` grammar.
fn coerce_int(value: &Value) -> Result<i64, Fault> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Str(s) => answer::distance(s).map_err(Fault::Parse),
        Value::Bool(_) => Err(Fault::Type("cannot order bool values".into())),
    }
}

fn expect_bool(op: BinOp, value: Value) -> Result<Value, Fault> {
    match value {
        Value::Bool(_) => Ok(value),
        other => Err(type_mismatch(op, &other)),
    }
}

fn type_mismatch(op: BinOp, value: &Value) -> Fault {
    Fault::Type(format!(
        "operator '{op}' expects bool operands, got {}",
        value.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizcheck_core::snippet::compile;

    const FUEL: u64 = 10_000;

    fn run(source: &str, submitted: &str, expected: Option<Value>) -> Result<Value, Fault> {
        let program = compile(source).unwrap();
        let mut sandbox = Sandbox::new(submitted, expected, FUEL);
        exec_program(&program, &mut sandbox)
    }

    #[test]
    fn literal_comparison() {
        assert_eq!(run("2000 == 2000", "", None).unwrap(), Value::Bool(true));
        assert_eq!(run("1 > 2", "", None).unwrap(), Value::Bool(false));
    }

    #[test]
    fn builtin_round_trip() {
        assert_eq!(
            run("distance(submitted) == 2000", "2км.", None).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            run("direction_angle(submitted) == 2030", "20 - 30", None).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn submitted_coerces_against_int() {
        // submitted is text; comparing to an int goes through the distance
        // grammar, so unit spellings agree.
        assert_eq!(
            run("submitted == distance('2km')", "2000m", None).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            run("submitted == distance('2km')", "1999m", None).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn coercion_failure_propagates_parse_fault() {
        let fault = run("submitted == 2000", "ten km", None).unwrap_err();
        assert!(matches!(fault, Fault::Parse(e) if e.message.contains("Неверный формат")));
    }

    #[test]
    fn string_equality_is_not_coerced() {
        assert_eq!(
            run("submitted == 'Paris'", "Paris", None).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            run("submitted == 'Paris'", "paris", None).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn expected_binding_flows_through() {
        assert_eq!(
            run(
                "distance(submitted) == distance(expected)",
                "2000m",
                Some(Value::Str("2km".into()))
            )
            .unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn multi_statement_program() {
        let src = "d = distance(submitted)\nd >= 1900 && d <= 2100";
        assert_eq!(run(src, "2km", None).unwrap(), Value::Bool(true));
        assert_eq!(run(src, "2.2km", None).unwrap(), Value::Bool(false));
    }

    #[test]
    fn while_loop_terminates_and_computes() {
        let src = "i = 0\ntotal = 0\nwhile i < 5 { i = i + 1; total = total + i }\ntotal == 15";
        assert_eq!(run(src, "", None).unwrap(), Value::Bool(true));
    }

    #[test]
    fn infinite_loop_hits_the_budget() {
        assert_eq!(run("while true { }", "", None).unwrap_err(), Fault::Budget);
    }

    #[test]
    fn budget_also_bounds_straight_line_code() {
        let src = format!("{}1 == 200", "1 + ".repeat(200));
        let program = compile(&src).unwrap();
        let mut sandbox = Sandbox::new("", None, 100);
        assert_eq!(exec_program(&program, &mut sandbox), Err(Fault::Budget));
    }

    #[test]
    fn division_by_zero_faults() {
        assert!(matches!(
            run("1 / 0 == 1", "", None),
            Err(Fault::Arithmetic(_))
        ));
        assert!(matches!(
            run("1 % 0 == 1", "", None),
            Err(Fault::Arithmetic(_))
        ));
    }

    #[test]
    fn overflow_faults_instead_of_wrapping() {
        assert!(matches!(
            run("9223372036854775807 + 1 == 0", "", None),
            Err(Fault::Arithmetic(_))
        ));
    }

    #[test]
    fn unknown_name_faults_at_lookup() {
        assert!(matches!(
            run("shell('ls') == 0", "", None),
            Err(Fault::UnknownName(name)) if name == "shell"
        ));
    }

    #[test]
    fn type_misuse_faults() {
        assert!(matches!(run("true + 1 == 2", "", None), Err(Fault::Type(_))));
        assert!(matches!(run("!5 == true", "", None), Err(Fault::Type(_))));
        assert!(matches!(
            run("while 1 { }", "", None),
            Err(Fault::Type(_))
        ));
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The right side would divide by zero; short-circuiting skips it.
        assert_eq!(
            run("false && 1 / 0 == 1", "", None).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            run("true || 1 / 0 == 1", "", None).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn result_is_last_expression_statement() {
        let src = "d = distance(submitted)\nd == 500\nd == 2000";
        assert_eq!(run(src, "2km", None).unwrap(), Value::Bool(true));
    }

    #[test]
    fn assignment_only_program_has_no_result() {
        assert!(matches!(
            run("d = 1", "", None),
            Err(Fault::Type(msg)) if msg.contains("no result")
        ));
    }
}
