//! Static checks that do not produce a [`crate::Program`].

use crate::error::{BridgeError, panic_message};
use cel_interpreter::Program as CompiledForm;
use cel_parser::ast::{EntryExpr, Expr, IdedEntryExpr, IdedExpr};
use cel_parser::{Expression, ParseErrors, Parser};
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Names that can appear where an identifier is expected but never refer to
/// a host binding.
const BUILTINS: &[&str] = &[
    "true", "false", "null", "in", "has", "all", "exists", "exists_one", "map", "filter",
    "size", "int", "uint", "double", "string", "bytes", "bool", "duration", "timestamp",
    "type", "dyn", "list", "null_type", "startsWith", "endsWith", "contains", "matches",
    "max", "min",
];

/// Outcome of a successful [`validate`] call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    /// Distinct free variables referenced by the expression, sorted.
    pub variables: Vec<String>,
}

impl Validation {
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

/// Parse `expression` and report the variables it references.
///
/// Nothing is retained; a failed parse yields [`BridgeError::Syntax`].
pub fn validate(expression: &str) -> Result<Validation, BridgeError> {
    let ast = guard_parser(expression, || Parser::default().parse(expression))?;
    Ok(Validation {
        variables: free_variables(&ast),
    })
}

/// Compile `expression` for execution.
pub(crate) fn parse(expression: &str) -> Result<CompiledForm, BridgeError> {
    guard_parser(expression, || CompiledForm::compile(expression))
}

/// Run the parser, turning parse errors and parser panics into
/// [`BridgeError::Syntax`].
///
/// The generated parser panics instead of failing on some truncated inputs
/// (`"1 +"`, `"("`).
fn guard_parser<T>(
    expression: &str,
    parse: impl FnOnce() -> Result<T, ParseErrors>,
) -> Result<T, BridgeError> {
    match panic::catch_unwind(AssertUnwindSafe(parse)) {
        Ok(result) => result.map_err(|e| BridgeError::Syntax(e.to_string())),
        Err(payload) => {
            debug!(expression, panic = %panic_message(&*payload), "parser panicked");
            Err(BridgeError::Syntax(format!(
                "unexpected end of expression in '{}'",
                expression
            )))
        }
    }
}

/// Free variables of `ast`, sorted and deduplicated.
///
/// Member access contributes only its root (`user.name` yields `user`).
/// Iteration variables of comprehension macros (`all`, `exists`,
/// `exists_one`, `map`, `filter`) are bound inside the macro and are not
/// free.
fn free_variables(ast: &Expression) -> Vec<String> {
    let mut bound = Vec::new();
    let mut variables = Vec::new();
    collect(ast, &mut bound, &mut variables);
    let mut variables: Vec<String> = variables.into_iter().map(str::to_owned).collect();
    variables.sort();
    variables.dedup();
    variables
}

fn collect<'e>(expr: &'e IdedExpr, bound: &mut Vec<&'e str>, out: &mut Vec<&'e str>) {
    match &expr.expr {
        Expr::Unspecified | Expr::Literal(_) => {}
        Expr::Ident(name) => {
            let name = name.as_str();
            // '@'-prefixed names are accumulators introduced by macro expansion.
            if !name.starts_with('@') && !bound.contains(&name) && !BUILTINS.contains(&name) {
                out.push(name);
            }
        }
        Expr::Select(select) => collect(&select.operand, bound, out),
        Expr::Call(call) => {
            if let Some(target) = &call.target {
                collect(target, bound, out);
            }
            for arg in &call.args {
                collect(arg, bound, out);
            }
        }
        Expr::List(list) => {
            for element in &list.elements {
                collect(element, bound, out);
            }
        }
        Expr::Map(map) => collect_entries(&map.entries, bound, out),
        Expr::Struct(object) => collect_entries(&object.entries, bound, out),
        Expr::Comprehension(comprehension) => {
            collect(&comprehension.iter_range, bound, out);
            collect(&comprehension.accu_init, bound, out);

            let depth = bound.len();
            bound.push(&comprehension.iter_var);
            if let Some(second) = &comprehension.iter_var2 {
                bound.push(second);
            }
            bound.push(&comprehension.accu_var);
            collect(&comprehension.loop_cond, bound, out);
            collect(&comprehension.loop_step, bound, out);
            collect(&comprehension.result, bound, out);
            bound.truncate(depth);
        }
    }
}

fn collect_entries<'e>(
    entries: &'e [IdedEntryExpr],
    bound: &mut Vec<&'e str>,
    out: &mut Vec<&'e str>,
) {
    for entry in entries {
        match &entry.expr {
            EntryExpr::StructField(field) => collect(&field.value, bound, out),
            EntryExpr::MapEntry(pair) => {
                collect(&pair.key, bound, out);
                collect(&pair.value, bound, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn counts_distinct_variables() {
        let validation = validate("a + b").unwrap();
        assert_eq!(validation.variable_count(), 2);
        assert_eq!(validation.variables, ["a", "b"]);

        let validation = validate("x * x + x").unwrap();
        assert_eq!(validation.variables, ["x"]);
    }

    #[test]
    fn syntax_errors() {
        for source in [
            "1 + + 2",
            "1 + +",
            "1 +",
            "3 *",
            "a &&",
            "x ==",
            "(",
            "foo(",
            "invalid syntax +++",
            "(1 + 2",
        ] {
            let err = validate(source).unwrap_err();
            assert!(matches!(err, BridgeError::Syntax(_)), "{source:?}");
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn literals_have_no_variables() {
        let validation = validate("1 + 2 == 3 && true").unwrap();
        assert_eq!(validation, Validation::default());
        assert_eq!(validate("'a' + \"b\"").unwrap().variable_count(), 0);
    }

    #[test]
    fn member_access_reports_root() {
        let validation = validate("user.age > 18 && user.name.startsWith('John')").unwrap();
        assert_eq!(validation.variables, ["user"]);
    }

    #[test]
    fn functions_are_not_variables() {
        let validation = validate("size(items) > limit").unwrap();
        assert_eq!(validation.variables, ["items", "limit"]);
    }

    #[test]
    fn comprehension_variables_are_bound() {
        assert_eq!(validate("items.all(x, x > 0)").unwrap().variables, ["items"]);
        assert_eq!(validate("items.map(i, i * 2)").unwrap().variables, ["items"]);
        assert_eq!(
            validate("[1, 2].filter(v, v > lim)").unwrap().variables,
            ["lim"]
        );
        assert_eq!(
            validate("xs.exists(x, x == y) && xs.exists_one(e, e > 1)").unwrap().variables,
            ["xs", "y"]
        );
    }

    #[test]
    fn comprehension_variable_is_free_outside_its_macro() {
        let validation = validate("items.all(x, x > 0) && x < 10").unwrap();
        assert_eq!(validation.variables, ["items", "x"]);
    }

    #[test]
    fn map_literals_contribute_variables() {
        let validation = validate("{'k': v, key: 1}[key] > 0").unwrap();
        assert_eq!(validation.variables, ["key", "v"]);
    }
}
