//! Default evaluator for the pre-compiled expression form.
//!
//! The scripting toolchain compiles `x * 2 + sin(t / 100)` ahead of time into a
//! JSON tree. Operator nodes use the operator itself as their `type`:
//!
//! ```json
//! {"type":"*","children":[{"type":"Identifier","value":"x"},{"type":"NumericLiteral","value":2}]}
//! ```
//!
//! Calls are `CallExpression` nodes whose children are the callee identifier and
//! an `Arguments` node; `?` is the conditional with three children.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::coercion::{to_bool, to_float};
use crate::{EvalError, ExpressionEvaluator, ExpressionPair, Scope, Value};

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    value: Option<JsonValue>,
    #[serde(default)]
    children: Vec<Node>,
}

/// Stateless evaluator over the `transformed` half of an [`ExpressionPair`].
#[derive(Copy, Clone, Debug, Default)]
pub struct JsonAstEvaluator;

impl JsonAstEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a raw transformed JSON string against a scope.
    pub fn evaluate_str(&self, transformed: &str, scope: &Scope) -> Result<Value, EvalError> {
        let node: Node =
            serde_json::from_str(transformed).map_err(|e| EvalError::Parse(e.to_string()))?;
        eval(&node, scope)
    }
}

impl ExpressionEvaluator for JsonAstEvaluator {
    fn evaluate(&self, expression: &ExpressionPair, scope: &Scope) -> Result<Value, EvalError> {
        let text = expression
            .transformed
            .as_deref()
            .ok_or(EvalError::Empty)?;
        self.evaluate_str(text, scope)
    }
}

fn eval(node: &Node, scope: &Scope) -> Result<Value, EvalError> {
    match node.ty.as_str() {
        "NumericLiteral" => Ok(Value::Float(literal_number(node)?)),
        "StringLiteral" => match &node.value {
            Some(JsonValue::String(s)) => Ok(Value::Text(s.clone())),
            Some(other) => Ok(Value::Text(other.to_string())),
            None => Err(EvalError::Parse("StringLiteral without value".into())),
        },
        "BooleanLiteral" => match &node.value {
            Some(JsonValue::Bool(b)) => Ok(Value::Bool(*b)),
            Some(JsonValue::String(s)) => Ok(Value::Bool(s == "true")),
            _ => Err(EvalError::Parse("BooleanLiteral without value".into())),
        },
        "Identifier" => {
            let name = identifier_name(node)?;
            scope
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownIdentifier(name.to_string()))
        }
        "CallExpression" => eval_call(node, scope),
        "?" | "ConditionalExpression" => {
            let [cond, then, otherwise] = children::<3>(node)?;
            if to_bool(&eval(cond, scope)?) {
                eval(then, scope)
            } else {
                eval(otherwise, scope)
            }
        }
        "&&" => {
            let [lhs, rhs] = children::<2>(node)?;
            let l = eval(lhs, scope)?;
            if to_bool(&l) {
                eval(rhs, scope)
            } else {
                Ok(l)
            }
        }
        "||" => {
            let [lhs, rhs] = children::<2>(node)?;
            let l = eval(lhs, scope)?;
            if to_bool(&l) {
                Ok(l)
            } else {
                eval(rhs, scope)
            }
        }
        "!" => {
            let [operand] = children::<1>(node)?;
            Ok(Value::Bool(!to_bool(&eval(operand, scope)?)))
        }
        "-" if node.children.len() == 1 => {
            let v = eval(&node.children[0], scope)?;
            Ok(Value::Float(-to_float(&v)))
        }
        "+" if node.children.len() == 1 => {
            let v = eval(&node.children[0], scope)?;
            Ok(Value::Float(to_float(&v)))
        }
        op @ ("+" | "-" | "*" | "/" | "%" | "**" | ">" | ">=" | "<" | "<=" | "==" | "==="
        | "!=" | "!==") => {
            let [lhs, rhs] = children::<2>(node)?;
            let l = eval(lhs, scope)?;
            let r = eval(rhs, scope)?;
            Ok(binary(op, &l, &r))
        }
        other => Err(EvalError::UnsupportedNode(other.to_string())),
    }
}

fn binary(op: &str, l: &Value, r: &Value) -> Value {
    if op == "+" {
        if let (Value::Text(_), _) | (_, Value::Text(_)) = (l, r) {
            return Value::Text(format!("{}{}", display(l), display(r)));
        }
    }
    match op {
        "==" | "===" => return Value::Bool(loosely_equal(l, r)),
        "!=" | "!==" => return Value::Bool(!loosely_equal(l, r)),
        _ => {}
    }
    let (a, b) = (to_float(l), to_float(r));
    match op {
        "+" => Value::Float(a + b),
        "-" => Value::Float(a - b),
        "*" => Value::Float(a * b),
        "/" => Value::Float(a / b),
        "%" => Value::Float(a % b),
        "**" => Value::Float(a.powf(b)),
        ">" => Value::Bool(a > b),
        ">=" => Value::Bool(a >= b),
        "<" => Value::Bool(a < b),
        "<=" => Value::Bool(a <= b),
        _ => Value::Float(f64::NAN),
    }
}

fn loosely_equal(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Text(a), Value::Text(b)) => a == b,
        _ => to_float(l) == to_float(r),
    }
}

fn display(v: &Value) -> String {
    match v {
        Value::Float(f) => format_number(*f),
        Value::Bool(b) => b.to_string(),
        Value::Text(s) => s.clone(),
    }
}

fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.is_finite() && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

fn eval_call(node: &Node, scope: &Scope) -> Result<Value, EvalError> {
    let [callee, args] = children::<2>(node)?;
    let name = identifier_name(callee)?;
    let args = args
        .children
        .iter()
        .map(|a| eval(a, scope))
        .collect::<Result<Vec<_>, _>>()?;
    let nums: Vec<f64> = args.iter().map(to_float).collect();

    let unary = |f: fn(f64) -> f64| -> Result<Value, EvalError> {
        arity(name, &nums, 1)?;
        Ok(Value::Float(f(nums[0])))
    };

    match name {
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "tan" => unary(f64::tan),
        "asin" => unary(f64::asin),
        "acos" => unary(f64::acos),
        "atan" => unary(f64::atan),
        "sqrt" => unary(f64::sqrt),
        "cbrt" => unary(f64::cbrt),
        "abs" => unary(f64::abs),
        "ceil" => unary(f64::ceil),
        "floor" => unary(f64::floor),
        "exp" => unary(f64::exp),
        "log" => unary(f64::ln),
        // JS rounds halves toward +∞.
        "round" => unary(|x| (x + 0.5).floor()),
        "sign" => unary(|x| {
            if x.is_nan() || x == 0.0 {
                x
            } else {
                x.signum()
            }
        }),
        "atan2" => {
            arity(name, &nums, 2)?;
            Ok(Value::Float(nums[0].atan2(nums[1])))
        }
        "pow" => {
            arity(name, &nums, 2)?;
            Ok(Value::Float(nums[0].powf(nums[1])))
        }
        "max" => Ok(Value::Float(fold_extreme(&nums, f64::NEG_INFINITY, f64::max))),
        "min" => Ok(Value::Float(fold_extreme(&nums, f64::INFINITY, f64::min))),
        "rgb" => {
            arity(name, &nums, 3)?;
            Ok(Value::Text(format!(
                "rgb({},{},{})",
                channel(nums[0]),
                channel(nums[1]),
                channel(nums[2])
            )))
        }
        "rgba" => {
            arity(name, &nums, 4)?;
            Ok(Value::Text(format!(
                "rgba({},{},{},{})",
                channel(nums[0]),
                channel(nums[1]),
                channel(nums[2]),
                format_number(nums[3].clamp(0.0, 1.0))
            )))
        }
        other => Err(EvalError::UnknownFunction(other.to_string())),
    }
}

fn fold_extreme(nums: &[f64], init: f64, pick: fn(f64, f64) -> f64) -> f64 {
    if nums.iter().any(|x| x.is_nan()) {
        return f64::NAN;
    }
    nums.iter().copied().fold(init, pick)
}

fn channel(v: f64) -> i64 {
    if v.is_nan() {
        0
    } else {
        v.round().clamp(0.0, 255.0) as i64
    }
}

fn arity(name: &str, args: &[f64], expected: usize) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::Arity {
            name: name.to_string(),
            expected,
            got: args.len(),
        })
    }
}

fn children<const N: usize>(node: &Node) -> Result<[&Node; N], EvalError> {
    if node.children.len() != N {
        return Err(EvalError::Parse(format!(
            "'{}' expects {} children, got {}",
            node.ty,
            N,
            node.children.len()
        )));
    }
    let mut out = [&node.children[0]; N];
    for (slot, child) in out.iter_mut().zip(node.children.iter()) {
        *slot = child;
    }
    Ok(out)
}

fn identifier_name(node: &Node) -> Result<&str, EvalError> {
    match (&node.ty[..], &node.value) {
        ("Identifier", Some(JsonValue::String(s))) => Ok(s.as_str()),
        _ => Err(EvalError::Parse(format!(
            "expected Identifier, found '{}'",
            node.ty
        ))),
    }
}

fn literal_number(node: &Node) -> Result<f64, EvalError> {
    match &node.value {
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .ok_or_else(|| EvalError::Parse(format!("bad number {n}"))),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| EvalError::Parse(format!("bad number '{s}'"))),
        _ => Err(EvalError::Parse("NumericLiteral without value".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn run(ast: JsonValue, scope: &Scope) -> Result<Value, EvalError> {
        JsonAstEvaluator.evaluate_str(&ast.to_string(), scope)
    }

    fn ident(name: &str) -> JsonValue {
        json!({ "type": "Identifier", "value": name })
    }

    fn num(v: f64) -> JsonValue {
        json!({ "type": "NumericLiteral", "value": v })
    }

    fn call(name: &str, args: Vec<JsonValue>) -> JsonValue {
        json!({ "type": "CallExpression",
                "children": [ident(name), { "type": "Arguments", "children": args }] })
    }

    #[test]
    fn arithmetic_over_scope() {
        let mut scope = Scope::with_constants();
        scope.set_f64("internal_x", 30.0);
        let ast = json!({ "type": "*", "children": [ident("internal_x"), num(2.0)] });
        assert_eq!(run(ast, &scope), Ok(Value::Float(60.0)));
    }

    #[test]
    fn comparisons_and_logic() {
        let mut scope = Scope::new();
        scope.set_f64("x", 51.0);
        let gt = json!({ "type": ">", "children": [ident("x"), num(50.0)] });
        assert_eq!(run(gt.clone(), &scope), Ok(Value::Bool(true)));
        let not = json!({ "type": "!", "children": [gt] });
        assert_eq!(run(not, &scope), Ok(Value::Bool(false)));
        let cond = json!({ "type": "?", "children": [
            { "type": "BooleanLiteral", "value": false }, num(1.0), num(2.0)
        ] });
        assert_eq!(run(cond, &scope), Ok(Value::Float(2.0)));
    }

    #[test]
    fn math_library_and_constants() {
        let scope = Scope::with_constants();
        let ast = call(
            "sin",
            vec![json!({ "type": "/", "children": [ident("PI"), num(2.0)] })],
        );
        let v = run(ast, &scope).unwrap();
        assert_relative_eq!(v.as_f64().unwrap(), 1.0, epsilon = 1e-12);
        let max = call("max", vec![num(1.0), num(7.0), num(3.0)]);
        assert_eq!(run(max, &scope), Ok(Value::Float(7.0)));
        let unary = json!({ "type": "-", "children": [num(4.0)] });
        assert_eq!(run(unary, &scope), Ok(Value::Float(-4.0)));
    }

    #[test]
    fn colour_functions_produce_text() {
        let scope = Scope::new();
        let ast = call("rgba", vec![num(255.0), num(300.0), num(-1.0), num(0.5)]);
        assert_eq!(run(ast, &scope), Ok(Value::Text("rgba(255,255,0,0.5)".into())));
    }

    #[test]
    fn errors_are_typed() {
        let scope = Scope::new();
        assert_eq!(
            run(ident("nope"), &scope),
            Err(EvalError::UnknownIdentifier("nope".into()))
        );
        assert!(matches!(
            run(call("hypot", vec![num(1.0)]), &scope),
            Err(EvalError::UnknownFunction(_))
        ));
        assert!(matches!(
            run(call("pow", vec![num(1.0)]), &scope),
            Err(EvalError::Arity { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            JsonAstEvaluator.evaluate_str("not json", &scope),
            Err(EvalError::Parse(_))
        ));
        assert_eq!(
            JsonAstEvaluator.evaluate(&ExpressionPair::default(), &scope),
            Err(EvalError::Empty)
        );
    }
}
