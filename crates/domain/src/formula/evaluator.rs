//! Tree-walking evaluator for parsed phrases

use std::sync::Arc;

use super::dice::DiceRoller;
use super::parser::{parse_phrase, BinaryOp, Expr, Phrase, Segment, UnaryOp};
use super::{EvalOptions, Evaluation, FormulaError, FormulaEvaluator};
use crate::value_objects::{format_number, PropertyMap, PropertyValue};

/// The bundled [`FormulaEvaluator`].
///
/// Dice are rolled through the injected [`DiceRoller`], so evaluation is
/// deterministic under test.
#[derive(Clone)]
pub struct ExpressionEvaluator {
    roller: Arc<dyn DiceRoller>,
}

impl ExpressionEvaluator {
    pub fn new(roller: Arc<dyn DiceRoller>) -> Self {
        Self { roller }
    }
}

impl std::fmt::Debug for ExpressionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpressionEvaluator").finish_non_exhaustive()
    }
}

impl FormulaEvaluator for ExpressionEvaluator {
    fn evaluate(
        &self,
        formula: &str,
        context: &PropertyMap,
        options: &EvalOptions,
    ) -> Result<Evaluation, FormulaError> {
        let scope = Scope {
            context,
            options,
            roller: self.roller.as_ref(),
        };

        let (value, rendered) = match parse_phrase(formula)? {
            Phrase::Bare(expr) => scope.eval(&expr)?,
            Phrase::Template(segments) => match segments.as_slice() {
                [Segment::Block(expr)] => scope.eval(expr)?,
                _ => {
                    let mut text = String::new();
                    let mut rendered = String::new();
                    for segment in &segments {
                        match segment {
                            Segment::Text(literal) => {
                                text.push_str(literal);
                                rendered.push_str(literal);
                            }
                            Segment::Block(expr) => {
                                let (value, block) = scope.eval(expr)?;
                                text.push_str(&value.to_string());
                                rendered.push_str(&block);
                            }
                        }
                    }
                    (PropertyValue::Text(text), rendered)
                }
            },
        };

        Ok(Evaluation {
            value,
            explanation: options.explain.then_some(rendered),
        })
    }
}

/// Evaluated value plus its rendering for explanations.
type Evaluated = (PropertyValue, String);

struct Scope<'a> {
    context: &'a PropertyMap,
    options: &'a EvalOptions,
    roller: &'a dyn DiceRoller,
}

impl Scope<'_> {
    fn eval(&self, expr: &Expr) -> Result<Evaluated, FormulaError> {
        match expr {
            Expr::Number(value) => Ok((PropertyValue::Number(*value), format_number(*value))),
            Expr::Text(text) => Ok((PropertyValue::Text(text.clone()), format!("'{}'", text))),
            Expr::Reference(name) => {
                let value = self.lookup(name)?;
                let rendered = value.to_string();
                Ok((value, rendered))
            }
            Expr::Dice(term) => {
                let outcome = term.roll(self.roller);
                Ok((
                    PropertyValue::Number(f64::from(outcome.total())),
                    outcome.to_string(),
                ))
            }
            Expr::Unary {
                op: UnaryOp::Negate,
                operand,
            } => {
                let (value, rendered) = self.eval(operand)?;
                Ok((
                    PropertyValue::Number(-to_number(&value)?),
                    format!("-{}", rendered),
                ))
            }
            Expr::Group(inner) => {
                let (value, rendered) = self.eval(inner)?;
                Ok((value, format!("({})", rendered)))
            }
            Expr::Binary { op, left, right } => {
                let (left_value, left_rendered) = self.eval(left)?;
                let (right_value, right_rendered) = self.eval(right)?;
                let value = binary(*op, &left_value, &right_value)?;
                Ok((
                    value,
                    format!("{} {} {}", left_rendered, op.symbol(), right_rendered),
                ))
            }
            Expr::Call { name, args } => self.call(name, args),
        }
    }

    /// `<reference>.<name>` first, then `<name>`. Null and map values count as missing.
    fn lookup(&self, name: &str) -> Result<PropertyValue, FormulaError> {
        let usable = |value: &&PropertyValue| {
            !value.is_null() && !matches!(value, PropertyValue::Map(_) | PropertyValue::List(_))
        };

        let scoped = self
            .options
            .reference
            .as_deref()
            .and_then(|reference| self.context.get(&format!("{}.{}", reference, name)))
            .filter(usable);

        match scoped.or_else(|| self.context.get(name).filter(usable)) {
            Some(value) => Ok(value.clone()),
            None => self
                .options
                .default_value
                .clone()
                .ok_or_else(|| FormulaError::unresolvable(name)),
        }
    }

    fn call(&self, name: &str, args: &[Expr]) -> Result<Evaluated, FormulaError> {
        if name == "if" {
            let [condition, then_branch, else_branch] = args else {
                return Err(FormulaError::Type(format!(
                    "if expects 3 arguments, got {}",
                    args.len()
                )));
            };
            let (condition, _) = self.eval(condition)?;
            return if condition.is_truthy() {
                self.eval(then_branch)
            } else {
                self.eval(else_branch)
            };
        }

        let mut values = Vec::with_capacity(args.len());
        let mut rendered = Vec::with_capacity(args.len());
        for arg in args {
            let (value, text) = self.eval(arg)?;
            values.push(to_number(&value)?);
            rendered.push(text);
        }

        let unary = |f: fn(f64) -> f64| match values.as_slice() {
            [value] => Ok(f(*value)),
            _ => Err(FormulaError::Type(format!(
                "{} expects 1 argument, got {}",
                name,
                values.len()
            ))),
        };
        let fold = |f: fn(f64, f64) -> f64| match values.split_first() {
            Some((first, rest)) => Ok(rest.iter().copied().fold(*first, f)),
            None => Err(FormulaError::Type(format!(
                "{} expects at least 1 argument",
                name
            ))),
        };

        let result = match name {
            "floor" => unary(f64::floor)?,
            "ceil" => unary(f64::ceil)?,
            "round" => unary(f64::round)?,
            "abs" => unary(f64::abs)?,
            "min" => fold(f64::min)?,
            "max" => fold(f64::max)?,
            other => return Err(FormulaError::UnknownFunction(other.to_string())),
        };

        Ok((
            PropertyValue::Number(result),
            format!("{}({})", name, rendered.join(", ")),
        ))
    }
}

fn to_number(value: &PropertyValue) -> Result<f64, FormulaError> {
    numeric(value).ok_or_else(|| FormulaError::Type(format!("'{}' is not a number", value)))
}

fn numeric(value: &PropertyValue) -> Option<f64> {
    match value {
        PropertyValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        other => other.as_number(),
    }
}

fn binary(
    op: BinaryOp,
    left: &PropertyValue,
    right: &PropertyValue,
) -> Result<PropertyValue, FormulaError> {
    let both = numeric(left).zip(numeric(right));

    match op {
        BinaryOp::Add => match both {
            Some((l, r)) => Ok(PropertyValue::Number(l + r)),
            None if matches!(left, PropertyValue::Text(_))
                || matches!(right, PropertyValue::Text(_)) =>
            {
                Ok(PropertyValue::Text(format!("{}{}", left, right)))
            }
            None => Err(FormulaError::Type(format!(
                "cannot add '{}' and '{}'",
                left, right
            ))),
        },
        BinaryOp::Equal | BinaryOp::NotEqual => {
            let equal = match both {
                Some((l, r)) => l == r,
                None => left.to_string() == right.to_string(),
            };
            Ok(PropertyValue::Bool(equal == (op == BinaryOp::Equal)))
        }
        _ => {
            let l = to_number(left)?;
            let r = to_number(right)?;
            let value = match op {
                BinaryOp::Subtract => PropertyValue::Number(l - r),
                BinaryOp::Multiply => PropertyValue::Number(l * r),
                BinaryOp::Divide if r == 0.0 => return Err(FormulaError::DivisionByZero),
                BinaryOp::Divide => PropertyValue::Number(l / r),
                BinaryOp::Remainder if r == 0.0 => return Err(FormulaError::DivisionByZero),
                BinaryOp::Remainder => PropertyValue::Number(l % r),
                BinaryOp::Less => PropertyValue::Bool(l < r),
                BinaryOp::LessOrEqual => PropertyValue::Bool(l <= r),
                BinaryOp::Greater => PropertyValue::Bool(l > r),
                _ => PropertyValue::Bool(l >= r),
            };
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::FixedRoller;

    fn evaluator() -> ExpressionEvaluator {
        ExpressionEvaluator::new(Arc::new(FixedRoller(14)))
    }

    fn number(formula: &str, context: &PropertyMap) -> f64 {
        evaluator()
            .evaluate(formula, context, &EvalOptions::new())
            .unwrap()
            .value
            .as_number()
            .unwrap()
    }

    #[test]
    fn evaluates_arithmetic_against_context() {
        let context = PropertyMap::new().with("str", 2).with("level", "4");
        assert_eq!(number("10 + str", &context), 12.0);
        assert_eq!(number("(str + 1) * level", &context), 12.0);
        assert_eq!(number("-str % 3", &context), -2.0);
        assert_eq!(number("floor(7 / 2) + max(1, str, 0)", &context), 5.0);
        assert_eq!(number("if(level >= 5, 2, 1)", &context), 1.0);
    }

    #[test]
    fn missing_reference_is_unresolvable() {
        let err = evaluator()
            .evaluate("10 + dex", &PropertyMap::new(), &EvalOptions::new())
            .unwrap_err();
        assert_eq!(err, FormulaError::unresolvable("dex"));
        assert!(err.is_unresolvable());
    }

    #[test]
    fn default_value_replaces_missing_reference() {
        let result = evaluator()
            .evaluate("10 + dex", &PropertyMap::new(), &EvalOptions::new().with_default(0))
            .unwrap();
        assert_eq!(result.value, PropertyValue::Number(10.0));
    }

    #[test]
    fn map_reference_is_unresolvable() {
        let context = PropertyMap::new().with("attacks.a1.damage", 3);
        let err = evaluator()
            .evaluate("attacks", &context, &EvalOptions::new())
            .unwrap_err();
        assert!(err.is_unresolvable());
    }

    #[test]
    fn reference_scope_is_tried_first() {
        let context = PropertyMap::new()
            .with("bonus", 1)
            .with("attacks.a1.bonus", 5)
            .with("str", 2);
        let options = EvalOptions::new().with_reference("attacks.a1");
        let result = evaluator().evaluate("bonus + str", &context, &options).unwrap();
        assert_eq!(result.value, PropertyValue::Number(7.0));
    }

    #[test]
    fn other_failures_are_not_unresolvable() {
        let context = PropertyMap::new().with("name", "Aria");
        let eval = evaluator();
        let options = EvalOptions::new();

        assert_eq!(
            eval.evaluate("1 / 0", &context, &options).unwrap_err(),
            FormulaError::DivisionByZero
        );
        assert!(matches!(
            eval.evaluate("name * 2", &context, &options).unwrap_err(),
            FormulaError::Type(_)
        ));
        assert!(matches!(
            eval.evaluate("sqrt(4)", &context, &options).unwrap_err(),
            FormulaError::UnknownFunction(_)
        ));
        assert!(matches!(
            eval.evaluate("0d6", &context, &options).unwrap_err(),
            FormulaError::InvalidDice(_)
        ));
    }

    #[test]
    fn explanation_substitutes_dice_and_references() {
        let context = PropertyMap::new().with("str", 3);
        let result = evaluator()
            .evaluate("${1d20 + str}$", &context, &EvalOptions::new().explained())
            .unwrap();

        assert_eq!(result.value, PropertyValue::Number(17.0));
        assert_eq!(result.explanation.as_deref(), Some("[1d20: 14] + 3"));
    }

    #[test]
    fn phrase_with_text_renders_to_text() {
        let context = PropertyMap::new().with("name", "Aria").with("str", 3);
        let result = evaluator()
            .evaluate("${name}$ hits for ${2 + str}$", &context, &EvalOptions::new())
            .unwrap();

        assert_eq!(result.value, PropertyValue::from("Aria hits for 5"));
        assert!(result.explanation.is_none());
    }

    #[test]
    fn text_concatenates_with_plus() {
        let context = PropertyMap::new().with("name", "Aria");
        let result = evaluator()
            .evaluate("name + ' the Bold'", &context, &EvalOptions::new())
            .unwrap();
        assert_eq!(result.value, PropertyValue::from("Aria the Bold"));
    }
}
