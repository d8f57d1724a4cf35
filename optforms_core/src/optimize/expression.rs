//! Linear expressions shared by constraints and objectives
use std::fmt::{Display, Formatter};

/// A single term of a linear expression, `coefficient * variable`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTerm {
    /// Index of the variable in the problem
    pub variable: usize,
    /// Label used when rendering the term
    pub label: String,
    /// The coefficient for the variable
    pub coefficient: f64,
}

impl Display for LinearTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}", self.coefficient, self.label)
    }
}

/// Sum of linear terms
///
/// Terms with a coefficient of 0 are kept (the row stays dense) but are skipped when the
/// expression is rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpression {
    terms: Vec<LinearTerm>,
}

impl LinearExpression {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    pub fn push(&mut self, term: LinearTerm) {
        self.terms.push(term);
    }

    pub fn terms(&self) -> &[LinearTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether every coefficient is exactly 0 (also true for an empty expression)
    pub fn is_zero(&self) -> bool {
        self.terms.iter().all(|t| t.coefficient == 0.)
    }

    /// Value of the expression, `values` is indexed by variable index
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * values.get(t.variable).copied().unwrap_or(0.))
            .sum()
    }

    /// Coefficients summed per variable, as a dense vector of length `num_variables`
    pub fn dense_coefficients(&self, num_variables: usize) -> Vec<f64> {
        let mut dense = vec![0.; num_variables];
        for t in &self.terms {
            if let Some(c) = dense.get_mut(t.variable) {
                *c += t.coefficient;
            }
        }
        dense
    }

    /// Render the expression as LaTeX
    pub fn to_latex(&self) -> String {
        render(&self.terms, |label| latex_label(label))
    }
}

impl Display for LinearExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", render(&self.terms, |label| label.to_string()))
    }
}

/// Join the non-zero terms with signs, unit coefficients are written without the number
fn render<F: Fn(&str) -> String>(terms: &[LinearTerm], label: F) -> String {
    let mut out = String::new();
    for t in terms.iter().filter(|t| t.coefficient != 0.) {
        let magnitude = t.coefficient.abs();
        let body = if magnitude == 1. {
            label(&t.label)
        } else {
            format!("{} {}", magnitude, label(&t.label))
        };
        match (out.is_empty(), t.coefficient < 0.) {
            (true, false) => out.push_str(&body),
            (true, true) => out.push_str(&format!("-{}", body)),
            (false, false) => out.push_str(&format!(" + {}", body)),
            (false, true) => out.push_str(&format!(" - {}", body)),
        }
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

/// Typeset a variable label
///
/// `x3` becomes `x_{3}`, `x_0_1` becomes `x_{0,1}`, anything else is wrapped in `\text{}`.
pub(crate) fn latex_label(label: &str) -> String {
    let mut parts = label.split('_');
    let head = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();
    let is_number = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if !head.is_empty() && head.chars().all(|c| c.is_ascii_alphabetic()) {
        if !rest.is_empty() && rest.iter().all(|p| is_number(p)) {
            return format!("{}_{{{}}}", head, rest.join(","));
        }
        if rest.is_empty() {
            return head.to_string();
        }
    }
    if rest.is_empty() {
        let split = label.find(|c: char| c.is_ascii_digit()).unwrap_or(label.len());
        let (letters, digits) = label.split_at(split);
        if !letters.is_empty()
            && letters.chars().all(|c| c.is_ascii_alphabetic())
            && is_number(digits)
        {
            return format!("{}_{{{}}}", letters, digits);
        }
    }
    format!("\\text{{{}}}", escape_latex(label))
}

/// Escape the characters LaTeX treats specially inside `\text{}`
fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '&' | '%' | '#' | '$' | '{' | '}') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
