//! Built-in tools.
//!
//! The calculator evaluates arithmetic expressions with a strict character
//! allow-list; search and weather are placeholder integrations that echo a
//! canned response until a real provider is wired in.

use crate::tool::{Tool, ToolError};

// ─────────────────────────────────────────────────────────────────────────────
// Calculator
// ─────────────────────────────────────────────────────────────────────────────

/// Characters an expression may contain.
///
/// Everything else is rejected before evaluation, so the tool can never be
/// talked into running anything but arithmetic.
const ALLOWED_CHARS: &str = "0123456789+-*/.() ";

/// Arithmetic expression evaluator.
///
/// Rejections and evaluation problems are reported in the output text
/// rather than as errors; a malformed expression is an answer, not a
/// failure of the tool itself.
#[derive(Debug, Default)]
pub struct CalculatorTool;

impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluates arithmetic expressions. Input: an expression like '2 + 2 * 3'."
    }

    fn call(&self, input: &str) -> Result<String, ToolError> {
        if !input.chars().all(|c| ALLOWED_CHARS.contains(c)) {
            return Ok("error: expression contains disallowed characters".to_string());
        }

        match evaluate(input) {
            Ok(value) => Ok(format_number(value)),
            Err(e) => Ok(format!("calculation error: {e}")),
        }
    }
}

/// Format a result, dropping the fraction when the value is integral.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Evaluate an arithmetic expression.
///
/// Standard precedence: `*` and `/` bind tighter than `+` and `-`, with
/// parentheses and unary minus.
fn evaluate(expression: &str) -> Result<f64, String> {
    let mut parser = Parser::new(expression);
    let value = parser.expr()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        return Err(format!(
            "unexpected character '{}' at position {}",
            parser.chars[parser.pos], parser.pos
        ));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos] == ' ' {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                '+' => {
                    self.pos += 1;
                    value += self.term()?;
                }
                '-' => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                '*' => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                '/' => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                if self.peek() != Some(')') {
                    return Err("missing closing parenthesis".to_string());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(format!("unexpected character '{c}'")),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn number(&mut self) -> Result<f64, String> {
        self.skip_whitespace();
        let start = self.pos;
        while self.pos < self.chars.len()
            && (self.chars[self.pos].is_ascii_digit() || self.chars[self.pos] == '.')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map_err(|_| format!("invalid number '{text}'"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Placeholder Tools
// ─────────────────────────────────────────────────────────────────────────────

/// Web search placeholder.
#[derive(Debug, Default)]
pub struct SearchTool;

impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Searches the web for the given query."
    }

    fn call(&self, input: &str) -> Result<String, ToolError> {
        Ok(format!("search results for '{input}' (placeholder result)"))
    }
}

/// Weather lookup placeholder.
#[derive(Debug, Default)]
pub struct WeatherTool;

impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Reports the weather for the given location."
    }

    fn call(&self, input: &str) -> Result<String, ToolError> {
        Ok(format!("weather in {input}: sunny, 25°C (placeholder result)"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
