//! Keystroke accumulator for the client calculator.
//!
//! Holds the display string, the first operand and the chosen operator.
//! It never computes anything itself: `pending()` yields the request to
//! send, and `apply_result` feeds the server's answer back in.

use crate::calculator::format_number;
use crate::types::{CalculationRequest, Operation};

#[derive(Debug, Clone, PartialEq)]
pub struct Keypad {
    current: String,
    previous: Option<String>,
    operator: Option<Operation>,
    /// Operator pressed while a calculation was outstanding.
    queued: Option<Operation>,
}

impl Default for Keypad {
    fn default() -> Self {
        Self {
            current: "0".into(),
            previous: None,
            operator: None,
            queued: None,
        }
    }
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> &str {
        &self.current
    }

    pub fn operator(&self) -> Option<Operation> {
        self.operator
    }

    pub fn input_digit(&mut self, digit: char) {
        if !digit.is_ascii_digit() {
            return;
        }
        if self.current == "0" {
            self.current.clear();
        }
        self.current.push(digit);
    }

    pub fn input_decimal(&mut self) {
        if !self.current.contains('.') {
            self.current.push('.');
        }
    }

    /// Choose an operator. If a complete calculation is already pending it
    /// is returned so the caller can resolve it first; the operator is then
    /// applied to that result by `apply_result`.
    pub fn input_operator(&mut self, op: Operation) -> Option<CalculationRequest> {
        if let Some(req) = self.pending() {
            self.queued = Some(op);
            return Some(req);
        }
        self.previous = Some(std::mem::replace(&mut self.current, "0".into()));
        self.operator = Some(op);
        None
    }

    pub fn delete_digit(&mut self) {
        self.current.pop();
        if self.current.is_empty() || self.current == "-" {
            self.current = "0".into();
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The request described by the current state, if it is complete.
    pub fn pending(&self) -> Option<CalculationRequest> {
        let operation = self.operator?;
        let a = self.previous.as_deref()?.parse::<f64>().ok()?;
        let b = self.current.parse::<f64>().ok()?;
        Some(CalculationRequest { a, b, operation })
    }

    /// Show the server's result and start a new expression from it.
    pub fn apply_result(&mut self, result: f64) {
        self.current = format_number(result);
        self.previous = None;
        self.operator = None;
        if let Some(op) = self.queued.take() {
            self.input_operator(op);
        }
    }

    /// The server rejected the pending calculation. Operands are kept so
    /// the user can correct and retry; a queued operator is dropped.
    pub fn apply_error(&mut self) {
        self.queued = None;
    }

    /// Map a keyboard key to an action. Returns the request to send when
    /// the key asks for a result. `*` and `/` are ignored unless
    /// `allow_protected` (the user is logged in).
    pub fn press(&mut self, key: &str, allow_protected: bool) -> Option<CalculationRequest> {
        match key {
            "." => self.input_decimal(),
            "Enter" | "=" => return self.pending(),
            "Escape" | "c" | "C" => self.clear(),
            "Backspace" => self.delete_digit(),
            _ => {
                if let Ok(op) = key.parse::<Operation>() {
                    if op.is_protected() && !allow_protected {
                        return None;
                    }
                    return self.input_operator(op);
                }
                let mut chars = key.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    self.input_digit(c);
                }
            }
        }
        None
    }
}
