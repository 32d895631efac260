// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree for condition lines

use serde::Serialize;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    /// <
    Lt,
    /// <=
    Lte,
    /// ==
    Eq,
    /// !=
    NotEq,
    /// >=
    Gte,
    /// >
    Gt,
}

impl CompareOp {
    /// Look up an operator by its source symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Lte),
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::NotEq),
            ">=" => Some(CompareOp::Gte),
            ">" => Some(CompareOp::Gt),
            _ => None,
        }
    }

    /// Apply the operator with `a` on the left and `b` on the right
    pub fn apply(self, a: f64, b: f64) -> bool {
        match self {
            CompareOp::Lt => a < b,
            CompareOp::Lte => a <= b,
            CompareOp::Eq => a == b,
            CompareOp::NotEq => a != b,
            CompareOp::Gte => a >= b,
            CompareOp::Gt => a > b,
        }
    }
}

/// One side of a condition: an operator and a numeric literal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bound {
    pub op: CompareOp,
    pub value: f64,
    /// Unit written after the literal, kept for display only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Bound {
    pub fn new(op: CompareOp, value: f64) -> Self {
        Self {
            op,
            value,
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// A single comparison clause over one field.
///
/// `left` reads as `literal op field`, `right` as `field op literal`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub field: String,
    pub left: Option<Bound>,
    pub right: Option<Bound>,
}

impl Condition {
    /// A clause with neither side contributes no result
    pub fn is_degenerate(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Ordered conditions, combined with AND
pub type ConditionSet = Vec<Condition>;

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
            CompareOp::Eq => write!(f, "=="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Gt => write!(f, ">"),
        }
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} {}", self.value, unit),
            None => write!(f, "{}", self.value),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(left) = &self.left {
            write!(f, "{} {} ", left, left.op)?;
        }
        write!(f, "{}", self.field)?;
        if let Some(right) = &self.right {
            write!(f, " {} {}", right.op, right)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_op_display() {
        assert_eq!(format!("{}", CompareOp::Eq), "==");
        assert_eq!(format!("{}", CompareOp::NotEq), "!=");
        assert_eq!(format!("{}", CompareOp::Gt), ">");
        assert_eq!(format!("{}", CompareOp::Gte), ">=");
        assert_eq!(format!("{}", CompareOp::Lt), "<");
        assert_eq!(format!("{}", CompareOp::Lte), "<=");
    }

    #[test]
    fn test_from_symbol_round_trips_display() {
        for op in [
            CompareOp::Lt,
            CompareOp::Lte,
            CompareOp::Eq,
            CompareOp::NotEq,
            CompareOp::Gte,
            CompareOp::Gt,
        ] {
            assert_eq!(CompareOp::from_symbol(&op.to_string()), Some(op));
        }
        assert_eq!(CompareOp::from_symbol("=<"), None);
    }

    #[test]
    fn test_apply_operand_order() {
        assert!(CompareOp::Lt.apply(4.0, 10.0));
        assert!(!CompareOp::Lt.apply(10.0, 4.0));
        assert!(CompareOp::Gte.apply(10.0, 10.0));
        assert!(CompareOp::NotEq.apply(1.0, 2.0));
    }

    #[test]
    fn test_condition_display() {
        let cond = Condition {
            field: "height".to_string(),
            left: Some(Bound::new(CompareOp::Lt, 4.0).with_unit("in")),
            right: Some(Bound::new(CompareOp::Gt, 50.0)),
        };
        assert_eq!(cond.to_string(), "4 in < height > 50");
        assert!(!cond.is_degenerate());
    }
}
