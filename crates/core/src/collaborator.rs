//! External request services.
//!
//! The calculator and list-sorting services sit outside the protocol
//! engines. They are reached only through [`RemoteService::submit`]: hand
//! over a request, get a result back. How a real deployment carries the
//! request is not modelled; the local implementations answer in-process.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors a collaborator can report back to its caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollaboratorError {
    /// Division with a zero divisor.
    #[error("division of {0} by zero")]
    DivisionByZero(f64),

    /// The operation produced a non-finite value.
    #[error("{0} produced a non-finite result")]
    NonFinite(CalculatorRequest),
}

/// Opaque "submit request, receive result" capability.
pub trait RemoteService {
    type Request;
    type Response;

    /// Submit one request and wait for its result.
    fn submit(&self, request: Self::Request) -> Result<Self::Response, CollaboratorError>;
}

/// Arithmetic operation accepted by the calculator service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorRequest {
    Add(f64, f64),
    Sub(f64, f64),
    Mul(f64, f64),
    Div(f64, f64),
}

impl CalculatorRequest {
    /// Operation name as used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add(..) => "addition",
            Self::Sub(..) => "subtraction",
            Self::Mul(..) => "multiplication",
            Self::Div(..) => "division",
        }
    }

    /// Build a request from an operation name (`add`, `sub`, `mul`, `div`).
    pub fn parse(op: &str, a: f64, b: f64) -> Option<Self> {
        match op.to_lowercase().as_str() {
            "add" | "+" => Some(Self::Add(a, b)),
            "sub" | "-" => Some(Self::Sub(a, b)),
            "mul" | "*" => Some(Self::Mul(a, b)),
            "div" | "/" => Some(Self::Div(a, b)),
            _ => None,
        }
    }
}

impl fmt::Display for CalculatorRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(a, b) => write!(f, "{} + {}", a, b),
            Self::Sub(a, b) => write!(f, "{} - {}", a, b),
            Self::Mul(a, b) => write!(f, "{} * {}", a, b),
            Self::Div(a, b) => write!(f, "{} / {}", a, b),
        }
    }
}

/// In-process calculator service.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCalculator;

impl RemoteService for LocalCalculator {
    type Request = CalculatorRequest;
    type Response = f64;

    fn submit(&self, request: CalculatorRequest) -> Result<f64, CollaboratorError> {
        debug!(op = request.name(), %request, "Calculator request received");

        let result = match request {
            CalculatorRequest::Add(a, b) => a + b,
            CalculatorRequest::Sub(a, b) => a - b,
            CalculatorRequest::Mul(a, b) => a * b,
            CalculatorRequest::Div(a, b) => {
                if b == 0.0 {
                    warn!(dividend = a, "Division by zero attempted");
                    return Err(CollaboratorError::DivisionByZero(a));
                }
                a / b
            }
        };

        if !result.is_finite() {
            return Err(CollaboratorError::NonFinite(request));
        }

        debug!(op = request.name(), result, "Calculator request completed");
        Ok(result)
    }
}

/// In-process list-sorting service.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSorter;

impl RemoteService for LocalSorter {
    type Request = Vec<i64>;
    type Response = Vec<i64>;

    fn submit(&self, mut request: Vec<i64>) -> Result<Vec<i64>, CollaboratorError> {
        debug!(len = request.len(), "Sort request received");
        request.sort_unstable();
        Ok(request)
    }
}
