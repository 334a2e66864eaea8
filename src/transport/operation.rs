//! Request kinds understood by the deals service.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::codec::JsonCodec;
use crate::error::{DealsError, Result};

/// One service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Store a deal: `POST /deals/add`.
    Add,
    /// Cheapest deals from an origin: `GET /deals/top`.
    Top,
}

impl Operation {
    /// All operations.
    pub const ALL: [Operation; 2] = [Operation::Add, Operation::Top];

    /// Name used on the command line and in logs.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Top => "top",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Operation::Add => Method::POST,
            Operation::Top => Method::GET,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Operation::Add => "/deals/add",
            Operation::Top => "/deals/top",
        }
    }

    /// Whether the request fields are also sent as the body.
    pub fn has_body(self) -> bool {
        matches!(self, Operation::Add)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = DealsError;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| DealsError::UnknownOperation(s.to_string()))
    }
}

/// A fully built request, independent of the endpoint it goes to.
#[derive(Debug, Clone, PartialEq)]
pub struct DealsRequest {
    operation: Operation,
    query: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl DealsRequest {
    /// Build a request from a serializable struct of fields.
    ///
    /// Every top-level field goes into the query string, in declaration
    /// order. Operations with a body also carry the fields as JSON text.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `fields` does not serialize to a JSON object.
    pub fn new<T: Serialize>(operation: Operation, fields: &T) -> Result<Self> {
        let object = match serde_json::to_value(fields)? {
            Value::Object(object) => object,
            other => {
                return Err(DealsError::InvalidConfig(format!(
                    "{operation} fields must be an object, got {other}"
                )))
            }
        };

        let query = object
            .iter()
            .map(|(key, value)| (key.clone(), query_value(value)))
            .collect();

        let body = if operation.has_body() {
            Some(Bytes::from(JsonCodec::encode(fields)?))
        } else {
            None
        };

        Ok(Self {
            operation,
            query,
            body,
        })
    }

    /// Build a request from an operation name.
    ///
    /// Unknown names fail before any fields are looked at.
    pub fn named<T: Serialize>(name: &str, fields: &T) -> Result<Self> {
        let operation = name.parse()?;
        Self::new(operation, fields)
    }

    /// `POST /deals/add` with `fields` in the query and the body.
    pub fn add<T: Serialize>(fields: &T) -> Result<Self> {
        Self::new(Operation::Add, fields)
    }

    /// `GET /deals/top?origin=<origin>`.
    pub fn top(origin: &str) -> Self {
        Self {
            operation: Operation::Top,
            query: vec![("origin".to_string(), origin.to_string())],
            body: None,
        }
    }

    #[inline]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[inline]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    #[inline]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

/// Query-string form of a JSON value: strings unquoted, everything else
/// in its JSON text form.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Status and body of one service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ServiceResponse {
    /// Whether the status is 2xx.
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
