// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Wait conditions and the fetch results they are evaluated against

use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::constants::wait::MIN_POLL_INTERVAL;
use crate::jsonpath::FieldPath;

/// Error returned by a state fetch
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("resource not found")]
    NotFound,

    #[error(transparent)]
    Failed(kube::Error),
}

impl FetchError {
    /// Classify a Kubernetes client error, mapping HTTP 404 to `NotFound`
    pub fn from_kube(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ref resp) if resp.code == 404 => FetchError::NotFound,
            other => FetchError::Failed(other),
        }
    }
}

/// What a wait is waiting for
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The resource can no longer be fetched
    ResourceAbsent,
    /// The field at `path` resolves to `expected`, or to any non-empty value
    /// when no value is expected
    FieldEquals {
        path: FieldPath,
        expected: Option<String>,
    },
}

/// Result of a single evaluation against fetched state
#[derive(Debug)]
pub(crate) enum Evaluation {
    Satisfied,
    Pending,
    Fatal(FetchError),
}

impl Condition {
    pub(crate) fn evaluate(&self, fetched: Result<Value, FetchError>) -> Evaluation {
        match (self, fetched) {
            (Condition::ResourceAbsent, Err(FetchError::NotFound)) => Evaluation::Satisfied,
            (Condition::ResourceAbsent, Ok(_)) => Evaluation::Pending,
            (Condition::FieldEquals { .. }, Err(FetchError::NotFound)) => Evaluation::Pending,
            (Condition::FieldEquals { path, expected }, Ok(document)) => {
                let satisfied = match (path.resolve(&document), expected) {
                    (None, _) => false,
                    (Some(actual), None) => !actual.is_empty(),
                    (Some(actual), Some(expected)) => actual == *expected,
                };
                if satisfied {
                    Evaluation::Satisfied
                } else {
                    Evaluation::Pending
                }
            }
            (_, Err(err)) => Evaluation::Fatal(err),
        }
    }

    /// Check whether an already fetched document satisfies this condition
    pub fn is_satisfied(&self, fetched: Result<Value, FetchError>) -> bool {
        matches!(self.evaluate(fetched), Evaluation::Satisfied)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::ResourceAbsent => write!(f, "resource deletion"),
            Condition::FieldEquals {
                path,
                expected: Some(value),
            } => write!(f, "{} to equal '{}'", path, value),
            Condition::FieldEquals {
                path,
                expected: None,
            } => write!(f, "{} to be set", path),
        }
    }
}

/// A single wait: the condition plus its time limits
#[derive(Debug, Clone, PartialEq)]
pub struct WaitSpec {
    pub condition: Condition,
    /// Overall limit measured from the first fetch; zero means check once
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitSpec {
    /// Build a wait spec, raising `poll_interval` to `MIN_POLL_INTERVAL`
    pub fn new(condition: Condition, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            condition,
            timeout,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }
}
