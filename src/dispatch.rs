//! Call classification for intercepted connection and statement methods.

use std::fmt;

/// The intercepted methods, identified by name.
///
/// Matching is by exact method name only: every overload of
/// `prepare_statement` classifies the same way. Checking the shape of the
/// arguments is left to the rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    PrepareStatement,
    PrepareCall,
    CreateStatement,
    ExecuteQuery,
    ExecuteUpdate,
    Close,
}

impl CallKind {
    /// Classify a method by its name. Unknown names yield `None`.
    pub fn classify(method: &str) -> Option<Self> {
        match method {
            "prepare_statement" => Some(CallKind::PrepareStatement),
            "prepare_call" => Some(CallKind::PrepareCall),
            "create_statement" => Some(CallKind::CreateStatement),
            "execute_query" => Some(CallKind::ExecuteQuery),
            "execute_update" => Some(CallKind::ExecuteUpdate),
            "close" => Some(CallKind::Close),
            _ => None,
        }
    }

    /// Returns the method name this kind matches.
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::PrepareStatement => "prepare_statement",
            CallKind::PrepareCall => "prepare_call",
            CallKind::CreateStatement => "create_statement",
            CallKind::ExecuteQuery => "execute_query",
            CallKind::ExecuteUpdate => "execute_update",
            CallKind::Close => "close",
        }
    }

    /// Connection calls that hand back a statement.
    pub fn is_statement_producing(&self) -> bool {
        matches!(
            self,
            CallKind::PrepareStatement | CallKind::PrepareCall | CallKind::CreateStatement
        )
    }

    /// Calls whose SQL is supplied when the statement is created.
    pub fn is_prepare(&self) -> bool {
        matches!(self, CallKind::PrepareStatement | CallKind::PrepareCall)
    }

    /// Statement calls whose SQL is supplied at execution time.
    pub fn is_execute(&self) -> bool {
        matches!(self, CallKind::ExecuteQuery | CallKind::ExecuteUpdate)
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the interceptor does with a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Delegate immediately without looking at the arguments.
    Passthrough,
    /// Classify the call and rewrite its SQL when it matches.
    Inspect,
}

impl Dispatch {
    /// Decide per call; nothing is carried over between calls.
    pub fn of(method: &str) -> Self {
        match CallKind::classify(method) {
            Some(CallKind::Close) => Dispatch::Passthrough,
            _ => Dispatch::Inspect,
        }
    }
}

/// The object a call was made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Connection,
    Statement,
}
