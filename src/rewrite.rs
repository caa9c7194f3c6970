//! SQL comment construction and argument rewriting.

use std::borrow::Cow;

use sea_orm::Value;

use crate::address::LocalAddress;
use crate::config::ProjectName;
use crate::dispatch::{CallKind, Dispatch, Surface};
use crate::error::{Error, Result};

/// Prepends the caller comment to SQL text.
///
/// Shared by every decorator an interceptor hands out. Both fields are fixed
/// at construction, so a `SqlCommenter` can be read from any number of
/// threads without locking.
///
/// The comment has the shape `" /* {project_name} from {local_address} */ "`
/// and is always placed in front of the original SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlCommenter {
    project_name: ProjectName,
    local_address: LocalAddress,
}

impl SqlCommenter {
    /// Build a commenter for a fixed project name and address.
    pub fn new(project_name: ProjectName, local_address: LocalAddress) -> Self {
        Self {
            project_name,
            local_address,
        }
    }

    /// The project name written before `from`.
    pub fn project_name(&self) -> &ProjectName {
        &self.project_name
    }

    /// The address list written after `from`.
    pub fn local_address(&self) -> &LocalAddress {
        &self.local_address
    }

    /// Prepend the caller comment to `sql`.
    ///
    /// Existing comments are left alone, so commenting twice yields two
    /// comments.
    pub fn comment_sql(&self, sql: &str) -> String {
        format!(
            " /* {} from {} */ {}",
            self.project_name, self.local_address, sql
        )
    }

    /// Comment the SQL of a call that has already been classified.
    pub(crate) fn comment_call(&self, kind: CallKind, sql: &str) -> String {
        let commented = self.comment_sql(sql);
        tracing::debug!(method = %kind, sql = %commented, "changed sql");
        commented
    }

    /// Rewrite the arguments of a connection call.
    ///
    /// `prepare_statement` and `prepare_call` get a copy of `args` with the
    /// SQL in position 0 commented. Any other method gets `args` back as the
    /// same borrowed slice. Absent arguments stay absent.
    pub fn change_sql<'a>(
        &self,
        method: &str,
        args: Option<&'a [Value]>,
    ) -> Result<Option<Cow<'a, [Value]>>> {
        let Some(args) = args else {
            return Ok(None);
        };

        match CallKind::classify(method) {
            Some(kind) if kind.is_prepare() => self.comment_first(kind, args).map(Some),
            _ => {
                tracing::debug!(method, "sql not changed");
                Ok(Some(Cow::Borrowed(args)))
            }
        }
    }

    /// Rewrite the arguments of a statement call.
    ///
    /// Only `execute_query` and `execute_update` are rewritten.
    pub fn change_execute_sql<'a>(
        &self,
        method: &str,
        args: Option<&'a [Value]>,
    ) -> Result<Option<Cow<'a, [Value]>>> {
        let Some(args) = args else {
            return Ok(None);
        };

        match CallKind::classify(method) {
            Some(kind) if kind.is_execute() => self.comment_first(kind, args).map(Some),
            _ => {
                tracing::debug!(method, "sql not changed");
                Ok(Some(Cow::Borrowed(args)))
            }
        }
    }

    /// Entry point for hosts that dispatch calls by method name.
    ///
    /// `close` always passes through. On a connection only statement-producing
    /// calls are inspected; on a statement every other call is inspected.
    pub fn rewrite_call<'a>(
        &self,
        surface: Surface,
        method: &str,
        args: Option<&'a [Value]>,
    ) -> Result<Option<Cow<'a, [Value]>>> {
        if Dispatch::of(method) == Dispatch::Passthrough {
            return Ok(args.map(Cow::Borrowed));
        }

        match surface {
            Surface::Connection => match CallKind::classify(method) {
                Some(kind) if kind.is_statement_producing() => self.change_sql(method, args),
                _ => Ok(args.map(Cow::Borrowed)),
            },
            Surface::Statement => self.change_execute_sql(method, args),
        }
    }

    fn comment_first<'a>(&self, kind: CallKind, args: &'a [Value]) -> Result<Cow<'a, [Value]>> {
        let sql = match args.first() {
            Some(Value::String(Some(sql))) => sql.as_str(),
            Some(Value::String(None)) => {
                return Err(Error::invalid_argument(format!(
                    "{kind} called with a NULL sql argument"
                )));
            }
            Some(other) => {
                return Err(Error::invalid_argument(format!(
                    "{kind} expects sql as its first argument, got {other:?}"
                )));
            }
            None => {
                return Err(Error::invalid_argument(format!(
                    "{kind} called without a sql argument"
                )));
            }
        };

        let commented = self.comment_call(kind, sql);
        let mut changed = args.to_vec();
        changed[0] = Value::from(commented);
        Ok(Cow::Owned(changed))
    }
}
