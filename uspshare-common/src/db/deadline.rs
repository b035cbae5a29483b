//! Per-call deadlines for persistence operations
//!
//! Every gateway call runs under a timeout sized by the cost of the query.
//! On expiry the call fails with [`Error::Timeout`], which the HTTP layer
//! reports as a generic server error.

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Cost class of a query, which picks its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryCost {
    /// Single-row lookup or single-row write
    Point,
    /// Multi-row listing
    List,
    /// Join/aggregation across tables
    Aggregate,
    /// Aggregation scoped to one user's history
    UserAggregate,
}

impl QueryCost {
    pub fn deadline(self) -> Duration {
        match self {
            QueryCost::Point => Duration::from_secs(5),
            QueryCost::List => Duration::from_secs(10),
            QueryCost::Aggregate => Duration::from_secs(15),
            QueryCost::UserAggregate => Duration::from_secs(20),
        }
    }
}

/// Run `fut` under the deadline for `cost`
///
/// `op` names the operation in the timeout error and logs.
pub async fn bounded<T, F>(cost: QueryCost, op: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    bounded_for(cost.deadline(), op, fut).await
}

pub(crate) async fn bounded_for<T, F>(limit: Duration, op: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Error::from),
        Err(_) => {
            tracing::warn!(operation = op, deadline_ms = limit.as_millis() as u64, "Query deadline exceeded");
            Err(Error::Timeout(op.to_string()))
        }
    }
}
