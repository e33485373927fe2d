use crate::{CoreError, CoreResult};

use std::{future::Future, panic::Location, time::Duration};

use error_location::ErrorLocation;

/// Await `stage_future`, failing with [`CoreError::StageTimedOut`] once
/// `limit` elapses. `None` waits indefinitely.
#[track_caller]
pub(crate) fn within<T, F>(
    stage: &'static str,
    limit: Option<Duration>,
    stage_future: F,
) -> impl Future<Output = CoreResult<T>>
where
    F: Future<Output = CoreResult<T>>,
{
    let location = ErrorLocation::from(Location::caller());
    async move {
        match limit {
            None => stage_future.await,
            Some(timeout) => match tokio::time::timeout(timeout, stage_future).await {
                Ok(result) => result,
                Err(_) => Err(CoreError::StageTimedOut {
                    stage,
                    timeout,
                    location,
                }),
            },
        }
    }
}
