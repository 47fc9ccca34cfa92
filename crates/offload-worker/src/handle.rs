// Task handle - the future a dispatch returns

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use offload_core::{TaskError, TaskId};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;

/// Resolves exactly once with the unit's output or the task's failure
///
/// Dropping the handle detaches the task; the unit still runs to completion.
#[derive(Debug)]
pub struct TaskHandle<O> {
    task_id: TaskId,
    unit: &'static str,
    inner: JoinHandle<Result<Value, TaskError>>,
    _output: PhantomData<fn() -> O>,
}

impl<O> TaskHandle<O> {
    pub(crate) fn new(
        task_id: TaskId,
        unit: &'static str,
        inner: JoinHandle<Result<Value, TaskError>>,
    ) -> Self {
        Self {
            task_id,
            unit,
            inner,
            _output: PhantomData,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Name of the unit running this task
    pub fn unit(&self) -> &'static str {
        self.unit
    }

    /// True once the result is available
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl<O: DeserializeOwned> Future for TaskHandle<O> {
    type Output = Result<O, TaskError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let joined = ready!(Pin::new(&mut self.inner).poll(cx));

        Poll::Ready(match joined {
            Ok(Ok(value)) => {
                serde_json::from_value(value).map_err(|e| TaskError::InvalidOutput(e.to_string()))
            }
            Ok(Err(e)) => Err(e),
            Err(e) => Err(TaskError::Internal(format!("task supervisor failed: {}", e))),
        })
    }
}
