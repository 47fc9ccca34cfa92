// Task channel
//
// Single-shot link between a caller and one computation unit instance.
// Each end is consumed by the call that uses it, so the compiler rules out a
// second input or a second response. The unit side only gets a `Responder`
// after it has received the input, which orders the response after the input.

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::TaskError;
use crate::task::{InputMessage, Outcome, ResponseMessage, TaskId};

/// Create the two ends of a task channel
pub fn task_channel(task_id: TaskId) -> (CallerEnd, UnitEnd) {
    let (input_tx, input_rx) = oneshot::channel();
    let (response_tx, response_rx) = oneshot::channel();

    (
        CallerEnd {
            task_id,
            input_tx,
            response_rx,
        },
        UnitEnd {
            task_id,
            input_rx,
            response_tx,
        },
    )
}

/// Caller side, before the input has been sent
#[derive(Debug)]
pub struct CallerEnd {
    task_id: TaskId,
    input_tx: oneshot::Sender<InputMessage>,
    response_rx: oneshot::Receiver<ResponseMessage>,
}

impl CallerEnd {
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Send the one input message, returning the side that awaits the response
    ///
    /// Fails with `NoResult` if the unit end is already gone.
    pub fn send(self, payload: Value) -> Result<PendingResponse, TaskError> {
        let message = InputMessage {
            task_id: self.task_id,
            payload,
        };
        self.input_tx
            .send(message)
            .map_err(|_| TaskError::NoResult)?;

        Ok(PendingResponse {
            task_id: self.task_id,
            response_rx: self.response_rx,
        })
    }
}

/// Caller side, after the input has been sent
#[derive(Debug)]
pub struct PendingResponse {
    task_id: TaskId,
    response_rx: oneshot::Receiver<ResponseMessage>,
}

impl PendingResponse {
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Wait for the response
    ///
    /// A unit end dropped without responding (returned early, panicked) yields
    /// `NoResult` instead of hanging.
    pub async fn recv(self) -> Result<Value, TaskError> {
        let message = self.response_rx.await.map_err(|_| TaskError::NoResult)?;

        if message.task_id != self.task_id {
            return Err(TaskError::protocol(format!(
                "response for task {} arrived on channel of task {}",
                message.task_id, self.task_id
            )));
        }

        message.outcome.into_result()
    }
}

/// Unit side, before the input has arrived
#[derive(Debug)]
pub struct UnitEnd {
    task_id: TaskId,
    input_rx: oneshot::Receiver<InputMessage>,
    response_tx: oneshot::Sender<ResponseMessage>,
}

impl UnitEnd {
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Block the current thread until the input arrives
    ///
    /// Must not be called from within an async context.
    pub fn recv_input(self) -> Result<(Value, Responder), TaskError> {
        let message = self
            .input_rx
            .blocking_recv()
            .map_err(|_| TaskError::protocol("caller dropped the channel before sending input"))?;
        Self::accept(self.task_id, message, self.response_tx)
    }

    /// Async variant of [`UnitEnd::recv_input`]
    pub async fn recv_input_async(self) -> Result<(Value, Responder), TaskError> {
        let message = self
            .input_rx
            .await
            .map_err(|_| TaskError::protocol("caller dropped the channel before sending input"))?;
        Self::accept(self.task_id, message, self.response_tx)
    }

    fn accept(
        task_id: TaskId,
        message: InputMessage,
        response_tx: oneshot::Sender<ResponseMessage>,
    ) -> Result<(Value, Responder), TaskError> {
        if message.task_id != task_id {
            return Err(TaskError::protocol(format!(
                "input for task {} arrived on channel of task {}",
                message.task_id, task_id
            )));
        }

        Ok((
            message.payload,
            Responder {
                task_id,
                response_tx,
            },
        ))
    }
}

/// Unit side, holding the right to send the single response
#[derive(Debug)]
pub struct Responder {
    task_id: TaskId,
    response_tx: oneshot::Sender<ResponseMessage>,
}

impl Responder {
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Send the response. Returns false if the caller stopped listening.
    pub fn respond(self, outcome: Outcome) -> bool {
        self.response_tx
            .send(ResponseMessage {
                task_id: self.task_id,
                outcome,
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_round_trip() {
        let (caller, unit) = task_channel(Uuid::now_v7());

        let pending = caller.send(json!(5)).unwrap();
        let (payload, responder) = unit.recv_input_async().await.unwrap();
        assert_eq!(payload, json!(5));
        assert!(responder.respond(Outcome::Success(json!(10))));

        assert_eq!(pending.recv().await.unwrap(), json!(10));
    }

    #[tokio::test]
    async fn test_failure_outcome_rejects() {
        let (caller, unit) = task_channel(Uuid::now_v7());

        let pending = caller.send(json!("x")).unwrap();
        let (_, responder) = unit.recv_input_async().await.unwrap();
        responder.respond(Outcome::Failure("bad input".into()));

        assert_eq!(
            pending.recv().await,
            Err(TaskError::UnitFailed("bad input".into()))
        );
    }

    #[tokio::test]
    async fn test_dropped_responder_yields_no_result() {
        let (caller, unit) = task_channel(Uuid::now_v7());

        let pending = caller.send(json!(1)).unwrap();
        let (_, responder) = unit.recv_input_async().await.unwrap();
        drop(responder);

        assert_eq!(pending.recv().await, Err(TaskError::NoResult));
    }

    #[tokio::test]
    async fn test_send_after_unit_dropped() {
        let (caller, unit) = task_channel(Uuid::now_v7());
        drop(unit);

        assert_eq!(caller.send(json!(1)).unwrap_err(), TaskError::NoResult);
    }

    #[tokio::test]
    async fn test_unit_sees_dropped_caller() {
        let (caller, unit) = task_channel(Uuid::now_v7());
        drop(caller);

        let err = unit.recv_input_async().await.unwrap_err();
        assert!(matches!(err, TaskError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_mismatched_response_is_protocol_violation() {
        let (caller, unit) = task_channel(Uuid::now_v7());

        let pending = caller.send(json!(1)).unwrap();
        let (_, responder) = unit.recv_input_async().await.unwrap();
        let forged = Responder {
            task_id: Uuid::now_v7(),
            response_tx: responder.response_tx,
        };
        forged.respond(Outcome::Success(json!(1)));

        assert!(matches!(pending.recv().await, Err(TaskError::Protocol(_))));
    }

    #[test]
    fn test_blocking_receive_on_plain_thread() {
        let (caller, unit) = task_channel(Uuid::now_v7());

        let worker = std::thread::spawn(move || {
            let (payload, responder) = unit.recv_input().unwrap();
            let n = payload.as_u64().unwrap();
            responder.respond(Outcome::Success(json!(n * 2)));
        });

        let pending = caller.send(json!(21)).unwrap();
        worker.join().unwrap();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        assert_eq!(runtime.block_on(pending.recv()).unwrap(), json!(42));
    }
}
