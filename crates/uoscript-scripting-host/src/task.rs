use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::LocalBoxFuture;

use crate::error::ScriptResult;
use crate::timer::TimerId;
use crate::wait::WaitCondition;
use uoscript_client::client::TaskId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Runnable,
    Suspended,
    Completed,
    Errored(String),
    Terminated,
}

impl TaskStatus {
    /// Completed, Errored and Terminated never change again
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Errored(_) | TaskStatus::Terminated
        )
    }
}

/// A blocking call's request to the scheduler
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WaitRequest {
    pub condition: WaitCondition,
    pub timeout: Option<Duration>,
}

/// Mailbox between a task's body and the scheduler
#[derive(Debug, Default)]
pub(crate) struct TaskControl {
    /// Set by a suspending call on its first poll
    pub request: Option<WaitRequest>,
    /// Set by the scheduler when the wait resolves; true when satisfied
    pub outcome: Option<bool>,
}

pub(crate) type SharedControl = Rc<RefCell<TaskControl>>;

/// Future behind every blocking call. Registers its wait on first poll and
/// completes on the first poll after the scheduler resolves it.
pub(crate) struct Suspend {
    control: SharedControl,
    request: Option<WaitRequest>,
}

impl Suspend {
    pub fn new(control: SharedControl, condition: WaitCondition, timeout: Option<Duration>) -> Self {
        Self {
            control,
            request: Some(WaitRequest { condition, timeout }),
        }
    }
}

impl Future for Suspend {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<bool> {
        if let Some(request) = self.request.take() {
            let mut control = self.control.borrow_mut();
            control.outcome = None;
            control.request = Some(request);
            return Poll::Pending;
        }
        match self.control.borrow_mut().outcome.take() {
            Some(satisfied) => Poll::Ready(satisfied),
            None => Poll::Pending,
        }
    }
}

/// Where a suspended task is parked
#[derive(Debug)]
pub(crate) struct Suspension {
    pub condition: WaitCondition,
    /// Order in which tasks suspended; earlier suspensions are served first
    pub order: u64,
    pub timer: Option<TimerId>,
}

/// Scheduler-owned state of one script task
pub(crate) struct TaskEntry {
    pub id: TaskId,
    pub script_id: String,
    pub body: Option<LocalBoxFuture<'static, ScriptResult>>,
    pub control: SharedControl,
    pub status: TaskStatus,
    pub suspension: Option<Suspension>,
}
