use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use tracing::{debug, info, warn};

use crate::api::{
    DetailsPayload, Mutation, REQUEST_FETCH_DELAY, REQUEST_FETCH_RETRIES, ResourcesPayload,
    TimeClockApi, fetch_with_retry,
};
use crate::editor::DraftKey;
use crate::error::ApiResult;
use crate::types::{DateRange, RequestItem, TimeClock, UserId, WorklogId};

/// What a mutation was issued for, so its completion can clear the right
/// saving mark.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin {
    Worklog(WorklogId),
    Draft(DraftKey),
    Bulk,
    Requests,
}

/// Background API calls. Each job runs on its own thread and reports back over
/// a channel that the UI drains on every tick. Loads carry the sequence number
/// they were issued under so superseded results can be told apart.
#[derive(Debug)]
pub enum Job {
    Users {
        seq: u64,
        range: DateRange,
    },
    Details {
        seq: u64,
        user_id: UserId,
        range: DateRange,
    },
    Resources {
        company_id: Option<u32>,
    },
    Requests {
        seq: u64,
        user_id: UserId,
        range: DateRange,
    },
    Mutate {
        origin: Origin,
        mutation: Mutation,
    },
}

#[derive(Debug)]
pub enum JobResult {
    Users {
        seq: u64,
        result: ApiResult<Vec<TimeClock>>,
    },
    Details {
        seq: u64,
        user_id: UserId,
        result: ApiResult<DetailsPayload>,
    },
    Resources(ApiResult<ResourcesPayload>),
    Requests {
        seq: u64,
        user_id: UserId,
        result: ApiResult<Vec<RequestItem>>,
    },
    Mutated {
        origin: Origin,
        mutation: Mutation,
        result: ApiResult<String>,
    },
}

pub struct Worker {
    api: Arc<dyn TimeClockApi>,
    tx: Sender<JobResult>,
    rx: Receiver<JobResult>,
    in_flight: usize,
}

impl Worker {
    pub fn new(api: Arc<dyn TimeClockApi>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            api,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn submit(&mut self, job: Job) {
        self.in_flight += 1;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = run(api.as_ref(), job);
            if tx.send(result).is_err() {
                debug!("worker_result_dropped");
            }
        });
    }

    /// Next finished job, if any, without blocking.
    pub fn try_recv(&mut self) -> Option<JobResult> {
        match self.rx.try_recv() {
            Ok(result) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(result)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks until the next job finishes.
    #[cfg(test)]
    pub fn recv(&mut self) -> Option<JobResult> {
        let result = self.rx.recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(result)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

fn run(api: &dyn TimeClockApi, job: Job) -> JobResult {
    match job {
        Job::Users { seq, range } => {
            debug!(seq, %range, "load_users");
            JobResult::Users {
                seq,
                result: api.users(&range),
            }
        }
        Job::Details {
            seq,
            user_id,
            range,
        } => {
            debug!(seq, user_id, %range, "load_details");
            JobResult::Details {
                seq,
                user_id,
                result: api.details(user_id, &range),
            }
        }
        Job::Resources { company_id } => {
            debug!(?company_id, "load_resources");
            JobResult::Resources(api.resources(company_id))
        }
        Job::Requests {
            seq,
            user_id,
            range,
        } => {
            debug!(seq, user_id, %range, "load_requests");
            JobResult::Requests {
                seq,
                user_id,
                result: fetch_with_retry(
                    || api.request_details(user_id, &range),
                    REQUEST_FETCH_RETRIES,
                    REQUEST_FETCH_DELAY,
                ),
            }
        }
        Job::Mutate { origin, mutation } => {
            info!(endpoint = mutation.endpoint(), ?origin, "mutation_sent");
            let result = api.send(&mutation);
            match &result {
                Ok(message) => info!(endpoint = mutation.endpoint(), %message, "mutation_done"),
                Err(err) => warn!(endpoint = mutation.endpoint(), error = %err, "mutation_failed"),
            }
            JobResult::Mutated {
                origin,
                mutation,
                result,
            }
        }
    }
}
