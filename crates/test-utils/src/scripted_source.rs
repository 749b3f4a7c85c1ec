use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use watchreload::errors::{Result, WatchreloadError};
use watchreload::watch::{
    CancelToken, ChangeBatch, ChangeEvent, ChangeSource, RootSet, Subscription,
};

/// One scripted delivery.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Batch(ChangeBatch),
    Fail(String),
}

#[derive(Debug, Default)]
struct Inner {
    steps: Mutex<VecDeque<ScriptStep>>,
    subscriptions: Mutex<Vec<RootSet>>,
    fail_subscribe: Mutex<Option<String>>,
}

/// A change source that replays scripted batches instead of touching the
/// filesystem.
///
/// - Steps are shared by all subscriptions, in order.
/// - With no step queued, a subscription behaves like an idle raw watch:
///   it yields an empty batch after each poll interval and honours
///   cancellation in between.
/// - Every successful `subscribe` records the roots it was opened with.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    inner: Arc<Inner>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch<I>(&self, events: I)
    where
        I: IntoIterator<Item = ChangeEvent>,
    {
        self.push(ScriptStep::Batch(events.into_iter().collect()));
    }

    /// Make the subscription that reaches this step fail mid-flight.
    pub fn push_failure(&self, message: &str) {
        self.push(ScriptStep::Fail(message.to_string()));
    }

    /// Make the next `subscribe` call fail.
    pub fn fail_next_subscribe(&self, message: &str) {
        *self.inner.fail_subscribe.lock().unwrap() = Some(message.to_string());
    }

    /// Roots of every subscription opened so far.
    pub fn subscriptions(&self) -> Vec<RootSet> {
        self.inner.subscriptions.lock().unwrap().clone()
    }

    pub fn pending_steps(&self) -> usize {
        self.inner.steps.lock().unwrap().len()
    }

    fn push(&self, step: ScriptStep) {
        self.inner.steps.lock().unwrap().push_back(step);
    }
}

impl ChangeSource for ScriptedSource {
    fn subscribe(
        &self,
        roots: &RootSet,
        poll_interval: Duration,
        cancel: CancelToken,
    ) -> Result<Subscription> {
        if let Some(message) = self.inner.fail_subscribe.lock().unwrap().take() {
            return Err(WatchreloadError::Subscription(message));
        }
        self.inner.subscriptions.lock().unwrap().push(roots.clone());

        Ok(Box::new(ScriptedSubscription {
            inner: Arc::clone(&self.inner),
            poll_interval,
            cancel,
        }))
    }
}

struct ScriptedSubscription {
    inner: Arc<Inner>,
    poll_interval: Duration,
    cancel: CancelToken,
}

impl Iterator for ScriptedSubscription {
    type Item = Result<ChangeBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel.is_cancelled() {
            return None;
        }

        let step = self.inner.steps.lock().unwrap().pop_front();
        match step {
            Some(ScriptStep::Batch(batch)) => Some(Ok(batch)),
            Some(ScriptStep::Fail(message)) => Some(Err(WatchreloadError::Subscription(message))),
            None => {
                let deadline = Instant::now() + self.poll_interval;
                loop {
                    if self.cancel.is_cancelled() {
                        return None;
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        return Some(Ok(ChangeBatch::new()));
                    }
                    thread::sleep((deadline - now).min(Duration::from_millis(5)));
                }
            }
        }
    }
}
