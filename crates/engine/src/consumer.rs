// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded work-queue consumer
//!
//! One run moves through `WAITING -> RECEIVING -> PROCESSING` and, per
//! message, `DELETE_MESSAGE` or `EXTEND_VISIBILITY`, until the message limit
//! is used up or the time limit has passed. The time limit is checked after
//! each receive, so a run always makes at least one receive. A rate limiter
//! with a deadline also ends the run once no start slot is left.

use crate::error::ConsumerError;
use crate::throttle::RateLimiter;
use std::fmt;
use std::future::Future;
use swath_adapters::{QueueMessage, WorkQueue, MAX_RECEIVE_BATCH};
use swath_core::{Clock, DispatchConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsumerState {
    Waiting,
    Receiving,
    Processing,
    DeleteMessage,
    ExtendVisibility,
}

impl fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConsumerState::Waiting => "WAITING",
            ConsumerState::Receiving => "RECEIVING",
            ConsumerState::Processing => "PROCESSING",
            ConsumerState::DeleteMessage => "DELETE_MESSAGE",
            ConsumerState::ExtendVisibility => "EXTEND_VISIBILITY",
        };
        f.write_str(name)
    }
}

/// Consumer for one queue
pub struct Consumer<Q, C> {
    queue: Q,
    queue_url: String,
    config: DispatchConfig,
    clock: C,
    limiter: Option<RateLimiter>,
}

impl<Q: WorkQueue, C: Clock> Consumer<Q, C> {
    pub fn new(queue: Q, queue_url: impl Into<String>, config: DispatchConfig, clock: C) -> Self {
        let limiter = config.rate_limit_per_second.map(RateLimiter::per_second);
        Self {
            queue,
            queue_url: queue_url.into(),
            config,
            clock,
            limiter,
        }
    }

    /// Draw start slots from `limiter` instead of this consumer's own rate
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    fn enter(&self, state: ConsumerState) {
        tracing::debug!(queue_url = %self.queue_url, %state, "consumer state");
    }

    /// Receive and process messages until a limit is reached
    ///
    /// Returns the number of messages `process_fn` handled successfully.
    pub async fn consume<F, Fut, E>(&self, process_fn: F) -> Result<u64, ConsumerError>
    where
        F: Fn(QueueMessage) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: fmt::Display,
    {
        let started = self.clock.now();
        let mut remaining = self.config.message_limit;
        let mut processed = 0;

        tracing::info!(
            queue_url = %self.queue_url,
            message_limit = self.config.message_limit,
            time_limit_secs = self.config.time_limit.as_secs(),
            "consume started"
        );

        while remaining > 0 {
            self.enter(ConsumerState::Receiving);
            let batch = usize::try_from(remaining)
                .unwrap_or(MAX_RECEIVE_BATCH)
                .min(MAX_RECEIVE_BATCH);
            let messages = self
                .queue
                .receive(&self.queue_url, batch, self.config.visibility_timeout)
                .await?;

            if messages.is_empty() {
                if self.time_limit_reached(started) {
                    break;
                }
                self.enter(ConsumerState::Waiting);
                tokio::time::sleep(self.config.empty_receive_backoff).await;
                continue;
            }

            remaining = remaining.saturating_sub(messages.len() as u64);
            let mut out_of_slots = false;
            for message in messages {
                if !self.take_slot().await {
                    // Unstarted messages reappear after their visibility timeout
                    out_of_slots = true;
                    break;
                }
                processed += self.process_message(message, &process_fn).await?;
            }

            if out_of_slots {
                tracing::info!(queue_url = %self.queue_url, "start deadline reached");
                break;
            }
            if self.time_limit_reached(started) {
                break;
            }
            self.enter(ConsumerState::Waiting);
        }

        tracing::info!(queue_url = %self.queue_url, processed, "consume finished");
        Ok(processed)
    }

    /// Run `process_fn` on one message; 1 if it succeeded, 0 if it failed
    ///
    /// A failed message is left in flight and reappears once its visibility
    /// timeout lapses.
    pub async fn process_message<F, Fut, E>(
        &self,
        message: QueueMessage,
        process_fn: &F,
    ) -> Result<u64, ConsumerError>
    where
        F: Fn(QueueMessage) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: fmt::Display,
    {
        self.enter(ConsumerState::Processing);
        let receipt_handle = message.receipt_handle.clone();
        let message_id = message.message_id.clone();

        if let Err(e) = process_fn(message).await {
            tracing::warn!(queue_url = %self.queue_url, message_id = %message_id, error = %e, "message not processed");
            return Ok(0);
        }

        if self.config.delete_processed {
            self.enter(ConsumerState::DeleteMessage);
            self.queue.delete(&self.queue_url, &receipt_handle).await?;
        } else {
            self.enter(ConsumerState::ExtendVisibility);
            self.queue
                .change_visibility(&self.queue_url, &receipt_handle, self.config.in_flight_visibility)
                .await?;
        }
        Ok(1)
    }

    fn time_limit_reached(&self, started: std::time::Instant) -> bool {
        let elapsed = self.clock.now().saturating_duration_since(started);
        if elapsed >= self.config.time_limit {
            tracing::info!(queue_url = %self.queue_url, elapsed_ms = elapsed.as_millis() as u64, "time limit reached");
            return true;
        }
        false
    }

    /// Wait for a start slot when rate limited; false once none are left
    async fn take_slot(&self) -> bool {
        match &self.limiter {
            Some(limiter) => limiter.acquire().await,
            None => true,
        }
    }
}

/// Consumers for one staged run over several queues
///
/// With a configured rate every consumer draws from one limiter that closes
/// `time_limit` from now, so the whole run starts at most
/// `rate * time_limit` executions however the queues are loaded.
pub fn staged_consumers<Q: WorkQueue, C: Clock>(
    queue: Q,
    queue_urls: &[String],
    config: &DispatchConfig,
    clock: C,
) -> Vec<Consumer<Q, C>> {
    let limiter = config.rate_limit_per_second.map(|rate| {
        let limiter = RateLimiter::per_second(rate);
        match tokio::time::Instant::now().checked_add(config.time_limit) {
            Some(deadline) => limiter.until(deadline),
            None => limiter,
        }
    });
    queue_urls
        .iter()
        .map(|queue_url| {
            let consumer = Consumer::new(
                queue.clone(),
                queue_url.as_str(),
                config.clone(),
                clock.clone(),
            );
            match &limiter {
                Some(limiter) => consumer.with_rate_limiter(limiter.clone()),
                None => consumer,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "consumer_tests.rs"]
mod tests;
