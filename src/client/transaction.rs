//! Optimistic transactions (`WATCH` / `MULTI` / `EXEC`) with retry
use crate::client::{ClientError, RedisClient, Value};
use crate::invoker::CommandExecutor;
use core::time::Duration;
use std::thread;

/// Delay strategy between two attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    /// Always waits the full delay
    Predictable,
    /// Waits a random share of 10% to 100% of the delay
    Randomized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_retries: u32,
    pub jitter: Jitter,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            delay: Duration::from_millis(10),
            max_retries: 3,
            jitter: Jitter::Randomized,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt
    pub fn backoff(&self) -> Duration {
        match self.jitter {
            Jitter::Predictable => self.delay,
            Jitter::Randomized => self.delay.mul_f64(0.1 + 0.9 * rand::random::<f64>()),
        }
    }
}

impl<E: CommandExecutor> RedisClient<E> {
    /// Runs `pre_multi`, `MULTI`, `post_multi` and `EXEC` until `EXEC` succeeds
    ///
    /// `pre_multi` typically issues `WATCH` and reads the current state, `post_multi` queues the
    /// writes. A Nil `EXEC` reply (watched key changed) leads to a retry according to `policy`.
    /// If `post_multi` fails, the transaction is discarded and the error is returned.
    ///
    /// Returns the replies of the queued commands.
    pub fn transaction<P, Q>(
        &mut self,
        name: &str,
        policy: &RetryPolicy,
        mut pre_multi: P,
        mut post_multi: Q,
    ) -> Result<Vec<Value>, ClientError>
    where
        P: FnMut(&mut Self) -> Result<(), ClientError>,
        Q: FnMut(&mut Self) -> Result<(), ClientError>,
    {
        let mut retries = 0;
        loop {
            pre_multi(self)?;
            self.command(["MULTI"])?;

            if let Err(error) = post_multi(self) {
                if let Err(discard) = self.command(["DISCARD"]) {
                    tracing::warn!(transaction = name, error = %discard, "discard failed");
                }
                return Err(error);
            }

            match self.command(["EXEC"])? {
                Value::Array(replies) => return Ok(replies),
                Value::Nil => {}
                _ => return Err(ClientError::UnexpectedType("array")),
            }

            retries += 1;
            if retries > policy.max_retries {
                tracing::warn!(transaction = name, retries = policy.max_retries, "transaction failed");
                return Err(ClientError::TransactionFailed(name.to_string()));
            }

            let delay = policy.backoff();
            tracing::debug!(transaction = name, attempt = retries, ?delay, "transaction aborted, retrying");
            thread::sleep(delay);
        }
    }
}
