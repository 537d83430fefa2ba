//! Callback-style asynchronous requests.
//!
//! A request collects named optional fields plus one mandatory completion
//! callback. [`HashRequest::spawn`] and [`CompareRequest::spawn`] reject a
//! malformed request synchronously, before anything is scheduled. From
//! then on every outcome, error or success, reaches the completion
//! callback exactly once, after the last progress notification.

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use zeroize::Zeroizing;

use crate::config::Config;
use crate::crypto::Cost;
use crate::error::{Error, Result};
use crate::password::PasswordInput;
use crate::{SaltOrCost, resolve_salt, scheduler};

/// Progress notification, called with the completed fraction in `(0, 1]`.
pub type ProgressFn = Box<dyn FnMut(f64) + Send + 'static>;
/// Terminal outcome of a request.
pub type CompletionFn<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

fn runtime() -> Result<Handle> {
    Handle::try_current().map_err(|_| Error::Runtime)
}

fn notify(on_progress: &mut Option<ProgressFn>) -> impl FnMut(f64) + '_ {
    move |fraction| {
        if let Some(f) = on_progress.as_mut() {
            f(fraction)
        }
    }
}

pub struct HashRequest {
    config: Config,
    password: Option<Zeroizing<Vec<u8>>>,
    salt: Option<String>,
    cost: Option<Cost>,
    on_progress: Option<ProgressFn>,
    on_complete: Option<CompletionFn<String>>,
}

impl HashRequest {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config,
            password: None,
            salt: None,
            cost: None,
            on_progress: None,
            on_complete: None,
        }
    }

    /// Converted to bytes right away with the configured encoding.
    pub fn password<P: PasswordInput + ?Sized>(mut self, password: &P) -> Self {
        self.password = Some(password.to_password_bytes(self.config.encoding()));
        self
    }

    /// Existing setting to hash under. Validated once the request runs.
    pub fn salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// Cost for a freshly generated salt.
    pub fn cost(mut self, cost: Cost) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn on_progress(mut self, f: impl FnMut(f64) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnOnce(Result<String>) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn spawn(self) -> Result<JoinHandle<()>> {
        let password = self.password.ok_or(Error::PasswordMissing)?;
        let on_complete = self
            .on_complete
            .ok_or(Error::Argument("a completion callback is required"))?;
        let salt = match (self.salt, self.cost) {
            (Some(_), Some(_)) => {
                return Err(Error::Argument("give either a salt or a cost, not both"));
            }
            (Some(salt), None) => Some(SaltOrCost::Salt(salt)),
            (None, Some(cost)) => Some(SaltOrCost::Cost(cost)),
            (None, None) => None,
        };
        let runtime = runtime()?;

        let config = self.config;
        let mut on_progress = self.on_progress;
        Ok(runtime.spawn(async move {
            let result = run_hash(&config, &password, salt, &mut on_progress).await;
            on_complete(result);
        }))
    }
}

async fn run_hash(
    config: &Config,
    password: &[u8],
    salt: Option<SaltOrCost>,
    on_progress: &mut Option<ProgressFn>,
) -> Result<String> {
    let salt = resolve_salt(config, salt)?;
    let record = scheduler::hash(
        password,
        &salt,
        config.rounds_per_slice(),
        notify(on_progress),
    )
    .await;
    Ok(record.to_string())
}

pub struct CompareRequest {
    config: Config,
    password: Option<Zeroizing<Vec<u8>>>,
    hash: Option<String>,
    on_progress: Option<ProgressFn>,
    on_complete: Option<CompletionFn<bool>>,
}

impl CompareRequest {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config,
            password: None,
            hash: None,
            on_progress: None,
            on_complete: None,
        }
    }

    pub fn password<P: PasswordInput + ?Sized>(mut self, password: &P) -> Self {
        self.password = Some(password.to_password_bytes(self.config.encoding()));
        self
    }

    /// Stored hash to check the password against.
    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn on_progress(mut self, f: impl FnMut(f64) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnOnce(Result<bool>) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn spawn(self) -> Result<JoinHandle<()>> {
        let password = self.password.ok_or(Error::PasswordMissing)?;
        let hash = self
            .hash
            .ok_or(Error::Argument("a hash to compare against is required"))?;
        let on_complete = self
            .on_complete
            .ok_or(Error::Argument("a completion callback is required"))?;
        let runtime = runtime()?;

        let rounds_per_slice = self.config.rounds_per_slice();
        let mut on_progress = self.on_progress;
        Ok(runtime.spawn(async move {
            let result =
                scheduler::verify(&password, &hash, rounds_per_slice, notify(&mut on_progress))
                    .await;
            on_complete(result);
        }))
    }
}
