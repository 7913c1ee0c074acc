//! Start/stop handshake for background samplers
//!
//! A sampler runs on its own thread. The caller is released only after the
//! worker has finished [`Sampler::start`], and [`SamplerHandle::stop`] blocks
//! until the worker has taken a final sample and reported its aggregate.

use crate::error::{Error, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Interval between samples unless a sampler overrides it
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A measurement source driven by a [`SamplerHandle`]
pub trait Sampler: Send + 'static {
    type Output: Send + 'static;

    /// Short name used for the worker thread
    fn name(&self) -> &'static str {
        "sampler"
    }

    /// Runs once on the worker thread before the caller is released
    fn start(&mut self) -> Result<()>;

    /// Runs once per tick, and once more after the stop signal
    fn sample(&mut self) -> Result<()>;

    /// Turns the collected state into the aggregate result
    fn finish(self) -> Result<Self::Output>;

    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }
}

enum Control {
    Stop,
}

enum Report<T> {
    Ready,
    Done(Result<T>),
}

/// Owner side of a running sampler
pub struct SamplerHandle<T> {
    control: Sender<Control>,
    report: Receiver<Report<T>>,
    thread: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> SamplerHandle<T> {
    /// Spawn the sampler and wait for it to become ready
    pub fn spawn<S>(sampler: S) -> Result<Self>
    where
        S: Sampler<Output = T>,
    {
        let (control_tx, control_rx) = mpsc::channel();
        let (report_tx, report_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name(format!("{}-sampler", sampler.name()))
            .spawn(move || run_worker(sampler, control_rx, report_tx))?;

        let mut handle = SamplerHandle {
            control: control_tx,
            report: report_rx,
            thread: Some(thread),
        };

        let first = handle.report.recv();
        match first {
            Ok(Report::Ready) => Ok(handle),
            Ok(Report::Done(result)) => {
                handle.join()?;
                Err(result.err().unwrap_or_else(|| {
                    Error::Disconnected("sampler finished before it was ready".to_string())
                }))
            }
            Err(_) => {
                handle.join()?;
                Err(Error::Disconnected(
                    "sampler exited during start".to_string(),
                ))
            }
        }
    }

    /// Signal the worker to stop and collect its aggregate
    pub fn stop(mut self) -> Result<T> {
        // The worker may already have exited after a failed sample; its
        // report is still queued.
        let _ = self.control.send(Control::Stop);

        let result = match self.report.recv() {
            Ok(Report::Done(result)) => result,
            Ok(Report::Ready) => Err(Error::Disconnected(
                "sampler reported ready twice".to_string(),
            )),
            Err(_) => Err(Error::Disconnected(
                "sampler exited without reporting".to_string(),
            )),
        };

        self.join()?;
        result
    }

    fn join(&mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| Error::Disconnected("sampler thread panicked".to_string())),
            None => Ok(()),
        }
    }
}

impl<T> Drop for SamplerHandle<T> {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.control.send(Control::Stop);
        }
    }
}

fn run_worker<S: Sampler>(
    mut sampler: S,
    control: Receiver<Control>,
    report: Sender<Report<S::Output>>,
) {
    if let Err(e) = sampler.start() {
        let _ = report.send(Report::Done(Err(e)));
        return;
    }
    if report.send(Report::Ready).is_err() {
        return;
    }

    let interval = sampler.poll_interval();
    let mut stop = false;
    let outcome = loop {
        if let Err(e) = sampler.sample() {
            break Err(e);
        }
        if stop {
            break Ok(());
        }
        stop = match control.recv_timeout(interval) {
            Ok(Control::Stop) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => false,
        };
    };

    let result = outcome.and_then(|()| sampler.finish());
    if let Err(e) = &result {
        log::debug!("{} sampler failed: {}", std::any::type_name::<S>(), e);
    }
    let _ = report.send(Report::Done(result));
}

/// Run `f` while `sampler` collects in the background
pub fn profile<S, F, R>(sampler: S, f: F) -> Result<(R, S::Output)>
where
    S: Sampler,
    F: FnOnce() -> R,
{
    let handle = SamplerHandle::spawn(sampler)?;
    let value = f();
    let output = handle.stop()?;
    Ok((value, output))
}
