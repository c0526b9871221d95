//! Hand-off of work to the render thread.
//!
//! The render thread creates the pair with [`render_channel`], keeps the
//! [`RenderQueue`] and drains it once per frame. [`RenderThread`] handles are
//! `Send + Sync` and can be cloned into any thread that needs to run something
//! with render-thread affinity.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, ThreadId};
use std::time::Duration;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Create a handle/queue pair owned by the calling thread.
pub fn render_channel() -> (RenderThread, RenderQueue) {
    let (tx, rx) = mpsc::channel();
    let id = thread::current().id();
    (RenderThread { tx, thread: id }, RenderQueue { rx, thread: id })
}

#[derive(Clone)]
pub struct RenderThread {
    tx: Sender<Job>,
    thread: ThreadId,
}

impl fmt::Debug for RenderThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderThread")
            .field("thread", &self.thread)
            .finish_non_exhaustive()
    }
}

impl RenderThread {
    pub fn thread_id(&self) -> ThreadId {
        self.thread
    }

    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread
    }

    /// Queue `job` for the next drain. Returns `false` when the queue is gone.
    pub fn post<F: FnOnce() + Send + 'static>(&self, job: F) -> bool {
        self.tx.send(Box::new(job)).is_ok()
    }

    /// Run `job` on the render thread and wait up to `timeout` for its result.
    ///
    /// Runs inline when already on the render thread. `None` means the job was
    /// not completed in time (or the queue is gone); it may still run later and
    /// its result is then dropped.
    pub fn run_blocking<R, F>(&self, job: F, timeout: Duration) -> Option<R>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        if self.is_current() {
            return Some(job());
        }
        let (done_tx, done_rx) = mpsc::sync_channel(1);
        let posted = self.post(move || {
            let _ = done_tx.send(job());
        });
        if !posted {
            return None;
        }
        done_rx.recv_timeout(timeout).ok()
    }
}

pub struct RenderQueue {
    rx: Receiver<Job>,
    thread: ThreadId,
}

impl fmt::Debug for RenderQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderQueue")
            .field("thread", &self.thread)
            .finish_non_exhaustive()
    }
}

impl RenderQueue {
    /// Run every queued job. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        if thread::current().id() != self.thread {
            log::warn!("[RenderQueue] drained from a foreign thread; jobs keep their queue");
            return 0;
        }
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn inline_on_owner_thread() {
        let (render, _queue) = render_channel();
        assert_eq!(render.run_blocking(|| 7, Duration::from_millis(1)), Some(7));
    }

    #[test]
    fn foreign_thread_waits_for_drain() {
        let (render, queue) = render_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let render = render.clone();
            std::thread::spawn(move || render.run_blocking(|| 40 + 2, Duration::from_secs(5)))
        };
        let stop_flag = stop.clone();
        while !stop_flag.load(Ordering::SeqCst) {
            if queue.run_pending() > 0 {
                stop.store(true, Ordering::SeqCst);
            }
            std::thread::yield_now();
        }
        assert_eq!(worker.join().unwrap(), Some(42));
    }

    #[test]
    fn times_out_when_never_drained() {
        let (render, _queue) = render_channel();
        let worker = std::thread::spawn(move || {
            render.run_blocking(|| 1, Duration::from_millis(20))
        });
        assert_eq!(worker.join().unwrap(), None);
    }
}
