use std::future::Future;

use iced::executor::Executor;
use iced::futures;
use tokio::runtime::{Builder, Runtime};

const IO_WORKER_THREADS: usize = 2;

/// Runs command and push-socket futures off the UI thread. Their results
/// come back as messages, so state is still only touched by `update`.
#[derive(Debug)]
pub struct TokioExecutor {
    runtime: Runtime,
}

impl Executor for TokioExecutor {
    fn new() -> Result<Self, futures::io::Error> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(IO_WORKER_THREADS)
            .thread_name("mmflink-io")
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }

    fn spawn(&self, future: impl Future<Output = ()> + Send + 'static) {
        let _ = self.runtime.spawn(future);
    }

    fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.runtime.enter();
        f()
    }
}
