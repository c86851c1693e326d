use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// A repeating task with explicit start and stop. At most one task runs per ticker.
#[derive(Debug, Default)]
pub struct Ticker {
  handle: Option<JoinHandle<()>>,
}

impl Ticker {
  /// Runs `cycle` once per `period`, first one period from now, until it returns `false`.
  ///
  /// Replaces any task this ticker was already running.
  pub fn start<F, Fut>(&mut self, period: Duration, mut cycle: F)
  where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
  {
    self.stop();
    self.handle = Some(tokio::spawn(async move {
      let mut interval = interval_at(Instant::now() + period, period);
      interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        interval.tick().await;
        if !cycle().await {
          break;
        }
      }
    }));
  }

  /// Safe to call on a ticker that never started or already stopped.
  pub fn stop(&mut self) {
    if let Some(handle) = self.handle.take() {
      handle.abort();
    }
  }

  #[cfg(test)]
  pub fn is_running(&self) -> bool {
    self
      .handle
      .as_ref()
      .is_some_and(|handle| !handle.is_finished())
  }
}

impl Drop for Ticker {
  fn drop(&mut self) {
    self.stop();
  }
}
