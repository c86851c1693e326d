use crate::error::SendError;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;

/// How a payload reaches a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
  /// Queued and delivered in order. Used for events.
  Event,
  /// Overwrites any state frame the connection has not sent yet.
  Frame,
}

/// Single-slot holder for the newest state frame of one connection.
#[derive(Debug, Default)]
pub struct LatestFrame {
  frame: StdMutex<Option<String>>,
  notify: Notify,
}

impl LatestFrame {
  pub fn store(&self, payload: String) {
    *self.lock() = Some(payload);
    self.notify.notify_one();
  }

  pub fn take_latest(&self) -> Option<String> {
    self.lock().take()
  }

  pub async fn wait_for_update(&self) {
    self.notify.notified().await;
  }

  fn lock(&self) -> MutexGuard<'_, Option<String>> {
    self.frame.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Producer half held by the game for each player.
#[derive(Debug, Clone)]
pub struct Outbound {
  events: UnboundedSender<String>,
  frame: Arc<LatestFrame>,
}

/// Consumer half drained by the connection's send task.
#[derive(Debug)]
pub struct OutboundReceiver {
  events: UnboundedReceiver<String>,
  frame: Arc<LatestFrame>,
}

pub fn outbound() -> (Outbound, OutboundReceiver) {
  let (events_tx, events_rx) = mpsc::unbounded_channel();
  let frame = Arc::new(LatestFrame::default());
  (
    Outbound {
      events: events_tx,
      frame: frame.clone(),
    },
    OutboundReceiver {
      events: events_rx,
      frame,
    },
  )
}

impl Outbound {
  /// Every envelope carries the full game state, so an event also supersedes any
  /// pending frame.
  pub fn send(&self, payload: String, delivery: Delivery) -> Result<(), SendError> {
    if self.events.is_closed() {
      return Err(SendError::Closed);
    }
    match delivery {
      Delivery::Event => {
        self.frame.take_latest();
        self.events.send(payload).map_err(|_| SendError::Closed)
      }
      Delivery::Frame => {
        self.frame.store(payload);
        Ok(())
      }
    }
  }
}

impl OutboundReceiver {
  /// Next payload to write, events before the state frame. `None` once every
  /// producer is gone.
  pub async fn recv(&mut self) -> Option<String> {
    loop {
      if let Some(payload) = self.try_recv() {
        return Some(payload);
      }
      tokio::select! {
        event = self.events.recv() => return event,
        _ = self.frame.wait_for_update() => {}
      }
    }
  }

  pub fn try_recv(&mut self) -> Option<String> {
    match self.events.try_recv() {
      Ok(payload) => Some(payload),
      Err(TryRecvError::Empty | TryRecvError::Disconnected) => self.frame.take_latest(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn frames_keep_only_the_newest() {
    let (tx, mut rx) = outbound();
    for tick in 0..100 {
      tx.send(format!("frame-{tick}"), Delivery::Frame).expect("open");
    }
    assert_eq!(rx.try_recv().as_deref(), Some("frame-99"));
    assert_eq!(rx.try_recv(), None);
  }

  #[test]
  fn events_queue_in_order_and_drop_older_frames() {
    let (tx, mut rx) = outbound();
    tx.send("frame-1".to_string(), Delivery::Frame).expect("open");
    tx.send("welcome".to_string(), Delivery::Event).expect("open");
    tx.send("game-over".to_string(), Delivery::Event).expect("open");

    assert_eq!(rx.try_recv().as_deref(), Some("welcome"));
    assert_eq!(rx.try_recv().as_deref(), Some("game-over"));
    assert_eq!(rx.try_recv(), None);
  }

  #[test]
  fn frame_after_an_event_follows_it() {
    let (tx, mut rx) = outbound();
    tx.send("welcome".to_string(), Delivery::Event).expect("open");
    tx.send("frame-1".to_string(), Delivery::Frame).expect("open");

    assert_eq!(rx.try_recv().as_deref(), Some("welcome"));
    assert_eq!(rx.try_recv().as_deref(), Some("frame-1"));
  }

  #[test]
  fn sending_fails_once_the_receiver_is_gone() {
    let (tx, rx) = outbound();
    drop(rx);
    assert!(matches!(
      tx.send("frame".to_string(), Delivery::Frame),
      Err(SendError::Closed)
    ));
    assert!(matches!(
      tx.send("event".to_string(), Delivery::Event),
      Err(SendError::Closed)
    ));
  }

  #[tokio::test]
  async fn recv_wakes_on_a_stored_frame() {
    let (tx, mut rx) = outbound();
    let waiter = tokio::spawn(async move { rx.recv().await });
    tokio::task::yield_now().await;
    tx.send("frame-1".to_string(), Delivery::Frame).expect("open");
    assert_eq!(waiter.await.expect("join").as_deref(), Some("frame-1"));
  }

  #[tokio::test]
  async fn recv_ends_when_the_producer_is_dropped() {
    let (tx, mut rx) = outbound();
    drop(tx);
    assert_eq!(rx.recv().await, None);
  }
}
