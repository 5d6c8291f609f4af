use super::types::VirtualEvent;
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

/// FIFO of virtual events shared by every input source.
///
/// Producers may live on any thread and never block; the frame loop drains
/// whatever is queued once per iteration.
pub struct InputQueue {
    sender: Sender<VirtualEvent>,
    receiver: Receiver<VirtualEvent>,
}

/// Producer half handed to keyboard and button sources
#[derive(Clone)]
pub struct InputSender {
    sender: Sender<VirtualEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        let (sender, receiver) = channel::unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Take every event queued right now, in arrival order
    pub fn drain(&self) -> Vec<VirtualEvent> {
        let events: Vec<VirtualEvent> = self.receiver.try_iter().collect();
        if !events.is_empty() {
            debug!("Drained {} input events", events.len());
        }
        events
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSender {
    /// Enqueue an event without blocking. Returns false once the queue is gone.
    pub fn push(&self, event: VirtualEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => {
                debug!("Queued input event {}", event);
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Input queue closed, dropping {}", event);
                false
            }
            Err(TrySendError::Full(_)) => {
                warn!("Input queue full, dropping {}", event);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_preserves_order() {
        let queue = InputQueue::new();
        let sender = queue.sender();

        sender.push(VirtualEvent::NavDown);
        sender.push(VirtualEvent::ToggleEdit);
        sender.push(VirtualEvent::NavUp);

        assert_eq!(queue.len(), 3);
        assert_eq!(
            queue.drain(),
            vec![
                VirtualEvent::NavDown,
                VirtualEvent::ToggleEdit,
                VirtualEvent::NavUp
            ]
        );
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_push_from_other_threads() {
        let queue = InputQueue::new();

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let sender = queue.sender();
                thread::spawn(move || {
                    for _ in 0..100 {
                        assert!(sender.push(VirtualEvent::Reset));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.drain().len(), 600);
    }

    #[test]
    fn test_push_after_queue_dropped() {
        let queue = InputQueue::new();
        let sender = queue.sender();
        drop(queue);
        assert!(!sender.push(VirtualEvent::Save));
    }
}
