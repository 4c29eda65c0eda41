//! Event channel implementation using crossbeam-channel.
//!
//! Scans report through an [`EventSender`]; any UI layer holds the
//! matching [`EventReceiver`]. A sender can also be detached (no channel
//! at all) for callers that only want the final result.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::time::Duration;

use super::Event;

/// Sending half handed to the engine. Cheap to clone across threads.
#[derive(Clone, Default)]
pub struct EventSender {
    inner: Option<Sender<Event>>,
}

impl EventSender {
    /// Wrap a raw crossbeam sender.
    pub fn new(sender: Sender<Event>) -> Self {
        Self {
            inner: Some(sender),
        }
    }

    /// A sender with no channel behind it; every event is discarded.
    pub fn detached() -> Self {
        Self { inner: None }
    }

    /// Send an event without waiting on the listener.
    ///
    /// A dropped receiver is not an error; the scan carries on silently.
    pub fn send(&self, event: Event) {
        if let Some(sender) = &self.inner {
            let _ = sender.send(event);
        }
    }

    /// False for a detached sender.
    ///
    /// Lets callers skip building expensive progress payloads.
    pub fn is_attached(&self) -> bool {
        self.inner.is_some()
    }
}

/// Receiving half held by the UI layer.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event; `None` once every sender is dropped
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Event> {
        self.inner.recv_timeout(timeout).ok()
    }

    /// Next event if one is already queued
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Everything queued right now, without blocking
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }

    /// Blocking iterator that ends when every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructors for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel. Events are small, so this is the usual choice.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (EventSender::new(sender), EventReceiver { inner: receiver })
    }

    /// Bounded channel for listeners that want backpressure.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (EventSender::new(sender), EventReceiver { inner: receiver })
    }
}

/// Sender for callers that do not listen for progress.
pub fn null_sender() -> EventSender {
    EventSender::detached()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::GroupKind;
    use crate::events::{GroupingEvent, GroupingProgress, PipelineEvent};
    use std::thread;

    fn started(total_photos: usize) -> Event {
        Event::Pipeline(PipelineEvent::Started { total_photos })
    }

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Grouping(GroupingEvent::Progress(GroupingProgress {
                kind: GroupKind::Duplicate,
                processed: 100,
                total: 250,
                groups_found: 3,
            })));
        });

        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Grouping(GroupingEvent::Progress(p)) => {
                assert_eq!(p.processed, 100);
                assert_eq!(p.groups_found, 3);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn null_sender_discards_events() {
        let sender = null_sender();
        sender.send(started(0));
        assert!(!sender.is_attached());
    }

    #[test]
    fn sending_after_receiver_drops_is_silent() {
        let (sender, receiver) = EventChannel::new();
        assert!(sender.is_attached());

        drop(receiver);
        sender.send(started(1));
    }

    #[test]
    fn drain_returns_queued_events_in_order() {
        let (sender, receiver) = EventChannel::new();
        sender.send(started(1));
        sender.send(started(2));

        let drained = receiver.drain();
        assert_eq!(drained.len(), 2);
        assert!(matches!(drained[1], Event::Pipeline(PipelineEvent::Started { total_photos: 2 })));
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn recv_timeout_gives_up() {
        let (_sender, receiver) = EventChannel::new();
        assert!(receiver.recv_timeout(Duration::from_millis(5)).is_none());
    }

    #[test]
    fn bounded_channel_respects_capacity() {
        let (sender, receiver) = EventChannel::bounded(2);

        sender.send(started(1));
        sender.send(started(2));

        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_none());
    }
}
