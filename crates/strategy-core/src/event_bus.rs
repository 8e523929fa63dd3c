//! Event bus for registry events.
//!
//! Operations publish their events here after the writes have been committed,
//! so a subscriber never sees an event for state that was rolled back.

use strategy_types::RegistryEvent;
use tokio::sync::broadcast;

/// Broadcasts registry events to any number of subscribers.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<RegistryEvent>,
}

impl EventBus {
	/// Creates a new EventBus with the specified channel capacity.
	///
	/// Slow subscribers lag and lose the oldest events once `capacity` is exceeded.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to all current subscribers.
	///
	/// Returns an error if there are no active subscribers, which callers
	/// are free to ignore.
	pub fn publish(
		&self,
		event: RegistryEvent,
	) -> Result<(), broadcast::error::SendError<RegistryEvent>> {
		self.sender.send(event)?;
		Ok(())
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1024)
	}
}
