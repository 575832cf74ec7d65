// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// A multi-producer, single-consumer bus for one event type.
///
/// Producers may live on any thread; the owner of the bus drains it on its own
/// thread, typically once per frame.
#[derive(Debug)]
pub struct EventBus<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventBus<T> {
    /// Creates a new EventBus with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!(
            "EventBus<{}> initialized.",
            std::any::type_name::<T>().rsplit("::").next().unwrap_or("?")
        );
        Self { sender, receiver }
    }

    /// Sends an event, logging an error if the receiver is disconnected.
    pub fn publish(&self, event: T) {
        if let Err(e) = self.sender.send(event) {
            log::error!("Failed to send event: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a clone of the sender end of the channel.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns a reference to the receiver end of the channel.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }

    /// Removes and returns every event queued so far, without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of events waiting to be drained.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl<T: Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Resized { width: u32, height: u32 },
        Tick,
    }

    #[test]
    fn drain_returns_events_in_publish_order() {
        let bus = EventBus::<TestEvent>::new();
        bus.publish(TestEvent::Tick);
        bus.publish(TestEvent::Resized {
            width: 4,
            height: 3,
        });

        assert_eq!(bus.pending(), 2);
        assert_eq!(
            bus.drain(),
            vec![
                TestEvent::Tick,
                TestEvent::Resized {
                    width: 4,
                    height: 3
                }
            ]
        );
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn events_cross_threads() {
        let bus = EventBus::<TestEvent>::new();
        let sender = bus.sender();

        thread::spawn(move || {
            sender.send(TestEvent::Tick).expect("send from worker");
        })
        .join()
        .expect("worker thread panicked");

        assert_eq!(bus.drain(), vec![TestEvent::Tick]);
    }
}
