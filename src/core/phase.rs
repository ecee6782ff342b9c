use std::collections::VecDeque;
use std::fmt;

use crate::error::TennisError;
use crate::Result;

/// Phase of the current rally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchPhase {
    /// Everything re-homed, waiting for the first input
    #[default]
    Ready,

    /// Rally in progress
    Playing,

    /// Rally over, waiting for a restart
    Ended,
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            MatchPhase::Ready => "ready",
            MatchPhase::Playing => "playing",
            MatchPhase::Ended => "ended",
        })
    }
}

/// Requests that move the store between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseTrigger {
    Start,
    End,
    Restart,
}

/// A phase change, as delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: MatchPhase,
    pub to: MatchPhase,
}

/// Identifies a subscriber's inbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u32);

#[derive(Debug)]
struct Subscriber {
    id: SubscriptionId,
    inbox: VecDeque<PhaseTransition>,
}

/// Holds the match phase and queues every transition for each subscriber.
///
/// Subscribers drain their own inbox with [`PhaseStore::next_transition`],
/// so a transition fired mid-tick is seen by every controller on its next
/// read, in firing order.
#[derive(Debug, Default)]
pub struct PhaseStore {
    phase: MatchPhase,
    subscribers: Vec<Subscriber>,
    next_id: u32,
}

impl PhaseStore {
    /// Creates a store in the `ready` phase
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Registers a new subscriber with an empty inbox
    pub fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            inbox: VecDeque::new(),
        });
        id
    }

    /// Drops a subscriber and any transitions it had not read
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Result<()> {
        let index = self
            .subscribers
            .iter()
            .position(|subscriber| subscriber.id == id)
            .ok_or_else(|| TennisError::ResourceNotFound(format!("subscription {:?}", id)))?;
        self.subscribers.remove(index);
        Ok(())
    }

    /// `ready → playing`
    pub fn start(&mut self) -> bool {
        self.fire(PhaseTrigger::Start)
    }

    /// `playing → ended`
    pub fn end(&mut self) -> bool {
        self.fire(PhaseTrigger::End)
    }

    /// `playing | ended → ready`
    pub fn restart(&mut self) -> bool {
        self.fire(PhaseTrigger::Restart)
    }

    /// Applies `trigger`. Returns false and changes nothing if the trigger
    /// is not valid from the current phase.
    pub fn fire(&mut self, trigger: PhaseTrigger) -> bool {
        let to = match (trigger, self.phase) {
            (PhaseTrigger::Start, MatchPhase::Ready) => MatchPhase::Playing,
            (PhaseTrigger::End, MatchPhase::Playing) => MatchPhase::Ended,
            (PhaseTrigger::Restart, MatchPhase::Playing | MatchPhase::Ended) => MatchPhase::Ready,
            _ => return false,
        };

        let transition = PhaseTransition {
            from: self.phase,
            to,
        };
        self.phase = to;
        log::info!("match phase {} -> {}", transition.from, transition.to);

        for subscriber in &mut self.subscribers {
            subscriber.inbox.push_back(transition);
        }
        true
    }

    /// Pops the oldest unread transition for `id`
    pub fn next_transition(&mut self, id: SubscriptionId) -> Option<PhaseTransition> {
        self.subscribers
            .iter_mut()
            .find(|subscriber| subscriber.id == id)
            .and_then(|subscriber| subscriber.inbox.pop_front())
    }

    /// Returns whether `id` has unread transitions
    pub fn has_transitions(&self, id: SubscriptionId) -> bool {
        self.subscribers
            .iter()
            .any(|subscriber| subscriber.id == id && !subscriber.inbox.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle() {
        let mut store = PhaseStore::new();
        assert_eq!(store.phase(), MatchPhase::Ready);
        assert!(store.start());
        assert!(store.end());
        assert!(store.restart());
        assert_eq!(store.phase(), MatchPhase::Ready);
    }

    #[test]
    fn rejected_triggers_change_nothing() {
        let mut store = PhaseStore::new();
        let id = store.subscribe();
        assert!(!store.end());
        assert!(!store.restart());
        assert_eq!(store.phase(), MatchPhase::Ready);
        assert_eq!(store.next_transition(id), None);

        store.start();
        assert!(!store.start());
    }

    #[test]
    fn restart_mid_rally() {
        let mut store = PhaseStore::new();
        store.start();
        assert!(store.restart());
        assert_eq!(store.phase(), MatchPhase::Ready);
    }

    #[test]
    fn every_subscriber_sees_transitions_in_order() {
        let mut store = PhaseStore::new();
        let a = store.subscribe();
        let b = store.subscribe();
        store.start();
        store.restart();

        for id in [a, b] {
            assert_eq!(
                store.next_transition(id),
                Some(PhaseTransition {
                    from: MatchPhase::Ready,
                    to: MatchPhase::Playing
                })
            );
            assert_eq!(store.next_transition(id).map(|t| t.to), Some(MatchPhase::Ready));
            assert!(!store.has_transitions(id));
        }
    }

    #[test]
    fn unsubscribed_inbox_is_gone() {
        let mut store = PhaseStore::new();
        let id = store.subscribe();
        store.unsubscribe(id).unwrap();
        store.start();
        assert_eq!(store.next_transition(id), None);
        assert!(store.unsubscribe(id).is_err());
        assert_eq!(store.subscriber_count(), 0);
    }
}
