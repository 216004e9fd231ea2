//! Typed event bus.
//!
//! One [`EventQueue`] per event kind, allocated once when the world is
//! built. Systems push events during a tick; consuming systems pop them in
//! FIFO order. At the end of every tick the bus discards whatever is still
//! pending, so an event lives for exactly one tick: a consumer that runs
//! before the producer in the schedule never sees it.
//!
//! Only some kinds can be popped ([`Consumable`]). The rest are
//! fire-and-forget: they can be inspected with [`EventBus::peek`] but are
//! only ever removed by the end-of-tick reset.

use ledge_ecs::entity::Entity;
use ledge_ecs::event::{EventQueue, DEFAULT_EVENT_CAPACITY};

use crate::components::Vec2;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerJumped {
    pub entity: Entity,
    /// Vertical take-off speed.
    pub velocity: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerLanded {
    pub entity: Entity,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerDamaged {
    pub entity: Entity,
    pub damage: i32,
}

/// What moved the flow meter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FlowEventKind {
    /// Fast mode: section completed within a time tier.
    #[default]
    TimeTierHit,
    /// Fast mode: clean traversal chain.
    Chain,
    /// Slow mode: secret room or bonus door found.
    SecretFound,
    /// Slow mode: carry objective delivered.
    CarryDelivered,
    /// Slow mode: bonus room cleared.
    BonusComplete,
    /// Slow mode: puzzle gate solved.
    PuzzleClear,
    /// Penalty.
    DamageTaken,
    /// Penalty.
    IdleTick,
    /// Penalty, fast mode only.
    BacktrackTick,
}

impl FlowEventKind {
    /// `true` for kinds that reduce flow.
    pub fn is_penalty(self) -> bool {
        matches!(
            self,
            Self::DamageTaken | Self::IdleTick | Self::BacktrackTick
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowEvent {
    pub kind: FlowEventKind,
    /// Flow change.
    pub delta: f32,
    /// Kind-specific integer (time tier index, chain length, ...).
    pub value: i32,
    /// Usually the player.
    pub entity: Entity,
}

// ---------------------------------------------------------------------------
// Event traits
// ---------------------------------------------------------------------------

/// An event kind with its own queue on the [`EventBus`].
pub trait Event: Copy + Default + 'static {
    /// Short name used in logs.
    const KIND: &'static str;

    fn queue(bus: &EventBus) -> &EventQueue<Self>;
    fn queue_mut(bus: &mut EventBus) -> &mut EventQueue<Self>;
}

/// Event kinds that systems may pop.
pub trait Consumable: Event {}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Counts reported by [`EventBus::process_end_of_tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndOfTick {
    /// Events still pending when the tick ended.
    pub discarded: usize,
    /// Pushes dropped this tick because a queue was full.
    pub dropped: u64,
}

macro_rules! event_bus {
    ($( $field:ident : $ty:ty $(=> $consumable:ident)? ),* $(,)?) => {
        /// Fixed-capacity ring buffers, one per event kind.
        #[derive(Debug)]
        pub struct EventBus {
            $( $field: EventQueue<$ty>, )*
        }

        impl EventBus {
            /// Build a bus whose queues each have `capacity` slots.
            ///
            /// # Panics
            ///
            /// Panics if `capacity < 2`.
            pub fn with_capacity(capacity: usize) -> Self {
                Self {
                    $( $field: EventQueue::with_capacity(capacity), )*
                }
            }

            /// Discard all pending events in every queue.
            ///
            /// Called once per tick, after the last system has run.
            pub fn process_end_of_tick(&mut self) -> EndOfTick {
                let mut report = EndOfTick::default();
                $(
                    let dropped = self.$field.take_dropped();
                    if dropped > 0 {
                        tracing::warn!(
                            kind = <$ty as Event>::KIND,
                            dropped,
                            "event queue overflowed this tick; extra events were dropped"
                        );
                    }
                    report.dropped += dropped;
                    report.discarded += self.$field.clear();
                )*
                if report.discarded > 0 {
                    tracing::trace!(discarded = report.discarded, "unconsumed events discarded at end of tick");
                }
                report
            }

            /// Total pending events across all kinds.
            pub fn total_pending(&self) -> usize {
                0 $( + self.$field.len() )*
            }
        }

        $(
            impl Event for $ty {
                const KIND: &'static str = stringify!($field);

                fn queue(bus: &EventBus) -> &EventQueue<Self> {
                    &bus.$field
                }

                fn queue_mut(bus: &mut EventBus) -> &mut EventQueue<Self> {
                    &mut bus.$field
                }
            }

            $( impl $consumable for $ty {} )?
        )*
    };
}

event_bus! {
    jumped: PlayerJumped => Consumable,
    landed: PlayerLanded => Consumable,
    damaged: PlayerDamaged,
    flow: FlowEvent => Consumable,
}

impl EventBus {
    /// Build a bus with [`DEFAULT_EVENT_CAPACITY`] slots per queue.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Queue an event for this tick.
    ///
    /// If the queue for `E` is full the event is dropped and `false` is
    /// returned; this is not an error.
    pub fn push<E: Event>(&mut self, event: E) -> bool {
        E::queue_mut(self).push(event)
    }

    /// Pop the oldest pending event of kind `E`.
    pub fn try_pop<E: Consumable>(&mut self) -> Option<E> {
        E::queue_mut(self).try_pop()
    }

    /// Pending events of kind `E`, oldest first, without consuming them.
    pub fn peek<E: Event>(&self) -> impl Iterator<Item = E> + '_ {
        E::queue(self).iter()
    }

    /// Number of pending events of kind `E`.
    pub fn pending<E: Event>(&self) -> usize {
        E::queue(self).len()
    }

    /// Usable slots per queue of kind `E` (one less than its capacity).
    pub fn usable_capacity<E: Event>(&self) -> usize {
        E::queue(self).capacity() - 1
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Entity {
        Entity::new(0, 1)
    }

    #[test]
    fn kinds_are_independent() {
        let mut bus = EventBus::with_capacity(8);
        bus.push(PlayerJumped {
            entity: player(),
            velocity: 300.0,
        });
        bus.push(PlayerDamaged {
            entity: player(),
            damage: 1,
        });
        assert_eq!(bus.pending::<PlayerJumped>(), 1);
        assert_eq!(bus.pending::<PlayerDamaged>(), 1);
        assert_eq!(bus.pending::<PlayerLanded>(), 0);
        assert_eq!(bus.total_pending(), 2);

        assert_eq!(
            bus.try_pop::<PlayerJumped>().map(|e| e.velocity),
            Some(300.0)
        );
        assert_eq!(bus.try_pop::<PlayerJumped>(), None);
        assert_eq!(bus.pending::<PlayerDamaged>(), 1);
    }

    #[test]
    fn overflow_keeps_capacity_minus_one_and_reports_no_error() {
        let mut bus = EventBus::new();
        let usable = bus.usable_capacity::<PlayerLanded>();
        assert_eq!(usable, DEFAULT_EVENT_CAPACITY - 1);

        let mut accepted = 0;
        for i in 0..=DEFAULT_EVENT_CAPACITY {
            if bus.push(PlayerLanded {
                entity: player(),
                position: Vec2::new(i as f32, 0.0),
            }) {
                accepted += 1;
            }
        }
        assert_eq!(accepted, usable);

        let mut popped = 0;
        while let Some(event) = bus.try_pop::<PlayerLanded>() {
            assert_eq!(event.position.x, popped as f32);
            popped += 1;
        }
        assert_eq!(popped, usable);
    }

    #[test]
    fn end_of_tick_discards_unconsumed_events() {
        let mut bus = EventBus::with_capacity(16);
        for _ in 0..3 {
            bus.push(FlowEvent {
                kind: FlowEventKind::Chain,
                delta: 0.1,
                value: 2,
                entity: player(),
            });
        }
        bus.try_pop::<FlowEvent>();

        let report = bus.process_end_of_tick();
        assert_eq!(report.discarded, 2);
        assert_eq!(report.dropped, 0);
        assert_eq!(bus.try_pop::<FlowEvent>(), None);
        assert_eq!(bus.total_pending(), 0);
    }

    #[test]
    fn end_of_tick_reports_and_resets_drops() {
        let mut bus = EventBus::with_capacity(2);
        bus.push(PlayerDamaged::default());
        bus.push(PlayerDamaged::default());
        bus.push(PlayerDamaged::default());
        let report = bus.process_end_of_tick();
        assert_eq!(report, EndOfTick { discarded: 1, dropped: 2 });
        assert_eq!(bus.process_end_of_tick(), EndOfTick::default());
    }

    #[test]
    fn fire_and_forget_events_can_be_peeked() {
        let mut bus = EventBus::new();
        bus.push(PlayerDamaged {
            entity: player(),
            damage: 2,
        });
        bus.push(PlayerDamaged {
            entity: player(),
            damage: 3,
        });
        let total: i32 = bus.peek::<PlayerDamaged>().map(|e| e.damage).sum();
        assert_eq!(total, 5);
        assert_eq!(bus.pending::<PlayerDamaged>(), 2);
    }

    #[test]
    fn penalty_kinds() {
        assert!(FlowEventKind::DamageTaken.is_penalty());
        assert!(FlowEventKind::BacktrackTick.is_penalty());
        assert!(!FlowEventKind::SecretFound.is_penalty());
    }
}
