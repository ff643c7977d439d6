//! UseCase: janitor sweep for abandoned rooms.
//!
//! Rooms whose last member has left stay in the registry (so a quick
//! reconnect finds its history intact) until the periodic sweep drops them.

use std::sync::Arc;
use std::time::Duration;

use super::SharedState;

/// How often the janitor runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

pub struct SweepRoomsUseCase {
    state: SharedState,
}

impl SweepRoomsUseCase {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// One sweep pass. Returns the number of rooms dropped.
    pub async fn execute(&self) -> usize {
        let mut state = self.state.lock().await;
        let swept = state.registry.sweep_empty();
        if swept > 0 {
            tracing::info!(
                "Swept {} abandoned room(s), {} remaining",
                swept,
                state.registry.room_count()
            );
        }
        swept
    }

    /// Run the sweep on a fixed interval until the process exits.
    pub fn run_periodic(self: Arc<Self>, interval: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.execute().await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnId, Identity, Participant, RoomCode, Timestamp};
    use crate::usecase::test_support::setup;

    #[tokio::test]
    async fn test_sweep_drops_deactivated_rooms_only() {
        // given (precondition): one occupied room, one abandoned room
        let (state, _) = setup(10);
        {
            let mut state = state.lock().await;
            let now = Timestamp::new(1_000);

            let busy = RoomCode::new("BUSY").unwrap();
            state.registry.get_or_create(&busy, now);
            state
                .registry
                .add_member(
                    &busy,
                    Participant::new(
                        ConnId::generate(),
                        Identity::new("a@x.com").unwrap(),
                        now,
                    ),
                )
                .unwrap();

            let gone = RoomCode::new("GONE").unwrap();
            state.registry.get_or_create(&gone, now);
            let conn = ConnId::generate();
            state
                .registry
                .add_member(
                    &gone,
                    Participant::new(conn, Identity::new("b@x.com").unwrap(), now),
                )
                .unwrap();
            state.registry.remove_member(&gone, &conn);
        }

        let sweep = SweepRoomsUseCase::new(state.clone());

        // when (operation):
        let swept = sweep.execute().await;

        // then (expected result): only the abandoned room is gone
        assert_eq!(swept, 1);
        let state = state.lock().await;
        assert_eq!(state.registry.room_count(), 1);
        assert!(state.registry.get(&RoomCode::new("BUSY").unwrap()).is_some());
    }

    #[tokio::test]
    async fn test_sweep_with_nothing_to_do_returns_zero() {
        // given (precondition):
        let (state, _) = setup(10);

        // when (operation) / then (expected result):
        assert_eq!(SweepRoomsUseCase::new(state).execute().await, 0);
    }
}
