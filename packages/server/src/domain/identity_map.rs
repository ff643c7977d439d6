//! Identity mapping: physical connection ↔ logical user.
//!
//! Two maps maintained in lockstep, plus a last-activity timestamp per
//! identity. Invariant: at most one live connection per identity at any
//! instant — `bind` enforces it by evicting the prior connection, and
//! `unbind` refuses to touch a binding a newer connection has superseded.

use std::collections::HashMap;

use super::value_object::{ConnId, Identity, RoomCode, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    identity: Identity,
    room_code: RoomCode,
}

/// Bidirectional connection/identity mapping.
#[derive(Debug, Default)]
pub struct IdentityMap {
    by_conn: HashMap<ConnId, Binding>,
    by_identity: HashMap<Identity, ConnId>,
    last_activity: HashMap<Identity, Timestamp>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a binding for `(conn_id, identity, room_code)`.
    ///
    /// If the identity is already bound to a different connection, that
    /// prior connection's entries are erased first and its handle returned
    /// so the caller can terminate it. If `conn_id` itself carried an older
    /// binding (a rejoin on the same socket), that is erased too.
    pub fn bind(
        &mut self,
        conn_id: ConnId,
        identity: Identity,
        room_code: RoomCode,
        now: Timestamp,
    ) -> Option<ConnId> {
        if let Some(stale) = self.by_conn.remove(&conn_id) {
            if self.by_identity.get(&stale.identity) == Some(&conn_id) {
                self.by_identity.remove(&stale.identity);
                self.last_activity.remove(&stale.identity);
            }
        }

        let evicted = match self.by_identity.get(&identity) {
            Some(prior) if *prior != conn_id => {
                let prior = *prior;
                self.by_conn.remove(&prior);
                Some(prior)
            }
            _ => None,
        };

        self.by_conn.insert(
            conn_id,
            Binding {
                identity: identity.clone(),
                room_code,
            },
        );
        self.by_identity.insert(identity.clone(), conn_id);
        self.last_activity.insert(identity, now);

        evicted
    }

    /// Look up the identity and room bound to a connection.
    pub fn resolve_identity(&self, conn_id: &ConnId) -> Option<(Identity, RoomCode)> {
        self.by_conn
            .get(conn_id)
            .map(|b| (b.identity.clone(), b.room_code.clone()))
    }

    /// Look up the live connection for an identity.
    pub fn resolve_connection(&self, identity: &Identity) -> Option<ConnId> {
        self.by_identity.get(identity).copied()
    }

    /// Remove both directions and the activity timestamp, but only if the
    /// identity's current binding still points at `conn_id`. Returns whether
    /// anything was removed.
    pub fn unbind(&mut self, conn_id: &ConnId, identity: &Identity) -> bool {
        if self.by_identity.get(identity) != Some(conn_id) {
            return false;
        }
        self.by_identity.remove(identity);
        self.by_conn.remove(conn_id);
        self.last_activity.remove(identity);
        true
    }

    /// Record a liveness signal for a bound identity.
    pub fn touch(&mut self, identity: &Identity, now: Timestamp) {
        if self.by_identity.contains_key(identity) {
            self.last_activity.insert(identity.clone(), now);
        }
    }

    pub fn last_activity(&self, identity: &Identity) -> Option<Timestamp> {
        self.last_activity.get(identity).copied()
    }

    pub fn bound_connections(&self) -> usize {
        self.by_conn.len()
    }
}
