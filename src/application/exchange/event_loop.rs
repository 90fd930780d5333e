//! The exchange's single serial worker.
//!
//! Owns the active [`Registry`] and applies admit, broadcast, evict and
//! shutdown events strictly one at a time in arrival order. Nothing else
//! holds the registry, so no lock guards it.
//!
//! ```text
//!   Exchange::publish ──┐
//!   connection tasks ───┼──► mpsc intake ──► EventLoop ──► Registry
//!   Exchange::stop ─────┘                        │
//!                                                └──► ExchangeObserver
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::domain::exchange::{
    EvictionReason, ExchangeError, ExchangeStatus, Registry, RejectedEvent, ShutdownSummary,
};
use crate::domain::foundation::{ConnectionId, StateMachine};
use crate::ports::{ConnectionHandle, ExchangeObserver};

/// Events submitted to the loop.
pub(crate) enum ExchangeEvent {
    /// Add a connection; the loop answers on `ack` once it is in the set.
    Admit {
        connection: ConnectionHandle,
        ack: oneshot::Sender<Result<(), ExchangeError>>,
    },
    /// Write a payload to every active connection.
    Broadcast(Vec<u8>),
    /// Remove a connection if it is still present.
    Evict(ConnectionId),
    /// Close everything, drain, and exit.
    Shutdown,
}

pub(crate) struct EventLoop {
    registry: Registry<ConnectionHandle>,
    status: ExchangeStatus,
    events: mpsc::Receiver<ExchangeEvent>,
    observer: Arc<dyn ExchangeObserver>,
    shutdown_grace: Duration,
}

impl EventLoop {
    pub(crate) fn new(
        events: mpsc::Receiver<ExchangeEvent>,
        observer: Arc<dyn ExchangeObserver>,
        shutdown_grace: Duration,
    ) -> Self {
        Self {
            registry: Registry::new(),
            status: ExchangeStatus::Running,
            events,
            observer,
            shutdown_grace,
        }
    }

    /// Process events until shutdown completes or every sender is gone.
    pub(crate) async fn run(mut self) -> ShutdownSummary {
        while let Some(event) = self.events.recv().await {
            match event {
                ExchangeEvent::Shutdown => return self.shutdown().await,
                event => self.dispatch(event).await,
            }
        }

        // Intake closed without an explicit stop.
        let closed = self.close_all().await;
        let forced = self.force_evict_remaining();
        self.transition(ExchangeStatus::Stopped);
        ShutdownSummary {
            closed,
            drained: 0,
            forced,
            remaining: self.registry.len(),
        }
    }

    /// Apply one event. Outside `Running` everything but eviction is
    /// rejected.
    async fn dispatch(&mut self, event: ExchangeEvent) {
        match event {
            ExchangeEvent::Evict(id) => {
                self.evict(&id, EvictionReason::ReadFailed);
            }
            event if !self.status.accepts_events() => self.reject(event).await,
            ExchangeEvent::Admit { connection, ack } => self.admit(connection, ack).await,
            ExchangeEvent::Broadcast(payload) => self.broadcast(&payload).await,
            // Intercepted by `run`.
            ExchangeEvent::Shutdown => {}
        }
    }

    async fn admit(
        &mut self,
        connection: ConnectionHandle,
        ack: oneshot::Sender<Result<(), ExchangeError>>,
    ) {
        let id = connection.id();
        if !self.registry.admit(id, connection.clone()) {
            // The live entry keeps the connection; the caller must not close it.
            self.observer.event_rejected(RejectedEvent::Admit);
            let _ = ack.send(Err(ExchangeError::AlreadyAdmitted));
            return;
        }
        self.observer.connection_admitted(&id, self.registry.len());

        if ack.send(Ok(())).is_err() {
            // The adapter is gone and will never report a read failure.
            self.registry.evict(&id);
            connection.close().await;
            self.observer.connection_evicted(
                &id,
                EvictionReason::AdmissionAbandoned,
                self.registry.len(),
            );
        }
    }

    async fn broadcast(&mut self, payload: &[u8]) {
        let mut failed = Vec::new();
        let mut delivered = 0;

        for (id, connection) in self.registry.iter() {
            match connection.write(payload).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    self.observer.write_failed(id, &e.to_string());
                    failed.push(*id);
                }
            }
        }

        for (id, connection) in self.registry.compact(&failed) {
            connection.close().await;
            self.observer
                .connection_evicted(&id, EvictionReason::WriteFailed, self.registry.len());
        }

        self.observer
            .broadcast_completed(payload.len(), delivered, failed.len());
    }

    fn evict(&mut self, id: &ConnectionId, reason: EvictionReason) -> bool {
        if self.registry.evict(id).is_none() {
            return false;
        }
        self.observer
            .connection_evicted(id, reason, self.registry.len());
        true
    }

    /// Close every active connection, then wait for their adapters to report
    /// back, bounded by the grace period.
    async fn shutdown(mut self) -> ShutdownSummary {
        self.transition(ExchangeStatus::Draining);
        let closed = self.close_all().await;
        let mut drained = 0;

        let deadline = tokio::time::sleep(self.shutdown_grace);
        tokio::pin!(deadline);

        while !self.registry.is_empty() {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(ExchangeEvent::Evict(id)) => {
                        if self.evict(&id, EvictionReason::ReadFailed) {
                            drained += 1;
                        }
                    }
                    Some(other) => self.dispatch(other).await,
                    None => break,
                },
                _ = &mut deadline => break,
            }
        }

        let forced = self.force_evict_remaining();
        self.transition(ExchangeStatus::Stopped);

        // Answer anything still queued so no admission waits forever.
        self.events.close();
        while let Ok(event) = self.events.try_recv() {
            if !matches!(event, ExchangeEvent::Evict(_)) {
                self.reject(event).await;
            }
        }

        ShutdownSummary {
            closed,
            drained,
            forced,
            remaining: self.registry.len(),
        }
    }

    async fn reject(&mut self, event: ExchangeEvent) {
        match event {
            ExchangeEvent::Admit { connection, ack } => {
                self.observer.event_rejected(RejectedEvent::Admit);
                if ack.send(Err(ExchangeError::Stopped)).is_err() {
                    connection.close().await;
                }
            }
            ExchangeEvent::Broadcast(_) => self.observer.event_rejected(RejectedEvent::Broadcast),
            ExchangeEvent::Shutdown => self.observer.event_rejected(RejectedEvent::Shutdown),
            ExchangeEvent::Evict(_) => {}
        }
    }

    async fn close_all(&self) -> usize {
        for (_, connection) in self.registry.iter() {
            connection.close().await;
        }
        self.registry.len()
    }

    fn force_evict_remaining(&mut self) -> usize {
        let remaining = self.registry.drain();
        for (id, _) in &remaining {
            self.observer
                .connection_evicted(id, EvictionReason::ShutdownForced, 0);
        }
        remaining.len()
    }

    fn transition(&mut self, target: ExchangeStatus) {
        if let Ok(next) = self.status.transition_to(target) {
            self.observer.status_changed(self.status, next);
            self.status = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryConnection;
    use crate::adapters::observability::ExchangeMetrics;

    fn spawn_loop(
        grace: Duration,
    ) -> (
        mpsc::Sender<ExchangeEvent>,
        Arc<ExchangeMetrics>,
        tokio::task::JoinHandle<ShutdownSummary>,
    ) {
        let (tx, rx) = mpsc::channel(8);
        let metrics = Arc::new(ExchangeMetrics::new());
        let worker = tokio::spawn(EventLoop::new(rx, metrics.clone(), grace).run());
        (tx, metrics, worker)
    }

    async fn admit(tx: &mpsc::Sender<ExchangeEvent>, connection: ConnectionHandle) {
        let (ack, acked) = oneshot::channel();
        tx.send(ExchangeEvent::Admit { connection, ack })
            .await
            .unwrap();
        acked.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn broadcast_reaches_every_admitted_connection() {
        let (tx, _metrics, _worker) = spawn_loop(Duration::from_secs(1));
        let (a, mut peer_a) = MemoryConnection::pair();
        let (b, mut peer_b) = MemoryConnection::pair();
        admit(&tx, ConnectionHandle::new(Arc::new(a))).await;
        admit(&tx, ConnectionHandle::new(Arc::new(b))).await;

        tx.send(ExchangeEvent::Broadcast(b"tick".to_vec()))
            .await
            .unwrap();

        assert_eq!(peer_a.recv().await.unwrap(), b"tick");
        assert_eq!(peer_b.recv().await.unwrap(), b"tick");
    }

    #[tokio::test]
    async fn failed_write_evicts_and_closes() {
        let (tx, metrics, _worker) = spawn_loop(Duration::from_secs(1));
        let (broken, broken_peer) = MemoryConnection::pair();
        let (live, mut live_peer) = MemoryConnection::pair();
        admit(&tx, ConnectionHandle::new(Arc::new(broken))).await;
        admit(&tx, ConnectionHandle::new(Arc::new(live))).await;

        broken_peer.break_stream();
        tx.send(ExchangeEvent::Broadcast(b"one".to_vec()))
            .await
            .unwrap();
        tx.send(ExchangeEvent::Broadcast(b"two".to_vec()))
            .await
            .unwrap();

        assert_eq!(live_peer.recv().await.unwrap(), b"one");
        assert_eq!(live_peer.recv().await.unwrap(), b"two");
        assert!(broken_peer.is_closed());

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.active, 1);
        assert_eq!(snapshot.write_failures, 1);
    }

    #[tokio::test]
    async fn evict_of_unknown_connection_is_noop() {
        let (tx, metrics, _worker) = spawn_loop(Duration::from_secs(1));
        let (conn, mut peer) = MemoryConnection::pair();
        admit(&tx, ConnectionHandle::new(Arc::new(conn))).await;

        tx.send(ExchangeEvent::Evict(ConnectionId::new()))
            .await
            .unwrap();
        tx.send(ExchangeEvent::Broadcast(b"still here".to_vec()))
            .await
            .unwrap();

        assert_eq!(peer.recv().await.unwrap(), b"still here");
        assert_eq!(metrics.snapshot().evicted, 0);
    }

    #[tokio::test]
    async fn shutdown_waits_for_evictions_then_stops() {
        let (tx, metrics, worker) = spawn_loop(Duration::from_secs(5));
        let (conn, peer) = MemoryConnection::pair();
        let handle = ConnectionHandle::new(Arc::new(conn));
        admit(&tx, handle.clone()).await;

        tx.send(ExchangeEvent::Shutdown).await.unwrap();

        // Stand in for the adapter: observe the close, report eviction.
        assert!(handle.read().await.is_err());
        assert!(peer.is_closed());
        tx.send(ExchangeEvent::Evict(handle.id())).await.unwrap();

        let summary = worker.await.unwrap();
        assert_eq!(
            summary,
            ShutdownSummary {
                closed: 1,
                drained: 1,
                forced: 0,
                remaining: 0
            }
        );
        assert_eq!(metrics.snapshot().active, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_forces_out_silent_connections_after_grace() {
        let (tx, _metrics, worker) = spawn_loop(Duration::from_secs(2));
        let (conn, _peer) = MemoryConnection::pair();
        admit(&tx, ConnectionHandle::new(Arc::new(conn))).await;

        tx.send(ExchangeEvent::Shutdown).await.unwrap();

        let summary = worker.await.unwrap();
        assert_eq!(summary.forced, 1);
        assert_eq!(summary.remaining, 0);
    }

    #[tokio::test]
    async fn admission_during_drain_is_rejected() {
        let (tx, metrics, worker) = spawn_loop(Duration::from_secs(5));
        let (conn, _peer) = MemoryConnection::pair();
        let first = ConnectionHandle::new(Arc::new(conn));
        admit(&tx, first.clone()).await;
        tx.send(ExchangeEvent::Shutdown).await.unwrap();

        let (late, _late_peer) = MemoryConnection::pair();
        let (ack, acked) = oneshot::channel();
        tx.send(ExchangeEvent::Admit {
            connection: ConnectionHandle::new(Arc::new(late)),
            ack,
        })
        .await
        .unwrap();
        assert_eq!(acked.await.unwrap(), Err(ExchangeError::Stopped));

        tx.send(ExchangeEvent::Evict(first.id())).await.unwrap();
        worker.await.unwrap();
        assert_eq!(metrics.snapshot().rejected, 1);
    }

    #[tokio::test]
    async fn dropping_every_sender_stops_the_loop() {
        let (tx, _metrics, worker) = spawn_loop(Duration::from_secs(1));
        let (conn, peer) = MemoryConnection::pair();
        admit(&tx, ConnectionHandle::new(Arc::new(conn))).await;

        drop(tx);

        let summary = worker.await.unwrap();
        assert_eq!(summary.closed, 1);
        assert_eq!(summary.remaining, 0);
        assert!(peer.is_closed());
    }

    #[tokio::test]
    async fn duplicate_admission_is_answered_without_closing() {
        let (tx, metrics, _worker) = spawn_loop(Duration::from_secs(1));
        let (conn, mut peer) = MemoryConnection::pair();
        let handle = ConnectionHandle::new(Arc::new(conn));
        admit(&tx, handle.clone()).await;

        let (ack, acked) = oneshot::channel();
        tx.send(ExchangeEvent::Admit {
            connection: handle,
            ack,
        })
        .await
        .unwrap();
        assert_eq!(acked.await.unwrap(), Err(ExchangeError::AlreadyAdmitted));

        tx.send(ExchangeEvent::Broadcast(b"after".to_vec()))
            .await
            .unwrap();
        assert_eq!(peer.recv().await.unwrap(), b"after");
        assert!(!peer.is_closed());
        assert_eq!(metrics.snapshot().active, 1);
        assert_eq!(metrics.snapshot().rejected, 1);
    }

    #[tokio::test]
    async fn abandoned_admission_is_evicted_and_closed() {
        let (tx, metrics, _worker) = spawn_loop(Duration::from_secs(1));
        let (abandoned, abandoned_peer) = MemoryConnection::pair();

        let (ack, acked) = oneshot::channel();
        drop(acked);
        tx.send(ExchangeEvent::Admit {
            connection: ConnectionHandle::new(Arc::new(abandoned)),
            ack,
        })
        .await
        .unwrap();

        // Acknowledged admissions are processed in order after it.
        let (other, _other_peer) = MemoryConnection::pair();
        admit(&tx, ConnectionHandle::new(Arc::new(other))).await;

        assert!(abandoned_peer.is_closed());
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.admitted, 2);
        assert_eq!(snapshot.evicted, 1);
        assert_eq!(snapshot.active, 1);
    }

    #[tokio::test]
    async fn admission_rejected_while_draining_closes_unclaimed_connection() {
        let (tx, metrics, worker) = spawn_loop(Duration::from_secs(5));
        let (conn, _peer) = MemoryConnection::pair();
        let first = ConnectionHandle::new(Arc::new(conn));
        admit(&tx, first.clone()).await;
        tx.send(ExchangeEvent::Shutdown).await.unwrap();

        let (late, late_peer) = MemoryConnection::pair();
        let (ack, acked) = oneshot::channel();
        drop(acked);
        tx.send(ExchangeEvent::Admit {
            connection: ConnectionHandle::new(Arc::new(late)),
            ack,
        })
        .await
        .unwrap();
        tx.send(ExchangeEvent::Evict(first.id())).await.unwrap();

        let summary = worker.await.unwrap();
        assert!(late_peer.is_closed());
        assert_eq!(summary.remaining, 0);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.admitted, 1);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.active, 0);
    }
}
