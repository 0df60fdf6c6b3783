use crate::application::{SessionConfig, SessionEvent, SessionEvents};
use crate::error::{Result, SessionError};
use crate::infrastructure::{ChannelError, ChannelTransport, EventChannel, JoinOutcome, MembershipStore};
use live_lobby_core::{
    ChannelMessage, JoinRequest, LobbyId, MembershipView, Outcome, Reconciler, Role, SessionState,
    StartRequest, UserId,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// State shared between the session handle and its subscription pump
struct Shared {
    reconciler: Mutex<Reconciler>,
    events: mpsc::UnboundedSender<SessionEvent>,
    torn_down: AtomicBool,
}

impl Shared {
    fn reconciler(&self) -> MutexGuard<'_, Reconciler> {
        // A panicking observer cannot leave the reconciler half-updated
        self.reconciler.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run one mutation and queue its notifications before releasing the lock
    fn apply(&self, mutate: impl FnOnce(&mut Reconciler) -> Vec<Outcome>) {
        let mut reconciler = self.reconciler();
        for outcome in mutate(&mut reconciler) {
            if let Outcome::Started = outcome {
                tracing::info!("🚀 Activity started");
            }
            let _ = self.events.send(outcome.into());
        }
    }

    fn report(&self, error: &SessionError) {
        tracing::error!(kind = %error.kind(), "{}", error);
        let _ = self.events.send(SessionEvent::Error(error.clone()));
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

/// Handle to a running subscription pump
struct Subscription {
    shutdown: oneshot::Sender<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Subscription {
    fn is_live(&self) -> bool {
        !self.task.is_finished()
    }

    /// Ask the pump to unsubscribe and close, then wait for it
    async fn shutdown(self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.shutdown.send(ack_tx).is_err() {
            tracing::debug!("Subscription pump already finished");
            return;
        }
        let _ = ack_rx.await;
    }
}

/// One user's membership in one live lobby
///
/// Runs the join handshake against a [`MembershipStore`], keeps a
/// subscription to the lobby's [`EventChannel`] topic, merges both into a
/// single [`MembershipView`] and reports every change through the
/// [`SessionEvents`] queue returned by [`LobbySession::new`].
pub struct LobbySession<S: MembershipStore, C: EventChannel> {
    lobby_id: LobbyId,
    user_id: UserId,
    config: SessionConfig,
    session_id: Uuid,
    store: Arc<S>,
    channel: Arc<C>,
    shared: Arc<Shared>,
    subscription: Mutex<Option<Subscription>>,
    skip_first_teardown: AtomicBool,
    span: tracing::Span,
}

impl<S: MembershipStore, C: EventChannel> LobbySession<S, C> {
    /// Create a session; no network activity happens until [`start`](Self::start)
    ///
    /// Fails with a configuration error when the lobby or user ID is missing.
    pub fn new(config: SessionConfig, store: S, channel: C) -> Result<(Self, SessionEvents)> {
        Self::with_shared(config, Arc::new(store), Arc::new(channel))
    }

    /// Like [`new`](Self::new), sharing a store and channel factory between sessions
    pub fn with_shared(
        config: SessionConfig,
        store: Arc<S>,
        channel: Arc<C>,
    ) -> Result<(Self, SessionEvents)> {
        let (lobby_id, user_id) = config.validate().inspect_err(|e| {
            tracing::error!("Refusing to create lobby session: {}", e);
        })?;

        let session_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "lobby_session",
            lobby_id = %lobby_id,
            user_id = %user_id,
            session_id = %session_id
        );
        let (tx, rx) = mpsc::unbounded_channel();

        span.in_scope(|| tracing::debug!(role = %config.role, "Lobby session created"));

        let session = Self {
            lobby_id,
            user_id,
            skip_first_teardown: AtomicBool::new(config.skip_first_teardown),
            config,
            session_id,
            store,
            channel,
            shared: Arc::new(Shared {
                reconciler: Mutex::new(Reconciler::new()),
                events: tx,
                torn_down: AtomicBool::new(false),
            }),
            subscription: Mutex::new(None),
            span,
        };

        Ok((session, rx))
    }

    /// Join the lobby and subscribe to its events, concurrently
    ///
    /// A 409 on join is handled by fetching the snapshot anyway. Failures are
    /// queued as [`SessionEvent::Error`] and also returned; the join error
    /// wins when both fail. May be called again to retry.
    pub async fn start(&self) -> Result<()> {
        async {
            if self.shared.is_torn_down() {
                tracing::debug!("start() after teardown ignored");
                return Ok(());
            }

            let (joined, subscribed) =
                tokio::join!(self.join_handshake(), self.open_subscription());

            if let Err(e) = &joined {
                self.shared.report(e);
            }
            if let Err(e) = &subscribed {
                self.shared.report(e);
            }
            joined.and(subscribed)
        }
        .instrument(self.span.clone())
        .await
    }

    async fn join_handshake(&self) -> Result<()> {
        if !self.shared.reconciler().begin_join() {
            tracing::debug!("Session already terminal, skipping join");
            return Ok(());
        }

        let request = JoinRequest::new(
            self.user_id.clone(),
            self.config.display_name(),
            self.config.role,
        );

        match self.store.join(&self.lobby_id, &request).await {
            Ok(JoinOutcome::Joined) => tracing::info!("🟢 Joined lobby"),
            Ok(JoinOutcome::AlreadyJoined) => {
                tracing::info!("🟢 Already a member, falling back to snapshot")
            }
            Err(e) => return Err(SessionError::JoinFailed(e)),
        }

        let snapshot = self
            .store
            .list(&self.lobby_id)
            .await
            .map_err(SessionError::JoinFailed)?;
        tracing::debug!("📥 Snapshot with {} participants", snapshot.len());

        self.shared.apply(|r| r.install_snapshot(snapshot));
        Ok(())
    }

    async fn open_subscription(&self) -> Result<()> {
        if self.is_subscribed() {
            tracing::debug!("Subscription already live");
            return Ok(());
        }

        let mut transport = self.channel.connect().await?;
        transport.subscribe(&self.lobby_id).await?;
        tracing::info!("📡 Subscribed to lobby topic");

        // Checked under the slot lock; teardown sets the flag before taking it
        let extra = {
            let mut slot = self
                .subscription
                .lock()
                .unwrap_or_else(|e| e.into_inner());

            if self.shared.is_torn_down() {
                tracing::debug!("Subscription completed after teardown, closing it");
                Some(transport)
            } else if slot.as_ref().is_some_and(Subscription::is_live) {
                tracing::debug!("Concurrent subscription already live, closing this one");
                Some(transport)
            } else {
                let (shutdown_tx, shutdown_rx) = oneshot::channel();
                let task = tokio::spawn(
                    pump(
                        transport,
                        self.lobby_id.clone(),
                        self.shared.clone(),
                        shutdown_rx,
                    )
                    .instrument(self.span.clone()),
                );

                // The slot holds nothing or a pump that already finished
                if let Some(stale) = slot.replace(Subscription {
                    shutdown: shutdown_tx,
                    task,
                }) {
                    stale.task.abort();
                }
                None
            }
        };

        if let Some(mut transport) = extra {
            close_transport(&mut transport, &self.lobby_id).await;
        }
        Ok(())
    }

    /// Open a fresh subscription after a transport failure
    ///
    /// No-op while a subscription is live or after teardown.
    pub async fn resubscribe(&self) -> Result<()> {
        async {
            if self.shared.is_torn_down() {
                return Ok(());
            }
            let result = self.open_subscription().await;
            if let Err(e) = &result {
                self.shared.report(e);
            }
            result
        }
        .instrument(self.span.clone())
        .await
    }

    /// Ask the store to start the activity (coordinators only)
    ///
    /// The local transition to `Started` happens when the START event comes
    /// back over the event channel, same as for every other participant.
    pub async fn request_start(&self) -> Result<()> {
        async {
            if self.shared.is_torn_down() {
                tracing::debug!("request_start() after teardown ignored");
                return Ok(());
            }

            if !self.config.role.is_coordinator() {
                let e = SessionError::Configuration(format!(
                    "only a coordinator may start the activity (role is {})",
                    self.config.role
                ));
                self.shared.report(&e);
                return Err(e);
            }

            match self.state() {
                SessionState::Joined => {}
                SessionState::Started => {
                    tracing::debug!("Already started");
                    return Ok(());
                }
                other => {
                    let e = SessionError::Configuration(format!(
                        "cannot start the activity while {}",
                        other
                    ));
                    self.shared.report(&e);
                    return Err(e);
                }
            }

            tracing::info!("📤 Requesting start");
            let request = StartRequest {
                user_id: self.user_id.clone(),
            };
            if let Err(e) = self.store.start(&self.lobby_id, &request).await {
                let e = SessionError::Request(e);
                self.shared.report(&e);
                return Err(e);
            }
            Ok(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Leave the lobby, unsubscribe, close the transport; in that order
    ///
    /// Only the first real call has any effect. With `skip_first_teardown`
    /// the very first call is absorbed. Leave failures are logged and
    /// otherwise ignored.
    pub async fn teardown(&self) {
        async {
            if self.skip_first_teardown.swap(false, Ordering::SeqCst) {
                tracing::info!("Absorbed first teardown");
                return;
            }
            if self.shared.torn_down.swap(true, Ordering::SeqCst) {
                tracing::debug!("Already torn down");
                return;
            }

            tracing::info!("🔴 Tearing down lobby session");

            if let Err(e) = self.store.leave(&self.lobby_id, &self.user_id).await {
                tracing::warn!("Leave request failed, continuing teardown: {}", e);
            }

            let subscription = self
                .subscription
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .take();
            if let Some(subscription) = subscription {
                subscription.shutdown().await;
            }

            self.shared.reconciler().mark_left();
            tracing::info!(state = %self.state(), "Lobby session ended");
        }
        .instrument(self.span.clone())
        .await
    }

    /// Copy of the current membership view
    pub fn view(&self) -> MembershipView {
        self.shared.reconciler().view().clone()
    }

    pub fn state(&self) -> SessionState {
        self.shared.reconciler().state()
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    pub fn lobby_id(&self) -> &LobbyId {
        &self.lobby_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Whether a subscription pump is currently running
    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(Subscription::is_live)
    }
}

/// Unsubscribe then close, logging failures
async fn close_transport<T: ChannelTransport>(transport: &mut T, topic: &LobbyId) {
    if let Err(e) = transport.unsubscribe(topic).await {
        tracing::warn!("Unsubscribe failed: {}", e);
    }
    if let Err(e) = transport.close().await {
        tracing::warn!("Closing event channel failed: {}", e);
    }
}

/// Feed channel messages into the reconciler until shutdown or transport loss
async fn pump<T: ChannelTransport>(
    mut transport: T,
    topic: LobbyId,
    shared: Arc<Shared>,
    mut shutdown: oneshot::Receiver<oneshot::Sender<()>>,
) {
    loop {
        tokio::select! {
            biased;

            request = &mut shutdown => {
                close_transport(&mut transport, &topic).await;
                if let Ok(ack) = request {
                    let _ = ack.send(());
                }
                return;
            }

            received = transport.recv() => match received {
                Ok(Some(raw)) => {
                    let message = ChannelMessage::classify(&raw);
                    tracing::debug!("📥 {} message", message.kind());
                    shared.apply(|r| r.apply_message(message));
                }
                Ok(None) => {
                    if !shared.is_torn_down() {
                        shared.report(&SessionError::from(ChannelError::ChannelClosed));
                    }
                    break;
                }
                Err(e) => {
                    if !shared.is_torn_down() {
                        shared.report(&SessionError::from(e));
                    }
                    break;
                }
            }
        }
    }

    if let Err(e) = transport.close().await {
        tracing::debug!("Closing dropped event channel: {}", e);
    }
}
