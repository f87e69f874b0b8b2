//! Conversation engine - Message lifecycle and provider dispatch
//!
//! Owns the live message list. An exchange moves through
//! `idle -> submitted -> pending -> resolved | failed`; each step is applied
//! under the state lock and published as one [`EngineSnapshot`]. The lock is
//! never held across an `.await`.

use std::sync::Arc;

use domain::{ChatMessage, ConversationId, MessageId, ProviderId, VoiceProfile};
use parking_lot::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::ApplicationError;
use crate::ports::{
    ConversationStore, ProviderGateway, ProviderInfo, SpeechOutputPort, TranscriptSource,
};
use crate::services::VoiceSettingsService;

/// Message reported when a prompt is submitted without any provider
pub const NO_PROVIDER_CONFIGURED: &str = "no provider configured";

/// Observable engine state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub conversation_id: ConversationId,
    /// Messages in insertion order
    pub messages: Vec<ChatMessage>,
    /// Whether a reply is in flight
    pub pending: bool,
    pub last_error: Option<String>,
    pub active_provider: Option<ProviderId>,
    /// Message currently being read aloud
    pub speaking: Option<MessageId>,
    /// Text typed or dictated but not yet submitted
    pub input: String,
}

impl EngineSnapshot {
    fn new(active_provider: Option<ProviderId>) -> Self {
        Self {
            conversation_id: ConversationId::current(),
            messages: Vec::new(),
            pending: false,
            last_error: None,
            active_provider,
            speaking: None,
            input: String::new(),
        }
    }

    /// Whether a new prompt may be submitted
    pub const fn can_send(&self) -> bool {
        !self.pending
    }
}

/// Provider bound to one exchange at submission time
struct BoundProvider {
    id: ProviderId,
    label: String,
}

/// Rolls an exchange back when the submitting future is dropped before the
/// reply arrives
struct ExchangeGuard<'a> {
    engine: &'a ConversationEngine,
    armed: bool,
}

impl ExchangeGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.engine.abandon_exchange();
        }
    }
}

/// Orchestrates prompts, replies, persistence and read-aloud
pub struct ConversationEngine {
    gateway: Arc<dyn ProviderGateway>,
    store: Arc<dyn ConversationStore>,
    providers: Vec<ProviderInfo>,
    speech: Option<Arc<dyn SpeechOutputPort>>,
    voice_settings: Option<Arc<VoiceSettingsService>>,
    state: Mutex<EngineSnapshot>,
    tx: watch::Sender<EngineSnapshot>,
}

impl std::fmt::Debug for ConversationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationEngine")
            .field("providers", &self.providers)
            .field("speech", &self.speech.is_some())
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl ConversationEngine {
    /// Create an engine; the first registered provider becomes active
    pub fn new(gateway: Arc<dyn ProviderGateway>, store: Arc<dyn ConversationStore>) -> Self {
        let providers = gateway.providers();
        let active = providers.first().map(|p| p.id.clone());
        let initial = EngineSnapshot::new(active);
        let (tx, _) = watch::channel(initial.clone());

        info!(
            providers = providers.len(),
            active = ?initial.active_provider.as_ref().map(ProviderId::as_str),
            "Conversation engine ready"
        );

        Self {
            gateway,
            store,
            providers,
            speech: None,
            voice_settings: None,
            state: Mutex::new(initial),
            tx,
        }
    }

    /// Enable read-aloud
    #[must_use]
    pub fn with_speech_output(
        mut self,
        speech: Arc<dyn SpeechOutputPort>,
        voice_settings: Arc<VoiceSettingsService>,
    ) -> Self {
        self.speech = Some(speech);
        self.voice_settings = Some(voice_settings);
        self
    }

    fn publish(&self, state: MutexGuard<'_, EngineSnapshot>) {
        let snapshot = state.clone();
        drop(state);
        self.tx.send_replace(snapshot);
    }

    fn update<R>(&self, f: impl FnOnce(&mut EngineSnapshot) -> R) -> R {
        let mut state = self.state.lock();
        let result = f(&mut state);
        self.publish(state);
        result
    }

    fn label_for(&self, id: &ProviderId) -> String {
        self.providers
            .iter()
            .find(|p| &p.id == id)
            .map_or_else(|| id.to_string(), |p| p.display_name.clone())
    }

    fn no_provider(&self, mut state: MutexGuard<'_, EngineSnapshot>) -> ApplicationError {
        warn!("Prompt submitted without a configured provider");
        state.last_error = Some(NO_PROVIDER_CONFIGURED.to_string());
        self.publish(state);
        ApplicationError::Configuration(NO_PROVIDER_CONFIGURED.to_string())
    }

    // ------------------------------------------------------------------
    // Exchanges
    // ------------------------------------------------------------------

    /// Submit a prompt and wait for the reply
    ///
    /// Whitespace-only input does nothing and returns `Ok(None)`. Otherwise
    /// the returned message is the assistant reply, or an error-status
    /// message when the provider failed.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn submit(&self, text: &str) -> Result<Option<ChatMessage>, ApplicationError> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Ok(None);
        }

        let provider = self.begin_exchange(prompt)?;
        let guard = ExchangeGuard {
            engine: self,
            armed: true,
        };
        debug!(provider = %provider.id, "Dispatching prompt");

        let result = self.gateway.send_prompt(&provider.id, prompt).await;
        guard.disarm();
        let (reply, conversation_id, messages) = self.finish_exchange(&provider, result);

        if let Err(e) = self.store.save(&conversation_id, &messages).await {
            warn!(error = %e, conversation_id = %conversation_id, "Failed to persist conversation");
        }

        Ok(Some(reply))
    }

    fn begin_exchange(&self, prompt: &str) -> Result<BoundProvider, ApplicationError> {
        let mut state = self.state.lock();
        if state.pending {
            return Err(ApplicationError::ExchangeInFlight);
        }
        let Some(id) = state.active_provider.clone() else {
            return Err(self.no_provider(state));
        };

        state.messages.push(ChatMessage::user(prompt));
        state.messages.push(ChatMessage::pending());
        state.pending = true;
        state.last_error = None;
        self.publish(state);

        let label = self.label_for(&id);
        Ok(BoundProvider { id, label })
    }

    fn abandon_exchange(&self) {
        let mut state = self.state.lock();
        if !state.pending {
            return;
        }
        warn!("Exchange dropped before the reply arrived");
        state.messages.retain(|m| !m.is_pending());
        state.pending = false;
        self.publish(state);
    }

    fn finish_exchange(
        &self,
        provider: &BoundProvider,
        result: Result<String, ApplicationError>,
    ) -> (ChatMessage, ConversationId, Vec<ChatMessage>) {
        let mut state = self.state.lock();
        state.messages.retain(|m| !m.is_pending());

        let reply = match result {
            Ok(text) => ChatMessage::assistant(text),
            Err(e) => {
                warn!(provider = %provider.id, error = %e, "Exchange failed");
                let description = e.to_string();
                state.last_error = Some(description.clone());
                ChatMessage::error(description)
            },
        }
        .with_provider(provider.id.clone(), provider.label.clone());

        state.messages.push(reply.clone());
        state.pending = false;

        let conversation_id = state.conversation_id.clone();
        let messages = state.messages.clone();
        self.publish(state);
        (reply, conversation_id, messages)
    }

    // ------------------------------------------------------------------
    // Input buffer
    // ------------------------------------------------------------------

    /// Append text to the input buffer
    pub fn append_input(&self, text: &str) {
        self.update(|s| s.input.push_str(text));
    }

    /// Replace the input buffer
    pub fn set_input(&self, text: &str) {
        self.update(|s| text.clone_into(&mut s.input));
    }

    /// Return the input buffer and clear it
    pub fn take_input(&self) -> String {
        self.update(|s| std::mem::take(&mut s.input))
    }

    pub fn input(&self) -> String {
        self.state.lock().input.clone()
    }

    /// Submit the input buffer
    ///
    /// The buffer is kept when the submission is refused.
    pub async fn submit_input(&self) -> Result<Option<ChatMessage>, ApplicationError> {
        let text = {
            let mut state = self.state.lock();
            if state.pending {
                return Err(ApplicationError::ExchangeInFlight);
            }
            if state.input.trim().is_empty() {
                return Ok(None);
            }
            if state.active_provider.is_none() {
                return Err(self.no_provider(state));
            }
            let text = std::mem::take(&mut state.input);
            self.publish(state);
            text
        };
        self.submit(&text).await
    }

    /// Move finalized speech into the input buffer
    ///
    /// Returns the absorbed text, if any.
    pub fn absorb_transcript(&self, source: &dyn TranscriptSource) -> Option<String> {
        let transcript = source.take_final_transcript();
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return None;
        }

        self.update(|s| {
            if !s.input.is_empty() && !s.input.ends_with(char::is_whitespace) {
                s.input.push(' ');
            }
            s.input.push_str(transcript);
        });
        Some(transcript.to_string())
    }

    // ------------------------------------------------------------------
    // Read-aloud
    // ------------------------------------------------------------------

    /// Start or stop reading a message aloud
    ///
    /// Toggling the message that is currently being read stops playback.
    /// Any other message replaces the current one. A message whose playback
    /// already ended is read again. Returns whether the message is now being
    /// read.
    #[instrument(skip(self))]
    pub async fn toggle_read_aloud(&self, id: MessageId) -> Result<bool, ApplicationError> {
        let speech = self
            .speech
            .clone()
            .ok_or_else(|| ApplicationError::Configuration("speech output is not available".to_string()))?;

        let (current, text) = {
            let state = self.state.lock();
            let text = state
                .messages
                .iter()
                .find(|m| m.id == id && !m.is_pending())
                .map(|m| m.text.clone());
            (state.speaking, text)
        };

        let current = match current {
            Some(finished) if !speech.is_speaking() => {
                debug!(message = %finished, "Read-aloud already finished");
                self.update(|s| {
                    if s.speaking == Some(finished) {
                        s.speaking = None;
                    }
                });
                None
            },
            other => other,
        };

        if current == Some(id) {
            speech.stop();
            self.update(|s| s.speaking = None);
            return Ok(false);
        }

        let text = text.ok_or_else(|| ApplicationError::NotFound(format!("message {id}")))?;
        if current.is_some() {
            speech.stop();
        }

        let profile = match &self.voice_settings {
            Some(settings) => settings.current().await,
            None => VoiceProfile::default(),
        };

        match speech.speak(&text, &profile) {
            Ok(()) => {
                self.update(|s| s.speaking = Some(id));
                Ok(true)
            },
            Err(e) => {
                warn!(error = %e, "Read-aloud failed");
                self.update(|s| s.speaking = None);
                Err(e)
            },
        }
    }

    /// Reconcile read-aloud state with the playback device
    pub fn sync_read_aloud(&self, is_speaking: bool) {
        if is_speaking {
            return;
        }
        let mut state = self.state.lock();
        if state.speaking.is_some() {
            state.speaking = None;
            self.publish(state);
        }
    }

    fn stop_read_aloud(&self) {
        if self.state.lock().speaking.is_some()
            && let Some(speech) = &self.speech
        {
            speech.stop();
        }
    }

    // ------------------------------------------------------------------
    // Session and providers
    // ------------------------------------------------------------------

    /// Start an empty conversation under a fresh id
    pub fn new_conversation(&self) -> Result<ConversationId, ApplicationError> {
        self.stop_read_aloud();
        let mut state = self.state.lock();
        if state.pending {
            return Err(ApplicationError::ExchangeInFlight);
        }
        let id = ConversationId::new();
        state.conversation_id = id.clone();
        state.messages.clear();
        state.last_error = None;
        state.speaking = None;
        self.publish(state);
        info!(conversation_id = %id, "Started new conversation");
        Ok(id)
    }

    /// Replace the live conversation with a stored one
    ///
    /// Returns the number of restored messages.
    #[instrument(skip(self), fields(conversation_id = %id))]
    pub async fn load_conversation(&self, id: &ConversationId) -> Result<usize, ApplicationError> {
        let pending = self.state.lock().pending;
        if pending {
            return Err(ApplicationError::ExchangeInFlight);
        }

        let messages: Vec<ChatMessage> = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("conversation {id}")))?
            .into_iter()
            .filter(|m| !m.is_pending())
            .collect();

        if let Some(max) = messages.iter().map(|m| m.id).max() {
            MessageId::observe(max);
        }

        self.stop_read_aloud();
        let mut state = self.state.lock();
        if state.pending {
            return Err(ApplicationError::ExchangeInFlight);
        }
        let count = messages.len();
        state.conversation_id = id.clone();
        state.messages = messages;
        state.last_error = None;
        state.speaking = None;
        self.publish(state);

        debug!(messages = count, "Conversation loaded");
        Ok(count)
    }

    /// Choose the provider used for subsequent prompts
    pub fn set_active_provider(&self, id: &ProviderId) -> Result<(), ApplicationError> {
        if !self.providers.iter().any(|p| &p.id == id) {
            return Err(ApplicationError::UnknownProvider(id.to_string()));
        }
        self.update(|s| s.active_provider = Some(id.clone()));
        info!(provider = %id, "Active provider changed");
        Ok(())
    }

    /// Registered providers in declaration order
    pub fn providers(&self) -> &[ProviderInfo] {
        &self.providers
    }

    /// The active provider, if any
    pub fn active_provider(&self) -> Option<ProviderInfo> {
        let active = self.state.lock().active_provider.clone()?;
        self.providers.iter().find(|p| p.id == active).cloned()
    }

    pub fn clear_error(&self) {
        self.update(|s| s.last_error = None);
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.state.lock().conversation_id.clone()
    }

    /// Copy of the live message list
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().messages.clone()
    }

    pub fn can_send(&self) -> bool {
        self.state.lock().can_send()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.state.lock().clone()
    }

    /// Observe every state transition
    pub fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use domain::{MessageRole, MessageStatus, ProviderFamily};
    use tokio::sync::Notify;

    use super::*;
    use crate::ports::{
        MockConversationStore, MockProviderGateway, MockSpeechOutputPort, MockTranscriptSource,
        MockVoiceSettingsStore, StorageError,
    };

    fn info(id: &str, name: &str) -> ProviderInfo {
        ProviderInfo {
            id: ProviderId::parse(id).unwrap(),
            display_name: name.to_string(),
            icon: None,
            family: ProviderFamily::LocalInference,
            model: "test-model".to_string(),
        }
    }

    fn gateway_with(providers: Vec<ProviderInfo>) -> MockProviderGateway {
        let mut gateway = MockProviderGateway::new();
        gateway.expect_providers().return_const(providers);
        gateway
    }

    fn accepting_store() -> MockConversationStore {
        let mut store = MockConversationStore::new();
        store.expect_save().returning(|_, _| Ok(()));
        store
    }

    /// Gateway whose replies wait until released
    struct HeldGateway {
        providers: Vec<ProviderInfo>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl ProviderGateway for HeldGateway {
        fn providers(&self) -> Vec<ProviderInfo> {
            self.providers.clone()
        }

        async fn send_prompt(
            &self,
            _provider: &ProviderId,
            prompt: &str,
        ) -> Result<String, ApplicationError> {
            self.release.notified().await;
            Ok(format!("echo: {prompt}"))
        }
    }

    async fn wait_for(
        rx: &mut watch::Receiver<EngineSnapshot>,
        f: impl Fn(&EngineSnapshot) -> bool,
    ) -> EngineSnapshot {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| f(s)))
            .await
            .expect("state not reached")
            .expect("engine dropped")
            .clone()
    }

    #[tokio::test]
    async fn whitespace_prompt_is_a_no_op() {
        let mut gateway = gateway_with(vec![info("local", "Local")]);
        gateway.expect_send_prompt().never();
        let mut store = MockConversationStore::new();
        store.expect_save().never();

        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(store));
        assert!(engine.submit("   \n").await.unwrap().is_none());
        assert!(engine.messages().is_empty());
    }

    #[tokio::test]
    async fn successful_exchange_appends_user_and_tagged_reply() {
        let mut gateway = gateway_with(vec![info("local", "Local Model")]);
        gateway
            .expect_send_prompt()
            .withf(|id, prompt| id.as_str() == "local" && prompt == "hello")
            .times(1)
            .returning(|_, _| Ok("hi there".to_string()));
        let mut store = MockConversationStore::new();
        store
            .expect_save()
            .withf(|id, messages| id.as_str() == "current" && messages.len() == 2)
            .times(1)
            .returning(|_, _| Ok(()));

        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(store));
        let reply = engine.submit("  hello ").await.unwrap().unwrap();

        assert_eq!(reply.text, "hi there");
        assert_eq!(reply.status, MessageStatus::Final);
        assert_eq!(reply.provider_label.as_deref(), Some("Local Model"));

        let messages = engine.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[1], reply);
        assert!(!engine.snapshot().pending);
        assert!(engine.snapshot().last_error.is_none());
    }

    #[tokio::test]
    async fn failed_exchange_appends_error_message() {
        let mut gateway = gateway_with(vec![info("cloud", "Cloud")]);
        gateway.expect_send_prompt().returning(|_, _| {
            Err(ApplicationError::Provider {
                message: "API error: 500".to_string(),
                retryable: true,
            })
        });

        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(accepting_store()));
        let reply = engine.submit("hello").await.unwrap().unwrap();

        assert!(reply.is_error());
        assert_eq!(reply.text, "Error: API error: 500");
        assert_eq!(reply.provider_id.as_ref().map(ProviderId::as_str), Some("cloud"));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.last_error.as_deref(), Some("API error: 500"));
        assert!(!snapshot.pending);
    }

    #[tokio::test]
    async fn submit_without_provider_reports_configuration_error() {
        let mut gateway = gateway_with(Vec::new());
        gateway.expect_send_prompt().never();

        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(accepting_store()));
        let err = engine.submit("hello").await.unwrap_err();

        assert!(matches!(err, ApplicationError::Configuration(_)));
        assert!(engine.messages().is_empty());
        assert_eq!(engine.snapshot().last_error.as_deref(), Some(NO_PROVIDER_CONFIGURED));
    }

    #[tokio::test]
    async fn dropped_submit_clears_pending_placeholder() {
        let gateway = HeldGateway {
            providers: vec![info("local", "Local")],
            release: Arc::new(Notify::new()),
        };
        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(accepting_store()));

        let timed_out = tokio::time::timeout(Duration::from_millis(50), engine.submit("hello")).await;
        assert!(timed_out.is_err());

        let snapshot = engine.snapshot();
        assert!(!snapshot.pending);
        assert!(engine.can_send());
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].text, "hello");
        assert!(snapshot.messages.iter().all(|m| !m.is_pending()));
    }

    #[tokio::test]
    async fn storage_failure_does_not_fail_exchange() {
        let mut gateway = gateway_with(vec![info("local", "Local")]);
        gateway
            .expect_send_prompt()
            .returning(|_, _| Ok("ok".to_string()));
        let mut store = MockConversationStore::new();
        store
            .expect_save()
            .returning(|_, _| Err(StorageError::QuotaExceeded("full".to_string()).into()));

        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(store));
        let reply = engine.submit("hello").await.unwrap().unwrap();

        assert_eq!(reply.text, "ok");
        assert!(engine.snapshot().last_error.is_none());
    }

    #[tokio::test]
    async fn pending_placeholder_is_visible_and_blocks_second_submit() {
        let release = Arc::new(Notify::new());
        let gateway = HeldGateway {
            providers: vec![info("local", "Local")],
            release: Arc::clone(&release),
        };
        let engine = Arc::new(ConversationEngine::new(
            Arc::new(gateway),
            Arc::new(accepting_store()),
        ));
        let mut rx = engine.subscribe();

        let task = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.submit("first").await }
        });

        let in_flight = wait_for(&mut rx, |s| s.pending).await;
        assert_eq!(in_flight.messages.len(), 2);
        assert!(in_flight.messages[1].is_pending());
        assert!(!engine.can_send());

        let err = engine.submit("second").await.unwrap_err();
        assert!(matches!(err, ApplicationError::ExchangeInFlight));
        assert_eq!(engine.messages().len(), 2);

        release.notify_one();
        let reply = task.await.unwrap().unwrap().unwrap();
        assert_eq!(reply.text, "echo: first");

        let messages = engine.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| !m.is_pending()));
        assert!(engine.can_send());
    }

    #[tokio::test]
    async fn reply_keeps_provider_bound_at_submission() {
        let release = Arc::new(Notify::new());
        let gateway = HeldGateway {
            providers: vec![info("first", "First"), info("second", "Second")],
            release: Arc::clone(&release),
        };
        let engine = Arc::new(ConversationEngine::new(
            Arc::new(gateway),
            Arc::new(accepting_store()),
        ));
        let mut rx = engine.subscribe();

        let task = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.submit("hello").await }
        });
        wait_for(&mut rx, |s| s.pending).await;

        engine
            .set_active_provider(&ProviderId::parse("second").unwrap())
            .unwrap();
        release.notify_one();

        let reply = task.await.unwrap().unwrap().unwrap();
        assert_eq!(reply.provider_label.as_deref(), Some("First"));
        assert_eq!(engine.active_provider().unwrap().display_name, "Second");
    }

    #[tokio::test]
    async fn unknown_provider_is_rejected() {
        let gateway = gateway_with(vec![info("local", "Local")]);
        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(accepting_store()));

        let err = engine
            .set_active_provider(&ProviderId::parse("missing").unwrap())
            .unwrap_err();
        assert!(matches!(err, ApplicationError::UnknownProvider(_)));
        assert_eq!(engine.active_provider().unwrap().id.as_str(), "local");
    }

    #[tokio::test]
    async fn submit_input_consumes_buffer() {
        let mut gateway = gateway_with(vec![info("local", "Local")]);
        gateway
            .expect_send_prompt()
            .withf(|_, prompt| prompt == "what time is it")
            .returning(|_, _| Ok("noon".to_string()));

        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(accepting_store()));
        engine.set_input("what time");
        engine.append_input(" is it");

        let reply = engine.submit_input().await.unwrap().unwrap();
        assert_eq!(reply.text, "noon");
        assert!(engine.input().is_empty());
    }

    #[tokio::test]
    async fn submit_input_keeps_buffer_without_provider() {
        let engine = ConversationEngine::new(
            Arc::new(gateway_with(Vec::new())),
            Arc::new(accepting_store()),
        );
        engine.set_input("hello");

        assert!(engine.submit_input().await.is_err());
        assert_eq!(engine.input(), "hello");
    }

    #[test]
    fn absorb_transcript_appends_with_separator() {
        let engine = ConversationEngine::new(
            Arc::new(gateway_with(vec![info("local", "Local")])),
            Arc::new(MockConversationStore::new()),
        );
        engine.set_input("turn on");

        let mut source = MockTranscriptSource::new();
        source
            .expect_take_final_transcript()
            .times(1)
            .returning(|| " the lights ".to_string());

        assert_eq!(engine.absorb_transcript(&source).as_deref(), Some("the lights"));
        assert_eq!(engine.input(), "turn on the lights");
    }

    #[test]
    fn absorb_empty_transcript_leaves_input() {
        let engine = ConversationEngine::new(
            Arc::new(gateway_with(vec![info("local", "Local")])),
            Arc::new(MockConversationStore::new()),
        );
        let mut source = MockTranscriptSource::new();
        source
            .expect_take_final_transcript()
            .returning(String::new);

        assert!(engine.absorb_transcript(&source).is_none());
        assert!(engine.input().is_empty());
    }

    fn speaking_engine(speech: MockSpeechOutputPort) -> ConversationEngine {
        let mut gateway = gateway_with(vec![info("local", "Local")]);
        gateway
            .expect_send_prompt()
            .returning(|_, prompt| Ok(format!("reply to {prompt}")));
        let mut settings = MockVoiceSettingsStore::new();
        settings.expect_load().returning(|| Ok(None));

        ConversationEngine::new(Arc::new(gateway), Arc::new(accepting_store())).with_speech_output(
            Arc::new(speech),
            Arc::new(VoiceSettingsService::new(Arc::new(settings))),
        )
    }

    #[tokio::test]
    async fn read_aloud_toggles_same_message_off() {
        let mut speech = MockSpeechOutputPort::new();
        speech
            .expect_speak()
            .withf(|text, profile| text == "reply to a" && *profile == VoiceProfile::default())
            .times(1)
            .returning(|_, _| Ok(()));
        speech.expect_stop().times(1).return_const(());
        speech.expect_is_speaking().return_const(true);

        let engine = speaking_engine(speech);
        let reply = engine.submit("a").await.unwrap().unwrap();

        assert!(engine.toggle_read_aloud(reply.id).await.unwrap());
        assert_eq!(engine.snapshot().speaking, Some(reply.id));

        assert!(!engine.toggle_read_aloud(reply.id).await.unwrap());
        assert_eq!(engine.snapshot().speaking, None);
    }

    #[tokio::test]
    async fn read_aloud_switches_to_other_message() {
        let mut speech = MockSpeechOutputPort::new();
        speech.expect_speak().times(2).returning(|_, _| Ok(()));
        speech.expect_stop().times(1).return_const(());
        speech.expect_is_speaking().return_const(true);

        let engine = speaking_engine(speech);
        let first = engine.submit("a").await.unwrap().unwrap();
        let second = engine.submit("b").await.unwrap().unwrap();

        engine.toggle_read_aloud(first.id).await.unwrap();
        assert!(engine.toggle_read_aloud(second.id).await.unwrap());
        assert_eq!(engine.snapshot().speaking, Some(second.id));
    }

    #[tokio::test]
    async fn read_aloud_replays_after_playback_ended() {
        let mut speech = MockSpeechOutputPort::new();
        speech.expect_speak().times(2).returning(|_, _| Ok(()));
        speech.expect_stop().never();
        speech.expect_is_speaking().return_const(false);

        let engine = speaking_engine(speech);
        let reply = engine.submit("a").await.unwrap().unwrap();

        assert!(engine.toggle_read_aloud(reply.id).await.unwrap());
        assert!(engine.toggle_read_aloud(reply.id).await.unwrap());
        assert_eq!(engine.snapshot().speaking, Some(reply.id));
    }

    #[tokio::test]
    async fn read_aloud_unknown_message_is_not_found() {
        let engine = speaking_engine(MockSpeechOutputPort::new());
        let err = engine
            .toggle_read_aloud(MessageId::from_raw(u64::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn read_aloud_without_speech_output_is_configuration_error() {
        let gateway = gateway_with(vec![info("local", "Local")]);
        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(accepting_store()));
        let err = engine.toggle_read_aloud(MessageId::next()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Configuration(_)));
    }

    #[tokio::test]
    async fn sync_read_aloud_clears_finished_playback() {
        let mut speech = MockSpeechOutputPort::new();
        speech.expect_speak().returning(|_, _| Ok(()));

        let engine = speaking_engine(speech);
        let reply = engine.submit("a").await.unwrap().unwrap();
        engine.toggle_read_aloud(reply.id).await.unwrap();

        engine.sync_read_aloud(true);
        assert_eq!(engine.snapshot().speaking, Some(reply.id));
        engine.sync_read_aloud(false);
        assert_eq!(engine.snapshot().speaking, None);
    }

    #[tokio::test]
    async fn load_conversation_replaces_messages() {
        let stored = vec![
            ChatMessage::user("old question"),
            ChatMessage::assistant("old answer"),
        ];
        let expected = stored.clone();
        let mut store = MockConversationStore::new();
        store
            .expect_load()
            .withf(|id| id.as_str() == "archived")
            .returning(move |_| Ok(Some(stored.clone())));

        let engine = ConversationEngine::new(
            Arc::new(gateway_with(vec![info("local", "Local")])),
            Arc::new(store),
        );
        let id = ConversationId::parse("archived").unwrap();

        assert_eq!(engine.load_conversation(&id).await.unwrap(), 2);
        assert_eq!(engine.conversation_id(), id);
        assert_eq!(engine.messages(), expected);
        assert!(MessageId::next() > expected[1].id);
    }

    #[tokio::test]
    async fn load_missing_conversation_is_not_found() {
        let mut store = MockConversationStore::new();
        store.expect_load().returning(|_| Ok(None));

        let engine = ConversationEngine::new(
            Arc::new(gateway_with(vec![info("local", "Local")])),
            Arc::new(store),
        );
        let err = engine
            .load_conversation(&ConversationId::parse("nope").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
        assert_eq!(engine.conversation_id(), ConversationId::current());
    }

    #[tokio::test]
    async fn new_conversation_clears_messages() {
        let mut gateway = gateway_with(vec![info("local", "Local")]);
        gateway
            .expect_send_prompt()
            .returning(|_, _| Ok("ok".to_string()));
        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(accepting_store()));
        engine.submit("hello").await.unwrap();

        let id = engine.new_conversation().unwrap();
        assert_ne!(id, ConversationId::current());
        assert_eq!(engine.conversation_id(), id);
        assert!(engine.messages().is_empty());
    }

    #[tokio::test]
    async fn every_transition_is_published() {
        let mut gateway = gateway_with(vec![info("local", "Local")]);
        gateway
            .expect_send_prompt()
            .returning(|_, _| Ok("ok".to_string()));
        let engine = ConversationEngine::new(Arc::new(gateway), Arc::new(accepting_store()));
        let rx = engine.subscribe();

        engine.submit("hello").await.unwrap();
        assert_eq!(*rx.borrow(), engine.snapshot());
    }
}
