//! Mock implementations for testing
//!
//! These mocks enable runtime tests without real latency.

use super::{spawn_session, SessionHandle};
use crate::resolver::{Reply, ReplyResolver, ResolutionFailure};
use crate::state_machine::{ExchangeContext, ExchangeState};
use crate::surface::WidgetView;
use crate::transcript::Message;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Resolver
// ============================================================================

/// Mock resolver that returns queued outcomes, echoing input when the queue is empty
pub struct MockResolver {
    outcomes: Mutex<VecDeque<Result<Reply, ResolutionFailure>>>,
    /// Record of all inputs resolved
    pub inputs: Mutex<Vec<String>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, text: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(Reply::new(text)));
    }

    /// Queue a failure
    pub fn queue_failure(&self, error: ResolutionFailure) {
        self.outcomes.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded inputs
    pub fn recorded_inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplyResolver for MockResolver {
    async fn resolve(&self, input: &str) -> Result<Reply, ResolutionFailure> {
        self.inputs.lock().unwrap().push(input.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Reply::new(format!("echo: {input}"))))
    }
}

// ============================================================================
// Gated Resolver (for in-flight testing)
// ============================================================================

/// Resolver that holds every call until the test releases it
pub struct GatedResolver {
    inner: MockResolver,
    gate: Arc<Notify>,
    /// Notified when a resolution starts
    pub started: Arc<Notify>,
}

impl GatedResolver {
    pub fn new() -> Self {
        Self {
            inner: MockResolver::new(),
            gate: Arc::new(Notify::new()),
            started: Arc::new(Notify::new()),
        }
    }

    /// Let one pending (or the next) resolution complete
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn queue_reply(&self, text: &str) {
        self.inner.queue_reply(text);
    }

    pub fn recorded_inputs(&self) -> Vec<String> {
        self.inner.recorded_inputs()
    }
}

#[async_trait]
impl ReplyResolver for GatedResolver {
    async fn resolve(&self, input: &str) -> Result<Reply, ResolutionFailure> {
        self.started.notify_one();
        self.gate.notified().await;
        self.inner.resolve(input).await
    }
}

// ============================================================================
// Panicking Resolver
// ============================================================================

/// Resolver that faults instead of returning
pub struct PanickingResolver;

#[async_trait]
impl ReplyResolver for PanickingResolver {
    async fn resolve(&self, _input: &str) -> Result<Reply, ResolutionFailure> {
        panic!("resolver blew up");
    }
}

// ============================================================================
// Test Session
// ============================================================================

pub const WAIT: Duration = Duration::from_secs(2);

/// Helper for driving a session in tests with minimal boilerplate
pub struct TestSession<R: ReplyResolver + 'static> {
    pub handle: SessionHandle,
    pub resolver: Arc<R>,
}

impl TestSession<MockResolver> {
    /// Session with an instant echoing resolver
    pub fn new() -> Self {
        Self::with_resolver(MockResolver::new())
    }
}

impl<R: ReplyResolver + 'static> TestSession<R> {
    pub fn with_resolver(resolver: R) -> Self {
        let resolver = Arc::new(resolver);
        let handle = spawn_session(ExchangeContext::new("test-session"), resolver.clone());
        Self { handle, resolver }
    }

    /// Wait until the session is idle with exactly `count` messages
    pub async fn wait_for_messages(&self, count: usize) -> WidgetView {
        self.handle
            .wait_for_view(WAIT, |v| {
                v.messages.len() == count && v.state == ExchangeState::Idle
            })
            .await
            .unwrap_or_else(|| panic!("timed out waiting for {count} messages"))
    }

    /// Wait until a reply is in flight
    pub async fn wait_for_pending(&self) -> WidgetView {
        self.handle
            .wait_for_view(WAIT, |v| v.state == ExchangeState::AwaitingReply)
            .await
            .expect("timed out waiting for pending state")
    }

    pub fn messages(&self) -> Vec<Message> {
        self.handle.view().messages
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::rules::{APOLOGY, GREETING};
    use crate::resolver::{KeywordResolver, TimedResolver};
    use crate::runtime::{SessionError, WidgetEvent};
    use crate::state_machine::TransitionError;
    use crate::suggestions::SUGGESTIONS;
    use crate::surface::Visibility;
    use crate::transcript::Sender;

    fn senders(messages: &[Message]) -> Vec<Sender> {
        messages.iter().map(Message::sender).collect()
    }

    #[tokio::test]
    async fn test_mock_resolver() {
        let mock = MockResolver::new();
        mock.queue_reply("Hello");

        assert_eq!(mock.resolve("a").await.unwrap().text(), "Hello");
        // Queue drained, falls back to echo
        assert_eq!(mock.resolve("b").await.unwrap().text(), "echo: b");
        assert_eq!(mock.recorded_inputs(), vec!["a", "b"]);
    }

    /// Integration test: one exchange appends user then assistant
    #[tokio::test]
    async fn test_simple_exchange() {
        let session = TestSession::new();
        session.resolver.queue_reply("Chào bạn!");

        session.handle.submit("  xin chào  ").await.unwrap();
        let view = session.wait_for_messages(2).await;

        assert_eq!(senders(&view.messages), vec![Sender::User, Sender::Assistant]);
        assert_eq!(view.messages[0].text(), "xin chào");
        assert_eq!(view.messages[1].text(), "Chào bạn!");
        assert!(view.messages[0].id < view.messages[1].id);
        assert!(view.messages[0].created_at <= view.messages[1].created_at);
        assert_eq!(view.scroll_anchor, Some(view.messages[1].id));
        assert_eq!(session.resolver.recorded_inputs(), vec!["xin chào"]);
    }

    #[tokio::test]
    async fn test_blank_submission_has_no_effect() {
        let session = TestSession::new();

        let result = session.handle.submit(" \n\t ").await;
        assert_eq!(
            result,
            Err(SessionError::Rejected(TransitionError::EmptySubmission))
        );

        let view = session.handle.view();
        assert!(view.messages.is_empty());
        assert_eq!(view.state, ExchangeState::Idle);
        assert!(session.resolver.recorded_inputs().is_empty());
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_pending() {
        let session = TestSession::with_resolver(GatedResolver::new());
        session.resolver.queue_reply("first answer");

        session.handle.submit("first").await.unwrap();
        tokio::time::timeout(WAIT, session.resolver.started.notified())
            .await
            .expect("resolver should have been called");
        let pending = session.handle.view();
        assert!(pending.typing);
        assert!(!pending.input_enabled);
        assert_eq!(pending.messages.len(), 1);

        let second = session.handle.submit("second").await;
        assert_eq!(second, Err(SessionError::Rejected(TransitionError::ReplyInFlight)));
        assert_eq!(session.handle.view().messages.len(), 1);

        session.resolver.release();
        let view = session.wait_for_messages(2).await;
        assert_eq!(view.messages[1].text(), "first answer");
        assert!(view.input_enabled);
        assert_eq!(session.resolver.recorded_inputs(), vec!["first"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_accepted_submit_is_visible_immediately() {
        for _ in 0..500 {
            let session = TestSession::with_resolver(GatedResolver::new());
            session.handle.submit("question").await.unwrap();

            let view = session.handle.view();
            assert_eq!(view.messages.len(), 1);
            assert_eq!(view.state, ExchangeState::AwaitingReply);
            assert!(!view.input_enabled);
        }
    }

    #[tokio::test]
    async fn test_submit_clears_draft() {
        let session = TestSession::new();
        session.handle.update_draft("Tôi muốn").await.unwrap();
        session
            .handle
            .wait_for_view(WAIT, |v| v.draft == "Tôi muốn")
            .await
            .expect("draft should be published");

        session.handle.submit("Tôi muốn đặt lịch").await.unwrap();
        let view = session.wait_for_messages(2).await;
        assert!(view.draft.is_empty());
    }

    #[tokio::test]
    async fn test_greeting_appended_once() {
        let session = TestSession::new();

        session.handle.open().await.unwrap();
        let view = session.wait_for_messages(1).await;
        assert_eq!(view.visibility, Visibility::Open);
        assert_eq!(view.messages[0].sender(), Sender::Assistant);
        assert_eq!(view.messages[0].text(), GREETING);
        assert_eq!(view.suggestions, SUGGESTIONS);

        session.handle.close().await.unwrap();
        session.handle.open().await.unwrap();
        session.handle.toggle().await.unwrap();
        session.handle.toggle().await.unwrap();
        let view = session
            .handle
            .wait_for_view(WAIT, |v| v.visibility == Visibility::Open)
            .await
            .unwrap();
        assert_eq!(view.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_suggestions_hidden_after_first_exchange() {
        let session = TestSession::new();
        session.handle.open().await.unwrap();
        session.wait_for_messages(1).await;

        session.handle.submit("hỏi").await.unwrap();
        let view = session.wait_for_messages(3).await;
        assert!(view.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_selecting_suggestion_matches_typing() {
        let typed = TestSession::new();
        let picked = TestSession::new();

        typed.handle.submit(SUGGESTIONS[1]).await.unwrap();
        picked.handle.select_suggestion(1).await.unwrap();

        let typed_view = typed.wait_for_messages(2).await;
        let picked_view = picked.wait_for_messages(2).await;

        let contents = |v: &WidgetView| {
            v.messages
                .iter()
                .map(|m| (m.sender(), m.text().to_string()))
                .collect::<Vec<_>>()
        };
        assert_eq!(contents(&typed_view), contents(&picked_view));
        assert_eq!(picked.resolver.recorded_inputs(), vec![SUGGESTIONS[1]]);
    }

    #[tokio::test]
    async fn test_unknown_suggestion_rejected() {
        let session = TestSession::new();
        let result = session.handle.select_suggestion(SUGGESTIONS.len()).await;
        assert_eq!(result, Err(SessionError::UnknownSuggestion(SUGGESTIONS.len())));
        assert!(session.messages().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_failure_becomes_apology() {
        let session = TestSession::new();
        session
            .resolver
            .queue_failure(ResolutionFailure::internal("backend down"));

        session.handle.submit("kết quả xét nghiệm").await.unwrap();
        let view = session.wait_for_messages(2).await;
        assert_eq!(view.messages[1].sender(), Sender::Assistant);
        assert_eq!(view.messages[1].text(), APOLOGY);

        // Back to normal afterwards
        session.handle.submit("again").await.unwrap();
        let view = session.wait_for_messages(4).await;
        assert_eq!(view.messages[3].text(), "echo: again");
    }

    #[tokio::test]
    async fn test_panicking_resolver_becomes_apology() {
        let session = TestSession::with_resolver(PanickingResolver);
        session.handle.submit("hello").await.unwrap();

        let view = session.wait_for_messages(2).await;
        assert_eq!(view.messages[1].text(), APOLOGY);
        assert!(view.input_enabled);
    }

    #[tokio::test]
    async fn test_timeout_becomes_apology() {
        let slow = KeywordResolver::new(Duration::from_secs(30));
        let session =
            TestSession::with_resolver(TimedResolver::new(slow, Duration::from_millis(20)));

        session.handle.submit("đặt lịch").await.unwrap();
        let view = session.wait_for_messages(2).await;
        assert_eq!(view.messages[1].text(), APOLOGY);
    }

    #[tokio::test]
    async fn test_close_while_pending_still_receives_reply() {
        let session = TestSession::with_resolver(GatedResolver::new());
        session.resolver.queue_reply("late reply");

        session.handle.open().await.unwrap();
        session.wait_for_messages(1).await;

        session.handle.submit("question").await.unwrap();
        session.wait_for_pending().await;
        session.handle.close().await.unwrap();

        session.resolver.release();
        let view = session.wait_for_messages(3).await;
        assert_eq!(view.visibility, Visibility::Closed);
        assert_eq!(view.messages[2].text(), "late reply");

        // Reopening keeps the transcript and does not greet again
        session.handle.open().await.unwrap();
        let view = session
            .handle
            .wait_for_view(WAIT, |v| v.visibility == Visibility::Open)
            .await
            .unwrap();
        assert_eq!(view.messages.len(), 3);
    }

    #[tokio::test]
    async fn test_broadcast_order() {
        let session = TestSession::new();
        let mut rx = session.handle.subscribe();

        session.handle.submit("hi").await.unwrap();
        session.wait_for_messages(2).await;

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(match event {
                WidgetEvent::Message { message } => format!("message:{}", message.sender()),
                WidgetEvent::StateChange { state, .. } => format!("state:{state}"),
                WidgetEvent::Scroll { .. } => "scroll".to_string(),
                WidgetEvent::Visibility { .. } => "visibility".to_string(),
            });
        }
        assert_eq!(
            kinds,
            vec![
                "message:user",
                "scroll",
                "state:awaiting_reply",
                "message:assistant",
                "scroll",
                "state:idle",
            ]
        );
    }
}
