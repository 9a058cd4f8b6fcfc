//! Session runtime executor

use super::{Ack, SessionCommand, SessionError, WidgetEvent};
use crate::resolver::{Reply, ReplyResolver, ResolutionFailure};
use crate::state_machine::{transition, Effect, Event, ExchangeContext, ExchangeState, TransitionError};
use crate::suggestions::suggestion;
use crate::surface::{Surface, WidgetView};
use crate::transcript::{Message, MessageContent, MessageIds, Submission, Transcript};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

/// Runtime for one widget session, generic over the reply resolver
pub struct ExchangeRuntime<R>
where
    R: ReplyResolver + ?Sized + 'static,
{
    context: ExchangeContext,
    state: ExchangeState,
    transcript: Transcript,
    ids: MessageIds,
    surface: Surface,
    resolver: Arc<R>,
    command_rx: mpsc::Receiver<SessionCommand>,
    /// Weak so the runtime stops once every handle is dropped
    command_tx: mpsc::WeakSender<SessionCommand>,
    broadcast_tx: broadcast::Sender<WidgetEvent>,
    view_tx: watch::Sender<WidgetView>,
}

impl<R> ExchangeRuntime<R>
where
    R: ReplyResolver + ?Sized + 'static,
{
    pub fn new(
        context: ExchangeContext,
        resolver: Arc<R>,
        command_rx: mpsc::Receiver<SessionCommand>,
        command_tx: mpsc::WeakSender<SessionCommand>,
        broadcast_tx: broadcast::Sender<WidgetEvent>,
        view_tx: watch::Sender<WidgetView>,
    ) -> Self {
        Self {
            context,
            state: ExchangeState::Idle,
            transcript: Transcript::new(),
            ids: MessageIds::new(),
            surface: Surface::new(),
            resolver,
            command_rx,
            command_tx,
            broadcast_tx,
            view_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting session runtime");
        self.publish_view();

        // Process commands in arrival order until every handle is gone
        while let Some(command) = self.command_rx.recv().await {
            let outcome = self.process_command(command);
            self.publish_view();

            // Callers are told only once the view reflects their command
            if let Some((ack, result)) = outcome {
                respond(ack, result);
            }
        }

        tracing::info!(
            session_id = %self.context.session_id,
            messages = self.transcript.size(),
            last_message = ?self.transcript.latest().map(|m| m.id),
            "Session runtime stopped"
        );
    }

    /// Apply one command. Acknowledged commands hand back their ack and
    /// result so the caller can reply after publishing.
    fn process_command(&mut self, command: SessionCommand) -> Option<(Option<Ack>, CommandResult)> {
        match command {
            SessionCommand::Submit { text, ack } => {
                let result = self.process_event(Event::Submit { text });
                return Some((ack, result));
            }

            // Same path as typing: the text goes through the Submit transition
            SessionCommand::SelectSuggestion { index, ack } => {
                let result = match suggestion(index) {
                    Some(text) => self.process_event(Event::submit(text)),
                    None => Err(SessionError::UnknownSuggestion(index)),
                };
                return Some((ack, result));
            }

            SessionCommand::Exchange(event) => {
                if let Err(e) = self.process_event(event) {
                    tracing::warn!(session_id = %self.context.session_id, error = %e, "Dropped resolver event");
                }
            }

            SessionCommand::Open => {
                let needs_greeting = self.surface.open(self.transcript.is_empty());
                self.notify_visibility();
                if needs_greeting {
                    self.append(MessageContent::assistant(Reply::greeting()));
                }
            }

            SessionCommand::Close => {
                self.surface.close();
                self.notify_visibility();
            }

            SessionCommand::Toggle => {
                let needs_greeting = self.surface.toggle(self.transcript.is_empty());
                self.notify_visibility();
                if needs_greeting {
                    self.append(MessageContent::assistant(Reply::greeting()));
                }
            }

            SessionCommand::UpdateDraft { text } => self.surface.set_draft(text),
        }
        None
    }

    fn process_event(&mut self, event: Event) -> CommandResult {
        // Pure state transition
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                match &e {
                    TransitionError::EmptySubmission | TransitionError::ReplyInFlight => {
                        tracing::debug!(session_id = %self.context.session_id, reason = %e, "Submission ignored");
                    }
                    TransitionError::InvalidTransition(_) => {
                        tracing::warn!(session_id = %self.context.session_id, error = %e, "Invalid transition");
                    }
                }
                return Err(e.into());
            }
        };

        if result.new_state != self.state {
            tracing::debug!(
                session_id = %self.context.session_id,
                from = %self.state,
                to = %result.new_state,
                "State transition"
            );
        }
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }
        Ok(())
    }

    /// Execute an effect
    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage { content } => self.append(content),

            Effect::ClearInput => self.surface.clear_draft(),

            Effect::PublishState => {
                let _ = self.broadcast_tx.send(WidgetEvent::StateChange {
                    state: self.state,
                    typing: self.state.is_pending(),
                });
            }

            Effect::RequestReply { submission } => self.spawn_resolution(submission),
        }
    }

    /// Append to the transcript, stamped now, and scroll to it
    fn append(&mut self, content: MessageContent) {
        let message = Message::new(self.ids.allocate(), content);
        let message_id = message.id;

        tracing::debug!(
            session_id = %self.context.session_id,
            message_id = %message_id,
            sender = %message.sender(),
            chars = message.text().chars().count(),
            "Appending message"
        );

        self.transcript.append(message.clone());
        self.surface.scroll_to(message_id);

        let _ = self.broadcast_tx.send(WidgetEvent::Message { message });
        let _ = self.broadcast_tx.send(WidgetEvent::Scroll { message_id });
    }

    /// Resolve in the background and post the outcome back as an event.
    /// A panicking resolver is reported as a failure, never dropped.
    fn spawn_resolution(&self, submission: Submission) {
        let Some(command_tx) = self.command_tx.upgrade() else {
            tracing::warn!(session_id = %self.context.session_id, "Session closing, reply not requested");
            return;
        };
        let resolver = self.resolver.clone();
        let session_id = self.context.session_id.clone();

        tokio::spawn(async move {
            tracing::info!(session_id = %session_id, "Resolving reply (background)");

            let call = tokio::spawn(async move { resolver.resolve(submission.as_str()).await });
            let event = match call.await {
                Ok(Ok(reply)) => Event::ReplyResolved { reply },
                Ok(Err(error)) => {
                    tracing::warn!(session_id = %session_id, error = %error, "Reply resolution failed");
                    Event::ResolutionFailed { error }
                }
                Err(join_error) => {
                    tracing::error!(session_id = %session_id, error = %join_error, "Resolver task faulted");
                    Event::ResolutionFailed {
                        error: ResolutionFailure::internal(join_error.to_string()),
                    }
                }
            };

            if command_tx.send(SessionCommand::Exchange(event)).await.is_err() {
                tracing::debug!(session_id = %session_id, "Session gone before reply arrived");
            }
        });
    }

    fn notify_visibility(&self) {
        let _ = self.broadcast_tx.send(WidgetEvent::Visibility {
            visibility: self.surface.visibility(),
        });
    }

    fn publish_view(&self) {
        self.view_tx
            .send_replace(self.surface.view(self.state, &self.transcript));
    }
}

type CommandResult = Result<(), SessionError>;

fn respond(ack: Option<Ack>, result: CommandResult) {
    if let Some(ack) = ack {
        let _ = ack.send(result);
    }
}
