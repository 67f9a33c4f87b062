//! Session log and the state machine around a single in-flight question.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use shared::domain::{Message, MessageId, Role, SessionId, Source};
use tracing::{info, warn};

use crate::AnswerService;

/// The one user-visible failure shape. Every failed exchange renders as
/// this text regardless of cause.
pub const GENERIC_FAILURE_TEXT: &str = "Something went wrong. Please try again.";

/// What to do with a submission that arrives while a request is in flight.
/// `Drop` matches a UI that disables its send control until resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    #[default]
    Drop,
    Queue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Waiting,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    QuestionSubmitted {
        text: String,
        at: DateTime<Utc>,
    },
    AnswerReceived {
        answer: String,
        sources: Vec<Source>,
        at: DateTime<Utc>,
    },
    ExchangeFailed {
        at: DateTime<Utc>,
    },
}

/// Outcome of applying one event to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A user message was appended; the trimmed question must now be sent.
    Dispatched { question: String },
    /// Empty or whitespace-only text; nothing appended, nothing sent.
    IgnoredEmpty,
    /// A request is in flight and the policy is `Drop`.
    RejectedBusy,
    /// A request is in flight and the policy is `Queue`; the question is
    /// held until the current exchange resolves.
    Queued,
    /// The in-flight exchange resolved. With `Queue`, `next` carries the
    /// question that was just dispatched from the hold queue.
    Resolved { next: Option<String> },
    /// A resolution arrived with nothing in flight; dropped.
    Discarded,
}

/// Append-only message log for one conversation. All mutation goes through
/// [`Session::apply`]; rendering lives elsewhere.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    log: Vec<Message>,
    phase: SessionPhase,
    policy: OverlapPolicy,
    held: VecDeque<String>,
    next_message_id: i64,
}

impl Session {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            id: SessionId::new(),
            log: Vec::new(),
            phase: SessionPhase::Idle,
            policy,
            held: VecDeque::new(),
            next_message_id: 1,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn messages(&self) -> &[Message] {
        &self.log
    }

    pub fn apply(&mut self, event: SessionEvent) -> Transition {
        match event {
            SessionEvent::QuestionSubmitted { text, at } => self.submit(&text, at),
            SessionEvent::AnswerReceived {
                answer,
                sources,
                at,
            } => self.resolve(Some((answer, sources)), at),
            SessionEvent::ExchangeFailed { at } => self.resolve(None, at),
        }
    }

    fn submit(&mut self, text: &str, at: DateTime<Utc>) -> Transition {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Transition::IgnoredEmpty;
        }

        if self.phase == SessionPhase::Waiting {
            return match self.policy {
                OverlapPolicy::Drop => Transition::RejectedBusy,
                OverlapPolicy::Queue => {
                    self.held.push_back(trimmed.to_string());
                    Transition::Queued
                }
            };
        }

        let question = trimmed.to_string();
        self.append(Role::User, question.clone(), at, Vec::new());
        self.phase = SessionPhase::Waiting;
        Transition::Dispatched { question }
    }

    fn resolve(
        &mut self,
        outcome: Option<(String, Vec<Source>)>,
        at: DateTime<Utc>,
    ) -> Transition {
        if self.phase != SessionPhase::Waiting {
            warn!(session = %self.id.0, "resolution arrived with no exchange in flight");
            return Transition::Discarded;
        }

        match outcome {
            Some((answer, sources)) => self.append(Role::Assistant, answer, at, sources),
            None => self.append(Role::Error, GENERIC_FAILURE_TEXT.to_string(), at, Vec::new()),
        }
        self.phase = SessionPhase::Idle;

        // Held questions were already trimmed and non-empty on entry.
        let next = self.held.pop_front();
        if let Some(question) = &next {
            self.append(Role::User, question.clone(), at, Vec::new());
            self.phase = SessionPhase::Waiting;
        }
        Transition::Resolved { next }
    }

    fn append(&mut self, role: Role, text: String, at: DateTime<Utc>, sources: Vec<Source>) {
        let id = MessageId(self.next_message_id);
        self.next_message_id += 1;
        self.log.push(Message {
            id,
            role,
            text,
            sent_at: at,
            sources,
        });
    }
}

/// Drives the session against an [`AnswerService`]: one request per accepted
/// submission, each resolving to exactly one assistant or error message.
/// No retry, no cancellation, no timeout.
pub struct SessionController<S> {
    session: Session,
    service: S,
    result_count: u32,
}

impl<S: AnswerService> SessionController<S> {
    pub fn new(service: S, result_count: u32, policy: OverlapPolicy) -> Self {
        Self {
            session: Session::new(policy),
            service,
            result_count,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Submit a question and wait for the exchange to settle. Returns the
    /// final transition: `IgnoredEmpty`/`RejectedBusy` when nothing was
    /// sent, otherwise the `Resolved` that closed the exchange.
    pub async fn submit_question(&mut self, text: &str) -> Transition {
        let opening = self.session.apply(SessionEvent::QuestionSubmitted {
            text: text.to_string(),
            at: Utc::now(),
        });

        let mut question = match opening {
            Transition::Dispatched { question } => question,
            other => return other,
        };

        loop {
            info!(session = %self.session.id().0, "dispatching question");
            let event = match self.service.ask(&question, self.result_count).await {
                Ok(answer) => SessionEvent::AnswerReceived {
                    answer: answer.text,
                    sources: answer.sources,
                    at: Utc::now(),
                },
                Err(err) => {
                    warn!(session = %self.session.id().0, error = %err, "exchange failed");
                    SessionEvent::ExchangeFailed { at: Utc::now() }
                }
            };

            match self.session.apply(event) {
                Transition::Resolved {
                    next: Some(held_question),
                } => question = held_question,
                transition => return transition,
            }
        }
    }
}
