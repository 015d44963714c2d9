use super::verdict::GovernanceVerdict;
use crate::llm::ChatMessage;

/// Conversation history that only ever holds released exchanges.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    messages: Vec<ChatMessage>,
    cumulative_risk_score: f64,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Sum of confidence over blocked verdicts. Informational only.
    pub fn cumulative_risk_score(&self) -> f64 {
        self.cumulative_risk_score
    }

    /// History plus a pending user turn, without committing it.
    pub(crate) fn with_user_turn(&self, input: &str) -> Vec<ChatMessage> {
        let mut pending = Vec::with_capacity(self.messages.len() + 1);
        pending.extend_from_slice(&self.messages);
        pending.push(ChatMessage::user(input));
        pending
    }

    pub(crate) fn commit_exchange(&mut self, input: &str, response: &str) {
        self.messages.push(ChatMessage::user(input));
        self.messages.push(ChatMessage::assistant(response));
    }

    pub(crate) fn record_block(&mut self, verdict: &GovernanceVerdict) {
        self.cumulative_risk_score += verdict.confidence_score();
    }
}

/// Per-caller conversation state.
#[derive(Debug, Clone)]
pub struct Session {
    pub caller_id: String,
    pub context: ConversationContext,
}

impl Session {
    pub fn new(caller_id: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            context: ConversationContext::new(),
        }
    }
}
