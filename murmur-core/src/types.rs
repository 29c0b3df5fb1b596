use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of social content fetched from the platform. Immutable once
/// fetched; identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub reply_to_id: Option<String>,
    pub conversation_id: String,
}

/// What the platform hands back after a successful publish or quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// The platform actions the pipeline can take on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Like,
    Share,
    Quote,
    Reply,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Like => "like",
            ActionKind::Share => "share",
            ActionKind::Quote => "quote",
            ActionKind::Reply => "reply",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision snapshot for one post: which actions the generation engine
/// chose. Produced once, consumed once by the executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionIntent {
    pub like: bool,
    pub share: bool,
    pub quote: bool,
    pub reply: bool,
}

impl ActionIntent {
    pub fn is_empty(&self) -> bool {
        !(self.like || self.share || self.quote || self.reply)
    }

    pub fn enabled(&self) -> Vec<ActionKind> {
        let mut kinds = Vec::new();
        if self.like {
            kinds.push(ActionKind::Like);
        }
        if self.share {
            kinds.push(ActionKind::Share);
        }
        if self.quote {
            kinds.push(ActionKind::Quote);
        }
        if self.reply {
            kinds.push(ActionKind::Reply);
        }
        kinds
    }
}

/// Durable evidence that a post has been handled by one agent. Created
/// once per `(post_id, agent_id)` pair and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRecord {
    pub key: String,
    pub post_id: String,
    pub processed_at: DateTime<Utc>,
    pub executed_actions: Vec<ActionKind>,
}

impl ProcessingRecord {
    pub fn new(post_id: &str, agent_id: &str, executed_actions: Vec<ActionKind>) -> Self {
        Self {
            key: processing_key(post_id, agent_id),
            post_id: post_id.to_string(),
            processed_at: Utc::now(),
            executed_actions,
        }
    }

    /// Record for a post visited only as conversation context, with no
    /// actions executed against it.
    pub fn context_only(post_id: &str, agent_id: &str) -> Self {
        Self::new(post_id, agent_id, Vec::new())
    }
}

/// Ordered conversation, oldest first, root to leaf.
pub type ConversationThread = Vec<Post>;

/// Persisted per scheduled activity so restarts honor elapsed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastRunMarker {
    pub scope: String,
    pub timestamp: DateTime<Utc>,
}

/// Deterministic dedup key for a post under one agent's identity. The
/// same post never double-processes per agent because this key never
/// changes.
pub fn processing_key(post_id: &str, agent_id: &str) -> String {
    format!("post:{post_id}-{agent_id}")
}

/// Deterministic room key for a conversation under one agent's identity.
pub fn room_key(conversation_id: &str, agent_id: &str) -> String {
    format!("room:{conversation_id}-{agent_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_key_is_deterministic() {
        let a = processing_key("p1", "agent");
        let b = processing_key("p1", "agent");
        assert_eq!(a, b);
        assert_ne!(a, processing_key("p1", "other-agent"));
        assert_ne!(a, processing_key("p2", "agent"));
    }

    #[test]
    fn test_action_intent_enabled() {
        let intent = ActionIntent {
            like: true,
            share: false,
            quote: true,
            reply: false,
        };
        assert_eq!(intent.enabled(), vec![ActionKind::Like, ActionKind::Quote]);
        assert!(!intent.is_empty());
        assert!(ActionIntent::default().is_empty());
    }

    #[test]
    fn test_record_roundtrip() {
        let record = ProcessingRecord::new("p1", "agent", vec![ActionKind::Share]);
        let json = serde_json::to_value(&record).unwrap();
        let back: ProcessingRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record, back);
        assert_eq!(back.executed_actions, vec![ActionKind::Share]);
    }
}
