use async_trait::async_trait;
use murmur_core::{ActionIntent, CoreError, Post};

/// Context blob handed to the engine: who is speaking, what they are
/// looking at, and the conversation leading up to it. The pipeline owns
/// the structure; the wording of the surrounding prompt belongs to the
/// engine implementation.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub agent_name: String,
    pub focus: String,
    pub thread_history: Vec<String>,
}

impl PromptContext {
    /// Context for composing a brand-new post, no conversation attached.
    pub fn for_new_post(agent_name: &str) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            focus: String::new(),
            thread_history: Vec::new(),
        }
    }

    /// Context for reacting to one timeline post with its reconstructed
    /// thread, root first.
    pub fn for_post(agent_name: &str, post: &Post, thread: &[Post]) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            focus: format_post(post),
            thread_history: thread.iter().map(|p| format_post(p)).collect(),
        }
    }
}

fn format_post(post: &Post) -> String {
    let reply_note = match &post.reply_to_id {
        Some(parent) => format!(" In reply to: {parent}"),
        None => String::new(),
    };
    format!(
        "ID: {}\nFrom: {}{}\nText: {}\n---",
        post.id, post.author_id, reply_note, post.text
    )
}

/// Opaque generation seam: text in, text or an action decision out.
#[async_trait]
pub trait GenerationEngine: Send + Sync {
    async fn generate_text(&self, context: &PromptContext) -> Result<String, CoreError>;

    async fn decide_actions(&self, context: &PromptContext) -> Result<ActionIntent, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(id: &str, reply_to: Option<&str>) -> Post {
        Post {
            id: id.to_string(),
            author_id: "user-1".to_string(),
            text: "some text".to_string(),
            created_at: Utc::now(),
            reply_to_id: reply_to.map(|s| s.to_string()),
            conversation_id: "c1".to_string(),
        }
    }

    #[test]
    fn test_focus_mentions_reply_parent() {
        let ctx = PromptContext::for_post("murmur", &post("p2", Some("p1")), &[]);
        assert!(ctx.focus.contains("ID: p2"));
        assert!(ctx.focus.contains("In reply to: p1"));
    }

    #[test]
    fn test_thread_history_keeps_order() {
        let thread = vec![post("p1", None), post("p2", Some("p1"))];
        let ctx = PromptContext::for_post("murmur", &thread[1], &thread);
        assert_eq!(ctx.thread_history.len(), 2);
        assert!(ctx.thread_history[0].contains("ID: p1"));
        assert!(ctx.thread_history[1].contains("ID: p2"));
    }
}
