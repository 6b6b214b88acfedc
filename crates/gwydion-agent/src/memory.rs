//! Conversation memory for stateful agents.

use gwydion_llm::Message;

/// Ordered history of a single conversation.
///
/// Each conversational agent owns one of these; it starts empty and grows
/// one user/assistant pair per exchange.
#[derive(Debug, Default, Clone)]
pub struct ConversationMemory {
    messages: Vec<Message>,
}

impl ConversationMemory {
    /// Create an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    /// Append an assistant message.
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    /// The full history, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the history.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwydion_llm::Role;

    #[test]
    fn test_memory_preserves_order() {
        let mut memory = ConversationMemory::new();
        assert!(memory.is_empty());

        memory.push_user("hello");
        memory.push_assistant("hi there");
        memory.push_user("how are you?");

        let messages = memory.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[2].content, "how are you?");
    }
}
