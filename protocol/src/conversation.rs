use crate::message::{ChatMessage, Message, Role};

/// Ordered, append-only message list for one browser session.
///
/// At most one assistant message is "in flight" at a time: the response of
/// the current exchange while it is still streaming. It is the only message
/// whose content may change; everything else is frozen once appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
    in_flight: Option<usize>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message, freezing any in-flight assistant message first.
    pub fn append(&mut self, message: Message) -> &Message {
        self.in_flight = None;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Starts a new exchange with the user's text.
    pub fn begin_exchange(&mut self, text: impl Into<String>) -> &Message {
        self.append(Message::new(Role::User, text))
    }

    /// Mirrors the reassembled content into the in-flight assistant message,
    /// creating it on the first call of an exchange.
    pub fn publish_assistant(&mut self, content: &str) -> &Message {
        match self.in_flight {
            Some(index) => {
                let message = &mut self.messages[index];
                if message.content != content {
                    message.content.clear();
                    message.content.push_str(content);
                }
                &self.messages[index]
            }
            None => {
                self.messages.push(Message::new(Role::Assistant, content));
                let index = self.messages.len() - 1;
                self.in_flight = Some(index);
                &self.messages[index]
            }
        }
    }

    pub fn current_exchange_assistant_message(&self) -> Option<&Message> {
        self.in_flight.map(|index| &self.messages[index])
    }

    /// Freezes the in-flight message, if any.
    pub fn finish_exchange(&mut self) {
        self.in_flight = None;
    }

    /// Freezes whatever arrived and appends one user-visible fallback reply.
    pub fn fail_exchange(&mut self, fallback: impl Into<String>) -> &Message {
        self.append(Message::new(Role::Assistant, fallback))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The wire history to send with the next request.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages.iter().map(Message::to_chat_message).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Discards the whole session (logout, reload).
    pub fn reset(&mut self) {
        self.messages.clear();
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::StreamEvent;
    use crate::reassembler::Reassembler;

    #[test]
    fn first_publish_creates_then_overwrites() {
        let mut conv = Conversation::new();
        conv.begin_exchange("Give me one tip.");
        assert!(conv.current_exchange_assistant_message().is_none());

        let id = conv.publish_assistant("Sure").id.clone();
        conv.publish_assistant("Sure, here");
        let current = conv.current_exchange_assistant_message().unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.content, "Sure, here");
        assert_eq!(conv.len(), 2);
    }

    #[test]
    fn repeated_publish_of_same_content_is_idempotent() {
        let mut conv = Conversation::new();
        conv.begin_exchange("q");
        conv.publish_assistant("ab");
        let before = conv.clone();
        conv.publish_assistant("ab");
        assert_eq!(conv, before);
    }

    #[test]
    fn new_exchange_freezes_previous_answer() {
        let mut conv = Conversation::new();
        conv.begin_exchange("one");
        conv.publish_assistant("first answer");
        conv.finish_exchange();
        assert!(conv.current_exchange_assistant_message().is_none());

        conv.begin_exchange("two");
        conv.publish_assistant("second");
        assert_eq!(conv.messages()[1].content, "first answer");
        assert_eq!(conv.messages()[3].content, "second");
    }

    #[test]
    fn history_preserves_order_and_roles() {
        let mut conv = Conversation::new();
        conv.begin_exchange("hi");
        conv.publish_assistant("hello");
        conv.finish_exchange();
        conv.begin_exchange("how are you?");

        assert_eq!(
            conv.history(),
            vec![
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
                ChatMessage::user("how are you?"),
            ]
        );
    }

    #[test]
    fn failure_keeps_partial_answer_and_adds_fallback() {
        let mut conv = Conversation::new();
        conv.begin_exchange("q");
        conv.publish_assistant("Hello world");
        conv.fail_exchange("Sorry, I encountered an error. Please try again.");

        assert!(conv.current_exchange_assistant_message().is_none());
        let contents: Vec<&str> = conv.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["q", "Hello world", "Sorry, I encountered an error. Please try again."]
        );
    }

    #[test]
    fn reset_discards_everything() {
        let mut conv = Conversation::new();
        conv.begin_exchange("q");
        conv.publish_assistant("a");
        conv.reset();
        assert!(conv.is_empty());
        assert!(conv.current_exchange_assistant_message().is_none());
    }

    #[test]
    fn drives_from_reassembler_updates() {
        let mut conv = Conversation::new();
        conv.begin_exchange("Give me one tip.");

        let stream: String = ["Sure", ", here", " it is."]
            .iter()
            .map(|t| StreamEvent::Fragment(t.to_string()).encode())
            .chain(std::iter::once(StreamEvent::Done.encode()))
            .collect();

        let mut reassembler = Reassembler::new();
        reassembler
            .feed_with(stream.as_bytes(), |content| {
                conv.publish_assistant(content);
            })
            .unwrap();
        reassembler.finish().unwrap();
        conv.finish_exchange();

        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[1].role, Role::Assistant);
        assert_eq!(conv.messages()[1].content, "Sure, here it is.");
    }

    #[test]
    fn empty_leading_fragment_creates_no_assistant_message() {
        let mut conv = Conversation::new();
        conv.begin_exchange("q");

        let mut reassembler = Reassembler::new();
        reassembler
            .feed_with(StreamEvent::Fragment(String::new()).encode().as_bytes(), |content| {
                conv.publish_assistant(content);
            })
            .unwrap();
        assert!(conv.current_exchange_assistant_message().is_none());
        assert_eq!(conv.len(), 1);

        reassembler
            .feed_with(StreamEvent::Fragment("A".into()).encode().as_bytes(), |content| {
                conv.publish_assistant(content);
            })
            .unwrap();
        assert_eq!(conv.current_exchange_assistant_message().unwrap().content, "A");
        assert_eq!(conv.len(), 2);
    }
}
