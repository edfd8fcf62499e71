use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{Message, Role, TranscriptError};

/// Append-only conversation log. Entries are never reordered or edited once pushed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Message>", into = "Vec<Message>")]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new(system: impl Into<String>, user: Option<String>) -> Self {
        let mut messages = vec![Message::system(system)];
        if let Some(user) = user {
            messages.push(Message::user(user));
        }
        Self { messages }
    }

    /// Rebuilds a transcript from stored messages, checking every tool message.
    pub fn from_messages(messages: Vec<Message>) -> Result<Self, TranscriptError> {
        let mut transcript = Self::default();
        for message in messages {
            transcript.push(message)?;
        }
        Ok(transcript)
    }

    pub fn push(&mut self, message: Message) -> Result<(), TranscriptError> {
        if message.role == Role::Tool {
            self.check_tool_message(&message)?;
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::Assistant)
            .map(|message| message.content.as_str())
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    // A tool message answers one call of the assistant message that directly
    // precedes the current run of tool messages, and each call is answered once.
    fn check_tool_message(&self, message: &Message) -> Result<(), TranscriptError> {
        let Some(call_id) = message.tool_call_id.as_deref() else {
            return Err(TranscriptError::MissingToolCallId);
        };

        let mut answered = HashSet::new();
        let mut assistant = None;
        for previous in self.messages.iter().rev() {
            match previous.role {
                Role::Tool => {
                    if let Some(id) = previous.tool_call_id.as_deref() {
                        answered.insert(id);
                    }
                }
                Role::Assistant => {
                    assistant = Some(previous);
                    break;
                }
                _ => break,
            }
        }

        let Some(assistant) = assistant else {
            return Err(TranscriptError::NoPendingToolCalls {
                call_id: call_id.to_string(),
            });
        };
        if !assistant.tool_calls.iter().any(|call| call.id == call_id) {
            return Err(TranscriptError::UnknownToolCallId {
                call_id: call_id.to_string(),
            });
        }
        if answered.contains(call_id) {
            return Err(TranscriptError::DuplicateToolResult {
                call_id: call_id.to_string(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<Message>> for Transcript {
    type Error = TranscriptError;

    fn try_from(messages: Vec<Message>) -> Result<Self, Self::Error> {
        Self::from_messages(messages)
    }
}

impl From<Transcript> for Vec<Message> {
    fn from(transcript: Transcript) -> Self {
        transcript.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolCallRequest;

    fn transcript_with_calls(ids: &[&str]) -> Transcript {
        let mut transcript = Transcript::new("sys", Some("do things".to_string()));
        let calls = ids
            .iter()
            .map(|id| ToolCallRequest::new(*id, "shell", "{}"))
            .collect();
        transcript
            .push(Message::assistant_with_tool_calls("", calls))
            .expect("assistant push");
        transcript
    }

    #[test]
    fn new_transcript_has_system_then_user() {
        let transcript = Transcript::new("sys", Some("hello".to_string()));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].role, Role::System);
        assert_eq!(transcript.messages()[1].role, Role::User);

        let bare = Transcript::new("sys", None);
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn tool_messages_answer_pending_calls_in_any_order() {
        let mut transcript = transcript_with_calls(&["a", "b"]);
        transcript
            .push(Message::tool_result("b", "shell", "{}"))
            .expect("b is pending");
        transcript
            .push(Message::tool_result("a", "shell", "{}"))
            .expect("a is pending");
        assert_eq!(transcript.len(), 5);
    }

    #[test]
    fn tool_message_with_unknown_call_id_is_rejected() {
        let mut transcript = transcript_with_calls(&["a"]);
        let error = transcript
            .push(Message::tool_result("zzz", "shell", "{}"))
            .expect_err("unknown id");
        assert!(matches!(error, TranscriptError::UnknownToolCallId { .. }));
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn tool_message_answering_twice_is_rejected() {
        let mut transcript = transcript_with_calls(&["a"]);
        transcript
            .push(Message::tool_result("a", "shell", "{}"))
            .expect("first answer");
        let error = transcript
            .push(Message::tool_result("a", "shell", "{}"))
            .expect_err("second answer");
        assert!(matches!(error, TranscriptError::DuplicateToolResult { .. }));
    }

    #[test]
    fn tool_message_without_preceding_assistant_is_rejected() {
        let mut transcript = Transcript::new("sys", Some("hi".to_string()));
        let error = transcript
            .push(Message::tool_result("a", "shell", "{}"))
            .expect_err("no assistant");
        assert!(matches!(error, TranscriptError::NoPendingToolCalls { .. }));
    }

    #[test]
    fn from_messages_validates_and_round_trips_through_json() {
        let transcript = transcript_with_calls(&["a"]);
        let mut messages = transcript.into_messages();
        messages.push(Message::tool_result("a", "shell", "{\"ok\":true}"));
        messages.push(Message::assistant("done").with_continuation_token("resp_2"));

        let transcript = Transcript::from_messages(messages).expect("valid");
        let encoded = serde_json::to_string(&transcript).expect("encode");
        let decoded: Transcript = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded, transcript);
        assert_eq!(decoded.last_assistant_text(), Some("done"));
    }

    #[test]
    fn deserializing_an_invalid_log_fails() {
        let encoded = r#"[{"role":"system","content":"s"},{"role":"tool","content":"{}","tool_call_id":"x","name":"shell"}]"#;
        assert!(serde_json::from_str::<Transcript>(encoded).is_err());
    }
}
