//! Support chat session.

use crate::api::ChatApi;
use crate::booking::Notice;
use crate::error::ApiError;
use crate::i18n::Localizer;
use crate::models::{ChatRequest, ChatResponse};
use chrono::Utc;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub role: ChatRole,
    pub text: Notice,
}

impl ChatLine {
    pub fn render(&self, l10n: &dyn Localizer) -> String {
        self.text.render(l10n)
    }
}

/// `chat-<unix millis>-<6 random chars>`
pub fn new_session_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(6).collect();
    format!("chat-{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// One visitor's conversation. At most one message is in flight.
pub struct ChatSession<A> {
    api: A,
    session_id: String,
    lines: Vec<ChatLine>,
    sending: bool,
}

impl<A: ChatApi> ChatSession<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            session_id: new_session_id(),
            lines: Vec::new(),
            sending: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Record the visitor's message and build the request. Returns `None`
    /// for blank input or while a previous message is still in flight.
    pub fn begin_send(&mut self, input: &str) -> Option<ChatRequest> {
        let text = input.trim();
        if self.sending || text.is_empty() {
            return None;
        }
        self.sending = true;
        self.lines.push(ChatLine {
            role: ChatRole::User,
            text: Notice::Server(text.to_string()),
        });
        Some(ChatRequest {
            message: text.to_string(),
            session_id: self.session_id.clone(),
        })
    }

    pub fn finish_send(&mut self, result: Result<ChatResponse, ApiError>) {
        self.sending = false;
        let reply = match result {
            Ok(ChatResponse {
                reply: Some(reply),
                session_id,
                ..
            }) if !reply.is_empty() => {
                if let Some(id) = session_id.filter(|id| !id.is_empty()) {
                    self.session_id = id;
                }
                Notice::Server(reply)
            }
            Ok(ChatResponse { error: Some(err), .. }) => {
                warn!("Chat backend reported an error: {}", err);
                Notice::key("chat.error_generic")
            }
            Ok(_) => return,
            Err(err) => {
                error!("Chat error: {}", err);
                if err.is_cold_start() {
                    Notice::key("chat.error_waking")
                } else {
                    Notice::key("chat.error_connection")
                }
            }
        };
        self.lines.push(ChatLine {
            role: ChatRole::Assistant,
            text: reply,
        });
    }

    /// Send one message. Returns `false` when nothing was sent.
    pub async fn send(&mut self, input: &str) -> bool {
        let Some(request) = self.begin_send(input) else {
            return false;
        };
        let result = self.api.send_chat(&request).await;
        self.finish_send(result);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::BuiltinEnglish;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeChat {
        replies: Mutex<VecDeque<Result<ChatResponse, ApiError>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ChatApi for FakeChat {
        async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Decode("no reply scripted".to_string())))
        }
    }

    fn session(replies: Vec<Result<ChatResponse, ApiError>>) -> ChatSession<FakeChat> {
        let api = FakeChat::default();
        api.replies.lock().unwrap().extend(replies);
        ChatSession::new(api)
    }

    #[test]
    fn test_session_id_shape() {
        let id = new_session_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "chat");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 6);
    }

    #[tokio::test]
    async fn test_reply_adopts_server_session_id() {
        let mut chat = session(vec![Ok(ChatResponse {
            reply: Some("We have parking at Zurich Airport.".to_string()),
            session_id: Some("srv-42".to_string()),
            error: None,
        })]);
        let original = chat.session_id().to_string();

        assert!(chat.send("  Is there parking?  ").await);

        let requests = chat.api.requests.lock().unwrap();
        assert_eq!(requests[0].message, "Is there parking?");
        assert_eq!(requests[0].session_id, original);
        drop(requests);
        assert_eq!(chat.session_id(), "srv-42");
        assert_eq!(chat.lines().len(), 2);
        assert_eq!(chat.lines()[1].role, ChatRole::Assistant);
        assert_eq!(
            chat.lines()[1].render(&BuiltinEnglish),
            "We have parking at Zurich Airport."
        );
        assert!(!chat.is_sending());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut chat = session(vec![]);
        assert!(!chat.send("   ").await);
        assert!(chat.lines().is_empty());
        assert!(chat.api.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_no_concurrent_sends() {
        let mut chat = session(vec![]);
        assert!(chat.begin_send("first").is_some());
        assert!(chat.begin_send("second").is_none());
        assert_eq!(chat.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_error_body_maps_to_generic_message() {
        let mut chat = session(vec![Ok(ChatResponse {
            error: Some("model overloaded".to_string()),
            ..ChatResponse::default()
        })]);
        chat.send("hello").await;
        assert_eq!(
            chat.lines()[1].text,
            Notice::key("chat.error_generic")
        );
    }

    #[tokio::test]
    async fn test_http_error_maps_to_connection_message() {
        let mut chat = session(vec![Err(ApiError::Status {
            status: 500,
            message: "Server error (HTTP 500)".to_string(),
        })]);
        chat.send("hello").await;
        assert_eq!(
            chat.lines()[1].render(&BuiltinEnglish),
            "Connection error. Please try again in a moment."
        );
    }

    #[tokio::test]
    async fn test_empty_response_adds_nothing() {
        let mut chat = session(vec![Ok(ChatResponse::default())]);
        chat.send("hello").await;
        assert_eq!(chat.lines().len(), 1);
        assert!(!chat.is_sending());
    }
}
