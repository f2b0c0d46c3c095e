//! Message formatting utilities for client display.

use chrono::{DateTime, Utc};
use quadchat_server::infrastructure::dto::websocket::MessageDto;
use quadchat_shared::time::to_clock_label;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Banner shown once the session has joined its conversation
    pub fn format_joined(conversation_id: &str) -> String {
        let mut output = String::new();
        output.push_str("\n============================================================\n");
        output.push_str(&format!("Conversation: {}\n", conversation_id));
        output.push_str("Type messages and press Enter to send. Press Ctrl+C to exit.\n");
        output.push_str("============================================================\n");
        output
    }

    /// Format a message relayed from another member
    ///
    /// The sender's display name is preferred; the id is shown when they differ.
    pub fn format_received(message: &MessageDto) -> String {
        let time = to_clock_label(&message.created_at);
        let who = if message.sender.name == message.sender_id {
            message.sender_id.clone()
        } else {
            format!("{} ({})", message.sender.name, message.sender_id)
        };
        format!("\n[{}] {}: {}\n", time, who, message.text)
    }

    pub fn format_sent_confirmation(sent_at: &DateTime<Utc>) -> String {
        format!("sent at {}\n", to_clock_label(sent_at))
    }

    pub fn format_raw_message(text: &str) -> String {
        format!("\n{}\n", text)
    }

    pub fn format_binary_message(len: usize) -> String {
        format!("\nReceived binary data: {} bytes\n", len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quadchat_server::infrastructure::dto::websocket::SenderDto;

    fn message(sender_id: &str, sender_name: &str, text: &str) -> MessageDto {
        MessageDto {
            id: "m-1".to_string(),
            text: text.to_string(),
            sender_id: sender_id.to_string(),
            conversation_id: "c1".to_string(),
            created_at: Utc.timestamp_opt(1_711_962_000, 0).unwrap(),
            sender: SenderDto {
                id: sender_id.to_string(),
                name: sender_name.to_string(),
            },
        }
    }

    #[test]
    fn test_format_received_with_display_name() {
        // テスト項目: 表示名がある場合は「名前 (ID)」の形式で表示される
        // given (前提条件):
        let message = message("u1", "Alice", "hello");

        // when (操作):
        let result = MessageFormatter::format_received(&message);

        // then (期待する結果):
        assert_eq!(result, "\n[09:00:00] Alice (u1): hello\n");
    }

    #[test]
    fn test_format_received_without_display_name() {
        // テスト項目: 表示名が ID と同じ場合は ID のみ表示される
        // given (前提条件):
        let message = message("u2", "u2", "hi");

        // when (操作):
        let result = MessageFormatter::format_received(&message);

        // then (期待する結果):
        assert_eq!(result, "\n[09:00:00] u2: hi\n");
    }

    #[test]
    fn test_format_joined_mentions_conversation() {
        // テスト項目: 参加時のバナーに会話 ID が含まれる
        // given (前提条件):
        let conversation_id = "c1";

        // when (操作):
        let result = MessageFormatter::format_joined(conversation_id);

        // then (期待する結果):
        assert!(result.contains("Conversation: c1\n"));
    }

    #[test]
    fn test_format_sent_confirmation() {
        // テスト項目: 送信確認に時刻が表示される
        // given (前提条件):
        let sent_at = Utc.timestamp_opt(1_711_962_000, 0).unwrap();

        // when (操作):
        let result = MessageFormatter::format_sent_confirmation(&sent_at);

        // then (期待する結果):
        assert_eq!(result, "sent at 09:00:00\n");
    }

    #[test]
    fn test_format_binary_message() {
        // テスト項目: バイナリフレームはサイズのみ表示される
        // given (前提条件):
        let len = 42;

        // when (操作):
        let result = MessageFormatter::format_binary_message(len);

        // then (期待する結果):
        assert_eq!(result, "\nReceived binary data: 42 bytes\n");
    }
}
