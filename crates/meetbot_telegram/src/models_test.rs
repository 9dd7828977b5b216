#[cfg(test)]
mod tests {
    use crate::models::{ApiResponse, Update};

    fn parse(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_message_maps_to_inbound() {
        let update = parse(
            r#"{
                "update_id": 10,
                "message": {
                    "message_id": 5,
                    "date": 1746428400,
                    "from": {"id": 1001, "is_bot": false, "first_name": "Ann", "language_code": "en"},
                    "chat": {"id": -100500, "type": "supergroup", "title": "Team"},
                    "text": "Meeting tomorrow?"
                }
            }"#,
        );

        let inbound = update.into_inbound().unwrap();

        assert_eq!(inbound.chat_id, -100500);
        assert_eq!(inbound.message_id, 5);
        assert_eq!(inbound.sender.id, 1001);
        assert_eq!(inbound.sender.first_name.as_deref(), Some("Ann"));
        assert!(!inbound.sender.is_bot);
        assert_eq!(inbound.text.as_deref(), Some("Meeting tomorrow?"));
    }

    #[test]
    fn test_message_without_text_is_kept() {
        let update = parse(
            r#"{
                "update_id": 11,
                "message": {
                    "message_id": 6,
                    "from": {"id": 1001, "is_bot": false, "first_name": "Ann"},
                    "chat": {"id": 1001, "type": "private"},
                    "sticker": {"file_id": "x"}
                }
            }"#,
        );

        let inbound = update.into_inbound().unwrap();
        assert!(inbound.text.is_none());
    }

    #[test]
    fn test_channel_posts_and_other_updates_are_skipped() {
        let no_author = parse(
            r#"{
                "update_id": 12,
                "message": {"message_id": 7, "chat": {"id": -1, "type": "channel"}, "text": "meeting"}
            }"#,
        );
        assert!(no_author.into_inbound().is_none());

        let callback = parse(r#"{"update_id": 13, "callback_query": {"id": "q"}}"#);
        assert!(callback.into_inbound().is_none());
    }

    #[test]
    fn test_bot_sender_flag_is_carried() {
        let update = parse(
            r#"{
                "update_id": 14,
                "message": {
                    "message_id": 8,
                    "from": {"id": 9, "is_bot": true, "first_name": "OtherBot"},
                    "chat": {"id": -100500, "type": "group"},
                    "text": "meeting"
                }
            }"#,
        );
        assert!(update.into_inbound().unwrap().sender.is_bot);
    }

    #[test]
    fn test_error_envelope() {
        let response: ApiResponse<bool> = serde_json::from_str(
            r#"{"ok": false, "error_code": 409, "description": "Conflict: can't use getUpdates method while webhook is active"}"#,
        )
        .unwrap();

        assert!(!response.ok);
        assert_eq!(response.error_code, Some(409));
        assert!(response.result.is_none());
    }
}
