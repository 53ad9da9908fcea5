use super::*;

#[test]
fn fresh_messages_get_unique_ids() {
    let a = Message::user("hi");
    let b = Message::user("hi");
    assert_ne!(a.id, b.id);
    assert!(!a.is_placeholder());
}

#[test]
fn placeholder_uses_sentinel() {
    let p = Message::placeholder();
    assert!(p.is_placeholder());
    assert_eq!(p.role, Role::Assistant);
    assert_eq!(p.content, PLACEHOLDER_CONTENT);
}

#[test]
fn role_serializes_lowercase() {
    let json = serde_json::to_value(Message { id: "1".into(), role: Role::Assistant, content: "ok".into() }).unwrap();
    assert_eq!(json, serde_json::json!({ "id": "1", "role": "assistant", "content": "ok" }));
}

#[test]
fn to_prompt_keeps_role_and_content() {
    let prompt = Message::user("what is 2+2?").to_prompt();
    assert_eq!(prompt, PromptMessage::new("user", "what is 2+2?"));
}

#[test]
fn prune_keeps_most_recent() {
    let mut messages: Vec<Message> = (0..HISTORY_LIMIT + 5).map(|i| Message::user(i.to_string())).collect();
    prune(&mut messages);
    assert_eq!(messages.len(), HISTORY_LIMIT);
    assert_eq!(messages[0].content, "5");
    assert_eq!(messages.last().unwrap().content, (HISTORY_LIMIT + 4).to_string());
}

#[test]
fn prune_leaves_short_history_alone() {
    let mut messages = vec![Message::user("a"), Message::assistant("b")];
    prune(&mut messages);
    assert_eq!(messages.len(), 2);
}
