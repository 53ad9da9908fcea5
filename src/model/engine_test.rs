use super::*;
use crate::model::artifact::SizeClass;
use crate::model::test_helpers::temp_dir;

// =============================================================================
// parse_chat_completion
// =============================================================================

#[test]
fn parse_text_response() {
    let json = serde_json::json!({
        "model": "local",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "A noun names a thing." },
            "finish_reason": "stop"
        }]
    })
    .to_string();
    assert_eq!(parse_chat_completion(&json).unwrap(), "A noun names a thing.");
}

#[test]
fn parse_null_content_is_empty_text() {
    let json = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": null } }]
    })
    .to_string();
    assert_eq!(parse_chat_completion(&json).unwrap(), "");
}

#[test]
fn parse_missing_choices() {
    let json = serde_json::json!({ "choices": [] }).to_string();
    assert!(matches!(parse_chat_completion(&json), Err(InferenceError::Parse(_))));
}

#[test]
fn parse_invalid_json() {
    assert!(matches!(parse_chat_completion("not json"), Err(InferenceError::Parse(_))));
}

// =============================================================================
// wire format
// =============================================================================

#[test]
fn chat_request_serializes_all_fields() {
    let messages = vec![PromptMessage::new("system", "be kind"), PromptMessage::new("user", "hi")];
    let stop = vec!["<|im_end|>".to_string()];
    let body = ChatRequest { model: "/m/a.gguf", messages: &messages, max_tokens: 200, temperature: 0.5, stop: &stop };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["model"], "/m/a.gguf");
    assert_eq!(json["messages"][1]["content"], "hi");
    assert_eq!(json["max_tokens"], 200);
    assert_eq!(json["stop"][0], "<|im_end|>");
}

// =============================================================================
// LocalServerLoader
// =============================================================================

#[test]
fn loader_trims_trailing_slash() {
    let loader = LocalServerLoader::new("http://127.0.0.1:8080/v1/", Duration::from_secs(5));
    assert_eq!(loader.base_url, "http://127.0.0.1:8080/v1");
}

#[tokio::test]
async fn loader_rejects_missing_artifact() {
    let dir = temp_dir("engine");
    let model = LocalModel {
        size_class: SizeClass::Small,
        path: dir.join("absent.gguf"),
        uri: "file:///absent.gguf".into(),
    };
    let loader = LocalServerLoader::new("http://127.0.0.1:1/v1", Duration::from_secs(1));
    let err = loader.load(&model).await.err().unwrap();
    assert!(matches!(err, InferenceError::ModelLoad(_)));
}

#[tokio::test]
async fn loader_builds_engine_for_present_artifact() {
    let dir = temp_dir("engine");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("present.gguf");
    std::fs::write(&path, b"GGUF").unwrap();
    let model = LocalModel { size_class: SizeClass::Small, path: path.clone(), uri: "file:///present.gguf".into() };

    let loader = LocalServerLoader::new("http://127.0.0.1:1/v1", Duration::from_secs(1));
    assert!(loader.load(&model).await.is_ok());

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn engine_unreachable_server_is_request_error() {
    let engine = LocalServerEngine {
        http: reqwest::Client::new(),
        base_url: "http://127.0.0.1:1/v1".into(),
        model_id: "m".into(),
    };
    let request = CompletionRequest { messages: vec![], max_tokens: 8, temperature: 0.5, stop: vec![] };
    let err = engine.complete(&request).await.unwrap_err();
    assert!(matches!(err, InferenceError::Request(_)));
}
