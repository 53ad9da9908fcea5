use super::*;
use crate::model::test_helpers::{FakeFetcher, MockLoader, OfflineFetcher, manager_with};
use crate::model::types::ProvisionError;
use std::sync::atomic::Ordering;

// =========================================================================
// get_session
// =========================================================================

#[tokio::test]
async fn same_size_class_reuses_handle() {
    let (mut manager, stats, dir) = manager_with(MockLoader::replying("hi"), Arc::new(FakeFetcher::default()));

    let first = manager.get_session(SizeClass::Small).await.unwrap().generation();
    let second = manager.get_session(SizeClass::Small).await.unwrap().generation();

    assert_eq!(first, second);
    assert_eq!(stats.loads.load(Ordering::SeqCst), 1);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn different_size_class_reinitializes() {
    let (mut manager, stats, dir) = manager_with(MockLoader::replying("hi"), Arc::new(FakeFetcher::default()));

    let small = manager.get_session(SizeClass::Small).await.unwrap().generation();
    let large = manager.get_session(SizeClass::Large).await.unwrap();

    assert_ne!(small, large.generation());
    assert_eq!(large.size_class(), SizeClass::Large);
    assert_eq!(stats.loads.load(Ordering::SeqCst), 2);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn swap_never_keeps_two_engines_resident() {
    let (mut manager, stats, dir) = manager_with(MockLoader::replying("hi"), Arc::new(FakeFetcher::default()));

    manager.get_session(SizeClass::Small).await.unwrap();
    manager.get_session(SizeClass::Large).await.unwrap();
    manager.get_session(SizeClass::Small).await.unwrap();

    assert_eq!(stats.max_live.load(Ordering::SeqCst), 1);
    assert_eq!(stats.live.load(Ordering::SeqCst), 1);
    assert_eq!(manager.loaded(), Some(SizeClass::Small));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn release_drops_engine() {
    let (mut manager, stats, dir) = manager_with(MockLoader::replying("hi"), Arc::new(FakeFetcher::default()));

    manager.get_session(SizeClass::Small).await.unwrap();
    manager.release();

    assert_eq!(stats.live.load(Ordering::SeqCst), 0);
    assert_eq!(manager.loaded(), None);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn provisioning_failure_propagates() {
    let (mut manager, stats, dir) = manager_with(MockLoader::replying("hi"), Arc::new(OfflineFetcher));

    let err = manager.get_session(SizeClass::Small).await.err().unwrap();

    assert!(matches!(err, ReplyError::Provision(ProvisionError::Download(_))));
    assert_eq!(stats.loads.load(Ordering::SeqCst), 0);
    assert_eq!(manager.loaded(), None);

    let _ = std::fs::remove_dir_all(dir);
}

// =========================================================================
// completion
// =========================================================================

#[tokio::test]
async fn completion_prepends_system_prompt_and_limits() {
    let (mut manager, stats, dir) = manager_with(MockLoader::replying("  Great question!  "), Arc::new(FakeFetcher::default()));
    let session = manager.get_session(SizeClass::Small).await.unwrap();

    let reply = completion(session, &[PromptMessage::new("user", "What is a noun?")], CompletionParams::default())
        .await
        .unwrap();

    assert_eq!(reply, "Great question!");
    let requests = stats.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.messages[0].role, "system");
    assert!(request.messages[0].content.contains("K-12 tutor"));
    assert_eq!(request.messages[1], PromptMessage::new("user", "What is a noun?"));
    assert_eq!(request.max_tokens, 200);
    assert!((request.temperature - 0.5).abs() < f32::EPSILON);
    assert_eq!(request.stop.len(), 5);
    drop(requests);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn completion_honors_temperature_override() {
    let (mut manager, stats, dir) = manager_with(MockLoader::replying("ok"), Arc::new(FakeFetcher::default()));
    let session = manager.get_session(SizeClass::Small).await.unwrap();

    completion(session, &[], CompletionParams { temperature: 0.9 }).await.unwrap();

    assert!((stats.requests.lock().unwrap()[0].temperature - 0.9).abs() < f32::EPSILON);

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn completion_engine_error_propagates() {
    let (mut manager, _stats, dir) = manager_with(MockLoader::failing(), Arc::new(FakeFetcher::default()));
    let session = manager.get_session(SizeClass::Small).await.unwrap();

    let err = completion(session, &[], CompletionParams::default()).await.unwrap_err();

    assert!(matches!(err, InferenceError::Request(_)));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn completion_blank_reply_is_error() {
    let (mut manager, _stats, dir) = manager_with(MockLoader::replying("   \n"), Arc::new(FakeFetcher::default()));
    let session = manager.get_session(SizeClass::Small).await.unwrap();

    let err = completion(session, &[], CompletionParams::default()).await.unwrap_err();

    assert!(matches!(err, InferenceError::EmptyCompletion));

    let _ = std::fs::remove_dir_all(dir);
}
