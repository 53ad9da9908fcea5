mod chat;
mod config;
mod error;
mod math;
mod model;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use chat::store::FileStore;
use chat::{Conversation, history_key};
use error::ErrorCode;
use model::SizeClass;
use model::engine::LocalServerLoader;
use model::provision::{HttpFetcher, ModelProvisioner};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = match config::TutorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, error_code = e.error_code(), "configuration rejected");
            std::process::exit(2);
        }
    };

    let fetcher = HttpFetcher::new().expect("HTTP client init failed");
    let provisioner = ModelProvisioner::new(config.models_dir.clone(), Arc::new(fetcher));
    let loader = LocalServerLoader::new(&config.engine_url, config.engine_timeout);
    let sessions = Arc::new(tokio::sync::Mutex::new(model::SessionManager::new(provisioner, Arc::new(loader))));

    let artifact = sessions.lock().await.provisioner().inspect(config.model_size).await;
    tracing::info!(
        size = %artifact.size_class,
        path = %artifact.local_path.display(),
        cached = artifact.exists,
        "model artifact status"
    );

    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let convo = Conversation::open(store, history_key(&config.profile), sessions.clone(), config.conversation_settings())
        .await
        .expect("history store unreadable");

    let mut updates = convo.subscribe();

    tracing::info!(
        profile = %config.profile,
        restored = convo.history().len(),
        model = %config.model_size,
        engine = %config.engine_url,
        "tutor ready"
    );

    let mut out = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let _ = out.write_all(b"Ask me anything. Commands: /model small|large, /clear, /quit\n> ").await;
    let _ = out.flush().await;

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        let reply = match line.split_once(' ').map_or((line, ""), |(cmd, arg)| (cmd, arg.trim())) {
            ("/quit", _) => break,
            ("/clear", _) => {
                convo.clear_history().await;
                "History cleared.".to_string()
            }
            ("/model", arg) => match arg.parse::<SizeClass>() {
                Ok(size) => {
                    convo.set_model_choice(size);
                    format!("Using the {} model.", convo.model_choice())
                }
                Err(e) => e,
            },
            _ => {
                if convo.on_user_submit(line).await {
                    updates.borrow_and_update().last().map(|m| m.content.clone()).unwrap_or_default()
                } else {
                    String::new()
                }
            }
        };
        if !reply.is_empty() {
            let _ = out.write_all(format!("{reply}\n").as_bytes()).await;
        }
        let _ = out.write_all(b"> ").await;
        let _ = out.flush().await;
    }

    let mut manager = sessions.lock().await;
    tracing::info!(loaded = ?manager.loaded(), "shutting down");
    manager.release();
}
