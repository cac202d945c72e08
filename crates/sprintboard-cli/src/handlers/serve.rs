use anyhow::Context;
use sprintboard_api::AppState;
use sprintboard_core::AppConfig;
use tokio::net::TcpListener;

use crate::cli::{Backend, ServeArgs};
use crate::store;

pub async fn handle(mut config: AppConfig, backend: Backend, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind = Some(bind);
    }
    if let Some(public_url) = args.public_url {
        config.public_url = Some(public_url);
    }

    let data_file = config.effective_data_file();
    let store = store::open(backend, &data_file).await?;
    let bind = config.effective_bind().to_string();
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    tracing::info!(file = %data_file.display(), ?backend, "Serving board data");
    sprintboard_api::serve(listener, AppState::new(store, config)).await?;
    Ok(())
}
