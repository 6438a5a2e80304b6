//! Process entry point: explicit construct → serve turns → shut down.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::FmtSubscriber;

use resume_agent::agent::RagAgent;
use resume_agent::config::Settings;
use resume_agent::embeddings::OpenAiEmbeddingProvider;
use resume_agent::index::{IndexOptions, VectorIndex};
use resume_agent::ingestion::{TextSplitter, chunk_pages, load_document};
use resume_agent::llm::OpenAiChatModel;
use resume_agent::repl;
use resume_agent::tools::{RetrieverTool, ToolRegistry};
use resume_agent::types::RagError;

#[tokio::main]
async fn main() -> Result<(), RagError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let settings = Settings::from_env()?;
    info!(
        document = %settings.document_path.display(),
        index = %settings.index_path.display(),
        "starting resume agent"
    );

    // Ingest: load pages, split into overlapping chunks.
    let pages = load_document(&settings.document_path).await?;
    let splitter = TextSplitter::new(settings.chunk_size, settings.chunk_overlap);
    let chunks = chunk_pages(&pages, &splitter, &settings.collection);

    // Index: reuse the persisted store when the document is unchanged.
    let http = reqwest::Client::new();
    let embedder = Arc::new(OpenAiEmbeddingProvider::new(
        http.clone(),
        settings.api_base.clone(),
        settings.api_key.clone(),
        settings.embedding_model.clone(),
        settings.embedding_dims,
    ));
    let index_options = IndexOptions {
        index_path: settings.index_path.clone(),
        fingerprint_path: settings.fingerprint_path(),
        force_recreate: settings.force_recreate,
    };
    let index = Arc::new(VectorIndex::open_or_build(&index_options, &chunks, embedder).await?);
    info!(chunks = index.chunk_count().await?, "vector index ready");

    // Agent: chat model + retrieval tool behind the registry.
    let model = OpenAiChatModel::new(
        http,
        settings.api_base.clone(),
        settings.api_key.clone(),
        settings.completion_model.clone(),
    );
    let tools = ToolRegistry::new().with_tool(Arc::new(RetrieverTool::new(
        index,
        settings.top_k,
    )));
    let mut agent = RagAgent::new(model, tools);
    if let Some(prompt) = &settings.system_prompt {
        agent = agent.with_system_prompt(prompt.clone());
    }

    repl::run(&agent).await
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
