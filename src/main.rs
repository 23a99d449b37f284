use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use sage::agents::{
    Assistant, LlmAnswerComposer, LlmChunkExtractor, LlmFilterSynthesizer, SourceDocument,
};
use sage::cli::output::Output;
use sage::cli::{Cli, CollectionCommands, Commands};
use sage::llm::{LLMClient, Provider};
use sage::rag::embeddings::Embedder;
use sage::rag::{Ingestor, Retriever};
use sage::store::{VectorStore, VectorStoreProvider};
use sage::types::{AppError, Result};
use sage::utils::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let default_filter = if cli.verbose { "sage=debug" } else { "sage=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config = Config::from_env()?;
    let collection = cli
        .collection
        .unwrap_or_else(|| config.store.collection.clone());

    let embedder = build_embedder(&config)?;
    let store: Arc<dyn VectorStore> =
        Arc::from(VectorStoreProvider::from_env().create_store(embedder).await?);

    match cli.command {
        Commands::Ingest { files, dump_chunks } => {
            let client = build_llm(&config).await?;
            ingest(&collection, files, dump_chunks, client, store, output).await
        }
        Commands::Ask { question, top_k } => {
            let client = build_llm(&config).await?;
            let assistant = build_assistant(
                client,
                store,
                collection,
                top_k.unwrap_or(config.retrieval.top_k),
                config.retrieval.over_fetch_factor,
            );
            let reply = assistant.answer(&question).await?;
            if let Some(filter) = &reply.applied_filter {
                output.kv("filter", &filter.to_string());
            }
            if reply.context_count == 0 {
                output.warning("no policy excerpts matched; the answer is not grounded");
            }
            output.answer(&reply.answer);
            Ok(())
        }
        Commands::Chat { top_k } => {
            let client = build_llm(&config).await?;
            let assistant = build_assistant(
                client,
                store,
                collection,
                top_k.unwrap_or(config.retrieval.top_k),
                config.retrieval.over_fetch_factor,
            );
            chat(&assistant, output).await
        }
        Commands::Collection(command) => collection_command(command, store, output).await,
    }
}

fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    #[cfg(feature = "openai")]
    {
        use sage::rag::embeddings::OpenAIEmbedder;

        let api_key = config.llm.openai_api_key.clone().ok_or_else(|| {
            AppError::Configuration("OPENAI_API_KEY is required for embeddings".to_string())
        })?;
        Ok(Arc::new(OpenAIEmbedder::new(
            api_key,
            config.llm.openai_api_base.clone(),
            config.llm.embedding_model.clone(),
        )))
    }

    #[cfg(not(feature = "openai"))]
    {
        let _ = config;
        Err(AppError::Configuration(
            "no embedding provider compiled in; enable the openai feature".to_string(),
        ))
    }
}

async fn build_llm(config: &Config) -> Result<Arc<dyn LLMClient>> {
    let provider = Provider::from_config(&config.llm)?;
    tracing::debug!(provider = provider.name(), model = provider.model(), "LLM provider selected");
    Ok(Arc::from(provider.create_client().await?))
}

fn build_assistant(
    client: Arc<dyn LLMClient>,
    store: Arc<dyn VectorStore>,
    collection: String,
    top_k: usize,
    over_fetch_factor: usize,
) -> Assistant {
    let synthesizer = Arc::new(LlmFilterSynthesizer::new(client.clone()));
    let composer = Arc::new(LlmAnswerComposer::new(client));
    let retriever =
        Retriever::new(synthesizer, store).with_over_fetch_factor(over_fetch_factor);
    Assistant::new(retriever, composer, collection, top_k)
}

async fn ingest(
    collection: &str,
    files: Vec<PathBuf>,
    dump_chunks: Option<PathBuf>,
    client: Arc<dyn LLMClient>,
    store: Arc<dyn VectorStore>,
    output: &Output,
) -> Result<()> {
    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let text = std::fs::read_to_string(path)?;
        output.info(&format!("loaded {} ({} bytes)", name, text.len()));
        documents.push(SourceDocument { name, text });
    }

    let extractor = Arc::new(LlmChunkExtractor::new(client));
    let ingestor = Ingestor::new(extractor, store);
    let report = ingestor
        .ingest(collection, &documents, dump_chunks.as_deref())
        .await?;

    if let Some(path) = &dump_chunks {
        output.info(&format!("chunk JSON written to {}", path.display()));
    }
    output.success(&format!(
        "stored {} chunks in '{}'",
        report.chunk_count, collection
    ));
    Ok(())
}

async fn chat(assistant: &Assistant, output: &Output) -> Result<()> {
    output.banner();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        output.prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") {
            break;
        }

        match assistant.answer(question).await {
            Ok(reply) => {
                if reply.context_count == 0 {
                    output.warning("no policy excerpts matched; the answer is not grounded");
                }
                output.answer(&reply.answer);
            }
            Err(e) => output.error(&e.to_string()),
        }
    }

    Ok(())
}

async fn collection_command(
    command: CollectionCommands,
    store: Arc<dyn VectorStore>,
    output: &Output,
) -> Result<()> {
    match command {
        CollectionCommands::Create { name } => {
            store.create_collection(&name).await?;
            output.success(&format!("created collection '{}'", name));
        }
        CollectionCommands::Delete { name, force } => {
            if !force && !output.confirm(&format!("delete collection '{}'?", name)) {
                output.info("aborted");
                return Ok(());
            }
            store.delete_collection(&name).await?;
            output.success(&format!("deleted collection '{}'", name));
        }
        CollectionCommands::List => {
            let names = store.list_collections().await?;
            if names.is_empty() {
                output.info("no collections");
            } else {
                output.header("Collections");
                for name in names {
                    output.list_item(&name);
                }
            }
        }
    }
    Ok(())
}
