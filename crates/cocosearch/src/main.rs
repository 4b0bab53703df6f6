//! CocoSearch CLI — thin argument-parsing shell over the core indexing and
//! search pipelines. Consumes the core's typed `run_index`/`search` calls
//! rather than re-implementing any of their logic: `clap::Parser` +
//! `Subcommand`, one `fn main` dispatching into core calls, a `--json` flag
//! threaded through every read command.

mod config;
mod output;

use clap::{Parser, Subcommand};
use cocosearch_application::{
    management, pipeline::PipelineConfig, IndexManager, IndexPipeline, MokaQueryCache, SearchEngine,
};
use cocosearch_domain::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS, SEMANTIC_CACHE_THRESHOLD};
use cocosearch_domain::entities::IndexName;
use cocosearch_domain::ports::EmbeddingProvider as _;
use cocosearch_domain::ports::QueryCache as _;
use cocosearch_domain::value_objects::Query;
use cocosearch_language_support::{StaticHandlerRegistry, TreeSitterParseTracker, TreeSitterSymbolExtractor};
use cocosearch_providers::{HttpEmbeddingProvider, PostgresStorage};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use config::{ConfigFile, EnvConfig};

#[derive(Parser)]
#[command(name = "cocosearch", version, about = "Local-first hybrid code search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a source tree.
    Index {
        path: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "include")]
        include: Vec<String>,
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        #[arg(long)]
        chunk_size: Option<usize>,
        #[arg(long)]
        chunk_overlap: Option<usize>,
        #[arg(long = "no-gitignore")]
        no_gitignore: bool,
    },
    /// Run a hybrid or vector-only search.
    Search {
        query: String,
        #[arg(long)]
        index: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long = "lang")]
        lang: Vec<String>,
        #[arg(long)]
        hybrid: Option<bool>,
        #[arg(long = "symbol-type")]
        symbol_type: Vec<String>,
        #[arg(long = "symbol-name")]
        symbol_name: Option<String>,
        #[arg(short = 'A', long, default_value_t = 0)]
        after: usize,
        #[arg(short = 'B', long, default_value_t = 0)]
        before: usize,
        #[arg(long = "no-smart")]
        no_smart: bool,
        #[arg(long = "no-cache")]
        no_cache: bool,
        #[arg(long = "min-score", default_value_t = 0.0)]
        min_score: f32,
        #[arg(long)]
        pretty: bool,
        #[arg(long)]
        json: bool,
    },
    /// Report per-language and parse-health statistics.
    Stats {
        index: Option<String>,
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
        #[arg(long = "show-failures")]
        show_failures: bool,
    },
    /// List every discovered index.
    List,
    /// Drop an index's chunk table, parse-results table, and cache entries.
    Clear {
        index: String,
        #[arg(long)]
        force: bool,
    },
    /// Describe the registered language handlers.
    Languages {
        #[arg(long)]
        json: bool,
    },
    /// Describe the registered grammar handlers.
    Grammars {
        #[arg(long)]
        json: bool,
    },
    /// Run a search and explain how it was classified.
    Analyze {
        query: String,
        #[arg(long)]
        index: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

struct Collaborators {
    storage: Arc<PostgresStorage>,
    embeddings: Arc<HttpEmbeddingProvider>,
    cache: Arc<MokaQueryCache>,
    handlers: Arc<StaticHandlerRegistry>,
}

async fn wire_collaborators(env: &EnvConfig) -> cocosearch_domain::error::Result<Collaborators> {
    use cocosearch_domain::error::CocoError;

    let database_url = env
        .database_url
        .clone()
        .ok_or_else(|| CocoError::infrastructure("COCOSEARCH_DATABASE_URL is not set"))?;
    let storage = Arc::new(PostgresStorage::connect(&database_url).await?);

    let ollama_url = env.ollama_url.clone().unwrap_or_else(|| cocosearch_providers::embedding::DEFAULT_ENDPOINT.to_string());
    let embeddings = Arc::new(HttpEmbeddingProvider::new(ollama_url, "nomic-embed-text")?);
    embeddings.prewarm().await.ok();

    let cache = Arc::new(MokaQueryCache::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS, SEMANTIC_CACHE_THRESHOLD));
    let handlers = Arc::new(StaticHandlerRegistry::new()?);

    Ok(Collaborators { storage, embeddings, cache, handlers })
}

fn resolve_project_root(env: &EnvConfig, explicit: Option<&PathBuf>) -> PathBuf {
    explicit
        .cloned()
        .or_else(|| env.project.clone())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn resolve_index_name(
    env: &EnvConfig,
    config: &ConfigFile,
    explicit: Option<String>,
    project_root: &std::path::Path,
) -> cocosearch_domain::error::Result<IndexName> {
    if let Some(name) = explicit {
        return IndexName::parse(name);
    }
    if let Some(name) = &env.index_name {
        return IndexName::parse(name.clone());
    }
    if let Some(name) = &config.index_name {
        return IndexName::parse(name.clone());
    }
    management::default_index_name(project_root)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("cocosearch=info".parse().unwrap()))
        .with_target(false)
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            match err {
                cocosearch_domain::error::CocoError::IndexNotFound { .. } => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(cli: Cli) -> cocosearch_domain::error::Result<ExitCode> {
    let env = EnvConfig::from_env();

    match cli.command {
        Commands::Index { path, name, include, exclude, chunk_size, chunk_overlap, no_gitignore } => {
            let project_root = resolve_project_root(&env, Some(&path));
            let config = ConfigFile::load(&project_root);
            let index_name = resolve_index_name(&env, &config, name, &project_root)?;

            let collaborators = wire_collaborators(&env).await?;
            let symbol_extractor = Arc::new(TreeSitterSymbolExtractor::new());
            let parse_classifier = Arc::new(TreeSitterParseTracker::new());
            let pipeline = Arc::new(IndexPipeline::new(
                collaborators.storage.clone(),
                collaborators.embeddings.clone(),
                collaborators.handlers.clone(),
                symbol_extractor,
                parse_classifier,
                collaborators.cache.clone(),
            ));

            let pipeline_config = PipelineConfig {
                include: if include.is_empty() { config.indexing.include_patterns.clone() } else { include },
                exclude: if exclude.is_empty() { config.indexing.exclude_patterns.clone() } else { exclude },
                respect_gitignore: !no_gitignore,
                chunk_size: chunk_size.or(config.indexing.chunk_size).unwrap_or(1500),
                chunk_overlap: chunk_overlap.or(config.indexing.chunk_overlap).unwrap_or(200),
                ..PipelineConfig::default()
            };

            let summary = pipeline.run_index(&path, &index_name, &pipeline_config).await?;
            println!(
                "indexed {}: {} files, +{} ~{} -{} chunks in {}ms",
                index_name,
                summary.files_indexed,
                summary.chunks_inserted,
                summary.chunks_updated,
                summary.chunks_deleted,
                summary.elapsed_ms
            );
            Ok(ExitCode::SUCCESS)
        }

        Commands::Search {
            query,
            index,
            limit,
            lang,
            hybrid,
            symbol_type,
            symbol_name,
            after,
            before,
            no_smart,
            no_cache,
            min_score,
            pretty: _pretty,
            json,
        } => {
            let project_root = resolve_project_root(&env, None);
            let config = ConfigFile::load(&project_root);
            let index_name = resolve_index_name(&env, &config, index, &project_root)?;

            let collaborators = wire_collaborators(&env).await?;
            let engine = SearchEngine::new(
                collaborators.storage.clone(),
                collaborators.embeddings.clone(),
                collaborators.cache.clone(),
                project_root,
            );

            let mut q = Query::new(query, index_name, limit)?.with_min_score(min_score).with_no_cache(no_cache);
            if !lang.is_empty() {
                q = q.with_language_filter(lang);
            }
            if !symbol_type.is_empty() {
                q = q.with_symbol_type(symbol_type);
            }
            if let Some(glob) = symbol_name {
                q = q.with_symbol_name(glob);
            }
            if let Some(use_hybrid) = hybrid {
                q = q.with_use_hybrid(use_hybrid);
            }
            if no_smart || before > 0 || after > 0 {
                q = q.with_explicit_context(before, after);
            }

            let results = engine.search(&q).await?;
            output::print_search_results(&results, json);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Stats { index, all, json, show_failures } => {
            let project_root = resolve_project_root(&env, None);
            let config = ConfigFile::load(&project_root);
            let collaborators = wire_collaborators(&env).await?;
            let manager = IndexManager::new(collaborators.storage.clone());

            let names = if all || index.is_none() {
                manager.list_indexes().await?
            } else {
                vec![resolve_index_name(&env, &config, index, &project_root)?]
            };

            for name in names {
                let stats = manager.index_stats(&name).await?;
                output::print_index_stats(name.as_str(), &stats, show_failures, json);
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::List => {
            let collaborators = wire_collaborators(&EnvConfig::from_env()).await?;
            let manager = IndexManager::new(collaborators.storage.clone());
            for name in manager.list_indexes().await? {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Clear { index, force } => {
            if !force {
                eprint!("drop index '{index}'? pass --force to confirm: ");
                return Ok(ExitCode::FAILURE);
            }
            let index_name = IndexName::parse(index)?;
            let collaborators = wire_collaborators(&EnvConfig::from_env()).await?;
            let manager = IndexManager::new(collaborators.storage.clone());
            manager.clear_index(&index_name).await?;
            collaborators.cache.invalidate_index(index_name.as_str()).await?;
            println!("cleared {index_name}");
            Ok(ExitCode::SUCCESS)
        }

        Commands::Languages { json } => {
            let handlers = StaticHandlerRegistry::new()?;
            let specs = cocosearch_domain::ports::HandlerRegistry::all_custom_language_specs(&handlers);
            if json {
                let value: Vec<_> = specs.iter().map(|s| serde_json::json!({"language": s.language})).collect();
                println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            } else {
                for spec in specs {
                    println!("{}", spec.language);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Grammars { json } => {
            if json {
                println!("{}", serde_json::json!(["github_actions"]));
            } else {
                println!("github_actions");
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Analyze { query, index, json } => {
            let project_root = resolve_project_root(&env, None);
            let config = ConfigFile::load(&project_root);
            let index_name = resolve_index_name(&env, &config, index, &project_root)?;
            let class = cocosearch_application::query_analyzer::classify(&query);
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "index": index_name.as_str(),
                        "class": format!("{class:?}"),
                        "default_use_hybrid": class.default_use_hybrid(),
                    })
                );
            } else {
                println!("class={class:?} default_use_hybrid={}", class.default_use_hybrid());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
