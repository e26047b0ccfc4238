use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wikigraph::http::HttpServer;
use wikigraph::session::status_of;
use wikigraph::source::{StaticSource, WikipediaSource};
use wikigraph::{ArticleSource, Config, GraphSession, LayoutKind, SessionSettings};

#[derive(Parser, Debug)]
#[command(name = "wikigraph", version)]
#[command(about = "Crawl the links of an encyclopedia article into a drawable graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a topic and print the graph
    Crawl {
        /// Seed article title
        topic: String,
        /// Link levels to follow (default from config)
        #[arg(long)]
        depth: Option<usize>,
        /// Layout algorithm (default from config)
        #[arg(long)]
        layout: Option<String>,
        /// Read articles from a JSON fixture instead of the live service
        #[arg(long)]
        fixture: Option<PathBuf>,
        /// Print the render series as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the layout algorithms
    Layouts,
    /// Serve the JSON API
    Serve {
        /// Port to listen on (default from config)
        #[arg(long)]
        port: Option<u16>,
        /// Read articles from a JSON fixture instead of the live service
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
}

/// Live encyclopedia client, or a fixture when one is given
fn build_source(config: &Config, fixture: Option<&Path>) -> Result<Arc<dyn ArticleSource>> {
    match fixture {
        Some(path) => {
            log::info!("Using article fixture {}", path.display());
            Ok(Arc::new(StaticSource::from_json_file(path)?))
        }
        None => {
            log::info!("Using article service {}", config.source.api_url);
            Ok(Arc::new(WikipediaSource::new(&config.source)?))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.wikigraph.log_level.as_str()),
    )
    .init();

    match cli.command {
        Command::Crawl {
            topic,
            depth,
            layout,
            fixture,
            json,
        } => run_crawl(&config, &topic, depth, layout.as_deref(), fixture.as_deref(), json).await?,
        Command::Layouts => {
            for kind in LayoutKind::ALL {
                println!("{:<14} {}", kind.as_str(), kind.label());
            }
        }
        Command::Serve { port, fixture } => {
            let source = build_source(&config, fixture.as_deref())?;
            let server = HttpServer::new(source, &config)?;
            server.run(port.unwrap_or(config.http_server.port)).await?;
        }
    }

    Ok(())
}

async fn run_crawl(
    config: &Config,
    topic: &str,
    depth: Option<usize>,
    layout: Option<&str>,
    fixture: Option<&Path>,
    json: bool,
) -> Result<()> {
    let layout = match layout {
        Some(name) => name.parse()?,
        None => config.default_layout()?,
    };
    let depth = depth.unwrap_or(config.crawl.default_depth);
    let source = build_source(config, fixture)?;
    let settings = SessionSettings::from_config(config);

    let result = GraphSession::build(source.as_ref(), &settings, topic, depth, layout).await;
    if let Some(status) = status_of(&result) {
        if !json {
            println!("{}", status);
        }
    }
    let session = match result {
        Ok(session) => session,
        Err(wikigraph::WikigraphError::SeedNotFound(_)) => {
            if json {
                println!("{}", serde_json::json!({ "status": "Topic does not exist." }));
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        let body = serde_json::json!({
            "summary": session.summary(),
            "render": session.render()?,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let graph = session.graph();
    println!(
        "Layout: {} | {} articles, {} links, {} skipped",
        session.layout(),
        graph.node_count(),
        graph.edge_count(),
        graph.skipped().len()
    );
    println!();
    for node in graph.nodes() {
        let pos = graph.position(&node.title).unwrap_or(wikigraph::graph::Position::new(0.0, 0.0));
        println!(
            "  [{}] {:<40} ({:>6.3}, {:>6.3})  {} neighbours",
            node.depth,
            node.title,
            pos.x,
            pos.y,
            graph.neighbors(&node.title).len()
        );
    }
    if !graph.skipped().is_empty() {
        println!();
        println!("Skipped:");
        for skipped in graph.skipped() {
            println!("  [{}] {} ({})", skipped.depth, skipped.title, skipped.reason);
        }
    }

    Ok(())
}
