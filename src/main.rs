use anyhow::Result;
use clap::{Parser, Subcommand};
use piigraph::fetch::HttpFetcher;
use piigraph::render::TextRenderer;
use piigraph::repl::{Command, HELP};
use piigraph::server::RelationServer;
use piigraph::session::{
    ExpandOutcome, GraphSession, Interaction, InteractionKind, InteractionOutcome, Position,
    SearchDebouncer,
};
use piigraph::Config;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "piigraph")]
#[command(version, about = "Explore a Product Information Index relation graph")]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Serve a relation corpus over HTTP
    Serve {
        /// Relation file (overrides server.relations_file)
        #[arg(long)]
        relations: Option<PathBuf>,
        /// Port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Load the backend query and explore it interactively
    Explore {
        /// Entities to expand right after the initial load
        #[arg(long = "expand")]
        expand: Vec<String>,
        /// Print the graph and exit instead of reading commands
        #[arg(long)]
        batch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.piigraph.log_level.as_str()),
    )
    .init();

    match cli.command {
        Mode::Serve { relations, port } => run_server(config, relations, port).await,
        Mode::Explore { expand, batch } => run_explorer(config, expand, batch).await,
    }
}

/// Run the relation backend
async fn run_server(
    mut config: Config,
    relations: Option<PathBuf>,
    port: Option<u16>,
) -> Result<()> {
    log::info!("Starting piigraph relation server v{}", env!("CARGO_PKG_VERSION"));

    if let Some(relations) = relations {
        config.server.relations_file = relations;
    }
    let port = port.unwrap_or(config.server.port);

    let server = RelationServer::from_config(&config)?;
    server.run(port).await?;
    Ok(())
}

/// Load the initial query, expand requested entities, then read commands from stdin
async fn run_explorer(config: Config, expand: Vec<String>, batch: bool) -> Result<()> {
    let fetcher = HttpFetcher::from_config(&config)?;
    let mut session = GraphSession::new(TextRenderer::new());

    log::info!("Backend: {}", config.backend.base_url);
    match fetcher.fetch_query().await {
        Ok(text) => {
            let report = session.ingest(&text);
            log::info!(
                "Initial query: {} attributes, {} edges, {} skipped, {} rejected",
                report.attributes,
                report.edges,
                report.skipped,
                report.rejected
            );
        }
        Err(e) => log::warn!("Initial query failed: {}", e),
    }

    for id in &expand {
        match session.expand(&fetcher, id).await {
            Ok(outcome) => print_expand(id, &outcome),
            Err(e) => println!("{}", e),
        }
    }

    print!("{}", session.renderer().frame());
    if batch {
        return Ok(());
    }

    println!("{}", HELP);
    let (debouncer, mut settled) = SearchDebouncer::spawn(config.debounce());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match Command::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                match command {
                    Command::Quit => break,
                    Command::Search(text) => {
                        debouncer.push(text);
                    }
                    command => run_command(&mut session, &fetcher, command).await?,
                }
            }
            Some(text) = settled.recv() => report_search(&mut session, &text),
        }
    }

    // A search typed just before EOF is flushed on finish.
    debouncer.finish().await;
    while let Some(text) = settled.recv().await {
        report_search(&mut session, &text);
    }
    Ok(())
}

fn report_search(session: &mut GraphSession<TextRenderer>, text: &str) {
    let matches = session.apply_search(text);
    if text.is_empty() {
        println!("search cleared");
    } else {
        println!("{} match(es) for {:?}: {}", matches.len(), text, matches.join(", "));
    }
}

async fn run_command(
    session: &mut GraphSession<TextRenderer>,
    fetcher: &HttpFetcher,
    command: Command,
) -> Result<()> {
    match command {
        Command::Open(id) => interact(session, fetcher, InteractionKind::DoubleClick, id).await,
        Command::Click(id) => interact(session, fetcher, InteractionKind::Click, id).await,
        Command::Expand(id) => {
            match session.expand(fetcher, &id).await {
                Ok(outcome) => print_expand(&id, &outcome),
                Err(e) => println!("{}", e),
            }
            print!("{}", session.renderer().frame());
        }
        Command::SelectNode(id) => {
            if session.node(&id).is_some() {
                session.renderer_mut().select_node(id);
            } else {
                println!("no node {}", id);
            }
        }
        Command::SelectEdge(edge) => {
            if session.edges().get(edge).is_some() {
                session.renderer_mut().select_edge(edge);
            } else {
                println!("no edge #{}", edge.0);
            }
        }
        Command::ClearSelection => session.renderer_mut().clear_selection(),
        Command::Delete => {
            let report = session.remove_selected();
            println!("removed {} node(s), {} edge(s)", report.nodes, report.edges);
        }
        Command::DropLabel(label) => {
            let remaining = session.remove_edges_by_label(&label);
            println!("{} edge(s) remain", remaining);
        }
        Command::Show => print!("{}", session.renderer().frame()),
        Command::Json => println!("{}", serde_json::to_string_pretty(&session.snapshot())?),
        Command::Help => println!("{}", HELP),
        Command::Search(_) | Command::Quit => {}
    }
    Ok(())
}

async fn interact(
    session: &mut GraphSession<TextRenderer>,
    fetcher: &HttpFetcher,
    kind: InteractionKind,
    id: String,
) {
    let interaction = Interaction {
        kind,
        node: Some(id.clone()),
        pointer: Position::default(),
    };
    match session.interact(fetcher, &interaction).await {
        Ok(InteractionOutcome::Expanded(outcome)) => {
            print_expand(&id, &outcome);
            print!("{}", session.renderer().frame());
        }
        Ok(InteractionOutcome::OpenLink(link)) => println!("open {}", link),
        Ok(InteractionOutcome::Recentered) => println!("centered on {}", id),
        Ok(InteractionOutcome::Ignored) => {}
        Err(e) => println!("{}", e),
    }
}

fn print_expand(id: &str, outcome: &ExpandOutcome) {
    match outcome {
        ExpandOutcome::Fetched(report) => println!(
            "expanded {}: {} attributes, {} edges",
            id, report.attributes, report.edges
        ),
        ExpandOutcome::AlreadyExpanded => println!("{} is already expanded", id),
        ExpandOutcome::Failed => println!("fetching {} failed; it stays collapsed", id),
    }
}
