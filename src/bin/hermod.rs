//! hermod: governed text-processing CLI
//!
//! Every command runs through the same cache, rate limit, daily budget and
//! usage ledger as the library, with state persisted between invocations.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hermod::{Config, ExplanationContext, HermodBuilder, TextGateway};

/// Hermod CLI
#[derive(Parser)]
#[command(name = "hermod")]
#[command(version)]
#[command(about = "Governed client for a metered text-processing API")]
struct Args {
    /// Config file (default: ~/.hermod/config.toml, then /etc/hermod/config.toml)
    #[arg(short, long, env = "HERMOD_CONFIG")]
    config: Option<PathBuf>,

    /// Upstream endpoint, overriding the config file
    #[arg(short, long, env = "HERMOD_ENDPOINT")]
    endpoint: Option<String>,

    /// State file, overriding the config file (default: ~/.hermod/state.json)
    #[arg(long, env = "HERMOD_STATE")]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate text
    Translate {
        /// Text to translate (or omit to read from stdin)
        text: Option<String>,
        /// Target language
        #[arg(short, long, default_value = "en")]
        to: String,
    },

    /// Explain the cultural background of an expression
    Explain {
        /// Expression (or omit to read from stdin)
        text: Option<String>,
        /// Context type, e.g. "food" or "beauty"
        #[arg(short = 't', long = "type")]
        context_type: Option<String>,
    },

    /// Check content for compliance
    Compliance {
        /// Content (or omit to read from stdin)
        content: Option<String>,
    },

    /// Suggest replies to a comment
    Reply {
        /// Comment (or omit to read from stdin)
        comment: Option<String>,
    },

    /// Translate a post title and suggest improvements
    Title {
        /// Title (or omit to read from stdin)
        title: Option<String>,
        /// Target language
        #[arg(short, long, default_value = "en")]
        to: String,
    },

    /// List trending topics
    Trends,

    /// Show usage statistics
    Stats {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    let mut builder = HermodBuilder::from_config(&config);
    if let Some(endpoint) = args.endpoint {
        builder = builder.endpoint(endpoint);
    }
    if let Some(state) = args.state {
        builder = builder.state_path(state);
    }
    let gateway = builder.without_sweeper().build().await?;

    match args.command {
        Command::Translate { text, to } => {
            let text = resolve_text(text, "translate")?;
            let translation = gateway.translate(&text, &to).await?;
            println!("{}", translation.translated);
        }

        Command::Explain { text, context_type } => {
            let text = resolve_text(text, "explain")?;
            let mut context = ExplanationContext::new();
            if let Some(t) = context_type {
                context = context.context_type(t);
            }
            let explanation = gateway.cultural_explanation(&text, &context).await?;
            println!("type:     {}", explanation.explanation_type.as_str());
            println!("brief:    {}", explanation.brief);
            if !explanation.detailed.is_empty() {
                println!("\n{}", explanation.detailed);
            }
            print_list("examples", &explanation.examples);
            print_list("tips", &explanation.tips);
            print_list("related", &explanation.related_topics);
        }

        Command::Compliance { content } => {
            let content = resolve_text(content, "compliance")?;
            let report = gateway.check_compliance(&content).await?;
            let verdict = if report.is_compliant { "compliant" } else { "not compliant" };
            println!("{verdict}");
            print_list("warnings", &report.warnings);
            print_list("suggestions", &report.suggestions);
        }

        Command::Reply { comment } => {
            let comment = resolve_text(comment, "reply")?;
            let replies = gateway.suggest_reply(&comment).await?;
            if replies.is_empty() {
                println!("no suggested replies");
            }
            for reply in replies {
                println!("[{}] {} / {}", reply.key, reply.zh, reply.en);
            }
        }

        Command::Title { title, to } => {
            let title = resolve_text(title, "title")?;
            let advice = gateway.optimize_title(&title, &to).await?;
            println!("{}", advice.translation.translated);
            print_list("seo", &advice.seo_tips);
            print_list("tags", &advice.trending_tags);
            if !advice.length_advice.is_empty() {
                println!("\nlength: {}", advice.length_advice);
            }
        }

        Command::Trends => {
            let topics = gateway.trending_topics().await?;
            if topics.is_empty() {
                println!("no trending topics");
            }
            for topic in topics {
                println!(
                    "{:.2}  {} ({}) {}",
                    topic.popularity, topic.chinese, topic.english, topic.description
                );
            }
        }

        Command::Stats { json } => {
            let snapshot = gateway.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                for (kind, count) in &snapshot.stats.counts {
                    println!("{kind:<22}{count}");
                }
                println!("{:<22}{}", "errors", snapshot.stats.error_count);
                println!(
                    "{:<22}{} / {}",
                    "tokens remaining",
                    gateway.budget().remaining().await,
                    gateway.budget().daily_cap()
                );
                if !snapshot.recent_history.is_empty() {
                    println!("\nrecent:");
                    for record in &snapshot.recent_history {
                        let outcome = if record.success { "ok" } else { "failed" };
                        println!(
                            "  {}  {:<22}{outcome}",
                            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                            record.kind.stats_key()
                        );
                    }
                }
            }
        }
    }

    gateway.shutdown().await;
    Ok(())
}

/// Resolve text input from an optional CLI argument and/or stdin.
///
/// - arg only → arg
/// - stdin only → stdin
/// - both → `"{arg}\n\n{stdin}"`
/// - neither → error
fn resolve_text(arg: Option<String>, command: &str) -> Result<String, Box<dyn std::error::Error>> {
    let stdin_text = if io::stdin().is_terminal() {
        None
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    };

    match (arg, stdin_text) {
        (Some(a), Some(s)) => Ok(format!("{a}\n\n{s}")),
        (Some(a), None) => Ok(a),
        (None, Some(s)) => Ok(s),
        (None, None) => {
            Err(format!("{command}: no input provided (pass text as argument or via stdin)").into())
        }
    }
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{label}:");
    for item in items {
        println!("  - {item}");
    }
}
