//! tyto - ontology lookup CLI
//!
//! Command-line front end over the builtin ontologies and any defined in a
//! YAML manifest.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tyto::{ClientConfig, Ontology, OntologyManifest, OntologyRegistry, Uri};

#[derive(Parser)]
#[command(name = "tyto")]
#[command(version)]
#[command(about = "Ontology term and URI lookup", long_about = None)]
struct Cli {
    /// YAML manifest with additional ontology definitions
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Lookup cache capacity per ontology (0 disables caching)
    #[arg(long, global = true)]
    cache_size: Option<u64>,

    /// Increase log output (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available ontologies
    List,
    /// Resolve a term to its URI
    Uri {
        /// Ontology name (e.g., SO)
        ontology: String,
        /// Term (e.g., promoter, sequence_feature)
        term: String,
    },
    /// Resolve a URI to its term
    Term {
        /// Ontology name
        ontology: String,
        /// Term URI (e.g., https://identifiers.org/SO:0000167)
        uri: String,
    },
    /// Direct superclasses of a URI
    Parents { ontology: String, uri: String },
    /// Direct subclasses of a URI
    Children { ontology: String, uri: String },
    /// All superclasses of a URI
    Ancestors { ontology: String, uri: String },
    /// All subclasses of a URI
    Descendants { ontology: String, uri: String },
    /// Check whether a URI is (a subtype of) another
    IsA {
        ontology: String,
        uri: String,
        /// Putative supertype URI
        other: String,
    },
    /// Ontologies known to the ontology's sources
    Ontologies { ontology: String },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Manifest ontologies shadow builtins of the same name
fn resolve<'a>(manifest: Option<&'a OntologyRegistry>, name: &str) -> tyto::Result<&'a Ontology> {
    if let Some(registry) = manifest {
        if let Ok(ontology) = registry.get(name) {
            return Ok(ontology);
        }
    }
    tyto::ontology::registry::get(name)
}

fn print_uris(uris: &[Uri<'_>]) {
    if uris.is_empty() {
        println!("{}", "(none)".dimmed());
        return;
    }
    for uri in uris {
        println!("{}", uri);
    }
}

fn handle_list(manifest: Option<&OntologyRegistry>) {
    println!("{}", "Builtin ontologies:".bold());
    for ontology in tyto::ontology::builtins().iter() {
        print_ontology(ontology);
    }
    if let Some(registry) = manifest {
        println!("\n{}", "Manifest ontologies:".bold());
        for ontology in registry.iter() {
            print_ontology(ontology);
        }
    }
}

fn print_ontology(ontology: &Ontology) {
    let mut sources: Vec<String> = ontology.endpoints().iter().map(|e| e.name().to_string()).collect();
    if let Some(graph) = ontology.graph() {
        sources.insert(0, format!("file:{}", graph.path().display()));
    }
    let missing = match ontology.graph() {
        Some(graph) if !graph.is_available() => " (file missing)".red().to_string(),
        _ => String::new(),
    };
    println!(
        "  {:<10} {:<45} {}{}",
        ontology.name().green(),
        ontology.uri().unwrap_or("-"),
        sources.join(", ").dimmed(),
        missing
    );
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let manifest = match &cli.manifest {
        Some(path) => {
            let manifest = OntologyManifest::load(path)
                .with_context(|| format!("Failed to read manifest {}", path.display()))?;
            Some(OntologyRegistry::from_manifest(&manifest, &ClientConfig::from_env())?)
        }
        None => None,
    };
    let manifest = manifest.as_ref();

    if let Some(capacity) = cli.cache_size {
        tyto::configure_cache_size(capacity);
        if let Some(registry) = manifest {
            registry.configure_cache_size(capacity);
        }
    }

    match cli.command {
        Commands::List => handle_list(manifest),

        Commands::Uri { ontology, term } => {
            let ontology = resolve(manifest, &ontology)?;
            println!("{}", ontology.uri_for_term(&term)?);
        }

        Commands::Term { ontology, uri } => {
            let ontology = resolve(manifest, &ontology)?;
            println!("{}", ontology.term_for_uri(&uri)?);
        }

        Commands::Parents { ontology, uri } => {
            print_uris(&resolve(manifest, &ontology)?.get_parents(&uri)?);
        }

        Commands::Children { ontology, uri } => {
            print_uris(&resolve(manifest, &ontology)?.get_children(&uri)?);
        }

        Commands::Ancestors { ontology, uri } => {
            print_uris(&resolve(manifest, &ontology)?.get_ancestors(&uri)?);
        }

        Commands::Descendants { ontology, uri } => {
            print_uris(&resolve(manifest, &ontology)?.get_descendants(&uri)?);
        }

        Commands::IsA { ontology, uri, other } => {
            let ontology = resolve(manifest, &ontology)?;
            let subject = Uri::new(uri, ontology);
            if subject.is_a(&other)? {
                println!("{} {} is a {}", "✓".green(), subject, other);
            } else {
                println!("{} {} is not a {}", "✗".red(), subject, other);
            }
        }

        Commands::Ontologies { ontology } => {
            let ontologies = resolve(manifest, &ontology)?.get_ontologies()?;
            if ontologies.is_empty() {
                println!("{}", "(none)".dimmed());
            }
            for (uri, title) in ontologies {
                println!("{:<60} {}", uri, title);
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
