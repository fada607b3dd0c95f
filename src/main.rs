//! Dashboard Composer CLI
//!
//! Usage:
//!   dashboard-composer [OPTIONS] [CONFIG]
//!
//! Options:
//!   -p, --payload <FILE>  Analysis-result payload (JSON)
//!   -s, --spaces <FILE>   Space/limit tables (TOML format)
//!   --components          List known component types
//!   --pretty              Pretty-print the render plan
//!   -d, --debug           Dump per-entry diagnostics to stderr
//!   -h, --help            Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;

use dashboard_composer::{compose_with_config, ComposeConfig, Registry, SpaceModel};

#[derive(Parser)]
#[command(name = "dashboard-composer")]
#[command(about = "Configuration-driven composition engine for analysis dashboards")]
struct Cli {
    /// UI configuration document, JSON (reads from stdin if not provided)
    config: Option<PathBuf>,

    /// Analysis-result payload, JSON
    #[arg(short, long)]
    payload: Option<PathBuf>,

    /// Space/limit tables (TOML format)
    #[arg(short, long)]
    spaces: Option<PathBuf>,

    /// List known component types and exit
    #[arg(long)]
    components: bool,

    /// Pretty-print the render plan
    #[arg(long)]
    pretty: bool,

    /// Debug mode: dump per-entry diagnostics to stderr
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.components {
        print_components();
        return;
    }

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.config.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    // Load space tables
    let spaces = match &cli.spaces {
        Some(path) => match SpaceModel::from_file(path) {
            Ok(model) => model,
            Err(e) => {
                eprintln!("Error loading space tables '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => SpaceModel::default(),
    };

    // Read the configuration document
    let doc_source = match &cli.config {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let doc = match serde_json::from_str(&doc_source) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error parsing configuration document: {}", e);
            std::process::exit(1);
        }
    };

    // Read the analysis payload; an absent payload leaves every reference
    // unresolved, which the plan flags per entry.
    let payload = match &cli.payload {
        Some(path) => {
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading payload '{}': {}", path.display(), e);
                    std::process::exit(1);
                }
            };
            match serde_json::from_str(&content) {
                Ok(value) => value,
                Err(e) => {
                    eprintln!("Error parsing payload '{}': {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => serde_json::Value::Object(Default::default()),
    };

    let config = ComposeConfig::new().with_spaces(spaces);
    let plan = compose_with_config(&doc, &payload, &config);

    if cli.debug {
        eprintln!("=== Render Plan Debug ===");
        for entry in &plan.entries {
            eprintln!(
                "[{}] {} space={} placeholder={} errors={} warnings={} autofix={}",
                entry.position_index,
                if entry.component_name.is_empty() {
                    "<diagnostic>"
                } else {
                    &entry.component_name
                },
                entry.space_type,
                entry.placeholder,
                entry.validation.errors.len(),
                entry.validation.warnings.len(),
                entry.validation.autofix_applied,
            );
            for error in &entry.validation.errors {
                eprintln!("    error: {}", error);
            }
            for warning in &entry.validation.warnings {
                eprintln!("    warning: {}", warning);
            }
        }
        eprintln!("=========================");
    }

    let output = if cli.pretty {
        serde_json::to_string_pretty(&plan)
    } else {
        serde_json::to_string(&plan)
    };

    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing render plan: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_components() {
    let registry = Registry::new();
    let mut names: Vec<&str> = registry.names().collect();
    names.sort_unstable();
    for name in names {
        println!("{}", name);
    }
}

fn print_intro() {
    println!(
        r#"Dashboard Composer - configuration-driven dashboard composition

USAGE:
    dashboard-composer [OPTIONS] [CONFIG]
    cat config.json | dashboard-composer -p payload.json

OPTIONS:
    -p, --payload      Analysis-result payload (JSON)
    -s, --spaces       Custom space/limit tables (TOML file)
    --components       List known component types
    --pretty           Pretty-print the render plan
    -d, --debug        Dump per-entry diagnostics to stderr
    -h, --help         Print help

QUICK START:
    echo '{{"selected_components":[{{"component_name":"StatGroup",
      "props":{{"stats":"{{{{analysis_data.stats}}}}"}},
      "layout":{{"size":"quarter"}}}}]}}' \
      | dashboard-composer -p results.json --pretty

The output is a render plan: one fully resolved, validated entry per
selected component, ready for a rendering layer. Unknown components and
constraint violations are reported inside the plan, never as failures."#
    );
}
