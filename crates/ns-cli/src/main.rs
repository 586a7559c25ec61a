//! noshorts CLI
//!
//! Tooling for rule manifests: validate, compile to a JSON snapshot,
//! inspect, and fetch.

use std::fs;
use std::time::Instant;

use clap::{Parser, Subcommand};

use ns_compiler::{dedup_rules, lint_selector, parse_rule_manifest};
use ns_core::rules::RuleSet;

mod report;

use report::{RuleIssue, RuleSnapshot, ValidateReport};

#[derive(Parser)]
#[command(name = "ns-cli")]
#[command(about = "noshorts rule manifest compiler and tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a rule manifest
    Validate {
        /// Input manifest file
        #[arg(short, long)]
        input: String,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compile a rule manifest into a JSON rule snapshot
    Compile {
        /// Input manifest file
        #[arg(short, long)]
        input: String,

        /// Output snapshot file
        #[arg(short, long, default_value = "rules.json")]
        output: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Dump manifest info (built-in snapshot when no input is given)
    Info {
        /// Manifest file to inspect
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Download a rule manifest to a local file
    Fetch {
        /// Manifest URL
        #[arg(short, long)]
        url: String,

        /// Output manifest file
        #[arg(short, long, default_value = "rules.txt")]
        output: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { input, json } => cmd_validate(&input, json),
        Commands::Compile {
            input,
            output,
            verbose,
        } => cmd_compile(&input, &output, verbose),
        Commands::Info { input } => cmd_info(input.as_deref()),
        Commands::Fetch { url, output } => cmd_fetch(&url, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_manifest(path: &str) -> Result<(u32, Vec<String>, usize), String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    let manifest = parse_rule_manifest(&content).map_err(|e| e.to_string())?;

    let version = manifest.version;
    let mut rules = manifest.rules;
    let stats = dedup_rules(&mut rules);

    Ok((version, rules, stats.deduped))
}

fn lint_rules(rules: &[String]) -> Vec<RuleIssue> {
    let mut issues = Vec::new();
    for rule in rules {
        let problems = lint_selector(rule);
        if !problems.is_empty() {
            issues.push(RuleIssue {
                rule: rule.clone(),
                problems: problems.iter().map(|p| p.to_string()).collect(),
            });
        }
    }
    issues
}

fn cmd_validate(input: &str, json: bool) -> Result<(), String> {
    let (version, rules, deduped) = load_manifest(input)?;
    let issues = lint_rules(&rules);

    if json {
        let report = ValidateReport {
            version,
            rules: rules.len(),
            deduped,
            issues: issues.clone(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?
        );
    } else {
        println!("version {}: {} rules ({} deduped)", version, rules.len(), deduped);
        for issue in &issues {
            for problem in &issue.problems {
                println!("  {} - {}", issue.rule, problem);
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(format!("{} rule(s) failed lint", issues.len()))
    }
}

fn cmd_compile(input: &str, output: &str, verbose: bool) -> Result<(), String> {
    let start = Instant::now();

    let (version, rules, deduped) = load_manifest(input)?;

    let issues = lint_rules(&rules);
    if !issues.is_empty() {
        return Err(format!(
            "Refusing to compile: {} rule(s) failed lint (run validate)",
            issues.len()
        ));
    }

    let snapshot = RuleSnapshot {
        version,
        rules,
    };
    let json = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
    fs::write(output, json).map_err(|e| format!("Failed to write '{}': {}", output, e))?;

    if verbose {
        println!(
            "  version {} - {} rules ({} deduped) in {:.1}ms",
            snapshot.version,
            snapshot.rules.len(),
            deduped,
            start.elapsed().as_secs_f64() * 1000.0
        );
    }
    println!("Wrote {}", output);
    Ok(())
}

fn cmd_info(input: Option<&str>) -> Result<(), String> {
    let (source, version, rules) = match input {
        Some(path) => {
            let (version, rules, _) = load_manifest(path)?;
            (path.to_string(), version, rules)
        }
        None => {
            let builtin = RuleSet::builtin();
            let rules: Vec<String> = builtin.iter().map(String::from).collect();
            ("<built-in>".to_string(), builtin.version(), rules)
        }
    };

    // Length of the OR-combined selector the engine would use.
    let combined_len: usize = rules
        .iter()
        .map(|r| r.len() + 1)
        .sum::<usize>()
        .saturating_sub(1);

    println!("{source}");
    println!("  version:  {version}");
    println!("  rules:    {}", rules.len());
    println!("  combined: {combined_len} bytes");
    Ok(())
}

fn cmd_fetch(url: &str, output: &str) -> Result<(), String> {
    let runtime = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    let body = runtime.block_on(async {
        let response = reqwest::get(url).await.map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        response.text().await.map_err(|e| e.to_string())
    })?;

    // Reject garbage before it lands on disk.
    parse_rule_manifest(&body).map_err(|e| format!("Fetched manifest is invalid: {e}"))?;

    fs::write(output, &body).map_err(|e| format!("Failed to write '{}': {}", output, e))?;
    println!("Fetched {} -> {} ({} bytes)", url, output, body.len());
    Ok(())
}
