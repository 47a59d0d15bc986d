// Mon Feb 02 2026 - Alex

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;
use vadscan::config::ScanConfig;
use vadscan::output::{save_results, MatchTable};
use vadscan::rules::CompiledRules;
use vadscan::scan::ScanSession;
use vadscan::utils::logging;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Scan mapped process memory with pattern rules", long_about = None)]
struct Args {
    /// Inline rule text: `{..}` for hex, `/../` for a regex, anything
    /// else is matched as a plain string.
    #[arg(short, long)]
    rule: Option<String>,

    /// Path to a rule file.
    #[arg(short = 'f', long)]
    rule_file: Option<PathBuf>,

    /// Case-insensitive matching for inline rule text.
    #[arg(long)]
    nocase: bool,

    /// Also match the UTF-16LE widening of inline rule text.
    #[arg(long)]
    wide: bool,

    /// Scan a single process instead of every visible one.
    #[arg(short, long)]
    pid: Option<i32>,

    /// Ignore matches at or above this absolute address.
    #[arg(long)]
    max_size: Option<u64>,

    /// Scan a flat memory image file instead of live processes.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Write results to a JSON file as well.
    #[arg(short, long)]
    json: Option<PathBuf>,

    /// Worker threads for scanning multiple processes.
    #[arg(short, long)]
    threads: Option<usize>,

    #[arg(long)]
    no_progress: bool,

    #[arg(long)]
    no_parallel: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    logging::init_from_env(args.verbose);

    let mut config = ScanConfig::new();
    config.rule_text = args.rule;
    config.rule_file = args.rule_file;
    config.case_insensitive = args.nocase;
    config.wide = args.wide;
    config.pid = args.pid;
    config.max_size = args.max_size;
    config.image = args.image;
    config.parallel = !args.no_parallel;
    config.show_progress = !args.no_progress;
    if let Some(threads) = args.threads {
        config.max_threads = threads;
    }

    if let Err(e) = config.validate() {
        eprintln!("{} {}", "[!]".red(), e);
        std::process::exit(1);
    }

    let source = match config.rule_source() {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{} {}", "[!]".red(), e);
            std::process::exit(1);
        }
    };

    let rules = match CompiledRules::compile(&source) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("{} Failed to compile rules: {}", "[!]".red(), e);
            std::process::exit(1);
        }
    };

    println!(
        "{} Compiled {} rule(s): {}",
        "[+]".green(),
        rules.len(),
        rules.rule_names().collect::<Vec<_>>().join(", ")
    );

    let start_time = Instant::now();

    let session = ScanSession::new(&config, &rules);
    let results = match session.run() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("{} Scan failed: {}", "[!]".red(), e);
            std::process::exit(1);
        }
    };

    let total: usize = results.iter().map(|layer| layer.matches.len()).sum();

    println!();
    let table = MatchTable::new();
    for layer in &results {
        if layer.matches.is_empty() {
            continue;
        }
        match layer.pid {
            Some(pid) => println!("{} {} (pid {})", "[*]".blue(), layer.source.cyan().bold(), pid),
            None => println!("{} {}", "[*]".blue(), layer.source.cyan().bold()),
        }
        print!("{}", table.render(std::slice::from_ref(layer)));
        println!();
    }

    if let Some(json_path) = &args.json {
        if let Err(e) = save_results(&results, json_path) {
            eprintln!("{} Failed to save results: {}", "[!]".red(), e);
            std::process::exit(1);
        }
        println!("{} Results saved to: {}", "[+]".green(), json_path.display());
    }

    let elapsed = start_time.elapsed();
    println!(
        "{} Scanned {} layer(s), {} match(es) in {:.2}s",
        "[+]".green(),
        results.len(),
        total,
        elapsed.as_secs_f64()
    );
}
