use clap::{Parser, Subcommand};
use nc_splitter::runner::{run_split, SplitArgs};
use nc_splitter::settings::KeywordSettings;
use std::path::PathBuf;

#[derive(Parser, Clone)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Subcommand)]
enum Command {
    /// Split a file of concatenated programs into one file per program
    Split {
        /// Path to the source file containing concatenated programs
        #[arg(short, long)]
        input: PathBuf,

        /// Directory to write the program files into (created if missing)
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Keyword that terminates a program (default from settings, else M30)
        #[arg(short, long)]
        keyword: Option<String>,

        /// Append a blank line after the keyword line in each program
        #[arg(long)]
        add_end_of_line: bool,

        /// Wrap each output file between % sentinel lines
        #[arg(long)]
        wrap_percent: bool,

        /// Path to a keywords settings file (JSON)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Quiet mode - minimal output, only show summary
        #[arg(short, long)]
        quiet: bool,
    },
    /// Print the suggested split keywords
    Keywords {
        /// Path to a keywords settings file (JSON)
        #[arg(long)]
        settings: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Subscriber must exist before settings loading so fallback warnings
    // reach the console on every path
    let quiet = matches!(args.command, Command::Split { quiet: true, .. });
    init_tracing(quiet);

    match args.command {
        Command::Split {
            input,
            output_dir,
            keyword,
            add_end_of_line,
            wrap_percent,
            settings,
            quiet,
        } => {
            run_splitter(
                input,
                output_dir,
                keyword,
                add_end_of_line,
                wrap_percent,
                settings,
                quiet,
            )
            .await?;
        }
        Command::Keywords { settings } => {
            let loaded = load_settings(settings);
            println!("Suggested split keywords:");
            for keyword in &loaded.available_keywords {
                println!("  {}", keyword);
            }
            println!("Default: {}", loaded.default_keyword);
        }
    }
    Ok(())
}

/// Initialize tracing based on quiet mode
fn init_tracing(quiet: bool) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = if quiet {
        EnvFilter::new("nc_splitter=warn")
    } else {
        EnvFilter::new("nc_splitter=info")
    };
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}


fn load_settings(path: Option<PathBuf>) -> KeywordSettings {
    match path {
        Some(path) => KeywordSettings::load(path),
        None => KeywordSettings::default(),
    }
}

async fn run_splitter(
    input: PathBuf,
    output_dir: PathBuf,
    keyword: Option<String>,
    add_end_of_line: bool,
    wrap_percent: bool,
    settings: Option<PathBuf>,
    quiet: bool,
) -> anyhow::Result<()> {
    let loaded = load_settings(settings);
    let keyword = cli::resolve_keyword(keyword, &loaded)?;

    if !quiet {
        println!("NC Program Splitter");
        println!("===================");
        println!("Input: {}", input.display());
        println!("Output: {}", output_dir.display());
        println!("Keyword: {}", keyword);
        println!();
    }

    let split_args = SplitArgs {
        input,
        output_dir: output_dir.clone(),
        keyword,
        append_blank_line: add_end_of_line,
        wrap_percent,
        quiet,
    };

    let result = run_split(split_args).await?;

    println!();
    println!("Split Summary");
    println!("=============");
    println!("Lines processed: {}", result.lines_processed);
    println!("Programs found: {}", result.programs_found);
    println!("Files written: {}", result.files_written);
    println!("Files failed: {}", result.files_failed);
    println!("Output folder: {}", output_dir.display());
    println!("Duration: {:.2}s", result.duration.as_secs_f64());
    println!(
        "Throughput: {}",
        cli::format_throughput(result.lines_processed, result.duration)
    );

    if !result.file_names.is_empty() {
        println!();
        println!("File list:");
        print!("{}", cli::format_file_list(&result.file_names, 10));
    }

    if !result.failures.is_empty() {
        println!();
        println!("Failures:");
        for failure in &result.failures {
            println!("  {} - {}", failure.file_name, failure.error);
        }
    }

    Ok(())
}

/// CLI utility functions for resolving arguments and formatting output
mod cli {
    use nc_splitter::settings::KeywordSettings;
    use std::time::Duration;

    /// Resolve the split keyword: explicit flag wins, then the settings
    /// default. An explicitly empty keyword is rejected.
    pub fn resolve_keyword(
        flag: Option<String>,
        settings: &KeywordSettings,
    ) -> anyhow::Result<String> {
        match flag {
            Some(keyword) => {
                let keyword = keyword.trim().to_string();
                if keyword.is_empty() {
                    Err(anyhow::anyhow!(
                        "Split keyword must not be empty.\n\
                         Omit --keyword to use the default ('{}').",
                        settings.default_keyword
                    ))
                } else {
                    Ok(keyword)
                }
            }
            None => Ok(settings.default_keyword.clone()),
        }
    }

    /// Format line throughput for the summary; a duration too short to
    /// measure yields a dash instead of a nonsense figure
    pub fn format_throughput(lines_processed: u64, duration: Duration) -> String {
        let secs = duration.as_secs_f64();
        if secs > 0.0 {
            format!("{:.0} lines/sec", lines_processed as f64 / secs)
        } else {
            "- lines/sec".to_string()
        }
    }

    /// Format the first `limit` file names, one per line, with a trailing
    /// "... and N more files" line when truncated
    pub fn format_file_list(names: &[String], limit: usize) -> String {
        let mut out = String::new();
        for name in names.iter().take(limit) {
            out.push_str("  - ");
            out.push_str(name);
            out.push('\n');
        }
        if names.len() > limit {
            out.push_str(&format!("  ... and {} more files\n", names.len() - limit));
        }
        out
    }

}
