use clap::Parser;
use colored::Colorize;
use leibniz::problems::{catalog, Problem};
use leibniz::rules::RULES;
use leibniz::{Rewriter, RewriterConfig};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::process;

#[derive(Parser)]
#[command(name = "leibniz")]
#[command(about = "Differentiate and simplify the built-in problems by term rewriting")]
#[command(version)]
struct Args {
    /// Only solve the problem with this index
    #[arg(short, long)]
    problem: Option<usize>,

    /// Print every rule firing
    #[arg(short, long)]
    trace: bool,

    /// Give up on a problem after this many rewrite passes
    #[arg(long)]
    max_passes: Option<usize>,

    /// List the rule library and exit
    #[arg(long)]
    rules: bool,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if args.rules {
        for (i, rule) in RULES.iter().enumerate() {
            println!("{:>2}  {}", i, rule.label().cyan());
        }
        return;
    }

    let problems = match select(catalog(), args.problem) {
        Ok(problems) => problems,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut config = RewriterConfig::new();
    if let Some(max_passes) = args.max_passes {
        config = config.with_max_passes(max_passes);
    }
    let rewriter = Rewriter::default().with_config(config);

    let mut failed = false;
    for (i, problem) in problems {
        println!("{:>2}  {}", i, problem.name.bold());
        match rewriter.reduce_traced(&problem.expression) {
            Ok((result, trace)) => {
                if args.trace {
                    for step in trace.steps() {
                        println!(
                            "      {} {}: {} => {}",
                            format!("[{}]", step.pass).dimmed(),
                            step.rule.cyan(),
                            step.before,
                            step.after
                        );
                    }
                }
                println!("    {} => {}", problem.expression, result.to_string().green());
            }
            Err(e) => {
                failed = true;
                println!("    {} => {}", problem.expression, e.to_string().red());
            }
        }
    }

    if failed {
        process::exit(1);
    }
}

fn select(
    problems: Vec<Problem>,
    index: Option<usize>,
) -> Result<Vec<(usize, Problem)>, String> {
    let count = problems.len();
    let mut numbered = problems.into_iter().enumerate();
    match index {
        None => Ok(numbered.collect()),
        Some(index) => numbered
            .find(|(i, _)| *i == index)
            .map(|entry| vec![entry])
            .ok_or_else(|| format!("no problem {} (the catalogue has {})", index, count)),
    }
}
