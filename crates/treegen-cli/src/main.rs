use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

mod input;
mod trace;

#[derive(Parser)]
#[command(name = "treegen")]
#[command(about = "treegen - decision trees as size-bounded Java scoring classes")]
#[command(version = "0.1.0")]
#[command(author = "Gianluca Brigandi <gbrigand@gmail.com>")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a JSON tree description into the binary tree format
    Encode {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Emit a tree as Java scoring classes
    Emit {
        input: PathBuf,

        #[arg(short, long, default_value = "Tree")]
        name: String,

        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        max_nodes: Option<usize>,

        #[arg(long)]
        max_cp: Option<usize>,

        #[arg(long)]
        package: Option<String>,

        #[arg(long, value_enum, default_value = "java")]
        format: Format,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write one `<Class>.java` per class into the output directory
        #[arg(long, requires = "output")]
        split_files: bool,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Parse emitted source (a file or a directory of .java files)
    Validate {
        input: PathBuf,

        #[arg(long)]
        json: bool,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Score one row with the tree, optionally checking the emitted classes agree
    Score {
        input: PathBuf,

        #[arg(long)]
        row: String,

        #[arg(long)]
        check: bool,

        #[arg(long)]
        max_nodes: Option<usize>,
    },

    /// Print the callback sequence a depth-first walk of the tree produces
    Trace { input: PathBuf },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Java,
    Json,
}

impl From<Format> for treegen_emit::OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Java => treegen_emit::OutputFormat::Java,
            Format::Json => treegen_emit::OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { input, output } => cmd_encode(input, output),
        Commands::Emit {
            input,
            name,
            columns,
            config,
            max_nodes,
            max_cp,
            package,
            format,
            output,
            split_files,
            verbose,
        } => cmd_emit(EmitArgs {
            input,
            name,
            columns,
            config,
            max_nodes,
            max_cp,
            package,
            format: format.into(),
            output,
            split_files,
            verbose,
        }),
        Commands::Validate {
            input,
            json,
            verbose,
        } => cmd_validate(input, json, verbose),
        Commands::Score {
            input,
            row,
            check,
            max_nodes,
        } => cmd_score(input, row, check, max_nodes),
        Commands::Trace { input } => cmd_trace(input),
    }
}

fn cmd_encode(input: PathBuf, output: PathBuf) -> Result<()> {
    use colored::*;
    use std::fs;

    let tree = input::load_tree(&input)?;
    fs::write(&output, tree.as_bytes())?;
    info!(bytes = tree.len(), output = %output.display(), "tree encoded");
    println!(
        " {} Wrote {} bytes to {}",
        "SUCCESS:".bright_green().bold(),
        tree.len(),
        output.display()
    );
    Ok(())
}

struct EmitArgs {
    input: PathBuf,
    name: String,
    columns: Option<Vec<String>>,
    config: Option<PathBuf>,
    max_nodes: Option<usize>,
    max_cp: Option<usize>,
    package: Option<String>,
    format: treegen_emit::OutputFormat,
    output: Option<PathBuf>,
    split_files: bool,
    verbose: bool,
}

fn load_config(
    path: Option<&PathBuf>,
    max_nodes: Option<usize>,
    max_cp: Option<usize>,
) -> Result<treegen_emit::EmitterConfig> {
    let mut config = match path {
        Some(path) => treegen_emit::EmitterConfig::load(path)?,
        None => treegen_emit::EmitterConfig::default(),
    };
    if let Some(max_nodes) = max_nodes {
        config.limits = config.limits.with_max_nodes(max_nodes);
    }
    if let Some(max_cp) = max_cp {
        config.limits = config.limits.with_max_cp(max_cp);
    }
    Ok(config)
}

fn cmd_emit(args: EmitArgs) -> Result<()> {
    use colored::*;
    use std::fs;
    use std::time::Instant;
    use treegen_emit::{ClassContainer, JavaRenderer, OutputFormat, RenderOptions};

    if args.verbose {
        println!("{}", " treegen Emitter".bright_blue().bold());
        println!("{}", "=".repeat(50).bright_blue());
        println!(" Input: {}", args.input.display());
        println!(" Base class: {}", args.name);
        if let Some(ref out) = args.output {
            println!(" Output: {}", out.display());
        }
        println!();
    }

    let start = Instant::now();
    let tree = input::load_tree(&args.input)?;
    let columns = input::column_names(&tree, args.columns)?;
    let config = load_config(args.config.as_ref(), args.max_nodes, args.max_cp)?;
    let options = RenderOptions {
        package: args.package,
        indent_style: config.indent_style.clone(),
        ..RenderOptions::default()
    };

    let mut container = ClassContainer::new();
    let summary =
        treegen::emit_tree_with_config(&tree, &columns, &args.name, &mut container, config)?;
    info!(
        classes = summary.classes.len(),
        splits = summary.splits,
        "tree emitted"
    );

    let header = format!(
        "Generated by treegen {} on {}\nclasses: {}, forward calls: {}, group fields: {}",
        env!("CARGO_PKG_VERSION"),
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        summary.classes.len(),
        summary.splits,
        summary.group_fields
    );
    let renderer = JavaRenderer::new(RenderOptions {
        header: Some(header),
        ..options
    });

    match (args.format, args.output) {
        (OutputFormat::Json, Some(path)) => {
            fs::write(&path, treegen_emit::render_json(&container)?)?;
        }
        (OutputFormat::Json, None) => println!("{}", treegen_emit::render_json(&container)?),
        (OutputFormat::Java, Some(dir)) if args.split_files => {
            fs::create_dir_all(&dir)?;
            let preamble = renderer.render_preamble();
            for class in container.classes() {
                let path = dir.join(format!("{}.java", class.name));
                fs::write(&path, format!("{}\n{}", preamble, renderer.render_class(class)))?;
                if args.verbose {
                    println!("   Wrote {}", path.display());
                }
            }
        }
        (OutputFormat::Java, Some(path)) => fs::write(&path, renderer.render_unit(&container))?,
        (OutputFormat::Java, None) => print!("{}", renderer.render_unit(&container)),
    }

    if args.verbose {
        println!(
            "\n {} Emitted {} class(es)",
            "SUCCESS:".bright_green().bold(),
            summary.classes.len()
        );
        println!("   Forward calls: {}", summary.splits);
        println!("   Group fields: {}", summary.group_fields);
        println!("   Time: {:.3}s", start.elapsed().as_secs_f64());
    }
    Ok(())
}

fn cmd_validate(input: PathBuf, json: bool, verbose: bool) -> Result<()> {
    use colored::*;

    if verbose {
        println!("{}", " Validating emitted source".bright_cyan().bold());
        println!("{}", "=".repeat(50).bright_cyan());
        println!(" Input: {}", input.display());
        println!();
    }

    let parsed = if input.is_dir() {
        treegen_parser::parse_dir(&input)
    } else {
        treegen_parser::parse_file(&input)
    };

    let unit = match parsed {
        Ok(unit) => unit,
        Err(e) => {
            println!("{}", " INVALID".bright_red().bold());
            println!("\n{}", "Parse Error:".bright_red());
            println!("{}", e);
            return Err(anyhow::anyhow!("Validation failed"));
        }
    };

    let problems = unit.unresolved();
    if !problems.is_empty() {
        println!("{}", " INVALID".bright_red().bold());
        for problem in &problems {
            println!("   {}", problem);
        }
        return Err(anyhow::anyhow!("Validation failed"));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&unit)?);
        return Ok(());
    }

    println!("{}", " VALID".bright_green().bold());
    if verbose {
        for class in unit.classes.values() {
            let decisions: usize = class.methods.iter().map(|m| m.body.decisions()).sum();
            let calls: usize = class
                .methods
                .iter()
                .map(|m| m.body.forward_calls().len())
                .sum();
            println!(
                "   {} fields={} decisions={} forward_calls={}",
                class.name.bright_yellow(),
                class.fields.len(),
                decisions,
                calls
            );
        }
    }
    Ok(())
}

fn cmd_score(input: PathBuf, row: String, check: bool, max_nodes: Option<usize>) -> Result<()> {
    use colored::*;
    use treegen_emit::RenderOptions;

    let tree = input::load_tree(&input)?;
    let columns = input::column_names(&tree, None)?;
    let row = input::parse_row(&row)?;
    input::ensure_row_covers(&row, &columns)?;

    let score = tree.score(&row)?;
    println!("{}", score);

    if check {
        let config = load_config(None, max_nodes, None)?;
        let (source, summary) =
            treegen::emit_java(&tree, &columns, "Tree", config, RenderOptions::default())?;
        let unit = treegen_parser::parse_unit(&source)?;
        let mismatches = treegen::compare_scores(&tree, &unit, "Tree", &[row])?;
        if let Some(mismatch) = mismatches.first() {
            println!(
                "{} tree scored {} but the emitted classes scored {}",
                " MISMATCH".bright_red().bold(),
                mismatch.expected,
                mismatch.actual
            );
            return Err(anyhow::anyhow!("Emitted classes disagree with the tree"));
        }
        println!(
            "{} emitted classes agree ({} class(es))",
            " OK".bright_green().bold(),
            summary.classes.len()
        );
    }
    Ok(())
}

fn cmd_trace(input: PathBuf) -> Result<()> {
    let tree = input::load_tree(&input)?;
    let mut trace = trace::CallbackTrace::default();
    tree.cursor().visit(&mut trace)?;
    for line in trace.lines {
        println!("{}", line);
    }
    Ok(())
}
