//! # ichatpack CLI
//!
//! Command-line interface for the ichatpack library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use ichatpack::archive::{PlutilConverter, copy_archives};
use ichatpack::batch::{BatchReport, parse_directory};
use ichatpack::cli::{ArchiveArgs, Args, Command, CopyArgs, ParseArgs, SearchArgs};
use ichatpack::config::ArchiveConfig;
use ichatpack::core::{FilterConfig, OutputConfig, SearchOptions, apply_filters, search};
use ichatpack::format::{OutputFormat, write_to_format};
use ichatpack::identity::NameGroups;
use ichatpack::parsers::IChatParser;
use ichatpack::progress::stderr_progress;
use ichatpack::{IchatError, Message};

const DEFAULT_OUTPUT: &str = "ichat_corpus.csv";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ichatpack=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), IchatError> {
    let args = <Args as ClapParser>::parse();

    println!("📦 ichatpack v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match args.command {
        Command::Copy(copy) => run_copy(&copy),
        Command::Parse(parse) => run_parse(&parse),
        Command::Search(query) => run_search(&query),
    }
}

fn load_config(path: Option<&str>) -> Result<ArchiveConfig, IchatError> {
    match path {
        Some(path) => ArchiveConfig::from_json_file(path),
        None => Ok(ArchiveConfig::default()),
    }
}

fn run_copy(args: &CopyArgs) -> Result<(), IchatError> {
    let start = Instant::now();
    let config = load_config(args.config.as_deref())?;

    println!("📂 Archive: {}", args.archive_dir);
    println!("💾 Output:  {}", args.out_dir);
    println!();

    let converter = PlutilConverter::new().with_program(&args.plutil);
    let converted = copy_archives(
        &args.archive_dir,
        &args.out_dir,
        &args.years,
        &converter,
        &config,
    )?;

    println!(
        "✅ Converted {} archives ({:.2}s)",
        converted.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Parses the converted archives named by `args`, printing a summary.
fn load_batch(args: &ArchiveArgs, debug: bool) -> Result<(BatchReport, NameGroups), IchatError> {
    let config = load_config(args.config.as_deref())?.with_debug_mode(debug);
    let groups = match &args.names {
        Some(path) => NameGroups::from_file(path)?,
        None => NameGroups::new(),
    };
    let parser = IChatParser::with_config(config, groups.clone());

    println!("📂 Input:   {}", args.dir);
    if let Some(names) = &args.names {
        println!("👥 Names:   {} ({} groups)", names, groups.len());
    }
    if !args.years.is_empty() {
        let years: Vec<String> = args.years.iter().map(ToString::to_string).collect();
        println!("📅 Years:   {}", years.join(", "));
    }
    println!();

    println!("⏳ Parsing archives...");
    let start = Instant::now();
    let progress = args.progress.then(stderr_progress);
    let report = parse_directory(&args.dir, &args.years, &parser, progress)?;

    println!(
        "   Found {} records for {} owners ({} duplicates removed, {:.2}s)",
        report.stats.deduped_count,
        report.corpus.len(),
        report.stats.removed(),
        start.elapsed().as_secs_f64()
    );
    for failure in &report.failures {
        println!("⚠️  Skipped {}: {}", failure.file_name, failure.error);
    }
    Ok((report, groups))
}

/// Records of the requested owner, or every owner's.
fn select_owner(
    report: &BatchReport,
    groups: &NameGroups,
    owner: Option<&str>,
) -> Result<Vec<Message>, IchatError> {
    match owner {
        Some(owner) => {
            let primary = groups.primary_name(owner);
            report
                .corpus
                .get(primary)
                .map(<[Message]>::to_vec)
                .ok_or_else(|| {
                    IchatError::invalid_format("owner", format!("no records for owner '{primary}'"))
                })
        }
        None => Ok(report.corpus.all_messages()),
    }
}

fn run_parse(args: &ParseArgs) -> Result<(), IchatError> {
    let total_start = Instant::now();
    let output_path = adjust_output_extension(&args.output, args.format);

    println!("💾 Output:  {}", output_path);
    println!("📄 Format:  {}", args.format);

    let mut filter_config = FilterConfig::new();
    if let Some(ref after) = args.after {
        filter_config = filter_config.with_date_from(after)?;
        println!("📅 After:   {}", after);
    }
    if let Some(ref before) = args.before {
        filter_config = filter_config.with_date_to(before)?;
        println!("📅 Before:  {}", before);
    }
    if let Some(ref from) = args.from {
        filter_config = filter_config.with_sender(from.clone());
        println!("👤 From:    {}", from);
    }

    let (report, groups) = load_batch(&args.archive, args.debug)?;
    let messages = select_owner(&report, &groups, args.archive.owner.as_deref())?;
    let selected = messages.len();

    let messages = if filter_config.is_active() {
        println!("🔍 Filtering messages...");
        let filtered = apply_filters(messages, &filter_config);
        println!("   {} messages after filtering", filtered.len());
        filtered
    } else {
        messages
    };

    let mut output_config = OutputConfig::new();
    if args.timestamps {
        output_config = output_config.with_timestamps();
    }
    if args.inferred {
        output_config = output_config.with_inferred_flag();
    }
    if args.debug {
        output_config = output_config.with_debug();
    }

    let lib_format: OutputFormat = args.format.into();
    println!("💾 Writing {}...", lib_format);
    write_to_format(&messages, &output_path, lib_format, &output_config)?;

    println!();
    println!("✅ Done! Output saved to {}", output_path);
    println!();
    println!("📊 Summary:");
    println!(
        "   Archives:  {} parsed, {} skipped",
        report.parsed_count(),
        report.failures.len()
    );
    println!("   Selected:  {} messages", selected);
    println!("   Final:     {} messages", messages.len());
    println!("   Time:      {:.2}s", total_start.elapsed().as_secs_f64());
    Ok(())
}

fn run_search(args: &SearchArgs) -> Result<(), IchatError> {
    let mut options = SearchOptions::new().with_context(args.context);
    if args.case_sensitive {
        options = options.with_case_sensitive();
    }
    if args.regex {
        options = options.with_regex();
    }
    if let Some(group) = args.group {
        options = options.with_group(group);
    }

    let (report, groups) = load_batch(&args.archive, false)?;
    let only = args.archive.owner.as_deref().map(|owner| groups.primary_name(owner));

    println!("🔍 Searching for {:?}...", args.query);
    println!();
    let mut total = 0;
    let mut searched = 0;
    for (owner, messages) in report.corpus.iter() {
        if only.is_some_and(|name| name != owner) {
            continue;
        }
        searched += 1;
        let hits = search(messages, &args.query, &options)?;
        if hits.is_empty() {
            continue;
        }
        println!("== {} ({} hits)", owner, hits.len());
        for hit in &hits {
            for idx in hit.window.clone() {
                let msg = &messages[idx];
                let mark = if idx == hit.index { '>' } else { ' ' };
                println!(
                    "{} {} {}: {}",
                    mark,
                    msg.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    msg.sender,
                    msg.message
                );
            }
            if options.context > 0 {
                println!("--");
            }
        }
        total += hits.len();
    }

    println!();
    println!("✅ {} hits in {} owners", total, searched);
    Ok(())
}

/// Adjusts output file extension based on format if using default output.
fn adjust_output_extension(output: &str, format: ichatpack::cli::OutputFormat) -> String {
    if output != DEFAULT_OUTPUT {
        return output.to_string();
    }

    let lib_format: OutputFormat = format.into();
    format!("ichat_corpus.{}", lib_format.extension())
}
