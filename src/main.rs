use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{ArgAction, Parser};
use vn_unpacker::{
    error::Result,
    filesystem::{DirectoryResolver, InputFile},
    formats::{default_registry, options::parse_assignment, DecodeContext},
    report::ExtractionReport,
    saver::FileSaver,
    unpack::{Unpacked, Unpacker},
};

#[derive(Debug, Parser)]
#[command(
    name = "vn_unpacker",
    about = "Extracts images, audio and files from visual novel archives"
)]
struct Cli {
    /// Files to unpack
    #[arg(required_unless_present = "list_formats")]
    inputs: Vec<PathBuf>,

    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Use this decoder instead of detecting the format
    #[arg(long, value_name = "FORMAT")]
    fmt: Option<String>,

    /// Print the supported formats and their options
    #[arg(long)]
    list_formats: bool,

    /// Print what each input contains without extracting it
    #[arg(short, long)]
    list: bool,

    /// Decoder option, e.g. --set key=0xDEADCAFE
    #[arg(long = "set", value_name = "NAME=VALUE")]
    options: Vec<String>,

    /// Write a JSON report of the run
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Skip oxipng on extracted PNGs
    #[arg(long)]
    no_optimize: bool,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut unpacker = Unpacker::new(default_registry());

    if cli.list_formats {
        print_formats(&unpacker);
        return ExitCode::SUCCESS;
    }

    for assignment in &cli.options {
        let applied = parse_assignment(assignment)
            .and_then(|(name, value)| unpacker.set_option(&name, &value));
        if let Err(e) = applied {
            log::error!("{}", e);
            return ExitCode::from(2);
        }
    }

    let saver = FileSaver::new(&cli.output_dir, !cli.no_optimize);
    if !cli.list {
        log::info!("Writing output to {}", saver.root().display());
    }
    let mut report = ExtractionReport::new();

    for path in &cli.inputs {
        let input = path.display().to_string();

        if cli.list {
            match list_one(&unpacker, path) {
                Ok(names) => names.iter().for_each(|name| println!("{}", name)),
                Err(e) => {
                    log::error!("{}: {}", input, e);
                    report.record_failure(&input, &e);
                }
            }
            continue;
        }

        match unpack_one(&unpacker, &saver, cli.fmt.as_deref(), path) {
            Ok((decoder, outputs)) => {
                log::info!("{}: {} file(s) extracted", input, outputs.len());
                report.record_success(&input, decoder, outputs);
            }
            Err(e) => {
                log::error!("{}: {}", input, e);
                report.record_failure(&input, &e);
            }
        }
    }

    if let Some(report_path) = &cli.report {
        if let Err(e) = report.write(report_path) {
            log::error!("Could not write report {}: {}", report_path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    if report.failures() > 0 {
        log::warn!("{} of {} input(s) failed", report.failures(), cli.inputs.len());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_formats(unpacker: &Unpacker) {
    for (name, decoder) in unpacker.registry().all_decoders() {
        println!("{:<20} {}", name, decoder.kind());
        for option in decoder.options() {
            println!("    --set {}=...  {}", option.name, option.description);
        }
    }
}

/// Opens `path` as a top-level input whose siblings are looked up next to it on disk.
fn open_input(path: &Path) -> Result<(InputFile, DirectoryResolver)> {
    let file = InputFile::from_disk(path)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    Ok((file, DirectoryResolver::new(root)))
}

fn unpack_one(
    unpacker: &Unpacker,
    saver: &FileSaver,
    format: Option<&str>,
    path: &Path,
) -> Result<(&'static str, Vec<String>)> {
    let (mut file, resolver) = open_input(path)?;
    let ctx = DecodeContext::new(&resolver);

    let Unpacked { decoder, files } = match format {
        Some(format) => unpacker.unpack_with(format, &mut file, &ctx)?,
        None => unpacker.unpack(&mut file, &ctx)?,
    };

    let mut outputs = Vec::with_capacity(files.len());
    for output in &files {
        let saved = saver.save(output)?;
        outputs.push(saved.display().to_string());
    }
    Ok((decoder, outputs))
}

fn list_one(unpacker: &Unpacker, path: &Path) -> Result<Vec<String>> {
    let (mut file, resolver) = open_input(path)?;
    let names = unpacker.list(&mut file, &DecodeContext::new(&resolver))?;
    Ok(names.iter().map(|name| name.to_string()).collect())
}
