use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{CommandFactory, Parser};
use serde_json::Value;
use unreal_script_graph::dot::artifact_name;
use unreal_script_graph::error::ScriptError;
use unreal_script_graph::{Error, FunctionEntry, GraphTheme, ScriptAst, ScriptGraph};
use walkdir::WalkDir;

mod logging;

/// Root directory all graph artifacts are written under
const OUTPUT_ROOT: &str = "graphs";

/// Command line tool for rendering blueprint script dumps as control-flow
/// graph images.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// The asset dump to disassemble
    source: Option<PathBuf>,

    /// Walk a directory tree and process every .json dump inside
    #[clap(short = 'd', long = "directory", conflicts_with = "source")]
    directory: Option<PathBuf>,

    /// Also write each function's decoded statements as pretty-printed JSON
    #[clap(long)]
    dump_intermediate: bool,

    /// Log debug output
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose).expect("Failed to initialize logging");

    let mut failures = 0usize;
    match (&args.source, &args.directory) {
        (Some(source), None) => process_file(source, &args, &mut failures),
        (None, Some(directory)) => {
            for entry in WalkDir::new(directory).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                if entry.path().extension().is_some_and(|ext| ext == "json") {
                    banner(entry.path());
                    process_file(entry.path(), &args, &mut failures);
                }
            }
        }
        _ => {
            Args::command().print_help().ok();
            return;
        }
    }

    if failures > 0 {
        log::error!("{failures} function(s) or file(s) failed");
        exit(1);
    }
}

fn banner(path: &Path) {
    let line = format!("# PROCESSING '{}' #", path.display());
    let plate = "#".repeat(line.len());
    log::info!("{plate}");
    log::info!("{line}");
    log::info!("{plate}");
}

fn process_file(path: &Path, args: &Args, failures: &mut usize) {
    let entries = match read_document(path) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("Failed to read '{}': {e}", path.display());
            *failures += 1;
            return;
        }
    };
    for entry in &entries {
        match entry.get("Type").and_then(Value::as_str) {
            Some("Function") => {
                let function = match FunctionEntry::from_entry(entry) {
                    Ok(function) => function,
                    Err(e) => {
                        log::error!("Skipping malformed function in '{}': {e}", path.display());
                        *failures += 1;
                        continue;
                    }
                };
                log::info!("Found function '{}'", function.name);
                if let Err(e) = process_function(path, &function, args) {
                    log::error!("Failed to disassemble '{}': {e}", function.name);
                    *failures += 1;
                }
            }
            Some(other) => log::info!("Found unknown type '{other}'"),
            None => log::warn!("Found entry without a Type"),
        }
    }
}

fn read_document(path: &Path) -> Result<Vec<Value>, Error> {
    let data = fs::read(path)?;
    let document: Value = serde_json::from_slice(&data)?;
    match document {
        Value::Array(entries) => Ok(entries),
        _ => Err(ScriptError::invalid_document(format!(
            "'{}' is not a sequence of entries",
            path.display()
        ))
        .into()),
    }
}

fn process_function(input: &Path, function: &FunctionEntry, args: &Args) -> Result<(), Error> {
    let mut ast = ScriptAst::new(&function.name, &function.bytecode)?;
    ast.resolve()?;

    // build every subgraph before writing anything, so a failed function
    // leaves no partial artifacts behind
    let mut graphs = Vec::new();
    for entrypoint in ast.entrypoints() {
        let (nodes, edges) = ast.subgraph(entrypoint)?;
        let name = artifact_name(&function.name, entrypoint);
        let mut graph = ScriptGraph::new(&name, GraphTheme::default());
        for node in nodes {
            graph.draw_node(node);
        }
        for edge in edges {
            graph.draw_edge(edge);
        }
        graphs.push(graph);
    }

    let outdir = output_dir(input);
    fs::create_dir_all(&outdir)?;

    if args.dump_intermediate {
        let dumpfile = outdir.join(format!("{}.json", function.name));
        fs::write(&dumpfile, serde_json::to_string_pretty(&ast.script_nodes_json())?)?;
    }

    for graph in &graphs {
        log::info!("Rendering '{}'...", graph.name());
        let gv_path = outdir.join(format!("{}.gv", graph.name()));
        fs::write(&gv_path, graph.to_dot())?;
        render_graph(&gv_path)?;
    }
    Ok(())
}

/// Where the artifacts of one input file go: `graphs/<input sans extension>/`
fn output_dir(input: &Path) -> PathBuf {
    let stripped = input.with_extension("");
    let relative = stripped.strip_prefix("/").unwrap_or(&stripped);
    Path::new(OUTPUT_ROOT).join(relative)
}

fn render_graph(gv_path: &Path) -> Result<(), Error> {
    let status = Command::new("dot")
        .arg("-Tsvg")
        .arg("-O")
        .arg(gv_path)
        .status()?;
    if !status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("dot exited with {status} for '{}'", gv_path.display()),
        )
        .into());
    }
    Ok(())
}
