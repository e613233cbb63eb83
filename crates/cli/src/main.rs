//! meminfo CLI
//!
//! Command-line interface for inspecting container layouts and estimating
//! the memory footprint of nested literals.

use clap::{CommandFactory, Parser as ClapParser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use meminfo_core::{
    Census, Config, Error, Estimator, LayoutInfo, SizeModel, TreeSummary, Tuple, Value, notation,
};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;

#[derive(ClapParser)]
#[command(name = "meminfo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "meminfo - estimate the memory footprint of nested containers", long_about = None)]
struct Cli {
    /// Path to estimator configuration (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Size model preset (overrides the configuration file)
    #[arg(long, global = true, value_enum)]
    model: Option<ModelPreset>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the layout of a single container
    Inspect {
        /// Container literal, e.g. '{"a": 1}'
        #[arg(required_unless_present = "file")]
        literal: Option<String>,

        /// Read the literal from a file instead
        #[arg(long, conflicts_with = "literal")]
        file: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Estimate every container reachable from a root tuple
    Tree {
        /// Tuple literal, e.g. '([1, 2], {})'
        #[arg(required_unless_present = "file")]
        literal: Option<String>,

        /// Read the literal from a file instead
        #[arg(long, conflicts_with = "literal")]
        file: Option<PathBuf>,

        /// Maximum nesting depth (defaults to the configured budget)
        #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        max_depth: Option<usize>,

        /// Show per-kind counts and bytes
        #[arg(long)]
        breakdown: bool,

        /// Wrap a non-tuple value in a 1-tuple
        #[arg(long)]
        wrap: bool,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Price each literal on its own and aggregate by kind
    Census {
        /// Container literals
        #[arg(required_unless_present = "file")]
        literals: Vec<String>,

        /// Read whitespace-separated literals from a file instead
        #[arg(long, conflicts_with = "literals")]
        file: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModelPreset {
    Lp64,
    Ilp32,
}

impl ModelPreset {
    fn model(self) -> SizeModel {
        match self {
            ModelPreset::Lp64 => SizeModel::lp64(),
            ModelPreset::Ilp32 => SizeModel::ilp32(),
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        run_completions(shell);
        return;
    }

    let estimator = match load_config(cli.config.as_deref(), cli.model) {
        Ok(config) => Estimator::new(config),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Inspect {
            literal,
            file,
            json,
        } => read_source(literal, file.as_deref())
            .and_then(|source| run_inspect(&estimator, &source, json)),
        Commands::Tree {
            literal,
            file,
            max_depth,
            breakdown,
            wrap,
            json,
        } => read_source(literal, file.as_deref()).and_then(|source| {
            let options = TreeOptions {
                max_depth,
                breakdown,
                wrap,
                json,
            };
            run_tree(&estimator, &source, &options)
        }),
        Commands::Census {
            literals,
            file,
            json,
        } => census_values(&literals, file.as_deref())
            .and_then(|values| run_census(&estimator, &values, json)),
        Commands::Completions { .. } => Ok(String::new()),
    };

    match result {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("meminfo_core=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "meminfo", &mut io::stdout());
}

/// Configuration file (if any) with the `--model` preset applied on top
fn load_config(path: Option<&Path>, preset: Option<ModelPreset>) -> Result<Config, String> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
            Config::from_toml(&content)?
        }
        None => Config::default(),
    };

    if let Some(preset) = preset {
        config = config.with_model(preset.model());
    }

    debug!(
        model = %config.model.name,
        max_depth = config.max_depth,
        "configuration loaded"
    );
    Ok(config)
}

fn read_source(literal: Option<String>, file: Option<&Path>) -> Result<String, String> {
    match (literal, file) {
        (_, Some(path)) => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e)),
        (Some(literal), None) => Ok(literal),
        (None, None) => Err("Provide a literal or --file".to_string()),
    }
}

fn parse_literal(source: &str) -> Result<Value, String> {
    notation::parse(source).map_err(|e| format!("Invalid literal: {}", e))
}

fn census_values(literals: &[String], file: Option<&Path>) -> Result<Vec<Value>, String> {
    match file {
        Some(path) => {
            let source = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            notation::parse_many(&source).map_err(|e| format!("Invalid literal: {}", e))
        }
        None => literals.iter().map(|l| parse_literal(l)).collect(),
    }
}

fn run_inspect(estimator: &Estimator, source: &str, json: bool) -> Result<String, String> {
    let value = parse_literal(source)?;
    let info = estimator.inspect(&value).map_err(|e| e.to_string())?;
    if json {
        to_json(&info)
    } else {
        Ok(format_layout(&info))
    }
}

struct TreeOptions {
    max_depth: Option<usize>,
    breakdown: bool,
    wrap: bool,
    json: bool,
}

#[derive(Serialize)]
struct TreeReport<'a> {
    model: &'a str,
    model_version: u32,
    max_depth: usize,
    total_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<&'a TreeSummary>,
}

fn run_tree(estimator: &Estimator, source: &str, options: &TreeOptions) -> Result<String, String> {
    let root = match parse_literal(source)? {
        Value::Tuple(tuple) => tuple,
        other if options.wrap => Tuple::new(vec![other]),
        other => {
            return Err(Error::RootNotTuple {
                type_name: other.type_name(),
            }
            .to_string());
        }
    };

    let max_depth = options.max_depth.unwrap_or(estimator.max_depth());
    let summary = estimator
        .summarize(&root, max_depth)
        .map_err(|e| e.to_string())?;

    let model = estimator.model();
    let report = TreeReport {
        model: &model.name,
        model_version: model.version,
        max_depth,
        total_bytes: summary.total_bytes,
        breakdown: options.breakdown.then_some(&summary),
    };

    if options.json {
        to_json(&report)
    } else {
        Ok(format_tree(&report))
    }
}

fn run_census(estimator: &Estimator, values: &[Value], json: bool) -> Result<String, String> {
    let census = estimator.census(values);
    if json {
        to_json(&census)
    } else {
        Ok(format_census(&census))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| format!("Failed to encode JSON: {}", e))
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn format_layout(info: &LayoutInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} LAYOUT ===\n", info.kind().to_uppercase()));
    match info {
        LayoutInfo::Map(m) => {
            out.push_str(&format!("Header size:     {} bytes\n", m.header_size));
            out.push_str(&format!("Entry size:      {} bytes\n", m.entry_size));
            out.push_str(&format!("Used:            {}\n", m.used));
            out.push_str(&format!("Capacity:        {}\n", m.capacity));
            out.push_str(&format!("Inline:          {}\n", yes_no(m.inline)));
        }
        LayoutInfo::Sequence(a) | LayoutInfo::Tuple(a) => {
            out.push_str(&format!("Header size:     {} bytes\n", a.header_size));
            out.push_str(&format!("Slot size:       {} bytes\n", a.slot_size));
            out.push_str(&format!("Length:          {}\n", a.length));
            out.push_str(&format!("Capacity:        {}\n", a.capacity));
        }
    }
    out.push_str(&format!("Estimated:       {} bytes\n", info.estimated_bytes()));
    out
}

fn format_tree(report: &TreeReport<'_>) -> String {
    let mut out = String::new();
    out.push_str("=== TREE ESTIMATE ===\n");
    out.push_str(&format!(
        "Model:           {} (v{})\n",
        report.model, report.model_version
    ));
    out.push_str(&format!("Max depth:       {}\n", report.max_depth));
    out.push_str(&format!("Total:           {} bytes\n", report.total_bytes));

    if let Some(summary) = report.breakdown {
        out.push_str(&format!("Deepest level:   {}\n", summary.deepest));
        out.push_str("\n--- By Kind ---\n");
        push_kind_rows(&mut out, &summary.census);
    }
    out
}

fn format_census(census: &Census) -> String {
    let mut out = String::new();
    out.push_str("=== CENSUS ===\n");
    out.push_str(&format!("Containers:      {}\n", census.total_count()));
    out.push_str(&format!("Leaves skipped:  {}\n", census.skipped));
    out.push_str(&format!("Total:           {} bytes\n", census.total_bytes()));
    if let Some(load) = census.map_load_factor() {
        out.push_str(&format!(
            "Map load:        {:.1}% ({} of {} slots, {} inline)\n",
            load * 100.0,
            census.map_used,
            census.map_slots,
            census.inline_maps
        ));
    }
    out.push_str("\n--- By Kind ---\n");
    push_kind_rows(&mut out, census);
    out
}

fn push_kind_rows(out: &mut String, census: &Census) {
    for (name, totals) in [
        ("map", census.maps),
        ("sequence", census.sequences),
        ("tuple", census.tuples),
    ] {
        out.push_str(&format!(
            "  {:10} {:>6} {:>10} bytes\n",
            name, totals.count, totals.bytes
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn tree_options() -> TreeOptions {
        TreeOptions {
            max_depth: None,
            breakdown: false,
            wrap: false,
            json: false,
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_model_flag_parses_after_subcommand() {
        let cli = Cli::try_parse_from(["meminfo", "tree", "()", "--model", "ilp32"]).unwrap();
        assert_eq!(cli.model, Some(ModelPreset::Ilp32));
        assert!(matches!(cli.command, Commands::Tree { .. }));
    }

    #[test]
    fn test_max_depth_must_be_positive() {
        let result = Cli::try_parse_from(["meminfo", "tree", "()", "--max-depth", "0"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["meminfo", "tree", "()", "--max-depth", "1"]).unwrap();
        let Commands::Tree { max_depth, .. } = cli.command else {
            panic!("Expected tree subcommand");
        };
        assert_eq!(max_depth, Some(1));
    }

    #[test]
    fn test_literal_and_file_conflict() {
        let result = Cli::try_parse_from(["meminfo", "inspect", "[]", "--file", "x.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inspect_human_output() {
        let out = run_inspect(&Estimator::default(), "[1, 2, 3]", false).unwrap();
        assert!(out.starts_with("=== SEQUENCE LAYOUT ===\n"));
        assert!(out.contains("Capacity:        3\n"));
        assert!(out.contains("Estimated:       64 bytes\n"));
    }

    #[test]
    fn test_inspect_leaf_is_error() {
        let err = run_inspect(&Estimator::default(), "42", false).unwrap_err();
        assert_eq!(err, "Unhandled type: <int>");
    }

    #[test]
    fn test_inspect_json_map() {
        let out = run_inspect(&Estimator::default(), "{1: 2}", true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["kind"], "map");
        assert_eq!(json["inline"], true);
        assert_eq!(json["capacity"], 8);
    }

    #[test]
    fn test_tree_total() {
        let out = run_tree(&Estimator::default(), "([1, 2, 3],)", &tree_options()).unwrap();
        assert!(out.contains("Total:           96 bytes\n"));
        assert!(!out.contains("By Kind"));
    }

    #[test]
    fn test_tree_breakdown_json() {
        let options = TreeOptions {
            breakdown: true,
            json: true,
            ..tree_options()
        };
        let out = run_tree(&Estimator::default(), "([1, 2, 3], ())", &options).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["model"], "lp64");
        assert_eq!(json["total_bytes"], 40 + 64 + 24);
        assert_eq!(json["breakdown"]["census"]["tuples"]["count"], 2);
        assert_eq!(json["breakdown"]["deepest"], 2);
    }

    #[test]
    fn test_tree_root_must_be_tuple_unless_wrapped() {
        let estimator = Estimator::default();
        let err = run_tree(&estimator, "[1]", &tree_options()).unwrap_err();
        assert_eq!(err, "Traversal root must be a tuple, got <sequence>");

        let options = TreeOptions {
            wrap: true,
            ..tree_options()
        };
        let out = run_tree(&estimator, "[1]", &options).unwrap();
        assert!(out.contains("Total:           80 bytes\n"));
    }

    #[test]
    fn test_tree_depth_exceeded() {
        let options = TreeOptions {
            max_depth: Some(2),
            ..tree_options()
        };
        let err = run_tree(&Estimator::default(), "(((),),)", &options).unwrap_err();
        assert_eq!(err, "Traversal depth exceeded: <2>");
    }

    #[test]
    fn test_census_of_literals() {
        let values = census_values(&["{}".to_string(), "[]".to_string(), "7".to_string()], None)
            .unwrap();
        let out = run_census(&Estimator::default(), &values, false).unwrap();
        assert!(out.contains("Containers:      2\n"));
        assert!(out.contains("Leaves skipped:  1\n"));
        assert!(out.contains("Map load:        0.0% (0 of 8 slots, 1 inline)\n"));
    }

    #[test]
    fn test_census_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# two sequences\n[1, 2]\n[3]").unwrap();

        let values = census_values(&[], Some(file.path())).unwrap();
        assert_eq!(values.len(), 2);
        let out = run_census(&Estimator::default(), &values, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["sequences"]["count"], 2);
        assert_eq!(json["sequences"]["bytes"], (40 + 16) + (40 + 8));
    }

    #[test]
    fn test_load_config_file_and_preset_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = 4\n\n[model]\npreset = \"ilp32\"").unwrap();

        let config = load_config(Some(file.path()), None).unwrap();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.model, SizeModel::ilp32());

        let config = load_config(Some(file.path()), Some(ModelPreset::Lp64)).unwrap();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.model, SizeModel::lp64());
    }

    #[test]
    fn test_load_config_reports_bad_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = \"deep\"").unwrap();
        let err = load_config(Some(file.path()), None).unwrap_err();
        assert!(err.starts_with("Failed to parse config"), "{}", err);

        let err = load_config(Some(Path::new("/nonexistent/meminfo.toml")), None).unwrap_err();
        assert!(err.starts_with("Failed to read config"), "{}", err);
    }

    #[test]
    fn test_invalid_literal_reports_position() {
        let err = run_inspect(&Estimator::default(), "[1, 2", false).unwrap_err();
        assert!(err.starts_with("Invalid literal: line 1, column"), "{}", err);
    }
}
