use bk_core::{liters, to_liters};
use bk_model::record::{parse_bool, parse_real};
use bk_model::{
    Equipment, EquipmentField, LoadReport, ModelError, cmp_by_name, load_file,
    load_file_with_reports, save_file, write_equipment,
};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bk-cli")]
#[command(about = "brewkit CLI - BeerXML equipment profile tool", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every field of the profiles in a file
    Show {
        /// Path to the BeerXML file
        path: PathBuf,
        /// Only show the profile with this name
        #[arg(long)]
        name: Option<String>,
        /// Dump the serialized records as JSON
        #[arg(long)]
        json: bool,
    },
    /// List profile names in sorted order
    List {
        /// Path to the BeerXML file
        path: PathBuf,
    },
    /// Report unknown fields, rejected values and version mismatches
    Validate {
        /// Path to the BeerXML file
        path: PathBuf,
    },
    /// Re-emit the file in canonical field order and formatting
    Normalize {
        /// Path to the BeerXML file
        path: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute the boil volume and the wort left after the boil
    Boil {
        /// Path to the BeerXML file
        path: PathBuf,
        /// Kettle wort volume at the start of the boil, in liters
        #[arg(long, allow_hyphen_values = true)]
        kettle_wort: f64,
        /// Only use the profile with this name
        #[arg(long)]
        name: Option<String>,
    },
    /// Change one field of a profile through its validated setter
    Set {
        /// Path to the BeerXML file
        path: PathBuf,
        /// Profile name
        #[arg(long)]
        name: String,
        /// BeerXML field tag, e.g. BATCH_SIZE
        field: String,
        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Output file (defaults to rewriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No equipment profile named {0:?}")]
    NotFound(String),

    #[error("No equipment profiles in {0}")]
    Empty(PathBuf),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{0} profile(s) failed validation")]
    Invalid(usize),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Show { path, name, json } => cmd_show(&path, name.as_deref(), json),
        Commands::List { path } => cmd_list(&path),
        Commands::Validate { path } => cmd_validate(&path),
        Commands::Normalize { path, output } => cmd_normalize(&path, output.as_deref()),
        Commands::Boil {
            path,
            kettle_wort,
            name,
        } => cmd_boil(&path, kettle_wort, name.as_deref()),
        Commands::Set {
            path,
            name,
            field,
            value,
            output,
        } => cmd_set(&path, &name, &field, &value, output.as_deref()),
    }
}

fn init_tracing(verbose: u8) {
    // the binary's own messages (change notifications) show at info
    let default = match verbose {
        0 => "warn,bk_cli=info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_nonempty(path: &Path) -> CliResult<Vec<Equipment>> {
    let profiles = load_file(path)?;
    if profiles.is_empty() {
        return Err(CliError::Empty(path.to_path_buf()));
    }
    Ok(profiles)
}

fn select<'a>(profiles: &'a [Equipment], name: Option<&str>) -> CliResult<Vec<&'a Equipment>> {
    match name {
        None => Ok(profiles.iter().collect()),
        Some(wanted) => {
            let found: Vec<_> = profiles.iter().filter(|e| e.name() == wanted).collect();
            if found.is_empty() {
                Err(CliError::NotFound(wanted.to_string()))
            } else {
                Ok(found)
            }
        }
    }
}

fn cmd_show(path: &Path, name: Option<&str>, json: bool) -> CliResult<()> {
    let profiles = load_nonempty(path)?;
    let selected = select(&profiles, name)?;

    if json {
        let records: Vec<_> = selected.iter().map(|e| e.to_record()).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    for (i, profile) in selected.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", profile.name());
        for field in EquipmentField::ALL {
            if field == EquipmentField::Name {
                continue;
            }
            println!(
                "  {:<18} {} {}",
                field.tag(),
                profile.field_text(field),
                field.unit()
            );
        }
    }
    Ok(())
}

fn cmd_list(path: &Path) -> CliResult<()> {
    let mut profiles = load_file(path)?;
    profiles.sort_by(cmp_by_name);
    if profiles.is_empty() {
        println!("No equipment profiles found");
    }
    for profile in &profiles {
        println!("{}", profile.name());
    }
    Ok(())
}

fn print_report(name: &str, report: &LoadReport) {
    if report.is_clean() {
        println!("✓ {name}");
        return;
    }
    println!("✗ {name}");
    if let Some(found) = report.version_mismatch {
        println!("    version {found} (expected {})", bk_model::SCHEMA_VERSION);
    }
    for (field, line) in &report.unknown {
        match line {
            Some(l) => println!("    unknown field {field} at line {l}"),
            None => println!("    unknown field {field}"),
        }
    }
    for rejected in &report.rejected {
        match rejected.line {
            Some(l) => println!(
                "    {} at line {l}: {}",
                rejected.field.tag(),
                rejected.reason
            ),
            None => println!("    {}: {}", rejected.field.tag(), rejected.reason),
        }
    }
}

fn cmd_validate(path: &Path) -> CliResult<()> {
    println!("Validating equipment file: {}", path.display());
    let loaded = load_file_with_reports(path)?;
    if loaded.is_empty() {
        return Err(CliError::Empty(path.to_path_buf()));
    }

    let mut failed = 0;
    for (profile, report) in &loaded {
        print_report(profile.name(), report);
        if !report.is_clean() {
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(CliError::Invalid(failed));
    }
    Ok(())
}

fn cmd_normalize(path: &Path, output: Option<&Path>) -> CliResult<()> {
    let profiles = load_file(path)?;
    match output {
        Some(out) => {
            save_file(out, &profiles)?;
            println!(
                "✓ Wrote {} profile(s) to {}",
                profiles.len(),
                out.display()
            );
        }
        None => print!("{}", write_equipment(&profiles)?),
    }
    Ok(())
}

fn cmd_boil(path: &Path, kettle_wort_l: f64, name: Option<&str>) -> CliResult<()> {
    if !kettle_wort_l.is_finite() || kettle_wort_l < 0.0 {
        return Err(CliError::InvalidValue {
            field: "--kettle-wort".to_string(),
            reason: format!("must be a non-negative volume, got {kettle_wort_l}"),
        });
    }

    let profiles = load_nonempty(path)?;
    for profile in select(&profiles, name)? {
        let mut calculated = profile.clone();
        calculated.set_calc_boil_volume(true);
        let remaining = profile.wort_remaining_after_boil_volume(liters(kettle_wort_l));

        println!("{}", profile.name());
        println!("  Batch size:             {:.3} L", to_liters(profile.batch_size()));
        println!("  Boil size (stored):     {:.3} L", to_liters(profile.boil_size()));
        println!("  Boil size (calculated): {:.3} L", to_liters(calculated.boil_size()));
        println!("  Wort after boil:        {:.3} L", to_liters(remaining));
    }
    Ok(())
}

fn apply_field(profile: &mut Equipment, tag: &str, value: &str) -> CliResult<()> {
    let field = EquipmentField::from_tag(&tag.to_ascii_uppercase())
        .ok_or_else(|| CliError::UnknownField(tag.to_string()))?;

    let invalid = |reason: String| CliError::InvalidValue {
        field: field.tag().to_string(),
        reason,
    };

    match field {
        EquipmentField::Name => profile.set_name(value),
        EquipmentField::Notes => profile.set_notes(value),
        EquipmentField::Version => {
            return Err(invalid("the schema version is fixed".to_string()));
        }
        EquipmentField::CalcBoilVolume => {
            let on = parse_bool(value).map_err(|e| invalid(e.to_string()))?;
            profile.set_calc_boil_volume(on);
        }
        numeric => {
            let v = parse_real(value).map_err(|e| invalid(e.to_string()))?;
            profile
                .set_real_field(numeric, v)
                .map_err(ModelError::from)?;
        }
    }
    Ok(())
}

fn cmd_set(
    path: &Path,
    name: &str,
    tag: &str,
    value: &str,
    output: Option<&Path>,
) -> CliResult<()> {
    let mut profiles = load_nonempty(path)?;
    let profile = profiles
        .iter_mut()
        .find(|e| e.name() == name)
        .ok_or_else(|| CliError::NotFound(name.to_string()))?;

    profile.on_change(|field| tracing::info!("changed {}", field.tag()));
    apply_field(profile, tag, value)?;
    profile.clear_on_change();

    let out = output.unwrap_or(path);
    save_file(out, &profiles)?;
    println!("✓ Updated {name} in {}", out.display());
    Ok(())
}
