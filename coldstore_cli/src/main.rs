//! # Coldstore CLI
//!
//! Runs cold-room designs from JSON input files and prints the result as a
//! report or as JSON.
//!
//! Exit codes: `0` valid design, `2` invalid design, `1` file or JSON error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use coldstore_core::catalog::{Catalogs, EquipmentCatalog, ThermalCatalog};
use coldstore_core::config::DesignConfig;
use coldstore_core::design::{DesignInput, DesignResult};
use coldstore_core::errors::CalcResult;
use coldstore_core::file_io;
use coldstore_core::loads::LoadTerm;
use coldstore_core::project::{design_project, Project, ProjectDesign, RoomDesignInput};
use coldstore_core::selection::{EquipmentSelection, SystemSelection};

#[derive(Parser)]
#[command(name = "coldstore")]
#[command(about = "Cold-storage refrigeration design - heat loads and equipment selection", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Design a single room
    Design {
        /// Path to the design input JSON file
        input: PathBuf,
        #[command(flatten)]
        catalogs: CatalogArgs,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Design every room of a project
    Project {
        /// Path to the project JSON file
        project: PathBuf,
        #[command(flatten)]
        catalogs: CatalogArgs,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a built-in catalog as JSON
    Catalog {
        #[arg(value_enum, default_value_t = CatalogKind::Equipment)]
        kind: CatalogKind,
    },
    /// Print a sample input
    Example {
        /// Print a project instead of a single-room input
        #[arg(long)]
        project: bool,
    },
}

#[derive(clap::Args)]
struct CatalogArgs {
    /// Equipment catalog JSON replacing the built-in one
    #[arg(long)]
    equipment: Option<PathBuf>,
    /// Thermal catalog JSON replacing the built-in one
    #[arg(long)]
    thermal: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CatalogKind {
    Equipment,
    Thermal,
}

/// Catalogs owned for the duration of a command
struct LoadedCatalogs {
    thermal: Option<ThermalCatalog>,
    equipment: Option<EquipmentCatalog>,
}

impl LoadedCatalogs {
    fn load(args: &CatalogArgs) -> CalcResult<Self> {
        let thermal = args.thermal.as_deref().map(file_io::load_thermal_catalog).transpose()?;
        let equipment = args
            .equipment
            .as_deref()
            .map(file_io::load_equipment_catalog)
            .transpose()?;
        Ok(LoadedCatalogs { thermal, equipment })
    }

    fn catalogs(&self) -> Catalogs<'_> {
        Catalogs::new(
            self.thermal.as_ref().unwrap_or(ThermalCatalog::standard()),
            self.equipment.as_ref().unwrap_or(EquipmentCatalog::standard()),
        )
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Design { input, catalogs, json } => cmd_design(&input, &catalogs, json),
        Commands::Project { project, catalogs, json } => cmd_project(&project, &catalogs, json),
        Commands::Catalog { kind } => cmd_catalog(kind),
        Commands::Example { project } => cmd_example(project),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error [{}]: {}", e.error_code(), e);
            ExitCode::from(1)
        }
    }
}

/// Returns whether the design is valid
fn cmd_design(path: &Path, args: &CatalogArgs, json: bool) -> CalcResult<bool> {
    let input = file_io::load_design_input(path)?;
    let loaded = LoadedCatalogs::load(args)?;
    debug!(path = %path.display(), "design input loaded");

    let result = input.design(&loaded.catalogs());
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(result.valid)
}

fn cmd_project(path: &Path, args: &CatalogArgs, json: bool) -> CalcResult<bool> {
    let project = file_io::load_project(path)?;
    let loaded = LoadedCatalogs::load(args)?;

    let summary = design_project(&project, &loaded.catalogs());
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_project(&project, &summary);
    }
    Ok(summary.all_valid())
}

fn cmd_catalog(kind: CatalogKind) -> CalcResult<bool> {
    let json = match kind {
        CatalogKind::Equipment => serde_json::to_string_pretty(EquipmentCatalog::standard())?,
        CatalogKind::Thermal => serde_json::to_string_pretty(ThermalCatalog::standard())?,
    };
    println!("{}", json);
    Ok(true)
}

fn cmd_example(project: bool) -> CalcResult<bool> {
    let example = DesignInput::example();
    let json = if project {
        let mut p = Project::new("Engineer", "25-001", "Client", DesignConfig::new(0.1));
        p.add_room(RoomDesignInput::new(example.room, example.product));
        serde_json::to_string_pretty(&p)?
    } else {
        serde_json::to_string_pretty(&example)?
    };
    println!("{}", json);
    Ok(true)
}

fn print_result(result: &DesignResult) {
    println!("═══════════════════════════════════════");
    println!("  {}", result.label);
    println!("═══════════════════════════════════════");

    if let Some(load) = &result.load {
        println!();
        println!("Heat load:");
        for term in LoadTerm::ALL {
            let w = load.term_w(term);
            if w > 0.0 {
                println!("  {:<14} {:>10.0} W", term.display_name(), w);
            }
        }
        println!("  {:<14} {:>10.0} W", "Subtotal", load.subtotal_w);
        println!(
            "  {:<14} {:>10.0} W  (+{:.0}%)",
            "Total",
            load.total_w,
            load.safety_margin * 100.0
        );
        println!("  {:<14} {:>10.0} W", "Equipment", load.equipment_load_w);
        println!("  {:<14} {:>10.0} W", "Mechanical", load.mechanical_load_w);
    }

    if let Some(required) = &result.required {
        println!();
        println!(
            "Sized for: air coolers {:.1} kW, compressors {:.1} kW",
            required.air_cooler_kw, required.compressor_kw
        );
    }

    if let Some(op) = &result.operating {
        println!();
        println!(
            "Operating point: Te = {:.1} °C, Tc = {:.1} °C",
            op.evaporating_c, op.condensing_c
        );
    }

    if let Some(selection) = &result.selection {
        println!();
        match selection {
            SystemSelection::SingleStage { air_cooler, compressor } => {
                println!("Single-stage system:");
                print_equipment("Air cooler", air_cooler);
                print_equipment("Compressor", compressor);
            }
            SystemSelection::Cascade {
                air_cooler,
                low_stage,
                high_stage,
                intermediate_c,
                heat_exchanger_duty_kw,
                ..
            } => {
                println!(
                    "Cascade system: intermediate {:.1} °C, heat exchanger {:.1} kW",
                    intermediate_c, heat_exchanger_duty_kw
                );
                print_equipment("Air cooler", air_cooler);
                print_equipment("Low stage", low_stage);
                print_equipment("High stage", high_stage);
            }
        }
    }

    if let Some(energy) = &result.energy {
        println!();
        println!(
            "Energy: {:.1} kW input ({:.1} kW defrost), COP {:.2}, {:.0} kWh/year",
            energy.total_input_kw, energy.defrost_power_kw, energy.system_cop, energy.annual_energy_kwh
        );
    }

    println!();
    if result.valid {
        println!("Status: ✓ VALID");
    } else {
        println!("Status: ✗ INVALID");
        for e in &result.errors {
            println!("  - [{}] {}", e.error_code(), e);
        }
    }
}

fn print_equipment(label: &str, sel: &EquipmentSelection) {
    println!(
        "  {:<11} {} × {}  {:.1} kW for {:.1} kW required (margin {:.0}%)",
        label,
        sel.units,
        sel.model_id,
        sel.total_capacity_kw,
        sel.required_kw,
        sel.margin_fraction * 100.0
    );
}

fn print_project(project: &Project, summary: &ProjectDesign) {
    println!("Project {} - {} ({})", project.meta.job_id, project.meta.client, project.meta.engineer);
    println!();
    for (_, result) in &summary.rooms {
        print_result(result);
        println!();
    }
    println!(
        "{} valid, {} invalid, total required {:.1} kW",
        summary.valid_rooms, summary.invalid_rooms, summary.total_required_kw
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_design_with_catalog() {
        let cli = Cli::parse_from(["coldstore", "-vv", "design", "room.json", "--equipment", "eq.json", "--json"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Design { input, catalogs, json } => {
                assert_eq!(input, PathBuf::from("room.json"));
                assert_eq!(catalogs.equipment, Some(PathBuf::from("eq.json")));
                assert!(catalogs.thermal.is_none());
                assert!(json);
            }
            _ => panic!("expected design command"),
        }
    }

    #[test]
    fn test_builtin_catalogs_used_by_default() {
        let loaded = LoadedCatalogs::load(&CatalogArgs {
            equipment: None,
            thermal: None,
        })
        .unwrap();
        let catalogs = loaded.catalogs();
        assert!(std::ptr::eq(catalogs.equipment, EquipmentCatalog::standard()));
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let args = CatalogArgs {
            equipment: None,
            thermal: None,
        };
        let err = cmd_design(Path::new("/nonexistent/room.json"), &args, true).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
