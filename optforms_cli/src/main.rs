use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use optforms_core::configuration::{self, SolverKind, CONFIGURATION};
use optforms_core::io::json::OutcomeReport;
use optforms_core::templates::{BuiltTemplate, TemplateKind};
use tracing::{debug, error};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "optforms")]
#[command(about = "Build and solve small optimization problems from templates", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG isn't set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// Largest number of points accepted by the tsp template
    #[arg(long, global = true)]
    max_points: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the formulation a template input produces
    Show {
        /// generic, form, diet, resource or tsp
        template: TemplateKind,
        /// JSON input file
        file: PathBuf,
        /// Print LaTeX instead of plain text
        #[arg(long)]
        latex: bool,
    },
    /// Build and solve a template input
    Solve {
        /// generic, form, diet, resource or tsp
        template: TemplateKind,
        /// JSON input file
        file: PathBuf,
        /// Print the formulation as LaTeX before solving
        #[arg(long)]
        latex: bool,
        /// microlp or clarabel
        #[arg(short, long)]
        solver: Option<SolverKind>,
        /// Also write the outcome as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn build(template: TemplateKind, file: &Path) -> Option<BuiltTemplate> {
    match BuiltTemplate::read_json(template, file) {
        Ok(built) => Some(built),
        Err(e) => {
            eprintln!("Error: {}", e);
            None
        }
    }
}

fn print_formulation(built: &BuiltTemplate, latex: bool) {
    if latex {
        for line in built.problem().to_latex() {
            println!("{} \\\\", line);
        }
    } else {
        println!("{}", built.problem());
    }
    println!();
}

fn print_report(report: &OutcomeReport) {
    println!("Status: {}", report.status);
    if let Some(objective) = report.objective_value {
        println!("Objective: {:.4}", objective);
    }
    if let Some(tour) = &report.tour {
        println!("Tour: {}", tour);
    } else if let Some(values) = &report.values {
        println!();
        println!("Values:");
        for (name, value) in values {
            println!("  {:20} {:12.4}", name, value);
        }
    }
    if let Some(duals) = &report.dual_values {
        println!();
        println!("Dual values:");
        for (name, value) in duals {
            println!("  {:20} {:12.4}", name, value);
        }
    }
    if let Some(message) = &report.error {
        println!("Error: {}", message);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Some(max_points) = cli.max_points {
        match CONFIGURATION.write() {
            Ok(mut config) => config.max_points = max_points,
            Err(e) => {
                error!("unable to update configuration: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    match cli.command {
        Commands::Show {
            template,
            file,
            latex,
        } => {
            let Some(built) = build(template, &file) else {
                return ExitCode::FAILURE;
            };
            print_formulation(&built, latex);
            ExitCode::SUCCESS
        }
        Commands::Solve {
            template,
            file,
            latex,
            solver,
            output,
            json,
        } => {
            let Some(built) = build(template, &file) else {
                return ExitCode::FAILURE;
            };
            let kind = solver.unwrap_or_else(|| configuration::current().solver);
            debug!(template = %template, solver = ?kind, "solving");

            if !json {
                print_formulation(&built, latex);
            }
            let report = built.solve_to_report(kind.create().as_ref());
            if json {
                match report.to_json_string() {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_report(&report);
            }
            if let Some(path) = output {
                if let Err(e) = report.write_json(&path) {
                    eprintln!("Error writing {}: {}", path.display(), e);
                    return ExitCode::FAILURE;
                }
            }
            if report.error.is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}
