use clap::{ArgAction, Parser, Subcommand};
use revsimplex_solver::{CanonicalForm, DEFAULT_TOLERANCE, Problem, Solution, SolutionStatus, Solver};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "revsimplex")]
#[command(about = "Revised simplex solver for max c·x subject to Ax <= b, x >= 0", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and print the optimal solution
    Solve {
        /// JSON file with `objective`, `constraints` and `rhs`
        file: PathBuf,
        /// Maximum number of pivots
        #[arg(short, long, default_value_t = 10000)]
        max_iterations: usize,
        /// Output format (pretty, json)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Show shadow prices and reduced costs
        #[arg(short, long)]
        analysis: bool,
        /// Relative tolerance for reduced costs and ratio-test entries
        #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,
    },
    /// Solve a problem file, printing the dictionary after every pivot
    Trace {
        /// JSON file with `objective`, `constraints` and `rhs`
        file: PathBuf,
        /// Maximum number of pivots
        #[arg(short, long, default_value_t = 10000)]
        max_iterations: usize,
        /// Relative tolerance for reduced costs and ratio-test entries
        #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,
    },
    /// Check a problem file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logger(cli.verbose) {
        eprintln!("Error installing logger: {}", e);
        std::process::exit(1);
    }

    match cli.command {
        Commands::Solve {
            file,
            max_iterations,
            format,
            analysis,
            tolerance,
        } => {
            let problem = load_problem(&file);
            let solver = Solver::new()
                .with_max_iterations(max_iterations)
                .with_tolerance(tolerance);

            let solution = match solver.solve(&problem) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Solve error: {}", e);
                    std::process::exit(1);
                }
            };

            if format == "json" {
                match serde_json::to_string_pretty(&solution) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing solution: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print_solution(&solution, analysis);
            }

            if !solution.is_optimal() {
                std::process::exit(1);
            }
        }
        Commands::Trace {
            file,
            max_iterations,
            tolerance,
        } => {
            let problem = load_problem(&file);
            let mut cf = match CanonicalForm::from_problem(&problem) {
                Ok(cf) => cf,
                Err(e) => {
                    eprintln!("Invalid problem: {}", e);
                    std::process::exit(1);
                }
            };

            println!("Initial dictionary:");
            println!("{}", cf.augmented());
            println!("Basis: {}", variable_list(cf.basic_variables(), cf.num_variables()));
            println!();

            let solver = Solver::new()
                .with_max_iterations(max_iterations)
                .with_tolerance(tolerance);
            let mut count = 0;
            let result = solver.run(&mut cf, |cf, pivot| {
                count += 1;
                let n = cf.num_variables();
                println!(
                    "Pivot {}: {} enters at row {}, {} leaves, step {:.4}",
                    count,
                    variable_name(pivot.entering_variable, n),
                    pivot.leaving_row,
                    variable_name(pivot.leaving_variable, n),
                    pivot.step
                );
                println!("{}", cf.augmented());
                let values: Vec<String> = cf.basic_values().iter().map(|v| format!("{:.4}", v)).collect();
                println!("Basis: {}", variable_list(cf.basic_variables(), n));
                println!("Values: [{}]", values.join(", "));
                println!("Objective: {:.4}", cf.objective_value());
                println!();
            });

            match result {
                Ok(solution) => {
                    println!("Status: {}", status_label(solution.status));
                    println!("Objective: {:.4}", solution.objective_value);
                    if !solution.is_optimal() {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Solve error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Check { file } => {
            let problem = load_problem(&file);
            match CanonicalForm::from_problem(&problem) {
                Ok(cf) => {
                    println!(
                        "OK: {} variables, {} constraints",
                        cf.num_variables(),
                        cf.num_constraints()
                    );
                    let negative: Vec<usize> = (0..problem.rhs.len()).filter(|&i| problem.rhs[i] < 0.0).collect();
                    if !negative.is_empty() {
                        println!(
                            "Warning: negative right-hand side in rows {:?}; the slack basis is infeasible",
                            negative
                        );
                    }
                }
                Err(e) => {
                    eprintln!("Invalid problem: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn setup_logger(verbose: u8) -> Result<(), log::SetLoggerError> {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{:5} | {} | {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn load_problem(file: &Path) -> Problem {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_solution(solution: &Solution, analysis: bool) {
    let n = solution.num_variables;

    println!("Status: {}", status_label(solution.status));
    println!("Objective: {:.4}", solution.objective_value);
    println!("Pivots: {}", solution.iterations);
    println!();

    println!("Variables:");
    for (j, value) in solution.structural().iter().enumerate() {
        println!("  {:6} {:12.4}", variable_name(j, n), value);
    }
    println!();
    println!("Slacks:");
    for (i, value) in solution.slacks().iter().enumerate() {
        println!("  {:6} {:12.4}", variable_name(n + i, n), value);
    }

    if analysis {
        println!();
        println!("Analysis:");
        println!();

        if !solution.analysis.binding_constraints.is_empty() {
            println!("Binding constraints:");
            for i in &solution.analysis.binding_constraints {
                println!("  - row {}", i);
            }
            println!();
        }

        println!("Shadow prices:");
        for (i, y) in solution.analysis.shadow_prices.iter().enumerate() {
            println!("  row {:<4} {:12.4}", i, y);
        }
        println!();

        println!("Reduced costs (non-basic variables):");
        for (j, r) in solution.analysis.reduced_costs.iter().enumerate() {
            if r.abs() > 0.001 {
                println!("  {:6} {:12.4}", variable_name(j, n), r);
            }
        }
    }
}

fn status_label(status: SolutionStatus) -> &'static str {
    match status {
        SolutionStatus::Optimal => "OPTIMAL",
        SolutionStatus::Unbounded => "UNBOUNDED",
        SolutionStatus::IterationLimit => "ITERATION LIMIT",
    }
}

/// `x3` for structural variables, `s1` for slacks
fn variable_name(var: usize, n: usize) -> String {
    if var < n {
        format!("x{}", var)
    } else {
        format!("s{}", var - n)
    }
}

fn variable_list(vars: &[usize], n: usize) -> String {
    let names: Vec<String> = vars.iter().map(|&v| variable_name(v, n)).collect();
    format!("[{}]", names.join(", "))
}
