use algoviz::{
    run_problem, CycleLayering, Params, PaletteManager, ProblemRegistry, StepWriter, StepgenConfig,
    STEP_FILE_VERSION,
};
use anyhow::Result;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

struct Config {
    settings: StepgenConfig,
    problem: Option<String>,
    params: Params,
    list: bool,
}

fn parse_args() -> Result<Config> {
    let args: Vec<String> = env::args().collect();
    let mut config = Config {
        settings: StepgenConfig::load(),
        problem: None,
        params: Params::new(),
        list: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-list" => {
                config.list = true;
            }
            "-problem" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-problem requires a problem name");
                }
                config.problem = Some(args[i].clone());
            }
            "-param" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-param requires a key=value argument");
                }
                let (key, value) = Params::parse_assignment(&args[i])?;
                config.params.set(&key, value);
            }
            "-out" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-out requires a file path argument");
                }
                config.settings.output = Some(PathBuf::from(&args[i]));
            }
            "-palette" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-palette requires a palette name");
                }
                config.settings.palette = args[i].clone();
            }
            "-brotli" => {
                config.settings.brotli = true;
            }
            "-full" => {
                config.settings.compact = false;
            }
            "-compact" => {
                config.settings.compact = true;
            }
            "-shared_cycles" => {
                config.settings.cycle_layering = CycleLayering::Shared;
            }
            "-h" | "-help" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Warning: Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    Ok(config)
}

fn print_help() {
    println!("Algorithm Step Generator");
    println!("Usage: viz-stepgen [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -list                  List available problems and exit");
    println!("  -problem <NAME>        Problem to run (see -list)");
    println!("  -param <KEY=VALUE>     Problem parameter, may be repeated");
    println!("                         Integer values are parsed as numbers");
    println!("  -out <FILE>            Output file path (default: steps.jsonl)");
    println!("                         Paths ending in .br are Brotli-compressed");
    println!("  -brotli                Compress the default output (steps.jsonl.br)");
    println!("  -full                  Write every field, including defaults");
    println!("  -compact               Omit default-valued fields (default)");
    println!("  -palette <NAME>        Color palette: Mocha, Latte, Dracula (default: Mocha)");
    println!("  -shared_cycles         Put all cyclic nodes on one trailing layer");
    println!("  -h, -help, --help      Show this help message");
    println!();
    println!("Settings are read from the algoviz/stepgen.json file in the user config directory.");
    println!("Set RUST_LOG=debug for detailed logging.");
}

fn print_problems(registry: &ProblemRegistry) {
    for info in registry.list() {
        println!("{:<40} {:<8} {} / {}", info.name, info.renderer_type, info.topic, info.subtopic);
        println!("    {}", info.description);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut config = parse_args()?;
    let registry = ProblemRegistry::global();

    if config.list {
        print_problems(registry);
        return Ok(());
    }

    let name = match &config.problem {
        Some(name) => name.clone(),
        None => {
            print_help();
            anyhow::bail!("-problem is required");
        }
    };
    let problem = registry.get(&name).ok_or_else(|| {
        anyhow::anyhow!("Unknown problem '{}'. Available: {}", name, registry.names().join(", "))
    })?;

    let mut palettes = PaletteManager::new();
    palettes.set_current_palette(&config.settings.palette)?;

    if config.settings.cycle_layering != CycleLayering::PerNode && config.params.get("cycle_layering").is_none() {
        config
            .params
            .set("cycle_layering", config.settings.cycle_layering.as_str());
    }

    let output = run_problem(problem, &config.params, palettes.current_palette())?;

    let output_path = config.settings.output_path();
    let path_str = output_path.to_string_lossy();
    let mut writer = StepWriter::new(&path_str)?.with_compact(config.settings.compact);
    writer.write_header(
        STEP_FILE_VERSION,
        serde_json::json!({
            "problem": problem.name(),
            "topic": problem.topic(),
            "subtopic": problem.subtopic(),
            "renderer_type": output.renderer_type,
            "palette": palettes.current_palette().name,
            "source_code": output.source_code,
            "params": output.params,
        }),
    )?;
    writer.write_steps(&output.steps)?;
    writer.write_footer()?;

    tracing::info!(problem = problem.name(), steps = writer.step_count(), "done");
    println!("Steps written to: {}", path_str);

    Ok(())
}
