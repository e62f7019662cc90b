use algoviz::{read_steps, run_problem, Params, PaletteManager, ProblemRegistry, StepWriter, STEP_FILE_VERSION};
use algoviz::{RendererType, RunOutput, Step};
use anyhow::Result;
use std::env;
use std::fs;
use std::io::Write;

fn temp_file(name: &str) -> String {
    let path = env::temp_dir().join(format!("algoviz_it_{}_{}", std::process::id(), name));
    path.to_str().unwrap().to_string()
}

fn run(name: &str, params: Params) -> Result<RunOutput> {
    let problem = ProblemRegistry::global().get(name).unwrap();
    let palettes = PaletteManager::new();
    run_problem(problem, &params, palettes.current_palette())
}

fn write_file(path: &str, output: &RunOutput, compact: bool) -> Result<()> {
    let mut writer = StepWriter::new(path)?.with_compact(compact);
    writer.write_header(
        STEP_FILE_VERSION,
        serde_json::json!({
            "renderer_type": output.renderer_type,
            "params": output.params,
        }),
    )?;
    writer.write_steps(&output.steps)?;
    writer.write_footer()?;
    Ok(())
}

#[test]
fn test_write_and_read_array_steps() -> Result<()> {
    let test_file = temp_file("bubble.jsonl");
    let _ = fs::remove_file(&test_file);

    let output = run("Bubble Sort", Params::new())?;
    write_file(&test_file, &output, true)?;

    let file = read_steps(&test_file)?;
    assert_eq!(file.header.version, STEP_FILE_VERSION);
    assert!(file.header.compact);
    assert_eq!(file.header.metadata["renderer_type"], "array");
    assert_eq!(file.header.metadata["params"]["preset"], 1);
    assert_eq!(file.footer.map(|f| f.total_steps), Some(output.steps.len()));
    pretty_assertions::assert_eq!(file.steps, output.steps);

    fs::remove_file(&test_file)?;
    Ok(())
}

#[test]
fn test_compact_and_full_files_decode_alike() -> Result<()> {
    let compact_file = temp_file("fill_compact.jsonl");
    let full_file = temp_file("fill_full.jsonl");

    let output = run("Flood Fill", Params::new())?;
    write_file(&compact_file, &output, true)?;
    write_file(&full_file, &output, false)?;

    let compact = read_steps(&compact_file)?;
    let full = read_steps(&full_file)?;
    assert!(!full.header.compact);
    assert_eq!(compact.steps, full.steps);
    assert_eq!(full.steps, output.steps);
    assert!(fs::metadata(&compact_file)?.len() < fs::metadata(&full_file)?.len());

    fs::remove_file(&compact_file)?;
    fs::remove_file(&full_file)?;
    Ok(())
}

#[test]
fn test_brotli_round_trip() -> Result<()> {
    let plain_file = temp_file("sched.jsonl");
    let br_file = temp_file("sched.jsonl.br");

    let output = run("Task Scheduler", Params::new().with("preset", 2))?;
    write_file(&plain_file, &output, true)?;
    write_file(&br_file, &output, true)?;

    let plain = read_steps(&plain_file)?;
    let compressed = read_steps(&br_file)?;
    assert_eq!(plain.steps.len(), output.steps.len());
    assert_eq!(compressed.steps, plain.steps);

    // The Brotli file must not be readable as plain text
    let raw = fs::read(&br_file)?;
    assert!(serde_json::from_slice::<serde_json::Value>(&raw).is_err());

    fs::remove_file(&plain_file)?;
    fs::remove_file(&br_file)?;
    Ok(())
}

#[test]
fn test_every_problem_produces_a_timeline() -> Result<()> {
    let registry = ProblemRegistry::global();
    assert_eq!(registry.len(), 5);

    for info in registry.list() {
        let output = run(&info.name, Params::new())?;
        assert!(!output.steps.is_empty(), "{} produced no steps", info.name);
        assert!(!output.source_code.is_empty());

        let source_lines = output.source_code.lines().count() as u32;
        for step in &output.steps {
            assert!(
                step.line_number >= 1 && step.line_number <= source_lines,
                "{}: line {} outside source",
                info.name,
                step.line_number
            );
            assert!(info.renderer_type.accepts(&step.visual));
            assert!(step.log_messages.len() <= algoviz::log_buffer::MAX_LOG_MESSAGES_PER_STEP);
        }
    }
    Ok(())
}

#[test]
fn test_renderer_types_cover_every_visual() {
    let registry = ProblemRegistry::global();
    let mut kinds: Vec<RendererType> = registry.list().into_iter().map(|i| i.renderer_type).collect();
    kinds.sort_by_key(|k| k.as_str());
    kinds.dedup();
    assert_eq!(kinds.len(), 5);
}

#[test]
fn test_params_override_defaults() -> Result<()> {
    let output = run("Bubble Sort", Params::new().with("nums", "9,3,6"))?;
    let last: &Step = output.steps.last().unwrap();
    let values: Vec<i64> = last.array().unwrap().iter().filter_map(|c| c.value.as_int()).collect();
    assert_eq!(values, vec![3, 6, 9]);
    assert_eq!(output.params.get("preset"), Some(&serde_json::json!(1)));
    Ok(())
}

#[test]
fn test_footer_mismatch_is_rejected() -> Result<()> {
    let test_file = temp_file("bad_footer.jsonl");
    {
        let mut file = fs::File::create(&test_file)?;
        writeln!(file, r#"{{"type":"header","version":"1.0","compact":true,"metadata":{{}}}}"#)?;
        writeln!(file, r#"{{"type":"step","line_number":1,"array":[{{"value":1}}]}}"#)?;
        writeln!(file, r#"{{"type":"footer","total_steps":2}}"#)?;
    }

    let err = read_steps(&test_file).unwrap_err();
    assert!(format!("{:#}", err).contains("announces 2 steps"));

    fs::remove_file(&test_file)?;
    Ok(())
}

#[test]
fn test_missing_footer_is_tolerated() -> Result<()> {
    let test_file = temp_file("no_footer.jsonl");
    {
        let mut file = fs::File::create(&test_file)?;
        writeln!(file, r#"{{"type":"header","version":"1.0"}}"#)?;
        writeln!(file, r#"{{"type":"step","line_number":3,"description":"x","dsu_nodes":[{{"id":0,"label":"a"}}]}}"#)?;
    }

    let file = read_steps(&test_file)?;
    assert!(file.footer.is_none());
    assert_eq!(file.steps.len(), 1);
    assert_eq!(file.steps[0].dsu_nodes().unwrap().len(), 1);

    fs::remove_file(&test_file)?;
    Ok(())
}

#[test]
fn test_step_without_visual_is_rejected() -> Result<()> {
    let test_file = temp_file("no_visual.jsonl");
    {
        let mut file = fs::File::create(&test_file)?;
        writeln!(file, r#"{{"type":"header","version":"1.0"}}"#)?;
        writeln!(file, r#"{{"type":"step","line_number":1}}"#)?;
    }

    assert!(read_steps(&test_file).is_err());

    fs::remove_file(&test_file)?;
    Ok(())
}
