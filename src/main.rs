use fxmap::codec::{deserialize, serialize};
use fxmap::dump::parse_dump;
use fxmap::errors::MapperError;
use fxmap::mapping::{Assignment, Mapping, MAPPABLE_BUTTONS};
use fxmap::sanitize::suggest_filename;
use log::info;
use std::env;
use std::fs;
use std::process;

const USAGE: &str = "\
usage:
  fxmap parse-dump <dump.txt>     print the parameter table from a plugin dump
  fxmap new <dump.txt> [out.ini]  build an auto-mapped mapping file from a dump
  fxmap check <mapping.ini>       load a mapping file and print a summary";

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), MapperError> {
    match args {
        [cmd, path] if cmd == "parse-dump" => cmd_parse_dump(path),
        [cmd, dump_path] if cmd == "new" => cmd_new(dump_path, None),
        [cmd, dump_path, out_path] if cmd == "new" => cmd_new(dump_path, Some(out_path)),
        [cmd, path] if cmd == "check" => cmd_check(path),
        _ => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    }
}

fn cmd_parse_dump(path: &str) -> Result<(), MapperError> {
    let text = fs::read_to_string(path)?;
    let dump = parse_dump(&text)?;

    println!("{} ({} parameters)", dump.plugin_name, dump.params.len());
    for (id, name) in &dump.params {
        println!("  [{}] {}", id, name);
    }
    Ok(())
}

fn cmd_new(dump_path: &str, out_path: Option<&String>) -> Result<(), MapperError> {
    let text = fs::read_to_string(dump_path)?;
    let dump = parse_dump(&text)?;

    let mut mapping = Mapping::new();
    mapping.plugin_name = dump.plugin_name;
    mapping.params = dump.params;
    mapping.auto_map_pages();

    let out_path = match out_path {
        Some(path) => path.clone(),
        None => format!("{}.ini", suggest_filename(&mapping.plugin_name)),
    };

    fs::write(&out_path, serialize(&mapping))?;
    info!("wrote auto-mapped file for '{}'", mapping.plugin_name);
    println!("{}", out_path);
    Ok(())
}

fn cmd_check(path: &str) -> Result<(), MapperError> {
    let text = fs::read_to_string(path)?;
    let mapping = deserialize(&text)?;

    println!("Plugin: {}", mapping.plugin_name);
    for page in &mapping.pages {
        let assigned: usize = page
            .knobs
            .iter()
            .map(|k| k.plain.iter().count() + k.shift.iter().count() + k.touch.iter().count())
            .sum();
        println!("  {} - {} slot(s) assigned", page.name, assigned);
    }
    for name in MAPPABLE_BUTTONS.iter() {
        let value = mapping.button(name);
        if !matches!(value, Assignment::Unassigned) {
            println!("  {} = {}", name, mapping.resolve_display_name(&value));
        }
    }
    Ok(())
}
