use crate::json_store::JsonFileStore;
use crate::store::Database;
use std::env;
use std::path::Path;
use std::process;

/// Command line arguments shared by the conversion scripts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
    pub output_db: String,
    /// Optional JSON template to import before anything else.
    pub json_path: Option<String>,
    /// Re-create the output database from scratch.
    pub create: bool,
}

/// Parses the command line, exiting with a usage message on bad input.
pub fn get_arguments(program: &str) -> Arguments {
    let args: Vec<String> = env::args().skip(1).collect();
    match parse_arguments(&args) {
        Ok(arguments) => arguments,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!(
                "Usage: {} OUTPUT_DB [--import-json JSON_FILE] [--force-recreate]",
                program
            );
            process::exit(1);
        }
    }
}

fn parse_arguments(args: &[String]) -> Result<Arguments, String> {
    let mut arguments = Arguments::default();
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--import-json" => {
                let path = iter
                    .next()
                    .ok_or_else(|| "--import-json expects a file path".to_string())?;
                arguments.json_path = Some(path.clone());
            }
            "--force-recreate" => arguments.create = true,
            other if other.starts_with("--") => {
                return Err(format!("unknown option '{}'", other));
            }
            _ => positional.push(arg.clone()),
        }
    }
    match positional.first() {
        Some(output_db) => arguments.output_db = output_db.clone(),
        None => return Err("missing database argument".to_string()),
    }
    Ok(arguments)
}

/// Opens the Spine database at `path`, exiting the process when it cannot
/// be opened or created.
pub fn open_spinedb(path: &str, create_new_db: bool) -> JsonFileStore {
    println!("Opening Spine DB at '{}'. . .", path);
    match JsonFileStore::open(Path::new(path), create_new_db) {
        Ok(db) => db,
        Err(error) => {
            eprintln!("{}", error);
            process::exit(1);
        }
    }
}

/// Seeds the target store from a JSON template file, exiting on a missing
/// or unreadable file.
pub fn import_json(path: &str, target_db: &mut dyn Database) {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            eprintln!("Error: Could not find file '{}'", path);
            process::exit(1);
        }
    };
    let data = match serde_json::from_str(&content) {
        Ok(data) => data,
        Err(error) => {
            eprintln!("Error: Could not parse '{}': {}", path, error);
            process::exit(1);
        }
    };
    let outcome = target_db.import_dataset(&data);
    for rejection in &outcome.rejections {
        eprintln!("Warning: {}", rejection);
    }
    println!("Imported {} entities from JSON.", outcome.imported);
    if let Err(error) = target_db.commit("Import JSON data") {
        eprintln!("Warning: {}", error);
    }
}
