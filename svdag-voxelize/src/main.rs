use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use svdag::io::{write_to_file, Obj};
use svdag::NodePool;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <input_mesh> <output_arena> <depth>", args[0]);
        return ExitCode::FAILURE;
    }

    let input = Path::new(&args[1]);
    let output = Path::new(&args[2]);
    let depth: u32 = match args[3].parse() {
        Ok(depth) => depth,
        Err(_) => {
            eprintln!("Invalid depth: {}", args[3]);
            return ExitCode::FAILURE;
        }
    };

    println!("Input file: {}", input.display());
    println!("Output file: {}", output.display());
    println!("Depth: {depth}");

    let mesh = match Obj::parse(input) {
        Ok(mesh) => mesh,
        Err(err) => {
            eprintln!("Failed to read {}: {err}", input.display());
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let pool = match NodePool::from_scene(&mesh, depth) {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("Failed to voxelize {}: {err}", input.display());
            return ExitCode::FAILURE;
        }
    };
    println!("Time to voxelize: {} ms", start.elapsed().as_millis());
    println!("DAG nodes: {}", pool.len());

    if let Err(err) = write_to_file(&pool, output) {
        eprintln!("Failed to write {}: {err}", output.display());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
