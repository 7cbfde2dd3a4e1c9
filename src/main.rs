use clap::Parser;
use firmata_forge::{RequestLoader, builder};
use std::path::PathBuf;
use std::process::exit;

/// Generate a ConfigurableFirmata sketch from a build request file.
#[derive(Debug, Parser)]
#[command(name = "firmata-forge", version, about)]
struct Args {
    /// Build request file (TOML, or JSON with a .json extension).
    #[arg(short, long)]
    request: PathBuf,

    /// Directory the generated sketch folder is written into.
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Print the sketch to stdout instead of writing a file.
    #[arg(long)]
    stdout: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        exit(1);
    }
}

fn run(args: &Args) -> firmata_forge::Result<()> {
    let request = RequestLoader::new().request_file(&args.request).load()?;
    let sketch = builder().build(&request)?;

    if args.stdout {
        print!("{sketch}");
        return Ok(());
    }

    // The Arduino IDE requires the sketch to live in a folder of its own name.
    let name = request.sketch_name();
    let sketch_dir = args.output_dir.join(name);
    std::fs::create_dir_all(&sketch_dir)?;
    let sketch_path = sketch_dir.join(format!("{name}.ino"));
    std::fs::write(&sketch_path, sketch)?;
    println!("Wrote {}", sketch_path.display());
    Ok(())
}
