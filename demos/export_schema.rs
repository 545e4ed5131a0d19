//! Schema export example.
//!
//! Reads a few settings without any command line, then prints the schema the
//! reads produced as JSON. The JSON can be fed to `argview check --schema`.
//!
//! ```bash
//! cargo run -p argview-demos --example export_schema > render.json
//! argview check --schema render.json -- --threads 8
//! ```

use argview_core::{ArgumentList, ArgumentScope, ArgumentViewer};

fn main() {
    let mut args = ArgumentViewer::new("export_schema", Vec::new());
    if let Err(err) = record(&mut args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let schema: ArgumentList = args.into_schema();
    match schema.to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("error: failed to serialize schema: {err}");
            std::process::exit(1);
        }
    }
}

fn record(args: &mut ArgumentViewer) -> argview_core::Result<()> {
    args.is_present("--verbose", "print progress")?;
    args.get_u32("--threads", 4, "worker threads")?;
    args.get_u32v("--size", vec![640, 480], "image width and height")?;
    let mut camera = args.context("--camera", "view settings")?;
    camera.get_f32("--fov", 60.0, "vertical field of view")?;
    Ok(())
}
