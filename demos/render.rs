//! Renderer-style settings read through the accessor protocol.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p argview-demos --example render -- --size 800 600 --camera { --fov 75 }
//! cargo run -p argview-demos --example render -- --help
//! ```
//!
//! Every accessor call both returns a value and records the argument in the
//! schema. Once all settings are read, `validate` rejects anything the
//! program never asked for, and `usage` lists what it did ask for.

use argview_core::{ArgumentScope, ArgumentViewer};

fn main() {
    let mut args = match ArgumentViewer::from_args(std::env::args()) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(&mut args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &mut ArgumentViewer) -> argview_core::Result<()> {
    let help = args.is_present("--help", "print this listing")?;
    let threads = args.get_u32("--threads", 4, "worker threads")?;
    let size = args.get_u32v("--size", vec![640, 480], "image width and height")?;
    let output = args.get_string("--output", "frame.png", "output image")?;
    let layers = args.get_string_vector("--layers", vec!["color".into()], "passes to render")?;

    let (fov, eye) = {
        let mut camera = args.context("--camera", "view settings")?;
        let fov = camera.get_f32("--fov", 60.0, "vertical field of view")?;
        let eye = camera.get_f32v("--eye", vec![0.0, 0.0, 5.0], "camera position")?;
        (fov, eye)
    };

    if help {
        println!("{}:", args.application_name());
        print!("{}", args.usage());
        return Ok(());
    }

    args.validate()?;

    println!("threads: {threads}");
    println!("size:    {}x{}", size[0], size[1]);
    println!("output:  {output}");
    println!("layers:  {}", layers.join(", "));
    println!("fov:     {fov}");
    println!("eye:     {eye:?}");
    Ok(())
}
