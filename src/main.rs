//! xcheck: offline consistency checker for xv6 file-system images.
//!
//! `xcheck <file_system_image>` maps the image read-only, runs the
//! checks, and prints at most one diagnostic: startup failures on
//! stderr, the first consistency violation on stdout. Exit status 0
//! means the image passed.

use std::env;
use std::process::ExitCode;

use xcheck::check;
use xcheck::fs::FsImage;
use xcheck::image::Image;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = env::args().skip(1);
    let (Some(path), None) = (args.next(), args.next()) else {
        eprintln!("Usage: xcheck <file_system_image>");
        return ExitCode::FAILURE;
    };

    let image = match Image::open(&path) {
        Ok(image) => image,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let img = match FsImage::new(image.bytes()) {
        Ok(img) => img,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match check::run(&img) {
        Ok(()) => {
            println!("Check complete!");
            ExitCode::SUCCESS
        }
        Err(violation) => {
            println!("{violation}");
            ExitCode::FAILURE
        }
    }
}
