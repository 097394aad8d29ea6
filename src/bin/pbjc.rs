//! Standalone CLI wrapper over [`pbjc::Config`], for invoking the compiler
//! outside of a `build.rs`.
//!
//! ```text
//! pbjc --out-dir target/generated -I proto proto/messages.proto
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

struct Args {
    out_dir: PathBuf,
    includes: Vec<PathBuf>,
    protos: Vec<PathBuf>,
    java_package_suffix: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut out_dir = None;
    let mut includes = Vec::new();
    let mut protos = Vec::new();
    let mut java_package_suffix = None;

    let mut raw = std::env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--out-dir" | "-o" => {
                out_dir = Some(PathBuf::from(raw.next().ok_or("--out-dir requires a value")?));
            }
            "-I" | "--include" => {
                includes.push(PathBuf::from(raw.next().ok_or("-I requires a value")?));
            }
            "--java-package-suffix" => {
                java_package_suffix = Some(raw.next().ok_or("--java-package-suffix requires a value")?);
            }
            other => protos.push(PathBuf::from(other)),
        }
    }

    let out_dir = out_dir.ok_or("missing required --out-dir")?;
    if protos.is_empty() {
        return Err("no .proto files given".to_string());
    }

    Ok(Args { out_dir, includes, protos, java_package_suffix })
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("pbjc: {msg}");
            eprintln!("usage: pbjc --out-dir <dir> [-I <include>]... [--java-package-suffix <suffix>] <proto>...");
            return ExitCode::FAILURE;
        }
    };

    let mut config = pbjc::Config::new();
    config.out_dir(&args.out_dir);
    if let Some(suffix) = &args.java_package_suffix {
        config.java_package_suffix(suffix.clone());
    }

    if let Err(err) = config.compile_protos(&args.protos, &args.includes) {
        eprintln!("pbjc: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
