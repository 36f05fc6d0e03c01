use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use decaf_class_file::ClassFile;

#[derive(Parser)]
#[command(name = "decaf")]
#[command(about = "Reconstructs Java source declarations from a .class file")]
#[command(version)]
#[command(after_help = "Flags use GNU style: write --output PATH or -o PATH, not -output PATH.")]
struct Cli {
    /// Input .class file
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Output file, defaults to FILE with a .java extension
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output directory, only used for jar and war files
    #[arg(long, value_name = "DIR", default_value = "./")]
    outputdir: PathBuf,
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let Some(file) = cli.file.as_ref() else {
        println!("input file not specified");
        println!("{}", Cli::command().render_usage());
        return ExitCode::from(1);
    };

    match run(&cli, file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, file: &Path) -> Result<()> {
    let extension = file
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "class" => {
            let output = cli
                .output
                .clone()
                .unwrap_or_else(|| file.with_extension("java"));
            decompile_file(file, &output)
        }
        "jar" | "war" => bail!(
            "{} files are not supported yet (output directory {})",
            extension,
            cli.outputdir.display()
        ),
        _ => bail!("unrecognized input file type: {}", file.display()),
    }
}

fn decompile_file(input: &Path, output: &Path) -> Result<()> {
    log::info!("decompiling {} into {}", input.display(), output.display());

    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let class_file =
        ClassFile::parse(&bytes[..]).with_context(|| format!("parsing {}", input.display()))?;
    let source = decaf_source::decompile(&class_file)
        .with_context(|| format!("decompiling {}", input.display()))?;

    fs::write(output, source).with_context(|| format!("writing {}", output.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn output_flag_spellings() {
        for args in [
            vec!["decaf", "Foo.class", "-o", "out/Foo.java"],
            vec!["decaf", "Foo.class", "--output", "out/Foo.java"],
            vec!["decaf", "--output=out/Foo.java", "Foo.class", "--outputdir", "./"],
        ] {
            let cli = Cli::try_parse_from(args).unwrap();

            assert_eq!(Some(PathBuf::from("Foo.class")), cli.file);
            assert_eq!(Some(PathBuf::from("out/Foo.java")), cli.output);
        }
    }

    #[test]
    fn single_dash_long_output_is_rejected() {
        assert!(Cli::try_parse_from(["decaf", "-output", "x.java", "Foo.class"]).is_err());
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["decaf"]).unwrap();

        assert_eq!(None, cli.file);
        assert_eq!(None, cli.output);
        assert_eq!(PathBuf::from("./"), cli.outputdir);
    }
}
