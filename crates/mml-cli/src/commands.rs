use anyhow::Result;

use mml_cli::pipeline::{self, ExtractConfig, ExtractReport, SplitConfig};

use crate::cli::{ExtractArgs, SplitArgs};

pub fn run_extract(args: &ExtractArgs) -> Result<ExtractReport> {
    let mut config = ExtractConfig::new(args.note_directories.clone(), args.outdir.clone());
    config.cui_file = args.cui_file.clone();
    config.extract_format = args.extract_format.into();
    config.extract_directories = args.extract_directories.clone();
    config.add_fieldnames = args.add_fieldnames.clone();
    config.max_search = args.max_search;
    config.exclude_negated = args.exclude_negated;
    config.skip_missing = args.skip_missing;
    config.extract_encoding = args.extract_encoding.clone();
    config.file_encoding = args.file_encoding.clone();
    config.note_suffix = args.note_suffix.clone();
    config.extract_suffix = args.extract_suffix.clone();
    pipeline::run_extract(&config)
}

pub fn run_split(args: &SplitArgs) -> Result<()> {
    let config = SplitConfig {
        files: args.files.clone(),
        n_lines: args.n_lines,
        filelist: args.filelist.clone(),
        encoding: args.encoding.clone(),
    };
    pipeline::run_split(&config)?;
    Ok(())
}
