use crate::merge::{MergeConfig, DEFAULT_OUTPUT_DIR};
use std::path::PathBuf;
use structopt::StructOpt;

/// Merge directories into one, copying each distinct file content only once.
///
/// When duplicate files are found, the copy from the directory given first wins. Files with the
/// same name but different content are all kept, later ones renamed to "name (1).ext" and so on.
#[derive(StructOpt, Debug)]
#[structopt(name = "fmerge")]
pub struct Opt {
    /// Input directory. Give the flag once per directory; at least 2 are required.
    #[structopt(
        short = "i",
        long = "input",
        parse(from_os_str),
        number_of_values = 1
    )]
    pub input_dirs: Vec<PathBuf>,

    /// Directory the merged files are copied into. Created if missing.
    #[structopt(
        short = "o",
        long = "output",
        default_value = DEFAULT_OUTPUT_DIR,
        parse(from_os_str)
    )]
    pub output_dir: PathBuf,

    /// Give copied files the modification time of the original file.
    #[structopt(short = "r", long = "retain-modified-time")]
    pub retain_modified_time: bool,

    /// Log more; repeat for trace output.
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    pub verbose: u8,

    /// Only log errors.
    #[structopt(short = "q", long = "quiet")]
    pub quiet: bool,
}

impl Opt {
    /// # Returns
    ///
    /// The merge configuration, or `None` if fewer than 2 input directories were given.
    pub fn merge_config(&self) -> Option<MergeConfig> {
        if self.input_dirs.len() < 2 {
            return None;
        }

        Some(MergeConfig {
            input_dirs: self.input_dirs.clone(),
            output_dir: self.output_dir.clone(),
            retain_modified_time: self.retain_modified_time,
        })
    }
}
