use std::path::PathBuf;

use clap::Parser;

use crate::{pipeline::Config, resources::TableConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CLIArguments {
   /// Asset directory holding the bitmaps and PNGs
   #[arg(short, long, default_value = ".")]
   pub dir: PathBuf,

   /// Generated table path, relative to the asset directory unless absolute
   #[arg(short, long, default_value = "../src/resources.ts")]
   pub output: PathBuf,

   /// MIME type declared in every data URI
   #[arg(long, default_value = "image/png")]
   pub mime: String,

   /// Name of the exported namespace
   #[arg(long, default_value = "Resources")]
   pub namespace: String,
}

impl CLIArguments {
    pub fn into_config(self) -> Config {
        Config {
            asset_dir: self.dir,
            output: self.output,
            table: TableConfig {
                namespace: self.namespace,
                mime: self.mime,
            },
        }
    }
}
