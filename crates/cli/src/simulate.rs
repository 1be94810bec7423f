use std::path::Path;

use dmarket_sim::{SimConfig, Simulation};

use crate::{fail, OutputFormat};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub seed: Option<u64>,
    pub blocks: Option<u64>,
    pub ops_per_block: Option<usize>,
}

impl Overrides {
    fn apply(self, config: &mut SimConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(blocks) = self.blocks {
            config.blocks = blocks;
        }
        if let Some(ops) = self.ops_per_block {
            config.ops_per_block = ops;
        }
    }
}

pub(crate) fn cmd_simulate(
    config_path: Option<&Path>,
    overrides: Overrides,
    output: OutputFormat,
    quiet: bool,
) {
    let mut config = match config_path {
        Some(path) => match SimConfig::load(path) {
            Ok(c) => c,
            Err(e) => fail(&e.to_string(), output, quiet),
        },
        None => SimConfig::default(),
    };
    overrides.apply(&mut config);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => fail(&format!("failed to create tokio runtime: {}", e), output, quiet),
    };

    match runtime.block_on(Simulation::new(config).run()) {
        Ok(report) => match output {
            OutputFormat::Json => match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => fail(&format!("error serializing report: {}", e), output, quiet),
            },
            OutputFormat::Text => {
                if !quiet {
                    print!("{}", report);
                }
            }
        },
        Err(failure) => {
            if output == OutputFormat::Json {
                let value = serde_json::json!({
                    "error": failure.error.to_string(),
                    "seed": failure.seed,
                    "block": failure.block,
                    "step": failure.step,
                    "report": failure.report,
                });
                println!("{}", value);
            }
            fail(&failure.to_string(), output, quiet);
        }
    }
}
