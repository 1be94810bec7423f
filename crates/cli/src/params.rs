use dmarket_sim::default_params;

use crate::{fail, OutputFormat};

pub(crate) fn cmd_params(output: OutputFormat) {
    let params = default_params();
    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(&params) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(&format!("error serializing params: {}", e), output, false),
        },
        OutputFormat::Text => {
            for (key, value) in params.iter() {
                println!("{} = {}", key, value);
            }
        }
    }
}
