use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    /// Filter directives used when `RUST_LOG` isn't set
    #[serde(default)]
    pub filter: Option<SmolStr>,
}
