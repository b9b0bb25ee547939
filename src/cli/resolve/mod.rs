//! Resolve command - resolves names one at a time through the full pipeline

use clap::Args;
use serde::Serialize;

use super::{bootstrap, print_json};
use crate::domain::geo::Coordinates;
use crate::GeocodingContext;

/// Arguments for the resolve command
#[derive(Args, Clone)]
pub struct ResolveArgs {
    /// Location names as they appear in event titles
    #[arg(required = true)]
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Resolution {
    name: String,
    result: Option<Coordinates>,
    location_gps: Option<String>,
}

impl Resolution {
    fn new(name: &str, result: Option<Coordinates>) -> Self {
        Self {
            name: name.to_string(),
            location_gps: result.map(|c| c.to_gps_string()),
            result,
        }
    }
}

/// Run the resolve command
pub async fn run(args: ResolveArgs) -> anyhow::Result<()> {
    let runtime = bootstrap()?;
    let context = GeocodingContext::from_config(&runtime.config)?;

    let mut resolutions = Vec::with_capacity(args.names.len());
    for name in &args.names {
        let result = context.resolve(name).await;
        resolutions.push(Resolution::new(name, result));
    }

    print_json(&resolutions)
}
