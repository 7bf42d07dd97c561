//! `kumo facts`: collect and print host facts.

use kumo_facts::ClassifyOptions;
use serde_json::Value;
use std::collections::BTreeMap;

pub struct FactsArgs {
    pub primary_private: Option<String>,
    pub secondary_private: Option<String>,
    pub primary_public: Option<String>,
    pub pretty: bool,
}

fn render(facts: &BTreeMap<String, Value>, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(facts)
    } else {
        serde_json::to_string(facts)
    }
}

pub async fn run(args: FactsArgs) -> anyhow::Result<()> {
    let options = ClassifyOptions {
        forced_primary_private: args.primary_private,
        forced_secondary_private: args.secondary_private,
        forced_primary_public: args.primary_public,
        nat_hint: false,
    };
    let facts = kumo_facts::collect(options).await?;
    let flat = kumo_facts::flatten(&facts);
    println!("{}", render(&flat, args.pretty)?);
    Ok(())
}
