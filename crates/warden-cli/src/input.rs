use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use warden_core::{Action, Result};
use warden_governance::Pipeline;

/// A file may hold a single action or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Action>),
    One(Box<Action>),
}

/// Read a JSON document from `path`, or from stdin when the path is `-`.
pub fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

pub fn parse_actions(raw: &str) -> Result<Vec<Action>> {
    Ok(match serde_json::from_str::<OneOrMany>(raw)? {
        OneOrMany::Many(actions) => actions,
        OneOrMany::One(action) => vec![*action],
    })
}

pub fn parse_pipeline(raw: &str) -> Result<Pipeline> {
    Ok(serde_json::from_str(raw)?)
}
