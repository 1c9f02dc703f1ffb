//! `<artifact>.provenance.json` next to every file the CLI writes: which
//! script was replayed, in which mode, and what the construction looked like
//! when the artifact was taken.

use anyhow::{Context, Result};
use dyngeo::api::Construction;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::script::Script;

#[derive(Debug, Serialize)]
pub struct Sidecar {
    pub command: &'static str,
    pub params: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<ScriptInfo>,
    pub construction: Summary,
}

#[derive(Debug, Serialize)]
pub struct ScriptInfo {
    pub path: String,
    pub steps: usize,
    pub continuous: bool,
}

/// Object and algorithm counts at export time.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub objects: usize,
    pub algorithms: usize,
    pub undefined: usize,
}

impl Summary {
    pub fn of(cons: &Construction) -> Self {
        let store = cons.store();
        Self {
            objects: store.objects().count(),
            algorithms: store.algorithms().count(),
            undefined: store.objects().filter(|o| !o.defined).count(),
        }
    }
}

impl Sidecar {
    pub fn new(command: &'static str, params: Value, cons: &Construction) -> Self {
        Self {
            command,
            params,
            script: None,
            construction: Summary::of(cons),
        }
    }

    pub fn with_script(mut self, path: &Path, script: &Script) -> Self {
        self.script = Some(ScriptInfo {
            path: path.display().to_string(),
            steps: script.steps.len(),
            continuous: script.continuous,
        });
        self
    }
}

#[derive(Serialize)]
struct Record<'a> {
    code_rev: String,
    dyngeo: &'static str,
    output: String,
    #[serde(flatten)]
    sidecar: &'a Sidecar,
}

/// Write the sidecar for `artifact` and return its path.
pub fn write_sidecar(artifact: &Path, sidecar: &Sidecar) -> Result<PathBuf> {
    let path = artifact.with_extension("provenance.json");
    let record = Record {
        code_rev: code_rev(),
        dyngeo: dyngeo::VERSION,
        output: artifact.display().to_string(),
        sidecar,
    };
    fs::write(&path, serde_json::to_vec_pretty(&record)?)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), command = sidecar.command, "provenance written");
    Ok(path)
}

/// `GIT_COMMIT` if set, else the short hash of the checkout, else `unknown`.
pub fn code_rev() -> String {
    std::env::var("GIT_COMMIT")
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| {
            let out = Command::new("git")
                .args(["rev-parse", "--short", "HEAD"])
                .output()
                .ok()?;
            out.status
                .success()
                .then(|| String::from_utf8_lossy(&out.stdout).trim().to_owned())
        })
        .unwrap_or_else(|| "unknown".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    const ORPHANED: &str = r#"{
        "continuous": true,
        "steps": [
            { "op": "object", "label": "A", "value": { "kind": "point", "x": 0, "y": 0 } },
            { "op": "object", "label": "B", "value": { "kind": "point", "x": 1, "y": 0 } },
            { "op": "algorithm", "kind": "line_through_points", "inputs": ["A", "B"], "labels": ["g"] },
            { "op": "remove", "label": "B" }
        ]
    }"#;

    #[test]
    fn summary_counts_undefined_objects() {
        let script: Script = serde_json::from_str(ORPHANED).unwrap();
        let cons = script.build().unwrap();
        assert_eq!(
            Summary::of(&cons),
            Summary {
                objects: 2,
                algorithms: 1,
                undefined: 1
            }
        );
    }

    #[test]
    fn sidecar_sits_next_to_the_artifact() {
        let script: Script = serde_json::from_str(ORPHANED).unwrap();
        let cons = script.build().unwrap();
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("states.json");
        fs::write(&artifact, "[]").unwrap();

        let sidecar = Sidecar::new("run", json!({ "out": "states.json" }), &cons)
            .with_script(Path::new("scene.json"), &script);
        let path = write_sidecar(&artifact, &sidecar).unwrap();
        assert_eq!(path, dir.path().join("states.provenance.json"));

        let doc: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(doc["command"], "run");
        assert_eq!(doc["dyngeo"], dyngeo::VERSION);
        assert_eq!(doc["script"]["steps"], 4);
        assert_eq!(doc["script"]["continuous"], true);
        assert_eq!(doc["construction"]["undefined"], 1);
        assert_eq!(doc["output"], artifact.display().to_string());
    }

    #[test]
    fn random_runs_have_no_script_entry() {
        let sidecar = Sidecar::new("random", json!({ "seed": 3 }), &Construction::new());
        let doc = serde_json::to_value(&sidecar).unwrap();
        assert!(doc.get("script").is_none());
        assert_eq!(doc["construction"]["objects"], 0);
    }
}
