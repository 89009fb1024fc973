use crossbeam_channel::Sender;
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::*;

/// Records between two progress messages.
const PROGRESS_EVERY: u64 = 256;

#[derive(Debug, Clone)]
pub enum LoadMsg {
    Progress { records: u64 },
    Done(TopicTree),
    Error(String),
}

pub struct Loader {
    cancel: Arc<AtomicBool>,
}

impl Loader {
    pub fn new(cancel: Arc<AtomicBool>) -> Self {
        Self { cancel }
    }

    /// Loads `path` and reports over `tx`; meant to run on its own thread.
    pub fn load(&self, path: PathBuf, tx: Sender<LoadMsg>) {
        let result = load_with(&path, &self.cancel, |records| {
            let _ = tx.send(LoadMsg::Progress { records });
        });
        let _ = match result {
            Ok(tree) => tx.send(LoadMsg::Done(tree)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "topic load failed");
                tx.send(LoadMsg::Error(e.to_string()))
            }
        };
    }
}

/// Synchronous load, format picked from the file extension.
pub fn load_file(path: &Path) -> Result<TopicTree> {
    load_with(path, &AtomicBool::new(false), |_| {})
}

fn load_with(path: &Path, cancel: &AtomicBool, progress: impl FnMut(u64)) -> Result<TopicTree> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let reader = || -> Result<BufReader<File>> { Ok(BufReader::new(File::open(path)?)) };
    let tree = match ext.as_deref() {
        Some("json") => parse_json(reader()?, cancel, progress)?,
        Some("csv") => parse_csv(reader()?, cancel, progress)?,
        _ => return Err(Error::UnsupportedFormat(path.to_path_buf())),
    };
    info!(path = %path.display(), topics = tree.len(), "topics loaded");
    Ok(tree)
}

#[derive(Debug, Deserialize)]
struct RawTopic {
    #[serde(alias = "topic")]
    label: String,
    #[serde(default, alias = "radius", alias = "size")]
    weight: Option<f64>,
    #[serde(default, alias = "subtopics")]
    children: Vec<RawTopic>,
}

/// Parses a nested topic array. A node without a weight weighs as much as its children.
/// Progress counts top-level topics.
pub fn parse_json(reader: impl Read, cancel: &AtomicBool, mut progress: impl FnMut(u64)) -> Result<TopicTree> {
    let raw: Vec<RawTopic> = serde_json::from_reader(reader)?;
    let mut tree = TopicTree::new();
    let root = tree.root;
    let mut total = 0.0;
    let mut records = 0u64;
    for topic in &raw {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        total += insert_raw(&mut tree, root, topic)?;
        records += 1;
        progress(records);
    }
    tree.nodes[root.0 as usize].weight = total;
    Ok(tree)
}

fn insert_raw(tree: &mut TopicTree, parent: TopicId, raw: &RawTopic) -> Result<f64> {
    let id = tree.ensure_child(parent, raw.label.trim());
    let mut children_total = 0.0;
    for child in &raw.children {
        children_total += insert_raw(tree, id, child)?;
    }
    let weight = raw.weight.unwrap_or(children_total);
    WeightedItem::new(raw.label.clone(), weight).validate()?;
    let node = &mut tree.nodes[id.0 as usize];
    node.weight += weight;
    Ok(weight)
}

#[derive(Debug, Deserialize)]
struct TopicRecord {
    path: String,
    weight: f64,
}

/// Splits `Contract/Payment` or `Contract > Payment` into trimmed segments.
pub fn split_topic_path(path: &str) -> Vec<&str> {
    path.split(['/', '>'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parses `path,weight` rows. Each row's weight is added to the leaf and all its ancestors.
pub fn parse_csv(reader: impl Read, cancel: &AtomicBool, mut progress: impl FnMut(u64)) -> Result<TopicTree> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut tree = TopicTree::new();
    let mut records = 0u64;

    for row in rdr.deserialize::<TopicRecord>() {
        if cancel.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        let rec = row?;
        let line = records + 2;
        let segments = split_topic_path(&rec.path);
        if segments.is_empty() {
            return Err(Error::Malformed {
                line,
                message: "empty topic path".to_string(),
            });
        }
        WeightedItem::new(rec.path.clone(), rec.weight).validate()?;

        // Walk down, creating topics and adding the weight at every level
        let mut cur = tree.root;
        tree.nodes[cur.0 as usize].weight += rec.weight;
        for seg in segments {
            cur = tree.ensure_child(cur, seg);
            tree.nodes[cur.0 as usize].weight += rec.weight;
        }

        records += 1;
        if records % PROGRESS_EVERY == 0 {
            progress(records);
        }
    }
    progress(records);
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_cancel() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn json_accepts_backend_field_names() {
        let src = r#"[
            {"topic": "Contract", "radius": 12, "subtopics": [
                {"topic": "Payment", "radius": 7},
                {"topic": "Breach", "radius": 5}
            ]},
            {"label": "Injury", "weight": 4}
        ]"#;
        let tree = parse_json(src.as_bytes(), &no_cancel(), |_| {}).unwrap();
        assert_eq!(tree.len(), 4);
        let items = tree.children_items(tree.root);
        assert_eq!(items, [WeightedItem::new("Contract", 12.0), WeightedItem::new("Injury", 4.0)]);
        assert_eq!(tree.node(tree.root).weight, 16.0);
    }

    #[test]
    fn json_missing_weight_sums_children() {
        let src = r#"[{"label": "Contract", "children": [{"label": "A", "weight": 2}, {"label": "B", "weight": 3}]}]"#;
        let tree = parse_json(src.as_bytes(), &no_cancel(), |_| {}).unwrap();
        let contract = tree.child_by_label(tree.root, "Contract").unwrap();
        assert_eq!(tree.node(contract).weight, 5.0);
    }

    #[test]
    fn json_negative_weight_is_rejected() {
        let src = r#"[{"label": "Bad", "weight": -3}]"#;
        let err = parse_json(src.as_bytes(), &no_cancel(), |_| {}).unwrap_err();
        assert!(matches!(err, Error::InvalidWeight { .. }));
    }

    #[test]
    fn json_reports_progress_per_top_level_topic() {
        let src = r#"[{"label": "A", "weight": 1, "children": [{"label": "A1", "weight": 1}]}, {"label": "B", "weight": 2}]"#;
        let mut seen = Vec::new();
        parse_json(src.as_bytes(), &no_cancel(), |n| seen.push(n)).unwrap();
        assert_eq!(seen, [1, 2]);
    }

    #[test]
    fn json_loader_sends_progress_before_done() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topics.json");
        std::fs::write(&path, r#"[{"topic": "Contract", "radius": 4}, {"topic": "Injury", "radius": 2}]"#).unwrap();

        let (tx, rx) = crossbeam_channel::unbounded();
        Loader::new(Arc::new(AtomicBool::new(false))).load(path, tx);
        let msgs: Vec<_> = rx.try_iter().collect();
        assert!(matches!(msgs[0], LoadMsg::Progress { records: 1 }));
        assert!(matches!(msgs[1], LoadMsg::Progress { records: 2 }));
        assert!(matches!(msgs.last(), Some(LoadMsg::Done(_))));
    }

    #[test]
    fn csv_propagates_weights_to_ancestors() {
        let src = "path,weight\nContract/Payment,3\nContract > Breach,2\nInjury,4\n";
        let mut seen = Vec::new();
        let tree = parse_csv(src.as_bytes(), &no_cancel(), |n| seen.push(n)).unwrap();
        let contract = tree.child_by_label(tree.root, "Contract").unwrap();
        assert_eq!(tree.node(contract).weight, 5.0);
        assert_eq!(tree.node(tree.root).weight, 9.0);
        assert_eq!(tree.children_items(contract).len(), 2);
        assert_eq!(seen, [3]);
    }

    #[test]
    fn csv_empty_path_reports_line() {
        let src = "path,weight\nA,1\n / ,2\n";
        let err = parse_csv(src.as_bytes(), &no_cancel(), |_| {}).unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 3, .. }));
    }

    #[test]
    fn cancelled_load_stops() {
        let cancel = AtomicBool::new(true);
        let err = parse_csv("path,weight\nA,1\n".as_bytes(), &cancel, |_| {}).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = load_file(Path::new("topics.xml")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn loader_reports_done_over_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topics.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "path,weight\nWitness/Credibility,6\nWitness/Timeline,2").unwrap();
        drop(f);

        let (tx, rx) = crossbeam_channel::unbounded();
        let loader = Loader::new(Arc::new(AtomicBool::new(false)));
        std::thread::spawn(move || loader.load(path, tx));

        let tree = loop {
            match rx.recv().unwrap() {
                LoadMsg::Progress { .. } => continue,
                LoadMsg::Done(tree) => break tree,
                LoadMsg::Error(e) => panic!("load failed: {e}"),
            }
        };
        let witness = tree.child_by_label(tree.root, "Witness").unwrap();
        assert_eq!(tree.node(witness).weight, 8.0);
    }
}
