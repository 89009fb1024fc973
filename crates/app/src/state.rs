use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use bubbles_core::loader::{LoadMsg, Loader};
use bubbles_core::{BubblePacker, ContainerSize, DrillPath, Layout, TopicTree, WeightedItem};

pub struct AppState {
    pub file: Option<PathBuf>,
    pub cancel: Arc<AtomicBool>,
    pub load_rx: Option<Receiver<LoadMsg>>,
    pub load_records: u64,
    pub tree: Option<TopicTree>,
    pub path: DrillPath,
    pub filter: String,
    pub error: Option<String>,
    pub layout_error: Option<String>,
    packer: BubblePacker,
    items: Vec<WeightedItem>,
    layout_key: Option<(DrillPath, ContainerSize)>,
    layout: Layout,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            file: None,
            cancel: Arc::new(AtomicBool::new(false)),
            load_rx: None,
            load_records: 0,
            tree: None,
            path: DrillPath::new(),
            filter: String::new(),
            error: None,
            layout_error: None,
            packer: BubblePacker::default(),
            items: Vec::new(),
            layout_key: None,
            layout: Layout::default(),
        }
    }

    pub fn start_load(&mut self, file: PathBuf) {
        self.file = Some(file.clone());
        self.load_records = 0;
        self.error = None;
        self.cancel.store(false, Ordering::Relaxed);

        let (tx, rx): (Sender<LoadMsg>, Receiver<LoadMsg>) = unbounded();
        self.load_rx = Some(rx);
        let cancel = self.cancel.clone();

        std::thread::spawn(move || {
            let loader = Loader::new(cancel);
            loader.load(file, tx);
        });
    }

    pub fn reload(&mut self) {
        if let Some(file) = self.file.clone() {
            self.start_load(file);
        }
    }

    pub fn cancel_load(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Installs a freshly loaded tree, keeping the drill path when it still exists.
    pub fn finish_load(&mut self, tree: TopicTree) {
        if tree.find(&self.path).is_err() {
            self.path.reset();
        }
        self.tree = Some(tree);
        self.layout_key = None;
        self.refresh_items();
    }

    pub fn drill_into(&mut self, label: impl Into<String>) {
        self.path.push(label);
        self.filter.clear();
        self.refresh_items();
    }

    pub fn truncate_path(&mut self, index: usize) {
        self.path.truncate_to(index);
        self.refresh_items();
    }

    pub fn reset_path(&mut self) {
        self.path.reset();
        self.refresh_items();
    }

    pub fn items(&self) -> &[WeightedItem] {
        &self.items
    }

    /// Layout of the current level for `size`, recomputed only when the path or size changed.
    pub fn layout_for(&mut self, size: ContainerSize) -> &Layout {
        let key = (self.path.clone(), size);
        if self.layout_key.as_ref() != Some(&key) {
            self.layout = match self.packer.pack(&self.items, size) {
                Ok(layout) => {
                    self.layout_error = None;
                    layout
                }
                Err(e) => {
                    self.layout_error = Some(e.to_string());
                    Layout::empty(size)
                }
            };
            self.layout_key = Some(key);
        }
        &self.layout
    }

    fn refresh_items(&mut self) {
        let Some(tree) = &self.tree else { return; };
        match tree.items_at(&self.path) {
            Ok(items) => self.items = items,
            Err(e) => {
                self.error = Some(e.to_string());
                self.path.reset();
                self.items = tree.children_items(tree.root);
            }
        }
    }
}
