/// File-backed asset fetching on a worker thread
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::thread;

use bodyfit_core::{AssetKind, AssetReply, AssetRequest, Raster};
use crossbeam::channel::{unbounded, Receiver, Sender};
use tracing::{debug, warn};

/// Serves asset requests from files under a root directory.
///
/// Requests go to a background thread; replies are picked up with
/// [`AssetWorker::drain`] from the tick loop.
pub struct AssetWorker {
    request_tx: Sender<AssetRequest>,
    reply_rx: Receiver<AssetReply>,
}

impl AssetWorker {
    pub fn spawn(root: PathBuf) -> Self {
        let (request_tx, request_rx) = unbounded::<AssetRequest>();
        let (reply_tx, reply_rx) = unbounded::<AssetReply>();
        thread::spawn(move || asset_worker(root, request_rx, reply_tx));
        Self {
            request_tx,
            reply_rx,
        }
    }

    /// Queue a request; false if the worker thread is gone
    pub fn request(&self, request: AssetRequest) -> bool {
        match self.request_tx.send(request) {
            Ok(()) => true,
            Err(err) => {
                let request = err.into_inner();
                warn!(part = %request.part, path = %request.path, "asset worker stopped, request dropped");
                false
            }
        }
    }

    /// Every reply that has arrived so far
    pub fn drain(&self) -> Vec<AssetReply> {
        let mut replies = Vec::new();
        while let Ok(reply) = self.reply_rx.try_recv() {
            replies.push(reply);
        }
        replies
    }
}

fn asset_worker(root: PathBuf, request_rx: Receiver<AssetRequest>, reply_tx: Sender<AssetReply>) {
    while let Ok(request) = request_rx.recv() {
        let reply = fetch(&root, request);
        if reply_tx.send(reply).is_err() {
            break;
        }
    }
}

/// Map a normalized asset path onto the filesystem.
///
/// `None` for paths that climb out of `root`.
pub fn resolve(root: &Path, path: &str) -> Option<PathBuf> {
    let relative = Path::new(path.trim_start_matches('/'));
    if relative.components().any(|c| matches!(c, Component::ParentDir)) {
        return None;
    }
    Some(root.join(relative))
}

/// Read and decode one asset synchronously
pub fn fetch(root: &Path, request: AssetRequest) -> AssetReply {
    let lower = request.path.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return AssetReply::fetch_failed(request, "remote assets are not supported by the terminal viewer");
    }

    let Some(full) = resolve(root, &request.path) else {
        return AssetReply::fetch_failed(request, "asset path leaves the asset root");
    };
    debug!(path = %full.display(), kind = ?request.kind, "reading asset");

    let bytes = match std::fs::read(&full) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            let message = format!("{} not found (404)", full.display());
            return AssetReply::fetch_failed(request, message);
        }
        Err(err) => {
            let message = format!("{}: {}", full.display(), err);
            return AssetReply::fetch_failed(request, message);
        }
    };

    match request.kind {
        AssetKind::Mesh => match String::from_utf8(bytes) {
            Ok(text) => AssetReply::mesh(request, text),
            Err(err) => AssetReply::fetch_failed(request, format!("mesh is not UTF-8: {}", err)),
        },
        AssetKind::Texture => match Raster::decode(&bytes) {
            Ok(raster) => AssetReply::texture(request, raster),
            Err(err) => AssetReply::failed(request, err),
        },
    }
}
