use std::path::PathBuf;
use std::time::Duration;

use crossbeam_channel::{Receiver, unbounded};
use isoview_runtime::ClientConfig;

/// Watches the client profile and yields each successfully reparsed copy.
/// Parse failures are logged and the previous profile stays live.
pub fn spawn_config_watcher(path: PathBuf) -> Receiver<ClientConfig> {
    let (tx, rx) = unbounded::<ClientConfig>();
    std::thread::spawn(move || {
        use notify::{EventKind, RecursiveMode, Watcher};
        let file = path.clone();
        let watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
            let Ok(event) = res else {
                return;
            };
            match event.kind {
                EventKind::Modify(_) | EventKind::Create(_) | EventKind::Any => {
                    match ClientConfig::load_from_path(&file) {
                        Ok(cfg) => {
                            log::info!("client config changed: {:?}", file);
                            let _ = tx.send(cfg);
                        }
                        Err(e) => log::warn!("client config reload failed: {}", e),
                    }
                }
                _ => {}
            }
        });
        match watcher {
            Ok(mut watcher) => {
                if let Err(e) = watcher.watch(path.as_path(), RecursiveMode::NonRecursive) {
                    log::warn!("cannot watch {:?}: {}", path, e);
                    return;
                }
                loop {
                    std::thread::sleep(Duration::from_secs(3600));
                }
            }
            Err(e) => log::warn!("config watcher unavailable: {}", e),
        }
    });
    rx
}
