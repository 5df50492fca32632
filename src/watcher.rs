use std::path::PathBuf;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

type Event = notify::Result<notify::Event>;

#[derive(Debug)]
pub struct FileChangeWatcher {
    paths_to_watch: Vec<PathBuf>,
    _watcher: RecommendedWatcher,
    events_rx: std::sync::mpsc::Receiver<Event>,
}

impl FileChangeWatcher {
    pub fn new(files: &[String]) -> Self {
        let paths_to_watch: Vec<PathBuf> = files.iter().map(|s| s.parse().unwrap()).collect();
        let (events_tx, events_rx) = std::sync::mpsc::channel::<Event>();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = events_tx.send(res);
            },
            notify::Config::default(),
        )
        .expect("could not create Watcher");

        for path in paths_to_watch.iter() {
            if let Err(err) = watcher.watch(path, RecursiveMode::NonRecursive) {
                log::error!("could not watch {path:?}: {err}");
            }
        }

        FileChangeWatcher {
            paths_to_watch,
            _watcher: watcher,
            events_rx,
        }
    }

    pub fn watch(&mut self, file: &str) {
        let path: PathBuf = file.parse().unwrap();
        if let Err(err) = self._watcher.watch(&path, RecursiveMode::NonRecursive) {
            log::error!("could not watch {path:?}: {err}");
        }
        self.paths_to_watch.push(path);
    }

    pub fn check_for_changes(&self) -> Option<Vec<&PathBuf>> {
        let mut result: Vec<&PathBuf> = vec![];
        while let Ok(event) = self.events_rx.try_recv() {
            if let Ok(notify::Event {
                kind: EventKind::Modify(_),
                paths,
                attrs: _,
            }) = event
            {
                for p in paths {
                    for q in self.paths_to_watch.iter() {
                        // necessary because the paths in `paths_to_watch` are relative and the paths in the event are absolute.
                        let path_equals = p
                            .as_path()
                            .to_str()
                            .expect("Path should be utf8")
                            .ends_with(q.to_str().expect("Path should be utf8"));
                        if path_equals {
                            result.push(q);
                        }
                    }
                }
            }
        }
        if result.is_empty() {
            None
        } else {
            Some(result)
        }
    }
}
