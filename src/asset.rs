use std::path::PathBuf;

use image::RgbaImage;
use tokio::sync::oneshot;

/// An Asset that can be fetched from bytes. The bytes could come from anywhere, e.g. the network, the disk, embedded in the binary, don't care.
pub trait AssetT: Sized + Send + 'static {
    fn from_bytes(bytes: &[u8]) -> Result<Self, anyhow::Error>;

    fn load(path: &str) -> Result<Self, anyhow::Error> {
        let bytes: Vec<u8> = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl AssetT for RgbaImage {
    fn from_bytes(bytes: &[u8]) -> Result<Self, anyhow::Error> {
        let image = image::load_from_memory(bytes)?;
        let rgba = image.to_rgba8();
        Ok(rgba)
    }
}

impl AssetT for String {
    // Note: expects bytes to be utf8 encoded
    fn from_bytes(bytes: &[u8]) -> Result<Self, anyhow::Error> {
        let text = String::from_utf8(bytes.to_vec())?;
        Ok(text)
    }
}

/// Where an asset's bytes come from. Effects resolve their assets relative to
/// a base location, which can be a directory or an http(s) url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    File(PathBuf),
    Url(String),
}

impl AssetSource {
    pub fn relative_to(base: &str, name: &str) -> Self {
        if base.starts_with("http://") || base.starts_with("https://") {
            let base = base.trim_end_matches('/');
            AssetSource::Url(format!("{base}/{name}"))
        } else {
            AssetSource::File(PathBuf::from(base).join(name))
        }
    }

    pub async fn fetch_bytes(&self) -> anyhow::Result<Vec<u8>> {
        match self {
            AssetSource::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(bytes)
            }
            AssetSource::Url(url) => {
                let response = reqwest::get(url).await?.error_for_status()?;
                let bytes = response.bytes().await?;
                Ok(bytes.to_vec())
            }
        }
    }
}

/// An in-flight asset load. Poll it once per frame; the decoded value shows
/// up on the polling thread, never from the loader task itself. Dropping it
/// aborts the task, so a load that outlives its owner is a no-op.
#[derive(Debug)]
pub struct LoadingAsset<T> {
    rx: oneshot::Receiver<anyhow::Result<T>>,
    task: tokio::task::JoinHandle<()>,
}

impl<T: AssetT> LoadingAsset<T> {
    pub fn spawn(source: AssetSource, rt: &tokio::runtime::Runtime) -> Self {
        let (tx, rx) = oneshot::channel();
        let task = rt.spawn(async move {
            let result = async {
                let bytes = source.fetch_bytes().await?;
                T::from_bytes(&bytes)
            }
            .await;
            // the receiver may already be gone, then the result is just dropped.
            let _ = tx.send(result);
        });
        Self { rx, task }
    }

    /// Non-blocking. Returns `Some` exactly once, when the load has finished.
    pub fn poll(&mut self) -> Option<anyhow::Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => None,
        }
    }
}

impl<T> Drop for LoadingAsset<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_to_url_base() {
        let src = AssetSource::relative_to("https://example.com/fx/", "globes.png");
        assert_eq!(
            src,
            AssetSource::Url("https://example.com/fx/globes.png".into())
        );
    }

    #[test]
    fn relative_to_dir_base() {
        let src = AssetSource::relative_to("./assets", "globes.png");
        assert_eq!(src, AssetSource::File(PathBuf::from("./assets/globes.png")));
    }

    #[test]
    fn load_resolves_on_poll() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let dir = std::env::temp_dir().join("globes_asset_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("hello.txt");
        std::fs::write(&path, b"hello").unwrap();

        let mut loading: LoadingAsset<String> =
            LoadingAsset::spawn(AssetSource::File(path), &rt);
        let mut result = None;
        for _ in 0..200 {
            if let Some(r) = loading.poll() {
                result = Some(r);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(result.unwrap().unwrap(), "hello");
    }

    #[test]
    fn failed_load_reports_error() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let mut loading: LoadingAsset<String> = LoadingAsset::spawn(
            AssetSource::File(PathBuf::from("/definitely/not/a/file")),
            &rt,
        );
        let mut result = None;
        for _ in 0..200 {
            if let Some(r) = loading.poll() {
                result = Some(r);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(result.unwrap().is_err());
    }

    #[test]
    fn dropped_load_is_cancelled() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let loading: LoadingAsset<String> = LoadingAsset::spawn(
            AssetSource::File(PathBuf::from("/definitely/not/a/file")),
            &rt,
        );
        drop(loading);
        // nothing to assert beyond "no panic": the task is aborted and its
        // send goes to a closed channel.
    }
}
