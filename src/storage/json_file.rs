use std::{
    io::{ErrorKind, SeekFrom},
    path::Path,
};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::{debug, warn};

/// Reads a JSON document guarded by a shared lock. A missing, empty or undecodable file yields
/// `T::default()`, so a corrupted file reads as "no data" instead of failing the caller.
pub async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    async fn extract(path: &Path) -> std::result::Result<String, std::io::Error> {
        debug!("Reading {path:?}");
        let mut file = File::open(path).await?;
        file.lock_shared()?;
        let mut content = String::new();
        let result = file.read_to_string(&mut content).await;
        file.unlock_async().await?;
        result?;
        Ok(content)
    }

    let content = match extract(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => Err(e)?,
    };

    Ok(decode_or_default(path, &content))
}

/// Replaces the document with `value` under an exclusive lock.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let buffer = serde_json::to_vec_pretty(value)?;
    let mut file = open_for_update(path).await?;
    file.lock_exclusive()?;
    let result = overwrite(&mut file, &buffer).await;
    file.unlock_async().await?;
    result
}

/// Read-modify-write of a document while holding one exclusive lock for the whole operation.
pub async fn update_json<T, F>(path: &Path, update: F) -> Result<T>
where
    T: Serialize + DeserializeOwned + Default,
    F: FnOnce(&mut T),
{
    let mut file = open_for_update(path).await?;
    file.lock_exclusive()?;
    let result = update_locked(path, &mut file, update).await;
    file.unlock_async().await?;
    result
}

async fn update_locked<T, F>(path: &Path, file: &mut File, update: F) -> Result<T>
where
    T: Serialize + DeserializeOwned + Default,
    F: FnOnce(&mut T),
{
    let mut content = String::new();
    file.read_to_string(&mut content).await?;
    let mut value: T = decode_or_default(path, &content);
    update(&mut value);

    let buffer = serde_json::to_vec_pretty(&value)?;
    overwrite(file, &buffer).await?;
    Ok(value)
}

async fn open_for_update(path: &Path) -> Result<File> {
    Ok(File::options()
        .write(true)
        .create(true)
        .read(true)
        .truncate(false)
        .open(path)
        .await?)
}

async fn overwrite(file: &mut File, buffer: &[u8]) -> Result<()> {
    file.set_len(0).await?;
    file.seek(SeekFrom::Start(0)).await?;
    file.write_all(buffer).await?;
    file.flush().await?;
    Ok(())
}

fn decode_or_default<T: DeserializeOwned + Default>(path: &Path, content: &str) -> T {
    if content.trim().is_empty() {
        return T::default();
    }
    match serde_json::from_str::<T>(content) {
        Ok(value) => value,
        Err(e) => {
            // Might happen after a shutdown interrupted a write.
            warn!("Found illegal json in {path:?}, treating it as empty: {e}");
            T::default()
        }
    }
}
