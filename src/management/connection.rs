use std::path::PathBuf;

use crate::types::ConnectionInfo;

/// Persisted record of the site collection the user signed in to. Written by
/// `spo login`, read by every other command, removed by `spo logout`.
pub struct ConnectionManager {
    info: ConnectionInfo,
}

impl ConnectionManager {
    pub fn new(info: ConnectionInfo) -> Self {
        ConnectionManager { info }
    }

    pub async fn load() -> Result<Self, String> {
        let path = Self::connection_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let info: ConnectionInfo = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { info })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::connection_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.info).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    pub async fn clear() -> Result<(), String> {
        let path = Self::connection_path();
        if path.is_file() {
            async_fs::remove_file(path)
                .await
                .map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    pub fn site_url(&self) -> &str {
        &self.info.site_url
    }

    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    fn connection_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("spocli/cache/connection.json");
        path
    }
}
